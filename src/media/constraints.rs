// SPDX-License-Identifier: MPL-2.0
//! Capture constraints: which tracks to request and from which devices.

use serde::{Deserialize, Serialize};

/// Requirements for one kind of track.
///
/// `source_id` is a preference: a platform that cannot find the device
/// falls back to any device of the right kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<f32>,
}

impl TrackConstraints {
    /// Any device of the kind, no further requirements.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_source(source_id: Option<&str>) -> Self {
        Self {
            source_id: source_id.map(str::to_owned),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_ideal_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }
}

/// A full capture request. A `None` track is not requested.
///
/// # Example
///
/// ```
/// use iced_webcam::media::MediaConstraints;
///
/// let constraints = MediaConstraints::from_sources(Some("mic"), Some("cam"), false);
/// assert!(constraints.wants_video());
/// assert!(!constraints.wants_audio());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<TrackConstraints>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<TrackConstraints>,
}

impl MediaConstraints {
    /// Selects the given sources: video always, audio only when `with_audio`.
    #[must_use]
    pub fn from_sources(audio_source: Option<&str>, video_source: Option<&str>, with_audio: bool) -> Self {
        Self {
            video: Some(TrackConstraints::from_source(video_source)),
            audio: with_audio.then(|| TrackConstraints::from_source(audio_source)),
        }
    }

    /// Video from any camera, optionally with audio from any microphone.
    #[must_use]
    pub fn any_camera(with_audio: bool) -> Self {
        Self::from_sources(None, None, with_audio)
    }

    #[must_use]
    pub fn wants_video(&self) -> bool {
        self.video.is_some()
    }

    #[must_use]
    pub fn wants_audio(&self) -> bool {
        self.audio.is_some()
    }

    /// A request must ask for at least one kind of track.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.video.is_none() && self.audio.is_none()
    }
}
