// SPDX-License-Identifier: MPL-2.0
//! Resolving what to ask the platform for.

use crate::error::CaptureError;
use crate::media::{select_default_sources, MediaConstraints};
use crate::platform::MediaPlatform;
use std::fmt;

/// What a mounting instance would like to capture.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionRequest {
    /// Raw constraints, used as-is when present.
    pub constraints: Option<MediaConstraints>,
    pub audio_source: Option<String>,
    pub video_source: Option<String>,
    /// Whether an audio track is wanted.
    pub audio: bool,
}

impl Default for AcquisitionRequest {
    fn default() -> Self {
        Self {
            constraints: None,
            audio_source: None,
            video_source: None,
            audio: true,
        }
    }
}

impl AcquisitionRequest {
    /// Picks how the constraints will be resolved, without doing any I/O.
    ///
    /// Explicit sources are only enough when the video source is named and,
    /// if audio is wanted, the audio source too.
    #[must_use]
    pub fn strategy(&self) -> ConstraintStrategy {
        if self.constraints.is_some() {
            ConstraintStrategy::Explicit
        } else if self.video_source.is_some() && (self.audio_source.is_some() || !self.audio) {
            ConstraintStrategy::SelectedSources
        } else {
            ConstraintStrategy::Enumerated
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintStrategy {
    /// Raw constraints supplied by the embedder.
    Explicit,
    /// Device ids supplied by the embedder.
    SelectedSources,
    /// First audio and video inputs of a device enumeration.
    Enumerated,
}

impl fmt::Display for ConstraintStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConstraintStrategy::Explicit => "explicit",
            ConstraintStrategy::SelectedSources => "selected-sources",
            ConstraintStrategy::Enumerated => "enumerated",
        })
    }
}

/// Turns a request into concrete constraints, enumerating devices if needed.
///
/// # Errors
///
/// Returns [`CaptureError::Enumeration`] if the device list cannot be read.
pub async fn resolve_constraints(
    platform: &dyn MediaPlatform,
    request: &AcquisitionRequest,
) -> Result<MediaConstraints, CaptureError> {
    match request.strategy() {
        ConstraintStrategy::Explicit => Ok(request.constraints.clone().unwrap_or_default()),
        ConstraintStrategy::SelectedSources => Ok(MediaConstraints::from_sources(
            request.audio_source.as_deref(),
            request.video_source.as_deref(),
            request.audio,
        )),
        ConstraintStrategy::Enumerated => {
            let devices = platform.enumerate_devices().await.map_err(|err| match err {
                CaptureError::Enumeration(_) => err,
                other => CaptureError::Enumeration(other.to_string()),
            })?;
            let selected = select_default_sources(&devices);
            Ok(MediaConstraints::from_sources(
                selected.audio.as_deref(),
                selected.video.as_deref(),
                request.audio,
            ))
        }
    }
}
