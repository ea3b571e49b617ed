// SPDX-License-Identifier: MPL-2.0
//! Handles for granted media streams and their tracks.

use crate::media::frame::VideoFrame;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Audio,
    Video,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    Live,
    Ended,
}

/// A single audio or video track of a granted stream.
pub trait MediaTrack: Send + Sync + fmt::Debug {
    fn id(&self) -> &str;
    fn kind(&self) -> TrackKind;
    fn label(&self) -> &str;
    fn ready_state(&self) -> TrackState;

    /// Stops the track and releases the underlying device. Idempotent.
    fn stop(&self);
}

/// A granted stream: the live tracks plus access to the current video frame.
pub trait MediaStream: Send + Sync + fmt::Debug {
    fn id(&self) -> &str;
    fn tracks(&self) -> Vec<Arc<dyn MediaTrack>>;

    /// The most recent decoded video frame, `None` while no frame is
    /// available yet or once the video track ended.
    fn current_frame(&self) -> Option<VideoFrame>;

    /// Stops every track in a single call, for handles that support it.
    ///
    /// Returns false when the handle has no such operation; callers then
    /// stop the tracks one by one (see [`stop_stream`]).
    fn stop_all(&self) -> bool {
        false
    }

    fn video_tracks(&self) -> Vec<Arc<dyn MediaTrack>> {
        self.tracks()
            .into_iter()
            .filter(|track| track.kind() == TrackKind::Video)
            .collect()
    }

    fn audio_tracks(&self) -> Vec<Arc<dyn MediaTrack>> {
        self.tracks()
            .into_iter()
            .filter(|track| track.kind() == TrackKind::Audio)
            .collect()
    }

    /// True while at least one track is live.
    fn is_active(&self) -> bool {
        self.tracks()
            .iter()
            .any(|track| track.ready_state() == TrackState::Live)
    }
}

/// Shared handle to a granted stream.
pub type SharedStream = Arc<dyn MediaStream>;

/// Stops the whole stream: through [`MediaStream::stop_all`] when the handle
/// provides it, otherwise video tracks first, then audio tracks.
pub fn stop_stream(stream: &dyn MediaStream) {
    if stream.stop_all() {
        return;
    }
    for track in stream.video_tracks() {
        track.stop();
    }
    for track in stream.audio_tracks() {
        track.stop();
    }
}
