// SPDX-License-Identifier: MPL-2.0
//! Hidden playback surface bound to a granted stream.
//!
//! Mirrors the subset of an HTML `<video>` element the webcam relies on: a
//! source URL, autoplay, mute, and the `canplay`/`play`/`ended` events. The
//! surface is never drawn; the canvas is.

use crate::media::frame::VideoFrame;
use crate::media::stream::SharedStream;
use crate::platform::ObjectUrl;

/// Playback state of the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// No source bound.
    #[default]
    Empty,
    /// Source bound, waiting for the first frame.
    Loading,
    Playing,
    Paused,
    Ended,
}

/// Events raised while polling the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoEvent {
    /// The first frame arrived; the natural size is now known.
    CanPlay { width: u32, height: u32 },
    /// Playback started.
    Play,
    /// Every track of the stream ended.
    Ended,
}

#[derive(Debug, Default)]
pub struct VideoSurface {
    src: Option<ObjectUrl>,
    stream: Option<SharedStream>,
    state: PlaybackState,
    natural_size: Option<(u32, u32)>,
    muted: bool,
    autoplay: bool,
    class_name: Option<String>,
}

impl VideoSurface {
    #[must_use]
    pub fn new(muted: bool) -> Self {
        Self {
            muted,
            autoplay: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_class_name(mut self, class_name: Option<String>) -> Self {
        self.class_name = class_name;
        self
    }

    /// Binds a source. Any previous source is replaced and playback restarts.
    pub fn load(&mut self, src: ObjectUrl, stream: SharedStream) {
        self.src = Some(src);
        self.stream = Some(stream);
        self.natural_size = None;
        self.state = PlaybackState::Loading;
    }

    /// Drops the source.
    pub fn clear(&mut self) {
        self.src = None;
        self.stream = None;
        self.natural_size = None;
        self.state = PlaybackState::Empty;
    }

    /// Advances the playback state and returns the events that fired.
    pub fn poll(&mut self) -> Vec<VideoEvent> {
        let mut events = Vec::new();
        let Some(stream) = self.stream.as_ref() else {
            return events;
        };

        if matches!(
            self.state,
            PlaybackState::Loading | PlaybackState::Playing | PlaybackState::Paused
        ) && !stream.is_active()
        {
            self.state = PlaybackState::Ended;
            events.push(VideoEvent::Ended);
            return events;
        }

        if self.state == PlaybackState::Loading {
            if let Some(frame) = stream.current_frame() {
                let (width, height) = frame.dimensions();
                self.natural_size = Some((width, height));
                events.push(VideoEvent::CanPlay { width, height });

                if self.autoplay {
                    self.state = PlaybackState::Playing;
                    events.push(VideoEvent::Play);
                } else {
                    self.state = PlaybackState::Paused;
                }
            }
        }

        events
    }

    /// The frame currently shown, if playing.
    #[must_use]
    pub fn current_frame(&self) -> Option<VideoFrame> {
        if self.state != PlaybackState::Playing {
            return None;
        }
        self.stream.as_ref()?.current_frame()
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    /// Resumes playback. Returns true if a `Play` transition happened.
    pub fn play(&mut self) -> bool {
        if self.state == PlaybackState::Paused {
            self.state = PlaybackState::Playing;
            return true;
        }
        false
    }

    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    #[must_use]
    pub fn src(&self) -> Option<&ObjectUrl> {
        self.src.as_ref()
    }

    #[must_use]
    pub fn natural_size(&self) -> Option<(u32, u32)> {
        self.natural_size
    }

    #[must_use]
    pub fn has_source(&self) -> bool {
        self.src.is_some()
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.state == PlaybackState::Paused
    }

    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.state == PlaybackState::Ended
    }

    /// True once the natural size is known and the source is still bound.
    #[must_use]
    pub fn can_play(&self) -> bool {
        self.has_source() && self.natural_size.is_some()
    }

    #[must_use]
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    #[must_use]
    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }
}
