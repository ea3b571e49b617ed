// SPDX-License-Identifier: MPL-2.0
//! Webcam component.
//!
//! Each instance registers with a shared [`CaptureManager`], binds the
//! granted stream to a hidden [`VideoSurface`], and copies frames onto a
//! [`Canvas`] every 33 ms while the video plays. The canvas is what gets
//! rendered and what snapshots are taken from.
//!
//! Lifecycle: call [`Webcam::mount`] once when the instance enters the UI and
//! route its messages back through [`Webcam::update`]; call
//! [`Webcam::unmount`] when it leaves. The last instance to unmount releases
//! the devices.

mod props;

pub use props::{Dimension, StyleFn, UserMediaCallback, WebcamProps};

use crate::capture::{AcquisitionOutcome, CaptureEvent, CaptureManager, Grant, ListenerId, Mount};
use crate::config::{FRAME_INTERVAL, MAX_JPEG_QUALITY, MIN_JPEG_QUALITY};
use crate::error::CaptureError;
use crate::media::{Canvas, FrameLoop, RotateMode, ScreenshotFormat, SharedStream, VideoEvent, VideoSurface};
use crate::platform::ObjectUrl;
use futures_util::stream;
use iced::widget::{container, image};
use iced::{Element, Subscription, Task};
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub enum Message {
    /// Outcome delivered by the coordinator to this listener.
    Capture(ListenerId, CaptureEvent),
    /// The acquisition started by this instance resolved.
    AcquisitionFinished(AcquisitionOutcome),
    /// Check the video surface for `canplay`/`play`/`ended`.
    PollVideo(ListenerId),
    Tick { listener: ListenerId, generation: u64 },
}

/// Notifications for the parent.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    None,
    /// The shared stream was delivered to this instance.
    UserMedia,
    /// Acquisition failed; the instance stays without media.
    UserMediaError(CaptureError),
}

pub struct Webcam {
    manager: CaptureManager,
    props: WebcamProps,
    listener: Option<ListenerId>,
    has_media: bool,
    grant: Option<Grant>,
    video: VideoSurface,
    canvas: Canvas,
    frame_loop: FrameLoop,
}

impl std::fmt::Debug for Webcam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Webcam")
            .field("listener", &self.listener)
            .field("has_media", &self.has_media)
            .field("props", &self.props)
            .field("video", &self.video.state())
            .field("canvas", &self.canvas.dimensions())
            .field("frame_loop", &self.frame_loop)
            .finish()
    }
}

impl Webcam {
    #[must_use]
    pub fn new(manager: CaptureManager, props: WebcamProps) -> Self {
        let video = VideoSurface::new(props.muted).with_class_name(props.class_name.clone());
        Self {
            manager,
            props,
            listener: None,
            has_media: false,
            grant: None,
            video,
            canvas: Canvas::new(),
            frame_loop: FrameLoop::new(FRAME_INTERVAL),
        }
    }

    /// Registers with the coordinator without scheduling anything.
    ///
    /// Returns `None` when the platform cannot capture or the instance is
    /// already registered. The caller is responsible for driving the
    /// acquisition future and feeding events to
    /// [`handle_capture_event`](Self::handle_capture_event).
    pub fn register(&mut self) -> Option<Mount> {
        if self.listener.is_some() {
            return None;
        }
        let mount = self.manager.mount(self.props.acquisition_request())?;
        self.listener = Some(mount.id);
        Some(mount)
    }

    /// Mounts the instance and returns the tasks delivering capture events.
    pub fn mount(&mut self) -> Task<Message> {
        let Some(Mount {
            id,
            events,
            acquisition,
        }) = self.register()
        else {
            return Task::none();
        };

        let events = Task::run(receiver_stream(events), move |event| Message::Capture(id, event));
        match acquisition {
            Some(acquisition) => Task::batch([
                events,
                Task::perform(acquisition, Message::AcquisitionFinished),
            ]),
            None => events,
        }
    }

    /// Stops the frame loop and deregisters. Returns true if this released
    /// the shared stream.
    pub fn unmount(&mut self) -> bool {
        self.frame_loop.cancel();
        let Some(id) = self.listener.take() else {
            return false;
        };
        self.video.clear();
        self.grant = None;
        self.has_media = false;
        self.manager.unmount(id)
    }

    pub fn update(&mut self, message: Message) -> Event {
        match message {
            Message::Capture(id, event) => {
                if self.listener != Some(id) {
                    return Event::None;
                }
                self.handle_capture_event(event)
            }
            Message::AcquisitionFinished(outcome) => {
                tracing::debug!(?outcome, "acquisition finished");
                Event::None
            }
            Message::PollVideo(id) => {
                if self.listener == Some(id) {
                    self.poll_video();
                }
                Event::None
            }
            Message::Tick {
                listener,
                generation,
            } => {
                if self.listener == Some(listener) {
                    self.tick(generation);
                }
                Event::None
            }
        }
    }

    /// Applies a coordinator outcome to this instance.
    pub fn handle_capture_event(&mut self, event: CaptureEvent) -> Event {
        if self.listener.is_none() {
            return Event::None;
        }
        match event {
            CaptureEvent::Granted(grant) => {
                self.video.load(grant.url.clone(), grant.stream.clone());
                self.grant = Some(grant);
                self.has_media = true;
                if let Some(callback) = &self.props.on_user_media {
                    callback();
                }
                Event::UserMedia
            }
            CaptureEvent::Failed(error) => {
                self.has_media = false;
                Event::UserMediaError(error)
            }
        }
    }

    /// Polls the video surface and reacts to its events.
    pub fn poll_video(&mut self) {
        for event in self.video.poll() {
            match event {
                VideoEvent::CanPlay { width, height } => {
                    tracing::debug!(width, height, "video can play");
                    self.resize_canvas();
                }
                VideoEvent::Play => self.frame_loop.start(),
                VideoEvent::Ended => {
                    self.frame_loop.cancel();
                }
            }
        }
    }

    /// One iteration of the frame copy. Returns true if a frame was drawn.
    pub fn tick(&mut self, generation: u64) -> bool {
        if !self.frame_loop.accept_tick(generation) {
            return false;
        }
        self.poll_video();

        if !self.video.has_source() || self.video.is_paused() || self.video.is_ended() {
            self.frame_loop.cancel();
            return false;
        }

        match self.video.current_frame() {
            Some(frame) => self
                .canvas
                .draw_frame(&frame, self.props.mirror, self.props.rotate),
            None => false,
        }
    }

    fn resize_canvas(&mut self) {
        if let Some((width, height)) = self.video.natural_size() {
            let (width, height) = self.props.rotate.canvas_size(width, height);
            self.canvas.set_size(width, height);
        }
    }

    /// Changes the rotation. The canvas is resized right away once the video
    /// can play.
    pub fn set_rotate(&mut self, rotate: RotateMode) {
        self.props.rotate = rotate;
        if self.video.can_play() {
            self.resize_canvas();
        }
    }

    pub fn set_mirror(&mut self, mirror: bool) {
        self.props.mirror = mirror;
    }

    pub fn set_screenshot_format(&mut self, format: ScreenshotFormat) {
        self.props.screenshot_format = format;
    }

    pub fn set_screenshot_quality(&mut self, quality: u8) {
        self.props.screenshot_quality = quality.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.props.muted = muted;
        self.video.set_muted(muted);
    }

    /// The canvas as a `data:` URL in the configured format, `None` without media.
    #[must_use]
    pub fn get_screenshot(&self) -> Option<String> {
        if !self.has_media {
            return None;
        }
        match self
            .canvas
            .to_data_url(self.props.screenshot_format, self.props.screenshot_quality)
        {
            Ok(url) => Some(url),
            Err(err) => {
                tracing::warn!(%err, format = self.props.screenshot_format.mime_type(), "snapshot encoding failed");
                None
            }
        }
    }

    /// The canvas frames are copied onto, `None` without media.
    #[must_use]
    pub fn get_canvas(&self) -> Option<&Canvas> {
        self.has_media.then_some(&self.canvas)
    }

    #[must_use]
    pub fn has_media(&self) -> bool {
        self.has_media
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.listener.is_some()
    }

    #[must_use]
    pub fn listener(&self) -> Option<ListenerId> {
        self.listener
    }

    #[must_use]
    pub fn props(&self) -> &WebcamProps {
        &self.props
    }

    #[must_use]
    pub fn stream(&self) -> Option<&SharedStream> {
        self.grant.as_ref().map(|grant| &grant.stream)
    }

    #[must_use]
    pub fn object_url(&self) -> Option<&ObjectUrl> {
        self.grant.as_ref().map(|grant| &grant.url)
    }

    #[must_use]
    pub fn video(&self) -> &VideoSurface {
        &self.video
    }

    #[must_use]
    pub fn frame_loop(&self) -> &FrameLoop {
        &self.frame_loop
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let Some(listener) = self.listener else {
            return Subscription::none();
        };

        let frames = if self.frame_loop.is_running() {
            iced::time::every(self.frame_loop.interval())
                .with((listener, self.frame_loop.generation()))
                .map(|((listener, generation), _)| Message::Tick {
                    listener,
                    generation,
                })
        } else {
            Subscription::none()
        };

        // Wait for the first frame, or for playback to resume
        let polling = if self.video.has_source() && !self.frame_loop.is_running() && !self.video.is_ended() {
            iced::time::every(FRAME_INTERVAL)
                .with(listener)
                .map(|(listener, _)| Message::PollVideo(listener))
        } else {
            Subscription::none()
        };

        Subscription::batch([frames, polling])
    }

    pub fn view(&self) -> Element<'_, Message> {
        let surface = image(self.canvas.handle().clone())
            .width(self.props.width.to_length())
            .height(self.props.height.to_length());

        let mut content = container(surface)
            .width(self.props.width.to_length())
            .height(self.props.height.to_length());
        if let Some(style) = self.props.style {
            content = content.style(style);
        }
        content.into()
    }
}

impl Drop for Webcam {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn receiver_stream(
    events: mpsc::UnboundedReceiver<CaptureEvent>,
) -> impl futures_util::Stream<Item = CaptureEvent> {
    stream::unfold(events, |mut events| async move {
        events.recv().await.map(|event| (event, events))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::SyntheticPlatform;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    async fn mounted(platform: &SyntheticPlatform, props: WebcamProps) -> Webcam {
        let manager = CaptureManager::new(Arc::new(platform.clone()));
        let mut webcam = Webcam::new(manager, props);
        let mut mount = webcam.register().expect("supported");
        if let Some(acquisition) = mount.acquisition.take() {
            acquisition.await;
        }
        while let Ok(event) = mount.events.try_recv() {
            webcam.handle_capture_event(event);
        }
        webcam
    }

    #[tokio::test]
    async fn granted_stream_starts_the_frame_loop() {
        let platform = SyntheticPlatform::builder().frame_size(64, 48).build();
        let mut webcam = mounted(&platform, WebcamProps::default()).await;
        assert!(webcam.has_media());
        assert!(!webcam.frame_loop().is_running());

        webcam.poll_video();
        assert!(webcam.frame_loop().is_running());
        assert_eq!(webcam.get_canvas().map(Canvas::dimensions), Some((64, 48)));

        let generation = webcam.frame_loop().generation();
        assert!(webcam.tick(generation));
        assert_eq!(webcam.frame_loop().ticks(), 1);
    }

    #[tokio::test]
    async fn callback_runs_once_per_grant() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let platform = SyntheticPlatform::default();
        let props = WebcamProps::default().on_user_media(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let _webcam = mounted(&platform, props).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn ended_video_stops_the_loop() {
        let platform = SyntheticPlatform::default();
        let mut webcam = mounted(&platform, WebcamProps::default()).await;
        webcam.poll_video();
        let generation = webcam.frame_loop().generation();

        let stream = webcam.stream().cloned().expect("granted");
        crate::media::stop_stream(stream.as_ref());

        assert!(!webcam.tick(generation));
        assert!(!webcam.frame_loop().is_running());
    }

    #[tokio::test]
    async fn messages_for_other_listeners_are_ignored() {
        let platform = SyntheticPlatform::builder()
            .deny(CaptureError::PermissionDenied)
            .build();
        let mut webcam = mounted(&platform, WebcamProps::default()).await;
        let stranger = webcam
            .manager
            .mount(webcam.props.acquisition_request())
            .expect("supported")
            .id;

        let event = webcam.update(Message::Capture(
            stranger,
            CaptureEvent::Failed(CaptureError::DeviceBusy),
        ));
        assert_eq!(event, Event::None);
    }

    #[tokio::test]
    async fn unmount_releases_and_clears_media() {
        let platform = SyntheticPlatform::default();
        let mut webcam = mounted(&platform, WebcamProps::default()).await;
        webcam.poll_video();

        assert!(webcam.unmount());
        assert!(!webcam.has_media());
        assert!(!webcam.frame_loop().is_running());
        assert!(webcam.get_screenshot().is_none());
        assert!(!webcam.unmount());
        assert_eq!(platform.object_urls_revoked(), 1);
    }

    #[test]
    fn unsupported_platform_mounts_nothing() {
        let platform = SyntheticPlatform::builder().unsupported().build();
        let manager = CaptureManager::new(Arc::new(platform));
        let mut webcam = Webcam::new(manager, WebcamProps::default());
        assert!(webcam.register().is_none());
        assert!(!webcam.is_mounted());
        assert!(webcam.get_canvas().is_none());
    }
}
