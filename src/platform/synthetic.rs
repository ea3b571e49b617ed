// SPDX-License-Identifier: MPL-2.0
//! In-process virtual camera.
//!
//! Produces an animated colour-bar pattern and lets the embedder decide how
//! requests resolve (grant, deny, failing enumeration, no capture support).
//! Requests can also be held at a gate until released, which makes it
//! possible to observe the coordinator while a request is outstanding.
//!
//! Every call is counted so tests can check how many capture requests were
//! issued and how many object URLs were created and revoked.

use crate::config::{SYNTHETIC_FRAME_HEIGHT, SYNTHETIC_FRAME_WIDTH};
use crate::error::CaptureError;
use crate::media::{
    DeviceKind, MediaConstraints, MediaDeviceInfo, MediaStream, MediaTrack, SharedStream,
    TrackKind, TrackState, VideoFrame,
};
use crate::platform::{MediaPlatform, ObjectUrl};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use image_rs::{Rgba, RgbaImage};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Semaphore;

pub const DEFAULT_CAMERA_ID: &str = "synthetic-camera";
pub const DEFAULT_MICROPHONE_ID: &str = "synthetic-microphone";

// White, yellow, cyan, green, magenta, red, blue
const BARS: [[u8; 3]; 7] = [
    [235, 235, 235],
    [235, 235, 16],
    [16, 235, 235],
    [16, 235, 16],
    [235, 16, 235],
    [235, 16, 16],
    [16, 16, 235],
];

/// How capture requests resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Grant,
    Deny(CaptureError),
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
pub struct SyntheticPlatformBuilder {
    supported: bool,
    devices: Vec<MediaDeviceInfo>,
    enumeration_error: Option<String>,
    frame_size: (u32, u32),
    outcome: Outcome,
    gated: bool,
    whole_stream_stop: bool,
}

impl Default for SyntheticPlatformBuilder {
    fn default() -> Self {
        Self {
            supported: true,
            devices: vec![
                MediaDeviceInfo::new(DEFAULT_MICROPHONE_ID, DeviceKind::AudioInput, "Synthetic Microphone"),
                MediaDeviceInfo::new(DEFAULT_CAMERA_ID, DeviceKind::VideoInput, "Synthetic Camera"),
            ],
            enumeration_error: None,
            frame_size: (SYNTHETIC_FRAME_WIDTH, SYNTHETIC_FRAME_HEIGHT),
            outcome: Outcome::Grant,
            gated: false,
            whole_stream_stop: false,
        }
    }
}

impl SyntheticPlatformBuilder {
    /// Reports no capture capability at all.
    #[must_use]
    pub fn unsupported(mut self) -> Self {
        self.supported = false;
        self
    }

    /// Replaces the enumerated devices.
    #[must_use]
    pub fn devices(mut self, devices: Vec<MediaDeviceInfo>) -> Self {
        self.devices = devices;
        self
    }

    /// Makes device enumeration fail with the given message.
    #[must_use]
    pub fn failing_enumeration(mut self, message: impl Into<String>) -> Self {
        self.enumeration_error = Some(message.into());
        self
    }

    /// Natural size of the produced video frames.
    #[must_use]
    pub fn frame_size(mut self, width: u32, height: u32) -> Self {
        self.frame_size = (width, height);
        self
    }

    #[must_use]
    pub fn deny(mut self, error: CaptureError) -> Self {
        self.outcome = Outcome::Deny(error);
        self
    }

    /// Holds every capture request until [`SyntheticPlatform::release_requests`].
    #[must_use]
    pub fn gated(mut self) -> Self {
        self.gated = true;
        self
    }

    /// Lets streams stop all their tracks in one call instead of track by track.
    #[must_use]
    pub fn whole_stream_stop(mut self, enabled: bool) -> Self {
        self.whole_stream_stop = enabled;
        self
    }

    #[must_use]
    pub fn build(self) -> SyntheticPlatform {
        SyntheticPlatform {
            shared: Arc::new(Shared {
                supported: self.supported,
                devices: self.devices,
                enumeration_error: self.enumeration_error,
                frame_size: self.frame_size,
                whole_stream_stop: self.whole_stream_stop,
                outcome: Mutex::new(self.outcome),
                gate: self.gated.then(|| Arc::new(Semaphore::new(0))),
                requests_issued: AtomicUsize::new(0),
                requests_in_flight: AtomicUsize::new(0),
                max_concurrent_requests: AtomicUsize::new(0),
                enumerations: AtomicUsize::new(0),
                next_id: AtomicU64::new(1),
                last_constraints: Mutex::new(None),
                streams: Mutex::new(Vec::new()),
                created_urls: Mutex::new(Vec::new()),
                revoked_urls: Mutex::new(Vec::new()),
            }),
        }
    }
}

#[derive(Debug)]
struct Shared {
    supported: bool,
    devices: Vec<MediaDeviceInfo>,
    enumeration_error: Option<String>,
    frame_size: (u32, u32),
    whole_stream_stop: bool,
    outcome: Mutex<Outcome>,
    gate: Option<Arc<Semaphore>>,
    requests_issued: AtomicUsize,
    requests_in_flight: AtomicUsize,
    max_concurrent_requests: AtomicUsize,
    enumerations: AtomicUsize,
    next_id: AtomicU64,
    last_constraints: Mutex<Option<MediaConstraints>>,
    streams: Mutex<Vec<Arc<SyntheticStream>>>,
    created_urls: Mutex<Vec<ObjectUrl>>,
    revoked_urls: Mutex<Vec<ObjectUrl>>,
}

impl Shared {
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn device_label(&self, kind: DeviceKind, source_id: Option<&str>) -> String {
        self.devices
            .iter()
            .filter(|device| device.kind == kind)
            .find(|device| source_id.is_none_or(|id| device.device_id == id))
            .or_else(|| self.devices.iter().find(|device| device.kind == kind))
            .map(|device| device.label.clone())
            .unwrap_or_else(|| match kind {
                DeviceKind::VideoInput => "Synthetic Camera".to_string(),
                _ => "Synthetic Microphone".to_string(),
            })
    }

    fn open_stream(&self, constraints: &MediaConstraints) -> Result<Arc<SyntheticStream>, CaptureError> {
        if constraints.is_empty() {
            return Err(CaptureError::Constraints(
                "at least one of audio and video must be requested".to_string(),
            ));
        }

        if let Outcome::Deny(error) = &*lock(&self.outcome) {
            return Err(error.clone());
        }

        let mut tracks = Vec::new();
        if let Some(video) = &constraints.video {
            let label = self.device_label(DeviceKind::VideoInput, video.source_id.as_deref());
            tracks.push(Arc::new(SyntheticTrack::new(
                format!("video-{}", self.next_id()),
                TrackKind::Video,
                label,
            )));
        }
        if let Some(audio) = &constraints.audio {
            let label = self.device_label(DeviceKind::AudioInput, audio.source_id.as_deref());
            tracks.push(Arc::new(SyntheticTrack::new(
                format!("audio-{}", self.next_id()),
                TrackKind::Audio,
                label,
            )));
        }

        let stream = Arc::new(SyntheticStream {
            id: format!("synthetic-stream-{}", self.next_id()),
            tracks,
            frame_size: self.frame_size,
            frame_counter: AtomicU64::new(0),
            whole_stream_stop: self.whole_stream_stop,
            whole_stops: AtomicUsize::new(0),
        });
        lock(&self.streams).push(Arc::clone(&stream));
        Ok(stream)
    }
}

/// Decrements the in-flight counter when a request resolves or is dropped.
struct InFlight(Arc<Shared>);

impl InFlight {
    fn enter(shared: Arc<Shared>) -> Self {
        let now = shared.requests_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        shared.max_concurrent_requests.fetch_max(now, Ordering::SeqCst);
        Self(shared)
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.requests_in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Virtual camera platform. Clones share their state and counters.
#[derive(Debug, Clone)]
pub struct SyntheticPlatform {
    shared: Arc<Shared>,
}

impl SyntheticPlatform {
    #[must_use]
    pub fn builder() -> SyntheticPlatformBuilder {
        SyntheticPlatformBuilder::default()
    }

    /// Changes how subsequent requests resolve.
    pub fn set_outcome(&self, outcome: Outcome) {
        *lock(&self.shared.outcome) = outcome;
    }

    /// Lets `count` gated requests proceed. No-op on an ungated platform.
    pub fn release_requests(&self, count: usize) {
        if let Some(gate) = &self.shared.gate {
            gate.add_permits(count);
        }
    }

    /// Number of capture requests issued so far.
    #[must_use]
    pub fn requests_issued(&self) -> usize {
        self.shared.requests_issued.load(Ordering::SeqCst)
    }

    /// Capture requests currently unresolved.
    #[must_use]
    pub fn requests_in_flight(&self) -> usize {
        self.shared.requests_in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously unresolved capture requests.
    #[must_use]
    pub fn max_concurrent_requests(&self) -> usize {
        self.shared.max_concurrent_requests.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn enumerations(&self) -> usize {
        self.shared.enumerations.load(Ordering::SeqCst)
    }

    /// Constraints of the most recent capture request.
    #[must_use]
    pub fn last_constraints(&self) -> Option<MediaConstraints> {
        lock(&self.shared.last_constraints).clone()
    }

    /// Every stream handed out so far.
    #[must_use]
    pub fn streams(&self) -> Vec<Arc<SyntheticStream>> {
        lock(&self.shared.streams).clone()
    }

    #[must_use]
    pub fn object_urls_created(&self) -> usize {
        lock(&self.shared.created_urls).len()
    }

    #[must_use]
    pub fn object_urls_revoked(&self) -> usize {
        lock(&self.shared.revoked_urls).len()
    }

    #[must_use]
    pub fn revoked_urls(&self) -> Vec<ObjectUrl> {
        lock(&self.shared.revoked_urls).clone()
    }
}

impl Default for SyntheticPlatform {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl MediaPlatform for SyntheticPlatform {
    fn has_capture_support(&self) -> bool {
        self.shared.supported
    }

    fn enumerate_devices(&self) -> BoxFuture<'static, Result<Vec<MediaDeviceInfo>, CaptureError>> {
        let shared = Arc::clone(&self.shared);
        shared.enumerations.fetch_add(1, Ordering::SeqCst);
        async move {
            match &shared.enumeration_error {
                Some(message) => Err(CaptureError::Enumeration(message.clone())),
                None => Ok(shared.devices.clone()),
            }
        }
        .boxed()
    }

    fn get_user_media(
        &self,
        constraints: MediaConstraints,
    ) -> BoxFuture<'static, Result<SharedStream, CaptureError>> {
        let shared = Arc::clone(&self.shared);
        shared.requests_issued.fetch_add(1, Ordering::SeqCst);
        *lock(&shared.last_constraints) = Some(constraints.clone());
        let in_flight = InFlight::enter(Arc::clone(&shared));

        async move {
            let _in_flight = in_flight;
            if !shared.supported {
                return Err(CaptureError::Unsupported);
            }
            if let Some(gate) = &shared.gate {
                gate.acquire()
                    .await
                    .map_err(|err| CaptureError::Other(err.to_string()))?
                    .forget();
            }
            let stream: SharedStream = shared.open_stream(&constraints)?;
            Ok(stream)
        }
        .boxed()
    }

    fn create_object_url(&self, stream: &SharedStream) -> ObjectUrl {
        let url = ObjectUrl::new(format!(
            "blob:synthetic/{}/{}",
            stream.id(),
            self.shared.next_id()
        ));
        lock(&self.shared.created_urls).push(url.clone());
        url
    }

    fn revoke_object_url(&self, url: &ObjectUrl) {
        lock(&self.shared.revoked_urls).push(url.clone());
    }
}

#[derive(Debug)]
pub struct SyntheticTrack {
    id: String,
    kind: TrackKind,
    label: String,
    live: AtomicBool,
    stop_calls: AtomicUsize,
}

impl SyntheticTrack {
    fn new(id: String, kind: TrackKind, label: String) -> Self {
        Self {
            id,
            kind,
            label,
            live: AtomicBool::new(true),
            stop_calls: AtomicUsize::new(0),
        }
    }

    /// How many times `stop` was called on this track.
    #[must_use]
    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    fn end(&self) {
        self.live.store(false, Ordering::SeqCst);
    }
}

impl MediaTrack for SyntheticTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn ready_state(&self) -> TrackState {
        if self.live.load(Ordering::SeqCst) {
            TrackState::Live
        } else {
            TrackState::Ended
        }
    }

    fn stop(&self) {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.end();
    }
}

#[derive(Debug)]
pub struct SyntheticStream {
    id: String,
    tracks: Vec<Arc<SyntheticTrack>>,
    frame_size: (u32, u32),
    frame_counter: AtomicU64,
    whole_stream_stop: bool,
    whole_stops: AtomicUsize,
}

impl SyntheticStream {
    /// True once every track has ended.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.tracks
            .iter()
            .all(|track| track.ready_state() == TrackState::Ended)
    }

    /// Total `stop` calls across all tracks.
    #[must_use]
    pub fn track_stop_calls(&self) -> usize {
        self.tracks.iter().map(|track| track.stop_calls()).sum()
    }

    /// Number of whole-stream stops.
    #[must_use]
    pub fn whole_stream_stops(&self) -> usize {
        self.whole_stops.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn has_audio(&self) -> bool {
        self.tracks.iter().any(|track| track.kind == TrackKind::Audio)
    }

    #[must_use]
    pub fn synthetic_tracks(&self) -> &[Arc<SyntheticTrack>] {
        &self.tracks
    }

    fn video_live(&self) -> bool {
        self.tracks
            .iter()
            .any(|track| track.kind == TrackKind::Video && track.ready_state() == TrackState::Live)
    }
}

/// Vertical colour bars scrolling one column per frame.
fn colour_bars(width: u32, height: u32, offset: u64) -> RgbaImage {
    let bar_width = (width / BARS.len() as u32).max(1);
    RgbaImage::from_fn(width, height, |x, _| {
        let column = (u64::from(x) + offset) % u64::from(width.max(1));
        let index = (column / u64::from(bar_width)) as usize % BARS.len();
        let [r, g, b] = BARS[index];
        Rgba([r, g, b, 255])
    })
}

impl MediaStream for SyntheticStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn tracks(&self) -> Vec<Arc<dyn MediaTrack>> {
        self.tracks
            .iter()
            .map(|track| Arc::clone(track) as Arc<dyn MediaTrack>)
            .collect()
    }

    fn current_frame(&self) -> Option<VideoFrame> {
        if !self.video_live() {
            return None;
        }
        let (width, height) = self.frame_size;
        let offset = self.frame_counter.fetch_add(1, Ordering::Relaxed);
        Some(VideoFrame::from_image(colour_bars(width, height, offset)))
    }

    fn stop_all(&self) -> bool {
        if !self.whole_stream_stop {
            return false;
        }
        self.whole_stops.fetch_add(1, Ordering::SeqCst);
        for track in &self.tracks {
            track.end();
        }
        true
    }
}
