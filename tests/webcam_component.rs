// SPDX-License-Identifier: MPL-2.0
//! Webcam component lifecycle against the synthetic camera.

use iced_webcam::capture::{AcquisitionStatus, CaptureManager, Mount};
use iced_webcam::error::CaptureError;
use iced_webcam::media::{stop_stream, Canvas, MediaConstraints, RotateMode, ScreenshotFormat};
use iced_webcam::platform::SyntheticPlatform;
use iced_webcam::ui::webcam::{Event, Webcam, WebcamProps};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct Harness {
    platform: SyntheticPlatform,
    manager: CaptureManager,
}

impl Harness {
    fn new(platform: SyntheticPlatform) -> Self {
        let manager = CaptureManager::new(Arc::new(platform.clone()));
        Self { platform, manager }
    }

    fn webcam(&self, props: WebcamProps) -> Webcam {
        Webcam::new(self.manager.clone(), props)
    }
}

/// Drives a mount to completion: awaits the acquisition if this instance
/// started it, then delivers every queued event.
async fn mount(webcam: &mut Webcam) -> Option<Mount> {
    let mut mount = webcam.register()?;
    if let Some(acquisition) = mount.acquisition.take() {
        acquisition.await;
    }
    deliver(webcam, &mut mount);
    Some(mount)
}

fn deliver(webcam: &mut Webcam, mount: &mut Mount) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = mount.events.try_recv() {
        events.push(webcam.handle_capture_event(event));
    }
    events
}

fn canvas_size(webcam: &Webcam) -> Option<(u32, u32)> {
    webcam.get_canvas().map(Canvas::dimensions)
}

#[tokio::test]
async fn default_props_size_canvas_to_video_and_notify_once() {
    let harness = Harness::new(SyntheticPlatform::builder().frame_size(640, 480).build());
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut webcam = harness.webcam(WebcamProps::default().on_user_media(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    mount(&mut webcam).await.expect("capture supported");
    webcam.poll_video();

    assert!(webcam.has_media());
    assert_eq!(canvas_size(&webcam), Some((640, 480)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(webcam.object_url().is_some());
}

#[tokio::test]
async fn left_rotation_swaps_canvas_dimensions() {
    let harness = Harness::new(SyntheticPlatform::builder().frame_size(640, 480).build());
    let mut webcam = harness.webcam(WebcamProps::default().rotate(RotateMode::Left));

    mount(&mut webcam).await.expect("capture supported");
    webcam.poll_video();

    assert_eq!(canvas_size(&webcam), Some((480, 640)));
}

#[tokio::test]
async fn changing_rotation_while_playing_resizes_the_canvas() {
    let harness = Harness::new(SyntheticPlatform::builder().frame_size(640, 480).build());
    let mut webcam = harness.webcam(WebcamProps::default());
    mount(&mut webcam).await.expect("capture supported");
    webcam.poll_video();

    webcam.set_rotate(RotateMode::Right);
    assert_eq!(canvas_size(&webcam), Some((480, 640)));
    webcam.set_rotate(RotateMode::Left);
    assert_eq!(canvas_size(&webcam), Some((480, 640)));
    webcam.set_rotate(RotateMode::None);
    assert_eq!(canvas_size(&webcam), Some((640, 480)));
}

#[tokio::test]
async fn rotation_before_canplay_waits_for_the_video() {
    let harness = Harness::new(SyntheticPlatform::builder().frame_size(640, 480).build());
    let mut webcam = harness.webcam(WebcamProps::default());
    mount(&mut webcam).await.expect("capture supported");

    // No canplay yet: the canvas keeps its default size
    webcam.set_rotate(RotateMode::Left);
    assert_eq!(canvas_size(&webcam), Some((300, 150)));

    webcam.poll_video();
    assert_eq!(canvas_size(&webcam), Some((480, 640)));
}

#[tokio::test]
async fn screenshot_matches_media_state_and_format() {
    let harness = Harness::new(SyntheticPlatform::builder().frame_size(32, 24).build());
    let mut webcam = harness.webcam(WebcamProps::default());
    assert!(webcam.get_screenshot().is_none());

    mount(&mut webcam).await.expect("capture supported");

    // Valid before the first frame is copied
    let before = webcam.get_screenshot().expect("has media");
    assert!(before.starts_with("data:image/webp;base64,"));

    webcam.poll_video();
    let generation = webcam.frame_loop().generation();
    assert!(webcam.tick(generation));

    for format in ScreenshotFormat::all() {
        webcam.set_screenshot_format(*format);
        let url = webcam.get_screenshot().expect("has media");
        assert!(url.starts_with(&format.data_url_prefix()), "{url:.40}");
    }
}

#[tokio::test]
async fn mirrored_frames_are_flipped_on_the_canvas() {
    // Separate cameras so both instances copy the same pattern frame
    let mut canvases = Vec::new();
    for mirror in [false, true] {
        let harness = Harness::new(SyntheticPlatform::builder().frame_size(70, 10).build());
        let mut webcam = harness.webcam(WebcamProps::default().mirror(mirror));
        mount(&mut webcam).await.expect("supported");
        webcam.poll_video();
        let generation = webcam.frame_loop().generation();
        assert!(webcam.tick(generation));
        canvases.push(webcam.get_canvas().expect("media").pixels().clone());
    }

    let (plain, mirrored) = (&canvases[0], &canvases[1]);
    assert_ne!(plain.get_pixel(5, 0), plain.get_pixel(35, 0));
    for x in 0..70 {
        assert_eq!(plain.get_pixel(x, 0), mirrored.get_pixel(69 - x, 0));
    }
}

#[tokio::test]
async fn failed_acquisition_leaves_instance_without_media() {
    let harness = Harness::new(
        SyntheticPlatform::builder()
            .deny(CaptureError::PermissionDenied)
            .build(),
    );
    let mut webcam = harness.webcam(WebcamProps::default());

    let mut mount = webcam.register().expect("supported");
    mount.acquisition.take().expect("starter").await;
    let events = deliver(&mut webcam, &mut mount);

    assert_eq!(events, vec![Event::UserMediaError(CaptureError::PermissionDenied)]);
    assert!(!webcam.has_media());
    assert!(webcam.get_screenshot().is_none());
    assert!(webcam.get_canvas().is_none());
    assert!(!webcam.frame_loop().is_running());
}

#[tokio::test]
async fn failed_instance_stays_without_media_when_others_mount() {
    let harness = Harness::new(
        SyntheticPlatform::builder()
            .failing_enumeration("device list unavailable")
            .build(),
    );
    let mut failed = harness.webcam(WebcamProps::default());
    let mut failed_mount = mount(&mut failed).await.expect("supported");
    assert!(!failed.has_media());

    // Explicit constraints skip enumeration, yet nothing is requested again
    let mut other = harness.webcam(WebcamProps::default().constraints(MediaConstraints::default()));
    let other_mount = mount(&mut other).await.expect("supported");
    assert!(other_mount.acquisition.is_none());
    assert!(!other.has_media());
    assert_eq!(harness.manager.status(), AcquisitionStatus::Denied);
    assert_eq!(harness.platform.requests_issued(), 0);

    let events = deliver(&mut failed, &mut failed_mount);
    assert!(!events.contains(&Event::UserMedia));
    assert!(!failed.has_media());
    assert!(failed.get_screenshot().is_none());
}

#[tokio::test]
async fn last_unmount_stops_tracks_and_revokes_once() {
    let harness = Harness::new(SyntheticPlatform::default());
    let mut first = harness.webcam(WebcamProps::default());
    let mut second = harness.webcam(WebcamProps::default());

    let mut first_mount = first.register().expect("supported");
    let mut second_mount = second.register().expect("supported");
    assert!(second_mount.acquisition.is_none());
    first_mount.acquisition.take().expect("starter").await;
    deliver(&mut first, &mut first_mount);
    deliver(&mut second, &mut second_mount);
    assert!(first.has_media() && second.has_media());

    assert!(!first.unmount());
    let stream = harness.platform.streams()[0].clone();
    assert!(!stream.is_stopped());
    assert_eq!(harness.platform.object_urls_revoked(), 0);
    assert!(second.has_media());

    assert!(second.unmount());
    assert!(stream.is_stopped());
    assert_eq!(harness.platform.object_urls_revoked(), 1);
    assert_eq!(harness.manager.status(), AcquisitionStatus::Idle);

    drop(first);
    drop(second);
    assert_eq!(harness.platform.object_urls_revoked(), 1);
}

#[tokio::test]
async fn late_instance_shares_the_granted_stream() {
    let harness = Harness::new(SyntheticPlatform::default());
    let mut first = harness.webcam(WebcamProps::default());
    mount(&mut first).await.expect("supported");

    let mut late = harness.webcam(WebcamProps::default());
    let late_mount = mount(&mut late).await.expect("supported");
    assert!(late_mount.acquisition.is_none());
    assert!(late.has_media());
    assert_eq!(late.object_url(), first.object_url());
    assert_eq!(harness.platform.requests_issued(), 1);
}

#[tokio::test]
async fn unsupported_platform_never_requests() {
    let harness = Harness::new(SyntheticPlatform::builder().unsupported().build());
    let mut webcam = harness.webcam(WebcamProps::default());

    assert!(mount(&mut webcam).await.is_none());
    assert!(!webcam.has_media());
    assert_eq!(harness.platform.requests_issued(), 0);
    assert_eq!(harness.manager.mounted_count(), 0);
}

#[tokio::test]
async fn stream_ending_before_first_frame_stops_polling() {
    let harness = Harness::new(SyntheticPlatform::default());
    let mut webcam = harness.webcam(WebcamProps::default());
    mount(&mut webcam).await.expect("supported");

    let stream = harness.platform.streams()[0].clone();
    stop_stream(stream.as_ref());
    webcam.poll_video();

    assert!(webcam.video().is_ended());
    assert!(!webcam.frame_loop().is_running());
    assert_eq!(canvas_size(&webcam), Some((300, 150)));
}

#[tokio::test]
async fn stale_ticks_after_unmount_draw_nothing() {
    let harness = Harness::new(SyntheticPlatform::default());
    let mut webcam = harness.webcam(WebcamProps::default());
    mount(&mut webcam).await.expect("supported");
    webcam.poll_video();
    let generation = webcam.frame_loop().generation();

    webcam.unmount();
    assert!(!webcam.tick(generation));
    assert_eq!(webcam.frame_loop().ticks(), 0);
}
