// SPDX-License-Identifier: MPL-2.0
//! Media handling for the webcam: streams, frames, the hidden video surface
//! and the canvas frames are copied onto.

pub mod canvas;
pub mod constraints;
pub mod device;
pub mod frame;
pub mod frame_loop;
pub mod stream;
pub mod transform;
pub mod video_surface;

// Re-export commonly used types
pub use canvas::{snapshot_filename, Canvas, ScreenshotFormat};
pub use constraints::{MediaConstraints, TrackConstraints};
pub use device::{select_default_sources, DeviceKind, MediaDeviceInfo, SelectedSources};
pub use frame::VideoFrame;
pub use frame_loop::FrameLoop;
pub use stream::{stop_stream, MediaStream, MediaTrack, SharedStream, TrackKind, TrackState};
pub use transform::RotateMode;
pub use video_surface::{PlaybackState, VideoEvent, VideoSurface};
