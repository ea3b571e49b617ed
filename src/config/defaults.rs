// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! # Categories
//!
//! - **Frame loop**: Interval of the video-to-canvas copy
//! - **Surface**: Default component and canvas dimensions
//! - **Snapshot**: Encoder settings
//! - **Diagnostics**: Coordinator event buffer bounds
//! - **Synthetic camera**: Virtual device defaults

use std::time::Duration;

// ==========================================================================
// Frame Loop Defaults
// ==========================================================================

/// Period of the frame-copy loop in milliseconds (~30 fps).
pub const FRAME_INTERVAL_MS: u64 = 33;

/// Period of the frame-copy loop.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(FRAME_INTERVAL_MS);

// ==========================================================================
// Surface Defaults
// ==========================================================================

/// Default rendered width of the component.
pub const DEFAULT_WIDTH: u32 = 640;

/// Default rendered height of the component.
pub const DEFAULT_HEIGHT: u32 = 480;

/// Width of a canvas that has not been sized yet (HTML canvas default).
pub const CANVAS_DEFAULT_WIDTH: u32 = 300;

/// Height of a canvas that has not been sized yet (HTML canvas default).
pub const CANVAS_DEFAULT_HEIGHT: u32 = 150;

// ==========================================================================
// Snapshot Defaults
// ==========================================================================

/// Default JPEG quality, matching the browser default of 0.92.
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Minimum JPEG quality.
pub const MIN_JPEG_QUALITY: u8 = 1;

/// Maximum JPEG quality.
pub const MAX_JPEG_QUALITY: u8 = 100;

// ==========================================================================
// Diagnostics Defaults
// ==========================================================================

/// Default number of coordinator events kept in memory.
pub const DEFAULT_DIAGNOSTICS_BUFFER_CAPACITY: usize = 256;

/// Minimum diagnostics buffer capacity.
pub const MIN_DIAGNOSTICS_BUFFER_CAPACITY: usize = 16;

/// Maximum diagnostics buffer capacity.
pub const MAX_DIAGNOSTICS_BUFFER_CAPACITY: usize = 4096;

// ==========================================================================
// Synthetic Camera Defaults
// ==========================================================================

/// Frame width produced by the synthetic camera.
pub const SYNTHETIC_FRAME_WIDTH: u32 = 640;

/// Frame height produced by the synthetic camera.
pub const SYNTHETIC_FRAME_HEIGHT: u32 = 480;

// ==========================================================================
// Compile-time Validation
// ==========================================================================

const _: () = {
    assert!(FRAME_INTERVAL_MS > 0);

    assert!(DEFAULT_WIDTH > 0);
    assert!(DEFAULT_HEIGHT > 0);
    assert!(CANVAS_DEFAULT_WIDTH > 0);
    assert!(CANVAS_DEFAULT_HEIGHT > 0);

    assert!(MIN_JPEG_QUALITY > 0);
    assert!(MAX_JPEG_QUALITY >= MIN_JPEG_QUALITY);
    assert!(DEFAULT_JPEG_QUALITY >= MIN_JPEG_QUALITY);
    assert!(DEFAULT_JPEG_QUALITY <= MAX_JPEG_QUALITY);

    assert!(MIN_DIAGNOSTICS_BUFFER_CAPACITY > 0);
    assert!(MAX_DIAGNOSTICS_BUFFER_CAPACITY >= MIN_DIAGNOSTICS_BUFFER_CAPACITY);
    assert!(DEFAULT_DIAGNOSTICS_BUFFER_CAPACITY >= MIN_DIAGNOSTICS_BUFFER_CAPACITY);
    assert!(DEFAULT_DIAGNOSTICS_BUFFER_CAPACITY <= MAX_DIAGNOSTICS_BUFFER_CAPACITY);

    assert!(SYNTHETIC_FRAME_WIDTH > 0);
    assert!(SYNTHETIC_FRAME_HEIGHT > 0);
};
