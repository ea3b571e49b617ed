// SPDX-License-Identifier: MPL-2.0
//! Decoded video frames handed from a stream to the canvas.

use image_rs::{ImageBuffer, Rgba, RgbaImage};
use std::sync::Arc;

/// A single RGBA video frame.
///
/// Uses `Arc<Vec<u8>>` so frames can be passed between the stream and the
/// canvas without copying the pixel data.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    /// RGBA pixel data, row-major, 4 bytes per pixel.
    pub rgba_data: Arc<Vec<u8>>,
    pub width: u32,
    pub height: u32,
}

impl VideoFrame {
    #[must_use]
    pub fn new(rgba_data: Arc<Vec<u8>>, width: u32, height: u32) -> Self {
        Self {
            rgba_data,
            width,
            height,
        }
    }

    /// Wraps an owned image without copying its pixels.
    #[must_use]
    pub fn from_image(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(Arc::new(image.into_raw()), width, height)
    }

    /// Borrows the pixel data as an image view.
    ///
    /// Returns `None` when the buffer length does not match the dimensions.
    #[must_use]
    pub fn as_image(&self) -> Option<ImageBuffer<Rgba<u8>, &[u8]>> {
        ImageBuffer::from_raw(self.width, self.height, self.rgba_data.as_slice())
    }

    /// Natural size of the frame.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
