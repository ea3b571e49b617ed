// SPDX-License-Identifier: MPL-2.0
//! The drawing surface video frames are copied onto, and its export to
//! still images.
//!
//! The canvas behaves like an HTML canvas: it starts at 300×150 fully
//! transparent pixels, resizing clears it, and drawing a frame only
//! overwrites the covered area.

use crate::config::{CANVAS_DEFAULT_HEIGHT, CANVAS_DEFAULT_WIDTH};
use crate::error::Result;
use crate::media::frame::VideoFrame;
use crate::media::transform::{self, RotateMode};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use iced::widget::image;
use image_rs::codecs::jpeg::JpegEncoder;
use image_rs::{imageops, DynamicImage, GenericImageView, ImageFormat, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;
use std::str::FromStr;

/// Encodings available for snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenshotFormat {
    /// WebP (lossless with the bundled encoder).
    #[default]
    #[serde(alias = "image/webp")]
    WebP,
    #[serde(alias = "image/png")]
    Png,
    #[serde(alias = "image/jpeg")]
    Jpeg,
}

impl ScreenshotFormat {
    /// MIME type used in the data URL prefix.
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            ScreenshotFormat::WebP => "image/webp",
            ScreenshotFormat::Png => "image/png",
            ScreenshotFormat::Jpeg => "image/jpeg",
        }
    }

    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            ScreenshotFormat::WebP => "webp",
            ScreenshotFormat::Png => "png",
            ScreenshotFormat::Jpeg => "jpg",
        }
    }

    /// The `data:` prefix every snapshot in this format starts with.
    #[must_use]
    pub fn data_url_prefix(self) -> String {
        format!("data:{};base64,", self.mime_type())
    }

    #[must_use]
    pub fn all() -> &'static [ScreenshotFormat] {
        &[
            ScreenshotFormat::WebP,
            ScreenshotFormat::Png,
            ScreenshotFormat::Jpeg,
        ]
    }

    fn image_format(self) -> ImageFormat {
        match self {
            ScreenshotFormat::WebP => ImageFormat::WebP,
            ScreenshotFormat::Png => ImageFormat::Png,
            ScreenshotFormat::Jpeg => ImageFormat::Jpeg,
        }
    }
}

impl FromStr for ScreenshotFormat {
    type Err = String;

    /// Accepts MIME types (`image/png`) as well as extensions (`png`, `jpg`).
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match lower.strip_prefix("image/").unwrap_or(&lower) {
            "webp" => Ok(ScreenshotFormat::WebP),
            "png" => Ok(ScreenshotFormat::Png),
            "jpeg" | "jpg" => Ok(ScreenshotFormat::Jpeg),
            _ => Err(format!("unsupported screenshot format: {s}")),
        }
    }
}

/// RGBA surface holding the most recently copied video frame.
#[derive(Debug, Clone)]
pub struct Canvas {
    pixels: RgbaImage,
    handle: image::Handle,
}

impl Canvas {
    /// Creates a transparent canvas of the default 300×150 size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_size(CANVAS_DEFAULT_WIDTH, CANVAS_DEFAULT_HEIGHT)
    }

    #[must_use]
    pub fn with_size(width: u32, height: u32) -> Self {
        let pixels = RgbaImage::new(width, height);
        let handle = image::Handle::from_rgba(width, height, pixels.as_raw().clone());
        Self { pixels, handle }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Resizes the canvas. Like an HTML canvas, this clears it even when the
    /// size does not change.
    pub fn set_size(&mut self, width: u32, height: u32) {
        *self = Self::with_size(width, height);
    }

    /// Direct pixel access.
    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Image handle for rendering the canvas in an Iced view.
    #[must_use]
    pub fn handle(&self) -> &image::Handle {
        &self.handle
    }

    /// Copies a video frame onto the canvas.
    ///
    /// The frame is rotated first (the compensating translation keeps the
    /// rotated frame anchored at the top-left corner), then mirrored around
    /// the canvas width. Parts falling outside the canvas are clipped.
    /// Returns false when the frame buffer is malformed.
    pub fn draw_frame(&mut self, frame: &VideoFrame, mirror: bool, rotate: RotateMode) -> bool {
        let Some(source) = frame.as_image() else {
            return false;
        };

        match transform::rotate(&source, rotate) {
            Some(rotated) => self.blit(&rotated, mirror),
            None => self.blit(&source, mirror),
        }

        self.handle = image::Handle::from_rgba(
            self.pixels.width(),
            self.pixels.height(),
            self.pixels.as_raw().clone(),
        );
        true
    }

    fn blit<I>(&mut self, image: &I, mirror: bool)
    where
        I: GenericImageView<Pixel = Rgba<u8>>,
    {
        if mirror {
            let flipped = transform::flip_horizontal(image);
            let x = i64::from(self.pixels.width()) - i64::from(flipped.width());
            imageops::replace(&mut self.pixels, &flipped, x, 0);
        } else {
            imageops::replace(&mut self.pixels, image, 0, 0);
        }
    }

    /// Encodes the canvas. `quality` only affects JPEG.
    ///
    /// # Errors
    ///
    /// Returns an error if the encoder rejects the image.
    pub fn encode(&self, format: ScreenshotFormat, quality: u8) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();

        // JPEG has no alpha channel
        if format == ScreenshotFormat::Jpeg {
            let rgb = DynamicImage::ImageRgba8(self.pixels.clone()).to_rgb8();
            let encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
            rgb.write_with_encoder(encoder)?;
        } else {
            self.pixels
                .write_to(&mut Cursor::new(&mut bytes), format.image_format())?;
        }

        Ok(bytes)
    }

    /// Encodes the canvas as a `data:<mime>;base64,...` URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the encoder rejects the image.
    pub fn to_data_url(&self, format: ScreenshotFormat, quality: u8) -> Result<String> {
        let bytes = self.encode(format, quality)?;
        Ok(format!(
            "{}{}",
            format.data_url_prefix(),
            STANDARD.encode(bytes)
        ))
    }

    /// Writes the canvas to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be encoded or written to disk.
    pub fn save_to_file<P: AsRef<Path>>(
        &self,
        path: P,
        format: ScreenshotFormat,
        quality: u8,
    ) -> Result<()> {
        let bytes = self.encode(format, quality)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

/// Generates a file name for a saved snapshot.
///
/// Format: `snapshot_{YYYYmmdd-HHMMSS-mmm}.{ext}`
#[must_use]
pub fn snapshot_filename(taken_at: chrono::DateTime<chrono::Local>, format: ScreenshotFormat) -> String {
    format!(
        "snapshot_{}.{}",
        taken_at.format("%Y%m%d-%H%M%S-%3f"),
        format.extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Arc;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    // 4x2 frame: left half red, right half blue
    fn split_frame() -> VideoFrame {
        let image = RgbaImage::from_fn(4, 2, |x, _| if x < 2 { RED } else { BLUE });
        VideoFrame::from_image(image)
    }

    #[test]
    fn new_canvas_uses_html_defaults() {
        let canvas = Canvas::new();
        assert_eq!(canvas.dimensions(), (300, 150));
        assert!(canvas.pixels().pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn set_size_clears_pixels() {
        let mut canvas = Canvas::with_size(4, 2);
        assert!(canvas.draw_frame(&split_frame(), false, RotateMode::None));
        canvas.set_size(4, 2);
        assert_eq!(canvas.pixels().get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn draw_frame_copies_pixels_unchanged() {
        let mut canvas = Canvas::with_size(4, 2);
        canvas.draw_frame(&split_frame(), false, RotateMode::None);
        assert_eq!(canvas.pixels().get_pixel(0, 0), &RED);
        assert_eq!(canvas.pixels().get_pixel(3, 1), &BLUE);
    }

    #[test]
    fn draw_frame_mirrors_horizontally() {
        let mut canvas = Canvas::with_size(4, 2);
        canvas.draw_frame(&split_frame(), true, RotateMode::None);
        assert_eq!(canvas.pixels().get_pixel(0, 0), &BLUE);
        assert_eq!(canvas.pixels().get_pixel(3, 0), &RED);
    }

    #[test]
    fn draw_frame_rotates_left_into_swapped_canvas() {
        let mut canvas = Canvas::with_size(2, 4);
        canvas.draw_frame(&split_frame(), false, RotateMode::Left);
        // Counter-clockwise: the left (red) half ends up at the bottom
        assert_eq!(canvas.pixels().get_pixel(0, 3), &RED);
        assert_eq!(canvas.pixels().get_pixel(1, 0), &BLUE);
    }

    #[test]
    fn draw_frame_rotates_right_into_swapped_canvas() {
        let mut canvas = Canvas::with_size(2, 4);
        canvas.draw_frame(&split_frame(), false, RotateMode::Right);
        assert_eq!(canvas.pixels().get_pixel(0, 0), &RED);
        assert_eq!(canvas.pixels().get_pixel(1, 3), &BLUE);
    }

    #[test]
    fn mirror_is_anchored_to_canvas_width() {
        // Canvas wider than the frame: the mirrored frame lands on the right edge
        let mut canvas = Canvas::with_size(6, 2);
        canvas.draw_frame(&split_frame(), true, RotateMode::None);
        assert_eq!(canvas.pixels().get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
        assert_eq!(canvas.pixels().get_pixel(2, 0), &BLUE);
        assert_eq!(canvas.pixels().get_pixel(5, 0), &RED);
    }

    #[test]
    fn draw_frame_rejects_malformed_buffers() {
        let mut canvas = Canvas::with_size(4, 2);
        let broken = VideoFrame::new(Arc::new(vec![0u8; 3]), 4, 2);
        assert!(!canvas.draw_frame(&broken, false, RotateMode::None));
    }

    #[test]
    fn data_url_starts_with_format_prefix() {
        let mut canvas = Canvas::with_size(4, 2);
        canvas.draw_frame(&split_frame(), false, RotateMode::None);
        for format in ScreenshotFormat::all() {
            let url = canvas.to_data_url(*format, 92).expect("encoding should succeed");
            assert!(url.starts_with(&format!("data:{};base64,", format.mime_type())));
            assert!(url.len() > format.data_url_prefix().len());
        }
    }

    #[test]
    fn png_export_decodes_back_to_canvas_pixels() {
        let mut canvas = Canvas::with_size(4, 2);
        canvas.draw_frame(&split_frame(), false, RotateMode::None);
        let bytes = canvas.encode(ScreenshotFormat::Png, 92).expect("png encoding");
        let decoded = image_rs::load_from_memory(&bytes).expect("decodable").to_rgba8();
        assert_eq!(&decoded, canvas.pixels());
    }

    #[test]
    fn save_to_file_writes_encoded_image() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("snap.jpg");
        Canvas::with_size(8, 8)
            .save_to_file(&path, ScreenshotFormat::Jpeg, 80)
            .expect("save should succeed");
        let bytes = std::fs::read(&path).expect("file exists");
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn format_parses_mime_types_and_extensions() {
        assert_eq!("image/webp".parse::<ScreenshotFormat>(), Ok(ScreenshotFormat::WebP));
        assert_eq!("PNG".parse::<ScreenshotFormat>(), Ok(ScreenshotFormat::Png));
        assert_eq!("jpg".parse::<ScreenshotFormat>(), Ok(ScreenshotFormat::Jpeg));
        assert!("image/gif".parse::<ScreenshotFormat>().is_err());
    }

    #[test]
    fn default_format_is_webp() {
        assert_eq!(ScreenshotFormat::default(), ScreenshotFormat::WebP);
    }

    #[test]
    fn snapshot_filename_uses_timestamp_and_extension() {
        let taken_at = chrono::Local
            .with_ymd_and_hms(2024, 3, 5, 14, 7, 9)
            .single()
            .expect("unambiguous local time");
        assert_eq!(
            snapshot_filename(taken_at, ScreenshotFormat::Png),
            "snapshot_20240305-140709-000.png"
        );
    }
}
