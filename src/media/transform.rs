// SPDX-License-Identifier: MPL-2.0
//! Orientation of the copied video frame: quarter-turn rotation and mirroring.

use image_rs::{imageops, GenericImageView, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quarter-turn applied to the video frame before it is drawn on the canvas.
///
/// `Left` turns the picture 90° counter-clockwise, `Right` 90° clockwise.
/// Both swap the canvas width and height.
///
/// # Example
///
/// ```
/// use iced_webcam::media::RotateMode;
///
/// assert_eq!(RotateMode::None.canvas_size(640, 480), (640, 480));
/// assert_eq!(RotateMode::Left.canvas_size(640, 480), (480, 640));
/// assert_eq!("right".parse::<RotateMode>(), Ok(RotateMode::Right));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotateMode {
    #[default]
    #[serde(alias = "")]
    None,
    Left,
    Right,
}

impl RotateMode {
    /// Returns true if width and height are swapped on the canvas.
    #[must_use]
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, RotateMode::Left | RotateMode::Right)
    }

    /// Canvas size for a video of the given natural size.
    #[must_use]
    pub fn canvas_size(self, video_width: u32, video_height: u32) -> (u32, u32) {
        if self.swaps_dimensions() {
            (video_height, video_width)
        } else {
            (video_width, video_height)
        }
    }

    /// Signed angle in degrees (counter-clockwise is negative).
    #[must_use]
    pub fn degrees(self) -> i16 {
        match self {
            RotateMode::None => 0,
            RotateMode::Left => -90,
            RotateMode::Right => 90,
        }
    }

    /// Cycles None → Right → Left → None.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            RotateMode::None => RotateMode::Right,
            RotateMode::Right => RotateMode::Left,
            RotateMode::Left => RotateMode::None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RotateMode::None => "none",
            RotateMode::Left => "left",
            RotateMode::Right => "right",
        }
    }
}

impl fmt::Display for RotateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RotateMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(RotateMode::None),
            "left" => Ok(RotateMode::Left),
            "right" => Ok(RotateMode::Right),
            other => Err(format!("invalid rotate mode: {other}")),
        }
    }
}

/// Rotate an image 90 degrees counter-clockwise (left).
pub fn rotate_left<I>(image: &I) -> RgbaImage
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    imageops::rotate270(image)
}

/// Rotate an image 90 degrees clockwise (right).
pub fn rotate_right<I>(image: &I) -> RgbaImage
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    imageops::rotate90(image)
}

/// Flip an image horizontally (mirror left-to-right).
pub fn flip_horizontal<I>(image: &I) -> RgbaImage
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    imageops::flip_horizontal(image)
}

/// Applies the configured rotation, or returns `None` when there is nothing to do.
pub fn rotate<I>(image: &I, mode: RotateMode) -> Option<RgbaImage>
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    match mode {
        RotateMode::None => None,
        RotateMode::Left => Some(rotate_left(image)),
        RotateMode::Right => Some(rotate_right(image)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2x1 image: red on the left, blue on the right
    fn two_pixels() -> RgbaImage {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([0, 0, 255, 255]));
        img
    }

    #[test]
    fn canvas_size_swaps_for_quarter_turns() {
        assert_eq!(RotateMode::None.canvas_size(640, 480), (640, 480));
        assert_eq!(RotateMode::Left.canvas_size(640, 480), (480, 640));
        assert_eq!(RotateMode::Right.canvas_size(640, 480), (480, 640));
    }

    #[test]
    fn rotate_left_moves_left_column_to_bottom() {
        let rotated = rotate_left(&two_pixels());
        assert_eq!(rotated.dimensions(), (1, 2));
        assert_eq!(rotated.get_pixel(0, 1), &Rgba([255, 0, 0, 255]));
        assert_eq!(rotated.get_pixel(0, 0), &Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn rotate_right_moves_left_column_to_top() {
        let rotated = rotate_right(&two_pixels());
        assert_eq!(rotated.dimensions(), (1, 2));
        assert_eq!(rotated.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(rotated.get_pixel(0, 1), &Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn flip_horizontal_swaps_columns() {
        let flipped = flip_horizontal(&two_pixels());
        assert_eq!(flipped.get_pixel(0, 0), &Rgba([0, 0, 255, 255]));
        assert_eq!(flipped.get_pixel(1, 0), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn rotate_none_is_a_no_op() {
        assert!(rotate(&two_pixels(), RotateMode::None).is_none());
    }

    #[test]
    fn parses_legacy_empty_string_as_none() {
        assert_eq!("".parse::<RotateMode>(), Ok(RotateMode::None));
        assert_eq!("LEFT".parse::<RotateMode>(), Ok(RotateMode::Left));
        assert!("up".parse::<RotateMode>().is_err());
    }

    #[test]
    fn next_cycles_through_all_modes() {
        let mode = RotateMode::None.next();
        assert_eq!(mode, RotateMode::Right);
        assert_eq!(mode.next(), RotateMode::Left);
        assert_eq!(mode.next().next(), RotateMode::None);
    }
}
