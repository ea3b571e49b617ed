// SPDX-License-Identifier: MPL-2.0
//! Embedder-facing configuration of a webcam instance.

use crate::capture::AcquisitionRequest;
use crate::config::{Config, DEFAULT_HEIGHT, DEFAULT_JPEG_QUALITY, DEFAULT_WIDTH, MAX_JPEG_QUALITY, MIN_JPEG_QUALITY};
use crate::media::{MediaConstraints, RotateMode, ScreenshotFormat};
use iced::widget::container;
use iced::{Length, Theme};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Rendered size along one axis: a pixel count or a CSS-like string
/// (`"100%"`, `"auto"`, `"320px"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    Pixels(u32),
    Css(String),
}

impl Dimension {
    /// Maps the dimension onto an Iced length.
    ///
    /// Percentages fill the available space, `auto` and unrecognised strings
    /// shrink to the content.
    #[must_use]
    pub fn to_length(&self) -> Length {
        match self {
            Dimension::Pixels(px) => Length::Fixed(*px as f32),
            Dimension::Css(value) => {
                let value = value.trim();
                if value.ends_with('%') {
                    return Length::Fill;
                }
                value
                    .trim_end_matches("px")
                    .trim()
                    .parse::<f32>()
                    .ok()
                    .filter(|px| px.is_finite() && *px >= 0.0)
                    .map_or(Length::Shrink, Length::Fixed)
            }
        }
    }
}

impl From<u32> for Dimension {
    fn from(px: u32) -> Self {
        Dimension::Pixels(px)
    }
}

impl From<&str> for Dimension {
    fn from(value: &str) -> Self {
        Dimension::Css(value.to_string())
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Pixels(px) => write!(f, "{px}"),
            Dimension::Css(value) => f.write_str(value),
        }
    }
}

/// Invoked once per instance when the shared stream is delivered.
pub type UserMediaCallback = Arc<dyn Fn() + Send + Sync>;

/// Container style applied around the rendered canvas.
pub type StyleFn = fn(&Theme) -> container::Style;

/// Configuration of one webcam.
///
/// # Example
///
/// ```
/// use iced_webcam::media::{RotateMode, ScreenshotFormat};
/// use iced_webcam::ui::webcam::WebcamProps;
///
/// let props = WebcamProps::default()
///     .audio(false)
///     .mirror(true)
///     .rotate(RotateMode::Left)
///     .screenshot_format(ScreenshotFormat::Png);
/// assert!(!props.acquisition_request().audio);
/// ```
#[derive(Clone)]
pub struct WebcamProps {
    pub audio: bool,
    pub mirror: bool,
    pub rotate: RotateMode,
    pub muted: bool,
    pub width: Dimension,
    pub height: Dimension,
    pub screenshot_format: ScreenshotFormat,
    pub screenshot_quality: u8,
    pub on_user_media: Option<UserMediaCallback>,
    pub audio_source: Option<String>,
    pub video_source: Option<String>,
    pub constraints: Option<MediaConstraints>,
    pub class_name: Option<String>,
    pub style: Option<StyleFn>,
}

impl Default for WebcamProps {
    fn default() -> Self {
        Self {
            audio: true,
            mirror: false,
            rotate: RotateMode::None,
            muted: false,
            width: Dimension::Pixels(DEFAULT_WIDTH),
            height: Dimension::Pixels(DEFAULT_HEIGHT),
            screenshot_format: ScreenshotFormat::default(),
            screenshot_quality: DEFAULT_JPEG_QUALITY,
            on_user_media: None,
            audio_source: None,
            video_source: None,
            constraints: None,
            class_name: None,
            style: None,
        }
    }
}

impl fmt::Debug for WebcamProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebcamProps")
            .field("audio", &self.audio)
            .field("mirror", &self.mirror)
            .field("rotate", &self.rotate)
            .field("muted", &self.muted)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("screenshot_format", &self.screenshot_format)
            .field("screenshot_quality", &self.screenshot_quality)
            .field("on_user_media", &self.on_user_media.is_some())
            .field("audio_source", &self.audio_source)
            .field("video_source", &self.video_source)
            .field("constraints", &self.constraints)
            .field("class_name", &self.class_name)
            .field("style", &self.style.is_some())
            .finish()
    }
}

impl WebcamProps {
    #[must_use]
    pub fn audio(mut self, audio: bool) -> Self {
        self.audio = audio;
        self
    }

    #[must_use]
    pub fn mirror(mut self, mirror: bool) -> Self {
        self.mirror = mirror;
        self
    }

    #[must_use]
    pub fn rotate(mut self, rotate: RotateMode) -> Self {
        self.rotate = rotate;
        self
    }

    #[must_use]
    pub fn muted(mut self, muted: bool) -> Self {
        self.muted = muted;
        self
    }

    #[must_use]
    pub fn width(mut self, width: impl Into<Dimension>) -> Self {
        self.width = width.into();
        self
    }

    #[must_use]
    pub fn height(mut self, height: impl Into<Dimension>) -> Self {
        self.height = height.into();
        self
    }

    #[must_use]
    pub fn screenshot_format(mut self, format: ScreenshotFormat) -> Self {
        self.screenshot_format = format;
        self
    }

    /// JPEG quality, clamped to 1-100.
    #[must_use]
    pub fn screenshot_quality(mut self, quality: u8) -> Self {
        self.screenshot_quality = quality.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY);
        self
    }

    #[must_use]
    pub fn on_user_media(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_user_media = Some(Arc::new(callback));
        self
    }

    #[must_use]
    pub fn audio_source(mut self, device_id: impl Into<String>) -> Self {
        self.audio_source = Some(device_id.into());
        self
    }

    #[must_use]
    pub fn video_source(mut self, device_id: impl Into<String>) -> Self {
        self.video_source = Some(device_id.into());
        self
    }

    /// Raw constraints, bypassing source selection entirely.
    #[must_use]
    pub fn constraints(mut self, constraints: MediaConstraints) -> Self {
        self.constraints = Some(constraints);
        self
    }

    #[must_use]
    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    #[must_use]
    pub fn style(mut self, style: StyleFn) -> Self {
        self.style = Some(style);
        self
    }

    /// What to ask the coordinator for when this instance mounts.
    #[must_use]
    pub fn acquisition_request(&self) -> AcquisitionRequest {
        AcquisitionRequest {
            constraints: self.constraints.clone(),
            audio_source: self.audio_source.clone(),
            video_source: self.video_source.clone(),
            audio: self.audio,
        }
    }
}

impl From<&Config> for WebcamProps {
    fn from(config: &Config) -> Self {
        Self {
            audio: config.capture.audio,
            audio_source: config.capture.audio_source.clone(),
            video_source: config.capture.video_source.clone(),
            mirror: config.display.mirror,
            rotate: config.display.rotate,
            muted: config.display.muted,
            width: config.display.width.clone(),
            height: config.display.height.clone(),
            screenshot_format: config.snapshot.format,
            screenshot_quality: config.snapshot_quality(),
            ..Self::default()
        }
    }
}
