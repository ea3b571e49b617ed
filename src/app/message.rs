// SPDX-License-Identifier: MPL-2.0
//! Top-level messages and runtime flags for the demo application.

use crate::media::{RotateMode, ScreenshotFormat};
use crate::ui::webcam;
use std::path::PathBuf;

/// Top-level messages consumed by `App::update`.
#[derive(Debug, Clone)]
pub enum Message {
    Webcam(webcam::Message),
    TakeSnapshot,
    ToggleMirror,
    CycleRotate,
}

/// Command-line overrides applied on top of the persisted configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flags {
    /// `--mirror`
    pub mirror: bool,
    /// `--rotate left|right|none`
    pub rotate: Option<RotateMode>,
    /// `--format png|jpeg|webp`
    pub format: Option<ScreenshotFormat>,
    /// `--no-audio`
    pub no_audio: bool,
    /// `--deny`: the synthetic camera refuses access.
    pub deny: bool,
    /// `--output-dir <dir>`
    pub output_dir: Option<PathBuf>,
    /// `--config <dir>`: directory holding `settings.toml`.
    pub config_dir: Option<PathBuf>,
}

impl Flags {
    /// Parses the flags, rejecting unknown arguments.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed values or leftover arguments.
    pub fn from_args(mut args: pico_args::Arguments) -> Result<Self, pico_args::Error> {
        let flags = Self {
            mirror: args.contains("--mirror"),
            rotate: args.opt_value_from_str("--rotate")?,
            format: args.opt_value_from_str("--format")?,
            no_audio: args.contains("--no-audio"),
            deny: args.contains("--deny"),
            output_dir: args.opt_value_from_str("--output-dir")?,
            config_dir: args.opt_value_from_str("--config")?,
        };

        let remaining = args.finish();
        if let Some(arg) = remaining.first() {
            return Err(pico_args::Error::ArgumentParsingFailed {
                cause: format!("unexpected argument: {}", arg.to_string_lossy()),
            });
        }
        Ok(flags)
    }
}
