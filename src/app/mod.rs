// SPDX-License-Identifier: MPL-2.0
//! Demo application: one webcam on the synthetic camera, with buttons to
//! take a snapshot, toggle mirroring and cycle the rotation.
//!
//! Snapshots are written to the output directory with a timestamped name.
//! Mirror and rotation changes are persisted to the settings file.

mod message;

pub use message::{Flags, Message};

use crate::capture::CaptureManager;
use crate::config::{self, Config};
use crate::error::{CaptureError, Result};
use crate::media::snapshot_filename;
use crate::platform::SyntheticPlatform;
use crate::ui::webcam::{self, Webcam, WebcamProps};
use iced::widget::{button, column, row, text};
use iced::{window, Element, Subscription, Task};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const WINDOW_DEFAULT_WIDTH: u32 = 720;
pub const WINDOW_DEFAULT_HEIGHT: u32 = 620;

pub struct App {
    webcam: Webcam,
    config: Config,
    config_dir: Option<PathBuf>,
    output_dir: PathBuf,
    status: String,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("webcam_has_media", &self.webcam.has_media())
            .field("output_dir", &self.output_dir)
            .finish()
    }
}

pub fn window_settings() -> window::Settings {
    window::Settings {
        size: iced::Size::new(WINDOW_DEFAULT_WIDTH as f32, WINDOW_DEFAULT_HEIGHT as f32),
        ..window::Settings::default()
    }
}

/// Entry point used by `main.rs` to launch the Iced application loop.
pub fn run(flags: Flags) -> iced::Result {
    let boot = move || App::new(flags.clone());

    iced::application(boot, App::update, App::view)
        .title(App::title)
        .window(window_settings())
        .subscription(App::subscription)
        .run()
}

/// Applies command-line overrides to the loaded configuration.
fn apply_flags(config: &mut Config, flags: &Flags) {
    if flags.mirror {
        config.display.mirror = true;
    }
    if let Some(rotate) = flags.rotate {
        config.display.rotate = rotate;
    }
    if let Some(format) = flags.format {
        config.snapshot.format = format;
    }
    if flags.no_audio {
        config.capture.audio = false;
    }
    if let Some(dir) = &flags.output_dir {
        config.snapshot.output_dir = Some(dir.clone());
    }
}

fn resolve_output_dir(config: &Config) -> PathBuf {
    config
        .snapshot
        .output_dir
        .clone()
        .or_else(dirs::picture_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

impl App {
    pub fn new(flags: Flags) -> (Self, Task<Message>) {
        let (mut config, warning) = config::load_with_override(flags.config_dir.clone());
        if let Some(warning) = warning {
            tracing::warn!(%warning, "using default settings");
        }
        apply_flags(&mut config, &flags);

        let mut platform = SyntheticPlatform::builder();
        if flags.deny {
            platform = platform.deny(CaptureError::PermissionDenied);
        }
        let manager = CaptureManager::new(Arc::new(platform.build()));

        let mut webcam = Webcam::new(manager, WebcamProps::from(&config));
        let task = webcam.mount().map(Message::Webcam);
        let status = if webcam.is_mounted() {
            "Waiting for camera...".to_string()
        } else {
            "Camera capture is not supported".to_string()
        };

        let app = Self {
            webcam,
            output_dir: resolve_output_dir(&config),
            config,
            config_dir: flags.config_dir,
            status,
        };
        (app, task)
    }

    fn title(&self) -> String {
        if self.webcam.has_media() {
            "IcedWebcam - live".to_string()
        } else {
            "IcedWebcam".to_string()
        }
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Webcam(message) => match self.webcam.update(message) {
                webcam::Event::UserMedia => self.status = "Camera ready".to_string(),
                webcam::Event::UserMediaError(error) => self.status = error.to_string(),
                webcam::Event::None => {}
            },
            Message::TakeSnapshot => {
                self.status = match self.save_snapshot() {
                    Ok(Some(path)) => format!("Saved {}", path.display()),
                    Ok(None) => "No camera stream yet".to_string(),
                    Err(err) => err.to_string(),
                };
            }
            Message::ToggleMirror => {
                let mirror = !self.webcam.props().mirror;
                self.webcam.set_mirror(mirror);
                self.config.display.mirror = mirror;
                self.persist();
            }
            Message::CycleRotate => {
                let rotate = self.webcam.props().rotate.next();
                self.webcam.set_rotate(rotate);
                self.config.display.rotate = rotate;
                self.persist();
            }
        }
        Task::none()
    }

    fn save_snapshot(&self) -> Result<Option<PathBuf>> {
        let Some(canvas) = self.webcam.get_canvas() else {
            return Ok(None);
        };
        let format = self.webcam.props().screenshot_format;
        let path = snapshot_path(&self.output_dir, format);
        std::fs::create_dir_all(&self.output_dir)?;
        canvas.save_to_file(&path, format, self.webcam.props().screenshot_quality)?;
        tracing::info!(path = %path.display(), "snapshot saved");
        Ok(Some(path))
    }

    fn persist(&self) {
        if let Err(err) = config::save_with_override(&self.config, self.config_dir.clone()) {
            tracing::warn!(%err, "failed to save settings");
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        self.webcam.subscription().map(Message::Webcam)
    }

    fn view(&self) -> Element<'_, Message> {
        let controls = row![
            button(text("Snapshot")).on_press(Message::TakeSnapshot),
            button(text(if self.webcam.props().mirror {
                "Mirror: on"
            } else {
                "Mirror: off"
            }))
            .on_press(Message::ToggleMirror),
            button(text(format!("Rotate: {}", self.webcam.props().rotate))).on_press(Message::CycleRotate),
        ]
        .spacing(8);

        column![
            self.webcam.view().map(Message::Webcam),
            controls,
            text(&self.status)
        ]
        .spacing(12)
        .padding(12)
        .into()
    }
}

fn snapshot_path(dir: &Path, format: crate::media::ScreenshotFormat) -> PathBuf {
    dir.join(snapshot_filename(chrono::Local::now(), format))
}
