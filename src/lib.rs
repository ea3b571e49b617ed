// SPDX-License-Identifier: MPL-2.0
//! `iced_webcam` is a webcam component for the Iced GUI framework.
//!
//! A [`Webcam`](ui::webcam::Webcam) previews a camera stream on a canvas and
//! can hand out the current picture as a `data:` URL. Any number of
//! instances share a single [`CaptureManager`](capture::CaptureManager), so
//! access is requested once and the devices are released when the last
//! instance goes away. Capture itself goes through the
//! [`MediaPlatform`](platform::MediaPlatform) trait; a synthetic camera is
//! bundled for demos and tests.

#![doc(html_root_url = "https://docs.rs/iced_webcam/0.1.0")]

pub mod app;
pub mod capture;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod media;
pub mod platform;
pub mod ui;
