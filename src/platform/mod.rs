// SPDX-License-Identifier: MPL-2.0
//! Media capture platform abstraction.
//!
//! A platform answers four questions: can it capture at all, which input
//! devices exist, can it hand out a stream for some constraints, and how is
//! a stream made playable (object URLs). A browser binding, a native camera
//! binding and the bundled [`synthetic`] camera all fit behind this trait.

pub mod synthetic;

use crate::error::CaptureError;
use crate::media::{MediaConstraints, MediaDeviceInfo, SharedStream};
use futures_util::future::BoxFuture;
use std::fmt;

pub use synthetic::SyntheticPlatform;

/// Platform reference making a stream playable by a video surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub trait MediaPlatform: Send + Sync {
    /// Capability check. When false, no other method is called.
    fn has_capture_support(&self) -> bool;

    /// Lists the available input and output devices.
    fn enumerate_devices(&self) -> BoxFuture<'static, Result<Vec<MediaDeviceInfo>, CaptureError>>;

    /// Requests access to the devices described by `constraints`.
    ///
    /// May wait indefinitely on a permission prompt.
    fn get_user_media(
        &self,
        constraints: MediaConstraints,
    ) -> BoxFuture<'static, Result<SharedStream, CaptureError>>;

    fn create_object_url(&self, stream: &SharedStream) -> ObjectUrl;

    fn revoke_object_url(&self, url: &ObjectUrl);
}
