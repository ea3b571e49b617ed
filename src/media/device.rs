// SPDX-License-Identifier: MPL-2.0
//! Input devices reported by the platform's enumeration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    AudioInput,
    AudioOutput,
    VideoInput,
}

/// One entry of a device enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDeviceInfo {
    pub device_id: String,
    pub kind: DeviceKind,
    /// Human readable name. Platforms commonly leave this empty until
    /// permission has been granted once.
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

impl MediaDeviceInfo {
    #[must_use]
    pub fn new(device_id: impl Into<String>, kind: DeviceKind, label: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            kind,
            label: label.into(),
            group_id: None,
        }
    }
}

/// Devices picked when the embedder did not name any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectedSources {
    pub audio: Option<String>,
    pub video: Option<String>,
}

/// Picks the first audio input and the first video input of an enumeration.
#[must_use]
pub fn select_default_sources(devices: &[MediaDeviceInfo]) -> SelectedSources {
    let first_of = |kind: DeviceKind| {
        devices
            .iter()
            .find(|device| device.kind == kind)
            .map(|device| device.device_id.clone())
    };

    SelectedSources {
        audio: first_of(DeviceKind::AudioInput),
        video: first_of(DeviceKind::VideoInput),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_first_device_of_each_input_kind() {
        let devices = vec![
            MediaDeviceInfo::new("speaker", DeviceKind::AudioOutput, "Speakers"),
            MediaDeviceInfo::new("cam-front", DeviceKind::VideoInput, "Front"),
            MediaDeviceInfo::new("mic-1", DeviceKind::AudioInput, "Mic 1"),
            MediaDeviceInfo::new("cam-back", DeviceKind::VideoInput, "Back"),
            MediaDeviceInfo::new("mic-2", DeviceKind::AudioInput, "Mic 2"),
        ];

        let selected = select_default_sources(&devices);
        assert_eq!(selected.audio.as_deref(), Some("mic-1"));
        assert_eq!(selected.video.as_deref(), Some("cam-front"));
    }

    #[test]
    fn missing_kinds_select_nothing() {
        let devices = vec![MediaDeviceInfo::new("speaker", DeviceKind::AudioOutput, "")];
        assert_eq!(select_default_sources(&devices), SelectedSources::default());
    }

    #[test]
    fn device_kind_uses_platform_names() {
        #[derive(Deserialize)]
        struct Entry {
            kind: DeviceKind,
        }

        let entry: Entry = toml::from_str("kind = \"videoinput\"").expect("known kind");
        assert_eq!(entry.kind, DeviceKind::VideoInput);
    }
}
