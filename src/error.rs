// SPDX-License-Identifier: MPL-2.0
use std::fmt;

#[derive(Debug, Clone)]
pub enum Error {
    Io(String),
    Config(String),
    Encode(String),
    Capture(CaptureError),
}

/// Reasons a capture request (or the device enumeration preceding it) can fail.
///
/// Instances never keep this as state: a failure is only observable as a
/// media flag that stays `false`. The value is still carried through the
/// coordinator so it can be logged and recorded in diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The platform has no camera/microphone capture capability.
    Unsupported,

    /// The user or the platform refused access to the devices.
    PermissionDenied,

    /// No device satisfies the request.
    DeviceNotFound,

    /// A device exists but could not be started (already in use, hardware fault).
    DeviceBusy,

    /// The requested constraints are invalid or cannot be satisfied.
    Constraints(String),

    /// Listing the input devices failed.
    Enumeration(String),

    /// Generic error with raw message
    Other(String),
}

impl CaptureError {
    /// Returns a stable key for this error type, used in diagnostics records.
    pub fn diagnostic_key(&self) -> &'static str {
        match self {
            CaptureError::Unsupported => "capture-unsupported",
            CaptureError::PermissionDenied => "capture-permission-denied",
            CaptureError::DeviceNotFound => "capture-device-not-found",
            CaptureError::DeviceBusy => "capture-device-busy",
            CaptureError::Constraints(_) => "capture-constraints",
            CaptureError::Enumeration(_) => "capture-enumeration",
            CaptureError::Other(_) => "capture-other",
        }
    }

    /// Categorizes a raw platform error message (for example the `name` and
    /// `message` of a rejected capture promise) into a `CaptureError`.
    pub fn from_message(msg: &str) -> Self {
        let msg_lower = msg.to_lowercase();

        if msg_lower.contains("notallowed")
            || msg_lower.contains("permission")
            || msg_lower.contains("denied")
            || msg_lower.contains("securityerror")
        {
            return CaptureError::PermissionDenied;
        }

        // Checked before "not found" so "OverconstrainedError: ... not found" stays a constraint error
        if msg_lower.contains("overconstrained") || msg_lower.contains("constraint") {
            return CaptureError::Constraints(msg.to_string());
        }

        if msg_lower.contains("notfound")
            || msg_lower.contains("not found")
            || msg_lower.contains("no device")
        {
            return CaptureError::DeviceNotFound;
        }

        if msg_lower.contains("notreadable")
            || msg_lower.contains("trackstart")
            || msg_lower.contains("busy")
            || msg_lower.contains("in use")
        {
            return CaptureError::DeviceBusy;
        }

        if msg_lower.contains("not supported") || msg_lower.contains("unsupported") {
            return CaptureError::Unsupported;
        }

        CaptureError::Other(msg.to_string())
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::Unsupported => write!(f, "Media capture is not supported"),
            CaptureError::PermissionDenied => write!(f, "Permission to use the devices was denied"),
            CaptureError::DeviceNotFound => write!(f, "No matching capture device found"),
            CaptureError::DeviceBusy => write!(f, "Capture device could not be started"),
            CaptureError::Constraints(msg) => write!(f, "Unsatisfiable constraints: {}", msg),
            CaptureError::Enumeration(msg) => write!(f, "Device enumeration failed: {}", msg),
            CaptureError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O Error: {}", e),
            Error::Config(e) => write!(f, "Config Error: {}", e),
            Error::Encode(e) => write!(f, "Encode Error: {}", e),
            Error::Capture(e) => write!(f, "Capture Error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<CaptureError> for Error {
    fn from(err: CaptureError) -> Self {
        Error::Capture(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<image_rs::ImageError> for Error {
    fn from(err: image_rs::ImageError) -> Self {
        Error::Encode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
