// SPDX-License-Identifier: MPL-2.0
//! Event types recorded by the capture coordinator.

use crate::capture::{ConstraintStrategy, ListenerId};
use crate::error::CaptureError;
use std::time::Instant;

/// What happened inside a [`CaptureManager`](crate::capture::CaptureManager).
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticEventKind {
    /// A component instance registered with the coordinator.
    InstanceMounted { listener: ListenerId },

    /// A component instance deregistered.
    InstanceUnmounted {
        listener: ListenerId,
        /// Instances still registered afterwards.
        remaining: usize,
    },

    /// Constraints were resolved and the capture request was issued.
    AcquisitionStarted { strategy: ConstraintStrategy },

    /// The platform granted a stream; it was fanned out to `listeners` instances.
    AcquisitionGranted { stream_id: String, listeners: usize },

    /// The platform refused the request; the error was fanned out.
    AcquisitionFailed { error: CaptureError, listeners: usize },

    /// Device enumeration failed before a request could be issued.
    EnumerationFailed { message: String },

    /// A stream resolved after every instance had unmounted and was stopped unused.
    LateGrantDiscarded { stream_id: String },

    /// All tracks of the shared stream were stopped.
    StreamReleased { stream_id: String },

    /// The object URL of the shared stream was revoked.
    ObjectUrlRevoked { url: String },
}

impl DiagnosticEventKind {
    /// Stable short name, used as a `tracing` field.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            DiagnosticEventKind::InstanceMounted { .. } => "instance_mounted",
            DiagnosticEventKind::InstanceUnmounted { .. } => "instance_unmounted",
            DiagnosticEventKind::AcquisitionStarted { .. } => "acquisition_started",
            DiagnosticEventKind::AcquisitionGranted { .. } => "acquisition_granted",
            DiagnosticEventKind::AcquisitionFailed { .. } => "acquisition_failed",
            DiagnosticEventKind::EnumerationFailed { .. } => "enumeration_failed",
            DiagnosticEventKind::LateGrantDiscarded { .. } => "late_grant_discarded",
            DiagnosticEventKind::StreamReleased { .. } => "stream_released",
            DiagnosticEventKind::ObjectUrlRevoked { .. } => "object_url_revoked",
        }
    }
}

/// A recorded event with its capture time (monotonic).
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticEvent {
    pub at: Instant,
    pub kind: DiagnosticEventKind,
}

impl DiagnosticEvent {
    #[must_use]
    pub fn new(kind: DiagnosticEventKind) -> Self {
        Self {
            at: Instant::now(),
            kind,
        }
    }
}
