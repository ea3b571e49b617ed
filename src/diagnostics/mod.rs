// SPDX-License-Identifier: MPL-2.0
//! Diagnostics kept by the capture coordinator.
//!
//! Every coordinator keeps its most recent lifecycle events (mounts,
//! acquisitions, releases) in a memory-bounded [`CircularBuffer`]. The
//! events are also emitted through `tracing`; the buffer lets an embedder
//! inspect what happened without installing a subscriber.

mod buffer;
mod events;

pub use buffer::{BufferCapacity, CircularBuffer};
pub use events::{DiagnosticEvent, DiagnosticEventKind};
