// SPDX-License-Identifier: MPL-2.0
//! User interface components.
//!
//! Components follow the Elm-style "state down, messages up" pattern: each
//! one owns its state, exposes `update`/`view`/`subscription`, and reports
//! to its parent through an `Event`.
//!
//! - [`webcam`] - Camera preview with shared capture and snapshots

pub mod webcam;
