// SPDX-License-Identifier: MPL-2.0
//! Cancellation handle for the periodic frame copy.
//!
//! The loop itself is an `iced::time::every` subscription owned by the
//! webcam; it only exists while [`FrameLoop::is_running`] is true, so
//! [`FrameLoop::cancel`] stops it on the next subscription diff.
//!
//! Every `start` bumps a generation counter. Ticks carry the generation they
//! were scheduled for, which lets the owner drop ticks that were already
//! queued when the loop got cancelled.

use crate::config::FRAME_INTERVAL;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct FrameLoop {
    interval: Duration,
    running: bool,
    ticks: u64,
    generation: u64,
}

impl FrameLoop {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            running: false,
            ticks: 0,
            generation: 0,
        }
    }

    /// Starts the loop. Restarting a running loop is a no-op.
    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.generation = self.generation.wrapping_add(1);
        }
    }

    /// Stops the loop. Returns true if it was running.
    pub fn cancel(&mut self) -> bool {
        std::mem::replace(&mut self.running, false)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of frames copied since creation.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Accepts a tick scheduled for `generation`.
    ///
    /// Returns false (and does not count it) when the loop is stopped or the
    /// tick belongs to an earlier run.
    pub fn accept_tick(&mut self, generation: u64) -> bool {
        if !self.running || generation != self.generation {
            return false;
        }
        self.ticks += 1;
        true
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new(FRAME_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_interval_is_33ms() {
        let frame_loop = FrameLoop::default();
        assert_eq!(frame_loop.interval(), Duration::from_millis(33));
        assert!(!frame_loop.is_running());
    }

    #[test]
    fn cancel_reports_previous_state() {
        let mut frame_loop = FrameLoop::default();
        assert!(!frame_loop.cancel());
        frame_loop.start();
        assert!(frame_loop.cancel());
        assert!(!frame_loop.is_running());
    }

    #[test]
    fn stale_ticks_are_rejected() {
        let mut frame_loop = FrameLoop::default();
        frame_loop.start();
        let first = frame_loop.generation();
        assert!(frame_loop.accept_tick(first));

        frame_loop.cancel();
        assert!(!frame_loop.accept_tick(first));

        frame_loop.start();
        assert!(!frame_loop.accept_tick(first));
        assert!(frame_loop.accept_tick(frame_loop.generation()));
        assert_eq!(frame_loop.ticks(), 2);
    }

    #[test]
    fn start_is_idempotent_while_running() {
        let mut frame_loop = FrameLoop::default();
        frame_loop.start();
        let generation = frame_loop.generation();
        frame_loop.start();
        assert_eq!(frame_loop.generation(), generation);
    }
}
