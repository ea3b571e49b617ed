// SPDX-License-Identifier: MPL-2.0
//! Shared capture coordinator.
//!
//! A [`CaptureManager`] is the one place that talks to the platform on behalf
//! of every mounted webcam. It guarantees that:
//!
//! - at most one capture request is outstanding at any time,
//! - every registered instance receives the same granted stream (or the same
//!   failure), including instances that mount after the request resolved,
//! - the stream is stopped and its object URL revoked exactly once, when the
//!   last instance unmounts.
//!
//! Instances are told about outcomes through a per-listener channel. The
//! coordinator itself never spawns: [`CaptureManager::mount`] hands back the
//! acquisition future and the caller drives it on whatever executor it uses.
//!
//! ```
//! use iced_webcam::capture::{AcquisitionRequest, CaptureEvent, CaptureManager};
//! use iced_webcam::platform::SyntheticPlatform;
//! use std::sync::Arc;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let manager = CaptureManager::new(Arc::new(SyntheticPlatform::default()));
//! let mut mount = manager.mount(AcquisitionRequest::default()).unwrap();
//! mount.acquisition.take().unwrap().await;
//! assert!(matches!(mount.events.recv().await, Some(CaptureEvent::Granted(_))));
//! # });
//! ```

mod acquisition;

pub use acquisition::{resolve_constraints, AcquisitionRequest, ConstraintStrategy};

use crate::config::DEFAULT_DIAGNOSTICS_BUFFER_CAPACITY;
use crate::diagnostics::{BufferCapacity, CircularBuffer, DiagnosticEvent, DiagnosticEventKind};
use crate::error::CaptureError;
use crate::media::{stop_stream, SharedStream};
use crate::platform::{MediaPlatform, ObjectUrl};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

/// Identifies one registered instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The shared stream plus the object URL that makes it playable.
#[derive(Debug, Clone)]
pub struct Grant {
    pub stream: SharedStream,
    pub url: ObjectUrl,
}

/// Outcome notification delivered to each registered instance.
#[derive(Debug, Clone)]
pub enum CaptureEvent {
    Granted(Grant),
    Failed(CaptureError),
}

/// Observable state of the shared acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionStatus {
    /// Nothing requested, or the previous stream was released.
    Idle,
    /// A request is outstanding.
    Pending,
    Granted,
    /// The request failed. No further request is issued.
    Denied,
}

/// How an acquisition future resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum AcquisitionOutcome {
    /// The stream was delivered to `listeners` instances.
    Granted { listeners: usize },
    Failed(CaptureError),
    /// The stream arrived after every instance had unmounted and was stopped.
    Discarded,
}

/// Future performing the acquisition. Must be driven to completion.
pub type Acquisition = BoxFuture<'static, AcquisitionOutcome>;

/// Registration handle returned by [`CaptureManager::mount`].
pub struct Mount {
    pub id: ListenerId,
    pub events: mpsc::UnboundedReceiver<CaptureEvent>,
    /// Present when this mount started the acquisition.
    pub acquisition: Option<Acquisition>,
}

impl fmt::Debug for Mount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mount")
            .field("id", &self.id)
            .field("acquisition", &self.acquisition.is_some())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
enum State {
    Idle,
    Pending,
    Granted(Grant),
    Denied(CaptureError),
}

struct Inner {
    listeners: Vec<(ListenerId, mpsc::UnboundedSender<CaptureEvent>)>,
    next_listener: u64,
    state: State,
    diagnostics: CircularBuffer<DiagnosticEvent>,
}

impl Inner {
    fn record(&mut self, kind: DiagnosticEventKind) {
        tracing::debug!(event = kind.name(), "capture diagnostics");
        if let Some(evicted) = self.diagnostics.push(DiagnosticEvent::new(kind)) {
            tracing::trace!(evicted = evicted.kind.name(), "diagnostics buffer full");
        }
    }

    /// Sends `event` to every listener, returning how many received it.
    fn publish(&self, event: &CaptureEvent) -> usize {
        self.listeners
            .iter()
            .filter(|(_, sender)| sender.send(event.clone()).is_ok())
            .count()
    }
}

/// Coordinator shared by every webcam instance. Clones share state.
#[derive(Clone)]
pub struct CaptureManager {
    platform: Arc<dyn MediaPlatform>,
    inner: Arc<Mutex<Inner>>,
}

impl fmt::Debug for CaptureManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("CaptureManager")
            .field("listeners", &inner.listeners.len())
            .field("state", &inner.state)
            .finish()
    }
}

impl CaptureManager {
    #[must_use]
    pub fn new(platform: Arc<dyn MediaPlatform>) -> Self {
        Self::with_diagnostics_capacity(platform, DEFAULT_DIAGNOSTICS_BUFFER_CAPACITY)
    }

    /// Creates a coordinator keeping up to `capacity` diagnostic events
    /// (clamped to the supported range).
    #[must_use]
    pub fn with_diagnostics_capacity(platform: Arc<dyn MediaPlatform>, capacity: usize) -> Self {
        Self {
            platform,
            inner: Arc::new(Mutex::new(Inner {
                listeners: Vec::new(),
                next_listener: 1,
                state: State::Idle,
                diagnostics: CircularBuffer::new(BufferCapacity::new(capacity)),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn platform(&self) -> &Arc<dyn MediaPlatform> {
        &self.platform
    }

    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.platform.has_capture_support()
    }

    /// Registers an instance.
    ///
    /// Returns `None` without registering anything when the platform has no
    /// capture support. Otherwise the instance is registered and:
    /// - if nothing was requested yet, the returned mount carries the
    ///   acquisition future,
    /// - if a stream is already granted (or the request failed), the outcome
    ///   is queued on the new listener's channel right away,
    /// - if a request is pending, the listener waits for its fan-out.
    pub fn mount(&self, request: AcquisitionRequest) -> Option<Mount> {
        if !self.is_supported() {
            tracing::debug!("capture unsupported, instance not registered");
            return None;
        }

        let (sender, events) = mpsc::unbounded_channel();
        let mut inner = self.lock();
        let id = ListenerId(inner.next_listener);
        inner.next_listener += 1;
        inner.listeners.push((id, sender.clone()));
        inner.record(DiagnosticEventKind::InstanceMounted { listener: id });
        tracing::info!(listener = id.value(), mounted = inner.listeners.len(), "webcam mounted");

        let acquisition = match inner.state.clone() {
            State::Idle => {
                let strategy = request.strategy();
                inner.state = State::Pending;
                inner.record(DiagnosticEventKind::AcquisitionStarted { strategy });
                tracing::info!(%strategy, "requesting user media");
                Some(self.acquire(request))
            }
            State::Pending => None,
            State::Granted(grant) => {
                let _ = sender.send(CaptureEvent::Granted(grant));
                None
            }
            State::Denied(error) => {
                let _ = sender.send(CaptureEvent::Failed(error));
                None
            }
        };

        Some(Mount {
            id,
            events,
            acquisition,
        })
    }

    fn acquire(&self, request: AcquisitionRequest) -> Acquisition {
        let manager = self.clone();
        async move {
            let constraints = match resolve_constraints(manager.platform.as_ref(), &request).await {
                Ok(constraints) => constraints,
                Err(error) => return manager.enumeration_failed(error),
            };
            let result = manager.platform.get_user_media(constraints).await;
            manager.complete(result)
        }
        .boxed()
    }

    fn enumeration_failed(&self, error: CaptureError) -> AcquisitionOutcome {
        tracing::warn!(%error, "device enumeration failed");
        let mut inner = self.lock();
        inner.publish(&CaptureEvent::Failed(error.clone()));
        inner.state = State::Denied(error.clone());
        inner.record(DiagnosticEventKind::EnumerationFailed {
            message: error.to_string(),
        });
        AcquisitionOutcome::Failed(error)
    }

    fn complete(&self, result: Result<SharedStream, CaptureError>) -> AcquisitionOutcome {
        let mut inner = self.lock();
        match result {
            Ok(stream) if inner.listeners.is_empty() => {
                inner.state = State::Idle;
                inner.record(DiagnosticEventKind::LateGrantDiscarded {
                    stream_id: stream.id().to_string(),
                });
                drop(inner);
                tracing::info!(stream = stream.id(), "no instance left, stopping late stream");
                stop_stream(stream.as_ref());
                AcquisitionOutcome::Discarded
            }
            Ok(stream) => {
                let url = self.platform.create_object_url(&stream);
                let grant = Grant { stream, url };
                let listeners = inner.publish(&CaptureEvent::Granted(grant.clone()));
                tracing::info!(stream = grant.stream.id(), listeners, "user media granted");
                inner.record(DiagnosticEventKind::AcquisitionGranted {
                    stream_id: grant.stream.id().to_string(),
                    listeners,
                });
                inner.state = State::Granted(grant);
                AcquisitionOutcome::Granted { listeners }
            }
            Err(error) => {
                let listeners = inner.publish(&CaptureEvent::Failed(error.clone()));
                tracing::warn!(%error, listeners, "user media request failed");
                inner.record(DiagnosticEventKind::AcquisitionFailed {
                    error: error.clone(),
                    listeners,
                });
                inner.state = State::Denied(error.clone());
                AcquisitionOutcome::Failed(error)
            }
        }
    }

    /// Deregisters an instance.
    ///
    /// When it was the last one and a stream is held, every track is stopped,
    /// the state returns to idle and the object URL is revoked. Returns true
    /// if that release happened.
    pub fn unmount(&self, id: ListenerId) -> bool {
        let mut inner = self.lock();
        let Some(index) = inner.listeners.iter().position(|(listener, _)| *listener == id) else {
            return false;
        };
        inner.listeners.remove(index);
        let remaining = inner.listeners.len();
        inner.record(DiagnosticEventKind::InstanceUnmounted {
            listener: id,
            remaining,
        });
        tracing::info!(listener = id.value(), remaining, "webcam unmounted");

        if remaining > 0 {
            return false;
        }
        let State::Granted(grant) = inner.state.clone() else {
            return false;
        };

        inner.state = State::Idle;
        inner.record(DiagnosticEventKind::StreamReleased {
            stream_id: grant.stream.id().to_string(),
        });
        inner.record(DiagnosticEventKind::ObjectUrlRevoked {
            url: grant.url.to_string(),
        });
        drop(inner);

        stop_stream(grant.stream.as_ref());
        self.platform.revoke_object_url(&grant.url);
        tracing::info!(stream = grant.stream.id(), "shared stream released");
        true
    }

    #[must_use]
    pub fn status(&self) -> AcquisitionStatus {
        match self.lock().state {
            State::Idle => AcquisitionStatus::Idle,
            State::Pending => AcquisitionStatus::Pending,
            State::Granted(_) => AcquisitionStatus::Granted,
            State::Denied(_) => AcquisitionStatus::Denied,
        }
    }

    /// The shared grant, if a stream is currently held.
    #[must_use]
    pub fn grant(&self) -> Option<Grant> {
        match &self.lock().state {
            State::Granted(grant) => Some(grant.clone()),
            _ => None,
        }
    }

    #[must_use]
    pub fn mounted_count(&self) -> usize {
        self.lock().listeners.len()
    }

    /// Snapshot of the recorded events, oldest first.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<DiagnosticEvent> {
        self.lock().diagnostics.iter().cloned().collect()
    }

    /// The `count` most recent diagnostic events, oldest first.
    #[must_use]
    pub fn recent_diagnostics(&self, count: usize) -> Vec<DiagnosticEvent> {
        self.lock().diagnostics.recent(count).cloned().collect()
    }

    /// The latest diagnostic event, if any was recorded.
    #[must_use]
    pub fn last_diagnostic(&self) -> Option<DiagnosticEvent> {
        self.lock().diagnostics.last().cloned()
    }
}
