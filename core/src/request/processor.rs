use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use uuid::Uuid;

use crate::backend::ResponseBackend;
use crate::config::ResolvedTiming;
use crate::error::{ControllerError, RejectReason};
use crate::events::EventBus;
use crate::timer::{spawn_delay, spawn_periodic, TimerSet};
use crate::util::lock_unpoisoned;

use super::state::{RequestRun, RequestSnapshot, RequestState, RequestStatus, RevealStep};
use super::ReadinessGate;

/// Timing knobs of the reveal animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamTiming {
    pub start_delay: Duration,
    pub tick_interval: Duration,
    pub chunk_chars: usize,
}

impl From<&ResolvedTiming> for StreamTiming {
    fn from(t: &ResolvedTiming) -> Self {
        Self {
            start_delay: Duration::from_millis(t.stream_start_delay_ms),
            tick_interval: Duration::from_millis(t.reveal_tick_ms),
            chunk_chars: t.reveal_chunk_chars.max(1),
        }
    }
}

struct ProcessorInner {
    state: RequestState,
    timers: TimerSet,
    timing: StreamTiming,
    events: Option<EventBus>,
}

impl ProcessorInner {
    fn emit(&self) {
        if let Some(bus) = &self.events {
            bus.emit_request(self.state.snapshot());
        }
    }
}

/// Accepts one query at a time and reveals its precomputed response unit by
/// unit, after a short "thinking" delay.
pub struct RequestProcessor {
    shared: Arc<Mutex<ProcessorInner>>,
    gate: Arc<dyn ReadinessGate>,
    backend: Arc<dyn ResponseBackend>,
}

impl RequestProcessor {
    pub fn new(
        timing: StreamTiming,
        gate: Arc<dyn ReadinessGate>,
        backend: Arc<dyn ResponseBackend>,
    ) -> Self {
        let inner = ProcessorInner {
            state: RequestState::Idle,
            timers: TimerSet::new(),
            timing,
            events: None,
        };
        Self {
            shared: Arc::new(Mutex::new(inner)),
            gate,
            backend,
        }
    }

    pub fn with_events(self, bus: EventBus) -> Self {
        lock_unpoisoned(&self.shared).events = Some(bus);
        self
    }

    /// Accept `query` and schedule its response. Returns the request id.
    ///
    /// Rejected when the model is not ready, another request is queued or
    /// streaming, or the query is blank; the current state is left as is.
    pub fn submit(&self, query: &str) -> Result<String, ControllerError> {
        if query.trim().is_empty() {
            return Err(reject(RejectReason::EmptyQuery));
        }
        if !self.gate.is_ready() {
            return Err(reject(RejectReason::LifecycleNotReady));
        }

        let mut inner = lock_unpoisoned(&self.shared);
        if !inner.state.accepts_submission() {
            tracing::warn!(status = %inner.state.status(), "submission rejected while busy");
            return Err(reject(RejectReason::RequestInFlight));
        }

        let id = Uuid::new_v4().to_string();
        let target = self.backend.compose(query);
        inner.state.queue(RequestRun::new(id.clone(), query, target))?;

        // Any timer left over from a cancelled run must not touch this one.
        inner.timers.cancel_all();
        let generation = inner.timers.generation();
        let weak = Arc::downgrade(&self.shared);
        let delay = inner.timing.start_delay;
        inner
            .timers
            .arm_delay(spawn_delay(delay, move || on_stream_delay(&weak, generation)));

        tracing::debug!(
            request_id = %id,
            backend = self.backend.name(),
            query_chars = query.chars().count(),
            "request queued"
        );
        inner.emit();
        Ok(id)
    }

    pub fn snapshot(&self) -> RequestSnapshot {
        lock_unpoisoned(&self.shared).state.snapshot()
    }

    pub fn status(&self) -> RequestStatus {
        lock_unpoisoned(&self.shared).state.status()
    }

    /// Stop any pending timer without touching the state.
    pub fn cancel(&self) {
        let mut inner = lock_unpoisoned(&self.shared);
        if inner.timers.has_active() {
            tracing::debug!(status = %inner.state.status(), "request timers cancelled");
        }
        inner.timers.cancel_all();
    }
}

impl Drop for RequestProcessor {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn reject(reason: RejectReason) -> ControllerError {
    ControllerError::RequestRejected(reason)
}

fn on_stream_delay(weak: &Weak<Mutex<ProcessorInner>>, generation: u64) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let mut inner = lock_unpoisoned(&shared);
    if !inner.timers.is_current(generation) {
        return;
    }
    inner.timers.release_delay();

    if let Err(e) = inner.state.begin_streaming() {
        tracing::warn!("skipping stream start: {}", e);
        return;
    }
    tracing::debug!("streaming response");
    inner.emit();

    let period = inner.timing.tick_interval;
    let tick_weak = Arc::downgrade(&shared);
    inner.timers.arm_periodic(spawn_periodic(period, move || {
        on_reveal_tick(&tick_weak, generation)
    }));
}

fn on_reveal_tick(weak: &Weak<Mutex<ProcessorInner>>, generation: u64) -> ControlFlow<()> {
    let Some(shared) = weak.upgrade() else {
        return ControlFlow::Break(());
    };
    let mut inner = lock_unpoisoned(&shared);
    if !inner.timers.is_current(generation) {
        return ControlFlow::Break(());
    }

    let chunk = inner.timing.chunk_chars;
    match inner.state.reveal(chunk) {
        Ok(RevealStep::Advanced(revealed)) => {
            tracing::trace!(revealed, "reveal tick");
            inner.emit();
            ControlFlow::Continue(())
        }
        Ok(RevealStep::Completed) => {
            inner.timers.release_periodic();
            tracing::debug!(revealed = inner.state.revealed(), "response complete");
            inner.emit();
            ControlFlow::Break(())
        }
        Err(e) => {
            inner.timers.release_periodic();
            tracing::warn!("reveal tick outside streaming: {}", e);
            ControlFlow::Break(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::AlwaysReady;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Upper;

    impl ResponseBackend for Upper {
        fn name(&self) -> &str {
            "upper"
        }

        fn compose(&self, query: &str) -> String {
            query.to_uppercase()
        }
    }

    struct Switch(AtomicBool);

    impl ReadinessGate for Switch {
        fn is_ready(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn timing() -> StreamTiming {
        StreamTiming {
            start_delay: Duration::from_millis(1_000),
            tick_interval: Duration::from_millis(30),
            chunk_chars: 1,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_query_rejected() {
        let p = RequestProcessor::new(timing(), Arc::new(AlwaysReady), Arc::new(Upper));
        assert_eq!(
            p.submit("   \n").unwrap_err(),
            ControllerError::RequestRejected(RejectReason::EmptyQuery)
        );
        assert_eq!(p.status(), RequestStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_ready_rejected_until_gate_opens() {
        let gate = Arc::new(Switch(AtomicBool::new(false)));
        let p = RequestProcessor::new(timing(), gate.clone(), Arc::new(Upper));
        assert_eq!(
            p.submit("hi").unwrap_err(),
            ControllerError::RequestRejected(RejectReason::LifecycleNotReady)
        );
        assert_eq!(p.status(), RequestStatus::Idle);

        gate.0.store(true, Ordering::SeqCst);
        p.submit("hi").unwrap();
        assert_eq!(p.status(), RequestStatus::Queued);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_freezes_state() {
        let p = RequestProcessor::new(timing(), Arc::new(AlwaysReady), Arc::new(Upper));
        p.submit("abcdef").unwrap();
        tokio::time::sleep(Duration::from_millis(1_095)).await;
        let before = p.snapshot();
        assert_eq!(before.status, RequestStatus::Streaming);

        p.cancel();
        p.cancel();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(p.snapshot(), before);
    }
}
