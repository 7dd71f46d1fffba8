use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use crate::config::ResolvedTiming;
use crate::error::ControllerError;
use crate::events::EventBus;
use crate::request::ReadinessGate;
use crate::timer::{spawn_delay, spawn_periodic, TimerSet};
use crate::util::lock_unpoisoned;

use super::increments::{IncrementSource, UniformIncrements};
use super::state::{LifecycleSnapshot, LifecycleState, LifecycleStatus, ProgressStep};

/// Timing knobs of the loading animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoaderTiming {
    pub start_delay: Duration,
    pub tick_interval: Duration,
}

impl From<&ResolvedTiming> for LoaderTiming {
    fn from(t: &ResolvedTiming) -> Self {
        Self {
            start_delay: Duration::from_millis(t.load_start_delay_ms),
            tick_interval: Duration::from_millis(t.load_tick_ms),
        }
    }
}

struct LifecycleInner {
    state: LifecycleState,
    start_requested: bool,
    increments: Box<dyn IncrementSource>,
    timers: TimerSet,
    timing: LoaderTiming,
    events: Option<EventBus>,
}

impl LifecycleInner {
    fn emit(&self) {
        if let Some(bus) = &self.events {
            bus.emit_lifecycle(self.state.snapshot());
        }
    }
}

/// Drives the simulated model load: a startup delay, then periodic
/// progress ticks until 100%.
///
/// Timer callbacks run on the Tokio runtime, so `start()` must be called
/// from within one. Dropping the controller cancels every pending timer.
pub struct LifecycleController {
    shared: Arc<Mutex<LifecycleInner>>,
}

impl LifecycleController {
    pub fn new(timing: LoaderTiming, increments: Box<dyn IncrementSource>) -> Self {
        let inner = LifecycleInner {
            state: LifecycleState::Unloaded,
            start_requested: false,
            increments,
            timers: TimerSet::new(),
            timing,
            events: None,
        };
        Self {
            shared: Arc::new(Mutex::new(inner)),
        }
    }

    /// Controller with uniform random increments bounded by the configured maximum.
    pub fn from_timing(timing: &ResolvedTiming) -> Self {
        Self::new(
            LoaderTiming::from(timing),
            Box::new(UniformIncrements::new(timing.max_progress_increment)),
        )
    }

    pub fn with_events(self, bus: EventBus) -> Self {
        lock_unpoisoned(&self.shared).events = Some(bus);
        self
    }

    /// Begin the loading sequence. Only valid once, from `Unloaded`.
    ///
    /// A controller cannot be restarted: after `cancel()` during the
    /// startup delay it stays `Unloaded` and rejects every later `start()`.
    pub fn start(&self) -> Result<(), ControllerError> {
        let mut inner = lock_unpoisoned(&self.shared);
        let status = inner.state.status();
        if status != LifecycleStatus::Unloaded {
            return Err(ControllerError::InvalidStateTransition {
                operation: "start",
                from: status.as_str(),
            });
        }
        if inner.start_requested {
            return Err(ControllerError::InvalidStateTransition {
                operation: "start",
                from: status.as_str(),
            });
        }
        inner.start_requested = true;

        let generation = inner.timers.generation();
        let weak = Arc::downgrade(&self.shared);
        let delay = inner.timing.start_delay;
        inner
            .timers
            .arm_delay(spawn_delay(delay, move || on_start_delay(&weak, generation)));
        tracing::debug!(delay_ms = delay.as_millis() as u64, "model load scheduled");
        Ok(())
    }

    pub fn snapshot(&self) -> LifecycleSnapshot {
        lock_unpoisoned(&self.shared).state.snapshot()
    }

    pub fn status(&self) -> LifecycleStatus {
        lock_unpoisoned(&self.shared).state.status()
    }

    /// Stop any pending timer without touching the state.
    pub fn cancel(&self) {
        let mut inner = lock_unpoisoned(&self.shared);
        if inner.timers.has_active() {
            tracing::debug!(status = %inner.state.status(), "lifecycle timers cancelled");
        }
        inner.timers.cancel_all();
    }

    /// Put the lifecycle into `Error` from outside, e.g. when a host wants to
    /// exercise the failure screen. The simulated loader never does this on
    /// its own.
    pub fn inject_fault(&self, reason: impl Into<String>) -> Result<(), ControllerError> {
        let mut inner = lock_unpoisoned(&self.shared);
        let reason = reason.into();
        inner.state.fail(reason.clone())?;
        inner.timers.cancel_all();
        tracing::error!(reason = %reason, "model load failed");
        inner.emit();
        Ok(())
    }

    /// Read-only readiness view for the request processor.
    pub fn gate(&self) -> LifecycleGate {
        LifecycleGate {
            shared: Arc::downgrade(&self.shared),
        }
    }
}

impl Drop for LifecycleController {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Reports whether the lifecycle has reached `Ready`. Holds no strong
/// reference, so a dropped controller simply reads as not ready.
#[derive(Clone)]
pub struct LifecycleGate {
    shared: Weak<Mutex<LifecycleInner>>,
}

impl ReadinessGate for LifecycleGate {
    fn is_ready(&self) -> bool {
        self.shared
            .upgrade()
            .map(|shared| lock_unpoisoned(&shared).state.status() == LifecycleStatus::Ready)
            .unwrap_or(false)
    }
}

fn on_start_delay(weak: &Weak<Mutex<LifecycleInner>>, generation: u64) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let mut inner = lock_unpoisoned(&shared);
    if !inner.timers.is_current(generation) {
        return;
    }
    inner.timers.release_delay();

    if let Err(e) = inner.state.begin_loading() {
        tracing::warn!("skipping model load: {}", e);
        return;
    }
    tracing::info!("loading model");
    inner.emit();

    let period = inner.timing.tick_interval;
    let tick_weak = Arc::downgrade(&shared);
    inner.timers.arm_periodic(spawn_periodic(period, move || {
        on_progress_tick(&tick_weak, generation)
    }));
}

fn on_progress_tick(weak: &Weak<Mutex<LifecycleInner>>, generation: u64) -> ControlFlow<()> {
    let Some(shared) = weak.upgrade() else {
        return ControlFlow::Break(());
    };
    let mut inner = lock_unpoisoned(&shared);
    if !inner.timers.is_current(generation) {
        return ControlFlow::Break(());
    }

    let increment = inner.increments.next_increment();
    match inner.state.advance(increment) {
        Ok(ProgressStep::Advanced(progress)) => {
            tracing::trace!(increment, progress, "load progress");
            inner.emit();
            ControlFlow::Continue(())
        }
        Ok(ProgressStep::Completed) => {
            inner.timers.release_periodic();
            tracing::info!("model ready");
            inner.emit();
            ControlFlow::Break(())
        }
        Err(e) => {
            inner.timers.release_periodic();
            tracing::warn!("progress tick outside loading: {}", e);
            ControlFlow::Break(())
        }
    }
}
