//! Owned one-shot and periodic timers backed by Tokio tasks.
//!
//! A [`TimerHandle`] aborts its task when cancelled or dropped, so a timer
//! never outlives the component that armed it. [`TimerSet`] holds the two
//! slots a controller needs (startup delay, periodic tick) together with a
//! generation counter: callbacks capture the generation they were armed
//! under and must ignore themselves once [`TimerSet::cancel_all`] has moved
//! past it.

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Handle to a scheduled timer task. Dropping it aborts the task.
#[derive(Debug)]
pub struct TimerHandle {
    task: Option<JoinHandle<()>>,
}

impl TimerHandle {
    pub fn cancel(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Release the handle without aborting the task.
    ///
    /// Used by a timer callback that releases its own slot: aborting the
    /// running task from inside itself is pointless since it is about to
    /// return.
    pub fn detach(mut self) {
        self.task.take();
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map(|t| t.is_finished()).unwrap_or(true)
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Shortest period a periodic timer runs at; `interval_at` rejects zero.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Run `f` once after `delay`. Must be called from within a Tokio runtime.
pub fn spawn_delay<F>(delay: Duration, f: F) -> TimerHandle
where
    F: FnOnce() + Send + 'static,
{
    let task = tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        f();
    });
    TimerHandle { task: Some(task) }
}

/// Run `f` every `period`, first firing one full period from now, until it
/// returns `ControlFlow::Break`. Must be called from within a Tokio runtime.
///
/// A zero `period` is raised to [`MIN_PERIOD`].
pub fn spawn_periodic<F>(period: Duration, mut f: F) -> TimerHandle
where
    F: FnMut() -> ControlFlow<()> + Send + 'static,
{
    let period = period.max(MIN_PERIOD);
    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if f().is_break() {
                break;
            }
        }
    });
    TimerHandle { task: Some(task) }
}

/// The delay and periodic slots of one controller.
#[derive(Debug, Default)]
pub struct TimerSet {
    generation: u64,
    delay: Option<TimerHandle>,
    periodic: Option<TimerHandle>,
}

impl TimerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True while no `cancel_all` has happened since `generation` was read.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    pub fn arm_delay(&mut self, handle: TimerHandle) {
        if let Some(old) = self.delay.replace(handle) {
            old.cancel();
        }
    }

    /// Install the periodic timer. The delay slot must already be empty.
    pub fn arm_periodic(&mut self, handle: TimerHandle) {
        debug_assert!(self.delay.is_none(), "delay timer still armed");
        if let Some(old) = self.periodic.replace(handle) {
            old.cancel();
        }
    }

    /// Called from the delay callback itself once it has fired.
    pub fn release_delay(&mut self) {
        if let Some(handle) = self.delay.take() {
            handle.detach();
        }
    }

    /// Called from the periodic callback itself when it is about to stop.
    pub fn release_periodic(&mut self) {
        if let Some(handle) = self.periodic.take() {
            handle.detach();
        }
    }

    pub fn has_active(&self) -> bool {
        self.delay.as_ref().is_some_and(|t| !t.is_finished())
            || self.periodic.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Abort both timers and invalidate every callback armed so far.
    /// Safe to call any number of times.
    pub fn cancel_all(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(handle) = self.delay.take() {
            handle.cancel();
        }
        if let Some(handle) = self.periodic.take() {
            handle.cancel();
        }
    }
}

impl Drop for TimerSet {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
