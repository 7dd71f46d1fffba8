//! One console session: the lifecycle controller, the request processor
//! gated on it, and the event bus both publish to.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::backend::ResponseBackend;
use crate::config::ResolvedTiming;
use crate::error::ControllerError;
use crate::events::{EventBus, StateEvent};
use crate::lifecycle::{
    IncrementSource, LifecycleController, LifecycleSnapshot, LoaderTiming, UniformIncrements,
};
use crate::request::{RequestProcessor, RequestSnapshot, StreamTiming};

pub struct Session {
    bus: EventBus,
    lifecycle: LifecycleController,
    processor: RequestProcessor,
}

impl Session {
    pub fn new(timing: &ResolvedTiming, backend: Arc<dyn ResponseBackend>) -> Self {
        let increments = Box::new(UniformIncrements::new(timing.max_progress_increment));
        Self::with_increments(timing, backend, increments)
    }

    pub fn with_increments(
        timing: &ResolvedTiming,
        backend: Arc<dyn ResponseBackend>,
        increments: Box<dyn IncrementSource>,
    ) -> Self {
        let bus = EventBus::new();
        let lifecycle = LifecycleController::new(LoaderTiming::from(timing), increments)
            .with_events(bus.clone());
        let processor = RequestProcessor::new(
            StreamTiming::from(timing),
            Arc::new(lifecycle.gate()),
            backend,
        )
        .with_events(bus.clone());
        Self {
            bus,
            lifecycle,
            processor,
        }
    }

    pub fn start(&self) -> Result<(), ControllerError> {
        self.lifecycle.start()
    }

    pub fn submit(&self, query: &str) -> Result<String, ControllerError> {
        self.processor.submit(query)
    }

    pub fn lifecycle(&self) -> &LifecycleController {
        &self.lifecycle
    }

    pub fn processor(&self) -> &RequestProcessor {
        &self.processor
    }

    pub fn lifecycle_snapshot(&self) -> LifecycleSnapshot {
        self.lifecycle.snapshot()
    }

    pub fn request_snapshot(&self) -> RequestSnapshot {
        self.processor.snapshot()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.bus.subscribe()
    }

    /// Stop every timer of both controllers. Idempotent.
    pub fn cancel(&self) {
        self.processor.cancel();
        self.lifecycle.cancel();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cancel();
    }
}
