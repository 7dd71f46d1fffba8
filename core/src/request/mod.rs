//! Single in-flight query: `idle -> queued -> streaming -> done`.

mod processor;
mod state;

pub use processor::{RequestProcessor, StreamTiming};
pub use state::{RequestRun, RequestSnapshot, RequestState, RequestStatus, RevealStep};

/// Whether the model may accept a submission.
pub trait ReadinessGate: Send + Sync {
    fn is_ready(&self) -> bool;
}

/// Gate that is always open, for hosts and tests that skip the loading phase.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysReady;

impl ReadinessGate for AlwaysReady {
    fn is_ready(&self) -> bool {
        true
    }
}
