#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use quantum_core::backend::ResponseBackend;
use quantum_core::config::ResolvedTiming;
use quantum_core::events::StateEvent;
use quantum_core::lifecycle::FixedIncrements;
use quantum_core::session::Session;
use tokio::sync::broadcast;

/// Deterministic backend used across the integration tests.
pub struct EchoBackend;

impl ResponseBackend for EchoBackend {
    fn name(&self) -> &str {
        "echo"
    }

    fn compose(&self, query: &str) -> String {
        format!("Response to query: \"{query}\"")
    }
}

/// Backend that answers with nothing at all.
pub struct SilentBackend;

impl ResponseBackend for SilentBackend {
    fn name(&self) -> &str {
        "silent"
    }

    fn compose(&self, _query: &str) -> String {
        String::new()
    }
}

pub fn reference_timing() -> ResolvedTiming {
    ResolvedTiming::default()
}

pub fn session_with(increments: &[f64], backend: Arc<dyn ResponseBackend>) -> Session {
    Session::with_increments(
        &reference_timing(),
        backend,
        Box::new(FixedIncrements::new(increments.iter().copied())),
    )
}

/// Let virtual time run forward by `ms`, firing every timer due on the way.
pub async fn settle(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

/// Started session already past the loading phase (one 100-point tick).
pub async fn ready_session(backend: Arc<dyn ResponseBackend>) -> Session {
    let session = session_with(&[100.0], backend);
    session.start().expect("start");
    // 800ms startup delay + one 400ms tick
    settle(1_205).await;
    assert!(session.lifecycle_snapshot().is_ready());
    session
}

pub fn drain(rx: &mut broadcast::Receiver<StateEvent>) -> Vec<StateEvent> {
    let mut out = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        out.push(ev);
    }
    out
}
