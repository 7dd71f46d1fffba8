use std::pin::Pin;
use std::time::Duration;

use quantum_core::api::Session;
use tokio::time::Sleep;

pub mod flow_headless;
pub mod flow_tui;

pub use flow_headless as headless;
pub use flow_tui as tui;

/// One-shot timer behind `--inject-load-fault`.
pub struct FaultTimer {
    sleep: Option<Pin<Box<Sleep>>>,
}

impl FaultTimer {
    pub fn new(after_ms: Option<u64>) -> Self {
        Self {
            sleep: after_ms.map(|ms| Box::pin(tokio::time::sleep(Duration::from_millis(ms)))),
        }
    }

    pub fn disabled() -> Self {
        Self { sleep: None }
    }

    /// Resolves once when the deadline passes; pending forever afterwards or
    /// when no fault was requested.
    pub async fn fired(&mut self) {
        match self.sleep.as_mut() {
            Some(sleep) => {
                sleep.await;
                self.sleep = None;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

/// Fail the model load, unless it already reached a terminal state.
pub fn inject_fault(session: &Session) {
    if let Err(e) = session.lifecycle().inject_fault("injected load fault") {
        tracing::warn!("load fault not injected: {}", e);
    }
}
