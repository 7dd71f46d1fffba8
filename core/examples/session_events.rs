//! Drive one session headless with the `fast` timing profile and print every
//! state event as it arrives.

use std::sync::Arc;

use anyhow::Result;
use quantum_core::api::{
    LifecycleStatus, RequestStatus, ResponseBackend, Session, StateEvent, TimingProfile,
};

struct Canned;

impl ResponseBackend for Canned {
    fn name(&self) -> &str {
        "canned"
    }

    fn compose(&self, query: &str) -> String {
        format!("You asked: {query}")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let session = Session::new(&TimingProfile::Fast.timings(), Arc::new(Canned));
    let mut events = session.subscribe();
    session.start()?;

    while let Ok(event) = events.recv().await {
        match &event {
            StateEvent::LifecycleChanged { snapshot, .. } => {
                println!("{} {:>3}%", snapshot.status, snapshot.percent());
                if snapshot.status == LifecycleStatus::Ready {
                    let id = session.submit("How warm is the sun?")?;
                    println!("submitted {id}");
                }
            }
            StateEvent::RequestChanged { snapshot, .. } => {
                println!(
                    "{} [{}/{}] {}",
                    snapshot.status, snapshot.revealed, snapshot.total, snapshot.partial_output
                );
                if snapshot.status == RequestStatus::Done {
                    break;
                }
            }
        }
    }
    Ok(())
}
