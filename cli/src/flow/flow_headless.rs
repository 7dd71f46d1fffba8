//! Headless flow: the same controllers as the TUI, with output going to a
//! `SnapshotRenderer` instead of the terminal UI.
use std::sync::Arc;

use quantum_core::api::{
    CliError, LifecycleStatus, RequestStatus, ResolvedTiming, ResponseBackend, Session,
    SnapshotRenderer, StateEvent,
};
use tokio::sync::broadcast::error::RecvError;

use super::{inject_fault, FaultTimer};

/// Exit code reported when the run is interrupted with Ctrl+C.
pub const EXIT_INTERRUPTED: i32 = 130;

pub async fn run_headless_flow(
    timing: &ResolvedTiming,
    backend: Arc<dyn ResponseBackend>,
    prompt: Option<&str>,
    renderer: Box<dyn SnapshotRenderer>,
    fault: FaultTimer,
) -> Result<i32, CliError> {
    let session = Session::new(timing, backend);
    drive_session(&session, prompt, renderer, fault).await
}

/// Start `session`, render every event, submit `prompt` once the model is
/// ready and return when its response is complete. Without a prompt the
/// flow ends as soon as the model is ready.
pub async fn drive_session(
    session: &Session,
    prompt: Option<&str>,
    mut renderer: Box<dyn SnapshotRenderer>,
    mut fault: FaultTimer,
) -> Result<i32, CliError> {
    let mut events = session.subscribe();
    session.start()?;
    tracing::debug!(
        renderer = renderer.name(),
        format = renderer.format(),
        has_prompt = prompt.is_some(),
        "headless flow started"
    );

    let mut submitted: Option<String> = None;
    let outcome = loop {
        let batch = tokio::select! {
            ev = events.recv() => match ev {
                Ok(event) => vec![event],
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event receiver lagged, resyncing from snapshots");
                    vec![
                        StateEvent::lifecycle(session.lifecycle_snapshot()),
                        StateEvent::request(session.request_snapshot()),
                    ]
                }
                Err(RecvError::Closed) => {
                    break Err(CliError::Anyhow(anyhow::anyhow!("event bus closed")));
                }
            },
            _ = fault.fired() => {
                inject_fault(session);
                continue;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                break Ok(EXIT_INTERRUPTED);
            }
        };

        let mut finished = None;
        for event in &batch {
            if let Err(e) = renderer.render(event) {
                finished = Some(Err(e.into()));
                break;
            }
            match on_event(session, event, prompt, &mut submitted) {
                Ok(None) => {}
                Ok(Some(code)) => {
                    finished = Some(Ok(code));
                    break;
                }
                Err(e) => {
                    finished = Some(Err(e));
                    break;
                }
            }
        }
        if let Some(result) = finished {
            break result;
        }
    };

    session.cancel();
    let flushed = renderer.finish();
    let code = outcome?;
    flushed?;
    Ok(code)
}

fn on_event(
    session: &Session,
    event: &StateEvent,
    prompt: Option<&str>,
    submitted: &mut Option<String>,
) -> Result<Option<i32>, CliError> {
    match event {
        StateEvent::LifecycleChanged { snapshot, .. } => match snapshot.status {
            LifecycleStatus::Error => Err(CliError::LoadFailed(
                snapshot
                    .error
                    .clone()
                    .unwrap_or_else(|| "unknown error".to_string()),
            )),
            LifecycleStatus::Ready => match prompt {
                None => Ok(Some(0)),
                Some(query) if submitted.is_none() => {
                    let id = session.submit(query)?;
                    tracing::info!(request_id = %id, "prompt submitted");
                    *submitted = Some(id);
                    Ok(None)
                }
                Some(_) => Ok(None),
            },
            LifecycleStatus::Unloaded | LifecycleStatus::Loading => Ok(None),
        },
        StateEvent::RequestChanged { snapshot, .. } => {
            let ours = submitted.is_some() && snapshot.request_id == *submitted;
            Ok((ours && snapshot.status == RequestStatus::Done).then_some(0))
        }
    }
}
