//! Interactive flow: one `Session` per screen, rebuilt on Ctrl+R, redrawn on
//! every controller event, key press and UI tick.
use std::io;
use std::sync::Arc;
use std::time::Duration;

use quantum_core::api::{CliError, ResolvedTiming, ResponseBackend, Session, TuiConfig};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::broadcast::error::RecvError;

use super::{inject_fault, FaultTimer};
use crate::tui::events::{InputEvent, InputReader};
use crate::tui::{restore_terminal, setup_terminal, ui, TuiAction, TuiApp};

pub async fn run_tui_flow(
    cfg: &TuiConfig,
    timing: &ResolvedTiming,
    backend: Arc<dyn ResponseBackend>,
    fault_after_ms: Option<u64>,
) -> Result<i32, CliError> {
    let mut terminal = setup_terminal().map_err(CliError::Terminal)?;
    tracing::debug!("TUI: starting interactive loop");
    let result = run_loop(&mut terminal, cfg, timing, backend, fault_after_ms).await;
    // Sessions are dropped (and their timers cancelled) inside run_loop.
    restore_terminal(&mut terminal);
    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    cfg: &TuiConfig,
    timing: &ResolvedTiming,
    backend: Arc<dyn ResponseBackend>,
    fault_after_ms: Option<u64>,
) -> Result<i32, CliError> {
    let (input_reader, mut input_rx) = InputReader::start();
    let mut app = TuiApp::new(cfg.clone());
    let redraw_every = Duration::from_millis(cfg.update_interval_ms.max(16));

    'session: loop {
        let session = Session::new(timing, Arc::clone(&backend));
        let mut events = session.subscribe();
        session.start()?;
        let mut fault = FaultTimer::new(fault_after_ms);
        let mut tick = tokio::time::interval(redraw_every);

        app.sync(session.lifecycle_snapshot(), session.request_snapshot());
        draw(terminal, &app)?;

        loop {
            tokio::select! {
                ev = events.recv() => match ev {
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "TUI: skipped events, redrawing from snapshots");
                    }
                    Err(RecvError::Closed) => {
                        return Err(CliError::Anyhow(anyhow::anyhow!("event bus closed")));
                    }
                },
                Some(input) = input_rx.recv() => match input {
                    InputEvent::Key(key) => match app.handle_key(key) {
                        TuiAction::None => {}
                        TuiAction::Submit(query) => match session.submit(&query) {
                            Ok(id) => tracing::debug!(request_id = %id, "TUI: query submitted"),
                            Err(e) => {
                                tracing::warn!("TUI: submission rejected: {}", e);
                                app.set_notice(e.to_string());
                            }
                        },
                        TuiAction::Restart => {
                            tracing::info!("TUI: restarting session");
                            session.cancel();
                            app.reset();
                            continue 'session;
                        }
                        TuiAction::Quit => {
                            session.cancel();
                            break 'session;
                        }
                    },
                    InputEvent::Resize => {}
                },
                _ = fault.fired() => inject_fault(&session),
                _ = tick.tick() => app.tick(),
            }

            app.sync(session.lifecycle_snapshot(), session.request_snapshot());
            draw(terminal, &app)?;
        }
    }

    input_reader.stop();
    Ok(0)
}

fn draw(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &TuiApp,
) -> Result<(), CliError> {
    terminal
        .draw(|f| ui::draw(f, app))
        .map(|_| ())
        .map_err(|e| CliError::Terminal(e.to_string()))
}
