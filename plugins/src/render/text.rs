use std::io::{self, Write};

use indicatif::{ProgressBar, ProgressStyle};
use quantum_core::api::{LifecycleSnapshot, LifecycleStatus, RequestSnapshot, RequestStatus};
use quantum_core::api::{SnapshotRenderer, StateEvent};

/// Plain-text headless output.
///
/// Loading progress goes to an indicatif bar on stderr; the response is
/// written to `out` as it is revealed, so piping stdout yields exactly the
/// response text.
pub struct TextRenderer {
    out: Box<dyn Write + Send>,
    bar: ProgressBar,
    request_id: Option<String>,
    printed: usize,
}

impl TextRenderer {
    pub fn new(out: Box<dyn Write + Send>, show_progress: bool) -> Self {
        let bar = if show_progress {
            let bar = ProgressBar::new(100);
            let style = ProgressStyle::default_bar()
                .template("{msg} {bar:40.cyan/blue} {pos:>3}%")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓▒░  ");
            bar.set_style(style);
            bar.set_message("Initializing system...");
            bar
        } else {
            ProgressBar::hidden()
        };
        Self {
            out,
            bar,
            request_id: None,
            printed: 0,
        }
    }

    fn on_lifecycle(&mut self, snap: &LifecycleSnapshot) {
        match snap.status {
            LifecycleStatus::Unloaded => {}
            LifecycleStatus::Loading => {
                self.bar.set_message("Loading Quantum Model");
                self.bar.set_position(u64::from(snap.percent()));
            }
            LifecycleStatus::Ready => {
                self.bar.set_position(100);
                self.bar.finish_with_message("Model Ready");
            }
            LifecycleStatus::Error => {
                self.bar.abandon_with_message(
                    "Failed to load model. Please restart and try again.",
                );
            }
        }
    }

    fn on_request(&mut self, snap: &RequestSnapshot) -> io::Result<()> {
        if snap.request_id != self.request_id {
            tracing::debug!(request_id = ?snap.request_id, "text renderer following new request");
            self.request_id = snap.request_id.clone();
            self.printed = 0;
        }

        let fresh: String = snap.partial_output.chars().skip(self.printed).collect();
        if !fresh.is_empty() {
            self.printed += fresh.chars().count();
            self.out.write_all(fresh.as_bytes())?;
        }
        if snap.status == RequestStatus::Done {
            self.out.write_all(b"\n")?;
        }
        self.out.flush()
    }
}

impl SnapshotRenderer for TextRenderer {
    fn name(&self) -> &str {
        "text-renderer"
    }

    fn format(&self) -> &str {
        "text"
    }

    fn render(&mut self, event: &StateEvent) -> io::Result<()> {
        match event {
            StateEvent::LifecycleChanged { snapshot, .. } => {
                self.on_lifecycle(snapshot);
                Ok(())
            }
            StateEvent::RequestChanged { snapshot, .. } => self.on_request(snapshot),
        }
    }

    fn finish(&mut self) -> io::Result<()> {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn request(id: &str, status: RequestStatus, partial: &str, total: usize) -> StateEvent {
        StateEvent::request(RequestSnapshot {
            status,
            request_id: Some(id.to_string()),
            query: Some("q".to_string()),
            partial_output: partial.to_string(),
            revealed: partial.chars().count(),
            total,
        })
    }

    #[test]
    fn test_writes_only_new_characters() {
        let buf = Captured::default();
        let mut r = TextRenderer::new(Box::new(buf.clone()), false);

        r.render(&request("a", RequestStatus::Queued, "", 3)).unwrap();
        r.render(&request("a", RequestStatus::Streaming, "", 3)).unwrap();
        r.render(&request("a", RequestStatus::Streaming, "h", 3)).unwrap();
        r.render(&request("a", RequestStatus::Streaming, "hé", 3)).unwrap();
        r.render(&request("a", RequestStatus::Done, "héy", 3)).unwrap();
        r.finish().unwrap();

        assert_eq!(buf.text(), "héy\n");
    }

    #[test]
    fn test_new_request_restarts_output() {
        let buf = Captured::default();
        let mut r = TextRenderer::new(Box::new(buf.clone()), false);

        r.render(&request("a", RequestStatus::Done, "one", 3)).unwrap();
        r.render(&request("b", RequestStatus::Queued, "", 3)).unwrap();
        r.render(&request("b", RequestStatus::Done, "two", 3)).unwrap();

        assert_eq!(buf.text(), "one\ntwo\n");
    }

    #[test]
    fn test_lifecycle_events_leave_stdout_alone() {
        let buf = Captured::default();
        let mut r = TextRenderer::new(Box::new(buf.clone()), false);
        for (status, progress) in [
            (LifecycleStatus::Loading, 0.0),
            (LifecycleStatus::Loading, 55.5),
            (LifecycleStatus::Ready, 100.0),
        ] {
            let event = StateEvent::lifecycle(LifecycleSnapshot {
                status,
                progress,
                error: None,
            });
            r.render(&event).unwrap();
        }
        r.finish().unwrap();
        assert_eq!(buf.text(), "");
    }
}
