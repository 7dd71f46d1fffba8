use std::io::{self, Write};

use quantum_core::api::{SnapshotRenderer, StateEvent};
use serde_json::{json, Value};

/// One JSON object per state change, for scripting against the console.
pub struct JsonlRenderer {
    out: Box<dyn Write + Send>,
    pretty_print: bool,
}

impl JsonlRenderer {
    pub fn new(out: Box<dyn Write + Send>, pretty_print: bool) -> Self {
        Self { out, pretty_print }
    }

    fn event_to_json(&self, event: &StateEvent) -> Value {
        let ts = event.timestamp().to_rfc3339();
        match event {
            StateEvent::LifecycleChanged { snapshot, .. } => json!({
                "v": 1,
                "event_type": event.name(),
                "ts": ts,
                "data": snapshot,
            }),
            StateEvent::RequestChanged { snapshot, .. } => json!({
                "v": 1,
                "event_type": event.name(),
                "ts": ts,
                "request_id": snapshot.request_id,
                "data": snapshot,
            }),
        }
    }
}

impl SnapshotRenderer for JsonlRenderer {
    fn name(&self) -> &str {
        "jsonl-renderer"
    }

    fn format(&self) -> &str {
        "jsonl"
    }

    fn render(&mut self, event: &StateEvent) -> io::Result<()> {
        let value = self.event_to_json(event);
        let line = if self.pretty_print {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        }
        .map_err(io::Error::other)?;
        writeln!(self.out, "{}", line)?;
        self.out.flush()
    }

    fn finish(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quantum_core::api::{LifecycleSnapshot, LifecycleStatus, RequestSnapshot, RequestStatus};

    fn renderer() -> JsonlRenderer {
        JsonlRenderer::new(Box::new(io::sink()), false)
    }

    #[test]
    fn test_lifecycle_event_shape() {
        let event = StateEvent::lifecycle(LifecycleSnapshot {
            status: LifecycleStatus::Loading,
            progress: 12.5,
            error: None,
        });
        let value = renderer().event_to_json(&event);
        assert_eq!(value["v"], 1);
        assert_eq!(value["event_type"], "lifecycle.changed");
        assert_eq!(value["data"]["status"], "loading");
        assert_eq!(value["data"]["progress"], 12.5);
        assert!(value["data"].get("error").is_none());
    }

    #[test]
    fn test_request_event_carries_id() {
        let event = StateEvent::request(RequestSnapshot {
            status: RequestStatus::Streaming,
            request_id: Some("req-9".to_string()),
            query: Some("hi".to_string()),
            partial_output: "Re".to_string(),
            revealed: 2,
            total: 20,
        });
        let value = renderer().event_to_json(&event);
        assert_eq!(value["event_type"], "request.changed");
        assert_eq!(value["request_id"], "req-9");
        assert_eq!(value["data"]["partial_output"], "Re");
        assert_eq!(value["data"]["total"], 20);
    }
}
