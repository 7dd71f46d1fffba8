//! Single-request state machine, independent of any timer.

use serde::Serialize;

use crate::error::{ControllerError, RejectReason};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Idle,
    Queued,
    Streaming,
    Done,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Queued => "queued",
            Self::Streaming => "streaming",
            Self::Done => "done",
        }
    }

    /// Queued or streaming: a submission is in flight.
    pub fn is_processing(self) -> bool {
        matches!(self, Self::Queued | Self::Streaming)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One accepted submission. The query and its response never change after
/// the run is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRun {
    id: String,
    query: String,
    target: String,
    target_chars: usize,
}

impl RequestRun {
    pub fn new(id: impl Into<String>, query: impl Into<String>, target: impl Into<String>) -> Self {
        let target = target.into();
        let target_chars = target.chars().count();
        Self {
            id: id.into(),
            query: query.into(),
            target,
            target_chars,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Length of the full response, in characters.
    pub fn target_len(&self) -> usize {
        self.target_chars
    }

    /// The first `chars` characters of the response.
    pub fn prefix(&self, chars: usize) -> &str {
        match self.target.char_indices().nth(chars) {
            Some((idx, _)) => &self.target[..idx],
            None => &self.target,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Queued {
        run: RequestRun,
    },
    Streaming {
        run: RequestRun,
        revealed: usize,
    },
    Done {
        run: RequestRun,
    },
}

/// Result of one reveal tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealStep {
    Advanced(usize),
    Completed,
}

/// Read-only copy of the request state for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestSnapshot {
    pub status: RequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub partial_output: String,
    pub revealed: usize,
    pub total: usize,
}

impl RequestSnapshot {
    pub fn is_processing(&self) -> bool {
        self.status.is_processing()
    }

    pub fn is_complete(&self) -> bool {
        self.status == RequestStatus::Done
    }
}

impl RequestState {
    pub fn status(&self) -> RequestStatus {
        match self {
            Self::Idle => RequestStatus::Idle,
            Self::Queued { .. } => RequestStatus::Queued,
            Self::Streaming { .. } => RequestStatus::Streaming,
            Self::Done { .. } => RequestStatus::Done,
        }
    }

    pub fn run(&self) -> Option<&RequestRun> {
        match self {
            Self::Idle => None,
            Self::Queued { run } | Self::Streaming { run, .. } | Self::Done { run } => Some(run),
        }
    }

    pub fn revealed(&self) -> usize {
        match self {
            Self::Idle | Self::Queued { .. } => 0,
            Self::Streaming { revealed, .. } => *revealed,
            Self::Done { run } => run.target_len(),
        }
    }

    pub fn snapshot(&self) -> RequestSnapshot {
        let revealed = self.revealed();
        RequestSnapshot {
            status: self.status(),
            request_id: self.run().map(|r| r.id().to_string()),
            query: self.run().map(|r| r.query().to_string()),
            partial_output: self
                .run()
                .map(|r| r.prefix(revealed).to_string())
                .unwrap_or_default(),
            revealed,
            total: self.run().map(RequestRun::target_len).unwrap_or(0),
        }
    }

    pub fn accepts_submission(&self) -> bool {
        matches!(self, Self::Idle | Self::Done { .. })
    }

    /// Idle/Done -> Queued, replacing any finished run.
    pub fn queue(&mut self, run: RequestRun) -> Result<(), ControllerError> {
        if !self.accepts_submission() {
            return Err(ControllerError::RequestRejected(
                RejectReason::RequestInFlight,
            ));
        }
        *self = Self::Queued { run };
        Ok(())
    }

    /// Queued -> Streaming with nothing revealed yet.
    pub fn begin_streaming(&mut self) -> Result<(), ControllerError> {
        match std::mem::take(self) {
            Self::Queued { run } => {
                *self = Self::Streaming { run, revealed: 0 };
                Ok(())
            }
            other => {
                let from = other.status();
                *self = other;
                Err(invalid("begin streaming", from))
            }
        }
    }

    /// Reveal up to `chunk` more characters. Moves to `Done` on the tick that
    /// reveals the last character, or on the first tick of an empty response.
    pub fn reveal(&mut self, chunk: usize) -> Result<RevealStep, ControllerError> {
        let Self::Streaming { run, revealed } = self else {
            return Err(invalid("reveal output", self.status()));
        };
        let total = run.target_len();
        let next = revealed.saturating_add(chunk.max(1)).min(total);
        if next >= total {
            if let Self::Streaming { run, .. } = std::mem::take(self) {
                *self = Self::Done { run };
            }
            return Ok(RevealStep::Completed);
        }
        *revealed = next;
        Ok(RevealStep::Advanced(next))
    }
}

fn invalid(operation: &'static str, from: RequestStatus) -> ControllerError {
    ControllerError::InvalidStateTransition {
        operation,
        from: from.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(target: &str) -> RequestRun {
        RequestRun::new("req-1", "hello", target)
    }

    #[test]
    fn test_reveal_one_char_per_tick() {
        let mut state = RequestState::Idle;
        state.queue(run("abc")).unwrap();
        state.begin_streaming().unwrap();

        assert_eq!(state.reveal(1).unwrap(), RevealStep::Advanced(1));
        assert_eq!(state.snapshot().partial_output, "a");
        assert_eq!(state.reveal(1).unwrap(), RevealStep::Advanced(2));
        assert_eq!(state.reveal(1).unwrap(), RevealStep::Completed);

        let snap = state.snapshot();
        assert_eq!(snap.status, RequestStatus::Done);
        assert_eq!(snap.partial_output, "abc");
        assert_eq!(snap.revealed, 3);
    }

    #[test]
    fn test_empty_target_completes_on_first_tick() {
        let mut state = RequestState::Queued { run: run("") };
        state.begin_streaming().unwrap();
        assert_eq!(state.reveal(1).unwrap(), RevealStep::Completed);
        assert_eq!(state.snapshot().revealed, 0);
        assert_eq!(state.status(), RequestStatus::Done);
    }

    #[test]
    fn test_chunks_never_overshoot() {
        let mut state = RequestState::Queued { run: run("abcde") };
        state.begin_streaming().unwrap();
        assert_eq!(state.reveal(4).unwrap(), RevealStep::Advanced(4));
        assert_eq!(state.reveal(4).unwrap(), RevealStep::Completed);
        assert_eq!(state.snapshot().revealed, 5);
    }

    #[test]
    fn test_prefix_respects_char_boundaries() {
        let r = run("héllo");
        assert_eq!(r.target_len(), 5);
        assert_eq!(r.prefix(2), "hé");
        assert_eq!(r.prefix(10), "héllo");
    }

    #[test]
    fn test_queue_rejected_while_in_flight() {
        let mut state = RequestState::Queued { run: run("abc") };
        let err = state.queue(run("other")).unwrap_err();
        assert_eq!(
            err,
            ControllerError::RequestRejected(RejectReason::RequestInFlight)
        );
        assert_eq!(state.run().map(RequestRun::target), Some("abc"));

        state.begin_streaming().unwrap();
        assert!(state.queue(run("other")).is_err());
    }

    #[test]
    fn test_done_accepts_new_run() {
        let mut state = RequestState::Done { run: run("abc") };
        state.queue(RequestRun::new("req-2", "again", "xyz")).unwrap();
        assert_eq!(state.status(), RequestStatus::Queued);
        assert_eq!(state.snapshot().partial_output, "");
    }

    #[test]
    fn test_invalid_transitions_leave_state() {
        let mut state = RequestState::Idle;
        assert!(state.begin_streaming().is_err());
        assert!(state.reveal(1).is_err());
        assert_eq!(state, RequestState::Idle);
    }
}
