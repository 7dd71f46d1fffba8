use thiserror::Error;

/// Why a submission was turned away by the request processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    LifecycleNotReady,
    RequestInFlight,
    EmptyQuery,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            Self::LifecycleNotReady => "model is not ready",
            Self::RequestInFlight => "a request is already in flight",
            Self::EmptyQuery => "query is empty",
        };
        f.write_str(msg)
    }
}

/// Errors raised by the lifecycle controller and the request processor.
///
/// Both variants are local and recoverable: the controller state is left
/// exactly as it was before the rejected call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    #[error("invalid state transition: cannot {operation} while {from}")]
    InvalidStateTransition {
        operation: &'static str,
        from: &'static str,
    },

    #[error("request rejected: {0}")]
    RequestRejected(RejectReason),
}

impl ControllerError {
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::RequestRejected(_))
    }
}
