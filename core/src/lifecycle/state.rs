//! Model loading state machine, independent of any timer.

use serde::Serialize;

use crate::error::ControllerError;

/// Upper bound of loading progress, in percent.
pub const PROGRESS_COMPLETE: f64 = 100.0;

/// Coarse model status as seen by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleStatus {
    Unloaded,
    Loading,
    Ready,
    Error,
}

impl LifecycleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unloaded => "unloaded",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Error => "error",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Error)
    }
}

impl std::fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum LifecycleState {
    #[default]
    Unloaded,
    Loading { progress: f64 },
    Ready,
    Error { reason: String },
}

/// Result of applying one progress increment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressStep {
    /// Still loading, with the new progress value.
    Advanced(f64),
    /// Progress reached 100 and the model is ready.
    Completed,
}

/// Read-only copy of the lifecycle for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifecycleSnapshot {
    pub status: LifecycleStatus,
    pub progress: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LifecycleSnapshot {
    /// Progress rounded to a whole percent, for labels.
    pub fn percent(&self) -> u8 {
        self.progress.round().clamp(0.0, PROGRESS_COMPLETE) as u8
    }

    pub fn is_ready(&self) -> bool {
        self.status == LifecycleStatus::Ready
    }
}

impl LifecycleState {
    pub fn status(&self) -> LifecycleStatus {
        match self {
            Self::Unloaded => LifecycleStatus::Unloaded,
            Self::Loading { .. } => LifecycleStatus::Loading,
            Self::Ready => LifecycleStatus::Ready,
            Self::Error { .. } => LifecycleStatus::Error,
        }
    }

    pub fn snapshot(&self) -> LifecycleSnapshot {
        let (progress, error) = match self {
            Self::Unloaded => (0.0, None),
            Self::Loading { progress } => (*progress, None),
            Self::Ready => (PROGRESS_COMPLETE, None),
            Self::Error { reason } => (0.0, Some(reason.clone())),
        };
        LifecycleSnapshot {
            status: self.status(),
            progress,
            error,
        }
    }

    /// Unloaded -> Loading at progress 0.
    pub fn begin_loading(&mut self) -> Result<(), ControllerError> {
        match self {
            Self::Unloaded => {
                *self = Self::Loading { progress: 0.0 };
                Ok(())
            }
            other => Err(invalid("begin loading", other.status())),
        }
    }

    /// Add `increment` to the loading progress.
    ///
    /// Negative or NaN increments count as zero so progress never goes back.
    /// Reaching 100 clamps and moves to `Ready`.
    pub fn advance(&mut self, increment: f64) -> Result<ProgressStep, ControllerError> {
        let Self::Loading { progress } = self else {
            return Err(invalid("advance progress", self.status()));
        };
        let step = if increment.is_nan() {
            0.0
        } else {
            increment.max(0.0)
        };
        let next = *progress + step;
        if next >= PROGRESS_COMPLETE {
            *self = Self::Ready;
            Ok(ProgressStep::Completed)
        } else {
            *progress = next;
            Ok(ProgressStep::Advanced(next))
        }
    }

    /// Unloaded/Loading -> Error. Ready and Error are terminal.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), ControllerError> {
        match self {
            Self::Unloaded | Self::Loading { .. } => {
                *self = Self::Error {
                    reason: reason.into(),
                };
                Ok(())
            }
            other => Err(invalid("fail", other.status())),
        }
    }
}

fn invalid(operation: &'static str, from: LifecycleStatus) -> ControllerError {
    ControllerError::InvalidStateTransition {
        operation,
        from: from.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fixed_increments_reach_ready() {
        let mut state = LifecycleState::default();
        state.begin_loading().unwrap();

        let mut seen = Vec::new();
        for inc in [10.0, 20.0, 30.0, 25.0, 20.0] {
            state.advance(inc).unwrap();
            seen.push(state.snapshot().progress);
        }
        assert_eq!(seen, vec![10.0, 30.0, 60.0, 85.0, 100.0]);
        assert_eq!(state.status(), LifecycleStatus::Ready);
    }

    #[test]
    fn test_progress_never_decreases() {
        let mut state = LifecycleState::default();
        state.begin_loading().unwrap();
        state.advance(40.0).unwrap();
        state.advance(-5.0).unwrap();
        state.advance(f64::NAN).unwrap();
        assert_eq!(state.snapshot().progress, 40.0);
    }

    #[test]
    fn test_exact_hundred_completes() {
        let mut state = LifecycleState::Loading { progress: 85.0 };
        assert_eq!(state.advance(15.0).unwrap(), ProgressStep::Completed);
        assert_eq!(state.snapshot().progress, 100.0);
    }

    #[test]
    fn test_invalid_transitions() {
        let mut state = LifecycleState::default();
        assert!(state.advance(1.0).is_err());

        state.begin_loading().unwrap();
        assert!(state.begin_loading().is_err());

        state.advance(100.0).unwrap();
        assert!(state.advance(1.0).is_err());
        assert!(state.fail("late").is_err());
        assert_eq!(state, LifecycleState::Ready);
    }

    #[test]
    fn test_fail_from_loading() {
        let mut state = LifecycleState::Loading { progress: 42.0 };
        state.fail("weights corrupted").unwrap();
        let snap = state.snapshot();
        assert_eq!(snap.status, LifecycleStatus::Error);
        assert_eq!(snap.error.as_deref(), Some("weights corrupted"));
        assert!(snap.status.is_terminal());
    }

    #[test]
    fn test_percent_rounds() {
        let snap = LifecycleState::Loading { progress: 42.6 }.snapshot();
        assert_eq!(snap.percent(), 43);
    }
}
