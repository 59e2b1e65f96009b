/// Run state definitions for a single crawl
use serde::Serialize;
use std::fmt;

/// Represents the lifecycle state of one crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    /// Created, seed not yet enqueued
    #[default]
    Idle,

    /// The crawl loop is executing
    Running,

    // ===== Terminal States =====
    /// Frontier drained or page budget reached
    Completed,

    /// Cancelled from outside; partial results are kept
    Aborted,
}

impl RunState {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Aborted)
    }

    /// Returns true if moving from `self` to `next` is allowed
    ///
    /// There is no pause state, so `Running` goes straight to either
    /// terminal state and terminal states go nowhere.
    pub fn can_transition_to(&self, next: RunState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Aborted)
        )
    }

    /// Moves to `next`, returning the previous state
    ///
    /// # Errors
    ///
    /// `HarvestError::InvalidTransition` if the move is not allowed; `self`
    /// is left unchanged.
    pub fn transition(&mut self, next: RunState) -> crate::Result<RunState> {
        if !self.can_transition_to(next) {
            return Err(crate::HarvestError::InvalidTransition {
                from: *self,
                to: next,
            });
        }
        Ok(std::mem::replace(self, next))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
