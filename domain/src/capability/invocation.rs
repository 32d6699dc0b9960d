//! Invocation state machine.
//!
//! Tracks one call through the dispatcher. There is no retry state; a
//! terminal invocation stays terminal.
//!
//! # State Transitions
//!
//! ```text
//! Received ──> Validating ──> Validated ──> Executing ──> Succeeded
//!    │              │                           └──────> Failed
//!    │              └──> Rejected
//!    └──> Rejected            (unknown capability)
//! ```
//!
//! `Rejected` and `Failed` both map onto a failure envelope, `Succeeded`
//! onto a success envelope.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one invocation, unique within a dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvocationId(String);

impl InvocationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationPhase {
    Received,
    Validating,
    Rejected,
    Validated,
    Executing,
    Succeeded,
    Failed,
}

impl InvocationPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Validating => "validating",
            Self::Rejected => "rejected",
            Self::Validated => "validated",
            Self::Executing => "executing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Succeeded | Self::Failed)
    }

    pub fn can_transition_to(&self, next: InvocationPhase) -> bool {
        use InvocationPhase::*;
        matches!(
            (self, next),
            (Received, Validating)
                | (Received, Rejected)
                | (Validating, Rejected)
                | (Validating, Validated)
                | (Validated, Executing)
                | (Executing, Succeeded)
                | (Executing, Failed)
        )
    }
}

impl fmt::Display for InvocationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One tracked call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub id: InvocationId,
    pub capability: String,
    phase: InvocationPhase,
}

impl Invocation {
    pub fn new(id: impl Into<String>, capability: impl Into<String>) -> Self {
        Self {
            id: InvocationId::new(id),
            capability: capability.into(),
            phase: InvocationPhase::Received,
        }
    }

    pub fn phase(&self) -> InvocationPhase {
        self.phase
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Move to `next`.
    ///
    /// # Panics
    ///
    /// On an illegal transition; the dispatcher drives the machine and never
    /// skips a step, so this indicates a bug in the caller.
    pub fn advance(&mut self, next: InvocationPhase) {
        assert!(
            self.phase.can_transition_to(next),
            "invocation {} of '{}': illegal transition {} -> {}",
            self.id,
            self.capability,
            self.phase,
            next
        );
        self.phase = next;
    }
}
