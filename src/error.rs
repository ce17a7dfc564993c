//! Error taxonomy for simulation and facade operations

use thiserror::Error;

/// Errors reported by simulation and session operations.
///
/// None of these leave the world half-advanced: every operation validates
/// before mutating.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// Request not valid in the current state (e.g. jump while airborne).
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: String,
    },
    /// Not enough of a resource (coins, inventory) to complete the request.
    #[error("insufficient resources: need {needed}, have {available}")]
    ResourceExhausted { needed: u64, available: u64 },
    /// A collaborator (storage, presenter, notifier) failed.
    #[error("external effect failed: {0}")]
    ExternalEffect(String),
    /// Internal bookkeeping is inconsistent.
    #[error("integrity violation: {0}")]
    IntegrityViolation(String),
}

impl SimError {
    pub fn invalid(action: &'static str, state: impl std::fmt::Debug) -> Self {
        SimError::InvalidTransition {
            action,
            state: format!("{state:?}"),
        }
    }

    /// Transitions that are silently dropped by the facade
    pub fn is_ignorable(&self) -> bool {
        matches!(self, SimError::InvalidTransition { .. })
    }
}
