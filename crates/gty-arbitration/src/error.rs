//! # Arbitration Error Types
//!
//! Structured errors for the dispute/verdict/restitution subsystem. All
//! errors are local, synchronous, and non-retryable; there are no transient
//! failures inside the core. A failed operation leaves every entity in the
//! aggregate untouched, so callers may treat any error as a no-op.

use thiserror::Error;

use gty_core::ValidationError;

/// Errors from arbitration operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArbitrationError {
    /// The caller is not the right actor for this action.
    #[error("unauthorized: {action} may only be performed by the {required}")]
    Unauthorized {
        /// The attempted action.
        action: &'static str,
        /// Who may perform it.
        required: &'static str,
    },

    /// The caller is a valid actor but a business rule forbids the action.
    #[error("forbidden: {reason}")]
    Forbidden {
        /// Why the action is refused.
        reason: String,
    },

    /// The current status does not permit the requested transition.
    #[error("invalid transition from {from} to {to}: {reason}")]
    InvalidTransition {
        /// Status before the attempted transition.
        from: String,
        /// Requested target status.
        to: String,
        /// Why the transition is rejected.
        reason: String,
    },

    /// The dispute already has a verdict; resolution happens exactly once.
    #[error("dispute {dispute_id} is already resolved")]
    AlreadyResolved {
        /// The dispute in question.
        dispute_id: String,
    },

    /// The guarantee already has a pending or in-review dispute.
    #[error("guarantee {guarantee_id} already has an active dispute")]
    DisputeAlreadyActive {
        /// The guarantee in question.
        guarantee_id: String,
    },

    /// The cooling-off window for an undefended dispute has not elapsed.
    #[error(
        "dispute {dispute_id} is not yet resolvable: {elapsed} of {required} working days elapsed"
    )]
    NotYetResolvable {
        /// The dispute in question.
        dispute_id: String,
        /// Working days elapsed since the dispute was opened.
        elapsed: u32,
        /// Working days required before arbitration may proceed.
        required: u32,
    },

    /// The hydrated aggregate's references do not line up.
    #[error("inconsistent aggregate: {reason}")]
    InconsistentCase {
        /// Which reference failed to match.
        reason: String,
    },

    /// Malformed or missing input.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
