//! # Lifecycle Error Types
//!
//! Structured errors for guarantee and invitation transitions. Every error
//! is local, synchronous, and non-retryable; a failed transition leaves the
//! entity untouched.

use thiserror::Error;

use gty_core::{GuaranteeParty, ValidationError};

/// Errors from guarantee lifecycle transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuaranteeError {
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

    /// The party has already given consent.
    #[error("{party} has already consented")]
    AlreadyConsented {
        /// Which side's consent flag was already set.
        party: GuaranteeParty,
    },

    /// Completion requires both parties' consent.
    #[error("both parties must consent before the guarantee can be completed")]
    ConsentRequired,

    /// The guarantee's expiry timestamp has passed.
    #[error("guarantee {guarantee_id} has expired")]
    Expired {
        /// The expired guarantee.
        guarantee_id: String,
    },

    /// Malformed or missing input.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Errors from invitation lifecycle transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvitationError {
    /// The invitation is not in a status that permits the transition.
    #[error("invitation cannot move from {from} to {to}")]
    InvalidTransition {
        /// Status before the attempted transition.
        from: String,
        /// Requested target status.
        to: String,
    },

    /// The invitation's expiry timestamp has passed.
    #[error("invitation {invitation_id} has expired")]
    Expired {
        /// The expired invitation.
        invitation_id: String,
    },
}
