//! # gty-core — Foundational Types
//!
//! Shared vocabulary for the Guaranty Stack:
//!
//! - **Identity** ([`identity`]): Domain-primitive newtypes for every entity
//!   identifier. You cannot pass a [`DisputeId`] where a [`GuaranteeId`] is
//!   expected.
//!
//! - **Money** ([`money`]): Monetary amounts as integer minor units.
//!   Floating-point money is structurally impossible.
//!
//! - **Trust** ([`trust`]): The bounded seller trust-score ledger and the
//!   penalty policy keyed to verdict decisions.
//!
//! - **Temporal** ([`temporal`]): Working-day (Mon–Fri) window arithmetic
//!   for the dispute cooling-off period.
//!
//! - **Access** ([`access`]): Capability-set actors resolved once per
//!   request, and the pure guard predicates consumed by every mutating
//!   operation in the stack.
//!
//! ## Crate Policy
//!
//! - No I/O, no storage, no transport. Everything here is deterministic
//!   given its inputs.
//! - Errors use `thiserror` with diagnostic context.

pub mod access;
pub mod error;
pub mod identity;
pub mod money;
pub mod temporal;
pub mod trust;

// Re-export primary types for ergonomic imports.

pub use access::{Actor, Capability, GuaranteeParty, MemberRole, RoleProvider};
pub use error::ValidationError;
pub use identity::{
    BusinessId, DisputeId, GuaranteeId, InvitationId, ProfileId, RestitutionId, UserId, VerdictId,
};
pub use money::Money;
pub use temporal::working_days_between;
pub use trust::{TrustPolicy, TrustScore};
