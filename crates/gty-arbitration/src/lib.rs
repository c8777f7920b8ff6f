//! # gty-arbitration — Dispute Resolution
//!
//! Implements the adjudication workflow for guarantees:
//!
//! - **Error** ([`error`]): Structured error hierarchy for the arbitration
//!   subsystem.
//!
//! - **Dispute** ([`dispute`]): The buyer-initiated adjudication request,
//!   its one-shot defense window, and the three-working-day cooling-off
//!   rule that gates resolution.
//!
//! - **Verdict** ([`verdict`]): The arbitrator's binding decision, with an
//!   immutable snapshot of the evidence and defense reviewed.
//!
//! - **Restitution** ([`restitution`]): The financial-remedy workflow
//!   (`pending → processed → completed`) spawned by refund-bearing
//!   verdicts.
//!
//! - **Engine** ([`engine`]): The [`GuaranteeCase`] aggregate that applies
//!   multi-entity transitions — verdict creation, trust-score adjustment,
//!   restitution spawning — as single atomic operations over
//!   caller-hydrated state.
//!
//! ## Crate Policy
//!
//! - Depends on `gty-core` and `gty-state` internally.
//! - No storage and no re-fetching: every operation receives a fully
//!   hydrated aggregate and either applies all of its effects or none.

pub mod dispute;
pub mod engine;
pub mod error;
pub mod restitution;
pub mod verdict;

// Re-export primary types for ergonomic imports.

pub use dispute::{Dispute, DisputeStatus, RESOLUTION_WORKING_DAYS};
pub use engine::GuaranteeCase;
pub use error::ArbitrationError;
pub use restitution::{Restitution, RestitutionStatus};
pub use verdict::{Decision, EvidenceSnapshot, Verdict};
