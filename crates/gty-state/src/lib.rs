//! # gty-state — Lifecycle State Machines
//!
//! Runtime-validated lifecycle state machines for the Guaranty Stack:
//!
//! - **Guarantee** ([`guarantee`]): The bilateral service agreement.
//!   `Draft → Accepted → Active → Completed/Cancelled`, with `Disputed`
//!   reachable from any point by either party. Activation happens
//!   automatically when both parties have consented — the only implicit
//!   transition in the system.
//!
//! - **Invitation** ([`invitation`]): Business-membership invitations.
//!   `Pending → Accepted/Rejected/Expired`, plus the idempotent sweep that
//!   flips pending invitations past their expiry.
//!
//! ## Design Choice: Validated Enum over Typestate
//!
//! Guarantees are stored in databases and crossed over APIs where the state
//! is not known at compile time, and `Disputed` is reachable from almost
//! every state (including `Completed`). A validated enum with guard-first
//! transition methods serializes directly via serde and keeps the
//! dispute-diversion rule in one place instead of duplicating it across
//! `impl` blocks per state type.

pub mod error;
pub mod guarantee;
pub mod invitation;

pub use error::{GuaranteeError, InvitationError};
pub use guarantee::{Guarantee, GuaranteeStatus, StatusUpdate};
pub use invitation::{sweep_expired, Invitation, InvitationStatus};
