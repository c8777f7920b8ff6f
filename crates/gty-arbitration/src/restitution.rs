//! # Restitution Workflow
//!
//! The financial-remedy record spawned by a refund-bearing verdict. The
//! seller processes the payment and attaches proof; the buyer (or an
//! arbitrator on the buyer's behalf) confirms receipt, which restores the
//! seller's trust score by the penalty the verdict carried.
//!
//! ## Transition Graph
//!
//! ```text
//! Pending ──process() by seller──▶ Processed ──complete() by buyer──▶ Completed
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gty_core::{Money, RestitutionId, UserId, ValidationError, VerdictId};

use crate::error::ArbitrationError;

// ── Status ─────────────────────────────────────────────────────────────

/// The lifecycle status of a restitution. Strictly forward-moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestitutionStatus {
    /// Awaiting payment by the seller.
    Pending,
    /// Seller has paid and attached proof; awaiting buyer confirmation.
    Processed,
    /// Buyer confirmed receipt. Terminal.
    Completed,
}

impl RestitutionStatus {
    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processed => "processed",
            Self::Completed => "completed",
        }
    }

    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for RestitutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ── The Restitution ────────────────────────────────────────────────────

/// A payment obligation created by a refund-bearing verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restitution {
    /// Unique restitution identifier.
    pub id: RestitutionId,
    /// The verdict that created this obligation.
    pub verdict_id: VerdictId,
    /// The amount owed to the buyer.
    pub amount: Money,
    /// Current lifecycle status.
    pub status: RestitutionStatus,
    /// Seller-supplied payment proof, attached at processing.
    pub proof_of_payment: Option<String>,
    /// When the seller processed the payment.
    pub processed_at: Option<DateTime<Utc>>,
    /// When the buyer confirmed receipt.
    pub completed_at: Option<DateTime<Utc>>,
    /// Who confirmed receipt (buyer, or arbitrator acting for them).
    pub completed_by: Option<UserId>,
    /// When the obligation was created.
    pub created_at: DateTime<Utc>,
}

impl Restitution {
    /// Build a pending obligation. Called by the engine when a
    /// refund-bearing verdict is applied.
    pub(crate) fn new(verdict_id: VerdictId, amount: Money, now: DateTime<Utc>) -> Self {
        Self {
            id: RestitutionId::new(),
            verdict_id,
            amount,
            status: RestitutionStatus::Pending,
            proof_of_payment: None,
            processed_at: None,
            completed_at: None,
            completed_by: None,
            created_at: now,
        }
    }

    /// Record the seller's payment with proof, moving the obligation to
    /// [`Processed`](RestitutionStatus::Processed).
    ///
    /// # Errors
    ///
    /// Returns [`ArbitrationError::InvalidTransition`] unless the status is
    /// `Pending`, or [`ArbitrationError::Validation`] for empty proof.
    pub(crate) fn process(
        &mut self,
        proof_of_payment: String,
        now: DateTime<Utc>,
    ) -> Result<(), ArbitrationError> {
        if self.status != RestitutionStatus::Pending {
            return Err(ArbitrationError::InvalidTransition {
                from: self.status.to_string(),
                to: RestitutionStatus::Processed.to_string(),
                reason: "payment may only be recorded once".to_string(),
            });
        }
        if proof_of_payment.trim().is_empty() {
            return Err(ValidationError::EmptyField("proof_of_payment").into());
        }
        self.proof_of_payment = Some(proof_of_payment);
        self.processed_at = Some(now);
        self.status = RestitutionStatus::Processed;
        Ok(())
    }

    /// Record the buyer's confirmation of receipt, moving the obligation to
    /// [`Completed`](RestitutionStatus::Completed).
    ///
    /// # Errors
    ///
    /// Returns [`ArbitrationError::InvalidTransition`] unless the status is
    /// `Processed`.
    pub(crate) fn complete(
        &mut self,
        completed_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<(), ArbitrationError> {
        if self.status != RestitutionStatus::Processed {
            return Err(ArbitrationError::InvalidTransition {
                from: self.status.to_string(),
                to: RestitutionStatus::Completed.to_string(),
                reason: "receipt may only be confirmed after payment is processed".to_string(),
            });
        }
        self.completed_by = Some(completed_by);
        self.completed_at = Some(now);
        self.status = RestitutionStatus::Completed;
        Ok(())
    }
}
