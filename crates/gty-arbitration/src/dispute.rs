//! # Dispute Lifecycle
//!
//! The adjudication request a buyer raises against a guarantee.
//!
//! ## Transition Graph
//!
//! ```text
//! Pending ──submit_defense() by counter-party──▶ InReview
//!    │                                              │
//!    │ (3 working days elapsed,                 resolve()
//!    │  no defense required)                        │
//!    └──────────────resolve()──────────────────▶ Resolved
//! ```
//!
//! Statuses move strictly forward and never revert. A pending dispute
//! without a defense only becomes arbitrable after
//! [`RESOLUTION_WORKING_DAYS`] working days — the mandatory response
//! window for the counter-party.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use gty_core::{working_days_between, DisputeId, GuaranteeId, UserId, ValidationError};

use crate::error::ArbitrationError;

/// Working days that must elapse before an undefended (still pending)
/// dispute may be resolved.
pub const RESOLUTION_WORKING_DAYS: u32 = 3;

// ── Status ─────────────────────────────────────────────────────────────

/// The lifecycle status of a dispute. Strictly forward-moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeStatus {
    /// Opened by the buyer; the counter-party may still file a defense.
    Pending,
    /// A defense has been filed; awaiting arbitration.
    InReview,
    /// An arbitrator has rendered a verdict. Terminal.
    Resolved,
}

impl DisputeStatus {
    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InReview => "in_review",
            Self::Resolved => "resolved",
        }
    }

    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved)
    }

    /// Whether the dispute still occupies the guarantee's single active
    /// dispute slot.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::InReview)
    }
}

impl std::fmt::Display for DisputeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ── The Dispute ────────────────────────────────────────────────────────

/// An adjudication request against exactly one guarantee.
///
/// References its guarantee by id only; ownership flows strictly
/// Guarantee → Dispute → Verdict → Restitution, never backwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dispute {
    /// Unique dispute identifier.
    pub id: DisputeId,
    /// The guarantee under dispute.
    pub guarantee_id: GuaranteeId,
    /// The buyer who opened the dispute.
    pub initiated_by: UserId,
    /// Short reason for the dispute.
    pub reason: String,
    /// Full description of the complaint.
    pub description: String,
    /// Structured evidence submitted at opening.
    pub evidence: serde_json::Map<String, serde_json::Value>,
    /// The counter-party's structured rebuttal, if filed.
    pub defense: Option<serde_json::Map<String, serde_json::Value>>,
    /// The counter-party's written rebuttal, if filed.
    pub defense_description: Option<String>,
    /// Current lifecycle status.
    pub status: DisputeStatus,
    /// The arbitrator's notes, recorded at resolution.
    pub resolution_notes: Option<String>,
    /// The arbitrator who resolved the dispute.
    pub resolved_by: Option<UserId>,
    /// When the dispute was resolved.
    pub resolved_at: Option<DateTime<Utc>>,
    /// When the dispute was opened.
    pub created_at: DateTime<Utc>,
    /// When the dispute was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Dispute {
    /// Build a pending dispute. Guards (initiator identity, single active
    /// dispute per guarantee) run in
    /// [`GuaranteeCase::open_dispute`](crate::engine::GuaranteeCase::open_dispute),
    /// which is the only caller.
    pub(crate) fn open(
        guarantee_id: GuaranteeId,
        initiated_by: UserId,
        reason: String,
        description: String,
        evidence: serde_json::Map<String, serde_json::Value>,
        now: DateTime<Utc>,
    ) -> Result<Self, ArbitrationError> {
        if reason.trim().is_empty() {
            return Err(ValidationError::EmptyField("reason").into());
        }
        if description.trim().is_empty() {
            return Err(ValidationError::EmptyField("description").into());
        }
        Ok(Self {
            id: DisputeId::new(),
            guarantee_id,
            initiated_by,
            reason,
            description,
            evidence,
            defense: None,
            defense_description: None,
            status: DisputeStatus::Pending,
            resolution_notes: None,
            resolved_by: None,
            resolved_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// File the counter-party's one-shot defense, moving the dispute to
    /// [`InReview`](DisputeStatus::InReview).
    ///
    /// # Errors
    ///
    /// Returns [`ArbitrationError::InvalidTransition`] unless the dispute
    /// is still `Pending`, or [`ArbitrationError::Validation`] for an
    /// empty defense description.
    pub(crate) fn submit_defense(
        &mut self,
        defense: serde_json::Map<String, serde_json::Value>,
        defense_description: String,
        now: DateTime<Utc>,
    ) -> Result<(), ArbitrationError> {
        if self.status != DisputeStatus::Pending {
            return Err(ArbitrationError::InvalidTransition {
                from: self.status.to_string(),
                to: DisputeStatus::InReview.to_string(),
                reason: "the defense window is one-shot and has closed".to_string(),
            });
        }
        if defense_description.trim().is_empty() {
            return Err(ValidationError::EmptyField("defense_description").into());
        }
        self.defense = Some(defense);
        self.defense_description = Some(defense_description);
        self.status = DisputeStatus::InReview;
        self.updated_at = now;
        Ok(())
    }

    /// Record the arbitrator's resolution. State checks have already run in
    /// the engine; this only applies the transition.
    pub(crate) fn mark_resolved(&mut self, resolved_by: UserId, notes: String, now: DateTime<Utc>) {
        self.status = DisputeStatus::Resolved;
        self.resolution_notes = Some(notes);
        self.resolved_by = Some(resolved_by);
        self.resolved_at = Some(now);
        self.updated_at = now;
    }

    /// Whether a defense has been filed.
    pub fn has_defense(&self) -> bool {
        self.defense.is_some()
    }

    /// Working days elapsed since the dispute was opened.
    pub fn working_days_open(&self, now: DateTime<Utc>) -> u32 {
        working_days_between(self.created_at, now)
    }

    /// Whether the dispute is eligible for resolution.
    ///
    /// - `InReview` (a defense was filed): eligible immediately.
    /// - `Pending`: eligible only once [`RESOLUTION_WORKING_DAYS`] working
    ///   days have elapsed since opening — arbitration may then proceed
    ///   without a defense.
    /// - `Resolved`: never.
    pub fn can_be_resolved(&self, now: DateTime<Utc>) -> bool {
        match self.status {
            DisputeStatus::InReview => true,
            DisputeStatus::Resolved => false,
            DisputeStatus::Pending => {
                let elapsed = self.working_days_open(now);
                let eligible = elapsed >= RESOLUTION_WORKING_DAYS;
                debug!(
                    dispute_id = %self.id,
                    created_at = %self.created_at,
                    working_days = elapsed,
                    can_resolve = eligible,
                    "dispute resolution eligibility check"
                );
                eligible
            }
        }
    }
}
