//! # Verdicts
//!
//! An arbitrator's binding decision on a resolved dispute. Exactly one
//! verdict exists per dispute, created atomically with the dispute's
//! transition to `Resolved`.
//!
//! ## Security Invariant
//!
//! The verdict snapshots the evidence and defense it was decided on.
//! The snapshot is immutable after creation and forms the audit trail for
//! the decision — later edits to the dispute cannot rewrite what the
//! arbitrator reviewed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gty_core::{
    DisputeId, GuaranteeId, GuaranteeParty, Money, TrustPolicy, UserId, ValidationError, VerdictId,
};

use crate::dispute::Dispute;
use crate::error::ArbitrationError;

// ── Decision ───────────────────────────────────────────────────────────

/// The arbitration outcome.
///
/// The winning party is derived, not stored: [`NoRefund`](Decision::NoRefund)
/// means the seller prevailed; any refund-bearing decision means the buyer
/// did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Full refund of the guarantee price.
    Refund,
    /// Refund of an arbitrator-specified amount below the price.
    PartialRefund,
    /// No remedy owed; the seller prevails.
    NoRefund,
}

impl Decision {
    /// The canonical string name of this decision.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Refund => "refund",
            Self::PartialRefund => "partial_refund",
            Self::NoRefund => "no_refund",
        }
    }

    /// Whether this decision spawns a restitution workflow.
    pub fn requires_restitution(&self) -> bool {
        !matches!(self, Self::NoRefund)
    }

    /// The trust-score penalty this decision carries under `policy`.
    pub fn penalty(&self, policy: &TrustPolicy) -> u8 {
        match self {
            Self::Refund => policy.refund_penalty,
            Self::PartialRefund => policy.partial_refund_penalty,
            Self::NoRefund => 0,
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ── Evidence Snapshot ──────────────────────────────────────────────────

/// The material the arbitrator reviewed, frozen at decision time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceSnapshot {
    /// The initiator's evidence as it stood at resolution.
    pub evidence: serde_json::Map<String, serde_json::Value>,
    /// The counter-party's defense, if one was filed.
    pub defense: Option<serde_json::Map<String, serde_json::Value>>,
}

// ── The Verdict ────────────────────────────────────────────────────────

/// An arbitrator's binding decision on a dispute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Unique verdict identifier.
    pub id: VerdictId,
    /// The dispute this verdict resolves.
    pub dispute_id: DisputeId,
    /// The guarantee the dispute was raised against.
    pub guarantee_id: GuaranteeId,
    /// The arbitrator who rendered the decision.
    pub arbitrator_id: UserId,
    /// The outcome.
    pub decision: Decision,
    /// Arbitrator-specified amount; present only for
    /// [`PartialRefund`](Decision::PartialRefund).
    pub refund_amount: Option<Money>,
    /// The arbitrator's written reasoning.
    pub notes: String,
    /// Immutable snapshot of the evidence and defense reviewed.
    pub evidence_reviewed: EvidenceSnapshot,
    /// When the decision was rendered.
    pub decided_at: DateTime<Utc>,
}

impl Verdict {
    /// Render a verdict against a dispute.
    ///
    /// Validates the decision/amount pairing against the guarantee price;
    /// no state is touched. The engine applies the verdict together with
    /// the dispute transition and trust-score penalty.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::EmptyField`] for empty notes.
    /// - [`ValidationError::MissingField`] if a partial refund carries no
    ///   amount.
    /// - [`ValidationError::RefundExceedsPrice`] if the amount exceeds the
    ///   guarantee price.
    /// - [`ValidationError::InvalidAmount`] if an amount is supplied for a
    ///   decision that does not take one.
    pub(crate) fn render(
        dispute: &Dispute,
        guarantee_price: Money,
        arbitrator_id: UserId,
        decision: Decision,
        notes: String,
        refund_amount: Option<Money>,
        now: DateTime<Utc>,
    ) -> Result<Self, ArbitrationError> {
        if notes.trim().is_empty() {
            return Err(ValidationError::EmptyField("notes").into());
        }
        let refund_amount = match (decision, refund_amount) {
            (Decision::PartialRefund, Some(amount)) => {
                if amount.is_zero() {
                    return Err(ValidationError::InvalidAmount(
                        "partial refund amount must be greater than zero".to_string(),
                    )
                    .into());
                }
                if amount > guarantee_price {
                    return Err(ValidationError::RefundExceedsPrice {
                        refund: amount,
                        price: guarantee_price,
                    }
                    .into());
                }
                Some(amount)
            }
            (Decision::PartialRefund, None) => {
                return Err(ValidationError::MissingField {
                    field: "refund_amount",
                    context: "for partial refunds",
                }
                .into());
            }
            (_, Some(_)) => {
                return Err(ValidationError::InvalidAmount(
                    "refund_amount only applies to partial refunds".to_string(),
                )
                .into());
            }
            (_, None) => None,
        };

        Ok(Self {
            id: VerdictId::new(),
            dispute_id: dispute.id,
            guarantee_id: dispute.guarantee_id,
            arbitrator_id,
            decision,
            refund_amount,
            notes,
            evidence_reviewed: EvidenceSnapshot {
                evidence: dispute.evidence.clone(),
                defense: dispute.defense.clone(),
            },
            decided_at: now,
        })
    }

    /// The restitution owed under this verdict: the full price for a
    /// refund, the arbitrator's amount for a partial refund, nothing
    /// otherwise.
    pub fn restitution_amount(&self, guarantee_price: Money) -> Option<Money> {
        match self.decision {
            Decision::Refund => Some(guarantee_price),
            Decision::PartialRefund => self.refund_amount,
            Decision::NoRefund => None,
        }
    }

    /// The party this verdict favours.
    pub fn prevailing_party(&self) -> GuaranteeParty {
        match self.decision {
            Decision::NoRefund => GuaranteeParty::Seller,
            Decision::Refund | Decision::PartialRefund => GuaranteeParty::Buyer,
        }
    }
}
