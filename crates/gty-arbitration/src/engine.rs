//! # Case Engine
//!
//! [`GuaranteeCase`] is the aggregate over one guarantee and its dispute
//! episode: the dispute, the verdict that resolves it, and the restitution
//! the verdict may spawn.
//!
//! The engine owns every multi-entity transition. Callers hydrate the full
//! aggregate up front ([`GuaranteeCase::hydrate`]); no operation re-fetches
//! state mid-flight. Each operation validates everything first and only
//! then mutates, so an error leaves the whole aggregate untouched.
//!
//! ## Security Invariant
//!
//! Trust-score mutation happens here and nowhere else: a penalty exactly
//! once per verdict, a restoration of the same magnitude exactly once per
//! completed restitution. The one-verdict-per-dispute guard is what makes
//! the penalty unrepeatable.

use chrono::{DateTime, Utc};
use tracing::info;

use gty_core::{Actor, Money, TrustPolicy, TrustScore};
use gty_state::Guarantee;

use crate::dispute::{Dispute, DisputeStatus, RESOLUTION_WORKING_DAYS};
use crate::error::ArbitrationError;
use crate::restitution::{Restitution, RestitutionStatus};
use crate::verdict::{Decision, Verdict};

/// A guarantee with its arbitration state, hydrated by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct GuaranteeCase {
    guarantee: Guarantee,
    dispute: Option<Dispute>,
    verdict: Option<Verdict>,
    restitution: Option<Restitution>,
}

impl GuaranteeCase {
    /// Wrap a guarantee with no arbitration history.
    pub fn new(guarantee: Guarantee) -> Self {
        Self {
            guarantee,
            dispute: None,
            verdict: None,
            restitution: None,
        }
    }

    /// Rebuild a case from stored entities, checking that their references
    /// line up.
    ///
    /// # Errors
    ///
    /// Returns [`ArbitrationError::InconsistentCase`] if the dispute does
    /// not reference the guarantee, the verdict does not reference the
    /// dispute, or the restitution does not reference the verdict.
    pub fn hydrate(
        guarantee: Guarantee,
        dispute: Option<Dispute>,
        verdict: Option<Verdict>,
        restitution: Option<Restitution>,
    ) -> Result<Self, ArbitrationError> {
        if let Some(dispute) = &dispute {
            if dispute.guarantee_id != guarantee.id {
                return Err(ArbitrationError::InconsistentCase {
                    reason: "dispute does not reference this guarantee".to_string(),
                });
            }
        }
        if let Some(verdict) = &verdict {
            let Some(dispute) = &dispute else {
                return Err(ArbitrationError::InconsistentCase {
                    reason: "verdict present without its dispute".to_string(),
                });
            };
            if verdict.dispute_id != dispute.id || verdict.guarantee_id != guarantee.id {
                return Err(ArbitrationError::InconsistentCase {
                    reason: "verdict does not reference this dispute".to_string(),
                });
            }
        }
        if let Some(restitution) = &restitution {
            let Some(verdict) = &verdict else {
                return Err(ArbitrationError::InconsistentCase {
                    reason: "restitution present without its verdict".to_string(),
                });
            };
            if restitution.verdict_id != verdict.id {
                return Err(ArbitrationError::InconsistentCase {
                    reason: "restitution does not reference this verdict".to_string(),
                });
            }
        }
        Ok(Self {
            guarantee,
            dispute,
            verdict,
            restitution,
        })
    }

    /// The guarantee under this case.
    pub fn guarantee(&self) -> &Guarantee {
        &self.guarantee
    }

    /// The dispute, if one has been opened.
    pub fn dispute(&self) -> Option<&Dispute> {
        self.dispute.as_ref()
    }

    /// The verdict, if one has been rendered.
    pub fn verdict(&self) -> Option<&Verdict> {
        self.verdict.as_ref()
    }

    /// The restitution obligation, if one exists.
    pub fn restitution(&self) -> Option<&Restitution> {
        self.restitution.as_ref()
    }

    /// Whether an unresolved dispute occupies this case.
    pub fn has_active_dispute(&self) -> bool {
        self.dispute
            .as_ref()
            .is_some_and(|dispute| dispute.status.is_active())
    }

    /// Whether profile and business edits for the connected parties must
    /// be held. True while a dispute is unresolved, so neither side can
    /// rewrite the identity records an arbitrator is looking at.
    pub fn blocks_party_mutation(&self) -> bool {
        self.has_active_dispute()
    }

    /// Whether the prior dispute episode, if any, has fully settled: the
    /// dispute resolved and any restitution completed. A new dispute may
    /// only be opened once this holds.
    fn episode_settled(&self) -> bool {
        match &self.dispute {
            None => true,
            Some(dispute) => {
                dispute.status == DisputeStatus::Resolved
                    && self
                        .restitution
                        .as_ref()
                        .map_or(true, |r| r.status == RestitutionStatus::Completed)
            }
        }
    }

    // ── Transitions ────────────────────────────────────────────────────

    /// Open a dispute against the guarantee. Buyer only, one active
    /// dispute at a time. Allowed from any guarantee status, including
    /// `Completed` and past expiry.
    ///
    /// Atomically opens the dispute and moves the guarantee to `Disputed`.
    ///
    /// # Errors
    ///
    /// - [`ArbitrationError::Unauthorized`] if the caller is not the buyer.
    /// - [`ArbitrationError::DisputeAlreadyActive`] if an unsettled dispute
    ///   episode exists.
    /// - [`ArbitrationError::Validation`] for empty reason or description.
    pub fn open_dispute(
        &mut self,
        actor: &Actor,
        reason: String,
        description: String,
        evidence: serde_json::Map<String, serde_json::Value>,
        now: DateTime<Utc>,
    ) -> Result<&Dispute, ArbitrationError> {
        if !actor.is_user(&self.guarantee.buyer_id) {
            return Err(ArbitrationError::Unauthorized {
                action: "open_dispute",
                required: "buyer",
            });
        }
        if !self.episode_settled() {
            return Err(ArbitrationError::DisputeAlreadyActive {
                guarantee_id: self.guarantee.id.to_string(),
            });
        }

        let dispute = Dispute::open(
            self.guarantee.id,
            actor.user_id,
            reason,
            description,
            evidence,
            now,
        )?;
        self.guarantee.mark_disputed(now);
        info!(
            guarantee_id = %self.guarantee.id,
            dispute_id = %dispute.id,
            initiated_by = %dispute.initiated_by,
            "dispute opened"
        );
        // A fresh episode: drop the settled predecessor's records.
        self.verdict = None;
        self.restitution = None;
        Ok(&*self.dispute.insert(dispute))
    }

    /// File the counter-party's defense against the open dispute, moving
    /// it to `InReview`.
    ///
    /// # Errors
    ///
    /// - [`ArbitrationError::InvalidTransition`] if no dispute is open or
    ///   the defense window has closed.
    /// - [`ArbitrationError::Forbidden`] if the caller initiated the
    ///   dispute.
    /// - [`ArbitrationError::Unauthorized`] if the caller is not a party to
    ///   the guarantee.
    pub fn submit_defense(
        &mut self,
        actor: &Actor,
        defense: serde_json::Map<String, serde_json::Value>,
        defense_description: String,
        now: DateTime<Utc>,
    ) -> Result<(), ArbitrationError> {
        let Some(dispute) = self.dispute.as_mut() else {
            return Err(ArbitrationError::InvalidTransition {
                from: "none".to_string(),
                to: DisputeStatus::InReview.to_string(),
                reason: "no dispute is open against this guarantee".to_string(),
            });
        };
        if actor.is_user(&dispute.initiated_by) {
            return Err(ArbitrationError::Forbidden {
                reason: "the dispute initiator cannot file the defense".to_string(),
            });
        }
        if self.guarantee.party_of(&actor.user_id).is_none() {
            return Err(ArbitrationError::Unauthorized {
                action: "submit_defense",
                required: "counter-party",
            });
        }
        dispute.submit_defense(defense, defense_description, now)?;
        info!(
            guarantee_id = %self.guarantee.id,
            dispute_id = %dispute.id,
            "defense filed, dispute in review"
        );
        Ok(())
    }

    /// Render a verdict and apply its full effect as one operation:
    /// resolve the dispute, penalize the seller's trust score, and either
    /// spawn a restitution obligation (refund-bearing decisions) or close
    /// the guarantee as `Completed` (no refund, seller prevails).
    ///
    /// # Errors
    ///
    /// - [`ArbitrationError::Unauthorized`] if the caller is not an
    ///   arbitrator.
    /// - [`ArbitrationError::AlreadyResolved`] on a second resolution
    ///   attempt; the trust penalty is therefore applied at most once.
    /// - [`ArbitrationError::NotYetResolvable`] while an undefended dispute
    ///   is inside its working-day window.
    /// - [`ArbitrationError::InconsistentCase`] if `seller_score` belongs
    ///   to someone other than the guarantee's seller.
    /// - [`ArbitrationError::Validation`] for a bad decision/amount pairing.
    #[allow(clippy::too_many_arguments)]
    pub fn resolve(
        &mut self,
        actor: &Actor,
        decision: Decision,
        notes: String,
        refund_amount: Option<Money>,
        policy: &TrustPolicy,
        seller_score: &mut TrustScore,
        now: DateTime<Utc>,
    ) -> Result<&Verdict, ArbitrationError> {
        if !actor.is_arbitrator() {
            return Err(ArbitrationError::Unauthorized {
                action: "resolve",
                required: "arbitrator",
            });
        }
        let Some(dispute) = self.dispute.as_mut() else {
            return Err(ArbitrationError::InvalidTransition {
                from: "none".to_string(),
                to: DisputeStatus::Resolved.to_string(),
                reason: "no dispute is open against this guarantee".to_string(),
            });
        };
        if self.verdict.is_some() || dispute.status == DisputeStatus::Resolved {
            return Err(ArbitrationError::AlreadyResolved {
                dispute_id: dispute.id.to_string(),
            });
        }
        if !dispute.can_be_resolved(now) {
            return Err(ArbitrationError::NotYetResolvable {
                dispute_id: dispute.id.to_string(),
                elapsed: dispute.working_days_open(now),
                required: RESOLUTION_WORKING_DAYS,
            });
        }
        if seller_score.user_id != self.guarantee.seller_id {
            return Err(ArbitrationError::InconsistentCase {
                reason: "trust score does not belong to the guarantee's seller".to_string(),
            });
        }

        // Validation complete. Render first (pure), then mutate.
        let verdict = Verdict::render(
            dispute,
            self.guarantee.price,
            actor.user_id,
            decision,
            notes.clone(),
            refund_amount,
            now,
        )?;

        dispute.mark_resolved(actor.user_id, notes, now);
        seller_score.penalize(decision.penalty(policy));

        match verdict.restitution_amount(self.guarantee.price) {
            Some(amount) => {
                self.restitution = Some(Restitution::new(verdict.id, amount, now));
            }
            None => {
                // Seller prevailed; the case closes with nothing owed.
                self.guarantee.mark_completed(now);
            }
        }
        info!(
            guarantee_id = %self.guarantee.id,
            verdict_id = %verdict.id,
            decision = %verdict.decision,
            seller_trust = seller_score.value(),
            "verdict rendered"
        );
        Ok(&*self.verdict.insert(verdict))
    }

    /// Record the seller's restitution payment with proof.
    ///
    /// # Errors
    ///
    /// - [`ArbitrationError::InvalidTransition`] if no restitution is owed
    ///   or payment was already recorded.
    /// - [`ArbitrationError::Unauthorized`] if the caller is not the
    ///   seller.
    /// - [`ArbitrationError::Validation`] for empty proof.
    pub fn process_restitution(
        &mut self,
        actor: &Actor,
        proof_of_payment: String,
        now: DateTime<Utc>,
    ) -> Result<(), ArbitrationError> {
        let Some(restitution) = self.restitution.as_mut() else {
            return Err(ArbitrationError::InvalidTransition {
                from: "none".to_string(),
                to: RestitutionStatus::Processed.to_string(),
                reason: "no restitution is owed on this guarantee".to_string(),
            });
        };
        if !actor.is_user(&self.guarantee.seller_id) {
            return Err(ArbitrationError::Unauthorized {
                action: "process_restitution",
                required: "seller",
            });
        }
        restitution.process(proof_of_payment, now)?;
        info!(
            guarantee_id = %self.guarantee.id,
            restitution_id = %restitution.id,
            "restitution payment recorded"
        );
        Ok(())
    }

    /// Confirm receipt of the restitution, closing the case: the seller's
    /// trust score is restored by the penalty the verdict carried and the
    /// guarantee moves to `Completed`. Buyer or arbitrator only.
    ///
    /// # Errors
    ///
    /// - [`ArbitrationError::InvalidTransition`] if no processed
    ///   restitution is awaiting confirmation.
    /// - [`ArbitrationError::Unauthorized`] if the caller is neither the
    ///   buyer nor an arbitrator.
    /// - [`ArbitrationError::InconsistentCase`] if `seller_score` belongs
    ///   to someone other than the guarantee's seller.
    pub fn complete_restitution(
        &mut self,
        actor: &Actor,
        policy: &TrustPolicy,
        seller_score: &mut TrustScore,
        now: DateTime<Utc>,
    ) -> Result<(), ArbitrationError> {
        let Some(restitution) = self.restitution.as_mut() else {
            return Err(ArbitrationError::InvalidTransition {
                from: "none".to_string(),
                to: RestitutionStatus::Completed.to_string(),
                reason: "no restitution is owed on this guarantee".to_string(),
            });
        };
        if !actor.is_user(&self.guarantee.buyer_id) && !actor.is_arbitrator() {
            return Err(ArbitrationError::Unauthorized {
                action: "complete_restitution",
                required: "buyer or arbitrator",
            });
        }
        let Some(verdict) = self.verdict.as_ref() else {
            return Err(ArbitrationError::InconsistentCase {
                reason: "restitution present without its verdict".to_string(),
            });
        };
        if seller_score.user_id != self.guarantee.seller_id {
            return Err(ArbitrationError::InconsistentCase {
                reason: "trust score does not belong to the guarantee's seller".to_string(),
            });
        }

        restitution.complete(actor.user_id, now)?;
        seller_score.restore(verdict.decision.penalty(policy));
        self.guarantee.mark_completed(now);
        info!(
            guarantee_id = %self.guarantee.id,
            restitution_id = %restitution.id,
            seller_trust = seller_score.value(),
            "restitution confirmed, case closed"
        );
        Ok(())
    }
}
