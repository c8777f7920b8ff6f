//! # Guarantee Lifecycle
//!
//! Models the bilateral service agreement between a seller and a buyer,
//! owned by the seller's business.
//!
//! ## Transition Graph
//!
//! ```text
//! Draft ──accept() by buyer──▶ Accepted
//!                                  │
//!                     give_consent() by each party
//!                                  │ (both flags set)
//!                                  ▼
//!                               Active ──update_status(Completed) by buyer──▶ Completed
//!                                  │
//!                update_status(Cancelled)──▶ Cancelled
//!
//! update_status(Disputed): either party, from any state — including
//! Completed. A delivered service can still be retroactively disputed.
//! ```
//!
//! Activation is implicit: the moment the second consent flag is set, the
//! status becomes [`Active`](GuaranteeStatus::Active). This is the only
//! implicit transition in the system; callers must not assume that giving
//! consent leaves the status unchanged.
//!
//! Expiry (`expires_at`) disables every buyer/seller action except raising
//! a dispute.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use gty_core::{
    Actor, BusinessId, GuaranteeId, GuaranteeParty, Money, UserId, ValidationError,
};

use crate::error::GuaranteeError;

// ── Status ─────────────────────────────────────────────────────────────

/// The lifecycle status of a guarantee.
///
/// `Pending` and `InProgress` exist in the stored schema but are reserved:
/// no transition in this module produces them. The reachable set is
/// `Draft`, `Accepted`, `Active`, `Completed`, `Cancelled`, `Disputed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuaranteeStatus {
    /// Created by the seller; awaiting the buyer's acceptance.
    Draft,
    /// Reserved schema status. Not produced by any transition.
    Pending,
    /// Accepted by the buyer; awaiting consent from both sides.
    Accepted,
    /// Reserved schema status. Not produced by any transition.
    InProgress,
    /// Both parties have consented; the agreement is in force.
    Active,
    /// The buyer has confirmed delivery, or arbitration closed in the
    /// prevailing party's favour.
    Completed,
    /// Cancelled before completion.
    Cancelled,
    /// A dispute has been raised against the guarantee.
    Disputed,
}

impl GuaranteeStatus {
    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::InProgress => "in_progress",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Disputed => "disputed",
        }
    }
}

impl std::fmt::Display for GuaranteeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A status change requested by a party via [`Guarantee::update_status`].
///
/// Only these three targets are reachable on request; `Accepted` and
/// `Active` have dedicated paths (`accept`, `give_consent`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusUpdate {
    /// Buyer confirms delivery.
    Completed,
    /// Withdraw from the agreement.
    Cancelled,
    /// Divert into arbitration.
    Disputed,
}

impl StatusUpdate {
    fn target(&self) -> GuaranteeStatus {
        match self {
            Self::Completed => GuaranteeStatus::Completed,
            Self::Cancelled => GuaranteeStatus::Cancelled,
            Self::Disputed => GuaranteeStatus::Disputed,
        }
    }
}

// ── The Guarantee ──────────────────────────────────────────────────────

/// A bilateral service agreement.
///
/// Owned exclusively by its seller/buyer/business triad. Disputes reference
/// a guarantee but never own it; ownership flows strictly
/// Guarantee → Dispute → Verdict → Restitution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guarantee {
    /// Unique guarantee identifier.
    pub id: GuaranteeId,
    /// The seller offering the service.
    pub seller_id: UserId,
    /// The buyer receiving the service.
    pub buyer_id: UserId,
    /// The business the seller acts for.
    pub business_id: BusinessId,
    /// What is being guaranteed.
    pub service_description: String,
    /// Agreed price.
    pub price: Money,
    /// Structured agreement terms (opaque key/value bag).
    pub terms: serde_json::Map<String, serde_json::Value>,
    /// Current lifecycle status.
    pub status: GuaranteeStatus,
    /// The seller's consent to activate.
    pub seller_consent: bool,
    /// The buyer's consent to activate.
    pub buyer_consent: bool,
    /// Optional expiry; past this instant only dispute-raising remains.
    pub expires_at: Option<DateTime<Utc>>,
    /// When the buyer accepted the draft.
    pub accepted_at: Option<DateTime<Utc>>,
    /// When the guarantee reached `Completed`.
    pub completed_at: Option<DateTime<Utc>>,
    /// When the guarantee was cancelled.
    pub cancelled_at: Option<DateTime<Utc>>,
    /// When the guarantee was created.
    pub created_at: DateTime<Utc>,
    /// When the guarantee was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Guarantee {
    /// Create a guarantee in [`Draft`](GuaranteeStatus::Draft) status, with
    /// the acting user as seller.
    ///
    /// # Errors
    ///
    /// Returns [`GuaranteeError::Validation`] if the seller is not a member
    /// of `business_id`, the service description is empty, or the expiry is
    /// not in the future.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        actor: &Actor,
        business_id: BusinessId,
        buyer_id: UserId,
        service_description: String,
        terms: serde_json::Map<String, serde_json::Value>,
        price: Money,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Self, GuaranteeError> {
        if !actor.is_business_member(&business_id) {
            return Err(ValidationError::SellerNotBusinessMember {
                business_id: business_id.to_string(),
            }
            .into());
        }
        if service_description.trim().is_empty() {
            return Err(ValidationError::EmptyField("service_description").into());
        }
        if let Some(expiry) = expires_at {
            if expiry <= now {
                return Err(ValidationError::ExpiryInPast.into());
            }
        }

        let guarantee = Self {
            id: GuaranteeId::new(),
            seller_id: actor.user_id,
            buyer_id,
            business_id,
            service_description,
            price,
            terms,
            status: GuaranteeStatus::Draft,
            seller_consent: false,
            buyer_consent: false,
            expires_at,
            accepted_at: None,
            completed_at: None,
            cancelled_at: None,
            created_at: now,
            updated_at: now,
        };
        debug!(guarantee_id = %guarantee.id, seller_id = %guarantee.seller_id, "guarantee drafted");
        Ok(guarantee)
    }

    /// Accept the draft. Buyer only.
    ///
    /// # Errors
    ///
    /// Returns [`GuaranteeError::Unauthorized`] if the caller is not the
    /// buyer, or [`GuaranteeError::InvalidTransition`] if the guarantee is
    /// not in `Draft` status.
    pub fn accept(&mut self, actor: &Actor, now: DateTime<Utc>) -> Result<(), GuaranteeError> {
        if !actor.is_user(&self.buyer_id) {
            return Err(GuaranteeError::Unauthorized {
                action: "accept",
                required: "buyer",
            });
        }
        if self.status != GuaranteeStatus::Draft {
            return Err(GuaranteeError::InvalidTransition {
                from: self.status.to_string(),
                to: GuaranteeStatus::Accepted.to_string(),
                reason: "a guarantee can only be accepted while in draft".to_string(),
            });
        }
        self.status = GuaranteeStatus::Accepted;
        self.accepted_at = Some(now);
        self.touch(now);
        info!(guarantee_id = %self.id, buyer_id = %self.buyer_id, "guarantee accepted");
        Ok(())
    }

    /// Record the calling party's consent. When the second consent lands,
    /// the status becomes [`Active`](GuaranteeStatus::Active) automatically.
    ///
    /// Returns which side consented.
    ///
    /// # Errors
    ///
    /// Returns [`GuaranteeError::Unauthorized`] for non-parties,
    /// [`GuaranteeError::AlreadyConsented`] if the flag was already set,
    /// or [`GuaranteeError::Expired`] past expiry.
    pub fn give_consent(
        &mut self,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<GuaranteeParty, GuaranteeError> {
        let party = self.party_of(&actor.user_id).ok_or(GuaranteeError::Unauthorized {
            action: "give_consent",
            required: "seller or buyer",
        })?;
        let flag = match party {
            GuaranteeParty::Seller => self.seller_consent,
            GuaranteeParty::Buyer => self.buyer_consent,
        };
        if flag {
            return Err(GuaranteeError::AlreadyConsented { party });
        }
        if self.is_expired(now) {
            return Err(GuaranteeError::Expired {
                guarantee_id: self.id.to_string(),
            });
        }

        match party {
            GuaranteeParty::Seller => self.seller_consent = true,
            GuaranteeParty::Buyer => self.buyer_consent = true,
        }
        if self.has_consent() {
            self.status = GuaranteeStatus::Active;
            info!(guarantee_id = %self.id, "both parties consented, guarantee active");
        }
        self.touch(now);
        Ok(party)
    }

    /// Move to `Completed`, `Cancelled`, or `Disputed` on a party's request.
    ///
    /// Guards per target:
    ///
    /// - **Completed**: buyer only, both consents required, not expired.
    /// - **Cancelled**: refused once completed; refused to the seller once
    ///   the buyer has consented (the buyer's commitment is protected);
    ///   the buyer may cancel any time before completion; not past expiry.
    /// - **Disputed**: either party, any time — even post-completion or
    ///   post-expiry.
    ///
    /// # Errors
    ///
    /// [`GuaranteeError::Unauthorized`], [`GuaranteeError::Forbidden`],
    /// [`GuaranteeError::InvalidTransition`],
    /// [`GuaranteeError::ConsentRequired`], or [`GuaranteeError::Expired`]
    /// per the guards above.
    pub fn update_status(
        &mut self,
        actor: &Actor,
        update: StatusUpdate,
        now: DateTime<Utc>,
    ) -> Result<(), GuaranteeError> {
        let party = self.party_of(&actor.user_id).ok_or(GuaranteeError::Unauthorized {
            action: "update_status",
            required: "seller or buyer",
        })?;

        match update {
            StatusUpdate::Completed => {
                if self.is_expired(now) {
                    return Err(GuaranteeError::Expired {
                        guarantee_id: self.id.to_string(),
                    });
                }
                if party != GuaranteeParty::Buyer {
                    return Err(GuaranteeError::Unauthorized {
                        action: "complete",
                        required: "buyer",
                    });
                }
                if !self.has_consent() {
                    return Err(GuaranteeError::ConsentRequired);
                }
                self.status = GuaranteeStatus::Completed;
                self.completed_at = Some(now);
            }
            StatusUpdate::Cancelled => {
                if self.is_expired(now) {
                    return Err(GuaranteeError::Expired {
                        guarantee_id: self.id.to_string(),
                    });
                }
                if self.status == GuaranteeStatus::Completed {
                    return Err(GuaranteeError::InvalidTransition {
                        from: self.status.to_string(),
                        to: GuaranteeStatus::Cancelled.to_string(),
                        reason: "a completed guarantee cannot be cancelled; raise a dispute instead"
                            .to_string(),
                    });
                }
                if party == GuaranteeParty::Seller && self.buyer_consent {
                    return Err(GuaranteeError::Forbidden {
                        reason: "the seller cannot cancel after the buyer has consented"
                            .to_string(),
                    });
                }
                self.status = GuaranteeStatus::Cancelled;
                self.cancelled_at = Some(now);
            }
            StatusUpdate::Disputed => {
                // Dispute diversion is always available to either party,
                // including on expired or completed guarantees.
                self.status = GuaranteeStatus::Disputed;
            }
        }
        self.touch(now);
        info!(
            guarantee_id = %self.id,
            status = %self.status,
            by = %party,
            "guarantee status updated"
        );
        Ok(())
    }

    /// Force the status to `Disputed`. Called by the arbitration layer when
    /// a dispute is opened; its guards have already run.
    pub fn mark_disputed(&mut self, now: DateTime<Utc>) {
        self.status = GuaranteeStatus::Disputed;
        self.touch(now);
    }

    /// Force the status to `Completed`. Called by the arbitration layer
    /// when a verdict or restitution closes the case in a party's favour.
    pub fn mark_completed(&mut self, now: DateTime<Utc>) {
        self.status = GuaranteeStatus::Completed;
        self.completed_at = Some(now);
        self.touch(now);
    }

    /// Which side of the guarantee the given user is on, if any.
    pub fn party_of(&self, user_id: &UserId) -> Option<GuaranteeParty> {
        if *user_id == self.seller_id {
            Some(GuaranteeParty::Seller)
        } else if *user_id == self.buyer_id {
            Some(GuaranteeParty::Buyer)
        } else {
            None
        }
    }

    /// The user on the given side.
    pub fn party_user(&self, party: GuaranteeParty) -> UserId {
        match party {
            GuaranteeParty::Seller => self.seller_id,
            GuaranteeParty::Buyer => self.buyer_id,
        }
    }

    /// Whether both parties have consented.
    pub fn has_consent(&self) -> bool {
        self.seller_consent && self.buyer_consent
    }

    /// Whether the guarantee's expiry has passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expiry| expiry < now)
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 24, 9, 0, 0).unwrap()
    }

    fn member_actor(business_id: BusinessId) -> Actor {
        Actor::with_capabilities(
            UserId::new(),
            Some(gty_core::ProfileId::new()),
            [gty_core::Capability::BusinessMember(business_id)],
        )
    }

    fn draft_guarantee() -> (Guarantee, Actor, Actor) {
        let business_id = BusinessId::new();
        let seller = member_actor(business_id);
        let buyer = Actor::plain(UserId::new());
        let guarantee = Guarantee::create(
            &seller,
            business_id,
            buyer.user_id,
            "Two-week kitchen renovation".to_string(),
            serde_json::Map::new(),
            Money::from_major(100_000).unwrap(),
            None,
            now(),
        )
        .unwrap();
        (guarantee, seller, buyer)
    }

    #[test]
    fn create_starts_in_draft() {
        let (guarantee, seller, _) = draft_guarantee();
        assert_eq!(guarantee.status, GuaranteeStatus::Draft);
        assert_eq!(guarantee.seller_id, seller.user_id);
        assert!(!guarantee.seller_consent);
        assert!(!guarantee.buyer_consent);
        assert!(guarantee.accepted_at.is_none());
    }

    #[test]
    fn create_requires_business_membership() {
        let business_id = BusinessId::new();
        let outsider = Actor::plain(UserId::new());
        let result = Guarantee::create(
            &outsider,
            business_id,
            UserId::new(),
            "Logo design".to_string(),
            serde_json::Map::new(),
            Money::from_major(500).unwrap(),
            None,
            now(),
        );
        assert!(matches!(result, Err(GuaranteeError::Validation(_))));
    }

    #[test]
    fn create_rejects_empty_description_and_past_expiry() {
        let business_id = BusinessId::new();
        let seller = member_actor(business_id);
        assert!(matches!(
            Guarantee::create(
                &seller,
                business_id,
                UserId::new(),
                "   ".to_string(),
                serde_json::Map::new(),
                Money::ZERO,
                None,
                now(),
            ),
            Err(GuaranteeError::Validation(ValidationError::EmptyField(_)))
        ));
        assert!(matches!(
            Guarantee::create(
                &seller,
                business_id,
                UserId::new(),
                "Catering".to_string(),
                serde_json::Map::new(),
                Money::ZERO,
                Some(now() - chrono::Duration::hours(1)),
                now(),
            ),
            Err(GuaranteeError::Validation(ValidationError::ExpiryInPast))
        ));
    }

    #[test]
    fn admin_may_create_for_any_business() {
        let business_id = BusinessId::new();
        let admin = Actor::with_capabilities(UserId::new(), None, [gty_core::Capability::Admin]);
        let guarantee = Guarantee::create(
            &admin,
            business_id,
            UserId::new(),
            "Freight".to_string(),
            serde_json::Map::new(),
            Money::from_major(10).unwrap(),
            None,
            now(),
        );
        assert!(guarantee.is_ok());
    }

    #[test]
    fn only_buyer_accepts_and_only_from_draft() {
        let (mut guarantee, seller, buyer) = draft_guarantee();

        assert!(matches!(
            guarantee.accept(&seller, now()),
            Err(GuaranteeError::Unauthorized { .. })
        ));

        guarantee.accept(&buyer, now()).unwrap();
        assert_eq!(guarantee.status, GuaranteeStatus::Accepted);
        assert_eq!(guarantee.accepted_at, Some(now()));

        assert!(matches!(
            guarantee.accept(&buyer, now()),
            Err(GuaranteeError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn consent_from_both_parties_activates() {
        let (mut guarantee, seller, buyer) = draft_guarantee();
        guarantee.accept(&buyer, now()).unwrap();

        assert_eq!(
            guarantee.give_consent(&seller, now()).unwrap(),
            GuaranteeParty::Seller
        );
        assert_eq!(guarantee.status, GuaranteeStatus::Accepted);

        assert_eq!(
            guarantee.give_consent(&buyer, now()).unwrap(),
            GuaranteeParty::Buyer
        );
        assert_eq!(guarantee.status, GuaranteeStatus::Active);
        assert!(guarantee.has_consent());
    }

    #[test]
    fn double_consent_is_rejected() {
        let (mut guarantee, seller, _) = draft_guarantee();
        guarantee.give_consent(&seller, now()).unwrap();
        assert_eq!(
            guarantee.give_consent(&seller, now()),
            Err(GuaranteeError::AlreadyConsented {
                party: GuaranteeParty::Seller
            })
        );
    }

    #[test]
    fn consent_rejected_after_expiry() {
        let business_id = BusinessId::new();
        let seller = member_actor(business_id);
        let mut guarantee = Guarantee::create(
            &seller,
            business_id,
            UserId::new(),
            "Event photography".to_string(),
            serde_json::Map::new(),
            Money::from_major(2_000).unwrap(),
            Some(now() + chrono::Duration::days(1)),
            now(),
        )
        .unwrap();

        let after_expiry = now() + chrono::Duration::days(2);
        assert!(matches!(
            guarantee.give_consent(&seller, after_expiry),
            Err(GuaranteeError::Expired { .. })
        ));
        assert!(!guarantee.seller_consent);
    }

    #[test]
    fn non_party_cannot_consent_or_update() {
        let (mut guarantee, _, _) = draft_guarantee();
        let stranger = Actor::plain(UserId::new());
        assert!(matches!(
            guarantee.give_consent(&stranger, now()),
            Err(GuaranteeError::Unauthorized { .. })
        ));
        assert!(matches!(
            guarantee.update_status(&stranger, StatusUpdate::Disputed, now()),
            Err(GuaranteeError::Unauthorized { .. })
        ));
    }

    #[test]
    fn completion_requires_buyer_and_consent() {
        let (mut guarantee, seller, buyer) = draft_guarantee();
        guarantee.accept(&buyer, now()).unwrap();

        assert!(matches!(
            guarantee.update_status(&buyer, StatusUpdate::Completed, now()),
            Err(GuaranteeError::ConsentRequired)
        ));

        guarantee.give_consent(&seller, now()).unwrap();
        guarantee.give_consent(&buyer, now()).unwrap();

        assert!(matches!(
            guarantee.update_status(&seller, StatusUpdate::Completed, now()),
            Err(GuaranteeError::Unauthorized { .. })
        ));

        guarantee
            .update_status(&buyer, StatusUpdate::Completed, now())
            .unwrap();
        assert_eq!(guarantee.status, GuaranteeStatus::Completed);
        assert_eq!(guarantee.completed_at, Some(now()));
    }

    #[test]
    fn seller_cancel_blocked_after_buyer_consent() {
        let (mut guarantee, seller, buyer) = draft_guarantee();
        guarantee.accept(&buyer, now()).unwrap();
        guarantee.give_consent(&buyer, now()).unwrap();

        assert!(matches!(
            guarantee.update_status(&seller, StatusUpdate::Cancelled, now()),
            Err(GuaranteeError::Forbidden { .. })
        ));

        // The buyer retains the right to cancel.
        guarantee
            .update_status(&buyer, StatusUpdate::Cancelled, now())
            .unwrap();
        assert_eq!(guarantee.status, GuaranteeStatus::Cancelled);
        assert_eq!(guarantee.cancelled_at, Some(now()));
    }

    #[test]
    fn seller_may_cancel_before_buyer_consent() {
        let (mut guarantee, seller, buyer) = draft_guarantee();
        guarantee.accept(&buyer, now()).unwrap();
        guarantee
            .update_status(&seller, StatusUpdate::Cancelled, now())
            .unwrap();
        assert_eq!(guarantee.status, GuaranteeStatus::Cancelled);
    }

    #[test]
    fn completed_guarantee_cannot_be_cancelled() {
        let (mut guarantee, seller, buyer) = draft_guarantee();
        guarantee.accept(&buyer, now()).unwrap();
        guarantee.give_consent(&seller, now()).unwrap();
        guarantee.give_consent(&buyer, now()).unwrap();
        guarantee
            .update_status(&buyer, StatusUpdate::Completed, now())
            .unwrap();

        assert!(matches!(
            guarantee.update_status(&buyer, StatusUpdate::Cancelled, now()),
            Err(GuaranteeError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn dispute_allowed_even_after_completion_and_expiry() {
        let business_id = BusinessId::new();
        let seller = member_actor(business_id);
        let buyer = Actor::plain(UserId::new());
        let mut guarantee = Guarantee::create(
            &seller,
            business_id,
            buyer.user_id,
            "Bridal cake".to_string(),
            serde_json::Map::new(),
            Money::from_major(300).unwrap(),
            Some(now() + chrono::Duration::days(1)),
            now(),
        )
        .unwrap();
        guarantee.accept(&buyer, now()).unwrap();

        let after_expiry = now() + chrono::Duration::days(3);
        assert!(matches!(
            guarantee.update_status(&buyer, StatusUpdate::Cancelled, after_expiry),
            Err(GuaranteeError::Expired { .. })
        ));

        guarantee
            .update_status(&seller, StatusUpdate::Disputed, after_expiry)
            .unwrap();
        assert_eq!(guarantee.status, GuaranteeStatus::Disputed);
    }

    #[test]
    fn active_implies_both_consents() {
        // The invariant the whole lifecycle is built around.
        let (mut guarantee, seller, buyer) = draft_guarantee();
        guarantee.accept(&buyer, now()).unwrap();
        guarantee.give_consent(&seller, now()).unwrap();
        guarantee.give_consent(&buyer, now()).unwrap();
        assert_eq!(guarantee.status, GuaranteeStatus::Active);
        assert!(guarantee.seller_consent && guarantee.buyer_consent);
    }

    #[test]
    fn status_serializes_to_wire_names() {
        assert_eq!(
            serde_json::to_string(&GuaranteeStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(
            serde_json::to_string(&GuaranteeStatus::Disputed).unwrap(),
            "\"disputed\""
        );
        let back: GuaranteeStatus = serde_json::from_str("\"draft\"").unwrap();
        assert_eq!(back, GuaranteeStatus::Draft);
    }

    #[test]
    fn guarantee_serialization_roundtrip() {
        let (guarantee, _, _) = draft_guarantee();
        let json = serde_json::to_string(&guarantee).unwrap();
        let back: Guarantee = serde_json::from_str(&json).unwrap();
        assert_eq!(back, guarantee);
    }
}
