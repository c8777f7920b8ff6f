//! # Trust Score Ledger
//!
//! A bounded reputation score attached to each seller. The score is mutated
//! exactly twice per dispute lifecycle: penalized when a verdict is rendered
//! against the seller, and restored by the same magnitude when the resulting
//! restitution is confirmed complete. No other code path mutates it.
//!
//! ## Security Invariant
//!
//! The score is clamped to `[0, 100]` at every mutation. Saturation (not
//! wrap-around) applies at both bounds.

use serde::{Deserialize, Serialize};

use crate::identity::UserId;

/// Lower bound of the trust score.
pub const TRUST_SCORE_MIN: u8 = 0;
/// Upper bound of the trust score, also the starting value.
pub const TRUST_SCORE_MAX: u8 = 100;

/// A seller's bounded trust score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustScore {
    /// The seller this score belongs to.
    pub user_id: UserId,
    score: u8,
}

impl TrustScore {
    /// A fresh score for a seller, starting at the maximum.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            score: TRUST_SCORE_MAX,
        }
    }

    /// Rehydrate a stored score, clamping it into bounds.
    pub fn from_stored(user_id: UserId, score: u8) -> Self {
        Self {
            user_id,
            score: score.min(TRUST_SCORE_MAX),
        }
    }

    /// The current score value.
    pub fn value(&self) -> u8 {
        self.score
    }

    /// Reduce the score by `penalty`, saturating at the lower bound.
    pub fn penalize(&mut self, penalty: u8) {
        self.score = self.score.saturating_sub(penalty);
    }

    /// Raise the score by `amount`, clamped at the upper bound.
    pub fn restore(&mut self, amount: u8) {
        self.score = self.score.saturating_add(amount).min(TRUST_SCORE_MAX);
    }
}

/// Penalty table keyed to verdict decisions.
///
/// Passed explicitly to the resolution engine rather than read from global
/// state, so tests and deployments can vary it per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustPolicy {
    /// Penalty applied for a full-refund verdict.
    pub refund_penalty: u8,
    /// Penalty applied for a partial-refund verdict.
    pub partial_refund_penalty: u8,
}

impl Default for TrustPolicy {
    fn default() -> Self {
        Self {
            refund_penalty: 50,
            partial_refund_penalty: 20,
        }
    }
}
