//! # Business-Membership Invitations
//!
//! A business owner invites a profile to join; the invitee accepts or
//! rejects before the invitation expires. Pending invitations past their
//! expiry are flipped to `Expired` by [`sweep_expired`], an idempotent
//! sweep that is safe to run concurrently with reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use gty_core::{BusinessId, InvitationId, MemberRole, ProfileId};

use crate::error::InvitationError;

/// The lifecycle status of an invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    /// Sent, awaiting the invitee's response.
    Pending,
    /// Invitee joined the business. Terminal.
    Accepted,
    /// Invitee declined. Terminal.
    Rejected,
    /// Response window elapsed. Terminal.
    Expired,
}

impl InvitationStatus {
    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
        }
    }

    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An invitation for a profile to join a business with a given role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invitation {
    /// Unique invitation identifier.
    pub id: InvitationId,
    /// The inviting business.
    pub business_id: BusinessId,
    /// The invited profile.
    pub profile_id: ProfileId,
    /// The role the profile would hold.
    pub role: MemberRole,
    /// Current lifecycle status.
    pub status: InvitationStatus,
    /// Deadline for responding.
    pub expires_at: DateTime<Utc>,
    /// When the invitee responded.
    pub responded_at: Option<DateTime<Utc>>,
    /// When the invitation was created.
    pub created_at: DateTime<Utc>,
}

impl Invitation {
    /// Create a pending invitation.
    pub fn new(
        business_id: BusinessId,
        profile_id: ProfileId,
        role: MemberRole,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: InvitationId::new(),
            business_id,
            profile_id,
            role,
            status: InvitationStatus::Pending,
            expires_at,
            responded_at: None,
            created_at: now,
        }
    }

    /// Accept the invitation.
    ///
    /// # Errors
    ///
    /// Returns [`InvitationError::Expired`] past the deadline or
    /// [`InvitationError::InvalidTransition`] from a terminal status.
    /// Failures leave the invitation untouched; the sweep owns the flip
    /// to `Expired`.
    pub fn accept(&mut self, now: DateTime<Utc>) -> Result<(), InvitationError> {
        self.respond(InvitationStatus::Accepted, now)
    }

    /// Reject the invitation. Same guards as [`accept`](Self::accept).
    pub fn reject(&mut self, now: DateTime<Utc>) -> Result<(), InvitationError> {
        self.respond(InvitationStatus::Rejected, now)
    }

    fn respond(
        &mut self,
        target: InvitationStatus,
        now: DateTime<Utc>,
    ) -> Result<(), InvitationError> {
        if self.status != InvitationStatus::Pending {
            return Err(InvitationError::InvalidTransition {
                from: self.status.to_string(),
                to: target.to_string(),
            });
        }
        if self.is_past_expiry(now) {
            return Err(InvitationError::Expired {
                invitation_id: self.id.to_string(),
            });
        }
        self.status = target;
        self.responded_at = Some(now);
        Ok(())
    }

    /// Flip a pending invitation past its deadline to `Expired`.
    ///
    /// Idempotent: returns `true` only when the status actually changed.
    pub fn expire(&mut self, now: DateTime<Utc>) -> bool {
        if self.status == InvitationStatus::Pending && self.is_past_expiry(now) {
            self.status = InvitationStatus::Expired;
            true
        } else {
            false
        }
    }

    /// Whether the response deadline has passed.
    pub fn is_past_expiry(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// Expire every pending invitation past its deadline.
///
/// The periodic sweep. Idempotent and read-concurrent: re-running over the
/// same slice flips nothing further. Returns the number flipped.
pub fn sweep_expired(invitations: &mut [Invitation], now: DateTime<Utc>) -> usize {
    let flipped = invitations
        .iter_mut()
        .map(|invitation| invitation.expire(now))
        .filter(|flipped| *flipped)
        .count();
    if flipped > 0 {
        info!(flipped, "expired pending invitations swept");
    }
    flipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 24, 9, 0, 0).unwrap()
    }

    fn pending_invitation(expires_in_days: i64) -> Invitation {
        Invitation::new(
            BusinessId::new(),
            ProfileId::new(),
            MemberRole::Member,
            now() + chrono::Duration::days(expires_in_days),
            now(),
        )
    }

    #[test]
    fn accept_before_deadline() {
        let mut invitation = pending_invitation(7);
        invitation.accept(now() + chrono::Duration::days(1)).unwrap();
        assert_eq!(invitation.status, InvitationStatus::Accepted);
        assert!(invitation.responded_at.is_some());
    }

    #[test]
    fn reject_before_deadline() {
        let mut invitation = pending_invitation(7);
        invitation.reject(now()).unwrap();
        assert_eq!(invitation.status, InvitationStatus::Rejected);
    }

    #[test]
    fn respond_after_deadline_fails_without_mutation() {
        let mut invitation = pending_invitation(1);
        let late = now() + chrono::Duration::days(2);
        assert!(matches!(
            invitation.accept(late),
            Err(InvitationError::Expired { .. })
        ));
        assert_eq!(invitation.status, InvitationStatus::Pending);
        assert!(invitation.responded_at.is_none());
    }

    #[test]
    fn respond_twice_fails() {
        let mut invitation = pending_invitation(7);
        invitation.accept(now()).unwrap();
        assert!(matches!(
            invitation.reject(now()),
            Err(InvitationError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn sweep_flips_only_pending_past_deadline() {
        let mut invitations = vec![
            pending_invitation(1),
            pending_invitation(10),
            pending_invitation(1),
        ];
        invitations[2].accept(now()).unwrap();

        let later = now() + chrono::Duration::days(3);
        assert_eq!(sweep_expired(&mut invitations, later), 1);
        assert_eq!(invitations[0].status, InvitationStatus::Expired);
        assert_eq!(invitations[1].status, InvitationStatus::Pending);
        assert_eq!(invitations[2].status, InvitationStatus::Accepted);
    }

    #[test]
    fn sweep_is_idempotent() {
        let mut invitations = vec![pending_invitation(1)];
        let later = now() + chrono::Duration::days(2);
        assert_eq!(sweep_expired(&mut invitations, later), 1);
        assert_eq!(sweep_expired(&mut invitations, later), 0);
        assert_eq!(invitations[0].status, InvitationStatus::Expired);
    }
}
