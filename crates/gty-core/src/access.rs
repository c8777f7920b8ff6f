//! # Access Guard
//!
//! Capability-based authorization for every mutating operation in the
//! stack. Roles are resolved **once per request** from the external
//! membership/role collaborator into an [`Actor`], which is then passed
//! into each guard call. There is no global mutable role state.
//!
//! Guard checks are pure predicates with no side effects. Admin capability
//! is checked first and bypasses every other guard.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::identity::{BusinessId, ProfileId, UserId};

/// A party's side of a guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuaranteeParty {
    /// The party providing the service.
    Seller,
    /// The party receiving the service.
    Buyer,
}

impl GuaranteeParty {
    /// The canonical string name of this party.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seller => "seller",
            Self::Buyer => "buyer",
        }
    }
}

impl std::fmt::Display for GuaranteeParty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A profile's role within a business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    /// The founding owner of the business.
    Owner,
    /// A member with administrative rights over the business.
    Admin,
    /// A regular member.
    Member,
}

/// A capability granted to an actor for the duration of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Platform administrator. Bypasses all other guards.
    Admin,
    /// May resolve disputes and confirm restitutions.
    Arbitrator,
    /// Owns the given business.
    BusinessOwner(BusinessId),
    /// Member (any role) of the given business.
    BusinessMember(BusinessId),
}

/// External membership/role collaborator.
///
/// Implemented by the storage or identity layer outside this workspace.
/// The core never queries it mid-operation; see [`Actor::resolve`].
pub trait RoleProvider {
    /// The profile's role within the business, if it is a member.
    fn member_role(&self, business_id: &BusinessId, profile_id: &ProfileId) -> Option<MemberRole>;
    /// Whether the user owns the business.
    fn is_owner(&self, business_id: &BusinessId, user_id: &UserId) -> bool;
    /// Whether the user holds the arbitrator role.
    fn is_arbitrator(&self, user_id: &UserId) -> bool;
    /// Whether the user is a platform administrator.
    fn is_admin(&self, user_id: &UserId) -> bool;
}

/// A caller identity with its resolved capability set.
///
/// Built at the edge of the system (once per request) and passed into every
/// transition. Guards inspect the capability set only — they never reach
/// back to the [`RoleProvider`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The user this actor represents.
    pub user_id: UserId,
    /// The user's profile, when one exists. Business membership is keyed
    /// by profile.
    pub profile_id: Option<ProfileId>,
    capabilities: HashSet<Capability>,
}

impl Actor {
    /// Resolve an actor's capabilities from the role provider.
    ///
    /// `business_id` scopes the membership/ownership lookups to the
    /// business the request concerns, if any.
    pub fn resolve(
        provider: &dyn RoleProvider,
        user_id: UserId,
        profile_id: Option<ProfileId>,
        business_id: Option<&BusinessId>,
    ) -> Self {
        let mut capabilities = HashSet::new();
        if provider.is_admin(&user_id) {
            capabilities.insert(Capability::Admin);
        }
        if provider.is_arbitrator(&user_id) {
            capabilities.insert(Capability::Arbitrator);
        }
        if let Some(business_id) = business_id {
            if provider.is_owner(business_id, &user_id) {
                capabilities.insert(Capability::BusinessOwner(*business_id));
            }
            if let Some(profile_id) = &profile_id {
                if provider.member_role(business_id, profile_id).is_some() {
                    capabilities.insert(Capability::BusinessMember(*business_id));
                }
            }
        }
        Self {
            user_id,
            profile_id,
            capabilities,
        }
    }

    /// Construct an actor with an explicit capability set.
    ///
    /// Used at system edges that have already authenticated the caller, and
    /// in tests.
    pub fn with_capabilities(
        user_id: UserId,
        profile_id: Option<ProfileId>,
        capabilities: impl IntoIterator<Item = Capability>,
    ) -> Self {
        Self {
            user_id,
            profile_id,
            capabilities: capabilities.into_iter().collect(),
        }
    }

    /// An actor with no capabilities beyond its identity (a plain party).
    pub fn plain(user_id: UserId) -> Self {
        Self {
            user_id,
            profile_id: None,
            capabilities: HashSet::new(),
        }
    }

    /// Whether this actor is a platform administrator.
    pub fn is_admin(&self) -> bool {
        self.capabilities.contains(&Capability::Admin)
    }

    /// Whether this actor may arbitrate disputes. Admins qualify.
    pub fn is_arbitrator(&self) -> bool {
        self.is_admin() || self.capabilities.contains(&Capability::Arbitrator)
    }

    /// Whether this actor owns the given business. Admins qualify.
    pub fn is_business_owner(&self, business_id: &BusinessId) -> bool {
        self.is_admin()
            || self
                .capabilities
                .contains(&Capability::BusinessOwner(*business_id))
    }

    /// Whether this actor is a member (any role) of the given business.
    /// Owners and admins qualify.
    pub fn is_business_member(&self, business_id: &BusinessId) -> bool {
        self.is_business_owner(business_id)
            || self
                .capabilities
                .contains(&Capability::BusinessMember(*business_id))
    }

    /// Whether this actor is the given user.
    pub fn is_user(&self, user_id: &UserId) -> bool {
        self.user_id == *user_id
    }
}
