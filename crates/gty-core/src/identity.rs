//! # Identity Newtypes
//!
//! Domain-primitive newtypes for identifiers throughout the Guaranty Stack.
//! Each identifier is a distinct type — you cannot pass a [`UserId`] where a
//! [`BusinessId`] is expected.
//!
//! All identifiers are UUID-based and therefore always valid by
//! construction. The `Display` form prefixes the entity kind so identifiers
//! remain distinguishable in logs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Implements the standard identifier surface for a UUID newtype:
/// `new()`, `from_uuid()`, `as_uuid()`, `Default`, `Display`, and
/// `From<Uuid>`.
macro_rules! uuid_identifier {
    ($(#[$doc:meta])* $ty:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $ty(Uuid);

        impl $ty {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an identifier from an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $ty {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }

        impl std::str::FromStr for $ty {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::from_str(s).map(Self)
            }
        }
    };
}

uuid_identifier!(
    /// A unique identifier for a user account (seller, buyer, arbitrator,
    /// or administrator).
    UserId,
    "user"
);

uuid_identifier!(
    /// A unique identifier for a user's profile. Business membership is
    /// keyed by profile, not by user account.
    ProfileId,
    "profile"
);

uuid_identifier!(
    /// A unique identifier for a registered business.
    BusinessId,
    "business"
);

uuid_identifier!(
    /// A unique identifier for a guarantee (bilateral service agreement).
    GuaranteeId,
    "guarantee"
);

uuid_identifier!(
    /// A unique identifier for a dispute proceeding.
    DisputeId,
    "dispute"
);

uuid_identifier!(
    /// A unique identifier for an arbitration verdict.
    VerdictId,
    "verdict"
);

uuid_identifier!(
    /// A unique identifier for a restitution workflow.
    RestitutionId,
    "restitution"
);

uuid_identifier!(
    /// A unique identifier for a business-membership invitation.
    InvitationId,
    "invitation"
);
