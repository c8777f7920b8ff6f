//! # Shared Validation Errors
//!
//! Input-validation failures shared across the stack. Uses `thiserror` for
//! ergonomic error definitions with diagnostic context.
//!
//! Validation failures are total: a rejected input leaves every entity
//! untouched.

use thiserror::Error;

use crate::money::Money;

/// Malformed or missing input, rejected before any state is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field was empty.
    #[error("required field `{0}` is empty")]
    EmptyField(&'static str),

    /// A required field was missing for the requested operation.
    #[error("field `{field}` is required {context}")]
    MissingField {
        /// Name of the missing field.
        field: &'static str,
        /// What made the field required (e.g., the decision kind).
        context: &'static str,
    },

    /// A monetary amount could not be parsed or was out of range.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// A refund amount exceeded the guarantee price.
    #[error("refund amount {refund} exceeds guarantee price {price}")]
    RefundExceedsPrice {
        /// The requested refund.
        refund: Money,
        /// The guarantee price it must not exceed.
        price: Money,
    },

    /// An expiry timestamp was not in the future at creation time.
    #[error("expiry timestamp must be in the future")]
    ExpiryInPast,

    /// The seller is not an active member of the owning business.
    #[error("seller is not a member of business {business_id}")]
    SellerNotBusinessMember {
        /// The business the guarantee would belong to.
        business_id: String,
    },
}
