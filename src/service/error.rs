//! Error types for purchase validation.

use thiserror::Error;

use crate::model::AccountId;

/// Reason a purchase was rejected.
///
/// Rejections happen before any payment or reservation is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidPurchase {
    #[error("account {0} is invalid")]
    InvalidAccount(AccountId),

    #[error("unknown ticket type '{0}'")]
    UnknownTicketType(String),

    #[error("at least one adult ticket is required")]
    AdultRequired,

    #[error("{requested} tickets requested but at most {max} are allowed per purchase")]
    TooManyTickets { requested: u64, max: u64 },
}
