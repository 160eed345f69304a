//! Core domain types for ticket purchases.

use std::fmt;

use crate::Amount;

/// Account identifier. Only strictly positive ids are valid.
pub type AccountId = i64;

/// Identifier grouping the rows of one purchase in batch input.
pub type PurchaseId = u32;

/// A ticket category, with its fixed price and seat eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TicketType {
    Adult,
    Child,
    /// Sits on an adult's lap, so takes no seat and is free.
    Infant,
}

impl TicketType {
    pub const ALL: [TicketType; 3] = [TicketType::Adult, TicketType::Child, TicketType::Infant];

    pub const fn price(self) -> Amount {
        match self {
            TicketType::Adult => Amount::from_units(20),
            TicketType::Child => Amount::from_units(10),
            TicketType::Infant => Amount::ZERO,
        }
    }

    pub const fn takes_seat(self) -> bool {
        !matches!(self, TicketType::Infant)
    }

    /// Case-insensitive lookup of a category label such as `ADULT`.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|ticket_type| ticket_type.label().eq_ignore_ascii_case(label))
    }

    pub const fn label(self) -> &'static str {
        match self {
            TicketType::Adult => "ADULT",
            TicketType::Child => "CHILD",
            TicketType::Infant => "INFANT",
        }
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The category a request asks for.
///
/// Requests built from external input may name a category that does not
/// exist; those are kept as `Unknown` and rejected during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestedType {
    Known(TicketType),
    Unknown(String),
}

impl fmt::Display for RequestedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestedType::Known(ticket_type) => fmt::Display::fmt(ticket_type, f),
            RequestedType::Unknown(label) => f.write_str(label),
        }
    }
}

/// A number of tickets of a single category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketTypeRequest {
    ticket_type: RequestedType,
    count: u32,
}

impl TicketTypeRequest {
    pub fn new(ticket_type: TicketType, count: u32) -> Self {
        Self {
            ticket_type: RequestedType::Known(ticket_type),
            count,
        }
    }

    /// Build a request from a free-form category label.
    pub fn from_label(label: &str, count: u32) -> Self {
        let ticket_type = match TicketType::from_label(label) {
            Some(ticket_type) => RequestedType::Known(ticket_type),
            None => RequestedType::Unknown(label.to_string()),
        };
        Self { ticket_type, count }
    }

    pub fn ticket_type(&self) -> &RequestedType {
        &self.ticket_type
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

/// An account and the ticket requests it wants to buy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseRequest {
    pub id: PurchaseId,
    pub account_id: AccountId,
    pub tickets: Vec<TicketTypeRequest>,
}

/// A paid and reserved purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Purchase {
    pub account_id: AccountId,
    pub amount: Amount,
    pub seats: u64,
}
