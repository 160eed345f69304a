use crate::Amount;
use crate::model::TicketType;

/// Ticket counts per category for a single purchase.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TicketTally {
    pub adults: u64,
    pub children: u64,
    pub infants: u64,
}

impl TicketTally {
    pub fn record(&mut self, ticket_type: TicketType, count: u32) {
        let slot = match ticket_type {
            TicketType::Adult => &mut self.adults,
            TicketType::Child => &mut self.children,
            TicketType::Infant => &mut self.infants,
        };
        *slot = slot.saturating_add(u64::from(count));
    }

    pub fn count(&self, ticket_type: TicketType) -> u64 {
        match ticket_type {
            TicketType::Adult => self.adults,
            TicketType::Child => self.children,
            TicketType::Infant => self.infants,
        }
    }

    pub fn total(&self) -> u64 {
        TicketType::ALL
            .into_iter()
            .fold(0u64, |acc, t| acc.saturating_add(self.count(t)))
    }

    /// Seats to reserve; infants are not counted.
    pub fn seats(&self) -> u64 {
        TicketType::ALL
            .into_iter()
            .filter(|t| t.takes_seat())
            .fold(0u64, |acc, t| acc.saturating_add(self.count(t)))
    }

    pub fn price(&self) -> Amount {
        TicketType::ALL
            .into_iter()
            .map(|t| t.price() * self.count(t))
            .sum()
    }
}
