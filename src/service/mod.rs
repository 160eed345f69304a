//! Ticket purchase service.
//!
//! Validates a purchase, prices it and counts the seats it needs, then
//! takes payment and reserves seats through the injected collaborators.
//! Also supports an async stream of purchase requests.

use tokio_stream::{Stream, StreamExt};
use tracing::info;

use crate::model::{
    AccountId, Purchase, PurchaseId, PurchaseRequest, RequestedType, TicketTypeRequest,
};

mod error;
pub use error::InvalidPurchase;

mod external;
pub use external::{
    LoggingPaymentGateway, LoggingSeatReservation, PaymentService, SeatReservationService,
};

mod tally;
pub use tally::TicketTally;

/// Maximum number of tickets, infants included, in a single purchase.
pub const MAX_TICKETS_PER_PURCHASE: u64 = 20;

/// Result of one purchase processed by [`TicketService::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseOutcome {
    pub purchase: PurchaseId,
    pub account_id: AccountId,
    pub result: Result<Purchase, InvalidPurchase>,
}

/// Run the validation pass over a purchase without side effects.
///
/// Checks, in order, stopping at the first failure:
/// - account id is strictly positive
/// - every request names a known ticket type
/// - at least one adult ticket is requested
/// - no more than [`MAX_TICKETS_PER_PURCHASE`] tickets in total
pub fn validate(
    account_id: AccountId,
    requests: &[TicketTypeRequest],
) -> Result<TicketTally, InvalidPurchase> {
    if account_id <= 0 {
        return Err(InvalidPurchase::InvalidAccount(account_id));
    }

    let mut tally = TicketTally::default();
    for request in requests {
        match request.ticket_type() {
            RequestedType::Known(ticket_type) => tally.record(*ticket_type, request.count()),
            RequestedType::Unknown(label) => {
                return Err(InvalidPurchase::UnknownTicketType(label.clone()));
            }
        }
    }

    if tally.adults == 0 {
        return Err(InvalidPurchase::AdultRequired);
    }

    // Infants are not capped by the number of adults.
    let requested = tally.total();
    if requested > MAX_TICKETS_PER_PURCHASE {
        return Err(InvalidPurchase::TooManyTickets {
            requested,
            max: MAX_TICKETS_PER_PURCHASE,
        });
    }

    Ok(tally)
}

/// The ticket purchase service.
///
/// Holds no state besides its collaborators, so one instance can serve
/// any number of independent purchases.
pub struct TicketService<P, S> {
    payments: P,
    seats: S,
}

/// Public API
impl<P: PaymentService, S: SeatReservationService> TicketService<P, S> {
    pub fn new(payments: P, seats: S) -> Self {
        Self { payments, seats }
    }

    /// Validate and price a purchase, then pay and reserve seats.
    ///
    /// Nothing is charged or reserved unless every check passes.
    pub fn purchase_tickets(
        &self,
        account_id: AccountId,
        requests: &[TicketTypeRequest],
    ) -> Result<Purchase, InvalidPurchase> {
        let result = self.apply(account_id, requests);
        Self::log_result(account_id, &result);
        result
    }

    /// Run the service over a stream of purchase requests.
    ///
    /// A rejected purchase does not stop the stream.
    pub async fn run(
        &self,
        mut stream: impl Stream<Item = PurchaseRequest> + Unpin,
    ) -> Vec<PurchaseOutcome> {
        let mut outcomes = Vec::new();
        while let Some(request) = stream.next().await {
            let result = self.purchase_tickets(request.account_id, &request.tickets);
            outcomes.push(PurchaseOutcome {
                purchase: request.id,
                account_id: request.account_id,
                result,
            });
        }
        outcomes
    }
}

/// Private API
impl<P: PaymentService, S: SeatReservationService> TicketService<P, S> {
    fn apply(
        &self,
        account_id: AccountId,
        requests: &[TicketTypeRequest],
    ) -> Result<Purchase, InvalidPurchase> {
        let tally = validate(account_id, requests)?;

        let amount = tally.price();
        self.payments.make_payment(account_id, amount);

        let seats = tally.seats();
        self.seats.reserve_seat(account_id, seats);

        Ok(Purchase {
            account_id,
            amount,
            seats,
        })
    }

    fn log_result(account_id: AccountId, result: &Result<Purchase, InvalidPurchase>) {
        match result {
            Ok(purchase) => {
                info!(
                    account = account_id,
                    amount = %purchase.amount,
                    seats = purchase.seats,
                    "tickets purchased"
                );
            }
            Err(e) => {
                info!(account = account_id, reason = %e, "purchase rejected");
            }
        }
    }
}
