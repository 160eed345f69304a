pub mod amount;
pub mod csv;
pub mod model;
pub mod service;

pub use amount::Amount;
pub use model::{
    AccountId, Purchase, PurchaseId, PurchaseRequest, RequestedType, TicketType,
    TicketTypeRequest,
};
pub use service::{
    InvalidPurchase, PaymentService, PurchaseOutcome, SeatReservationService, TicketService,
};
