//! Collaborators the ticket service delegates to once a purchase is valid.
//!
//! Both calls are assumed to succeed, so neither returns a result.

use std::sync::Arc;

use tracing::info;

use crate::Amount;
use crate::model::AccountId;

/// Debits an account.
pub trait PaymentService {
    fn make_payment(&self, account_id: AccountId, amount: Amount);
}

/// Reserves seats for an account.
pub trait SeatReservationService {
    fn reserve_seat(&self, account_id: AccountId, seats: u64);
}

impl<T: PaymentService + ?Sized> PaymentService for &T {
    fn make_payment(&self, account_id: AccountId, amount: Amount) {
        (**self).make_payment(account_id, amount)
    }
}

impl<T: PaymentService + ?Sized> PaymentService for Arc<T> {
    fn make_payment(&self, account_id: AccountId, amount: Amount) {
        (**self).make_payment(account_id, amount)
    }
}

impl<T: SeatReservationService + ?Sized> SeatReservationService for &T {
    fn reserve_seat(&self, account_id: AccountId, seats: u64) {
        (**self).reserve_seat(account_id, seats)
    }
}

impl<T: SeatReservationService + ?Sized> SeatReservationService for Arc<T> {
    fn reserve_seat(&self, account_id: AccountId, seats: u64) {
        (**self).reserve_seat(account_id, seats)
    }
}

/// Payment gateway that only records the debit in the logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingPaymentGateway;

impl PaymentService for LoggingPaymentGateway {
    fn make_payment(&self, account_id: AccountId, amount: Amount) {
        info!(account = account_id, amount = %amount, "payment taken");
    }
}

/// Seat booking that only records the reservation in the logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingSeatReservation;

impl SeatReservationService for LoggingSeatReservation {
    fn reserve_seat(&self, account_id: AccountId, seats: u64) {
        info!(account = account_id, seats, "seats reserved");
    }
}
