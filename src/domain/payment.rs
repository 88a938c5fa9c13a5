//! Payments and the payment state machine.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::order::UnknownStatus;
use super::{OrderId, PaymentId, UserId};
use crate::error::MarketError;

/// Settlement state of a payment.
///
/// `Pending → Successful` (proof of payment accepted) or
/// `Pending → Failed` (cancelled). Terminal once it leaves `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Awaiting proof of payment.
    Pending,
    /// Proof of payment accepted.
    Successful,
    /// Cancelled before settlement.
    Failed,
}

impl PaymentStatus {
    /// Returns the database string for this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Successful => "successful",
            Self::Failed => "failed",
        }
    }

    /// Whether this status can never change again.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "successful" => Ok(Self::Successful),
            "failed" => Ok(Self::Failed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Coarse lifecycle flag of a payment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentLifecycle {
    /// Settlement still possible.
    Open,
    /// Settled successfully; the order is paid.
    Complete,
    /// Cancelled; the order is cancelled and stock was restored once.
    Cancelled,
}

impl PaymentLifecycle {
    /// Returns the database string for this flag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Complete => "complete",
            Self::Cancelled => "cancelled",
        }
    }
}

impl FromStr for PaymentLifecycle {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "complete" => Ok(Self::Complete),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A payment record, created alongside its order at checkout.
#[derive(Debug, Clone)]
pub struct Payment {
    /// Payment identifier.
    pub id: PaymentId,
    /// Order this payment settles.
    pub order_id: OrderId,
    /// Buyer who owes the payment.
    pub buyer_id: UserId,
    /// Sum of the order items.
    pub cart_amount: Decimal,
    /// Courier cost component.
    pub courier_cost: Decimal,
    /// `cart_amount + courier_cost`.
    pub total_amount: Decimal,
    /// Settlement state machine.
    pub payment_status: PaymentStatus,
    /// Coarse lifecycle flag.
    pub status: PaymentLifecycle,
    /// Proof-of-payment reference, set when the payment is confirmed.
    pub pop_reference: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last state-change timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Checks that this payment may be cancelled by `caller`.
    ///
    /// Cancellation is only legal for the owning buyer while the payment is
    /// still pending. Once it has left `Pending` it cannot be cancelled
    /// again, which is what makes the stock-restore step exactly-once.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InvalidCancellation`] when the caller does not
    /// own the payment or it is no longer pending.
    pub fn ensure_cancellable_by(&self, caller: UserId) -> Result<(), MarketError> {
        if self.buyer_id != caller || self.payment_status != PaymentStatus::Pending {
            return Err(MarketError::InvalidCancellation);
        }
        Ok(())
    }

    /// Checks that this payment may be confirmed.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::PaymentNotPending`] when the payment has
    /// already settled; a second confirmation is rejected, not silently
    /// accepted.
    pub fn ensure_confirmable(&self) -> Result<(), MarketError> {
        if self.payment_status != PaymentStatus::Pending {
            return Err(MarketError::PaymentNotPending);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn pending_payment(buyer: UserId) -> Payment {
        Payment {
            id: PaymentId::new(),
            order_id: OrderId::new(),
            buyer_id: buyer,
            cart_amount: Decimal::new(15000, 2),
            courier_cost: Decimal::new(3000, 2),
            total_amount: Decimal::new(18000, 2),
            payment_status: PaymentStatus::Pending,
            status: PaymentLifecycle::Open,
            pop_reference: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Successful,
            PaymentStatus::Failed,
        ] {
            assert_eq!(PaymentStatus::from_str(status.as_str()).ok(), Some(status));
        }
        for flag in [
            PaymentLifecycle::Open,
            PaymentLifecycle::Complete,
            PaymentLifecycle::Cancelled,
        ] {
            assert_eq!(PaymentLifecycle::from_str(flag.as_str()).ok(), Some(flag));
        }
    }

    #[test]
    fn owner_may_cancel_pending_payment() {
        let buyer = UserId::new();
        assert!(pending_payment(buyer).ensure_cancellable_by(buyer).is_ok());
    }

    #[test]
    fn non_owner_cannot_cancel() {
        let payment = pending_payment(UserId::new());
        let err = payment.ensure_cancellable_by(UserId::new());
        assert!(matches!(err, Err(MarketError::InvalidCancellation)));
    }

    #[test]
    fn settled_payment_cannot_be_cancelled_again() {
        let buyer = UserId::new();
        let mut payment = pending_payment(buyer);
        payment.payment_status = PaymentStatus::Failed;
        assert!(payment.ensure_cancellable_by(buyer).is_err());
    }

    #[test]
    fn second_confirmation_is_rejected() {
        let mut payment = pending_payment(UserId::new());
        assert!(payment.ensure_confirmable().is_ok());
        payment.payment_status = PaymentStatus::Successful;
        assert!(matches!(
            payment.ensure_confirmable(),
            Err(MarketError::PaymentNotPending)
        ));
    }

    #[test]
    fn terminal_statuses() {
        assert!(!PaymentStatus::Pending.is_terminal());
        assert!(PaymentStatus::Successful.is_terminal());
        assert!(PaymentStatus::Failed.is_terminal());
    }
}
