//! Status enums for orders, payments, and shipments.
//!
//! Order and payment statuses are explicit state machines: every transition
//! goes through [`OrderStatus::transition`] / [`PaymentStatus::transition`],
//! which reject anything not in the table. Shipment status is different - it
//! mirrors whatever the courier aggregator reports and is only ever replaced
//! wholesale from a tracking response.

use core::fmt;

use serde::{Deserialize, Serialize};

/// An attempted status change that is not in the transition table.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("illegal status transition: {from} -> {to}")]
pub struct TransitionError {
    /// Status the entity currently holds.
    pub from: String,
    /// Status the caller asked for.
    pub to: String,
}

impl TransitionError {
    fn new(from: impl fmt::Display, to: impl fmt::Display) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

/// Order lifecycle status.
///
/// ```text
/// PENDING ---> PAID ---> COMPLETED
///    |           |
///    +--------> CANCELLED <--+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Cancelled,
    Completed,
}

impl OrderStatus {
    /// Whether moving to `to` is a legal transition.
    #[must_use]
    pub const fn can_transition(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::Paid | Self::Cancelled)
                | (Self::Paid, Self::Completed | Self::Cancelled)
        )
    }

    /// Move to `to`, rejecting anything not in the transition table.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] for illegal transitions, including any
    /// transition out of `CANCELLED` or `COMPLETED`.
    pub fn transition(self, to: Self) -> Result<Self, TransitionError> {
        if self.can_transition(to) {
            Ok(to)
        } else {
            Err(TransitionError::new(self, to))
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::Cancelled => "CANCELLED",
            Self::Completed => "COMPLETED",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "PAID" => Ok(Self::Paid),
            "CANCELLED" => Ok(Self::Cancelled),
            "COMPLETED" => Ok(Self::Completed),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Payment status. Gates shipment creation: only `PAID` orders ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Cancelled,
}

impl PaymentStatus {
    /// Whether moving to `to` is a legal transition.
    ///
    /// Payments only move out of `PENDING`; every settled state is terminal.
    #[must_use]
    pub const fn can_transition(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::Paid | Self::Failed | Self::Cancelled)
        )
    }

    /// Move to `to`, rejecting anything not in the transition table.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] for illegal transitions.
    pub fn transition(self, to: Self) -> Result<Self, TransitionError> {
        if self.can_transition(to) {
            Ok(to)
        } else {
            Err(TransitionError::new(self, to))
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "PAID" => Ok(Self::Paid),
            "FAILED" => Ok(Self::Failed),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(format!("invalid payment status: {s}")),
        }
    }
}

/// Shipment status as mirrored from the courier aggregator.
///
/// The platform is a passive mirror of provider-side state (pull-only
/// tracking), so there is no transition table here - the stored status is
/// replaced by whatever the latest tracking response maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    /// Provider accepted the order.
    #[default]
    Confirmed,
    /// A courier has been allocated.
    Allocated,
    /// Courier is on the way to pick the package up.
    PickingUp,
    /// Package picked up.
    Picked,
    /// Package in transit to the recipient.
    DroppingOff,
    /// Delivered to the recipient.
    Delivered,
    /// Returned to the origin address.
    Returned,
    /// Provider rejected the order.
    Rejected,
    /// No courier could be allocated.
    CourierNotFound,
    /// Held by the provider (e.g. address problem).
    OnHold,
    /// Cancelled at the provider.
    Cancelled,
}

impl ShipmentStatus {
    /// Map the provider's status vocabulary onto the internal enumeration.
    ///
    /// Returns `None` for vocabulary this platform does not know; callers
    /// keep the previously stored status in that case.
    #[must_use]
    pub fn from_provider(s: &str) -> Option<Self> {
        match s {
            "confirmed" | "scheduled" => Some(Self::Confirmed),
            "allocated" => Some(Self::Allocated),
            "picking_up" => Some(Self::PickingUp),
            "picked" => Some(Self::Picked),
            "dropping_off" | "delivering" => Some(Self::DroppingOff),
            "delivered" => Some(Self::Delivered),
            "returned" | "return_in_transit" => Some(Self::Returned),
            "rejected" => Some(Self::Rejected),
            "courier_not_found" => Some(Self::CourierNotFound),
            "on_hold" => Some(Self::OnHold),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether the shipment has reached a terminal state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Delivered | Self::Returned | Self::Rejected | Self::Cancelled
        )
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Confirmed => "confirmed",
            Self::Allocated => "allocated",
            Self::PickingUp => "picking_up",
            Self::Picked => "picked",
            Self::DroppingOff => "dropping_off",
            Self::Delivered => "delivered",
            Self::Returned => "returned",
            Self::Rejected => "rejected",
            Self::CourierNotFound => "courier_not_found",
            Self::OnHold => "on_hold",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ShipmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_provider(s).ok_or_else(|| format!("invalid shipment status: {s}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_order_legal_transitions() {
        assert_eq!(
            OrderStatus::Pending.transition(OrderStatus::Paid).unwrap(),
            OrderStatus::Paid
        );
        assert_eq!(
            OrderStatus::Pending
                .transition(OrderStatus::Cancelled)
                .unwrap(),
            OrderStatus::Cancelled
        );
        assert_eq!(
            OrderStatus::Paid
                .transition(OrderStatus::Completed)
                .unwrap(),
            OrderStatus::Completed
        );
        assert_eq!(
            OrderStatus::Paid
                .transition(OrderStatus::Cancelled)
                .unwrap(),
            OrderStatus::Cancelled
        );
    }

    #[test]
    fn test_order_illegal_transitions() {
        // A cancelled order can never be re-marked paid.
        let err = OrderStatus::Cancelled
            .transition(OrderStatus::Paid)
            .unwrap_err();
        assert_eq!(err.from, "CANCELLED");
        assert_eq!(err.to, "PAID");

        assert!(OrderStatus::Paid.transition(OrderStatus::Pending).is_err());
        assert!(
            OrderStatus::Completed
                .transition(OrderStatus::Cancelled)
                .is_err()
        );
        assert!(
            OrderStatus::Pending
                .transition(OrderStatus::Completed)
                .is_err()
        );
        assert!(OrderStatus::Paid.transition(OrderStatus::Paid).is_err());
    }

    #[test]
    fn test_payment_transitions() {
        assert!(
            PaymentStatus::Pending
                .transition(PaymentStatus::Paid)
                .is_ok()
        );
        assert!(
            PaymentStatus::Pending
                .transition(PaymentStatus::Failed)
                .is_ok()
        );
        assert!(
            PaymentStatus::Paid
                .transition(PaymentStatus::Pending)
                .is_err()
        );
        assert!(
            PaymentStatus::Failed
                .transition(PaymentStatus::Paid)
                .is_err()
        );
    }

    #[test]
    fn test_order_status_round_trip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Paid,
            OrderStatus::Cancelled,
            OrderStatus::Completed,
        ] {
            let parsed = OrderStatus::from_str(&status.to_string()).unwrap();
            assert_eq!(parsed, status);
        }
        assert!(OrderStatus::from_str("SHIPPED").is_err());
    }

    #[test]
    fn test_shipment_provider_vocabulary() {
        assert_eq!(
            ShipmentStatus::from_provider("picking_up"),
            Some(ShipmentStatus::PickingUp)
        );
        assert_eq!(
            ShipmentStatus::from_provider("delivering"),
            Some(ShipmentStatus::DroppingOff)
        );
        assert_eq!(
            ShipmentStatus::from_provider("scheduled"),
            Some(ShipmentStatus::Confirmed)
        );
        assert_eq!(ShipmentStatus::from_provider("beamed_up"), None);
    }

    #[test]
    fn test_shipment_terminal_states() {
        assert!(ShipmentStatus::Delivered.is_terminal());
        assert!(ShipmentStatus::Cancelled.is_terminal());
        assert!(!ShipmentStatus::PickingUp.is_terminal());
        assert!(!ShipmentStatus::Confirmed.is_terminal());
    }

    #[test]
    fn test_serde_representation() {
        let json = serde_json::to_string(&OrderStatus::Pending).unwrap();
        assert_eq!(json, "\"PENDING\"");
        let json = serde_json::to_string(&ShipmentStatus::DroppingOff).unwrap();
        assert_eq!(json, "\"dropping_off\"");
    }
}
