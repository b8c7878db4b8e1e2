//! Order status and its transitions.
//!
//! Orders are created in [`OrderStatus::Processing`]. The remaining states give
//! fulfillment a defined place to go; nothing in the HTTP surface moves an
//! order out of `Processing` yet.
//!
//! ```text
//! Processing ──► Shipped ──► Delivered
//!     │
//!     └────────► Cancelled
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle status of a placed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.order_status", rename_all = "snake_case")
)]
pub enum OrderStatus {
    /// Accepted, stock reserved, awaiting fulfillment.
    #[default]
    Processing,
    /// Handed to a carrier.
    Shipped,
    /// Received by the customer.
    Delivered,
    /// Withdrawn before shipping.
    Cancelled,
}

/// A status change that the state machine does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot move order from {from} to {to}")]
pub struct InvalidTransition {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

impl OrderStatus {
    /// Whether `self -> next` is an allowed transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Processing, Self::Shipped | Self::Cancelled) | (Self::Shipped, Self::Delivered)
        )
    }

    /// Move to `next`, or report why that is not allowed.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] for any move not in the diagram above,
    /// including staying in the same state.
    pub const fn transition_to(self, next: Self) -> Result<Self, InvalidTransition> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// No further transitions exist from this state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Display name, identical to the JSON representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Processing" => Ok(Self::Processing),
            "Shipped" => Ok(Self::Shipped),
            "Delivered" => Ok(Self::Delivered),
            "Cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}
