//! Status enums for orders and returns.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a placed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Accepted, paint not yet tinted.
    #[default]
    Received,
    /// Paint is being mixed to the selected colors.
    Mixing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Whether a return can be requested for an order in this status.
    #[must_use]
    pub const fn is_returnable(&self) -> bool {
        matches!(self, Self::Received | Self::Shipped | Self::Delivered)
    }
}

/// Status of a return (RMA) request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReturnStatus {
    #[default]
    Requested,
    Approved,
    Rejected,
    Refunded,
}

/// Customer-selected reason for a return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnReason {
    /// Can arrived dented or leaking.
    Damaged,
    /// Tint does not match the ordered color.
    ColorMismatch,
    WrongItem,
    /// Unopened product the customer no longer needs.
    NoLongerNeeded,
    Other,
}

impl ReturnReason {
    /// Reasons that need a written explanation before a return is filed.
    #[must_use]
    pub const fn requires_comments(&self) -> bool {
        matches!(self, Self::ColorMismatch | Self::Other)
    }
}

impl std::fmt::Display for ReturnReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Damaged => write!(f, "damaged"),
            Self::ColorMismatch => write!(f, "color_mismatch"),
            Self::WrongItem => write!(f, "wrong_item"),
            Self::NoLongerNeeded => write!(f, "no_longer_needed"),
            Self::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for ReturnReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "damaged" => Ok(Self::Damaged),
            "color_mismatch" => Ok(Self::ColorMismatch),
            "wrong_item" => Ok(Self::WrongItem),
            "no_longer_needed" => Ok(Self::NoLongerNeeded),
            "other" => Ok(Self::Other),
            _ => Err(format!("invalid return reason: {s}")),
        }
    }
}
