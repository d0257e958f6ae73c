//! Status enums for orders, shipments and payments.
//!
//! Wire values match the backend's snake_case strings.

use serde::{Deserialize, Serialize};

/// Order lifecycle status as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Shipped => write!(f, "shipped"),
            Self::Delivered => write!(f, "delivered"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Shipment progress, in the order a parcel normally moves through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    #[default]
    Pending,
    PickedUp,
    InTransit,
    OutForDelivery,
    Delivered,
}

impl ShipmentStatus {
    /// All steps of the delivery timeline, first to last.
    pub const TIMELINE: [Self; 5] = [
        Self::Pending,
        Self::PickedUp,
        Self::InTransit,
        Self::OutForDelivery,
        Self::Delivered,
    ];

    /// Whether the parcel has reached its final state.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Delivered)
    }
}

impl std::fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::PickedUp => "picked_up",
            Self::InTransit => "in_transit",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
        };
        f.write_str(label)
    }
}

/// Payment method chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Alipay,
    Wechat,
    Card,
    Bank,
    Stripe,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alipay => write!(f, "alipay"),
            Self::Wechat => write!(f, "wechat"),
            Self::Card => write!(f, "card"),
            Self::Bank => write!(f, "bank"),
            Self::Stripe => write!(f, "stripe"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alipay" => Ok(Self::Alipay),
            "wechat" => Ok(Self::Wechat),
            "card" => Ok(Self::Card),
            "bank" => Ok(Self::Bank),
            "stripe" => Ok(Self::Stripe),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shipment_status_wire_format() {
        let status: ShipmentStatus = serde_json::from_str("\"out_for_delivery\"").unwrap();
        assert_eq!(status, ShipmentStatus::OutForDelivery);
        assert_eq!(status.to_string(), "out_for_delivery");
        assert!(ShipmentStatus::Delivered > ShipmentStatus::InTransit);
    }

    #[test]
    fn test_payment_method_round_trips_through_str() {
        for method in ["alipay", "wechat", "card", "bank", "stripe"] {
            let parsed: PaymentMethod = method.parse().unwrap();
            assert_eq!(parsed.to_string(), method);
        }
        assert!("paypal".parse::<PaymentMethod>().is_err());
    }
}
