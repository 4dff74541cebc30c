//! Rental pricing: a base-price strategy plus additive accessories.
//!
//! Vehicle kinds are not types. A vehicle holds a shared
//! [`PricingStrategy`] that names it and prices it, and a flat list of
//! [`Accessory`] modifiers layered on top. Reaching the underlying vehicle
//! never requires unwrapping anything.

use std::fmt::Debug;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Names a vehicle kind and sets its base rental price.
pub trait PricingStrategy: Debug + Send + Sync {
    /// Short label for the vehicle kind (e.g. `ClassicBike`).
    fn label(&self) -> &str;

    /// Base price of one rental, before accessories.
    fn base_price(&self) -> Decimal;
}

/// A fixed price per rental.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRate {
    label: String,
    price: Decimal,
}

impl FlatRate {
    /// Create a flat rate with an arbitrary label and price.
    pub fn new(label: impl Into<String>, price: Decimal) -> Self {
        Self {
            label: label.into(),
            price,
        }
    }

    /// Classic bike, 1.00 per rental.
    pub fn classic_bike() -> Arc<dyn PricingStrategy> {
        Arc::new(Self::new("ClassicBike", Decimal::new(100, 2)))
    }

    /// Electric bike, 2.00 per rental.
    pub fn electric_bike() -> Arc<dyn PricingStrategy> {
        Arc::new(Self::new("ElectricBike", Decimal::new(200, 2)))
    }

    /// Electric scooter, 1.50 per rental.
    pub fn electric_scooter() -> Arc<dyn PricingStrategy> {
        Arc::new(Self::new("ElectricScooter", Decimal::new(150, 2)))
    }
}

impl PricingStrategy for FlatRate {
    fn label(&self) -> &str {
        &self.label
    }

    fn base_price(&self) -> Decimal {
        self.price
    }
}

/// An add-on fitted to a vehicle that raises its rental price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Accessory {
    /// Front basket, +0.50.
    Basket,
    /// Rear baggage rack, +0.30.
    Baggage,
}

impl Accessory {
    /// Every accessory, in declaration order.
    pub const ALL: [Self; 2] = [Self::Basket, Self::Baggage];

    /// Price added to each rental.
    pub fn surcharge(self) -> Decimal {
        match self {
            Self::Basket => Decimal::new(50, 2),
            Self::Baggage => Decimal::new(30, 2),
        }
    }

    /// Suffix appended to the vehicle description.
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Basket => " + Basket",
            Self::Baggage => " + Baggage",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_rates() {
        assert_eq!(FlatRate::classic_bike().base_price(), Decimal::ONE);
        assert_eq!(FlatRate::electric_bike().base_price(), Decimal::TWO);
        assert_eq!(
            FlatRate::electric_scooter().base_price(),
            Decimal::new(15, 1)
        );
        assert_eq!(FlatRate::electric_scooter().label(), "ElectricScooter");
    }

    #[test]
    fn surcharges_are_exact() {
        let total: Decimal = Accessory::ALL.iter().map(|a| a.surcharge()).sum();
        assert_eq!(total, Decimal::new(8, 1));
    }
}
