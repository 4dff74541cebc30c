//! Vehicle lifecycle and pricing for the fleet simulation.
//!
//! # Modules
//!
//! - [`lifecycle`] -- [`VehicleState`] and the legal [`Transition`]s between states
//! - [`vehicle`] -- The [`Vehicle`] record: counters, flags, lifecycle operations
//! - [`pricing`] -- [`PricingStrategy`], [`FlatRate`] and additive [`Accessory`] modifiers
//! - [`error`] -- [`VehicleError`]

pub mod error;
pub mod lifecycle;
pub mod pricing;
pub mod vehicle;

pub use error::VehicleError;
pub use lifecycle::{Transition, VehicleState};
pub use pricing::{Accessory, FlatRate, PricingStrategy};
pub use vehicle::{DEFAULT_MAINTENANCE_THRESHOLD, Vehicle};
