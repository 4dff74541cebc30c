//! Shared type definitions for the fleet simulation.
//!
//! # Modules
//!
//! - [`ids`] -- Integer id newtypes and the [`IdAllocator`] that mints them
//! - [`events`] -- Station event journal records

pub mod events;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use events::{StationEvent, StationEventKind};
pub use ids::{IdAllocator, StationId, VehicleId};
