//! Error types for the fleet-station crate.
//!
//! These are container-contract violations: expected outcomes that the
//! immediate caller must handle, never fatal.

use fleet_types::{StationId, VehicleId};
use fleet_vehicle::Vehicle;

/// Errors raised by station park/remove operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StationError {
    /// No vehicle was supplied.
    #[error("no vehicle supplied to station {station}")]
    NilVehicle {
        /// The station the operation targeted.
        station: StationId,
    },

    /// The vehicle is not parked in this station.
    #[error("{vehicle} is not parked in {station}")]
    VehicleNotFound {
        /// The station searched.
        station: StationId,
        /// The missing vehicle.
        vehicle: VehicleId,
    },

    /// Every space of the station is taken.
    #[error("{station} is full (capacity: {capacity})")]
    StationFull {
        /// The full station.
        station: StationId,
        /// Its capacity.
        capacity: usize,
    },
}

/// A refused park. Hands the vehicle back so it is never lost.
#[derive(Debug, thiserror::Error)]
#[error("park refused: {reason}")]
pub struct ParkRejected {
    /// Why the station refused the vehicle.
    #[source]
    pub reason: StationError,
    /// The vehicle that was offered, if any.
    pub vehicle: Option<Box<Vehicle>>,
}

impl ParkRejected {
    /// Take the refused vehicle back.
    pub fn into_vehicle(self) -> Option<Vehicle> {
        self.vehicle.map(|boxed| *boxed)
    }
}
