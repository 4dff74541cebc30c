//! Observer contract for station park/remove notifications.
//!
//! Observers are called synchronously, in registration order, right after
//! the station's membership changed. They get a [`StationSnapshot`] rather
//! than the station itself, so they cannot change which vehicles are
//! parked. Implementations keep their own state behind interior
//! mutability because they are shared through `Rc`.

use fleet_types::StationId;
use fleet_vehicle::Vehicle;

/// Occupancy of a station at notification time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StationSnapshot {
    /// The station's id.
    pub id: StationId,
    /// Fixed capacity.
    pub capacity: usize,
    /// Vehicles parked after the change.
    pub occupied: usize,
}

/// Receives park and remove notifications from stations.
pub trait StationObserver {
    /// A vehicle was parked. The observer may change the vehicle's
    /// lifecycle state (e.g. send it to maintenance).
    fn on_vehicle_parked(&self, station: StationSnapshot, vehicle: &mut Vehicle);

    /// A vehicle left the station.
    fn on_vehicle_removed(&self, station: StationSnapshot, vehicle: &Vehicle);
}
