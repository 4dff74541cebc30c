//! Initial fleet layout.
//!
//! Creates the configured number of stations and fills each with randomly
//! chosen vehicle kinds, some of them fitted with accessories. Ids come
//! from the driver's [`IdAllocator`].

use std::sync::Arc;

use fleet_core::config::FleetLayoutConfig;
use fleet_station::{SharedStation, Station};
use fleet_types::IdAllocator;
use fleet_vehicle::{Accessory, FlatRate, PricingStrategy, Vehicle};
use rand::Rng;
use tracing::{debug, info};

use crate::error::EngineError;

/// Pick one of the built-in vehicle kinds uniformly.
fn random_kind(rng: &mut impl Rng) -> Arc<dyn PricingStrategy> {
    match rng.random_range(0..3_u8) {
        0 => FlatRate::classic_bike(),
        1 => FlatRate::electric_bike(),
        _ => FlatRate::electric_scooter(),
    }
}

/// Build one vehicle with a random kind and accessories.
pub fn spawn_vehicle(
    ids: &mut IdAllocator,
    maintenance_threshold: u32,
    accessory_chance_percent: u32,
    rng: &mut impl Rng,
) -> Vehicle {
    let mut vehicle = Vehicle::new(ids.next_vehicle(), random_kind(rng))
        .with_maintenance_threshold(maintenance_threshold);
    for accessory in Accessory::ALL {
        if rng.random_range(0..100_u32) < accessory_chance_percent {
            vehicle = vehicle.with_accessory(accessory);
        }
    }
    debug!(vehicle = %vehicle.id(), description = vehicle.description(), "Vehicle spawned");
    vehicle
}

/// Create every station of the layout, filled with fresh vehicles.
///
/// # Errors
///
/// Returns [`EngineError::Spawn`] if `vehicles_per_station` exceeds the
/// (clamped) station capacity.
pub fn spawn_fleet(
    layout: &FleetLayoutConfig,
    maintenance_threshold: u32,
    ids: &mut IdAllocator,
    rng: &mut impl Rng,
) -> Result<Vec<SharedStation>, EngineError> {
    let mut stations = Vec::with_capacity(layout.station_count);
    for _ in 0..layout.station_count {
        let mut station = Station::new(ids.next_station(), layout.station_capacity);
        for _ in 0..layout.vehicles_per_station {
            let vehicle = spawn_vehicle(
                ids,
                maintenance_threshold,
                layout.accessory_chance_percent,
                rng,
            );
            station.park(vehicle)?;
        }
        debug!(station = %station.id(), occupied = station.occupied_spaces(), "Station spawned");
        stations.push(station.into_shared());
    }

    info!(
        stations = ids.stations_allocated(),
        vehicles = ids.vehicles_allocated(),
        "Fleet spawned"
    );
    Ok(stations)
}
