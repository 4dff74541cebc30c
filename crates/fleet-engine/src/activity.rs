//! Simulated customers.
//!
//! Between ticks, [`RentalActivity`] brings some rented vehicles back to a
//! random station with room and then takes new vehicles out of random
//! stations. It plays the rental caller: it goes through
//! [`Station::remove`](fleet_station::Station::remove) /
//! [`Station::park`](fleet_station::Station::park) and
//! [`Vehicle::rent`] / [`Vehicle::return_vehicle`] only, so the supervisor
//! sees every movement through its station observer.

use fleet_core::config::ActivityConfig;
use fleet_core::{FleetSummary, TickCallback, TickSummary};
use fleet_station::SharedStation;
use fleet_vehicle::Vehicle;
use rand::Rng;
use tracing::{debug, info, warn};

/// Rental and return counters since the start of the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityStats {
    /// Vehicles handed to customers.
    pub rentals: u32,
    /// Vehicles brought back.
    pub returns: u32,
    /// Rental attempts that found no rentable vehicle.
    pub missed_rentals: u32,
}

/// Random rentals and returns between ticks.
#[derive(Debug)]
pub struct RentalActivity<R> {
    config: ActivityConfig,
    rng: R,
    rented: Vec<Vehicle>,
    stats: ActivityStats,
}

impl<R: Rng> RentalActivity<R> {
    /// Create the activity with its own random source.
    pub const fn new(config: ActivityConfig, rng: R) -> Self {
        Self {
            config,
            rng,
            rented: Vec::new(),
            stats: ActivityStats {
                rentals: 0,
                returns: 0,
                missed_rentals: 0,
            },
        }
    }

    /// Vehicles currently out with customers.
    pub fn rented(&self) -> &[Vehicle] {
        &self.rented
    }

    /// Counters since the start of the run.
    pub const fn stats(&self) -> ActivityStats {
        self.stats
    }

    /// Bring back each rented vehicle with the configured chance.
    fn return_vehicles(&mut self, stations: &[SharedStation]) {
        let mut still_out = Vec::with_capacity(self.rented.len());
        for vehicle in std::mem::take(&mut self.rented) {
            if self.rng.random_range(0..100_u32) >= self.config.return_chance_percent {
                still_out.push(vehicle);
                continue;
            }
            match self.return_to_station(vehicle, stations) {
                Ok(()) => self.stats.returns = self.stats.returns.saturating_add(1),
                Err(vehicle) => still_out.push(vehicle),
            }
        }
        self.rented = still_out;
    }

    /// Return one vehicle to the first station with room, starting from a
    /// random one. Hands the vehicle back if it could not be returned.
    fn return_to_station(
        &mut self,
        mut vehicle: Vehicle,
        stations: &[SharedStation],
    ) -> Result<(), Vehicle> {
        if stations.is_empty() {
            return Err(vehicle);
        }
        let start = self.rng.random_range(0..stations.len());
        let target = stations
            .iter()
            .cycle()
            .skip(start)
            .take(stations.len())
            .find(|s| s.try_borrow().is_ok_and(|s| s.has_available_space()));
        let Some(target) = target else {
            debug!(vehicle = %vehicle.id(), "Every station is full, customer keeps the vehicle");
            return Err(vehicle);
        };
        let Ok(mut station) = target.try_borrow_mut() else {
            return Err(vehicle);
        };

        if let Err(err) = vehicle.return_vehicle() {
            warn!(error = %err, "Return refused");
            return Err(vehicle);
        }
        match station.park(vehicle) {
            Ok(()) => Ok(()),
            Err(rejected) => {
                warn!(error = %rejected, "Returned vehicle could not be parked");
                rejected.into_vehicle().map_or(Ok(()), Err)
            }
        }
    }

    /// Attempt the configured number of rentals at random stations.
    fn rent_vehicles(&mut self, stations: &[SharedStation]) {
        if stations.is_empty() {
            return;
        }
        for _ in 0..self.config.rentals_per_tick {
            let index = self.rng.random_range(0..stations.len());
            let Some(shared) = stations.get(index) else {
                continue;
            };
            let Ok(mut station) = shared.try_borrow_mut() else {
                continue;
            };
            let Some(vehicle_id) = station.rentable_vehicle_ids().first().copied() else {
                self.stats.missed_rentals = self.stats.missed_rentals.saturating_add(1);
                continue;
            };
            let mut vehicle = match station.remove(vehicle_id) {
                Ok(vehicle) => vehicle,
                Err(err) => {
                    warn!(error = %err, "Rental removal failed");
                    continue;
                }
            };
            match vehicle.rent() {
                Ok(()) => {
                    debug!(station = %station.id(), vehicle = %vehicle_id, "Vehicle rented");
                    self.stats.rentals = self.stats.rentals.saturating_add(1);
                    self.rented.push(vehicle);
                }
                Err(err) => {
                    warn!(error = %err, "Rent refused, vehicle put back");
                    if let Err(rejected) = station.park(vehicle) {
                        warn!(error = %rejected, "Vehicle lost while putting it back");
                    }
                }
            }
        }
    }
}

impl<R: Rng> TickCallback for RentalActivity<R> {
    fn before_tick(&mut self, tick: u64, stations: &[SharedStation]) {
        self.return_vehicles(stations);
        self.rent_vehicles(stations);
        debug!(tick, rented = self.rented.len(), "Customer activity done");
    }

    fn on_tick(&mut self, summary: &TickSummary, fleet: &FleetSummary) {
        info!(
            tick = summary.tick,
            parked = fleet.total_vehicles,
            rented = self.rented.len(),
            rentals = self.stats.rentals,
            returns = self.stats.returns,
            "Fleet status"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fleet_station::Station;
    use fleet_types::{StationId, VehicleId};
    use fleet_vehicle::{FlatRate, VehicleState};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn stations(counts: &[u32]) -> Vec<SharedStation> {
        counts
            .iter()
            .zip(1_u32..)
            .map(|(&count, id)| {
                let mut station = Station::new(StationId(id), 10);
                for n in 0..count {
                    let vid = id.saturating_mul(100).saturating_add(n);
                    station
                        .park(Vehicle::new(VehicleId(vid), FlatRate::classic_bike()))
                        .unwrap();
                }
                station.into_shared()
            })
            .collect()
    }

    fn parked(stations: &[SharedStation]) -> usize {
        stations.iter().map(|s| s.borrow().occupied_spaces()).sum()
    }

    fn customers(rentals_per_tick: u32, return_chance_percent: u32) -> RentalActivity<SmallRng> {
        RentalActivity::new(
            ActivityConfig {
                rentals_per_tick,
                return_chance_percent,
            },
            SmallRng::seed_from_u64(8),
        )
    }

    #[test]
    fn rentals_take_vehicles_out() {
        let stations = stations(&[5, 5]);
        let mut activity = customers(3, 0);
        activity.before_tick(1, &stations);
        assert_eq!(activity.rented().len(), 3);
        assert_eq!(parked(&stations), 7);
        assert!(activity.rented().iter().all(|v| v.state() == VehicleState::Rented));
        assert!(activity.rented().iter().all(|v| !v.is_available()));
        assert_eq!(activity.stats().rentals, 3);
    }

    #[test]
    fn certain_returns_bring_everything_back() {
        let stations = stations(&[5, 5]);
        let mut activity = customers(4, 100);
        activity.before_tick(1, &stations);
        let mut returning = customers(0, 100);
        returning.rented = std::mem::take(&mut activity.rented);
        returning.before_tick(2, &stations);
        assert!(returning.rented().is_empty());
        assert_eq!(parked(&stations), 10);
        assert_eq!(returning.stats().returns, 4);
    }

    #[test]
    fn empty_stations_miss_rentals() {
        let stations = stations(&[0, 0]);
        let mut activity = customers(2, 0);
        activity.before_tick(1, &stations);
        assert!(activity.rented().is_empty());
        assert_eq!(activity.stats().missed_rentals, 2);
    }

    #[test]
    fn full_fleet_keeps_vehicle_out() {
        let stations = stations(&[10]);
        let mut activity = customers(0, 100);
        activity
            .rented
            .push(Vehicle::new(VehicleId(999), FlatRate::electric_bike()));
        activity.rented.first_mut().unwrap().rent().unwrap();
        activity.before_tick(1, &stations);
        assert_eq!(activity.rented().len(), 1);
        assert_eq!(
            activity.rented().first().map(Vehicle::state),
            Some(VehicleState::Rented)
        );
    }
}
