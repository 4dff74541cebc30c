//! The control center: tick-driven fleet supervision.
//!
//! [`ControlCenter`] owns the logical clock, the per-station streaks, the
//! redistribution strategy, the service registry and the random source used
//! by the theft pass. Station notifications go to its [`FleetMonitor`],
//! which is shared with the stations through weak references.

use std::collections::BTreeMap;
use std::rc::Rc;

use fleet_station::{SharedStation, Station, StationObserver};
use fleet_types::{StationEvent, StationEventKind, StationId, VehicleId};
use fleet_vehicle::VehicleState;
use rand::Rng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::clock::FleetClock;
use crate::config::{FleetConfig, SupervisionConfig};
use crate::monitor::{FleetMonitor, vehicle_detail};
use crate::redistribution::{self, RedistributionStrategy, RoundRobinRedistribution};
use crate::service::{DispatchError, REPAIR, ServiceRegistry, VehicleService};
use crate::tick::{TickError, TickSummary};

/// Consecutive ticks a station spent empty or full.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StationStreak {
    /// Consecutive empty ticks.
    pub empty: u32,
    /// Consecutive full ticks.
    pub full: u32,
}

impl StationStreak {
    /// Count one tick: each streak grows while its condition holds and
    /// drops to zero otherwise.
    pub const fn observe(&mut self, empty: bool, full: bool) {
        self.empty = if empty { self.empty.saturating_add(1) } else { 0 };
        self.full = if full { self.full.saturating_add(1) } else { 0 };
    }

    /// Whether either streak reached `threshold`.
    pub const fn reached(&self, threshold: u32) -> bool {
        self.empty >= threshold || self.full >= threshold
    }
}

/// Occupancy line of a [`FleetSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationSummary {
    /// Station id.
    pub id: StationId,
    /// Fixed capacity.
    pub capacity: usize,
    /// Parked vehicles.
    pub occupied: usize,
    /// Current streaks.
    pub streak: StationStreak,
}

/// Read-only picture of the supervised fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FleetSummary {
    /// Last completed tick.
    pub tick: u64,
    /// One line per station, in registration order.
    pub stations: Vec<StationSummary>,
    /// Parked vehicles per lifecycle state.
    pub states: BTreeMap<VehicleState, usize>,
    /// Parked vehicles across all stations.
    pub total_vehicles: usize,
    /// Sum of station capacities.
    pub total_capacity: usize,
}

/// Supervises registered stations tick by tick.
pub struct ControlCenter<R = StdRng> {
    clock: FleetClock,
    settings: SupervisionConfig,
    stations: Vec<SharedStation>,
    streaks: BTreeMap<StationId, StationStreak>,
    monitor: Rc<FleetMonitor>,
    /// The monitor as handed to stations; kept so unsubscribing matches.
    observer: Rc<dyn StationObserver>,
    strategy: Box<dyn RedistributionStrategy>,
    services: ServiceRegistry,
    rng: R,
}

impl<R: Rng> ControlCenter<R> {
    /// A control center with default thresholds, round-robin
    /// redistribution and the built-in services.
    pub fn new(rng: R) -> Self {
        Self::with_settings(SupervisionConfig::default(), rng)
    }

    /// A control center with explicit thresholds.
    pub fn with_settings(settings: SupervisionConfig, rng: R) -> Self {
        let monitor = Rc::new(FleetMonitor::new());
        let observer: Rc<dyn StationObserver> = monitor.clone();
        Self {
            clock: FleetClock::new(),
            settings,
            stations: Vec::new(),
            streaks: BTreeMap::new(),
            monitor,
            observer,
            strategy: Box::new(RoundRobinRedistribution::default()),
            services: ServiceRegistry::with_defaults(),
            rng,
        }
    }

    /// A control center configured from the `supervision` and
    /// `redistribution` sections.
    pub fn from_config(config: &FleetConfig, rng: R) -> Self {
        Self::with_settings(config.supervision, rng)
            .with_strategy(redistribution::from_config(&config.redistribution))
    }

    /// Replace the redistribution strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Box<dyn RedistributionStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Start supervising a station. Returns `false` if it is already
    /// supervised or currently borrowed elsewhere.
    pub fn register_station(&mut self, station: &SharedStation) -> bool {
        if self.stations.iter().any(|s| Rc::ptr_eq(s, station)) {
            return false;
        }
        let Ok(mut guard) = station.try_borrow_mut() else {
            warn!("Cannot register a station that is borrowed elsewhere");
            return false;
        };
        let id = guard.id();
        if self.streaks.contains_key(&id) {
            warn!(station = %id, "Another station with this id is already registered");
            return false;
        }
        guard.add_observer(&self.observer);
        drop(guard);

        self.monitor.track(id);
        self.streaks.insert(id, StationStreak::default());
        self.stations.push(Rc::clone(station));
        info!(station = %id, stations = self.stations.len(), "Station registered");
        true
    }

    /// Stop supervising a station. Its events and streaks are dropped.
    /// Returns `false` if it was not supervised.
    pub fn unregister_station(&mut self, station: &SharedStation) -> bool {
        let Some(position) = self.stations.iter().position(|s| Rc::ptr_eq(s, station)) else {
            return false;
        };
        let removed = self.stations.remove(position);
        let Ok(mut guard) = removed.try_borrow_mut() else {
            warn!("Unregistered station is busy; observer left attached");
            return true;
        };
        let id = guard.id();
        guard.remove_observer(&self.observer);
        drop(guard);

        self.monitor.forget(id);
        self.streaks.remove(&id);
        info!(station = %id, stations = self.stations.len(), "Station unregistered");
        true
    }

    // -----------------------------------------------------------------------
    // Services
    // -----------------------------------------------------------------------

    /// Register a service under its type, replacing any previous one.
    pub fn register_service(
        &mut self,
        service: Box<dyn VehicleService>,
    ) -> Option<Box<dyn VehicleService>> {
        self.services.register(service)
    }

    /// Apply the service registered under `service_type` to a parked
    /// vehicle. Successful applications are journaled.
    pub fn dispatch_service(
        &self,
        service_type: &str,
        station: &SharedStation,
        vehicle: VehicleId,
    ) -> Result<bool, DispatchError> {
        let service = self
            .services
            .get(service_type)
            .ok_or_else(|| DispatchError::UnknownService {
                service_type: service_type.to_owned(),
            })?;
        let Ok(mut station) = station.try_borrow_mut() else {
            return Err(DispatchError::StationBusy);
        };
        let snapshot = station.snapshot();
        let target = station
            .vehicle_mut(vehicle)
            .ok_or(DispatchError::VehicleNotFound {
                station: snapshot.id,
                vehicle,
            })?;

        let applied = service.service(snapshot, target);
        if applied {
            let kind = if service_type == REPAIR {
                StationEventKind::Repaired
            } else {
                StationEventKind::Serviced
            };
            self.monitor.record(snapshot.id, vehicle, kind, service_type);
        }
        Ok(applied)
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Run one supervision tick.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::Clock`] if the tick counter would overflow. No
    /// station-level failure aborts a tick.
    pub fn tick(&mut self) -> Result<TickSummary, TickError> {
        let tick = self.clock.advance()?;
        self.monitor.set_tick(tick);

        let mut repaired: u32 = 0;
        let mut stolen: u32 = 0;
        let mut empty_stations: usize = 0;
        let mut full_stations: usize = 0;
        let mut rebalance = false;

        let stations = self.stations.clone();
        for shared in &stations {
            let Ok(mut station) = shared.try_borrow_mut() else {
                warn!(tick, "Station busy, skipped this tick");
                continue;
            };
            repaired = repaired.saturating_add(self.maintenance_pass(&mut station));
            stolen = stolen.saturating_add(self.theft_pass(&mut station));

            let id = station.id();
            let empty = station.is_empty();
            let full = station.is_full();
            drop(station);

            if empty {
                empty_stations = empty_stations.saturating_add(1);
            }
            if full {
                full_stations = full_stations.saturating_add(1);
            }
            if self.streak_pass(id, empty, full) {
                rebalance = true;
            }
        }

        let redistribution = if rebalance {
            let outcome = self.strategy.redistribute(&self.stations);
            for streak in self.streaks.values_mut() {
                *streak = StationStreak::default();
            }
            info!(
                tick,
                strategy = self.strategy.name(),
                moves = outcome.moves,
                stop = ?outcome.stop,
                "Redistribution run"
            );
            Some(outcome)
        } else {
            None
        };

        let summary = TickSummary {
            tick,
            repaired,
            stolen,
            maintenance_started: self.monitor.take_maintenance_started(),
            redistribution,
            empty_stations,
            full_stations,
            vehicles_parked: self.total_vehicles(),
            total_capacity: self.total_capacity(),
        };

        info!(
            tick,
            repaired,
            stolen,
            maintenance_started = summary.maintenance_started,
            moves = summary.redistribution_moves(),
            empty_stations,
            full_stations,
            vehicles_parked = summary.vehicles_parked,
            "Tick complete"
        );

        Ok(summary)
    }

    /// Repair vehicles that spent a full tick under maintenance; flag the
    /// ones that just entered. Returns the number repaired.
    fn maintenance_pass(&self, station: &mut Station) -> u32 {
        let snapshot = station.snapshot();
        let repairer = self.services.get(REPAIR);
        let mut repaired = Vec::new();

        for vehicle in station.vehicles_mut() {
            if vehicle.state() != VehicleState::UnderMaintenance {
                continue;
            }
            if !vehicle.maintenance_tick_elapsed() {
                vehicle.mark_maintenance_tick();
                debug!(station = %snapshot.id, vehicle = %vehicle.id(), "Repair deferred to next tick");
                continue;
            }
            match repairer {
                Some(service) if service.service(snapshot, vehicle) => {
                    repaired.push((vehicle.id(), vehicle_detail(vehicle)));
                }
                Some(_) => {
                    warn!(station = %snapshot.id, vehicle = %vehicle.id(), "Repair service declined");
                }
                None => {
                    warn!(station = %snapshot.id, "No repair service registered");
                }
            }
        }

        for (vehicle, detail) in &repaired {
            self.monitor
                .record(snapshot.id, *vehicle, StationEventKind::Repaired, detail.as_str());
        }
        u32::try_from(repaired.len()).unwrap_or(u32::MAX)
    }

    /// Expose a lone rentable vehicle to theft. Returns the number stolen.
    fn theft_pass(&mut self, station: &mut Station) -> u32 {
        if station.occupied_spaces() != 1 {
            for vehicle in station.vehicles_mut() {
                vehicle.reset_idle();
            }
            return 0;
        }
        let Some(vehicle) = station.vehicles_mut().first_mut() else {
            return 0;
        };
        if !vehicle.is_rentable() {
            vehicle.reset_idle();
            return 0;
        }
        let vehicle_id = vehicle.id();
        let exposed = vehicle.idle_ticks() >= self.settings.theft_threshold;

        if exposed && self.roll_theft() {
            match station.remove(vehicle_id) {
                Ok(mut vehicle) => {
                    if let Err(err) = vehicle.mark_stolen() {
                        warn!(station = %station.id(), error = %err, "Theft aborted, vehicle returned");
                        if let Err(rejected) = station.park(vehicle) {
                            warn!(station = %station.id(), error = %rejected, "Vehicle lost after aborted theft");
                        }
                        return 0;
                    }
                    info!(station = %station.id(), vehicle = %vehicle_id, "Vehicle stolen");
                    self.monitor.record(
                        station.id(),
                        vehicle_id,
                        StationEventKind::Stolen,
                        vehicle_detail(&vehicle),
                    );
                    return 1;
                }
                Err(err) => {
                    warn!(station = %station.id(), error = %err, "Theft removal failed");
                }
            }
        }

        let station_id = station.id();
        if let Some(vehicle) = station.vehicle_mut(vehicle_id) {
            let idle_ticks = vehicle.record_idle_tick();
            debug!(station = %station_id, vehicle = %vehicle_id, idle_ticks, "Lone vehicle idle");
        }
        0
    }

    fn roll_theft(&mut self) -> bool {
        self.rng.random_range(0..100_u32) < self.settings.theft_chance_percent
    }

    /// Update a station's streaks. Returns whether redistribution is due.
    fn streak_pass(&mut self, station: StationId, empty: bool, full: bool) -> bool {
        let threshold = self.settings.streak_threshold;
        let streak = self.streaks.entry(station).or_default();
        streak.observe(empty, full);
        streak.reached(threshold)
    }
}

impl<R> ControlCenter<R> {
    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Supervised stations in registration order.
    pub fn stations(&self) -> &[SharedStation] {
        &self.stations
    }

    /// A supervised station by id.
    pub fn station(&self, id: StationId) -> Option<&SharedStation> {
        self.stations
            .iter()
            .find(|s| s.try_borrow().is_ok_and(|s| s.id() == id))
    }

    /// A station's events in recording order.
    pub fn station_events(&self, id: StationId) -> Vec<StationEvent> {
        self.monitor.events(id)
    }

    /// A station's current streaks.
    pub fn streak(&self, id: StationId) -> Option<StationStreak> {
        self.streaks.get(&id).copied()
    }

    /// Vehicles parked across all stations.
    pub fn total_vehicles(&self) -> usize {
        self.stations.iter().fold(0_usize, |total, s| {
            total.saturating_add(s.try_borrow().map_or(0, |s| s.occupied_spaces()))
        })
    }

    /// Sum of station capacities.
    pub fn total_capacity(&self) -> usize {
        self.stations.iter().fold(0_usize, |total, s| {
            total.saturating_add(s.try_borrow().map_or(0, |s| s.capacity()))
        })
    }

    /// Last completed tick.
    pub const fn current_tick(&self) -> u64 {
        self.clock.tick()
    }

    /// Active thresholds.
    pub const fn settings(&self) -> &SupervisionConfig {
        &self.settings
    }

    /// Per-station occupancy and fleet-wide state counts.
    pub fn fleet_summary(&self) -> FleetSummary {
        let mut stations = Vec::with_capacity(self.stations.len());
        let mut states: BTreeMap<VehicleState, usize> = BTreeMap::new();

        for shared in &self.stations {
            let Ok(station) = shared.try_borrow() else {
                continue;
            };
            for vehicle in station.vehicles() {
                let count = states.entry(vehicle.state()).or_default();
                *count = count.saturating_add(1);
            }
            stations.push(StationSummary {
                id: station.id(),
                capacity: station.capacity(),
                occupied: station.occupied_spaces(),
                streak: self.streaks.get(&station.id()).copied().unwrap_or_default(),
            });
        }

        FleetSummary {
            tick: self.clock.tick(),
            stations,
            states,
            total_vehicles: self.total_vehicles(),
            total_capacity: self.total_capacity(),
        }
    }
}

impl<R> core::fmt::Debug for ControlCenter<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ControlCenter")
            .field("tick", &self.clock.tick())
            .field("settings", &self.settings)
            .field("stations", &self.stations.len())
            .field("strategy", &self.strategy.name())
            .finish_non_exhaustive()
    }
}
