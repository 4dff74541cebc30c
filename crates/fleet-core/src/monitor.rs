//! The supervisor's station observer.
//!
//! [`FleetMonitor`] is subscribed to every registered station. It keeps the
//! per-station event journal and reacts to parks by sending worn-out
//! vehicles to maintenance. It lives in its own `Rc` so stations can call it
//! at any time, including while the control center is in the middle of a
//! tick, without touching the control center itself.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use fleet_station::{StationObserver, StationSnapshot};
use fleet_types::{StationEvent, StationEventKind, StationId, VehicleId};
use fleet_vehicle::{Vehicle, VehicleState};
use tracing::{debug, info, warn};

/// Event journal and park-time maintenance reaction.
#[derive(Debug, Default)]
pub struct FleetMonitor {
    tick: Cell<u64>,
    journal: RefCell<BTreeMap<StationId, Vec<StationEvent>>>,
    maintenance_started: Cell<u32>,
}

impl FleetMonitor {
    /// An empty monitor at tick 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tick stamped on events recorded from now on.
    pub fn set_tick(&self, tick: u64) {
        self.tick.set(tick);
    }

    /// Current stamping tick.
    pub fn tick(&self) -> u64 {
        self.tick.get()
    }

    /// Start a journal for a station. Existing entries are kept.
    pub fn track(&self, station: StationId) {
        self.journal.borrow_mut().entry(station).or_default();
    }

    /// Drop a station's journal.
    pub fn forget(&self, station: StationId) {
        self.journal.borrow_mut().remove(&station);
    }

    /// Append an event to a station's journal.
    pub fn record(
        &self,
        station: StationId,
        vehicle: VehicleId,
        kind: StationEventKind,
        detail: impl Into<String>,
    ) {
        let event = StationEvent {
            tick: self.tick.get(),
            station_id: station,
            vehicle_id: vehicle,
            kind,
            detail: detail.into(),
        };
        debug!(station = %station, vehicle = %vehicle, kind = %kind, "Event recorded");
        self.journal
            .borrow_mut()
            .entry(station)
            .or_default()
            .push(event);
    }

    /// A station's events in recording order. Empty for unknown stations.
    pub fn events(&self, station: StationId) -> Vec<StationEvent> {
        self.journal
            .borrow()
            .get(&station)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of events recorded for a station.
    pub fn event_count(&self, station: StationId) -> usize {
        self.journal.borrow().get(&station).map_or(0, Vec::len)
    }

    /// Maintenance starts counted since the last call, then reset.
    pub fn take_maintenance_started(&self) -> u32 {
        self.maintenance_started.replace(0)
    }
}

/// Description and price, e.g. `ClassicBike + Basket (1.50 €)`.
pub fn vehicle_detail(vehicle: &Vehicle) -> String {
    format!("{} ({} €)", vehicle.description(), vehicle.price())
}

impl StationObserver for FleetMonitor {
    fn on_vehicle_parked(&self, station: StationSnapshot, vehicle: &mut Vehicle) {
        self.record(
            station.id,
            vehicle.id(),
            StationEventKind::Parked,
            vehicle_detail(vehicle),
        );

        if !vehicle.needs_maintenance() || vehicle.state() == VehicleState::UnderMaintenance {
            return;
        }
        match vehicle.send_to_maintenance() {
            Ok(()) => {
                info!(
                    station = %station.id,
                    vehicle = %vehicle.id(),
                    rentals = vehicle.rental_count(),
                    "Vehicle sent to maintenance"
                );
                self.maintenance_started
                    .set(self.maintenance_started.get().saturating_add(1));
                self.record(
                    station.id,
                    vehicle.id(),
                    StationEventKind::MaintenanceStarted,
                    format!("{} rentals", vehicle.rental_count()),
                );
            }
            Err(err) => {
                warn!(station = %station.id, error = %err, "Park-time maintenance refused");
            }
        }
    }

    fn on_vehicle_removed(&self, station: StationSnapshot, vehicle: &Vehicle) {
        self.record(
            station.id,
            vehicle.id(),
            StationEventKind::Removed,
            vehicle_detail(vehicle),
        );
    }
}
