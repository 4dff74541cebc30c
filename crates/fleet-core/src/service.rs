//! Vehicle services the supervisor can dispatch by type.
//!
//! A service works on one parked vehicle at a time. It sees the station
//! only as a [`StationSnapshot`], since the station itself is mutably
//! borrowed while the vehicle is handed out.

use std::collections::BTreeMap;

use fleet_station::StationSnapshot;
use fleet_types::{StationId, VehicleId};
use fleet_vehicle::{Vehicle, VehicleState};
use tracing::debug;

/// Service type under which the supervisor looks up its repair service.
pub const REPAIR: &str = "REPAIR";

/// Service type of the built-in paint service.
pub const PAINT: &str = "PAINT";

/// Errors raised when dispatching a service by type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// No service is registered under the requested type.
    #[error("no service registered for type {service_type}")]
    UnknownService {
        /// The requested service type.
        service_type: String,
    },

    /// The vehicle is not parked in the station.
    #[error("{vehicle} is not parked in {station}")]
    VehicleNotFound {
        /// The station searched.
        station: StationId,
        /// The missing vehicle.
        vehicle: VehicleId,
    },

    /// The station is borrowed elsewhere.
    #[error("station is busy")]
    StationBusy,
}

/// A service applicable to a parked vehicle.
pub trait VehicleService: core::fmt::Debug {
    /// Apply the service. Returns whether it was applied.
    fn service(&self, station: StationSnapshot, vehicle: &mut Vehicle) -> bool;

    /// Logical type the service is registered under.
    fn service_type(&self) -> &str;
}

/// Completes maintenance of vehicles under maintenance. Unlimited capacity.
#[derive(Debug, Clone, Copy, Default)]
pub struct Repairer;

impl VehicleService for Repairer {
    fn service(&self, station: StationSnapshot, vehicle: &mut Vehicle) -> bool {
        if vehicle.state() != VehicleState::UnderMaintenance {
            return false;
        }
        let repaired = vehicle.complete_maintenance().is_ok();
        if repaired {
            debug!(station = %station.id, vehicle = %vehicle.id(), "Vehicle repaired");
        }
        repaired
    }

    fn service_type(&self) -> &str {
        REPAIR
    }
}

/// Repaints vehicles for campaigns. Leaves the lifecycle state alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct Painter;

impl VehicleService for Painter {
    fn service(&self, station: StationSnapshot, vehicle: &mut Vehicle) -> bool {
        if vehicle.state().is_terminal() {
            return false;
        }
        vehicle.record_paint_job();
        debug!(
            station = %station.id,
            vehicle = %vehicle.id(),
            paint_jobs = vehicle.paint_jobs(),
            "Vehicle repainted"
        );
        true
    }

    fn service_type(&self) -> &str {
        PAINT
    }
}

/// Services keyed by their type.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    services: BTreeMap<String, Box<dyn VehicleService>>,
}

impl ServiceRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding [`Repairer`] and [`Painter`].
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(Repairer));
        registry.register(Box::new(Painter));
        registry
    }

    /// Register a service under its own type, replacing any previous one.
    /// Returns the replaced service.
    pub fn register(
        &mut self,
        service: Box<dyn VehicleService>,
    ) -> Option<Box<dyn VehicleService>> {
        self.services
            .insert(service.service_type().to_owned(), service)
    }

    /// Look a service up by type.
    pub fn get(&self, service_type: &str) -> Option<&dyn VehicleService> {
        self.services.get(service_type).map(AsRef::as_ref)
    }

    /// Registered service types, sorted.
    pub fn service_types(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }
}
