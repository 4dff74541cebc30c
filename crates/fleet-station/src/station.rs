//! Capacity-bounded vehicle station.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use fleet_types::{StationId, VehicleId};
use fleet_vehicle::Vehicle;
use tracing::debug;

use crate::error::{ParkRejected, StationError};
use crate::observer::{StationObserver, StationSnapshot};

/// Smallest capacity a station can be built with.
pub const MIN_CAPACITY: usize = 10;

/// Largest capacity a station can be built with.
pub const MAX_CAPACITY: usize = 20;

/// A station shared between the driver, the supervisor and strategies.
pub type SharedStation = Rc<RefCell<Station>>;

/// A station holding parked vehicles.
///
/// Invariant: `0 <= occupied_spaces() <= capacity()`. Parked vehicles keep
/// insertion order, which makes vehicle selection deterministic.
#[derive(Debug)]
pub struct Station {
    id: StationId,
    capacity: usize,
    vehicles: Vec<Vehicle>,
    observers: Vec<Weak<dyn StationObserver>>,
}

impl Station {
    /// Create an empty station. Capacity is clamped to
    /// [`MIN_CAPACITY`]..=[`MAX_CAPACITY`] and never changes afterwards.
    pub fn new(id: StationId, capacity: usize) -> Self {
        Self {
            id,
            capacity: capacity.clamp(MIN_CAPACITY, MAX_CAPACITY),
            vehicles: Vec::new(),
            observers: Vec::new(),
        }
    }

    /// Wrap the station for shared ownership.
    pub fn into_shared(self) -> SharedStation {
        Rc::new(RefCell::new(self))
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The station's id.
    pub const fn id(&self) -> StationId {
        self.id
    }

    /// Fixed capacity.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of parked vehicles.
    pub fn occupied_spaces(&self) -> usize {
        self.vehicles.len()
    }

    /// Number of free spaces.
    pub fn available_spaces(&self) -> usize {
        self.capacity.saturating_sub(self.vehicles.len())
    }

    /// Whether at least one space is free.
    pub fn has_available_space(&self) -> bool {
        self.vehicles.len() < self.capacity
    }

    /// No vehicle parked.
    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Every space taken.
    pub fn is_full(&self) -> bool {
        self.vehicles.len() >= self.capacity
    }

    /// Whether any parked vehicle can be rented right now.
    pub fn has_rentable_vehicles(&self) -> bool {
        self.vehicles.iter().any(Vehicle::is_rentable)
    }

    /// Parked vehicles, in parking order.
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Mutable access to parked vehicles. Membership cannot change through
    /// this slice.
    pub fn vehicles_mut(&mut self) -> &mut [Vehicle] {
        &mut self.vehicles
    }

    /// Whether the vehicle is parked here.
    pub fn contains(&self, vehicle: VehicleId) -> bool {
        self.vehicles.iter().any(|v| v.id() == vehicle)
    }

    /// Look up a parked vehicle.
    pub fn vehicle(&self, vehicle: VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id() == vehicle)
    }

    /// Look up a parked vehicle mutably.
    pub fn vehicle_mut(&mut self, vehicle: VehicleId) -> Option<&mut Vehicle> {
        self.vehicles.iter_mut().find(|v| v.id() == vehicle)
    }

    /// Ids of vehicles a customer may rent, in parking order.
    pub fn rentable_vehicle_ids(&self) -> Vec<VehicleId> {
        self.vehicles
            .iter()
            .filter(|v| v.is_rentable())
            .map(Vehicle::id)
            .collect()
    }

    /// First vehicle (in parking order) a redistribution may relocate.
    pub fn first_redistributable(&self) -> Option<VehicleId> {
        self.vehicles
            .iter()
            .find(|v| v.is_available() && v.state().can_be_redistributed())
            .map(Vehicle::id)
    }

    /// Current occupancy figures.
    pub fn snapshot(&self) -> StationSnapshot {
        StationSnapshot {
            id: self.id,
            capacity: self.capacity,
            occupied: self.vehicles.len(),
        }
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    /// Park a vehicle and notify observers.
    ///
    /// Accepts a [`Vehicle`] or an `Option<Vehicle>`; `None` is refused
    /// with [`StationError::NilVehicle`]. A full station refuses with
    /// [`StationError::StationFull`] and hands the vehicle back inside the
    /// error. Occupancy is unchanged on every failure.
    pub fn park(&mut self, vehicle: impl Into<Option<Vehicle>>) -> Result<(), ParkRejected> {
        let Some(mut vehicle) = vehicle.into() else {
            return Err(ParkRejected {
                reason: StationError::NilVehicle { station: self.id },
                vehicle: None,
            });
        };

        if !self.has_available_space() {
            return Err(ParkRejected {
                reason: StationError::StationFull {
                    station: self.id,
                    capacity: self.capacity,
                },
                vehicle: Some(Box::new(vehicle)),
            });
        }

        vehicle.set_available(true);
        debug!(station = %self.id, vehicle = %vehicle.id(), "Vehicle parked");
        self.vehicles.push(vehicle);

        let snapshot = self.snapshot();
        let observers = self.live_observers();
        if let Some(parked) = self.vehicles.last_mut() {
            for observer in &observers {
                observer.on_vehicle_parked(snapshot, parked);
            }
        }
        Ok(())
    }

    /// Remove a vehicle, notify observers and return it.
    ///
    /// Accepts a [`VehicleId`] or an `Option<VehicleId>`; `None` is
    /// refused with [`StationError::NilVehicle`].
    pub fn remove(&mut self, vehicle: impl Into<Option<VehicleId>>) -> Result<Vehicle, StationError> {
        let Some(vehicle_id) = vehicle.into() else {
            return Err(StationError::NilVehicle { station: self.id });
        };

        let position = self
            .vehicles
            .iter()
            .position(|v| v.id() == vehicle_id)
            .ok_or(StationError::VehicleNotFound {
                station: self.id,
                vehicle: vehicle_id,
            })?;

        let mut removed = self.vehicles.remove(position);
        removed.set_available(false);
        removed.reset_idle();
        debug!(station = %self.id, vehicle = %vehicle_id, "Vehicle removed");

        let snapshot = self.snapshot();
        for observer in &self.live_observers() {
            observer.on_vehicle_removed(snapshot, &removed);
        }
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // Observers
    // -----------------------------------------------------------------------

    /// Subscribe an observer. Returns `false` if it was already subscribed.
    ///
    /// Only a weak reference is kept; dropping the observer elsewhere
    /// silently unsubscribes it.
    pub fn add_observer(&mut self, observer: &Rc<dyn StationObserver>) -> bool {
        let candidate = Rc::downgrade(observer);
        if self.observers.iter().any(|w| Weak::ptr_eq(w, &candidate)) {
            return false;
        }
        self.observers.push(candidate);
        true
    }

    /// Unsubscribe an observer. Returns `false` if it was not subscribed.
    pub fn remove_observer(&mut self, observer: &Rc<dyn StationObserver>) -> bool {
        let target = Rc::downgrade(observer);
        let before = self.observers.len();
        self.observers.retain(|w| !Weak::ptr_eq(w, &target));
        self.observers.len() != before
    }

    /// Number of observers still alive.
    pub fn observer_count(&self) -> usize {
        self.observers.iter().filter(|w| w.strong_count() > 0).count()
    }

    /// Upgrade live observers in registration order and drop dead ones.
    fn live_observers(&mut self) -> Vec<Rc<dyn StationObserver>> {
        self.observers.retain(|w| w.strong_count() > 0);
        self.observers.iter().filter_map(Weak::upgrade).collect()
    }
}

impl core::fmt::Display for Station {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} ({}/{})",
            self.id,
            self.vehicles.len(),
            self.capacity
        )
    }
}
