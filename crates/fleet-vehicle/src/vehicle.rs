//! The vehicle record and its lifecycle operations.
//!
//! A [`Vehicle`] is owned by exactly one station (or by a customer while
//! rented). It is intentionally not `Clone`: moving a vehicle between
//! stations moves the value.

use std::sync::Arc;

use fleet_types::VehicleId;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::VehicleError;
use crate::lifecycle::{Transition, VehicleState};
use crate::pricing::{Accessory, PricingStrategy};

/// Rentals a vehicle may serve before it must go through maintenance.
pub const DEFAULT_MAINTENANCE_THRESHOLD: u32 = 10;

/// A rentable vehicle.
#[derive(Debug)]
pub struct Vehicle {
    id: VehicleId,
    state: VehicleState,
    pricing: Arc<dyn PricingStrategy>,
    accessories: Vec<Accessory>,
    /// Rentals since the last completed maintenance.
    rental_count: u32,
    /// Rentals that force the vehicle out of service on return.
    maintenance_threshold: u32,
    /// Consecutive ticks spent as the lone available vehicle of a station.
    idle_ticks: u32,
    /// Set once the vehicle has spent a full tick under maintenance.
    maintenance_tick_elapsed: bool,
    /// Set by stations: true while parked.
    available: bool,
    paint_jobs: u32,
}

impl Vehicle {
    /// Create an available vehicle with the default maintenance threshold.
    pub fn new(id: VehicleId, pricing: Arc<dyn PricingStrategy>) -> Self {
        Self {
            id,
            state: VehicleState::Available,
            pricing,
            accessories: Vec::new(),
            rental_count: 0,
            maintenance_threshold: DEFAULT_MAINTENANCE_THRESHOLD,
            idle_ticks: 0,
            maintenance_tick_elapsed: false,
            available: true,
            paint_jobs: 0,
        }
    }

    /// Override the maintenance threshold (clamped to at least 1).
    #[must_use]
    pub fn with_maintenance_threshold(mut self, threshold: u32) -> Self {
        self.maintenance_threshold = threshold.max(1);
        self
    }

    /// Fit an accessory. Accessories stack in the order they are added.
    #[must_use]
    pub fn with_accessory(mut self, accessory: Accessory) -> Self {
        self.accessories.push(accessory);
        self
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The vehicle's identifier.
    pub const fn id(&self) -> VehicleId {
        self.id
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> VehicleState {
        self.state
    }

    /// Rentals since the last completed maintenance.
    pub const fn rental_count(&self) -> u32 {
        self.rental_count
    }

    /// Rentals allowed between two maintenances.
    pub const fn maintenance_threshold(&self) -> u32 {
        self.maintenance_threshold
    }

    /// Whether the rental counter has reached the maintenance threshold.
    pub const fn needs_maintenance(&self) -> bool {
        self.rental_count >= self.maintenance_threshold
    }

    /// Consecutive idle ticks as a lone vehicle.
    pub const fn idle_ticks(&self) -> u32 {
        self.idle_ticks
    }

    /// Whether the vehicle already spent a full tick under maintenance.
    pub const fn maintenance_tick_elapsed(&self) -> bool {
        self.maintenance_tick_elapsed
    }

    /// Availability flag maintained by stations (true while parked).
    pub const fn is_available(&self) -> bool {
        self.available
    }

    /// Parked and in a state that allows renting.
    pub const fn is_rentable(&self) -> bool {
        self.available && self.state.can_be_rented()
    }

    /// Fitted accessories, in fitting order.
    pub fn accessories(&self) -> &[Accessory] {
        &self.accessories
    }

    /// Number of times a paint service has been applied.
    pub const fn paint_jobs(&self) -> u32 {
        self.paint_jobs
    }

    /// Vehicle kind label from the pricing strategy.
    pub fn kind(&self) -> &str {
        self.pricing.label()
    }

    /// Rental price: base price plus every accessory surcharge.
    pub fn price(&self) -> Decimal {
        self.accessories
            .iter()
            .fold(self.pricing.base_price(), |total, accessory| {
                total.saturating_add(accessory.surcharge())
            })
    }

    /// Kind label followed by one suffix per accessory.
    pub fn description(&self) -> String {
        let mut description = self.pricing.label().to_owned();
        for accessory in &self.accessories {
            description.push_str(accessory.suffix());
        }
        description
    }

    // -----------------------------------------------------------------------
    // Lifecycle transitions
    // -----------------------------------------------------------------------

    /// Hand the vehicle to a customer. Increments the rental counter.
    pub fn rent(&mut self) -> Result<(), VehicleError> {
        self.transition(Transition::Rent)?;
        self.rental_count = self.rental_count.saturating_add(1);
        Ok(())
    }

    /// Take the vehicle back. It becomes available, or out of service once
    /// the rental counter has reached the threshold. Resets idle ticks.
    pub fn return_vehicle(&mut self) -> Result<VehicleState, VehicleError> {
        let state = self.transition(Transition::Return)?;
        self.idle_ticks = 0;
        Ok(state)
    }

    /// Pull the vehicle into maintenance.
    pub fn send_to_maintenance(&mut self) -> Result<(), VehicleError> {
        self.transition(Transition::SendToMaintenance)?;
        self.maintenance_tick_elapsed = false;
        Ok(())
    }

    /// Finish maintenance and reset the rental counter.
    ///
    /// Only repair services call this; the supervisor never completes
    /// maintenance on its own.
    pub fn complete_maintenance(&mut self) -> Result<(), VehicleError> {
        self.transition(Transition::CompleteMaintenance)?;
        self.rental_count = 0;
        self.maintenance_tick_elapsed = false;
        Ok(())
    }

    /// Declare the vehicle stolen. Terminal.
    pub fn mark_stolen(&mut self) -> Result<(), VehicleError> {
        self.transition(Transition::MarkStolen)?;
        self.available = false;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Bookkeeping used by stations and the supervisor
    // -----------------------------------------------------------------------

    /// Set the availability flag. Stations call this on park and remove.
    pub const fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    /// Count one more idle tick. Returns the new count.
    pub const fn record_idle_tick(&mut self) -> u32 {
        self.idle_ticks = self.idle_ticks.saturating_add(1);
        self.idle_ticks
    }

    /// Forget accumulated idle ticks.
    pub const fn reset_idle(&mut self) {
        self.idle_ticks = 0;
    }

    /// Note that a full tick under maintenance has elapsed.
    pub const fn mark_maintenance_tick(&mut self) {
        self.maintenance_tick_elapsed = true;
    }

    /// Count a paint job.
    pub const fn record_paint_job(&mut self) {
        self.paint_jobs = self.paint_jobs.saturating_add(1);
    }

    fn transition(&mut self, transition: Transition) -> Result<VehicleState, VehicleError> {
        let from = self.state;
        let to = from
            .next(transition, self.needs_maintenance())
            .ok_or(VehicleError::IllegalTransition {
                vehicle: self.id,
                state: from,
                transition,
            })?;
        self.state = to;
        debug!(vehicle = %self.id, %from, %to, %transition, "Vehicle transitioned");
        Ok(to)
    }
}
