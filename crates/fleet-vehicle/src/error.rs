//! Error types for the fleet-vehicle crate.

use fleet_types::VehicleId;

use crate::lifecycle::{Transition, VehicleState};

/// Errors raised by vehicle lifecycle operations.
///
/// An illegal transition signals a caller bug (for example returning a
/// vehicle that was never rented). It is surfaced, never swallowed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VehicleError {
    /// The requested transition is not allowed from the current state.
    #[error("illegal transition for {vehicle}: cannot {transition} while {state}")]
    IllegalTransition {
        /// The vehicle the transition was attempted on.
        vehicle: VehicleId,
        /// State the vehicle was in (unchanged).
        state: VehicleState,
        /// The rejected trigger.
        transition: Transition,
    },
}
