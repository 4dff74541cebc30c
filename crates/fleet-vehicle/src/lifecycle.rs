//! Vehicle lifecycle state machine.
//!
//! ```text
//!              rent                  return (count < threshold)
//! Available ─────────▶ Rented ──────────────────────────────▶ Available
//!    │  ▲                 │
//!    │  │                 │ return (count >= threshold)
//!    │  │                 ▼
//!    │  │           OutOfService
//!    │  │                 │
//!    │  │ complete        │ send_to_maintenance
//!    │  └─────────── UnderMaintenance ◀──── (also from Available)
//!    │
//!    └── mark_stolen ──▶ Stolen (terminal, also from OutOfService)
//! ```
//!
//! The enum only answers questions: which transitions are legal and what
//! each state permits. Side effects on counters live on
//! [`Vehicle`](crate::Vehicle).

use serde::{Deserialize, Serialize};

/// Lifecycle state of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum VehicleState {
    /// Parked and ready to be rented.
    #[default]
    Available,
    /// Currently out with a customer.
    Rented,
    /// Being worked on by a repair service.
    UnderMaintenance,
    /// Reached its rental threshold and waits for maintenance.
    OutOfService,
    /// Gone for good. No transition leaves this state.
    Stolen,
}

/// A trigger that may move a vehicle between lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Transition {
    /// Hand the vehicle to a customer.
    Rent,
    /// Take the vehicle back from a customer.
    Return,
    /// Pull the vehicle out of service for repair.
    SendToMaintenance,
    /// Finish repair work.
    CompleteMaintenance,
    /// Declare the vehicle stolen.
    MarkStolen,
}

impl VehicleState {
    /// Every state, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Available,
        Self::Rented,
        Self::UnderMaintenance,
        Self::OutOfService,
        Self::Stolen,
    ];

    /// Whether a customer may rent the vehicle in this state.
    pub const fn can_be_rented(self) -> bool {
        matches!(self, Self::Available)
    }

    /// Whether a customer may return the vehicle in this state.
    pub const fn can_be_returned(self) -> bool {
        matches!(self, Self::Rented)
    }

    /// Whether the vehicle may be relocated by a redistribution run.
    pub const fn can_be_redistributed(self) -> bool {
        matches!(self, Self::Available)
    }

    /// Whether the state accepts no further transition.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Stolen)
    }

    /// Resolve the state reached by `transition`, or `None` if illegal.
    ///
    /// `needs_maintenance` only matters for [`Transition::Return`]: a
    /// vehicle that has reached its rental threshold comes back
    /// [`OutOfService`](Self::OutOfService) instead of available.
    pub const fn next(self, transition: Transition, needs_maintenance: bool) -> Option<Self> {
        match (self, transition) {
            (Self::Available, Transition::Rent) => Some(Self::Rented),
            (Self::Rented, Transition::Return) => {
                if needs_maintenance {
                    Some(Self::OutOfService)
                } else {
                    Some(Self::Available)
                }
            }
            (Self::Available | Self::OutOfService, Transition::SendToMaintenance) => {
                Some(Self::UnderMaintenance)
            }
            (Self::UnderMaintenance, Transition::CompleteMaintenance) => Some(Self::Available),
            (Self::Available | Self::OutOfService, Transition::MarkStolen) => Some(Self::Stolen),
            _ => None,
        }
    }

    /// Upper-case state name used in logs and summaries.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::Rented => "RENTED",
            Self::UnderMaintenance => "UNDER_MAINTENANCE",
            Self::OutOfService => "OUT_OF_SERVICE",
            Self::Stolen => "STOLEN",
        }
    }
}

impl core::fmt::Display for VehicleState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl core::fmt::Display for Transition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Rent => "rent",
            Self::Return => "return",
            Self::SendToMaintenance => "send_to_maintenance",
            Self::CompleteMaintenance => "complete_maintenance",
            Self::MarkStolen => "mark_stolen",
        };
        f.write_str(name)
    }
}
