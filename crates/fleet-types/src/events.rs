//! Audit records emitted while supervising the fleet.
//!
//! Events are append-only and exist for display and auditing. No
//! supervision decision ever reads them back.

use serde::{Deserialize, Serialize};

use crate::ids::{StationId, VehicleId};

/// What happened to a vehicle at a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StationEventKind {
    /// The vehicle was parked in the station.
    Parked,
    /// The vehicle was removed from the station.
    Removed,
    /// The vehicle reached its rental threshold and entered maintenance.
    MaintenanceStarted,
    /// A repair service completed the vehicle's maintenance.
    Repaired,
    /// A lone idle vehicle was stolen from the station.
    Stolen,
    /// A non-repair service (e.g. paint) was applied to the vehicle.
    Serviced,
}

impl StationEventKind {
    /// Human-readable label used as the event headline.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Parked => "Vehicle parked",
            Self::Removed => "Vehicle removed",
            Self::MaintenanceStarted => "Maintenance started",
            Self::Repaired => "Vehicle repaired",
            Self::Stolen => "Vehicle stolen",
            Self::Serviced => "Vehicle serviced",
        }
    }
}

impl core::fmt::Display for StationEventKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// A single entry in a station's event journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationEvent {
    /// Last tick completed when the event was recorded (0 before the first tick).
    pub tick: u64,
    /// Station the event belongs to.
    pub station_id: StationId,
    /// Vehicle concerned by the event.
    pub vehicle_id: VehicleId,
    /// Event category.
    pub kind: StationEventKind,
    /// Free-form detail, typically the vehicle description and price.
    pub detail: String,
}

impl core::fmt::Display for StationEvent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "[tick {}] {}: {} {}",
            self.tick, self.kind, self.vehicle_id, self.detail
        )
    }
}
