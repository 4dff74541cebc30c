//! Tick outcome types.
//!
//! A tick runs three passes over every station in registration order:
//!
//! 1. **Maintenance**: vehicles that spent a full tick under maintenance are
//!    repaired; vehicles that just entered are flagged for the next tick.
//! 2. **Theft risk**: a lone rentable vehicle that has been idle long enough
//!    may be stolen; crowded stations reset idle counters.
//! 3. **Streaks**: consecutive empty and full ticks are counted.
//!
//! If any streak reached its threshold, one redistribution runs over all
//! stations and every streak is reset. The passes themselves live on
//! [`ControlCenter`](crate::supervisor::ControlCenter); this module holds
//! what a tick reports.

use serde::Serialize;

use crate::clock::ClockError;
use crate::redistribution::RedistributionOutcome;

/// Errors that can occur during tick execution.
///
/// Station-level hiccups never surface here: they are logged and the tick
/// carries on.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Vehicles whose maintenance was completed.
    pub repaired: u32,
    /// Vehicles stolen from their station.
    pub stolen: u32,
    /// Vehicles sent to maintenance on park since the previous tick.
    pub maintenance_started: u32,
    /// Redistribution run, if one was triggered.
    pub redistribution: Option<RedistributionOutcome>,
    /// Stations that were empty during the streak pass.
    pub empty_stations: usize,
    /// Stations that were full during the streak pass.
    pub full_stations: usize,
    /// Vehicles parked across all stations at the end of the tick.
    pub vehicles_parked: usize,
    /// Sum of station capacities.
    pub total_capacity: usize,
}

impl TickSummary {
    /// Vehicles moved by redistribution during this tick.
    pub fn redistribution_moves(&self) -> u32 {
        self.redistribution.map_or(0, |outcome| outcome.moves)
    }
}
