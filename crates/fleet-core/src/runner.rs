//! Simulation loop runner.
//!
//! [`run_simulation`] drives a [`ControlCenter`] for a bounded number of
//! ticks. Between ticks it hands the stations to a [`TickCallback`] so a
//! driver can simulate customers renting and returning vehicles; after
//! each tick the callback receives the summary.

use fleet_station::SharedStation;
use rand::Rng;
use tracing::{info, warn};

use crate::supervisor::{ControlCenter, FleetSummary};
use crate::tick::{TickError, TickSummary};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Totals accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    /// Vehicles repaired.
    pub repaired: u32,
    /// Vehicles stolen.
    pub stolen: u32,
    /// Vehicles sent to maintenance on park.
    pub maintenance_started: u32,
    /// Redistribution runs triggered.
    pub redistributions: u32,
    /// Vehicles moved by redistribution.
    pub moves: u32,
}

impl RunTotals {
    fn add(&mut self, summary: &TickSummary) {
        self.repaired = self.repaired.saturating_add(summary.repaired);
        self.stolen = self.stolen.saturating_add(summary.stolen);
        self.maintenance_started = self
            .maintenance_started
            .saturating_add(summary.maintenance_started);
        if summary.redistribution.is_some() {
            self.redistributions = self.redistributions.saturating_add(1);
        }
        self.moves = self.moves.saturating_add(summary.redistribution_moves());
    }
}

/// Result of the simulation run.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// Total number of ticks executed.
    pub total_ticks: u64,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Totals over every tick.
    pub totals: RunTotals,
    /// Fleet picture after the last tick.
    pub fleet: FleetSummary,
}

/// Hooks invoked around each tick.
pub trait TickCallback {
    /// Called before each tick with the supervised stations.
    fn before_tick(&mut self, _tick: u64, _stations: &[SharedStation]) {}

    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, fleet: &FleetSummary);
}

/// A no-op tick callback for testing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _fleet: &FleetSummary) {}
}

/// Run `max_ticks` ticks.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick execution fails unrecoverably.
pub fn run_simulation<R: Rng>(
    center: &mut ControlCenter<R>,
    max_ticks: u64,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut final_summary: Option<TickSummary> = None;
    let mut totals = RunTotals::default();
    let mut total_ticks: u64 = 0;

    info!(
        max_ticks,
        stations = center.stations().len(),
        vehicles = center.total_vehicles(),
        "Simulation starting"
    );

    while total_ticks < max_ticks {
        callback.before_tick(center.current_tick().saturating_add(1), center.stations());

        let summary = center.tick()?;
        total_ticks = total_ticks.saturating_add(1);
        totals.add(&summary);

        callback.on_tick(&summary, &center.fleet_summary());
        final_summary = Some(summary);
    }

    Ok(SimulationResult {
        total_ticks,
        final_summary,
        totals,
        fleet: center.fleet_summary(),
    })
}

/// Log the end of a run.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        repaired = result.totals.repaired,
        stolen = result.totals.stolen,
        maintenance_started = result.totals.maintenance_started,
        redistributions = result.totals.redistributions,
        moves = result.totals.moves,
        "Simulation ended"
    );

    if result.final_summary.is_some() {
        info!(
            vehicles = result.fleet.total_vehicles,
            capacity = result.fleet.total_capacity,
            states = ?result.fleet.states,
            "Final fleet"
        );
    } else {
        warn!("Simulation ended with no ticks executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use fleet_station::Station;
    use fleet_types::{StationId, VehicleId};
    use fleet_vehicle::{FlatRate, Vehicle};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[derive(Default)]
    struct CountCallback {
        before: Vec<u64>,
        after: Vec<u64>,
    }

    impl TickCallback for CountCallback {
        fn before_tick(&mut self, tick: u64, _stations: &[SharedStation]) {
            self.before.push(tick);
        }

        fn on_tick(&mut self, summary: &TickSummary, _fleet: &FleetSummary) {
            self.after.push(summary.tick);
        }
    }

    fn center_with_imbalance() -> ControlCenter<SmallRng> {
        let mut center = ControlCenter::new(SmallRng::seed_from_u64(1));
        let mut full = Station::new(StationId(1), 10);
        for n in 0..10 {
            full.park(Vehicle::new(VehicleId(n), FlatRate::classic_bike()))
                .unwrap();
        }
        center.register_station(&full.into_shared());
        center.register_station(&Station::new(StationId(2), 10).into_shared());
        center
    }

    #[test]
    fn runs_the_requested_number_of_ticks() {
        let mut center = center_with_imbalance();
        let mut callback = CountCallback::default();
        let result = run_simulation(&mut center, 3, &mut callback).unwrap();

        assert_eq!(result.total_ticks, 3);
        assert_eq!(result.final_summary.as_ref().map(|s| s.tick), Some(3));
        assert_eq!(callback.before, vec![1, 2, 3]);
        assert_eq!(callback.after, vec![1, 2, 3]);
        log_simulation_end(&result);
    }

    #[test]
    fn totals_accumulate_redistribution() {
        let mut center = center_with_imbalance();
        let result = run_simulation(&mut center, 2, &mut NoOpCallback).unwrap();
        assert_eq!(result.totals.redistributions, 1);
        assert_eq!(result.totals.moves, 5);
        assert_eq!(result.fleet.total_vehicles, 10);
    }

    #[test]
    fn zero_ticks_is_a_valid_run() {
        let mut center = center_with_imbalance();
        let result = run_simulation(&mut center, 0, &mut NoOpCallback).unwrap();
        assert_eq!(result.total_ticks, 0);
        assert!(result.final_summary.is_none());
        log_simulation_end(&result);
    }
}
