//! Fleet rebalancing strategies.
//!
//! A strategy moves vehicles between stations through the ordinary
//! [`Station::remove`](fleet_station::Station::remove) and
//! [`Station::park`](fleet_station::Station::park) calls, so observers see
//! every move as a removal followed by a park. Capacity is therefore never
//! exceeded and no station underflows.

use fleet_station::SharedStation;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{RedistributionConfig, StrategyKind};

/// Why a redistribution run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Fewer than two stations were supplied.
    TooFewStations,
    /// The occupancy spread is at most one vehicle.
    Balanced,
    /// The fullest station has no movable vehicle or the emptiest has no room.
    NoEligibleMove,
    /// The move budget ran out.
    BudgetExhausted,
    /// A remove or park failed; the run was halted.
    MoveFailed,
    /// A station was already borrowed elsewhere.
    StationBusy,
}

/// Result of one redistribution run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RedistributionOutcome {
    /// Vehicles relocated.
    pub moves: u32,
    /// Why the run stopped.
    pub stop: StopReason,
}

/// Rebalances vehicles across stations.
pub trait RedistributionStrategy: core::fmt::Debug {
    /// Strategy name used in logs.
    fn name(&self) -> &'static str;

    /// Rebalance the given stations.
    fn redistribute(&self, stations: &[SharedStation]) -> RedistributionOutcome;
}

/// Build the strategy selected by configuration.
pub fn from_config(config: &RedistributionConfig) -> Box<dyn RedistributionStrategy> {
    match config.strategy {
        StrategyKind::RoundRobin => Box::new(RoundRobinRedistribution::new(config.max_moves)),
    }
}

/// Repeatedly moves one vehicle from the fullest station to the emptiest.
///
/// Stops when the spread between them is at most one, when no eligible move
/// exists, when a move fails, or after `max_moves` moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundRobinRedistribution {
    max_moves: u32,
}

impl RoundRobinRedistribution {
    /// Default move budget per run.
    pub const DEFAULT_MAX_MOVES: u32 = 20;

    /// Create a strategy with the given move budget.
    pub const fn new(max_moves: u32) -> Self {
        Self { max_moves }
    }

    /// The move budget.
    pub const fn max_moves(&self) -> u32 {
        self.max_moves
    }

    /// Indices of the emptiest (first minimum) and fullest (last maximum)
    /// stations with their occupancy. `None` if any station is busy.
    fn extremes(stations: &[SharedStation]) -> Option<((usize, usize), (usize, usize))> {
        let mut occupancy = Vec::with_capacity(stations.len());
        for (index, station) in stations.iter().enumerate() {
            let station = station.try_borrow().ok()?;
            occupancy.push((index, station.occupied_spaces()));
        }
        let least = occupancy.iter().copied().min_by_key(|&(_, occupied)| occupied)?;
        let most = occupancy.iter().copied().max_by_key(|&(_, occupied)| occupied)?;
        Some((least, most))
    }

    /// Move one vehicle. `Err` carries the reason to stop.
    fn move_one(from: &SharedStation, to: &SharedStation) -> Result<(), StopReason> {
        let (Ok(mut from), Ok(mut to)) = (from.try_borrow_mut(), to.try_borrow_mut()) else {
            return Err(StopReason::StationBusy);
        };

        if !to.has_available_space() {
            return Err(StopReason::NoEligibleMove);
        }
        let Some(vehicle_id) = from.first_redistributable() else {
            return Err(StopReason::NoEligibleMove);
        };

        let vehicle = from.remove(vehicle_id).map_err(|err| {
            warn!(error = %err, "Redistribution remove failed");
            StopReason::MoveFailed
        })?;

        match to.park(vehicle) {
            Ok(()) => {
                debug!(from = %from.id(), to = %to.id(), vehicle = %vehicle_id, "Vehicle redistributed");
                Ok(())
            }
            Err(rejected) => {
                warn!(error = %rejected, "Redistribution park failed, returning vehicle");
                if let Some(vehicle) = rejected.into_vehicle()
                    && let Err(err) = from.park(vehicle)
                {
                    warn!(error = %err, "Could not return vehicle to its origin station");
                }
                Err(StopReason::MoveFailed)
            }
        }
    }
}

impl Default for RoundRobinRedistribution {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_MOVES)
    }
}

impl RedistributionStrategy for RoundRobinRedistribution {
    fn name(&self) -> &'static str {
        "round_robin"
    }

    fn redistribute(&self, stations: &[SharedStation]) -> RedistributionOutcome {
        if stations.len() < 2 {
            return RedistributionOutcome {
                moves: 0,
                stop: StopReason::TooFewStations,
            };
        }

        let mut moves: u32 = 0;
        let stop = loop {
            if moves >= self.max_moves {
                break StopReason::BudgetExhausted;
            }
            let Some(((least, least_occupied), (most, most_occupied))) =
                Self::extremes(stations)
            else {
                break StopReason::StationBusy;
            };
            if most_occupied.saturating_sub(least_occupied) <= 1 {
                break StopReason::Balanced;
            }
            let (Some(from), Some(to)) = (stations.get(most), stations.get(least)) else {
                break StopReason::NoEligibleMove;
            };
            if let Err(reason) = Self::move_one(from, to) {
                break reason;
            }
            moves = moves.saturating_add(1);
        };

        RedistributionOutcome { moves, stop }
    }
}
