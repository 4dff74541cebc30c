//! Fleet supervision: the tick-driven control loop over a set of stations.
//!
//! # Modules
//!
//! - [`clock`] -- [`FleetClock`], the logical tick counter
//! - [`config`] -- [`FleetConfig`] loaded from `fleet-config.yaml`
//! - [`supervisor`] -- [`ControlCenter`]: registration, tick passes, queries
//! - [`monitor`] -- [`FleetMonitor`]: station observer, event journal, park-time maintenance
//! - [`redistribution`] -- [`RedistributionStrategy`] and [`RoundRobinRedistribution`]
//! - [`service`] -- [`VehicleService`], [`Repairer`], [`Painter`], [`ServiceRegistry`]
//! - [`tick`] -- [`TickSummary`] and [`TickError`]
//! - [`runner`] -- [`run_simulation`] with [`TickCallback`] hooks

pub mod clock;
pub mod config;
pub mod monitor;
pub mod redistribution;
pub mod runner;
pub mod service;
pub mod supervisor;
pub mod tick;

pub use clock::{ClockError, FleetClock};
pub use config::{ConfigError, FleetConfig};
pub use monitor::FleetMonitor;
pub use redistribution::{
    RedistributionOutcome, RedistributionStrategy, RoundRobinRedistribution, StopReason,
};
pub use runner::{NoOpCallback, RunnerError, SimulationResult, TickCallback, run_simulation};
pub use service::{DispatchError, Painter, Repairer, ServiceRegistry, VehicleService};
pub use supervisor::{ControlCenter, FleetSummary, StationStreak, StationSummary};
pub use tick::{TickError, TickSummary};
