//! Stations: capacity-bounded vehicle containers with observers.
//!
//! A [`Station`] owns the vehicles parked in it. Parking and removing are
//! the only ways membership changes, and both notify every subscribed
//! [`StationObserver`] synchronously after the change.
//!
//! # Modules
//!
//! - [`station`] -- [`Station`], [`SharedStation`] and capacity bounds
//! - [`observer`] -- [`StationObserver`] contract and [`StationSnapshot`]
//! - [`error`] -- [`StationError`] and [`ParkRejected`]

pub mod error;
pub mod observer;
pub mod station;

pub use error::{ParkRejected, StationError};
pub use observer::{StationObserver, StationSnapshot};
pub use station::{MAX_CAPACITY, MIN_CAPACITY, SharedStation, Station};
