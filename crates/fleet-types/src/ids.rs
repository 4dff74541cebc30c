//! Type-safe identifier wrappers and the allocator that hands them out.
//!
//! Stations and vehicles carry small monotonic integer ids. Ids are never
//! produced from hidden global counters: the driver owns an [`IdAllocator`]
//! and passes the ids it mints into the constructors.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around `u32` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident, $prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Return the inner numeric value.
            pub const fn into_inner(self) -> u32 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a station.
    StationId, "station"
}

define_id! {
    /// Unique identifier for a vehicle.
    VehicleId, "vehicle"
}

/// Monotonic id source for stations and vehicles.
///
/// Each counter starts at 1 and never hands out the same value twice.
/// Counters saturate at `u32::MAX` rather than wrapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdAllocator {
    last_station: u32,
    last_vehicle: u32,
}

impl IdAllocator {
    /// Create an allocator whose first ids are `station-1` and `vehicle-1`.
    pub const fn new() -> Self {
        Self {
            last_station: 0,
            last_vehicle: 0,
        }
    }

    /// Mint the next station id.
    pub const fn next_station(&mut self) -> StationId {
        self.last_station = self.last_station.saturating_add(1);
        StationId(self.last_station)
    }

    /// Mint the next vehicle id.
    pub const fn next_vehicle(&mut self) -> VehicleId {
        self.last_vehicle = self.last_vehicle.saturating_add(1);
        VehicleId(self.last_vehicle)
    }

    /// Number of station ids minted so far.
    pub const fn stations_allocated(&self) -> u32 {
        self.last_station
    }

    /// Number of vehicle ids minted so far.
    pub const fn vehicles_allocated(&self) -> u32 {
        self.last_vehicle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_is_monotonic_per_kind() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.next_station(), StationId(1));
        assert_eq!(ids.next_station(), StationId(2));
        assert_eq!(ids.next_vehicle(), VehicleId(1));
        assert_eq!(ids.next_station(), StationId(3));
        assert_eq!(ids.stations_allocated(), 3);
        assert_eq!(ids.vehicles_allocated(), 1);
    }

    #[test]
    fn id_display_carries_prefix() {
        assert_eq!(StationId(4).to_string(), "station-4");
        assert_eq!(VehicleId(17).to_string(), "vehicle-17");
    }

    #[test]
    fn id_serializes_as_plain_number() {
        let json = serde_json::to_string(&VehicleId(9)).ok();
        assert_eq!(json.as_deref(), Some("9"));
        let restored: Result<StationId, _> = serde_json::from_str("12");
        assert_eq!(restored.ok(), Some(StationId(12)));
    }
}
