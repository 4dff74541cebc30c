//! End-to-end supervision scenarios over real stations and vehicles.

#![allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]

use fleet_core::config::SupervisionConfig;
use fleet_core::{ControlCenter, StationStreak, StopReason};
use fleet_station::{SharedStation, Station};
use fleet_types::{IdAllocator, StationEventKind, StationId};
use fleet_vehicle::{FlatRate, Vehicle, VehicleState};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn settings(theft_chance_percent: u32) -> SupervisionConfig {
    SupervisionConfig {
        theft_chance_percent,
        ..SupervisionConfig::default()
    }
}

fn center(theft_chance_percent: u32) -> ControlCenter<SmallRng> {
    ControlCenter::with_settings(settings(theft_chance_percent), SmallRng::seed_from_u64(99))
}

fn bike(ids: &mut IdAllocator) -> Vehicle {
    Vehicle::new(ids.next_vehicle(), FlatRate::classic_bike())
}

fn station_with(ids: &mut IdAllocator, capacity: usize, vehicles: usize) -> SharedStation {
    let mut station = Station::new(ids.next_station(), capacity);
    for _ in 0..vehicles {
        station.park(bike(ids)).unwrap();
    }
    station.into_shared()
}

fn count_events(center: &ControlCenter<SmallRng>, station: StationId, kind: StationEventKind) -> usize {
    center
        .station_events(station)
        .iter()
        .filter(|e| e.kind == kind)
        .count()
}

#[test]
fn full_and_empty_pair_converges_on_second_tick() {
    let mut ids = IdAllocator::new();
    let a = station_with(&mut ids, 10, 10);
    let b = station_with(&mut ids, 10, 0);
    let mut center = center(0);
    center.register_station(&a);
    center.register_station(&b);

    let first = center.tick().unwrap();
    assert!(first.redistribution.is_none());
    assert_eq!(center.streak(StationId(1)), Some(StationStreak { empty: 0, full: 1 }));
    assert_eq!(center.streak(StationId(2)), Some(StationStreak { empty: 1, full: 0 }));

    let second = center.tick().unwrap();
    let outcome = second.redistribution.unwrap();
    assert_eq!(outcome.moves, 5);
    assert_eq!(outcome.stop, StopReason::Balanced);
    assert_eq!(a.borrow().occupied_spaces(), 5);
    assert_eq!(b.borrow().occupied_spaces(), 5);
    assert_eq!(center.streak(StationId(1)), Some(StationStreak::default()));
    assert_eq!(center.streak(StationId(2)), Some(StationStreak::default()));

    // Every move shows up as a removal at A and a park at B.
    assert_eq!(count_events(&center, StationId(1), StationEventKind::Removed), 5);
    assert_eq!(count_events(&center, StationId(2), StationEventKind::Parked), 5);

    let third = center.tick().unwrap();
    assert!(third.redistribution.is_none());
}

#[test]
fn several_triggering_stations_cause_one_redistribution() {
    let mut ids = IdAllocator::new();
    let stations = [
        station_with(&mut ids, 10, 10),
        station_with(&mut ids, 10, 0),
        station_with(&mut ids, 10, 0),
        station_with(&mut ids, 10, 10),
    ];
    let mut center = center(0);
    for station in &stations {
        center.register_station(station);
    }

    center.tick().unwrap();
    let summary = center.tick().unwrap();
    assert_eq!(summary.full_stations, 2);
    assert_eq!(summary.empty_stations, 2);
    assert!(summary.redistribution.is_some());
    for station in &stations {
        assert_eq!(station.borrow().occupied_spaces(), 5);
        let id = station.borrow().id();
        assert_eq!(center.streak(id), Some(StationStreak::default()));
    }
}

#[test]
fn worn_vehicle_parked_enters_maintenance_once_and_is_repaired_a_tick_later() {
    let mut ids = IdAllocator::new();
    let station = station_with(&mut ids, 10, 3);
    let mut center = center(0);
    center.register_station(&station);
    let id = station.borrow().id();

    let mut worn = bike(&mut ids).with_maintenance_threshold(2);
    let worn_id = worn.id();
    for _ in 0..2 {
        worn.rent().unwrap();
        worn.return_vehicle().unwrap();
    }
    assert_eq!(worn.state(), VehicleState::OutOfService);

    station.borrow_mut().park(worn).unwrap();
    assert_eq!(
        station.borrow().vehicle(worn_id).unwrap().state(),
        VehicleState::UnderMaintenance
    );
    assert_eq!(count_events(&center, id, StationEventKind::MaintenanceStarted), 1);

    let first = center.tick().unwrap();
    assert_eq!(first.maintenance_started, 1);
    assert_eq!(first.repaired, 0);
    assert_eq!(
        station.borrow().vehicle(worn_id).unwrap().state(),
        VehicleState::UnderMaintenance
    );

    let second = center.tick().unwrap();
    assert_eq!(second.repaired, 1);
    let repaired = station.borrow();
    let vehicle = repaired.vehicle(worn_id).unwrap();
    assert_eq!(vehicle.state(), VehicleState::Available);
    assert_eq!(vehicle.rental_count(), 0);
    drop(repaired);

    assert_eq!(count_events(&center, id, StationEventKind::MaintenanceStarted), 1);
    assert_eq!(count_events(&center, id, StationEventKind::Repaired), 1);
    let repaired_event = center
        .station_events(id)
        .into_iter()
        .find(|e| e.kind == StationEventKind::Repaired)
        .unwrap();
    assert_eq!(repaired_event.tick, 2);
}

#[test]
fn maintenance_started_mid_tick_waits_one_more_tick() {
    let mut ids = IdAllocator::new();
    let station = station_with(&mut ids, 10, 3);
    let mut center = center(0);
    center.register_station(&station);

    center.tick().unwrap();
    let vehicle_id = station.borrow().vehicles()[0].id();
    station
        .borrow_mut()
        .vehicle_mut(vehicle_id)
        .unwrap()
        .send_to_maintenance()
        .unwrap();

    assert_eq!(center.tick().unwrap().repaired, 0);
    assert_eq!(center.tick().unwrap().repaired, 1);
}

#[test]
fn vehicle_returned_at_threshold_goes_out_of_service_then_maintenance() {
    let mut ids = IdAllocator::new();
    let station = station_with(&mut ids, 10, 0);
    let mut center = center(0);
    center.register_station(&station);
    let id = station.borrow().id();

    let vehicle = bike(&mut ids).with_maintenance_threshold(1);
    let vehicle_id = vehicle.id();
    station.borrow_mut().park(vehicle).unwrap();

    let mut rented = station.borrow_mut().remove(vehicle_id).unwrap();
    rented.rent().unwrap();
    assert_eq!(rented.return_vehicle().unwrap(), VehicleState::OutOfService);
    assert!(rented.rent().is_err());

    station.borrow_mut().park(rented).unwrap();
    assert_eq!(
        station.borrow().vehicle(vehicle_id).unwrap().state(),
        VehicleState::UnderMaintenance
    );
    assert_eq!(count_events(&center, id, StationEventKind::MaintenanceStarted), 1);
}

#[test]
fn lone_idle_vehicle_is_stolen_on_third_tick_when_theft_is_certain() {
    let mut ids = IdAllocator::new();
    let station = station_with(&mut ids, 10, 1);
    let mut center = center(100);
    center.register_station(&station);
    let id = station.borrow().id();

    assert_eq!(center.tick().unwrap().stolen, 0);
    assert_eq!(station.borrow().vehicles()[0].idle_ticks(), 1);
    assert_eq!(center.tick().unwrap().stolen, 0);
    assert_eq!(station.borrow().vehicles()[0].idle_ticks(), 2);

    let third = center.tick().unwrap();
    assert_eq!(third.stolen, 1);
    assert!(station.borrow().is_empty());
    assert_eq!(count_events(&center, id, StationEventKind::Stolen), 1);
    assert_eq!(count_events(&center, id, StationEventKind::Removed), 1);
}

#[test]
fn lone_vehicle_is_never_stolen_when_theft_is_impossible() {
    let mut ids = IdAllocator::new();
    let station = station_with(&mut ids, 10, 1);
    let mut center = center(0);
    center.register_station(&station);

    for _ in 0..20 {
        assert_eq!(center.tick().unwrap().stolen, 0);
    }
    assert_eq!(station.borrow().occupied_spaces(), 1);
    assert_eq!(station.borrow().vehicles()[0].idle_ticks(), 20);
}

#[test]
fn crowded_station_keeps_idle_counters_at_zero() {
    let mut ids = IdAllocator::new();
    let station = station_with(&mut ids, 10, 3);
    let mut center = center(100);
    center.register_station(&station);

    for _ in 0..10 {
        let summary = center.tick().unwrap();
        assert_eq!(summary.stolen, 0);
        for vehicle in station.borrow().vehicles() {
            assert_eq!(vehicle.idle_ticks(), 0);
        }
    }
}

#[test]
fn companion_arrival_resets_lone_vehicle_idle_counter() {
    let mut ids = IdAllocator::new();
    let station = station_with(&mut ids, 10, 1);
    let mut center = center(0);
    center.register_station(&station);

    center.tick().unwrap();
    center.tick().unwrap();
    assert_eq!(station.borrow().vehicles()[0].idle_ticks(), 2);

    station.borrow_mut().park(bike(&mut ids)).unwrap();
    center.tick().unwrap();
    for vehicle in station.borrow().vehicles() {
        assert_eq!(vehicle.idle_ticks(), 0);
    }
}

#[test]
fn lone_vehicle_under_maintenance_is_not_exposed() {
    let mut ids = IdAllocator::new();
    let station = station_with(&mut ids, 10, 1);
    let mut center = center(100);
    center.register_station(&station);
    for vehicle in station.borrow_mut().vehicles_mut() {
        vehicle.send_to_maintenance().unwrap();
    }

    // Tick 1 defers the repair, tick 2 repairs and starts counting idle.
    for _ in 0..2 {
        assert_eq!(center.tick().unwrap().stolen, 0);
    }
    assert_eq!(station.borrow().vehicles()[0].state(), VehicleState::Available);
    assert_eq!(station.borrow().vehicles()[0].idle_ticks(), 1);

    assert_eq!(center.tick().unwrap().stolen, 0);
    assert_eq!(center.tick().unwrap().stolen, 1);
}

#[test]
fn events_are_stamped_with_the_tick_they_happened_in() {
    let mut ids = IdAllocator::new();
    let station = station_with(&mut ids, 10, 3);
    let mut center = center(0);
    center.register_station(&station);
    let id = station.borrow().id();

    center.tick().unwrap();
    center.tick().unwrap();
    station.borrow_mut().park(bike(&mut ids)).unwrap();

    let last = center.station_events(id).pop().unwrap();
    assert_eq!(last.kind, StationEventKind::Parked);
    assert_eq!(last.tick, 2);
    assert_eq!(center.current_tick(), 2);
}

#[test]
fn random_traffic_keeps_every_station_within_capacity() {
    let mut ids = IdAllocator::new();
    let mut rng = SmallRng::seed_from_u64(2024);
    let stations: Vec<SharedStation> = (0..4)
        .map(|n| station_with(&mut ids, 10 + n * 3, 4 + n * 2))
        .collect();
    let initial: usize = stations.iter().map(|s| s.borrow().occupied_spaces()).sum();

    let mut center = ControlCenter::with_settings(settings(50), SmallRng::seed_from_u64(5));
    for station in &stations {
        center.register_station(station);
    }

    let mut rented: Vec<Vehicle> = Vec::new();
    let mut stolen = 0_usize;

    for _ in 0..200 {
        // Customers take vehicles out...
        for _ in 0..3 {
            let station = &stations[rng.random_range(0..stations.len())];
            let pick = station.borrow().rentable_vehicle_ids().first().copied();
            if let Some(vehicle_id) = pick {
                let mut vehicle = station.borrow_mut().remove(vehicle_id).unwrap();
                vehicle.rent().unwrap();
                rented.push(vehicle);
            }
        }
        // ...and bring some back, to the first station with room.
        let mut still_out = Vec::new();
        for mut vehicle in rented.drain(..) {
            if !rng.random_bool(0.5) {
                still_out.push(vehicle);
                continue;
            }
            vehicle.return_vehicle().unwrap();
            let start = rng.random_range(0..stations.len());
            let mut pending = Some(vehicle);
            for offset in 0..stations.len() {
                let station = &stations[(start + offset) % stations.len()];
                match station.borrow_mut().park(pending.take().unwrap()) {
                    Ok(()) => break,
                    Err(rejected) => pending = rejected.into_vehicle(),
                }
            }
            assert!(pending.is_none());
        }
        rented = still_out;

        let summary = center.tick().unwrap();
        stolen += summary.stolen as usize;

        for station in &stations {
            let station = station.borrow();
            assert!(station.occupied_spaces() <= station.capacity());
        }
    }

    assert_eq!(center.total_vehicles() + rented.len() + stolen, initial);
    assert!(
        center
            .fleet_summary()
            .states
            .keys()
            .all(|state| *state != VehicleState::Rented && *state != VehicleState::Stolen)
    );
}

#[test]
fn unknown_station_queries_are_empty() {
    let center = center(0);
    assert!(center.station_events(StationId(404)).is_empty());
    assert_eq!(center.streak(StationId(404)), None);
    assert!(center.station(StationId(404)).is_none());
    assert_eq!(center.total_vehicles(), 0);
}
