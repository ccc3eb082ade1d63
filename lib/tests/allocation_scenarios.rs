// lib/tests/allocation_scenarios.rs

use std::sync::Arc;

use lib::{AllocationEngine, AppConfig, BedScope, StorageConfig};
use models::{
    AllocationError, Bed, BedStatus, BedUpdate, Hospital, NewBed, NewHospital, NewSpecialty,
    NewSpecialtyGroup, Specialty,
};

async fn cardiology(engine: &AllocationEngine) -> Specialty {
    engine
        .specialties()
        .create_group(NewSpecialtyGroup {
            code: "MEDICINE".into(),
            name: "Medicine".into(),
            description: None,
        })
        .await
        .unwrap();
    engine
        .specialties()
        .create(NewSpecialty {
            code: "CARD".into(),
            name: "Cardiology".into(),
            group_code: "MEDICINE".into(),
            description: None,
        })
        .await
        .unwrap()
}

async fn hospital(engine: &AllocationEngine, name: &str, lat: f64, lon: f64, card: &Specialty) -> Hospital {
    engine
        .hospitals()
        .create(NewHospital {
            name: name.into(),
            address: None,
            city: "Paris".into(),
            postal_code: None,
            phone_number: None,
            latitude: lat,
            longitude: lon,
            total_beds: None,
            active: None,
            specialty_ids: vec![card.id],
        })
        .await
        .unwrap()
}

async fn bed(engine: &AllocationEngine, hospital: &Hospital, card: &Specialty, number: &str, status: BedStatus) -> Bed {
    engine
        .beds()
        .create(NewBed {
            hospital_id: hospital.id,
            specialty_id: card.id,
            bed_number: number.into(),
            room_number: None,
            floor: None,
            status: Some(status),
        })
        .await
        .unwrap()
}

fn memory_engine() -> AllocationEngine {
    AllocationEngine::from_config(&AppConfig::default()).unwrap()
}

/// Hospital A in central Paris with two free cardiology beds, B in Lyon with one.
async fn paris_and_lyon(engine: &AllocationEngine) -> (Specialty, Hospital, Hospital) {
    let card = cardiology(engine).await;
    let a = hospital(engine, "A", 48.8566, 2.3522, &card).await;
    let b = hospital(engine, "B", 45.7640, 4.8357, &card).await;
    bed(engine, &a, &card, "001", BedStatus::Available).await;
    bed(engine, &a, &card, "002", BedStatus::Available).await;
    bed(engine, &b, &card, "001", BedStatus::Available).await;
    (card, a, b)
}

#[tokio::test]
async fn nearest_search_ranks_paris_before_lyon() {
    let engine = memory_engine();
    let (_, a, b) = paris_and_lyon(&engine).await;

    let found = engine
        .search_nearest_with_availability(48.85, 2.35, "CARD", Some(5))
        .await
        .unwrap();
    assert_eq!(found.iter().map(|h| h.id).collect::<Vec<_>>(), vec![a.id, b.id]);
}

#[tokio::test]
async fn allocation_picks_the_closest_hospital() {
    let engine = memory_engine();
    let (_, a, _) = paris_and_lyon(&engine).await;

    let allocation = engine.allocate_for_emergency(48.85, 2.35, "card").await.unwrap();
    assert_eq!(allocation.hospital.id, a.id);
    assert_eq!(allocation.available_beds, 2);
    assert_eq!(allocation.specialty.code, "CARD");
    assert!(allocation.distance_km < 1.0);
    assert_eq!(allocation.estimated_time_minutes, 1);
}

#[tokio::test]
async fn radius_search_excludes_lyon() {
    let engine = memory_engine();
    let (_, a, _) = paris_and_lyon(&engine).await;

    let found = engine
        .search_within_radius(48.85, 2.35, "CARD", 50.0, None)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, a.id);
}

#[tokio::test]
async fn radius_search_without_limit_is_capped_at_the_default() {
    let engine = memory_engine();
    let card = cardiology(&engine).await;
    for i in 0..15 {
        let h = hospital(&engine, &format!("H{:02}", i), 48.85 + i as f64 * 0.01, 2.35, &card).await;
        bed(&engine, &h, &card, "001", BedStatus::Available).await;
    }

    let found = engine
        .search_within_radius(48.85, 2.35, "CARD", 50.0, None)
        .await
        .unwrap();
    assert_eq!(found.len(), engine.default_search_limit());
    assert_eq!(found[0].name, "H00");

    let found = engine
        .search_within_radius(48.85, 2.35, "CARD", 50.0, Some(12))
        .await
        .unwrap();
    assert_eq!(found.len(), 12);
}

#[tokio::test]
async fn occupied_bed_cannot_be_reserved() {
    let engine = memory_engine();
    let card = cardiology(&engine).await;
    let a = hospital(&engine, "A", 48.8566, 2.3522, &card).await;
    let occupied = bed(&engine, &a, &card, "001", BedStatus::Occupied).await;

    let err = engine.reserve_bed(occupied.id).await.unwrap_err();
    assert!(matches!(
        err,
        AllocationError::InvalidTransition { from: BedStatus::Occupied, to: BedStatus::Reserved }
    ));
}

#[tokio::test]
async fn releasing_a_reserved_bed_restores_the_count() {
    let engine = memory_engine();
    let card = cardiology(&engine).await;
    let a = hospital(&engine, "A", 48.8566, 2.3522, &card).await;
    bed(&engine, &a, &card, "001", BedStatus::Available).await;
    let reserved = bed(&engine, &a, &card, "002", BedStatus::Reserved).await;
    assert_eq!(engine.hospitals().find_by_id(a.id).await.unwrap().available_beds, 1);

    engine.release_bed(reserved.id).await.unwrap();
    assert_eq!(engine.hospitals().find_by_id(a.id).await.unwrap().available_beds, 2);
    let free = engine.find_available_beds(BedScope::Hospital(a.id)).await.unwrap();
    assert_eq!(free.len(), 2);
}

#[tokio::test]
async fn no_capacity_when_every_bed_is_taken() {
    let engine = memory_engine();
    let card = cardiology(&engine).await;
    let a = hospital(&engine, "A", 48.8566, 2.3522, &card).await;
    let only = bed(&engine, &a, &card, "001", BedStatus::Available).await;
    engine.transition_bed_status(only.id, BedStatus::Occupied).await.unwrap();

    let err = engine.allocate_for_emergency(48.85, 2.35, "CARD").await.unwrap_err();
    assert!(matches!(err, AllocationError::NoCapacityAvailable(code) if code == "CARD"));
    assert!(engine
        .search_nearest_with_availability(48.85, 2.35, "CARD", None)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn invalid_coordinates_are_rejected() {
    let engine = memory_engine();
    cardiology(&engine).await;
    let err = engine.allocate_for_emergency(91.0, 0.0, "CARD").await.unwrap_err();
    assert!(matches!(err, AllocationError::InvalidCoordinates { .. }));
    let err = engine
        .search_nearest_with_availability(0.0, f64::NAN, "CARD", None)
        .await
        .unwrap_err();
    assert!(matches!(err, AllocationError::InvalidCoordinates { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reservations_of_the_last_bed_admit_exactly_one() {
    let engine = Arc::new(memory_engine());
    let card = cardiology(&engine).await;
    let a = hospital(&engine, "A", 48.8566, 2.3522, &card).await;
    let last = bed(&engine, &a, &card, "001", BedStatus::Available).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move { engine.reserve_bed(last.id).await }));
    }

    let mut granted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(bed) => {
                assert_eq!(bed.status(), BedStatus::Reserved);
                granted += 1;
            }
            Err(err) => assert!(matches!(err, AllocationError::InvalidTransition { .. })),
        }
    }
    assert_eq!(granted, 1);
    assert_eq!(engine.hospitals().find_by_id(a.id).await.unwrap().available_beds, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_mutations_keep_the_aggregate_exact() {
    let engine = Arc::new(memory_engine());
    let card = cardiology(&engine).await;
    let a = hospital(&engine, "A", 48.8566, 2.3522, &card).await;
    let mut beds = Vec::new();
    for i in 0..10 {
        beds.push(bed(&engine, &a, &card, &format!("{:03}", i), BedStatus::Available).await);
    }

    let mut handles = Vec::new();
    for (i, b) in beds.iter().enumerate() {
        let engine = engine.clone();
        let id = b.id;
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                engine.transition_bed_status(id, BedStatus::Occupied).await
            } else {
                engine.reserve_bed(id).await.and(engine.release_bed(id).await)
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = engine.store().list_beds_by_hospital(a.id).await.unwrap();
    let free = stored.iter().filter(|b| b.is_available()).count() as u32;
    assert_eq!(free, 5);
    assert_eq!(engine.hospitals().find_by_id(a.id).await.unwrap().available_beds, free);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_moves_and_deletes_keep_both_aggregates_exact() {
    let engine = Arc::new(memory_engine());
    let card = cardiology(&engine).await;
    let a = hospital(&engine, "A", 48.8566, 2.3522, &card).await;
    let b = hospital(&engine, "B", 45.7640, 4.8357, &card).await;
    let mut beds = Vec::new();
    for i in 0..12 {
        beds.push(bed(&engine, &a, &card, &format!("{:03}", i), BedStatus::Available).await);
    }

    let mut handles = Vec::new();
    for victim in &beds {
        let id = victim.id;
        let mover = engine.clone();
        let target = b.id;
        handles.push(tokio::spawn(async move {
            mover
                .beds()
                .update(id, BedUpdate { hospital_id: Some(target), ..BedUpdate::default() })
                .await
                .map(|_| ())
        }));
        let deleter = engine.clone();
        handles.push(tokio::spawn(async move { deleter.beds().delete(id).await }));
    }
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => {}
            Err(err) => assert!(matches!(err, AllocationError::NotFound { entity: "bed", .. })),
        }
    }

    for h in [&a, &b] {
        let stored = engine.store().list_beds_by_hospital(h.id).await.unwrap();
        let free = stored.iter().filter(|bed| bed.is_available()).count() as u32;
        assert_eq!(engine.hospitals().find_by_id(h.id).await.unwrap().available_beds, free);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn specialty_delete_never_orphans_concurrently_created_beds() {
    let engine = Arc::new(memory_engine());
    let card = cardiology(&engine).await;
    let a = hospital(&engine, "A", 48.8566, 2.3522, &card).await;
    let neuro = engine
        .specialties()
        .create(NewSpecialty {
            code: "NEUR".into(),
            name: "Neurology".into(),
            group_code: "MEDICINE".into(),
            description: None,
        })
        .await
        .unwrap();

    let mut creators = Vec::new();
    for i in 0..8 {
        let engine = engine.clone();
        let request = NewBed {
            hospital_id: a.id,
            specialty_id: neuro.id,
            bed_number: format!("N{:02}", i),
            room_number: None,
            floor: None,
            status: None,
        };
        creators.push(tokio::spawn(async move { engine.beds().create(request).await }));
    }
    let deleter = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.specialties().delete(neuro.id).await })
    };
    for creator in creators {
        if let Err(err) = creator.await.unwrap() {
            assert!(matches!(err, AllocationError::NotFound { entity: "specialty", .. }));
        }
    }
    let deleted = deleter.await.unwrap();

    let referencing = engine.store().count_beds_by_specialty(neuro.id).await.unwrap();
    match deleted {
        Ok(()) => {
            assert!(engine.store().get_specialty(neuro.id).await.unwrap().is_none());
            assert_eq!(referencing, 0);
        }
        Err(err) => {
            assert!(matches!(err, AllocationError::InvalidInput(_)));
            assert!(referencing > 0);
        }
    }
}

#[tokio::test]
async fn sled_engine_persists_reservations() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        storage: StorageConfig::sled(dir.path()),
        ..AppConfig::default()
    };
    let bed_id = {
        let engine = AllocationEngine::from_config(&config).unwrap();
        let card = cardiology(&engine).await;
        let a = hospital(&engine, "A", 48.8566, 2.3522, &card).await;
        let b = bed(&engine, &a, &card, "001", BedStatus::Available).await;
        engine.reserve_bed(b.id).await.unwrap();
        engine.flush().await.unwrap();
        b.id
    };

    let reopened = AllocationEngine::from_config(&config).unwrap();
    let stored = reopened.beds().find_by_id(bed_id).await.unwrap();
    assert_eq!(stored.status(), BedStatus::Reserved);
    assert!(!stored.is_available());
}
