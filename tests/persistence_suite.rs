mod common;

use std::fs;

use chrono::{TimeZone, Utc};
use common::{jan, temp_base};
use daygo_core::{
    itinerary::NewScheduleItem,
    storage::{Collection, JsonStorage, StorageBackend},
    TripBook, WalletBook,
};
use rust_decimal::Decimal;

fn sample_trips() -> TripBook {
    let mut trips = TripBook::new();
    let trip_id = trips.create_trip("Taipei", jan(14), jan(17)).unwrap();
    let day_id = trips.trip(trip_id).unwrap().days[1].id;
    trips
        .add_schedule_item(
            trip_id,
            day_id,
            NewScheduleItem::new("Night market", "18:00")
                .ending_at("21:30")
                .with_description("Shilin")
                .with_color("#4ECDC4"),
        )
        .unwrap();
    trips.add_checklist_item(trip_id, "EasyCard").unwrap();
    trips
        .set_cover_image(trip_id, Some("file:///covers/taipei.jpg".into()))
        .unwrap();
    trips
}

fn sample_wallets() -> WalletBook {
    let mut wallets = WalletBook::new();
    wallets.set_budget("TWD", "", Decimal::new(20_000, 0)).unwrap();
    let when = Utc.with_ymd_and_hms(2025, 1, 15, 12, 5, 0).unwrap();
    wallets
        .record_expense("TWD", Decimal::new(35050, 2), "Beef noodles", Some(when))
        .unwrap();
    wallets
}

#[test]
fn collections_round_trip_losslessly() {
    let storage = JsonStorage::new(Some(temp_base()), Some(3)).unwrap();
    let trips = sample_trips();
    let wallets = sample_wallets();
    storage.save_trips(&trips).unwrap();
    storage.save_wallets(&wallets).unwrap();

    assert_eq!(storage.load_trips().unwrap(), trips);
    assert_eq!(storage.load_wallets().unwrap(), wallets);

    let raw = fs::read_to_string(storage.collection_path(Collection::Wallets)).unwrap();
    assert!(raw.contains("2025-01-15T12:05:00Z"), "dates stored as ISO-8601");
    assert!(raw.contains("\"350.5\"") || raw.contains("\"350.50\""));
    let raw = fs::read_to_string(storage.collection_path(Collection::Trips)).unwrap();
    assert!(raw.contains("\"18:00\""));
    assert!(raw.contains("\"2025-01-14\""));
}

#[test]
fn fresh_directory_loads_empty_collections() {
    let storage = JsonStorage::new(Some(temp_base()), None).unwrap();
    assert!(storage.load_trips().unwrap().is_empty());
    assert!(storage.load_wallets().unwrap().is_empty());
    assert!(storage.list_backups(Collection::Trips).unwrap().is_empty());
}

#[test]
fn failed_save_preserves_original_file() {
    let storage = JsonStorage::new(Some(temp_base()), Some(2)).unwrap();
    let wallets = sample_wallets();
    storage.save_wallets(&wallets).unwrap();
    let path = storage.collection_path(Collection::Wallets);
    let original = fs::read_to_string(&path).unwrap();

    // A directory where the temp file should go makes the write fail.
    let tmp = path.with_extension("json.tmp");
    fs::create_dir_all(&tmp).unwrap();

    let mut changed = wallets.clone();
    changed.set_budget("USD", "$", Decimal::new(10, 0)).unwrap();
    assert!(storage.save_wallets(&changed).is_err());
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
    assert_eq!(storage.load_wallets().unwrap(), wallets);
}

#[test]
fn corrupt_file_is_a_storage_error() {
    let storage = JsonStorage::new(Some(temp_base()), None).unwrap();
    fs::write(storage.collection_path(Collection::Trips), "{not json").unwrap();
    let err = storage.load_trips().unwrap_err();
    assert!(err.to_string().contains("failed to parse"));
}

#[test]
fn backups_can_be_restored() {
    let storage = JsonStorage::new(Some(temp_base()), Some(3)).unwrap();
    let trips = sample_trips();
    storage.save_trips(&trips).unwrap();
    storage.save_trips(&TripBook::new()).unwrap();
    assert!(storage.load_trips().unwrap().is_empty());

    let backups = storage.list_backups(Collection::Trips).unwrap();
    assert_eq!(backups.len(), 1);
    storage.restore_backup(Collection::Trips, &backups[0]).unwrap();
    assert_eq!(storage.load_trips().unwrap(), trips);
}
