use daygo_core::{
    init,
    storage::MemoryStorage,
    utils::build_info,
    StateManager, TripCommand, WalletCommand,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;

#[test]
fn trip_and_wallet_smoke() {
    init();

    let mut manager = StateManager::load(MemoryStorage::new()).expect("load state");
    let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();

    manager
        .dispatch_trip(TripCommand::Create {
            title: "Smoke".into(),
            start,
            end,
        })
        .expect("create trip");
    manager
        .dispatch_wallet(WalletCommand::SetBudget {
            currency: "EUR".into(),
            symbol: "€".into(),
            amount: Decimal::new(400, 0),
        })
        .expect("set budget");

    let layout = manager.layout();
    assert_eq!(layout.dates().count(), 4);
    assert_eq!(layout.depth(), 1);
    assert!(manager.state().wallets.wallet("EUR").is_some());
    assert!(!build_info::current().version.is_empty());
}
