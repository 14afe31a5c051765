//! Handler flow against a file-backed store in a temp directory.

use shipcomply_cli::catalog::{run_import, run_reset, run_rules, run_seed, ImportArgs, RulesArgs};
use shipcomply_cli::config::ShipcomplyConfig;
use shipcomply_cli::validate::{run_validate, ValidateArgs};
use shipcomply_core::ComplianceRule;
use shipcomply_store::{MemoryStore, RuleStore};

fn config_in(dir: &tempfile::TempDir) -> ShipcomplyConfig {
    ShipcomplyConfig {
        store_path: dir.path().join("store.json"),
        ..Default::default()
    }
}

/// Every required field, shipped within the US.
const DOMESTIC: &str = concat!(
    "trackingNumber: 1Z999AA10123456784\n",
    "shipDate: 2024-03-15\n",
    "carrier: UPS\n",
    "weight: 2.5 kg\n",
    "shipperName: Acme Supply Co\n",
    "shipperAddress: 1 Main Street, Springfield, IL\n",
    "shipperCountry: US\n",
    "recipientName: Jane Smith\n",
    "recipientAddress: 350 Fifth Avenue, New York, NY\n",
    "recipientCountry: US\n",
);

fn validate_args(file: std::path::PathBuf) -> ValidateArgs {
    ValidateArgs {
        file,
        destination: None,
        region: None,
        json: false,
    }
}

#[tokio::test]
async fn seed_persists_and_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);

    assert_eq!(run_seed(&config).await.unwrap(), 0);
    let store = MemoryStore::open(&config.store_path).unwrap();
    let seeded = store.count::<ComplianceRule>().await.unwrap();
    assert!(seeded > 0);

    assert_eq!(run_seed(&config).await.unwrap(), 0);
    let store = MemoryStore::open(&config.store_path).unwrap();
    assert_eq!(store.count::<ComplianceRule>().await.unwrap(), seeded);

    assert_eq!(run_reset(&config).await.unwrap(), 0);
    let store = MemoryStore::open(&config.store_path).unwrap();
    assert_eq!(store.count::<ComplianceRule>().await.unwrap(), seeded);

    assert_eq!(run_rules(&RulesArgs { json: true }, &config).await.unwrap(), 0);
}

#[tokio::test]
async fn validate_exit_code_reflects_compliance() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);

    let domestic = dir.path().join("domestic.yaml");
    std::fs::write(&domestic, DOMESTIC).unwrap();
    assert_eq!(run_validate(&validate_args(domestic.clone()), &config).await.unwrap(), 0);

    let mut args = validate_args(domestic);
    args.destination = Some("Cuba".into());
    assert_eq!(run_validate(&args, &config).await.unwrap(), 2);
}

#[tokio::test]
async fn imported_destination_takes_effect() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    run_seed(&config).await.unwrap();

    let shipment = dir.path().join("mx.yaml");
    let body = DOMESTIC.replace("recipientCountry: US", "recipientCountry: Mexico")
        + concat!(
            "declaredValue: 120\n",
            "currency: USD\n",
            "packageContents: Books\n",
            "commodityCode: \"490199\"\n",
            "countryOfOrigin: US\n",
        );
    std::fs::write(&shipment, body).unwrap();
    assert_eq!(run_validate(&validate_args(shipment.clone()), &config).await.unwrap(), 0);

    let reference = dir.path().join("reference.yaml");
    std::fs::write(
        &reference,
        "restrictedDestinations:\n  - countryCode: MX\n    countryName: Mexico\n    restrictionType: limited\n",
    )
    .unwrap();
    assert_eq!(run_import(&ImportArgs { file: reference }, &config).await.unwrap(), 0);

    assert_eq!(run_validate(&validate_args(shipment), &config).await.unwrap(), 2);
}
