//! Unit tests for YAML config loading, overrides and validation

use seed_data_gen::{CountRange, PipelineKind};
use sql_seeder::config::{Overrides, SeederConfig};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_empty_yaml_is_default() {
    let config = SeederConfig::from_yaml("").unwrap();
    assert_eq!(config, SeederConfig::default());
}

#[test]
fn test_partial_yaml_keeps_other_defaults() {
    let yaml = r#"
seed: 42
output_dir: out
restaurant:
  child_count: { low: 10, high: 20 }
  database: null
cinema:
  enabled: false
ecommerce:
  summary_table: ProductSales
"#;
    let config = SeederConfig::from_yaml(yaml).unwrap();
    assert_eq!(config.seed, Some(42));
    assert_eq!(config.restaurant.child_count, CountRange::new(10, 20));
    assert_eq!(config.restaurant.database, None);
    assert_eq!(config.restaurant.quantity, CountRange::new(1, 8));
    assert_eq!(config.restaurant.label, "Novotel");
    assert_eq!(
        config.ecommerce.summary_table.as_deref(),
        Some("ProductSales")
    );
    assert_eq!(
        config.enabled(),
        vec![PipelineKind::Restaurant, PipelineKind::Ecommerce]
    );
    assert_eq!(
        config.output_path(PipelineKind::Restaurant),
        PathBuf::from("out/novotel_seed.sql")
    );
    config.validate().unwrap();
}

#[test]
fn test_load_reports_path_on_bad_yaml() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("seeder.yaml");
    fs::write(&path, "restaurant: [not, a, map]").unwrap();

    let err = SeederConfig::load(&path).unwrap_err();
    assert!(format!("{err:#}").contains("seeder.yaml"));
}

#[test]
fn test_load_missing_file() {
    let err = SeederConfig::load(std::path::Path::new("/nonexistent/seeder.yaml")).unwrap_err();
    assert!(err.to_string().contains("Cannot read config file"));
}

#[test]
fn test_overrides_take_precedence() {
    let mut config = SeederConfig {
        seed: Some(1),
        ..SeederConfig::default()
    };
    config.apply(&Overrides {
        output_dir: Some(PathBuf::from("/tmp/seeds")),
        seed: Some(99),
        only: vec![PipelineKind::Cinema],
        batch_size: Some(10),
        include_schema: true,
    });

    assert_eq!(config.seed, Some(99));
    assert_eq!(config.enabled(), vec![PipelineKind::Cinema]);
    assert_eq!(config.batch_size(PipelineKind::Cinema), 10);
    assert!(config.cinema.include_schema);
    assert_eq!(
        config.output_path(PipelineKind::Cinema),
        PathBuf::from("/tmp/seeds/pvrinox_seed.sql")
    );
}

#[test]
fn test_empty_overrides_change_nothing() {
    let mut config = SeederConfig::default();
    config.apply(&Overrides::default());
    assert_eq!(config, SeederConfig::default());
}

#[test]
fn test_validation_rejects_bad_settings() {
    let mut config = SeederConfig::default();
    config.cinema.batch_size = 0;
    assert!(config
        .validate()
        .unwrap_err()
        .to_string()
        .contains("cinema: batch_size"));

    let mut config = SeederConfig::default();
    config.restaurant.lookback_days = 0;
    assert!(config.validate().is_err());

    let mut config = SeederConfig::default();
    config.cinema.tickets = CountRange::new(300, 20);
    assert!(config.validate().is_err());

    let mut config = SeederConfig::default();
    config.ecommerce.suppliers = 100_000;
    assert!(config
        .validate()
        .unwrap_err()
        .to_string()
        .contains("distinct supplier names"));

    let mut config = SeederConfig::default();
    config.ecommerce.products = 0;
    assert!(config.validate().is_err());

    let mut config = SeederConfig::default();
    config.ecommerce.summary_table = Some("Orders".to_string());
    assert!(config.validate().is_err());
}

#[test]
fn test_disabled_pipeline_is_not_validated() {
    let mut config = SeederConfig::default();
    config.cinema.enabled = false;
    config.cinema.batch_size = 0;
    config.validate().unwrap();
}

#[test]
fn test_nothing_enabled_rejected() {
    let mut config = SeederConfig::default();
    config.restaurant.enabled = false;
    config.cinema.enabled = false;
    config.ecommerce.enabled = false;
    assert!(config
        .validate()
        .unwrap_err()
        .to_string()
        .contains("No pipelines enabled"));
}

#[test]
fn test_lookback_beyond_limit_rejected() {
    let mut config = SeederConfig::default();
    config.restaurant.lookback_days = 200_000_000;
    let err = config.validate().unwrap_err().to_string();
    assert!(err.contains("restaurant: lookback_days must be between 1 and 36500"));

    config.restaurant.lookback_days = seed_data_gen::MAX_LOOKBACK_DAYS;
    config.validate().unwrap();
}

#[test]
fn test_empty_summary_table_rejected() {
    let mut config = SeederConfig::default();
    config.ecommerce.summary_table = Some(String::new());
    config.apply(&Overrides {
        only: vec![PipelineKind::Ecommerce],
        ..Overrides::default()
    });
    let err = config.validate().unwrap_err().to_string();
    assert!(err.contains("ecommerce: summary_table"));
}

#[test]
fn test_unsafe_names_rejected() {
    for name in ["Product Sales", "Sales;DROP", "Sales\nX", "`Sales`"] {
        let mut config = SeederConfig::default();
        config.ecommerce.summary_table = Some(name.to_string());
        assert!(config.validate().is_err(), "{name:?} accepted");
    }

    let mut config = SeederConfig::default();
    config.cinema.database = Some("pvr db; DROP".to_string());
    assert!(config
        .validate()
        .unwrap_err()
        .to_string()
        .contains("cinema: database"));

    let mut config = SeederConfig::default();
    config.restaurant.database = Some(String::new());
    assert!(config.validate().is_err());

    let mut config = SeederConfig::default();
    config.restaurant.label = "Novotel\nDROP TABLE Orders;".to_string();
    assert!(config
        .validate()
        .unwrap_err()
        .to_string()
        .contains("restaurant: label must be a single line"));
}

#[test]
fn test_valid_names_accepted() {
    let mut config = SeederConfig::default();
    config.ecommerce.summary_table = Some("product_sales_2024".to_string());
    config.ecommerce.database = Some("inventory_db".to_string());
    config.cinema.label = "PVR INOX (Pune)".to_string();
    config.validate().unwrap();
}
