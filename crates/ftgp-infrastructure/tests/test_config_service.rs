use ftgp_core::amount::TokenAmount;
use ftgp_core::config::FtgpConfig;
use ftgp_core::error::FtgpError;
use ftgp_infrastructure::ConfigService;
use tempfile::TempDir;

#[test]
fn test_missing_file_yields_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let service = ConfigService::with_path(temp_dir.path().join("config.toml"));

    let config = service.get_config().expect("Should fall back to defaults");
    assert_eq!(config, FtgpConfig::default());
}

#[test]
fn test_empty_file_yields_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "   \n").unwrap();

    let config = ConfigService::with_path(path).get_config().unwrap();
    assert_eq!(config, FtgpConfig::default());
}

#[test]
fn test_save_creates_directories_and_reloads() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("ftgp").join("config.toml");
    let service = ConfigService::with_path(&path);

    let mut config = FtgpConfig::default();
    config.workflow.max_deposit_probe = 25;
    config.dev_ledger.opening_balance = TokenAmount::from_whole(50);
    service.save(&config).expect("Should save config");
    assert!(path.exists());

    let reloaded = ConfigService::with_path(&path).get_config().unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn test_cache_is_used_until_saved() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "[workflow]\nmax_deposit_probe = 10\n").unwrap();
    let service = ConfigService::with_path(&path);
    assert_eq!(service.get_config().unwrap().workflow.max_deposit_probe, 10);

    std::fs::write(&path, "[workflow]\nmax_deposit_probe = 20\n").unwrap();
    assert_eq!(service.get_config().unwrap().workflow.max_deposit_probe, 10);

    let mut config = service.get_config().unwrap();
    config.workflow.max_deposit_probe = 30;
    service.save(&config).unwrap();
    assert_eq!(service.get_config().unwrap().workflow.max_deposit_probe, 30);
}

#[test]
fn test_malformed_file_is_a_serialization_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "[workflow\nmax_deposit_probe = ").unwrap();

    let err = ConfigService::with_path(path).get_config().unwrap_err();
    assert!(matches!(err, FtgpError::Serialization { .. }));
}

#[test]
fn test_save_rejects_invalid_config() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    let mut config = FtgpConfig::default();
    config.loan.loan_to_value = 0.0;

    let err = ConfigService::with_path(&path).save(&config).unwrap_err();
    assert!(matches!(err, FtgpError::Config(_)));
    assert!(!path.exists());
}
