use moviescope::config::{AppConfig, ConfigManager, DEFAULT_COLLECTION_ID, DEFAULT_STORE_URL};
use std::fs;
use tempfile::TempDir;

// Helper to create a temporary config directory for testing
fn setup_test_config_dir() -> (TempDir, ConfigManager) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_manager = ConfigManager::with_dir(temp_dir.path().to_path_buf());
    (temp_dir, config_manager)
}

fn write_user_config(config_manager: &ConfigManager, content: &str) {
    config_manager
        .ensure_config_dir()
        .expect("Failed to create config dir");
    fs::write(config_manager.config_path("config.toml"), content)
        .expect("Failed to write config");
}

#[test]
fn test_default_config() {
    let config = AppConfig::default();

    assert_eq!(config.version, "0.1");

    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 5000);

    assert_eq!(config.store.base_url, DEFAULT_STORE_URL);
    assert_eq!(config.store.collection_id, DEFAULT_COLLECTION_ID);
    assert_eq!(config.store.offset, 0);
    assert_eq!(config.store.limit, 2000);
    assert_eq!(config.store.auth_token, None);
    assert_eq!(config.store.timeout_secs, 30);

    assert_eq!(config.chart.width, 720);
    assert_eq!(config.chart.height, 600);
    assert_eq!(config.chart.point_size, 5);
    assert_eq!(config.chart.point_color, "#FF9900");
    assert_eq!(config.chart.x_label, "IMDB Rating");
    assert_eq!(config.chart.y_label, "Rotten Tomatoes Rating");

    assert!(!config.debug.enabled);
}

#[test]
fn test_generate_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let template = config_manager.generate_default_config();

    // Every section is present, commented out
    assert!(template.contains("# [server]"));
    assert!(template.contains("# [store]"));
    assert!(template.contains("# [chart]"));
    assert!(template.contains("# [debug]"));
    assert!(template.contains("# version = \"0.1\""));
    assert!(template.contains("# port = 5000"));

    // Unset options are listed too
    assert!(template.contains("# auth_token = null"));
}

#[test]
fn test_default_template_parses_to_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let template = config_manager.generate_default_config();
    let parsed: AppConfig = toml::from_str(&template).expect("template is valid TOML");
    assert_eq!(parsed.server.port, AppConfig::default().server.port);
    assert_eq!(parsed.store.limit, AppConfig::default().store.limit);
}

#[test]
fn test_write_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let config_path = config_manager
        .write_default_config(false)
        .expect("Failed to write config");

    assert!(config_path.exists());

    let content = fs::read_to_string(&config_path).expect("Failed to read config");
    assert!(content.contains("# [store]"));
    assert!(content.contains("version = \"0.1\""));
}

#[test]
fn test_write_config_without_force_fails_if_exists() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    config_manager
        .write_default_config(false)
        .expect("First write should succeed");

    let result = config_manager.write_default_config(false);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("already exists"));
}

#[test]
fn test_write_config_with_force_overwrites() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    write_user_config(&config_manager, "[server]\nport = 9000\n");
    let path = config_manager
        .write_default_config(true)
        .expect("Write with force should succeed");

    let content = fs::read_to_string(&path).expect("Failed to read config");
    assert!(!content.contains("port = 9000"));
}

#[test]
fn test_load_config_with_no_file() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let config = AppConfig::load_from(&config_manager).expect("Should load default config");
    assert_eq!(config.version, "0.1");
    assert_eq!(config.server.port, 5000);
}

#[test]
fn test_load_minimal_config_keeps_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_user_config(
        &config_manager,
        r##"
[store]
collection_id = "my-movies"
auth_token = "hunter2"

[chart]
point_color = "#1f77b4"
"##,
    );

    let config = AppConfig::load_from(&config_manager).expect("Should load config");

    assert_eq!(config.store.collection_id, "my-movies");
    assert_eq!(config.store.auth_token.as_deref(), Some("hunter2"));
    assert_eq!(config.chart.point_color, "#1f77b4");

    // Unspecified values stay at their defaults
    assert_eq!(config.store.base_url, DEFAULT_STORE_URL);
    assert_eq!(config.store.limit, 2000);
    assert_eq!(config.server.port, 5000);
}

#[test]
fn test_load_rejects_invalid_values() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_user_config(&config_manager, "[chart]\npoint_color = \"orange\"\n");

    let err = AppConfig::load_from(&config_manager).unwrap_err();
    assert!(err.to_string().contains("Invalid configuration"));
}

#[test]
fn test_load_rejects_non_ascii_color() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_user_config(&config_manager, "[chart]\npoint_color = \"#1\u{e9}234\"\n");

    let err = AppConfig::load_from(&config_manager).unwrap_err();
    assert!(err.to_string().contains("Invalid configuration"));
}

#[test]
fn test_load_rejects_malformed_toml() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_user_config(&config_manager, "[server\nport = ");

    let err = AppConfig::load_from(&config_manager).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn test_merge_does_not_override_with_defaults() {
    let mut base = AppConfig::default();
    base.server.port = 8080;
    base.store.limit = 100;

    base.merge(AppConfig::default());

    assert_eq!(base.server.port, 8080);
    assert_eq!(base.store.limit, 100);
}

#[test]
fn test_validate_config_invalid_version() {
    let config = AppConfig {
        version: "2.0".to_string(),
        ..AppConfig::default()
    };
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("Unsupported config version"));
}

#[test]
fn test_validate_config_zero_limit() {
    let mut config = AppConfig::default();
    config.store.limit = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_config_empty_collection() {
    let mut config = AppConfig::default();
    config.store.collection_id = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_config_zero_chart_size() {
    let mut config = AppConfig::default();
    config.chart.height = 0;
    assert!(config.validate().is_err());
}
