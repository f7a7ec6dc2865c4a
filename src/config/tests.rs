use super::validation::validate_config;
use super::*;
use rust_decimal_macros::dec;
use serial_test::serial;
use std::fs;
use tempfile::tempdir;

fn create_test_config(latitude: f64, longitude: f64) -> Config {
    Config {
        latitude: Some(latitude),
        longitude: Some(longitude),
        timezone: Some("America/Los_Angeles".to_string()),
        minimum_sunlight: Some(SunlightLevel::CivilTwilight),
        max_iterations: None,
    }
}

/// Run `f` with `XDG_CONFIG_HOME` pointing at `dir`, restoring the original afterwards.
fn with_config_home<T>(dir: &std::path::Path, f: impl FnOnce() -> T) -> T {
    let original = std::env::var("XDG_CONFIG_HOME").ok();
    unsafe {
        std::env::set_var("XDG_CONFIG_HOME", dir);
    }

    let result = f();

    unsafe {
        match original {
            Some(val) => std::env::set_var("XDG_CONFIG_HOME", val),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
    }
    result
}

/// Test that a first load writes a default file and asks for coordinates
#[test]
#[serial]
fn test_config_load_default_creation() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("daybreak").join("daybreak.toml");

    let result = with_config_home(temp_dir.path(), Config::load);

    let error = result.expect_err("default config has no coordinates");
    assert!(format!("{error:#}").contains("latitude and longitude"));
    assert!(config_path.exists());

    // The default file parses but still lacks coordinates
    let content = fs::read_to_string(&config_path).unwrap();
    let parsed: Config = toml::from_str(&content).unwrap();
    assert_eq!(parsed.latitude, None);
    assert_eq!(parsed.longitude, None);
    assert_eq!(parsed.minimum_sunlight, Some(SunlightLevel::CivilTwilight));
    assert_eq!(parsed.max_iterations, Some(DEFAULT_MAX_ITERATIONS));
}

/// Test that an existing file is loaded through the XDG path
#[test]
#[serial]
fn test_config_load_existing_file() {
    let temp_dir = tempdir().unwrap();
    let config_dir = temp_dir.path().join("daybreak");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("daybreak.toml"),
        "latitude = 52.52\nlongitude = 13.405\ntimezone = \"Europe/Berlin\"\n",
    )
    .unwrap();

    let config = with_config_home(temp_dir.path(), Config::load).unwrap();

    assert_eq!(config.latitude, Some(52.52));
    assert_eq!(config.timezone().unwrap(), chrono_tz::Europe::Berlin);
    assert_eq!(config.minimum_sunlight(), SunlightLevel::CivilTwilight);
    assert_eq!(config.max_iterations(), DEFAULT_MAX_ITERATIONS);
}

/// Test loading every field from an explicit path
#[test]
fn test_config_load_from_path_all_fields() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("daybreak.toml");
    fs::write(
        &path,
        r#"
latitude = 78.92
longitude = 11.93
timezone = "Europe/Berlin"
minimum_sunlight = "nautical-twilight"
max_iterations = 250
"#,
    )
    .unwrap();

    let config = Config::load_from_path(&path).unwrap();

    assert_eq!(config.minimum_sunlight(), SunlightLevel::NauticalTwilight);
    assert_eq!(config.max_iterations(), 250);
    assert_eq!(config.calculator().math().max_iterations(), 250);

    let location = config.location().unwrap();
    assert_eq!(location.latitude(), dec!(78.92));
    assert_eq!(location.longitude(), dec!(11.93));
}

/// Test that a missing explicit path is an error rather than a new file
#[test]
fn test_config_load_from_missing_path() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("missing.toml");

    assert!(Config::load_from_path(&path).is_err());
    assert!(!path.exists());
}

/// Test that malformed TOML and unknown keys are rejected
#[test]
fn test_config_parse_errors() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("daybreak.toml");

    fs::write(&path, "latitude = \n").unwrap();
    assert!(Config::load_from_path(&path).is_err());

    fs::write(&path, "latitude = 1.0\nlongitude = 2.0\nbackend = \"auto\"\n").unwrap();
    assert!(Config::load_from_path(&path).is_err());

    fs::write(
        &path,
        "latitude = 1.0\nlongitude = 2.0\nminimum_sunlight = \"dusk\"\n",
    )
    .unwrap();
    assert!(Config::load_from_path(&path).is_err());
}

#[test]
fn test_config_validation_basic() {
    assert!(validate_config(&create_test_config(37.35, -121.95)).is_ok());
    assert!(validate_config(&create_test_config(90.0, 180.0)).is_ok());
    assert!(validate_config(&create_test_config(-90.0, -180.0)).is_ok());
}

#[test]
fn test_config_validation_coordinates() {
    let error = validate_config(&create_test_config(90.5, 0.0)).unwrap_err();
    assert!(error.to_string().contains("latitude"));

    let error = validate_config(&create_test_config(0.0, -180.5)).unwrap_err();
    assert!(error.to_string().contains("longitude"));

    let mut config = create_test_config(0.0, 0.0);
    config.latitude = None;
    assert!(validate_config(&config).is_err());
}

#[test]
fn test_config_validation_max_iterations() {
    let mut config = create_test_config(37.35, -121.95);

    config.max_iterations = Some(MINIMUM_MAX_ITERATIONS);
    assert!(validate_config(&config).is_ok());

    config.max_iterations = Some(MAXIMUM_MAX_ITERATIONS);
    assert!(validate_config(&config).is_ok());

    config.max_iterations = Some(MINIMUM_MAX_ITERATIONS - 1);
    let error = validate_config(&config).unwrap_err();
    assert!(error.to_string().contains("max_iterations"));

    config.max_iterations = Some(MAXIMUM_MAX_ITERATIONS + 1);
    assert!(validate_config(&config).is_err());
}

#[test]
fn test_config_validation_timezone() {
    let mut config = create_test_config(37.35, -121.95);
    config.timezone = Some("Atlantis/Capital".to_string());
    assert!(validate_config(&config).is_err());

    config.timezone = None;
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_config_defaults() {
    let config = Config::default();
    assert_eq!(config.minimum_sunlight(), SunlightLevel::CivilTwilight);
    assert_eq!(config.max_iterations(), DEFAULT_MAX_ITERATIONS);
    assert!(config.location().is_err());
}

#[test]
fn test_default_config_content_is_aligned() {
    let content = builder::default_config_content();
    let comment_columns: Vec<usize> = content
        .lines()
        .filter(|line| line.contains(" = "))
        .filter_map(|line| line.rfind(" # "))
        .collect();

    assert!(!comment_columns.is_empty());
    assert!(comment_columns.iter().all(|&col| col == comment_columns[0]));
    assert!(content.contains("#[Location]"));
    assert!(content.contains("# latitude = 37.35"));
}
