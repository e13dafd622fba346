#![forbid(unsafe_code)]

//! JSON-loaded `ResizeConfig` (requires the `serde` feature).

use std::rc::Rc;

use framefit_core::{
    ConfigError, DEFAULT_DEBOUNCE, Duration, ResizeConfig, ResizeOptions, SizingMode, setup,
};
use framefit_harness::diagnostics::{at_level, capture};
use framefit_harness::{FakeElement, FakeHost, mounted_panel};
use pretty_assertions::assert_eq;
use tracing::Level;

#[test]
fn parses_camel_case_fields() {
    let config =
        ResizeConfig::from_json_str(r#"{"id":"player","debounceMs":250,"mode":"landscape"}"#)
            .unwrap();

    assert_eq!(
        config,
        ResizeConfig {
            id: Some("player".to_owned()),
            debounce_ms: Some(250.0),
            mode: Some("landscape".to_owned()),
        }
    );
    assert_eq!(config.debounce(), Duration::from_millis(250));
    assert_eq!(config.mode(), SizingMode::FixedAspect);
}

#[test]
fn missing_fields_take_defaults() {
    let config = ResizeConfig::from_json_str("{}").unwrap();
    assert_eq!(config, ResizeConfig::default());
    assert_eq!(config.debounce(), DEFAULT_DEBOUNCE);
    assert_eq!(config.mode(), SizingMode::Fullscreen);
}

#[test]
fn fractional_and_negative_debounce() {
    let fractional = ResizeConfig::from_json_str(r#"{"debounceMs":12.5}"#).unwrap();
    assert_eq!(fractional.debounce(), Duration::from_micros(12_500));

    let negative = ResizeConfig::from_json_str(r#"{"debounceMs":-40}"#).unwrap();
    assert_eq!(negative.debounce(), Duration::ZERO);
}

#[test]
fn malformed_json_is_a_parse_error() {
    let err = ResizeConfig::from_json_str(r#"{"debounceMs":"fast"}"#).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));

    assert!(ResizeConfig::from_json_str("not json").is_err());
}

#[test]
fn unknown_mode_warns_and_sizes_fullscreen() {
    let config = ResizeConfig::from_json_str(r#"{"id":"player","mode":"portrait"}"#).unwrap();
    let host = FakeHost::shared(1920.0, 600.0);
    let (panel, _container) = mounted_panel(&host, "player");

    let (_teardown, events) =
        capture(|| setup(Rc::clone(&host), config.into_options::<FakeElement>()));

    let warnings = at_level(&events, Level::WARN);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].field("mode"), Some("portrait"));
    assert_eq!(panel.height().as_deref(), Some("600px"));
}

#[test]
fn config_drives_a_controller() {
    let config = ResizeConfig::from_json_str(
        r#"{"id":"player","debounceMs":30,"mode":"landscape"}"#,
    )
    .unwrap();
    let host = FakeHost::shared(1280.0, 720.0);
    let (panel, _container) = mounted_panel(&host, "player");

    let options: ResizeOptions<FakeElement> = config.into_options();
    let _teardown = setup(Rc::clone(&host), options);
    assert_eq!(panel.height().as_deref(), Some("720px"));

    host.resize_viewport(1920.0, 600.0);
    host.advance(Duration::from_millis(30));
    assert_eq!(panel.height().as_deref(), Some("600px"));
}

#[test]
fn round_trips_through_serde_json() {
    let config = ResizeConfig {
        id: Some("player".to_owned()),
        debounce_ms: Some(50.0),
        mode: Some("fullscreen".to_owned()),
    };
    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains("\"debounceMs\""));
    assert_eq!(ResizeConfig::from_json_str(&json).unwrap(), config);
}
