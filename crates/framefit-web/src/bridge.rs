#![forbid(unsafe_code)]

//! Conversion of the JS options object into controller options.
//!
//! The scalar fields (`id`, `debounceMs`, `mode`) travel as JSON produced by
//! `JSON.stringify` on the JS side. The element handle and the `onResized`
//! function do not serialize and are read separately.

use framefit_core::ResizeConfig;
use serde_json::{Map, Value};

/// Parse the scalar options one field at a time.
///
/// `None` (the caller passed `undefined`/`null`) yields the defaults
/// silently. A field of the wrong type is dropped with a warning and takes
/// its default; the remaining fields are kept. Numeric strings are accepted
/// for `debounceMs`, as `setTimeout` would coerce them.
pub fn config_from_json(json: Option<&str>) -> ResizeConfig {
    let Some(json) = json else {
        return ResizeConfig::default();
    };
    let fields = match serde_json::from_str::<Value>(json) {
        Ok(Value::Object(fields)) => fields,
        Ok(other) => {
            tracing::warn!(value = %other, "resize options are not an object; using defaults");
            return ResizeConfig::default();
        }
        Err(err) => {
            tracing::warn!(error = %err, "invalid resize options; using defaults");
            return ResizeConfig::default();
        }
    };
    ResizeConfig {
        id: string_field(&fields, "id"),
        debounce_ms: debounce_field(&fields),
        mode: string_field(&fields, "mode"),
    }
}

fn field<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    fields.get(key).filter(|value| !value.is_null())
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match field(fields, key)? {
        Value::String(value) => Some(value.clone()),
        other => {
            tracing::warn!(field = key, value = %other, "option is not a string; ignored");
            None
        }
    }
}

fn debounce_field(fields: &Map<String, Value>) -> Option<f64> {
    let rejected = match field(fields, "debounceMs")? {
        Value::Number(ms) => return ms.as_f64(),
        Value::String(ms) => match ms.trim().parse::<f64>() {
            Ok(ms) => return Some(ms),
            Err(_) => Value::String(ms.clone()),
        },
        other => other.clone(),
    };
    tracing::warn!(field = "debounceMs", value = %rejected, "option is not a number; ignored");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use framefit_core::{Duration, SizingMode};
    use pretty_assertions::assert_eq;

    #[test]
    fn absent_options_take_defaults() {
        assert_eq!(config_from_json(None), ResizeConfig::default());
    }

    #[test]
    fn stringified_options_are_read() {
        let json = serde_json::json!({
            "id": "player",
            "debounceMs": 50,
            "mode": "landscape",
            // `element` stringifies to an empty object; it is ignored here.
            "element": {},
        })
        .to_string();

        let config = config_from_json(Some(&json));

        assert_eq!(config.id.as_deref(), Some("player"));
        assert_eq!(config.debounce(), Duration::from_millis(50));
        assert_eq!(config.mode(), SizingMode::FixedAspect);
    }

    #[test]
    fn wrongly_typed_id_is_dropped() {
        let config = config_from_json(Some(r#"{"id":42}"#));
        assert_eq!(config, ResizeConfig::default());
    }

    #[test]
    fn bad_debounce_keeps_id_and_mode() {
        let json = r#"{"id":"player","debounceMs":true,"mode":"landscape"}"#;
        let config = config_from_json(Some(json));

        assert_eq!(config.id.as_deref(), Some("player"));
        assert_eq!(config.mode(), SizingMode::FixedAspect);
        assert_eq!(config.debounce(), Duration::from_millis(100));
    }

    #[test]
    fn numeric_string_debounce_is_coerced() {
        let config = config_from_json(Some(r#"{"id":"player","debounceMs":"200"}"#));

        assert_eq!(config.id.as_deref(), Some("player"));
        assert_eq!(config.debounce(), Duration::from_millis(200));

        let config = config_from_json(Some(r#"{"id":"player","debounceMs":"soon"}"#));
        assert_eq!(config.id.as_deref(), Some("player"));
        assert_eq!(config.debounce(), Duration::from_millis(100));
    }

    #[test]
    fn wrongly_typed_mode_keeps_id() {
        let config = config_from_json(Some(r#"{"id":"player","mode":16}"#));

        assert_eq!(config.id.as_deref(), Some("player"));
        assert_eq!(config.mode(), SizingMode::Fullscreen);
    }

    #[test]
    fn non_object_or_malformed_json_takes_defaults() {
        assert_eq!(config_from_json(Some("[1,2]")), ResizeConfig::default());
        assert_eq!(config_from_json(Some("{")), ResizeConfig::default());
    }
}
