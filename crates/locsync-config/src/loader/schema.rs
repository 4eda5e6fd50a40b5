//! Schema validation helpers for `config.yaml` layers.

use super::ConfigKey;
use crate::ConfigError;
use log::warn;
use serde_json::{Map, Value};

/// Validate a single config layer: a flat mapping of scalar values.
///
/// Unknown keys are tolerated with a warning since the file is often shared
/// with other tooling.
pub(super) fn validate_layer_schema(value: &Value, layer: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer)?;
    for (name, value) in map {
        match ConfigKey::from_name(name) {
            Some(ConfigKey::ServiceNowLimit) => expect_integer_like(value, layer, name)?,
            Some(_) => expect_scalar(value, layer, name)?,
            None => warn!("ignoring unknown config key {name} in {layer}"),
        }
    }
    Ok(())
}

/// Drop unknown keys and coerce scalar values of text keys into strings.
///
/// YAML happily types `INFOBLOX_API_PASSWORD: 123456` as a number; the row
/// limit is left untouched so it can be range-checked later.
pub(super) fn normalize_scalars(value: Value) -> Value {
    let Value::Object(map) = value else {
        return value;
    };
    let normalized: Map<String, Value> = map
        .into_iter()
        .filter_map(|(name, value)| {
            let key = ConfigKey::from_name(&name)?;
            let value = match (key, value) {
                (ConfigKey::ServiceNowLimit, value) => value,
                (_, Value::Number(number)) => Value::String(number.to_string()),
                (_, Value::Bool(flag)) => Value::String(flag.to_string()),
                (_, value) => value,
            };
            Some((name, value))
        })
        .collect();
    Value::Object(normalized)
}

fn expect_object<'a>(
    value: &'a Value,
    layer: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    value.as_object().ok_or_else(|| ConfigError::InvalidField {
        path: layer.to_string(),
        message: "expected a mapping of configuration keys".to_string(),
    })
}

fn expect_scalar(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    match value {
        Value::Null | Value::String(_) | Value::Number(_) | Value::Bool(_) => Ok(()),
        _ => Err(invalid(layer, path, "expected a string")),
    }
}

fn expect_integer_like(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    match value {
        Value::Null | Value::String(_) | Value::Number(_) => Ok(()),
        _ => Err(invalid(layer, path, "must be an integer")),
    }
}

fn invalid(layer: &str, path: &str, message: &str) -> ConfigError {
    ConfigError::InvalidField {
        path: format!("{layer}:{path}"),
        message: message.to_string(),
    }
}
