//! Override layer for the flat key map.

use serde_json::{Map, Value};

/// Insert every override into the file layer; `null` overrides keep the file value.
pub(super) fn apply_overrides(base: &mut Map<String, Value>, overrides: &Map<String, Value>) {
    for (key, value) in overrides {
        if !value.is_null() {
            base.insert(key.clone(), value.clone());
        }
    }
}
