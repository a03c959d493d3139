use super::{CONFIG_KEYS, Config};
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

/// Keys from `CONFIG_KEYS` absent in the YAML document at `path`.
pub fn missing_keys(path: &Path) -> AppResult<Vec<&'static str>> {
    let content = fs::read_to_string(path)?;
    let yaml: Value = serde_yaml::from_str(&content)?;
    let map = yaml.as_mapping().cloned().unwrap_or_default();

    Ok(CONFIG_KEYS
        .iter()
        .copied()
        .filter(|k| !map.contains_key(Value::String(k.to_string())))
        .collect())
}

/// Add missing keys with their defaults, keeping every existing value.
///   Returns:
///   Ok(true)  → config updated
///   Ok(false) → no change needed
pub fn migrate_config_file(path: &Path) -> AppResult<bool> {
    let missing = missing_keys(path)?;
    if missing.is_empty() {
        info("Configuration already up to date.");
        return Ok(false);
    }

    let content = fs::read_to_string(path)?;
    let mut map: Mapping = serde_yaml::from_str::<Value>(&content)?
        .as_mapping()
        .cloned()
        .unwrap_or_default();

    let defaults = serde_yaml::to_value(Config::default())?;
    if let Some(def_map) = defaults.as_mapping() {
        for key in &missing {
            let k = Value::String(key.to_string());
            if let Some(v) = def_map.get(&k) {
                map.insert(k, v.clone());
            }
        }
    }

    fs::write(path, serde_yaml::to_string(&Value::Mapping(map))?)?;
    success(format!("Configuration migrated, added: {}", missing.join(", ")));
    Ok(true)
}
