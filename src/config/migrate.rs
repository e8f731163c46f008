//! Upgrades of the YAML config file written by older releases.
//!
//! Files are rewritten only when a key is actually missing; values already
//! present are never touched.

use super::Config;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::success;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

/// Every key a current config file carries, with its default value.
fn expected_fields() -> AppResult<Mapping> {
    let value = serde_yaml::to_value(Config::default()).map_err(|e| AppError::Config(e.to_string()))?;
    match value {
        Value::Mapping(m) => Ok(m),
        _ => Err(AppError::Config("default config is not a mapping".into())),
    }
}

fn read_mapping(path: &Path) -> AppResult<Mapping> {
    let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
    match serde_yaml::from_str::<Value>(&content) {
        Ok(Value::Mapping(m)) => Ok(m),
        Ok(Value::Null) => Ok(Mapping::new()),
        Ok(_) => Err(AppError::Config(format!("{} is not a YAML mapping", path.display()))),
        Err(e) => Err(AppError::Config(e.to_string())),
    }
}

/// Names of the keys absent from the file at `path`.
pub fn missing_fields(path: &Path) -> AppResult<Vec<String>> {
    let current = read_mapping(path)?;
    Ok(expected_fields()?
        .keys()
        .filter(|k| !current.contains_key(*k))
        .filter_map(|k| k.as_str().map(str::to_string))
        .collect())
}

/// Add every missing key with its default value. Returns the keys added.
pub fn fill_missing_fields(path: &Path) -> AppResult<Vec<String>> {
    let mut current = read_mapping(path)?;
    let mut added = Vec::new();

    for (key, value) in expected_fields()? {
        if !current.contains_key(&key) {
            if let Some(name) = key.as_str() {
                added.push(name.to_string());
            }
            current.insert(key, value);
        }
    }

    if !added.is_empty() {
        let serialized = serde_yaml::to_string(&Value::Mapping(current))
            .map_err(|_| AppError::ConfigSave)?;
        fs::write(path, serialized).map_err(|_| AppError::ConfigSave)?;
        success(format!(
            "Config migration: added {} to {}",
            added.join(", "),
            path.display()
        ));
    }

    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_conf(name: &str, content: &str) -> std::path::PathBuf {
        let path = env::temp_dir().join(format!("{name}_rjobplan.conf"));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn old_file_gets_the_new_keys() {
        let path = temp_conf("cfg_migrate_old", "database: /tmp/old.sqlite\nseparator_char: '='\n");

        let missing = missing_fields(&path).unwrap();
        assert!(missing.contains(&"default_shift_start".to_string()));
        assert!(!missing.contains(&"database".to_string()));

        let added = fill_missing_fields(&path).unwrap();
        assert_eq!(added, missing);

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.database, "/tmp/old.sqlite");
        assert_eq!(cfg.separator_char, "=");
        assert!(missing_fields(&path).unwrap().is_empty());

        fs::remove_file(&path).ok();
    }

    #[test]
    fn complete_file_is_left_alone() {
        let yaml = serde_yaml::to_string(&Config::default()).unwrap();
        let path = temp_conf("cfg_migrate_complete", &yaml);
        assert!(fill_missing_fields(&path).unwrap().is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), yaml);
        fs::remove_file(&path).ok();
    }
}
