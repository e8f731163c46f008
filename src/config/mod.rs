use crate::core::scheduler::PlannerSettings;
use crate::errors::{AppError, AppResult};
use crate::models::calendar_day::{DEFAULT_SHIFT_END, DEFAULT_SHIFT_START};
use crate::utils::time::parse_time;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub mod migrate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database")]
    pub database: String,
    /// Shift used for dates with no calendar entry.
    #[serde(default = "default_shift_start")]
    pub default_shift_start: String,
    #[serde(default = "default_shift_end")]
    pub default_shift_end: String,
    /// Rate of the estimate used when the calendar cannot be read.
    #[serde(default = "default_fallback_hours_per_day")]
    pub fallback_hours_per_day: f64,
    #[serde(default = "default_separator_char")]
    pub separator_char: String,
}

fn default_database() -> String {
    Config::database_file().to_string_lossy().to_string()
}
fn default_shift_start() -> String {
    DEFAULT_SHIFT_START.to_string()
}
fn default_shift_end() -> String {
    DEFAULT_SHIFT_END.to_string()
}
fn default_fallback_hours_per_day() -> f64 {
    8.0
}
fn default_separator_char() -> String {
    "-".to_string()
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            default_shift_start: default_shift_start(),
            default_shift_end: default_shift_end(),
            fallback_hours_per_day: default_fallback_hours_per_day(),
            separator_char: default_separator_char(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("rjobplan")
        } else {
            let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".rjobplan")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("rjobplan.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("rjobplan.sqlite")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
        serde_yaml::from_str(&content).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Scheduler knobs; malformed shift times fall back to 08:00–20:00.
    pub fn planner_settings(&self) -> PlannerSettings {
        let defaults = PlannerSettings::default();
        PlannerSettings {
            default_shift_start: parse_time(&self.default_shift_start)
                .unwrap_or(defaults.default_shift_start),
            default_shift_end: parse_time(&self.default_shift_end)
                .unwrap_or(defaults.default_shift_end),
            fallback_hours_per_day: if self.fallback_hours_per_day > 0.0 {
                self.fallback_hours_per_day
            } else {
                defaults.fallback_hours_per_day
            },
        }
    }

    /// Apply a `--db` override; a leading `~/` resolves to the home directory.
    pub fn with_database(mut self, path: &str) -> Self {
        self.database = expand_tilde(path).to_string_lossy().to_string();
        self
    }

    /// Initialize configuration and database files
    pub fn init_all(custom_name: Option<String>, is_test: bool) -> AppResult<PathBuf> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        // DB name: user provided or default
        let db_path = if let Some(name) = custom_name {
            let p = expand_tilde(&name);
            if p.is_absolute() { p } else { dir.join(p) }
        } else {
            Self::database_file()
        };

        let config = Config {
            database: db_path.to_string_lossy().to_string(),
            ..Config::default()
        };

        // Write config file
        if !is_test {
            let yaml = serde_yaml::to_string(&config).map_err(|_| AppError::ConfigSave)?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        // Create empty DB file if not exists
        if !db_path.exists() {
            fs::File::create(&db_path).map_err(|e| {
                AppError::Io(io::Error::new(
                    e.kind(),
                    format!("cannot create {}: {}", db_path.display(), e),
                ))
            })?;
        }

        println!("✅ Database:    {:?}", db_path);

        Ok(db_path)
    }
}
