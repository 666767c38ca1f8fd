use std::{collections::HashMap, fs, path::Path};

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// column config
    #[serde(default)]
    pub columns: ColumnsConfig,
}

/// External counter/metric column configuration. The registry turns these
/// into the counter-derived descriptor suffix, in order: defaults, then
/// entity-specific, then shared.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColumnsConfig {
    /// counters shown on every entity table
    #[serde(default)]
    pub default_counters: Vec<CounterColumnConfig>,
    /// entity name (e.g. "vertex") -> extra counters for that entity
    #[serde(default)]
    pub entity: HashMap<String, Vec<CounterColumnConfig>>,
    /// columns shared across tables, appended last
    #[serde(default)]
    pub shared_columns: Vec<CounterColumnConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CounterColumnConfig {
    /// counter name within its group
    pub counter_name: String,
    /// counter group name
    pub group_name: String,
    /// header label; falls back to the counter name when absent
    #[serde(default)]
    pub header: Option<String>,
}

impl Config {
    pub fn create<T: AsRef<Path>>(path: T) -> Self {
        let data = fs::read_to_string(path.as_ref()).expect(&format!("failed to load config file {:?}", path.as_ref()));

        Self::load_from_str(data.as_str())
    }

    pub fn load_from_str(toml_str: &str) -> Self {
        let config = toml::from_str::<Config>(toml_str).expect("failed to parse the toml str");
        config
    }
}
