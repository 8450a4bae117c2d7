use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration from config.toml. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timeline: TimelineConfig,
    #[serde(default)]
    pub ids: IdConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// Terminal columns per day
    #[serde(default = "default_day_width")]
    pub day_width: u16,
    /// Days shown before today
    #[serde(default = "default_days_before")]
    pub days_before: u32,
    /// Days shown after today
    #[serde(default = "default_days_after")]
    pub days_after: u32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        TimelineConfig {
            day_width: default_day_width(),
            days_before: default_days_before(),
            days_after: default_days_after(),
        }
    }
}

fn default_day_width() -> u16 {
    4
}

fn default_days_before() -> u32 {
    2
}

fn default_days_after() -> u32 {
    14
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdConfig {
    /// Prefix for generated task ids (`T` → `T-001`)
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for IdConfig {
    fn default() -> Self {
        IdConfig {
            prefix: default_prefix(),
        }
    }
}

fn default_prefix() -> String {
    "T".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Hex color overrides, applied on top of the active light/dark palette
    #[serde(default)]
    pub colors: HashMap<String, String>,
    #[serde(default)]
    pub show_key_hints: bool,
}
