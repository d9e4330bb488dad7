use serde::{Deserialize, Serialize};

/// Configuration from `.mindflow/config.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// trace | debug | info | warn | error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Number of trailing id characters shown in text output
    #[serde(default = "default_id_chars")]
    pub id_chars: usize,
    /// Show completed tasks in listings
    #[serde(default = "default_true")]
    pub show_completed: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            id_chars: default_id_chars(),
            show_completed: true,
        }
    }
}

/// Default: see CONFIG_TEMPLATE in cli/handlers/init.rs
fn default_log_level() -> String {
    "info".to_string()
}

/// Default: see CONFIG_TEMPLATE in cli/handlers/init.rs
fn default_id_chars() -> usize {
    6
}

fn default_true() -> bool {
    true
}
