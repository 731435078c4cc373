use serde::Deserialize;

/// Logging settings read once at startup.
#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    /// Minimum level name; unknown names mean INFO
    #[serde(default = "default_level")]
    pub level: String,

    /// Provision the log table when persistence is installed
    #[serde(default)]
    pub init_table: bool,

    /// Entries buffered for the persistence worker before new ones are dropped
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_level() -> String {
    "INFO".to_string()
}

fn default_queue_capacity() -> usize {
    1024
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            init_table: false,
            queue_capacity: default_queue_capacity(),
        }
    }
}
