//! Data manager configuration contracts that can be shared across crates.

use serde::{Deserialize, Serialize};

/// Data manager configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataManagerConfig {
    /// Client name passed to the host when opening the transport
    #[serde(default = "default_client_name")]
    pub client_name: String,

    /// Upper bound on messages drained per `pre_update`.
    ///
    /// Messages beyond the bound stay queued in the transport and are
    /// drained on the next frame.
    #[serde(default = "default_max_messages_per_frame")]
    pub max_messages_per_frame: usize,

    /// Samples per profiler report
    #[serde(default = "default_profiler_window")]
    pub profiler_window: usize,
}

fn default_client_name() -> String {
    "sim-bridge".to_string()
}

fn default_max_messages_per_frame() -> usize {
    1024
}

fn default_profiler_window() -> usize {
    120
}

impl Default for DataManagerConfig {
    fn default() -> Self {
        Self {
            client_name: default_client_name(),
            max_messages_per_frame: default_max_messages_per_frame(),
            profiler_window: default_profiler_window(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let config: DataManagerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DataManagerConfig::default());
        assert_eq!(config.max_messages_per_frame, 1024);
    }
}
