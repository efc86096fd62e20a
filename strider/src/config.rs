use serde::{Deserialize, Serialize};

/// Tunables of the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// How many times a value set is asked for more samples before `eval` gives up
    pub sample_rounds: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self { sample_rounds: 16 }
    }
}
