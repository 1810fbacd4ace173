use crate::{FlowError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizeConfig {
    /// Rounds of null-check elimination plus dead code elimination.
    pub rounds: usize,
    /// Run a single plain null-check elimination and nothing else.
    pub null_check_only: bool,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            rounds: 5,
            null_check_only: true,
        }
    }
}

impl OptimizeConfig {
    pub fn full() -> Self {
        Self {
            null_check_only: false,
            ..Self::default()
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| FlowError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| FlowError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }
}
