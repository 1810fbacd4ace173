use crate::output::OutputFormat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    pub use_colors: bool,
    pub format: OutputFormat,
    pub indent: usize,
    /// Print the ids a removal pass deleted after the exit line.
    pub show_removed: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            use_colors: true,
            format: OutputFormat::Text,
            indent: 2,
            show_removed: true,
        }
    }
}

impl EmitterConfig {
    /// Uncoloured text, suitable for files and snapshots.
    pub fn plain() -> Self {
        Self {
            use_colors: false,
            ..Self::default()
        }
    }

    pub fn json() -> Self {
        Self {
            use_colors: false,
            format: OutputFormat::Json,
            ..Self::default()
        }
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EmitterConfig = serde_json::from_str(r#"{"format": "json"}"#).unwrap();
        assert_eq!(config.format, OutputFormat::Json);
        assert!(config.use_colors);
        assert_eq!(config.indent, 2);
    }
}
