use serde::{Deserialize, Serialize};
use web_time::Duration;

/// Engine-wide knobs. Every field has a default so partial JSON works.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Caret blink half-period for text fields, in milliseconds.
    pub caret_blink_ms: u64,
    /// Focus the first focusable component once a root projection renders.
    pub focus_on_render: bool,
    /// Prefix of the label shown for an optional attribute not yet created.
    pub placeholder_prefix: String,
    /// Text shown by collection fields without elements.
    pub empty_list_label: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            caret_blink_ms: 500,
            focus_on_render: false,
            placeholder_prefix: "+ ".into(),
            empty_list_label: "empty".into(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn caret_blink(&self) -> Duration {
        Duration::from_millis(self.caret_blink_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{ "caret_blink_ms": 300 }"#).unwrap();
        assert_eq!(config.caret_blink(), Duration::from_millis(300));
        assert_eq!(config.placeholder_prefix, "+ ");
        assert!(!config.focus_on_render);
    }

    #[test]
    fn test_bad_config_is_an_error() {
        assert!(EngineConfig::from_json(r#"{ "caret_blink_ms": "fast" }"#).is_err());
    }
}
