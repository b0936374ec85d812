//! Marshaler configuration.
//!
//! The metadata keys are chosen by the caller's type declarations, so they are
//! plain strings rather than fixed literals.

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONTEXT_TAG: &str = "marshalcontext";
pub const DEFAULT_HANDLER_TAG: &str = "marshalhandler";
pub const DEFAULT_NAME_TAG: &str = "json";
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Options consumed once per marshal call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarshalerConfig {
    /// Metadata key holding a field's context restriction
    pub context_tag: String,
    /// Metadata key holding a field's handler binding (`method` or `method,rename`)
    pub handler_tag: String,
    /// Metadata key holding a field's wire name
    pub name_tag: String,
    /// Deepest nesting the traversal accepts before failing
    pub max_depth: usize,
}

impl Default for MarshalerConfig {
    fn default() -> Self {
        Self {
            context_tag: DEFAULT_CONTEXT_TAG.to_string(),
            handler_tag: DEFAULT_HANDLER_TAG.to_string(),
            name_tag: DEFAULT_NAME_TAG.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl MarshalerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_context_tag(mut self, tag: impl Into<String>) -> Self {
        self.context_tag = tag.into();
        self
    }

    pub fn with_handler_tag(mut self, tag: impl Into<String>) -> Self {
        self.handler_tag = tag.into();
        self
    }

    pub fn with_name_tag(mut self, tag: impl Into<String>) -> Self {
        self.name_tag = tag.into();
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MarshalerConfig::new();
        assert_eq!(config.context_tag, "marshalcontext");
        assert_eq!(config.handler_tag, "marshalhandler");
        assert_eq!(config.name_tag, "json");
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_partial_config_takes_defaults() {
        let config: MarshalerConfig =
            serde_json::from_str(r#"{"context_tag": "visibility", "max_depth": 8}"#)
                .expect("config should parse");
        assert_eq!(config.context_tag, "visibility");
        assert_eq!(config.handler_tag, DEFAULT_HANDLER_TAG);
        assert_eq!(config.name_tag, DEFAULT_NAME_TAG);
        assert_eq!(config.max_depth, 8);
    }
}
