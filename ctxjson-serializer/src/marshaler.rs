use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::config::MarshalerConfig;
use crate::encoder;
use crate::engine;
use crate::error::Result;
use crate::value::ContextualValue;

/// A value paired with the context it should be rendered under.
///
/// `Marshaler` also implements [`Serialize`], so it can be dropped into any
/// serde document and will render its value with the configured context.
pub struct Marshaler<'a, T: ?Sized> {
    data: &'a T,
    context: String,
    config: MarshalerConfig,
}

impl<'a, T> Marshaler<'a, T>
where
    T: ContextualValue + ?Sized,
{
    pub fn new(data: &'a T, context: impl Into<String>) -> Self {
        Self {
            data,
            context: context.into(),
            config: MarshalerConfig::default(),
        }
    }

    /// Metadata key for context restrictions. Defaults to `marshalcontext`.
    pub fn with_context_tag(mut self, tag: impl Into<String>) -> Self {
        self.config.context_tag = tag.into();
        self
    }

    /// Metadata key for handler bindings. Defaults to `marshalhandler`.
    pub fn with_handler_tag(mut self, tag: impl Into<String>) -> Self {
        self.config.handler_tag = tag.into();
        self
    }

    /// Metadata key for wire names. Defaults to `json`.
    pub fn with_name_tag(mut self, tag: impl Into<String>) -> Self {
        self.config.name_tag = tag.into();
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    pub fn with_config(mut self, config: MarshalerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn config(&self) -> &MarshalerConfig {
        &self.config
    }

    /// Render the primitive tree without encoding it.
    pub fn to_value(&self) -> Result<JsonValue> {
        engine::to_value_with_config(self.data, &self.context, &self.config)
    }

    /// Render and encode to JSON bytes.
    pub fn marshal(&self) -> Result<Vec<u8>> {
        engine::marshal_with_config(self.data, &self.context, &self.config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        encoder::encode_string(&self.to_value()?)
    }

    pub fn to_json_string_pretty(&self) -> Result<String> {
        encoder::encode_string_pretty(&self.to_value()?)
    }
}

impl<T> Serialize for Marshaler<'_, T>
where
    T: ContextualValue + ?Sized,
{
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_value()
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}
