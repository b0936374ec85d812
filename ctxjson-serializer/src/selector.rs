//! Field selection: decides, per declared field, whether it is emitted, under
//! which key, and with which value.

use ctxjson_common::Logger;
use serde_json::Value as JsonValue;

use crate::config::MarshalerConfig;
use crate::error::{MarshalError, Result};
use crate::handler::{self, Replacement};
use crate::record::{ContextualRecord, Field};
use crate::value::{ContextualValue, ValueView};

/// Output key that always excludes a field.
pub const SKIP_KEY: &str = "-";

/// Outcome of selecting one field.
pub enum Selection<'a> {
    /// Not emitted.
    Skip,
    /// Embedded record whose fields join the parent's key space.
    Promote(&'a dyn ContextualRecord),
    /// Emitted under `key`.
    Emit { key: String, value: Emitted<'a> },
}

/// Value of an emitted field.
pub enum Emitted<'a> {
    /// The original field value, still to be marshaled.
    Field(&'a dyn ContextualValue),
    /// Replacement produced by a handler.
    Handler(Replacement),
}

/// Wire name part of a name tag: everything before the first comma.
pub fn wire_name(tag: &str) -> &str {
    tag.split(',').next().unwrap_or("")
}

/// Split a handler tag `method` or `method,rename`.
pub fn parse_handler_tag(tag: &str) -> (&str, &str) {
    let mut parts = tag.split(',');
    let method = parts.next().unwrap_or("");
    let rename = parts.next().unwrap_or("");
    (method, rename)
}

pub(crate) struct FieldSelector<'c> {
    pub context: &'c str,
    pub config: &'c MarshalerConfig,
    pub logger: Logger,
    pub resolver_logger: Logger,
}

impl FieldSelector<'_> {
    /// Select `field`, declared by the last record of `chain`.
    pub fn select<'a>(
        &self,
        field: &Field<'a>,
        chain: &[&'a dyn ContextualRecord],
    ) -> Result<Selection<'a>> {
        let descriptor = field.descriptor;
        let tags = descriptor.tags;
        let value: &'a dyn ContextualValue = field.value;
        let owner = chain.last().map_or("", |record| record.type_name());
        let name = wire_name(tags.get(&self.config.name_tag));
        let logger = self
            .logger
            .with_record_path(format!("{owner}.{}", descriptor.ident));

        if descriptor.flatten && name.is_empty() {
            match value.view() {
                ValueView::Struct(inner) => return Ok(Selection::Promote(inner)),
                ValueView::Null => {
                    logger.debug_args(format_args!("empty embedded record"));
                    return Ok(Selection::Skip);
                }
                // Not a record: emitted like any named field
                _ => {}
            }
        }

        let restriction = tags.get(&self.config.context_tag);
        if !restriction.is_empty() && restriction != self.context {
            logger.debug_args(format_args!(
                "excluded: restricted to context `{restriction}`"
            ));
            return Ok(Selection::Skip);
        }

        let mut key = if name.is_empty() {
            descriptor.ident.to_lowercase()
        } else {
            name.to_string()
        };

        let handler_tag = tags.get(&self.config.handler_tag);
        if handler_tag.is_empty() {
            return Ok(emit(key, Emitted::Field(value)));
        }

        let (method_name, rename) = parse_handler_tag(handler_tag);
        if !rename.is_empty() {
            key = rename.to_string();
        }

        let resolver_logger = self
            .resolver_logger
            .with_record_path(format!("{owner}.{}", descriptor.ident));
        let Some(resolved) = handler::resolve(chain, method_name, &resolver_logger) else {
            logger.debug_args(format_args!(
                "no handler `{method_name}`, keeping field value"
            ));
            return Ok(emit(key, Emitted::Field(value)));
        };

        let invalid_signature = || {
            logger.warn_args(format_args!(
                "`{}::{method_name}` is not a valid handler",
                resolved.owner
            ));
            MarshalError::InvalidHandlerSignature {
                owner: resolved.owner,
                field: descriptor.ident,
                method: method_name.to_string(),
            }
        };
        if !handler::is_valid(&resolved.method) {
            return Err(invalid_signature());
        }
        let output = resolved
            .method
            .call(self.context)
            .ok_or_else(invalid_signature)?;

        let (replacement, key_override) = output.into_parts();
        match key_override {
            None => {}
            Some(JsonValue::String(override_key)) => key = override_key,
            Some(found) => {
                logger.warn_args(format_args!(
                    "`{}::{method_name}` returned a non-string key {found}",
                    resolved.owner
                ));
                return Err(MarshalError::InvalidKeyOverride {
                    owner: resolved.owner,
                    field: descriptor.ident,
                    method: method_name.to_string(),
                    found,
                });
            }
        }

        Ok(emit(key, Emitted::Handler(replacement)))
    }
}

fn emit(key: String, value: Emitted<'_>) -> Selection<'_> {
    if key == SKIP_KEY {
        Selection::Skip
    } else {
        Selection::Emit { key, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_name_drops_options() {
        assert_eq!(wire_name("name"), "name");
        assert_eq!(wire_name("name,omitempty"), "name");
        assert_eq!(wire_name(",omitempty"), "");
        assert_eq!(wire_name(""), "");
        assert_eq!(wire_name("-"), "-");
    }

    #[test]
    fn test_parse_handler_tag() {
        assert_eq!(parse_handler_tag("FullName"), ("FullName", ""));
        assert_eq!(
            parse_handler_tag("full_name,display_name"),
            ("full_name", "display_name")
        );
        assert_eq!(parse_handler_tag("a,b,c"), ("a", "b"));
        assert_eq!(parse_handler_tag(",renamed"), ("", "renamed"));
    }
}
