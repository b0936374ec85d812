//! Traversal engine.
//!
//! Classifies a value and dispatches to the matching rule: records go through
//! the field selector, lists and maps recurse element-wise, primitives pass
//! through to the encoder. The first error aborts the whole call; nothing
//! partial is returned.

use ctxjson_common::{Component, Logger};
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::config::MarshalerConfig;
use crate::encoder;
use crate::error::{MarshalError, Result};
use crate::handler::Replacement;
use crate::record::ContextualRecord;
use crate::selector::{Emitted, FieldSelector, Selection};
use crate::value::{ContextualValue, ValueView};

/// Marshal `value` under `context` into JSON bytes.
///
/// `context_tag` and `handler_tag` name the metadata keys inspected for
/// context restrictions and handler bindings.
pub fn marshal_with_context<T>(
    value: &T,
    context: &str,
    context_tag: &str,
    handler_tag: &str,
) -> Result<Vec<u8>>
where
    T: ContextualValue + ?Sized,
{
    let config = MarshalerConfig::new()
        .with_context_tag(context_tag)
        .with_handler_tag(handler_tag);
    marshal_with_config(value, context, &config)
}

/// Same traversal as [`marshal_with_context`], stopping at the primitive tree.
pub fn to_value_with_context<T>(
    value: &T,
    context: &str,
    context_tag: &str,
    handler_tag: &str,
) -> Result<JsonValue>
where
    T: ContextualValue + ?Sized,
{
    let config = MarshalerConfig::new()
        .with_context_tag(context_tag)
        .with_handler_tag(handler_tag);
    to_value_with_config(value, context, &config)
}

pub fn to_value_with_config<T>(value: &T, context: &str, config: &MarshalerConfig) -> Result<JsonValue>
where
    T: ContextualValue + ?Sized,
{
    Traversal::new(context, config).value(value.view(), 0)
}

pub fn marshal_with_config<T>(value: &T, context: &str, config: &MarshalerConfig) -> Result<Vec<u8>>
where
    T: ContextualValue + ?Sized,
{
    let traversal = Traversal::new(context, config);
    let tree = traversal.value(value.view(), 0)?;
    let bytes = encoder::encode(&tree)?;
    traversal
        .logger
        .with_component(Component::Encoder)
        .debug_args(format_args!("encoded {} bytes", bytes.len()));
    Ok(bytes)
}

struct Traversal<'c> {
    config: &'c MarshalerConfig,
    selector: FieldSelector<'c>,
    logger: Logger,
}

impl<'c> Traversal<'c> {
    fn new(context: &'c str, config: &'c MarshalerConfig) -> Self {
        let logger = Logger::new_root(Component::Marshaler, context);
        let selector_logger = logger.with_component(Component::Selector);
        let resolver_logger = selector_logger.with_component(Component::Resolver);
        Self {
            config,
            selector: FieldSelector {
                context,
                config,
                logger: selector_logger,
                resolver_logger,
            },
            logger,
        }
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.config.max_depth {
            self.logger.warn_args(format_args!(
                "traversal exceeded {} levels",
                self.config.max_depth
            ));
            return Err(MarshalError::DepthLimitExceeded {
                limit: self.config.max_depth,
            });
        }
        Ok(())
    }

    fn value(&self, view: ValueView<'_>, depth: usize) -> Result<JsonValue> {
        self.check_depth(depth)?;
        match view {
            ValueView::Null => Ok(JsonValue::Null),
            ValueView::Primitive(primitive) => encoder::primitive(primitive),
            ValueView::List(items) => {
                let mut elems = Vec::with_capacity(items.size_hint().0);
                for item in items {
                    elems.push(self.value(item.view(), depth + 1)?);
                }
                Ok(JsonValue::Array(elems))
            }
            ValueView::Map(entries) => {
                let mut map = JsonMap::new();
                for (key, item) in entries {
                    let marshaled = self.value(item.view(), depth + 1)?;
                    map.insert(key, marshaled);
                }
                Ok(JsonValue::Object(map))
            }
            ValueView::Struct(record) => self.record(record, depth),
        }
    }

    fn record(&self, record: &dyn ContextualRecord, depth: usize) -> Result<JsonValue> {
        if depth == 0 {
            self.logger
                .debug_args(format_args!("marshaling {}", record.type_name()));
        }
        let mut fields = JsonMap::new();
        let mut chain = vec![record];
        self.collect(record, &mut chain, &mut fields, depth)?;
        Ok(JsonValue::Object(fields))
    }

    /// Emit the fields of `record` into `out`, promoting embedded records in
    /// place. Later keys overwrite earlier ones.
    fn collect<'a>(
        &self,
        record: &'a dyn ContextualRecord,
        chain: &mut Vec<&'a dyn ContextualRecord>,
        out: &mut JsonMap<String, JsonValue>,
        depth: usize,
    ) -> Result<()> {
        for field in record.fields() {
            match self.selector.select(&field, chain)? {
                Selection::Skip => {}
                Selection::Promote(inner) => {
                    self.check_depth(depth + 1)?;
                    chain.push(inner);
                    let promoted = self.collect(inner, chain, out, depth + 1);
                    chain.pop();
                    promoted?;
                }
                Selection::Emit { key, value } => {
                    let marshaled = match value {
                        Emitted::Field(field_value) => self.value(field_value.view(), depth + 1)?,
                        Emitted::Handler(Replacement::Json(replacement)) => replacement,
                        Emitted::Handler(Replacement::Scalar(scalar)) => {
                            encoder::primitive(scalar)?
                        }
                    };
                    out.insert(key, marshaled);
                }
            }
        }
        Ok(())
    }
}
