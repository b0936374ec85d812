//! Handler resolution and invocation.
//!
//! A handler is a per-field transform bound into a record's method table. It
//! receives the active context and yields a [`HandlerOutput`]: the replacement
//! value plus an optional output-key override.

use ctxjson_common::Logger;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::record::ContextualRecord;
use crate::value::Primitive;

/// Replacement value produced by a handler.
#[derive(Clone, Debug, PartialEq)]
pub enum Replacement {
    /// A finished JSON tree, emitted as-is.
    Json(JsonValue),
    /// A scalar the encoder still has to accept (floats may be non-finite).
    Scalar(Primitive<'static>),
}

macro_rules! impl_replacement_from_json {
    ($($ty:ty),* $(,)?) => {
        $(impl From<$ty> for Replacement {
            fn from(value: $ty) -> Self {
                Replacement::Json(value.into())
            }
        })*
    };
}

impl_replacement_from_json!(
    JsonValue,
    JsonMap<String, JsonValue>,
    String,
    bool,
    i8,
    i16,
    i32,
    i64,
    isize,
    u8,
    u16,
    u32,
    u64,
    usize,
);

impl<'a> From<&'a str> for Replacement {
    fn from(value: &'a str) -> Self {
        Replacement::Json(value.into())
    }
}

impl From<f32> for Replacement {
    fn from(value: f32) -> Self {
        Replacement::Scalar(Primitive::Float32(value))
    }
}

impl From<f64> for Replacement {
    fn from(value: f64) -> Self {
        Replacement::Scalar(Primitive::Float(value))
    }
}

/// Result of a handler call.
#[derive(Clone, Debug, PartialEq)]
pub struct HandlerOutput {
    value: Replacement,
    key: Option<JsonValue>,
}

impl HandlerOutput {
    /// A replacement value that keeps the field's key.
    pub fn new(value: impl Into<Replacement>) -> Self {
        Self {
            value: value.into(),
            key: None,
        }
    }

    /// Override the output key as well. Anything but a JSON string is rejected
    /// when the field is marshaled.
    pub fn with_key(mut self, key: impl Into<JsonValue>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn value(&self) -> &Replacement {
        &self.value
    }

    pub fn key(&self) -> Option<&JsonValue> {
        self.key.as_ref()
    }

    pub fn into_parts(self) -> (Replacement, Option<JsonValue>) {
        (self.value, self.key)
    }
}

macro_rules! impl_handler_output_from {
    ($($ty:ty),* $(,)?) => {
        $(impl From<$ty> for HandlerOutput {
            fn from(value: $ty) -> Self {
                HandlerOutput::new(value)
            }
        })*
    };
}

impl_handler_output_from!(
    Replacement,
    JsonValue,
    JsonMap<String, JsonValue>,
    String,
    bool,
    i8,
    i16,
    i32,
    i64,
    isize,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
);

impl<'a> From<&'a str> for HandlerOutput {
    fn from(value: &'a str) -> Self {
        HandlerOutput::new(value)
    }
}

impl<V, K> From<(V, K)> for HandlerOutput
where
    V: Into<Replacement>,
    K: Into<JsonValue>,
{
    fn from((value, key): (V, K)) -> Self {
        HandlerOutput::new(value).with_key(key)
    }
}

type ContextualFn<'a> = Box<dyn Fn(&str) -> HandlerOutput + 'a>;
type PlainFn<'a> = Box<dyn Fn() -> HandlerOutput + 'a>;

/// An entry of a record's method table.
pub enum Method<'a> {
    /// Takes the active context: the only shape usable as a handler.
    Contextual(ContextualFn<'a>),
    /// Takes no context. It can be named by handler metadata, but invoking it
    /// as a handler is a configuration error.
    Plain(PlainFn<'a>),
}

impl<'a> Method<'a> {
    pub fn contextual<F>(handler: F) -> Self
    where
        F: Fn(&str) -> HandlerOutput + 'a,
    {
        Method::Contextual(Box::new(handler))
    }

    pub fn plain<F>(method: F) -> Self
    where
        F: Fn() -> HandlerOutput + 'a,
    {
        Method::Plain(Box::new(method))
    }

    /// Invoke as a handler. `None` when the signature does not qualify.
    pub fn call(&self, context: &str) -> Option<HandlerOutput> {
        match self {
            Method::Contextual(handler) => Some(handler(context)),
            Method::Plain(_) => None,
        }
    }
}

impl std::fmt::Debug for Method<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Contextual(_) => f.write_str("Method::Contextual(<fn>)"),
            Method::Plain(_) => f.write_str("Method::Plain(<fn>)"),
        }
    }
}

/// Whether `method` has a valid handler signature.
pub fn is_valid(method: &Method<'_>) -> bool {
    matches!(method, Method::Contextual(_))
}

/// A method found by [`resolve`], with the record type that owns it.
#[derive(Debug)]
pub struct Resolved<'a> {
    pub owner: &'static str,
    pub method: Method<'a>,
}

/// Look `name` up along a chain of records.
///
/// `records` runs from the outermost record to the record that declares the
/// field. The declaring record is searched first, then every record that
/// promotes it, innermost to outermost.
pub fn resolve<'a>(
    records: &[&'a dyn ContextualRecord],
    name: &str,
    logger: &Logger,
) -> Option<Resolved<'a>> {
    for record in records.iter().rev() {
        if let Some(method) = record.method(name) {
            return Some(Resolved {
                owner: record.type_name(),
                method,
            });
        }
        logger.debug_args(format_args!(
            "no method `{name}` on {}",
            record.type_name()
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Field;
    use ctxjson_common::Component;
    use serde_json::json;

    struct Inner;
    struct Outer;

    impl ContextualRecord for Inner {
        fn type_name(&self) -> &'static str {
            "Inner"
        }
        fn fields(&self) -> Vec<Field<'_>> {
            Vec::new()
        }
        fn method(&self, name: &str) -> Option<Method<'_>> {
            match name {
                "shared" => Some(Method::contextual(|_| HandlerOutput::new("inner"))),
                _ => None,
            }
        }
    }

    impl ContextualRecord for Outer {
        fn type_name(&self) -> &'static str {
            "Outer"
        }
        fn fields(&self) -> Vec<Field<'_>> {
            Vec::new()
        }
        fn method(&self, name: &str) -> Option<Method<'_>> {
            match name {
                "shared" => Some(Method::contextual(|_| HandlerOutput::new("outer"))),
                "outer_only" => Some(Method::contextual(|ctx| HandlerOutput::new(ctx))),
                "describe" => Some(Method::plain(|| HandlerOutput::new("plain"))),
                _ => None,
            }
        }
    }

    fn logger() -> Logger {
        Logger::new_root(Component::Marshaler, "test").with_component(Component::Resolver)
    }

    #[test]
    fn test_declaring_record_wins() {
        let (outer, inner) = (Outer, Inner);
        let chain: Vec<&dyn ContextualRecord> = vec![&outer, &inner];

        let resolved = resolve(&chain, "shared", &logger()).expect("method should resolve");
        assert_eq!(resolved.owner, "Inner");
        assert_eq!(resolved.method.call("x"), Some(HandlerOutput::new("inner")));
    }

    #[test]
    fn test_falls_back_to_promoting_record() {
        let (outer, inner) = (Outer, Inner);
        let chain: Vec<&dyn ContextualRecord> = vec![&outer, &inner];

        let resolved = resolve(&chain, "outer_only", &logger()).expect("method should resolve");
        assert_eq!(resolved.owner, "Outer");
        assert_eq!(
            resolved.method.call("admin"),
            Some(HandlerOutput::new("admin"))
        );
        assert!(resolve(&chain, "missing", &logger()).is_none());
    }

    #[test]
    fn test_signature_validation() {
        let outer = Outer;
        let chain: Vec<&dyn ContextualRecord> = vec![&outer];

        let plain = resolve(&chain, "describe", &logger()).expect("method should resolve");
        assert!(!is_valid(&plain.method));
        assert_eq!(plain.method.call("ctx"), None);

        let contextual = resolve(&chain, "shared", &logger()).expect("method should resolve");
        assert!(is_valid(&contextual.method));
    }

    #[test]
    fn test_output_conversions() {
        let from_pair = HandlerOutput::from(("custom value", "custom_name"));
        assert_eq!(from_pair.value(), &Replacement::Json(json!("custom value")));
        assert_eq!(from_pair.key(), Some(&json!("custom_name")));

        let (value, key) = HandlerOutput::from(42u32).into_parts();
        assert_eq!(value, Replacement::Json(json!(42)));
        assert!(key.is_none());

        // floats stay scalars until the encoder has checked them
        assert!(matches!(
            HandlerOutput::from(f64::NAN).value(),
            Replacement::Scalar(Primitive::Float(f)) if f.is_nan()
        ));
        assert_eq!(
            HandlerOutput::from(0.5f32).value(),
            &Replacement::Scalar(Primitive::Float32(0.5))
        );

        let bad_key = HandlerOutput::from((json!([1, 2]), 7));
        assert_eq!(bad_key.key(), Some(&json!(7)));
    }
}
