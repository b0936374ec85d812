//! Runtime value model consumed by the traversal engine.
//!
//! Every value the engine can marshal implements [`ContextualValue`] and
//! exposes itself as a [`ValueView`]: a closed union over null, primitives,
//! lists, string-keyed maps and records. Indirections (`Option`, `Box`, `Rc`,
//! `Arc`, references) are looked through, with `None` becoming `Null`.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::fmt::{self, Display};
use std::hash::BuildHasher;
use std::rc::Rc;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::record::ContextualRecord;

/// Shape of a value, without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueCategory {
    Null,
    Primitive,
    List,
    Map,
    Struct,
}

/// Scalar payloads handed unchanged to the encoder.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive<'a> {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Float32(f32),
    Str(Cow<'a, str>),
}

/// Ordered elements of a list value.
pub type ListIter<'a> = Box<dyn Iterator<Item = &'a dyn ContextualValue> + 'a>;

/// Entries of a map value, keys already in their display form.
pub type MapIter<'a> = Box<dyn Iterator<Item = (String, &'a dyn ContextualValue)> + 'a>;

/// Borrowed, classified view of a value.
pub enum ValueView<'a> {
    Null,
    Primitive(Primitive<'a>),
    List(ListIter<'a>),
    Map(MapIter<'a>),
    Struct(&'a dyn ContextualRecord),
}

impl ValueView<'_> {
    pub fn category(&self) -> ValueCategory {
        match self {
            ValueView::Null => ValueCategory::Null,
            ValueView::Primitive(_) => ValueCategory::Primitive,
            ValueView::List(_) => ValueCategory::List,
            ValueView::Map(_) => ValueCategory::Map,
            ValueView::Struct(_) => ValueCategory::Struct,
        }
    }
}

impl fmt::Debug for ValueView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueView::Null => f.write_str("Null"),
            ValueView::Primitive(p) => f.debug_tuple("Primitive").field(p).finish(),
            ValueView::List(_) => f.write_str("List(..)"),
            ValueView::Map(_) => f.write_str("Map(..)"),
            ValueView::Struct(record) => f
                .debug_tuple("Struct")
                .field(&record.type_name())
                .finish(),
        }
    }
}

/// A value the context-aware engine knows how to traverse.
///
/// Records get this through `#[derive(Contextual)]`; the common std types are
/// covered below.
pub trait ContextualValue {
    fn view(&self) -> ValueView<'_>;
}

// ---------------------------------------------------------------------------
// Indirections
// ---------------------------------------------------------------------------

impl<T: ContextualValue + ?Sized> ContextualValue for &T {
    fn view(&self) -> ValueView<'_> {
        (**self).view()
    }
}

impl<T: ContextualValue + ?Sized> ContextualValue for Box<T> {
    fn view(&self) -> ValueView<'_> {
        (**self).view()
    }
}

impl<T: ContextualValue + ?Sized> ContextualValue for Rc<T> {
    fn view(&self) -> ValueView<'_> {
        (**self).view()
    }
}

impl<T: ContextualValue + ?Sized> ContextualValue for Arc<T> {
    fn view(&self) -> ValueView<'_> {
        (**self).view()
    }
}

impl<T: ContextualValue> ContextualValue for Option<T> {
    fn view(&self) -> ValueView<'_> {
        match self {
            Some(value) => value.view(),
            None => ValueView::Null,
        }
    }
}

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

impl ContextualValue for () {
    fn view(&self) -> ValueView<'_> {
        ValueView::Null
    }
}

impl ContextualValue for bool {
    fn view(&self) -> ValueView<'_> {
        ValueView::Primitive(Primitive::Bool(*self))
    }
}

macro_rules! impl_signed {
    ($($ty:ty),*) => {
        $(impl ContextualValue for $ty {
            fn view(&self) -> ValueView<'_> {
                ValueView::Primitive(Primitive::Int(*self as i64))
            }
        })*
    };
}

macro_rules! impl_unsigned {
    ($($ty:ty),*) => {
        $(impl ContextualValue for $ty {
            fn view(&self) -> ValueView<'_> {
                ValueView::Primitive(Primitive::UInt(*self as u64))
            }
        })*
    };
}

impl_signed!(i8, i16, i32, i64, isize);
impl_unsigned!(u8, u16, u32, u64, usize);

impl ContextualValue for f32 {
    fn view(&self) -> ValueView<'_> {
        ValueView::Primitive(Primitive::Float32(*self))
    }
}

impl ContextualValue for f64 {
    fn view(&self) -> ValueView<'_> {
        ValueView::Primitive(Primitive::Float(*self))
    }
}

impl ContextualValue for char {
    fn view(&self) -> ValueView<'_> {
        ValueView::Primitive(Primitive::Str(Cow::Owned(self.to_string())))
    }
}

impl ContextualValue for str {
    fn view(&self) -> ValueView<'_> {
        ValueView::Primitive(Primitive::Str(Cow::Borrowed(self)))
    }
}

impl ContextualValue for String {
    fn view(&self) -> ValueView<'_> {
        ValueView::Primitive(Primitive::Str(Cow::Borrowed(self.as_str())))
    }
}

impl ContextualValue for Cow<'_, str> {
    fn view(&self) -> ValueView<'_> {
        ValueView::Primitive(Primitive::Str(Cow::Borrowed(self.as_ref())))
    }
}

// ---------------------------------------------------------------------------
// Sequences
// ---------------------------------------------------------------------------

fn list_of<'a, T, I>(items: I) -> ValueView<'a>
where
    T: ContextualValue + 'a,
    I: Iterator<Item = &'a T> + 'a,
{
    ValueView::List(Box::new(items.map(|item| item as &dyn ContextualValue)))
}

impl<T: ContextualValue> ContextualValue for [T] {
    fn view(&self) -> ValueView<'_> {
        list_of(self.iter())
    }
}

impl<T: ContextualValue, const N: usize> ContextualValue for [T; N] {
    fn view(&self) -> ValueView<'_> {
        list_of(self.iter())
    }
}

impl<T: ContextualValue> ContextualValue for Vec<T> {
    fn view(&self) -> ValueView<'_> {
        list_of(self.iter())
    }
}

impl<T: ContextualValue> ContextualValue for VecDeque<T> {
    fn view(&self) -> ValueView<'_> {
        list_of(self.iter())
    }
}

impl<T: ContextualValue> ContextualValue for BTreeSet<T> {
    fn view(&self) -> ValueView<'_> {
        list_of(self.iter())
    }
}

// ---------------------------------------------------------------------------
// Maps
// ---------------------------------------------------------------------------

impl<K: Display, V: ContextualValue, S: BuildHasher> ContextualValue for HashMap<K, V, S> {
    fn view(&self) -> ValueView<'_> {
        ValueView::Map(Box::new(
            self.iter()
                .map(|(key, value)| (key.to_string(), value as &dyn ContextualValue)),
        ))
    }
}

impl<K: Display, V: ContextualValue> ContextualValue for BTreeMap<K, V> {
    fn view(&self) -> ValueView<'_> {
        ValueView::Map(Box::new(
            self.iter()
                .map(|(key, value)| (key.to_string(), value as &dyn ContextualValue)),
        ))
    }
}

// ---------------------------------------------------------------------------
// Pre-built JSON
// ---------------------------------------------------------------------------

impl ContextualValue for JsonValue {
    fn view(&self) -> ValueView<'_> {
        match self {
            JsonValue::Null => ValueView::Null,
            JsonValue::Bool(b) => ValueView::Primitive(Primitive::Bool(*b)),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    ValueView::Primitive(Primitive::Int(i))
                } else if let Some(u) = n.as_u64() {
                    ValueView::Primitive(Primitive::UInt(u))
                } else {
                    n.as_f64()
                        .map_or(ValueView::Null, |f| ValueView::Primitive(Primitive::Float(f)))
                }
            }
            JsonValue::String(s) => ValueView::Primitive(Primitive::Str(Cow::Borrowed(s))),
            JsonValue::Array(items) => list_of(items.iter()),
            JsonValue::Object(entries) => ValueView::Map(Box::new(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value as &dyn ContextualValue)),
            )),
        }
    }
}
