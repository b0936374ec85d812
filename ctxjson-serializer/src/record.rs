//! Per-type record schemas.
//!
//! A record describes its declared fields through a static table of
//! [`FieldDescriptor`]s and exposes its handler methods by name. The table is
//! normally generated by `#[derive(Contextual)]`, but hand-written
//! implementations are equally valid.

use crate::handler::Method;
use crate::value::ContextualValue;

/// Declarative field metadata: ordered `key -> value` pairs.
///
/// Lookups follow struct-tag conventions: a missing key reads as `""`, and
/// the first occurrence of a repeated key wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Tags(&'static [(&'static str, &'static str)]);

impl Tags {
    pub const EMPTY: Tags = Tags(&[]);

    pub const fn new(pairs: &'static [(&'static str, &'static str)]) -> Self {
        Tags(pairs)
    }

    /// Value for `key`, or `""` when absent.
    pub fn get(&self, key: &str) -> &'static str {
        self.lookup(key).unwrap_or("")
    }

    pub fn lookup(&self, key: &str) -> Option<&'static str> {
        self.0.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> {
        self.0.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Static description of one declared field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Rust identifier of the field
    pub ident: &'static str,
    /// Field metadata
    pub tags: Tags,
    /// Embedded sub-record whose fields are promoted into the parent
    pub flatten: bool,
}

impl FieldDescriptor {
    pub const fn new(ident: &'static str, tags: Tags) -> Self {
        Self {
            ident,
            tags,
            flatten: false,
        }
    }

    pub const fn flattened(ident: &'static str, tags: Tags) -> Self {
        Self {
            ident,
            tags,
            flatten: true,
        }
    }
}

/// A declared field paired with the borrowed field value.
pub struct Field<'a> {
    pub descriptor: &'static FieldDescriptor,
    pub value: &'a dyn ContextualValue,
}

impl<'a> Field<'a> {
    pub fn new(descriptor: &'static FieldDescriptor, value: &'a dyn ContextualValue) -> Self {
        Self { descriptor, value }
    }
}

/// Record-shaped values: the explicit schema the engine consults instead of
/// runtime introspection.
pub trait ContextualRecord {
    /// Type name used in diagnostics.
    fn type_name(&self) -> &'static str;

    /// Declared fields, in declaration order.
    fn fields(&self) -> Vec<Field<'_>>;

    /// Method table used to resolve handler metadata.
    fn method(&self, _name: &str) -> Option<Method<'_>> {
        None
    }
}
