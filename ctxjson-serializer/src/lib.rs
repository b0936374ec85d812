//! Context-aware JSON serialization for ctxjson
//!
//! This crate renders values into JSON under a named context ("public",
//! "admin", ...). Record fields carry declarative metadata that decides:
//! - whether a field is visible in the active context
//! - the key it is written under
//! - whether a handler method replaces its value (and optionally its key)
//!
//! Records opt in with `#[derive(Contextual)]`:
//!
//! ```
//! use ctxjson_serializer::{Contextual, Marshaler};
//!
//! #[derive(Contextual)]
//! struct Person {
//!     #[tag(json = "name")]
//!     name: String,
//!     #[tag(json = "password", marshalcontext = "admin")]
//!     password: String,
//! }
//!
//! let person = Person { name: "Alice".into(), password: "secret".into() };
//! let public = Marshaler::new(&person, "user").to_json_string().unwrap();
//! assert_eq!(public, r#"{"name":"Alice"}"#);
//! let admin = Marshaler::new(&person, "admin").to_json_string().unwrap();
//! assert_eq!(admin, r#"{"name":"Alice","password":"secret"}"#);
//! ```

// Lets the derive output name `ctxjson_serializer` from inside this crate too
extern crate self as ctxjson_serializer;

pub mod config;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod handler;
pub mod marshaler;
pub mod record;
pub mod selector;
pub mod value;

pub use config::MarshalerConfig;
pub use engine::{
    marshal_with_config, marshal_with_context, to_value_with_config, to_value_with_context,
};
pub use error::{MarshalError, Result};
pub use handler::{is_valid, resolve, HandlerOutput, Method, Replacement, Resolved};
pub use marshaler::Marshaler;
pub use record::{ContextualRecord, Field, FieldDescriptor, Tags};
pub use value::{ContextualValue, Primitive, ValueCategory, ValueView};

// Re-export macros
pub use ctxjson_serializer_macros::*;
