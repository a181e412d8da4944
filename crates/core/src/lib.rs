//! gqlbind Core - Value and error types shared by the gqlbind crates.
//!
//! - `Value`: JSON-shaped value used for variables, payloads and host properties
//! - `Object`: sorted-key object map
//! - `Error`: usage errors raised by the binding layer
//!
//! # Example
//!
//! ```rust
//! use gqlbind_core::{Object, Value};
//!
//! let mut vars = Object::new();
//! vars.insert("id", 7);
//! vars.insert("lang", "fr");
//!
//! let value = Value::Object(vars);
//! assert_eq!(value.get("id").and_then(Value::as_i64), Some(7));
//! assert!(value.is_truthy());
//! ```

#![no_std]

extern crate alloc;

mod error;
mod value;

pub use error::{Error, Result};
pub use value::{Object, Value};
