#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![deny(missing_debug_implementations, nonstandard_style)]
#![warn(missing_docs, rust_2018_idioms)]

mod compile;
mod diagnostic;
mod validate;

pub use crate::compile::{Schema, SchemaError, SchemaType, StructElement, TypeKind};
pub use crate::diagnostic::Diagnostic;
pub use crate::validate::{validate, validate_store, SchemaValidationError};
