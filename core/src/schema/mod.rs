// stepflow/src/schema/mod.rs

//! Declarative value shapes and the validator that checks data against them at
//! every stage boundary.
//!
//! A [`Schema`] is plain data: it can be cloned, compared, rendered as JSON Schema
//! for an agent host, and reused to validate any number of values. [`validate`]
//! returns a normalized copy of the value (defaults applied, undeclared object
//! fields dropped) or a [`ValidationError`] naming the offending path.

pub mod definition;
pub mod validate;

pub use definition::{Field, ObjectSchema, Schema};
pub use validate::{validate, ValidationError};
