//! Core value model for the variant-bson converter.
//!
//! This crate provides the host-side types the converter works with:
//!
//! - [`DynamicValue`] - The dynamically-typed value tree
//! - [`Kind`] - Discriminant of every `DynamicValue` variant
//! - [`FromDynamic`] - Native value extraction by exact kind
//! - Wrapper types for BSON kinds with no plain Rust counterpart
//!   ([`OpaqueBinary`], [`ObjectId`], [`Regex`], [`Code`], [`CodeWithScope`],
//!   [`MinKey`], [`MaxKey`]) and the application [`Extension`] value
//!
//! # Architecture
//!
//! ```text
//! variant-core (this crate)
//!    │
//!    └─── bson-types      (DynamicValue ⇄ BSON encoder/decoder)
//!            │
//!            └─── variant-bson (fail-fast / fail-soft entry points)
//! ```
//!
//! # Example
//!
//! ```rust
//! use variant_core::{DynamicValue, Kind};
//!
//! let value = DynamicValue::document([
//!     ("name", DynamicValue::string("Alice")),
//!     ("age", DynamicValue::Int32(30)),
//! ]);
//! assert_eq!(value.kind(), Kind::Document);
//!
//! let age: i32 = value.as_document().unwrap()["age"].extract().unwrap();
//! assert_eq!(age, 30);
//! ```

pub mod coerce;
pub mod error;
pub mod nesting;
pub mod types;
pub mod values;
pub mod wrappers;

// Re-exports for convenience
pub use error::{ObjectIdError, TypeMismatch};
pub use types::Kind;
pub use values::{DynamicValue, FromDynamic, Map};
pub use wrappers::{
    BinaryKind, Code, CodeWithScope, Extension, MaxKey, MinKey, ObjectId, OpaqueBinary, Regex,
};
