//! BSON conversions for variant-core dynamic values.
//!
//! This crate converts between [`DynamicValue`](variant_core::DynamicValue)
//! trees and BSON documents in their raw binary form.
//!
//! # Modules
//!
//! - [`forward`] - DynamicValue → BSON document (arena-backed encoder)
//! - [`reverse`] - BSON document → DynamicValue
//! - [`extension`] - Host-only values carried as user-defined binary payloads
//! - [`registry`] - Extension type names and the one-time init gate
//! - [`arena`] - Per-call owner of intermediate encoder buffers
//! - [`config`] - Conversion options
//!
//! # Example
//!
//! ```rust
//! use bson_types::{ConversionConfig, Decoder, Encoder};
//! use variant_core::DynamicValue;
//!
//! let config = ConversionConfig::default();
//! let value = DynamicValue::document([("name", DynamicValue::string("Alice"))]);
//!
//! let doc = Encoder::new(&config).encode_document(&value).unwrap();
//! let map = Decoder::new(&config).decode_document(&doc).unwrap();
//! assert_eq!(DynamicValue::Document(map), value);
//! ```

pub mod arena;
pub mod config;
pub mod error;
pub mod extension;
pub mod forward;
pub mod registry;
pub mod reverse;

pub use arena::{ArenaStats, BufferArena};
pub use config::ConversionConfig;
pub use error::{ConversionError, Result};
pub use extension::{BincodeSerializer, ExtensionSerializer, JsonSerializer};
pub use forward::Encoder;
pub use registry::{init, register_extension_type, ExtensionType};
pub use reverse::Decoder;
