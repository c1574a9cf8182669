//! Configuration options for BSON conversion.

use crate::error::{ConversionError, Result};
use crate::extension::{BincodeSerializer, ExtensionSerializer};
use std::sync::Arc;
use variant_core::nesting::DEFAULT_MAX_DEPTH;

/// Default binary sub-kind used for extension payloads (first user-defined
/// sub-kind).
pub const DEFAULT_USER_SUBTYPE: u8 = 0x80;

/// Default upper bound for a single extension payload.
pub const DEFAULT_MAX_EXTENSION_PAYLOAD: u64 = 16 * 1024 * 1024;

/// Configuration options for forward and reverse conversion.
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Serializer used for host-only values carried as extension payloads.
    pub serializer: Arc<dyn ExtensionSerializer>,

    /// Binary sub-kind that marks extension payloads.
    /// Must be in the user-defined range `0x80..=0xFF`.
    pub user_subtype: u8,

    /// Maximum size in bytes of a single extension payload, enforced by
    /// serializers that support a limit.
    pub max_extension_payload: u64,

    /// Maximum container nesting accepted when encoding or decoding, both
    /// for documents and inside extension payloads.
    pub max_depth: usize,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            serializer: Arc::new(BincodeSerializer::new(DEFAULT_MAX_EXTENSION_PAYLOAD)),
            user_subtype: DEFAULT_USER_SUBTYPE,
            max_extension_payload: DEFAULT_MAX_EXTENSION_PAYLOAD,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ConversionConfig {
    /// Create a new configuration with the specified extension serializer.
    pub fn with_serializer(serializer: Arc<dyn ExtensionSerializer>) -> Self {
        Self {
            serializer,
            ..Default::default()
        }
    }

    /// Use a different user-defined binary sub-kind for extension payloads.
    ///
    /// Values below `0x80` are reserved by BSON and are rejected.
    pub fn with_user_subtype(mut self, subtype: u8) -> Result<Self> {
        if subtype < 0x80 {
            return Err(ConversionError::InvalidUserSubtype(subtype));
        }
        self.user_subtype = subtype;
        Ok(self)
    }

    /// Change the maximum container nesting accepted in either direction.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Change the extension payload size limit.
    ///
    /// The default bincode serializer is rebuilt with the new limit; a custom
    /// serializer keeps its own.
    pub fn with_max_extension_payload(mut self, limit: u64) -> Self {
        self.max_extension_payload = limit;
        if self.serializer.name() == BincodeSerializer::NAME {
            self.serializer = Arc::new(BincodeSerializer::new(limit));
        }
        self
    }

    /// The BSON binary sub-kind that marks extension payloads.
    pub(crate) fn user_binary_subtype(&self) -> bson::spec::BinarySubtype {
        bson::spec::BinarySubtype::UserDefined(self.user_subtype)
    }
}
