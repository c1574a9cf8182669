//! Coercion between dynamic value kinds.
//!
//! Coercion is what the encoder falls back to for kinds with no direct
//! document mapping. Only a small, explicit set of conversions is allowed;
//! everything else reports a [`TypeMismatch`].

use crate::error::TypeMismatch;
use crate::types::Kind;
use crate::values::{DynamicValue, Map};

impl DynamicValue {
    /// Whether [`coerce_to`](Self::coerce_to) would succeed for `target`.
    pub fn can_coerce_to(&self, target: Kind) -> bool {
        if self.kind() == target {
            return true;
        }
        match (self, target) {
            (Self::Pairs(_), Kind::Document) => true,
            (Self::StringList(_), Kind::Array) => true,
            (Self::Int32(_) | Self::Int16(_) | Self::UInt32(_), Kind::Int64) => true,
            (Self::UInt64(u), Kind::Int64) => i64::try_from(*u).is_ok(),
            (Self::Int16(_), Kind::Int32) => true,
            (Self::Int64(i), Kind::Int32) => i32::try_from(*i).is_ok(),
            (Self::UInt32(u), Kind::Int32) => i32::try_from(*u).is_ok(),
            (Self::UInt64(u), Kind::Int32) => i32::try_from(*u).is_ok(),
            (
                Self::Int32(_)
                | Self::Int64(_)
                | Self::Int16(_)
                | Self::UInt32(_)
                | Self::UInt64(_)
                | Self::Char(_)
                | Self::Uuid(_),
                Kind::String,
            ) => true,
            _ => false,
        }
    }

    /// Convert this value into an equivalent value of kind `target`.
    pub fn coerce_to(&self, target: Kind) -> Result<DynamicValue, TypeMismatch> {
        if self.kind() == target {
            return Ok(self.clone());
        }
        let mismatch = || TypeMismatch::new(target, self.kind());
        let coerced = match (self, target) {
            (Self::Pairs(pairs), Kind::Document) => {
                let mut map = Map::with_capacity(pairs.len());
                for (key, value) in pairs {
                    map.insert(key.clone(), value.clone());
                }
                Self::Document(map)
            }
            (Self::StringList(list), Kind::Array) => {
                Self::Array(list.iter().cloned().map(Self::String).collect())
            }
            (Self::Int32(i), Kind::Int64) => Self::Int64(i64::from(*i)),
            (Self::Int16(i), Kind::Int64) => Self::Int64(i64::from(*i)),
            (Self::UInt32(u), Kind::Int64) => Self::Int64(i64::from(*u)),
            (Self::UInt64(u), Kind::Int64) => {
                Self::Int64(i64::try_from(*u).map_err(|_| mismatch())?)
            }
            (Self::Int16(i), Kind::Int32) => Self::Int32(i32::from(*i)),
            (Self::Int64(i), Kind::Int32) => {
                Self::Int32(i32::try_from(*i).map_err(|_| mismatch())?)
            }
            (Self::UInt32(u), Kind::Int32) => {
                Self::Int32(i32::try_from(*u).map_err(|_| mismatch())?)
            }
            (Self::UInt64(u), Kind::Int32) => {
                Self::Int32(i32::try_from(*u).map_err(|_| mismatch())?)
            }
            (Self::Int32(i), Kind::String) => Self::String(i.to_string()),
            (Self::Int64(i), Kind::String) => Self::String(i.to_string()),
            (Self::Int16(i), Kind::String) => Self::String(i.to_string()),
            (Self::UInt32(u), Kind::String) => Self::String(u.to_string()),
            (Self::UInt64(u), Kind::String) => Self::String(u.to_string()),
            (Self::Char(c), Kind::String) => Self::String(c.to_string()),
            (Self::Uuid(u), Kind::String) => Self::String(u.hyphenated().to_string()),
            _ => return Err(mismatch()),
        };
        Ok(coerced)
    }
}
