//! Nesting limit for deserializing value trees.
//!
//! Every container position of [`DynamicValue`](crate::DynamicValue)
//! (arrays, documents, pairs, code scopes and extension payloads)
//! deserializes through [`nested`], which counts the current container depth
//! on this thread and fails once it passes the limit. This bounds stack use
//! for formats with no recursion limit of their own, such as bincode.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::cell::Cell;

/// Default maximum container depth.
pub const DEFAULT_MAX_DEPTH: usize = 100;

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
    static LIMIT: Cell<usize> = const { Cell::new(DEFAULT_MAX_DEPTH) };
}

/// Run `f` with the container depth limit set to `limit` on this thread.
pub fn with_max_depth<R>(limit: usize, f: impl FnOnce() -> R) -> R {
    let _restore = LimitGuard(LIMIT.with(|l| l.replace(limit)));
    f()
}

/// Current container depth limit on this thread.
pub fn max_depth() -> usize {
    LIMIT.with(Cell::get)
}

struct LimitGuard(usize);

impl Drop for LimitGuard {
    fn drop(&mut self) {
        LIMIT.with(|l| l.set(self.0));
    }
}

struct DepthGuard;

impl DepthGuard {
    fn enter() -> Result<Self, usize> {
        let limit = max_depth();
        DEPTH.with(|depth| {
            let next = depth.get() + 1;
            if next > limit {
                return Err(limit);
            }
            depth.set(next);
            Ok(DepthGuard)
        })
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(depth.get() - 1));
    }
}

/// Deserialize one container level, failing past the depth limit.
pub(crate) fn nested<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let _guard = DepthGuard::enter()
        .map_err(|limit| D::Error::custom(format_args!("nesting exceeds maximum depth {limit}")))?;
    T::deserialize(deserializer)
}
