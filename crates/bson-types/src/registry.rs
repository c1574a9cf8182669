//! Process-wide registry of extension type names.
//!
//! An [`Extension`](variant_core::Extension) value is only encoded when its
//! `type_name` has been registered, optionally together with the kind its
//! payload must have. The built-in wrapper kinds are registered exactly once
//! by [`init`], which every converter entry point calls before doing any work.
//!
//! `init` is a three-state gate (uninitialized, in progress, done). The first
//! caller performs the registration; callers that lose the race spin until it
//! is done, so every caller observes a fully populated registry.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU8, Ordering};
use tracing::debug;
use variant_core::Kind;

const UNINITIALIZED: u8 = 0;
const IN_PROGRESS: u8 = 1;
const DONE: u8 = 2;

static STATE: AtomicU8 = AtomicU8::new(UNINITIALIZED);

static REGISTRY: RwLock<BTreeMap<String, ExtensionType>> = parking_lot::const_rwlock(BTreeMap::new());

/// Built-in extension types: the BSON wrapper kinds, so that they can be
/// carried inside application payloads.
const BUILTIN_TYPES: &[(&str, Kind)] = &[
    ("bson.Binary", Kind::Binary),
    ("bson.ObjectId", Kind::ObjectId),
    ("bson.Regex", Kind::Regex),
    ("bson.Code", Kind::Code),
    ("bson.CodeWithScope", Kind::CodeWithScope),
    ("bson.MinKey", Kind::MinKey),
    ("bson.MaxKey", Kind::MaxKey),
];

/// A registered extension type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionType {
    /// Application type name
    pub name: String,
    /// Kind the payload must have, if constrained
    pub payload_kind: Option<Kind>,
}

/// Register the built-in extension types. Safe to call any number of times
/// from any number of threads.
pub fn init() {
    match STATE.compare_exchange(UNINITIALIZED, IN_PROGRESS, Ordering::AcqRel, Ordering::Acquire) {
        Ok(_) => {
            {
                let mut registry = REGISTRY.write();
                for (name, kind) in BUILTIN_TYPES {
                    registry.insert(
                        (*name).to_string(),
                        ExtensionType {
                            name: (*name).to_string(),
                            payload_kind: Some(*kind),
                        },
                    );
                }
            }
            STATE.store(DONE, Ordering::Release);
            debug!("Registered {} built-in extension types", BUILTIN_TYPES.len());
        }
        Err(_) => {
            while STATE.load(Ordering::Acquire) != DONE {
                std::hint::spin_loop();
            }
        }
    }
}

/// Whether [`init`] has completed.
pub fn is_initialized() -> bool {
    STATE.load(Ordering::Acquire) == DONE
}

/// Register an application extension type. Re-registering a name replaces
/// its payload constraint.
pub fn register_extension_type(name: impl Into<String>, payload_kind: Option<Kind>) {
    init();
    let name = name.into();
    debug!("Registering extension type {name} (payload: {payload_kind:?})");
    REGISTRY.write().insert(
        name.clone(),
        ExtensionType {
            name,
            payload_kind,
        },
    );
}

/// Look up a registered extension type.
pub fn lookup(name: &str) -> Option<ExtensionType> {
    init();
    REGISTRY.read().get(name).cloned()
}

/// Whether `name` is a registered extension type.
pub fn is_registered(name: &str) -> bool {
    init();
    REGISTRY.read().contains_key(name)
}
