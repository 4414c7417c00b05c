//! Process-wide schema cache keyed by type identity.
//!
//! Schemas live in a shared map behind a `RwLock`, which is only taken the
//! first time a thread asks for a type. Each thread keeps its own copy of
//! the `&'static` entries it has seen, so later lookups take no lock.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};

use tracing::debug;

use super::{Filterable, Schema};

type Entry = &'static (dyn Any + Send + Sync);

static REGISTRY: OnceLock<RwLock<HashMap<TypeId, Entry>>> = OnceLock::new();

thread_local! {
    static LOCAL: RefCell<HashMap<TypeId, Entry>> = RefCell::new(HashMap::new());
}

#[cfg(test)]
thread_local! {
    static SHARED_LOOKUPS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

fn registry() -> &'static RwLock<HashMap<TypeId, Entry>> {
    REGISTRY.get_or_init(Default::default)
}

fn downcast<T: Filterable>(entry: Entry) -> Option<&'static Schema<T>> {
    entry.downcast_ref::<Schema<T>>()
}

fn lookup<T: Filterable>(map: &HashMap<TypeId, Entry>) -> Option<&'static Schema<T>> {
    downcast::<T>(*map.get(&TypeId::of::<T>())?)
}

/// Returns the schema for `T`, building it on first use.
///
/// Schemas are built once per type and never evicted. Only a thread's first
/// request for a type touches the shared lock; repeated calls are lock-free.
/// Safe to call from any number of threads.
pub fn describe<T: Filterable>() -> &'static Schema<T> {
    let cached = LOCAL.with(|local| local.borrow().get(&TypeId::of::<T>()).copied());
    if let Some(schema) = cached.and_then(downcast::<T>) {
        return schema;
    }

    let schema = describe_shared::<T>();
    LOCAL.with(|local| {
        local.borrow_mut().insert(TypeId::of::<T>(), schema);
    });
    schema
}

fn describe_shared<T: Filterable>() -> &'static Schema<T> {
    #[cfg(test)]
    SHARED_LOOKUPS.with(|n| n.set(n.get() + 1));

    let lock = registry();

    {
        let map = lock.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(schema) = lookup::<T>(&map) {
            return schema;
        }
    }

    let mut map = lock.write().unwrap_or_else(PoisonError::into_inner);
    // Another thread may have built it between the two locks.
    if let Some(schema) = lookup::<T>(&map) {
        return schema;
    }

    let schema: &'static Schema<T> = Box::leak(Box::new(Schema::<T>::build()));
    map.insert(TypeId::of::<T>(), schema);
    debug!(
        type_name = schema.type_name(),
        fields = schema.len(),
        "built filter schema"
    );
    schema
}
