use std::sync::{LockResult, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

/// Take the shared side of `lock`, recovering the guard if a writer panicked.
pub(crate) fn rw_read<'a, T>(
    lock: &'a RwLock<T>,
    store: &'static str,
    operation: &'static str,
) -> RwLockReadGuard<'a, T> {
    recover(lock.read(), store, operation, "read")
}

pub(crate) fn rw_write<'a, T>(
    lock: &'a RwLock<T>,
    store: &'static str,
    operation: &'static str,
) -> RwLockWriteGuard<'a, T> {
    recover(lock.write(), store, operation, "write")
}

fn recover<G>(
    result: LockResult<G>,
    store: &'static str,
    operation: &'static str,
    side: &'static str,
) -> G {
    result.unwrap_or_else(|poisoned| {
        warn!(
            target = "blotter::store",
            store,
            operation,
            side,
            "store lock was poisoned; continuing with the last written state"
        );
        poisoned.into_inner()
    })
}
