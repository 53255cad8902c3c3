use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Document ids are opaque but never empty and never contain a path
/// separator.
pub(super) fn is_valid_document_id(id: &str) -> bool {
  !id.is_empty() && !id.contains('/')
}

// A panic while holding one of these locks leaves plain data behind, so a
// poisoned lock is still usable.
pub(super) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
  m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(super) fn read<T>(l: &RwLock<T>) -> RwLockReadGuard<'_, T> {
  l.read().unwrap_or_else(PoisonError::into_inner)
}

pub(super) fn write<T>(l: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
  l.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn document_ids() {
    assert!(is_valid_document_id("1"));
    assert!(is_valid_document_id("01J9Z3Q5W2R8K7N6M4T1V0X9Y8"));
    assert!(!is_valid_document_id(""));
    assert!(!is_valid_document_id("1/reviews"));
  }
}
