//! The table of open file and directory handles.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::obstack::Obstack;

struct Inner {
    next_fh: u64,
    open: HashMap<u64, Arc<Obstack>>,
}

/// Process-wide mapping from handle numbers to open obstacks.
///
/// Handle numbers are monotonically increasing and never reused within the
/// process lifetime; 0 is left free as a "no handle" sentinel for the host
/// layer. The lock is held only for map manipulation, never across I/O.
pub(crate) struct HandleTable {
    inner: RwLock<Inner>,
}

impl HandleTable {
    pub(crate) fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_fh: 1,
                open: HashMap::new(),
            }),
        }
    }

    /// Allocate a new handle bound to `obs`.
    pub(crate) fn insert(&self, obs: Arc<Obstack>) -> u64 {
        let mut inner = self.inner.write().unwrap();
        let fh = inner.next_fh;
        inner.open.insert(fh, obs);
        inner.next_fh += 1;
        fh
    }

    /// Look up the obstack bound to `fh`.
    pub(crate) fn get(&self, fh: u64) -> Option<Arc<Obstack>> {
        self.inner.read().unwrap().open.get(&fh).cloned()
    }

    /// Unbind `fh`, returning its obstack.
    pub(crate) fn remove(&self, fh: u64) -> Option<Arc<Obstack>> {
        self.inner.write().unwrap().open.remove(&fh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_monotonic() {
        let table = HandleTable::new();
        let a = table.insert(Arc::new(Obstack::default()));
        let b = table.insert(Arc::new(Obstack::default()));
        table.remove(a).unwrap();
        let c = table.insert(Arc::new(Obstack::default()));

        assert!(a > 0);
        assert!(b > a);
        // Removal does not recycle handle numbers.
        assert!(c > b);
    }

    #[test]
    fn test_lookup_and_remove() {
        let table = HandleTable::new();
        let fh = table.insert(Arc::new(Obstack::default()));

        assert!(table.get(fh).is_some());
        assert!(table.get(fh + 1).is_none());

        assert!(table.remove(fh).is_some());
        assert!(table.get(fh).is_none());
        assert!(table.remove(fh).is_none());
    }
}
