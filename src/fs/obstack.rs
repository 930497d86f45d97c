//! The per-resolution resource bundle.

use std::sync::{Arc, Mutex};

use crate::provider::{BlobReader, Owner, Ref, Repository, TreeEntry};

/// The ordered bundle of provider resources acquired while resolving a
/// single path: owner, then repository, then ref, then the current tree
/// entry, and for open files a lazily attached blob reader.
///
/// Slots are populated monotonically during descent and released by the
/// facade in reverse order of acquisition. The reader slot is assigned at
/// most once per obstack; see `ForgeFs::read`.
#[derive(Default)]
pub(crate) struct Obstack {
    pub(crate) owner: Option<Arc<dyn Owner>>,
    pub(crate) repository: Option<Arc<dyn Repository>>,
    pub(crate) reference: Option<Ref>,
    pub(crate) entry: Option<TreeEntry>,
    reader: Mutex<Option<Arc<dyn BlobReader>>>,
}

impl Obstack {
    /// Snapshot the reader slot.
    pub(crate) fn reader(&self) -> Option<Arc<dyn BlobReader>> {
        self.reader.lock().unwrap().clone()
    }

    /// Install `reader` unless another caller won the race. Returns the
    /// reader to use, plus the losing reader to close, if any.
    pub(crate) fn install_reader(
        &self,
        reader: Arc<dyn BlobReader>,
    ) -> (Arc<dyn BlobReader>, Option<Arc<dyn BlobReader>>) {
        let mut slot = self.reader.lock().unwrap();
        match &*slot {
            Some(existing) => (Arc::clone(existing), Some(reader)),
            None => {
                *slot = Some(Arc::clone(&reader));
                (reader, None)
            }
        }
    }

    /// Empty the reader slot, returning the reader for closing.
    pub(crate) fn take_reader(&self) -> Option<Arc<dyn BlobReader>> {
        self.reader.lock().unwrap().take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct NullReader;

    #[async_trait]
    impl BlobReader for NullReader {
        async fn read_at(&self, _buf: &mut [u8], _offset: u64) -> std::io::Result<usize> {
            Ok(0)
        }
    }

    #[test]
    fn test_install_reader_once() {
        let obs = Obstack::default();
        assert!(obs.reader().is_none());

        let first: Arc<dyn BlobReader> = Arc::new(NullReader);
        let (winner, loser) = obs.install_reader(Arc::clone(&first));
        assert!(loser.is_none());
        assert!(Arc::ptr_eq(&winner, &first));

        // A second install loses to the first.
        let second: Arc<dyn BlobReader> = Arc::new(NullReader);
        let (winner, loser) = obs.install_reader(Arc::clone(&second));
        assert!(Arc::ptr_eq(&winner, &first));
        assert!(Arc::ptr_eq(&loser.unwrap(), &second));

        assert!(obs.take_reader().is_some());
        assert!(obs.reader().is_none());
    }
}
