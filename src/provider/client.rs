//! The capability surface a hosting provider implements.
//!
//! The filesystem core consumes these traits and nothing else; a provider
//! backed by a real hosting service implements them over its API, with
//! whatever caching and credential handling it needs behind the interface.
//! All operations are asynchronous and may perform network I/O.

use std::sync::Arc;

use async_trait::async_trait;

use super::error::Result;
use super::types::{Ref, TreeEntry};

/// An open handle to an owner (user or organization).
///
/// Acquired via [`Client::open_owner`] and returned via
/// [`Client::close_owner`]; providers may refcount handles internally.
pub trait Owner: Send + Sync {
    /// Canonical provider-side spelling of the owner name.
    fn name(&self) -> &str;
}

/// An open handle to a repository.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Canonical provider-side spelling of the repository name.
    fn name(&self) -> &str;

    /// List all refs of the repository.
    async fn get_refs(&self) -> Result<Vec<Ref>>;

    /// Look up a ref by its full name (e.g. `refs/heads/main`).
    async fn get_ref(&self, name: &str) -> Result<Ref>;

    /// Construct a ref wrapping a raw revision token, for revisions no
    /// named ref points at.
    async fn get_temp_ref(&self, token: &str) -> Result<Ref>;

    /// List the entries of a tree: the subtree `entry` refers to, or the
    /// root tree of `reference` when `entry` is `None`.
    async fn get_tree(&self, reference: &Ref, entry: Option<&TreeEntry>) -> Result<Vec<TreeEntry>>;

    /// Look up a single child entry by name under `parent` (or under the
    /// root tree of `reference` when `parent` is `None`).
    async fn get_tree_entry(
        &self,
        reference: &Ref,
        parent: Option<&TreeEntry>,
        name: &str,
    ) -> Result<TreeEntry>;

    /// Open a reader over the blob `entry` refers to.
    async fn get_blob_reader(&self, entry: &TreeEntry) -> Result<Arc<dyn BlobReader>>;

    /// Resolve the `.gitmodules` mapping for the submodule at `path`
    /// (repository-relative), returning the mount path of the module.
    async fn get_module(&self, reference: &Ref, path: &str, recurse: bool) -> Result<String>;
}

/// Positional reader over a blob's bytes.
#[async_trait]
pub trait BlobReader: Send + Sync {
    /// Read bytes at `offset` into `buf`, returning the count copied.
    /// A short or zero count signals end of stream; it is not an error.
    async fn read_at(&self, buf: &mut [u8], offset: u64) -> std::io::Result<usize>;

    /// Release any resources backing the reader.
    async fn close(&self) {}
}

/// Entry point to a hosting provider.
#[async_trait]
pub trait Client: Send + Sync {
    /// Open a handle to the named owner.
    async fn open_owner(&self, name: &str) -> Result<Arc<dyn Owner>>;

    /// Return an owner handle acquired from [`Client::open_owner`].
    async fn close_owner(&self, owner: Arc<dyn Owner>);

    /// Open a handle to the named repository of `owner`.
    async fn open_repository(&self, owner: &dyn Owner, name: &str) -> Result<Arc<dyn Repository>>;

    /// Return a repository handle acquired from [`Client::open_repository`].
    async fn close_repository(&self, repository: Arc<dyn Repository>);

    /// List all owners visible to the client.
    async fn get_owners(&self) -> Result<Vec<Arc<dyn Owner>>>;

    /// List the repositories of `owner`.
    async fn get_repositories(&self, owner: &dyn Owner) -> Result<Vec<Arc<dyn Repository>>>;
}
