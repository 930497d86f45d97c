//! An in-memory provider implementation, intended primarily for testing.
//!
//! Repositories are populated up front with refs, trees, and blobs, then
//! registered with a [`MemoryClient`]. The client counts every provider
//! call and every open/close pair, so callers can assert that resource
//! acquisition and release stay balanced.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use super::client::{BlobReader, Client, Owner, Repository};
use super::error::{ProviderError, Result};
use super::types::{ObjectId, Ref, TreeEntry};

/// Counters exposed by [`MemoryClient`] for observing provider traffic.
#[derive(Default)]
pub struct MemoryStats {
    calls: AtomicUsize,
    owner_opens: AtomicUsize,
    owner_closes: AtomicUsize,
    repo_opens: AtomicUsize,
    repo_closes: AtomicUsize,
    reader_opens: AtomicUsize,
    reader_closes: AtomicUsize,
}

impl MemoryStats {
    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    /// Total number of provider calls, successful or not.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Successful `open_owner` calls.
    pub fn owner_opens(&self) -> usize {
        self.owner_opens.load(Ordering::SeqCst)
    }

    /// `close_owner` calls.
    pub fn owner_closes(&self) -> usize {
        self.owner_closes.load(Ordering::SeqCst)
    }

    /// Successful `open_repository` calls.
    pub fn repo_opens(&self) -> usize {
        self.repo_opens.load(Ordering::SeqCst)
    }

    /// `close_repository` calls.
    pub fn repo_closes(&self) -> usize {
        self.repo_closes.load(Ordering::SeqCst)
    }

    /// Successfully opened blob readers.
    pub fn reader_opens(&self) -> usize {
        self.reader_opens.load(Ordering::SeqCst)
    }

    /// Closed blob readers.
    pub fn reader_closes(&self) -> usize {
        self.reader_closes.load(Ordering::SeqCst)
    }
}

/// An in-memory repository with fixed content.
pub struct MemoryRepository {
    name: String,
    refs: Vec<Ref>,
    revisions: HashMap<String, Ref>,
    trees: HashMap<ObjectId, Vec<TreeEntry>>,
    blobs: HashMap<ObjectId, Bytes>,
    modules: HashMap<String, String>,
    blob_open_delay: Option<Duration>,
    caseins: bool,
    stats: Arc<MemoryStats>,
}

impl MemoryRepository {
    /// Create an empty repository with the given canonical name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            refs: Vec::new(),
            revisions: HashMap::new(),
            trees: HashMap::new(),
            blobs: HashMap::new(),
            modules: HashMap::new(),
            blob_open_delay: None,
            caseins: false,
            stats: Arc::new(MemoryStats::default()),
        }
    }

    /// Add a branch ref (`refs/heads/{name}`) pointing at the tree `tree`.
    pub fn add_branch(&mut self, name: &str, tree: &str, tree_time: DateTime<Utc>) {
        self.refs.push(Ref {
            name: format!("refs/heads/{name}"),
            tree: tree.to_string(),
            tree_time,
        });
    }

    /// Add a tag ref (`refs/tags/{name}`) pointing at the tree `tree`.
    pub fn add_tag(&mut self, name: &str, tree: &str, tree_time: DateTime<Utc>) {
        self.refs.push(Ref {
            name: format!("refs/tags/{name}"),
            tree: tree.to_string(),
            tree_time,
        });
    }

    /// Register a raw revision token resolvable via `get_temp_ref`.
    pub fn add_revision(&mut self, token: &str, tree: &str, tree_time: DateTime<Utc>) {
        self.revisions.insert(
            token.to_string(),
            Ref {
                name: token.to_string(),
                tree: tree.to_string(),
                tree_time,
            },
        );
    }

    /// Store a tree object.
    pub fn add_tree(&mut self, oid: &str, entries: Vec<TreeEntry>) {
        self.trees.insert(oid.to_string(), entries);
    }

    /// Store a blob object.
    pub fn add_blob(&mut self, oid: &str, data: impl Into<Bytes>) {
        self.blobs.insert(oid.to_string(), data.into());
    }

    /// Map the submodule at repository-relative `path` to a mount path.
    pub fn add_module(&mut self, path: &str, module: &str) {
        self.modules.insert(path.to_string(), module.to_string());
    }

    /// Delay every `get_blob_reader` call, to widen race windows in tests.
    pub fn set_blob_open_delay(&mut self, delay: Duration) {
        self.blob_open_delay = Some(delay);
    }

    fn names_match(&self, a: &str, b: &str) -> bool {
        if self.caseins {
            a.eq_ignore_ascii_case(b)
        } else {
            a == b
        }
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_refs(&self) -> Result<Vec<Ref>> {
        self.stats.record_call();
        Ok(self.refs.clone())
    }

    async fn get_ref(&self, name: &str) -> Result<Ref> {
        self.stats.record_call();
        self.refs
            .iter()
            .find(|r| self.names_match(&r.name, name))
            .cloned()
            .ok_or(ProviderError::NotFound)
    }

    async fn get_temp_ref(&self, token: &str) -> Result<Ref> {
        self.stats.record_call();
        self.revisions
            .get(token)
            .cloned()
            .ok_or(ProviderError::NotFound)
    }

    async fn get_tree(&self, reference: &Ref, entry: Option<&TreeEntry>) -> Result<Vec<TreeEntry>> {
        self.stats.record_call();
        let oid = match entry {
            Some(entry) => &entry.oid,
            None => &reference.tree,
        };
        self.trees.get(oid).cloned().ok_or(ProviderError::NotFound)
    }

    async fn get_tree_entry(
        &self,
        reference: &Ref,
        parent: Option<&TreeEntry>,
        name: &str,
    ) -> Result<TreeEntry> {
        self.stats.record_call();
        let oid = match parent {
            Some(parent) => &parent.oid,
            None => &reference.tree,
        };
        let tree = self.trees.get(oid).ok_or(ProviderError::NotFound)?;
        tree.iter()
            .find(|e| self.names_match(&e.name, name))
            .cloned()
            .ok_or(ProviderError::NotFound)
    }

    async fn get_blob_reader(&self, entry: &TreeEntry) -> Result<Arc<dyn BlobReader>> {
        self.stats.record_call();
        if let Some(delay) = self.blob_open_delay {
            tokio::time::sleep(delay).await;
        }
        let data = self
            .blobs
            .get(&entry.oid)
            .cloned()
            .ok_or(ProviderError::NotFound)?;
        self.stats.reader_opens.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MemoryBlobReader {
            data,
            stats: Arc::clone(&self.stats),
        }))
    }

    async fn get_module(&self, _reference: &Ref, path: &str, _recurse: bool) -> Result<String> {
        self.stats.record_call();
        self.modules
            .get(path)
            .cloned()
            .ok_or(ProviderError::NotFound)
    }
}

struct MemoryOwner {
    name: String,
}

impl Owner for MemoryOwner {
    fn name(&self) -> &str {
        &self.name
    }
}

struct OwnerEntry {
    owner: Arc<MemoryOwner>,
    repositories: Vec<Arc<MemoryRepository>>,
}

/// An in-memory implementation of [`Client`].
pub struct MemoryClient {
    owners: Vec<OwnerEntry>,
    caseins: bool,
    stats: Arc<MemoryStats>,
}

impl MemoryClient {
    /// Create an empty client with case-sensitive lookup.
    pub fn new() -> Self {
        Self::with_caseins(false)
    }

    /// Create an empty client; `caseins` selects case-insensitive lookup
    /// of owner, repository, ref, and tree entry names.
    pub fn with_caseins(caseins: bool) -> Self {
        Self {
            owners: Vec::new(),
            caseins,
            stats: Arc::new(MemoryStats::default()),
        }
    }

    /// Register an owner with the given canonical name.
    pub fn add_owner(&mut self, name: &str) {
        self.owners.push(OwnerEntry {
            owner: Arc::new(MemoryOwner {
                name: name.to_string(),
            }),
            repositories: Vec::new(),
        });
    }

    /// Register a repository under the named owner. The owner must have
    /// been added first; unknown owners are ignored.
    pub fn add_repository(&mut self, owner: &str, mut repository: MemoryRepository) {
        repository.stats = Arc::clone(&self.stats);
        repository.caseins = self.caseins;
        if let Some(entry) = self.owners.iter_mut().find(|e| e.owner.name == owner) {
            entry.repositories.push(Arc::new(repository));
        }
    }

    /// The call and open/close counters shared by this client and all of
    /// its repositories and readers.
    pub fn stats(&self) -> Arc<MemoryStats> {
        Arc::clone(&self.stats)
    }

    fn names_match(&self, a: &str, b: &str) -> bool {
        if self.caseins {
            a.eq_ignore_ascii_case(b)
        } else {
            a == b
        }
    }

    fn find_owner(&self, name: &str) -> Option<&OwnerEntry> {
        self.owners
            .iter()
            .find(|e| self.names_match(&e.owner.name, name))
    }
}

impl Default for MemoryClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Client for MemoryClient {
    async fn open_owner(&self, name: &str) -> Result<Arc<dyn Owner>> {
        self.stats.record_call();
        let entry = self.find_owner(name).ok_or(ProviderError::NotFound)?;
        self.stats.owner_opens.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::clone(&entry.owner) as Arc<dyn Owner>)
    }

    async fn close_owner(&self, _owner: Arc<dyn Owner>) {
        self.stats.record_call();
        self.stats.owner_closes.fetch_add(1, Ordering::SeqCst);
    }

    async fn open_repository(&self, owner: &dyn Owner, name: &str) -> Result<Arc<dyn Repository>> {
        self.stats.record_call();
        let entry = self
            .find_owner(owner.name())
            .ok_or(ProviderError::NotFound)?;
        let repository = entry
            .repositories
            .iter()
            .find(|r| self.names_match(&r.name, name))
            .ok_or(ProviderError::NotFound)?;
        self.stats.repo_opens.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::clone(repository) as Arc<dyn Repository>)
    }

    async fn close_repository(&self, _repository: Arc<dyn Repository>) {
        self.stats.record_call();
        self.stats.repo_closes.fetch_add(1, Ordering::SeqCst);
    }

    async fn get_owners(&self) -> Result<Vec<Arc<dyn Owner>>> {
        self.stats.record_call();
        Ok(self
            .owners
            .iter()
            .map(|e| Arc::clone(&e.owner) as Arc<dyn Owner>)
            .collect())
    }

    async fn get_repositories(&self, owner: &dyn Owner) -> Result<Vec<Arc<dyn Repository>>> {
        self.stats.record_call();
        let entry = self
            .find_owner(owner.name())
            .ok_or(ProviderError::NotFound)?;
        Ok(entry
            .repositories
            .iter()
            .map(|r| Arc::clone(r) as Arc<dyn Repository>)
            .collect())
    }
}

struct MemoryBlobReader {
    data: Bytes,
    stats: Arc<MemoryStats>,
}

#[async_trait]
impl BlobReader for MemoryBlobReader {
    async fn read_at(&self, buf: &mut [u8], offset: u64) -> std::io::Result<usize> {
        if offset >= self.data.len() as u64 {
            return Ok(0);
        }
        let start = offset as usize;
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        Ok(n)
    }

    async fn close(&self) {
        self.stats.reader_closes.fetch_add(1, Ordering::SeqCst);
    }
}
