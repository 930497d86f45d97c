//! The filesystem operations facade.
//!
//! [`ForgeFs`] walks the provider level by level: the first path component
//! names an owner, the second a repository, the third a ref (branches,
//! then tags, then raw revisions), and everything deeper descends the tree
//! of that ref. Each resolution produces an [`Obstack`] bundling the
//! provider resources acquired along the way; open files and directories
//! keep their obstack in a handle table until released.

use std::sync::Arc;

use chrono::Utc;
use tracing::trace;

use crate::provider::{
    Client, ProviderError, TreeEntry, MODE_DIR, MODE_LINK, MODE_MASK, MODE_SUBMODULE,
};

use super::attr::{stat_from_mode, FileStat};
use super::config::Config;
use super::error::Errno;
use super::handles::HandleTable;
use super::obstack::Obstack;
use super::path::{
    decode_ref_token, encode_ref_name, join_child, join_prefix, resolve_join, split_path,
};

/// Read-only filesystem over a hosting provider.
pub struct ForgeFs {
    client: Arc<dyn Client>,
    prefix: String,
    handles: HandleTable,
}

impl ForgeFs {
    /// Create a filesystem over the configured provider.
    pub fn new(config: Config) -> Self {
        Self {
            client: config.client,
            prefix: config.prefix,
            handles: HandleTable::new(),
        }
    }

    /// Resolve one path component at depth `i`, acquiring the matching
    /// provider resource into `obs`. When `norm` is set, the component is
    /// overwritten with the provider's canonical spelling.
    async fn resolve_component(
        &self,
        obs: &mut Obstack,
        lst: &mut [String],
        i: usize,
        norm: bool,
    ) -> Result<(), ProviderError> {
        match i {
            0 => {
                // Some names are disallowed outright to avoid provider
                // traffic for lookups that can never succeed: anything
                // containing a dot (".git", ".DS_Store", "autorun.inf")
                // and the special git name HEAD.
                let c = lst[i].as_str();
                if c.contains('.') || c == "HEAD" {
                    return Err(ProviderError::NotFound);
                }
                let owner = self.client.open_owner(c).await?;
                if norm {
                    lst[i] = owner.name().to_string();
                }
                obs.owner = Some(owner);
            }
            1 => {
                let owner = obs.owner.as_deref().ok_or(ProviderError::NotFound)?;
                let repository = self.client.open_repository(owner, lst[i].as_str()).await?;
                if norm {
                    lst[i] = repository.name().to_string();
                }
                obs.repository = Some(repository);
            }
            2 => {
                let repository = obs.repository.as_deref().ok_or(ProviderError::NotFound)?;
                let c = decode_ref_token(&lst[i]);
                let reference = match repository.get_ref(&format!("refs/heads/{c}")).await {
                    Err(ProviderError::NotFound) => {
                        match repository.get_ref(&format!("refs/tags/{c}")).await {
                            Err(ProviderError::NotFound) => repository.get_temp_ref(&c).await,
                            other => other,
                        }
                    }
                    other => other,
                }?;
                if norm {
                    lst[i] = encode_ref_name(&reference.name);
                }
                obs.reference = Some(reference);
            }
            _ => {
                let repository = obs.repository.as_deref().ok_or(ProviderError::NotFound)?;
                let reference = obs.reference.as_ref().ok_or(ProviderError::NotFound)?;
                let entry = repository
                    .get_tree_entry(reference, obs.entry.as_ref(), lst[i].as_str())
                    .await?;
                if norm {
                    lst[i] = entry.name.clone();
                }
                obs.entry = Some(entry);
            }
        }
        Ok(())
    }

    /// Resolve a path into an obstack, walking the provider level by
    /// level. On failure every resource acquired so far is released; the
    /// token list is returned in both cases so callers can surface partial
    /// normalization.
    async fn openex(&self, path: &str, norm: bool) -> (Result<Obstack, Errno>, Vec<String>) {
        let mut lst = split_path(&join_prefix(&self.prefix, path));
        let mut obs = Obstack::default();
        for i in 0..lst.len() {
            if let Err(err) = self.resolve_component(&mut obs, &mut lst, i, norm).await {
                self.release_obstack(&obs).await;
                return (Err(err.into()), lst);
            }
        }
        (Ok(obs), lst)
    }

    async fn open_path(&self, path: &str) -> Result<Obstack, Errno> {
        self.openex(path, false).await.0
    }

    /// Release the resources held by an obstack, in reverse order of
    /// acquisition. Empty slots are skipped; refs and entries are plain
    /// values and need no release.
    async fn release_obstack(&self, obs: &Obstack) {
        if let Some(reader) = obs.take_reader() {
            reader.close().await;
        }
        if let Some(repository) = obs.repository.clone() {
            self.client.close_repository(repository).await;
        }
        if let Some(owner) = obs.owner.clone() {
            self.client.close_owner(owner).await;
        }
    }

    /// Project `entry` (or, absent an entry, a synthetic directory) onto a
    /// stat, returning the symlink target alongside. The target is empty
    /// for anything that is not a link.
    ///
    /// Submodules are projected as symlinks. Their target is the module's
    /// mount path joined with the pinned commit when the provider resolves
    /// the containing `.gitmodules`, else the pinned commit alone.
    async fn project(
        &self,
        obs: &Obstack,
        entry: Option<&TreeEntry>,
        path: &str,
    ) -> (FileStat, String) {
        let Some(entry) = entry else {
            return (stat_from_mode(MODE_DIR, 0, Utc::now()), String::new());
        };

        let tree_time = match obs.reference.as_ref() {
            Some(reference) => reference.tree_time,
            None => Utc::now(),
        };
        let mut stat = stat_from_mode(entry.mode, entry.size, tree_time);
        let mut target = String::new();

        match entry.mode & MODE_MASK {
            MODE_LINK => {
                target = entry.target.clone();
                stat.size = target.len() as u64;
            }
            MODE_SUBMODULE => {
                target = entry.target.clone();
                let full = split_path(&join_prefix(&self.prefix, path));
                let rel = full.get(3..).unwrap_or(&[]).join("/");
                if let (Some(repository), Some(reference)) =
                    (obs.repository.as_deref(), obs.reference.as_ref())
                {
                    match repository.get_module(reference, &rel, true).await {
                        Ok(module) => {
                            let module = module
                                .strip_prefix(self.prefix.trim_end_matches('/'))
                                .unwrap_or(&module);
                            if module.is_empty() {
                                trace!(
                                    repository = repository.name(),
                                    reference = %reference.name,
                                    path = %rel,
                                    "submodule has no module mapping"
                                );
                            } else {
                                target = format!("{module}/{}", entry.target);
                            }
                        }
                        Err(err) => {
                            trace!(
                                repository = repository.name(),
                                reference = %reference.name,
                                path = %rel,
                                error = %err,
                                "module lookup failed"
                            );
                        }
                    }
                }
                stat.size = target.len() as u64;
            }
            _ => {}
        }

        (stat, target)
    }

    /// Resolve `path` and return its canonical on-disk spelling, with the
    /// mount prefix trimmed.
    ///
    /// Resolution failures are swallowed: callers get back whatever
    /// portion of the path normalized successfully.
    pub async fn readpath(&self, path: &str) -> String {
        trace!(path, "readpath");

        let (res, lst) = self.openex(path, true).await;
        if let Ok(obs) = res {
            self.release_obstack(&obs).await;
        }

        let target = format!("/{}", lst.join("/"));
        match target.strip_prefix(self.prefix.trim_end_matches('/')) {
            Some(trimmed) => trimmed.to_string(),
            None => target,
        }
    }

    /// Stat the file or directory at `path`.
    ///
    /// A path ending in `/.` engages trailing-symlink resolution: host
    /// bridges that must mark a symlink as directory-or-file probe with
    /// the suffixed path and expect the stat of the pointed-to file.
    /// Absolute targets replace the path wholesale, relative targets are
    /// joined against the parent of the link, and chasing stops after 16
    /// hops. Symlinks in the middle of a path are not resolved.
    pub async fn getattr(&self, path: &str, _fh: Option<u64>) -> Result<FileStat, Errno> {
        trace!(path, "getattr");

        let resolve = path.ends_with("/.");
        let mut path = path.to_string();
        let mut retries = 0;

        loop {
            let obs = self.open_path(&path).await?;
            let (stat, target) = self.project(&obs, obs.entry.as_ref(), &path).await;
            self.release_obstack(&obs).await;

            if resolve && !target.is_empty() && retries < 16 {
                if target.starts_with('/') {
                    path = target;
                } else {
                    path = resolve_join(&path, &target);
                }
                retries += 1;
                continue;
            }

            return Ok(stat);
        }
    }

    /// Read the target of the symlink at `path`.
    pub async fn readlink(&self, path: &str) -> Result<String, Errno> {
        trace!(path, "readlink");

        let obs = self.open_path(path).await?;
        let (_stat, target) = self.project(&obs, obs.entry.as_ref(), path).await;
        self.release_obstack(&obs).await;

        if target.is_empty() {
            return Err(Errno::INVAL);
        }
        Ok(target)
    }

    /// Open the directory at `path`, returning a handle.
    pub async fn opendir(&self, path: &str) -> Result<u64, Errno> {
        trace!(path, "opendir");

        let obs = self.open_path(path).await?;
        Ok(self.handles.insert(Arc::new(obs)))
    }

    /// Enumerate the directory open as `fh`, calling `fill` for each name
    /// until it returns false. Offsets are ignored; enumeration restarts
    /// from a fresh snapshot on every call.
    pub async fn readdir(
        &self,
        path: &str,
        fill: &mut (dyn FnMut(&str, &FileStat, i64) -> bool + Send),
        _offset: i64,
        fh: u64,
    ) -> Result<(), Errno> {
        trace!(path, fh, "readdir");

        let obs = self.handles.get(fh).ok_or(Errno::NOENT)?;

        let dir_time = match (&obs.entry, &obs.reference) {
            (Some(_), Some(reference)) => reference.tree_time,
            _ => Utc::now(),
        };
        let stat = stat_from_mode(MODE_DIR, 0, dir_time);
        fill(".", &stat, 0);
        fill("..", &stat, 0);

        if let (Some(reference), Some(repository)) = (&obs.reference, &obs.repository) {
            if let Ok(lst) = repository.get_tree(reference, obs.entry.as_ref()).await {
                for elm in &lst {
                    let (stat, _target) =
                        self.project(&obs, Some(elm), &join_child(path, &elm.name)).await;
                    if !fill(&elm.name, &stat, 0) {
                        break;
                    }
                }
            }
        } else if let Some(repository) = &obs.repository {
            // Only branches appear in the listing; tags and other ref
            // namespaces remain reachable by lookup.
            if let Ok(refs) = repository.get_refs().await {
                for elm in &refs {
                    if !elm.name.starts_with("refs/heads/") {
                        continue;
                    }
                    if !fill(&encode_ref_name(&elm.name), &stat, 0) {
                        break;
                    }
                }
            }
        } else if let Some(owner) = &obs.owner {
            if let Ok(lst) = self.client.get_repositories(owner.as_ref()).await {
                for elm in &lst {
                    if !fill(elm.name(), &stat, 0) {
                        break;
                    }
                }
            }
        } else if let Ok(lst) = self.client.get_owners().await {
            for elm in &lst {
                if !fill(elm.name(), &stat, 0) {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Close the directory handle `fh` and release its resources.
    pub async fn releasedir(&self, path: &str, fh: u64) -> Result<(), Errno> {
        trace!(path, fh, "releasedir");

        let obs = self.handles.remove(fh).ok_or(Errno::NOENT)?;
        self.release_obstack(&obs).await;
        Ok(())
    }

    /// Open the file at `path`, returning a handle. Flags are accepted
    /// but ignored: the filesystem is read-only.
    pub async fn open(&self, path: &str, flags: i32) -> Result<u64, Errno> {
        trace!(path, flags, "open");

        let obs = self.open_path(path).await?;
        Ok(self.handles.insert(Arc::new(obs)))
    }

    /// Read from the file open as `fh` at `offset`. A short or zero count
    /// signals end of file and is not an error.
    pub async fn read(
        &self,
        path: &str,
        buf: &mut [u8],
        offset: u64,
        fh: u64,
    ) -> Result<usize, Errno> {
        trace!(path, offset, fh, "read");

        let obs = self.handles.get(fh).ok_or(Errno::NOENT)?;

        let reader = match obs.reader() {
            Some(reader) => reader,
            None => {
                let (repository, entry) = match (&obs.repository, &obs.entry) {
                    (Some(repository), Some(entry)) => (repository, entry),
                    _ => return Err(Errno::IO),
                };
                // Opened without holding any lock: the provider may hit
                // the network. If another reader won the race meanwhile,
                // ours is the loser and gets closed.
                let fresh = repository
                    .get_blob_reader(entry)
                    .await
                    .map_err(|_| Errno::IO)?;
                let (winner, loser) = obs.install_reader(fresh);
                if let Some(loser) = loser {
                    loser.close().await;
                }
                winner
            }
        };

        reader.read_at(buf, offset).await.map_err(|_| Errno::IO)
    }

    /// Close the file handle `fh` and release its resources, including
    /// the blob reader if one was attached.
    pub async fn release(&self, path: &str, fh: u64) -> Result<(), Errno> {
        trace!(path, fh, "release");

        let obs = self.handles.remove(fh).ok_or(Errno::NOENT)?;
        self.release_obstack(&obs).await;
        Ok(())
    }
}
