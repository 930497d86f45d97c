//! Value types shared between providers and the filesystem core.

use chrono::{DateTime, Utc};

/// Object ID identifying a blob or tree, as the provider spells it
/// (typically a lowercase hexadecimal hash).
pub type ObjectId = String;

/// File-type mask for tree entry modes (same values as POSIX `S_IFMT`).
pub const MODE_MASK: u32 = 0o170000;
/// Tree entry mode bits for a directory.
pub const MODE_DIR: u32 = 0o040000;
/// Tree entry mode bits for a regular file.
pub const MODE_REG: u32 = 0o100000;
/// Tree entry mode bits for a symbolic link.
pub const MODE_LINK: u32 = 0o120000;
/// Tree entry mode recorded for a submodule ("gitlink").
pub const MODE_SUBMODULE: u32 = 0o160000;

/// A named pointer into a repository's commit graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ref {
    /// Full ref name, e.g. `refs/heads/main` or `refs/tags/v1.0`.
    /// Temp refs carry the raw revision token as their name.
    pub name: String,
    /// Object ID of the root tree the ref points at.
    pub tree: ObjectId,
    /// Commit time of the tree; projected onto every entry under the ref.
    pub tree_time: DateTime<Utc>,
}

/// A node in a repository tree: regular file, executable, directory,
/// symlink, or submodule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Entry name as spelled in the tree.
    pub name: String,
    /// Git tree mode.
    pub mode: u32,
    /// Blob size in bytes; 0 for directories and submodules.
    pub size: u64,
    /// Symlink target, or the pinned commit for a submodule; empty otherwise.
    pub target: String,
    /// Object ID of the blob or subtree this entry refers to.
    pub oid: ObjectId,
}

impl TreeEntry {
    /// A directory entry pointing at the subtree `oid`.
    pub fn directory(name: &str, oid: &str) -> Self {
        Self {
            name: name.to_string(),
            mode: MODE_DIR,
            size: 0,
            target: String::new(),
            oid: oid.to_string(),
        }
    }

    /// A regular (non-executable) file entry.
    pub fn regular(name: &str, oid: &str, size: u64) -> Self {
        Self {
            name: name.to_string(),
            mode: MODE_REG | 0o644,
            size,
            target: String::new(),
            oid: oid.to_string(),
        }
    }

    /// An executable file entry.
    pub fn executable(name: &str, oid: &str, size: u64) -> Self {
        Self {
            name: name.to_string(),
            mode: MODE_REG | 0o755,
            size,
            target: String::new(),
            oid: oid.to_string(),
        }
    }

    /// A symbolic link entry.
    pub fn symlink(name: &str, target: &str) -> Self {
        Self {
            name: name.to_string(),
            mode: MODE_LINK,
            size: target.len() as u64,
            target: target.to_string(),
            oid: String::new(),
        }
    }

    /// A submodule entry pinned at `commit`.
    pub fn submodule(name: &str, commit: &str) -> Self {
        Self {
            name: name.to_string(),
            mode: MODE_SUBMODULE,
            size: 0,
            target: commit.to_string(),
            oid: commit.to_string(),
        }
    }
}
