//! forgefs - remote source-control hosting (owners, repositories, refs,
//! trees, blobs) presented as a POSIX-like read-only filesystem.
//!
//! The crate has two halves: the [`provider`] module defines the abstract
//! capability surface a hosting provider implements, and the [`fs`] module
//! contains the path-resolution and handle-management engine that projects
//! that surface as a filesystem. Binding the engine to a host filesystem
//! API (FUSE or similar) is a thin adapter left to the embedding program.

pub mod fs;
pub mod provider;

pub use fs::{Config, Errno, FileStat, ForgeFs};
