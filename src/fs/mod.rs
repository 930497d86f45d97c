//! The read-only filesystem core.
//!
//! This module contains the path-resolution and handle-management engine:
//! tokenization and ref-name encoding, the per-resolution resource bundle,
//! the table of open handles, attribute projection, and the operations
//! facade that the host filesystem bridge calls into.

mod attr;
mod config;
mod error;
#[allow(clippy::module_inception)]
mod fs;
mod handles;
mod obstack;
mod path;

pub use attr::FileStat;
pub use config::Config;
pub use error::Errno;
pub use fs::ForgeFs;
