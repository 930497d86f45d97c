//! Abstract provider surface for remote source-control hosting.
//!
//! A provider exposes owners, repositories, refs, trees, and blobs through
//! the [`Client`] capability set. The filesystem core in [`crate::fs`]
//! consumes this surface and nothing else.

mod client;
mod empty;
mod error;
mod memory;
mod types;

pub use client::{BlobReader, Client, Owner, Repository};
pub use empty::EmptyRepository;
pub use error::{ProviderError, Result};
pub use memory::{MemoryClient, MemoryRepository, MemoryStats};
pub use types::{
    ObjectId, Ref, TreeEntry, MODE_DIR, MODE_LINK, MODE_MASK, MODE_REG, MODE_SUBMODULE,
};
