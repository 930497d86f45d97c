//! A repository with no content.

use std::sync::Arc;

use async_trait::async_trait;

use super::client::{BlobReader, Repository};
use super::error::{ProviderError, Result};
use super::types::{Ref, TreeEntry};

/// A repository with no refs, no trees, and no blobs.
///
/// Providers hand this out when repository content is unavailable, so the
/// filesystem view shows an empty repository instead of failing outright.
pub struct EmptyRepository;

#[async_trait]
impl Repository for EmptyRepository {
    fn name(&self) -> &str {
        ""
    }

    async fn get_refs(&self) -> Result<Vec<Ref>> {
        Ok(Vec::new())
    }

    async fn get_ref(&self, _name: &str) -> Result<Ref> {
        Err(ProviderError::NotFound)
    }

    async fn get_temp_ref(&self, _token: &str) -> Result<Ref> {
        Err(ProviderError::NotFound)
    }

    async fn get_tree(
        &self,
        _reference: &Ref,
        _entry: Option<&TreeEntry>,
    ) -> Result<Vec<TreeEntry>> {
        Ok(Vec::new())
    }

    async fn get_tree_entry(
        &self,
        _reference: &Ref,
        _parent: Option<&TreeEntry>,
        _name: &str,
    ) -> Result<TreeEntry> {
        Err(ProviderError::NotFound)
    }

    async fn get_blob_reader(&self, _entry: &TreeEntry) -> Result<Arc<dyn BlobReader>> {
        Err(ProviderError::NotFound)
    }

    async fn get_module(&self, _reference: &Ref, _path: &str, _recurse: bool) -> Result<String> {
        Err(ProviderError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_repository() {
        let repo = EmptyRepository;

        assert!(repo.get_refs().await.unwrap().is_empty());
        assert!(matches!(
            repo.get_ref("refs/heads/main").await,
            Err(ProviderError::NotFound)
        ));
    }
}
