//! Filesystem configuration.

use std::sync::Arc;

use crate::provider::Client;

/// Configuration for constructing a [`crate::fs::ForgeFs`].
#[derive(Clone)]
pub struct Config {
    /// The provider to project.
    pub client: Arc<dyn Client>,
    /// Mount prefix prepended to every incoming path before tokenization
    /// and trimmed from normalized outputs, e.g. `"/"` or `"/gh"`.
    pub prefix: String,
    /// Request case-insensitive lookup. The provider is expected to honor
    /// this; the core itself compares nothing by case.
    pub caseins: bool,
    /// Reserved for copy-on-write overlay layering; currently unused.
    pub overlay: bool,
}
