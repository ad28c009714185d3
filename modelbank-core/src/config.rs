//! Registry configuration

use serde::Deserialize;

/// Tunables for the datamodel registry
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Record provenance activity for every mutation.
    ///
    /// When off, provenance calls are silent no-ops even if a provenance
    /// store was supplied.
    pub provenance_enabled: bool,

    /// Depth of the reindex notification queue. Submissions beyond this
    /// are dropped with a warning.
    pub reindex_queue_depth: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            provenance_enabled: true,
            reindex_queue_depth: 256,
        }
    }
}

impl RegistryConfig {
    /// Enable or disable provenance recording
    pub fn with_provenance(mut self, enabled: bool) -> Self {
        self.provenance_enabled = enabled;
        self
    }

    /// Set the reindex queue depth
    pub fn with_reindex_queue_depth(mut self, depth: usize) -> Self {
        self.reindex_queue_depth = depth.max(1);
        self
    }
}
