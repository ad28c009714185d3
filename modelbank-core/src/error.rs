//! Error types for registry operations

use modelbank_store::StoreError;
use thiserror::Error;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors raised by the datamodel registry
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Backing store failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A model graph with this IRI already exists
    #[error("model already exists: {0}")]
    ModelExists(String),

    /// No model graph with this IRI
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// A resource graph with this IRI already exists
    #[error("resource already exists: {0}")]
    ResourceExists(String),

    /// No resource graph with this IRI
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    /// The namespace prefix is claimed by another model
    #[error("prefix already in use: {0}")]
    PrefixTaken(String),

    /// The model's status forbids removal
    #[error("removal restricted by status: {0}")]
    RemovalRestricted(String),

    /// An IRI does not fit the expected graph layout
    #[error("invalid IRI: {0}")]
    InvalidIri(String),

    /// Cross-instance migration failure
    #[error("migration failed: {0}")]
    Migration(String),
}

impl RegistryError {
    pub fn model_exists(iri: impl Into<String>) -> Self {
        RegistryError::ModelExists(iri.into())
    }

    pub fn model_not_found(iri: impl Into<String>) -> Self {
        RegistryError::ModelNotFound(iri.into())
    }

    pub fn resource_exists(iri: impl Into<String>) -> Self {
        RegistryError::ResourceExists(iri.into())
    }

    pub fn resource_not_found(iri: impl Into<String>) -> Self {
        RegistryError::ResourceNotFound(iri.into())
    }

    pub fn prefix_taken(prefix: impl Into<String>) -> Self {
        RegistryError::PrefixTaken(prefix.into())
    }

    pub fn removal_restricted(iri: impl Into<String>) -> Self {
        RegistryError::RemovalRestricted(iri.into())
    }

    pub fn invalid_iri(message: impl Into<String>) -> Self {
        RegistryError::InvalidIri(message.into())
    }

    pub fn migration(message: impl Into<String>) -> Self {
        RegistryError::Migration(message.into())
    }
}
