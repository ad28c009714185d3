//! Graph-consistency controller for datamodel registries
//!
//! A datamodel lives in a SPARQL 1.1 store as a family of named graphs: the
//! model's own graph `M`, a membership index `M#HasPartGraph`, a
//! materialized export view `M#ExportGraph`, a layout graph
//! `M#PositionGraph`, and one graph per member resource under the model's
//! namespace. This crate keeps the family consistent through every
//! mutation.
//!
//! [`Registry`] is the write surface: guarded, per-model-serialized sagas
//! for creating, updating, renaming, forking, and deleting models and
//! member resources. Around it sit the export maintainer (incremental
//! patches with a full rebuild as recovery path), the rename engine
//! (string-prefix IRI rewriting), the provenance sync (append-only
//! `prov:` records on a second store), the service-description listing,
//! the bounded search-reindex queue, and a cross-instance migrator.
//!
//! Stores are [`modelbank_store::SparqlStore`] handles; the in-memory
//! implementation backs every test in this crate.

pub mod config;
pub mod error;
pub mod export;
pub mod graph;
pub mod migrate;
pub mod names;
pub mod orchestrator;
pub mod predicates;
pub mod provenance;
pub mod reindex;
pub mod rename;
pub mod service_description;

mod clock;

pub use config::RegistryConfig;
pub use error::{RegistryError, Result};
pub use export::ExportManager;
pub use migrate::{get_schema_version, set_schema_version, Migrator, SCHEMA_VERSION};
pub use orchestrator::Registry;
pub use provenance::{actor_from_email, ProvenanceSync};
pub use reindex::{RecordingIndexer, ReindexQueue, ReindexStats, ReindexTask, SearchIndexer};
pub use rename::RenameEngine;
pub use service_description::ServiceDescription;
