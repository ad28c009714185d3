//! SPARQL backing store abstraction for the modelbank graph registry
//!
//! The registry talks to its triple stores through one trait, [`SparqlStore`],
//! covering the two protocols a store exposes:
//!
//! - SPARQL 1.1 Protocol: `ask`, `select`, `construct`, `update`
//! - SPARQL 1.1 Graph Store HTTP Protocol: `get_graph`, `put_graph`,
//!   `add_graph`, `drop_graph`
//!
//! Queries and updates are typed values from [`ops`] that render to SPARQL
//! text. The trait is runtime-agnostic and uses `async_trait`.
//!
//! ## Implementations
//!
//! - [`http::HttpSparqlStore`]: reqwest client for a remote endpoint
//! - [`memory::MemoryStore`]: in-process store for testing
//!
//! There are no cross-graph transactions at this interface. Callers order
//! their writes so that a failure between steps leaves the data in a state
//! they can repair or tolerate.

pub mod endpoint;
pub mod error;
pub mod http;
pub mod memory;
pub mod ops;

use std::collections::BTreeMap;
use std::fmt::Debug;

use async_trait::async_trait;
use oxrdf::{Graph, Term};

pub use endpoint::ServiceEndpoints;
pub use error::{Result, StoreError};
pub use http::HttpSparqlStore;
pub use memory::MemoryStore;
pub use ops::{
    rewrite_prefix, AskQuery, ConstructQuery, GraphScope, SelectQuery, UpdateOp, UpdateRequest,
};

/// One solution row of a SELECT result: variable name to bound term
pub type Row = BTreeMap<String, Term>;

/// A SPARQL 1.1 store holding named graphs
///
/// All methods take `&self`; implementations are internally synchronized and
/// handles are cheap to clone behind an `Arc`.
#[async_trait]
pub trait SparqlStore: Debug + Send + Sync {
    /// Evaluate a boolean query.
    ///
    /// Errors are reported as errors here; the fail-safe "unknown means
    /// absent" reading belongs to the caller, not the store.
    async fn ask(&self, query: &AskQuery) -> Result<bool>;

    /// Evaluate a tabular query
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Row>>;

    /// Evaluate a graph-producing query
    async fn construct(&self, query: &ConstructQuery) -> Result<Graph>;

    /// Apply one or more update operations in order
    async fn update(&self, request: &UpdateRequest) -> Result<()>;

    /// Fetch the triples of a named graph.
    ///
    /// An absent graph reads as an empty graph.
    async fn get_graph(&self, name: &str) -> Result<Graph>;

    /// Create or replace a named graph
    async fn put_graph(&self, name: &str, graph: &Graph) -> Result<()>;

    /// Merge triples into a named graph, creating it if absent
    async fn add_graph(&self, name: &str, graph: &Graph) -> Result<()>;

    /// Remove a named graph.
    ///
    /// With `silent`, dropping an absent graph succeeds; without it, the
    /// store reports [`StoreError::GraphNotFound`].
    async fn drop_graph(&self, name: &str, silent: bool) -> Result<()>;

    /// Remove every named graph in the store
    async fn drop_all(&self) -> Result<()>;
}
