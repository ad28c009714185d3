//! Service-description registry
//!
//! The core store carries one service-description graph
//! ([`crate::names::SERVICE_DESCRIPTION_GRAPH`]) listing every datamodel
//! graph with a `sd:NamedGraph` entry. Models are registered on creation
//! and deregistered *before* their graphs are dropped, so a listing always
//! points at a graph that existed at listing time.

use std::sync::Arc;

use oxrdf::NamedNode;
use tracing::{debug, warn};

use modelbank_store::{AskQuery, SparqlStore, UpdateOp};

use crate::clock;
use crate::error::Result;
use crate::names;
use crate::predicates;

/// Keeps the service-description graph in step with the models that exist
#[derive(Debug, Clone)]
pub struct ServiceDescription {
    store: Arc<dyn SparqlStore>,
}

impl ServiceDescription {
    pub(crate) fn new(store: Arc<dyn SparqlStore>) -> Self {
        Self { store }
    }

    async fn seeded(&self) -> bool {
        let query = AskQuery::DefaultDescriptionPresent {
            service_graph: names::service_description_graph(),
        };
        match self.store.ask(&query).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "service description probe failed, assuming unseeded");
                false
            }
        }
    }

    /// Create the `sd:Service` skeleton when missing; idempotent
    pub async fn seed_default(&self) -> Result<()> {
        if self.seeded().await {
            return Ok(());
        }
        self.store
            .update(
                &UpdateOp::SeedServiceDescription {
                    service_graph: names::service_description_graph(),
                    at: clock::xsd_date_time_now(),
                }
                .into(),
            )
            .await?;
        Ok(())
    }

    /// List a graph in the service description; no-op when already listed
    pub async fn register(&self, name: &NamedNode) -> Result<()> {
        self.seed_default().await?;
        if predicates::service_graph_listed(&*self.store, name.as_str()).await {
            debug!(graph = %name, "already listed in service description");
            return Ok(());
        }
        self.store
            .update(
                &UpdateOp::AddServiceGraphEntry {
                    service_graph: names::service_description_graph(),
                    name: name.clone(),
                    at: clock::xsd_date_time_now(),
                }
                .into(),
            )
            .await?;
        Ok(())
    }

    /// Remove a graph's entry; absent entries are a no-op
    pub async fn deregister(&self, name: &NamedNode) -> Result<()> {
        self.store
            .update(
                &UpdateOp::RemoveServiceGraphEntry {
                    service_graph: names::service_description_graph(),
                    name: name.clone(),
                }
                .into(),
            )
            .await?;
        Ok(())
    }

    /// Whether a graph is listed; tolerates a trailing `#` on the probe
    pub async fn is_listed(&self, iri: &str) -> bool {
        predicates::service_graph_listed(&*self.store, iri).await
    }
}
