//! Model and resource orchestration
//!
//! [`Registry`] is the write surface of the crate. Every mutation is a saga
//! of ordered steps (guards, graph writes, membership index, export patch,
//! registry listing, provenance, reindex) executed under a per-model async
//! mutex, with a `tracing` line per step. Steps are individually idempotent
//! and ordered so that a crash between them leaves either a surplus the
//! next rebuild or delete repairs, or a deficit the next rebuild fills.
//! Cross-process races on the backing store remain possible; the guards
//! check, then act, without a store-side lock.
//!
//! Reads never take the model lock.

use std::collections::HashMap;
use std::sync::Arc;

use oxrdf::{Graph, NamedNode, Triple};
use tracing::debug;

use modelbank_store::{SparqlStore, UpdateOp, UpdateRequest};
use modelbank_vocab::{dcap, dcterms, rdfs};

use crate::clock;
use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::export::ExportManager;
use crate::graph;
use crate::migrate;
use crate::names;
use crate::predicates;
use crate::provenance::ProvenanceSync;
use crate::reindex::{ReindexQueue, ReindexStats, ReindexTask, SearchIndexer};
use crate::rename::RenameEngine;
use crate::service_description::ServiceDescription;

// ============================================================================
// Per-model locks
// ============================================================================

/// One async mutex per model IRI; a mutation holds it for the whole saga
#[derive(Debug, Default)]
struct ModelLocks {
    handles: parking_lot::Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ModelLocks {
    async fn lock(&self, model: &str) -> tokio::sync::OwnedMutexGuard<()> {
        let handle = {
            let mut handles = self.handles.lock();
            handles.entry(model.to_string()).or_default().clone()
        };
        handle.lock_owned().await
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Graph-consistency controller over a SPARQL backing store
#[derive(Debug)]
pub struct Registry {
    store: Arc<dyn SparqlStore>,
    exports: ExportManager,
    renames: RenameEngine,
    provenance: ProvenanceSync,
    service: ServiceDescription,
    reindex: ReindexQueue,
    locks: ModelLocks,
    config: RegistryConfig,
}

impl Registry {
    pub fn new(store: Arc<dyn SparqlStore>) -> Self {
        Self::with_config(store, RegistryConfig::default())
    }

    pub fn with_config(store: Arc<dyn SparqlStore>, config: RegistryConfig) -> Self {
        let exports = ExportManager::new(store.clone());
        let provenance = ProvenanceSync::disabled();
        let renames = RenameEngine::new(store.clone(), exports.clone(), provenance.clone());
        let service = ServiceDescription::new(store.clone());
        Self {
            store,
            exports,
            renames,
            provenance,
            service,
            reindex: ReindexQueue::disabled(),
            locks: ModelLocks::default(),
            config,
        }
    }

    /// Mirror content edits into a provenance endpoint.
    ///
    /// Ignored when the configuration has provenance off.
    pub fn with_provenance(mut self, store: Arc<dyn SparqlStore>) -> Self {
        if !self.config.provenance_enabled {
            return self;
        }
        self.provenance = ProvenanceSync::new(store);
        self.renames = RenameEngine::new(
            self.store.clone(),
            self.exports.clone(),
            self.provenance.clone(),
        );
        self
    }

    /// Wire a search indexer behind the bounded reindex queue
    pub fn with_indexer(mut self, indexer: Arc<dyn SearchIndexer>) -> Self {
        self.reindex = ReindexQueue::start(indexer, self.config.reindex_queue_depth);
        self
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// The model's own graph; empty when absent
    pub async fn model(&self, model: &NamedNode) -> Result<Graph> {
        Ok(self.store.get_graph(model.as_str()).await?)
    }

    /// A member resource's graph; empty when absent
    pub async fn resource(&self, resource: &NamedNode) -> Result<Graph> {
        Ok(self.store.get_graph(resource.as_str()).await?)
    }

    /// The materialized export view; empty when absent
    pub async fn export(&self, model: &NamedNode) -> Result<Graph> {
        Ok(self
            .store
            .get_graph(names::export_graph(model).as_str())
            .await?)
    }

    /// The position graph; empty when absent
    pub async fn positions(&self, model: &NamedNode) -> Result<Graph> {
        Ok(self
            .store
            .get_graph(names::position_graph(model).as_str())
            .await?)
    }

    pub async fn model_exists(&self, model: &NamedNode) -> bool {
        predicates::graph_exists(&*self.store, model).await
    }

    pub async fn model_with_prefix(&self, prefix: &str) -> Option<NamedNode> {
        predicates::model_with_prefix(&*self.store, prefix).await
    }

    pub async fn member_graphs(&self, model: &NamedNode) -> Result<Vec<NamedNode>> {
        self.exports.member_graphs(model).await
    }

    pub async fn last_modified(&self, model: &NamedNode) -> Result<Option<String>> {
        self.exports.last_modified(model).await
    }

    pub fn reindex_stats(&self) -> ReindexStats {
        self.reindex.stats()
    }

    pub(crate) fn service(&self) -> &ServiceDescription {
        &self.service
    }

    pub(crate) fn provenance(&self) -> &ProvenanceSync {
        &self.provenance
    }

    // ========================================================================
    // Model mutations
    // ========================================================================

    /// Create a model with its export view and registry listing
    pub async fn create_model(
        &self,
        model: &NamedNode,
        content: &Graph,
        actor: &NamedNode,
    ) -> Result<()> {
        let _guard = self.locks.lock(model.as_str()).await;

        debug!(model = %model, "create model: checking guards");
        if let Some(prefix) = graph::first_literal(
            content,
            model.as_str(),
            dcap::PREFERRED_XML_NAMESPACE_PREFIX,
        ) {
            if let Some(holder) = predicates::model_with_prefix(&*self.store, &prefix).await {
                if holder != *model {
                    return Err(RegistryError::prefix_taken(prefix));
                }
            }
        }

        let now = clock::xsd_date_time_now();
        let mut stamped = content.clone();
        graph::set_literal(
            &mut stamped,
            model,
            dcterms::CREATED,
            graph::date_time_literal(&now),
        );
        graph::set_literal(
            &mut stamped,
            model,
            dcterms::MODIFIED,
            graph::date_time_literal(&now),
        );

        debug!(model = %model, "create model: writing model graph");
        self.create_if_absent(model, &stamped, RegistryError::model_exists(model.as_str()))
            .await?;
        debug!(model = %model, "create model: bootstrapping export view");
        self.exports.initialize(model, &stamped).await?;
        debug!(model = %model, "create model: registering in service description");
        self.service.register(model).await?;
        self.provenance.record_created(model, actor).await?;
        self.reindex.submit(ReindexTask::IndexModel {
            model: model.clone(),
        });
        Ok(())
    }

    /// Replace a model's own statements, export view first
    pub async fn update_model(
        &self,
        model: &NamedNode,
        content: &Graph,
        actor: &NamedNode,
    ) -> Result<()> {
        let _guard = self.locks.lock(model.as_str()).await;

        if !predicates::graph_exists(&*self.store, model).await {
            return Err(RegistryError::model_not_found(model.as_str()));
        }

        let now = clock::xsd_date_time_now();
        let stored = self.store.get_graph(model.as_str()).await?;
        let mut stamped = content.clone();
        carry_created(&mut stamped, &stored, model, model);
        graph::set_literal(
            &mut stamped,
            model,
            dcterms::MODIFIED,
            graph::date_time_literal(&now),
        );

        debug!(model = %model, "update model: patching export view");
        self.exports.patch_model(model, &stamped, &now).await?;
        debug!(model = %model, "update model: writing model graph");
        self.store.put_graph(model.as_str(), &stamped).await?;
        self.provenance.record_updated(model, actor).await?;
        self.reindex.submit(ReindexTask::IndexModel {
            model: model.clone(),
        });
        Ok(())
    }

    /// Remove a model, its whole graph family, and every member graph.
    ///
    /// Deregisters from the service description before any graph drops, so
    /// the registry never lists a half-deleted model. Idempotent end to end.
    pub async fn delete_model(&self, model: &NamedNode) -> Result<()> {
        let _guard = self.locks.lock(model.as_str()).await;

        debug!(model = %model, "delete model: checking status guard");
        if predicates::status_restricts_removal(&*self.store, model).await {
            return Err(RegistryError::removal_restricted(model.as_str()));
        }

        debug!(model = %model, "delete model: deregistering from service description");
        self.service.deregister(model).await?;

        let members = self.exports.member_graphs(model).await?;
        debug!(model = %model, members = members.len(), "delete model: dropping graph family");
        let mut drops = vec![
            UpdateOp::DropGraph {
                graph: model.clone(),
                silent: true,
            },
            UpdateOp::DropGraph {
                graph: names::has_part_graph(model),
                silent: true,
            },
            UpdateOp::DropGraph {
                graph: names::export_graph(model),
                silent: true,
            },
            UpdateOp::DropGraph {
                graph: names::position_graph(model),
                silent: true,
            },
        ];
        for member in members {
            drops.push(UpdateOp::DropGraph {
                graph: member,
                silent: true,
            });
        }
        self.store.update(&UpdateRequest::new(drops)).await?;

        self.reindex.submit(ReindexTask::RemoveModel {
            model: model.clone(),
        });
        Ok(())
    }

    /// Move a model's graph family to a new identifier
    pub async fn rename_model(
        &self,
        old: &NamedNode,
        new: &NamedNode,
        new_prefix: &str,
    ) -> Result<()> {
        if old == new {
            return Err(RegistryError::invalid_iri(
                "rename target equals the source",
            ));
        }
        let (_g1, _g2) = self.lock_pair(old, new).await;

        debug!(old = %old, new = %new, "rename model: checking guards");
        if !predicates::graph_exists(&*self.store, old).await {
            return Err(RegistryError::model_not_found(old.as_str()));
        }
        if predicates::graph_exists(&*self.store, new).await {
            return Err(RegistryError::model_exists(new.as_str()));
        }
        if let Some(holder) = predicates::model_with_prefix(&*self.store, new_prefix).await {
            if holder != *old {
                return Err(RegistryError::prefix_taken(new_prefix));
            }
        }

        self.renames.rename_model(old, new, new_prefix).await?;

        debug!(old = %old, new = %new, "rename model: swapping registry listing");
        self.service.deregister(old).await?;
        self.service.register(new).await?;

        self.reindex.submit(ReindexTask::RemoveModel { model: old.clone() });
        self.reindex.submit(ReindexTask::IndexModel { model: new.clone() });
        Ok(())
    }

    /// Fork a model under a new identifier; the fork is always a draft
    pub async fn create_version(
        &self,
        old: &NamedNode,
        new: &NamedNode,
        new_prefix: &str,
        same_lineage: bool,
        actor: &NamedNode,
    ) -> Result<()> {
        if old == new {
            return Err(RegistryError::invalid_iri(
                "version target equals the source",
            ));
        }
        let (_g1, _g2) = self.lock_pair(old, new).await;

        debug!(old = %old, new = %new, "create version: checking guards");
        if !predicates::graph_exists(&*self.store, old).await {
            return Err(RegistryError::model_not_found(old.as_str()));
        }
        if predicates::graph_exists(&*self.store, new).await {
            return Err(RegistryError::model_exists(new.as_str()));
        }
        if predicates::prefix_taken(&*self.store, new_prefix).await {
            return Err(RegistryError::prefix_taken(new_prefix));
        }

        self.renames
            .create_version(old, new, new_prefix, same_lineage)
            .await?;

        debug!(new = %new, "create version: registering in service description");
        self.service.register(new).await?;
        self.provenance.record_created(new, actor).await?;
        self.reindex.submit(ReindexTask::IndexModel { model: new.clone() });
        Ok(())
    }

    // ========================================================================
    // Resource mutations
    // ========================================================================

    /// Create a member resource inside a model
    pub async fn create_resource(
        &self,
        model: &NamedNode,
        resource: &NamedNode,
        content: &Graph,
        actor: &NamedNode,
    ) -> Result<()> {
        let _guard = self.locks.lock(model.as_str()).await;

        debug!(model = %model, resource = %resource, "create resource: checking guards");
        names::check_member_iri(model, resource)?;
        if !predicates::graph_exists(&*self.store, model).await {
            return Err(RegistryError::model_not_found(model.as_str()));
        }

        let now = clock::xsd_date_time_now();
        let mut stamped = content.clone();
        graph::insert_link(&mut stamped, resource, rdfs::IS_DEFINED_BY, model);
        graph::set_literal(
            &mut stamped,
            resource,
            dcterms::CREATED,
            graph::date_time_literal(&now),
        );
        graph::set_literal(
            &mut stamped,
            resource,
            dcterms::MODIFIED,
            graph::date_time_literal(&now),
        );

        debug!(resource = %resource, "create resource: writing resource graph");
        self.create_if_absent(
            resource,
            &stamped,
            RegistryError::resource_exists(resource.as_str()),
        )
        .await?;

        debug!(resource = %resource, "create resource: linking into membership index");
        self.store
            .update(
                &UpdateOp::LinkMember {
                    has_part_graph: names::has_part_graph(model),
                    model: model.clone(),
                    resource: resource.clone(),
                    created: now.clone(),
                }
                .into(),
            )
            .await?;

        // Patch the export with what the store now holds, so the view
        // carries exactly the written statements.
        debug!(resource = %resource, "create resource: patching export view");
        let written = self.store.get_graph(resource.as_str()).await?;
        self.exports
            .patch_member(model, resource, &written, &now)
            .await?;

        self.provenance.record_created(resource, actor).await?;
        self.reindex.submit(ReindexTask::IndexResource {
            model: model.clone(),
            resource: resource.clone(),
        });
        Ok(())
    }

    /// Replace a member resource's statements, export view first
    pub async fn update_resource(
        &self,
        model: &NamedNode,
        resource: &NamedNode,
        content: &Graph,
        actor: &NamedNode,
    ) -> Result<()> {
        let _guard = self.locks.lock(model.as_str()).await;

        if !predicates::graph_exists(&*self.store, resource).await {
            return Err(RegistryError::resource_not_found(resource.as_str()));
        }

        let now = clock::xsd_date_time_now();
        let stored = self.store.get_graph(resource.as_str()).await?;
        let mut stamped = content.clone();
        graph::insert_link(&mut stamped, resource, rdfs::IS_DEFINED_BY, model);
        carry_created(&mut stamped, &stored, resource, resource);
        graph::set_literal(
            &mut stamped,
            resource,
            dcterms::MODIFIED,
            graph::date_time_literal(&now),
        );

        debug!(resource = %resource, "update resource: patching export view");
        self.exports
            .patch_member(model, resource, &stamped, &now)
            .await?;
        debug!(resource = %resource, "update resource: writing resource graph");
        self.store.put_graph(resource.as_str(), &stamped).await?;

        self.provenance.record_updated(resource, actor).await?;
        self.reindex.submit(ReindexTask::IndexResource {
            model: model.clone(),
            resource: resource.clone(),
        });
        Ok(())
    }

    /// Replace a member resource's statements under a new identifier.
    ///
    /// Writes the content under `new`, then drops the old graph and repairs
    /// every reference to it (membership link, position graph, object
    /// references, provenance record).
    pub async fn update_resource_with_new_id(
        &self,
        model: &NamedNode,
        old: &NamedNode,
        new: &NamedNode,
        content: &Graph,
        actor: &NamedNode,
    ) -> Result<()> {
        let _guard = self.locks.lock(model.as_str()).await;

        debug!(model = %model, old = %old, new = %new, "rename resource: checking guards");
        names::check_member_iri(model, new)?;
        if !predicates::graph_exists(&*self.store, old).await {
            return Err(RegistryError::resource_not_found(old.as_str()));
        }
        if predicates::graph_exists(&*self.store, new).await {
            return Err(RegistryError::resource_exists(new.as_str()));
        }

        let now = clock::xsd_date_time_now();
        let stored = self.store.get_graph(old.as_str()).await?;
        let mut stamped = content.clone();
        graph::insert_link(&mut stamped, new, rdfs::IS_DEFINED_BY, model);
        carry_created(&mut stamped, &stored, old, new);
        graph::set_literal(
            &mut stamped,
            new,
            dcterms::MODIFIED,
            graph::date_time_literal(&now),
        );

        debug!(old = %old, new = %new, "rename resource: patching export view");
        self.exports.remove_member(model, old, &now).await?;
        self.exports.patch_member(model, new, &stamped, &now).await?;
        debug!(new = %new, "rename resource: writing resource graph");
        self.store.put_graph(new.as_str(), &stamped).await?;

        self.renames.rename_resource(model, old, new).await?;
        self.provenance.record_updated(new, actor).await?;

        self.reindex.submit(ReindexTask::RemoveResource {
            model: model.clone(),
            resource: old.clone(),
        });
        self.reindex.submit(ReindexTask::IndexResource {
            model: model.clone(),
            resource: new.clone(),
        });
        Ok(())
    }

    /// Remove a member resource from its model.
    ///
    /// Idempotent; deleting an absent resource does less work and succeeds.
    /// Provenance is retained.
    pub async fn delete_resource(&self, model: &NamedNode, resource: &NamedNode) -> Result<()> {
        let _guard = self.locks.lock(model.as_str()).await;
        let now = clock::xsd_date_time_now();

        debug!(resource = %resource, "delete resource: patching export view");
        self.exports.remove_member(model, resource, &now).await?;
        debug!(resource = %resource, "delete resource: unlinking membership");
        self.store
            .update(
                &UpdateOp::UnlinkMember {
                    has_part_graph: names::has_part_graph(model),
                    model: model.clone(),
                    resource: resource.clone(),
                }
                .into(),
            )
            .await?;
        debug!(resource = %resource, "delete resource: dropping resource graph");
        self.store.drop_graph(resource.as_str(), true).await?;

        self.reindex.submit(ReindexTask::RemoveResource {
            model: model.clone(),
            resource: resource.clone(),
        });
        Ok(())
    }

    /// Rewrite a subject's `dcterms:modified` to now, where one exists
    pub async fn touch_modified(&self, subject: &NamedNode) -> Result<()> {
        let scope = names::model_of(subject).unwrap_or_else(|| subject.clone());
        let _guard = self.locks.lock(scope.as_str()).await;
        self.store
            .update(
                &UpdateOp::TouchModified {
                    graph: subject.clone(),
                    subject: subject.clone(),
                    at: clock::xsd_date_time_now(),
                }
                .into(),
            )
            .await?;
        Ok(())
    }

    /// Replace a model's position graph
    pub async fn update_positions(&self, model: &NamedNode, content: &Graph) -> Result<()> {
        let _guard = self.locks.lock(model.as_str()).await;
        if !predicates::graph_exists(&*self.store, model).await {
            return Err(RegistryError::model_not_found(model.as_str()));
        }
        self.store
            .put_graph(names::position_graph(model).as_str(), content)
            .await?;
        Ok(())
    }

    /// Rebuild the export view from its sources; the recovery path
    pub async fn rebuild_export(&self, model: &NamedNode) -> Result<()> {
        let _guard = self.locks.lock(model.as_str()).await;
        self.exports.rebuild(model).await
    }

    // ========================================================================
    // Administration
    // ========================================================================

    /// Bulk-load graphs into a model's family.
    ///
    /// `#HasPartGraph` payloads merge into the membership index; everything
    /// else replaces its graph. The target model must exist unless the
    /// payload itself carries the model graph.
    pub async fn import_dataset(
        &self,
        model: &NamedNode,
        graphs: &[(NamedNode, Graph)],
    ) -> Result<()> {
        let _guard = self.locks.lock(model.as_str()).await;

        let payload_creates_model = graphs.iter().any(|(name, _)| name == model);
        if !payload_creates_model && !predicates::graph_exists(&*self.store, model).await {
            return Err(RegistryError::model_not_found(model.as_str()));
        }

        for (name, content) in graphs {
            if name.as_str().ends_with(names::HAS_PART_GRAPH_SUFFIX) {
                debug!(graph = %name, "import: merging membership index");
                self.store.add_graph(name.as_str(), content).await?;
            } else {
                debug!(graph = %name, "import: replacing graph");
                self.store.put_graph(name.as_str(), content).await?;
            }
        }

        self.reindex.submit(ReindexTask::IndexModel {
            model: model.clone(),
        });
        Ok(())
    }

    /// Drop every graph on the core and provenance stores, then re-seed the
    /// service description and the schema version counter
    pub async fn reset(&self) -> Result<()> {
        debug!("reset: dropping all graphs");
        self.store.drop_all().await?;
        self.provenance.clear().await?;
        debug!("reset: seeding service description");
        self.service.seed_default().await?;
        debug!(version = migrate::SCHEMA_VERSION, "reset: seeding schema version");
        migrate::set_schema_version(&*self.store, migrate::SCHEMA_VERSION).await?;
        Ok(())
    }

    /// Guarded create: ASK for the graph, write it only when absent.
    ///
    /// One conceptual operation, but the ASK and the write are separate
    /// store calls; a writer in another process can slip between them.
    async fn create_if_absent(
        &self,
        name: &NamedNode,
        content: &Graph,
        exists: RegistryError,
    ) -> Result<()> {
        if predicates::graph_exists(&*self.store, name).await {
            return Err(exists);
        }
        self.store.put_graph(name.as_str(), content).await?;
        Ok(())
    }

    async fn lock_pair(
        &self,
        a: &NamedNode,
        b: &NamedNode,
    ) -> (
        tokio::sync::OwnedMutexGuard<()>,
        tokio::sync::OwnedMutexGuard<()>,
    ) {
        // Lock in string order so concurrent renames cannot deadlock.
        if a.as_str() <= b.as_str() {
            (
                self.locks.lock(a.as_str()).await,
                self.locks.lock(b.as_str()).await,
            )
        } else {
            let second = self.locks.lock(b.as_str()).await;
            let first = self.locks.lock(a.as_str()).await;
            (first, second)
        }
    }
}

/// Copy `dcterms:created` from `from` in the stored graph onto `to` when
/// the new content lacks one; creation time survives updates and renames.
fn carry_created(stamped: &mut Graph, stored: &Graph, from: &NamedNode, to: &NamedNode) {
    if graph::has_statement(stamped, to.as_str(), dcterms::CREATED) {
        return;
    }
    for created in graph::objects_of(stored, from.as_str(), dcterms::CREATED) {
        stamped.insert(&Triple::new(
            to.clone(),
            NamedNode::new_unchecked(dcterms::CREATED),
            created,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelbank_store::MemoryStore;
    use modelbank_vocab::{owl, rdf};
    use oxrdf::Literal;

    fn iri(s: &str) -> NamedNode {
        NamedNode::new_unchecked(s)
    }

    fn actor() -> NamedNode {
        iri("mailto:tester@example.org")
    }

    fn model_content(model: &NamedNode, prefix: &str) -> Graph {
        let mut g = Graph::new();
        graph::insert_link(&mut g, model, rdf::TYPE, &iri(owl::ONTOLOGY));
        graph::insert_literal(
            &mut g,
            model,
            dcap::PREFERRED_XML_NAMESPACE_PREFIX,
            Literal::new_simple_literal(prefix),
        );
        graph::insert_literal(
            &mut g,
            model,
            dcap::PREFERRED_XML_NAMESPACE_NAME,
            Literal::new_simple_literal(names::namespace_of(model)),
        );
        g
    }

    fn registry() -> (Arc<MemoryStore>, Registry) {
        let store = Arc::new(MemoryStore::new());
        let registry = Registry::new(store.clone());
        (store, registry)
    }

    // ========== Guard Tests ==========

    #[tokio::test]
    async fn creating_the_same_model_twice_is_rejected() {
        let (_store, registry) = registry();
        let m = iri("http://ex.org/core");
        let content = model_content(&m, "core");
        registry.create_model(&m, &content, &actor()).await.unwrap();
        let err = registry
            .create_model(&m, &content, &actor())
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::ModelExists(_)));
    }

    #[tokio::test]
    async fn a_claimed_prefix_blocks_creation() {
        let (_store, registry) = registry();
        let m = iri("http://ex.org/core");
        registry
            .create_model(&m, &model_content(&m, "core"), &actor())
            .await
            .unwrap();

        let other = iri("http://ex.org/other");
        let err = registry
            .create_model(&other, &model_content(&other, "core"), &actor())
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::PrefixTaken(_)));
        assert_eq!(
            registry.model_with_prefix("core").await,
            Some(m)
        );
    }

    #[tokio::test]
    async fn resources_need_an_existing_model() {
        let (_store, registry) = registry();
        let m = iri("http://ex.org/core");
        let r = iri("http://ex.org/core#Widget");
        let err = registry
            .create_resource(&m, &r, &Graph::new(), &actor())
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::ModelNotFound(_)));
    }

    #[tokio::test]
    async fn member_iris_outside_the_model_namespace_are_rejected() {
        let (_store, registry) = registry();
        let m = iri("http://ex.org/core");
        registry
            .create_model(&m, &model_content(&m, "core"), &actor())
            .await
            .unwrap();
        let err = registry
            .create_resource(&m, &iri("http://elsewhere.org/Widget"), &Graph::new(), &actor())
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidIri(_)));
    }

    // ========== Timestamp Tests ==========

    #[tokio::test]
    async fn updates_keep_the_creation_timestamp() {
        let (store, registry) = registry();
        let m = iri("http://ex.org/core");
        registry
            .create_model(&m, &model_content(&m, "core"), &actor())
            .await
            .unwrap();
        let created = graph::first_literal(
            &store.graph(m.as_str()).unwrap(),
            m.as_str(),
            dcterms::CREATED,
        )
        .unwrap();

        registry
            .update_model(&m, &model_content(&m, "core"), &actor())
            .await
            .unwrap();
        let after = store.graph(m.as_str()).unwrap();
        assert_eq!(
            graph::first_literal(&after, m.as_str(), dcterms::CREATED),
            Some(created)
        );
        assert!(graph::has_statement(&after, m.as_str(), dcterms::MODIFIED));
    }

    // ========== Lock Tests ==========

    #[tokio::test]
    async fn model_locks_are_reentrant_across_calls() {
        let locks = ModelLocks::default();
        {
            let _g = locks.lock("http://ex.org/m").await;
        }
        // A dropped guard frees the model for the next saga.
        let _g = locks.lock("http://ex.org/m").await;
    }
}
