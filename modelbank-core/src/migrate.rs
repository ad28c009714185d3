//! Cross-instance migration
//!
//! Pulls model families out of another registry's backing store and writes
//! them into this one through the ordinary orchestrator primitives.
//! Identifiers under the legacy `http://iow.csc.fi/ns/` namespace are
//! rewritten onto the canonical namespace, statuses outside the known
//! vocabulary are normalized to draft, and models without an organization
//! get the fallback one. Provenance history comes along when a source for
//! it is configured.
//!
//! The schema version counter graph records which migrations have run.

use std::sync::Arc;

use oxrdf::{Graph, Literal, NamedNode, Triple};
use tracing::{debug, info, warn};

use modelbank_store::{rewrite_prefix, SparqlStore};
use modelbank_vocab::{dcterms, iow, owl, xsd};

use crate::error::{RegistryError, Result};
use crate::graph;
use crate::names::{self, status};
use crate::orchestrator::Registry;

/// Schema version written by a full migration of this crate's layout
pub const SCHEMA_VERSION: i64 = 5;

/// Namespace used by pre-migration instances
pub const LEGACY_NAMESPACE: &str = "http://iow.csc.fi/ns/";

fn canonical(iri: &str) -> Option<String> {
    rewrite_prefix(iri, LEGACY_NAMESPACE, names::DEFAULT_NAMESPACE)
}

/// The schema version recorded in the counter graph, `None` when unset
pub async fn get_schema_version(store: &dyn SparqlStore) -> Result<Option<i64>> {
    let g = store.get_graph(names::VERSION_GRAPH).await?;
    Ok(graph::first_literal(&g, names::VERSION_GRAPH, iow::VERSION).and_then(|v| v.parse().ok()))
}

/// Replace the recorded schema version
pub async fn set_schema_version(store: &dyn SparqlStore, version: i64) -> Result<()> {
    let mut g = Graph::new();
    g.insert(&Triple::new(
        names::version_graph(),
        NamedNode::new_unchecked(iow::VERSION),
        Literal::new_typed_literal(version.to_string(), NamedNode::new_unchecked(xsd::INTEGER)),
    ));
    store.put_graph(names::VERSION_GRAPH, &g).await?;
    Ok(())
}

/// Copies model families from a source store into a [`Registry`]
#[derive(Debug, Clone)]
pub struct Migrator {
    source: Arc<dyn SparqlStore>,
    provenance_source: Option<Arc<dyn SparqlStore>>,
}

impl Migrator {
    pub fn new(source: Arc<dyn SparqlStore>) -> Self {
        Self {
            source,
            provenance_source: None,
        }
    }

    /// Also migrate provenance history from this store
    pub fn with_provenance_source(mut self, source: Arc<dyn SparqlStore>) -> Self {
        self.provenance_source = Some(source);
        self
    }

    /// Model graph names listed in the source's service description
    pub async fn model_names(&self) -> Result<Vec<NamedNode>> {
        let listing = self
            .source
            .get_graph(names::SERVICE_DESCRIPTION_GRAPH)
            .await?;
        Ok(listing
            .iter()
            .filter(|t| t.predicate.as_str() == modelbank_vocab::sd::NAME)
            .filter_map(|t| graph::object_iri(&t).map(NamedNode::new_unchecked))
            .collect())
    }

    /// Migrate every model the source lists; returns the target identifiers
    pub async fn migrate_all(&self, registry: &Registry) -> Result<Vec<NamedNode>> {
        let models = self.model_names().await?;
        info!(models = models.len(), "starting migration");
        let mut migrated = Vec::with_capacity(models.len());
        for model in models {
            migrated.push(self.migrate_model(registry, &model).await?);
        }
        Ok(migrated)
    }

    /// Copy one model's family from the source into the registry.
    ///
    /// Returns the model's identifier after namespace rewriting.
    pub async fn migrate_model(&self, registry: &Registry, model: &NamedNode) -> Result<NamedNode> {
        let target = canonical(model.as_str())
            .map(NamedNode::new_unchecked)
            .unwrap_or_else(|| model.clone());

        debug!(source = %model, target = %target, "migrating model family");
        let mut model_graph = self.source.get_graph(model.as_str()).await?;
        if model_graph.is_empty() {
            return Err(RegistryError::migration(format!(
                "source holds no graph for listed model {model}"
            )));
        }
        graph::rename_subject(&mut model_graph, model, &target);
        graph::rewrite_subjects(&mut model_graph, canonical);
        graph::rewrite_objects(&mut model_graph, canonical);
        normalize_status(&mut model_graph, &target);
        if !graph::has_statement(&model_graph, target.as_str(), dcterms::CONTRIBUTOR) {
            debug!(model = %target, "no organization on source model, adding fallback");
            graph::insert_link(
                &mut model_graph,
                &target,
                dcterms::CONTRIBUTOR,
                &NamedNode::new_unchecked(names::FALLBACK_ORGANIZATION),
            );
        }

        let mut has_part = self
            .source
            .get_graph(names::has_part_graph(model).as_str())
            .await?;
        let members: Vec<NamedNode> = has_part
            .iter()
            .filter(|t| graph::subject_is(t, model.as_str()) && t.predicate.as_str() == dcterms::HAS_PART)
            .filter_map(|t| graph::object_iri(&t).map(NamedNode::new_unchecked))
            .collect();
        graph::rewrite_subjects(&mut has_part, canonical);
        graph::rewrite_objects(&mut has_part, canonical);

        let mut positions = self
            .source
            .get_graph(names::position_graph(model).as_str())
            .await?;
        graph::rewrite_subjects(&mut positions, canonical);
        graph::rewrite_objects(&mut positions, canonical);

        let mut payload = vec![
            (target.clone(), model_graph),
            (names::has_part_graph(&target), has_part),
            (names::position_graph(&target), positions),
        ];
        let mut record_subjects = vec![(model.clone(), target.clone())];
        for member in members {
            let content = self.source.get_graph(member.as_str()).await?;
            if content.is_empty() {
                warn!(member = %member, "listed member has no graph on the source, skipping");
                continue;
            }
            let member_target = canonical(member.as_str())
                .map(NamedNode::new_unchecked)
                .unwrap_or_else(|| member.clone());
            let mut content = content;
            graph::rename_subject(&mut content, &member, &member_target);
            graph::rewrite_subjects(&mut content, canonical);
            graph::rewrite_objects(&mut content, canonical);
            normalize_status(&mut content, &member_target);
            record_subjects.push((member.clone(), member_target.clone()));
            payload.push((member_target, content));
        }

        registry.import_dataset(&target, &payload).await?;
        registry.rebuild_export(&target).await?;
        registry.service().register(&target).await?;

        if let Some(prov_source) = &self.provenance_source {
            for (original, migrated) in &record_subjects {
                let mut record = prov_source.get_graph(original.as_str()).await?;
                if record.is_empty() {
                    continue;
                }
                graph::rewrite_subjects(&mut record, canonical);
                graph::rewrite_objects(&mut record, canonical);
                registry.provenance().import_record(migrated, &record).await?;
            }
        }

        Ok(target)
    }
}

/// Force the status literal into the known vocabulary; anything else
/// becomes a draft
fn normalize_status(g: &mut Graph, subject: &NamedNode) {
    let known = [status::DRAFT, status::VALID, status::SUPERSEDED];
    let keep = graph::first_literal(g, subject.as_str(), owl::VERSION_INFO)
        .map(|s| known.contains(&s.as_str()))
        .unwrap_or(false);
    if !keep {
        graph::set_literal(
            g,
            subject,
            owl::VERSION_INFO,
            Literal::new_simple_literal(status::DRAFT),
        );
    }
}
