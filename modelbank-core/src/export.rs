//! Export view maintenance
//!
//! `M#ExportGraph` materializes the merge of a model's own graph, every
//! member resource graph, and the `dcterms:hasPart` membership links.
//! Mutations patch it incrementally (remove-old-then-add-new statements);
//! [`ExportManager::rebuild`] reconstructs it from its sources and is both
//! the recovery path and the oracle the incremental patches are measured
//! against. Every patch rewrites the model's `dcterms:modified` inside the
//! export, which makes the export the freshness authority.

use std::sync::Arc;

use oxrdf::{Graph, NamedNode, Term, Triple};
use tracing::debug;

use modelbank_store::{ConstructQuery, SelectQuery, SparqlStore};
use modelbank_vocab::dcterms;

use crate::error::Result;
use crate::graph;
use crate::names;

/// Maintains the per-model export graphs
#[derive(Debug, Clone)]
pub struct ExportManager {
    store: Arc<dyn SparqlStore>,
}

impl ExportManager {
    pub(crate) fn new(store: Arc<dyn SparqlStore>) -> Self {
        Self { store }
    }

    /// Bootstrap the export view with the model's own content
    pub(crate) async fn initialize(&self, model: &NamedNode, content: &Graph) -> Result<()> {
        self.store
            .put_graph(names::export_graph(model).as_str(), content)
            .await?;
        Ok(())
    }

    /// Add or replace one member's statements in the export view.
    ///
    /// Ensures the `dcterms:hasPart` link is present; inserting it again on
    /// update is a set-level no-op.
    pub(crate) async fn patch_member(
        &self,
        model: &NamedNode,
        resource: &NamedNode,
        content: &Graph,
        at: &str,
    ) -> Result<()> {
        let name = names::export_graph(model);
        let mut export = self.store.get_graph(name.as_str()).await?;
        if export.is_empty() {
            // No view to patch; rebuild is the recovery path.
            debug!(model = %model, "export graph absent, skipping member patch");
            return Ok(());
        }
        remove_member_statements(&mut export, resource);
        graph::merge(&mut export, content);
        graph::insert_link(&mut export, model, dcterms::HAS_PART, resource);
        graph::rewrite_literal(
            &mut export,
            model,
            dcterms::MODIFIED,
            graph::date_time_literal(at),
        );
        self.store.put_graph(name.as_str(), &export).await?;
        Ok(())
    }

    /// Remove one member's statements and its membership link from the
    /// export view
    pub(crate) async fn remove_member(
        &self,
        model: &NamedNode,
        resource: &NamedNode,
        at: &str,
    ) -> Result<()> {
        let name = names::export_graph(model);
        let mut export = self.store.get_graph(name.as_str()).await?;
        if export.is_empty() {
            return Ok(());
        }
        remove_member_statements(&mut export, resource);
        export.remove(&Triple::new(
            model.clone(),
            NamedNode::new_unchecked(dcterms::HAS_PART),
            resource.clone(),
        ));
        graph::rewrite_literal(
            &mut export,
            model,
            dcterms::MODIFIED,
            graph::date_time_literal(at),
        );
        self.store.put_graph(name.as_str(), &export).await?;
        Ok(())
    }

    /// Replace the model's own statements in the export view
    pub(crate) async fn patch_model(
        &self,
        model: &NamedNode,
        content: &Graph,
        at: &str,
    ) -> Result<()> {
        let name = names::export_graph(model);
        let mut export = self.store.get_graph(name.as_str()).await?;
        if export.is_empty() {
            return self.initialize(model, content).await;
        }
        remove_member_statements(&mut export, model);
        graph::merge(&mut export, content);
        graph::rewrite_literal(
            &mut export,
            model,
            dcterms::MODIFIED,
            graph::date_time_literal(at),
        );
        self.store.put_graph(name.as_str(), &export).await?;
        Ok(())
    }

    /// Rebuild the export view from the model graph, the membership index,
    /// and every member graph
    pub async fn rebuild(&self, model: &NamedNode) -> Result<()> {
        let members = self.member_graphs(model).await?;
        let mut graphs = vec![model.clone(), names::has_part_graph(model)];
        graphs.extend(members);
        let union = self
            .store
            .construct(&ConstructQuery::GraphUnion { graphs })
            .await?;
        self.store
            .put_graph(names::export_graph(model).as_str(), &union)
            .await?;
        Ok(())
    }

    /// Member resource graphs of a model.
    ///
    /// A member counts only when the `hasPart` link and the `isDefinedBy`
    /// backlink agree, so half-deleted members drop out.
    pub async fn member_graphs(&self, model: &NamedNode) -> Result<Vec<NamedNode>> {
        let rows = self
            .store
            .select(&SelectQuery::MemberGraphs {
                has_part_graph: names::has_part_graph(model),
                model: model.clone(),
            })
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|mut row| match row.remove("graph") {
                Some(Term::NamedNode(n)) => Some(n),
                _ => None,
            })
            .collect())
    }

    /// The modification timestamp recorded in the export view
    pub async fn last_modified(&self, model: &NamedNode) -> Result<Option<String>> {
        let rows = self
            .store
            .select(&SelectQuery::LastModified {
                export_graph: names::export_graph(model),
            })
            .await?;
        Ok(rows.into_iter().next().and_then(|mut row| {
            match row.remove("date") {
                Some(Term::Literal(l)) => Some(l.value().to_string()),
                _ => None,
            }
        }))
    }
}

/// Remove a subject's statements from the export, RDF collections first.
///
/// `dcterms:language` and `dcterms:relation` carry list values whose cells
/// would become unreachable garbage if the head statement went first.
fn remove_member_statements(export: &mut Graph, subject: &NamedNode) {
    graph::remove_with_lists(export, subject.as_str(), dcterms::LANGUAGE);
    graph::remove_with_lists(export, subject.as_str(), dcterms::RELATION);
    graph::remove_subject(export, subject.as_str());
}
