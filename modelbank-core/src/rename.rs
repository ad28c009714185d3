//! Versioning and rename engine
//!
//! Identifier changes are string-prefix IRI rewrites. One rule drives them
//! all: [`modelbank_store::rewrite_prefix`] locally, and the equivalent
//! `strstarts`/`replace` rendering on the wire. An IRI under a sibling
//! namespace whose string happens to extend the old prefix gets rewritten
//! too; that is an accepted property of the scheme, kept narrow by scoping
//! rewrites to the graphs of the model being changed.
//!
//! Three shapes of change live here. A resource rename repairs references
//! after a member changed identifier inside its model. A model rename moves
//! the whole graph family to a new identifier and drops the old one. A
//! version fork clones the family under a new identifier, resets it to
//! draft, and records lineage back to the original.

use oxrdf::{Literal, NamedNode};
use std::sync::Arc;
use tracing::{debug, warn};

use modelbank_store::{
    rewrite_prefix, GraphScope, SparqlStore, UpdateOp, UpdateRequest,
};
use modelbank_vocab::{dcap, owl, prov};

use crate::error::{RegistryError, Result};
use crate::export::ExportManager;
use crate::graph;
use crate::names::{self, status};
use crate::provenance::ProvenanceSync;

/// Applies identifier changes across a model's graph family
#[derive(Debug, Clone)]
pub struct RenameEngine {
    store: Arc<dyn SparqlStore>,
    exports: ExportManager,
    provenance: ProvenanceSync,
}

impl RenameEngine {
    pub(crate) fn new(
        store: Arc<dyn SparqlStore>,
        exports: ExportManager,
        provenance: ProvenanceSync,
    ) -> Self {
        Self {
            store,
            exports,
            provenance,
        }
    }

    /// Repair references after a member resource changed identifier.
    ///
    /// The caller has already written the content under `new`; this drops
    /// the old graph, repoints the membership link, rewrites the position
    /// graph subject, rewrites object references everywhere, and copies the
    /// provenance record onto the new identifier.
    pub(crate) async fn rename_resource(
        &self,
        model: &NamedNode,
        old: &NamedNode,
        new: &NamedNode,
    ) -> Result<()> {
        debug!(model = %model, old = %old, new = %new, "repairing references after resource rename");
        let request = UpdateRequest::new(vec![
            UpdateOp::DropGraph {
                graph: old.clone(),
                silent: true,
            },
            UpdateOp::RenameMemberLink {
                has_part_graph: names::has_part_graph(model),
                model: model.clone(),
                old: old.clone(),
                new: new.clone(),
            },
            UpdateOp::RenameSubjects {
                graph: names::position_graph(model),
                old: old.clone(),
                new: new.clone(),
            },
            UpdateOp::RenameObjects {
                old: old.clone(),
                new: new.clone(),
            },
        ]);
        self.store.update(&request).await?;
        self.provenance.record_renamed(old, new).await?;
        Ok(())
    }

    /// Move a model's whole graph family to a new identifier.
    ///
    /// Copies every family graph under the new name, rewrites identifiers
    /// inside the copies, replaces the prefix metadata, drops the old
    /// family, and rebuilds the export. Members whose IRIs sit outside the
    /// model namespace keep their names; the copied membership link still
    /// reaches them.
    pub(crate) async fn rename_model(
        &self,
        old: &NamedNode,
        new: &NamedNode,
        new_prefix: &str,
    ) -> Result<()> {
        let old_ns = names::namespace_of(old);
        let new_ns = names::namespace_of(new);

        let members = self.exports.member_graphs(old).await?;

        debug!(old = %old, new = %new, members = members.len(), "copying model family");
        let mut copies = vec![
            UpdateOp::CopyGraph {
                from: old.clone(),
                to: new.clone(),
                silent: false,
            },
            UpdateOp::CopyGraph {
                from: names::has_part_graph(old),
                to: names::has_part_graph(new),
                silent: true,
            },
            UpdateOp::CopyGraph {
                from: names::position_graph(old),
                to: names::position_graph(new),
                silent: true,
            },
        ];
        let mut copied_members = Vec::new();
        for member in &members {
            match rewrite_prefix(member.as_str(), &old_ns, &new_ns) {
                Some(target) => {
                    copies.push(UpdateOp::CopyGraph {
                        from: member.clone(),
                        to: NamedNode::new_unchecked(target),
                        silent: true,
                    });
                    copied_members.push(member.clone());
                }
                None => {
                    warn!(member = %member, model = %old, "member outside the model namespace, leaving in place");
                }
            }
        }
        self.store.update(&UpdateRequest::new(copies)).await?;

        debug!(new = %new, "rewriting identifiers in the copied family");
        let scope = GraphScope::NameStartsWith(new.as_str().to_string());
        self.store
            .update(&UpdateRequest::new(vec![
                UpdateOp::RewriteSubjectsWithPrefix {
                    scope: scope.clone(),
                    old_ns: old_ns.clone(),
                    new_ns: new_ns.clone(),
                },
                UpdateOp::RewriteObjectsWithPrefix {
                    scope,
                    old_ns: old_ns.clone(),
                    new_ns: new_ns.clone(),
                },
                UpdateOp::RenameSubjects {
                    graph: new.clone(),
                    old: old.clone(),
                    new: new.clone(),
                },
                UpdateOp::RenameSubjects {
                    graph: names::has_part_graph(new),
                    old: old.clone(),
                    new: new.clone(),
                },
                UpdateOp::RenameObjects {
                    old: old.clone(),
                    new: new.clone(),
                },
                UpdateOp::ReplacePrefixMeta {
                    graph: new.clone(),
                    model: new.clone(),
                    prefix: new_prefix.to_string(),
                    namespace: new_ns.clone(),
                },
            ]))
            .await?;

        debug!(old = %old, "dropping the old family");
        let mut drops = vec![
            UpdateOp::DropGraph {
                graph: old.clone(),
                silent: true,
            },
            UpdateOp::DropGraph {
                graph: names::has_part_graph(old),
                silent: true,
            },
            UpdateOp::DropGraph {
                graph: names::export_graph(old),
                silent: true,
            },
            UpdateOp::DropGraph {
                graph: names::position_graph(old),
                silent: true,
            },
        ];
        for member in copied_members {
            drops.push(UpdateOp::DropGraph {
                graph: member,
                silent: true,
            });
        }
        self.store.update(&UpdateRequest::new(drops)).await?;

        self.exports.rebuild(new).await?;
        self.provenance.record_renamed(old, new).await?;
        Ok(())
    }

    /// Fork a model under a new identifier.
    ///
    /// The fork is always a draft regardless of the original's status. Same
    /// lineage records `prov:wasRevisionOf`; a cross-lineage copy records
    /// `prov:wasDerivedFrom` on the fork and writes `prov:hadDerivation`
    /// into the original graph. Members always point back with
    /// `prov:wasRevisionOf`; absent member graphs are skipped.
    pub(crate) async fn create_version(
        &self,
        old: &NamedNode,
        new: &NamedNode,
        new_prefix: &str,
        same_lineage: bool,
    ) -> Result<()> {
        let old_ns = names::namespace_of(old);
        let new_ns = names::namespace_of(new);
        let rewrite_ref = |iri: &str| -> Option<String> {
            if iri == old.as_str() {
                return Some(new.as_str().to_string());
            }
            rewrite_prefix(iri, &old_ns, &new_ns)
        };

        debug!(old = %old, new = %new, same_lineage, "forking model graph");
        let mut model_graph = self.store.get_graph(old.as_str()).await?;
        if model_graph.is_empty() {
            return Err(RegistryError::model_not_found(old.as_str()));
        }
        graph::rename_subject(&mut model_graph, old, new);
        graph::rewrite_objects(&mut model_graph, rewrite_ref);
        graph::set_literal(
            &mut model_graph,
            new,
            dcap::PREFERRED_XML_NAMESPACE_PREFIX,
            Literal::new_simple_literal(new_prefix),
        );
        graph::set_literal(
            &mut model_graph,
            new,
            dcap::PREFERRED_XML_NAMESPACE_NAME,
            Literal::new_simple_literal(&new_ns),
        );
        graph::set_literal(
            &mut model_graph,
            new,
            owl::VERSION_INFO,
            Literal::new_simple_literal(status::DRAFT),
        );
        let lineage = if same_lineage {
            prov::WAS_REVISION_OF
        } else {
            prov::WAS_DERIVED_FROM
        };
        graph::insert_link(&mut model_graph, new, lineage, old);
        self.store.put_graph(new.as_str(), &model_graph).await?;
        if !same_lineage {
            self.store
                .update(
                    &UpdateOp::InsertDerivationLink {
                        origin_graph: old.clone(),
                        origin: old.clone(),
                        derived: new.clone(),
                    }
                    .into(),
                )
                .await?;
        }

        let mut has_part = self
            .store
            .get_graph(names::has_part_graph(old).as_str())
            .await?;
        graph::rename_subject(&mut has_part, old, new);
        graph::rewrite_objects(&mut has_part, rewrite_ref);
        self.store
            .put_graph(names::has_part_graph(new).as_str(), &has_part)
            .await?;

        let mut positions = self
            .store
            .get_graph(names::position_graph(old).as_str())
            .await?;
        graph::rewrite_subjects(&mut positions, rewrite_ref);
        self.store
            .put_graph(names::position_graph(new).as_str(), &positions)
            .await?;

        let members = self.exports.member_graphs(old).await?;
        let fetches = members.iter().map(|m| self.store.get_graph(m.as_str()));
        let fetched = futures::future::try_join_all(fetches).await?;
        for (member, mut content) in members.iter().zip(fetched) {
            if content.is_empty() {
                debug!(member = %member, "member graph absent, skipping clone");
                continue;
            }
            let Some(target) = rewrite_prefix(member.as_str(), &old_ns, &new_ns) else {
                warn!(member = %member, model = %old, "member outside the model namespace, skipping clone");
                continue;
            };
            let target = NamedNode::new_unchecked(target);
            graph::rename_subject(&mut content, member, &target);
            graph::rewrite_objects(&mut content, rewrite_ref);
            graph::set_literal(
                &mut content,
                &target,
                owl::VERSION_INFO,
                Literal::new_simple_literal(status::DRAFT),
            );
            graph::insert_link(&mut content, &target, prov::WAS_REVISION_OF, member);
            self.store.put_graph(target.as_str(), &content).await?;
        }

        self.exports.rebuild(new).await?;
        Ok(())
    }
}
