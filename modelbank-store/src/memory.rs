//! In-memory store implementation for testing
//!
//! Holds named graphs in a `BTreeMap` behind `Arc<RwLock>` and evaluates the
//! typed operations from [`crate::ops`] directly against the map, so tests
//! exercise the same operation vocabulary the HTTP store sends over the wire
//! without needing a SPARQL engine. Thread-safe and suitable for
//! multi-threaded async runtimes.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use oxrdf::{BlankNode, Graph, Literal, NamedNode, Term, TermRef, Triple, TripleRef};
use parking_lot::RwLock;

use modelbank_vocab::{dcterms, owl, prov, rdf, sd, xsd};

use crate::error::{Result, StoreError};
use crate::ops::{
    rewrite_prefix, AskQuery, ConstructQuery, GraphScope, SelectQuery, UpdateOp, UpdateRequest,
};
use crate::{Row, SparqlStore};

/// In-memory SPARQL store for testing
#[derive(Clone, Default)]
pub struct MemoryStore {
    graphs: Arc<RwLock<BTreeMap<String, Graph>>>,
}

impl Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let graphs = self.graphs.read();
        let triples: usize = graphs.values().map(|g| g.len()).sum();
        f.debug_struct("MemoryStore")
            .field("graph_count", &graphs.len())
            .field("triple_count", &triples)
            .finish()
    }
}

impl MemoryStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a graph directly, replacing any existing content.
    ///
    /// Convenience for tests to seed fixtures without going through the
    /// async trait.
    pub fn seed(&self, name: &str, graph: Graph) {
        self.graphs.write().insert(name.to_string(), graph);
    }

    /// Snapshot of one named graph, `None` when absent
    pub fn graph(&self, name: &str) -> Option<Graph> {
        self.graphs.read().get(name).cloned()
    }

    /// Names of all graphs currently held
    pub fn graph_names(&self) -> Vec<String> {
        self.graphs.read().keys().cloned().collect()
    }
}

// ============================================================================
// Triple helpers
// ============================================================================

fn subject_iri<'a>(t: &TripleRef<'a>) -> Option<&'a str> {
    match TermRef::from(t.subject) {
        TermRef::NamedNode(n) => Some(n.as_str()),
        _ => None,
    }
}

fn object_iri<'a>(t: &TripleRef<'a>) -> Option<&'a str> {
    match t.object {
        TermRef::NamedNode(n) => Some(n.as_str()),
        _ => None,
    }
}

fn subject_is(t: &TripleRef<'_>, iri: &str) -> bool {
    subject_iri(t) == Some(iri)
}

/// Objects of `subject predicate ?o`, cloned out of the graph
fn objects(g: &Graph, subject: &str, predicate: &str) -> Vec<Term> {
    g.iter()
        .filter(|t| subject_is(t, subject) && t.predicate.as_str() == predicate)
        .map(|t| t.object.into_owned())
        .collect()
}

fn has_type(g: &Graph, subject: &str) -> bool {
    g.iter()
        .any(|t| subject_is(&t, subject) && t.predicate.as_str() == rdf::TYPE)
}

fn t_iri(s: &NamedNode, p: &str, o: &NamedNode) -> Triple {
    Triple::new(s.clone(), NamedNode::new_unchecked(p), o.clone())
}

fn t_term(s: &NamedNode, p: &str, o: Term) -> Triple {
    Triple::new(s.clone(), NamedNode::new_unchecked(p), o)
}

fn date_time(at: &str) -> Literal {
    Literal::new_typed_literal(at, NamedNode::new_unchecked(xsd::DATE_TIME))
}

fn rewrite_graph_objects(g: &mut Graph, rewrite: impl Fn(&str) -> Option<String>) {
    let changes: Vec<(Triple, Triple)> = g
        .iter()
        .filter_map(|t| {
            let rewritten = rewrite(object_iri(&t)?)?;
            let old = t.into_owned();
            let new = Triple::new(
                old.subject.clone(),
                old.predicate.clone(),
                NamedNode::new_unchecked(rewritten),
            );
            Some((old, new))
        })
        .collect();
    for (old, new) in changes {
        g.remove(&old);
        g.insert(&new);
    }
}

fn rewrite_graph_subjects(g: &mut Graph, rewrite: impl Fn(&str) -> Option<String>) {
    let changes: Vec<(Triple, Triple)> = g
        .iter()
        .filter_map(|t| {
            let rewritten = rewrite(subject_iri(&t)?)?;
            let old = t.into_owned();
            let new = Triple::new(
                NamedNode::new_unchecked(rewritten),
                old.predicate.clone(),
                old.object.clone(),
            );
            Some((old, new))
        })
        .collect();
    for (old, new) in changes {
        g.remove(&old);
        g.insert(&new);
    }
}

fn scope_keys(graphs: &BTreeMap<String, Graph>, scope: &GraphScope) -> Vec<String> {
    match scope {
        GraphScope::Named(g) => {
            if graphs.contains_key(g.as_str()) {
                vec![g.as_str().to_string()]
            } else {
                Vec::new()
            }
        }
        GraphScope::NameStartsWith(prefix) => graphs
            .keys()
            .filter(|k| k.starts_with(prefix.as_str()))
            .cloned()
            .collect(),
        GraphScope::All => graphs.keys().cloned().collect(),
    }
}

// ============================================================================
// Query evaluation
// ============================================================================

fn eval_ask(graphs: &BTreeMap<String, Graph>, query: &AskQuery) -> bool {
    match query {
        AskQuery::GraphNonEmpty { graph } => graphs
            .get(graph.as_str())
            .map(|g| !g.is_empty())
            .unwrap_or(false),
        AskQuery::ModelPrefixTaken { prefix } => graphs.iter().any(|(name, g)| {
            is_model_graph(name, g)
                && objects(g, name, modelbank_vocab::dcap::PREFERRED_XML_NAMESPACE_PREFIX)
                    .iter()
                    .any(|o| matches!(o, Term::Literal(l) if l.value() == prefix))
        }),
        AskQuery::ServiceGraphListed {
            service_graph,
            name,
        } => graphs
            .get(service_graph.as_str())
            .map(|g| {
                g.iter().any(|t| {
                    t.predicate.as_str() == sd::NAME && object_iri(&t) == Some(name.as_str())
                })
            })
            .unwrap_or(false),
        AskQuery::StatusIn {
            graph,
            subject,
            values,
        } => graphs
            .get(graph.as_str())
            .map(|g| {
                objects(g, subject.as_str(), owl::VERSION_INFO)
                    .iter()
                    .any(|o| matches!(o, Term::Literal(l) if values.iter().any(|v| v == l.value())))
            })
            .unwrap_or(false),
        AskQuery::DefaultDescriptionPresent { service_graph } => graphs
            .get(service_graph.as_str())
            .map(|g| {
                g.iter().any(|t| {
                    t.predicate.as_str() == rdf::TYPE && object_iri(&t) == Some(sd::SERVICE)
                })
            })
            .unwrap_or(false),
    }
}

fn is_model_graph(name: &str, g: &Graph) -> bool {
    g.iter().any(|t| {
        subject_is(&t, name)
            && t.predicate.as_str() == rdf::TYPE
            && object_iri(&t) == Some(owl::ONTOLOGY)
    })
}

fn eval_select(graphs: &BTreeMap<String, Graph>, query: &SelectQuery) -> Vec<Row> {
    match query {
        SelectQuery::MemberGraphs {
            has_part_graph,
            model,
        } => {
            let Some(hpg) = graphs.get(has_part_graph.as_str()) else {
                return Vec::new();
            };
            let mut rows = Vec::new();
            for member in objects(hpg, model.as_str(), dcterms::HAS_PART) {
                let Term::NamedNode(ref member_node) = member else {
                    continue;
                };
                let linked_back = graphs
                    .get(member_node.as_str())
                    .map(|g| {
                        objects(g, member_node.as_str(), modelbank_vocab::rdfs::IS_DEFINED_BY)
                            .iter()
                            .any(|o| matches!(o, Term::NamedNode(n) if n == model))
                    })
                    .unwrap_or(false);
                if linked_back {
                    let mut row = Row::new();
                    row.insert("graph".to_string(), member);
                    rows.push(row);
                }
            }
            rows
        }
        SelectQuery::ModelWithPrefix { prefix } => graphs
            .iter()
            .filter(|(name, g)| {
                is_model_graph(name, g)
                    && objects(g, name, modelbank_vocab::dcap::PREFERRED_XML_NAMESPACE_PREFIX)
                        .iter()
                        .any(|o| matches!(o, Term::Literal(l) if l.value() == prefix))
            })
            .map(|(name, _)| {
                let mut row = Row::new();
                row.insert(
                    "graph".to_string(),
                    Term::from(NamedNode::new_unchecked(name.clone())),
                );
                row
            })
            .collect(),
        SelectQuery::LastModified { export_graph } => {
            let Some(g) = graphs.get(export_graph.as_str()) else {
                return Vec::new();
            };
            let mut rows = Vec::new();
            let models: Vec<String> = g
                .iter()
                .filter(|t| {
                    t.predicate.as_str() == rdf::TYPE && object_iri(t) == Some(owl::ONTOLOGY)
                })
                .filter_map(|t| subject_iri(&t).map(str::to_string))
                .collect();
            for model in models {
                for date in objects(g, &model, dcterms::MODIFIED) {
                    let mut row = Row::new();
                    row.insert("date".to_string(), date);
                    rows.push(row);
                }
            }
            rows
        }
    }
}

fn eval_construct(graphs: &BTreeMap<String, Graph>, query: &ConstructQuery) -> Graph {
    match query {
        ConstructQuery::GraphUnion { graphs: names } => {
            let mut out = Graph::new();
            for name in names {
                if let Some(g) = graphs.get(name.as_str()) {
                    for t in g.iter() {
                        out.insert(t);
                    }
                }
            }
            out
        }
    }
}

// ============================================================================
// Update evaluation
// ============================================================================

fn apply_op(graphs: &mut BTreeMap<String, Graph>, op: &UpdateOp) -> Result<()> {
    match op {
        UpdateOp::LinkMember {
            has_part_graph,
            model,
            resource,
            created,
        } => {
            let typed = graphs
                .get(resource.as_str())
                .map(|g| has_type(g, resource.as_str()))
                .unwrap_or(false);
            if typed {
                graphs
                    .entry(has_part_graph.as_str().to_string())
                    .or_default()
                    .insert(&t_iri(model, dcterms::HAS_PART, resource));
                let rg = graphs
                    .entry(resource.as_str().to_string())
                    .or_default();
                rg.insert(&t_iri(resource, modelbank_vocab::rdfs::IS_DEFINED_BY, model));
                rg.insert(&t_term(
                    resource,
                    dcterms::CREATED,
                    Term::from(date_time(created)),
                ));
            }
        }
        UpdateOp::LinkMemberExisting {
            has_part_graph,
            model,
            resource,
        } => {
            graphs
                .entry(has_part_graph.as_str().to_string())
                .or_default()
                .insert(&t_iri(model, dcterms::HAS_PART, resource));
        }
        UpdateOp::UnlinkMember {
            has_part_graph,
            model,
            resource,
        } => {
            if let Some(g) = graphs.get_mut(has_part_graph.as_str()) {
                g.remove(&t_iri(model, dcterms::HAS_PART, resource));
            }
        }
        UpdateOp::RenameMemberLink {
            has_part_graph,
            model,
            old,
            new,
        } => {
            if let Some(g) = graphs.get_mut(has_part_graph.as_str()) {
                let old_link = t_iri(model, dcterms::HAS_PART, old);
                if g.contains(&old_link) {
                    g.remove(&old_link);
                    g.insert(&t_iri(model, dcterms::HAS_PART, new));
                }
            }
        }
        UpdateOp::RenameSubjects { graph, old, new } => {
            if let Some(g) = graphs.get_mut(graph.as_str()) {
                rewrite_graph_subjects(g, |s| {
                    (s == old.as_str()).then(|| new.as_str().to_string())
                });
            }
        }
        UpdateOp::RenameObjects { old, new } => {
            for g in graphs.values_mut() {
                rewrite_graph_objects(g, |o| {
                    (o == old.as_str()).then(|| new.as_str().to_string())
                });
            }
        }
        UpdateOp::RewriteObjectsWithPrefix {
            scope,
            old_ns,
            new_ns,
        } => {
            for key in scope_keys(graphs, scope) {
                if let Some(g) = graphs.get_mut(&key) {
                    rewrite_graph_objects(g, |o| rewrite_prefix(o, old_ns, new_ns));
                }
            }
        }
        UpdateOp::RewriteSubjectsWithPrefix {
            scope,
            old_ns,
            new_ns,
        } => {
            for key in scope_keys(graphs, scope) {
                if let Some(g) = graphs.get_mut(&key) {
                    rewrite_graph_subjects(g, |s| rewrite_prefix(s, old_ns, new_ns));
                }
            }
        }
        UpdateOp::ReplacePrefixMeta {
            graph,
            model,
            prefix,
            namespace,
        } => {
            if let Some(g) = graphs.get_mut(graph.as_str()) {
                let old_prefixes = objects(
                    g,
                    model.as_str(),
                    modelbank_vocab::dcap::PREFERRED_XML_NAMESPACE_PREFIX,
                );
                let old_namespaces = objects(
                    g,
                    model.as_str(),
                    modelbank_vocab::dcap::PREFERRED_XML_NAMESPACE_NAME,
                );
                if !old_prefixes.is_empty() && !old_namespaces.is_empty() {
                    for o in old_prefixes {
                        g.remove(&t_term(
                            model,
                            modelbank_vocab::dcap::PREFERRED_XML_NAMESPACE_PREFIX,
                            o,
                        ));
                    }
                    for o in old_namespaces {
                        g.remove(&t_term(
                            model,
                            modelbank_vocab::dcap::PREFERRED_XML_NAMESPACE_NAME,
                            o,
                        ));
                    }
                    g.insert(&t_term(
                        model,
                        modelbank_vocab::dcap::PREFERRED_XML_NAMESPACE_PREFIX,
                        Term::from(Literal::new_simple_literal(prefix.clone())),
                    ));
                    g.insert(&t_term(
                        model,
                        modelbank_vocab::dcap::PREFERRED_XML_NAMESPACE_NAME,
                        Term::from(Literal::new_simple_literal(namespace.clone())),
                    ));
                }
            }
        }
        UpdateOp::InsertDerivationLink {
            origin_graph,
            origin,
            derived,
        } => {
            graphs
                .entry(origin_graph.as_str().to_string())
                .or_default()
                .insert(&t_iri(origin, prov::HAD_DERIVATION, derived));
        }
        UpdateOp::TouchModified { graph, subject, at } => {
            if let Some(g) = graphs.get_mut(graph.as_str()) {
                let olds = objects(g, subject.as_str(), dcterms::MODIFIED);
                if !olds.is_empty() {
                    for o in olds {
                        g.remove(&t_term(subject, dcterms::MODIFIED, o));
                    }
                    g.insert(&t_term(subject, dcterms::MODIFIED, Term::from(date_time(at))));
                }
            }
        }
        UpdateOp::DropGraph { graph, silent } => {
            if graphs.remove(graph.as_str()).is_none() && !silent {
                return Err(StoreError::graph_not_found(graph.as_str()));
            }
        }
        UpdateOp::CopyGraph { from, to, silent } => match graphs.get(from.as_str()).cloned() {
            Some(g) => {
                graphs.insert(to.as_str().to_string(), g);
            }
            None => {
                if !silent {
                    return Err(StoreError::graph_not_found(from.as_str()));
                }
            }
        },
        UpdateOp::AddServiceGraphEntry {
            service_graph,
            name,
            at,
        } => {
            if let Some(g) = graphs.get_mut(service_graph.as_str()) {
                let collection = g
                    .iter()
                    .find(|t| t.predicate.as_str() == sd::AVAILABLE_GRAPHS)
                    .map(|t| t.object.into_owned());
                if let Some(collection) = collection {
                    let entry = BlankNode::default();
                    let link = NamedNode::new_unchecked(sd::NAMED_GRAPH);
                    match collection {
                        Term::NamedNode(c) => {
                            g.insert(&Triple::new(c, link, entry.clone()));
                        }
                        Term::BlankNode(c) => {
                            g.insert(&Triple::new(c, link, entry.clone()));
                        }
                        _ => {}
                    }
                    g.insert(&Triple::new(
                        entry.clone(),
                        NamedNode::new_unchecked(rdf::TYPE),
                        NamedNode::new_unchecked(sd::NAMED_GRAPH_CLASS),
                    ));
                    g.insert(&Triple::new(
                        entry.clone(),
                        NamedNode::new_unchecked(sd::NAME),
                        name.clone(),
                    ));
                    g.insert(&Triple::new(
                        entry,
                        NamedNode::new_unchecked(dcterms::CREATED),
                        date_time(at),
                    ));
                }
            }
        }
        UpdateOp::RemoveServiceGraphEntry {
            service_graph,
            name,
        } => {
            if let Some(g) = graphs.get_mut(service_graph.as_str()) {
                let entries: Vec<Term> = g
                    .iter()
                    .filter(|t| {
                        t.predicate.as_str() == sd::NAME
                            && object_iri(t) == Some(name.as_str())
                    })
                    .map(|t| TermRef::from(t.subject).into_owned())
                    .collect();
                let removals: Vec<Triple> = g
                    .iter()
                    .filter(|t| {
                        let subject_term = TermRef::from(t.subject).into_owned();
                        let object_term = t.object.into_owned();
                        entries.contains(&subject_term)
                            || (t.predicate.as_str() == sd::NAMED_GRAPH
                                && entries.contains(&object_term))
                    })
                    .map(|t| t.into_owned())
                    .collect();
                for t in removals {
                    g.remove(&t);
                }
            }
        }
        UpdateOp::SeedServiceDescription { service_graph, at } => {
            let g = graphs
                .entry(service_graph.as_str().to_string())
                .or_default();
            let service = BlankNode::default();
            let dataset = BlankNode::default();
            let default_graph = BlankNode::default();
            let collection = BlankNode::default();
            g.insert(&Triple::new(
                service.clone(),
                NamedNode::new_unchecked(rdf::TYPE),
                NamedNode::new_unchecked(sd::SERVICE),
            ));
            g.insert(&Triple::new(
                service.clone(),
                NamedNode::new_unchecked(sd::DEFAULT_DATASET),
                dataset.clone(),
            ));
            g.insert(&Triple::new(
                dataset.clone(),
                NamedNode::new_unchecked(rdf::TYPE),
                NamedNode::new_unchecked(sd::DATASET),
            ));
            g.insert(&Triple::new(
                dataset,
                NamedNode::new_unchecked(sd::DEFAULT_GRAPH),
                default_graph.clone(),
            ));
            g.insert(&Triple::new(
                default_graph.clone(),
                NamedNode::new_unchecked(dcterms::TITLE),
                Literal::new_simple_literal("Default graph"),
            ));
            g.insert(&Triple::new(
                default_graph,
                NamedNode::new_unchecked(dcterms::CREATED),
                date_time(at),
            ));
            g.insert(&Triple::new(
                service,
                NamedNode::new_unchecked(sd::AVAILABLE_GRAPHS),
                collection.clone(),
            ));
            g.insert(&Triple::new(
                collection,
                NamedNode::new_unchecked(rdf::TYPE),
                NamedNode::new_unchecked(sd::GRAPH_COLLECTION),
            ));
        }
        UpdateOp::CreateActivity {
            graph,
            subject,
            entity,
            actor,
            at,
        } => {
            let g = graphs.entry(graph.as_str().to_string()).or_default();
            g.insert(&t_iri(entity, rdf::TYPE, &NamedNode::new_unchecked(prov::ENTITY)));
            g.insert(&t_iri(entity, prov::WAS_ATTRIBUTED_TO, actor));
            g.insert(&t_term(
                entity,
                prov::GENERATED_AT_TIME,
                Term::from(date_time(at)),
            ));
            g.insert(&t_iri(
                subject,
                rdf::TYPE,
                &NamedNode::new_unchecked(prov::ACTIVITY),
            ));
            g.insert(&t_term(
                subject,
                prov::STARTED_AT_TIME,
                Term::from(date_time(at)),
            ));
            g.insert(&t_iri(subject, prov::GENERATED, entity));
            g.insert(&t_iri(subject, prov::USED, entity));
            g.insert(&t_iri(subject, prov::WAS_ATTRIBUTED_TO, actor));
        }
        UpdateOp::AppendEntity {
            graph,
            subject,
            entity,
            actor,
            at,
        } => {
            if let Some(g) = graphs.get_mut(graph.as_str()) {
                let previous = objects(g, subject.as_str(), prov::USED);
                let Some(previous) = previous.into_iter().next() else {
                    return Ok(());
                };
                g.remove(&t_term(subject, prov::USED, previous.clone()));
                g.insert(&t_iri(
                    entity,
                    rdf::TYPE,
                    &NamedNode::new_unchecked(prov::ENTITY),
                ));
                g.insert(&t_iri(entity, prov::WAS_ATTRIBUTED_TO, actor));
                g.insert(&t_term(
                    entity,
                    prov::GENERATED_AT_TIME,
                    Term::from(date_time(at)),
                ));
                g.insert(&t_term(entity, prov::WAS_REVISION_OF, previous));
                g.insert(&t_iri(subject, prov::USED, entity));
            }
        }
        UpdateOp::CopyActivity { old, new } => {
            let copied: Vec<Triple> = graphs
                .get(old.as_str())
                .map(|g| {
                    g.iter()
                        .filter(|t| subject_is(t, old.as_str()))
                        .map(|t| {
                            let owned = t.into_owned();
                            Triple::new(new.clone(), owned.predicate, owned.object)
                        })
                        .collect()
                })
                .unwrap_or_default();
            if !copied.is_empty() {
                let g = graphs.entry(new.as_str().to_string()).or_default();
                for t in copied {
                    g.insert(&t);
                }
            }
        }
    }
    Ok(())
}

// ============================================================================
// Trait implementation
// ============================================================================

#[async_trait]
impl SparqlStore for MemoryStore {
    async fn ask(&self, query: &AskQuery) -> Result<bool> {
        Ok(eval_ask(&self.graphs.read(), query))
    }

    async fn select(&self, query: &SelectQuery) -> Result<Vec<Row>> {
        Ok(eval_select(&self.graphs.read(), query))
    }

    async fn construct(&self, query: &ConstructQuery) -> Result<Graph> {
        Ok(eval_construct(&self.graphs.read(), query))
    }

    async fn update(&self, request: &UpdateRequest) -> Result<()> {
        let mut graphs = self.graphs.write();
        for op in &request.ops {
            apply_op(&mut graphs, op)?;
        }
        Ok(())
    }

    async fn get_graph(&self, name: &str) -> Result<Graph> {
        Ok(self.graphs.read().get(name).cloned().unwrap_or_default())
    }

    async fn put_graph(&self, name: &str, graph: &Graph) -> Result<()> {
        self.graphs.write().insert(name.to_string(), graph.clone());
        Ok(())
    }

    async fn add_graph(&self, name: &str, graph: &Graph) -> Result<()> {
        let mut graphs = self.graphs.write();
        let target = graphs.entry(name.to_string()).or_default();
        for t in graph.iter() {
            target.insert(t);
        }
        Ok(())
    }

    async fn drop_graph(&self, name: &str, silent: bool) -> Result<()> {
        if self.graphs.write().remove(name).is_none() && !silent {
            return Err(StoreError::graph_not_found(name));
        }
        Ok(())
    }

    async fn drop_all(&self) -> Result<()> {
        self.graphs.write().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(s: &str) -> NamedNode {
        NamedNode::new_unchecked(s)
    }

    fn lit(s: &str) -> Term {
        Term::from(Literal::new_simple_literal(s))
    }

    const M: &str = "http://ex.org/m";
    const HPG: &str = "http://ex.org/m#HasPartGraph";
    const R: &str = "http://ex.org/m#r";

    fn model_graph() -> Graph {
        let mut g = Graph::new();
        let m = iri(M);
        g.insert(&t_iri(&m, rdf::TYPE, &iri(owl::ONTOLOGY)));
        g.insert(&t_term(
            &m,
            modelbank_vocab::dcap::PREFERRED_XML_NAMESPACE_PREFIX,
            lit("ex"),
        ));
        g
    }

    fn resource_graph() -> Graph {
        let mut g = Graph::new();
        let r = iri(R);
        g.insert(&t_iri(&r, rdf::TYPE, &iri(modelbank_vocab::rdfs::CLASS)));
        g
    }

    // ========== Graph Store Tests ==========

    #[tokio::test]
    async fn absent_graph_reads_as_empty() {
        let store = MemoryStore::new();
        let g = store.get_graph(M).await.unwrap();
        assert!(g.is_empty());
    }

    #[tokio::test]
    async fn put_replaces_and_add_merges() {
        let store = MemoryStore::new();
        store.put_graph(M, &model_graph()).await.unwrap();
        assert_eq!(store.get_graph(M).await.unwrap().len(), 2);

        let mut extra = Graph::new();
        extra.insert(&t_term(&iri(M), dcterms::TITLE, lit("Example")));
        store.add_graph(M, &extra).await.unwrap();
        assert_eq!(store.get_graph(M).await.unwrap().len(), 3);

        store.put_graph(M, &extra).await.unwrap();
        assert_eq!(store.get_graph(M).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn drop_is_silent_only_when_asked() {
        let store = MemoryStore::new();
        store.drop_graph(M, true).await.unwrap();
        assert!(store.drop_graph(M, false).await.is_err());

        store.put_graph(M, &model_graph()).await.unwrap();
        store.drop_graph(M, false).await.unwrap();
        assert!(store.get_graph(M).await.unwrap().is_empty());
    }

    // ========== ASK Tests ==========

    #[tokio::test]
    async fn graph_non_empty_reflects_content() {
        let store = MemoryStore::new();
        let q = AskQuery::GraphNonEmpty { graph: iri(M) };
        assert!(!store.ask(&q).await.unwrap());
        store.put_graph(M, &model_graph()).await.unwrap();
        assert!(store.ask(&q).await.unwrap());
    }

    #[tokio::test]
    async fn prefix_probe_requires_ontology_type() {
        let store = MemoryStore::new();
        let mut g = Graph::new();
        g.insert(&t_term(
            &iri(M),
            modelbank_vocab::dcap::PREFERRED_XML_NAMESPACE_PREFIX,
            lit("ex"),
        ));
        store.put_graph(M, &g).await.unwrap();
        let q = AskQuery::ModelPrefixTaken { prefix: "ex".into() };
        assert!(!store.ask(&q).await.unwrap());

        store.put_graph(M, &model_graph()).await.unwrap();
        assert!(store.ask(&q).await.unwrap());
    }

    // ========== SELECT Tests ==========

    #[tokio::test]
    async fn member_select_requires_link_and_backlink() {
        let store = MemoryStore::new();
        store.put_graph(R, &resource_graph()).await.unwrap();
        let link = UpdateOp::LinkMember {
            has_part_graph: iri(HPG),
            model: iri(M),
            resource: iri(R),
            created: "2024-01-01T00:00:00Z".into(),
        };
        store.update(&link.clone().into()).await.unwrap();

        let q = SelectQuery::MemberGraphs {
            has_part_graph: iri(HPG),
            model: iri(M),
        };
        let rows = store.select(&q).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["graph"], Term::from(iri(R)));

        // Dropping the member graph makes it fall out of the result even
        // though the hasPart link is still present.
        store.drop_graph(R, true).await.unwrap();
        assert!(store.select(&q).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn link_member_is_guarded_by_resource_type() {
        let store = MemoryStore::new();
        let link = UpdateOp::LinkMember {
            has_part_graph: iri(HPG),
            model: iri(M),
            resource: iri(R),
            created: "2024-01-01T00:00:00Z".into(),
        };
        store.update(&link.into()).await.unwrap();
        assert!(store.get_graph(HPG).await.unwrap().is_empty());
    }

    // ========== Update Tests ==========

    #[tokio::test]
    async fn rename_objects_touches_every_graph() {
        let store = MemoryStore::new();
        let mut g1 = Graph::new();
        g1.insert(&t_iri(&iri("http://ex.org/a"), dcterms::RELATION, &iri(R)));
        let mut g2 = Graph::new();
        g2.insert(&t_iri(&iri("http://ex.org/b"), dcterms::REQUIRES, &iri(R)));
        store.put_graph("http://ex.org/g1", &g1).await.unwrap();
        store.put_graph("http://ex.org/g2", &g2).await.unwrap();

        let new = iri("http://ex.org/m#r2");
        store
            .update(&UpdateOp::RenameObjects { old: iri(R), new: new.clone() }.into())
            .await
            .unwrap();

        for name in ["http://ex.org/g1", "http://ex.org/g2"] {
            let g = store.get_graph(name).await.unwrap();
            assert!(g.iter().all(|t| object_iri(&t) != Some(R)));
            assert!(g.iter().any(|t| object_iri(&t) == Some(new.as_str())));
        }
    }

    #[tokio::test]
    async fn prefix_rewrite_respects_graph_scope() {
        let store = MemoryStore::new();
        let mut g = Graph::new();
        g.insert(&t_iri(&iri("http://ex.org/s"), dcterms::REQUIRES, &iri(R)));
        store.put_graph("http://ex.org/in", &g.clone()).await.unwrap();
        store.put_graph("http://other.org/out", &g).await.unwrap();

        let op = UpdateOp::RewriteObjectsWithPrefix {
            scope: GraphScope::NameStartsWith("http://ex.org/".into()),
            old_ns: "http://ex.org/m#".into(),
            new_ns: "http://ex.org/n#".into(),
        };
        store.update(&op.into()).await.unwrap();

        let rewritten = store.get_graph("http://ex.org/in").await.unwrap();
        assert!(rewritten
            .iter()
            .any(|t| object_iri(&t) == Some("http://ex.org/n#r")));
        let untouched = store.get_graph("http://other.org/out").await.unwrap();
        assert!(untouched.iter().any(|t| object_iri(&t) == Some(R)));
    }

    #[tokio::test]
    async fn copy_graph_replaces_target() {
        let store = MemoryStore::new();
        store.put_graph(M, &model_graph()).await.unwrap();
        let op = UpdateOp::CopyGraph {
            from: iri(M),
            to: iri("http://ex.org/n"),
            silent: true,
        };
        store.update(&op.into()).await.unwrap();
        assert_eq!(store.get_graph("http://ex.org/n").await.unwrap().len(), 2);

        // Silent copy from an absent source is a no-op.
        let op = UpdateOp::CopyGraph {
            from: iri("http://ex.org/absent"),
            to: iri("http://ex.org/n"),
            silent: true,
        };
        store.update(&op.into()).await.unwrap();
        assert_eq!(store.get_graph("http://ex.org/n").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn batched_drops_apply_in_order() {
        let store = MemoryStore::new();
        store.put_graph(M, &model_graph()).await.unwrap();
        store.put_graph(R, &resource_graph()).await.unwrap();
        let req = UpdateRequest::new(vec![
            UpdateOp::DropGraph { graph: iri(M), silent: true },
            UpdateOp::DropGraph { graph: iri(R), silent: true },
            UpdateOp::DropGraph { graph: iri("http://ex.org/absent"), silent: true },
        ]);
        store.update(&req).await.unwrap();
        assert!(store.graph_names().is_empty());
    }

    // ========== Service Description Tests ==========

    #[tokio::test]
    async fn service_entries_register_and_deregister() {
        let store = MemoryStore::new();
        let sdg = iri("urn:test:sd");
        store
            .update(
                &UpdateOp::SeedServiceDescription {
                    service_graph: sdg.clone(),
                    at: "2024-01-01T00:00:00Z".into(),
                }
                .into(),
            )
            .await
            .unwrap();
        assert!(store
            .ask(&AskQuery::DefaultDescriptionPresent { service_graph: sdg.clone() })
            .await
            .unwrap());

        let listed = AskQuery::ServiceGraphListed {
            service_graph: sdg.clone(),
            name: iri(M),
        };
        assert!(!store.ask(&listed).await.unwrap());

        store
            .update(
                &UpdateOp::AddServiceGraphEntry {
                    service_graph: sdg.clone(),
                    name: iri(M),
                    at: "2024-01-01T00:00:00Z".into(),
                }
                .into(),
            )
            .await
            .unwrap();
        assert!(store.ask(&listed).await.unwrap());

        store
            .update(
                &UpdateOp::RemoveServiceGraphEntry {
                    service_graph: sdg.clone(),
                    name: iri(M),
                }
                .into(),
            )
            .await
            .unwrap();
        assert!(!store.ask(&listed).await.unwrap());
    }

    // ========== Provenance Tests ==========

    #[tokio::test]
    async fn activity_chain_repoints_used_and_links_revisions() {
        let store = MemoryStore::new();
        let subject = iri(R);
        let actor = iri("mailto:t@example.org");
        let e1 = iri("urn:uuid:1");
        let e2 = iri("urn:uuid:2");

        store
            .update(
                &UpdateOp::CreateActivity {
                    graph: subject.clone(),
                    subject: subject.clone(),
                    entity: e1.clone(),
                    actor: actor.clone(),
                    at: "2024-01-01T00:00:00Z".into(),
                }
                .into(),
            )
            .await
            .unwrap();
        store
            .update(
                &UpdateOp::AppendEntity {
                    graph: subject.clone(),
                    subject: subject.clone(),
                    entity: e2.clone(),
                    actor,
                    at: "2024-01-02T00:00:00Z".into(),
                }
                .into(),
            )
            .await
            .unwrap();

        let g = store.get_graph(R).await.unwrap();
        let used = objects(&g, R, prov::USED);
        assert_eq!(used, vec![Term::from(e2.clone())]);
        let revision = objects(&g, e2.as_str(), prov::WAS_REVISION_OF);
        assert_eq!(revision, vec![Term::from(e1)]);
    }
}
