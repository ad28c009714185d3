//! Shared harness for modelbank-core integration tests

// Helpers are shared across the integration test crates; not every crate
// references every helper.
#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::Arc;

use oxrdf::{BlankNode, Graph, Literal, NamedNode, Term, TermRef, Triple};

use modelbank_core::{actor_from_email, graph, Registry};
use modelbank_store::MemoryStore;
use modelbank_vocab::{dcap, dcterms, owl, rdf, rdfs};

pub fn iri(s: &str) -> NamedNode {
    NamedNode::new_unchecked(s)
}

pub fn actor() -> NamedNode {
    actor_from_email("editor@example.com")
}

/// Route library logs into the test harness; honors `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn fresh() -> (Registry, Arc<MemoryStore>) {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    (Registry::new(store.clone()), store)
}

/// A minimal datamodel graph: ontology type, label, namespace metadata
pub fn model_content(model: &NamedNode, prefix: &str) -> Graph {
    let mut g = Graph::default();
    graph::insert_link(&mut g, model, rdf::TYPE, &iri(owl::ONTOLOGY));
    graph::insert_literal(&mut g, model, rdfs::LABEL, Literal::new_simple_literal("Library"));
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
        Literal::new_simple_literal(format!("{}#", model.as_str())),
    );
    g
}

/// A minimal member class graph
pub fn class_content(resource: &NamedNode, label: &str) -> Graph {
    let mut g = Graph::default();
    graph::insert_link(&mut g, resource, rdf::TYPE, &iri(rdfs::CLASS));
    graph::insert_literal(&mut g, resource, rdfs::LABEL, Literal::new_simple_literal(label));
    g
}

/// IRI objects of `subject predicate ?o`, sorted
pub fn named_objects(g: &Graph, subject: &str, predicate: &str) -> Vec<String> {
    let mut out: Vec<String> = graph::objects_of(g, subject, predicate)
        .into_iter()
        .filter_map(|term| match term {
            Term::NamedNode(n) => Some(n.as_str().to_string()),
            _ => None,
        })
        .collect();
    out.sort();
    out
}

/// Member graph IRIs of a model, sorted
pub async fn sorted_members(registry: &Registry, model: &NamedNode) -> Vec<String> {
    let mut members: Vec<String> = registry
        .member_graphs(model)
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.as_str().to_string())
        .collect();
    members.sort();
    members
}

/// Triple strings minus every `dcterms:modified` statement; the shape the
/// view equivalence checks compare
pub fn without_modified(g: &Graph) -> BTreeSet<String> {
    g.iter()
        .filter(|t| t.predicate.as_str() != dcterms::MODIFIED)
        .map(|t| t.to_string())
        .collect()
}

/// Insert `subject predicate (cells...)` as an RDF collection with explicit
/// blank-node labels
pub fn insert_list(g: &mut Graph, subject: &NamedNode, predicate: &str, cells: Vec<(&str, Term)>) {
    let mut tail = Term::from(iri(rdf::NIL));
    for (label, value) in cells.into_iter().rev() {
        let cell = BlankNode::new_unchecked(label);
        g.insert(&Triple::new(cell.clone(), iri(rdf::FIRST), value));
        g.insert(&Triple::new(cell.clone(), iri(rdf::REST), tail));
        tail = Term::from(cell);
    }
    g.insert(&Triple::new(subject.clone(), iri(predicate), tail));
}

/// Blank-node subject labels appearing in the graph, in `_:label` form
pub fn blank_subjects(g: &Graph) -> BTreeSet<String> {
    g.iter()
        .map(|t| TermRef::from(t.subject).to_string())
        .filter(|s| s.starts_with("_:"))
        .collect()
}
