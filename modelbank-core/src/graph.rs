//! Graph editing helpers
//!
//! Local edits over fetched [`oxrdf::Graph`] values. The export maintainer
//! and the rename engine work fetch-edit-put: pull a named graph from the
//! store, apply these edits, and write the whole graph back.

use std::collections::HashSet;

use oxrdf::{Graph, Literal, NamedNode, Term, TermRef, Triple, TripleRef};

use modelbank_vocab::rdf;

pub(crate) fn subject_iri<'a>(t: &TripleRef<'a>) -> Option<&'a str> {
    match TermRef::from(t.subject) {
        TermRef::NamedNode(n) => Some(n.as_str()),
        _ => None,
    }
}

pub(crate) fn object_iri<'a>(t: &TripleRef<'a>) -> Option<&'a str> {
    match t.object {
        TermRef::NamedNode(n) => Some(n.as_str()),
        _ => None,
    }
}

pub(crate) fn subject_is(t: &TripleRef<'_>, iri: &str) -> bool {
    subject_iri(t) == Some(iri)
}

/// All objects of `subject predicate ?o`, cloned out of the graph
pub fn objects_of(g: &Graph, subject: &str, predicate: &str) -> Vec<Term> {
    g.iter()
        .filter(|t| subject_is(t, subject) && t.predicate.as_str() == predicate)
        .map(|t| t.object.into_owned())
        .collect()
}

/// First literal object of `subject predicate ?o`
pub fn first_literal(g: &Graph, subject: &str, predicate: &str) -> Option<String> {
    objects_of(g, subject, predicate)
        .into_iter()
        .find_map(|o| match o {
            Term::Literal(l) => Some(l.value().to_string()),
            _ => None,
        })
}

/// Whether any `subject predicate ?o` statement exists
pub fn has_statement(g: &Graph, subject: &str, predicate: &str) -> bool {
    g.iter()
        .any(|t| subject_is(&t, subject) && t.predicate.as_str() == predicate)
}

/// Merge every triple of `from` into `into`
pub fn merge(into: &mut Graph, from: &Graph) {
    for t in from.iter() {
        into.insert(t);
    }
}

/// Insert `subject predicate <object>`
pub fn insert_link(g: &mut Graph, subject: &NamedNode, predicate: &str, object: &NamedNode) {
    g.insert(&Triple::new(
        subject.clone(),
        NamedNode::new_unchecked(predicate),
        object.clone(),
    ));
}

/// Insert `subject predicate "literal"`
pub fn insert_literal(g: &mut Graph, subject: &NamedNode, predicate: &str, value: Literal) {
    g.insert(&Triple::new(
        subject.clone(),
        NamedNode::new_unchecked(predicate),
        value,
    ));
}

/// An `xsd:dateTime` literal from a lexical timestamp
pub fn date_time_literal(at: &str) -> Literal {
    Literal::new_typed_literal(at, NamedNode::new_unchecked(modelbank_vocab::xsd::DATE_TIME))
}

/// Remove every statement whose subject is the given IRI
pub fn remove_subject(g: &mut Graph, subject: &str) {
    let removals: Vec<Triple> = g
        .iter()
        .filter(|t| subject_is(t, subject))
        .map(|t| t.into_owned())
        .collect();
    for t in removals {
        g.remove(&t);
    }
}

/// Remove `subject predicate ?o` statements together with any RDF
/// collection reachable from their objects.
///
/// The `rdf:first`/`rdf:rest` cells are deleted before the head-pointing
/// statements; removing the head first would leave the cells unreachable
/// garbage.
pub fn remove_with_lists(g: &mut Graph, subject: &str, predicate: &str) {
    for head in objects_of(g, subject, predicate) {
        remove_list(g, head);
    }
    let removals: Vec<Triple> = g
        .iter()
        .filter(|t| subject_is(t, subject) && t.predicate.as_str() == predicate)
        .map(|t| t.into_owned())
        .collect();
    for t in removals {
        g.remove(&t);
    }
}

fn remove_list(g: &mut Graph, head: Term) {
    let mut visited: HashSet<Term> = HashSet::new();
    let mut cell = head;
    loop {
        if matches!(&cell, Term::NamedNode(n) if n.as_str() == rdf::NIL) {
            return;
        }
        // Cycle guard for malformed lists
        if !visited.insert(cell.clone()) {
            return;
        }
        let cell_triples: Vec<Triple> = g
            .iter()
            .filter(|t| TermRef::from(t.subject) == cell.as_ref())
            .map(|t| t.into_owned())
            .collect();
        if cell_triples.is_empty() {
            return;
        }
        let mut next = None;
        for t in cell_triples {
            if t.predicate.as_str() == rdf::REST {
                next = Some(t.object.clone());
            }
            g.remove(&t);
        }
        match next {
            Some(n) => cell = n,
            None => return,
        }
    }
}

/// Move every statement of `old` onto the subject `new`
pub fn rename_subject(g: &mut Graph, old: &NamedNode, new: &NamedNode) {
    let moved: Vec<Triple> = g
        .iter()
        .filter(|t| subject_is(t, old.as_str()))
        .map(|t| t.into_owned())
        .collect();
    for t in moved {
        g.remove(&t);
        g.insert(&Triple::new(new.clone(), t.predicate, t.object));
    }
}

/// Rewrite IRI objects through a function; `None` leaves the object alone
pub fn rewrite_objects(g: &mut Graph, rewrite: impl Fn(&str) -> Option<String>) {
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

/// Rewrite IRI subjects through a function; `None` leaves the subject alone
pub fn rewrite_subjects(g: &mut Graph, rewrite: impl Fn(&str) -> Option<String>) {
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

/// Set `subject predicate` to exactly one literal, replacing whatever was
/// there
pub fn set_literal(g: &mut Graph, subject: &NamedNode, predicate: &str, value: Literal) {
    let removals: Vec<Triple> = g
        .iter()
        .filter(|t| subject_is(t, subject.as_str()) && t.predicate.as_str() == predicate)
        .map(|t| t.into_owned())
        .collect();
    for t in removals {
        g.remove(&t);
    }
    insert_literal(g, subject, predicate, value);
}

/// Replace the literal only where one already exists.
///
/// Returns whether a statement was rewritten. Mirrors the guarded
/// `dcterms:modified` rewrite on the wire.
pub fn rewrite_literal(g: &mut Graph, subject: &NamedNode, predicate: &str, value: Literal) -> bool {
    if !has_statement(g, subject.as_str(), predicate) {
        return false;
    }
    set_literal(g, subject, predicate, value);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelbank_vocab::dcterms;
    use oxrdf::BlankNode;

    fn iri(s: &str) -> NamedNode {
        NamedNode::new_unchecked(s)
    }

    const R: &str = "http://ex.org/m#r";

    fn graph_with_language_list() -> Graph {
        // r dcterms:language ( "fi" "en" )
        let mut g = Graph::new();
        let r = iri(R);
        let c1 = BlankNode::default();
        let c2 = BlankNode::default();
        g.insert(&Triple::new(
            r.clone(),
            iri(dcterms::LANGUAGE),
            c1.clone(),
        ));
        g.insert(&Triple::new(
            c1.clone(),
            iri(rdf::FIRST),
            Literal::new_simple_literal("fi"),
        ));
        g.insert(&Triple::new(c1, iri(rdf::REST), c2.clone()));
        g.insert(&Triple::new(
            c2.clone(),
            iri(rdf::FIRST),
            Literal::new_simple_literal("en"),
        ));
        g.insert(&Triple::new(c2, iri(rdf::REST), iri(rdf::NIL)));
        g.insert(&Triple::new(
            r,
            iri(dcterms::TITLE),
            Literal::new_simple_literal("Resource"),
        ));
        g
    }

    // ========== List Removal Tests ==========

    #[test]
    fn list_removal_leaves_no_orphan_cells() {
        let mut g = graph_with_language_list();
        remove_with_lists(&mut g, R, dcterms::LANGUAGE);

        // Only the title statement should remain.
        assert_eq!(g.len(), 1);
        assert!(has_statement(&g, R, dcterms::TITLE));
        assert!(g.iter().all(|t| t.predicate.as_str() != rdf::FIRST));
        assert!(g.iter().all(|t| t.predicate.as_str() != rdf::REST));
    }

    #[test]
    fn list_removal_tolerates_missing_list() {
        let mut g = Graph::new();
        insert_literal(
            &mut g,
            &iri(R),
            dcterms::TITLE,
            Literal::new_simple_literal("x"),
        );
        remove_with_lists(&mut g, R, dcterms::LANGUAGE);
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn list_removal_stops_on_cycles() {
        // c1 rest c2, c2 rest c1
        let mut g = Graph::new();
        let r = iri(R);
        let c1 = BlankNode::default();
        let c2 = BlankNode::default();
        g.insert(&Triple::new(r, iri(dcterms::LANGUAGE), c1.clone()));
        g.insert(&Triple::new(c1.clone(), iri(rdf::REST), c2.clone()));
        g.insert(&Triple::new(c2, iri(rdf::REST), c1));
        remove_with_lists(&mut g, R, dcterms::LANGUAGE);
        assert!(g.is_empty());
    }

    // ========== Subject Edit Tests ==========

    #[test]
    fn rename_subject_moves_all_statements() {
        let mut g = Graph::new();
        let old = iri(R);
        let new = iri("http://ex.org/m#r2");
        insert_literal(&mut g, &old, dcterms::TITLE, Literal::new_simple_literal("x"));
        insert_link(&mut g, &old, dcterms::IS_PART_OF, &iri("http://ex.org/m"));

        rename_subject(&mut g, &old, &new);

        assert!(!g.iter().any(|t| subject_is(&t, R)));
        assert!(has_statement(&g, new.as_str(), dcterms::TITLE));
        assert!(has_statement(&g, new.as_str(), dcterms::IS_PART_OF));
    }

    #[test]
    fn remove_subject_leaves_other_subjects() {
        let mut g = Graph::new();
        insert_literal(&mut g, &iri(R), dcterms::TITLE, Literal::new_simple_literal("a"));
        insert_literal(
            &mut g,
            &iri("http://ex.org/m#s"),
            dcterms::TITLE,
            Literal::new_simple_literal("b"),
        );
        remove_subject(&mut g, R);
        assert_eq!(g.len(), 1);
    }

    // ========== Rewrite Tests ==========

    #[test]
    fn object_rewrites_skip_literals() {
        let mut g = Graph::new();
        let s = iri("http://ex.org/s");
        insert_link(&mut g, &s, dcterms::RELATION, &iri("http://ex.org/m#a"));
        insert_literal(
            &mut g,
            &s,
            dcterms::TITLE,
            Literal::new_simple_literal("http://ex.org/m#a"),
        );

        rewrite_objects(&mut g, |o| {
            modelbank_store::rewrite_prefix(o, "http://ex.org/m#", "http://ex.org/n#")
        });

        assert!(g
            .iter()
            .any(|t| object_iri(&t) == Some("http://ex.org/n#a")));
        // The literal spelling stays untouched.
        assert_eq!(
            first_literal(&g, s.as_str(), dcterms::TITLE),
            Some("http://ex.org/m#a".to_string())
        );
    }

    #[test]
    fn guarded_literal_rewrite_requires_existing_statement() {
        let mut g = Graph::new();
        let m = iri("http://ex.org/m");
        assert!(!rewrite_literal(
            &mut g,
            &m,
            dcterms::MODIFIED,
            date_time_literal("2024-01-02T00:00:00Z"),
        ));

        insert_literal(
            &mut g,
            &m,
            dcterms::MODIFIED,
            date_time_literal("2024-01-01T00:00:00Z"),
        );
        assert!(rewrite_literal(
            &mut g,
            &m,
            dcterms::MODIFIED,
            date_time_literal("2024-01-02T00:00:00Z"),
        ));
        assert_eq!(g.len(), 1);
    }
}
