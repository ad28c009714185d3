//! Fail-safe existence predicates
//!
//! Every boolean probe here treats a store failure as `false` and logs the
//! error. Callers read "unknown" as "absent": creation paths that relied on
//! a wrong `false` fail on the spot a step later, deletion paths simply do
//! less work. Failures never surface from this layer.

use modelbank_store::{AskQuery, SelectQuery, SparqlStore};
use oxrdf::{NamedNode, Term};
use tracing::warn;

use crate::names;

async fn ask_or_false(store: &dyn SparqlStore, query: AskQuery) -> bool {
    match store.ask(&query).await {
        Ok(answer) => answer,
        Err(e) => {
            warn!(error = %e, "ASK probe failed, treating as false");
            false
        }
    }
}

/// Does the named graph hold at least one triple?
pub async fn graph_exists(store: &dyn SparqlStore, graph: &NamedNode) -> bool {
    ask_or_false(
        store,
        AskQuery::GraphNonEmpty {
            graph: graph.clone(),
        },
    )
    .await
}

/// Is the namespace prefix already claimed by some model?
pub async fn prefix_taken(store: &dyn SparqlStore, prefix: &str) -> bool {
    ask_or_false(
        store,
        AskQuery::ModelPrefixTaken {
            prefix: prefix.to_string(),
        },
    )
    .await
}

/// The model graph claiming a prefix, `None` when free or unreachable
pub async fn model_with_prefix(store: &dyn SparqlStore, prefix: &str) -> Option<NamedNode> {
    let query = SelectQuery::ModelWithPrefix {
        prefix: prefix.to_string(),
    };
    match store.select(&query).await {
        Ok(rows) => rows.into_iter().next().and_then(|mut row| {
            match row.remove("graph") {
                Some(Term::NamedNode(n)) => Some(n),
                _ => None,
            }
        }),
        Err(e) => {
            warn!(error = %e, "prefix lookup failed, treating as free");
            None
        }
    }
}

/// Does the service description list this graph?
///
/// A trailing `#` on the probe IRI is stripped first, so namespace-form
/// IRIs resolve to their model's entry.
pub async fn service_graph_listed(store: &dyn SparqlStore, iri: &str) -> bool {
    let name = names::strip_trailing_hash(iri);
    ask_or_false(
        store,
        AskQuery::ServiceGraphListed {
            service_graph: names::service_description_graph(),
            name: NamedNode::new_unchecked(name),
        },
    )
    .await
}

/// Does the model's status forbid removal?
pub async fn status_restricts_removal(store: &dyn SparqlStore, model: &NamedNode) -> bool {
    ask_or_false(
        store,
        AskQuery::StatusIn {
            graph: model.clone(),
            subject: model.clone(),
            values: vec![names::status::VALID.to_string()],
        },
    )
    .await
}
