//! Graph naming scheme
//!
//! Every datamodel `M` owns a fixed family of named graphs: its own graph,
//! a membership index, a materialized export view, a position graph for UI
//! coordinates, and one graph per member resource under `M#localName`. The
//! suffixes are protocol constants; changing them orphans existing data.

use oxrdf::NamedNode;

use crate::error::{RegistryError, Result};

/// Service-description registry graph in the core store
pub const SERVICE_DESCRIPTION_GRAPH: &str = "urn:csc:iow:sd";

/// Graph holding the schema version counter
pub const VERSION_GRAPH: &str = "urn:yti:metamodel:version";

/// Canonical namespace migrated models are rewritten onto
pub const DEFAULT_NAMESPACE: &str = "http://uri.suomi.fi/datamodel/ns/";

/// Organization assigned to migrated models that carry none
pub const FALLBACK_ORGANIZATION: &str = "urn:uuid:7d3a3c00-5a6b-489b-a3ed-63bb58c26a63";

/// Membership index graph suffix
pub const HAS_PART_GRAPH_SUFFIX: &str = "#HasPartGraph";

/// Materialized export view graph suffix
pub const EXPORT_GRAPH_SUFFIX: &str = "#ExportGraph";

/// UI coordinate graph suffix
pub const POSITION_GRAPH_SUFFIX: &str = "#PositionGraph";

fn suffixed(model: &NamedNode, suffix: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("{}{}", model.as_str(), suffix))
}

/// Membership index graph of a model
pub fn has_part_graph(model: &NamedNode) -> NamedNode {
    suffixed(model, HAS_PART_GRAPH_SUFFIX)
}

/// Export view graph of a model
pub fn export_graph(model: &NamedNode) -> NamedNode {
    suffixed(model, EXPORT_GRAPH_SUFFIX)
}

/// Position graph of a model
pub fn position_graph(model: &NamedNode) -> NamedNode {
    suffixed(model, POSITION_GRAPH_SUFFIX)
}

/// The service-description graph as a node
pub fn service_description_graph() -> NamedNode {
    NamedNode::new_unchecked(SERVICE_DESCRIPTION_GRAPH)
}

/// The version counter graph as a node
pub fn version_graph() -> NamedNode {
    NamedNode::new_unchecked(VERSION_GRAPH)
}

/// The XML namespace a model claims: its IRI plus `#`
pub fn namespace_of(model: &NamedNode) -> String {
    format!("{}#", model.as_str())
}

/// Strip one trailing `#` if present.
///
/// Service-description probes accept namespace-form IRIs.
pub fn strip_trailing_hash(iri: &str) -> &str {
    iri.strip_suffix('#').unwrap_or(iri)
}

/// Whether an IRI names one of the reserved per-model graphs
pub fn is_reserved_graph(iri: &str) -> bool {
    iri.ends_with(HAS_PART_GRAPH_SUFFIX)
        || iri.ends_with(EXPORT_GRAPH_SUFFIX)
        || iri.ends_with(POSITION_GRAPH_SUFFIX)
}

/// Check that a resource IRI sits in its model's namespace and does not
/// collide with a reserved graph name.
pub fn check_member_iri(model: &NamedNode, resource: &NamedNode) -> Result<()> {
    if !resource.as_str().starts_with(&namespace_of(model)) {
        return Err(RegistryError::invalid_iri(format!(
            "{} is not in the namespace of {}",
            resource.as_str(),
            model.as_str()
        )));
    }
    if is_reserved_graph(resource.as_str()) {
        return Err(RegistryError::invalid_iri(format!(
            "{} collides with a reserved graph name",
            resource.as_str()
        )));
    }
    Ok(())
}

/// Lifecycle status literals carried under `owl:versionInfo`
pub mod status {
    /// Working status of new and forked graphs
    pub const DRAFT: &str = "DRAFT";
    /// Published status; restricts removal
    pub const VALID: &str = "VALID";
    /// Replaced by a newer version
    pub const SUPERSEDED: &str = "SUPERSEDED";
}

/// The model IRI of a fragment-form resource IRI, `None` when there is no
/// fragment
pub fn model_of(resource: &NamedNode) -> Option<NamedNode> {
    resource
        .as_str()
        .split_once('#')
        .map(|(model, _)| NamedNode::new_unchecked(model))
}

/// The fragment part of a resource IRI
pub fn local_name(iri: &str) -> Option<&str> {
    iri.split_once('#').map(|(_, local)| local)
}
