//! Typed SPARQL operations
//!
//! Every query and update the registry sends to a backing store is built
//! here as a typed value with named parameters, then rendered to SPARQL 1.1
//! text. The HTTP store sends the rendered text over the wire; the in-memory
//! store evaluates the typed value directly, so the two backends cannot
//! drift apart on which operations exist.
//!
//! Rendered text uses full IRIs throughout; no PREFIX header is emitted.

use oxrdf::{Literal, NamedNode};

use modelbank_vocab::{dcap, dcterms, owl, prov, rdfs, sd, xsd};

// ============================================================================
// Prefix rewriting
// ============================================================================

/// Rewrite an IRI from one string prefix to another.
///
/// Returns `None` when `iri` does not start with `old`. This is a plain
/// string-prefix match, the same rule the rendered SPARQL applies with
/// `strstarts`/`replace`: an IRI under a sibling namespace whose string
/// happens to extend `old` (for example `…/ns/core` vs `…/ns/core2`) is
/// rewritten too. Callers scope the rewrite to the graphs they own.
pub fn rewrite_prefix(iri: &str, old: &str, new: &str) -> Option<String> {
    iri.strip_prefix(old).map(|rest| format!("{new}{rest}"))
}

/// Escape and quote a string for embedding in SPARQL text
fn quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render an `xsd:dateTime` literal from a lexical timestamp
fn date_time(at: &str) -> String {
    Literal::new_typed_literal(at, NamedNode::new_unchecked(xsd::DATE_TIME)).to_string()
}

// ============================================================================
// Graph scope
// ============================================================================

/// Which named graphs a rewrite applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphScope {
    /// A single named graph
    Named(NamedNode),
    /// Every graph whose name starts with the given string
    NameStartsWith(String),
    /// Every named graph in the store
    All,
}

// ============================================================================
// ASK queries
// ============================================================================

/// Boolean probes against the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskQuery {
    /// Does the named graph hold at least one triple?
    GraphNonEmpty { graph: NamedNode },
    /// Is the prefix already claimed by some datamodel graph?
    ModelPrefixTaken { prefix: String },
    /// Does the service description list this graph name?
    ServiceGraphListed {
        service_graph: NamedNode,
        name: NamedNode,
    },
    /// Does the subject carry one of the given status literals?
    StatusIn {
        graph: NamedNode,
        subject: NamedNode,
        values: Vec<String>,
    },
    /// Has the service description skeleton been seeded?
    DefaultDescriptionPresent { service_graph: NamedNode },
}

impl AskQuery {
    pub fn to_sparql(&self) -> String {
        match self {
            AskQuery::GraphNonEmpty { graph } => {
                format!("ASK {{ GRAPH {graph} {{ ?s ?p ?o }} }}")
            }
            AskQuery::ModelPrefixTaken { prefix } => format!(
                "ASK {{ GRAPH ?graph {{ ?graph a <{}> . ?graph <{}> {} }} }}",
                owl::ONTOLOGY,
                dcap::PREFERRED_XML_NAMESPACE_PREFIX,
                quoted(prefix),
            ),
            AskQuery::ServiceGraphListed {
                service_graph,
                name,
            } => format!(
                "ASK {{ GRAPH {service_graph} {{ ?entry <{}> {name} }} }}",
                sd::NAME,
            ),
            AskQuery::StatusIn {
                graph,
                subject,
                values,
            } => {
                let list = values
                    .iter()
                    .map(|v| quoted(v))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "ASK {{ GRAPH {graph} {{ {subject} <{}> ?status . FILTER (?status IN ({list})) }} }}",
                    owl::VERSION_INFO,
                )
            }
            AskQuery::DefaultDescriptionPresent { service_graph } => format!(
                "ASK {{ GRAPH {service_graph} {{ ?service a <{}> }} }}",
                sd::SERVICE,
            ),
        }
    }
}

// ============================================================================
// SELECT queries
// ============================================================================

/// Tabular probes against the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectQuery {
    /// Member resource graphs of a model: `?graph`
    ///
    /// A member counts only when the membership link and the backlink agree,
    /// so graphs that were already dropped fall out of the result.
    MemberGraphs {
        has_part_graph: NamedNode,
        model: NamedNode,
    },
    /// The datamodel graph claiming a prefix, if any: `?graph`
    ModelWithPrefix { prefix: String },
    /// The modification timestamp recorded in an export graph: `?date`
    LastModified { export_graph: NamedNode },
}

impl SelectQuery {
    pub fn to_sparql(&self) -> String {
        match self {
            SelectQuery::MemberGraphs {
                has_part_graph,
                model,
            } => format!(
                "SELECT ?graph WHERE {{ GRAPH {has_part_graph} {{ {model} <{}> ?graph }} GRAPH ?graph {{ ?graph <{}> {model} }} }}",
                dcterms::HAS_PART,
                rdfs::IS_DEFINED_BY,
            ),
            SelectQuery::ModelWithPrefix { prefix } => format!(
                "SELECT ?graph WHERE {{ GRAPH ?graph {{ ?graph a <{}> . ?graph <{}> {} }} }}",
                owl::ONTOLOGY,
                dcap::PREFERRED_XML_NAMESPACE_PREFIX,
                quoted(prefix),
            ),
            SelectQuery::LastModified { export_graph } => format!(
                "SELECT ?date WHERE {{ GRAPH {export_graph} {{ ?model a <{}> . ?model <{}> ?date }} }}",
                owl::ONTOLOGY,
                dcterms::MODIFIED,
            ),
        }
    }
}

// ============================================================================
// CONSTRUCT queries
// ============================================================================

/// Graph-producing probes against the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructQuery {
    /// The union of the listed named graphs, as one triple set
    GraphUnion { graphs: Vec<NamedNode> },
}

impl ConstructQuery {
    pub fn to_sparql(&self) -> String {
        match self {
            ConstructQuery::GraphUnion { graphs } => {
                let values = graphs
                    .iter()
                    .map(|g| g.to_string())
                    .collect::<Vec<_>>()
                    .join(" ");
                format!(
                    "CONSTRUCT {{ ?s ?p ?o }} WHERE {{ VALUES ?g {{ {values} }} GRAPH ?g {{ ?s ?p ?o }} }}"
                )
            }
        }
    }
}

// ============================================================================
// Updates
// ============================================================================

/// A single SPARQL update operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOp {
    /// Record membership of a resource in a model.
    ///
    /// Inserts the `dcterms:hasPart` link into the membership index and the
    /// `rdfs:isDefinedBy` backlink plus creation timestamp into the resource
    /// graph. Guarded: applies only when the resource graph already asserts
    /// a type for the resource, so linking an absent graph is a no-op.
    LinkMember {
        has_part_graph: NamedNode,
        model: NamedNode,
        resource: NamedNode,
        created: String,
    },
    /// Record membership of an already-populated resource graph (link only)
    LinkMemberExisting {
        has_part_graph: NamedNode,
        model: NamedNode,
        resource: NamedNode,
    },
    /// Remove the membership link of a resource
    UnlinkMember {
        has_part_graph: NamedNode,
        model: NamedNode,
        resource: NamedNode,
    },
    /// Point the membership link at a renamed resource
    RenameMemberLink {
        has_part_graph: NamedNode,
        model: NamedNode,
        old: NamedNode,
        new: NamedNode,
    },
    /// Rewrite one subject IRI inside one graph
    RenameSubjects {
        graph: NamedNode,
        old: NamedNode,
        new: NamedNode,
    },
    /// Rewrite one object IRI in every named graph
    RenameObjects { old: NamedNode, new: NamedNode },
    /// Rewrite every object IRI under a namespace prefix
    RewriteObjectsWithPrefix {
        scope: GraphScope,
        old_ns: String,
        new_ns: String,
    },
    /// Rewrite every subject IRI under a namespace prefix
    RewriteSubjectsWithPrefix {
        scope: GraphScope,
        old_ns: String,
        new_ns: String,
    },
    /// Replace a datamodel's namespace metadata literals
    ReplacePrefixMeta {
        graph: NamedNode,
        model: NamedNode,
        prefix: String,
        namespace: String,
    },
    /// Record a forward derivation link in the origin graph
    InsertDerivationLink {
        origin_graph: NamedNode,
        origin: NamedNode,
        derived: NamedNode,
    },
    /// Rewrite a subject's modification timestamp (only where one exists)
    TouchModified {
        graph: NamedNode,
        subject: NamedNode,
        at: String,
    },
    /// Drop a named graph
    DropGraph { graph: NamedNode, silent: bool },
    /// Copy a named graph over another
    CopyGraph {
        from: NamedNode,
        to: NamedNode,
        silent: bool,
    },
    /// Add a named-graph entry to the service description
    AddServiceGraphEntry {
        service_graph: NamedNode,
        name: NamedNode,
        at: String,
    },
    /// Remove a named-graph entry from the service description
    RemoveServiceGraphEntry {
        service_graph: NamedNode,
        name: NamedNode,
    },
    /// Seed the service description skeleton
    SeedServiceDescription {
        service_graph: NamedNode,
        at: String,
    },
    /// Open a provenance activity with its first entity
    CreateActivity {
        graph: NamedNode,
        subject: NamedNode,
        entity: NamedNode,
        actor: NamedNode,
        at: String,
    },
    /// Chain a new provenance entity onto an activity
    AppendEntity {
        graph: NamedNode,
        subject: NamedNode,
        entity: NamedNode,
        actor: NamedNode,
        at: String,
    },
    /// Copy an activity's own triples under a new identifier
    CopyActivity { old: NamedNode, new: NamedNode },
}

impl UpdateOp {
    pub fn to_sparql(&self) -> String {
        match self {
            UpdateOp::LinkMember {
                has_part_graph,
                model,
                resource,
                created,
            } => format!(
                "INSERT {{ GRAPH {hpg} {{ {model} <{has_part}> {resource} }} GRAPH {resource} {{ {resource} <{defined_by}> {model} . {resource} <{created_p}> {ts} }} }} WHERE {{ GRAPH {resource} {{ {resource} a ?type }} }}",
                hpg = has_part_graph,
                has_part = dcterms::HAS_PART,
                defined_by = rdfs::IS_DEFINED_BY,
                created_p = dcterms::CREATED,
                ts = date_time(created),
            ),
            UpdateOp::LinkMemberExisting {
                has_part_graph,
                model,
                resource,
            } => format!(
                "INSERT DATA {{ GRAPH {has_part_graph} {{ {model} <{}> {resource} }} }}",
                dcterms::HAS_PART,
            ),
            UpdateOp::UnlinkMember {
                has_part_graph,
                model,
                resource,
            } => format!(
                "DELETE WHERE {{ GRAPH {has_part_graph} {{ {model} <{}> {resource} }} }}",
                dcterms::HAS_PART,
            ),
            UpdateOp::RenameMemberLink {
                has_part_graph,
                model,
                old,
                new,
            } => format!(
                "DELETE {{ GRAPH {hpg} {{ {model} <{p}> {old} }} }} INSERT {{ GRAPH {hpg} {{ {model} <{p}> {new} }} }} WHERE {{ GRAPH {hpg} {{ {model} <{p}> {old} }} }}",
                hpg = has_part_graph,
                p = dcterms::HAS_PART,
            ),
            UpdateOp::RenameSubjects { graph, old, new } => format!(
                "DELETE {{ GRAPH {graph} {{ {old} ?p ?o }} }} INSERT {{ GRAPH {graph} {{ {new} ?p ?o }} }} WHERE {{ GRAPH {graph} {{ {old} ?p ?o }} }}"
            ),
            UpdateOp::RenameObjects { old, new } => format!(
                "DELETE {{ GRAPH ?g {{ ?s ?p {old} }} }} INSERT {{ GRAPH ?g {{ ?s ?p {new} }} }} WHERE {{ GRAPH ?g {{ ?s ?p {old} }} }}"
            ),
            UpdateOp::RewriteObjectsWithPrefix {
                scope,
                old_ns,
                new_ns,
            } => render_prefix_rewrite(scope, old_ns, new_ns, RewriteSide::Object),
            UpdateOp::RewriteSubjectsWithPrefix {
                scope,
                old_ns,
                new_ns,
            } => render_prefix_rewrite(scope, old_ns, new_ns, RewriteSide::Subject),
            UpdateOp::ReplacePrefixMeta {
                graph,
                model,
                prefix,
                namespace,
            } => format!(
                "DELETE {{ GRAPH {graph} {{ {model} <{pp}> ?oldPrefix . {model} <{pn}> ?oldNamespace }} }} INSERT {{ GRAPH {graph} {{ {model} <{pp}> {prefix} . {model} <{pn}> {namespace} }} }} WHERE {{ GRAPH {graph} {{ {model} <{pp}> ?oldPrefix . {model} <{pn}> ?oldNamespace }} }}",
                pp = dcap::PREFERRED_XML_NAMESPACE_PREFIX,
                pn = dcap::PREFERRED_XML_NAMESPACE_NAME,
                prefix = quoted(prefix),
                namespace = quoted(namespace),
            ),
            UpdateOp::InsertDerivationLink {
                origin_graph,
                origin,
                derived,
            } => format!(
                "INSERT DATA {{ GRAPH {origin_graph} {{ {origin} <{}> {derived} }} }}",
                prov::HAD_DERIVATION,
            ),
            UpdateOp::TouchModified { graph, subject, at } => format!(
                "DELETE {{ GRAPH {graph} {{ {subject} <{p}> ?old }} }} INSERT {{ GRAPH {graph} {{ {subject} <{p}> {ts} }} }} WHERE {{ GRAPH {graph} {{ {subject} <{p}> ?old }} }}",
                p = dcterms::MODIFIED,
                ts = date_time(at),
            ),
            UpdateOp::DropGraph { graph, silent } => {
                if *silent {
                    format!("DROP SILENT GRAPH {graph}")
                } else {
                    format!("DROP GRAPH {graph}")
                }
            }
            UpdateOp::CopyGraph { from, to, silent } => {
                if *silent {
                    format!("COPY SILENT GRAPH {from} TO GRAPH {to}")
                } else {
                    format!("COPY GRAPH {from} TO GRAPH {to}")
                }
            }
            UpdateOp::AddServiceGraphEntry {
                service_graph,
                name,
                at,
            } => format!(
                "INSERT {{ GRAPH {sdg} {{ ?collection <{named_graph}> _:entry . _:entry a <{entry_class}> . _:entry <{name_p}> {name} . _:entry <{created_p}> {ts} }} }} WHERE {{ GRAPH {sdg} {{ ?service <{available}> ?collection }} }}",
                sdg = service_graph,
                named_graph = sd::NAMED_GRAPH,
                entry_class = sd::NAMED_GRAPH_CLASS,
                name_p = sd::NAME,
                created_p = dcterms::CREATED,
                ts = date_time(at),
                available = sd::AVAILABLE_GRAPHS,
            ),
            UpdateOp::RemoveServiceGraphEntry {
                service_graph,
                name,
            } => format!(
                "DELETE {{ GRAPH {sdg} {{ ?collection <{named_graph}> ?entry . ?entry ?p ?o }} }} WHERE {{ GRAPH {sdg} {{ ?collection <{named_graph}> ?entry . ?entry <{name_p}> {name} . ?entry ?p ?o }} }}",
                sdg = service_graph,
                named_graph = sd::NAMED_GRAPH,
                name_p = sd::NAME,
            ),
            UpdateOp::SeedServiceDescription { service_graph, at } => format!(
                "INSERT DATA {{ GRAPH {sdg} {{ _:service a <{service}> . _:service <{default_dataset}> _:dataset . _:dataset a <{dataset}> . _:dataset <{default_graph}> _:default . _:default <{title}> {label} . _:default <{created_p}> {ts} . _:service <{available}> _:collection . _:collection a <{collection}> }} }}",
                sdg = service_graph,
                service = sd::SERVICE,
                default_dataset = sd::DEFAULT_DATASET,
                dataset = sd::DATASET,
                default_graph = sd::DEFAULT_GRAPH,
                title = dcterms::TITLE,
                label = quoted("Default graph"),
                created_p = dcterms::CREATED,
                ts = date_time(at),
                available = sd::AVAILABLE_GRAPHS,
                collection = sd::GRAPH_COLLECTION,
            ),
            UpdateOp::CreateActivity {
                graph,
                subject,
                entity,
                actor,
                at,
            } => format!(
                "INSERT DATA {{ GRAPH {graph} {{ {entity} a <{entity_class}> . {entity} <{attributed}> {actor} . {entity} <{generated_at}> {ts} . {subject} a <{activity}> . {subject} <{started}> {ts} . {subject} <{generated}> {entity} . {subject} <{used}> {entity} . {subject} <{attributed}> {actor} }} }}",
                entity_class = prov::ENTITY,
                attributed = prov::WAS_ATTRIBUTED_TO,
                generated_at = prov::GENERATED_AT_TIME,
                activity = prov::ACTIVITY,
                started = prov::STARTED_AT_TIME,
                generated = prov::GENERATED,
                used = prov::USED,
                ts = date_time(at),
            ),
            UpdateOp::AppendEntity {
                graph,
                subject,
                entity,
                actor,
                at,
            } => format!(
                "DELETE {{ GRAPH {graph} {{ {subject} <{used}> ?previous }} }} INSERT {{ GRAPH {graph} {{ {entity} a <{entity_class}> . {entity} <{attributed}> {actor} . {entity} <{generated_at}> {ts} . {entity} <{revision_of}> ?previous . {subject} <{used}> {entity} }} }} WHERE {{ GRAPH {graph} {{ {subject} <{used}> ?previous }} }}",
                used = prov::USED,
                entity_class = prov::ENTITY,
                attributed = prov::WAS_ATTRIBUTED_TO,
                generated_at = prov::GENERATED_AT_TIME,
                revision_of = prov::WAS_REVISION_OF,
                ts = date_time(at),
            ),
            UpdateOp::CopyActivity { old, new } => format!(
                "INSERT {{ GRAPH {new} {{ {new} ?p ?o }} }} WHERE {{ GRAPH {old} {{ {old} ?p ?o }} }}"
            ),
        }
    }
}

/// Which position of a triple a prefix rewrite targets
enum RewriteSide {
    Subject,
    Object,
}

fn render_prefix_rewrite(
    scope: &GraphScope,
    old_ns: &str,
    new_ns: &str,
    side: RewriteSide,
) -> String {
    let (var, delete_pat, insert_pat) = match side {
        RewriteSide::Subject => ("?s", "?s ?p ?o", "?rewritten ?p ?o"),
        RewriteSide::Object => ("?o", "?s ?p ?o", "?s ?p ?rewritten"),
    };
    let old = quoted(old_ns);
    let new = quoted(new_ns);
    match scope {
        GraphScope::Named(graph) => format!(
            "DELETE {{ GRAPH {graph} {{ {delete_pat} }} }} INSERT {{ GRAPH {graph} {{ {insert_pat} }} }} WHERE {{ GRAPH {graph} {{ ?s ?p ?o }} FILTER (isIRI({var}) && strstarts(str({var}), {old})) BIND (IRI(replace(str({var}), {old}, {new})) AS ?rewritten) }}"
        ),
        GraphScope::NameStartsWith(prefix) => format!(
            "DELETE {{ GRAPH ?g {{ {delete_pat} }} }} INSERT {{ GRAPH ?g {{ {insert_pat} }} }} WHERE {{ GRAPH ?g {{ ?s ?p ?o }} FILTER (strstarts(str(?g), {graph_prefix})) FILTER (isIRI({var}) && strstarts(str({var}), {old})) BIND (IRI(replace(str({var}), {old}, {new})) AS ?rewritten) }}",
            graph_prefix = quoted(prefix),
        ),
        GraphScope::All => format!(
            "DELETE {{ GRAPH ?g {{ {delete_pat} }} }} INSERT {{ GRAPH ?g {{ {insert_pat} }} }} WHERE {{ GRAPH ?g {{ ?s ?p ?o }} FILTER (isIRI({var}) && strstarts(str({var}), {old})) BIND (IRI(replace(str({var}), {old}, {new})) AS ?rewritten) }}"
        ),
    }
}

// ============================================================================
// Update requests
// ============================================================================

/// One or more update operations submitted as a single request.
///
/// Ops render joined by `;`, the SPARQL 1.1 sequencing separator, and the
/// in-memory store applies them in order. Batch removal of a model's graphs
/// rides on this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    pub ops: Vec<UpdateOp>,
}

impl UpdateRequest {
    pub fn new(ops: Vec<UpdateOp>) -> Self {
        Self { ops }
    }

    pub fn to_sparql(&self) -> String {
        self.ops
            .iter()
            .map(|op| op.to_sparql())
            .collect::<Vec<_>>()
            .join(";\n")
    }
}

impl From<UpdateOp> for UpdateRequest {
    fn from(op: UpdateOp) -> Self {
        Self { ops: vec![op] }
    }
}
