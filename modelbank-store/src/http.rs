//! HTTP SPARQL store
//!
//! Talks to a remote triple store over the SPARQL 1.1 Protocol (queries and
//! updates) and the SPARQL 1.1 Graph Store HTTP Protocol (whole-graph reads
//! and writes). Queries are rendered from the typed operations in
//! [`crate::ops`]; results come back as SPARQL JSON or N-Triples.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use oxrdf::{BlankNode, Graph, Literal, NamedNode, Term};
use oxttl::NTriplesParser;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use tracing::debug;

use crate::endpoint::ServiceEndpoints;
use crate::error::{Result, StoreError};
use crate::ops::{AskQuery, ConstructQuery, SelectQuery, UpdateRequest};
use crate::{Row, SparqlStore};

const SPARQL_QUERY: &str = "application/sparql-query";
const SPARQL_UPDATE: &str = "application/sparql-update";
const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";
const N_TRIPLES: &str = "application/n-triples";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Store implementation backed by a remote SPARQL endpoint
pub struct HttpSparqlStore {
    client: reqwest::Client,
    endpoints: ServiceEndpoints,
}

impl fmt::Debug for HttpSparqlStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpSparqlStore")
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

impl HttpSparqlStore {
    /// Create a store client with default timeouts
    pub fn new(endpoints: ServiceEndpoints) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StoreError::transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client, endpoints })
    }

    /// Create a store client with a caller-provided `reqwest` client
    pub fn with_client(endpoints: ServiceEndpoints, client: reqwest::Client) -> Self {
        Self { client, endpoints }
    }

    async fn send_query(&self, body: String, accept: &'static str) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(self.endpoints.query_address())
            .header(CONTENT_TYPE, SPARQL_QUERY)
            .header(ACCEPT, accept)
            .body(body)
            .send()
            .await
            .map_err(map_send_error)?;
        require_success(response).await
    }
}

fn map_send_error(e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::timeout(e.to_string())
    } else {
        StoreError::transport(e.to_string())
    }
}

async fn require_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::status(status.as_u16(), body))
}

fn parse_n_triples(bytes: &[u8]) -> Result<Graph> {
    let mut graph = Graph::new();
    for triple in NTriplesParser::new().for_slice(bytes) {
        let triple = triple.map_err(|e| StoreError::payload(e.to_string()))?;
        graph.insert(&triple);
    }
    Ok(graph)
}

// ============================================================================
// SPARQL JSON results
// ============================================================================

#[derive(Debug, Deserialize)]
struct AskResponse {
    boolean: bool,
}

#[derive(Debug, Deserialize)]
struct SelectResponse {
    results: SelectBindings,
}

#[derive(Debug, Deserialize)]
struct SelectBindings {
    bindings: Vec<BTreeMap<String, JsonTerm>>,
}

/// One RDF term in SPARQL JSON results form
#[derive(Debug, Deserialize)]
struct JsonTerm {
    #[serde(rename = "type")]
    kind: String,
    value: String,
    #[serde(default)]
    datatype: Option<String>,
    #[serde(rename = "xml:lang", default)]
    lang: Option<String>,
}

fn term_from_json(term: &JsonTerm) -> Result<Term> {
    match term.kind.as_str() {
        "uri" => {
            let node = NamedNode::new(&term.value)
                .map_err(|e| StoreError::results(format!("bad IRI in results: {e}")))?;
            Ok(Term::from(node))
        }
        "literal" | "typed-literal" => {
            if let Some(lang) = &term.lang {
                let literal = Literal::new_language_tagged_literal(&term.value, lang)
                    .map_err(|e| StoreError::results(format!("bad language tag: {e}")))?;
                Ok(Term::from(literal))
            } else if let Some(datatype) = &term.datatype {
                let datatype = NamedNode::new(datatype)
                    .map_err(|e| StoreError::results(format!("bad datatype IRI: {e}")))?;
                Ok(Term::from(Literal::new_typed_literal(&term.value, datatype)))
            } else {
                Ok(Term::from(Literal::new_simple_literal(&term.value)))
            }
        }
        "bnode" => {
            let node = BlankNode::new(&term.value)
                .map_err(|e| StoreError::results(format!("bad blank node id: {e}")))?;
            Ok(Term::from(node))
        }
        other => Err(StoreError::results(format!("unknown term type '{other}'"))),
    }
}

fn rows_from_response(response: SelectResponse) -> Result<Vec<Row>> {
    let mut rows = Vec::with_capacity(response.results.bindings.len());
    for binding in &response.results.bindings {
        let mut row = Row::new();
        for (var, term) in binding {
            row.insert(var.clone(), term_from_json(term)?);
        }
        rows.push(row);
    }
    Ok(rows)
}

// ============================================================================
// Trait implementation
// ============================================================================

#[async_trait]
impl SparqlStore for HttpSparqlStore {
    async fn ask(&self, query: &AskQuery) -> Result<bool> {
        let response = self
            .send_query(query.to_sparql(), SPARQL_RESULTS_JSON)
            .await?;
        let parsed: AskResponse = response
            .json()
            .await
            .map_err(|e| StoreError::results(format!("bad ASK response: {e}")))?;
        Ok(parsed.boolean)
    }

    async fn select(&self, query: &SelectQuery) -> Result<Vec<Row>> {
        let response = self
            .send_query(query.to_sparql(), SPARQL_RESULTS_JSON)
            .await?;
        let parsed: SelectResponse = response
            .json()
            .await
            .map_err(|e| StoreError::results(format!("bad SELECT response: {e}")))?;
        rows_from_response(parsed)
    }

    async fn construct(&self, query: &ConstructQuery) -> Result<Graph> {
        let response = self.send_query(query.to_sparql(), N_TRIPLES).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| StoreError::payload(e.to_string()))?;
        parse_n_triples(&bytes)
    }

    async fn update(&self, request: &UpdateRequest) -> Result<()> {
        debug!(ops = request.ops.len(), "sending SPARQL update");
        let response = self
            .client
            .post(self.endpoints.update_address())
            .header(CONTENT_TYPE, SPARQL_UPDATE)
            .body(request.to_sparql())
            .send()
            .await
            .map_err(map_send_error)?;
        require_success(response).await?;
        Ok(())
    }

    async fn get_graph(&self, name: &str) -> Result<Graph> {
        let response = self
            .client
            .get(self.endpoints.data_address())
            .query(&[("graph", name)])
            .header(ACCEPT, N_TRIPLES)
            .send()
            .await
            .map_err(map_send_error)?;
        // An absent graph reads as empty.
        if response.status().as_u16() == 404 {
            return Ok(Graph::new());
        }
        let response = require_success(response).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| StoreError::payload(e.to_string()))?;
        parse_n_triples(&bytes)
    }

    async fn put_graph(&self, name: &str, graph: &Graph) -> Result<()> {
        let response = self
            .client
            .put(self.endpoints.data_address())
            .query(&[("graph", name)])
            .header(CONTENT_TYPE, N_TRIPLES)
            .body(graph.to_string())
            .send()
            .await
            .map_err(map_send_error)?;
        require_success(response).await?;
        Ok(())
    }

    async fn add_graph(&self, name: &str, graph: &Graph) -> Result<()> {
        let response = self
            .client
            .post(self.endpoints.data_address())
            .query(&[("graph", name)])
            .header(CONTENT_TYPE, N_TRIPLES)
            .body(graph.to_string())
            .send()
            .await
            .map_err(map_send_error)?;
        require_success(response).await?;
        Ok(())
    }

    async fn drop_graph(&self, name: &str, silent: bool) -> Result<()> {
        let response = self
            .client
            .delete(self.endpoints.data_address())
            .query(&[("graph", name)])
            .send()
            .await
            .map_err(map_send_error)?;
        if response.status().as_u16() == 404 {
            if silent {
                return Ok(());
            }
            return Err(StoreError::graph_not_found(name));
        }
        require_success(response).await?;
        Ok(())
    }

    async fn drop_all(&self) -> Result<()> {
        let response = self
            .client
            .post(self.endpoints.update_address())
            .header(CONTENT_TYPE, SPARQL_UPDATE)
            .body("DROP SILENT ALL")
            .send()
            .await
            .map_err(map_send_error)?;
        require_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== JSON Results Tests ==========

    #[test]
    fn ask_response_parses_boolean() {
        let json = r#"{ "head": {}, "boolean": true }"#;
        let parsed: AskResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.boolean);
    }

    #[test]
    fn select_response_parses_bindings() {
        let json = r#"{
            "head": { "vars": ["graph"] },
            "results": {
                "bindings": [
                    { "graph": { "type": "uri", "value": "http://ex.org/m#r" } }
                ]
            }
        }"#;
        let parsed: SelectResponse = serde_json::from_str(json).unwrap();
        let rows = rows_from_response(parsed).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0]["graph"],
            Term::from(NamedNode::new_unchecked("http://ex.org/m#r"))
        );
    }

    #[test]
    fn json_terms_convert_to_oxrdf_terms() {
        let uri = JsonTerm {
            kind: "uri".into(),
            value: "http://ex.org/m".into(),
            datatype: None,
            lang: None,
        };
        assert_eq!(
            term_from_json(&uri).unwrap(),
            Term::from(NamedNode::new_unchecked("http://ex.org/m"))
        );

        let typed = JsonTerm {
            kind: "literal".into(),
            value: "2024-01-01T00:00:00Z".into(),
            datatype: Some("http://www.w3.org/2001/XMLSchema#dateTime".into()),
            lang: None,
        };
        assert_eq!(
            term_from_json(&typed).unwrap(),
            Term::from(Literal::new_typed_literal(
                "2024-01-01T00:00:00Z",
                NamedNode::new_unchecked("http://www.w3.org/2001/XMLSchema#dateTime"),
            ))
        );

        let tagged = JsonTerm {
            kind: "literal".into(),
            value: "koulutus".into(),
            datatype: None,
            lang: Some("fi".into()),
        };
        assert_eq!(
            term_from_json(&tagged).unwrap(),
            Term::from(Literal::new_language_tagged_literal("koulutus", "fi").unwrap())
        );
    }

    #[test]
    fn unknown_term_type_is_an_error() {
        let odd = JsonTerm {
            kind: "triple".into(),
            value: "x".into(),
            datatype: None,
            lang: None,
        };
        assert!(term_from_json(&odd).is_err());
    }

    // ========== N-Triples Tests ==========

    #[test]
    fn n_triples_payload_parses_into_graph() {
        let body = b"<http://ex.org/m> <http://purl.org/dc/terms/title> \"Example\" .\n";
        let graph = parse_n_triples(body).unwrap();
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn bad_n_triples_payload_is_a_payload_error() {
        let err = parse_n_triples(b"not n-triples").unwrap_err();
        assert!(matches!(err, StoreError::Payload(_)));
    }

    #[test]
    fn empty_payload_is_an_empty_graph() {
        assert!(parse_n_triples(b"").unwrap().is_empty());
    }
}
