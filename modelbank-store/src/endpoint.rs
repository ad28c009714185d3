//! Endpoint addresses of a SPARQL service
//!
//! A service exposes three addresses under one base URL, the layout Fuseki
//! and compatible stores use: `…/sparql` for queries, `…/update` for
//! updates, and `…/data` for the Graph Store protocol.

use serde::Deserialize;

/// Addresses of one SPARQL service
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceEndpoints {
    /// Base URL of the service, for example `http://localhost:3030/core`.
    /// A trailing slash is tolerated and stripped.
    pub base_url: String,
}

impl ServiceEndpoints {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// SPARQL 1.1 query address
    pub fn query_address(&self) -> String {
        format!("{}/sparql", self.base_url)
    }

    /// SPARQL 1.1 update address
    pub fn update_address(&self) -> String {
        format!("{}/update", self.base_url)
    }

    /// Graph Store protocol address
    pub fn data_address(&self) -> String {
        format!("{}/data", self.base_url)
    }
}
