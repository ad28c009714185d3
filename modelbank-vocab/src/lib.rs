//! RDF Vocabulary Constants for Modelbank
//!
//! This crate provides a centralized location for the vocabulary IRIs used
//! throughout the modelbank graph registry: the core description vocabularies
//! (RDF, RDFS, OWL, Dublin Core), the DCAP application-profile terms that
//! carry a datamodel's namespace metadata, the W3C provenance vocabulary used
//! by the shadow store, and the SPARQL Service Description vocabulary used by
//! the graph registry.
//!
//! # Organization
//!
//! Constants are organized by vocabulary:
//! - `rdf` - RDF vocabulary (http://www.w3.org/1999/02/22-rdf-syntax-ns#)
//! - `rdfs` - RDFS vocabulary (http://www.w3.org/2000/01/rdf-schema#)
//! - `xsd` - XSD vocabulary (http://www.w3.org/2001/XMLSchema#)
//! - `owl` - OWL vocabulary (http://www.w3.org/2002/07/owl#)
//! - `dcterms` - Dublin Core terms (http://purl.org/dc/terms/)
//! - `dcap` - DCAP metamodel terms (http://purl.org/ws-mmi-dc/terms/)
//! - `prov` - W3C PROV-O (http://www.w3.org/ns/prov#)
//! - `sd` - SPARQL 1.1 Service Description (http://www.w3.org/ns/sparql-service-description#)
//! - `iow` - Instance-local metamodel terms (http://uri.suomi.fi/datamodel/ns/iow#)

/// RDF vocabulary constants
pub mod rdf {
    /// Namespace IRI
    pub const NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

    /// rdf:type IRI
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

    /// rdf:first IRI (RDF list head)
    pub const FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";

    /// rdf:rest IRI (RDF list tail)
    pub const REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";

    /// rdf:nil IRI (RDF list terminator)
    pub const NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
}

/// RDFS vocabulary constants
pub mod rdfs {
    /// Namespace IRI
    pub const NS: &str = "http://www.w3.org/2000/01/rdf-schema#";

    /// rdfs:label IRI
    pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";

    /// rdfs:comment IRI
    pub const COMMENT: &str = "http://www.w3.org/2000/01/rdf-schema#comment";

    /// rdfs:isDefinedBy IRI (resource-to-model backlink)
    pub const IS_DEFINED_BY: &str = "http://www.w3.org/2000/01/rdf-schema#isDefinedBy";

    /// rdfs:Class IRI
    pub const CLASS: &str = "http://www.w3.org/2000/01/rdf-schema#Class";
}

/// XSD vocabulary constants
pub mod xsd {
    /// Namespace IRI
    pub const NS: &str = "http://www.w3.org/2001/XMLSchema#";

    /// xsd:string IRI
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

    /// xsd:boolean IRI
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";

    /// xsd:integer IRI
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";

    /// xsd:dateTime IRI
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";

    /// xsd:anyURI IRI
    pub const ANY_URI: &str = "http://www.w3.org/2001/XMLSchema#anyURI";
}

/// OWL vocabulary constants
pub mod owl {
    /// Namespace IRI
    pub const NS: &str = "http://www.w3.org/2002/07/owl#";

    /// owl:Ontology IRI (the type every datamodel graph carries)
    pub const ONTOLOGY: &str = "http://www.w3.org/2002/07/owl#Ontology";

    /// owl:versionInfo IRI (status literal: DRAFT, VALID, ...)
    pub const VERSION_INFO: &str = "http://www.w3.org/2002/07/owl#versionInfo";

    /// owl:DatatypeProperty IRI
    pub const DATATYPE_PROPERTY: &str = "http://www.w3.org/2002/07/owl#DatatypeProperty";

    /// owl:ObjectProperty IRI
    pub const OBJECT_PROPERTY: &str = "http://www.w3.org/2002/07/owl#ObjectProperty";
}

/// Dublin Core terms
pub mod dcterms {
    /// Namespace IRI
    pub const NS: &str = "http://purl.org/dc/terms/";

    /// dcterms:hasPart IRI (membership index link)
    pub const HAS_PART: &str = "http://purl.org/dc/terms/hasPart";

    /// dcterms:isPartOf IRI
    pub const IS_PART_OF: &str = "http://purl.org/dc/terms/isPartOf";

    /// dcterms:created IRI
    pub const CREATED: &str = "http://purl.org/dc/terms/created";

    /// dcterms:modified IRI
    pub const MODIFIED: &str = "http://purl.org/dc/terms/modified";

    /// dcterms:title IRI
    pub const TITLE: &str = "http://purl.org/dc/terms/title";

    /// dcterms:identifier IRI
    pub const IDENTIFIER: &str = "http://purl.org/dc/terms/identifier";

    /// dcterms:language IRI (object is an RDF list)
    pub const LANGUAGE: &str = "http://purl.org/dc/terms/language";

    /// dcterms:relation IRI (object is an RDF list)
    pub const RELATION: &str = "http://purl.org/dc/terms/relation";

    /// dcterms:contributor IRI (organization link)
    pub const CONTRIBUTOR: &str = "http://purl.org/dc/terms/contributor";

    /// dcterms:requires IRI (namespace import link)
    pub const REQUIRES: &str = "http://purl.org/dc/terms/requires";
}

/// DCAP metamodel terms carrying namespace metadata on a datamodel
pub mod dcap {
    /// Namespace IRI
    pub const NS: &str = "http://purl.org/ws-mmi-dc/terms/";

    /// dcap:preferredXMLNamespacePrefix IRI
    pub const PREFERRED_XML_NAMESPACE_PREFIX: &str =
        "http://purl.org/ws-mmi-dc/terms/preferredXMLNamespacePrefix";

    /// dcap:preferredXMLNamespaceName IRI
    pub const PREFERRED_XML_NAMESPACE_NAME: &str =
        "http://purl.org/ws-mmi-dc/terms/preferredXMLNamespaceName";

    /// dcap:DCAP IRI
    pub const DCAP: &str = "http://purl.org/ws-mmi-dc/terms/DCAP";
}

/// W3C PROV-O vocabulary constants
pub mod prov {
    /// Namespace IRI
    pub const NS: &str = "http://www.w3.org/ns/prov#";

    /// prov:Activity IRI
    pub const ACTIVITY: &str = "http://www.w3.org/ns/prov#Activity";

    /// prov:Entity IRI
    pub const ENTITY: &str = "http://www.w3.org/ns/prov#Entity";

    /// prov:generated IRI
    pub const GENERATED: &str = "http://www.w3.org/ns/prov#generated";

    /// prov:used IRI (points at the latest entity of an activity)
    pub const USED: &str = "http://www.w3.org/ns/prov#used";

    /// prov:startedAtTime IRI
    pub const STARTED_AT_TIME: &str = "http://www.w3.org/ns/prov#startedAtTime";

    /// prov:generatedAtTime IRI
    pub const GENERATED_AT_TIME: &str = "http://www.w3.org/ns/prov#generatedAtTime";

    /// prov:wasAttributedTo IRI
    pub const WAS_ATTRIBUTED_TO: &str = "http://www.w3.org/ns/prov#wasAttributedTo";

    /// prov:wasRevisionOf IRI (same-lineage predecessor)
    pub const WAS_REVISION_OF: &str = "http://www.w3.org/ns/prov#wasRevisionOf";

    /// prov:wasDerivedFrom IRI (cross-lineage origin)
    pub const WAS_DERIVED_FROM: &str = "http://www.w3.org/ns/prov#wasDerivedFrom";

    /// prov:hadDerivation IRI (forward link written into the origin graph)
    pub const HAD_DERIVATION: &str = "http://www.w3.org/ns/prov#hadDerivation";
}

/// SPARQL 1.1 Service Description vocabulary constants
pub mod sd {
    /// Namespace IRI
    pub const NS: &str = "http://www.w3.org/ns/sparql-service-description#";

    /// sd:Service IRI (class)
    pub const SERVICE: &str = "http://www.w3.org/ns/sparql-service-description#Service";

    /// sd:Dataset IRI (class)
    pub const DATASET: &str = "http://www.w3.org/ns/sparql-service-description#Dataset";

    /// sd:GraphCollection IRI (class)
    pub const GRAPH_COLLECTION: &str =
        "http://www.w3.org/ns/sparql-service-description#GraphCollection";

    /// sd:NamedGraph IRI (class)
    pub const NAMED_GRAPH_CLASS: &str =
        "http://www.w3.org/ns/sparql-service-description#NamedGraph";

    /// sd:defaultDataset IRI (property)
    pub const DEFAULT_DATASET: &str =
        "http://www.w3.org/ns/sparql-service-description#defaultDataset";

    /// sd:defaultGraph IRI (property)
    pub const DEFAULT_GRAPH: &str =
        "http://www.w3.org/ns/sparql-service-description#defaultGraph";

    /// sd:availableGraphs IRI (property)
    pub const AVAILABLE_GRAPHS: &str =
        "http://www.w3.org/ns/sparql-service-description#availableGraphs";

    /// sd:namedGraph IRI (property)
    pub const NAMED_GRAPH: &str = "http://www.w3.org/ns/sparql-service-description#namedGraph";

    /// sd:name IRI (property, the graph IRI of a named graph entry)
    pub const NAME: &str = "http://www.w3.org/ns/sparql-service-description#name";
}

/// Instance-local metamodel terms
pub mod iow {
    /// Namespace IRI
    pub const NS: &str = "http://uri.suomi.fi/datamodel/ns/iow#";

    /// iow:version IRI (schema version counter literal)
    pub const VERSION: &str = "http://uri.suomi.fi/datamodel/ns/iow#version";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_live_under_their_namespace() {
        assert!(rdf::TYPE.starts_with(rdf::NS));
        assert!(rdfs::IS_DEFINED_BY.starts_with(rdfs::NS));
        assert!(owl::VERSION_INFO.starts_with(owl::NS));
        assert!(dcterms::HAS_PART.starts_with(dcterms::NS));
        assert!(dcap::PREFERRED_XML_NAMESPACE_PREFIX.starts_with(dcap::NS));
        assert!(prov::WAS_REVISION_OF.starts_with(prov::NS));
        assert!(sd::NAMED_GRAPH.starts_with(sd::NS));
        assert!(iow::VERSION.starts_with(iow::NS));
    }

    #[test]
    fn class_and_property_named_graph_differ_only_by_case() {
        assert_ne!(sd::NAMED_GRAPH_CLASS, sd::NAMED_GRAPH);
        assert_eq!(sd::NAMED_GRAPH_CLASS.to_lowercase(), sd::NAMED_GRAPH.to_lowercase());
    }
}
