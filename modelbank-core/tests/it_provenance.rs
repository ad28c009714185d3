//! Provenance shadow store integration tests
//!
//! Content mutations mirror into a second store: one `prov:Activity` per
//! subject whose `prov:used` pointer names the newest `prov:Entity`, with
//! entities chained by `prov:wasRevisionOf`. Records are append-only and
//! survive content deletion.

mod support;

use std::sync::Arc;

use oxrdf::{Graph, TermRef};

use modelbank_core::{Registry, RegistryConfig};
use modelbank_store::MemoryStore;
use modelbank_vocab::{prov, rdf};

use support::{actor, class_content, iri, model_content, named_objects};

const MODEL: &str = "http://uri.suomi.fi/datamodel/ns/library";
const BOOK: &str = "http://uri.suomi.fi/datamodel/ns/library#Book";
const TOME: &str = "http://uri.suomi.fi/datamodel/ns/library#Tome";
const TARGET: &str = "http://uri.suomi.fi/datamodel/ns/archive";

fn prov_pair() -> (Registry, Arc<MemoryStore>, Arc<MemoryStore>) {
    support::init_tracing();
    let core = Arc::new(MemoryStore::new());
    let shadow = Arc::new(MemoryStore::new());
    let registry = Registry::new(core.clone()).with_provenance(shadow.clone());
    (registry, core, shadow)
}

fn typed_subjects(g: &Graph, class: &str) -> usize {
    g.iter()
        .filter(|t| {
            t.predicate.as_str() == rdf::TYPE
                && match t.object {
                    TermRef::NamedNode(n) => n.as_str() == class,
                    _ => false,
                }
        })
        .count()
}

/// Entity IRIs from the newest backwards, following `prov:wasRevisionOf`
fn revision_chain(g: &Graph, head: &str) -> Vec<String> {
    let mut chain = vec![head.to_string()];
    let mut current = head.to_string();
    while let Some(previous) = named_objects(g, &current, prov::WAS_REVISION_OF)
        .into_iter()
        .next()
    {
        current = previous.clone();
        chain.push(previous);
    }
    chain
}

/// Each update appends one entity; the activity's used pointer tracks the
/// newest and the chain walks back to the creation entity
#[tokio::test]
async fn updates_chain_entities_under_one_activity() {
    let (registry, _core, shadow) = prov_pair();
    let m = iri(MODEL);
    let book = iri(BOOK);

    registry
        .create_model(&m, &model_content(&m, "lib"), &actor())
        .await
        .unwrap();
    registry
        .create_resource(&m, &book, &class_content(&book, "Book"), &actor())
        .await
        .unwrap();
    registry
        .update_resource(&m, &book, &class_content(&book, "Volume"), &actor())
        .await
        .unwrap();
    registry
        .update_resource(&m, &book, &class_content(&book, "Tome"), &actor())
        .await
        .unwrap();

    let record = shadow.graph(BOOK).unwrap();
    assert_eq!(
        named_objects(&record, BOOK, rdf::TYPE),
        vec![prov::ACTIVITY.to_string()]
    );
    assert_eq!(typed_subjects(&record, prov::ENTITY), 3);

    let used = named_objects(&record, BOOK, prov::USED);
    assert_eq!(used.len(), 1, "the activity points at exactly one entity");
    let chain = revision_chain(&record, &used[0]);
    assert_eq!(chain.len(), 3);
    for entity in &chain {
        assert_eq!(
            named_objects(&record, entity, prov::WAS_ATTRIBUTED_TO),
            vec![actor().as_str().to_string()]
        );
    }
    // The chain bottoms out at the creation entity the activity generated
    assert_eq!(
        named_objects(&record, BOOK, prov::GENERATED),
        vec![chain.last().unwrap().clone()]
    );
}

/// Deleting content never deletes its history
#[tokio::test]
async fn content_deletion_retains_the_record() {
    let (registry, core, shadow) = prov_pair();
    let m = iri(MODEL);
    let book = iri(BOOK);

    registry
        .create_model(&m, &model_content(&m, "lib"), &actor())
        .await
        .unwrap();
    registry
        .create_resource(&m, &book, &class_content(&book, "Book"), &actor())
        .await
        .unwrap();

    registry.delete_resource(&m, &book).await.unwrap();
    registry.delete_model(&m).await.unwrap();

    assert!(core.graph(MODEL).is_none());
    assert!(core.graph(BOOK).is_none());

    let record = shadow.graph(BOOK).unwrap();
    assert_eq!(
        named_objects(&record, BOOK, rdf::TYPE),
        vec![prov::ACTIVITY.to_string()]
    );
    assert!(shadow.graph(MODEL).is_some());
}

/// A resource rename copies the activity under the new identifier, then
/// appends a fresh entity chained to the old record's newest one
#[tokio::test]
async fn a_rename_copies_the_activity_and_starts_a_new_entity() {
    let (registry, _core, shadow) = prov_pair();
    let m = iri(MODEL);
    let book = iri(BOOK);
    let tome = iri(TOME);

    registry
        .create_model(&m, &model_content(&m, "lib"), &actor())
        .await
        .unwrap();
    registry
        .create_resource(&m, &book, &class_content(&book, "Book"), &actor())
        .await
        .unwrap();
    registry
        .update_resource_with_new_id(&m, &book, &tome, &class_content(&tome, "Tome"), &actor())
        .await
        .unwrap();

    let old_record = shadow.graph(BOOK).unwrap();
    let new_record = shadow.graph(TOME).unwrap();
    assert_eq!(
        named_objects(&new_record, TOME, rdf::TYPE),
        vec![prov::ACTIVITY.to_string()]
    );

    let old_used = named_objects(&old_record, BOOK, prov::USED);
    let new_used = named_objects(&new_record, TOME, prov::USED);
    assert_eq!(new_used.len(), 1);
    assert_ne!(old_used, new_used);
    assert_eq!(
        named_objects(&new_record, &new_used[0], prov::WAS_REVISION_OF),
        old_used
    );
}

/// A model rename carries the record forward without erasing the old one
#[tokio::test]
async fn a_model_rename_carries_the_record_forward() {
    let (registry, _core, shadow) = prov_pair();
    let m = iri(MODEL);
    let n = iri(TARGET);

    registry
        .create_model(&m, &model_content(&m, "lib"), &actor())
        .await
        .unwrap();
    registry.rename_model(&m, &n, "arch").await.unwrap();

    let moved = shadow.graph(TARGET).unwrap();
    assert_eq!(
        named_objects(&moved, TARGET, rdf::TYPE),
        vec![prov::ACTIVITY.to_string()]
    );
    assert!(shadow.graph(MODEL).is_some());
}

/// A fork opens its own activity rather than extending the original's
#[tokio::test]
async fn a_fork_opens_a_fresh_activity() {
    let (registry, _core, shadow) = prov_pair();
    let m = iri(MODEL);
    let n = iri(TARGET);

    registry
        .create_model(&m, &model_content(&m, "lib"), &actor())
        .await
        .unwrap();
    registry
        .create_version(&m, &n, "arch", true, &actor())
        .await
        .unwrap();

    let record = shadow.graph(TARGET).unwrap();
    assert_eq!(
        named_objects(&record, TARGET, rdf::TYPE),
        vec![prov::ACTIVITY.to_string()]
    );
    assert_eq!(typed_subjects(&record, prov::ENTITY), 1);
    let used = named_objects(&record, TARGET, prov::USED);
    assert!(named_objects(&record, &used[0], prov::WAS_REVISION_OF).is_empty());
}

/// With provenance disabled in configuration, a wired store records
/// nothing
#[tokio::test]
async fn the_config_gate_disables_recording() {
    let core = Arc::new(MemoryStore::new());
    let shadow = Arc::new(MemoryStore::new());
    let config = RegistryConfig::default().with_provenance(false);
    let registry = Registry::with_config(core, config).with_provenance(shadow.clone());

    let m = iri(MODEL);
    let book = iri(BOOK);
    registry
        .create_model(&m, &model_content(&m, "lib"), &actor())
        .await
        .unwrap();
    registry
        .create_resource(&m, &book, &class_content(&book, "Book"), &actor())
        .await
        .unwrap();

    assert!(shadow.graph_names().is_empty());
}
