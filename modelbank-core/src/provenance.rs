//! Provenance shadow store
//!
//! Every model and member resource gets a same-named graph on a separate
//! provenance endpoint holding one `prov:Activity` per subject and a chain
//! of `prov:Entity` records linked by `prov:wasRevisionOf`. The activity's
//! `prov:used` pointer always names the newest entity. Records are
//! append-only; content deletion never touches them.
//!
//! The sync is optional. When constructed with [`ProvenanceSync::disabled`]
//! every call is a no-op, so callers never branch on configuration.

use std::sync::Arc;

use oxrdf::{Graph, NamedNode};
use tracing::debug;
use uuid::Uuid;

use modelbank_store::{SparqlStore, UpdateOp};

use crate::clock;
use crate::error::Result;

/// Mirror of content edits into the provenance store
#[derive(Debug, Clone, Default)]
pub struct ProvenanceSync {
    store: Option<Arc<dyn SparqlStore>>,
}

/// An agent IRI for a user, in the `mailto:` scheme
pub fn actor_from_email(email: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("mailto:{email}"))
}

impl ProvenanceSync {
    pub fn new(store: Arc<dyn SparqlStore>) -> Self {
        Self { store: Some(store) }
    }

    /// A sync that records nothing
    pub fn disabled() -> Self {
        Self { store: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    fn fresh_entity() -> NamedNode {
        NamedNode::new_unchecked(format!("urn:uuid:{}", Uuid::new_v4()))
    }

    /// Open an activity for a new subject with its first entity
    pub async fn record_created(&self, subject: &NamedNode, actor: &NamedNode) -> Result<()> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let entity = Self::fresh_entity();
        debug!(subject = %subject, entity = %entity, "recording creation activity");
        store
            .update(
                &UpdateOp::CreateActivity {
                    graph: subject.clone(),
                    subject: subject.clone(),
                    entity,
                    actor: actor.clone(),
                    at: clock::xsd_date_time_now(),
                }
                .into(),
            )
            .await?;
        Ok(())
    }

    /// Chain a new entity onto an existing activity
    pub async fn record_updated(&self, subject: &NamedNode, actor: &NamedNode) -> Result<()> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let entity = Self::fresh_entity();
        debug!(subject = %subject, entity = %entity, "recording update entity");
        store
            .update(
                &UpdateOp::AppendEntity {
                    graph: subject.clone(),
                    subject: subject.clone(),
                    entity,
                    actor: actor.clone(),
                    at: clock::xsd_date_time_now(),
                }
                .into(),
            )
            .await?;
        Ok(())
    }

    /// Write a migrated activity record wholesale; no-op when disabled
    pub(crate) async fn import_record(&self, subject: &NamedNode, record: &Graph) -> Result<()> {
        if let Some(store) = &self.store {
            store.put_graph(subject.as_str(), record).await?;
        }
        Ok(())
    }

    /// Drop every provenance graph; part of the administrative reset
    pub(crate) async fn clear(&self) -> Result<()> {
        if let Some(store) = &self.store {
            store.drop_all().await?;
        }
        Ok(())
    }

    /// Copy an activity's record under a renamed identifier
    pub async fn record_renamed(&self, old: &NamedNode, new: &NamedNode) -> Result<()> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        debug!(old = %old, new = %new, "copying activity record");
        store
            .update(
                &UpdateOp::CopyActivity {
                    old: old.clone(),
                    new: new.clone(),
                }
                .into(),
            )
            .await?;
        Ok(())
    }
}
