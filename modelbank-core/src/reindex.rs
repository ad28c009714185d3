//! Background search-index refresh
//!
//! Content writes publish [`ReindexTask`]s onto a bounded queue; a single
//! dispatcher task owns the receiver and applies them through a
//! [`SearchIndexer`] in arrival order. Indexing is best-effort: when the
//! queue is full the task is dropped with a warning and the write path
//! carries on. A failed index apply never fails the originating write.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use oxrdf::NamedNode;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::Result;

/// One unit of search-index maintenance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReindexTask {
    /// Re-index a model and everything reachable from it
    IndexModel { model: NamedNode },
    /// Re-index a single member resource
    IndexResource {
        model: NamedNode,
        resource: NamedNode,
    },
    /// Drop a model and its members from the index
    RemoveModel { model: NamedNode },
    /// Drop a single member resource from the index
    RemoveResource {
        model: NamedNode,
        resource: NamedNode,
    },
}

/// Applies reindex tasks to a search backend
#[async_trait]
pub trait SearchIndexer: Send + Sync {
    async fn apply(&self, task: &ReindexTask) -> Result<()>;
}

#[derive(Debug, Default)]
struct Counters {
    enqueued: AtomicU64,
    dropped: AtomicU64,
    applied: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time view of queue activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReindexStats {
    pub enqueued: u64,
    pub dropped: u64,
    pub applied: u64,
    pub failed: u64,
}

/// Bounded handoff between content writes and the search indexer
#[derive(Debug, Clone)]
pub struct ReindexQueue {
    sender: Option<mpsc::Sender<ReindexTask>>,
    counters: Arc<Counters>,
}

impl ReindexQueue {
    /// A queue that accepts nothing; useful when no indexer is wired up
    pub fn disabled() -> Self {
        Self {
            sender: None,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Start the queue with a dispatcher applying tasks through `indexer`.
    ///
    /// The dispatcher is spawned only when a Tokio runtime is present.
    /// Unit tests sometimes construct a registry in a plain `#[test]`; in
    /// that case indexing is silently off rather than a panic, and every
    /// submitted task counts as dropped.
    pub fn start(indexer: Arc<dyn SearchIndexer>, queue_depth: usize) -> Self {
        let (tx, rx) = mpsc::channel(queue_depth.max(1));
        let counters = Arc::new(Counters::default());

        if tokio::runtime::Handle::try_current().is_ok() {
            Self::spawn_dispatcher(rx, indexer, counters.clone());
        }
        // else: rx drops here and submit sees a closed channel

        Self {
            sender: Some(tx),
            counters,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    fn spawn_dispatcher(
        mut rx: mpsc::Receiver<ReindexTask>,
        indexer: Arc<dyn SearchIndexer>,
        counters: Arc<Counters>,
    ) {
        tokio::spawn(async move {
            while let Some(task) = rx.recv().await {
                match indexer.apply(&task).await {
                    Ok(()) => {
                        counters.applied.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => {
                        counters.failed.fetch_add(1, Ordering::Relaxed);
                        warn!(task = ?task, error = %e, "reindex task failed");
                    }
                }
            }
        });
    }

    /// Hand a task to the dispatcher without blocking.
    ///
    /// Returns `true` when the task was enqueued, `false` when it was
    /// dropped because the queue is full, closed, or disabled.
    pub fn submit(&self, task: ReindexTask) -> bool {
        let Some(sender) = &self.sender else {
            return false;
        };
        match sender.try_send(task) {
            Ok(()) => {
                self.counters.enqueued.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(mpsc::error::TrySendError::Full(task)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(task = ?task, "reindex queue full, dropping task");
                false
            }
            Err(mpsc::error::TrySendError::Closed(task)) => {
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                debug!(task = ?task, "reindex dispatcher gone, dropping task");
                false
            }
        }
    }

    pub fn stats(&self) -> ReindexStats {
        ReindexStats {
            enqueued: self.counters.enqueued.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
            applied: self.counters.applied.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }
}

/// Indexer that remembers every task it was handed; for tests
#[derive(Debug, Clone, Default)]
pub struct RecordingIndexer {
    tasks: Arc<parking_lot::Mutex<Vec<ReindexTask>>>,
}

impl RecordingIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> Vec<ReindexTask> {
        self.tasks.lock().clone()
    }
}

#[async_trait]
impl SearchIndexer for RecordingIndexer {
    async fn apply(&self, task: &ReindexTask) -> Result<()> {
        self.tasks.lock().push(task.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn iri(s: &str) -> NamedNode {
        NamedNode::new_unchecked(s)
    }

    async fn wait_for_tasks(indexer: &RecordingIndexer, n: usize) {
        for _ in 0..100 {
            if indexer.tasks().len() >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("indexer never saw {n} tasks, got {:?}", indexer.tasks());
    }

    /// Indexer whose apply signals entry and then never finishes
    struct StalledIndexer {
        started: Arc<tokio::sync::Notify>,
    }

    #[async_trait]
    impl SearchIndexer for StalledIndexer {
        async fn apply(&self, _task: &ReindexTask) -> Result<()> {
            self.started.notify_one();
            futures::future::pending::<()>().await;
            Ok(())
        }
    }

    // ========== Dispatch Tests ==========

    #[tokio::test]
    async fn tasks_reach_the_indexer_in_order() {
        let indexer = RecordingIndexer::new();
        let queue = ReindexQueue::start(Arc::new(indexer.clone()), 8);

        let m = iri("http://ex.org/m");
        let r = iri("http://ex.org/m#R");
        assert!(queue.submit(ReindexTask::IndexModel { model: m.clone() }));
        assert!(queue.submit(ReindexTask::RemoveResource {
            model: m.clone(),
            resource: r.clone(),
        }));

        wait_for_tasks(&indexer, 2).await;
        assert_eq!(
            indexer.tasks(),
            vec![
                ReindexTask::IndexModel { model: m.clone() },
                ReindexTask::RemoveResource {
                    model: m,
                    resource: r,
                },
            ]
        );

        let stats = queue.stats();
        assert_eq!(stats.enqueued, 2);
        assert_eq!(stats.dropped, 0);
    }

    #[tokio::test]
    async fn full_queue_drops_overflow() {
        let started = Arc::new(tokio::sync::Notify::new());
        let queue = ReindexQueue::start(
            Arc::new(StalledIndexer {
                started: started.clone(),
            }),
            1,
        );
        let m = iri("http://ex.org/m");

        // First task parks in the dispatcher, second fills the buffer.
        assert!(queue.submit(ReindexTask::IndexModel { model: m.clone() }));
        tokio::time::timeout(Duration::from_secs(5), started.notified())
            .await
            .unwrap();
        assert!(queue.submit(ReindexTask::IndexModel { model: m.clone() }));
        assert!(!queue.submit(ReindexTask::IndexModel { model: m }));

        let stats = queue.stats();
        assert_eq!(stats.enqueued, 2);
        assert_eq!(stats.dropped, 1);
    }

    #[tokio::test]
    async fn disabled_queue_accepts_nothing() {
        let queue = ReindexQueue::disabled();
        assert!(!queue.is_enabled());
        assert!(!queue.submit(ReindexTask::RemoveModel {
            model: iri("http://ex.org/m"),
        }));
        assert_eq!(queue.stats(), ReindexStats::default());
    }

    #[test]
    fn without_a_runtime_tasks_count_as_dropped() {
        let queue = ReindexQueue::start(Arc::new(RecordingIndexer::new()), 4);
        assert!(queue.is_enabled());
        assert!(!queue.submit(ReindexTask::RemoveModel {
            model: iri("http://ex.org/m"),
        }));
        assert_eq!(queue.stats().dropped, 1);
    }
}
