//! Embedded transactional graph store
//!
//! Holds the published [`Graph`] behind a lock and hands out scoped
//! transactions:
//!
//! - [`WriteTx`] works on a private copy of the graph. `commit()` persists a
//!   snapshot through the store's [`SnapshotSink`] and only then publishes the
//!   copy. Dropping the transaction, or a failed commit, discards every change.
//! - [`ReadTx`] holds a read lock for its lifetime and answers pattern queries
//!   and traversals over one consistent graph.
//!
//! [`GraphStore::shutdown`] flushes and closes the store exactly once. The
//! store is `Send + Sync`, so a signal handler can share it through an `Arc`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, MutexGuard, RwLock, RwLockReadGuard};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::graph::{Edge, EdgeRef, Graph, Label, Node, NodeRef, Properties, RelType};

pub mod pattern;
pub mod snapshot;
pub mod traversal;

pub use pattern::{NodeMatch, Order};
pub use snapshot::{DirectorySink, MemorySink, SnapshotSink, SNAPSHOT_FILE};
pub use traversal::{Direction, Path as TraversalPath, Step, Traversal, TraversalResult, Uniqueness};

/// Embedded graph database handle
pub struct GraphStore {
    sink: Box<dyn SnapshotSink>,
    published: RwLock<Graph>,
    /// Serialises writers; held by every live [`WriteTx`]
    writer: Mutex<()>,
    closed: AtomicBool,
}

impl GraphStore {
    /// Open a fresh store in `dir`
    ///
    /// Any existing content at `dir` is deleted first, so every run starts from
    /// an empty graph.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        let setup = |source: io::Error| StoreError::Setup {
            path: dir.to_path_buf(),
            source,
        };

        if dir.exists() {
            info!(path = %dir.display(), "removing previous dataset");
            if dir.is_dir() {
                fs::remove_dir_all(dir).map_err(setup)?;
            } else {
                fs::remove_file(dir).map_err(setup)?;
            }
        }
        fs::create_dir_all(dir).map_err(setup)?;

        info!(path = %dir.display(), "opened graph store");
        Ok(Self::with_sink(DirectorySink::new(dir)))
    }

    /// Open an empty store that persists through `sink`
    pub fn with_sink(sink: impl SnapshotSink + 'static) -> Self {
        Self {
            sink: Box::new(sink),
            published: RwLock::new(Graph::new()),
            writer: Mutex::new(()),
            closed: AtomicBool::new(false),
        }
    }

    /// Where snapshots are written
    pub fn location(&self) -> PathBuf {
        self.sink.location()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Start a write transaction, waiting for any other writer to finish
    pub fn begin_write(&self) -> Result<WriteTx<'_>, StoreError> {
        let gate = self.writer.lock();
        self.ensure_open()?;
        let working = self.published.read().clone();
        Ok(WriteTx {
            store: self,
            _gate: gate,
            working,
            nodes_created: 0,
            edges_created: 0,
        })
    }

    /// Start a read transaction over the current published graph
    pub fn begin_read(&self) -> Result<ReadTx<'_>, StoreError> {
        self.ensure_open()?;
        Ok(ReadTx {
            graph: self.published.read(),
        })
    }

    /// Flush the final snapshot and close the store
    ///
    /// Only the first call does any work; later calls return `Ok(())`. Waits
    /// for an in-flight write transaction, so a concurrent commit is either
    /// fully persisted or not at all.
    pub fn shutdown(&self) -> Result<(), StoreError> {
        let _gate = self.writer.lock();
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let graph = self.published.read();
        let bytes = serde_json::to_vec(&*graph)?;
        let persist = |source: io::Error| StoreError::Persist {
            path: self.sink.location(),
            source,
        };
        self.sink.write(&bytes).map_err(persist)?;
        self.sink.flush().map_err(persist)?;

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "graph store shut down"
        );
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.is_closed() {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

impl Drop for GraphStore {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            warn!(error = %err, "graph store did not shut down cleanly");
        }
    }
}

/// Summary of a committed write transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitSummary {
    pub nodes_created: usize,
    pub edges_created: usize,
}

/// All-or-nothing write transaction
///
/// Changes are invisible to readers until [`WriteTx::commit`] succeeds.
pub struct WriteTx<'a> {
    store: &'a GraphStore,
    _gate: MutexGuard<'a, ()>,
    working: Graph,
    nodes_created: usize,
    edges_created: usize,
}

impl WriteTx<'_> {
    /// Create a labelled node with the given attributes
    pub fn create_node(&mut self, label: Label, properties: Properties) -> NodeRef {
        self.nodes_created += 1;
        self.working.add_node(Node { label, properties })
    }

    /// Create a directed `rel_type` edge from `from` to `to`
    pub fn create_relationship(
        &mut self,
        from: NodeRef,
        to: NodeRef,
        rel_type: RelType,
    ) -> Result<EdgeRef, StoreError> {
        let edge = self
            .working
            .add_edge(from, to, Edge { rel_type })
            .ok_or_else(|| {
                let missing = if self.working.node(from).is_none() { from } else { to };
                StoreError::UnknownNode { node: missing }
            })?;
        self.edges_created += 1;
        Ok(edge)
    }

    /// The transaction's view of the graph, including uncommitted changes
    pub fn graph(&self) -> &Graph {
        &self.working
    }

    /// Persist and publish every change made in this transaction
    pub fn commit(self) -> Result<CommitSummary, StoreError> {
        self.store.ensure_open()?;

        let bytes = serde_json::to_vec(&self.working)?;
        self.store
            .sink
            .write(&bytes)
            .map_err(|source| StoreError::Persist {
                path: self.store.sink.location(),
                source,
            })?;

        let summary = CommitSummary {
            nodes_created: self.nodes_created,
            edges_created: self.edges_created,
        };
        *self.store.published.write() = self.working;

        debug!(
            nodes_created = summary.nodes_created,
            edges_created = summary.edges_created,
            "committed write transaction"
        );
        Ok(summary)
    }
}

/// Scoped read transaction; the lock is released on drop
pub struct ReadTx<'a> {
    graph: RwLockReadGuard<'a, Graph>,
}

impl ReadTx<'_> {
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn node(&self, node: NodeRef) -> Option<&Node> {
        self.graph.node(node)
    }

    /// Run a pattern query
    pub fn find(&self, pattern: &NodeMatch) -> Vec<NodeRef> {
        pattern.execute(&self.graph)
    }

    /// Run a traversal from `start`
    pub fn traverse(&self, start: NodeRef, traversal: &Traversal) -> TraversalResult {
        traversal.run(&self.graph, start)
    }
}
