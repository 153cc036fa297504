//! Error types for the orggraph core library.
//!
//! Setup and generation failures are fatal to a run; query failures are
//! recorded per query so the remaining queries still report.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::graph::{Label, NodeRef};

/// Errors raised by the embedded [`crate::store::GraphStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The storage directory could not be cleared or created.
    #[error("failed to prepare storage directory {}", path.display())]
    Setup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Writing the snapshot to disk failed.
    #[error("failed to persist snapshot to {}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The snapshot could not be encoded.
    #[error("failed to encode snapshot")]
    Encode(#[from] serde_json::Error),
    /// A relationship referenced a node that does not exist.
    #[error("relationship endpoint {node} does not exist")]
    UnknownNode { node: NodeRef },
    /// The store has been shut down.
    #[error("graph store is closed")]
    Closed,
}

impl StoreError {
    /// Whether retrying the same operation may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Persist { source, .. } => matches!(
                source.kind(),
                io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }
}

/// Errors raised while populating the graph.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid generator configuration: {reason}")]
    InvalidConfig { reason: String },
    #[error("generation transaction failed after {attempts} attempt(s)")]
    Transaction {
        attempts: u32,
        #[source]
        source: StoreError,
    },
}

/// Errors raised by a single analytical query.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A node lacks an attribute the query needs.
    #[error("{label} node {node} has no `{key}` attribute")]
    MissingProperty {
        node: NodeRef,
        label: Label,
        key: &'static str,
    },
    /// An attribute holds the wrong kind of value.
    #[error("{label} node {node} has a non-{expected} `{key}` attribute")]
    WrongType {
        node: NodeRef,
        label: Label,
        key: &'static str,
        expected: &'static str,
    },
    /// A query referenced a node that is not in the graph.
    #[error("node {node} is not in the graph")]
    UnknownNode { node: NodeRef },
    /// The query this one depends on did not produce a result.
    #[error("depends on {upstream}, which failed")]
    UpstreamFailed { upstream: &'static str },
}

/// Errors raised while loading an [`crate::config::AnalysisConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        let transient = StoreError::Persist {
            path: PathBuf::from("/tmp/x"),
            source: io::Error::from(io::ErrorKind::Interrupted),
        };
        let permanent = StoreError::Persist {
            path: PathBuf::from("/tmp/x"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };

        assert!(transient.is_transient());
        assert!(!permanent.is_transient());
        assert!(!StoreError::Closed.is_transient());
    }

    #[test]
    fn test_error_messages_name_the_node() {
        let err = QueryError::MissingProperty {
            node: NodeRef(petgraph::stable_graph::NodeIndex::new(7)),
            label: Label::Product,
            key: "daily_sales",
        };
        assert_eq!(
            err.to_string(),
            "PRODUCT node #7 has no `daily_sales` attribute"
        );
    }

    #[test]
    fn test_messages_leave_the_cause_to_the_source_chain() {
        let err = GenerationError::Transaction {
            attempts: 2,
            source: StoreError::Setup {
                path: PathBuf::from("/tmp/db"),
                source: io::Error::new(io::ErrorKind::NotFound, "gone"),
            },
        };

        assert_eq!(err.to_string(), "generation transaction failed after 2 attempt(s)");

        let mut chain = Vec::new();
        let mut current: Option<&dyn std::error::Error> = Some(&err);
        while let Some(e) = current {
            chain.push(e.to_string());
            current = e.source();
        }
        assert_eq!(
            chain,
            vec![
                "generation transaction failed after 2 attempt(s)".to_string(),
                "failed to prepare storage directory /tmp/db".to_string(),
                "gone".to_string(),
            ]
        );
    }
}
