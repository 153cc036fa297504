//! orggraph core library
//!
//! Generates a synthetic organisation (managers, designers, programmers,
//! artists and the products they build) inside an embedded graph store and
//! runs a fixed set of sales analyses over it.

pub mod config;
pub mod error;
pub mod facts;
pub mod generator;
pub mod graph;
pub mod queries;
pub mod report;
pub mod runner;
pub mod store;

// Re-export commonly used types
pub use config::{AnalysisConfig, FanOut, GeneratorConfig};
pub use error::{ConfigError, GenerationError, QueryError, StoreError};
pub use facts::{FactProvider, RandomFacts};
pub use generator::{generate, GraphHandle};
pub use graph::{Edge, Graph, Label, Node, NodeRef, RelType};
pub use queries::QueryEngine;
pub use report::render_report;
pub use runner::{run, Report};
pub use store::GraphStore;
