//! Graph stores
//!
//! One [`GraphStore`] handle over three interchangeable backends:
//!
//! - **memory**: process-local and volatile
//! - **rdb**: a generic statement table in SQLite, one row per statement
//! - **sdb**: a node/quad schema in SQLite with a selectable id layout
//!
//! Every backend addresses a single named graph (the model name) and honors
//! set semantics: adding a statement that is already present is a no-op.

mod backend;
mod dataset;
mod events;
mod graph;
mod memory;
mod params;
mod quad;
mod relational;
mod sql;

pub use dataset::Dataset;
pub use events::{GraphEvent, GraphEventListener};
pub use graph::GraphStore;
pub use params::{BackendKind, ConnectionParams};
pub use quad::QuadLayout;
