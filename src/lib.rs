//! # Dagtable
//!
//! Dagtable is an entity-table refresh engine for dag vertex tables.
//! It loads the vertices of a dag, reconciles stale vertex statuses against
//! the dag's terminal state, and asynchronously overlays live progress onto
//! the delivered rows without blocking the primary load.
//!
//! ## Core Features
//!
//! - **Two-Phase Load Protocol**: a strictly sequential primary load chain
//!   followed by a detached, fire-and-forget progress overlay
//! - **Status Reconciliation**: vertices stuck in RUNNING are rewritten to
//!   KILLED once their dag has reached an unsuccessful terminal state
//! - **Reactive Cells**: the status column holds a live subscription to each
//!   running row's progress and reformats itself on every mutation
//! - **Pluggable Store**: the entity store is a trait; an in-memory
//!   implementation is provided for testing and embedding
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dagtable::{MemStore, TableController, TableScope};
//!
//! let store = Arc::new(MemStore::new());
//! let controller = TableController::new(store, TableScope {
//!     dag_id: "dag1".into(),
//!     app_id: "application_1".into(),
//!     dag_idx: "1".into(),
//! });
//!
//! let rows = controller.load(None).await?;
//! // rows are renderable immediately; progress arrives via the detached
//! // overlay task and must not be assumed present here
//! ```

mod common;
mod config;
mod error;
mod model;
mod store;
mod table;
mod utils;

use std::sync::{Arc, RwLock};

pub use common::{Observable, Subscription};
pub use config::{ColumnsConfig, Config, CounterColumnConfig};
pub use error::DagTableError;
pub use model::*;
pub use store::{EntityStore, MemStore, ProgressQuery, VertexQuery};
pub use table::{
    CellContent, CellContentFn, CellTemplate, ColumnDescriptor, ColumnDescriptorRegistry, ProgressMerger, SearchValueFn, StatusCell, TableController, TableScope, VertexRow, reconcile,
};

/// Result type alias for Dagtable operations.
pub type Result<T> = std::result::Result<T, DagTableError>;

/// Thread-safe shared lock wrapper using Arc<RwLock<T>>.
pub(crate) type ShareLock<T> = Arc<RwLock<T>>;
