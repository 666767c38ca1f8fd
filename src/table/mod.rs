//! The table load cycle.
//!
//! [`TableController`] drives one cycle: refresh the parent dag, fetch the
//! vertex rows, reconcile statuses, publish the rows, then spawn the detached
//! progress overlay. [`ColumnDescriptorRegistry`] describes the cells and is
//! consumed by the rendering collaborator, independent of the load cycle.

mod columns;
mod controller;
mod progress;
mod reconcile;
mod row;

pub use columns::{CellContent, CellContentFn, CellTemplate, ColumnDescriptor, ColumnDescriptorRegistry, SearchValueFn, StatusCell};
pub use controller::{TableController, TableScope};
pub use progress::ProgressMerger;
pub use reconcile::reconcile;
pub use row::VertexRow;
