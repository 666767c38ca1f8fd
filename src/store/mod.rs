//! Entity-store collaborator surface.
//!
//! The load protocol talks to persistence only through [`EntityStore`]:
//! - `MemStore`: in-memory implementation for testing and embedding
//!
//! Production deployments implement the trait over their own backend.

mod mem;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{DagModel, ProgressModel, Result, VertexModel};

pub use mem::MemStore;

/// Query descriptor for the primary vertex fetch, scoped to one dag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VertexQuery {
    /// id of the parent dag
    pub dag_id: String,
    /// optional substring filter on the vertex name
    pub filter: Option<String>,
}

/// Query descriptor for the lightweight progress poll.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressQuery {
    /// yarn application id
    pub app_id: String,
    /// dag index within the application
    pub dag_idx: String,
    /// comma-joined correlation keys of the polled vertices
    pub vertex_ids: String,
}

impl ProgressQuery {
    /// The individual correlation keys carried by this query.
    pub fn keys(&self) -> Vec<&str> {
        self.vertex_ids.split(',').filter(|k| !k.is_empty()).collect()
    }
}

/// Trait for the entity-store collaborator.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Refreshes the dag entity from the backend.
    async fn reload_dag(
        &self,
        id: &str,
    ) -> Result<DagModel>;

    /// Refreshes any parent aggregate needed for reconciliation.
    async fn fetch_additional(
        &self,
        dag: &DagModel,
    ) -> Result<()>;

    /// Fetches the vertex sequence scoped to a dag.
    async fn find_vertices(
        &self,
        query: &VertexQuery,
    ) -> Result<Vec<VertexModel>>;

    /// Polls live progress for a set of correlation keys.
    async fn find_progress(
        &self,
        query: &ProgressQuery,
    ) -> Result<Vec<ProgressModel>>;

    /// Drops every cached progress record, clearing state from a prior poll.
    fn invalidate_progress(&self);
}
