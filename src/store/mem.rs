use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use async_trait::async_trait;
use tracing::trace;

use crate::{
    DagModel, DagTableError, ProgressModel, Result, ShareLock, VertexModel,
    common::MemCache,
    store::{EntityStore, ProgressQuery, VertexQuery},
};

/// Maximum number of progress records kept in the served cache.
const PROGRESS_CACHE_SIZE: usize = 1024;

/// In-memory [`EntityStore`] backed by hash maps.
///
/// Dags, vertices and progress records are seeded through the `put_*`
/// methods; `find_progress` mirrors its results into a served-record cache
/// (the per-table progress cache domain) which `invalidate_progress` clears.
pub struct MemStore {
    dags: ShareLock<HashMap<String, DagModel>>,
    vertices: ShareLock<HashMap<String, Vec<VertexModel>>>,
    progress: ShareLock<HashMap<String, ProgressModel>>,
    served: MemCache<String, ProgressModel>,
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            dags: Arc::new(RwLock::new(HashMap::new())),
            vertices: Arc::new(RwLock::new(HashMap::new())),
            progress: Arc::new(RwLock::new(HashMap::new())),
            served: MemCache::new(PROGRESS_CACHE_SIZE),
        }
    }

    pub fn put_dag(
        &self,
        dag: DagModel,
    ) {
        self.dags.write().unwrap().insert(dag.id.clone(), dag);
    }

    /// Replace the vertex set of a dag wholesale.
    pub fn put_vertices(
        &self,
        dag_id: &str,
        vertices: Vec<VertexModel>,
    ) {
        self.vertices.write().unwrap().insert(dag_id.to_string(), vertices);
    }

    /// Record the live progress of one vertex, keyed by correlation key.
    pub fn put_progress(
        &self,
        key: &str,
        progress: f64,
    ) {
        self.progress.write().unwrap().insert(
            key.to_string(),
            ProgressModel {
                id: key.to_string(),
                progress,
            },
        );
    }

    /// Whether a record for this correlation key sits in the served cache.
    pub fn has_served_progress(
        &self,
        key: &str,
    ) -> bool {
        self.served.get(&key.to_string()).is_some()
    }
}

#[async_trait]
impl EntityStore for MemStore {
    async fn reload_dag(
        &self,
        id: &str,
    ) -> Result<DagModel> {
        trace!("mem_store::reload_dag({id})");
        self.dags.read().unwrap().get(id).cloned().ok_or_else(|| DagTableError::Store(format!("dag({id}) not found")))
    }

    async fn fetch_additional(
        &self,
        dag: &DagModel,
    ) -> Result<()> {
        trace!("mem_store::fetch_additional({})", dag.id);
        if !self.dags.read().unwrap().contains_key(&dag.id) {
            return Err(DagTableError::Store(format!("dag({}) not found", dag.id)));
        }
        Ok(())
    }

    async fn find_vertices(
        &self,
        query: &VertexQuery,
    ) -> Result<Vec<VertexModel>> {
        trace!("mem_store::find_vertices({})", query.dag_id);
        let vertices = self.vertices.read().unwrap();
        let mut rows = vertices.get(&query.dag_id).cloned().unwrap_or_default();
        if let Some(filter) = &query.filter {
            rows.retain(|v| v.name.contains(filter.as_str()));
        }
        Ok(rows)
    }

    async fn find_progress(
        &self,
        query: &ProgressQuery,
    ) -> Result<Vec<ProgressModel>> {
        trace!("mem_store::find_progress({})", query.vertex_ids);
        let progress = self.progress.read().unwrap();
        let mut records = Vec::new();
        for key in query.keys() {
            if let Some(record) = progress.get(key) {
                self.served.set(record.id.clone(), record.clone());
                records.push(record.clone());
            }
        }
        Ok(records)
    }

    fn invalidate_progress(&self) {
        trace!("mem_store::invalidate_progress");
        self.served.clear();
    }
}

#[cfg(test)]
mod test {
    use super::MemStore;
    use crate::{
        DagModel, DagStatus, VertexModel,
        store::{EntityStore, ProgressQuery, VertexQuery},
    };

    fn seeded_store() -> MemStore {
        let store = MemStore::new();
        store.put_dag(DagModel {
            id: "dag1".to_string(),
            name: "q1".to_string(),
            status: DagStatus::Running,
            application_id: "application_1".to_string(),
            idx: "1".to_string(),
            ..Default::default()
        });
        store.put_vertices(
            "dag1",
            vec![
                VertexModel {
                    id: "dag1_v1_0".to_string(),
                    name: "Map 1".to_string(),
                    ..Default::default()
                },
                VertexModel {
                    id: "dag1_v1_1".to_string(),
                    name: "Reducer 2".to_string(),
                    ..Default::default()
                },
            ],
        );
        store
    }

    #[tokio::test]
    async fn test_reload_missing_dag_fails() {
        let store = MemStore::new();
        assert!(store.reload_dag("nope").await.is_err());
    }

    #[tokio::test]
    async fn test_find_vertices_with_filter() {
        let store = seeded_store();
        let rows = store
            .find_vertices(&VertexQuery {
                dag_id: "dag1".to_string(),
                filter: Some("Map".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Map 1");
    }

    #[tokio::test]
    async fn test_find_progress_caches_and_invalidate_clears() {
        let store = seeded_store();
        store.put_progress("0", 0.3);
        store.put_progress("1", 0.8);

        let records = store
            .find_progress(&ProgressQuery {
                app_id: "application_1".to_string(),
                dag_idx: "1".to_string(),
                vertex_ids: "0,1,9".to_string(),
            })
            .await
            .unwrap();
        // the unknown key "9" is simply absent from the response
        assert_eq!(records.len(), 2);
        assert!(store.has_served_progress("0"));
        assert!(store.has_served_progress("1"));

        store.invalidate_progress();
        assert!(!store.has_served_progress("0"));
        assert!(!store.has_served_progress("1"));
    }
}
