use std::sync::{
    Arc, RwLock,
    atomic::{AtomicU64, Ordering},
};

use tracing::trace;

use crate::{
    DagModel, DagStatus, DagTableError, Result, ShareLock,
    store::{EntityStore, VertexQuery},
    table::{ProgressMerger, VertexRow, reconcile},
};

/// Identifies the dag a table is scoped to.
#[derive(Debug, Clone, Default)]
pub struct TableScope {
    /// id of the parent dag
    pub dag_id: String,
    /// yarn application id, carried on progress queries
    pub app_id: String,
    /// dag index within the application, carried on progress queries
    pub dag_idx: String,
}

/// Drives the table load cycle.
///
/// One cycle is strictly sequential up to the point the rows are handed
/// back: parent refresh, parent aggregate, primary fetch, reconcile. The
/// progress overlay is then spawned detached; callers must not assume
/// progress is present on the returned rows, it arrives through each row's
/// progress cell as the overlay lands.
pub struct TableController {
    store: Arc<dyn EntityStore>,
    scope: TableScope,
    dag: ShareLock<DagModel>,
    /// current cycle's row sequence, replaced wholesale per load
    rows: ShareLock<Arc<Vec<Arc<VertexRow>>>>,
    /// load-cycle generation; overlay responses from older generations are
    /// dropped
    generation: Arc<AtomicU64>,
    merger: Arc<ProgressMerger>,
}

impl TableController {
    pub fn new(
        store: Arc<dyn EntityStore>,
        scope: TableScope,
    ) -> Self {
        let rows: ShareLock<Arc<Vec<Arc<VertexRow>>>> = Arc::new(RwLock::new(Arc::new(Vec::new())));
        let generation = Arc::new(AtomicU64::new(0));
        let merger = Arc::new(ProgressMerger::new(store.clone(), rows.clone(), generation.clone(), scope.app_id.clone(), scope.dag_idx.clone()));

        Self {
            store,
            scope,
            dag: Arc::new(RwLock::new(DagModel::default())),
            rows,
            generation,
            merger,
        }
    }

    /// Run one load cycle and return the reconciled row sequence.
    ///
    /// A failure refreshing the parent or fetching the vertices rejects the
    /// whole load; nothing is reconciled or overlaid in that case. Overlay
    /// failures never reach this result.
    pub async fn load(
        &self,
        filter: Option<String>,
    ) -> Result<Arc<Vec<Arc<VertexRow>>>> {
        trace!("table_controller::load({})", self.scope.dag_id);

        // (1) refresh the parent dag
        let dag = self.store.reload_dag(&self.scope.dag_id).await.map_err(|err| DagTableError::ParentRefresh(err.to_string()))?;

        // (2) refresh the parent aggregate needed for reconciliation
        self.store.fetch_additional(&dag).await.map_err(|err| DagTableError::ParentRefresh(err.to_string()))?;

        // (3) fetch the vertex sequence scoped to the parent
        let query = VertexQuery {
            dag_id: self.scope.dag_id.clone(),
            filter,
        };
        let models = self.store.find_vertices(&query).await.map_err(|err| DagTableError::PrimaryFetch(err.to_string()))?;
        let rows: Arc<Vec<Arc<VertexRow>>> = Arc::new(models.into_iter().map(|model| Arc::new(VertexRow::from_model(model))).collect());

        // (4) correct stale statuses against the parent's terminal state
        reconcile(&rows, dag.status);
        *self.dag.write().unwrap() = dag;

        // publish the sequence as the current cycle
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        *self.rows.write().unwrap() = rows.clone();

        // (6) detached overlay; not joined on the load path
        let merger = self.merger.clone();
        tokio::spawn(async move {
            merger.overlay(generation).await;
        });

        // (5) the reconciled sequence is ready for rendering
        Ok(rows)
    }

    /// Status of the parent dag as of the last completed load.
    pub fn dag_status(&self) -> DagStatus {
        self.dag.read().unwrap().status
    }

    /// The current cycle's row sequence.
    pub fn current_rows(&self) -> Arc<Vec<Arc<VertexRow>>> {
        self.rows.read().unwrap().clone()
    }
}

#[cfg(test)]
mod test {
    use std::{sync::Arc, time::Duration};

    use async_trait::async_trait;

    use super::{TableController, TableScope};
    use crate::{
        DagModel, DagStatus, DagTableError, MemStore, ProgressModel, Result, VertexModel, VertexStatus,
        store::{EntityStore, ProgressQuery, VertexQuery},
    };

    fn scope() -> TableScope {
        TableScope {
            dag_id: "dag1".to_string(),
            app_id: "application_1".to_string(),
            dag_idx: "1".to_string(),
        }
    }

    fn vertex(
        id: &str,
        status: VertexStatus,
    ) -> VertexModel {
        VertexModel {
            id: id.to_string(),
            name: format!("vertex {id}"),
            status,
            ..Default::default()
        }
    }

    fn seeded_store(dag_status: DagStatus) -> Arc<MemStore> {
        let store = Arc::new(MemStore::new());
        store.put_dag(DagModel {
            id: "dag1".to_string(),
            name: "q1".to_string(),
            status: dag_status,
            application_id: "application_1".to_string(),
            idx: "1".to_string(),
            ..Default::default()
        });
        store
    }

    // lets the detached overlay task run to completion
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn test_load_reconciles_against_failed_dag() {
        let store = seeded_store(DagStatus::Failed);
        store.put_vertices("dag1", vec![vertex("d_v1", VertexStatus::Running), vertex("d_v2", VertexStatus::Succeeded)]);
        // progress exists for the formerly running vertex
        store.put_progress("v1", 0.6);

        let controller = TableController::new(store.clone(), scope());
        let rows = controller.load(None).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].status(), VertexStatus::Killed);
        assert_eq!(rows[1].status(), VertexStatus::Succeeded);
        assert_eq!(controller.dag_status(), DagStatus::Failed);

        // the overlay pass operates on the reconciled set: nothing is
        // RUNNING anymore, so no query is issued and no progress lands
        settle().await;
        assert!(!store.has_served_progress("v1"));
        assert_eq!(rows[0].progress.get(), None);
        assert_eq!(rows[1].progress.get(), None);
    }

    #[tokio::test]
    async fn test_load_overlays_progress_on_running_rows() {
        let store = seeded_store(DagStatus::Running);
        store.put_vertices("dag1", vec![vertex("dag1_v1_0", VertexStatus::Running), vertex("dag1_v1_1", VertexStatus::Succeeded)]);
        store.put_progress("0", 0.42);

        let controller = TableController::new(store, scope());
        let rows = controller.load(None).await.unwrap();

        // rows resolve before the overlay is observable
        assert_eq!(rows[0].progress.get(), None);

        settle().await;
        assert_eq!(rows[0].progress.get(), Some(0.42));
        assert_eq!(rows[1].progress.get(), None);
    }

    #[tokio::test]
    async fn test_parent_refresh_failure_rejects_load() {
        let store = Arc::new(MemStore::new());
        let controller = TableController::new(store, scope());

        let err = controller.load(None).await.unwrap_err();
        assert!(matches!(err, DagTableError::ParentRefresh(_)));
        assert!(err.is_fatal());
        assert!(controller.current_rows().is_empty());
    }

    #[tokio::test]
    async fn test_filter_scopes_primary_fetch() {
        let store = seeded_store(DagStatus::Running);
        store.put_vertices("dag1", vec![vertex("dag1_v1_0", VertexStatus::Succeeded), vertex("dag1_v1_1", VertexStatus::Succeeded)]);

        let controller = TableController::new(store, scope());
        let rows = controller.load(Some("dag1_v1_1".to_string())).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "dag1_v1_1");
    }

    #[tokio::test]
    async fn test_new_cycle_replaces_rows_wholesale() {
        let store = seeded_store(DagStatus::Running);
        store.put_vertices("dag1", vec![vertex("dag1_v1_0", VertexStatus::Running)]);

        let controller = TableController::new(store.clone(), scope());
        let first = controller.load(None).await.unwrap();

        store.put_vertices("dag1", vec![vertex("dag1_v2_0", VertexStatus::Running)]);
        let second = controller.load(None).await.unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(controller.current_rows()[0].id, "dag1_v2_0");
    }

    /// Store whose primary and progress fetches fail on demand.
    struct FlakyStore {
        inner: Arc<MemStore>,
        fail_vertices: bool,
        fail_progress: bool,
    }

    #[async_trait]
    impl EntityStore for FlakyStore {
        async fn reload_dag(
            &self,
            id: &str,
        ) -> Result<DagModel> {
            self.inner.reload_dag(id).await
        }

        async fn fetch_additional(
            &self,
            dag: &DagModel,
        ) -> Result<()> {
            self.inner.fetch_additional(dag).await
        }

        async fn find_vertices(
            &self,
            query: &VertexQuery,
        ) -> Result<Vec<VertexModel>> {
            if self.fail_vertices {
                return Err(DagTableError::Store("vertex fetch unavailable".to_string()));
            }
            self.inner.find_vertices(query).await
        }

        async fn find_progress(
            &self,
            query: &ProgressQuery,
        ) -> Result<Vec<ProgressModel>> {
            if self.fail_progress {
                return Err(DagTableError::Store("progress endpoint unavailable".to_string()));
            }
            self.inner.find_progress(query).await
        }

        fn invalidate_progress(&self) {
            self.inner.invalidate_progress();
        }
    }

    #[tokio::test]
    async fn test_primary_fetch_failure_rejects_load() {
        let store = Arc::new(FlakyStore {
            inner: seeded_store(DagStatus::Running),
            fail_vertices: true,
            fail_progress: false,
        });
        let controller = TableController::new(store, scope());

        let err = controller.load(None).await.unwrap_err();
        assert!(matches!(err, DagTableError::PrimaryFetch(_)));
    }

    #[tokio::test]
    async fn test_progress_failure_leaves_load_unaffected() {
        let inner = seeded_store(DagStatus::Running);
        inner.put_vertices("dag1", vec![vertex("dag1_v1_0", VertexStatus::Running)]);
        let store = Arc::new(FlakyStore {
            inner,
            fail_vertices: false,
            fail_progress: true,
        });

        let controller = TableController::new(store, scope());
        let rows = controller.load(None).await.unwrap();

        settle().await;
        // the table stays usable; progress just never arrives this cycle
        assert_eq!(rows[0].status(), VertexStatus::Running);
        assert_eq!(rows[0].progress.get(), None);
    }
}
