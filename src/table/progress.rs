use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tracing::{debug, trace};

use crate::{
    ShareLock, VertexStatus,
    store::{EntityStore, ProgressQuery},
    table::VertexRow,
};

/// Overlays live progress onto the current row sequence.
///
/// One overlay pass runs per load cycle, fire-and-forget relative to the
/// load itself: its failures are logged and swallowed, never surfaced on the
/// load path. There is no cancellation of an in-flight poll when a new cycle
/// begins; a stale response is dropped by the generation check, and any
/// record without a matching row in the current sequence is dropped silently.
pub struct ProgressMerger {
    store: Arc<dyn EntityStore>,
    /// handle onto the controller's current row sequence
    rows: ShareLock<Arc<Vec<Arc<VertexRow>>>>,
    /// the controller's cycle generation counter
    generation: Arc<AtomicU64>,
    app_id: String,
    dag_idx: String,
}

impl ProgressMerger {
    pub(crate) fn new(
        store: Arc<dyn EntityStore>,
        rows: ShareLock<Arc<Vec<Arc<VertexRow>>>>,
        generation: Arc<AtomicU64>,
        app_id: String,
        dag_idx: String,
    ) -> Self {
        Self {
            store,
            rows,
            generation,
            app_id,
            dag_idx,
        }
    }

    /// Run one overlay pass for the cycle tagged `generation`.
    ///
    /// Polls progress for the rows that are RUNNING at the time of the call,
    /// then writes each returned record into the matching row of the
    /// *current* sequence, firing that row's progress subscribers.
    pub async fn overlay(
        &self,
        generation: u64,
    ) {
        let rows = self.rows.read().unwrap().clone();
        let keys: Vec<String> = rows.iter().filter(|row| row.status() == VertexStatus::Running).map(|row| row.correlation_key().to_string()).collect();
        if keys.is_empty() {
            return;
        }

        // Clear records of a prior poll before issuing a new one.
        self.store.invalidate_progress();

        let query = ProgressQuery {
            app_id: self.app_id.clone(),
            dag_idx: self.dag_idx.clone(),
            vertex_ids: keys.join(","),
        };
        match self.store.find_progress(&query).await {
            Ok(records) => {
                if self.generation.load(Ordering::Relaxed) != generation {
                    debug!("dropping progress response of superseded cycle {generation}");
                    return;
                }
                let current = self.rows.read().unwrap().clone();
                for record in records {
                    match current.iter().find(|row| row.correlation_key() == record.id) {
                        Some(row) => row.progress.set(record.progress),
                        // row no longer present, not an error
                        None => trace!("no row for progress record {}", record.id),
                    }
                }
            }
            Err(err) => {
                debug!("failed to fetch vertex progress: {err}");
            }
        }
    }
}
