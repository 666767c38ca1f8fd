use std::sync::Arc;

use crate::{DagStatus, VertexStatus, table::VertexRow};

/// Correct stale vertex statuses against the parent dag's terminal state.
///
/// A vertex left RUNNING under a dag that failed, was killed or errored will
/// never receive a terminating event, so it is rewritten to KILLED in place.
/// Every other vertex, and every field other than status, is untouched.
/// Idempotent: a second invocation with the same inputs changes nothing.
pub fn reconcile(
    rows: &[Arc<VertexRow>],
    dag_status: DagStatus,
) {
    if !dag_status.is_unsuccessful() {
        return;
    }
    for row in rows.iter().filter(|r| r.status() == VertexStatus::Running) {
        row.set_status(VertexStatus::Killed);
    }
}
