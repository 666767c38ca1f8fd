use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use crate::{
    IoRef, ShareLock, VertexId, VertexModel, VertexStatus,
    common::Observable,
};

/// A live table row built from a [`VertexModel`].
///
/// The row sequence is replaced wholesale each load cycle. Post-load, the
/// only mutations a row sees are the reconciler's status rewrite and the
/// overlay's progress writes; everything else is immutable.
#[derive(Debug)]
pub struct VertexRow {
    pub id: VertexId,
    pub name: String,
    pub start_time: i64,
    pub end_time: i64,
    pub duration: i64,
    pub first_task_start_time: i64,
    pub num_tasks: i64,
    pub processor_class_name: String,
    pub inputs: Vec<IoRef>,
    pub outputs: Vec<IoRef>,
    pub has_failed_task_attempts: bool,
    pub counters: HashMap<String, i64>,

    status: ShareLock<VertexStatus>,
    /// completed fraction in [0, 1]; unset until the first overlay write
    pub progress: Observable<f64>,
}

impl VertexRow {
    pub fn from_model(model: VertexModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            start_time: model.start_time,
            end_time: model.end_time,
            duration: model.duration,
            first_task_start_time: model.first_task_start_time,
            num_tasks: model.num_tasks,
            processor_class_name: model.processor_class_name,
            inputs: model.inputs,
            outputs: model.outputs,
            has_failed_task_attempts: model.has_failed_task_attempts,
            counters: model.counters,
            status: Arc::new(RwLock::new(model.status)),
            progress: Observable::new(),
        }
    }

    pub fn status(&self) -> VertexStatus {
        *self.status.read().unwrap()
    }

    pub fn set_status(
        &self,
        status: VertexStatus,
    ) {
        *self.status.write().unwrap() = status;
    }

    /// The trailing `_`-delimited segment of the id, used to address this
    /// row in the lightweight progress query.
    pub fn correlation_key(&self) -> &str {
        self.id.rsplit('_').next().unwrap_or(&self.id)
    }

    /// Named counter value, when the vertex carries it.
    pub fn counter(
        &self,
        group_name: &str,
        counter_name: &str,
    ) -> Option<i64> {
        self.counters.get(&format!("{group_name}/{counter_name}")).copied()
    }
}
