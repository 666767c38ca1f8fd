use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{DagTableError, Result};

/// vertex id
pub type VertexId = String;

/// Status of a vertex during dag execution.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum VertexStatus {
    #[default]
    New,
    Inited,
    Running,
    Succeeded,
    Failed,
    Killed,
    Error,
}

/// Reference to a source or sink attached to a vertex.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IoRef {
    pub id: String,
    #[serde(default)]
    pub class_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VertexModel {
    /// composite id; the last `_`-separated segment is the correlation key
    pub id: VertexId,
    pub name: String,
    pub status: VertexStatus,
    #[serde(default)]
    pub start_time: i64,
    #[serde(default)]
    pub end_time: i64,
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub first_task_start_time: i64,
    #[serde(default)]
    pub num_tasks: i64,
    #[serde(default)]
    pub processor_class_name: String,
    /// ordered source references
    #[serde(default)]
    pub inputs: Vec<IoRef>,
    /// ordered sink references
    #[serde(default)]
    pub outputs: Vec<IoRef>,
    #[serde(default)]
    pub has_failed_task_attempts: bool,
    /// counter name -> value, feeds the counter-derived columns
    #[serde(default)]
    pub counters: HashMap<String, i64>,
}

impl VertexModel {
    pub fn from_json(s: &str) -> Result<Self> {
        let vertex = serde_json::from_str::<VertexModel>(s);
        match vertex {
            Ok(v) => Ok(v),
            Err(e) => Err(DagTableError::Convert(format!("{}", e))),
        }
    }
}
