use serde::{Deserialize, Serialize};

use crate::{DagTableError, Result};

/// Status of a dag over its lifecycle.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DagStatus {
    #[default]
    Submitted,
    Running,
    Succeeded,
    Failed,
    Killed,
    Error,
}

impl DagStatus {
    /// Whether the dag has reached a terminal state without succeeding.
    /// Vertices of such a dag will never receive a terminating event.
    pub fn is_unsuccessful(&self) -> bool {
        matches!(self, DagStatus::Failed | DagStatus::Killed | DagStatus::Error)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DagModel {
    pub id: String,
    pub name: String,
    pub status: DagStatus,
    /// Yarn application id owning this dag.
    pub application_id: String,
    /// Index of the dag within its application.
    pub idx: String,
    #[serde(default)]
    pub start_time: i64,
    #[serde(default)]
    pub end_time: i64,
}

impl DagModel {
    pub fn from_json(s: &str) -> Result<Self> {
        let dag = serde_json::from_str::<DagModel>(s);
        match dag {
            Ok(v) => Ok(v),
            Err(e) => Err(DagTableError::Convert(format!("{}", e))),
        }
    }
}
