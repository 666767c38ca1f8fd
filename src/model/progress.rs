use serde::{Deserialize, Serialize};

/// One record of a progress poll response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressModel {
    /// correlation key of the vertex this record belongs to
    pub id: String,
    /// completed fraction in [0, 1]
    pub progress: f64,
}
