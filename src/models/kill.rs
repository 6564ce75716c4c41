// Kill outcome and its wire body

use serde::{Deserialize, Serialize};

/// Outcome of a single forceful kill request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KillResult {
    Terminated(u32),
    NotFound,
    Forbidden,
    Failed(String),
}

/// Body of a successful POST /kill/{pid}.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillResponse {
    pub status: String,
    pub pid: u32,
}

impl KillResponse {
    pub fn terminated(pid: u32) -> Self {
        Self {
            status: "terminated".into(),
            pid,
        }
    }
}
