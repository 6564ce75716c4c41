// Snapshot and per-process models served by GET /stats

use serde::{Deserialize, Serialize};

/// One process as reported in GET /stats. Missing fields degrade to defaults rather than
/// dropping the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub pid: u32,
    pub name: String,
    /// Lowercase process state, e.g. "running", "sleeping", "disk-sleep".
    pub status: String,
    pub cpu_percent: f64,
    pub memory_percent: f64,
    /// Start time in seconds since the Unix epoch; null when unknown.
    pub create_time: Option<f64>,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSnapshot {
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub memory_used: u64,
    pub memory_total: u64,
    pub processes: Vec<ProcessRecord>,
    pub timestamp: f64,
}

impl SystemSnapshot {
    /// Assemble a snapshot; `cpu_usage` is rounded and `memory_usage` derived from used/total.
    /// `processes` is kept in the order given.
    pub fn new(
        cpu_usage: f64,
        memory_used: u64,
        memory_total: u64,
        processes: Vec<ProcessRecord>,
        timestamp: f64,
    ) -> Self {
        let memory_usage = if memory_total > 0 {
            (memory_used as f64 / memory_total as f64) * 100.0
        } else {
            0.0
        };
        Self {
            cpu_usage: round_percent(sanitize_percent(cpu_usage)),
            memory_usage: round_percent(sanitize_percent(memory_usage)),
            memory_used,
            memory_total,
            processes,
            timestamp,
        }
    }
}

/// Round to two decimal places.
pub fn round_percent(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn sanitize_percent(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}
