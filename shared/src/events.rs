use serde::{Deserialize, Serialize};

use crate::statistic::Statistic;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MapEvent {
    /// Sent first on every new stream.
    Snapshot {
        generation: u64,
        statistic: Statistic,
        area_count: usize,
        user_count: usize,
        loading: bool,
        timestamp: String,
    },
    FilterChanged {
        statistic: Statistic,
        timestamp: String,
    },
    DataReloaded {
        generation: u64,
        area_count: usize,
        user_count: usize,
        #[serde(default)]
        areas_failed: bool,
        #[serde(default)]
        users_failed: bool,
        timestamp: String,
    },
}

impl MapEvent {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Snapshot { .. } => "snapshot",
            Self::FilterChanged { .. } => "filter",
            Self::DataReloaded { .. } => "reload",
        }
    }
}
