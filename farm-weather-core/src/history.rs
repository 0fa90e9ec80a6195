use serde::Serialize;

use crate::{
    backend::WeatherHistoryResponse,
    snapshot::{SnapshotDefaults, WeatherSnapshot, normalize_snapshot},
};

/// A normalized snapshot plus the identity of the document it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
    pub id: Option<String>,
    pub created_at: Option<String>,
    pub snapshot: WeatherSnapshot,
}

impl HistoryRecord {
    /// Time to show for this row: creation time, else the reading's own timestamp.
    pub fn display_time(&self) -> &str {
        self.created_at.as_deref().unwrap_or(&self.snapshot.timestamp)
    }
}

/// History page in backend order. `total` is the backend's count, which may
/// exceed `records.len()` when the backend paginates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeatherHistory {
    pub total: u64,
    pub records: Vec<HistoryRecord>,
}

/// Normalize every document, preserving order. A response without a
/// documents collection yields an empty history with `total == 0`.
pub fn normalize_history(response: &WeatherHistoryResponse, defaults: &SnapshotDefaults) -> WeatherHistory {
    let Some(documents) = &response.documents else {
        return WeatherHistory::default();
    };

    let records = documents
        .iter()
        .map(|doc| HistoryRecord {
            id: doc.id.clone(),
            created_at: doc.created_at.clone(),
            snapshot: normalize_snapshot(doc, defaults),
        })
        .collect();

    WeatherHistory { total: response.total, records }
}
