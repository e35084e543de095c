use crate::partition::SummaryRow;
use crate::pipeline::{SplitReport, SplitStats};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    pub run_id: String,
    pub created_at: String,
    pub source: Option<String>,
    pub generator: String,
    /// "complete", "empty" or "incomplete"
    pub status: String,
    pub stats: SplitStats,
    pub uncovered: Vec<String>,
    pub partitions: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub sequence: usize,
    pub file_name: String,
    pub buyer_id: String,
    pub label: String,
    pub record_count: usize,
    pub new_items: Vec<String>,
    pub sha256: String,
}

/// Itemized lines of one partition, as written to summary.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionSummary {
    pub file_name: String,
    pub buyer_id: String,
    pub rows: Vec<SummaryRow>,
}

impl Manifest {
    pub fn from_report(report: &SplitReport) -> Self {
        Self {
            version: "1.0.0".to_string(),
            run_id: Uuid::new_v4().to_string(),
            created_at: Utc::now().to_rfc3339(),
            source: report.source.clone(),
            generator: format!("ordersplit v{}", env!("CARGO_PKG_VERSION")),
            status: report.status.as_str().to_string(),
            stats: report.stats.clone(),
            uncovered: report.uncovered().into_iter().map(str::to_string).collect(),
            partitions: report
                .partitions
                .iter()
                .map(|p| ManifestEntry {
                    sequence: p.sequence,
                    file_name: p.file_name.clone(),
                    buyer_id: p.buyer_id.clone(),
                    label: p.label.clone(),
                    record_count: p.record_count,
                    new_items: p.new_items.iter().cloned().collect(),
                    sha256: p.sha256(),
                })
                .collect(),
        }
    }
}

pub fn summaries(report: &SplitReport) -> Vec<PartitionSummary> {
    report
        .partitions
        .iter()
        .map(|p| PartitionSummary {
            file_name: p.file_name.clone(),
            buyer_id: p.buyer_id.clone(),
            rows: p.summary.clone(),
        })
        .collect()
}
