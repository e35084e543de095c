
use crate::config::FormatConfig;
use crate::coverage::{CoverSelector, CoverageIndex};
use crate::error::SplitError;
use crate::extractor::extract;
use crate::partition::{NameAllocator, Partition, PartitionSerializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitStatus {
    /// Every item of the universe is in some partition
    Complete,
    /// No record carried both a buyer id and an item id
    EmptyBatch,
    /// Selection stalled; partitions produced so far are kept
    Incomplete { uncovered: BTreeSet<String> },
}

impl SplitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitStatus::Complete => "complete",
            SplitStatus::EmptyBatch => "empty",
            SplitStatus::Incomplete { .. } => "incomplete",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitStats {
    /// Record elements found in the section
    pub record_count: usize,
    /// Records left out for lacking a buyer or item id
    pub skipped_count: usize,
    pub buyer_count: usize,
    /// Size of the item universe
    pub item_count: usize,
    pub partition_count: usize,
}

/// Everything one run produced
#[derive(Debug, Clone)]
pub struct SplitReport {
    /// Where the batch came from, when it was read from a file
    pub source: Option<String>,
    pub status: SplitStatus,
    /// Partitions in selection order
    pub partitions: Vec<Partition>,
    pub stats: SplitStats,
}

impl SplitReport {
    fn empty(stats: SplitStats) -> Self {
        Self {
            source: None,
            status: SplitStatus::EmptyBatch,
            partitions: Vec::new(),
            stats,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == SplitStatus::Complete
    }

    /// Items no partition could cover; empty unless the run stalled
    pub fn uncovered(&self) -> Vec<&str> {
        match &self.status {
            SplitStatus::Incomplete { uncovered } => {
                uncovered.iter().map(String::as_str).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Union of the items held by all partitions
    pub fn covered_items(&self) -> BTreeSet<&str> {
        self.partitions
            .iter()
            .flat_map(|p| p.items.iter().map(String::as_str))
            .collect()
    }
}

/// Runs extraction, indexing, greedy selection and serialization for one batch
#[derive(Debug, Clone, Default)]
pub struct BatchSplitter {
    config: FormatConfig,
}

impl BatchSplitter {
    pub fn new(config: FormatConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FormatConfig {
        &self.config
    }

    /// Read a batch file and split it
    pub fn split_file(&self, path: &Path) -> Result<SplitReport, SplitError> {
        info!(path = %path.display(), "reading batch");
        let bytes = fs::read(path)?;
        let mut report = self.split_bytes(&bytes)?;
        report.source = Some(path.display().to_string());
        Ok(report)
    }

    /// Split an in-memory batch.
    ///
    /// Malformed XML fails the whole run. An empty batch or an uncoverable
    /// remainder is reported through [`SplitReport::status`].
    pub fn split_bytes(&self, bytes: &[u8]) -> Result<SplitReport, SplitError> {
        self.config.validate()?;

        let Some(batch) = extract(bytes, &self.config)?.into_batch() else {
            warn!("no records found in batch");
            return Ok(SplitReport::empty(SplitStats::default()));
        };

        let index = CoverageIndex::build(&batch.records);
        let mut stats = SplitStats {
            record_count: batch.records.len(),
            skipped_count: index.skipped(),
            buyer_count: index.buyer_count(),
            item_count: index.universe().len(),
            partition_count: 0,
        };

        if index.is_empty() {
            warn!(
                records = stats.record_count,
                "no record carries both a buyer id and an item id"
            );
            return Ok(SplitReport::empty(stats));
        }

        info!(
            records = stats.record_count,
            buyers = stats.buyer_count,
            items = stats.item_count,
            "indexed batch"
        );

        let serializer = PartitionSerializer::new(&batch, &self.config);
        let mut names = NameAllocator::new();
        let mut selector = CoverSelector::new(&index);
        let mut partitions = Vec::new();

        for selection in selector.by_ref() {
            let sequence = partitions.len() + 1;
            let partition = serializer.serialize(sequence, &selection, &mut names)?;

            info!(
                file = %partition.file_name,
                buyer = %partition.buyer_id,
                records = partition.record_count,
                new_items = partition.new_items.len(),
                "partition ready"
            );
            partitions.push(partition);
        }

        let status = if selector.is_complete() {
            SplitStatus::Complete
        } else {
            let uncovered = selector.uncovered();
            warn!(
                missing = ?uncovered,
                "items could not be covered by any buyer"
            );
            SplitStatus::Incomplete { uncovered }
        };

        stats.partition_count = partitions.len();

        Ok(SplitReport {
            source: None,
            status,
            partitions,
            stats,
        })
    }
}
