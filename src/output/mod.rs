mod bundle;
mod manifest;


pub use bundle::{BundleWriter, bundle_bytes};
pub use manifest::{Manifest, ManifestEntry, PartitionSummary, summaries};

use crate::pipeline::SplitReport;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const SUMMARY_FILE: &str = "summary.json";

/// Write one file per partition into `dir`, plus manifest.json and,
/// when asked, summary.json. Returns the partition file paths.
pub fn write_partitions(
    report: &SplitReport,
    dir: &Path,
    with_summary: bool,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .context(format!("Failed to create output directory: {}", dir.display()))?;

    let mut written = Vec::with_capacity(report.partitions.len());
    for partition in &report.partitions {
        let path = dir.join(&partition.file_name);
        fs::write(&path, &partition.bytes)
            .context(format!("Failed to write partition: {}", path.display()))?;
        info!(path = %path.display(), buyer = %partition.buyer_id, "wrote partition");
        written.push(path);
    }

    let manifest = Manifest::from_report(report);
    let manifest_json =
        serde_json::to_string_pretty(&manifest).context("Failed to serialize manifest")?;
    fs::write(dir.join(MANIFEST_FILE), manifest_json).context("Failed to write manifest")?;

    if with_summary {
        let summary_json = serde_json::to_string_pretty(&summaries(report))
            .context("Failed to serialize summary")?;
        fs::write(dir.join(SUMMARY_FILE), summary_json).context("Failed to write summary")?;
    }

    Ok(written)
}
