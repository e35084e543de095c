use super::manifest::{Manifest, summaries};
use super::{MANIFEST_FILE, SUMMARY_FILE};
use crate::pipeline::SplitReport;
use anyhow::{Context, Result};
use chrono::{Datelike, Timelike};
use std::fs::File;
use std::io::{Cursor, Seek, Write};
use std::path::Path;
use tracing::info;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Packs every partition of a report into one ZIP archive
pub struct BundleWriter<'a> {
    report: &'a SplitReport,
    with_summary: bool,
}

impl<'a> BundleWriter<'a> {
    pub fn new(report: &'a SplitReport) -> Self {
        Self {
            report,
            with_summary: false,
        }
    }

    /// Also add summary.json with the itemized rows of each partition
    pub fn with_summary(mut self, enabled: bool) -> Self {
        self.with_summary = enabled;
        self
    }

    /// Write the archive to `output_path`
    pub fn write_to_file(&self, output_path: &Path) -> Result<()> {
        let file = File::create(output_path)
            .context(format!("Failed to create bundle: {}", output_path.display()))?;
        self.write_to(file)?;

        info!(
            path = %output_path.display(),
            partitions = self.report.partitions.len(),
            "wrote bundle"
        );
        Ok(())
    }

    /// Build the archive in memory
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let cursor = self.write_to(Cursor::new(Vec::new()))?;
        Ok(cursor.into_inner())
    }

    fn write_to<W: Write + Seek>(&self, sink: W) -> Result<W> {
        let mut zip = ZipWriter::new(sink);
        let options = entry_options(chrono::Local::now());

        for partition in &self.report.partitions {
            zip.start_file(partition.file_name.as_str(), options)
                .context(format!("Failed to start {} in bundle", partition.file_name))?;
            zip.write_all(&partition.bytes)
                .context(format!("Failed to write {} to bundle", partition.file_name))?;
        }

        zip.start_file(MANIFEST_FILE, options)
            .context("Failed to start manifest in bundle")?;
        let manifest_json = serde_json::to_string_pretty(&Manifest::from_report(self.report))
            .context("Failed to serialize manifest")?;
        zip.write_all(manifest_json.as_bytes())
            .context("Failed to write manifest to bundle")?;

        if self.with_summary {
            zip.start_file(SUMMARY_FILE, options)
                .context("Failed to start summary in bundle")?;
            let summary_json = serde_json::to_string_pretty(&summaries(self.report))
                .context("Failed to serialize summary")?;
            zip.write_all(summary_json.as_bytes())
                .context("Failed to write summary to bundle")?;
        }

        zip.finish().context("Failed to finalize bundle")
    }
}

/// In-memory ZIP of a report, for callers that hand the archive on as a download
pub fn bundle_bytes(report: &SplitReport, with_summary: bool) -> Result<Vec<u8>> {
    BundleWriter::new(report).with_summary(with_summary).to_bytes()
}

/// Deflated, world-readable entries stamped with the bundle's write time
fn entry_options(stamp: chrono::DateTime<chrono::Local>) -> FileOptions<'static, ()> {
    FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644)
        .last_modified_time(zip_time(&stamp))
}

/// ZIP timestamps only cover 1980..=2107; anything else falls back to the format's epoch
pub(super) fn zip_time(stamp: &chrono::DateTime<chrono::Local>) -> zip::DateTime {
    let (Ok(year), Ok(month), Ok(day), Ok(hour), Ok(minute), Ok(second)) = (
        u16::try_from(stamp.year()),
        u8::try_from(stamp.month()),
        u8::try_from(stamp.day()),
        u8::try_from(stamp.hour()),
        u8::try_from(stamp.minute()),
        u8::try_from(stamp.second()),
    ) else {
        return zip::DateTime::default();
    };
    zip::DateTime::from_date_and_time(year, month, day, hour, minute, second).unwrap_or_default()
}
