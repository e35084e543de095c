// Public API exports
pub mod config;
pub mod coverage;
pub mod document;
pub mod error;
pub mod extractor;
pub mod output;
pub mod partition;
pub mod pipeline;
pub mod scan;
pub mod security;

#[cfg(test)]
mod fixtures;

// Re-export main types for convenience
pub use config::{FormatConfig, NamespaceBinding};
pub use error::SplitError;

pub use document::{Document, Element, Node, WriteOptions};

pub use extractor::{Extraction, Record, RecordBatch, extract, extract_path};

pub use coverage::{CoverPlan, CoverSelector, CoverageIndex, Selection, select_cover};

pub use partition::{NameAllocator, Partition, PartitionSerializer, SummaryRow};

pub use pipeline::{BatchSplitter, SplitReport, SplitStats, SplitStatus};

pub use output::{BundleWriter, Manifest, bundle_bytes, write_partitions};
