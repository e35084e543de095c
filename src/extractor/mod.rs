mod record;


pub use record::Record;

use crate::config::FormatConfig;
use crate::document::{Document, ElementPath};
use crate::error::SplitError;
use std::fs;
use std::path::Path;
use tracing::debug;

/// A parsed batch: the document template plus its records in source order
#[derive(Debug, Clone)]
pub struct RecordBatch {
    /// Source document; never mutated after extraction
    pub document: Document,
    /// Path from the root to the repeating-record section
    pub section: ElementPath,
    pub records: Vec<Record>,
}

/// Outcome of extracting records from a document
#[derive(Debug, Clone)]
pub enum Extraction {
    /// Well-formed document without any record elements
    Empty,
    Batch(RecordBatch),
}

impl Extraction {
    pub fn into_batch(self) -> Option<RecordBatch> {
        match self {
            Extraction::Empty => None,
            Extraction::Batch(batch) => Some(batch),
        }
    }
}

/// Parse raw document bytes and collect the record elements under the
/// repeating-record section.
pub fn extract(bytes: &[u8], config: &FormatConfig) -> Result<Extraction, SplitError> {
    let document = Document::parse(bytes)?;
    extract_document(document, config)
}

/// Read and extract a batch file
pub fn extract_path(path: &Path, config: &FormatConfig) -> Result<Extraction, SplitError> {
    let bytes = fs::read(path)?;
    extract(&bytes, config)
}

pub fn extract_document(
    document: Document,
    config: &FormatConfig,
) -> Result<Extraction, SplitError> {
    let Some(section) = document.root.find_path(&config.dataset_element) else {
        let stray = document.root.descendants_named(&config.record_element).len();
        if stray > 0 || document.root.local_name() == config.record_element {
            return Err(SplitError::MissingSection {
                section: config.dataset_element.clone(),
                record: config.record_element.clone(),
            });
        }
        debug!(section = %config.dataset_element, "no record section in document");
        return Ok(Extraction::Empty);
    };

    let section_element = document
        .root
        .at_path(&section)
        .ok_or_else(|| SplitError::parse(0, "record section path does not resolve"))?;

    let records: Vec<Record> = section_element
        .descendants_named(&config.record_element)
        .into_iter()
        .enumerate()
        .map(|(position, element)| Record::from_element(position, element.clone(), config))
        .collect();

    if records.is_empty() {
        debug!(section = %config.dataset_element, "record section holds no records");
        return Ok(Extraction::Empty);
    }

    debug!(records = records.len(), "extracted records");

    Ok(Extraction::Batch(RecordBatch {
        document,
        section,
        records,
    }))
}
