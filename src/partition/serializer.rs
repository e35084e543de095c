use super::naming::NameAllocator;
use super::summary::SummaryRow;
use crate::config::{FormatConfig, NamespaceBinding};
use crate::coverage::Selection;
use crate::document::WriteOptions;
use crate::error::SplitError;
use crate::extractor::{Record, RecordBatch};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

/// One buyer's sub-batch, serialized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// 1-based position in selection order
    pub sequence: usize,
    pub buyer_id: String,
    /// Group label of the first record, or the missing-group sentinel
    pub label: String,
    pub file_name: String,
    /// Items this partition added to the coverage
    pub new_items: BTreeSet<String>,
    /// Every item present in the partition
    pub items: BTreeSet<String>,
    pub record_count: usize,
    pub bytes: Vec<u8>,
    pub summary: Vec<SummaryRow>,
}

impl Partition {
    /// Hex SHA-256 of the serialized document
    pub fn sha256(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.bytes);
        hex::encode(hasher.finalize())
    }
}

/// Qualified attribute key plus the declaration needed to make it valid
#[derive(Debug, Clone)]
struct ResolvedAttribute {
    key: String,
    declaration: Option<(String, String)>,
}

impl ResolvedAttribute {
    fn resolve(batch: &RecordBatch, binding: &NamespaceBinding) -> Self {
        match batch.document.prefix_in_scope(&batch.section, &binding.uri) {
            Some(prefix) => Self {
                key: format!("{}:{}", prefix, binding.attribute),
                declaration: None,
            },
            None => Self {
                key: format!("{}:{}", binding.prefix, binding.attribute),
                declaration: Some((format!("xmlns:{}", binding.prefix), binding.uri.clone())),
            },
        }
    }
}

/// Rewrites the record section of a batch's document once per selection.
///
/// The source document is treated as a read-only template: every call
/// works on its own clone, so no partition can see another's records.
pub struct PartitionSerializer<'a> {
    batch: &'a RecordBatch,
    config: &'a FormatConfig,
    identity: ResolvedAttribute,
    row_order: ResolvedAttribute,
    options: WriteOptions,
}

impl<'a> PartitionSerializer<'a> {
    pub fn new(batch: &'a RecordBatch, config: &'a FormatConfig) -> Self {
        Self {
            batch,
            config,
            identity: ResolvedAttribute::resolve(batch, &config.identity),
            row_order: ResolvedAttribute::resolve(batch, &config.row_order),
            options: WriteOptions {
                indent: config.indent,
            },
        }
    }

    /// Serialize the records of `selection` as partition number `sequence`,
    /// claiming its file name from `names`
    pub fn serialize(
        &self,
        sequence: usize,
        selection: &Selection,
        names: &mut NameAllocator,
    ) -> Result<Partition, SplitError> {
        let records = self.resolve_records(&selection.records)?;
        let bytes = self.render(&records)?;

        let label = records
            .first()
            .and_then(|record| record.group_id.clone())
            .unwrap_or_else(|| self.config.missing_group_label.clone());

        let file_name = names.claim(&label, &selection.buyer_id, sequence, self.config);

        let items = records
            .iter()
            .filter_map(|record| record.item_id.clone())
            .collect();

        let summary = records
            .iter()
            .map(|record| SummaryRow::from_record(record, self.config))
            .collect();

        Ok(Partition {
            sequence,
            buyer_id: selection.buyer_id.clone(),
            label,
            file_name,
            new_items: selection.new_items.clone(),
            items,
            record_count: records.len(),
            bytes,
            summary,
        })
    }

    fn resolve_records(&self, positions: &[usize]) -> Result<Vec<&'a Record>, SplitError> {
        positions
            .iter()
            .map(|&position| {
                self.batch
                    .records
                    .get(position)
                    .ok_or(SplitError::UnknownRecord(position))
            })
            .collect()
    }

    /// Clone the template, clear the section, append `records` with fresh
    /// row identity, and write the whole document.
    fn render(&self, records: &[&Record]) -> Result<Vec<u8>, SplitError> {
        let mut document = self.batch.document.clone();
        let section = document
            .root
            .at_path_mut(&self.batch.section)
            .ok_or_else(|| SplitError::MissingSection {
                section: self.config.dataset_element.clone(),
                record: self.config.record_element.clone(),
            })?;

        section.remove_descendants_named(&self.config.record_element);

        for (key, uri) in [&self.identity, &self.row_order]
            .into_iter()
            .filter_map(|attr| attr.declaration.as_ref())
        {
            section.set_attribute(key, uri.as_str());
        }

        for (i, record) in records.iter().enumerate() {
            let mut element = record.element.clone();
            element.set_attribute(
                &self.identity.key,
                format!("{}{}", self.config.record_element, i + 1),
            );
            element.set_attribute(&self.row_order.key, i.to_string());
            section.push_element(element);
        }

        document.to_bytes(&self.options)
    }
}
