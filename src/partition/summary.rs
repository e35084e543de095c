use crate::config::FormatConfig;
use crate::extractor::Record;
use serde::{Deserialize, Serialize};

/// One itemized line of a partition; missing fields are ""
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub item_id: String,
    pub description: String,
    pub quantity: String,
    pub package_quantity: String,
}

impl SummaryRow {
    pub fn from_record(record: &Record, config: &FormatConfig) -> Self {
        Self {
            item_id: record.item_id.clone().unwrap_or_default(),
            description: record.field(&config.description_field).unwrap_or_default(),
            quantity: record.field(&config.quantity_field).unwrap_or_default(),
            package_quantity: record
                .field(&config.package_quantity_field)
                .unwrap_or_default(),
        }
    }
}
