
use crate::error::SplitError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// XML namespace used by the diffgram row identity attribute
pub const DIFFGRAM_NAMESPACE: &str = "urn:schemas-microsoft-com:xml-diffgram-v1";

/// XML namespace used by the DataSet row order attribute
pub const MSDATA_NAMESPACE: &str = "urn:schemas-microsoft-com:xml-msdata";

/// Label used when a partition has no group field to name it by
pub const DEFAULT_MISSING_GROUP: &str = "sem-grupo";

/// A namespaced attribute the serializer regenerates on every record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceBinding {
    /// Prefix declared when the document does not already bind `uri`
    pub prefix: String,
    pub uri: String,
    /// Local name of the attribute (e.g. "id", "rowOrder")
    pub attribute: String,
}

impl NamespaceBinding {
    pub fn new(
        prefix: impl Into<String>,
        uri: impl Into<String>,
        attribute: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            uri: uri.into(),
            attribute: attribute.into(),
        }
    }

    pub fn diffgram_id() -> Self {
        Self::new("diffgr", DIFFGRAM_NAMESPACE, "id")
    }

    pub fn msdata_row_order() -> Self {
        Self::new("msdata", MSDATA_NAMESPACE, "rowOrder")
    }
}

/// Describes the exchange format of a purchase-order export.
///
/// Passed explicitly to the extractor and the partition serializer, scoped
/// to one run. Every field has a default matching the DataSet diffgram
/// export, so a JSON config file only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Element holding the repeating records
    pub dataset_element: String,
    /// Repeating record element
    pub record_element: String,
    pub buyer_field: String,
    pub item_field: String,
    pub group_field: String,
    pub description_field: String,
    pub quantity_field: String,
    pub package_quantity_field: String,
    pub identity: NamespaceBinding,
    pub row_order: NamespaceBinding,
    pub missing_group_label: String,
    /// Joins label, buyer and index in output names
    pub name_separator: String,
    pub index_in_name: bool,
    /// Output file extension, without the dot
    pub extension: String,
    /// Indentation width for output documents; 0 writes compact XML
    pub indent: usize,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            dataset_element: "NewDataSet".to_string(),
            record_element: "Pedidos".to_string(),
            buyer_field: "CNPJLojaCompradora".to_string(),
            item_field: "CodigoFab".to_string(),
            group_field: "Grupo".to_string(),
            description_field: "Descricao".to_string(),
            quantity_field: "Quantidade".to_string(),
            package_quantity_field: "QtdeEmbalagem".to_string(),
            identity: NamespaceBinding::diffgram_id(),
            row_order: NamespaceBinding::msdata_row_order(),
            missing_group_label: DEFAULT_MISSING_GROUP.to_string(),
            name_separator: "_".to_string(),
            index_in_name: false,
            extension: "xml".to_string(),
            indent: 2,
        }
    }
}

impl FormatConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config file, falling back to defaults for missing keys
    pub fn from_json_file(path: &Path) -> Result<Self, SplitError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, SplitError> {
        let config: FormatConfig =
            serde_json::from_str(raw).map_err(|e| SplitError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configs that could never match a record or name an output
    pub fn validate(&self) -> Result<(), SplitError> {
        let required = [
            ("dataset_element", &self.dataset_element),
            ("record_element", &self.record_element),
            ("buyer_field", &self.buyer_field),
            ("item_field", &self.item_field),
            ("group_field", &self.group_field),
            ("identity.prefix", &self.identity.prefix),
            ("identity.attribute", &self.identity.attribute),
            ("row_order.prefix", &self.row_order.prefix),
            ("row_order.attribute", &self.row_order.attribute),
            ("extension", &self.extension),
        ];

        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(SplitError::Config(format!("`{}` must not be empty", key)));
            }
        }

        if self.dataset_element == self.record_element {
            return Err(SplitError::Config(
                "`dataset_element` and `record_element` must differ".to_string(),
            ));
        }

        Ok(())
    }

    pub fn dataset_element(mut self, name: impl Into<String>) -> Self {
        self.dataset_element = name.into();
        self
    }

    pub fn record_element(mut self, name: impl Into<String>) -> Self {
        self.record_element = name.into();
        self
    }

    pub fn buyer_field(mut self, name: impl Into<String>) -> Self {
        self.buyer_field = name.into();
        self
    }

    pub fn item_field(mut self, name: impl Into<String>) -> Self {
        self.item_field = name.into();
        self
    }

    pub fn group_field(mut self, name: impl Into<String>) -> Self {
        self.group_field = name.into();
        self
    }

    pub fn missing_group_label(mut self, label: impl Into<String>) -> Self {
        self.missing_group_label = label.into();
        self
    }

    pub fn index_in_name(mut self, enabled: bool) -> Self {
        self.index_in_name = enabled;
        self
    }

    pub fn indent(mut self, width: usize) -> Self {
        self.indent = width;
        self
    }
}
