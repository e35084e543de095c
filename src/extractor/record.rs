use crate::config::FormatConfig;
use crate::document::Element;

/// One purchase-order line.
///
/// The typed core is read once at extraction; `element` is the untouched
/// source element and carries every other field through to the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Position of the record in the source batch
    pub position: usize,
    pub buyer_id: Option<String>,
    pub item_id: Option<String>,
    pub group_id: Option<String>,
    pub element: Element,
}

impl Record {
    pub fn from_element(position: usize, element: Element, config: &FormatConfig) -> Self {
        Self {
            position,
            buyer_id: field_text(&element, &config.buyer_field),
            item_id: field_text(&element, &config.item_field),
            group_id: field_text(&element, &config.group_field),
            element,
        }
    }

    /// Trimmed text of a child field; `None` when missing or blank
    pub fn field(&self, name: &str) -> Option<String> {
        field_text(&self.element, name)
    }

    /// Buyer and item identifiers, when both are present
    pub fn keys(&self) -> Option<(&str, &str)> {
        match (&self.buyer_id, &self.item_id) {
            (Some(buyer), Some(item)) => Some((buyer.as_str(), item.as_str())),
            _ => None,
        }
    }
}

fn field_text(element: &Element, name: &str) -> Option<String> {
    element
        .child(name)
        .map(|field| field.text().trim().to_string())
        .filter(|text| !text.is_empty())
}
