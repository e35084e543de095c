use crate::extractor::Record;
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Every indexable record of one buyer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuyerRecords {
    pub buyer_id: String,
    /// Record positions in source order
    pub records: Vec<usize>,
    /// Distinct item ids across those records
    pub items: BTreeSet<String>,
}

/// Buyer → records mapping plus the universe of coverable item ids.
///
/// Buyers keep the order in which they first appear among records that
/// carry both a buyer id and an item id. The selector relies on that order
/// to break ties.
#[derive(Debug, Clone, Default)]
pub struct CoverageIndex {
    pub(crate) buyers: Vec<BuyerRecords>,
    lookup: HashMap<String, usize>,
    pub(crate) universe: BTreeSet<String>,
    skipped: usize,
}

impl CoverageIndex {
    pub fn build(records: &[Record]) -> Self {
        let mut index = Self::default();

        for record in records {
            let Some((buyer, item)) = record.keys() else {
                index.skipped += 1;
                continue;
            };

            let slot = match index.lookup.get(buyer) {
                Some(&slot) => slot,
                None => {
                    index.buyers.push(BuyerRecords {
                        buyer_id: buyer.to_string(),
                        records: Vec::new(),
                        items: BTreeSet::new(),
                    });
                    index.lookup.insert(buyer.to_string(), index.buyers.len() - 1);
                    index.buyers.len() - 1
                }
            };

            let entry = &mut index.buyers[slot];
            entry.records.push(record.position);
            entry.items.insert(item.to_string());
            index.universe.insert(item.to_string());
        }

        if index.skipped > 0 {
            debug!(
                skipped = index.skipped,
                "records without buyer or item id left out of the index"
            );
        }

        index
    }

    /// Buyers in first-appearance order
    pub fn buyers(&self) -> &[BuyerRecords] {
        &self.buyers
    }

    pub fn buyer(&self, buyer_id: &str) -> Option<&BuyerRecords> {
        self.lookup.get(buyer_id).map(|&slot| &self.buyers[slot])
    }

    pub fn universe(&self) -> &BTreeSet<String> {
        &self.universe
    }

    /// Records left out for lacking a buyer or item id
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn buyer_count(&self) -> usize {
        self.buyers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buyers.is_empty()
    }
}
