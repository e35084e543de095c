use super::index::CoverageIndex;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// One greedy pick: a buyer, all of its records, and the items it newly covers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub buyer_id: String,
    /// Positions of every record of the buyer, not only the ones adding coverage
    pub records: Vec<usize>,
    pub new_items: BTreeSet<String>,
}

/// All selections of a run plus whatever could not be covered
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoverPlan {
    pub selections: Vec<Selection>,
    pub uncovered: BTreeSet<String>,
}

impl CoverPlan {
    pub fn is_complete(&self) -> bool {
        self.uncovered.is_empty()
    }
}

/// Greedy maximum-coverage selection over a [`CoverageIndex`].
///
/// Each call to `next` picks the buyer whose items cover the most of the
/// still-uncovered universe. Ties go to the buyer seen first in the index.
/// Iteration ends once the universe is covered, or when no buyer adds
/// anything (see [`CoverSelector::is_stalled`]).
pub struct CoverSelector<'a> {
    index: &'a CoverageIndex,
    covered: BTreeSet<String>,
    stalled: bool,
    iterations: usize,
}

impl<'a> CoverSelector<'a> {
    pub fn new(index: &'a CoverageIndex) -> Self {
        Self {
            index,
            covered: BTreeSet::new(),
            stalled: false,
            iterations: 0,
        }
    }

    pub fn covered(&self) -> &BTreeSet<String> {
        &self.covered
    }

    /// Universe items not covered so far
    pub fn uncovered(&self) -> BTreeSet<String> {
        self.index
            .universe
            .difference(&self.covered)
            .cloned()
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        // covered only ever holds universe items
        self.covered.len() == self.index.universe.len()
    }

    /// True once an iteration found no buyer adding coverage before completion
    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    fn is_new(&self, item: &str) -> bool {
        self.index.universe.contains(item) && !self.covered.contains(item)
    }
}

impl Iterator for CoverSelector<'_> {
    type Item = Selection;

    fn next(&mut self) -> Option<Selection> {
        if self.stalled || self.is_complete() {
            return None;
        }

        let mut best: Option<(usize, usize)> = None;
        for (slot, buyer) in self.index.buyers.iter().enumerate() {
            let gain = buyer.items.iter().filter(|item| self.is_new(item)).count();
            if gain > best.map_or(0, |(_, g)| g) {
                best = Some((slot, gain));
            }
        }

        let Some((slot, gain)) = best else {
            self.stalled = true;
            let uncovered = self.uncovered();
            warn!(
                uncovered = uncovered.len(),
                "no buyer covers the remaining items"
            );
            return None;
        };

        let buyer = &self.index.buyers[slot];
        let new_items: BTreeSet<String> = buyer
            .items
            .iter()
            .filter(|item| self.is_new(item))
            .cloned()
            .collect();
        self.covered.extend(new_items.iter().cloned());
        self.iterations += 1;

        debug!(
            buyer = %buyer.buyer_id,
            gain,
            covered = self.covered.len(),
            universe = self.index.universe.len(),
            "selected buyer"
        );

        Some(Selection {
            buyer_id: buyer.buyer_id.clone(),
            records: buyer.records.clone(),
            new_items,
        })
    }
}

/// Run the selector to completion
pub fn select_cover(index: &CoverageIndex) -> CoverPlan {
    let mut selector = CoverSelector::new(index);
    let selections: Vec<Selection> = selector.by_ref().collect();
    CoverPlan {
        selections,
        uncovered: selector.uncovered(),
    }
}
