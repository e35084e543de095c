mod index;
mod selector;


pub use index::{BuyerRecords, CoverageIndex};
pub use selector::{CoverPlan, CoverSelector, Selection, select_cover};
