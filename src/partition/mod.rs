mod naming;
mod serializer;
mod summary;

#[cfg(test)]
mod tests;

pub use naming::{NameAllocator, output_name};
pub use serializer::{Partition, PartitionSerializer};
pub use summary::SummaryRow;
