use crate::config::FormatConfig;
use crate::error::SplitError;
use crate::security::FileNameSanitizer;
use std::collections::HashSet;
use tracing::warn;

/// Output file name for a partition: `{label}{sep}{buyer}[{sep}{index}].{ext}`
pub fn output_name(
    label: &str,
    buyer_id: &str,
    index: Option<usize>,
    config: &FormatConfig,
) -> Result<String, SplitError> {
    let sep = &config.name_separator;
    let raw = match index {
        Some(index) => format!("{}{}{}{}{}", label, sep, buyer_id, sep, index),
        None => format!("{}{}{}", label, sep, buyer_id),
    };

    let stem = FileNameSanitizer::sanitize(&raw)?;
    Ok(format!("{}.{}", stem, config.extension.trim_start_matches('.')))
}

/// Name used when a buyer's label and id leave nothing usable after sanitizing
fn fallback_name(sequence: usize, config: &FormatConfig) -> String {
    let raw = format!(
        "{}{}{}",
        config.missing_group_label, config.name_separator, sequence
    );
    let stem = FileNameSanitizer::sanitize(&raw).unwrap_or_else(|_| sequence.to_string());
    format!("{}.{}", stem, config.extension.trim_start_matches('.'))
}

/// Hands out unique file names within one run.
///
/// Distinct buyers can sanitize to the same name; later claims get the
/// sequence index appended. A buyer whose name sanitizes to nothing gets
/// `{missing_group_label}{sep}{sequence}` instead, so naming never fails a run.
#[derive(Debug, Default)]
pub struct NameAllocator {
    taken: HashSet<String>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(
        &mut self,
        label: &str,
        buyer_id: &str,
        sequence: usize,
        config: &FormatConfig,
    ) -> String {
        let index = config.index_in_name.then_some(sequence);
        let first = match output_name(label, buyer_id, index, config) {
            Ok(name) => name,
            Err(e) => {
                warn!(buyer = %buyer_id, error = %e, "using fallback file name");
                fallback_name(sequence, config)
            }
        };
        if self.taken.insert(first.clone()) {
            return first;
        }

        let mut suffix = sequence;
        loop {
            let candidate = output_name(label, buyer_id, Some(suffix), config)
                .unwrap_or_else(|_| fallback_name(suffix, config));
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }
}
