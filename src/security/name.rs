use crate::error::SplitError;

/// Characters that are path separators or reserved on common filesystems
const RESERVED: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Device names Windows refuses as file stems
const DEVICE_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

pub struct FileNameSanitizer;

impl FileNameSanitizer {
    /// Turn a label built from record content into a single file-name
    /// component:
    /// - Separators and reserved characters become `_`
    /// - Control characters become `_`
    /// - Leading/trailing dots and whitespace are dropped (no `..`, no hidden files)
    ///
    /// Returns an error when nothing usable remains.
    pub fn sanitize(raw: &str) -> Result<String, SplitError> {
        let replaced: String = raw
            .chars()
            .map(|c| {
                if c.is_control() || RESERVED.contains(&c) {
                    '_'
                } else {
                    c
                }
            })
            .collect();

        let trimmed = replaced.trim_matches(|c: char| c == '.' || c.is_whitespace());

        if trimmed.is_empty() || trimmed.chars().all(|c| c == '_') {
            return Err(SplitError::InvalidFileName(format!(
                "No usable characters in: {:?}",
                raw
            )));
        }

        let stem = trimmed.split('.').next().unwrap_or(trimmed);
        if DEVICE_NAMES
            .iter()
            .any(|device| device.eq_ignore_ascii_case(stem))
        {
            return Ok(format!("_{}", trimmed));
        }

        Ok(trimmed.to_string())
    }
}
