use std::fmt;
use thiserror::Error;

/// Container formats accepted for upload, keyed by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// Plain `.txt` or `.csv` file
    Text,
    Zip,
    Rar,
}

impl ArchiveKind {
    /// Classify a file by its (case-insensitive) extension
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        match extension(file_name).as_str() {
            "txt" | "csv" => Some(ArchiveKind::Text),
            "zip" => Some(ArchiveKind::Zip),
            "rar" => Some(ArchiveKind::Rar),
            _ => None,
        }
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveKind::Text => write!(f, "text"),
            ArchiveKind::Zip => write!(f, "ZIP"),
            ArchiveKind::Rar => write!(f, "RAR"),
        }
    }
}

/// Lowercased text after the last `.`, empty when the name has no dot
pub fn extension(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}

/// Reasons an upload could not be turned into a dataset.
///
/// The messages are shown to the uploading user as-is.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Unsupported file format: .{0}")]
    UnsupportedFormat(String),

    #[error("No txt or csv file in the {0} archive")]
    NoTextEntry(ArchiveKind),

    #[error("{kind} error: {detail}")]
    Archive { kind: ArchiveKind, detail: String },

    #[error("Error: {0}")]
    Failed(String),
}
