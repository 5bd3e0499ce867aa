//! Turning uploaded files into datasets.
//!
//! Plain `.txt`/`.csv` uploads are decoded directly. For `.zip` and `.rar`
//! uploads the first entry (in archive listing order) whose name ends in
//! `.txt` or `.csv` is decoded instead, and the dataset takes that entry's
//! name. Ingestion is a pure transform: callers append the result to the
//! store themselves.

mod error;
pub mod lines;

pub use error::{extension, ArchiveKind, IngestError};

use crate::store::Dataset;
use std::borrow::Cow;
use std::io::{Cursor, Read};
use zip::ZipArchive;

/// Largest archive entry that will be decompressed
const MAX_ENTRY_BYTES: u64 = 512 * 1024 * 1024;

/// A text payload pulled out of an upload
struct TextEntry<'a> {
    name: String,
    content: Cow<'a, [u8]>,
}

/// Whether an archive entry name looks like a text or CSV file
pub fn is_text_entry(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.ends_with(".txt") || lower.ends_with(".csv")
}

/// Decode an uploaded file into a dataset.
///
/// `size` of the result is the length of `bytes` (the whole upload, not the
/// extracted entry).
pub fn ingest(bytes: &[u8], file_name: &str) -> Result<Dataset, IngestError> {
    let kind = ArchiveKind::from_file_name(file_name)
        .ok_or_else(|| IngestError::UnsupportedFormat(extension(file_name)))?;

    let entry = match kind {
        ArchiveKind::Text => TextEntry {
            name: file_name.to_string(),
            content: Cow::Borrowed(bytes),
        },
        ArchiveKind::Zip => extract_zip(bytes)?,
        ArchiveKind::Rar => extract_rar(bytes)?,
    };

    let text = lines::decode_lossy(&entry.content);
    let data = lines::split_lines(&text);

    Ok(Dataset::new(entry.name, data, bytes.len() as u64))
}

fn extract_zip(bytes: &[u8]) -> Result<TextEntry<'static>, IngestError> {
    let archive_error = |e: zip::result::ZipError| IngestError::Archive {
        kind: ArchiveKind::Zip,
        detail: e.to_string(),
    };

    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(archive_error)?;

    // Raw headers only: entries that are not picked are never decrypted or inflated
    let mut selected = None;
    for index in 0..archive.len() {
        let entry = archive.by_index_raw(index).map_err(archive_error)?;
        if !entry.is_dir() && is_text_entry(entry.name()) {
            selected = Some(index);
            break;
        }
    }

    let Some(index) = selected else {
        return Err(IngestError::NoTextEntry(ArchiveKind::Zip));
    };

    let entry = archive.by_index(index).map_err(archive_error)?;
    let name = entry.name().to_string();
    let mut content = Vec::new();
    entry
        .take(MAX_ENTRY_BYTES + 1)
        .read_to_end(&mut content)
        .map_err(|e| IngestError::Failed(format!("reading {}: {}", name, e)))?;

    if content.len() as u64 > MAX_ENTRY_BYTES {
        return Err(oversized(&name));
    }

    Ok(TextEntry {
        name,
        content: Cow::Owned(content),
    })
}

fn oversized(name: &str) -> IngestError {
    IngestError::Failed(format!("{} is larger than {} bytes", name, MAX_ENTRY_BYTES))
}

#[cfg(feature = "rar")]
fn rar_error(e: impl std::fmt::Display) -> IngestError {
    IngestError::Archive {
        kind: ArchiveKind::Rar,
        detail: e.to_string(),
    }
}

/// unrar only reads from disk, so the upload is spooled to a temp file first
#[cfg(feature = "rar")]
fn extract_rar(bytes: &[u8]) -> Result<TextEntry<'static>, IngestError> {
    use std::io::Write;

    let mut spool = tempfile::Builder::new()
        .prefix("dbseek-")
        .suffix(".rar")
        .tempfile()
        .map_err(|e| IngestError::Failed(format!("spooling archive: {}", e)))?;
    spool
        .write_all(bytes)
        .and_then(|_| spool.flush())
        .map_err(|e| IngestError::Failed(format!("spooling archive: {}", e)))?;

    let mut archive = unrar::Archive::new(spool.path())
        .open_for_processing()
        .map_err(rar_error)?;

    while let Some(header) = archive.read_header().map_err(rar_error)? {
        let (name, is_file, unpacked_size) = {
            let entry = header.entry();
            (
                entry.filename.to_string_lossy().into_owned(),
                entry.is_file(),
                entry.unpacked_size,
            )
        };

        if is_file && is_text_entry(&name) {
            if unpacked_size > MAX_ENTRY_BYTES {
                return Err(oversized(&name));
            }
            let (content, _) = header.read().map_err(rar_error)?;
            return Ok(TextEntry {
                name,
                content: Cow::Owned(content),
            });
        }

        archive = header.skip().map_err(rar_error)?;
    }

    Err(IngestError::NoTextEntry(ArchiveKind::Rar))
}

#[cfg(not(feature = "rar"))]
fn extract_rar(_bytes: &[u8]) -> Result<TextEntry<'static>, IngestError> {
    Err(IngestError::Archive {
        kind: ArchiveKind::Rar,
        detail: "rar backend unavailable".to_string(),
    })
}
