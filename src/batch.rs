//! Batch packaging.
//!
//! Applies one operation per source image, in input order, and bundles the
//! results into a deflate-compressed ZIP archive. A single failing item
//! aborts the whole batch; no partial archive is ever returned.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::constants::FALLBACK_SOURCE_NAME;
use crate::error::{QrBuilderError, Result};

/// One uploaded image of a batch.
#[derive(Debug, Clone)]
pub struct BatchSource {
    /// Client-supplied file name, if any
    pub name: Option<String>,
    pub bytes: Vec<u8>,
}

impl BatchSource {
    pub fn new(name: Option<String>, bytes: Vec<u8>) -> Self {
        Self { name, bytes }
    }

    /// Archive entry name for this source's output.
    pub fn entry_name(&self, suffix: &str) -> String {
        archive_entry_name(self.name.as_deref(), suffix)
    }
}

/// `<stem><suffix>.png`, using `image.png` for unnamed sources.
///
/// The stem is everything before the last dot, so `.png` has an empty
/// stem. Directory components from the client are discarded.
pub fn archive_entry_name(name: Option<&str>, suffix: &str) -> String {
    let name = name
        .map(|n| n.rsplit(['/', '\\']).next().unwrap_or(n))
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(FALLBACK_SOURCE_NAME);
    let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
    format!("{}{}.png", stem, suffix)
}

/// `<dir>/<stem><suffix><ext>` next to `output_dir`, keeping the input's extension.
///
/// Inputs without an extension get `.png`.
pub fn sibling_output_name(input: &Path, output_dir: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let extension = input
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_else(|| ".png".to_string());
    output_dir.join(format!("{}{}{}", stem, suffix, extension))
}

/// Run `process` over every source and zip the outputs.
///
/// Entry names come from [`archive_entry_name`]; duplicates are kept as-is,
/// in input order.
pub fn package<F>(sources: &[BatchSource], suffix: &str, mut process: F) -> Result<Vec<u8>>
where
    F: FnMut(usize, &BatchSource) -> Result<Vec<u8>>,
{
    if sources.is_empty() {
        return Err(QrBuilderError::invalid_input(
            "At least one image is required.",
        ));
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (index, source) in sources.iter().enumerate() {
        let entry = source.entry_name(suffix);
        let bytes = process(index, source).map_err(|e| {
            tracing::warn!(index, entry = %entry, error = %e, "Batch item failed, aborting batch");
            e
        })?;

        zip.start_file(entry.as_str(), options)?;
        zip.write_all(&bytes)?;
        tracing::debug!(index, entry = %entry, bytes = bytes.len(), "Added batch entry");
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
