//! Temporary-file staging for path-based codecs.
//!
//! A [`StagedJob`] owns a unique temporary directory holding the uploaded
//! picture and the codec output. The directory is removed when the job is
//! dropped, on success and on every error path alike.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::error::{QrBuilderError, Result};

const OUTPUT_NAME: &str = "output.png";

#[derive(Debug)]
pub struct StagedJob {
    dir: TempDir,
    input: PathBuf,
    output: PathBuf,
}

impl StagedJob {
    /// Write `picture` into a fresh temporary directory.
    pub fn new(picture: &[u8]) -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("qr-builder-").tempdir()?;

        let extension = image::guess_format(picture)
            .ok()
            .and_then(|format| format.extensions_str().first().copied())
            .unwrap_or("png");
        let input = dir.path().join(format!("input.{}", extension));
        std::fs::write(&input, picture)?;
        let output = dir.path().join(OUTPUT_NAME);

        tracing::debug!(dir = %dir.path().display(), "Staged codec job");
        Ok(Self { dir, input, output })
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Read the codec's output.
    pub fn read_output(&self) -> Result<Vec<u8>> {
        if !self.output.is_file() {
            return Err(QrBuilderError::internal("Codec produced no output"));
        }
        Ok(std::fs::read(&self.output)?)
    }
}
