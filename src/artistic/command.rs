//! External amzqr-compatible artistic codec.
//!
//! Runs a command with the amzqr command-line contract:
//!
//! ```text
//! <program> DATA -v VERSION -l H -p PICTURE [-c] -con CONTRAST -bri BRIGHTNESS -n NAME -d DIR
//! ```

use std::path::{Path, PathBuf};
use std::process::Command;

use super::{codec::ArtisticCodec, ArtisticRequest};
use crate::error::{QrBuilderError, Result};

#[derive(Debug, Clone)]
pub struct AmzqrCommand {
    program: PathBuf,
}

impl AmzqrCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments for one invocation, split out for inspection.
    pub fn arguments(&self, request: &ArtisticRequest, picture: &Path, output: &Path) -> Result<Vec<String>> {
        let name = output
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| QrBuilderError::internal("Output path has no file name"))?;
        let dir = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut args = vec![
            request.data.clone(),
            "-v".to_string(),
            request.version.to_string(),
            "-l".to_string(),
            "H".to_string(),
            "-p".to_string(),
            picture.display().to_string(),
        ];
        if request.colorized {
            args.push("-c".to_string());
        }
        args.extend([
            "-con".to_string(),
            request.contrast.to_string(),
            "-bri".to_string(),
            request.brightness.to_string(),
            "-n".to_string(),
            name.to_string(),
            "-d".to_string(),
            dir.display().to_string(),
        ]);
        Ok(args)
    }
}

impl ArtisticCodec for AmzqrCommand {
    fn name(&self) -> &'static str {
        "amzqr"
    }

    fn render(&self, request: &ArtisticRequest, picture: &Path, output: &Path) -> Result<()> {
        if !picture.is_file() {
            return Err(QrBuilderError::not_found(picture));
        }

        let args = self.arguments(request, picture, output)?;
        let result = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|e| {
                QrBuilderError::internal(format!(
                    "Failed to run {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            tracing::error!(
                program = %self.program.display(),
                status = %result.status,
                stderr = %stderr.trim(),
                "Artistic command failed"
            );
            return Err(QrBuilderError::internal(format!(
                "{} exited with {}",
                self.program.display(),
                result.status
            )));
        }

        if !output.is_file() {
            return Err(QrBuilderError::internal(format!(
                "{} produced no output",
                self.program.display()
            )));
        }
        Ok(())
    }
}
