//! Runs the external program that turns raw scanner output into imaging
//! payloads plus JSON sidecars.

pub mod error;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Capability for converting one input directory into an output directory.
pub trait Converter {
    fn convert(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Leaves the input untouched; used when inputs are already converted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoConverter;
impl Converter for NoConverter {
    fn convert(&self, input: &Path, _output: &Path) -> Result<()> {
        tracing::debug!(input = %input.display(), "conversion disabled");
        Ok(())
    }
}

/// The `dcm2niix` DICOM to NIfTI converter, invoked as
/// `<program> <args...> -o <output> <input>`.
#[derive(Debug, Clone)]
pub struct Dcm2niix {
    program: PathBuf,
    args: Vec<String>,
}
impl Dcm2niix {
    /// Resolves `program` (a name on `PATH` or a path) to an executable.
    pub fn discover(program: impl AsRef<str>, args: Vec<String>) -> Result<Self> {
        let program = program.as_ref();
        match which::which(program) {
            Ok(path) => {
                tracing::debug!(program = %path.display(), "discovered converter");
                Ok(Self { program: path, args })
            },
            Err(_) => exn::bail!(ErrorKind::NotFound(program.to_string())),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self, input: &Path, output: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).arg("-o").arg(output).arg(input);
        command
    }
}
impl Converter for Dcm2niix {
    #[tracing::instrument(skip_all, fields(input = %input.display()))]
    fn convert(&self, input: &Path, output: &Path) -> Result<()> {
        std::fs::create_dir_all(output).or_raise(|| ErrorKind::Output(output.to_path_buf()))?;
        let result = self.command(input, output).output().or_raise(|| ErrorKind::Spawn(self.program.clone()))?;
        tracing::trace!(stdout = %String::from_utf8_lossy(&result.stdout), "converter output");
        if !result.status.success() {
            // Partial output is still picked up by discovery.
            tracing::warn!(
                code = ?result.status.code(),
                stderr = %String::from_utf8_lossy(&result.stderr).trim(),
                "converter exited unsuccessfully",
            );
        }
        Ok(())
    }
}
