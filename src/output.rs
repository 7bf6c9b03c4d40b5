//! Output helpers for the vendoring tool.
//!
//! stdout carries exactly one JSON document for the calling build system, so
//! all human-facing text goes through a separate stderr sink.

use crate::error::{Result, VendorError};
use crate::link_config::BuildOutput;
use std::fmt::Display;
use std::io::Write;

/// Write one line of progress or diagnostics to `stderr`.
///
/// Failures to write are ignored.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Serialise `output` as a single line of JSON to `stdout` and flush.
///
/// # Errors
///
/// Returns [`VendorError::WriteFailed`] if the payload cannot be written.
pub fn write_build_output(stdout: &mut dyn Write, output: &BuildOutput) -> Result<()> {
    serde_json::to_writer(&mut *stdout, output)
        .map_err(|e| VendorError::WriteFailed { source: e.into() })?;
    writeln!(stdout).map_err(|source| VendorError::WriteFailed { source })?;
    stdout
        .flush()
        .map_err(|source| VendorError::WriteFailed { source })
}

/// Message printed when the cached tarball fails verification.
#[must_use]
pub fn refetch_warning(version: &str) -> String {
    format!("Warning: failed to verify the integrity of c-ares {version}, re-downloading...")
}
