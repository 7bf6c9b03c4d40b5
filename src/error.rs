//! Error types for the c-ares vendoring pipeline.
//!
//! Every variant here is fatal to the invocation. The one recoverable
//! condition, a signature that does not verify, is reported by
//! [`crate::verify::verify_release`] as `Ok(false)` instead.

use crate::extract::ExtractionError;
use crate::fetch::DownloadError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while acquiring, building, or describing c-ares.
#[derive(Debug, Error)]
pub enum VendorError {
    /// The host operating system has no row in the platform table.
    #[error("unsupported platform: {os}")]
    UnsupportedPlatform {
        /// The operating system identifier that was rejected.
        os: String,
    },

    /// A file or directory an earlier step should have produced is absent.
    #[error("{what} {path} does not exist")]
    MissingArtefact {
        /// Human-readable description of the artefact.
        what: &'static str,
        /// Where the artefact was expected.
        path: Utf8PathBuf,
    },

    /// An external command exited unsuccessfully.
    #[error("`{command}` failed with {}; see {log}", describe_code(.code))]
    StepFailed {
        /// The command line that was run.
        command: String,
        /// The exit code, or `None` if the process was terminated by a signal.
        code: Option<i32>,
        /// The stderr capture file for the step.
        log: Utf8PathBuf,
    },

    /// An external command could not be started.
    #[error("failed to start `{command}`")]
    StepSpawn {
        /// The command line that was attempted.
        command: String,
        /// The underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// `MOON_HOME` points at a directory that does not exist.
    #[error("MOON_HOME directory {path} does not exist")]
    MoonHomeNotFound {
        /// The resolved `MOON_HOME` path.
        path: Utf8PathBuf,
    },

    /// `MOON_HOME` is unset and no home directory could be determined.
    #[error("MOON_HOME is not set and the home directory could not be determined")]
    HomeDirUnavailable,

    /// Downloading the tarball or its signature failed.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Unpacking the source tarball failed.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// The build environment supplied on stdin could not be interpreted.
    #[error("invalid build input: {reason}")]
    InvalidInput {
        /// Description of the parse failure.
        reason: String,
    },

    /// A path could not be represented as UTF-8.
    #[error("path is not valid UTF-8: {path}")]
    NonUtf8Path {
        /// Lossy rendering of the offending path.
        path: String,
    },

    /// Writing the link configuration failed.
    #[error("failed to write output")]
    WriteFailed {
        /// The underlying error that caused the write to fail.
        #[source]
        source: std::io::Error,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VendorError {
    /// Whether this error came from an external command, as opposed to the
    /// pipeline's own bookkeeping.
    #[must_use]
    pub const fn is_step_failure(&self) -> bool {
        matches!(self, Self::StepFailed { .. } | Self::StepSpawn { .. })
    }
}

fn describe_code(code: &Option<i32>) -> String {
    code.map_or_else(
        || "no exit code (terminated by signal)".to_owned(),
        |code| format!("exit code {code}"),
    )
}

/// Result type alias using [`VendorError`].
pub type Result<T> = std::result::Result<T, VendorError>;
