//! Source tarball extraction.
//!
//! Unpacks `.tar.gz` archives into the workspace's source staging directory,
//! rejecting entries that would escape it.

use crate::error::{Result, VendorError};
use crate::release::Release;
use crate::workspace::VendorWorkspace;
use camino::Utf8Path;
use flate2::read::GzDecoder;
use log::debug;
use std::path::{Component, Path};

/// Trait for extracting source archives, enabling test mocking.
#[cfg_attr(test, mockall::automock)]
pub trait SourceExtractor {
    /// Extract the archive at `archive_path` into `dest_dir`.
    ///
    /// Returns the number of entries unpacked.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::PathTraversal`] if any entry attempts to
    /// escape the destination directory, [`ExtractionError::EmptyArchive`] if
    /// the archive has no entries, and [`ExtractionError::Io`] on I/O or
    /// decompression failures.
    fn extract(&self, archive_path: &Utf8Path, dest_dir: &Utf8Path)
    -> std::result::Result<usize, ExtractionError>;
}

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// I/O error during extraction.
    #[error("extraction I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A path in the archive attempts to traverse outside the destination.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending path from the archive entry.
        path: String,
    },

    /// The archive contains no entries.
    #[error("archive contains no entries")]
    EmptyArchive,
}

/// Default extractor using the `tar` and `flate2` crates.
#[derive(Debug, Clone, Copy, Default)]
pub struct TarGzExtractor;

impl SourceExtractor for TarGzExtractor {
    fn extract(
        &self,
        archive_path: &Utf8Path,
        dest_dir: &Utf8Path,
    ) -> std::result::Result<usize, ExtractionError> {
        let file = std::fs::File::open(archive_path)?;
        let mut archive = tar::Archive::new(GzDecoder::new(file));
        let mut unpacked = 0_usize;

        for entry_result in archive.entries()? {
            let mut entry = entry_result?;
            let entry_path = entry.path()?.into_owned();

            validate_entry_path(&entry_path)?;

            let dest_path = dest_dir.as_std_path().join(&entry_path);
            if let Some(parent) = dest_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            entry.unpack(&dest_path)?;
            unpacked += 1;
        }

        if unpacked == 0 {
            return Err(ExtractionError::EmptyArchive);
        }

        Ok(unpacked)
    }
}

/// Unpack the tarball for `release` into the workspace source directory.
///
/// # Errors
///
/// Returns [`VendorError::MissingArtefact`] if the tarball is absent and
/// [`VendorError::Extraction`] if unpacking fails.
pub fn extract_release(
    release: &Release,
    workspace: &VendorWorkspace,
    extractor: &dyn SourceExtractor,
) -> Result<()> {
    let tarball = workspace.tarball_path(release);
    if !tarball.exists() {
        return Err(VendorError::MissingArtefact {
            what: "c-ares tarball",
            path: tarball,
        });
    }

    let src_dir = workspace.src_dir();
    std::fs::create_dir_all(&src_dir)?;
    let count = extractor.extract(&tarball, &src_dir)?;
    debug!("unpacked {count} entries from {tarball} into {src_dir}");
    Ok(())
}

/// Validate that a tar entry path does not escape the destination
/// directory via `..` components or absolute paths.
fn validate_entry_path(path: &Path) -> std::result::Result<(), ExtractionError> {
    let escapes = path.is_absolute()
        || path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_) | Component::RootDir));
    if escapes {
        return Err(ExtractionError::PathTraversal {
            path: path.display().to_string(),
        });
    }
    Ok(())
}
