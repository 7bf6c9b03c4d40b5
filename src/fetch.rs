//! Release download logic.
//!
//! Provides a trait-based abstraction for fetching the c-ares tarball and its
//! detached signature from the GitHub release, enabling dependency injection
//! for testing.

use crate::release::Release;
use crate::workspace::{VendorWorkspace, clear_path};
use camino::Utf8Path;
use log::debug;
use std::fs;
use std::sync::OnceLock;
use std::time::Duration;

/// Network timeout for a single release asset download.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Trait for downloading release assets.
///
/// Abstractions allow tests to mock HTTP behaviour without network access.
#[cfg_attr(test, mockall::automock)]
pub trait ReleaseDownloader {
    /// Download `url` and write the body to `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the file cannot be written.
    fn download(&self, url: &str, dest: &Utf8Path) -> Result<(), DownloadError>;
}

/// Errors arising from release download operations.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// HTTP request failed.
    #[error("download failed for {url}: {reason}")]
    HttpError {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The requested asset was not found (HTTP 404).
    #[error("release asset not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// I/O error writing the downloaded file.
    #[error("I/O error writing download: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP-based downloader using `ureq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpDownloader;

impl ReleaseDownloader for HttpDownloader {
    fn download(&self, url: &str, dest: &Utf8Path) -> Result<(), DownloadError> {
        download_to_file(url, dest)
    }
}

/// Download the source tarball for `release`, replacing whatever currently
/// occupies its destination.
///
/// # Errors
///
/// Returns an error if the existing entry cannot be removed or the download
/// fails. There is no retry.
pub fn fetch_tarball(
    release: &Release,
    workspace: &VendorWorkspace,
    downloader: &dyn ReleaseDownloader,
) -> Result<(), DownloadError> {
    let dest = workspace.tarball_path(release);
    fetch_replacing(downloader, &release.tarball_url(), &dest)
}

/// Download the detached signature for `release`, replacing whatever
/// currently occupies its destination.
///
/// # Errors
///
/// Returns an error if the existing entry cannot be removed or the download
/// fails.
pub fn fetch_signature(
    release: &Release,
    workspace: &VendorWorkspace,
    downloader: &dyn ReleaseDownloader,
) -> Result<(), DownloadError> {
    let dest = workspace.signature_path(release);
    fetch_replacing(downloader, &release.signature_url(), &dest)
}

fn fetch_replacing(
    downloader: &dyn ReleaseDownloader,
    url: &str,
    dest: &Utf8Path,
) -> Result<(), DownloadError> {
    clear_path(dest)?;
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    debug!("downloading {url} to {dest}");
    downloader.download(url, dest)
}

/// Download a URL into `dest` via a sibling `.part` file, so an interrupted
/// transfer never leaves a truncated file at `dest`.
fn download_to_file(url: &str, dest: &Utf8Path) -> Result<(), DownloadError> {
    let response = http_agent()
        .get(url)
        .call()
        .map_err(|e| map_ureq_error(url, &e))?;

    let partial = dest.with_extension(partial_extension(dest));
    let mut file = fs::File::create(&partial)?;
    let copied = std::io::copy(&mut response.into_body().as_reader(), &mut file);
    drop(file);
    if let Err(e) = copied {
        if let Err(cleanup) = fs::remove_file(&partial) {
            debug!("could not remove partial download {partial}: {cleanup}");
        }
        return Err(DownloadError::Io(e));
    }
    fs::rename(&partial, dest)?;
    Ok(())
}

fn partial_extension(dest: &Utf8Path) -> String {
    dest.extension()
        .map_or_else(|| "part".to_owned(), |ext| format!("{ext}.part"))
}

/// Shared `ureq` agent with request timeout configuration.
fn http_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(DOWNLOAD_TIMEOUT))
            .build();
        ureq::Agent::new_with_config(config)
    })
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(404) => DownloadError::NotFound {
            url: url.to_owned(),
        },
        other => DownloadError::HttpError {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}
