//! Test doubles for driving the pipeline without processes or network access.
//!
//! Available to unit tests and, through the `test-support` feature, to
//! integration tests.

use crate::error::{Result, VendorError};
use crate::fetch::{DownloadError, ReleaseDownloader};
use crate::release::Release;
use crate::runner::{CommandRunner, StepCommand};
use camino::{Utf8Path, Utf8PathBuf};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::cell::RefCell;
use std::collections::BTreeSet;

/// Signature bytes written by [`StubDownloader`] for `.asc` URLs.
pub const STUB_SIGNATURE: &[u8] = b"-----BEGIN PGP SIGNATURE-----\nstub\n";

/// Build a gzip tarball containing a minimal source tree for `release`.
///
/// # Errors
///
/// Returns an error if the in-memory archive cannot be assembled.
pub fn source_tarball(release: &Release) -> std::io::Result<Vec<u8>> {
    let contents = b"cmake_minimum_required(VERSION 3.5)\nproject(c-ares C)\n";
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    let mut header = tar::Header::new_gnu();
    header.set_size(contents.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append_data(
        &mut header,
        format!("{}/CMakeLists.txt", release.source_dir_name()),
        contents.as_slice(),
    )?;
    builder.into_inner()?.finish()
}

/// A [`CommandRunner`] that records steps instead of spawning them.
///
/// Steps whose log prefix was registered with [`StubRunner::failing_on`]
/// return [`VendorError::StepFailed`]. When an installed library path is
/// configured, the `install` step creates it, mimicking a real CMake install.
#[derive(Debug, Default)]
pub struct StubRunner {
    failing: BTreeSet<String>,
    installs: Option<Utf8PathBuf>,
    steps: RefCell<Vec<StepCommand>>,
}

impl StubRunner {
    /// A runner on which every step succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every step whose log prefix is `prefix`.
    #[must_use]
    pub fn failing_on(mut self, prefix: impl Into<String>) -> Self {
        self.failing.insert(prefix.into());
        self
    }

    /// Create `library` when the `install` step runs.
    #[must_use]
    pub fn installing(mut self, library: impl Into<Utf8PathBuf>) -> Self {
        self.installs = Some(library.into());
        self
    }

    /// Every step run so far, in order.
    #[must_use]
    pub fn steps(&self) -> Vec<StepCommand> {
        self.steps.borrow().clone()
    }

    /// The log prefixes of every step run so far, in order.
    #[must_use]
    pub fn prefixes(&self) -> Vec<String> {
        self.steps
            .borrow()
            .iter()
            .map(|step| step.log_prefix().to_owned())
            .collect()
    }

    /// How many times a step with log prefix `prefix` has run.
    #[must_use]
    pub fn count(&self, prefix: &str) -> usize {
        self.steps
            .borrow()
            .iter()
            .filter(|step| step.log_prefix() == prefix)
            .count()
    }
}

impl CommandRunner for StubRunner {
    fn run(&self, step: &StepCommand) -> Result<()> {
        self.steps.borrow_mut().push(step.clone());

        if self.failing.contains(step.log_prefix()) {
            return Err(VendorError::StepFailed {
                command: step.command_line(),
                code: Some(1),
                log: step.stderr_log(),
            });
        }

        let installed = self
            .installs
            .as_ref()
            .filter(|_| step.log_prefix() == "install");
        if let Some(library) = installed {
            write_creating_parent(library, b"!<arch>\n")?;
        }

        Ok(())
    }
}

/// A [`ReleaseDownloader`] that serves fixed bytes and records requests.
///
/// Signature URLs (ending in `.asc`) receive [`STUB_SIGNATURE`]; every other
/// URL receives the configured tarball bytes.
#[derive(Debug)]
pub struct StubDownloader {
    tarball: Vec<u8>,
    urls: RefCell<Vec<String>>,
}

impl StubDownloader {
    /// Serve `tarball` for tarball requests.
    #[must_use]
    pub fn new(tarball: Vec<u8>) -> Self {
        Self {
            tarball,
            urls: RefCell::new(Vec::new()),
        }
    }

    /// Every URL requested so far, in order.
    #[must_use]
    pub fn urls(&self) -> Vec<String> {
        self.urls.borrow().clone()
    }

    /// How many tarball (non-signature) downloads were requested.
    #[must_use]
    pub fn tarball_downloads(&self) -> usize {
        self.urls
            .borrow()
            .iter()
            .filter(|url| !url.ends_with(".asc"))
            .count()
    }
}

impl ReleaseDownloader for StubDownloader {
    fn download(&self, url: &str, dest: &Utf8Path) -> std::result::Result<(), DownloadError> {
        self.urls.borrow_mut().push(url.to_owned());
        let body = if url.ends_with(".asc") {
            STUB_SIGNATURE
        } else {
            self.tarball.as_slice()
        };
        write_creating_parent(dest, body)?;
        Ok(())
    }
}

fn write_creating_parent(path: &Utf8Path, contents: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)
}
