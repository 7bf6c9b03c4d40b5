//! End-to-end orchestration: make sure c-ares is built, then describe it.
//!
//! The sequence is: skip everything if the platform's installed library is
//! already present; otherwise verify the cached tarball (re-downloading once
//! if it does not verify), extract, configure, build, and install. The link
//! configuration is recomputed on every run.
//!
//! Collaborators that touch the network or spawn processes are injected via
//! [`Toolkit`], so the whole pipeline can be exercised with stubs.

use crate::builder::{BuildConfig, Builder};
use crate::environment::BuildEnvironment;
use crate::error::Result;
use crate::extract::{SourceExtractor, TarGzExtractor, extract_release};
use crate::fetch::{HttpDownloader, ReleaseDownloader, fetch_tarball};
use crate::link_config::{BuildOutput, describe};
use crate::output::{refetch_warning, write_stderr_line};
use crate::platform::Platform;
use crate::release::Release;
use crate::runner::{CommandRunner, SystemCommandRunner};
use crate::verify::verify_release;
use crate::workspace::VendorWorkspace;
use log::debug;
use std::io::Write;

/// What the pipeline operates on.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    /// The c-ares release to vendor.
    pub release: Release,
    /// Where sources, logs, and the install live.
    pub workspace: VendorWorkspace,
    /// The host platform.
    pub platform: Platform,
    /// Variables supplied by the calling build.
    pub environment: BuildEnvironment,
    /// When true, suppress progress output. Warnings are always written.
    pub quiet: bool,
}

/// The side-effecting collaborators the pipeline delegates to.
#[derive(Clone, Copy)]
pub struct Toolkit<'a> {
    /// Runs `gpg`, `cmake`, and the build driver.
    pub runner: &'a dyn CommandRunner,
    /// Downloads the tarball and its signature.
    pub downloader: &'a dyn ReleaseDownloader,
    /// Unpacks the tarball.
    pub extractor: &'a dyn SourceExtractor,
}

impl Toolkit<'static> {
    /// The production collaborators: host processes, HTTP, and `tar.gz`.
    #[must_use]
    pub fn system() -> Self {
        Self {
            runner: &SystemCommandRunner,
            downloader: &HttpDownloader,
            extractor: &TarGzExtractor,
        }
    }
}

/// Which branch [`ensure_built`] took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildAction {
    /// The installed library was found; nothing was fetched or built.
    AlreadyBuilt,
    /// The library was built and installed during this run.
    Built {
        /// Whether the cached tarball failed verification and was downloaded
        /// again.
        refetched: bool,
    },
}

/// Ensure c-ares is installed in the workspace, building it if necessary.
///
/// A freshly re-downloaded tarball is not verified a second time.
///
/// # Errors
///
/// Returns the first fatal error from fetching, extraction, or the build
/// steps.
pub fn ensure_built(
    context: &PipelineContext,
    toolkit: Toolkit<'_>,
    stderr: &mut dyn Write,
) -> Result<BuildAction> {
    let PipelineContext {
        release,
        workspace,
        platform,
        ..
    } = context;

    if workspace.is_already_built(*platform) {
        debug!(
            "found {}; skipping fetch and build",
            workspace.installed_library(*platform)
        );
        return Ok(BuildAction::AlreadyBuilt);
    }

    let version = release.version();
    progress(context, stderr, format!("Verifying c-ares {version}..."));
    let verified = verify_release(release, workspace, toolkit.downloader, toolkit.runner)?;
    if !verified {
        write_stderr_line(stderr, refetch_warning(version));
        fetch_tarball(release, workspace, toolkit.downloader)?;
    }

    progress(context, stderr, format!("Extracting c-ares {version}..."));
    extract_release(release, workspace, toolkit.extractor)?;

    progress(
        context,
        stderr,
        format!(
            "Building c-ares {version} with {}...",
            platform.profile().generator
        ),
    );
    let config = BuildConfig {
        release: release.clone(),
        workspace: workspace.clone(),
        platform: *platform,
    };
    Builder::new(config, toolkit.runner).build()?;

    progress(
        context,
        stderr,
        format!("Installed c-ares {version} to {}", workspace.root()),
    );

    Ok(BuildAction::Built {
        refetched: !verified,
    })
}

/// Ensure c-ares is installed, then compute its link configuration.
///
/// # Errors
///
/// Propagates any error from [`ensure_built`].
pub fn ensure_and_describe(
    context: &PipelineContext,
    toolkit: Toolkit<'_>,
    stderr: &mut dyn Write,
) -> Result<BuildOutput> {
    ensure_built(context, toolkit, stderr)?;
    Ok(describe(
        context.platform,
        &context.workspace,
        &context.environment,
    ))
}

fn progress(context: &PipelineContext, stderr: &mut dyn Write, message: String) {
    if !context.quiet {
        write_stderr_line(stderr, message);
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
