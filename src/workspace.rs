//! Vendor workspace layout and the already-built check.
//!
//! The workspace directory is the pipeline's only persisted state. It holds
//! downloaded and extracted sources under `src/`, per-step logs under
//! `log/<component>/`, and the install prefix (`include/`, `lib/`, `lib64/`).

use crate::error::{Result, VendorError};
use crate::platform::Platform;
use crate::release::{Release, static_library_filename};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Name of the workspace directory relative to the invocation directory.
pub const VENDOR_DIR_NAME: &str = "vendor";

/// Paths within the vendor workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorWorkspace {
    root: Utf8PathBuf,
}

impl VendorWorkspace {
    /// Use `root` as the workspace directory and install prefix.
    ///
    /// The path should be absolute: it is passed to CMake as the install
    /// prefix and reported verbatim in the link configuration.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The `vendor/` directory beneath the current working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory cannot be read or is not
    /// valid UTF-8.
    pub fn from_current_dir() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| VendorError::NonUtf8Path {
            path: e.into_path_buf().display().to_string(),
        })?;
        Ok(Self::new(cwd.join(VENDOR_DIR_NAME)))
    }

    /// The workspace root, which is also the install prefix.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Staging directory for tarballs and extracted source trees.
    #[must_use]
    pub fn src_dir(&self) -> Utf8PathBuf {
        self.root.join("src")
    }

    /// Log directory for one pipeline component.
    #[must_use]
    pub fn log_dir(&self, component: &str) -> Utf8PathBuf {
        self.root.join("log").join(component)
    }

    /// Installed headers.
    #[must_use]
    pub fn include_dir(&self) -> Utf8PathBuf {
        self.root.join("include")
    }

    /// Installed libraries for `platform` (`lib` or `lib64`).
    #[must_use]
    pub fn lib_dir(&self, platform: Platform) -> Utf8PathBuf {
        self.root.join(platform.profile().lib_dir)
    }

    /// Where the source tarball for `release` is stored.
    #[must_use]
    pub fn tarball_path(&self, release: &Release) -> Utf8PathBuf {
        self.src_dir().join(release.tarball_name())
    }

    /// Where the detached signature for `release` is stored.
    #[must_use]
    pub fn signature_path(&self, release: &Release) -> Utf8PathBuf {
        self.src_dir().join(release.signature_name())
    }

    /// Where the tarball for `release` unpacks to.
    #[must_use]
    pub fn source_tree(&self, release: &Release) -> Utf8PathBuf {
        self.src_dir().join(release.source_dir_name())
    }

    /// The static library a successful install leaves behind on `platform`.
    #[must_use]
    pub fn installed_library(&self, platform: Platform) -> Utf8PathBuf {
        self.lib_dir(platform)
            .join(static_library_filename(platform))
    }

    /// Whether c-ares has already been built and installed for `platform`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cares_vendor::platform::Platform;
    /// use cares_vendor::workspace::VendorWorkspace;
    ///
    /// let workspace = VendorWorkspace::new("/nonexistent/vendor");
    /// assert!(!workspace.is_already_built(Platform::Linux));
    /// ```
    #[must_use]
    pub fn is_already_built(&self, platform: Platform) -> bool {
        self.installed_library(platform).exists()
    }
}

/// Remove whatever occupies `path`, whether a file, a symlink, or a
/// directory tree. A missing path is not an error.
///
/// # Errors
///
/// Returns an error if the existing entry cannot be removed.
pub fn clear_path(path: &Utf8Path) -> std::io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
