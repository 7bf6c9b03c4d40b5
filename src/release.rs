//! The pinned c-ares release and its trusted signing keys.

use crate::platform::Platform;

/// The c-ares version this crate vendors.
pub const CARES_VERSION: &str = "1.34.5";

/// Package identifier reported to the MoonBit build.
pub const PACKAGE_NAME: &str = "tonyfettes/cares";

/// The GitHub repository owner/name for URL construction.
const GITHUB_REPO: &str = "c-ares/c-ares";

/// Library name as passed to the linker (`-lcares`).
pub const LIBRARY_SHORT_NAME: &str = "cares";

/// File stem of the installed static library.
pub const STATIC_LIBRARY_STEM: &str = "libcares";

/// Keyserver the trusted keys are fetched from.
pub const KEYSERVER: &str = "keyserver.ubuntu.com";

/// Fingerprints of the keys c-ares releases are signed with.
pub const TRUSTED_KEYS: &[&str] = &[
    "27EDEAF22F3ABCEB50DB9A125CC908FDB71E12C2",
    "DA7D64E4C82C6294CB73A20E22E3D13B5411B7CA",
];

/// A c-ares source release identified by its version.
///
/// # Examples
///
/// ```
/// use cares_vendor::release::Release;
///
/// let release = Release::new("1.34.5");
/// assert_eq!(release.tarball_name(), "c-ares-1.34.5.tar.gz");
/// assert!(release.signature_url().ends_with("/v1.34.5/c-ares-1.34.5.tar.gz.asc"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    version: String,
}

impl Release {
    /// Describe the release with the given version.
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    /// The release vendored by default.
    #[must_use]
    pub fn pinned() -> Self {
        Self::new(CARES_VERSION)
    }

    /// The release version string.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Directory name of the unpacked source tree.
    #[must_use]
    pub fn source_dir_name(&self) -> String {
        format!("c-ares-{}", self.version)
    }

    /// Filename of the source tarball.
    #[must_use]
    pub fn tarball_name(&self) -> String {
        format!("{}.tar.gz", self.source_dir_name())
    }

    /// Filename of the detached signature.
    #[must_use]
    pub fn signature_name(&self) -> String {
        format!("{}.asc", self.tarball_name())
    }

    /// Download URL of the source tarball.
    #[must_use]
    pub fn tarball_url(&self) -> String {
        self.asset_url(&self.tarball_name())
    }

    /// Download URL of the detached signature.
    #[must_use]
    pub fn signature_url(&self) -> String {
        self.asset_url(&self.signature_name())
    }

    fn asset_url(&self, filename: &str) -> String {
        format!(
            "https://github.com/{GITHUB_REPO}/releases/download/v{}/{filename}",
            self.version
        )
    }
}

/// Filename of the static library the install step produces on `platform`.
#[must_use]
pub fn static_library_filename(platform: Platform) -> String {
    format!(
        "{STATIC_LIBRARY_STEM}{}",
        platform.profile().static_library_extension
    )
}
