//! Platform dispatch for the vendoring pipeline.
//!
//! Everything that differs between operating systems (generator, build
//! driver, install layout, link style, compiler defaults) lives in one
//! [`PlatformProfile`] row per supported platform. Components consult the
//! profile rather than branching on the operating system themselves, so an
//! unsupported host is rejected once, in [`Platform::from_os`].

use crate::error::{Result, VendorError};
use std::fmt;

/// How the emitted link configuration refers to the installed library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStyle {
    /// An absolute path to the library, without extension, and no search path.
    AbsolutePath,
    /// The library's short name plus a search path entry for its directory.
    ShortName,
}

/// Per-platform build and link conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformProfile {
    /// CMake generator passed via `-G`.
    pub generator: &'static str,
    /// Build driver executable; `<driver> install` performs the install step.
    pub build_driver: &'static str,
    /// Directory under the install prefix where static libraries land.
    pub lib_dir: &'static str,
    /// File extension of the installed static library, including the dot.
    pub static_library_extension: &'static str,
    /// How the library is referenced in the link configuration.
    pub link_style: LinkStyle,
    /// Compiler used when the environment does not supply `CC`.
    pub default_compiler: &'static str,
    /// Prefix of the compiler's include-path flag.
    pub include_flag_prefix: &'static str,
}

const WINDOWS: PlatformProfile = PlatformProfile {
    generator: "NMake Makefiles",
    build_driver: "nmake",
    lib_dir: "lib",
    static_library_extension: ".lib",
    link_style: LinkStyle::AbsolutePath,
    default_compiler: "cl",
    include_flag_prefix: "/I",
};

const LINUX: PlatformProfile = PlatformProfile {
    generator: "Ninja",
    build_driver: "ninja",
    lib_dir: "lib64",
    static_library_extension: ".a",
    link_style: LinkStyle::ShortName,
    default_compiler: "gcc",
    include_flag_prefix: "-I",
};

const MACOS: PlatformProfile = PlatformProfile {
    generator: "Ninja",
    build_driver: "ninja",
    lib_dir: "lib",
    static_library_extension: ".a",
    link_style: LinkStyle::ShortName,
    default_compiler: "clang",
    include_flag_prefix: "-I",
};

/// A supported host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Windows with the MSVC toolchain.
    Windows,
    /// Linux distributions that install 64-bit libraries under `lib64`.
    Linux,
    /// macOS.
    MacOs,
}

impl Platform {
    /// All supported platforms.
    pub const ALL: [Self; 3] = [Self::Windows, Self::Linux, Self::MacOs];

    /// Map an operating system identifier, as reported by
    /// [`std::env::consts::OS`], to a supported platform.
    ///
    /// # Errors
    ///
    /// Returns [`VendorError::UnsupportedPlatform`] for any identifier without
    /// a profile.
    ///
    /// # Examples
    ///
    /// ```
    /// use cares_vendor::platform::Platform;
    ///
    /// assert_eq!(Platform::from_os("linux")?, Platform::Linux);
    /// assert!(Platform::from_os("freebsd").is_err());
    /// # Ok::<(), cares_vendor::error::VendorError>(())
    /// ```
    pub fn from_os(os: &str) -> Result<Self> {
        match os {
            "windows" => Ok(Self::Windows),
            "linux" => Ok(Self::Linux),
            "macos" => Ok(Self::MacOs),
            other => Err(VendorError::UnsupportedPlatform {
                os: other.to_owned(),
            }),
        }
    }

    /// The platform this binary was compiled for.
    ///
    /// # Errors
    ///
    /// Returns [`VendorError::UnsupportedPlatform`] on hosts without a profile.
    pub fn current() -> Result<Self> {
        Self::from_os(std::env::consts::OS)
    }

    /// The build and link conventions for this platform.
    #[must_use]
    pub const fn profile(self) -> &'static PlatformProfile {
        match self {
            Self::Windows => &WINDOWS,
            Self::Linux => &LINUX,
            Self::MacOs => &MACOS,
        }
    }

    /// The identifier accepted by [`Platform::from_os`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::MacOs => "macos",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::freebsd("freebsd")]
    #[case::python_style_darwin("Darwin")]
    #[case::empty("")]
    fn from_os_rejects_unknown_identifiers(#[case] os: &str) {
        let err = Platform::from_os(os).expect_err("platform should be rejected");
        assert!(matches!(err, VendorError::UnsupportedPlatform { os: rejected } if rejected == os));
    }

    #[test]
    fn from_os_round_trips_every_platform() {
        for platform in Platform::ALL {
            assert_eq!(
                Platform::from_os(platform.as_str()).expect("supported"),
                platform
            );
        }
    }

    #[rstest]
    #[case::windows(Platform::Windows, "NMake Makefiles", "nmake")]
    #[case::linux(Platform::Linux, "Ninja", "ninja")]
    #[case::macos(Platform::MacOs, "Ninja", "ninja")]
    fn profile_selects_generator_and_driver(
        #[case] platform: Platform,
        #[case] generator: &str,
        #[case] driver: &str,
    ) {
        let profile = platform.profile();
        assert_eq!(profile.generator, generator);
        assert_eq!(profile.build_driver, driver);
    }

    #[test]
    fn only_windows_links_by_absolute_path() {
        assert_eq!(Platform::Windows.profile().link_style, LinkStyle::AbsolutePath);
        assert_eq!(Platform::Linux.profile().link_style, LinkStyle::ShortName);
        assert_eq!(Platform::MacOs.profile().link_style, LinkStyle::ShortName);
    }

    #[cfg(any(target_os = "linux", target_os = "macos", target_os = "windows"))]
    #[test]
    fn current_platform_is_supported_on_ci_hosts() {
        assert!(Platform::current().is_ok());
    }
}
