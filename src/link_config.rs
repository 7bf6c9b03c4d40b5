//! Link configuration reported to the MoonBit build.
//!
//! The payload tells `moon` which C compiler to use, where the c-ares headers
//! live, and how to link the static library. Its shape is fixed by the
//! consumer:
//!
//! ```json
//! {
//!   "vars": { "CC": "gcc", "CC_FLAGS": "-I/abs/vendor/include" },
//!   "link_configs": [{
//!     "package": "tonyfettes/cares",
//!     "link_flags": "",
//!     "link_libs": ["cares"],
//!     "link_search_paths": ["/abs/vendor/lib64"]
//!   }]
//! }
//! ```

use crate::environment::BuildEnvironment;
use crate::platform::{LinkStyle, Platform};
use crate::release::{LIBRARY_SHORT_NAME, PACKAGE_NAME, STATIC_LIBRARY_STEM};
use crate::workspace::VendorWorkspace;
use serde::{Deserialize, Serialize};

/// Compiler variables exposed to the consumer's C compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vars {
    /// The C compiler executable.
    #[serde(rename = "CC")]
    pub cc: String,
    /// Space-joined compiler flags.
    #[serde(rename = "CC_FLAGS")]
    pub cc_flags: String,
}

/// How one package links against the vendored library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// The consuming package identifier.
    pub package: String,
    /// Space-joined extra linker flags.
    pub link_flags: String,
    /// Libraries to link, by short name or absolute path.
    pub link_libs: Vec<String>,
    /// Directories searched for `link_libs`.
    pub link_search_paths: Vec<String>,
}

/// The complete message written to stdout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOutput {
    /// Compiler variables.
    pub vars: Vars,
    /// Link settings; always exactly one entry.
    pub link_configs: Vec<LinkConfig>,
}

/// Compute the link configuration for an installed build.
///
/// `CC` from `env` takes precedence over the platform's default compiler.
///
/// # Examples
///
/// ```
/// use cares_vendor::environment::BuildEnvironment;
/// use cares_vendor::link_config::describe;
/// use cares_vendor::platform::Platform;
/// use cares_vendor::workspace::VendorWorkspace;
///
/// let workspace = VendorWorkspace::new("/work/vendor");
/// let output = describe(Platform::MacOs, &workspace, &BuildEnvironment::default());
/// assert_eq!(output.vars.cc, "clang");
/// assert_eq!(output.vars.cc_flags, "-I/work/vendor/include");
/// ```
#[must_use]
pub fn describe(
    platform: Platform,
    workspace: &VendorWorkspace,
    env: &BuildEnvironment,
) -> BuildOutput {
    let profile = platform.profile();
    let cc = env
        .compiler()
        .unwrap_or(profile.default_compiler)
        .to_owned();
    let cc_flags = format!("{}{}", profile.include_flag_prefix, workspace.include_dir());

    let (link_libs, link_search_paths) = match profile.link_style {
        LinkStyle::AbsolutePath => (
            vec![
                workspace
                    .lib_dir(platform)
                    .join(STATIC_LIBRARY_STEM)
                    .into_string(),
            ],
            Vec::new(),
        ),
        LinkStyle::ShortName => (
            vec![LIBRARY_SHORT_NAME.to_owned()],
            vec![workspace.lib_dir(platform).into_string()],
        ),
    };

    BuildOutput {
        vars: Vars { cc, cc_flags },
        link_configs: vec![LinkConfig {
            package: PACKAGE_NAME.to_owned(),
            link_flags: String::new(),
            link_libs,
            link_search_paths,
        }],
    }
}
