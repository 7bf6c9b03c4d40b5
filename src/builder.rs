//! CMake build orchestration for the c-ares source tree.
//!
//! Configures an out-of-tree build directory with the platform's generator,
//! builds, and installs into the vendor workspace. Each step logs to
//! `log/build/<step>.{stdout,stderr}` and any failure aborts the build.

use crate::error::{Result, VendorError};
use crate::platform::Platform;
use crate::release::Release;
use crate::runner::{CommandRunner, StepCommand};
use crate::workspace::VendorWorkspace;
use camino::Utf8PathBuf;
use log::debug;

/// Log component name for build steps.
pub const BUILD_LOG_COMPONENT: &str = "build";

/// Name of the out-of-tree build directory inside the source tree.
const BUILD_DIR_NAME: &str = "build";

/// Configuration for the build process.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// The release whose source tree is built.
    pub release: Release,
    /// The workspace holding the sources and receiving the install.
    pub workspace: VendorWorkspace,
    /// The platform whose generator and driver are used.
    pub platform: Platform,
}

impl BuildConfig {
    /// The extracted source tree.
    #[must_use]
    pub fn source_tree(&self) -> Utf8PathBuf {
        self.workspace.source_tree(&self.release)
    }

    /// The out-of-tree build directory.
    #[must_use]
    pub fn build_dir(&self) -> Utf8PathBuf {
        self.source_tree().join(BUILD_DIR_NAME)
    }

    /// The configure, build, and install commands, in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use cares_vendor::builder::BuildConfig;
    /// use cares_vendor::platform::Platform;
    /// use cares_vendor::release::Release;
    /// use cares_vendor::workspace::VendorWorkspace;
    ///
    /// let config = BuildConfig {
    ///     release: Release::pinned(),
    ///     workspace: VendorWorkspace::new("/work/vendor"),
    ///     platform: Platform::Linux,
    /// };
    /// let steps = config.steps();
    /// assert_eq!(steps.len(), 3);
    /// assert_eq!(steps[2].command_line(), "ninja install");
    /// ```
    #[must_use]
    pub fn steps(&self) -> Vec<StepCommand> {
        let profile = self.platform.profile();
        let build_dir = self.build_dir();
        let log_dir = self.workspace.log_dir(BUILD_LOG_COMPONENT);
        let step = |prefix: &str, program: &str| {
            StepCommand::new(program, build_dir.clone(), log_dir.clone(), prefix)
        };

        vec![
            step("configure", "cmake").args([
                "-DCMAKE_BUILD_TYPE=Release".to_owned(),
                format!("-DCMAKE_INSTALL_PREFIX={}", self.workspace.root()),
                "-DCARES_STATIC=ON".to_owned(),
                "-G".to_owned(),
                profile.generator.to_owned(),
                "..".to_owned(),
            ]),
            step("build", profile.build_driver),
            step("install", profile.build_driver).args(["install"]),
        ]
    }
}

/// Builder for compiling and installing c-ares.
pub struct Builder<'a> {
    config: BuildConfig,
    runner: &'a dyn CommandRunner,
}

impl<'a> Builder<'a> {
    /// Create a new builder that runs its steps through `runner`.
    #[must_use]
    pub fn new(config: BuildConfig, runner: &'a dyn CommandRunner) -> Self {
        Self { config, runner }
    }

    /// Configure, build, and install.
    ///
    /// # Errors
    ///
    /// Returns [`VendorError::MissingArtefact`] if the source tree has not been
    /// extracted, and the first step failure otherwise.
    pub fn build(&self) -> Result<()> {
        let source_tree = self.config.source_tree();
        if !source_tree.exists() {
            return Err(VendorError::MissingArtefact {
                what: "c-ares source directory",
                path: source_tree,
            });
        }

        std::fs::create_dir_all(self.config.build_dir())?;

        for step in self.config.steps() {
            debug!("build step {}: {}", step.log_prefix(), step.command_line());
            self.runner.run(&step)?;
        }

        Ok(())
    }
}
