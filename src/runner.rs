//! External command execution with per-step log capture.
//!
//! Each step's stdout and stderr are written to `<prefix>.stdout` and
//! `<prefix>.stderr` in a log directory so that a failed configure, build, or
//! signature check can be diagnosed after the fact. Nothing a child process
//! prints reaches this process's stdout, which carries the link
//! configuration.

use crate::error::{Result, VendorError};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::process::{Command, Stdio};

/// A single external command together with where to run it and where to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCommand {
    program: String,
    args: Vec<String>,
    cwd: Utf8PathBuf,
    log_dir: Utf8PathBuf,
    log_prefix: String,
    env: Option<BTreeMap<String, String>>,
}

impl StepCommand {
    /// Describe a step that runs `program` in `cwd` and logs to
    /// `<log_dir>/<log_prefix>.{stdout,stderr}`.
    #[must_use]
    pub fn new(
        program: impl Into<String>,
        cwd: impl Into<Utf8PathBuf>,
        log_dir: impl Into<Utf8PathBuf>,
        log_prefix: impl Into<String>,
    ) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            log_dir: log_dir.into(),
            log_prefix: log_prefix.into(),
            env: None,
        }
    }

    /// Append arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run the child with exactly `env` as its environment instead of
    /// inheriting this process's environment.
    #[must_use]
    pub fn env_override(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = Some(env);
        self
    }

    /// The executable to run.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The arguments passed to the executable.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// The working directory of the child.
    #[must_use]
    pub fn cwd(&self) -> &Utf8Path {
        &self.cwd
    }

    /// The environment override, if any.
    #[must_use]
    pub fn environment(&self) -> Option<&BTreeMap<String, String>> {
        self.env.as_ref()
    }

    /// The log file prefix for this step.
    #[must_use]
    pub fn log_prefix(&self) -> &str {
        &self.log_prefix
    }

    /// Path of the captured stdout.
    #[must_use]
    pub fn stdout_log(&self) -> Utf8PathBuf {
        self.log_dir.join(format!("{}.stdout", self.log_prefix))
    }

    /// Path of the captured stderr.
    #[must_use]
    pub fn stderr_log(&self) -> Utf8PathBuf {
        self.log_dir.join(format!("{}.stderr", self.log_prefix))
    }

    /// The program and its arguments joined for display.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Abstraction for running external commands.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner {
    /// Run `step` to completion.
    ///
    /// # Errors
    ///
    /// Returns [`VendorError::StepFailed`] if the command exits unsuccessfully
    /// and [`VendorError::StepSpawn`] if it cannot be started.
    fn run(&self, step: &StepCommand) -> Result<()>;
}

/// Runs commands on the host, capturing their output to log files.
///
/// # Examples
///
/// ```no_run
/// use cares_vendor::runner::{CommandRunner, StepCommand, SystemCommandRunner};
///
/// let step = StepCommand::new("ninja", "vendor/src/c-ares-1.34.5/build", "vendor/log/build", "build");
/// SystemCommandRunner.run(&step)?;
/// # Ok::<(), cares_vendor::error::VendorError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, step: &StepCommand) -> Result<()> {
        fs::create_dir_all(&step.log_dir)?;
        let stdout = File::create(step.stdout_log())?;
        let stderr = File::create(step.stderr_log())?;

        let mut cmd = Command::new(&step.program);
        cmd.args(&step.args)
            .current_dir(&step.cwd)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr);
        if let Some(env) = &step.env {
            cmd.env_clear().envs(env);
        }

        debug!("running `{}` in {}", step.command_line(), step.cwd);
        let status = cmd.status().map_err(|source| VendorError::StepSpawn {
            command: step.command_line(),
            source,
        })?;

        if !status.success() {
            return Err(VendorError::StepFailed {
                command: step.command_line(),
                code: status.code(),
                log: step.stderr_log(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
