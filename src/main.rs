//! cares-vendor CLI entrypoint.
//!
//! Reads the build environment, makes sure c-ares is built under `./vendor`,
//! and writes the link configuration to stdout as one JSON object. Progress
//! and errors go to stderr.

use cares_vendor::cli::Cli;
use cares_vendor::environment::{BuildEnvironment, HomeDir, SystemHomeDir, resolve_moon_home};
use cares_vendor::error::Result;
use cares_vendor::link_config::BuildOutput;
use cares_vendor::output::{write_build_output, write_stderr_line};
use cares_vendor::pipeline::{PipelineContext, Toolkit, ensure_and_describe};
use cares_vendor::platform::Platform;
use cares_vendor::release::Release;
use cares_vendor::workspace::VendorWorkspace;
use clap::Parser;
use log::debug;
use std::io::{Read, Write};

fn main() {
    let cli = Cli::parse();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut std::io::stdin().lock(), &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stdin: &mut dyn Read, stderr: &mut dyn Write) -> Result<()> {
    let environment = read_environment(cli, stdin)?;
    let output = describe_vendored_build(cli, environment, &SystemHomeDir, stderr)?;
    write_build_output(&mut std::io::stdout().lock(), &output)
}

/// Reads the build environment from stdin, or from the process environment
/// with `--manual`.
fn read_environment(cli: &Cli, stdin: &mut dyn Read) -> Result<BuildEnvironment> {
    if cli.manual {
        Ok(BuildEnvironment::from_process())
    } else {
        BuildEnvironment::from_reader(stdin)
    }
}

fn describe_vendored_build(
    cli: &Cli,
    environment: BuildEnvironment,
    home: &dyn HomeDir,
    stderr: &mut dyn Write,
) -> Result<BuildOutput> {
    // MOON_HOME is checked before any network or build work.
    let moon_home = resolve_moon_home(&environment, home)?;
    debug!("using MOON_HOME {moon_home}");

    let context = PipelineContext {
        release: Release::pinned(),
        workspace: VendorWorkspace::from_current_dir()?,
        platform: Platform::current()?,
        environment,
        quiet: cli.quiet,
    };
    ensure_and_describe(&context, Toolkit::system(), stderr)
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, err);
            1
        }
    }
}
