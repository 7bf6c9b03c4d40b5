//! CLI argument definitions for the c-ares vendoring tool.
//!
//! The binary normally runs as a `moon` pre-build script and receives its
//! environment as JSON on stdin. `--manual` is for running it by hand.

use clap::Parser;

/// Fetch, verify, and build c-ares, then report its link configuration.
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(name = "cares-vendor")]
#[command(version, about)]
#[command(long_about = concat!(
    "Fetch, verify, and build the pinned c-ares release, then report its ",
    "link configuration.\n\n",
    "Run as a MoonBit pre-build script, the tool reads a JSON object describing ",
    "the build environment from stdin and writes one JSON object with compiler ",
    "variables and link settings to stdout. Progress and errors go to stderr.\n\n",
    "The library is built once into ./vendor; later runs only report the ",
    "configuration.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Run from a terminal using the current environment:\n",
    "    $ cares-vendor --manual\n\n",
    "  Supply the environment explicitly:\n",
    "    $ echo '{\"CC\": \"clang\"}' | cares-vendor",
))]
pub struct Cli {
    /// Read the build environment from the process environment instead of
    /// JSON on stdin.
    #[arg(long)]
    pub manual: bool,

    /// Suppress progress messages. Warnings and errors are still reported.
    #[arg(short, long)]
    pub quiet: bool,
}
