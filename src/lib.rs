//! c-ares vendoring for MoonBit builds.
//!
//! This crate fetches the pinned c-ares release, checks its signature with
//! `gpg`, builds it with CMake, and reports how to compile and link against
//! it. The `cares-vendor` binary runs as a `moon` pre-build script; the
//! library surface exists so the pipeline can be driven with injected
//! collaborators in tests.
//!
//! # Modules
//!
//! - [`builder`] - CMake configure, build, and install steps
//! - [`cli`] - Command-line argument definitions
//! - [`environment`] - Build environment input and `MOON_HOME` resolution
//! - [`error`] - Error taxonomy
//! - [`extract`] - Source tarball extraction
//! - [`fetch`] - Tarball and signature downloads
//! - [`link_config`] - The link configuration reported to `moon`
//! - [`output`] - stderr progress and stdout payload helpers
//! - [`pipeline`] - End-to-end orchestration
//! - [`platform`] - Per-platform build and link conventions
//! - [`release`] - The pinned release and its trusted signing keys
//! - [`runner`] - External command execution with log capture
//! - [`verify`] - Signature verification
//! - [`workspace`] - Vendor directory layout and the already-built check

pub mod builder;
pub mod cli;
pub mod environment;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod link_config;
pub mod output;
pub mod pipeline;
pub mod platform;
pub mod release;
pub mod runner;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod verify;
pub mod workspace;
