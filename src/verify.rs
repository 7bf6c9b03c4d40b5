//! Signature verification of the source tarball.
//!
//! Verification shells out to `gpg` with a throwaway keyring. A signature
//! that does not check out is an expected outcome (a stale or tampered
//! tarball) and is reported as `Ok(false)` so the caller can re-download;
//! only failures to obtain the signature itself are errors.

use crate::error::{Result, VendorError};
use crate::fetch::{ReleaseDownloader, fetch_signature};
use crate::release::{KEYSERVER, Release, TRUSTED_KEYS};
use crate::runner::{CommandRunner, StepCommand};
use crate::workspace::VendorWorkspace;
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::collections::BTreeMap;

/// Log component name for verification steps.
pub const VERIFY_LOG_COMPONENT: &str = "verify";

/// Environment variable gpg reads its home directory from.
const GNUPGHOME: &str = "GNUPGHOME";

/// Check the workspace tarball for `release` against its detached signature.
///
/// Returns `Ok(true)` only if every trusted key imports and the signature
/// validates. Returns `Ok(false)` without running `gpg` when the tarball is
/// missing or is not a regular file.
///
/// # Errors
///
/// Returns an error if the staging directory or the ephemeral keyring cannot
/// be created, or if the signature download fails.
pub fn verify_release(
    release: &Release,
    workspace: &VendorWorkspace,
    downloader: &dyn ReleaseDownloader,
    runner: &dyn CommandRunner,
) -> Result<bool> {
    std::fs::create_dir_all(workspace.src_dir())?;
    fetch_signature(release, workspace, downloader)?;

    let tarball = workspace.tarball_path(release);
    if !tarball.is_file() {
        debug!("{tarball} is missing or not a regular file; nothing to verify");
        return Ok(false);
    }

    let keyring = Keyring::create()?;
    let log_dir = workspace.log_dir(VERIFY_LOG_COMPONENT);
    let steps = verification_steps(
        &keyring,
        &log_dir,
        &workspace.signature_path(release),
        &tarball,
    );

    for step in &steps {
        match runner.run(step) {
            Ok(()) => {}
            Err(e) if e.is_step_failure() => {
                debug!("signature verification step failed: {e}");
                return Ok(false);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(true)
}

/// An isolated gpg home directory that is removed when dropped.
struct Keyring {
    _dir: tempfile::TempDir,
    workdir: Utf8PathBuf,
    home: Utf8PathBuf,
}

impl Keyring {
    fn create() -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let workdir =
            Utf8PathBuf::try_from(dir.path().to_path_buf()).map_err(|e| VendorError::NonUtf8Path {
                path: e.into_path_buf().display().to_string(),
            })?;
        let home = workdir.join("gnupg");
        std::fs::create_dir(&home)?;
        restrict_permissions(&home)?;
        Ok(Self {
            _dir: dir,
            workdir,
            home,
        })
    }

    /// The environment gpg runs with: the keyring location, plus `PATH` so
    /// gpg can locate its helper daemons.
    fn env(&self) -> BTreeMap<String, String> {
        let mut env = BTreeMap::from([(GNUPGHOME.to_owned(), self.home.to_string())]);
        if let Ok(path) = std::env::var("PATH") {
            env.insert("PATH".to_owned(), path);
        }
        env
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Utf8Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Utf8Path) -> std::io::Result<()> {
    Ok(())
}

/// The key imports followed by the signature check, all bound to `keyring`.
fn verification_steps(
    keyring: &Keyring,
    log_dir: &Utf8Path,
    signature: &Utf8Path,
    tarball: &Utf8Path,
) -> Vec<StepCommand> {
    let workdir = &keyring.workdir;
    let mut steps: Vec<StepCommand> = TRUSTED_KEYS
        .iter()
        .enumerate()
        .map(|(index, key)| {
            StepCommand::new("gpg", workdir.clone(), log_dir, format!("gpg-recv-keys-{index}"))
                .args(["--keyserver", KEYSERVER, "--recv-keys", *key])
                .env_override(keyring.env())
        })
        .collect();
    steps.push(
        StepCommand::new("gpg", workdir.clone(), log_dir, "gpg-verify")
            .args(["--verify", signature.as_str(), tarball.as_str()])
            .env_override(keyring.env()),
    );
    steps
}

#[cfg(test)]
#[path = "verify_tests.rs"]
mod tests;
