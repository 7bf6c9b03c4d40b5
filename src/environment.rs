//! Build environment input and `MOON_HOME` resolution.
//!
//! The MoonBit build runs this tool with a JSON object on stdin describing
//! the environment. With `--manual` the ambient process environment is used
//! instead.

use crate::error::{Result, VendorError};
use camino::{Utf8Path, Utf8PathBuf};
use log::trace;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::PathBuf;

/// Variable naming the MoonBit home directory.
pub const MOON_HOME: &str = "MOON_HOME";

/// Variable overriding the C compiler.
pub const CC: &str = "CC";

/// Directory under the user's home used when `MOON_HOME` is unset.
const DEFAULT_MOON_HOME_DIR: &str = ".moon";

/// Read-only mapping from variable name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildEnvironment {
    vars: BTreeMap<String, String>,
}

impl BuildEnvironment {
    /// Wrap an existing mapping.
    #[must_use]
    pub fn new(vars: BTreeMap<String, String>) -> Self {
        Self { vars }
    }

    /// Capture the ambient process environment, skipping entries that are not
    /// valid Unicode.
    #[must_use]
    pub fn from_process() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    /// Parse a JSON object. String values become variables; other values are
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`VendorError::InvalidInput`] if `json` is not a JSON object.
    ///
    /// # Examples
    ///
    /// ```
    /// use cares_vendor::environment::BuildEnvironment;
    ///
    /// let env = BuildEnvironment::from_json(r#"{"CC": "clang-17", "DEBUG": true}"#)?;
    /// assert_eq!(env.get("CC"), Some("clang-17"));
    /// assert_eq!(env.get("DEBUG"), None);
    /// # Ok::<(), cares_vendor::error::VendorError>(())
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)
            .map_err(|e| VendorError::InvalidInput {
                reason: e.to_string(),
            })?;
        let vars = object
            .into_iter()
            .filter_map(|(key, value)| match value {
                serde_json::Value::String(s) => Some((key, s)),
                other => {
                    trace!("ignoring non-string input entry {key}={other}");
                    None
                }
            })
            .collect();
        Ok(Self { vars })
    }

    /// Read a JSON object from `reader` until end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or the input is not a JSON object.
    pub fn from_reader(reader: &mut dyn Read) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::from_json(&text)
    }

    /// Look up a variable.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// The compiler override, if one was supplied.
    #[must_use]
    pub fn compiler(&self) -> Option<&str> {
        self.get(CC)
    }
}

/// Abstraction over home directory discovery for testability.
#[cfg_attr(test, mockall::automock)]
pub trait HomeDir {
    /// The current user's home directory, if it can be determined.
    fn home_dir(&self) -> Option<PathBuf>;
}

/// Home directory lookup via `directories-next`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHomeDir;

impl HomeDir for SystemHomeDir {
    fn home_dir(&self) -> Option<PathBuf> {
        directories_next::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
    }
}

/// Resolve the MoonBit home directory and check that it exists.
///
/// Uses `MOON_HOME` from `env` when present, otherwise `~/.moon`.
///
/// # Errors
///
/// Returns [`VendorError::MoonHomeNotFound`] if the directory does not exist,
/// and [`VendorError::HomeDirUnavailable`] if `MOON_HOME` is unset and there is
/// no home directory to fall back on.
pub fn resolve_moon_home(env: &BuildEnvironment, home: &dyn HomeDir) -> Result<Utf8PathBuf> {
    let path = match env.get(MOON_HOME) {
        Some(explicit) => Utf8PathBuf::from(explicit),
        None => {
            let home_dir = home.home_dir().ok_or(VendorError::HomeDirUnavailable)?;
            let home_dir = Utf8PathBuf::try_from(home_dir).map_err(|e| VendorError::NonUtf8Path {
                path: e.into_path_buf().display().to_string(),
            })?;
            home_dir.join(DEFAULT_MOON_HOME_DIR)
        }
    };

    ensure_exists(&path)?;
    Ok(path)
}

fn ensure_exists(path: &Utf8Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(VendorError::MoonHomeNotFound {
            path: path.to_owned(),
        })
    }
}
