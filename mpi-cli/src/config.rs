//! CLI configuration loading.
//!
//! Reads an [`MpiConfig`] from a TOML file, expanding `$VAR` / `${VAR}`
//! references from the environment before parsing.
//!
//! # Example Configuration
//!
//! ```toml
//! url = "https://mpi.example.com"
//! api_key = "${MPI_TOKEN}"
//! version = "v2"
//! timeout_secs = 30
//!
//! [headers]
//! X-Merchant = "42"
//! ```
//!
//! # Environment Variables
//!
//! - `MPI_CONFIG`: Path to the configuration file (default: `mpi.toml`)
//! - `MPI_URL`: Override the base URL
//! - `MPI_API_KEY`: Override the API key
//! - `MPI_VERSION`: Override the protocol version tag

use std::path::{Path, PathBuf};

use mpi::MpiConfig;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "mpi.toml";

/// Errors raised while loading the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// File path.
        path: PathBuf,
        /// I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML for [`MpiConfig`].
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// File path.
        path: PathBuf,
        /// Parser error.
        #[source]
        source: toml::de::Error,
    },
}

/// Loads `path` and applies environment overrides.
///
/// A missing file yields the defaults, so a configuration can come from the
/// environment alone.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read or parsed.
pub fn load_from(path: &Path) -> Result<MpiConfig, ConfigError> {
    let content = if path.exists() {
        std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        String::new()
    };

    let env = |name: &str| std::env::var(name).ok();
    let mut config = parse(&content, env).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    apply_overrides(&mut config, env);
    Ok(config)
}

/// Parses TOML after expanding variables through `lookup`.
///
/// # Errors
///
/// Returns the TOML error if the expanded text does not parse.
pub fn parse(
    content: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<MpiConfig, toml::de::Error> {
    toml::from_str(&expand_env_vars(content, lookup))
}

/// Applies `MPI_URL`, `MPI_API_KEY` and `MPI_VERSION` on top of `config`.
pub fn apply_overrides(config: &mut MpiConfig, lookup: impl Fn(&str) -> Option<String>) {
    let non_empty = |name: &str| lookup(name).filter(|v: &String| !v.trim().is_empty());
    if let Some(url) = non_empty("MPI_URL") {
        config.url = Some(url);
    }
    if let Some(api_key) = non_empty("MPI_API_KEY") {
        config.api_key = Some(api_key);
    }
    if let Some(version) = non_empty("MPI_VERSION") {
        config.version = Some(version);
    }
}

/// Expands `$VAR` and `${VAR}` patterns through `lookup`.
///
/// Unresolved variables are left as-is.
fn expand_env_vars(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            result.push(ch);
            continue;
        }

        let braced = chars.next_if_eq(&'{').is_some();
        let mut name = String::new();
        let mut closed = false;
        while let Some(&c) = chars.peek() {
            if braced && c == '}' {
                chars.next();
                closed = true;
                break;
            }
            if !braced && !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            name.push(c);
            chars.next();
        }

        match lookup(&name).filter(|_| !name.is_empty()) {
            Some(value) => result.push_str(&value),
            None => {
                result.push('$');
                if braced {
                    result.push('{');
                }
                result.push_str(&name);
                if closed {
                    result.push('}');
                }
            }
        }
    }

    result
}
