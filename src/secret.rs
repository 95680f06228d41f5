//! Password file loading.
//!
//! The database password is read from a file path given in configuration,
//! never from configuration or environment directly. Container runtimes
//! mount secrets as files, and those files routinely end with a newline,
//! so surrounding whitespace is stripped before use.

use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
#[error("Failed to read password file {}: {source}", path.display())]
pub struct SecretError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Read the password from the given file, stripping surrounding whitespace.
pub fn load_password<P: AsRef<Path>>(path: P) -> Result<String, SecretError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| SecretError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(contents.trim().to_string())
}
