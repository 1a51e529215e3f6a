use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Number of characters in a valid serial number.
pub const SERIAL_LENGTH: usize = 10;
/// Number of leading serial characters that form the board prefix.
pub const PREFIX_LENGTH: usize = 6;

/// A validated serial number: exactly 10 alphanumeric characters, uppercased.
///
/// Can only be constructed through [`SerialNumber::parse`],
/// so every instance upholds the format invariant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SerialNumber(String);

impl SerialNumber {
    /// Validate a raw token extracted from a filename.
    ///
    /// Trims whitespace and uppercases before checking.
    /// Returns `None` for any deviation: wrong length, punctuation, empty input.
    /// No partial matches or truncation.
    pub fn parse(raw: &str) -> Option<Self> {
        let cleaned = raw.trim().to_uppercase();
        if cleaned.chars().count() == SERIAL_LENGTH && cleaned.chars().all(char::is_alphanumeric) {
            Some(Self(cleaned))
        } else {
            None
        }
    }

    /// The first six characters, checked against the prefix allow-list
    /// and used as the top-level destination directory name.
    pub fn prefix(&self) -> String {
        self.0.chars().take(PREFIX_LENGTH).collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Prefix file '{}' not found. Please ensure it exists.", .0.display())]
    NotFound(PathBuf),
    #[error("Prefix file '{}' cannot be empty. Please add valid prefixes.", .0.display())]
    Empty(PathBuf),
    #[error("Failed to read prefix file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Allow-list of accepted serial prefixes, loaded once per run.
#[derive(Debug)]
pub struct PrefixRegistry {
    prefixes: HashSet<String>,
}

impl PrefixRegistry {
    /// Load prefixes from a text file with one prefix per line.
    /// Lines are trimmed and uppercased; blank lines are ignored.
    ///
    /// # Errors
    /// [`RegistryError::NotFound`] if the file does not exist,
    /// [`RegistryError::Empty`] if it yields zero usable lines.
    /// The caller is expected to abort the run on failure.
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        if !path.exists() {
            return Err(RegistryError::NotFound(path.to_path_buf()));
        }
        let contents = fs::read_to_string(path).map_err(|source| RegistryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let prefixes: HashSet<String> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_uppercase)
            .collect();

        if prefixes.is_empty() {
            return Err(RegistryError::Empty(path.to_path_buf()));
        }
        Ok(Self { prefixes })
    }

    pub fn contains(&self, prefix: &str) -> bool {
        self.prefixes.contains(prefix)
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }
}
