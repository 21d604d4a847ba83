//! Backing source trait and implementations
//!
//! A source is anything that yields a flat key→string mapping. The binder
//! treats the concrete syntax as the source's own concern: a snapshot is
//! assembled by merging whatever the sources hand back.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Trait for configuration backing stores.
///
/// Implement this to feed the binder from custom locations (remote stores,
/// databases, generated values). Sources listed later on a surface override
/// earlier ones for duplicate keys.
pub trait Source: Send + Sync {
    /// Fetch the current key→value mapping from the backing store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or its payload is
    /// malformed. Any failure aborts the whole load; no partial snapshot
    /// is ever produced from a half-read source set.
    fn fetch(&self) -> Result<HashMap<String, String>>;

    /// Human-readable description of this source (for logs and errors)
    fn describe(&self) -> String;
}

// =============================================================================
// In-memory map source
// =============================================================================

/// A source backed by an in-memory map.
///
/// Useful for programmatic configuration and tests.
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    entries: HashMap<String, String>,
}

impl MapSource {
    /// Create an empty map source
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property (builder style)
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }
}

impl Source for MapSource {
    fn fetch(&self) -> Result<HashMap<String, String>> {
        Ok(self.entries.clone())
    }

    fn describe(&self) -> String {
        format!("map({} entries)", self.entries.len())
    }
}

// =============================================================================
// Properties file source
// =============================================================================

/// A source backed by a flat properties file.
///
/// Syntax: one `key=value` or `key: value` pair per line. Lines starting
/// with `#` or `!` are comments; blank lines are skipped. Keys are trimmed,
/// values keep interior whitespace but lose leading/trailing whitespace.
#[derive(Debug, Clone)]
pub struct PropertiesFileSource {
    path: PathBuf,
}

impl PropertiesFileSource {
    /// Create a source reading from the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file path this source reads from
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(&self, content: &str) -> Result<HashMap<String, String>> {
        let mut entries = HashMap::new();
        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            // First '=' or ':' separates key from value
            let sep = line.find(['=', ':']).ok_or_else(|| Error::MalformedSource {
                name: self.describe(),
                line: idx + 1,
                reason: format!("expected 'key=value' or 'key: value', got '{line}'"),
            })?;
            let key = line[..sep].trim();
            let value = line[sep + 1..].trim();
            if key.is_empty() {
                return Err(Error::MalformedSource {
                    name: self.describe(),
                    line: idx + 1,
                    reason: "empty property key".into(),
                });
            }
            entries.insert(key.to_string(), value.to_string());
        }
        Ok(entries)
    }
}

impl Source for PropertiesFileSource {
    fn fetch(&self) -> Result<HashMap<String, String>> {
        let content =
            std::fs::read_to_string(&self.path).map_err(|e| Error::SourceUnreachable {
                name: self.describe(),
                source: e,
            })?;
        self.parse(&content)
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

// =============================================================================
// Environment abstraction
// =============================================================================

/// Abstraction over the process environment, so tests can fake it
pub trait EnvSource: Send + Sync {
    /// All environment variables as (name, value) pairs
    fn vars(&self) -> Vec<(String, String)>;
}

/// The real process environment
#[derive(Debug, Clone, Default)]
pub struct SystemEnv;

impl EnvSource for SystemEnv {
    fn vars(&self) -> Vec<(String, String)> {
        std::env::vars().collect()
    }
}

/// A fixed in-memory environment (for tests)
#[derive(Debug, Clone, Default)]
pub struct FakeEnv {
    vars: Vec<(String, String)>,
}

impl FakeEnv {
    /// Create an empty fake environment
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable (builder style)
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.push((name.into(), value.into()));
        self
    }
}

impl EnvSource for FakeEnv {
    fn vars(&self) -> Vec<(String, String)> {
        self.vars.clone()
    }
}

// =============================================================================
// Tests
// =============================================================================
