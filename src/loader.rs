//! Snapshot construction from an ordered source list
//!
//! The loader owns the merge semantics: sources are applied left-to-right
//! (rightmost wins for duplicate keys), then the environment overlay is
//! merged last unless suppressed. A load either yields a complete snapshot
//! or fails as a whole.

use crate::error::Result;
use crate::snapshot::PropertySnapshot;
use crate::source::{EnvSource, Source, SystemEnv};
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Maps prefixed environment variables onto property keys.
///
/// With prefix `MYAPP`, the variable `MYAPP_SERVER_PORT` overlays the
/// property `server.port`. The overlay is merged after all declared sources,
/// so the environment always wins.
pub struct EnvOverlay {
    prefix: String,
    source: Arc<dyn EnvSource>,
}

impl EnvOverlay {
    /// Overlay from the real process environment
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::with_source(prefix, Arc::new(SystemEnv))
    }

    /// Overlay from a custom environment source (tests)
    pub fn with_source(prefix: impl Into<String>, source: Arc<dyn EnvSource>) -> Self {
        Self {
            prefix: prefix.into(),
            source,
        }
    }

    /// Property entries derived from the environment.
    ///
    /// Variable names are matched case-sensitively against `{PREFIX}_`,
    /// the remainder lowercased with `_` mapped to `.`.
    fn entries(&self) -> Vec<(String, String)> {
        let marker = format!("{}_", self.prefix.to_uppercase());
        self.source
            .vars()
            .into_iter()
            .filter_map(|(name, value)| {
                let rest = name.strip_prefix(&marker)?;
                if rest.is_empty() {
                    return None;
                }
                Some((rest.to_lowercase().replace('_', "."), value))
            })
            .collect()
    }
}

/// Builds [`PropertySnapshot`]s from an ordered list of sources.
///
/// The loader also owns the version counter: every snapshot it produces
/// carries a strictly greater version than the previous one, whether or not
/// the contents changed.
pub struct SnapshotLoader {
    sources: Vec<Box<dyn Source>>,
    env_overlay: Option<EnvOverlay>,
    next_version: AtomicU64,
}

impl SnapshotLoader {
    pub(crate) fn new(sources: Vec<Box<dyn Source>>, env_overlay: Option<EnvOverlay>) -> Self {
        Self {
            sources,
            env_overlay,
            next_version: AtomicU64::new(1),
        }
    }

    /// Fetch every source, merge, and produce a candidate snapshot.
    ///
    /// # Errors
    ///
    /// Any source failure aborts the load; no partial snapshot is returned.
    pub fn load(&self) -> Result<PropertySnapshot> {
        let mut entries = HashMap::new();

        for source in &self.sources {
            let fetched = source.fetch()?;
            debug!("loaded {} properties from {}", fetched.len(), source.describe());
            entries.extend(fetched);
        }

        if let Some(overlay) = &self.env_overlay {
            for (key, value) in overlay.entries() {
                debug!("property '{key}' overlaid from environment");
                entries.insert(key, value);
            }
        }

        let version = self.next_version.fetch_add(1, Ordering::SeqCst);
        Ok(PropertySnapshot::new(entries, version))
    }
}

// =============================================================================
// Tests
// =============================================================================
