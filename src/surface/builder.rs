//! Builder for [`ConfigSurface`]
//!
//! Declares the configuration surface up front: accessors, source list,
//! environment overlay, custom converters, and surface-wide directives.
//! `build()` validates the declarations and performs the initial load, so
//! a successfully built surface always has a published snapshot.

use crate::accessor::AccessorSpec;
use crate::convert::{ConverterRegistry, ConvertFn};
use crate::error::{Error, Result};
use crate::events::ListenerRegistry;
use crate::format::FormatStyle;
use crate::loader::{EnvOverlay, SnapshotLoader};
use crate::source::Source;

use log::info;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use super::ConfigSurface;

/// Builder for creating a [`ConfigSurface`] with a fluent API.
///
/// # Example
///
/// ```no_run
/// use propbind::{AccessorSpec, ConfigSurface, FormatStyle, PropertiesFileSource, TargetKind};
///
/// let surface = ConfigSurface::builder()
///     .with_source(PropertiesFileSource::new("defaults.properties"))
///     .with_source(PropertiesFileSource::new("overrides.properties"))
///     .with_env_overlay("MYAPP")
///     .default_format_style(FormatStyle::Template)
///     .accessor(AccessorSpec::integer("server.port").default_value("8080"))
///     .accessor(AccessorSpec::list("server.hosts", TargetKind::Text))
///     .build()?;
/// # Ok::<(), propbind::Error>(())
/// ```
#[derive(Default)]
pub struct SurfaceBuilder {
    accessors: Vec<AccessorSpec>,
    sources: Vec<Box<dyn Source>>,
    env_overlay: Option<EnvOverlay>,
    default_format: Option<FormatStyle>,
    converters: Vec<(String, ConvertFn)>,
    fetch_timeout: Option<Duration>,
}

impl SurfaceBuilder {
    /// Create an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a backing source.
    ///
    /// Sources are merged in declaration order; later sources override
    /// earlier ones for duplicate keys.
    #[must_use]
    pub fn with_source(mut self, source: impl Source + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Overlay prefixed environment variables last, so they override every
    /// declared source. `MYAPP_SERVER_PORT` overlays `server.port` for
    /// prefix `MYAPP`.
    #[must_use]
    pub fn with_env_overlay(mut self, prefix: impl Into<String>) -> Self {
        self.env_overlay = Some(EnvOverlay::new(prefix));
        self
    }

    /// Overlay a custom environment source (tests)
    #[must_use]
    pub fn with_env_source(
        mut self,
        prefix: impl Into<String>,
        source: Arc<dyn crate::source::EnvSource>,
    ) -> Self {
        self.env_overlay = Some(EnvOverlay::with_source(prefix, source));
        self
    }

    /// Declare an accessor. Logical names must be unique per surface.
    #[must_use]
    pub fn accessor(mut self, spec: AccessorSpec) -> Self {
        self.accessors.push(spec);
        self
    }

    /// Surface-level default format directive.
    ///
    /// Beaten by a per-accessor directive; beats the global printf default.
    #[must_use]
    pub fn default_format_style(mut self, style: FormatStyle) -> Self {
        self.default_format = Some(style);
        self
    }

    /// Register a named custom converter usable via
    /// [`TargetKind::custom`](crate::TargetKind::custom).
    #[must_use]
    pub fn with_converter<F>(mut self, name: impl Into<String>, converter: F) -> Self
    where
        F: Fn(&str) -> Result<Value> + Send + Sync + 'static,
    {
        self.converters.push((name.into(), Arc::new(converter)));
        self
    }

    /// Bound a single load attempt during reload; expiry counts as a load
    /// failure and the previous snapshot stays authoritative.
    #[must_use]
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    /// Build the surface and perform the initial load.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate accessor names, ambiguous converter
    /// registrations, or if the initial load fails — a surface is never
    /// created without a valid snapshot.
    pub fn build(self) -> Result<ConfigSurface> {
        let mut specs = HashMap::with_capacity(self.accessors.len());
        for spec in self.accessors {
            let name = spec.name().to_string();
            if specs.insert(name.clone(), spec).is_some() {
                return Err(Error::DuplicateAccessor(name));
            }
        }

        let mut registry = ConverterRegistry::new();
        for (name, converter) in self.converters {
            registry.register_fn(name, converter)?;
        }

        let loader = Arc::new(SnapshotLoader::new(self.sources, self.env_overlay));
        let initial = Arc::new(loader.load()?);

        info!(
            "configuration surface built: {} accessors, {} properties in initial snapshot",
            specs.len(),
            initial.len()
        );

        Ok(ConfigSurface {
            specs,
            converters: registry,
            default_format: self.default_format,
            loader,
            fetch_timeout: self.fetch_timeout,
            current: RwLock::new(initial),
            listeners: ListenerRegistry::new(),
            cycle_lock: Mutex::new(()),
        })
    }
}
