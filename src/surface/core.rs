use crate::accessor::AccessorSpec;
use crate::convert::ConverterRegistry;
use crate::error::{Error, Result};
use crate::events::{ListenerId, ListenerRegistry, ReloadEvent};
use crate::format::FormatStyle;
use crate::loader::SnapshotLoader;
use crate::snapshot::PropertySnapshot;
use crate::sync::RwLockExt;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

/// Typed, hot-reloadable configuration surface.
///
/// A surface is built once from a set of accessor declarations and an
/// ordered source list; after that its accessor registry is immutable.
/// Reads always resolve against the currently published snapshot, so a
/// reload is observed on the next read — no value is cached across calls.
///
/// # Example
///
/// ```no_run
/// use propbind::{AccessorSpec, ConfigSurface, PropertiesFileSource};
///
/// let surface = ConfigSurface::builder()
///     .with_source(PropertiesFileSource::new("app.properties"))
///     .accessor(AccessorSpec::integer("some.value").default_value("5"))
///     .build()?;
///
/// let value: i64 = surface.get("some.value")?;
/// # Ok::<(), propbind::Error>(())
/// ```
pub struct ConfigSurface {
    /// Accessor registry, built once at construction
    pub(crate) specs: HashMap<String, AccessorSpec>,

    /// Named custom converters
    pub(crate) converters: ConverterRegistry,

    /// Surface-level default format directive
    pub(crate) default_format: Option<FormatStyle>,

    /// Snapshot builder (owns merge semantics and the version counter)
    pub(crate) loader: Arc<SnapshotLoader>,

    /// Bound on a single load attempt during reload
    pub(crate) fetch_timeout: Option<Duration>,

    /// Currently published snapshot. Readers clone the `Arc` under a short
    /// read guard and never hold the lock across conversion.
    pub(crate) current: RwLock<Arc<PropertySnapshot>>,

    /// Reload listeners
    pub(crate) listeners: ListenerRegistry,

    /// Serializes reload cycles (poller vs. out-of-band `reload()`)
    pub(crate) cycle_lock: Mutex<()>,
}

impl std::fmt::Debug for ConfigSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigSurface")
            .field("specs", &self.specs)
            .field("default_format", &self.default_format)
            .field("fetch_timeout", &self.fetch_timeout)
            .finish_non_exhaustive()
    }
}

impl ConfigSurface {
    /// Create a builder for declaring accessors and sources.
    #[must_use]
    pub fn builder() -> super::SurfaceBuilder {
        super::SurfaceBuilder::new()
    }

    /// The currently published snapshot.
    ///
    /// The returned reference stays valid and unchanged for as long as the
    /// caller holds it, regardless of concurrent reloads.
    #[must_use]
    pub fn snapshot(&self) -> Arc<PropertySnapshot> {
        Arc::clone(&self.current.read_recovered())
    }

    /// Version of the currently published snapshot
    #[must_use]
    pub fn version(&self) -> u64 {
        self.snapshot().version()
    }

    /// Register a reload listener, invoked once per successful reload cycle
    /// with the before/after snapshot references.
    pub fn add_reload_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&ReloadEvent) + Send + Sync + 'static,
    {
        self.listeners.add(listener)
    }

    /// Remove a previously registered listener.
    ///
    /// Returns false if the id was not registered (or already removed).
    pub fn remove_reload_listener(&self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Number of registered reload listeners
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn spec(&self, name: &str) -> Result<&AccessorSpec> {
        self.specs
            .get(name)
            .ok_or_else(|| Error::AccessorNotRegistered(name.to_string()))
    }
}
