//! # propbind - Typed, Hot-Reloadable Configuration Binder
//!
//! A library for binding named configuration properties from one or more
//! backing stores (properties files, in-memory maps, the process
//! environment) onto a strongly-typed access surface, with runtime reload
//! support.
//!
//! ## Features
//!
//! - **Typed Access**: Declare accessors with a target kind (integer,
//!   float, boolean, date-time, enum, list, custom) and read them as
//!   concrete Rust types
//! - **Source Merging**: Ordered source lists with rightmost-wins override
//!   semantics and an optional environment-variable overlay
//! - **Defaults & Nullability**: Per-accessor defaults converted like raw
//!   values; `try_get` for reads that may legitimately be absent
//! - **Templated Properties**: Printf-style and indexed-template formatting
//!   with per-accessor and per-surface directives
//! - **Hot Reload**: Polling or out-of-band reload cycles that atomically
//!   swap an immutable snapshot — readers never block and never observe a
//!   torn property set
//! - **Reload Events**: Listeners receive before/after snapshot references
//!   once per successful cycle
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use propbind::{AccessorSpec, ConfigSurface, PropertiesFileSource, TargetKind};
//! use std::time::Duration;
//!
//! # fn main() -> propbind::Result<()> {
//! let surface = std::sync::Arc::new(
//!     ConfigSurface::builder()
//!         .with_source(PropertiesFileSource::new("app.properties"))
//!         .with_env_overlay("MYAPP")
//!         .accessor(AccessorSpec::integer("some.value").default_value("5"))
//!         .accessor(AccessorSpec::list("ports", TargetKind::Integer))
//!         .build()?,
//! );
//!
//! // Typed reads always see the currently published snapshot
//! let value: i64 = surface.get("some.value")?;
//! let ports: Vec<u16> = surface.get("ports")?;
//!
//! // Watch the sources for changes once a second
//! let coordinator = surface.watch_polling(Duration::from_secs(1))?;
//!
//! surface.add_reload_listener(|event| {
//!     println!("reloaded: v{} -> v{}", event.old.version(), event.new.version());
//! });
//! # coordinator.stop();
//! # Ok(())
//! # }
//! ```
//!
//! ## Templated Properties
//!
//! A property value can be a format pattern; invoking its accessor with
//! runtime arguments substitutes them. The strategy is chosen by hard
//! precedence: accessor-level directive, surface-level default, then
//! printf-style.
//!
//! ```rust,no_run
//! use propbind::{AccessorSpec, ConfigSurface, FormatStyle, MapSource};
//!
//! # fn main() -> propbind::Result<()> {
//! let surface = ConfigSurface::builder()
//!     .with_source(MapSource::new().with("greeting", "Hello, %s!"))
//!     .accessor(AccessorSpec::text("greeting"))
//!     .build()?;
//!
//! assert_eq!(surface.format("greeting", &[&"World"])?, "Hello, World!");
//! # Ok(())
//! # }
//! ```

// Core modules
mod accessor;
mod convert;
mod error;
mod events;
mod format;
mod loader;
mod snapshot;
pub mod source;
mod surface;
mod sync;

// Re-exports from core
pub use accessor::AccessorSpec;
pub use convert::{ConvertFn, ConverterRegistry, TargetKind, convert};
pub use error::{Error, Result};
pub use events::{ListenerId, ReloadCallback, ReloadEvent};
pub use format::FormatStyle;
pub use snapshot::PropertySnapshot;
pub use source::{
    EnvSource, FakeEnv, MapSource, PropertiesFileSource, Source, SystemEnv,
};
pub use surface::{ConfigSurface, ReloadCoordinator, SurfaceBuilder};
