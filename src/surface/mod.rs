//! The typed configuration surface
//!
//! [`ConfigSurface`] is the facade callers read through: every accessor
//! invocation resolves its key, fetches the raw value from the current
//! snapshot, converts it, and returns the typed value. The reload machinery
//! publishes new snapshots into the surface without ever blocking readers.

mod builder;
mod core;
mod operations;
mod reload;

pub use builder::SurfaceBuilder;
pub use core::ConfigSurface;
pub use reload::ReloadCoordinator;
