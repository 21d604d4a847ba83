//! Read operations on [`ConfigSurface`]
//!
//! Every operation clones the current-snapshot reference exactly once and
//! resolves entirely against that clone, so a single call never observes
//! values from two different snapshot versions, even mid-reload.

use crate::accessor::AccessorSpec;
use crate::convert::convert;
use crate::error::{Error, Result};
use crate::format::effective_style;
use crate::snapshot::PropertySnapshot;

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Display;

use super::ConfigSurface;

impl ConfigSurface {
    /// Read a required accessor as a typed value.
    ///
    /// The raw value (or the declared default when the key is absent) is
    /// converted under the accessor's target kind, then deserialized into
    /// `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The accessor is not registered on this surface
    /// - The key is absent and no default is declared
    ///   ([`Error::MissingRequiredProperty`])
    /// - The raw value does not convert ([`Error::Conversion`])
    pub fn get<T>(&self, name: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let spec = self.spec(name)?;
        let snapshot = self.snapshot();
        let value = self.resolve_value(spec, &snapshot)?;
        serde_json::from_value(value).map_err(Error::from)
    }

    /// Read a nullable accessor: absent without a default is `Ok(None)`
    /// instead of a hard failure.
    ///
    /// # Errors
    ///
    /// Conversion failures and unregistered accessors still error; only
    /// the missing-property condition is mapped to `None`.
    pub fn try_get<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        match self.get(name) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_absent() => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// The raw resolved string for an accessor: the snapshot value if
    /// present, else the declared default, else `None`. No conversion is
    /// applied.
    ///
    /// # Errors
    ///
    /// Returns an error only if the accessor is not registered.
    pub fn get_raw(&self, name: &str) -> Result<Option<String>> {
        let spec = self.spec(name)?;
        let snapshot = self.snapshot();
        Ok(spec
            .lookup(&snapshot)
            .or(spec.default())
            .map(ToString::to_string))
    }

    /// Read a templated accessor: the raw value is treated as a format
    /// pattern and the runtime arguments are substituted into it.
    ///
    /// The strategy follows hard precedence: per-accessor directive, then
    /// the surface-level default, then printf-style. Formatting is terminal
    /// and always yields the substituted string.
    ///
    /// # Errors
    ///
    /// Returns an error if the accessor is unregistered, the pattern is
    /// absent without a default, or substitution fails ([`Error::Format`]).
    pub fn format(&self, name: &str, args: &[&dyn Display]) -> Result<String> {
        let spec = self.spec(name)?;
        let snapshot = self.snapshot();
        let pattern = spec
            .lookup(&snapshot)
            .or(spec.default())
            .ok_or_else(|| Error::MissingRequiredProperty(spec.resolve_key().to_string()))?;

        let style = effective_style(spec.format(), self.default_format);
        style.format(pattern, args)
    }

    /// Resolve and convert one accessor against one snapshot.
    ///
    /// Defaults are converted exactly like raw values, preserving the
    /// accessor's directives.
    fn resolve_value(&self, spec: &AccessorSpec, snapshot: &PropertySnapshot) -> Result<Value> {
        let raw = spec.lookup(snapshot).or(spec.default()).ok_or_else(|| {
            Error::MissingRequiredProperty(spec.resolve_key().to_string())
        })?;
        convert(raw, spec.target(), &self.converters)
    }
}
