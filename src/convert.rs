//! Raw string to typed value conversion
//!
//! Every property read goes through [`convert`]: a raw string plus a
//! [`TargetKind`] descriptor produce a `serde_json::Value`, which the
//! surface then deserializes into the caller's concrete type. Failures are
//! surfaced as [`Error::Conversion`](crate::Error::Conversion), never
//! silently coerced to a zero value.

use crate::error::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

/// Describes the type an accessor converts its raw value into.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetKind {
    /// Signed integer (`i64` parse rules, overflow is an error)
    Integer,
    /// Unsigned integer (`u64` parse rules)
    Unsigned,
    /// Floating point (`f64` parse rules; NaN and infinities rejected)
    Float,
    /// `true` / `false`, ASCII case-insensitive
    Boolean,
    /// The raw string, unchanged
    Text,
    /// Date-time; RFC 3339 by default, or a `time` format description.
    ///
    /// The converted value is the canonical RFC 3339 string.
    DateTime { format: Option<String> },
    /// Exact member-name match against the declared variants
    Enum { variants: Vec<String> },
    /// Delimited list, each token converted to the element kind
    List {
        element: Box<TargetKind>,
        delimiter: char,
    },
    /// A converter registered by name on the surface
    Custom { name: String },
}

impl TargetKind {
    /// Comma-delimited list of the given element kind
    #[must_use]
    pub fn list(element: TargetKind) -> Self {
        Self::list_with_delimiter(element, ',')
    }

    /// List with an explicit delimiter
    #[must_use]
    pub fn list_with_delimiter(element: TargetKind, delimiter: char) -> Self {
        TargetKind::List {
            element: Box::new(element),
            delimiter,
        }
    }

    /// Enum matched by exact member name
    pub fn enumeration<I, S>(variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TargetKind::Enum {
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    /// RFC 3339 date-time
    #[must_use]
    pub fn date_time() -> Self {
        TargetKind::DateTime { format: None }
    }

    /// Date-time parsed with a `time` format description
    /// (e.g. `"[year]-[month]-[day]"`)
    pub fn date_time_with_format(format: impl Into<String>) -> Self {
        TargetKind::DateTime {
            format: Some(format.into()),
        }
    }

    /// A named custom converter
    pub fn custom(name: impl Into<String>) -> Self {
        TargetKind::Custom { name: name.into() }
    }

    /// Short description used in error messages
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            TargetKind::Integer => "integer".into(),
            TargetKind::Unsigned => "unsigned integer".into(),
            TargetKind::Float => "float".into(),
            TargetKind::Boolean => "boolean".into(),
            TargetKind::Text => "text".into(),
            TargetKind::DateTime { .. } => "date-time".into(),
            TargetKind::Enum { .. } => "enum".into(),
            TargetKind::List { element, .. } => format!("list of {}", element.describe()),
            TargetKind::Custom { name } => format!("custom '{name}'"),
        }
    }
}

/// Type alias for a registered custom converter
pub type ConvertFn = Arc<dyn Fn(&str) -> Result<Value> + Send + Sync>;

/// Named custom converters available to a surface.
///
/// Exactly one converter may be registered per name; a duplicate
/// registration is a configuration-time error surfaced when the surface
/// is built.
#[derive(Clone, Default)]
pub struct ConverterRegistry {
    converters: HashMap<String, ConvertFn>,
}

impl ConverterRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a converter under a unique name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AmbiguousConversionRule`] if the name is taken.
    pub fn register<F>(&mut self, name: impl Into<String>, converter: F) -> Result<()>
    where
        F: Fn(&str) -> Result<Value> + Send + Sync + 'static,
    {
        self.register_fn(name, Arc::new(converter))
    }

    pub(crate) fn register_fn(&mut self, name: impl Into<String>, converter: ConvertFn) -> Result<()> {
        let name = name.into();
        if self.converters.contains_key(&name) {
            return Err(Error::AmbiguousConversionRule(name));
        }
        self.converters.insert(name, converter);
        Ok(())
    }

    fn get(&self, name: &str) -> Result<&ConvertFn> {
        self.converters
            .get(name)
            .ok_or_else(|| Error::UnknownConverter(name.to_string()))
    }
}

fn conversion_error(raw: &str, target: &TargetKind, reason: impl Into<String>) -> Error {
    Error::Conversion {
        raw: raw.to_string(),
        target: target.describe(),
        reason: reason.into(),
    }
}

/// Convert a raw string into a dynamic value according to the target kind.
///
/// # Errors
///
/// Returns [`Error::Conversion`] when the raw value does not parse under the
/// target's canonical rules, or [`Error::UnknownConverter`] for an
/// unregistered custom kind.
pub fn convert(raw: &str, target: &TargetKind, registry: &ConverterRegistry) -> Result<Value> {
    match target {
        TargetKind::Integer => raw
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|e| conversion_error(raw, target, e.to_string())),

        TargetKind::Unsigned => raw
            .trim()
            .parse::<u64>()
            .map(Value::from)
            .map_err(|e| conversion_error(raw, target, e.to_string())),

        TargetKind::Float => {
            let parsed = raw
                .trim()
                .parse::<f64>()
                .map_err(|e| conversion_error(raw, target, e.to_string()))?;
            serde_json::Number::from_f64(parsed)
                .map(Value::Number)
                .ok_or_else(|| conversion_error(raw, target, "not a finite number"))
        }

        TargetKind::Boolean => {
            let trimmed = raw.trim();
            if trimmed.eq_ignore_ascii_case("true") {
                Ok(Value::Bool(true))
            } else if trimmed.eq_ignore_ascii_case("false") {
                Ok(Value::Bool(false))
            } else {
                Err(conversion_error(raw, target, "expected 'true' or 'false'"))
            }
        }

        TargetKind::Text => Ok(Value::String(raw.to_string())),

        TargetKind::DateTime { format } => convert_date_time(raw, target, format.as_deref()),

        TargetKind::Enum { variants } => {
            let trimmed = raw.trim();
            if variants.iter().any(|v| v == trimmed) {
                Ok(Value::String(trimmed.to_string()))
            } else {
                Err(conversion_error(
                    raw,
                    target,
                    format!("no member named '{trimmed}' (members: {})", variants.join(", ")),
                ))
            }
        }

        TargetKind::List { element, delimiter } => {
            if raw.trim().is_empty() {
                return Ok(Value::Array(Vec::new()));
            }
            raw.split(*delimiter)
                .map(|token| convert(token.trim(), element, registry))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        }

        TargetKind::Custom { name } => registry.get(name)?(raw),
    }
}

/// Parse a date-time and canonicalize to an RFC 3339 string.
///
/// Custom formats without an offset are interpreted as UTC; a bare date
/// becomes midnight UTC.
fn convert_date_time(raw: &str, target: &TargetKind, format: Option<&str>) -> Result<Value> {
    let trimmed = raw.trim();

    let parsed = match format {
        None => OffsetDateTime::parse(trimmed, &Rfc3339)
            .map_err(|e| conversion_error(raw, target, e.to_string()))?,
        Some(fmt) => {
            let items = time::format_description::parse(fmt)
                .map_err(|e| conversion_error(raw, target, format!("bad format description: {e}")))?;
            if let Ok(dt) = OffsetDateTime::parse(trimmed, &items) {
                dt
            } else if let Ok(dt) = PrimitiveDateTime::parse(trimmed, &items) {
                dt.assume_utc()
            } else {
                Date::parse(trimmed, &items)
                    .map(|d| d.midnight().assume_utc())
                    .map_err(|e| conversion_error(raw, target, e.to_string()))?
            }
        }
    };

    let canonical = parsed
        .format(&Rfc3339)
        .map_err(|e| conversion_error(raw, target, e.to_string()))?;
    Ok(Value::String(canonical))
}

// =============================================================================
// Tests
// =============================================================================
