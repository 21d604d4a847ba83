//! Accessor declarations and key resolution
//!
//! An [`AccessorSpec`] is the static description of one logical
//! configuration read: its name, the property key it resolves to, the
//! target kind it converts into, and its optional default and directives.
//! The surface builds its name→spec map once at construction; nothing is
//! resolved reflectively at call time.

use crate::convert::TargetKind;
use crate::format::FormatStyle;
use crate::snapshot::PropertySnapshot;

/// Static declaration of a single configuration accessor.
///
/// Construct with one of the typed constructors and refine with the fluent
/// modifiers:
///
/// ```
/// use propbind::{AccessorSpec, TargetKind};
///
/// let spec = AccessorSpec::integer("max_retries")
///     .key("client.max.retries")
///     .alternate_key("client.retries")
///     .default_value("3");
/// ```
#[derive(Debug, Clone)]
pub struct AccessorSpec {
    name: String,
    key: Option<String>,
    alternate_keys: Vec<String>,
    target: TargetKind,
    default: Option<String>,
    format: Option<FormatStyle>,
}

impl AccessorSpec {
    /// Accessor with an explicit target kind
    pub fn new(name: impl Into<String>, target: TargetKind) -> Self {
        Self {
            name: name.into(),
            key: None,
            alternate_keys: Vec::new(),
            target,
            default: None,
            format: None,
        }
    }

    /// Signed integer accessor
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, TargetKind::Integer)
    }

    /// Unsigned integer accessor
    pub fn unsigned(name: impl Into<String>) -> Self {
        Self::new(name, TargetKind::Unsigned)
    }

    /// Floating point accessor
    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, TargetKind::Float)
    }

    /// Boolean accessor
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, TargetKind::Boolean)
    }

    /// Plain text accessor
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, TargetKind::Text)
    }

    /// RFC 3339 date-time accessor
    pub fn date_time(name: impl Into<String>) -> Self {
        Self::new(name, TargetKind::date_time())
    }

    /// Enum accessor matched by exact member name
    pub fn enumeration<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, TargetKind::enumeration(variants))
    }

    /// Comma-delimited list accessor
    pub fn list(name: impl Into<String>, element: TargetKind) -> Self {
        Self::new(name, TargetKind::list(element))
    }

    /// List accessor with an explicit delimiter
    pub fn list_with_delimiter(
        name: impl Into<String>,
        element: TargetKind,
        delimiter: char,
    ) -> Self {
        Self::new(name, TargetKind::list_with_delimiter(element, delimiter))
    }

    /// Accessor converted by a named custom converter
    pub fn custom(name: impl Into<String>, converter: impl Into<String>) -> Self {
        Self::new(name, TargetKind::custom(converter))
    }

    // -------------------------------------------------------------------------
    // Fluent modifiers
    // -------------------------------------------------------------------------

    /// Override the lookup key (default: the logical name)
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Add an alternate key tried when the primary key is absent.
    ///
    /// Alternates are tried in declaration order.
    #[must_use]
    pub fn alternate_key(mut self, key: impl Into<String>) -> Self {
        self.alternate_keys.push(key.into());
        self
    }

    /// Declare a default, converted exactly like a raw value would be.
    ///
    /// Without a default the accessor is required: an absent key is a
    /// `MissingRequiredProperty` error through `get`.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Per-accessor format directive; beats the surface-level default
    #[must_use]
    pub fn format_style(mut self, style: FormatStyle) -> Self {
        self.format = Some(style);
        self
    }

    // -------------------------------------------------------------------------
    // Resolution
    // -------------------------------------------------------------------------

    /// The logical accessor name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared target kind
    #[must_use]
    pub fn target(&self) -> &TargetKind {
        &self.target
    }

    /// The declared default, if any
    #[must_use]
    pub fn default(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// The declared format directive, if any
    #[must_use]
    pub fn format(&self) -> Option<FormatStyle> {
        self.format
    }

    /// The primary lookup key: explicit override if declared, else the
    /// logical name.
    #[must_use]
    pub fn resolve_key(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.name)
    }

    /// Resolve this accessor's raw value against a snapshot: primary key
    /// first, then alternates in declared order.
    #[must_use]
    pub fn lookup<'s>(&self, snapshot: &'s PropertySnapshot) -> Option<&'s str> {
        snapshot.get(self.resolve_key()).or_else(|| {
            self.alternate_keys
                .iter()
                .find_map(|key| snapshot.get(key))
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
