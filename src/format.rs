//! Formatting strategies for templated property values
//!
//! A property value may itself be a template with placeholders; invoking its
//! accessor with runtime arguments substitutes them using one of two
//! strategies. The strategy is chosen by hard precedence: accessor-level
//! directive, then surface-level default, then [`FormatStyle::Printf`].
//! Formatting is terminal: the result is always the substituted string.

use crate::error::{Error, Result};
use regex::Regex;
use std::fmt::Display;
use std::sync::OnceLock;

/// Placeholder substitution strategy for templated properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormatStyle {
    /// Printf-style placeholders: `%s` (any), `%d` (integer), `%f` (float),
    /// `%%` (literal percent). Arguments are consumed in order.
    #[default]
    Printf,
    /// Indexed template placeholders: `{0}`, `{1}`, ... Arguments may be
    /// reused and referenced in any order.
    Template,
}

impl FormatStyle {
    /// Substitute runtime arguments into a pattern using this strategy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] for missing arguments, unsupported
    /// specifiers, or arguments that fail a specifier's numeric check.
    pub fn format(&self, pattern: &str, args: &[&dyn Display]) -> Result<String> {
        match self {
            FormatStyle::Printf => format_printf(pattern, args),
            FormatStyle::Template => format_template(pattern, args),
        }
    }
}

/// Pick the effective style: accessor directive beats surface default,
/// which beats the global printf default.
pub(crate) fn effective_style(
    accessor: Option<FormatStyle>,
    surface: Option<FormatStyle>,
) -> FormatStyle {
    accessor.or(surface).unwrap_or_default()
}

fn format_error(pattern: &str, reason: impl Into<String>) -> Error {
    Error::Format {
        pattern: pattern.to_string(),
        reason: reason.into(),
    }
}

fn format_printf(pattern: &str, args: &[&dyn Display]) -> Result<String> {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    let mut next_arg = 0;

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('%') => out.push('%'),
            Some(spec @ ('s' | 'd' | 'f')) => {
                let arg = args.get(next_arg).ok_or_else(|| {
                    format_error(
                        pattern,
                        format!("not enough arguments: '%{spec}' wants argument {next_arg}, have {}", args.len()),
                    )
                })?;
                next_arg += 1;
                let rendered = arg.to_string();
                match spec {
                    'd' => {
                        rendered.trim().parse::<i64>().map_err(|_| {
                            format_error(pattern, format!("'%d' argument '{rendered}' is not an integer"))
                        })?;
                    }
                    'f' => {
                        rendered.trim().parse::<f64>().map_err(|_| {
                            format_error(pattern, format!("'%f' argument '{rendered}' is not a number"))
                        })?;
                    }
                    _ => {}
                }
                out.push_str(&rendered);
            }
            Some(other) => {
                return Err(format_error(pattern, format!("unsupported specifier '%{other}'")));
            }
            None => {
                return Err(format_error(pattern, "dangling '%' at end of pattern"));
            }
        }
    }

    Ok(out)
}

fn template_placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{(\d+)\}").expect("placeholder pattern is valid"))
}

fn format_template(pattern: &str, args: &[&dyn Display]) -> Result<String> {
    let mut missing: Option<String> = None;

    let out = template_placeholder_re().replace_all(pattern, |caps: &regex::Captures<'_>| {
        let index: usize = match caps[1].parse() {
            Ok(i) => i,
            Err(_) => {
                missing.get_or_insert_with(|| format!("placeholder '{}' is out of range", &caps[0]));
                return String::new();
            }
        };
        match args.get(index) {
            Some(arg) => arg.to_string(),
            None => {
                missing.get_or_insert_with(|| {
                    format!("placeholder '{{{index}}}' has no argument (have {})", args.len())
                });
                String::new()
            }
        }
    });

    match missing {
        Some(reason) => Err(format_error(pattern, reason)),
        None => Ok(out.into_owned()),
    }
}

// =============================================================================
// Tests
// =============================================================================
