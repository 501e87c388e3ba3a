//! core::boolean
//!
//! Flag-literal coercion for boolean-valued options.
//!
//! # Literals
//!
//! Matching is case-insensitive.
//!
//! | Result | Literals                          |
//! |--------|-----------------------------------|
//! | true   | `true`, `t`, `1`, `yes`, `y`      |
//! | false  | `false`, `0`, `no`, `n`           |
//!
//! The false set historically also listed `t`. Because the true set is
//! checked first, `t` always coerces to `true`; that ordering is kept so
//! existing scripts see the same results.

use thiserror::Error;

/// A flag literal that is not in either literal set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid boolean value: {value}")]
pub struct BooleanParseError {
    /// The raw value as given on the command line.
    pub value: String,
}

/// Value accepted by [`coerce_boolean`].
///
/// Flags arrive as text from the command line, but defaults and config
/// values are already booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagValue<'a> {
    /// Already a boolean.
    Bool(bool),
    /// Raw literal to parse.
    Literal(&'a str),
}

impl From<bool> for FlagValue<'_> {
    fn from(value: bool) -> Self {
        FlagValue::Bool(value)
    }
}

impl<'a> From<&'a str> for FlagValue<'a> {
    fn from(value: &'a str) -> Self {
        FlagValue::Literal(value)
    }
}

/// Coerce a flag value to a boolean.
///
/// # Example
///
/// ```
/// use jsonld_cli::core::boolean::coerce_boolean;
///
/// assert_eq!(coerce_boolean("YES"), Ok(true));
/// assert_eq!(coerce_boolean("N"), Ok(false));
/// assert_eq!(coerce_boolean(true), Ok(true));
/// assert!(coerce_boolean("maybe").is_err());
/// ```
///
/// # Errors
///
/// Returns [`BooleanParseError`] carrying the raw value when the literal is
/// not recognized.
pub fn coerce_boolean<'a>(value: impl Into<FlagValue<'a>>) -> Result<bool, BooleanParseError> {
    let literal = match value.into() {
        FlagValue::Bool(b) => return Ok(b),
        FlagValue::Literal(s) => s,
    };

    match literal.to_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Ok(true),
        #[allow(unreachable_patterns)]
        "false" | "t" | "0" | "no" | "n" => Ok(false),
        _ => Err(BooleanParseError {
            value: literal.to_string(),
        }),
    }
}

/// clap value parser for boolean-valued flags.
pub fn parse_flag(value: &str) -> Result<bool, BooleanParseError> {
    coerce_boolean(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn true_literals() {
        for literal in ["true", "t", "1", "yes", "y", "TRUE", "Yes", "Y"] {
            assert_eq!(coerce_boolean(literal), Ok(true), "literal {literal}");
        }
    }

    #[test]
    fn false_literals() {
        for literal in ["false", "0", "no", "n", "FALSE", "No", "N"] {
            assert_eq!(coerce_boolean(literal), Ok(false), "literal {literal}");
        }
    }

    #[test]
    fn t_is_true_even_though_false_set_lists_it() {
        assert_eq!(coerce_boolean("t"), Ok(true));
        assert_eq!(coerce_boolean("T"), Ok(true));
    }

    #[test]
    fn booleans_pass_through() {
        assert_eq!(coerce_boolean(true), Ok(true));
        assert_eq!(coerce_boolean(false), Ok(false));
    }

    #[test]
    fn unknown_literal_names_value() {
        let err = coerce_boolean("maybe").unwrap_err();
        assert_eq!(err.value, "maybe");
        assert_eq!(err.to_string(), "invalid boolean value: maybe");
    }

    #[test]
    fn empty_literal_is_rejected() {
        assert!(coerce_boolean("").is_err());
        assert!(coerce_boolean(" yes").is_err());
    }
}
