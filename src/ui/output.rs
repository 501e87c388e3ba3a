//! ui::output
//!
//! Output Writer and Failure Reporter.
//!
//! # Design
//!
//! The engine's result is classified once into an [`OutputKind`], and each
//! kind has one serialization rule:
//!
//! - `Structured` (object or array): pretty-printed JSON, `indent_width`
//!   spaces per level, keys in document order
//! - `Text` (string): trimmed of surrounding whitespace
//! - `Raw` (number, boolean, null): the JSON text of the value
//!
//! A single newline follows when the [`OutputSpec`] asks for one.
//!
//! Failures are printed to stderr as `ERROR: <message>` followed by one
//! `caused by:` line per underlying error.

use std::io::{self, Write};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;

use crate::core::types::OutputSpec;

/// Label printed in front of every failure.
pub const ERROR_LABEL: &str = "ERROR:";

/// Shape of a result, decided once per write.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputKind<'a> {
    Structured(&'a Value),
    Text(&'a str),
    Raw(&'a Value),
}

impl<'a> OutputKind<'a> {
    pub fn of(value: &'a Value) -> Self {
        match value {
            Value::Object(_) | Value::Array(_) => OutputKind::Structured(value),
            Value::String(text) => OutputKind::Text(text),
            other => OutputKind::Raw(other),
        }
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            OutputKind::Structured(_) => "structured",
            OutputKind::Text(_) => "text",
            OutputKind::Raw(_) => "raw",
        }
    }
}

/// Write a result according to `spec`.
///
/// # Example
///
/// ```
/// use jsonld_cli::core::types::OutputSpec;
/// use jsonld_cli::ui::output::write_result;
/// use serde_json::json;
///
/// let mut out = Vec::new();
/// write_result(&mut out, &json!({"a": [1]}), &OutputSpec::default()).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "{\n  \"a\": [\n    1\n  ]\n}\n");
/// ```
pub fn write_result(out: &mut dyn Write, value: &Value, spec: &OutputSpec) -> io::Result<()> {
    match OutputKind::of(value) {
        OutputKind::Structured(value) => write_structured(out, value, spec.indent_width)?,
        OutputKind::Text(text) => out.write_all(text.trim().as_bytes())?,
        OutputKind::Raw(value) => write!(out, "{value}")?,
    }
    if spec.emit_trailing_newline {
        out.write_all(b"\n")?;
    }
    out.flush()
}

fn write_structured(out: &mut dyn Write, value: &Value, indent_width: usize) -> io::Result<()> {
    if indent_width == 0 {
        serde_json::to_writer(&mut *out, value)?;
        return Ok(());
    }
    let indent = vec![b' '; indent_width];
    let formatter = PrettyFormatter::with_indent(&indent);
    let mut serializer = Serializer::with_formatter(&mut *out, formatter);
    value.serialize(&mut serializer)?;
    Ok(())
}

/// Render a failure and its causes.
pub fn format_failure(err: &anyhow::Error) -> String {
    let mut message = format!("{ERROR_LABEL} {err}");
    for cause in err.chain().skip(1) {
        message.push_str(&format!("\n  caused by: {cause}"));
    }
    message
}

/// Failure Reporter: print the diagnostic to stderr and exit with status 1.
pub fn report_failure(err: &anyhow::Error) -> ! {
    eprintln!("{}", format_failure(err));
    std::process::exit(1)
}
