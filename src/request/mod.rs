//! request
//!
//! Request Assembler: one [`ProcessingRequest`] per invocation, holding the
//! resolved documents and the options projected for the engine.
//!
//! # Design
//!
//! A request is built once by a command handler, logged, and consumed by
//! [`ProcessingRequest::execute`], which makes exactly one call on the
//! [`Processor`]. Nothing mutates a request after construction.
//!
//! # Format Resolution
//!
//! `format` and `normalize` pick their output format with the same
//! precedence: `--nquads`, then `--json` (format only), then `--format`,
//! then the default. See [`resolve_output_format`] and
//! [`resolve_rdf_format`].

use std::fmt;

use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::core::types::DocumentFormat;
use crate::processor::{
    CompactOptions, ExpandOptions, FlattenOptions, FrameOptions, Processor, ProcessorError,
    RdfOptions,
};

/// Errors from assembling a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// A `--format` token that names no known format.
    #[error("unknown format: {0}")]
    UnknownFormat(String),
}

/// Engine operation a request maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ToRdf,
    Compact,
    Expand,
    Flatten,
    Frame,
    Normalize,
}

impl Operation {
    /// Engine-side operation name.
    pub fn name(self) -> &'static str {
        match self {
            Operation::ToRdf => "toRDF",
            Operation::Compact => "compact",
            Operation::Expand => "expand",
            Operation::Flatten => "flatten",
            Operation::Frame => "frame",
            Operation::Normalize => "normalize",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fully assembled engine call.
///
/// Secondary documents (`context`, `frame`) are `Value::Null` when the
/// caller gave no source for them.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingRequest {
    ToRdf {
        document: Value,
        options: RdfOptions,
    },
    Compact {
        document: Value,
        context: Value,
        options: CompactOptions,
    },
    Expand {
        document: Value,
        options: ExpandOptions,
    },
    Flatten {
        document: Value,
        context: Value,
        options: FlattenOptions,
    },
    Frame {
        document: Value,
        frame: Value,
        options: FrameOptions,
    },
    Normalize {
        document: Value,
        options: RdfOptions,
    },
}

impl ProcessingRequest {
    pub fn operation(&self) -> Operation {
        match self {
            ProcessingRequest::ToRdf { .. } => Operation::ToRdf,
            ProcessingRequest::Compact { .. } => Operation::Compact,
            ProcessingRequest::Expand { .. } => Operation::Expand,
            ProcessingRequest::Flatten { .. } => Operation::Flatten,
            ProcessingRequest::Frame { .. } => Operation::Frame,
            ProcessingRequest::Normalize { .. } => Operation::Normalize,
        }
    }

    /// Options under the engine's option names.
    ///
    /// Unset optional values (`base`, `format`) are left out.
    ///
    /// ```
    /// use jsonld_cli::processor::CompactOptions;
    /// use jsonld_cli::request::ProcessingRequest;
    /// use serde_json::{json, Value};
    ///
    /// let request = ProcessingRequest::Compact {
    ///     document: json!({}),
    ///     context: Value::Null,
    ///     options: CompactOptions::default(),
    /// };
    /// assert_eq!(
    ///     request.engine_options(),
    ///     json!({"strict": true, "compactArrays": true, "graph": false, "skipExpansion": false})
    /// );
    /// ```
    pub fn engine_options(&self) -> Value {
        let (base, mut options) = match self {
            ProcessingRequest::ToRdf { options, .. }
            | ProcessingRequest::Normalize { options, .. } => {
                let mut map = Map::new();
                if let Some(format) = &options.format {
                    map.insert("format".into(), json!(format));
                }
                (&options.base, map)
            }
            ProcessingRequest::Compact { options, .. } => (
                &options.base,
                object(json!({
                    "strict": options.strict,
                    "compactArrays": options.compact_arrays,
                    "graph": options.graph,
                    "skipExpansion": options.skip_expansion,
                })),
            ),
            ProcessingRequest::Expand { options, .. } => {
                let keep = options.keep_free_floating_nodes;
                (&options.base, object(json!({"keepFreeFloatingNodes": keep})))
            }
            ProcessingRequest::Flatten { options, .. } => (&options.base, Map::new()),
            ProcessingRequest::Frame { options, .. } => (
                &options.base,
                object(json!({
                    "embed": options.embed,
                    "explicit": options.explicit,
                    "omitDefault": options.omit_default,
                })),
            ),
        };
        if let Some(base) = base {
            options.insert("base".into(), json!(base));
        }
        Value::Object(options)
    }

    /// Make the one engine call this request describes.
    ///
    /// For `compact` the context the engine reports back is dropped.
    pub async fn execute(self, processor: &dyn Processor) -> Result<Value, ProcessorError> {
        match self {
            ProcessingRequest::ToRdf { document, options } => {
                processor.to_rdf(document, &options).await
            }
            ProcessingRequest::Compact {
                document,
                context,
                options,
            } => processor
                .compact(document, context, &options)
                .await
                .map(|compacted| compacted.document),
            ProcessingRequest::Expand { document, options } => {
                processor.expand(document, &options).await
            }
            ProcessingRequest::Flatten {
                document,
                context,
                options,
            } => processor.flatten(document, context, &options).await,
            ProcessingRequest::Frame {
                document,
                frame,
                options,
            } => processor.frame(document, frame, &options).await,
            ProcessingRequest::Normalize { document, options } => {
                processor.normalize(document, &options).await
            }
        }
    }
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Output format for the `format` command.
///
/// # Errors
///
/// [`RequestError::UnknownFormat`] when `--format` is consulted and names
/// no known format.
pub fn resolve_output_format(
    nquads: bool,
    json: bool,
    format: Option<&str>,
) -> Result<DocumentFormat, RequestError> {
    if nquads {
        return Ok(DocumentFormat::NQuads);
    }
    if json {
        return Ok(DocumentFormat::JsonLd);
    }
    match format {
        Some(token) => parse_format(token),
        None => Ok(DocumentFormat::JsonLd),
    }
}

/// Output format for `normalize`; `None` leaves it to the engine.
///
/// # Errors
///
/// [`RequestError::UnknownFormat`] for an unrecognized `--format` token.
pub fn resolve_rdf_format(
    nquads: bool,
    format: Option<&str>,
) -> Result<Option<DocumentFormat>, RequestError> {
    if nquads {
        return Ok(Some(DocumentFormat::NQuads));
    }
    format.map(parse_format).transpose()
}

fn parse_format(token: &str) -> Result<DocumentFormat, RequestError> {
    DocumentFormat::parse(token).ok_or_else(|| RequestError::UnknownFormat(token.to_string()))
}
