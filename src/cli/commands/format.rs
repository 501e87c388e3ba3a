//! format command - Re-serialize a document as JSON-LD or N-Quads

use std::io::Write;

use anyhow::Result;
use tracing::debug;

use super::CommandContext;
use crate::cli::args::FormatArgs;
use crate::core::types::DocumentFormat;
use crate::processor::RdfOptions;
use crate::request::{resolve_output_format, ProcessingRequest};

/// Write `args.input` in the requested format.
///
/// JSON-LD output is the document as read; only N-Quads output goes
/// through the processor (`toRDF`).
pub async fn format(ctx: &CommandContext, args: &FormatArgs, out: &mut dyn Write) -> Result<()> {
    let document = ctx.read_input(&args.input).await?;
    let format = resolve_output_format(args.nquads, args.json, args.format.as_deref())?;

    let result = match format {
        DocumentFormat::JsonLd => {
            debug!("JSON-LD output, processor not called");
            document
        }
        DocumentFormat::NQuads => {
            let request = ProcessingRequest::ToRdf {
                document,
                options: RdfOptions {
                    base: args.output.base.clone(),
                    format: Some(DocumentFormat::NQUADS_MEDIA_TYPE.to_string()),
                },
            };
            ctx.execute(request).await?
        }
    };

    ctx.write(out, &result, &args.output)
}
