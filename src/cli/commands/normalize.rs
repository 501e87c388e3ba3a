//! normalize command - Canonicalize a document's RDF dataset

use std::io::Write;

use anyhow::Result;

use super::CommandContext;
use crate::cli::args::NormalizeArgs;
use crate::processor::RdfOptions;
use crate::request::{resolve_rdf_format, ProcessingRequest};

/// Normalize `args.input`.
///
/// Without `--nquads` or `--format` the processor picks its default output.
pub async fn normalize(
    ctx: &CommandContext,
    args: &NormalizeArgs,
    out: &mut dyn Write,
) -> Result<()> {
    let document = ctx.read_input(&args.input).await?;
    let format = resolve_rdf_format(args.nquads, args.format.as_deref())?;

    let request = ProcessingRequest::Normalize {
        document,
        options: RdfOptions {
            base: args.output.base.clone(),
            format: format.map(|f| f.to_string()),
        },
    };
    let result = ctx.execute(request).await?;

    ctx.write(out, &result, &args.output)
}
