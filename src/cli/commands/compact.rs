//! compact command - Compact a document with a context

use std::io::Write;

use anyhow::Result;

use super::CommandContext;
use crate::cli::args::CompactArgs;
use crate::processor::CompactOptions;
use crate::request::ProcessingRequest;

/// Compact `args.input` with `--context`.
///
/// An omitted `--context` resolves to null and is passed on; the processor
/// decides whether that is acceptable.
pub async fn compact(ctx: &CommandContext, args: &CompactArgs, out: &mut dyn Write) -> Result<()> {
    let (document, context) = ctx
        .read_with_secondary(&args.input, args.context.as_deref(), "context")
        .await?;

    let request = ProcessingRequest::Compact {
        document,
        context,
        options: CompactOptions {
            base: args.output.base.clone(),
            strict: args.strict,
            compact_arrays: args.compact_arrays,
            graph: args.graph,
            skip_expansion: !args.expansion,
        },
    };
    let result = ctx.execute(request).await?;

    ctx.write(out, &result, &args.output)
}
