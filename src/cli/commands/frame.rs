//! frame command - Frame a document

use std::io::Write;

use anyhow::Result;

use super::CommandContext;
use crate::cli::args::FrameArgs;
use crate::processor::FrameOptions;
use crate::request::ProcessingRequest;

/// Frame `args.input` with `--frame`.
pub async fn frame(ctx: &CommandContext, args: &FrameArgs, out: &mut dyn Write) -> Result<()> {
    let (document, frame) = ctx
        .read_with_secondary(&args.input, args.frame.as_deref(), "frame")
        .await?;

    let request = ProcessingRequest::Frame {
        document,
        frame,
        options: FrameOptions {
            base: args.output.base.clone(),
            embed: args.embed,
            explicit: args.explicit,
            omit_default: args.omit_default,
        },
    };
    let result = ctx.execute(request).await?;

    ctx.write(out, &result, &args.output)
}
