//! expand command - Expand a document

use std::io::Write;

use anyhow::Result;

use super::CommandContext;
use crate::cli::args::ExpandArgs;
use crate::processor::ExpandOptions;
use crate::request::ProcessingRequest;

/// Expand `args.input`.
pub async fn expand(ctx: &CommandContext, args: &ExpandArgs, out: &mut dyn Write) -> Result<()> {
    let document = ctx.read_input(&args.input).await?;

    let request = ProcessingRequest::Expand {
        document,
        options: ExpandOptions {
            base: args.output.base.clone(),
            keep_free_floating_nodes: args.keep_free_floating_nodes,
        },
    };
    let result = ctx.execute(request).await?;

    ctx.write(out, &result, &args.output)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::context;
    use super::*;
    use crate::cli::args::OutputArgs;
    use crate::processor::mock::{ProcessorCall, RecordingProcessor};

    #[tokio::test]
    async fn keep_flag_reaches_processor() {
        let processor = RecordingProcessor::new();
        let ctx = context(&processor, b"{}");
        let mut out = Vec::new();
        let args = ExpandArgs {
            input: "-".into(),
            keep_free_floating_nodes: true,
            output: OutputArgs::default(),
        };

        expand(&ctx, &args, &mut out).await.unwrap();

        assert!(matches!(
            &processor.calls()[0],
            ProcessorCall::Expand { options, .. } if options.keep_free_floating_nodes
        ));
    }

    #[tokio::test]
    async fn malformed_input_fails_before_processor() {
        let processor = RecordingProcessor::new();
        let ctx = context(&processor, b"{\"unterminated\": ");
        let mut out = Vec::new();
        let args = ExpandArgs {
            input: "-".into(),
            keep_free_floating_nodes: false,
            output: OutputArgs::default(),
        };

        let err = expand(&ctx, &args, &mut out).await.unwrap_err();

        assert!(format!("{err:#}").contains("failed to parse <stdin>"));
        assert!(processor.calls().is_empty());
        assert!(out.is_empty());
    }
}
