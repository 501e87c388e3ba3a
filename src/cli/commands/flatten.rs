//! flatten command - Flatten a document

use std::io::Write;

use anyhow::Result;

use super::CommandContext;
use crate::cli::args::FlattenArgs;
use crate::processor::FlattenOptions;
use crate::request::ProcessingRequest;

/// Flatten `args.input`, compacting with `--context` when given.
pub async fn flatten(ctx: &CommandContext, args: &FlattenArgs, out: &mut dyn Write) -> Result<()> {
    let (document, context) = ctx
        .read_with_secondary(&args.input, args.context.as_deref(), "context")
        .await?;

    let request = ProcessingRequest::Flatten {
        document,
        context,
        options: FlattenOptions {
            base: args.output.base.clone(),
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
    use serde_json::Value;

    #[tokio::test]
    async fn context_is_optional() {
        let processor = RecordingProcessor::new();
        let ctx = context(&processor, b"[]");
        let mut out = Vec::new();
        let args = FlattenArgs {
            input: "-".into(),
            context: None,
            output: OutputArgs::default(),
        };

        flatten(&ctx, &args, &mut out).await.unwrap();

        assert!(matches!(
            &processor.calls()[0],
            ProcessorCall::Flatten { context, .. } if context == &Value::Null
        ));
    }
}
