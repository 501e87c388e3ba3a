//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each processing command handler:
//! 1. Reads its sources through the resolver, concurrently when it has two
//! 2. Assembles one [`ProcessingRequest`]
//! 3. Executes it against the processor and writes the result
//!
//! Any failure returns early, so nothing is written after an error and the
//! engine is never called unless every source resolved.

mod compact;
mod completion;
mod expand;
mod flatten;
mod format;
mod frame;
mod normalize;

pub use compact::compact;
pub use completion::completion;
pub use expand::expand;
pub use flatten::flatten;
pub use format::format;
pub use frame::frame;
pub use normalize::normalize;

use std::io::Write;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use serde_json::Value;
use tracing::debug;

use crate::cli::args::{Command, OutputArgs};
use crate::core::config::Config;
use crate::input::Resolver;
use crate::processor::Processor;
use crate::request::ProcessingRequest;
use crate::ui::output::{write_result, OutputKind};

/// Everything a handler needs for one invocation.
pub struct CommandContext {
    pub resolver: Arc<Resolver>,
    pub processor: Arc<dyn Processor>,
    pub config: Config,
}

impl CommandContext {
    /// Read the primary document.
    pub async fn read_input(&self, descriptor: &str) -> Result<Value> {
        self.resolver
            .resolve(descriptor)
            .await
            .with_context(|| format!("failed to read input '{descriptor}'"))
    }

    /// Read the primary document and an optional secondary one (context or
    /// frame) concurrently. An absent secondary source yields null.
    pub async fn read_with_secondary(
        &self,
        descriptor: &str,
        secondary: Option<&str>,
        label: &str,
    ) -> Result<(Value, Value)> {
        let name = secondary.unwrap_or_default();
        let secondary_read = async {
            self.resolver
                .resolve_optional(secondary)
                .await
                .with_context(|| format!("failed to read {label} '{name}'"))
        };
        tokio::try_join!(self.read_input(descriptor), secondary_read)
    }

    /// Run a request against the processor.
    pub async fn execute(&self, request: ProcessingRequest) -> Result<Value> {
        let operation = request.operation();
        debug!(
            %operation,
            processor = self.processor.name(),
            options = %request.engine_options(),
            "calling processor"
        );
        request
            .execute(self.processor.as_ref())
            .await
            .with_context(|| format!("{operation} failed"))
    }

    /// Write a result with the output flags layered over config.
    pub fn write(&self, out: &mut dyn Write, value: &Value, args: &OutputArgs) -> Result<()> {
        let spec = self.config.output_spec(args.indent, args.no_newline);
        debug!(
            kind = OutputKind::of(value).name(),
            indent = spec.indent_width,
            "writing result"
        );
        write_result(out, value, &spec).context("failed to write output")
    }
}

/// Dispatch a command to its handler.
pub async fn dispatch(command: Command, ctx: &CommandContext, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Format(args) => format::format(ctx, &args, out).await,
        Command::Compact(args) => compact::compact(ctx, &args, out).await,
        Command::Expand(args) => expand::expand(ctx, &args, out).await,
        Command::Flatten(args) => flatten::flatten(ctx, &args, out).await,
        Command::Frame(args) => frame::frame(ctx, &args, out).await,
        Command::Normalize(args) => normalize::normalize(ctx, &args, out).await,
        Command::Completion { shell } => completion::completion(shell, out),
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::processor::mock::RecordingProcessor;
    use serde_json::json;

    #[tokio::test]
    async fn secondary_absent_is_null() {
        let processor = RecordingProcessor::new();
        let ctx = context(&processor, b"{\"a\": 1}");
        let (doc, secondary) = ctx.read_with_secondary("-", None, "context").await.unwrap();
        assert_eq!(doc, json!({"a": 1}));
        assert!(secondary.is_null());
    }

    #[tokio::test]
    async fn stdin_twice_fails() {
        let processor = RecordingProcessor::new();
        let ctx = context(&processor, b"{}");
        let err = ctx
            .read_with_secondary("-", Some("-"), "context")
            .await
            .unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("standard input can only be read once"));
    }

    #[tokio::test]
    async fn failed_read_names_the_source() {
        let processor = RecordingProcessor::new();
        let ctx = context(&processor, b"");
        let err = ctx.read_input("/nonexistent/doc.jsonld").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to read input '/nonexistent/doc.jsonld'"
        );
    }
}
