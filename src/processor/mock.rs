//! processor::mock
//!
//! Recording processor for deterministic testing.
//!
//! # Design
//!
//! `RecordingProcessor` implements [`Processor`] without doing any JSON-LD
//! work. Every call is recorded with its inputs and options; the result
//! is the input document unless a fixed result or a failure is
//! configured.
//!
//! # Example
//!
//! ```
//! use jsonld_cli::processor::mock::{ProcessorCall, RecordingProcessor};
//! use jsonld_cli::processor::{ExpandOptions, Processor};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let processor = RecordingProcessor::new().with_result(json!(["expanded"]));
//! let out = processor.expand(json!({"a": 1}), &ExpandOptions::default()).await.unwrap();
//! assert_eq!(out, json!(["expanded"]));
//! assert!(matches!(processor.calls()[0], ProcessorCall::Expand { .. }));
//! # });
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use super::{
    CompactOptions, Compacted, ExpandOptions, FlattenOptions, FrameOptions, Processor,
    ProcessorError, RdfOptions,
};

/// Test double that records calls.
///
/// Clones share state.
#[derive(Debug, Clone, Default)]
pub struct RecordingProcessor {
    inner: Arc<Mutex<RecordingInner>>,
}

#[derive(Debug, Default)]
struct RecordingInner {
    result: Option<Value>,
    failure: Option<ProcessorError>,
    calls: Vec<ProcessorCall>,
}

/// A recorded call.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessorCall {
    ToRdf {
        input: Value,
        options: RdfOptions,
    },
    Compact {
        input: Value,
        context: Value,
        options: CompactOptions,
    },
    Expand {
        input: Value,
        options: ExpandOptions,
    },
    Flatten {
        input: Value,
        context: Value,
        options: FlattenOptions,
    },
    Frame {
        input: Value,
        frame: Value,
        options: FrameOptions,
    },
    Normalize {
        input: Value,
        options: RdfOptions,
    },
}

impl RecordingProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every call with `result`.
    pub fn with_result(self, result: Value) -> Self {
        self.lock().result = Some(result);
        self
    }

    /// Fail every call with `error`.
    pub fn failing(self, error: ProcessorError) -> Self {
        self.lock().failure = Some(error);
        self
    }

    /// All calls so far, oldest first.
    pub fn calls(&self) -> Vec<ProcessorCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, RecordingInner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record `call` and produce the configured outcome, echoing `input`
    /// by default.
    fn answer(&self, call: ProcessorCall, input: Value) -> Result<Value, ProcessorError> {
        let mut inner = self.lock();
        inner.calls.push(call);
        if let Some(error) = &inner.failure {
            return Err(error.clone());
        }
        Ok(inner.result.clone().unwrap_or(input))
    }
}

#[async_trait]
impl Processor for RecordingProcessor {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn to_rdf(&self, input: Value, options: &RdfOptions) -> Result<Value, ProcessorError> {
        let call = ProcessorCall::ToRdf {
            input: input.clone(),
            options: options.clone(),
        };
        self.answer(call, input)
    }

    async fn compact(
        &self,
        input: Value,
        context: Value,
        options: &CompactOptions,
    ) -> Result<Compacted, ProcessorError> {
        let call = ProcessorCall::Compact {
            input: input.clone(),
            context: context.clone(),
            options: options.clone(),
        };
        let document = self.answer(call, input)?;
        Ok(Compacted { document, context })
    }

    async fn expand(&self, input: Value, options: &ExpandOptions) -> Result<Value, ProcessorError> {
        let call = ProcessorCall::Expand {
            input: input.clone(),
            options: options.clone(),
        };
        self.answer(call, input)
    }

    async fn flatten(
        &self,
        input: Value,
        context: Value,
        options: &FlattenOptions,
    ) -> Result<Value, ProcessorError> {
        let call = ProcessorCall::Flatten {
            input: input.clone(),
            context,
            options: options.clone(),
        };
        self.answer(call, input)
    }

    async fn frame(
        &self,
        input: Value,
        frame: Value,
        options: &FrameOptions,
    ) -> Result<Value, ProcessorError> {
        let call = ProcessorCall::Frame {
            input: input.clone(),
            frame,
            options: options.clone(),
        };
        self.answer(call, input)
    }

    async fn normalize(&self, input: Value, options: &RdfOptions) -> Result<Value, ProcessorError> {
        let call = ProcessorCall::Normalize {
            input: input.clone(),
            options: options.clone(),
        };
        self.answer(call, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn echoes_input_by_default() {
        let processor = RecordingProcessor::new();
        let out = processor
            .normalize(json!({"a": 1}), &RdfOptions::default())
            .await
            .unwrap();
        assert_eq!(out, json!({"a": 1}));
    }

    #[tokio::test]
    async fn compact_returns_context() {
        let processor = RecordingProcessor::new();
        let options = CompactOptions::default();
        let compacted = processor
            .compact(json!({"a": 1}), json!({"x": "y"}), &options)
            .await
            .unwrap();
        assert_eq!(compacted.context, json!({"x": "y"}));
    }

    #[tokio::test]
    async fn failures_are_returned_and_recorded() {
        let processor =
            RecordingProcessor::new().failing(ProcessorError::InvalidDocument("bad".into()));
        let err = processor
            .expand(json!({}), &ExpandOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, ProcessorError::InvalidDocument("bad".into()));
        assert_eq!(processor.calls().len(), 1);
    }

    #[tokio::test]
    async fn clones_share_calls() {
        let processor = RecordingProcessor::new();
        let clone = processor.clone();
        clone
            .flatten(json!({}), Value::Null, &FlattenOptions::default())
            .await
            .unwrap();
        assert_eq!(
            processor.calls(),
            vec![ProcessorCall::Flatten {
                input: json!({}),
                context: Value::Null,
                options: FlattenOptions::default(),
            }]
        );
    }
}
