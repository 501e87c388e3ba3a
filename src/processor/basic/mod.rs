//! processor::basic
//!
//! In-process JSON-LD engine.
//!
//! # Coverage
//!
//! - Context processing with term definitions, `@vocab`, `@base`,
//!   `@language`, type and container mappings and remote contexts
//! - Expansion, compaction, flattening
//! - Framing by `@id`, `@type` and property presence, with `@embed`,
//!   `@explicit`, `@omitDefault` and `@default`
//! - RDF conversion to N-Quads or a dataset object
//! - Canonical blank node labelling for `normalize`
//!
//! Reverse properties are rejected as unsupported.
//!
//! # Remote Contexts
//!
//! String contexts are fetched through a [`DocumentLoader`] before
//! processing starts. Without a loader any remote context fails with
//! `LoadingDocumentFailed`.

pub mod canonical;
pub mod compact;
pub mod context;
pub mod expand;
pub mod frame;
pub mod node_map;
pub mod rdf;

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use self::context::{
    collect_context_references, collect_local_references, resolve_reference, ActiveContext,
    RemoteContexts,
};
use self::expand::{expand, ExpansionFlags};
use self::frame::FrameFlags;
use self::node_map::NodeMap;
use super::{
    CompactOptions, Compacted, DocumentLoader, ExpandOptions, FlattenOptions, FrameOptions,
    Processor, ProcessorError, RdfOptions,
};
use crate::core::types::DocumentFormat;

/// Upper bound on remote contexts loaded for one operation.
const MAX_REMOTE_CONTEXTS: usize = 64;

/// The built-in engine.
#[derive(Clone, Default)]
pub struct BasicProcessor {
    loader: Option<Arc<dyn DocumentLoader>>,
}

impl std::fmt::Debug for BasicProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicProcessor")
            .field("loader", &self.loader.is_some())
            .finish()
    }
}

impl BasicProcessor {
    /// An engine that cannot load remote contexts.
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine that loads remote contexts through `loader`.
    pub fn with_loader(loader: Arc<dyn DocumentLoader>) -> Self {
        Self {
            loader: Some(loader),
        }
    }

    /// Load every remote context referenced from `documents`, transitively.
    async fn load_remote_contexts(
        &self,
        documents: &[&Value],
        base: Option<&str>,
    ) -> Result<RemoteContexts, ProcessorError> {
        let base = ActiveContext::new(base)?.base;
        let mut pending = VecDeque::new();
        for document in documents {
            let mut found = Vec::new();
            collect_context_references(document, &mut found);
            pending.extend(found.iter().map(|r| resolve_reference(base.as_ref(), r)));
        }

        let mut remote = RemoteContexts::new();
        while let Some(iri) = pending.pop_front() {
            if remote.contains_key(&iri) {
                continue;
            }
            if remote.len() >= MAX_REMOTE_CONTEXTS {
                return Err(ProcessorError::InvalidContext(format!(
                    "more than {MAX_REMOTE_CONTEXTS} remote contexts"
                )));
            }
            let loader = self
                .loader
                .as_ref()
                .ok_or_else(|| ProcessorError::LoadingDocumentFailed {
                    iri: iri.clone(),
                    message: "no document loader configured".into(),
                })?;
            debug!(iri = %iri, "loading remote context");
            let document = loader.load_document(&iri).await?;

            if let Some(nested) = document.get("@context") {
                let nested_base = url::Url::parse(&iri).ok();
                let mut found = Vec::new();
                collect_local_references(nested, &mut found);
                pending.extend(
                    found
                        .iter()
                        .map(|r| resolve_reference(nested_base.as_ref(), r)),
                );
            }
            remote.insert(iri, document);
        }
        Ok(remote)
    }

    async fn expand_document(
        &self,
        input: &Value,
        base: Option<&str>,
        flags: ExpansionFlags,
    ) -> Result<Value, ProcessorError> {
        let remote = self.load_remote_contexts(&[input], base).await?;
        let ctx = ActiveContext::new(base)?;
        expand(input, &ctx, &remote, flags)
    }

    async fn rdf_quads(
        &self,
        input: &Value,
        base: Option<&str>,
    ) -> Result<Vec<rdf::Quad>, ProcessorError> {
        let expanded = self
            .expand_document(input, base, ExpansionFlags::default())
            .await?;
        Ok(rdf::to_quads(NodeMap::from_expanded(&expanded)))
    }

    /// Compact an already expanded document with `context`.
    async fn compact_expanded(
        &self,
        expanded: &Value,
        context: &Value,
        base: Option<&str>,
        compact_arrays: bool,
        graph: bool,
    ) -> Result<Value, ProcessorError> {
        let local = context_of(context);
        let wrapped = serde_json::json!({ "@context": local.clone() });
        let remote = self.load_remote_contexts(&[&wrapped], base).await?;
        let ctx = ActiveContext::new(base)?.process(&local, &remote)?;
        Ok(compact::compact_document(
            &ctx,
            expanded,
            &local,
            compact_arrays,
            graph,
        ))
    }
}

/// The local context inside a context document, or the value itself.
fn context_of(context: &Value) -> Value {
    match context {
        Value::Object(map) if map.contains_key("@context") => map["@context"].clone(),
        other => other.clone(),
    }
}

fn rdf_output(quads: &[rdf::Quad], format: Option<&str>) -> Result<Value, ProcessorError> {
    match format {
        None => Ok(rdf::to_dataset(quads)),
        Some(media_type) if media_type == DocumentFormat::NQUADS_MEDIA_TYPE => {
            Ok(Value::String(rdf::to_nquads(quads)))
        }
        Some(other) => Err(ProcessorError::UnknownFormat(other.to_string())),
    }
}

#[async_trait]
impl Processor for BasicProcessor {
    fn name(&self) -> &'static str {
        "basic"
    }

    async fn to_rdf(&self, input: Value, options: &RdfOptions) -> Result<Value, ProcessorError> {
        let quads = self.rdf_quads(&input, options.base.as_deref()).await?;
        rdf_output(&quads, options.format.as_deref())
    }

    async fn compact(
        &self,
        input: Value,
        context: Value,
        options: &CompactOptions,
    ) -> Result<Compacted, ProcessorError> {
        if context.is_null() {
            return Err(ProcessorError::InvalidContext(
                "compaction requires a context".into(),
            ));
        }
        let base = options.base.as_deref();
        let expanded = if options.skip_expansion {
            input
        } else {
            let flags = ExpansionFlags {
                strict: options.strict,
                ..ExpansionFlags::default()
            };
            self.expand_document(&input, base, flags).await?
        };
        let document = self
            .compact_expanded(
                &expanded,
                &context,
                base,
                options.compact_arrays,
                options.graph,
            )
            .await?;
        Ok(Compacted {
            document,
            context: context_of(&context),
        })
    }

    async fn expand(&self, input: Value, options: &ExpandOptions) -> Result<Value, ProcessorError> {
        let flags = ExpansionFlags {
            keep_free_floating_nodes: options.keep_free_floating_nodes,
            ..ExpansionFlags::default()
        };
        self.expand_document(&input, options.base.as_deref(), flags)
            .await
    }

    async fn flatten(
        &self,
        input: Value,
        context: Value,
        options: &FlattenOptions,
    ) -> Result<Value, ProcessorError> {
        let base = options.base.as_deref();
        let expanded = self
            .expand_document(&input, base, ExpansionFlags::default())
            .await?;
        let flattened = Value::Array(NodeMap::from_expanded(&expanded).flatten());
        if context.is_null() {
            return Ok(flattened);
        }
        self.compact_expanded(&flattened, &context, base, true, true)
            .await
    }

    async fn frame(
        &self,
        input: Value,
        frame: Value,
        options: &FrameOptions,
    ) -> Result<Value, ProcessorError> {
        if frame.is_null() {
            return Err(ProcessorError::InvalidFrame(
                "framing requires a frame".into(),
            ));
        }
        let base = options.base.as_deref();
        let expanded = self
            .expand_document(&input, base, ExpansionFlags::default())
            .await?;
        let frame_flags = ExpansionFlags {
            frame: true,
            keep_free_floating_nodes: true,
            ..ExpansionFlags::default()
        };
        let expanded_frame = self.expand_document(&frame, base, frame_flags).await?;
        let frame_map = frame::frame_object(&expanded_frame)?;

        let flags = FrameFlags {
            embed: options.embed,
            explicit: options.explicit,
            omit_default: options.omit_default,
        };
        let graph = NodeMap::from_expanded(&expanded).merged();
        let framed = Value::Array(frame::frame(&graph, &frame_map, flags));

        let context = match &frame {
            Value::Object(map) => map.get("@context").cloned().unwrap_or(Value::Null),
            _ => Value::Null,
        };
        self.compact_expanded(&framed, &context, base, true, true)
            .await
    }

    async fn normalize(&self, input: Value, options: &RdfOptions) -> Result<Value, ProcessorError> {
        let quads = self.rdf_quads(&input, options.base.as_deref()).await?;
        let canonical = canonical::canonicalize(&quads);
        rdf_output(&canonical, options.format.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    /// Loader serving a fixed set of documents.
    struct MapLoader(HashMap<String, Value>);

    #[async_trait]
    impl DocumentLoader for MapLoader {
        async fn load_document(&self, iri: &str) -> Result<Value, ProcessorError> {
            self.0
                .get(iri)
                .cloned()
                .ok_or_else(|| ProcessorError::LoadingDocumentFailed {
                    iri: iri.to_string(),
                    message: "not found".into(),
                })
        }
    }

    fn person() -> Value {
        json!({
            "@context": {"name": "http://schema.org/name", "Person": "http://schema.org/Person"},
            "@id": "http://example.org/jane",
            "@type": "Person",
            "name": "Jane"
        })
    }

    #[tokio::test]
    async fn compact_round_trips_through_context() {
        let processor = BasicProcessor::new();
        let context = json!({"@context": {"n": "http://schema.org/name"}});
        let compacted = processor
            .compact(person(), context, &CompactOptions::default())
            .await
            .unwrap();
        assert_eq!(
            compacted.document,
            json!({
                "@context": {"n": "http://schema.org/name"},
                "@id": "http://example.org/jane",
                "@type": "http://schema.org/Person",
                "n": "Jane"
            })
        );
        assert_eq!(compacted.context, json!({"n": "http://schema.org/name"}));
    }

    #[tokio::test]
    async fn compact_without_context_is_rejected() {
        let err = BasicProcessor::new()
            .compact(person(), Value::Null, &CompactOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessorError::InvalidContext(_)));
    }

    #[tokio::test]
    async fn flatten_without_context_is_expanded() {
        let flattened = BasicProcessor::new()
            .flatten(person(), Value::Null, &FlattenOptions::default())
            .await
            .unwrap();
        assert_eq!(
            flattened,
            json!([{
                "@id": "http://example.org/jane",
                "@type": ["http://schema.org/Person"],
                "http://schema.org/name": [{"@value": "Jane"}]
            }])
        );
    }

    #[tokio::test]
    async fn flatten_with_context_has_graph() {
        let flattened = BasicProcessor::new()
            .flatten(
                person(),
                json!({"@context": {"name": "http://schema.org/name"}}),
                &FlattenOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(flattened["@graph"][0]["name"], "Jane");
        let context = json!({"name": "http://schema.org/name"});
        assert_eq!(flattened["@context"], context);
    }

    #[tokio::test]
    async fn frame_compacts_with_frame_context() {
        let frame = json!({
            "@context": {"name": "http://schema.org/name", "Person": "http://schema.org/Person"},
            "@type": "Person"
        });
        let framed = BasicProcessor::new()
            .frame(person(), frame, &FrameOptions::default())
            .await
            .unwrap();
        assert_eq!(framed["@graph"][0]["@type"], "Person");
        assert_eq!(framed["@graph"][0]["name"], "Jane");
    }

    #[tokio::test]
    async fn frame_without_frame_is_rejected() {
        let err = BasicProcessor::new()
            .frame(person(), Value::Null, &FrameOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessorError::InvalidFrame(_)));
    }

    #[tokio::test]
    async fn to_rdf_nquads_and_dataset() {
        let processor = BasicProcessor::new();
        let options = RdfOptions {
            format: Some(DocumentFormat::NQUADS_MEDIA_TYPE.into()),
            ..RdfOptions::default()
        };
        let nquads = processor.to_rdf(person(), &options).await.unwrap();
        let expected = concat!(
            "<http://example.org/jane> <http://schema.org/name> \"Jane\" .\n",
            "<http://example.org/jane> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> ",
            "<http://schema.org/Person> .\n",
        );
        assert_eq!(nquads, json!(expected));

        let dataset = processor
            .to_rdf(person(), &RdfOptions::default())
            .await
            .unwrap();
        assert_eq!(dataset["@default"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_rdf_format_is_rejected() {
        let options = RdfOptions {
            format: Some("text/turtle".into()),
            ..RdfOptions::default()
        };
        let err = BasicProcessor::new()
            .to_rdf(person(), &options)
            .await
            .unwrap_err();
        assert_eq!(err, ProcessorError::UnknownFormat("text/turtle".into()));
    }

    #[tokio::test]
    async fn normalize_relabels_blank_nodes() {
        let doc = json!({
            "@context": {"name": "http://schema.org/name"},
            "@id": "_:someone",
            "name": "Anon"
        });
        let options = RdfOptions {
            format: Some(DocumentFormat::NQUADS_MEDIA_TYPE.into()),
            ..RdfOptions::default()
        };
        let normalized = BasicProcessor::new()
            .normalize(doc, &options)
            .await
            .unwrap();
        assert_eq!(
            normalized,
            json!("_:c14n0 <http://schema.org/name> \"Anon\" .\n")
        );
    }

    #[tokio::test]
    async fn remote_contexts_load_through_loader() {
        let mut documents = HashMap::new();
        documents.insert(
            "http://example.org/context.jsonld".to_string(),
            json!({"@context": {"name": "http://schema.org/name"}}),
        );
        let processor = BasicProcessor::with_loader(Arc::new(MapLoader(documents)));
        let doc = json!({"@context": "http://example.org/context.jsonld", "name": "Jane"});
        let expanded = processor
            .expand(doc, &ExpandOptions::default())
            .await
            .unwrap();
        assert_eq!(
            expanded,
            json!([{"http://schema.org/name": [{"@value": "Jane"}]}])
        );
    }

    #[tokio::test]
    async fn remote_context_without_loader_fails() {
        let doc = json!({"@context": "http://example.org/context.jsonld", "name": "Jane"});
        let err = BasicProcessor::new()
            .expand(doc, &ExpandOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessorError::LoadingDocumentFailed { .. }));
    }
}
