//! processor::basic::context
//!
//! Active contexts: term definitions, IRI expansion and IRI compaction.
//!
//! # Remote Contexts
//!
//! Context processing is synchronous. String contexts are looked up in a
//! [`RemoteContexts`] map that the caller fills beforehand; see
//! [`collect_context_references`].

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};
use url::Url;

use crate::processor::ProcessorError;

/// Remote context documents keyed by resolved IRI.
pub type RemoteContexts = HashMap<String, Value>;

/// Nested remote context limit.
const MAX_CONTEXT_DEPTH: usize = 16;

const KEYWORDS: &[&str] = &[
    "@base",
    "@container",
    "@context",
    "@default",
    "@embed",
    "@explicit",
    "@graph",
    "@id",
    "@index",
    "@language",
    "@list",
    "@null",
    "@omitDefault",
    "@preserve",
    "@reverse",
    "@set",
    "@type",
    "@value",
    "@vocab",
];

/// Whether `value` is a JSON-LD keyword.
pub fn is_keyword(value: &str) -> bool {
    KEYWORDS.contains(&value)
}

/// Whether `value` is an absolute IRI or a blank node identifier.
pub fn is_absolute(value: &str) -> bool {
    value.contains(':')
}

/// Whether `value` is a blank node identifier.
pub fn is_blank(value: &str) -> bool {
    value.starts_with("_:")
}

/// A single term definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermDefinition {
    /// Expanded IRI (or keyword, for aliases)
    pub iri: String,
    /// `@id`, `@vocab` or a datatype IRI
    pub type_mapping: Option<String>,
    /// `Some(None)` when the term explicitly has no language
    pub language: Option<Option<String>>,
    /// `@list`, `@set`, `@index` or `@language`
    pub container: Option<String>,
    /// Reverse property
    pub reverse: bool,
}

impl TermDefinition {
    fn new(iri: String) -> Self {
        Self {
            iri,
            type_mapping: None,
            language: None,
            container: None,
            reverse: false,
        }
    }
}

/// The context in effect while processing part of a document.
#[derive(Debug, Clone, Default)]
pub struct ActiveContext {
    pub base: Option<Url>,
    original_base: Option<Url>,
    pub vocab: Option<String>,
    pub language: Option<String>,
    pub terms: BTreeMap<String, TermDefinition>,
}

impl ActiveContext {
    /// An empty context with the given document base.
    pub fn new(base: Option<&str>) -> Result<Self, ProcessorError> {
        let base = base
            .map(|b| {
                Url::parse(b).map_err(|e| {
                    ProcessorError::InvalidContext(format!("invalid base IRI '{b}': {e}"))
                })
            })
            .transpose()?;
        Ok(Self {
            original_base: base.clone(),
            base,
            ..Self::default()
        })
    }

    /// Whether the context defines nothing beyond its base.
    pub fn is_empty(&self) -> bool {
        self.vocab.is_none() && self.language.is_none() && self.terms.is_empty()
    }

    /// Container mapping of a term.
    pub fn container(&self, term: &str) -> Option<&str> {
        self.terms.get(term).and_then(|d| d.container.as_deref())
    }

    /// Language that applies to plain strings under `term`.
    pub fn effective_language(&self, term: Option<&str>) -> Option<&str> {
        let definition = term.and_then(|t| self.terms.get(t));
        match definition.and_then(|d| d.language.as_ref()) {
            Some(language) => language.as_deref(),
            None => self.language.as_deref(),
        }
    }

    /// Apply a local context, producing a new active context.
    pub fn process(&self, local: &Value, remote: &RemoteContexts) -> Result<Self, ProcessorError> {
        self.process_at_depth(local, remote, 0)
    }

    fn process_at_depth(
        &self,
        local: &Value,
        remote: &RemoteContexts,
        depth: usize,
    ) -> Result<Self, ProcessorError> {
        if depth > MAX_CONTEXT_DEPTH {
            return Err(ProcessorError::InvalidContext(
                "recursive context inclusion".into(),
            ));
        }

        let contexts: Vec<&Value> = match local {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };

        let mut result = self.clone();
        for context in contexts {
            match context {
                Value::Null => {
                    result = Self {
                        base: self.original_base.clone(),
                        original_base: self.original_base.clone(),
                        ..Self::default()
                    };
                }
                Value::String(iri) => {
                    let resolved = resolve_reference(self.original_base.as_ref(), iri);
                    let document = remote.get(&resolved).ok_or_else(|| {
                        ProcessorError::LoadingDocumentFailed {
                            iri: resolved.clone(),
                            message: "remote context was not loaded".into(),
                        }
                    })?;
                    let inner = document.get("@context").ok_or_else(|| {
                        ProcessorError::InvalidContext(format!(
                            "remote context {resolved} has no @context"
                        ))
                    })?;
                    result = result.process_at_depth(inner, remote, depth + 1)?;
                }
                Value::Object(map) => result.apply_object(map)?,
                other => {
                    return Err(ProcessorError::InvalidContext(format!(
                        "a context must be an object, string or null, not {other}"
                    )))
                }
            }
        }
        Ok(result)
    }

    fn apply_object(&mut self, map: &Map<String, Value>) -> Result<(), ProcessorError> {
        if let Some(base) = map.get("@base") {
            self.base = match base {
                Value::Null => None,
                Value::String(b) => {
                    let joined = match &self.base {
                        Some(current) => current.join(b),
                        None => Url::parse(b),
                    };
                    Some(joined.map_err(|e| {
                        ProcessorError::InvalidContext(format!("invalid @base '{b}': {e}"))
                    })?)
                }
                _ => {
                    return Err(ProcessorError::InvalidContext(
                        "@base must be a string or null".into(),
                    ))
                }
            };
        }

        if let Some(vocab) = map.get("@vocab") {
            self.vocab = match vocab {
                Value::Null => None,
                Value::String(v) if is_absolute(v) => Some(v.clone()),
                _ => {
                    return Err(ProcessorError::InvalidContext(
                        "@vocab must be an absolute IRI or null".into(),
                    ))
                }
            };
        }

        if let Some(language) = map.get("@language") {
            self.language = match language {
                Value::Null => None,
                Value::String(l) => Some(l.to_lowercase()),
                _ => {
                    return Err(ProcessorError::InvalidContext(
                        "@language must be a string or null".into(),
                    ))
                }
            };
        }

        let mut defined = HashMap::new();
        for term in map.keys() {
            if matches!(term.as_str(), "@base" | "@vocab" | "@language") {
                continue;
            }
            self.define_term(map, term, &mut defined)?;
        }
        Ok(())
    }

    fn define_term(
        &mut self,
        local: &Map<String, Value>,
        term: &str,
        defined: &mut HashMap<String, bool>,
    ) -> Result<(), ProcessorError> {
        match defined.get(term) {
            Some(true) => return Ok(()),
            Some(false) => return Err(ProcessorError::CyclicIriMapping(term.to_string())),
            None => {}
        }
        if is_keyword(term) {
            return Err(ProcessorError::InvalidContext(format!(
                "keywords cannot be redefined: {term}"
            )));
        }

        defined.insert(term.to_string(), false);
        self.terms.remove(term);

        let value = local.get(term).unwrap_or(&Value::Null);
        let definition = match value {
            Value::Null => None,
            Value::String(iri) => {
                let iri = self.definition_iri(iri, local, defined)?;
                Some(TermDefinition::new(iri))
            }
            Value::Object(spec) => self.expanded_definition(term, spec, local, defined)?,
            _ => {
                return Err(ProcessorError::InvalidContext(format!(
                    "invalid definition for term '{term}'"
                )))
            }
        };

        if let Some(definition) = definition {
            if !is_keyword(&definition.iri) && !is_absolute(&definition.iri) {
                return Err(ProcessorError::InvalidContext(format!(
                    "term '{term}' does not map to an absolute IRI"
                )));
            }
            self.terms.insert(term.to_string(), definition);
        }
        defined.insert(term.to_string(), true);
        Ok(())
    }

    fn expanded_definition(
        &mut self,
        term: &str,
        spec: &Map<String, Value>,
        local: &Map<String, Value>,
        defined: &mut HashMap<String, bool>,
    ) -> Result<Option<TermDefinition>, ProcessorError> {
        let mut definition = if let Some(reverse) = spec.get("@reverse") {
            let iri = reverse.as_str().ok_or_else(|| {
                ProcessorError::InvalidContext(format!("@reverse of '{term}' must be a string"))
            })?;
            let mut definition = TermDefinition::new(self.definition_iri(iri, local, defined)?);
            definition.reverse = true;
            definition
        } else {
            match spec.get("@id") {
                Some(Value::Null) => return Ok(None),
                Some(Value::String(iri)) => {
                    TermDefinition::new(self.definition_iri(iri, local, defined)?)
                }
                Some(_) => {
                    return Err(ProcessorError::InvalidContext(format!(
                        "@id of '{term}' must be a string"
                    )))
                }
                None => TermDefinition::new(self.implicit_iri(term, local, defined)?),
            }
        };

        if let Some(type_mapping) = spec.get("@type") {
            let type_mapping = type_mapping.as_str().ok_or_else(|| {
                ProcessorError::InvalidContext(format!("@type of '{term}' must be a string"))
            })?;
            let expanded = self.definition_iri(type_mapping, local, defined)?;
            if expanded != "@id" && expanded != "@vocab" && !is_absolute(&expanded) {
                return Err(ProcessorError::InvalidContext(format!(
                    "invalid type mapping for '{term}': {type_mapping}"
                )));
            }
            definition.type_mapping = Some(expanded);
        }

        if let Some(container) = spec.get("@container") {
            match container.as_str() {
                Some(c @ ("@list" | "@set" | "@index" | "@language")) => {
                    definition.container = Some(c.to_string())
                }
                _ => {
                    return Err(ProcessorError::InvalidContext(format!(
                        "invalid container mapping for '{term}'"
                    )))
                }
            }
        }

        if let Some(language) = spec.get("@language") {
            definition.language = match language {
                Value::Null => Some(None),
                Value::String(l) => Some(Some(l.to_lowercase())),
                _ => {
                    return Err(ProcessorError::InvalidContext(format!(
                        "@language of '{term}' must be a string or null"
                    )))
                }
            };
        }

        Ok(Some(definition))
    }

    /// IRI for a term definition without `@id`.
    fn implicit_iri(
        &mut self,
        term: &str,
        local: &Map<String, Value>,
        defined: &mut HashMap<String, bool>,
    ) -> Result<String, ProcessorError> {
        if let Some((prefix, _)) = term.split_once(':') {
            if local.contains_key(prefix) {
                self.define_term(local, prefix, defined)?;
            }
            return Ok(self.expand_iri(term, false, false));
        }
        match &self.vocab {
            Some(vocab) => Ok(format!("{vocab}{term}")),
            None => Err(ProcessorError::InvalidContext(format!(
                "term '{term}' has no IRI mapping"
            ))),
        }
    }

    /// Expand an IRI inside a local context, defining dependencies first.
    fn definition_iri(
        &mut self,
        value: &str,
        local: &Map<String, Value>,
        defined: &mut HashMap<String, bool>,
    ) -> Result<String, ProcessorError> {
        if is_keyword(value) {
            return Ok(value.to_string());
        }
        if local.contains_key(value) {
            self.define_term(local, value, defined)?;
        }
        if let Some((prefix, suffix)) = value.split_once(':') {
            if prefix != "_" && !suffix.starts_with("//") && local.contains_key(prefix) {
                self.define_term(local, prefix, defined)?;
            }
        }
        Ok(self.expand_iri(value, false, true))
    }

    /// Expand a term, compact IRI or relative IRI.
    ///
    /// `vocab` allows term and `@vocab` lookup; `document_relative` resolves
    /// anything left against the base. Values that cannot be expanded are
    /// returned unchanged.
    pub fn expand_iri(&self, value: &str, document_relative: bool, vocab: bool) -> String {
        if is_keyword(value) {
            return value.to_string();
        }
        if vocab {
            if let Some(definition) = self.terms.get(value) {
                return definition.iri.clone();
            }
        }
        if let Some((prefix, suffix)) = value.split_once(':') {
            if prefix == "_" || suffix.starts_with("//") {
                return value.to_string();
            }
            if let Some(definition) = self.terms.get(prefix) {
                return format!("{}{}", definition.iri, suffix);
            }
            return value.to_string();
        }
        if vocab {
            if let Some(vocab) = &self.vocab {
                return format!("{vocab}{value}");
            }
        }
        if document_relative {
            return resolve_reference(self.base.as_ref(), value);
        }
        value.to_string()
    }

    /// Term (or alias) for a keyword.
    pub fn compact_keyword(&self, keyword: &str) -> String {
        self.terms
            .iter()
            .filter(|(_, d)| d.iri == keyword)
            .map(|(t, _)| t)
            .min_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)))
            .cloned()
            .unwrap_or_else(|| keyword.to_string())
    }

    /// Compact an IRI to a term, vocab-relative IRI, compact IRI or
    /// base-relative IRI.
    ///
    /// `value` is the expanded value the IRI is a property for; it steers
    /// term selection towards a matching type or language mapping.
    pub fn compact_iri(&self, iri: &str, value: Option<&Value>, vocab: bool) -> String {
        if is_keyword(iri) {
            return self.compact_keyword(iri);
        }

        if vocab {
            if let Some(term) = self.select_term(iri, value) {
                return term;
            }
            if let Some(vocab_iri) = &self.vocab {
                if let Some(suffix) = iri.strip_prefix(vocab_iri.as_str()) {
                    if !suffix.is_empty() && !self.terms.contains_key(suffix) {
                        return suffix.to_string();
                    }
                }
            }
        }

        let compact = self
            .terms
            .iter()
            .filter(|(term, d)| !term.contains(':') && !d.reverse && !d.iri.is_empty())
            .filter_map(|(term, d)| {
                let suffix = iri.strip_prefix(d.iri.as_str())?;
                if suffix.is_empty() {
                    return None;
                }
                let candidate = format!("{term}:{suffix}");
                if vocab && self.terms.contains_key(&candidate) {
                    return None;
                }
                Some(candidate)
            })
            .min_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        if let Some(compact) = compact {
            return compact;
        }

        if !vocab {
            if let Some(base) = &self.base {
                if let Some(relative) = iri.strip_prefix(base.as_str()) {
                    if !relative.is_empty() {
                        return relative.to_string();
                    }
                }
            }
        }

        iri.to_string()
    }

    /// Pick the best term whose IRI is `iri` for `value`.
    fn select_term(&self, iri: &str, value: Option<&Value>) -> Option<String> {
        self.terms
            .iter()
            .filter(|(_, d)| d.iri == iri && !d.reverse)
            .filter_map(|(term, d)| self.term_score(d, value).map(|score| (score, term)))
            .max_by(|(sa, ta), (sb, tb)| {
                sa.cmp(sb)
                    .then_with(|| tb.len().cmp(&ta.len()))
                    .then_with(|| tb.cmp(ta))
            })
            .map(|(_, term)| term.clone())
    }

    /// How well a term fits a value; `None` if it cannot hold it.
    fn term_score(&self, definition: &TermDefinition, value: Option<&Value>) -> Option<u8> {
        let plain = definition.type_mapping.is_none() && definition.language.is_none();
        let value = match value.and_then(Value::as_object) {
            Some(value) => value,
            None => return Some(u8::from(plain)),
        };

        let is_list = value.contains_key("@list");
        let list_container = definition.container.as_deref() == Some("@list");
        if is_list != list_container {
            return if is_list { Some(0) } else { None };
        }
        if is_list {
            return Some(2);
        }

        if value.contains_key("@value") {
            if let Some(datatype) = value.get("@type").and_then(Value::as_str) {
                return match definition.type_mapping.as_deref() {
                    Some(t) if t == datatype => Some(2),
                    None if definition.language.is_none() => Some(1),
                    _ => None,
                };
            }
            if let Some(language) = value.get("@language").and_then(Value::as_str) {
                return match &definition.language {
                    Some(Some(l)) if l == language => Some(2),
                    None if definition.type_mapping.is_none() => {
                        let preferred = self.language.as_deref() == Some(language);
                        Some(if preferred { 2 } else { 1 })
                    }
                    _ => None,
                };
            }
            return match (&definition.type_mapping, &definition.language) {
                (Some(_), _) => None,
                (None, Some(None)) => Some(2),
                (None, Some(Some(_))) => None,
                (None, None) => Some(1),
            };
        }

        match definition.type_mapping.as_deref() {
            Some("@id") | Some("@vocab") => Some(2),
            Some(_) => None,
            None if definition.language.is_none() => Some(1),
            None => None,
        }
    }
}

/// Resolve `value` against `base`; returns `value` unchanged without a base.
pub fn resolve_reference(base: Option<&Url>, value: &str) -> String {
    match base {
        Some(base) => base
            .join(value)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| value.to_string()),
        None => value.to_string(),
    }
}

/// Collect string `@context` references anywhere in `value`.
pub fn collect_context_references(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_context_references(item, out);
            }
        }
        Value::Object(map) => {
            if let Some(context) = map.get("@context") {
                collect_local_references(context, out);
            }
            for (key, item) in map {
                if key != "@context" {
                    collect_context_references(item, out);
                }
            }
        }
        _ => {}
    }
}

/// Collect string references in a context value itself.
pub fn collect_local_references(context: &Value, out: &mut Vec<String>) {
    match context {
        Value::String(iri) => out.push(iri.clone()),
        Value::Array(items) => {
            for item in items {
                if let Value::String(iri) = item {
                    out.push(iri.clone());
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const XSD_DATE: &str = "http://www.w3.org/2001/XMLSchema#date";

    fn context(local: Value) -> ActiveContext {
        ActiveContext::new(None)
            .unwrap()
            .process(&local, &RemoteContexts::new())
            .unwrap()
    }

    #[test]
    fn simple_terms_and_prefixes() {
        let ctx = context(json!({
            "schema": "http://schema.org/",
            "name": "schema:name",
            "knows": {"@id": "schema:knows", "@type": "@id"}
        }));
        assert_eq!(
            ctx.expand_iri("name", false, true),
            "http://schema.org/name"
        );
        assert_eq!(
            ctx.expand_iri("schema:url", false, true),
            "http://schema.org/url"
        );
        let knows = &ctx.terms["knows"];
        assert_eq!(knows.iri, "http://schema.org/knows");
        assert_eq!(knows.type_mapping.as_deref(), Some("@id"));
    }

    #[test]
    fn terms_defined_out_of_order() {
        let ctx = context(json!({
            "name": "ex:name",
            "ex": "http://example.org/"
        }));
        assert_eq!(ctx.terms["name"].iri, "http://example.org/name");
    }

    #[test]
    fn vocab_applies_to_unknown_terms() {
        let ctx = context(json!({"@vocab": "http://schema.org/"}));
        assert_eq!(
            ctx.expand_iri("Person", false, true),
            "http://schema.org/Person"
        );
        // not for @id values
        assert_eq!(ctx.expand_iri("Person", false, false), "Person");
    }

    #[test]
    fn cyclic_mapping_is_an_error() {
        let result = ActiveContext::new(None)
            .unwrap()
            .process(&json!({"a": "b:x", "b": "a:y"}), &RemoteContexts::new());
        assert!(matches!(result, Err(ProcessorError::CyclicIriMapping(_))));
    }

    #[test]
    fn keyword_redefinition_is_an_error() {
        let result = ActiveContext::new(None)
            .unwrap()
            .process(
                &json!({"@id": "http://example.org/id"}),
                &RemoteContexts::new(),
            );
        assert!(result.is_err());
    }

    #[test]
    fn null_context_resets() {
        let ctx = context(json!([{"name": "http://schema.org/name"}, null]));
        assert!(ctx.is_empty());
    }

    #[test]
    fn relative_iris_use_base() {
        let ctx = ActiveContext::new(Some("http://example.org/docs/index.html")).unwrap();
        assert_eq!(
            ctx.expand_iri("a.json", true, false),
            "http://example.org/docs/a.json"
        );
        assert_eq!(
            ctx.compact_iri("http://example.org/docs/index.html#me", None, false),
            "#me"
        );
    }

    #[test]
    fn remote_context_lookup() {
        let mut remote = RemoteContexts::new();
        remote.insert(
            "http://example.org/ctx.jsonld".into(),
            json!({"@context": {"name": "http://schema.org/name"}}),
        );
        let ctx = ActiveContext::new(None)
            .unwrap()
            .process(&json!("http://example.org/ctx.jsonld"), &remote)
            .unwrap();
        assert_eq!(ctx.terms["name"].iri, "http://schema.org/name");
    }

    #[test]
    fn missing_remote_context_is_load_error() {
        let result = ActiveContext::new(None)
            .unwrap()
            .process(&json!("http://example.org/missing"), &RemoteContexts::new());
        assert!(matches!(
            result,
            Err(ProcessorError::LoadingDocumentFailed { .. })
        ));
    }

    #[test]
    fn compact_iri_prefers_typed_term() {
        let ctx = context(json!({
            "ex": "http://example.org/",
            "date": {"@id": "http://example.org/date", "@type": XSD_DATE},
            "dateText": "http://example.org/date"
        }));
        let date = "http://example.org/date";
        let typed = json!({"@value": "2020-01-01", "@type": XSD_DATE});
        let plain = json!({"@value": "Jan 1"});
        assert_eq!(ctx.compact_iri(date, Some(&typed), true), "date");
        assert_eq!(ctx.compact_iri(date, Some(&plain), true), "dateText");
        let other = "http://example.org/other";
        assert_eq!(ctx.compact_iri(other, None, true), "ex:other");
    }

    #[test]
    fn compact_iri_uses_vocab_and_aliases() {
        let ctx = context(json!({"@vocab": "http://schema.org/", "id": "@id"}));
        let name = "http://schema.org/name";
        assert_eq!(ctx.compact_iri(name, None, true), "name");
        assert_eq!(ctx.compact_iri("@id", None, true), "id");
        assert_eq!(ctx.compact_iri("@type", None, true), "@type");
    }

    #[test]
    fn collects_nested_references() {
        let doc = json!({
            "@context": ["http://a.example/ctx", {"x": "http://x/"}],
            "child": {"@context": "http://b.example/ctx"}
        });
        let mut refs = Vec::new();
        collect_context_references(&doc, &mut refs);
        assert_eq!(refs, vec!["http://a.example/ctx", "http://b.example/ctx"]);
    }
}
