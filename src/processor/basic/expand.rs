//! processor::basic::expand
//!
//! Expansion: rewrite a document so every property is a full IRI, every
//! value is an array, and every literal is a value object.

use std::borrow::Cow;

use serde_json::{Map, Value};

use super::context::{is_absolute, is_keyword, ActiveContext, RemoteContexts};
use crate::processor::ProcessorError;

/// Knobs for one expansion run.
#[derive(Debug, Clone, Copy)]
pub struct ExpansionFlags {
    /// Keep top-level nodes that only carry `@id`.
    pub keep_free_floating_nodes: bool,
    /// Keep framing keywords (`@embed`, `@explicit`, ...) and empty objects.
    pub frame: bool,
    /// Drop properties that do not expand to absolute IRIs.
    pub strict: bool,
}

impl Default for ExpansionFlags {
    fn default() -> Self {
        Self {
            keep_free_floating_nodes: false,
            frame: false,
            strict: true,
        }
    }
}

const FRAMING_KEYWORDS: &[&str] = &["@default", "@embed", "@explicit", "@omitDefault"];

/// Expand a document. The result is always an array.
pub fn expand(
    document: &Value,
    ctx: &ActiveContext,
    remote: &RemoteContexts,
    flags: ExpansionFlags,
) -> Result<Value, ProcessorError> {
    let expander = Expander { remote, flags };
    let mut expanded = expander.element(ctx, None, document)?;

    if let Value::Object(map) = &mut expanded {
        if map.len() == 1 {
            if let Some(graph) = map.remove("@graph") {
                expanded = graph;
            }
        }
    }

    Ok(match expanded {
        Value::Null => Value::Array(Vec::new()),
        Value::Array(items) => Value::Array(items),
        other => Value::Array(vec![other]),
    })
}

struct Expander<'a> {
    remote: &'a RemoteContexts,
    flags: ExpansionFlags,
}

impl Expander<'_> {
    fn element(
        &self,
        ctx: &ActiveContext,
        active_property: Option<&str>,
        element: &Value,
    ) -> Result<Value, ProcessorError> {
        match element {
            Value::Null => Ok(Value::Null),
            Value::Array(items) => {
                let list_container =
                    active_property.and_then(|p| ctx.container(p)) == Some("@list");
                let mut out = Vec::new();
                for item in items {
                    let expanded = self.element(ctx, active_property, item)?;
                    if list_container && (expanded.is_array() || is_list(&expanded)) {
                        return Err(ProcessorError::InvalidDocument("lists of lists".into()));
                    }
                    match expanded {
                        Value::Array(nested) => out.extend(nested),
                        Value::Null => {}
                        other => out.push(other),
                    }
                }
                Ok(Value::Array(out))
            }
            Value::Object(map) => self.object(ctx, active_property, map),
            scalar => match active_property {
                None | Some("@graph") => Ok(Value::Null),
                Some(property) => Ok(expand_value(ctx, property, scalar)),
            },
        }
    }

    fn object(
        &self,
        ctx: &ActiveContext,
        active_property: Option<&str>,
        map: &Map<String, Value>,
    ) -> Result<Value, ProcessorError> {
        let ctx = match map.get("@context") {
            Some(local) => Cow::Owned(ctx.process(local, self.remote)?),
            None => Cow::Borrowed(ctx),
        };
        let ctx = ctx.as_ref();

        let mut keys: Vec<&String> = map.keys().collect();
        keys.sort();

        let mut result = Map::new();
        for key in keys {
            if key == "@context" {
                continue;
            }
            let value = &map[key.as_str()];
            let property = ctx.expand_iri(key, false, true);

            if is_keyword(&property) {
                if let Some(expanded) = self.keyword(ctx, active_property, &property, value)? {
                    if result.contains_key(&property) {
                        return Err(ProcessorError::InvalidDocument(format!(
                            "colliding keywords: {property}"
                        )));
                    }
                    result.insert(property, expanded);
                }
                continue;
            }

            if !is_absolute(&property) && self.flags.strict {
                continue;
            }

            let definition = ctx.terms.get(key.as_str());
            if definition.is_some_and(|d| d.reverse) {
                return Err(ProcessorError::Unsupported("reverse properties".into()));
            }
            let container = definition.and_then(|d| d.container.as_deref());

            let mut expanded = match (container, value) {
                (Some("@language"), Value::Object(languages)) => language_map(languages)?,
                (Some("@index"), Value::Object(indexes)) => self.index_map(ctx, key, indexes)?,
                _ => self.element(ctx, Some(key), value)?,
            };
            if expanded.is_null() {
                continue;
            }
            if container == Some("@list") && !is_list(&expanded) {
                let mut list = Map::new();
                list.insert("@list".into(), into_array(expanded));
                expanded = Value::Object(list);
            }

            match result.get_mut(&property) {
                Some(Value::Array(existing)) => existing.extend(into_vec(expanded)),
                _ => {
                    result.insert(property, into_array(expanded));
                }
            }
        }

        self.finish_object(active_property, result)
    }

    /// Expand the value of a keyword key; `None` drops the key.
    fn keyword(
        &self,
        ctx: &ActiveContext,
        active_property: Option<&str>,
        keyword: &str,
        value: &Value,
    ) -> Result<Option<Value>, ProcessorError> {
        let expanded = match keyword {
            "@id" => match value {
                Value::String(id) => Value::String(ctx.expand_iri(id, true, false)),
                other if self.flags.frame => other.clone(),
                _ => {
                    return Err(ProcessorError::InvalidDocument(
                        "@id value must be a string".into(),
                    ))
                }
            },
            "@type" => match value {
                Value::String(t) => Value::String(ctx.expand_iri(t, true, true)),
                Value::Array(types) => {
                    let mut out = Vec::with_capacity(types.len());
                    for t in types {
                        match t {
                            Value::String(t) => {
                                let iri = ctx.expand_iri(t, true, true);
                                out.push(Value::String(iri));
                            }
                            other if self.flags.frame => out.push(other.clone()),
                            _ => {
                                return Err(ProcessorError::InvalidDocument(
                                    "@type values must be strings".into(),
                                ))
                            }
                        }
                    }
                    Value::Array(out)
                }
                Value::Object(_) if self.flags.frame => Value::Array(vec![value.clone()]),
                _ => {
                    return Err(ProcessorError::InvalidDocument(
                        "@type value must be a string or array of strings".into(),
                    ))
                }
            },
            "@graph" => into_array(self.element(ctx, Some("@graph"), value)?),
            "@value" => match value {
                Value::Array(_) | Value::Object(_) if !self.flags.frame => {
                    return Err(ProcessorError::InvalidDocument(
                        "@value must be a scalar or null".into(),
                    ))
                }
                other => other.clone(),
            },
            "@language" => match value {
                Value::String(l) => Value::String(l.to_lowercase()),
                _ => {
                    return Err(ProcessorError::InvalidDocument(
                        "@language must be a string".into(),
                    ))
                }
            },
            "@index" => match value {
                Value::String(_) => value.clone(),
                _ => {
                    return Err(ProcessorError::InvalidDocument(
                        "@index must be a string".into(),
                    ))
                }
            },
            "@list" => {
                if matches!(active_property, None | Some("@graph")) {
                    return Ok(None);
                }
                let items = into_array(self.element(ctx, active_property, value)?);
                if items.as_array().is_some_and(|a| a.iter().any(is_list)) {
                    return Err(ProcessorError::InvalidDocument("lists of lists".into()));
                }
                items
            }
            "@set" => self.element(ctx, active_property, value)?,
            "@reverse" => return Err(ProcessorError::Unsupported("@reverse".into())),
            k if FRAMING_KEYWORDS.contains(&k) && self.flags.frame => value.clone(),
            _ => return Ok(None),
        };

        if expanded.is_null() && keyword != "@value" {
            return Ok(None);
        }
        Ok(Some(expanded))
    }

    fn index_map(
        &self,
        ctx: &ActiveContext,
        property: &str,
        indexes: &Map<String, Value>,
    ) -> Result<Value, ProcessorError> {
        let mut keys: Vec<&String> = indexes.keys().collect();
        keys.sort();

        let mut out = Vec::new();
        for index in keys {
            let expanded = into_array(self.element(ctx, Some(property), &indexes[index.as_str()])?);
            for mut item in into_vec(expanded) {
                if let Value::Object(obj) = &mut item {
                    obj.entry("@index")
                        .or_insert_with(|| Value::String(index.clone()));
                }
                out.push(item);
            }
        }
        Ok(Value::Array(out))
    }

    fn finish_object(
        &self,
        active_property: Option<&str>,
        mut result: Map<String, Value>,
    ) -> Result<Value, ProcessorError> {
        if result.contains_key("@value") {
            if result
                .keys()
                .any(|k| !matches!(k.as_str(), "@value" | "@language" | "@type" | "@index"))
            {
                return Err(ProcessorError::InvalidDocument(
                    "value objects may only contain @value, @language, @type and @index".into(),
                ));
            }
            if result.contains_key("@language") && result.contains_key("@type") {
                return Err(ProcessorError::InvalidDocument(
                    "a value cannot have both @language and @type".into(),
                ));
            }
            match &result["@value"] {
                Value::Null => return Ok(Value::Null),
                Value::String(_) => {}
                _ if result.contains_key("@language") => {
                    return Err(ProcessorError::InvalidDocument(
                        "only strings can be language-tagged".into(),
                    ))
                }
                _ => {}
            }
            if result.get("@type").is_some_and(|t| !t.is_string()) {
                return Err(ProcessorError::InvalidDocument(
                    "a typed value must have a single IRI @type".into(),
                ));
            }
        } else if let Some(types) = result.get_mut("@type") {
            if !types.is_array() {
                *types = Value::Array(vec![types.take()]);
            }
        } else if result.contains_key("@set") || result.contains_key("@list") {
            let extra = |k: &String| !matches!(k.as_str(), "@set" | "@list" | "@index");
            if result.keys().any(extra) {
                return Err(ProcessorError::InvalidDocument(
                    "@set and @list objects may only contain @index".into(),
                ));
            }
            if let Some(set) = result.remove("@set") {
                return Ok(set);
            }
        }

        if result.len() == 1 && result.contains_key("@language") {
            return Ok(Value::Null);
        }

        if matches!(active_property, None | Some("@graph")) && !self.flags.frame {
            let only_id = result.len() == 1 && result.contains_key("@id");
            if result.is_empty()
                || result.contains_key("@value")
                || result.contains_key("@list")
                || (only_id && !self.flags.keep_free_floating_nodes)
            {
                return Ok(Value::Null);
            }
        }

        Ok(Value::Object(result))
    }
}

/// Expand a scalar under `property` using its term definition.
fn expand_value(ctx: &ActiveContext, property: &str, value: &Value) -> Value {
    let definition = ctx.terms.get(property);
    let type_mapping = definition.and_then(|d| d.type_mapping.as_deref());

    let mut out = Map::new();
    match (type_mapping, value) {
        (Some("@id"), Value::String(id)) => {
            out.insert("@id".into(), Value::String(ctx.expand_iri(id, true, false)));
        }
        (Some("@vocab"), Value::String(id)) => {
            out.insert("@id".into(), Value::String(ctx.expand_iri(id, true, true)));
        }
        (Some(datatype), _) if datatype != "@id" && datatype != "@vocab" => {
            out.insert("@value".into(), value.clone());
            out.insert("@type".into(), Value::String(datatype.to_string()));
        }
        _ => {
            out.insert("@value".into(), value.clone());
            if value.is_string() {
                if let Some(language) = ctx.effective_language(Some(property)) {
                    out.insert("@language".into(), Value::String(language.to_string()));
                }
            }
        }
    }
    Value::Object(out)
}

fn language_map(languages: &Map<String, Value>) -> Result<Value, ProcessorError> {
    let mut keys: Vec<&String> = languages.keys().collect();
    keys.sort();

    let mut out = Vec::new();
    for language in keys {
        let values = match &languages[language.as_str()] {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };
        for value in values {
            let text = value.as_str().ok_or_else(|| {
                ProcessorError::InvalidDocument("language map values must be strings".into())
            })?;
            let mut entry = Map::new();
            entry.insert("@value".into(), Value::String(text.to_string()));
            entry.insert("@language".into(), Value::String(language.to_lowercase()));
            out.push(Value::Object(entry));
        }
    }
    Ok(Value::Array(out))
}

/// Whether `value` is a list object.
pub fn is_list(value: &Value) -> bool {
    value.as_object().is_some_and(|o| o.contains_key("@list"))
}

fn into_array(value: Value) -> Value {
    Value::Array(into_vec(value))
}

/// Items of an array, or the value itself as a single item.
pub fn into_vec(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => vec![other],
    }
}
