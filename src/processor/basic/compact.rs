//! processor::basic::compact
//!
//! Compaction: shorten an expanded document using an active context.

use serde_json::{Map, Value};

use super::context::{is_keyword, ActiveContext};

/// Compact a whole expanded document and attach `context`.
///
/// A top-level array of several nodes becomes `@graph`; with `graph` set
/// even a single node is wrapped.
pub fn compact_document(
    ctx: &ActiveContext,
    expanded: &Value,
    context: &Value,
    compact_arrays: bool,
    graph: bool,
) -> Value {
    let compacted = compact_element(ctx, None, expanded, compact_arrays);
    let mut document = match compacted {
        Value::Array(items) if items.is_empty() => Map::new(),
        Value::Array(items) => {
            let mut map = Map::new();
            map.insert(ctx.compact_keyword("@graph"), Value::Array(items));
            map
        }
        Value::Object(map) if graph => {
            let mut wrapped = Map::new();
            let graph = Value::Array(vec![Value::Object(map)]);
            wrapped.insert(ctx.compact_keyword("@graph"), graph);
            wrapped
        }
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert(ctx.compact_keyword("@graph"), Value::Array(vec![other]));
            map
        }
    };

    if !is_empty_context(context) {
        let mut with_context = Map::new();
        with_context.insert("@context".into(), context.clone());
        with_context.append(&mut document);
        document = with_context;
    }
    Value::Object(document)
}

fn is_empty_context(context: &Value) -> bool {
    match context {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Compact an expanded element.
///
/// Null property values are kept as JSON null; framing uses them for
/// missing properties without a default.
pub fn compact_element(
    ctx: &ActiveContext,
    active_property: Option<&str>,
    element: &Value,
    compact_arrays: bool,
) -> Value {
    match element {
        Value::Array(items) => {
            let mut out: Vec<Value> = items
                .iter()
                .map(|item| compact_element(ctx, active_property, item, compact_arrays))
                .filter(|item| !item.is_null())
                .collect();
            let container = active_property.and_then(|p| ctx.container(p));
            let keep_array = matches!(container, Some("@list" | "@set"));
            if compact_arrays && out.len() == 1 && !keep_array {
                out.pop().unwrap_or(Value::Null)
            } else {
                Value::Array(out)
            }
        }
        Value::Object(map) => compact_object(ctx, active_property, map, compact_arrays),
        scalar => scalar.clone(),
    }
}

fn compact_object(
    ctx: &ActiveContext,
    active_property: Option<&str>,
    map: &Map<String, Value>,
    compact_arrays: bool,
) -> Value {
    if map.contains_key("@value") || is_node_reference(map) {
        if let Some(compacted) = compact_value(ctx, active_property, map) {
            return compacted;
        }
    }

    if let Some(list) = map.get("@list") {
        if active_property.and_then(|p| ctx.container(p)) == Some("@list") {
            return compact_element(ctx, active_property, list, compact_arrays);
        }
    }

    let mut result = Map::new();
    for (key, value) in map {
        match key.as_str() {
            "@id" => {
                let id = value
                    .as_str()
                    .map(|id| Value::String(ctx.compact_iri(id, None, false)))
                    .unwrap_or_else(|| value.clone());
                result.insert(ctx.compact_keyword("@id"), id);
            }
            "@type" => {
                let compacted = match value {
                    Value::String(t) => Value::String(ctx.compact_iri(t, None, true)),
                    Value::Array(types) => {
                        let mut types: Vec<Value> = types
                            .iter()
                            .map(|t| match t {
                                Value::String(t) => Value::String(ctx.compact_iri(t, None, true)),
                                other => other.clone(),
                            })
                            .collect();
                        if compact_arrays && types.len() == 1 {
                            types.pop().unwrap_or(Value::Null)
                        } else {
                            Value::Array(types)
                        }
                    }
                    other => other.clone(),
                };
                result.insert(ctx.compact_keyword("@type"), compacted);
            }
            "@list" => {
                let items: Vec<Value> = value
                    .as_array()
                    .map(|items| {
                        items
                            .iter()
                            .map(|item| compact_element(ctx, active_property, item, compact_arrays))
                            .collect()
                    })
                    .unwrap_or_default();
                result.insert(ctx.compact_keyword("@list"), Value::Array(items));
            }
            "@graph" => {
                let graph = match compact_element(ctx, Some("@graph"), value, compact_arrays) {
                    Value::Array(items) => items,
                    other => vec![other],
                };
                result.insert(ctx.compact_keyword("@graph"), Value::Array(graph));
            }
            "@value" | "@language" | "@index" => {
                result.insert(ctx.compact_keyword(key), value.clone());
            }
            k if is_keyword(k) => {}
            property => compact_property(ctx, property, value, compact_arrays, &mut result),
        }
    }
    Value::Object(result)
}

fn compact_property(
    ctx: &ActiveContext,
    property: &str,
    value: &Value,
    compact_arrays: bool,
    result: &mut Map<String, Value>,
) {
    let items = match value {
        Value::Array(items) => items,
        Value::Null => {
            result.insert(ctx.compact_iri(property, None, true), Value::Null);
            return;
        }
        other => {
            let term = ctx.compact_iri(property, Some(other), true);
            let compacted = compact_element(ctx, Some(&term), other, compact_arrays);
            add_value(result, &term, compacted, true);
            return;
        }
    };

    if items.is_empty() {
        let term = ctx.compact_iri(property, None, true);
        result
            .entry(term)
            .or_insert_with(|| Value::Array(Vec::new()));
        return;
    }

    for item in items {
        let term = ctx.compact_iri(property, Some(item), true);
        let container = ctx.container(&term);
        let compacted = compact_element(ctx, Some(&term), item, compact_arrays);

        match container {
            Some("@list") if item.get("@list").is_some() => {
                result.insert(term, compacted);
            }
            Some("@language") => {
                if let (Some(language), Some(text)) = (
                    item.get("@language").and_then(Value::as_str),
                    item.get("@value"),
                ) {
                    let entry = result
                        .entry(term)
                        .or_insert_with(|| Value::Object(Map::new()));
                    if let Value::Object(languages) = entry {
                        add_value(languages, language, text.clone(), false);
                    }
                } else {
                    add_value(result, &term, compacted, false);
                }
            }
            Some("@set" | "@list") => add_value(result, &term, compacted, true),
            _ => add_value(result, &term, compacted, !compact_arrays),
        }
    }
}

/// Add `value` under `key`, turning an existing single value into an array.
fn add_value(map: &mut Map<String, Value>, key: &str, value: Value, as_array: bool) {
    match map.get_mut(key) {
        Some(Value::Array(existing)) => existing.push(value),
        Some(existing) => {
            let previous = existing.take();
            *existing = Value::Array(vec![previous, value]);
        }
        None if as_array => {
            map.insert(key.to_string(), Value::Array(vec![value]));
        }
        None => {
            map.insert(key.to_string(), value);
        }
    }
}

fn is_node_reference(map: &Map<String, Value>) -> bool {
    map.contains_key("@id") && map.keys().all(|k| k == "@id" || k == "@index")
}

/// Reduce a value object or node reference to a scalar when the term's
/// mappings make the full form redundant.
fn compact_value(
    ctx: &ActiveContext,
    active_property: Option<&str>,
    map: &Map<String, Value>,
) -> Option<Value> {
    let definition = active_property.and_then(|p| ctx.terms.get(p));
    let type_mapping = definition.and_then(|d| d.type_mapping.as_deref());

    if let Some(id) = map.get("@id").and_then(Value::as_str) {
        if map.contains_key("@index") {
            return None;
        }
        return match type_mapping {
            Some("@id") => Some(Value::String(ctx.compact_iri(id, None, false))),
            Some("@vocab") => Some(Value::String(ctx.compact_iri(id, None, true))),
            _ => None,
        };
    }

    if map.contains_key("@index") {
        return None;
    }
    let value = map.get("@value")?;

    if let Some(datatype) = map.get("@type").and_then(Value::as_str) {
        return (type_mapping == Some(datatype)).then(|| value.clone());
    }
    if let Some(language) = map.get("@language").and_then(Value::as_str) {
        let container = definition.and_then(|d| d.container.as_deref());
        let matches = ctx.effective_language(active_property) == Some(language);
        return (matches && container != Some("@language")).then(|| value.clone());
    }
    if type_mapping.is_some() {
        return None;
    }
    if value.is_string() && ctx.effective_language(active_property).is_some() {
        return None;
    }
    Some(value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::basic::context::RemoteContexts;
    use serde_json::json;

    fn context(local: Value) -> ActiveContext {
        ActiveContext::new(None)
            .unwrap()
            .process(&local, &RemoteContexts::new())
            .unwrap()
    }

    #[test]
    fn compacts_terms_and_values() {
        let ctx = context(json!({
            "name": "http://schema.org/name",
            "knows": {"@id": "http://schema.org/knows", "@type": "@id"}
        }));
        let expanded = json!([{
            "@id": "http://example.org/jane",
            "http://schema.org/name": [{"@value": "Jane"}],
            "http://schema.org/knows": [{"@id": "http://example.org/john"}]
        }]);
        assert_eq!(
            compact_element(&ctx, None, &expanded, true),
            json!({
                "@id": "http://example.org/jane",
                "name": "Jane",
                "knows": "http://example.org/john"
            })
        );
    }

    #[test]
    fn compact_arrays_off_keeps_arrays() {
        let ctx = context(json!({"name": "http://schema.org/name"}));
        let expanded = json!([{
            "@id": "http://example.org/jane",
            "http://schema.org/name": [{"@value": "Jane"}]
        }]);
        assert_eq!(
            compact_element(&ctx, None, &expanded, false),
            json!([{"@id": "http://example.org/jane", "name": ["Jane"]}])
        );
    }

    #[test]
    fn multiple_values_become_arrays() {
        let ctx = context(json!({"name": "http://schema.org/name"}));
        let expanded = json!({
            "http://schema.org/name": [{"@value": "Jane"}, {"@value": "J."}]
        });
        assert_eq!(
            compact_element(&ctx, None, &expanded, true),
            json!({"name": ["Jane", "J."]})
        );
    }

    #[test]
    fn node_reference_without_id_coercion_stays_object() {
        let ctx = context(json!({"knows": "http://schema.org/knows"}));
        let expanded = json!({"http://schema.org/knows": [{"@id": "http://example.org/john"}]});
        assert_eq!(
            compact_element(&ctx, None, &expanded, true),
            json!({"knows": {"@id": "http://example.org/john"}})
        );
    }

    #[test]
    fn list_container() {
        let ctx = context(json!({
            "steps": {"@id": "http://example.org/steps", "@container": "@list"}
        }));
        let expanded = json!({
            "http://example.org/steps": [{"@list": [{"@value": "a"}, {"@value": "b"}]}]
        });
        assert_eq!(
            compact_element(&ctx, None, &expanded, true),
            json!({"steps": ["a", "b"]})
        );
    }

    #[test]
    fn language_values() {
        let ctx = context(json!({
            "@language": "en",
            "name": "http://schema.org/name"
        }));
        let expanded = json!({
            "http://schema.org/name": [
                {"@value": "Jane", "@language": "en"},
                {"@value": "Johanna", "@language": "de"}
            ]
        });
        assert_eq!(
            compact_element(&ctx, None, &expanded, true),
            json!({"name": ["Jane", {"@value": "Johanna", "@language": "de"}]})
        );
    }

    #[test]
    fn document_with_several_nodes_gets_graph() {
        let local = json!({"name": "http://schema.org/name"});
        let ctx = context(local.clone());
        let expanded = json!([
            {"@id": "http://example.org/a", "http://schema.org/name": [{"@value": "A"}]},
            {"@id": "http://example.org/b", "http://schema.org/name": [{"@value": "B"}]}
        ]);
        let doc = compact_document(&ctx, &expanded, &local, true, false);
        assert_eq!(
            doc,
            json!({
                "@context": {"name": "http://schema.org/name"},
                "@graph": [
                    {"@id": "http://example.org/a", "name": "A"},
                    {"@id": "http://example.org/b", "name": "B"}
                ]
            })
        );
        assert_eq!(doc.as_object().unwrap().keys().next().unwrap(), "@context");
    }

    #[test]
    fn graph_flag_wraps_single_node() {
        let ctx = context(json!({}));
        let expanded = json!([{
            "@id": "http://example.org/a",
            "http://example.org/p": [{"@value": 1}]
        }]);
        let doc = compact_document(&ctx, &expanded, &json!({}), true, true);
        assert_eq!(
            doc,
            json!({"@graph": [{"@id": "http://example.org/a", "http://example.org/p": 1}]})
        );
    }

    #[test]
    fn empty_document_compacts_to_context_only() {
        let local = json!({"name": "http://schema.org/name"});
        let ctx = context(local.clone());
        let doc = compact_document(&ctx, &json!([]), &local, true, false);
        assert_eq!(doc, json!({"@context": {"name": "http://schema.org/name"}}));
    }

    #[test]
    fn null_property_values_survive() {
        let ctx = context(json!({"name": "http://schema.org/name"}));
        let expanded = json!({"@id": "http://example.org/a", "http://schema.org/name": null});
        assert_eq!(
            compact_element(&ctx, None, &expanded, true),
            json!({"@id": "http://example.org/a", "name": null})
        );
    }
}
