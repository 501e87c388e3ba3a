//! processor::basic::frame
//!
//! Framing: select nodes of a document by example and embed the nodes
//! they reference, producing a tree shaped like the frame.
//!
//! # Matching
//!
//! A frame object matches a node when:
//!
//! - its `@id` names the node, or
//! - its `@type` shares a type with the node (`[{}]` matches any typed
//!   node), or
//! - without either, the node has every property the frame names
//!
//! A frame with no properties at all matches every node.
//!
//! # Embedding
//!
//! Matched nodes are embedded recursively. A node already on the current
//! embedding path is emitted as a reference, which breaks cycles.

use serde_json::{Map, Value};

use super::context::is_keyword;
use super::expand::is_list;
use super::node_map::Graph;
use crate::processor::ProcessorError;

/// Embedding behaviour, overridable per frame object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameFlags {
    pub embed: bool,
    pub explicit: bool,
    pub omit_default: bool,
}

impl Default for FrameFlags {
    fn default() -> Self {
        Self {
            embed: true,
            explicit: false,
            omit_default: false,
        }
    }
}

impl FrameFlags {
    fn overridden_by(self, frame: &Map<String, Value>) -> Self {
        Self {
            embed: frame_flag(frame, "@embed").unwrap_or(self.embed),
            explicit: frame_flag(frame, "@explicit").unwrap_or(self.explicit),
            omit_default: frame_flag(frame, "@omitDefault").unwrap_or(self.omit_default),
        }
    }
}

fn frame_flag(frame: &Map<String, Value>, key: &str) -> Option<bool> {
    let value = match frame.get(key)? {
        Value::Array(items) => items.first()?,
        other => other,
    };
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.as_str() {
            "@never" | "false" => Some(false),
            "@always" | "@last" | "@once" | "true" => Some(true),
            _ => None,
        },
        _ => None,
    }
}

/// Pick the frame object out of an expanded frame.
pub fn frame_object(expanded_frame: &Value) -> Result<Map<String, Value>, ProcessorError> {
    let first = match expanded_frame {
        Value::Array(items) if items.len() > 1 => {
            return Err(ProcessorError::InvalidFrame(
                "a frame must be a single object".into(),
            ))
        }
        Value::Array(items) => items.first(),
        other => Some(other),
    };
    match first {
        None => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(_) => Err(ProcessorError::InvalidFrame(
            "a frame must be a JSON object".into(),
        )),
    }
}

/// Frame the nodes of `graph` with `frame`.
///
/// The result is expanded; missing properties without a default come out
/// as JSON null.
pub fn frame(graph: &Graph, frame: &Map<String, Value>, flags: FrameFlags) -> Vec<Value> {
    let framer = Framer { graph };
    let mut path = Vec::new();
    graph
        .keys()
        .filter(|id| framer.matches(frame, &graph[id.as_str()]))
        .map(|id| framer.frame_node(id, frame, flags, &mut path))
        .collect()
}

struct Framer<'a> {
    graph: &'a Graph,
}

impl Framer<'_> {
    fn matches(&self, frame: &Map<String, Value>, node: &Map<String, Value>) -> bool {
        if let Some(ids) = frame.get("@id") {
            let node_id = node.get("@id").and_then(Value::as_str);
            let named = match ids {
                Value::String(id) => node_id == Some(id.as_str()),
                Value::Array(ids) => ids.iter().any(|id| match id {
                    Value::String(id) => node_id == Some(id.as_str()),
                    Value::Object(wildcard) => wildcard.is_empty(),
                    _ => false,
                }),
                Value::Object(wildcard) => wildcard.is_empty(),
                _ => false,
            };
            if !named {
                return false;
            }
            if !frame.contains_key("@type") {
                return true;
            }
        }

        if let Some(types) = frame.get("@type").and_then(Value::as_array) {
            let node_types = node
                .get("@type")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            if types.len() == 1 && types[0].as_object().is_some_and(Map::is_empty) {
                return !node_types.is_empty();
            }
            if types.is_empty() {
                return node_types.is_empty();
            }
            return types.iter().any(|t| node_types.contains(t));
        }

        frame
            .keys()
            .filter(|k| !is_keyword(k))
            .all(|k| node.contains_key(k))
    }

    fn frame_node(
        &self,
        id: &str,
        frame: &Map<String, Value>,
        inherited: FrameFlags,
        path: &mut Vec<String>,
    ) -> Value {
        let flags = inherited.overridden_by(frame);
        let Some(node) = self.graph.get(id) else {
            return reference(id);
        };
        if !flags.embed || path.iter().any(|p| p == id) {
            return reference(id);
        }
        path.push(id.to_string());

        let mut output = Map::new();
        output.insert("@id".into(), Value::String(id.to_string()));

        for (property, values) in node {
            match property.as_str() {
                "@id" => {}
                "@type" | "@index" => {
                    output.insert(property.clone(), values.clone());
                }
                k if is_keyword(k) => {}
                _ if flags.explicit && !frame.contains_key(property) => {}
                _ => {
                    let subframe = subframe(frame.get(property));
                    let items = values.as_array().map(Vec::as_slice).unwrap_or_default();
                    let mut framed = Vec::new();
                    for item in items {
                        if is_list(item) {
                            let list = item["@list"]
                                .as_array()
                                .map(Vec::as_slice)
                                .unwrap_or_default();
                            let list: Vec<Value> = list
                                .iter()
                                .filter_map(|i| self.frame_value(i, subframe.as_ref(), flags, path))
                                .collect();
                            let mut wrapped = Map::new();
                            wrapped.insert("@list".into(), Value::Array(list));
                            framed.push(Value::Object(wrapped));
                        } else if let Some(value) =
                            self.frame_value(item, subframe.as_ref(), flags, path)
                        {
                            framed.push(value);
                        }
                    }
                    if !framed.is_empty() || items.is_empty() {
                        output.insert(property.clone(), Value::Array(framed));
                    }
                }
            }
        }

        if !flags.omit_default {
            for (property, value) in frame {
                if is_keyword(property) || output.contains_key(property) {
                    continue;
                }
                let local_omit = subframe(Some(value))
                    .and_then(|sub| frame_flag(&sub, "@omitDefault"))
                    .unwrap_or(false);
                if !local_omit {
                    output.insert(property.clone(), default_value(value));
                }
            }
        }

        path.pop();
        Value::Object(output)
    }

    /// Frame one property value; `None` drops it.
    fn frame_value(
        &self,
        item: &Value,
        subframe: Option<&Map<String, Value>>,
        flags: FrameFlags,
        path: &mut Vec<String>,
    ) -> Option<Value> {
        let Some(id) = item
            .as_object()
            .filter(|o| !o.contains_key("@value"))
            .and_then(|o| o.get("@id"))
            .and_then(Value::as_str)
        else {
            return Some(item.clone());
        };

        let Some(node) = self.graph.get(id) else {
            return Some(item.clone());
        };
        let empty = Map::new();
        let subframe = match subframe {
            Some(sub) if !self.matches(sub, node) => return None,
            Some(sub) => sub,
            None => &empty,
        };
        Some(self.frame_node(id, subframe, flags, path))
    }
}

fn reference(id: &str) -> Value {
    let mut map = Map::new();
    map.insert("@id".into(), Value::String(id.to_string()));
    Value::Object(map)
}

/// The frame object for a property, if the frame gives one.
fn subframe(value: Option<&Value>) -> Option<Map<String, Value>> {
    let first = match value? {
        Value::Array(items) => items.first()?,
        other => other,
    };
    first
        .as_object()
        .filter(|o| !o.contains_key("@value"))
        .cloned()
}

/// Value used for a frame property the node lacks.
fn default_value(frame_value: &Value) -> Value {
    let default = subframe(Some(frame_value)).and_then(|sub| sub.get("@default").cloned());
    let default = match default {
        Some(Value::Array(mut items)) if items.len() == 1 => items.pop(),
        other => other,
    };
    match default {
        None | Some(Value::Null) => Value::Null,
        Some(Value::String(s)) if s == "@null" => Value::Null,
        Some(object @ Value::Object(_)) => Value::Array(vec![object]),
        Some(Value::Array(items)) => Value::Array(items),
        Some(scalar) => {
            let mut value = Map::new();
            value.insert("@value".into(), scalar);
            Value::Array(vec![Value::Object(value)])
        }
    }
}
