//! processor::basic::node_map
//!
//! Node map generation: collect every node of an expanded document into
//! a map keyed by graph name and node identifier. Flattening, framing and
//! RDF conversion all start from here.

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};

use super::context::is_blank;

/// Name of the default graph in a [`NodeMap`].
pub const DEFAULT_GRAPH: &str = "@default";

/// Nodes of one graph keyed by identifier.
pub type Graph = BTreeMap<String, Map<String, Value>>;

/// Issues fresh blank node identifiers, remembering relabelled ones.
#[derive(Debug, Clone)]
pub struct BlankNodeIssuer {
    prefix: String,
    counter: usize,
    issued: HashMap<String, String>,
}

impl BlankNodeIssuer {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: 0,
            issued: HashMap::new(),
        }
    }

    /// Issue an identifier for `existing`, or a fresh one for `None`.
    ///
    /// The same existing label always maps to the same new label.
    pub fn issue(&mut self, existing: Option<&str>) -> String {
        if let Some(label) = existing.and_then(|e| self.issued.get(e)) {
            return label.clone();
        }
        let label = format!("{}{}", self.prefix, self.counter);
        self.counter += 1;
        if let Some(existing) = existing {
            self.issued.insert(existing.to_string(), label.clone());
        }
        label
    }

    /// Labels issued so far, in issue order.
    pub fn issued_in_order(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .issued
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        pairs.sort_by_key(|(_, v)| {
            v.strip_prefix(self.prefix.as_str())
                .and_then(|n| n.parse::<usize>().ok())
                .unwrap_or(usize::MAX)
        });
        pairs
    }
}

/// All nodes of a document, per graph.
#[derive(Debug, Clone)]
pub struct NodeMap {
    pub graphs: BTreeMap<String, Graph>,
    issuer: BlankNodeIssuer,
}

impl Default for NodeMap {
    fn default() -> Self {
        let mut graphs = BTreeMap::new();
        graphs.insert(DEFAULT_GRAPH.to_string(), Graph::new());
        Self {
            graphs,
            issuer: BlankNodeIssuer::new("_:b"),
        }
    }
}

/// Where a value being visited ends up.
enum Target<'a> {
    /// Top of a graph; nothing refers to the node
    None,
    /// A property of a subject node
    Property { subject: &'a str, property: &'a str },
    /// An item of a list being built
    List(&'a mut Vec<Value>),
}

impl NodeMap {
    /// Build the node map of an expanded document.
    pub fn from_expanded(expanded: &Value) -> Self {
        let mut map = Self::default();
        map.generate(expanded, DEFAULT_GRAPH, Target::None);
        map
    }

    /// Nodes of the default graph.
    pub fn default_graph(&self) -> &Graph {
        &self.graphs[DEFAULT_GRAPH]
    }

    /// A blank node label no node in the map uses.
    pub fn fresh_blank(&mut self) -> String {
        self.issuer.issue(None)
    }

    fn node_mut(&mut self, graph: &str, id: &str) -> &mut Map<String, Value> {
        self.graphs
            .entry(graph.to_string())
            .or_default()
            .entry(id.to_string())
            .or_insert_with(|| {
                let mut node = Map::new();
                node.insert("@id".into(), Value::String(id.to_string()));
                node
            })
    }

    fn relabel(&mut self, id: &str) -> String {
        if is_blank(id) {
            self.issuer.issue(Some(id))
        } else {
            id.to_string()
        }
    }

    fn attach(&mut self, graph: &str, target: Target<'_>, value: Value, unique: bool) {
        match target {
            Target::None => {}
            Target::List(list) => list.push(value),
            Target::Property { subject, property } => {
                let node = self.node_mut(graph, subject);
                if unique {
                    append_unique(node, property, value);
                } else {
                    append(node, property, value);
                }
            }
        }
    }

    fn generate(&mut self, element: &Value, graph: &str, target: Target<'_>) {
        match element {
            Value::Array(items) => match target {
                Target::List(list) => {
                    for item in items {
                        self.generate(item, graph, Target::List(&mut *list));
                    }
                }
                Target::None => {
                    for item in items {
                        self.generate(item, graph, Target::None);
                    }
                }
                Target::Property { subject, property } => {
                    for item in items {
                        self.generate(item, graph, Target::Property { subject, property });
                    }
                }
            },
            Value::Object(map) if map.contains_key("@value") => {
                self.attach(graph, target, element.clone(), true);
            }
            Value::Object(map) if map.contains_key("@list") => {
                let mut items = Vec::new();
                if let Some(list) = map.get("@list") {
                    self.generate(list, graph, Target::List(&mut items));
                }
                let mut list = Map::new();
                list.insert("@list".into(), Value::Array(items));
                self.attach(graph, target, Value::Object(list), false);
            }
            Value::Object(map) => self.generate_node(map, graph, target),
            _ => {}
        }
    }

    fn generate_node(&mut self, map: &Map<String, Value>, graph: &str, target: Target<'_>) {
        let id = match map.get("@id").and_then(Value::as_str) {
            Some(id) => self.relabel(id),
            None => self.issuer.issue(None),
        };
        self.node_mut(graph, &id);

        let mut reference = Map::new();
        reference.insert("@id".into(), Value::String(id.clone()));
        self.attach(graph, target, Value::Object(reference), true);

        for (key, value) in map {
            match key.as_str() {
                "@id" => {}
                "@type" => {
                    for t in value.as_array().into_iter().flatten() {
                        let t = match t.as_str() {
                            Some(t) => Value::String(self.relabel(t)),
                            None => t.clone(),
                        };
                        append_unique(self.node_mut(graph, &id), "@type", t);
                    }
                }
                "@index" => {
                    let node = self.node_mut(graph, &id);
                    node.insert("@index".into(), value.clone());
                }
                "@graph" => {
                    self.graphs.entry(id.clone()).or_default();
                    self.generate(value, &id, Target::None);
                }
                property => {
                    let property = self.relabel(property);
                    self.node_mut(graph, &id)
                        .entry(property.clone())
                        .or_insert_with(|| Value::Array(Vec::new()));
                    self.generate(
                        value,
                        graph,
                        Target::Property {
                            subject: &id,
                            property: &property,
                        },
                    );
                }
            }
        }
    }

    /// Flattened form: default-graph nodes sorted by identifier, with named
    /// graphs embedded under their graph node's `@graph`.
    pub fn flatten(&self) -> Vec<Value> {
        let mut default = self.default_graph().clone();

        for (name, graph) in &self.graphs {
            if name == DEFAULT_GRAPH {
                continue;
            }
            let node = default.entry(name.clone()).or_insert_with(|| {
                let mut node = Map::new();
                node.insert("@id".into(), Value::String(name.clone()));
                node
            });
            node.insert("@graph".into(), Value::Array(flatten_graph(graph)));
        }
        flatten_graph(&default)
    }

    /// All graphs merged into one, for framing.
    pub fn merged(&self) -> Graph {
        let mut merged = Graph::new();
        for graph in self.graphs.values() {
            for (id, node) in graph {
                let target = merged.entry(id.clone()).or_insert_with(|| {
                    let mut fresh = Map::new();
                    fresh.insert("@id".into(), Value::String(id.clone()));
                    fresh
                });
                for (key, value) in node {
                    match key.as_str() {
                        "@id" => {}
                        "@index" => {
                            target.insert(key.clone(), value.clone());
                        }
                        _ => {
                            target
                                .entry(key.clone())
                                .or_insert_with(|| Value::Array(Vec::new()));
                            for item in value.as_array().into_iter().flatten() {
                                append_unique(target, key, item.clone());
                            }
                        }
                    }
                }
            }
        }
        merged
    }
}

fn flatten_graph(graph: &Graph) -> Vec<Value> {
    graph
        .values()
        .filter(|node| !(node.len() == 1 && node.contains_key("@id")))
        .map(|node| Value::Object(node.clone()))
        .collect()
}

/// Append `value` to the array under `key` unless an equal value is there.
pub fn append_unique(node: &mut Map<String, Value>, key: &str, value: Value) {
    let entry = node
        .entry(key.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Value::Array(items) = entry {
        if !items.contains(&value) {
            items.push(value);
        }
    }
}

fn append(node: &mut Map<String, Value>, key: &str, value: Value) {
    let entry = node
        .entry(key.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Value::Array(items) = entry {
        items.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn issuer_is_stable_per_label() {
        let mut issuer = BlankNodeIssuer::new("_:b");
        assert_eq!(issuer.issue(Some("_:x")), "_:b0");
        assert_eq!(issuer.issue(None), "_:b1");
        assert_eq!(issuer.issue(Some("_:x")), "_:b0");
        assert_eq!(issuer.issue(Some("_:y")), "_:b2");
        assert_eq!(
            issuer.issued_in_order(),
            vec![("_:x".into(), "_:b0".into()), ("_:y".into(), "_:b2".into())]
        );
    }

    #[test]
    fn nested_nodes_are_lifted() {
        let expanded = json!([{
            "@id": "http://example.org/a",
            "http://example.org/knows": [{
                "@id": "http://example.org/b",
                "http://example.org/name": [{"@value": "B"}]
            }]
        }]);
        let flat = NodeMap::from_expanded(&expanded).flatten();
        assert_eq!(
            flat,
            vec![
                json!({
                    "@id": "http://example.org/a",
                    "http://example.org/knows": [{"@id": "http://example.org/b"}]
                }),
                json!({
                    "@id": "http://example.org/b",
                    "http://example.org/name": [{"@value": "B"}]
                }),
            ]
        );
    }

    #[test]
    fn blank_nodes_get_labels() {
        let expanded = json!([{
            "http://example.org/name": [{"@value": "anonymous"}]
        }]);
        let flat = NodeMap::from_expanded(&expanded).flatten();
        assert_eq!(flat[0]["@id"], "_:b0");
    }

    #[test]
    fn duplicate_values_merge() {
        let expanded = json!([
            {"@id": "http://example.org/a", "http://example.org/p": [{"@value": 1}]},
            {"@id": "http://example.org/a", "http://example.org/p": [{"@value": 1}, {"@value": 2}]}
        ]);
        let flat = NodeMap::from_expanded(&expanded).flatten();
        assert_eq!(
            flat,
            vec![json!({
                "@id": "http://example.org/a",
                "http://example.org/p": [{"@value": 1}, {"@value": 2}]
            })]
        );
    }

    #[test]
    fn lists_keep_order_and_duplicates() {
        let expanded = json!([{
            "@id": "http://example.org/a",
            "http://example.org/steps": [{"@list": [{"@value": "x"}, {"@value": "x"}]}]
        }]);
        let flat = NodeMap::from_expanded(&expanded).flatten();
        assert_eq!(
            flat[0]["http://example.org/steps"],
            json!([{"@list": [{"@value": "x"}, {"@value": "x"}]}])
        );
    }

    #[test]
    fn named_graphs_embed_under_graph_node() {
        let expanded = json!([{
            "@id": "http://example.org/g",
            "@graph": [{"@id": "http://example.org/a", "http://example.org/p": [{"@value": "v"}]}]
        }]);
        let map = NodeMap::from_expanded(&expanded);
        assert!(map.graphs.contains_key("http://example.org/g"));
        let flat = map.flatten();
        assert_eq!(
            flat,
            vec![json!({
                "@id": "http://example.org/g",
                "@graph": [{
                    "@id": "http://example.org/a",
                    "http://example.org/p": [{"@value": "v"}]
                }]
            })]
        );
    }
}
