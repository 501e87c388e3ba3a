//! processor::basic::rdf
//!
//! Conversion of a node map to RDF quads, and the two output shapes for
//! quads: N-Quads text and a JSON dataset object.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{json, Map, Value};

use super::context::{is_absolute, is_blank, is_keyword};
use super::node_map::{NodeMap, DEFAULT_GRAPH};

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDF_FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
pub const RDF_REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
pub const RDF_NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
pub const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
pub const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
pub const XSD_DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

/// An RDF term.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Term {
    Iri(String),
    Blank(String),
    Literal {
        value: String,
        datatype: String,
        language: Option<String>,
    },
}

impl Term {
    fn node(id: &str) -> Option<Self> {
        if is_blank(id) {
            Some(Term::Blank(id.to_string()))
        } else if is_absolute(id) {
            Some(Term::Iri(id.to_string()))
        } else {
            None
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Term::Blank(_))
    }

    fn to_json(&self) -> Value {
        match self {
            Term::Iri(iri) => json!({"type": "IRI", "value": iri}),
            Term::Blank(label) => json!({"type": "blank node", "value": label}),
            Term::Literal {
                value,
                datatype,
                language,
            } => {
                let mut object = json!({"type": "literal", "value": value, "datatype": datatype});
                if let Some(language) = language {
                    object["language"] = Value::String(language.clone());
                }
                object
            }
        }
    }
}

/// N-Quads form of the term.
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{iri}>"),
            Term::Blank(label) => f.write_str(label),
            Term::Literal {
                value,
                datatype,
                language,
            } => {
                write!(f, "\"{}\"", escape(value))?;
                match language {
                    Some(language) => write!(f, "@{language}"),
                    None if datatype == XSD_STRING => Ok(()),
                    None => write!(f, "^^<{datatype}>"),
                }
            }
        }
    }
}

/// One statement, optionally in a named graph.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quad {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
    pub graph: Option<Term>,
}

impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)?;
        if let Some(graph) = &self.graph {
            write!(f, " {graph}")?;
        }
        f.write_str(" .\n")
    }
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

/// Convert a node map to quads.
///
/// Relative IRIs and blank node predicates have no RDF form and are
/// skipped.
pub fn to_quads(mut map: NodeMap) -> Vec<Quad> {
    let graphs = std::mem::take(&mut map.graphs);
    let mut quads = Vec::new();

    for (name, graph) in &graphs {
        let graph_term = if name == DEFAULT_GRAPH {
            None
        } else {
            match Term::node(name) {
                Some(term) => Some(term),
                None => continue,
            }
        };

        for (id, node) in graph {
            let Some(subject) = Term::node(id) else {
                continue;
            };
            let mut properties: Vec<&String> = node.keys().collect();
            properties.sort();

            for property in properties {
                let values = node[property.as_str()]
                    .as_array()
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                if property == "@type" {
                    for t in values.iter().filter_map(Value::as_str) {
                        if let Some(object) = Term::node(t) {
                            quads.push(Quad {
                                subject: subject.clone(),
                                predicate: Term::Iri(RDF_TYPE.into()),
                                object,
                                graph: graph_term.clone(),
                            });
                        }
                    }
                    continue;
                }
                if is_keyword(property) || is_blank(property) || !is_absolute(property) {
                    continue;
                }
                let predicate = Term::Iri(property.clone());
                for item in values {
                    let mut converter = Converter {
                        map: &mut map,
                        quads: &mut quads,
                        graph: graph_term.clone(),
                    };
                    if let Some(object) = converter.object(item) {
                        quads.push(Quad {
                            subject: subject.clone(),
                            predicate: predicate.clone(),
                            object,
                            graph: graph_term.clone(),
                        });
                    }
                }
            }
        }
    }
    quads
}

struct Converter<'a> {
    map: &'a mut NodeMap,
    quads: &'a mut Vec<Quad>,
    graph: Option<Term>,
}

impl Converter<'_> {
    fn object(&mut self, item: &Value) -> Option<Term> {
        let object = item.as_object()?;
        if let Some(list) = object.get("@list") {
            let items = list.as_array().map(Vec::as_slice).unwrap_or_default();
            return Some(self.list(items));
        }
        if let Some(value) = object.get("@value") {
            return literal(object, value);
        }
        object
            .get("@id")
            .and_then(Value::as_str)
            .and_then(Term::node)
    }

    fn list(&mut self, items: &[Value]) -> Term {
        let Some((first, rest)) = items.split_first() else {
            return Term::Iri(RDF_NIL.into());
        };
        let head = Term::Blank(self.map.fresh_blank());
        if let Some(object) = self.object(first) {
            self.push(head.clone(), RDF_FIRST, object);
        }
        let tail = self.list(rest);
        self.push(head.clone(), RDF_REST, tail);
        head
    }

    fn push(&mut self, subject: Term, predicate: &str, object: Term) {
        self.quads.push(Quad {
            subject,
            predicate: Term::Iri(predicate.into()),
            object,
            graph: self.graph.clone(),
        });
    }
}

fn literal(object: &Map<String, Value>, value: &Value) -> Option<Term> {
    let datatype = object.get("@type").and_then(Value::as_str);
    let language = object.get("@language").and_then(Value::as_str);

    let (lexical, default_type) = match value {
        Value::Bool(b) => (b.to_string(), XSD_BOOLEAN),
        Value::Number(n) => {
            let integral = n
                .as_i64()
                .map(|i| i.to_string())
                .or_else(|| n.as_u64().map(|u| u.to_string()));
            let double = datatype == Some(XSD_DOUBLE);
            match (integral, n.as_f64()) {
                (Some(i), _) if !double => (i, XSD_INTEGER),
                (_, Some(f)) if f.fract() == 0.0 && f.abs() < 1e21 && !double => {
                    (format!("{f:.0}"), XSD_INTEGER)
                }
                (_, Some(f)) => (canonical_double(f), XSD_DOUBLE),
                (_, None) => return None,
            }
        }
        Value::String(s) => {
            if let Some(language) = language {
                return Some(Term::Literal {
                    value: s.clone(),
                    datatype: RDF_LANG_STRING.into(),
                    language: Some(language.to_string()),
                });
            }
            (s.clone(), XSD_STRING)
        }
        _ => return None,
    };

    Some(Term::Literal {
        value: lexical,
        datatype: datatype.unwrap_or(default_type).to_string(),
        language: None,
    })
}

/// `1.1E0`-style lexical form for `xsd:double`.
fn canonical_double(value: f64) -> String {
    let formatted = format!("{value:E}");
    match formatted.split_once('E') {
        Some((mantissa, exponent)) if !mantissa.contains('.') => {
            format!("{mantissa}.0E{exponent}")
        }
        _ => formatted,
    }
}

/// Serialize quads as sorted, de-duplicated N-Quads.
pub fn to_nquads(quads: &[Quad]) -> String {
    let mut lines: Vec<String> = quads.iter().map(Quad::to_string).collect();
    lines.sort();
    lines.dedup();
    lines.concat()
}

/// Serialize quads as a dataset object keyed by graph name.
pub fn to_dataset(quads: &[Quad]) -> Value {
    let mut graphs: BTreeMap<String, Vec<Value>> = BTreeMap::new();
    graphs.entry(DEFAULT_GRAPH.to_string()).or_default();

    for quad in quads {
        let name = match &quad.graph {
            None => DEFAULT_GRAPH.to_string(),
            Some(Term::Iri(name) | Term::Blank(name)) => name.clone(),
            Some(Term::Literal { .. }) => continue,
        };
        graphs.entry(name).or_default().push(json!({
            "subject": quad.subject.to_json(),
            "predicate": quad.predicate.to_json(),
            "object": quad.object.to_json(),
        }));
    }

    Value::Object(
        graphs
            .into_iter()
            .map(|(name, triples)| (name, Value::Array(triples)))
            .collect(),
    )
}
