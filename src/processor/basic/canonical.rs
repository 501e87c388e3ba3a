//! processor::basic::canonical
//!
//! Dataset canonicalization: relabel blank nodes deterministically so that
//! isomorphic datasets serialize identically.
//!
//! # Labelling
//!
//! 1. Every blank node gets a first-degree hash: the SHA-256 of the sorted
//!    N-Quads that mention it, with itself written `_:a` and any other
//!    blank node `_:z`.
//! 2. Hashes are refined by folding in the hashes of neighbouring blank
//!    nodes until the number of distinct hashes stops growing.
//! 3. Nodes are ordered by hash and issued `_:c14n0`, `_:c14n1`, ...
//!
//! Ties that survive refinement fall back to the input label order, so
//! fully symmetric graphs may still depend on input labelling.

use std::collections::{BTreeMap, BTreeSet};

use sha2::{Digest, Sha256};

use super::node_map::BlankNodeIssuer;
use super::rdf::{Quad, Term};

const CANONICAL_PREFIX: &str = "_:c14n";

/// Relabel the blank nodes of `quads` canonically.
pub fn canonicalize(quads: &[Quad]) -> Vec<Quad> {
    let blanks = blank_labels(quads);
    if blanks.is_empty() {
        return quads.to_vec();
    }

    let mut hashes: BTreeMap<String, String> = blanks
        .iter()
        .map(|b| (b.clone(), first_degree_hash(quads, b)))
        .collect();

    let mut distinct = distinct_count(&hashes);
    for _ in 0..blanks.len() {
        let refined: BTreeMap<String, String> = blanks
            .iter()
            .map(|b| (b.clone(), neighbour_hash(quads, b, &hashes)))
            .collect();
        let refined_distinct = distinct_count(&refined);
        if refined_distinct <= distinct {
            break;
        }
        hashes = refined;
        distinct = refined_distinct;
    }

    let mut order: Vec<(&String, &String)> = hashes.iter().map(|(b, h)| (h, b)).collect();
    order.sort();

    let mut issuer = BlankNodeIssuer::new(CANONICAL_PREFIX);
    for (_, label) in order {
        issuer.issue(Some(label.as_str()));
    }

    quads
        .iter()
        .map(|quad| Quad {
            subject: relabel(&quad.subject, &mut issuer),
            predicate: quad.predicate.clone(),
            object: relabel(&quad.object, &mut issuer),
            graph: quad.graph.as_ref().map(|g| relabel(g, &mut issuer)),
        })
        .collect()
}

fn relabel(term: &Term, issuer: &mut BlankNodeIssuer) -> Term {
    match term {
        Term::Blank(label) => Term::Blank(issuer.issue(Some(label.as_str()))),
        other => other.clone(),
    }
}

fn blank_labels(quads: &[Quad]) -> BTreeSet<String> {
    let mut labels = BTreeSet::new();
    for quad in quads {
        for term in [Some(&quad.subject), Some(&quad.object), quad.graph.as_ref()]
            .into_iter()
            .flatten()
        {
            if let Term::Blank(label) = term {
                labels.insert(label.clone());
            }
        }
    }
    labels
}

fn mentions(quad: &Quad, label: &str) -> bool {
    [Some(&quad.subject), Some(&quad.object), quad.graph.as_ref()]
        .into_iter()
        .flatten()
        .any(|t| matches!(t, Term::Blank(l) if l == label))
}

fn first_degree_hash(quads: &[Quad], label: &str) -> String {
    let mask = |term: &Term| match term {
        Term::Blank(l) if l == label => Term::Blank("_:a".into()),
        Term::Blank(_) => Term::Blank("_:z".into()),
        other => other.clone(),
    };
    let mut lines: Vec<String> = quads
        .iter()
        .filter(|q| mentions(q, label))
        .map(|q| {
            Quad {
                subject: mask(&q.subject),
                predicate: q.predicate.clone(),
                object: mask(&q.object),
                graph: q.graph.as_ref().map(mask),
            }
            .to_string()
        })
        .collect();
    lines.sort();
    sha256_hex(&lines.concat())
}

fn neighbour_hash(quads: &[Quad], label: &str, hashes: &BTreeMap<String, String>) -> String {
    let mut edges: Vec<String> = Vec::new();
    for quad in quads.iter().filter(|q| mentions(q, label)) {
        let positions = [
            ("s", Some(&quad.subject)),
            ("o", Some(&quad.object)),
            ("g", quad.graph.as_ref()),
        ];
        for (position, term) in positions {
            if let Some(Term::Blank(other)) = term {
                if other != label {
                    let hash = hashes.get(other).map(String::as_str).unwrap_or_default();
                    edges.push(format!("{position}{}{hash}", quad.predicate));
                }
            }
        }
    }
    edges.sort();

    let own = hashes.get(label).map(String::as_str).unwrap_or_default();
    sha256_hex(&format!("{own}{}", edges.concat()))
}

fn distinct_count(hashes: &BTreeMap<String, String>) -> usize {
    hashes.values().collect::<BTreeSet<_>>().len()
}

fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::basic::rdf::{to_nquads, XSD_STRING};

    fn iri(s: &str) -> Term {
        Term::Iri(s.into())
    }

    fn blank(s: &str) -> Term {
        Term::Blank(s.into())
    }

    fn quad(subject: Term, predicate: &str, object: Term) -> Quad {
        Quad {
            subject,
            predicate: iri(predicate),
            object,
            graph: None,
        }
    }

    fn sample(a: &str, b: &str) -> Vec<Quad> {
        vec![
            quad(
                blank(a),
                "http://example.org/name",
                Term::Literal {
                    value: "Jane".into(),
                    datatype: XSD_STRING.into(),
                    language: None,
                },
            ),
            quad(blank(a), "http://example.org/knows", blank(b)),
            quad(
                blank(b),
                "http://example.org/type",
                iri("http://example.org/Person"),
            ),
        ]
    }

    #[test]
    fn labelling_is_independent_of_input_labels() {
        let left = to_nquads(&canonicalize(&sample("_:x", "_:y")));
        let right = to_nquads(&canonicalize(&sample("_:b7", "_:b0")));
        assert_eq!(left, right);
        assert!(left.contains("_:c14n0"));
        assert!(left.contains("_:c14n1"));
        assert!(!left.contains("_:x"));
    }

    #[test]
    fn ground_quads_are_untouched() {
        let quads = vec![quad(
            iri("http://example.org/a"),
            "http://example.org/p",
            iri("http://example.org/b"),
        )];
        assert_eq!(canonicalize(&quads), quads);
    }

    #[test]
    fn hashes_are_hex_sha256() {
        let hash = first_degree_hash(&sample("_:x", "_:y"), "_:x");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
