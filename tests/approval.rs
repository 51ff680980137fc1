use std::collections::{HashMap, HashSet};

use bondmap::{Atom, MapRequest, MoleculeGraph};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct TemplateData {
    atoms: Vec<(u32, String)>,
    bonds: Vec<(u32, u32)>,
}

impl TemplateData {
    fn graph(&self) -> MoleculeGraph {
        MoleculeGraph::from_parts(
            self.atoms
                .iter()
                .map(|(id, element_type)| Atom::new(*id, element_type.clone())),
            self.bonds.iter().copied(),
        )
        .unwrap()
    }
}

#[derive(Deserialize)]
struct ReactionEntry {
    name: String,
    request: MapRequest,
    pre: TemplateData,
    post: TemplateData,
    /// Post ids each pre atom may map to; symmetric atoms list every
    /// chemically equivalent choice.
    #[serde(default)]
    allowed: HashMap<String, Vec<u32>>,
    #[serde(default)]
    expect_error: Option<String>,
}

fn load() -> Vec<ReactionEntry> {
    serde_json::from_str(include_str!("approval_data/reactions.json")).unwrap()
}

// ---------------------------------------------------------------------------
// Reactions
// ---------------------------------------------------------------------------

#[test]
fn approval_reactions() {
    let mut failures = Vec::new();

    for entry in load() {
        let pre = entry.pre.graph();
        let post = entry.post.graph();
        let result = entry.request.run(&pre, &post);

        match (&entry.expect_error, result) {
            (Some(kind), Ok(outcome)) => failures.push(format!(
                "[{}] expected {kind}, got mapping {:?}",
                entry.name,
                outcome.mapping.to_pairs()
            )),
            (Some(kind), Err(err)) => {
                let got = format!("{:?}", err.kind());
                if &got != kind {
                    failures.push(format!("[{}] expected {kind}, got {got}: {err}", entry.name));
                }
            }
            (None, Err(err)) => failures.push(format!("[{}] unexpected error: {err}", entry.name)),
            (None, Ok(outcome)) => {
                let mapping = &outcome.mapping;
                if mapping.len() != entry.allowed.len() {
                    failures.push(format!(
                        "[{}] mapped {} atoms, expected {}",
                        entry.name,
                        mapping.len(),
                        entry.allowed.len()
                    ));
                }
                let mut used = HashSet::new();
                for (p, q) in mapping.iter() {
                    if !used.insert(q) {
                        failures.push(format!("[{}] post atom {q} used twice", entry.name));
                    }
                    let ok = entry
                        .allowed
                        .get(&p.to_string())
                        .is_some_and(|choices| choices.contains(&q.get()));
                    if !ok {
                        failures.push(format!(
                            "[{}] pre atom {p} mapped to {q}, allowed {:?}",
                            entry.name,
                            entry.allowed.get(&p.to_string())
                        ));
                    }
                }
                if outcome.is_ambiguous() {
                    failures.push(format!(
                        "[{}] unexpected ambiguity: {:?}",
                        entry.name, outcome.warnings
                    ));
                }
            }
        }
    }

    if !failures.is_empty() {
        panic!(
            "{} approval failures:\n{}",
            failures.len(),
            failures.join("\n")
        );
    }
}

#[test]
fn approval_reactions_are_deterministic() {
    for entry in load() {
        let pre = entry.pre.graph();
        let post = entry.post.graph();
        let first = entry.request.run(&pre, &post);
        for _ in 0..3 {
            assert_eq!(entry.request.run(&pre, &post), first, "{}", entry.name);
        }
    }
}
