use std::collections::HashSet;

use crate::anchor::AnchorSet;
use crate::atom::AtomId;
use crate::equivalence::EquivalenceClasses;
use crate::mol::MoleculeGraph;

use super::Mapping;

/// A way in which a [`Mapping`] breaks its invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    UnknownPreAtom(AtomId),
    UnknownPostAtom(AtomId),
    /// Two pre atoms share this post image.
    ReusedImage(AtomId),
    /// The pair joins atoms of non-equivalent types.
    ClassMismatch { pre: AtomId, post: AtomId },
    /// The pre bond `a-b` has no counterpart between the images.
    MissingBond { a: AtomId, b: AtomId },
    /// The anchor is absent from the mapping or mapped elsewhere.
    AnchorNotHonored { pre: AtomId, post: AtomId },
}

/// List every invariant `mapping` violates; empty means consistent.
///
/// Bonds between two anchored pre atoms are exempt from the bond check,
/// as they are the bonds the reaction changes.
pub fn verify_mapping(
    mapping: &Mapping,
    pre: &MoleculeGraph,
    post: &MoleculeGraph,
    anchors: &AnchorSet,
    classes: &EquivalenceClasses,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut used = HashSet::new();

    for (p, q) in mapping.iter() {
        let (Some(pre_atom), Some(post_atom)) = (pre.atom(p), post.atom(q)) else {
            if !pre.contains(p) {
                violations.push(Violation::UnknownPreAtom(p));
            }
            if !post.contains(q) {
                violations.push(Violation::UnknownPostAtom(q));
            }
            continue;
        };
        if !used.insert(q) {
            violations.push(Violation::ReusedImage(q));
        }
        if !classes.are_equivalent(&pre_atom.element_type, &post_atom.element_type) {
            violations.push(Violation::ClassMismatch { pre: p, post: q });
        }
    }

    for (bond, _) in pre.bonds() {
        let (a, b) = (bond.first(), bond.second());
        if anchors.is_pre_anchor(a) && anchors.is_pre_anchor(b) {
            continue;
        }
        if let (Some(qa), Some(qb)) = (mapping.get(a), mapping.get(b)) {
            if !post.has_bond(qa, qb) {
                violations.push(Violation::MissingBond { a, b });
            }
        }
    }

    for pair in anchors.pairs() {
        if mapping.get(pair.pre) != Some(pair.post) {
            violations.push(Violation::AnchorNotHonored {
                pre: pair.pre,
                post: pair.post,
            });
        }
    }

    violations
}
