//! Topological symmetry ranks.
//!
//! Atoms that an automorphism of the template could swap (two hydrogens
//! on one carbon, the two oxygens of a carboxylate) end up with equal
//! ranks. Ranks start from a per-atom invariant and are refined Morgan
//! style: each round an atom's key becomes its own rank followed by the
//! sorted ranks of its neighbors, until a round splits no rank.
//!
//! Equal rank is necessary for two atoms to be symmetric but, as with any
//! color refinement, not sufficient for exotic highly regular graphs. The
//! mapping engine only uses ranks to classify alternative solutions, so
//! that approximation is acceptable.

use petgraph::graph::NodeIndex;

use crate::equivalence::ClassId;
use crate::mol::MoleculeGraph;

/// Dense ranks of `keys`: equal keys share a rank and ranks follow key
/// order, starting at 0.
fn dense_ranks<K: Ord>(keys: &[K]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| keys[a].cmp(&keys[b]));
    let mut ranks = vec![0; keys.len()];
    let mut rank = 0;
    for (pos, &i) in order.iter().enumerate() {
        if pos > 0 && keys[i] != keys[order[pos - 1]] {
            rank += 1;
        }
        ranks[i] = rank;
    }
    ranks
}

fn rank_count(ranks: &[usize]) -> usize {
    ranks.iter().max().map_or(0, |&r| r + 1)
}

/// Symmetry rank of every atom, indexed by node index.
///
/// `classes` holds the equivalence class of each node. Atoms listed in
/// `pinned` get a distinct tag each, so no symmetry may move them; pass
/// the anchored atoms here.
pub fn symmetry_ranks(mol: &MoleculeGraph, classes: &[ClassId], pinned: &[NodeIndex]) -> Vec<usize> {
    let initial: Vec<(ClassId, usize, Option<usize>)> = mol
        .nodes()
        .map(|node| {
            (
                classes[node.index()],
                mol.degree_at(node),
                pinned.iter().position(|&p| p == node),
            )
        })
        .collect();
    let mut ranks = dense_ranks(&initial);
    let mut count = rank_count(&ranks);

    loop {
        let keys: Vec<(usize, Vec<usize>)> = mol
            .nodes()
            .map(|node| {
                let mut around: Vec<usize> = mol
                    .neighbor_nodes(node)
                    .map(|nb| ranks[nb.index()])
                    .collect();
                around.sort_unstable();
                (ranks[node.index()], around)
            })
            .collect();
        let refined = dense_ranks(&keys);
        let refined_count = rank_count(&refined);
        if refined_count == count {
            return ranks;
        }
        ranks = refined;
        count = refined_count;
    }
}
