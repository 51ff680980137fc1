use std::cmp::Reverse;

use petgraph::graph::NodeIndex;

use crate::graph_ops::distances_from;

use super::search::Problem;

/// One level of the search: the pre atom to place, and the already
/// placed neighbor whose image's neighborhood supplies its candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Step {
    pub atom: NodeIndex,
    pub parent: Option<NodeIndex>,
}

/// Order the unanchored site atoms of the source template for placement.
///
/// The set of atoms placed before depth `d` does not depend on which
/// candidates were chosen, so the order can be fixed up front. At each
/// pick, atoms bonded to something already placed come first, keeping
/// the frontier connected; among those, higher degree wins, then the
/// smaller graph distance to the placed set, then the smaller id.
///
/// Adjacency is ranked ahead of degree on purpose. A pure degree-first
/// order can pick an atom with no placed neighbor, whose candidates then
/// come from the whole target instead of one image's neighbors.
pub(super) fn search_order(problem: &Problem<'_>) -> Vec<Step> {
    let graph = problem.source;
    let mut placed: Vec<NodeIndex> = problem.seeds.iter().map(|&(p, _)| p).collect();
    let mut is_placed = vec![false; graph.atom_count()];
    for &p in &placed {
        is_placed[p.index()] = true;
    }

    let mut remaining: Vec<NodeIndex> = graph
        .nodes()
        .filter(|n| problem.source_site[n.index()] && !is_placed[n.index()])
        .collect();

    let mut order = Vec::with_capacity(remaining.len());
    while !remaining.is_empty() {
        let dist = distances_from(graph, &placed);
        let pos = remaining
            .iter()
            .enumerate()
            .min_by_key(|&(_, &n)| {
                let d = dist[n.index()].unwrap_or(usize::MAX);
                (d != 1, Reverse(graph.degree_at(n)), d, graph.id_at(n))
            })
            .map(|(i, _)| i)
            .unwrap_or(0);
        let atom = remaining.swap_remove(pos);

        let parent = graph
            .neighbor_nodes(atom)
            .filter(|n| is_placed[n.index()])
            .min_by_key(|&n| graph.id_at(n));

        order.push(Step { atom, parent });
        placed.push(atom);
        is_placed[atom.index()] = true;
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::Side;
    use crate::atom::{Atom, AtomId};
    use crate::equivalence::{ClassInterner, EquivalenceClasses};
    use crate::mol::MoleculeGraph;

    fn problem<'a>(
        pre: &'a MoleculeGraph,
        post: &'a MoleculeGraph,
        seeds: &[(u32, u32)],
    ) -> Problem<'a> {
        let classes = EquivalenceClasses::new();
        let mut interner = ClassInterner::new(&classes);
        let pre_class = interner.classify_graph(pre);
        let post_class = interner.classify_graph(post);
        let seeds: Vec<(NodeIndex, NodeIndex)> = seeds
            .iter()
            .map(|&(p, q)| (pre.node(AtomId(p)).unwrap(), post.node(AtomId(q)).unwrap()))
            .collect();
        let mut pre_anchor = vec![false; pre.atom_count()];
        for &(p, _) in &seeds {
            pre_anchor[p.index()] = true;
        }
        Problem {
            source: pre,
            target: post,
            source_side: Side::Pre,
            source_class: pre_class,
            target_class: post_class,
            source_site: vec![true; pre.atom_count()],
            target_site: vec![true; post.atom_count()],
            source_anchor: pre_anchor,
            seeds,
            reverse_bond_check: true,
        }
    }

    fn ids(pre: &MoleculeGraph, order: &[Step]) -> Vec<u32> {
        order.iter().map(|s| pre.id_at(s.atom).get()).collect()
    }

    #[test]
    fn frontier_stays_connected_and_prefers_degree() {
        // 1(anchor)-2-3, with 2 also carrying 4 and 5; 3 carries 6
        let pre = MoleculeGraph::from_parts(
            (1..=6).map(|i| Atom::new(i, "C")),
            [(1, 2), (2, 3), (2, 4), (2, 5), (3, 6)],
        )
        .unwrap();
        let p = problem(&pre, &pre, &[(1, 1)]);
        let order = search_order(&p);
        // 2 is the only atom next to the anchor; then 3 (degree 2) before 4, 5
        assert_eq!(ids(&pre, &order), vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn parents_are_placed_neighbors() {
        let pre = MoleculeGraph::from_parts(
            (1..=4).map(|i| Atom::new(i, "C")),
            [(1, 2), (2, 3), (3, 4)],
        )
        .unwrap();
        let p = problem(&pre, &pre, &[(1, 1)]);
        let order = search_order(&p);
        for (i, step) in order.iter().enumerate() {
            let parent = step.parent.expect("connected chain has parents");
            let placed_before: Vec<NodeIndex> = std::iter::once(pre.node(AtomId(1)).unwrap())
                .chain(order[..i].iter().map(|s| s.atom))
                .collect();
            assert!(placed_before.contains(&parent));
            assert!(pre.has_bond_at(step.atom, parent));
        }
    }

    #[test]
    fn adjacency_outranks_degree() {
        // 3 carries three branches but is two bonds from the anchor
        let pre = MoleculeGraph::from_parts(
            (1..=6).map(|i| Atom::new(i, "C")),
            [(1, 2), (2, 3), (3, 4), (3, 5), (3, 6)],
        )
        .unwrap();
        let p = problem(&pre, &pre, &[(1, 1)]);
        let order = search_order(&p);
        assert_eq!(ids(&pre, &order), vec![2, 3, 4, 5, 6]);
        assert_eq!(order[0].parent, pre.node(AtomId(1)));
    }

    #[test]
    fn disconnected_fragment_has_no_parent() {
        let pre = MoleculeGraph::from_parts(
            (1..=4).map(|i| Atom::new(i, "C")),
            [(1, 2), (3, 4)],
        )
        .unwrap();
        let p = problem(&pre, &pre, &[(1, 1)]);
        let order = search_order(&p);
        assert_eq!(ids(&pre, &order), vec![2, 3, 4]);
        assert_eq!(order[1].parent, None);
        assert_eq!(order[2].parent, pre.node(AtomId(3)));
    }

    #[test]
    fn anchors_are_not_ordered() {
        let pre = MoleculeGraph::from_parts(
            [Atom::new(1, "C"), Atom::new(2, "O")],
            [(1, 2)],
        )
        .unwrap();
        let p = problem(&pre, &pre, &[(1, 1), (2, 2)]);
        assert!(search_order(&p).is_empty());
    }
}
