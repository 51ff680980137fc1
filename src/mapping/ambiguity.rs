use petgraph::graph::NodeIndex;

use crate::atom::AtomId;
use crate::symmetry::symmetry_ranks;

use super::order::Step;
use super::search::{CandidateFilter, Problem, Search};
use super::MapWarning;

/// Look for a complete mapping that differs from `primary` by more than a
/// symmetric relabeling of the target template.
///
/// Two mappings are taken to be symmetric relabelings of each other when
/// every source atom's two images share a target symmetry rank (with anchors
/// pinned). The probe explores one candidate per rank at each depth, so
/// symmetric duplicates such as the permutations of a methyl group's
/// hydrogens are never enumerated.
pub(super) fn probe(
    problem: &Problem<'_>,
    order: &[Step],
    primary: &[Option<NodeIndex>],
    node_budget: usize,
) -> Option<MapWarning> {
    let pinned: Vec<NodeIndex> = problem.seeds.iter().map(|&(_, q)| q).collect();
    let ranks = symmetry_ranks(problem.target, &problem.target_class, &pinned);

    let signature = |images: &[Option<NodeIndex>]| -> Vec<Option<usize>> {
        order
            .iter()
            .map(|step| images[step.atom.index()].map(|q| ranks[q.index()]))
            .collect()
    };
    let expected = signature(primary);

    let mut search = Search::new(problem, order)
        .with_filter(CandidateFilter::DistinctRanks(&ranks))
        .with_node_budget(node_budget);

    while let Some(images) = search.next_solution() {
        if signature(&images) == expected {
            continue;
        }
        let mut alternative: Vec<(AtomId, AtomId)> = order
            .iter()
            .filter_map(|step| {
                let p = step.atom;
                let (a, b) = (primary[p.index()]?, images[p.index()]?);
                (ranks[a.index()] != ranks[b.index()]).then(|| problem.pair_ids(p, b))
            })
            .collect();
        alternative.sort();
        let atoms = alternative.iter().map(|&(pre, _)| pre).collect();
        return Some(MapWarning::AmbiguousMapping { atoms, alternative });
    }

    if search.budget_hit() {
        log::debug!(
            "ambiguity probe gave up after {} nodes",
            search.stats().nodes
        );
    }
    None
}
