use std::collections::VecDeque;

use petgraph::graph::NodeIndex;

use crate::atom::AtomId;
use crate::mol::MoleculeGraph;

/// Multi-source BFS distance, in bonds, from the nearest seed.
///
/// Entries are indexed by node index; atoms unreachable from every seed
/// are `None`.
pub fn distances_from(mol: &MoleculeGraph, seeds: &[NodeIndex]) -> Vec<Option<usize>> {
    let mut dist = vec![None; mol.atom_count()];
    let mut queue = VecDeque::new();
    for &seed in seeds {
        if dist[seed.index()].is_none() {
            dist[seed.index()] = Some(0);
            queue.push_back(seed);
        }
    }
    while let Some(current) = queue.pop_front() {
        let Some(d) = dist[current.index()] else {
            continue;
        };
        for neighbor in mol.neighbor_nodes(current) {
            if dist[neighbor.index()].is_none() {
                dist[neighbor.index()] = Some(d + 1);
                queue.push_back(neighbor);
            }
        }
    }
    dist
}

/// Membership mask of the atoms within `radius` bonds of any seed.
///
/// `None` means unbounded, which selects the whole template regardless
/// of connectivity.
pub fn neighborhood(mol: &MoleculeGraph, seeds: &[NodeIndex], radius: Option<usize>) -> Vec<bool> {
    match radius {
        None => vec![true; mol.atom_count()],
        Some(r) => distances_from(mol, seeds)
            .into_iter()
            .map(|d| d.is_some_and(|d| d <= r))
            .collect(),
    }
}

/// Connected components as ascending id lists, ordered by their smallest id.
pub fn connected_components(mol: &MoleculeGraph) -> Vec<Vec<AtomId>> {
    let n = mol.atom_count();
    let mut seen = vec![false; n];
    let mut components = Vec::new();
    for start in mol.nodes() {
        if seen[start.index()] {
            continue;
        }
        seen[start.index()] = true;
        let mut component = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            component.push(mol.id_at(current));
            for neighbor in mol.neighbor_nodes(current) {
                if !seen[neighbor.index()] {
                    seen[neighbor.index()] = true;
                    queue.push_back(neighbor);
                }
            }
        }
        component.sort_unstable();
        components.push(component);
    }
    components.sort_by_key(|c| c[0]);
    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;

    // 1-2-3-4 chain plus an isolated 5-6 pair
    fn chain_and_pair() -> MoleculeGraph {
        MoleculeGraph::from_parts(
            (1..=6).map(|i| Atom::new(i, "C")),
            [(1, 2), (2, 3), (3, 4), (5, 6)],
        )
        .unwrap()
    }

    fn node(mol: &MoleculeGraph, id: u32) -> NodeIndex {
        mol.node(AtomId(id)).unwrap()
    }

    #[test]
    fn bfs_distances_from_single_seed() {
        let mol = chain_and_pair();
        let dist = distances_from(&mol, &[node(&mol, 1)]);
        assert_eq!(dist[node(&mol, 1).index()], Some(0));
        assert_eq!(dist[node(&mol, 4).index()], Some(3));
        assert_eq!(dist[node(&mol, 5).index()], None);
    }

    #[test]
    fn bfs_distances_take_nearest_seed() {
        let mol = chain_and_pair();
        let dist = distances_from(&mol, &[node(&mol, 1), node(&mol, 4)]);
        assert_eq!(dist[node(&mol, 2).index()], Some(1));
        assert_eq!(dist[node(&mol, 3).index()], Some(1));
        assert_eq!(dist[node(&mol, 6).index()], None);
    }

    #[test]
    fn bounded_neighborhood() {
        let mol = chain_and_pair();
        let site = neighborhood(&mol, &[node(&mol, 1)], Some(2));
        assert!(site[node(&mol, 3).index()]);
        assert!(!site[node(&mol, 4).index()]);
        assert!(!site[node(&mol, 5).index()]);
    }

    #[test]
    fn unbounded_neighborhood_is_everything() {
        let mol = chain_and_pair();
        let site = neighborhood(&mol, &[node(&mol, 1)], None);
        assert!(site.iter().all(|&inside| inside));
    }

    #[test]
    fn components_sorted() {
        let mol = chain_and_pair();
        let comps = connected_components(&mol);
        assert_eq!(comps.len(), 2);
        assert_eq!(comps[0], vec![AtomId(1), AtomId(2), AtomId(3), AtomId(4)]);
        assert_eq!(comps[1], vec![AtomId(5), AtomId(6)]);
    }

    #[test]
    fn empty_graph_has_no_components() {
        assert!(connected_components(&MoleculeGraph::new()).is_empty());
    }
}
