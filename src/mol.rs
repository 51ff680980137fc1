use std::collections::HashMap;

use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use thiserror::Error;

use crate::atom::{Atom, AtomId};
use crate::bond::{Bond, BondPair};

/// Error returned when a [`MoleculeGraph`] would violate its invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("atom id {0} appears more than once in the template")]
    DuplicateAtom(AtomId),
    #[error("bond {a}-{b} references atom {missing}, which is not in the template")]
    UnknownAtom {
        a: AtomId,
        b: AtomId,
        missing: AtomId,
    },
    #[error("bond {0}-{0} connects an atom to itself")]
    SelfLoop(AtomId),
    #[error("bond {a}-{b} is listed more than once")]
    DuplicateBond { a: AtomId, b: AtomId },
}

/// Atoms and bonds of one partial molecule template.
///
/// Atoms are addressed by their template [`AtomId`]; the underlying
/// petgraph node indices are dense and follow insertion order. Every bond
/// references two atoms of the same graph, with no self-loops and no
/// duplicates.
#[derive(Clone, Default)]
pub struct MoleculeGraph {
    graph: UnGraph<Atom, Bond>,
    index: HashMap<AtomId, NodeIndex>,
}

impl MoleculeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from atoms and untyped bonds in one go.
    ///
    /// # Examples
    ///
    /// ```
    /// use bondmap::{Atom, AtomId, MoleculeGraph};
    ///
    /// let water = MoleculeGraph::from_parts(
    ///     [Atom::new(1, "O"), Atom::new(2, "H"), Atom::new(3, "H")],
    ///     [(1, 2), (1, 3)],
    /// )
    /// .unwrap();
    /// assert_eq!(water.degree(AtomId(1)), 2);
    /// assert!(!water.has_bond(AtomId(2), AtomId(3)));
    /// ```
    pub fn from_parts<I, J>(atoms: I, bonds: J) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = Atom>,
        J: IntoIterator<Item = (u32, u32)>,
    {
        let mut mol = Self::new();
        for atom in atoms {
            mol.add_atom(atom)?;
        }
        for (a, b) in bonds {
            mol.add_bond(AtomId(a), AtomId(b), Bond::default())?;
        }
        Ok(mol)
    }

    pub fn graph(&self) -> &UnGraph<Atom, Bond> {
        &self.graph
    }

    pub fn add_atom(&mut self, atom: Atom) -> Result<NodeIndex, GraphError> {
        if self.index.contains_key(&atom.id) {
            return Err(GraphError::DuplicateAtom(atom.id));
        }
        let id = atom.id;
        let idx = self.graph.add_node(atom);
        self.index.insert(id, idx);
        Ok(idx)
    }

    pub fn add_bond(&mut self, a: AtomId, b: AtomId, bond: Bond) -> Result<EdgeIndex, GraphError> {
        if a == b {
            return Err(GraphError::SelfLoop(a));
        }
        let na = self
            .node(a)
            .ok_or(GraphError::UnknownAtom { a, b, missing: a })?;
        let nb = self
            .node(b)
            .ok_or(GraphError::UnknownAtom { a, b, missing: b })?;
        if self.graph.find_edge(na, nb).is_some() {
            return Err(GraphError::DuplicateBond { a, b });
        }
        Ok(self.graph.add_edge(na, nb, bond))
    }

    pub fn node(&self, id: AtomId) -> Option<NodeIndex> {
        self.index.get(&id).copied()
    }

    pub fn contains(&self, id: AtomId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn atom(&self, id: AtomId) -> Option<&Atom> {
        self.node(id).map(|idx| &self.graph[idx])
    }

    pub fn atom_at(&self, idx: NodeIndex) -> &Atom {
        &self.graph[idx]
    }

    pub fn id_at(&self, idx: NodeIndex) -> AtomId {
        self.graph[idx].id
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn atoms(&self) -> impl Iterator<Item = &Atom> + '_ {
        self.graph.node_weights()
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// All atom ids in ascending order.
    pub fn atom_ids(&self) -> Vec<AtomId> {
        let mut ids: Vec<AtomId> = self.index.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Neighbors of `id` in ascending id order. Unknown ids have none.
    pub fn neighbors(&self, id: AtomId) -> Vec<AtomId> {
        let Some(idx) = self.node(id) else {
            return Vec::new();
        };
        let mut ids: Vec<AtomId> = self
            .graph
            .neighbors(idx)
            .map(|nb| self.graph[nb].id)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn neighbor_nodes(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(idx)
    }

    pub fn degree(&self, id: AtomId) -> usize {
        self.node(id)
            .map(|idx| self.graph.neighbors(idx).count())
            .unwrap_or(0)
    }

    pub fn degree_at(&self, idx: NodeIndex) -> usize {
        self.graph.neighbors(idx).count()
    }

    pub fn has_bond(&self, a: AtomId, b: AtomId) -> bool {
        match (self.node(a), self.node(b)) {
            (Some(na), Some(nb)) => self.graph.find_edge(na, nb).is_some(),
            _ => false,
        }
    }

    pub fn has_bond_at(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.graph.find_edge(a, b).is_some()
    }

    pub fn bond(&self, a: AtomId, b: AtomId) -> Option<&Bond> {
        let (na, nb) = (self.node(a)?, self.node(b)?);
        self.graph.find_edge(na, nb).map(|e| &self.graph[e])
    }

    /// Every bond as a normalized id pair, in insertion order.
    pub fn bonds(&self) -> impl Iterator<Item = (BondPair, &Bond)> + '_ {
        self.graph.edge_references().map(|e| {
            let pair = BondPair::new(self.graph[e.source()].id, self.graph[e.target()].id);
            (pair, e.weight())
        })
    }
}

impl std::fmt::Debug for MoleculeGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoleculeGraph")
            .field("atom_count", &self.atom_count())
            .field("bond_count", &self.bond_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formaldehyde() -> MoleculeGraph {
        MoleculeGraph::from_parts(
            [
                Atom::new(1, "C"),
                Atom::new(2, "O"),
                Atom::new(3, "H"),
                Atom::new(4, "H"),
            ],
            [(1, 2), (1, 3), (1, 4)],
        )
        .unwrap()
    }

    #[test]
    fn lookups_by_id() {
        let mol = formaldehyde();
        assert_eq!(mol.atom_count(), 4);
        assert_eq!(mol.bond_count(), 3);
        assert_eq!(mol.atom(AtomId(2)).unwrap().element_type, "O");
        assert!(mol.atom(AtomId(9)).is_none());
        assert_eq!(
            mol.neighbors(AtomId(1)),
            vec![AtomId(2), AtomId(3), AtomId(4)]
        );
        assert_eq!(mol.degree(AtomId(3)), 1);
        assert_eq!(mol.degree(AtomId(42)), 0);
    }

    #[test]
    fn bonds_are_undirected() {
        let mol = formaldehyde();
        assert!(mol.has_bond(AtomId(1), AtomId(2)));
        assert!(mol.has_bond(AtomId(2), AtomId(1)));
        assert!(!mol.has_bond(AtomId(3), AtomId(4)));
        let pairs: Vec<BondPair> = mol.bonds().map(|(p, _)| p).collect();
        assert!(pairs.contains(&BondPair::new(AtomId(2), AtomId(1))));
    }

    #[test]
    fn atom_ids_sorted_regardless_of_insertion() {
        let mol = MoleculeGraph::from_parts(
            [Atom::new(9, "C"), Atom::new(2, "H"), Atom::new(5, "H")],
            [(9, 2), (9, 5)],
        )
        .unwrap();
        assert_eq!(mol.atom_ids(), vec![AtomId(2), AtomId(5), AtomId(9)]);
    }

    #[test]
    fn duplicate_atom_rejected() {
        let err = MoleculeGraph::from_parts(
            [Atom::new(1, "C"), Atom::new(1, "O")],
            Vec::<(u32, u32)>::new(),
        )
        .unwrap_err();
        assert_eq!(err, GraphError::DuplicateAtom(AtomId(1)));
    }

    #[test]
    fn bond_to_missing_atom_rejected() {
        let err = MoleculeGraph::from_parts([Atom::new(1, "C")], [(1, 2)]).unwrap_err();
        assert_eq!(
            err,
            GraphError::UnknownAtom {
                a: AtomId(1),
                b: AtomId(2),
                missing: AtomId(2)
            }
        );
    }

    #[test]
    fn self_loop_rejected() {
        let err = MoleculeGraph::from_parts([Atom::new(1, "C")], [(1, 1)]).unwrap_err();
        assert_eq!(err, GraphError::SelfLoop(AtomId(1)));
    }

    #[test]
    fn duplicate_bond_rejected_in_either_direction() {
        let err = MoleculeGraph::from_parts(
            [Atom::new(1, "C"), Atom::new(2, "O")],
            [(1, 2), (2, 1)],
        )
        .unwrap_err();
        assert_eq!(
            err,
            GraphError::DuplicateBond {
                a: AtomId(2),
                b: AtomId(1)
            }
        );
    }

    #[test]
    fn typed_bond_kept() {
        let mut mol = MoleculeGraph::new();
        mol.add_atom(Atom::new(1, "C")).unwrap();
        mol.add_atom(Atom::new(2, "N")).unwrap();
        mol.add_bond(AtomId(1), AtomId(2), Bond::typed(4)).unwrap();
        assert_eq!(mol.bond(AtomId(2), AtomId(1)).unwrap().bond_type, Some(4));
    }
}
