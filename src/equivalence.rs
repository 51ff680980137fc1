//! Interchangeable atom types.
//!
//! Users declare which element or force-field type tokens may stand in for
//! each other while matching. The declarations are a flat token list read
//! as consecutive pairs; the relation they describe is closed under
//! transitivity with a disjoint-set forest, so `H~H1` and `H1~H2` put all
//! three tokens in one class. Tokens never mentioned form their own class.
//!
//! Before searching, every atom of both templates is reduced to a
//! [`ClassId`] once by a [`ClassInterner`], so the engine compares small
//! integers instead of re-deriving class membership per comparison.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;
use thiserror::Error;

use crate::mol::MoleculeGraph;
use crate::traits::HasElementType;

/// Error returned when an equivalency declaration is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EquivalenceError {
    /// The token list has odd length, leaving the last token unpaired.
    #[error("equivalency list has odd length {len}: token {dangling:?} has no partner")]
    InvalidEquivalenceSpec { len: usize, dangling: String },
}

/// Partition of type tokens into interchangeable classes.
///
/// # Examples
///
/// ```
/// use bondmap::EquivalenceClasses;
///
/// let classes = EquivalenceClasses::from_pairs(&["H", "H1", "H1", "H2", "C", "C"]).unwrap();
/// assert!(classes.are_equivalent("H", "H2"));
/// assert!(!classes.are_equivalent("H", "C"));
/// assert!(classes.are_equivalent("N", "N"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EquivalenceClasses {
    slots: HashMap<String, usize>,
    names: Vec<String>,
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl EquivalenceClasses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `tokens` as pairs `(t1, t2), (t3, t4), ...`.
    pub fn from_pairs<S: AsRef<str>>(tokens: &[S]) -> Result<Self, EquivalenceError> {
        let mut classes = Self::new();
        classes.extend_pairs(tokens)?;
        Ok(classes)
    }

    /// Build classes from an element table indexed by numeric type.
    ///
    /// `elements[i]` is the element of force-field type `i + 1`. Each type
    /// token is united with its element symbol, so every type sharing an
    /// element lands in the same class as the bare symbol.
    ///
    /// ```
    /// use bondmap::EquivalenceClasses;
    ///
    /// let classes = EquivalenceClasses::from_elements_by_type(&["H", "H", "C", "O"]);
    /// assert!(classes.are_equivalent("1", "2"));
    /// assert!(classes.are_equivalent("2", "H"));
    /// assert!(!classes.are_equivalent("3", "4"));
    /// ```
    pub fn from_elements_by_type<S: AsRef<str>>(elements: &[S]) -> Self {
        let mut classes = Self::new();
        for (i, element) in elements.iter().enumerate() {
            let type_token = (i + 1).to_string();
            classes.union(&type_token, element.as_ref());
        }
        classes
    }

    /// Merge more pair declarations into the existing classes.
    ///
    /// On error nothing is merged.
    pub fn extend_pairs<S: AsRef<str>>(&mut self, tokens: &[S]) -> Result<(), EquivalenceError> {
        if tokens.len() % 2 != 0 {
            let dangling = tokens
                .last()
                .map(|t| t.as_ref().to_string())
                .unwrap_or_default();
            return Err(EquivalenceError::InvalidEquivalenceSpec {
                len: tokens.len(),
                dangling,
            });
        }
        for pair in tokens.chunks_exact(2) {
            self.union(pair[0].as_ref(), pair[1].as_ref());
        }
        Ok(())
    }

    fn slot(&mut self, token: &str) -> usize {
        if let Some(&slot) = self.slots.get(token) {
            return slot;
        }
        let slot = self.names.len();
        self.slots.insert(token.to_string(), slot);
        self.names.push(token.to_string());
        self.parent.push(slot);
        self.rank.push(0);
        slot
    }

    fn find(&self, mut slot: usize) -> usize {
        while self.parent[slot] != slot {
            slot = self.parent[slot];
        }
        slot
    }

    fn union(&mut self, a: &str, b: &str) {
        let sa = self.slot(a);
        let sb = self.slot(b);
        let (ra, rb) = (self.find(sa), self.find(sb));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }

    /// Whether `token` appears in any declaration.
    pub fn is_declared(&self, token: &str) -> bool {
        self.slots.contains_key(token)
    }

    pub fn are_equivalent(&self, a: &str, b: &str) -> bool {
        if a == b {
            return true;
        }
        match (self.slots.get(a), self.slots.get(b)) {
            (Some(&sa), Some(&sb)) => self.find(sa) == self.find(sb),
            _ => false,
        }
    }

    /// Name standing for the whole class of `token`.
    ///
    /// Undeclared tokens represent themselves.
    pub fn representative<'a>(&'a self, token: &'a str) -> &'a str {
        match self.slots.get(token) {
            Some(&slot) => &self.names[self.find(slot)],
            None => token,
        }
    }

    /// Declared classes, each sorted, ordered by their smallest token.
    pub fn classes(&self) -> Vec<Vec<String>> {
        let mut by_root: HashMap<usize, Vec<String>> = HashMap::new();
        for (slot, name) in self.names.iter().enumerate() {
            by_root
                .entry(self.find(slot))
                .or_default()
                .push(name.clone());
        }
        let mut classes: Vec<Vec<String>> = by_root.into_values().collect();
        for class in &mut classes {
            class.sort();
        }
        classes.sort();
        classes
    }
}

/// Integer tag of an equivalence class, valid within one [`ClassInterner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassId(pub u32);

/// Assigns [`ClassId`]s to atoms so that equivalent atoms share an id.
///
/// Ids are handed out in first-seen order; classify the pre template
/// before the post template to get reproducible ids.
pub struct ClassInterner<'a> {
    classes: &'a EquivalenceClasses,
    ids: HashMap<String, ClassId>,
}

impl<'a> ClassInterner<'a> {
    pub fn new(classes: &'a EquivalenceClasses) -> Self {
        Self {
            classes,
            ids: HashMap::new(),
        }
    }

    pub fn classify<A: HasElementType>(&mut self, atom: &A) -> ClassId {
        let classes = self.classes;
        let key = classes.representative(atom.element_type());
        if let Some(&id) = self.ids.get(key) {
            return id;
        }
        let id = ClassId(self.ids.len() as u32);
        self.ids.insert(key.to_string(), id);
        id
    }

    /// Class of every atom, indexed by node index.
    pub fn classify_graph(&mut self, mol: &MoleculeGraph) -> Vec<ClassId> {
        mol.nodes()
            .map(|idx: NodeIndex| self.classify(mol.atom_at(idx)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;

    #[test]
    fn pairs_are_transitively_closed() {
        let classes = EquivalenceClasses::from_pairs(&["A", "B", "B", "C", "X", "Y"]).unwrap();
        assert!(classes.are_equivalent("A", "C"));
        assert!(classes.are_equivalent("C", "A"));
        assert!(classes.are_equivalent("X", "Y"));
        assert!(!classes.are_equivalent("A", "X"));
    }

    #[test]
    fn odd_length_rejected() {
        let err = EquivalenceClasses::from_pairs(&["H", "H", "C"]).unwrap_err();
        assert_eq!(
            err,
            EquivalenceError::InvalidEquivalenceSpec {
                len: 3,
                dangling: "C".to_string()
            }
        );
    }

    #[test]
    fn empty_list_is_valid() {
        let classes = EquivalenceClasses::from_pairs::<&str>(&[]).unwrap();
        assert!(classes.classes().is_empty());
        assert!(classes.are_equivalent("O", "O"));
        assert!(!classes.are_equivalent("O", "N"));
    }

    #[test]
    fn undeclared_token_is_singleton() {
        let classes = EquivalenceClasses::from_pairs(&["H", "H"]).unwrap();
        assert!(!classes.is_declared("N"));
        assert_eq!(classes.representative("N"), "N");
        assert!(!classes.are_equivalent("N", "H"));
    }

    #[test]
    fn failed_extend_leaves_classes_untouched() {
        let mut classes = EquivalenceClasses::from_pairs(&["C", "C1"]).unwrap();
        assert!(classes.extend_pairs(&["C1", "C2", "O"]).is_err());
        assert!(!classes.is_declared("C2"));
        assert!(!classes.is_declared("O"));
    }

    #[test]
    fn classes_partition_is_sorted() {
        let classes = EquivalenceClasses::from_pairs(&["O2", "O1", "H", "H3", "H3", "H2"]).unwrap();
        assert_eq!(
            classes.classes(),
            vec![
                vec!["H".to_string(), "H2".to_string(), "H3".to_string()],
                vec!["O1".to_string(), "O2".to_string()],
            ]
        );
    }

    #[test]
    fn element_table_merges_types() {
        let classes =
            EquivalenceClasses::from_elements_by_type(&["C", "N", "H", "H", "C", "O", "H"]);
        assert!(classes.are_equivalent("1", "5"));
        assert!(classes.are_equivalent("3", "7"));
        assert!(!classes.are_equivalent("2", "6"));
        assert_eq!(classes.classes().len(), 4);
    }

    #[test]
    fn element_table_and_pairs_combine() {
        let mut classes = EquivalenceClasses::from_elements_by_type(&["H", "C"]);
        classes.extend_pairs(&["C", "C_R"]).unwrap();
        assert!(classes.are_equivalent("2", "C_R"));
    }

    #[test]
    fn interner_shares_ids_across_templates() {
        let classes = EquivalenceClasses::from_pairs(&["H", "Ha"]).unwrap();
        let mut interner = ClassInterner::new(&classes);
        let h = interner.classify(&Atom::new(1, "H"));
        let c = interner.classify(&Atom::new(2, "C"));
        let ha = interner.classify(&Atom::new(7, "Ha"));
        let c_again = interner.classify(&Atom::new(9, "C"));
        assert_eq!(h, ha);
        assert_eq!(c, c_again);
        assert_ne!(h, c);
    }

    #[test]
    fn interner_classifies_graph_by_node() {
        let classes = EquivalenceClasses::new();
        let mol = MoleculeGraph::from_parts(
            [Atom::new(4, "O"), Atom::new(2, "H"), Atom::new(3, "H")],
            [(4, 2), (4, 3)],
        )
        .unwrap();
        let mut interner = ClassInterner::new(&classes);
        let ids = interner.classify_graph(&mol);
        assert_eq!(ids, vec![ClassId(0), ClassId(1), ClassId(1)]);
    }
}
