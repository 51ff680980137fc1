use serde::{Deserialize, Serialize};

use crate::atom::AtomId;

/// Edge payload of a [`MoleculeGraph`](crate::MoleculeGraph).
///
/// The mapping engine only looks at connectivity; the force-field bond
/// type is carried along so readers and writers can round-trip it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bond {
    #[serde(default)]
    pub bond_type: Option<u32>,
}

impl Bond {
    pub fn typed(bond_type: u32) -> Self {
        Self {
            bond_type: Some(bond_type),
        }
    }
}

/// Unordered pair of atom ids, stored with the smaller id first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BondPair(AtomId, AtomId);

impl BondPair {
    pub fn new(a: AtomId, b: AtomId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    pub fn first(&self) -> AtomId {
        self.0
    }

    pub fn second(&self) -> AtomId {
        self.1
    }

    pub fn contains(&self, id: AtomId) -> bool {
        self.0 == id || self.1 == id
    }

    pub fn is_self_loop(&self) -> bool {
        self.0 == self.1
    }
}
