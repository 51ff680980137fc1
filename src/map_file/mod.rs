//! Serialization of finished mappings.
//!
//! A [`MapFile`] gathers what the downstream reactive-MD engine needs: the
//! initiator (bonding) atoms, optional edge and delete atoms, and the full
//! `pre -> post` correspondence. [`MapEmitter`] implementations decide the
//! textual layout; [`LammpsMapWriter`] produces the map file read by the
//! `bond/react` fix.

mod writer;

pub use writer::LammpsMapWriter;

use serde::{Deserialize, Serialize};

use crate::anchor::AnchorSet;
use crate::atom::AtomId;
use crate::mapping::Mapping;
use crate::template::MoleculeTemplate;

/// Everything a map file records, with ids from the pre template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapFile {
    pub comment: String,
    pub initiators: Vec<AtomId>,
    pub edge_ids: Vec<AtomId>,
    pub delete_ids: Vec<AtomId>,
    /// `(pre, post)` pairs in ascending pre id order.
    pub equivalences: Vec<(AtomId, AtomId)>,
}

impl MapFile {
    pub fn new(mapping: &Mapping, anchors: &AnchorSet) -> Self {
        Self {
            comment: "map file generated by bondmap".to_string(),
            initiators: anchors.bonding().map(|pair| pair.pre).collect(),
            edge_ids: Vec::new(),
            delete_ids: Vec::new(),
            equivalences: mapping.to_pairs(),
        }
    }

    /// Take edge and delete atoms from the pre template's header comments.
    pub fn for_template(mapping: &Mapping, anchors: &AnchorSet, pre: &MoleculeTemplate) -> Self {
        Self::new(mapping, anchors)
            .with_edge_ids(pre.edge_atoms.clone())
            .with_delete_ids(pre.delete_atoms.clone())
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_edge_ids(mut self, ids: Vec<AtomId>) -> Self {
        self.edge_ids = ids;
        self
    }

    pub fn with_delete_ids(mut self, ids: Vec<AtomId>) -> Self {
        self.delete_ids = ids;
        self
    }

    pub fn to_lammps_string(&self) -> String {
        self.to_string()
    }
}

/// A sink for finished map files.
pub trait MapEmitter {
    type Error;

    fn emit(&mut self, map: &MapFile) -> Result<(), Self::Error>;
}
