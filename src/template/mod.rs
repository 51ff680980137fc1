//! Reader for LAMMPS molecule templates as produced by partial-molecule
//! extraction.
//!
//! Besides the standard `Coords`, `Types` and `Bonds` sections, extracted
//! templates carry their reaction metadata in header comments:
//!
//! ```text
//! # Bonding_Atoms 3 7
//! # Edge_Atoms 1 9
//! # Delete_Atoms 12
//! ```
//!
//! The first line is the title unless it is already one of these comments,
//! as in files written straight out of the extractor.

pub mod error;
mod parser;

pub use error::TemplateError;
pub use parser::parse_molecule_template;

use crate::atom::AtomId;
use crate::mol::MoleculeGraph;

#[derive(Debug, Clone)]
pub struct MoleculeTemplate {
    pub title: String,
    pub graph: MoleculeGraph,
    pub bonding_atoms: Vec<AtomId>,
    pub edge_atoms: Vec<AtomId>,
    pub delete_atoms: Vec<AtomId>,
}

impl MoleculeTemplate {
    pub fn graph(&self) -> &MoleculeGraph {
        &self.graph
    }
}
