pub mod anchor;
pub mod atom;
pub mod batch;
pub mod bond;
pub mod equivalence;
pub mod graph_ops;
pub mod map_file;
pub mod mapping;
pub mod mol;
pub mod symmetry;
pub mod template;
pub mod traits;

pub use anchor::{AnchorError, AnchorKind, AnchorPair, AnchorSet, AnchorSpec, Side};
pub use atom::{Atom, AtomId};
pub use batch::{map_batch, ReactionJob};
pub use bond::{Bond, BondPair};
pub use equivalence::{ClassId, ClassInterner, EquivalenceClasses, EquivalenceError};
pub use map_file::{LammpsMapWriter, MapEmitter, MapFile};
pub use mapping::{
    map_templates, verify_mapping, ConfigError, ErrorKind, MapOutcome, MapRequest, MapWarning,
    MapperConfig, Mapping, MappingError, SearchStats, Violation,
};
pub use mol::{GraphError, MoleculeGraph};
pub use template::{parse_molecule_template, MoleculeTemplate, TemplateError};
pub use traits::HasElementType;
