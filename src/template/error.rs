use thiserror::Error;

use crate::mol::GraphError;

/// Error returned when a LAMMPS molecule template cannot be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// A line could not be understood. `line` is 1-based.
    #[error("line {line}: {detail}")]
    Parse { line: usize, detail: String },

    /// A section the template needs is absent.
    #[error("missing {0} section")]
    MissingSection(&'static str),

    /// A section holds a different number of entries than the header
    /// declares.
    #[error("{section} section has {found} entries but the header declares {expected}")]
    CountMismatch {
        section: &'static str,
        expected: usize,
        found: usize,
    },

    /// The atoms and bonds do not form a valid molecule graph.
    #[error(transparent)]
    Graph(#[from] GraphError),
}
