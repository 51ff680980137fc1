use thiserror::Error;

use crate::anchor::{AnchorError, Side};
use crate::atom::AtomId;
use crate::equivalence::EquivalenceError;

/// Coarse classification of a [`MappingError`], for callers that branch
/// on the failure without caring about its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidEquivalenceSpec,
    DuplicateAnchor,
    UnknownAtom,
    AnchorCountMismatch,
    AnchorTypeMismatch,
    NoValidMapping,
}

/// Error returned by the mapping engine.
///
/// Input problems are detected before any search starts; only
/// [`NoValidMapping`](MappingError::NoValidMapping) comes out of the
/// search itself. No partial mapping accompanies an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error(transparent)]
    Equivalence(#[from] EquivalenceError),

    #[error(transparent)]
    Anchor(#[from] AnchorError),

    /// An anchor forces together two atoms of non-equivalent types.
    #[error(
        "anchor {pre} -> {post} pairs type {pre_type:?} with non-equivalent type {post_type:?}"
    )]
    AnchorTypeMismatch {
        pre: AtomId,
        post: AtomId,
        pre_type: String,
        post_type: String,
    },

    /// The search space is exhausted.
    ///
    /// `atom` is the atom at the deepest point the search reached that
    /// had no workable image, and `side` the template it belongs to: the
    /// pre template unless the post site was the smaller one.
    /// `candidates` are the atoms of the other template that were
    /// considered for it there (possibly none).
    #[error(
        "no valid mapping: {side} atom {atom} (type {element_type:?}) could not be placed; candidates: [{}]",
        join_ids(.candidates)
    )]
    NoValidMapping {
        side: Side,
        atom: AtomId,
        element_type: String,
        candidates: Vec<AtomId>,
    },
}

impl MappingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Equivalence(EquivalenceError::InvalidEquivalenceSpec { .. }) => {
                ErrorKind::InvalidEquivalenceSpec
            }
            Self::Anchor(AnchorError::DuplicateAnchor { .. }) => ErrorKind::DuplicateAnchor,
            Self::Anchor(AnchorError::UnknownAtom { .. }) => ErrorKind::UnknownAtom,
            Self::Anchor(AnchorError::AnchorCountMismatch { .. }) => ErrorKind::AnchorCountMismatch,
            Self::AnchorTypeMismatch { .. } => ErrorKind::AnchorTypeMismatch,
            Self::NoValidMapping { .. } => ErrorKind::NoValidMapping,
        }
    }
}

fn join_ids(ids: &[AtomId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
