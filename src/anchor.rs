use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::atom::AtomId;
use crate::mol::MoleculeGraph;

/// Which template an id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Pre,
    Post,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pre => write!(f, "pre"),
            Self::Post => write!(f, "post"),
        }
    }
}

/// Role of a forced correspondence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorKind {
    /// The atoms forming the new bond (initiators).
    Bonding,
    /// Extra user-pinned atoms near the reaction center.
    Secondary,
}

impl fmt::Display for AnchorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bonding => write!(f, "bonding"),
            Self::Secondary => write!(f, "secondary"),
        }
    }
}

/// A user-declared `pre -> post` correspondence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnchorPair {
    pub pre: AtomId,
    pub post: AtomId,
    pub kind: AnchorKind,
}

/// Error returned when anchor declarations are inconsistent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnchorError {
    #[error("{kind} anchor lists differ in length: {pre} pre ids vs {post} post ids")]
    AnchorCountMismatch {
        kind: AnchorKind,
        pre: usize,
        post: usize,
    },
    #[error("anchor atom {id} is not present in the {side} template")]
    UnknownAtom { side: Side, id: AtomId },
    #[error("atom {id} of the {side} template appears in more than one anchor pair")]
    DuplicateAnchor { side: Side, id: AtomId },
}

/// Raw anchor declarations as the user supplies them.
///
/// The lists are positional: `bonding_pre[i]` is forced onto
/// `bonding_post[i]`. [`AnchorSpec::resolve`] validates them against the
/// two templates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorSpec {
    pub bonding_pre: Vec<AtomId>,
    pub bonding_post: Vec<AtomId>,
    pub secondary_pre: Vec<AtomId>,
    pub secondary_post: Vec<AtomId>,
}

impl AnchorSpec {
    pub fn bonding(pre: impl Into<Vec<AtomId>>, post: impl Into<Vec<AtomId>>) -> Self {
        Self {
            bonding_pre: pre.into(),
            bonding_post: post.into(),
            ..Self::default()
        }
    }

    pub fn with_secondary(
        mut self,
        pre: impl Into<Vec<AtomId>>,
        post: impl Into<Vec<AtomId>>,
    ) -> Self {
        self.secondary_pre = pre.into();
        self.secondary_post = post.into();
        self
    }

    /// Validate the declarations and build an [`AnchorSet`].
    ///
    /// Checks run in a fixed order: list lengths, then membership in the
    /// templates, then uniqueness. The first violation is returned.
    pub fn resolve(
        &self,
        pre: &MoleculeGraph,
        post: &MoleculeGraph,
    ) -> Result<AnchorSet, AnchorError> {
        let groups = [
            (AnchorKind::Bonding, &self.bonding_pre, &self.bonding_post),
            (
                AnchorKind::Secondary,
                &self.secondary_pre,
                &self.secondary_post,
            ),
        ];

        for (kind, pre_ids, post_ids) in groups {
            if pre_ids.len() != post_ids.len() {
                return Err(AnchorError::AnchorCountMismatch {
                    kind,
                    pre: pre_ids.len(),
                    post: post_ids.len(),
                });
            }
        }

        let pairs: Vec<AnchorPair> = groups
            .iter()
            .flat_map(|&(kind, pre_ids, post_ids)| {
                pre_ids
                    .iter()
                    .zip(post_ids.iter())
                    .map(move |(&pre, &post)| AnchorPair { pre, post, kind })
            })
            .collect();

        for pair in &pairs {
            if !pre.contains(pair.pre) {
                return Err(AnchorError::UnknownAtom {
                    side: Side::Pre,
                    id: pair.pre,
                });
            }
            if !post.contains(pair.post) {
                return Err(AnchorError::UnknownAtom {
                    side: Side::Post,
                    id: pair.post,
                });
            }
        }

        let mut seen_pre = HashSet::new();
        let mut seen_post = HashSet::new();
        for pair in &pairs {
            if !seen_pre.insert(pair.pre) {
                return Err(AnchorError::DuplicateAnchor {
                    side: Side::Pre,
                    id: pair.pre,
                });
            }
            if !seen_post.insert(pair.post) {
                return Err(AnchorError::DuplicateAnchor {
                    side: Side::Post,
                    id: pair.post,
                });
            }
        }

        Ok(AnchorSet { pairs })
    }
}

/// Validated anchors: every id exists and is used at most once per side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnchorSet {
    pairs: Vec<AnchorPair>,
}

impl AnchorSet {
    pub fn pairs(&self) -> &[AnchorPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn bonding(&self) -> impl Iterator<Item = &AnchorPair> + '_ {
        self.pairs
            .iter()
            .filter(|p| p.kind == AnchorKind::Bonding)
    }

    pub fn secondary(&self) -> impl Iterator<Item = &AnchorPair> + '_ {
        self.pairs
            .iter()
            .filter(|p| p.kind == AnchorKind::Secondary)
    }

    pub fn post_for(&self, pre: AtomId) -> Option<AtomId> {
        self.pairs.iter().find(|p| p.pre == pre).map(|p| p.post)
    }

    pub fn is_pre_anchor(&self, id: AtomId) -> bool {
        self.pairs.iter().any(|p| p.pre == id)
    }

    pub fn is_post_anchor(&self, id: AtomId) -> bool {
        self.pairs.iter().any(|p| p.post == id)
    }
}
