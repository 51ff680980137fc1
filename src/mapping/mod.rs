//! The atom-mapping engine.
//!
//! [`map_templates`] computes a one-to-one correspondence between the
//! atoms of a pre-reaction and a post-reaction template. Anchors seed the
//! correspondence, equivalence classes restrict which atoms may stand in
//! for each other, and a backtracking search extends the seed outward
//! along bonds until every site atom of the smaller template has an image.
//!
//! ```
//! use bondmap::{map_templates, Atom, AnchorSpec, AtomId, EquivalenceClasses, MapperConfig, MoleculeGraph};
//!
//! let pre = MoleculeGraph::from_parts(
//!     [Atom::new(1, "C"), Atom::new(2, "O"), Atom::new(3, "H")],
//!     [(1, 2), (1, 3)],
//! ).unwrap();
//! let post = MoleculeGraph::from_parts(
//!     [Atom::new(11, "C"), Atom::new(12, "O"), Atom::new(13, "H")],
//!     [(11, 12), (11, 13)],
//! ).unwrap();
//!
//! let anchors = AnchorSpec::bonding(vec![AtomId(1)], vec![AtomId(11)]);
//! let outcome = map_templates(
//!     &pre,
//!     &post,
//!     &EquivalenceClasses::new(),
//!     &anchors,
//!     &MapperConfig::default(),
//! ).unwrap();
//!
//! assert_eq!(outcome.mapping.get(AtomId(2)), Some(AtomId(12)));
//! assert_eq!(outcome.mapping.get(AtomId(3)), Some(AtomId(13)));
//! assert!(outcome.warnings.is_empty());
//! ```

mod ambiguity;
mod config;
mod error;
mod order;
mod search;
mod verify;

use std::collections::BTreeMap;
use std::fmt;

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

use crate::anchor::{AnchorSpec, Side};
use crate::atom::AtomId;
use crate::equivalence::{ClassId, ClassInterner, EquivalenceClasses, EquivalenceError};
use crate::graph_ops::{connected_components, neighborhood};
use crate::mol::MoleculeGraph;

pub use config::{ConfigError, MapperConfig};
pub use error::{ErrorKind, MappingError};
pub use search::SearchStats;
pub use verify::{verify_mapping, Violation};

use order::{search_order, Step};
use search::{Failure, Problem, Search};

/// A `pre id -> post id` correspondence, injective by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mapping {
    pairs: BTreeMap<AtomId, AtomId>,
}

impl Mapping {
    fn from_images(problem: &Problem<'_>, images: &[Option<NodeIndex>]) -> Self {
        let pairs = images
            .iter()
            .enumerate()
            .filter_map(|(i, image)| image.map(|t| problem.pair_ids(NodeIndex::new(i), t)))
            .collect();
        Self { pairs }
    }

    /// Image of a pre atom.
    pub fn get(&self, pre: AtomId) -> Option<AtomId> {
        self.pairs.get(&pre).copied()
    }

    /// Pre atom whose image is `post`.
    pub fn pre_for(&self, post: AtomId) -> Option<AtomId> {
        self.pairs
            .iter()
            .find(|(_, &q)| q == post)
            .map(|(&p, _)| p)
    }

    /// Pairs in ascending pre id order.
    pub fn iter(&self) -> impl Iterator<Item = (AtomId, AtomId)> + '_ {
        self.pairs.iter().map(|(&p, &q)| (p, q))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn to_pairs(&self) -> Vec<(AtomId, AtomId)> {
        self.iter().collect()
    }
}

impl FromIterator<(AtomId, AtomId)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (AtomId, AtomId)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

/// Non-fatal findings returned next to a mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapWarning {
    /// A second complete mapping exists that is not a symmetric relabeling
    /// of the returned one. `atoms` are the pre atoms whose pairing differs
    /// beyond symmetry and `alternative` gives their pairs in the other
    /// mapping.
    AmbiguousMapping {
        atoms: Vec<AtomId>,
        alternative: Vec<(AtomId, AtomId)>,
    },
}

impl fmt::Display for MapWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AmbiguousMapping { alternative, .. } => {
                write!(f, "ambiguous mapping: an alternative assigns ")?;
                for (i, (p, q)) in alternative.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p} -> {q}")?;
                }
                Ok(())
            }
        }
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapOutcome {
    pub mapping: Mapping,
    pub warnings: Vec<MapWarning>,
    pub stats: SearchStats,
}

impl MapOutcome {
    pub fn is_ambiguous(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, MapWarning::AmbiguousMapping { .. }))
    }
}

/// Map the reaction site of the smaller template onto distinct atoms of
/// the other one.
///
/// Normally every pre site atom gets a post image. When the post site is
/// strictly smaller, the search runs from post to pre instead, so every
/// post site atom is covered and the surplus pre atoms stay unmapped; the
/// returned [`Mapping`] is still keyed by pre id.
///
/// Input problems (bad anchors, anchors joining non-equivalent types) are
/// reported before any search runs. The first mapping found in ascending
/// candidate id order is returned, so identical inputs always give the
/// same mapping.
pub fn map_templates(
    pre: &MoleculeGraph,
    post: &MoleculeGraph,
    classes: &EquivalenceClasses,
    anchors: &AnchorSpec,
    config: &MapperConfig,
) -> Result<MapOutcome, MappingError> {
    let anchors = anchors.resolve(pre, post)?;

    let mut interner = ClassInterner::new(classes);
    let pre_class = interner.classify_graph(pre);
    let post_class = interner.classify_graph(post);

    let mut seeds = Vec::with_capacity(anchors.len());
    for pair in anchors.pairs() {
        // resolve() has checked both ids against the templates
        let (Some(p), Some(q)) = (pre.node(pair.pre), post.node(pair.post)) else {
            continue;
        };
        if pre_class[p.index()] != post_class[q.index()] {
            return Err(MappingError::AnchorTypeMismatch {
                pre: pair.pre,
                post: pair.post,
                pre_type: pre.atom_at(p).element_type.clone(),
                post_type: post.atom_at(q).element_type.clone(),
            });
        }
        seeds.push((p, q));
    }

    let (pre_site, post_site) = if seeds.is_empty() {
        (vec![true; pre.atom_count()], vec![true; post.atom_count()])
    } else {
        let pre_seeds: Vec<NodeIndex> = seeds.iter().map(|&(p, _)| p).collect();
        let post_seeds: Vec<NodeIndex> = seeds.iter().map(|&(_, q)| q).collect();
        (
            neighborhood(pre, &pre_seeds, config.site_radius),
            neighborhood(post, &post_seeds, config.site_radius),
        )
    };

    let pre_size = pre_site.iter().filter(|&&s| s).count();
    let post_size = post_site.iter().filter(|&&s| s).count();
    log::debug!(
        "mapping {} pre atoms onto {} post atoms with {} anchors; site sizes {pre_size} / {post_size}",
        pre.atom_count(),
        post.atom_count(),
        seeds.len(),
    );
    let components = connected_components(pre).len();
    if components > 1 {
        log::debug!("pre template has {components} disconnected fragments");
    }

    let (source_side, seeds): (Side, Vec<(NodeIndex, NodeIndex)>) = if post_size < pre_size {
        log::debug!("post site is smaller; searching from post to pre");
        (Side::Post, seeds.iter().map(|&(p, q)| (q, p)).collect())
    } else {
        (Side::Pre, seeds)
    };
    let (source, target) = match source_side {
        Side::Pre => (pre, post),
        Side::Post => (post, pre),
    };
    let mut source_anchor = vec![false; source.atom_count()];
    for &(s, _) in &seeds {
        source_anchor[s.index()] = true;
    }
    let ((source_class, source_site), (target_class, target_site)) = match source_side {
        Side::Pre => ((pre_class, pre_site), (post_class, post_site)),
        Side::Post => ((post_class, post_site), (pre_class, pre_site)),
    };
    let problem = Problem {
        source,
        target,
        source_side,
        source_class,
        target_class,
        source_site,
        target_site,
        source_anchor,
        seeds,
        reverse_bond_check: config.reverse_bond_check,
    };

    check_census(&problem)?;

    let order = search_order(&problem);
    let mut search = Search::new(&problem, &order);
    let Some(images) = search.next_solution() else {
        return Err(no_valid_mapping(&problem, &order, search.deepest_failure()));
    };
    let stats = search.stats();
    let mapping = Mapping::from_images(&problem, &images);
    // verification walks pre bonds, which only the reverse check covers
    // when searching from post
    debug_assert!(
        (problem.source_side == Side::Post && !config.reverse_bond_check)
            || verify_mapping(&mapping, pre, post, &anchors, classes).is_empty()
    );

    let mut warnings = Vec::new();
    if config.detect_ambiguity {
        if let Some(warning) =
            ambiguity::probe(&problem, &order, &images, config.ambiguity_node_budget)
        {
            log::warn!("{warning}");
            warnings.push(warning);
        }
    }

    log::info!(
        "mapped {} atoms after {} search nodes ({} backtracks)",
        mapping.len(),
        stats.nodes,
        stats.backtracks
    );
    Ok(MapOutcome {
        mapping,
        warnings,
        stats,
    })
}

/// Fail before searching when some class has more unanchored source site
/// atoms than free target site atoms.
///
/// A class with no target atoms at all names its lowest-id source atom; a
/// class that is merely short names the highest-id source atom, the one
/// left over once the rest are placed, together with the target atoms
/// that class does offer.
fn check_census(problem: &Problem<'_>) -> Result<(), MappingError> {
    let mut target_seeded = vec![false; problem.target.atom_count()];
    for &(_, t) in &problem.seeds {
        target_seeded[t.index()] = true;
    }

    let mut need: BTreeMap<ClassId, Vec<NodeIndex>> = BTreeMap::new();
    for s in problem.source.nodes() {
        if problem.source_site[s.index()] && !problem.source_anchor[s.index()] {
            need.entry(problem.source_class[s.index()]).or_default().push(s);
        }
    }
    let mut supply: BTreeMap<ClassId, Vec<AtomId>> = BTreeMap::new();
    for t in problem.target.nodes() {
        if problem.target_site[t.index()] && !target_seeded[t.index()] {
            supply
                .entry(problem.target_class[t.index()])
                .or_default()
                .push(problem.target.id_at(t));
        }
    }

    let mut worst: Option<(AtomId, NodeIndex, Vec<AtomId>)> = None;
    for (class, atoms) in &need {
        let available = supply.get(class).map(Vec::as_slice).unwrap_or(&[]);
        if atoms.len() <= available.len() {
            continue;
        }
        let pick = if available.is_empty() {
            atoms.iter().min_by_key(|&&s| problem.source.id_at(s))
        } else {
            atoms.iter().max_by_key(|&&s| problem.source.id_at(s))
        };
        let Some(&s) = pick else { continue };
        let id = problem.source.id_at(s);
        if worst.as_ref().is_none_or(|(w, _, _)| id < *w) {
            let mut candidates = available.to_vec();
            candidates.sort();
            worst = Some((id, s, candidates));
        }
    }

    match worst {
        Some((atom, s, candidates)) => {
            log::debug!("class census failed at {} atom {atom}", problem.source_side);
            Err(MappingError::NoValidMapping {
                side: problem.source_side,
                atom,
                element_type: problem.source.atom_at(s).element_type.clone(),
                candidates,
            })
        }
        None => Ok(()),
    }
}

fn no_valid_mapping(
    problem: &Problem<'_>,
    order: &[Step],
    failure: Option<&Failure>,
) -> MappingError {
    // An exhausted search always opened a frame with nothing feasible, so
    // `failure` is only absent if the search never ran.
    let (s, candidates) = match failure {
        Some(f) => (f.atom, f.candidates.clone()),
        None => (
            order.first().map(|step| step.atom).unwrap_or_else(|| NodeIndex::new(0)),
            Vec::new(),
        ),
    };
    let atom = problem.source.atom_at(s);
    log::debug!("search exhausted at {} atom {}", problem.source_side, atom.id);
    MappingError::NoValidMapping {
        side: problem.source_side,
        atom: atom.id,
        element_type: atom.element_type.clone(),
        candidates,
    }
}

/// A self-contained mapping job: equivalences, anchors and configuration
/// in one serializable record.
///
/// ```
/// use bondmap::MapRequest;
///
/// let request: MapRequest = serde_json::from_str(r#"{
///     "equivalences": ["H", "H1"],
///     "bonding_pre": [1, 2],
///     "bonding_post": [11, 12],
///     "config": { "detect_ambiguity": false }
/// }"#).unwrap();
/// assert_eq!(request.anchors.bonding_pre.len(), 2);
/// assert!(!request.config.detect_ambiguity);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapRequest {
    /// Flat token list read as consecutive interchangeable pairs.
    #[serde(default)]
    pub equivalences: Vec<String>,
    /// Element symbol of each numeric atom type, starting at type 1.
    #[serde(default)]
    pub elements_by_type: Vec<String>,
    #[serde(flatten)]
    pub anchors: AnchorSpec,
    #[serde(default)]
    pub config: MapperConfig,
}

impl MapRequest {
    pub fn classes(&self) -> Result<EquivalenceClasses, EquivalenceError> {
        let mut classes = EquivalenceClasses::from_elements_by_type(&self.elements_by_type);
        classes.extend_pairs(&self.equivalences)?;
        Ok(classes)
    }

    pub fn run(&self, pre: &MoleculeGraph, post: &MoleculeGraph) -> Result<MapOutcome, MappingError> {
        let classes = self.classes()?;
        map_templates(pre, post, &classes, &self.anchors, &self.config)
    }
}
