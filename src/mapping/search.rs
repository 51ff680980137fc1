//! Backtracking search over source -> target atom assignments.
//!
//! The search walks a precomputed [`Step`] order. Each depth owns a
//! [`Frame`] holding the candidates that were feasible when the frame was
//! opened; since deeper assignments are always undone before control
//! returns to a frame, that list stays valid for the frame's lifetime.
//! The current partial mapping is therefore fully described by the stack
//! of frames, and `image`/`preimage` are just O(1) views of it.

use petgraph::graph::NodeIndex;

use crate::anchor::Side;
use crate::atom::AtomId;
use crate::equivalence::ClassId;
use crate::mol::MoleculeGraph;

use super::order::Step;

/// Everything the search needs to know about one template pair.
///
/// The search places every site atom of `source` onto a distinct atom of
/// `target`. Which template plays which role is recorded in
/// `source_side`, so results can be turned back into `pre -> post` ids.
pub(super) struct Problem<'a> {
    pub source: &'a MoleculeGraph,
    pub target: &'a MoleculeGraph,
    pub source_side: Side,
    pub source_class: Vec<ClassId>,
    pub target_class: Vec<ClassId>,
    pub source_site: Vec<bool>,
    pub target_site: Vec<bool>,
    pub source_anchor: Vec<bool>,
    pub seeds: Vec<(NodeIndex, NodeIndex)>,
    pub reverse_bond_check: bool,
}

impl Problem<'_> {
    /// Bonds between two anchored atoms are the ones the reaction changes.
    pub fn is_exempt(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.source_anchor[a.index()] && self.source_anchor[b.index()]
    }

    /// The `(pre, post)` ids of a source node placed on a target node.
    pub fn pair_ids(&self, s: NodeIndex, t: NodeIndex) -> (AtomId, AtomId) {
        let (s, t) = (self.source.id_at(s), self.target.id_at(t));
        match self.source_side {
            Side::Pre => (s, t),
            Side::Post => (t, s),
        }
    }
}

/// Counters describing how much work a search did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Assignments tried.
    pub nodes: usize,
    /// Frames abandoned after running out of candidates.
    pub backtracks: usize,
}

/// Where the search got stuck deepest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Failure {
    pub depth: usize,
    pub atom: NodeIndex,
    pub candidates: Vec<AtomId>,
}

/// Which feasible candidates a frame keeps.
#[derive(Clone, Copy)]
pub(super) enum CandidateFilter<'r> {
    All,
    /// Keep only the first candidate of each symmetry rank.
    DistinctRanks(&'r [usize]),
}

struct Frame {
    atom: NodeIndex,
    candidates: Vec<NodeIndex>,
    next: usize,
    current: Option<NodeIndex>,
}

pub(super) struct Search<'s, 'a> {
    problem: &'s Problem<'a>,
    order: &'s [Step],
    filter: CandidateFilter<'s>,
    node_budget: Option<usize>,
    image: Vec<Option<NodeIndex>>,
    preimage: Vec<Option<NodeIndex>>,
    frames: Vec<Frame>,
    stats: SearchStats,
    deepest: Option<Failure>,
    started: bool,
    exhausted: bool,
    budget_hit: bool,
}

impl<'s, 'a> Search<'s, 'a> {
    pub fn new(problem: &'s Problem<'a>, order: &'s [Step]) -> Self {
        let mut image = vec![None; problem.source.atom_count()];
        let mut preimage = vec![None; problem.target.atom_count()];
        for &(p, q) in &problem.seeds {
            image[p.index()] = Some(q);
            preimage[q.index()] = Some(p);
        }
        Self {
            problem,
            order,
            filter: CandidateFilter::All,
            node_budget: None,
            image,
            preimage,
            frames: Vec::new(),
            stats: SearchStats::default(),
            deepest: None,
            started: false,
            exhausted: false,
            budget_hit: false,
        }
    }

    pub fn with_filter(mut self, filter: CandidateFilter<'s>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_node_budget(mut self, budget: usize) -> Self {
        self.node_budget = Some(budget);
        self
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    pub fn deepest_failure(&self) -> Option<&Failure> {
        self.deepest.as_ref()
    }

    pub fn budget_hit(&self) -> bool {
        self.budget_hit
    }

    /// Advance to the next complete assignment.
    ///
    /// Returns the image of every source node (`None` outside the site).
    /// Solutions come out in lexicographic order of the candidate lists,
    /// so the first one is the same on every run.
    pub fn next_solution(&mut self) -> Option<Vec<Option<NodeIndex>>> {
        if self.exhausted {
            return None;
        }
        if !self.started {
            self.started = true;
            if self.order.is_empty() {
                self.exhausted = true;
                return Some(self.image.clone());
            }
            self.open_frame(0);
        } else {
            self.unassign_top();
        }

        loop {
            let depth = self.frames.len() - 1;
            let frame = &mut self.frames[depth];
            if frame.next < frame.candidates.len() {
                let p = frame.atom;
                let q = frame.candidates[frame.next];
                frame.next += 1;
                frame.current = Some(q);
                self.image[p.index()] = Some(q);
                self.preimage[q.index()] = Some(p);
                self.stats.nodes += 1;

                if self.node_budget.is_some_and(|b| self.stats.nodes >= b) {
                    log::debug!("search stopped after {} nodes", self.stats.nodes);
                    self.budget_hit = true;
                    self.exhausted = true;
                    return None;
                }

                if depth + 1 == self.order.len() {
                    return Some(self.image.clone());
                }
                self.open_frame(depth + 1);
            } else {
                self.frames.pop();
                self.stats.backtracks += 1;
                if self.frames.is_empty() {
                    self.exhausted = true;
                    return None;
                }
                log::trace!("backtracking from depth {depth}");
                self.unassign_top();
            }
        }
    }

    fn unassign_top(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            if let Some(q) = frame.current.take() {
                self.image[frame.atom.index()] = None;
                self.preimage[q.index()] = None;
            }
        }
    }

    fn open_frame(&mut self, depth: usize) {
        let step = self.order[depth];
        let raw = self.raw_candidates(step);
        let mut feasible: Vec<NodeIndex> = raw
            .iter()
            .copied()
            .filter(|&q| self.is_feasible(step.atom, q))
            .collect();

        if let CandidateFilter::DistinctRanks(ranks) = self.filter {
            let mut seen = Vec::new();
            feasible.retain(|q| {
                let rank = ranks[q.index()];
                if seen.contains(&rank) {
                    false
                } else {
                    seen.push(rank);
                    true
                }
            });
        }

        if feasible.is_empty() && self.deepest.as_ref().is_none_or(|f| depth > f.depth) {
            self.deepest = Some(Failure {
                depth,
                atom: step.atom,
                candidates: raw.iter().map(|&q| self.problem.target.id_at(q)).collect(),
            });
        }

        self.frames.push(Frame {
            atom: step.atom,
            candidates: feasible,
            next: 0,
            current: None,
        });
    }

    /// Unused target atoms of the right class that could host `step.atom`,
    /// in ascending target id order.
    fn raw_candidates(&self, step: Step) -> Vec<NodeIndex> {
        let problem = self.problem;
        let class = problem.source_class[step.atom.index()];
        let usable = |q: &NodeIndex| {
            problem.target_site[q.index()]
                && self.preimage[q.index()].is_none()
                && problem.target_class[q.index()] == class
        };
        let mut candidates: Vec<NodeIndex> = match step.parent.and_then(|p| self.image[p.index()]) {
            Some(parent_image) => problem
                .target
                .neighbor_nodes(parent_image)
                .filter(usable)
                .collect(),
            None => problem.target.nodes().filter(usable).collect(),
        };
        candidates.sort_by_key(|&q| problem.target.id_at(q));
        candidates
    }

    fn is_feasible(&self, p: NodeIndex, q: NodeIndex) -> bool {
        let problem = self.problem;

        for n in problem.source.neighbor_nodes(p) {
            if let Some(m) = self.image[n.index()] {
                if !problem.is_exempt(p, n) && !problem.target.has_bond_at(q, m) {
                    return false;
                }
            }
        }

        if problem.reverse_bond_check {
            for m in problem.target.neighbor_nodes(q) {
                if let Some(n) = self.preimage[m.index()] {
                    if !problem.is_exempt(p, n) && !problem.source.has_bond_at(p, n) {
                        return false;
                    }
                }
            }
        }

        true
    }
}
