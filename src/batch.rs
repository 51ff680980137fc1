//! Mapping many reaction pairs at once.
//!
//! Each pair's search is independent and reads only its own inputs, so
//! jobs run on the rayon thread pool and results are collected in input
//! order.

use rayon::prelude::*;

use crate::mapping::{MapOutcome, MapRequest, MappingError};
use crate::mol::MoleculeGraph;

/// One pre/post template pair together with how to map it.
#[derive(Debug, Clone)]
pub struct ReactionJob {
    pub name: String,
    pub pre: MoleculeGraph,
    pub post: MoleculeGraph,
    pub request: MapRequest,
}

impl ReactionJob {
    pub fn new(
        name: impl Into<String>,
        pre: MoleculeGraph,
        post: MoleculeGraph,
        request: MapRequest,
    ) -> Self {
        Self {
            name: name.into(),
            pre,
            post,
            request,
        }
    }

    pub fn run(&self) -> Result<MapOutcome, MappingError> {
        log::debug!("mapping reaction {}", self.name);
        self.request.run(&self.pre, &self.post)
    }
}

pub fn map_batch(jobs: &[ReactionJob]) -> Vec<Result<MapOutcome, MappingError>> {
    let results: Vec<_> = jobs.par_iter().map(ReactionJob::run).collect();
    let failed = results.iter().filter(|r| r.is_err()).count();
    if failed > 0 {
        log::warn!("{failed} of {} reactions could not be mapped", jobs.len());
    }
    results
}
