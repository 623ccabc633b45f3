use crate::events::EventListener;
use crate::graph::DependencyGraph;
use crate::{Coordinates, Result};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// A requested artifact together with the transitive dependencies the caller
/// wants pruned from underneath it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Artifact {
    pub coordinates: Coordinates,
    pub exclusions: BTreeSet<Coordinates>,
}

impl Artifact {
    pub fn new(coordinates: Coordinates) -> Self {
        Artifact {
            coordinates,
            exclusions: BTreeSet::new(),
        }
    }

    pub fn with_exclusions(coordinates: Coordinates, exclusions: BTreeSet<Coordinates>) -> Self {
        Artifact {
            coordinates,
            exclusions,
        }
    }
}

/// Everything a resolution backend needs to produce a graph: the ordered
/// repository list (order encodes priority), the requested dependencies, any
/// BOMs to import, and exclusions applied across the whole resolution.
#[derive(Clone, Debug, Default)]
pub struct ResolutionRequest {
    pub repositories: Vec<String>,
    pub dependencies: Vec<Artifact>,
    pub boms: Vec<Artifact>,
    pub global_exclusions: Vec<Coordinates>,
    pub user_home: Option<PathBuf>,
}

impl ResolutionRequest {
    pub fn new() -> Self {
        ResolutionRequest::default()
    }

    pub fn add_repository(mut self, url: &str) -> Self {
        self.repositories.push(crate::repository::normalize_repository(url));
        self
    }

    pub fn add_dependency(mut self, artifact: Artifact) -> Self {
        self.dependencies.push(artifact);
        self
    }

    pub fn add_bom(mut self, bom: Artifact) -> Self {
        self.boms.push(bom);
        self
    }

    pub fn exclude(mut self, coordinates: Coordinates) -> Self {
        self.global_exclusions.push(coordinates);
        self
    }

    pub fn user_home(mut self, path: PathBuf) -> Self {
        self.user_home = Some(path);
        self
    }
}

/// Records that `loser`'s requested version was overridden by `winner`.
/// Informational only; the graph already reflects the winning versions.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct Conflict {
    pub winner: Coordinates,
    pub loser: Coordinates,
}

#[derive(Clone, Debug, Default)]
pub struct ResolutionResult {
    pub graph: DependencyGraph,
    pub conflicts: BTreeSet<Conflict>,
}

impl ResolutionResult {
    pub fn new(graph: DependencyGraph, conflicts: BTreeSet<Conflict>) -> Self {
        ResolutionResult { graph, conflicts }
    }
}

/// One resolution backend. Implementations drive an external engine (a
/// separate process, or a build tool reached over its tooling API) and are
/// free to fail with any unrecoverable error; the core never retries.
pub trait Resolver {
    fn name(&self) -> &'static str;

    fn resolve(
        &self,
        request: &ResolutionRequest,
        listener: &dyn EventListener,
    ) -> Result<ResolutionResult>;
}
