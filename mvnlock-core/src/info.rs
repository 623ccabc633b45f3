use crate::graph::DependencyGraph;
use crate::resolve::ResolutionResult;
use crate::Coordinates;
use std::collections::{BTreeMap, BTreeSet, HashSet};

const JAVADOC: &str = "javadoc";
const SOURCES: &str = "sources";

/// What the surrounding system knows about one resolved node's physical
/// output: the checksum and path of the downloaded file (absent for
/// metadata-only nodes) and the Java packages the artifact contains.
#[derive(Clone, Debug, Default)]
pub struct ArtifactData {
    pub sha256: Option<String>,
    pub file: Option<String>,
    pub packages: BTreeSet<String>,
}

/// One artifact as it appears in the lock file: coordinates, checksums for
/// the artifact itself and its javadoc/sources companions, direct
/// dependencies, and contained packages. Created once per resolved artifact
/// and never mutated afterwards.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct DependencyInfo {
    pub coordinates: Coordinates,
    pub sha256: Option<String>,
    pub javadoc_sha256: Option<String>,
    pub source_sha256: Option<String>,
    pub dependencies: BTreeSet<Coordinates>,
    pub packages: BTreeSet<String>,
}

impl DependencyInfo {
    pub fn new(coordinates: Coordinates, sha256: &str) -> Self {
        DependencyInfo {
            coordinates,
            sha256: Some(sha256.to_string()),
            javadoc_sha256: None,
            source_sha256: None,
            dependencies: BTreeSet::new(),
            packages: BTreeSet::new(),
        }
    }
}

/// Folds a resolution result into the canonical per-artifact records the
/// renderers consume, plus the set of skipped coordinates.
///
/// Skip nodes (no data, no checksum, or no file) produce no record but their
/// outgoing edges survive: a dependent of a skip node sees the union of the
/// skip node's own dependencies, flattened until no skip node remains
/// reachable. Javadoc and sources classifier nodes contribute only their
/// checksum, merged into the main artifact's record.
pub fn assemble(
    result: &ResolutionResult,
    data: &BTreeMap<Coordinates, ArtifactData>,
) -> (BTreeSet<DependencyInfo>, BTreeSet<String>) {
    let graph = &result.graph;
    let is_skip = |coordinates: &Coordinates| match data.get(coordinates) {
        Some(data) => data.sha256.is_none() || data.file.as_deref().unwrap_or("").is_empty(),
        None => true,
    };

    let mut infos: Vec<DependencyInfo> = Vec::new();
    let mut skipped = BTreeSet::new();
    let mut companions: BTreeMap<Coordinates, (Option<String>, Option<String>)> = BTreeMap::new();

    for coordinates in graph.nodes() {
        if is_skip(coordinates) {
            skipped.insert(coordinates.to_string());
            continue;
        }

        let node = &data[coordinates];

        match coordinates.classifier() {
            JAVADOC | SOURCES => {
                // Checksum only; these add no graph-traversal value.
                let owner = coordinates.set_classifier("");
                let entry = companions.entry(owner).or_default();
                if coordinates.classifier() == JAVADOC {
                    entry.0 = node.sha256.clone();
                } else {
                    entry.1 = node.sha256.clone();
                }
            }
            _ => {
                infos.push(DependencyInfo {
                    coordinates: coordinates.clone(),
                    sha256: node.sha256.clone(),
                    javadoc_sha256: None,
                    source_sha256: None,
                    dependencies: expand_dependencies(graph, coordinates, &is_skip),
                    packages: node.packages.clone(),
                });
            }
        }
    }

    let mut out = BTreeSet::new();
    for mut info in infos {
        if let Some((javadoc, sources)) = companions.get(&info.coordinates.set_classifier("")) {
            if info.coordinates.classifier().is_empty() {
                info.javadoc_sha256 = javadoc.clone();
                info.source_sha256 = sources.clone();
            }
        }
        out.insert(info);
    }

    (out, skipped)
}

/// Direct dependencies of `from`, with skip nodes replaced by their own
/// successors until none remain. The visited set keeps multi-level skip
/// chains and cycles from looping.
fn expand_dependencies<F>(
    graph: &DependencyGraph,
    from: &Coordinates,
    is_skip: &F,
) -> BTreeSet<Coordinates>
where
    F: Fn(&Coordinates) -> bool,
{
    let mut dependencies = BTreeSet::new();
    let mut stack: Vec<&Coordinates> = graph.successors(from).collect();
    let mut visited: HashSet<&Coordinates> = HashSet::new();

    while let Some(next) = stack.pop() {
        if !visited.insert(next) {
            continue;
        }
        if matches!(next.classifier(), JAVADOC | SOURCES) {
            continue;
        }
        if is_skip(next) {
            stack.extend(graph.successors(next));
        } else {
            dependencies.insert(next.clone());
        }
    }

    dependencies
}
