use crate::Coordinates;
use std::collections::{BTreeSet, HashMap};

/// Directed "depends on" graph over coordinates. Nodes live in an arena and
/// are addressed by index, so coordinate equality is the only identity notion
/// in play. Self-loops and cycles are permitted; backend output is not a DAG.
#[derive(Clone, Debug, Default)]
pub struct DependencyGraph {
    nodes: Vec<Coordinates>,
    indices: HashMap<Coordinates, usize>,
    edges: Vec<BTreeSet<usize>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        DependencyGraph::default()
    }

    pub fn add_node(&mut self, coordinates: &Coordinates) -> usize {
        if let Some(index) = self.indices.get(coordinates) {
            return *index;
        }

        let index = self.nodes.len();
        self.nodes.push(coordinates.clone());
        self.indices.insert(coordinates.clone(), index);
        self.edges.push(BTreeSet::new());

        index
    }

    /// Adds an edge from a dependent artifact to one of its direct
    /// dependencies, interning both endpoints.
    pub fn add_edge(&mut self, from: &Coordinates, to: &Coordinates) {
        let from = self.add_node(from);
        let to = self.add_node(to);
        self.edges[from].insert(to);
    }

    pub fn contains(&self, coordinates: &Coordinates) -> bool {
        self.indices.contains_key(coordinates)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Coordinates> {
        self.nodes.iter()
    }

    pub fn successors(&self, coordinates: &Coordinates) -> impl Iterator<Item = &Coordinates> {
        self.indices
            .get(coordinates)
            .into_iter()
            .flat_map(|index| self.edges[*index].iter())
            .map(|index| &self.nodes[*index])
    }
}
