use std::collections::{HashMap, HashSet};

use super::model::{EntityKind, NodeKey, RelationGraph};

/// Display-side view settings: which entity kinds are shown and the minimum
/// number of connections a node needs to stay visible.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphFilter {
    enabled: [bool; 4],
    pub min_connections: usize,
}

impl Default for GraphFilter {
    fn default() -> Self {
        Self {
            enabled: [true; 4],
            min_connections: 0,
        }
    }
}

impl GraphFilter {
    pub fn is_enabled(&self, kind: EntityKind) -> bool {
        self.enabled[kind.index()]
    }

    pub fn set_enabled(&mut self, kind: EntityKind, enabled: bool) {
        self.enabled[kind.index()] = enabled;
    }

    pub fn is_neutral(&self) -> bool {
        self.enabled == [true; 4] && self.min_connections == 0
    }

    /// Derives the display graph: a node survives if its kind is enabled and
    /// its connection count meets the threshold, an edge survives if both
    /// endpoints do. Connection counts come from the unfiltered edge set, so
    /// toggling one kind off never changes which other nodes clear the
    /// threshold. Small graphs, full recompute per change.
    pub fn apply(&self, graph: &RelationGraph) -> RelationGraph {
        if self.is_neutral() {
            return graph.clone();
        }

        let counts = connection_counts(graph);
        let mut filtered = RelationGraph::default();
        let mut kept = HashSet::new();

        for node in &graph.nodes {
            let connections = counts.get(&node.key).copied().unwrap_or(0);
            if self.is_enabled(node.key.kind) && connections >= self.min_connections {
                kept.insert(node.key.clone());
                filtered.nodes.push(node.clone());
            }
        }

        for edge in &graph.edges {
            if kept.contains(&edge.from) && kept.contains(&edge.to) {
                filtered.edges.push(edge.clone());
            }
        }

        filtered
    }
}

/// Edges touching each node, direction ignored.
pub fn connection_counts(graph: &RelationGraph) -> HashMap<NodeKey, usize> {
    let mut counts = HashMap::with_capacity(graph.nodes.len());
    for edge in &graph.edges {
        *counts.entry(edge.from.clone()).or_insert(0) += 1;
        *counts.entry(edge.to.clone()).or_insert(0) += 1;
    }
    counts
}
