use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};

use crate::content::{NodeKey, build_kind_overview_graph, build_relationship_graph, connection_counts};
use crate::sim::Simulation;
use crate::util::stable_pair;

use super::super::render_utils::node_radius;
use super::super::{FitState, RenderEdge, RenderGraph, RenderNode, RootSelection, ViewModel};

impl ViewModel {
    /// Resolve, filter, and rebuild the render graph plus its simulation.
    /// Nodes that survive a rebuild keep their world positions so filter and
    /// depth tweaks nudge the layout instead of restarting it.
    pub(in crate::app) fn rebuild_render_graph(&mut self) {
        let resolved = match &self.root {
            RootSelection::Entity(key) => {
                build_relationship_graph(&self.store, key.kind, &key.id, self.depth)
            }
            RootSelection::AllOfKind(kind) => {
                build_kind_overview_graph(&self.store, *kind, self.depth)
            }
        };

        // Connection counts come from the unfiltered graph; they drive both
        // the threshold filter and node sizing.
        let counts = connection_counts(&resolved);
        let display = self.filter.apply(&resolved);

        let mut index_by_key = HashMap::with_capacity(display.nodes.len());
        for (index, node) in display.nodes.iter().enumerate() {
            index_by_key.insert(node.key.clone(), index);
        }

        let mut edges = Vec::with_capacity(display.edges.len());
        let mut neighbors = vec![Vec::new(); display.nodes.len()];
        let mut sim_edges = Vec::new();
        for edge in &display.edges {
            let (Some(&from), Some(&to)) =
                (index_by_key.get(&edge.from), index_by_key.get(&edge.to))
            else {
                continue;
            };
            if from != to {
                neighbors[from].push(to);
                neighbors[to].push(from);
                sim_edges.push((from.min(to), from.max(to)));
            }
            edges.push(RenderEdge {
                from,
                to,
                relation: edge.relation,
                label: edge.label.clone(),
            });
        }
        sim_edges.sort_unstable();
        sim_edges.dedup();

        let prior_positions = self
            .render
            .take()
            .map(|render| {
                let RenderGraph { nodes, sim, .. } = render;
                nodes
                    .into_iter()
                    .zip(sim.nodes().iter())
                    .map(|(node, sim_node)| (node.key, sim_node.pos))
                    .collect::<HashMap<NodeKey, Vec2>>()
            })
            .unwrap_or_default();

        let mut nodes = Vec::with_capacity(display.nodes.len());
        let mut seeds = Vec::with_capacity(display.nodes.len());
        for (index, graph_node) in display.nodes.iter().enumerate() {
            let connections = counts.get(&graph_node.key).copied().unwrap_or(0);
            let radius = node_radius(connections);
            let label = self
                .store
                .get(graph_node.key.kind, &graph_node.key.id)
                .map(|entity| entity.title_short.clone())
                .unwrap_or_else(|| graph_node.key.id.clone());

            let seed = prior_positions
                .get(&graph_node.key)
                .copied()
                .unwrap_or_else(|| seed_position(&graph_node.key, index, graph_node.level));

            nodes.push(RenderNode {
                key: graph_node.key.clone(),
                label,
                level: graph_node.level,
                connections,
            });
            seeds.push((Some(seed), radius));
        }

        let sim = Simulation::new(seeds, sim_edges, self.sim_config);
        self.render = Some(RenderGraph {
            nodes,
            edges,
            index_by_key,
            neighbors,
            sim,
        });
        // Node indices from before the rebuild are meaningless now; drop any
        // in-flight drag or pan instead of pinning an arbitrary node.
        self.gesture.reset();
        self.fit = FitState::Pending;
        self.graph_dirty = false;
    }
}

/// Deterministic starting spot: a ring per discovery level, direction hashed
/// from the composite id so rebuilds land nodes in the same place.
fn seed_position(key: &NodeKey, index: usize, level: usize) -> Vec2 {
    let (jx, jy) = stable_pair(&key.to_string());
    let mut direction = vec2(jx, jy);
    if direction.length_sq() <= 0.0001 {
        let angle = ((index as f32) * 0.618_034 + 0.11) * std::f32::consts::TAU;
        direction = vec2(angle.cos(), angle.sin());
    } else {
        direction = direction.normalized();
    }

    direction * (30.0 + level as f32 * 120.0)
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use crate::app::LoadedContent;
    use crate::app::graph::interaction::{GestureEffect, GestureEvent};
    use crate::content::model::{
        Entity, EntityDetails, ExerciseDetails, MuscleDetails, RelatedIds,
    };
    use crate::content::{EntityStore, build_link_index};

    use super::ViewModel;

    fn model() -> ViewModel {
        let mut store = EntityStore::default();
        store.insert(Entity {
            id: "gluteus".to_owned(),
            title: "Gluteus Maximus".to_owned(),
            title_short: "Gluteus".to_owned(),
            tags: Vec::new(),
            details: EntityDetails::Muscle(MuscleDetails::default()),
            related: RelatedIds::default(),
        });
        store.insert(Entity {
            id: "squats".to_owned(),
            title: "Squats".to_owned(),
            title_short: "Squats".to_owned(),
            tags: Vec::new(),
            details: EntityDetails::Exercise(ExerciseDetails {
                primary_muscles: vec!["gluteus".to_owned()],
                ..Default::default()
            }),
            related: RelatedIds::default(),
        });
        let warnings = build_link_index(&mut store);
        ViewModel::new(LoadedContent { store, warnings })
    }

    #[test]
    fn rebuild_drops_in_flight_gesture() {
        let mut model = model();
        model.rebuild_render_graph();

        let press = model.gesture.handle(GestureEvent::Press {
            pos: pos2(50.0, 50.0),
            node: Some(0),
        });
        assert_eq!(
            press,
            vec![GestureEffect::BeginDrag {
                node: 0,
                pos: pos2(50.0, 50.0)
            }]
        );

        // A rebuild mid-drag (depth or filter changed via the keyboard)
        // invalidates the dragged index.
        model.graph_dirty = true;
        model.rebuild_render_graph();

        let effects = model.gesture.handle(GestureEvent::Move {
            pos: pos2(80.0, 80.0),
        });
        assert!(effects.is_empty(), "stale drag survived rebuild: {effects:?}");
    }
}
