use std::collections::HashSet;

use super::model::{
    EntityDetails, EntityKind, GraphEdge, GraphNode, NodeKey, RelationGraph, RelationKind,
};
use super::store::EntityStore;

/// One relationship discovered while expanding a node. `outward` orients the
/// stored edge: true means current -> other.
struct Discovery {
    other: NodeKey,
    relation: RelationKind,
    label: String,
    outward: bool,
}

/// Bounded breadth expansion from a root entity. Levels are tracked
/// explicitly: the frontier at `level - 1` is expanded with kind-specific
/// rules, newly seen entities join at the current level (first discovery
/// wins), and every discovered relationship is recorded as an edge even when
/// its target was already visited. An unknown root resolves to an empty
/// graph.
pub fn build_relationship_graph(
    store: &EntityStore,
    kind: EntityKind,
    id: &str,
    max_depth: usize,
) -> RelationGraph {
    let Some(root) = store.get(kind, id) else {
        log::warn!("cannot resolve graph root {}:{id}", kind.category_slug());
        return RelationGraph::default();
    };

    let root_key = root.key();
    let mut graph = RelationGraph {
        nodes: vec![GraphNode {
            key: root_key.clone(),
            level: 0,
        }],
        edges: Vec::new(),
    };
    let mut visited = HashSet::from([root_key.clone()]);
    let mut edge_seen: HashSet<GraphEdge> = HashSet::new();
    let mut frontier = vec![root_key];

    for level in 1..=max_depth {
        let mut next_frontier = Vec::new();

        for current in &frontier {
            for discovery in expand(store, current) {
                if visited.insert(discovery.other.clone()) {
                    graph.nodes.push(GraphNode {
                        key: discovery.other.clone(),
                        level,
                    });
                    next_frontier.push(discovery.other.clone());
                }

                let (from, to) = if discovery.outward {
                    (current.clone(), discovery.other)
                } else {
                    (discovery.other, current.clone())
                };
                let edge = GraphEdge {
                    from,
                    to,
                    relation: discovery.relation,
                    label: discovery.label,
                };
                if edge_seen.insert(edge.clone()) {
                    graph.edges.push(edge);
                }
            }
        }

        if next_frontier.is_empty() {
            break;
        }
        frontier = next_frontier;
    }

    graph
}

/// Union of the per-root graphs of every entity of `kind`: nodes merged by
/// composite id keeping the first-seen level, edges by exact
/// from/to/relation/label tuple.
pub fn build_kind_overview_graph(
    store: &EntityStore,
    kind: EntityKind,
    max_depth: usize,
) -> RelationGraph {
    let mut merged = RelationGraph::default();
    let mut node_seen = HashSet::new();
    let mut edge_seen = HashSet::new();

    let root_ids = store
        .all(kind)
        .map(|entity| entity.id.clone())
        .collect::<Vec<_>>();

    for root_id in root_ids {
        let graph = build_relationship_graph(store, kind, &root_id, max_depth);
        for node in graph.nodes {
            if node_seen.insert(node.key.clone()) {
                merged.nodes.push(node);
            }
        }
        for edge in graph.edges {
            if edge_seen.insert(edge.clone()) {
                merged.edges.push(edge);
            }
        }
    }

    merged
}

fn expand(store: &EntityStore, current: &NodeKey) -> Vec<Discovery> {
    let Some(entity) = store.get(current.kind, &current.id) else {
        return Vec::new();
    };

    match &entity.details {
        EntityDetails::Muscle(_) => expand_muscle(store, &entity.id),
        EntityDetails::Pain(details) => expand_pain(store, &entity.id, details),
        EntityDetails::Goal(details) => expand_goal(store, details),
        EntityDetails::Exercise(details) => expand_exercise(store, details),
    }
}

/// Muscles carry no outward traversal fields of their own; everything is
/// found by scanning the entities that reference them.
fn expand_muscle(store: &EntityStore, muscle_id: &str) -> Vec<Discovery> {
    let mut discovered = Vec::new();

    for pain in store.all(EntityKind::Pain) {
        let EntityDetails::Pain(details) = &pain.details else {
            continue;
        };
        if details
            .affected_areas
            .iter()
            .any(|area| area.muscle_id == muscle_id)
        {
            discovered.push(Discovery {
                other: pain.key(),
                relation: RelationKind::Affects,
                label: "Affects".to_owned(),
                outward: false,
            });
        }
    }

    for exercise in store.all(EntityKind::Exercise) {
        let EntityDetails::Exercise(details) = &exercise.details else {
            continue;
        };
        let primary = details.primary_muscles.iter().any(|id| id == muscle_id);
        let secondary = details.secondary_muscles.iter().any(|id| id == muscle_id);
        if primary || secondary {
            discovered.push(Discovery {
                other: exercise.key(),
                relation: RelationKind::Targets,
                label: if primary { "Primary" } else { "Secondary" }.to_owned(),
                outward: false,
            });
        }
    }

    for goal in store.all(EntityKind::Goal) {
        let EntityDetails::Goal(details) = &goal.details else {
            continue;
        };
        let primary = details.primary_muscles.iter().any(|id| id == muscle_id);
        let secondary = details.secondary_muscles.iter().any(|id| id == muscle_id);
        if primary || secondary {
            discovered.push(Discovery {
                other: goal.key(),
                relation: RelationKind::Involves,
                label: if primary { "Primary" } else { "Secondary" }.to_owned(),
                outward: false,
            });
        }
    }

    discovered
}

fn expand_pain(
    store: &EntityStore,
    pain_id: &str,
    details: &crate::content::model::PainDetails,
) -> Vec<Discovery> {
    let mut discovered = Vec::new();

    for area in &details.affected_areas {
        // Dangling muscle references were already warned about by the link
        // index builder; traversal just leaves them out.
        if !store.contains(EntityKind::Muscle, &area.muscle_id) {
            continue;
        }
        let label = match &area.intensity {
            Some(intensity) => format!("{intensity} intensity"),
            None => "Affects".to_owned(),
        };
        discovered.push(Discovery {
            other: NodeKey::new(EntityKind::Muscle, area.muscle_id.clone()),
            relation: RelationKind::Affects,
            label,
            outward: true,
        });
    }

    for exercise_id in &details.exercise_ids {
        if !store.contains(EntityKind::Exercise, exercise_id) {
            continue;
        }
        discovered.push(Discovery {
            other: NodeKey::new(EntityKind::Exercise, exercise_id.clone()),
            relation: RelationKind::Solution,
            label: "Helps with".to_owned(),
            outward: true,
        });
    }

    for goal in store.all(EntityKind::Goal) {
        let EntityDetails::Goal(goal_details) = &goal.details else {
            continue;
        };
        if goal_details.pain_id.as_deref() == Some(pain_id) {
            discovered.push(Discovery {
                other: goal.key(),
                relation: RelationKind::Addresses,
                label: "Addresses".to_owned(),
                outward: false,
            });
        }
    }

    discovered
}

fn expand_goal(
    store: &EntityStore,
    details: &crate::content::model::GoalDetails,
) -> Vec<Discovery> {
    let mut discovered = Vec::new();

    for exercise_id in &details.primary_exercises {
        if store.contains(EntityKind::Exercise, exercise_id) {
            discovered.push(Discovery {
                other: NodeKey::new(EntityKind::Exercise, exercise_id.clone()),
                relation: RelationKind::Requires,
                label: "Primary Exercise".to_owned(),
                outward: true,
            });
        }
    }

    for exercise_id in &details.supportive_exercises {
        if store.contains(EntityKind::Exercise, exercise_id) {
            discovered.push(Discovery {
                other: NodeKey::new(EntityKind::Exercise, exercise_id.clone()),
                relation: RelationKind::Includes,
                label: "Supportive Exercise".to_owned(),
                outward: true,
            });
        }
    }

    for muscle_id in &details.primary_muscles {
        if store.contains(EntityKind::Muscle, muscle_id) {
            discovered.push(Discovery {
                other: NodeKey::new(EntityKind::Muscle, muscle_id.clone()),
                relation: RelationKind::Targets,
                label: "Primary Muscle".to_owned(),
                outward: true,
            });
        }
    }

    if let Some(pain_id) = &details.pain_id
        && store.contains(EntityKind::Pain, pain_id)
    {
        discovered.push(Discovery {
            other: NodeKey::new(EntityKind::Pain, pain_id.clone()),
            relation: RelationKind::Addresses,
            label: "Addresses".to_owned(),
            outward: true,
        });
    }

    discovered
}

fn expand_exercise(
    store: &EntityStore,
    details: &crate::content::model::ExerciseDetails,
) -> Vec<Discovery> {
    let mut discovered = Vec::new();

    for (muscle_ids, label) in [
        (&details.primary_muscles, "Primary"),
        (&details.secondary_muscles, "Secondary"),
    ] {
        for muscle_id in muscle_ids {
            if store.contains(EntityKind::Muscle, muscle_id) {
                discovered.push(Discovery {
                    other: NodeKey::new(EntityKind::Muscle, muscle_id.clone()),
                    relation: RelationKind::Targets,
                    label: label.to_owned(),
                    outward: true,
                });
            }
        }
    }

    for variation_id in &details.variations {
        if store.contains(EntityKind::Exercise, variation_id) {
            discovered.push(Discovery {
                other: NodeKey::new(EntityKind::Exercise, variation_id.clone()),
                relation: RelationKind::Variation,
                label: "Variation".to_owned(),
                outward: true,
            });
        }
    }

    discovered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::model::{
        AffectedArea, Entity, EntityDetails, ExerciseDetails, GoalDetails, MuscleDetails,
        PainDetails, RelatedIds,
    };

    fn entity(id: &str, details: EntityDetails) -> Entity {
        Entity {
            id: id.to_owned(),
            title: id.to_owned(),
            title_short: id.to_owned(),
            tags: Vec::new(),
            details,
            related: RelatedIds::default(),
        }
    }

    fn fixture_store() -> EntityStore {
        let mut store = EntityStore::default();
        store.insert(entity(
            "gluteus",
            EntityDetails::Muscle(MuscleDetails::default()),
        ));
        store.insert(entity(
            "hamstrings",
            EntityDetails::Muscle(MuscleDetails::default()),
        ));
        store.insert(entity(
            "squats",
            EntityDetails::Exercise(ExerciseDetails {
                primary_muscles: vec!["gluteus".to_owned()],
                secondary_muscles: vec!["hamstrings".to_owned()],
                variations: vec!["goblet-squats".to_owned()],
            }),
        ));
        store.insert(entity(
            "goblet-squats",
            EntityDetails::Exercise(ExerciseDetails {
                primary_muscles: vec!["gluteus".to_owned()],
                ..ExerciseDetails::default()
            }),
        ));
        store.insert(entity(
            "strong-glutes",
            EntityDetails::Goal(GoalDetails {
                primary_exercises: vec!["squats".to_owned()],
                primary_muscles: vec!["gluteus".to_owned()],
                ..GoalDetails::default()
            }),
        ));
        store.insert(entity(
            "lower-back",
            EntityDetails::Pain(PainDetails {
                affected_areas: vec![AffectedArea {
                    muscle_id: "erector-spinae".to_owned(),
                    intensity: Some("high".to_owned()),
                }],
                exercise_ids: Vec::new(),
            }),
        ));
        store
    }

    fn node_levels(graph: &RelationGraph) -> Vec<(String, usize)> {
        graph
            .nodes
            .iter()
            .map(|node| (node.key.to_string(), node.level))
            .collect()
    }

    #[test]
    fn muscle_root_discovers_targeting_exercise() {
        let store = fixture_store();
        let graph = build_relationship_graph(&store, EntityKind::Muscle, "gluteus", 1);

        let levels = node_levels(&graph);
        assert!(levels.contains(&("muscles:gluteus".to_owned(), 0)));
        assert!(levels.contains(&("exercises:squats".to_owned(), 1)));

        let edge = graph
            .edges
            .iter()
            .find(|edge| edge.from.id == "squats" && edge.to.id == "gluteus")
            .unwrap();
        assert_eq!(edge.relation, RelationKind::Targets);
        assert_eq!(edge.label, "Primary");
    }

    #[test]
    fn dangling_affected_area_is_skipped_without_edges() {
        let store = fixture_store();
        let graph = build_relationship_graph(&store, EntityKind::Pain, "lower-back", 2);

        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.nodes[0].key.to_string(), "pain:lower-back");
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn unknown_root_resolves_to_empty_graph() {
        let store = fixture_store();
        let graph = build_relationship_graph(&store, EntityKind::Goal, "no-such-goal", 3);
        assert!(graph.is_empty());
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn levels_never_exceed_depth_and_nodes_are_unique() {
        let store = fixture_store();
        for depth in 0..4 {
            let graph = build_relationship_graph(&store, EntityKind::Goal, "strong-glutes", depth);

            let mut seen = HashSet::new();
            for node in &graph.nodes {
                assert!(node.level <= depth, "level {} > depth {depth}", node.level);
                assert!(seen.insert(node.key.clone()), "duplicate node {}", node.key);
            }
            for edge in &graph.edges {
                assert!(seen.contains(&edge.from), "edge from outside graph");
                assert!(seen.contains(&edge.to), "edge to outside graph");
            }
        }
    }

    #[test]
    fn first_discovery_wins_through_cycles() {
        // gluteus <-> squats <-> goblet-squats all reference each other; a
        // generous depth must still terminate with each node at its first
        // discovery level.
        let store = fixture_store();
        let graph = build_relationship_graph(&store, EntityKind::Muscle, "gluteus", 6);

        let levels = node_levels(&graph);
        assert!(levels.contains(&("muscles:gluteus".to_owned(), 0)));
        assert!(levels.contains(&("exercises:squats".to_owned(), 1)));
        assert!(levels.contains(&("exercises:goblet-squats".to_owned(), 1)));
        assert!(levels.contains(&("goals:strong-glutes".to_owned(), 1)));
        assert!(levels.contains(&("muscles:hamstrings".to_owned(), 2)));
    }

    #[test]
    fn boundary_edges_to_visited_nodes_are_recorded() {
        let store = fixture_store();
        let graph = build_relationship_graph(&store, EntityKind::Muscle, "gluteus", 1);

        // goblet-squats is level 1; its Targets edge back to the root is
        // discovered while expanding the root, so it must be present even
        // though goblet-squats itself is never expanded.
        assert!(
            graph
                .edges
                .iter()
                .any(|edge| edge.from.id == "goblet-squats" && edge.to.id == "gluteus")
        );
    }

    #[test]
    fn overview_graph_unions_all_roots() {
        let store = fixture_store();
        let graph = build_kind_overview_graph(&store, EntityKind::Exercise, 1);

        let mut seen = HashSet::new();
        for node in &graph.nodes {
            assert!(seen.insert(node.key.clone()));
        }
        assert!(seen.contains(&NodeKey::new(EntityKind::Exercise, "squats")));
        assert!(seen.contains(&NodeKey::new(EntityKind::Exercise, "goblet-squats")));
        assert!(seen.contains(&NodeKey::new(EntityKind::Muscle, "gluteus")));

        let mut edge_seen = HashSet::new();
        for edge in &graph.edges {
            assert!(edge_seen.insert(edge.clone()), "duplicate edge in overview");
        }
    }
}
