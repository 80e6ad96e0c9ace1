use std::fmt;

use super::model::{EntityKind, NodeKey};
use super::store::EntityStore;

/// A `related` entry pointing at an id with no published entity behind it.
/// Non-fatal: the link is left out of the index and never becomes an edge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkWarning {
    pub source: NodeKey,
    pub category: EntityKind,
    pub missing: String,
}

impl fmt::Display for LinkWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> related.{} references non-existent id {}",
            self.source,
            self.category.category_slug(),
            self.missing
        )
    }
}

/// Makes every authored one-directional link navigable from both ends: for a
/// forward link A -> B in category C, B gains A's id under the category named
/// by A's kind (`EntityKind::category_slug`). Running this again on its own
/// output inserts nothing, so rebuilding the index is idempotent.
pub fn build_link_index(store: &mut EntityStore) -> Vec<LinkWarning> {
    let mut warnings = Vec::new();
    let mut reverse_links = Vec::new();

    for entity in store.iter() {
        for (category, target_ids) in entity.related.iter() {
            for target_id in target_ids {
                if store.contains(category, target_id) {
                    reverse_links.push((
                        category,
                        target_id.clone(),
                        entity.kind(),
                        entity.id.clone(),
                    ));
                } else {
                    warnings.push(LinkWarning {
                        source: entity.key(),
                        category,
                        missing: target_id.clone(),
                    });
                }
            }
        }
    }

    let mut added = 0usize;
    for (target_kind, target_id, source_kind, source_id) in reverse_links {
        if let Some(target) = store.get_mut(target_kind, &target_id)
            && target.related.push_unique(source_kind, &source_id)
        {
            added += 1;
        }
    }

    for warning in &warnings {
        log::warn!("{warning}");
    }
    log::info!(
        "link index built: {added} reverse links added, {} dangling references",
        warnings.len()
    );

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::model::{
        Entity, EntityDetails, ExerciseDetails, MuscleDetails, RelatedIds,
    };

    fn muscle(id: &str) -> Entity {
        Entity {
            id: id.to_owned(),
            title: id.to_owned(),
            title_short: id.to_owned(),
            tags: Vec::new(),
            details: EntityDetails::Muscle(MuscleDetails::default()),
            related: RelatedIds::default(),
        }
    }

    fn exercise(id: &str, muscles: &[&str]) -> Entity {
        let mut related = RelatedIds::default();
        for muscle_id in muscles {
            related.push_unique(EntityKind::Muscle, muscle_id);
        }
        Entity {
            id: id.to_owned(),
            title: id.to_owned(),
            title_short: id.to_owned(),
            tags: Vec::new(),
            details: EntityDetails::Exercise(ExerciseDetails {
                primary_muscles: muscles.iter().map(|m| (*m).to_owned()).collect(),
                ..ExerciseDetails::default()
            }),
            related,
        }
    }

    fn related_snapshot(store: &EntityStore) -> Vec<(NodeKey, RelatedIds)> {
        store
            .iter()
            .map(|entity| (entity.key(), entity.related.clone()))
            .collect()
    }

    #[test]
    fn synthesizes_reverse_links() {
        let mut store = EntityStore::default();
        store.insert(muscle("gluteus"));
        store.insert(exercise("squats", &["gluteus"]));

        let warnings = build_link_index(&mut store);

        assert!(warnings.is_empty());
        let gluteus = store.get(EntityKind::Muscle, "gluteus").unwrap();
        assert_eq!(gluteus.related.get(EntityKind::Exercise), ["squats"]);
    }

    #[test]
    fn rebuilding_is_idempotent() {
        let mut store = EntityStore::default();
        store.insert(muscle("gluteus"));
        store.insert(muscle("hamstrings"));
        store.insert(exercise("squats", &["gluteus", "hamstrings"]));
        store.insert(exercise("deadlift", &["hamstrings"]));

        let first_warnings = build_link_index(&mut store);
        let first = related_snapshot(&store);

        let second_warnings = build_link_index(&mut store);
        let second = related_snapshot(&store);

        assert_eq!(first_warnings, second_warnings);
        assert_eq!(first, second);
    }

    #[test]
    fn dangling_reference_becomes_structured_warning() {
        let mut store = EntityStore::default();
        store.insert(exercise("squats", &["gluteus"]));

        let warnings = build_link_index(&mut store);

        assert_eq!(
            warnings,
            vec![LinkWarning {
                source: NodeKey::new(EntityKind::Exercise, "squats"),
                category: EntityKind::Muscle,
                missing: "gluteus".to_owned(),
            }]
        );
    }
}
