use std::collections::BTreeMap;

use super::model::{Entity, EntityKind};

/// All loaded entities, keyed by id within kind. Built once at startup,
/// enriched by the link index builder, then treated as read-only. BTreeMap
/// keeps iteration order stable so traversals and layouts are deterministic.
#[derive(Clone, Debug, Default)]
pub struct EntityStore {
    by_kind: [BTreeMap<String, Entity>; 4],
}

impl EntityStore {
    pub fn insert(&mut self, entity: Entity) -> Option<Entity> {
        self.by_kind[entity.kind().index()].insert(entity.id.clone(), entity)
    }

    pub fn get(&self, kind: EntityKind, id: &str) -> Option<&Entity> {
        self.by_kind[kind.index()].get(id)
    }

    pub(super) fn get_mut(&mut self, kind: EntityKind, id: &str) -> Option<&mut Entity> {
        self.by_kind[kind.index()].get_mut(id)
    }

    pub fn contains(&self, kind: EntityKind, id: &str) -> bool {
        self.by_kind[kind.index()].contains_key(id)
    }

    pub fn all(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> {
        self.by_kind[kind.index()].values()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        EntityKind::ALL.into_iter().flat_map(|kind| self.all(kind))
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.by_kind[kind.index()].len()
    }

    pub fn len(&self) -> usize {
        self.by_kind.iter().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_kind.iter().all(BTreeMap::is_empty)
    }

    /// Related entities grouped by kind, following the (index-enriched)
    /// `related` lists. Dangling ids are silently dropped.
    pub fn related_entities(&self, kind: EntityKind, id: &str) -> RelatedByKind<'_> {
        let mut related = RelatedByKind::default();

        let Some(entity) = self.get(kind, id) else {
            return related;
        };

        for (target_kind, ids) in entity.related.iter() {
            for target_id in ids {
                if let Some(target) = self.get(target_kind, target_id) {
                    related.groups[target_kind.index()].push(target);
                }
            }
        }

        related
    }
}

#[derive(Default)]
pub struct RelatedByKind<'a> {
    groups: [Vec<&'a Entity>; 4],
}

impl RelatedByKind<'_> {
    /// Owned (id, short title) pairs per kind, for callers that cannot hold
    /// the store borrow while reacting to the result.
    pub fn into_owned_groups(self) -> Vec<(EntityKind, Vec<(String, String)>)> {
        EntityKind::ALL
            .into_iter()
            .zip(self.groups)
            .map(|(kind, group)| {
                (
                    kind,
                    group
                        .into_iter()
                        .map(|entity| (entity.id.clone(), entity.title_short.clone()))
                        .collect(),
                )
            })
            .collect()
    }
}
