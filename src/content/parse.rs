use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use super::model::{
    AffectedArea, Entity, EntityDetails, EntityKind, ExerciseDetails, GoalDetails, MuscleDetails,
    PainDetails, RelatedIds,
};
use super::store::EntityStore;

#[derive(Clone, Debug, Deserialize)]
struct RawAffectedArea {
    #[serde(rename = "muscleId")]
    muscle_id: String,
    #[serde(default)]
    intensity: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct RawProblem {
    #[serde(default, rename = "painId")]
    pain_id: Option<String>,
}

/// Exercise references appear both as plain ids and as `{ "id": ... }`
/// objects in older authored content.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
enum IdRef {
    Plain(String),
    Tagged { id: String },
}

impl IdRef {
    fn into_id(self) -> String {
        match self {
            Self::Plain(id) => id,
            Self::Tagged { id } => id,
        }
    }
}

/// The `related.muscles` category is a flat list for most kinds, but muscle
/// entries nest synergists/antagonists under it.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
enum RawMuscleLinks {
    Flat(Vec<String>),
    Grouped {
        #[serde(default)]
        synergists: Vec<String>,
        #[serde(default)]
        antagonists: Vec<String>,
    },
}

impl Default for RawMuscleLinks {
    fn default() -> Self {
        Self::Flat(Vec::new())
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
struct RawRelated {
    #[serde(default)]
    muscles: RawMuscleLinks,
    #[serde(default)]
    exercises: Vec<String>,
    #[serde(default)]
    goals: Vec<String>,
    #[serde(default)]
    pain: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct RawEntry {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    title: String,
    #[serde(default, rename = "titleShort")]
    title_short: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    layer: Option<String>,
    #[serde(default, rename = "primaryMuscles")]
    primary_muscles: Vec<String>,
    #[serde(default, rename = "secondaryMuscles")]
    secondary_muscles: Vec<String>,
    #[serde(default)]
    variations: Vec<String>,
    #[serde(default, rename = "primaryExercises")]
    primary_exercises: Vec<IdRef>,
    #[serde(default, rename = "supportiveExercises")]
    supportive_exercises: Vec<IdRef>,
    #[serde(default, rename = "affectedAreas")]
    affected_areas: Vec<RawAffectedArea>,
    #[serde(default, rename = "exerciseIds")]
    exercise_ids: Vec<String>,
    #[serde(default)]
    problem: Option<RawProblem>,
    #[serde(default)]
    related: Option<RawRelated>,
}

pub fn load_content_index(path: &Path) -> Result<EntityStore> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read content index {}", path.display()))?;
    parse_content_index(&raw)
        .with_context(|| format!("failed to parse content index {}", path.display()))
}

pub fn parse_content_index(raw: &str) -> Result<EntityStore> {
    let entries: BTreeMap<String, RawEntry> =
        serde_json::from_str(raw).context("invalid content index JSON")?;

    let mut store = EntityStore::default();
    let mut skipped_drafts = 0usize;

    for (entry_key, raw_entry) in entries {
        if let Some(status) = &raw_entry.status
            && status != "published"
        {
            skipped_drafts += 1;
            continue;
        }

        let kind = EntityKind::from_slug(&raw_entry.kind)
            .ok_or_else(|| anyhow!("entry {entry_key}: unknown entity type {}", raw_entry.kind))?;

        let entity = build_entity(kind, raw_entry);
        if store.insert(entity).is_some() {
            log::warn!("duplicate {} entry {entry_key}; keeping the last one", kind);
        }
    }

    if skipped_drafts > 0 {
        log::info!("skipped {skipped_drafts} draft entries");
    }

    if store.is_empty() {
        return Err(anyhow!("content index contains no published entries"));
    }

    Ok(store)
}

fn build_entity(kind: EntityKind, raw: RawEntry) -> Entity {
    let mut related = RelatedIds::default();
    let mut synergists = Vec::new();
    let mut antagonists = Vec::new();

    if let Some(raw_related) = raw.related {
        match raw_related.muscles {
            RawMuscleLinks::Flat(ids) => {
                for id in &ids {
                    related.push_unique(EntityKind::Muscle, id);
                }
            }
            RawMuscleLinks::Grouped {
                synergists: syn,
                antagonists: ant,
            } => {
                for id in syn.iter().chain(ant.iter()) {
                    related.push_unique(EntityKind::Muscle, id);
                }
                synergists = syn;
                antagonists = ant;
            }
        }
        for id in &raw_related.exercises {
            related.push_unique(EntityKind::Exercise, id);
        }
        for id in &raw_related.goals {
            related.push_unique(EntityKind::Goal, id);
        }
        for id in &raw_related.pain {
            related.push_unique(EntityKind::Pain, id);
        }
    }

    // Typed front-matter fields are forward links too; fold them into the
    // category lists so the link index sees one uniform structure.
    let details = match kind {
        EntityKind::Muscle => {
            for id in raw.primary_muscles.iter().chain(raw.secondary_muscles.iter()) {
                related.push_unique(EntityKind::Muscle, id);
            }
            EntityDetails::Muscle(MuscleDetails {
                layer: raw.layer,
                synergists,
                antagonists,
            })
        }
        EntityKind::Exercise => {
            let primary_muscles = raw.primary_muscles;
            let secondary_muscles = raw.secondary_muscles;
            let variations = raw.variations;
            for id in primary_muscles.iter().chain(secondary_muscles.iter()) {
                related.push_unique(EntityKind::Muscle, id);
            }
            for id in &variations {
                related.push_unique(EntityKind::Exercise, id);
            }
            EntityDetails::Exercise(ExerciseDetails {
                primary_muscles,
                secondary_muscles,
                variations,
            })
        }
        EntityKind::Goal => {
            let primary_exercises = raw
                .primary_exercises
                .into_iter()
                .map(IdRef::into_id)
                .collect::<Vec<_>>();
            let supportive_exercises = raw
                .supportive_exercises
                .into_iter()
                .map(IdRef::into_id)
                .collect::<Vec<_>>();
            let pain_id = raw.problem.and_then(|problem| problem.pain_id);
            for id in primary_exercises.iter().chain(supportive_exercises.iter()) {
                related.push_unique(EntityKind::Exercise, id);
            }
            for id in raw.primary_muscles.iter().chain(raw.secondary_muscles.iter()) {
                related.push_unique(EntityKind::Muscle, id);
            }
            if let Some(pain) = &pain_id {
                related.push_unique(EntityKind::Pain, pain);
            }
            EntityDetails::Goal(GoalDetails {
                primary_exercises,
                supportive_exercises,
                primary_muscles: raw.primary_muscles,
                secondary_muscles: raw.secondary_muscles,
                pain_id,
            })
        }
        EntityKind::Pain => {
            let affected_areas = raw
                .affected_areas
                .into_iter()
                .map(|area| AffectedArea {
                    muscle_id: area.muscle_id,
                    intensity: area.intensity,
                })
                .collect::<Vec<_>>();
            for area in &affected_areas {
                related.push_unique(EntityKind::Muscle, &area.muscle_id);
            }
            for id in &raw.exercise_ids {
                related.push_unique(EntityKind::Exercise, id);
            }
            EntityDetails::Pain(PainDetails {
                affected_areas,
                exercise_ids: raw.exercise_ids,
            })
        }
    };

    let title_short = raw.title_short.unwrap_or_else(|| raw.title.clone());

    Entity {
        id: raw.id,
        title: raw.title,
        title_short,
        tags: raw.tags,
        details,
        related,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "gluteus": {
            "id": "gluteus",
            "type": "muscle",
            "title": "Gluteus Maximus",
            "titleShort": "Glutes",
            "status": "published",
            "layer": "superficial",
            "related": {
                "muscles": {
                    "synergists": ["hamstrings"],
                    "antagonists": ["hip-flexors"]
                }
            }
        },
        "squats": {
            "id": "squats",
            "type": "exercise",
            "title": "Squats",
            "titleShort": "Squats",
            "status": "published",
            "primaryMuscles": ["gluteus"],
            "secondaryMuscles": ["hamstrings"],
            "variations": ["goblet-squats"]
        },
        "future-goal": {
            "id": "future-goal",
            "type": "goal",
            "title": "Unwritten",
            "status": "draft"
        }
    }"#;

    #[test]
    fn parses_published_entries_and_skips_drafts() {
        let store = parse_content_index(SAMPLE).unwrap();

        assert_eq!(store.len(), 2);
        assert!(store.contains(EntityKind::Muscle, "gluteus"));
        assert!(store.contains(EntityKind::Exercise, "squats"));
        assert!(!store.contains(EntityKind::Goal, "future-goal"));
    }

    #[test]
    fn grouped_muscle_links_populate_details_and_related() {
        let store = parse_content_index(SAMPLE).unwrap();
        let gluteus = store.get(EntityKind::Muscle, "gluteus").unwrap();

        let EntityDetails::Muscle(details) = &gluteus.details else {
            panic!("expected muscle details");
        };
        assert_eq!(details.synergists, vec!["hamstrings"]);
        assert_eq!(details.antagonists, vec!["hip-flexors"]);
        assert_eq!(
            gluteus.related.get(EntityKind::Muscle),
            ["hamstrings", "hip-flexors"]
        );
    }

    #[test]
    fn typed_fields_become_forward_links() {
        let store = parse_content_index(SAMPLE).unwrap();
        let squats = store.get(EntityKind::Exercise, "squats").unwrap();

        assert_eq!(
            squats.related.get(EntityKind::Muscle),
            ["gluteus", "hamstrings"]
        );
        assert_eq!(squats.related.get(EntityKind::Exercise), ["goblet-squats"]);
    }

    #[test]
    fn unknown_entity_type_is_a_hard_failure() {
        let raw = r#"{"x": {"id": "x", "type": "tendon", "title": "X"}}"#;
        assert!(parse_content_index(raw).is_err());
    }

    #[test]
    fn empty_index_is_rejected() {
        assert!(parse_content_index("{}").is_err());
    }
}
