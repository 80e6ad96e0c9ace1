use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Muscle,
    Exercise,
    Goal,
    Pain,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [Self::Muscle, Self::Exercise, Self::Goal, Self::Pain];

    pub fn from_slug(value: &str) -> Option<Self> {
        match value {
            "muscle" | "muscles" => Some(Self::Muscle),
            "exercise" | "exercises" => Some(Self::Exercise),
            "goal" | "goals" => Some(Self::Goal),
            "pain" => Some(Self::Pain),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Muscle => "Muscle",
            Self::Exercise => "Exercise",
            Self::Goal => "Goal",
            Self::Pain => "Pain",
        }
    }

    /// Relation-category name for links pointing at entities of this kind.
    /// Also the composite node id prefix. `pain` is invariant, the rest
    /// pluralize; this is the one total mapping used everywhere.
    pub fn category_slug(self) -> &'static str {
        match self {
            Self::Muscle => "muscles",
            Self::Exercise => "exercises",
            Self::Goal => "goals",
            Self::Pain => "pain",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Muscle => 0,
            Self::Exercise => 1,
            Self::Goal => 2,
            Self::Pain => 3,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.category_slug())
    }
}

/// Composite node identity: `"<kind-category>:<entity id>"`. Raw ids are only
/// unique within a kind, so graph bookkeeping always goes through this key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    pub kind: EntityKind,
    pub id: String,
}

impl NodeKey {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.category_slug(), self.id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RelationKind {
    Affects,
    Targets,
    Involves,
    Addresses,
    Solution,
    Requires,
    Includes,
    Variation,
}

#[derive(Clone, Debug, Default)]
pub struct MuscleDetails {
    pub layer: Option<String>,
    pub synergists: Vec<String>,
    pub antagonists: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct ExerciseDetails {
    pub primary_muscles: Vec<String>,
    pub secondary_muscles: Vec<String>,
    pub variations: Vec<String>,
}

#[derive(Clone, Debug, Default)]
pub struct GoalDetails {
    pub primary_exercises: Vec<String>,
    pub supportive_exercises: Vec<String>,
    pub primary_muscles: Vec<String>,
    pub secondary_muscles: Vec<String>,
    pub pain_id: Option<String>,
}

#[derive(Clone, Debug)]
pub struct AffectedArea {
    pub muscle_id: String,
    pub intensity: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct PainDetails {
    pub affected_areas: Vec<AffectedArea>,
    pub exercise_ids: Vec<String>,
}

/// Closed set of entity shapes; graph expansion matches on this exhaustively
/// instead of dispatching on a type string.
#[derive(Clone, Debug)]
pub enum EntityDetails {
    Muscle(MuscleDetails),
    Exercise(ExerciseDetails),
    Goal(GoalDetails),
    Pain(PainDetails),
}

impl EntityDetails {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Muscle(_) => EntityKind::Muscle,
            Self::Exercise(_) => EntityKind::Exercise,
            Self::Goal(_) => EntityKind::Goal,
            Self::Pain(_) => EntityKind::Pain,
        }
    }
}

/// Per-category cross-reference lists, one list per target kind. Authored
/// links land here at parse time; the link index builder appends the reverse
/// direction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RelatedIds {
    lists: [Vec<String>; 4],
}

impl RelatedIds {
    pub fn get(&self, kind: EntityKind) -> &[String] {
        &self.lists[kind.index()]
    }

    pub fn push_unique(&mut self, kind: EntityKind, id: &str) -> bool {
        let list = &mut self.lists[kind.index()];
        if list.iter().any(|existing| existing == id) {
            false
        } else {
            list.push(id.to_owned());
            true
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityKind, &[String])> {
        EntityKind::ALL
            .into_iter()
            .map(|kind| (kind, self.get(kind)))
    }
}

#[derive(Clone, Debug)]
pub struct Entity {
    pub id: String,
    pub title: String,
    pub title_short: String,
    pub tags: Vec<String>,
    pub details: EntityDetails,
    pub related: RelatedIds,
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        self.details.kind()
    }

    pub fn key(&self) -> NodeKey {
        NodeKey::new(self.kind(), self.id.clone())
    }
}

#[derive(Clone, Debug)]
pub struct GraphNode {
    pub key: NodeKey,
    /// Breadth-first discovery depth from the traversal root (root is 0).
    pub level: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GraphEdge {
    pub from: NodeKey,
    pub to: NodeKey,
    pub relation: RelationKind,
    pub label: String,
}

#[derive(Clone, Debug, Default)]
pub struct RelationGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl RelationGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
