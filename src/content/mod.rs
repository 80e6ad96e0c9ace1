mod filter;
mod link_index;
pub mod model;
mod parse;
mod resolve;
mod store;

pub use filter::{GraphFilter, connection_counts};
pub use link_index::{LinkWarning, build_link_index};
pub use model::{Entity, EntityDetails, EntityKind, GraphEdge, GraphNode, NodeKey, RelationGraph};
pub use parse::{load_content_index, parse_content_index};
pub use resolve::{build_kind_overview_graph, build_relationship_graph};
pub use store::{EntityStore, RelatedByKind};
