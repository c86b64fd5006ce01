#![forbid(unsafe_code)]

//! Component forest: pure structural operations, parent lookup, JSON
//! snapshots, and the observable [`TreeStore`].

pub mod error;
pub mod forest;
pub mod index;
pub mod snapshot;
pub mod store;

pub use error::TreeError;
pub use forest::{
    Forest, children_of, find_by_id, insert, is_descendant, list_container_ids, max_id, move_node,
    node_count, parent_of, position_of, relabel, remove, update_properties, validate, walk,
};
pub use index::ParentIndex;
pub use snapshot::{FOREST_SCHEMA_VERSION, ForestSnapshot, NodeRecord, SnapshotError};
pub use store::{ChangeCause, ListenerId, TreeChange, TreeStore};
