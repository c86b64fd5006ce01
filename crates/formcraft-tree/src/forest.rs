//! Pure operations over the component forest.
//!
//! Every mutation takes the current forest by reference and returns a new
//! one. Only the path from the edited node up to the root is rebuilt; every
//! other subtree is shared with the input, so callers can detect unchanged
//! nodes with [`Arc::ptr_eq`].
//!
//! # Invariants
//!
//! 1. Every node has exactly one owner: the root list or one container.
//! 2. Node ids are unique across the forest.
//! 3. No node is its own descendant.
//! 4. Child order only changes through an explicit insert, remove or move.
//!
//! # Failure Modes
//!
//! | Scenario                                   | Result                      |
//! |--------------------------------------------|-----------------------------|
//! | Insert into a missing container            | `UnknownContainer`          |
//! | Insert into a leaf                         | `NotAContainer`             |
//! | Insert a subtree reusing a present id      | `DuplicateId`               |
//! | Move a node into itself or a descendant    | `CycleRejected`             |
//! | Remove an unknown id                       | unchanged forest, `None`    |
//! | Out-of-range index                         | clamped to `[0, len]`       |

use std::collections::HashSet;
use std::sync::Arc;

use formcraft_core::{ComponentNode, ContainerRef, NodeId, PatchReport, PropertyPatch};

use crate::error::TreeError;

/// The ordered top-level node list.
pub type Forest = Vec<Arc<ComponentNode>>;

type ChildEdit<'a> = dyn FnMut(&mut Vec<Arc<ComponentNode>>) + 'a;
type NodeEdit<'a> = dyn FnMut(&mut ComponentNode) + 'a;

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Depth-first search for `id`.
#[must_use]
pub fn find_by_id(forest: &[Arc<ComponentNode>], id: NodeId) -> Option<&Arc<ComponentNode>> {
    for node in forest {
        if node.id() == id {
            return Some(node);
        }
        if let Some(found) = node.children().and_then(|children| find_by_id(children, id)) {
            return Some(found);
        }
    }
    None
}

/// Children of `parent`, root included.
pub fn children_of(
    forest: &[Arc<ComponentNode>],
    parent: ContainerRef,
) -> Result<&[Arc<ComponentNode>], TreeError> {
    match parent {
        ContainerRef::Root => Ok(forest),
        ContainerRef::Node(id) => {
            let node = find_by_id(forest, id).ok_or(TreeError::UnknownContainer { container: id })?;
            node.children()
                .ok_or(TreeError::NotAContainer { node_id: id })
        }
    }
}

/// Whether `candidate` lies strictly below `ancestor`.
///
/// A node is not its own descendant. Unknown ids yield `false`.
#[must_use]
pub fn is_descendant(forest: &[Arc<ComponentNode>], ancestor: NodeId, candidate: NodeId) -> bool {
    find_by_id(forest, ancestor).is_some_and(|node| node.has_descendant(candidate))
}

/// Visit every node in pre-order with its owner and position.
pub fn walk<F>(forest: &[Arc<ComponentNode>], visit: &mut F)
where
    F: FnMut(&Arc<ComponentNode>, ContainerRef, usize),
{
    walk_under(forest, ContainerRef::Root, visit);
}

fn walk_under<F>(nodes: &[Arc<ComponentNode>], owner: ContainerRef, visit: &mut F)
where
    F: FnMut(&Arc<ComponentNode>, ContainerRef, usize),
{
    for (pos, node) in nodes.iter().enumerate() {
        visit(node, owner, pos);
        if let Some(children) = node.children() {
            walk_under(children, ContainerRef::Node(node.id()), visit);
        }
    }
}

/// Owner of `id` and its position among the owner's children.
#[must_use]
pub fn position_of(forest: &[Arc<ComponentNode>], id: NodeId) -> Option<(ContainerRef, usize)> {
    let mut found = None;
    walk(forest, &mut |node, owner, pos| {
        if found.is_none() && node.id() == id {
            found = Some((owner, pos));
        }
    });
    found
}

/// Owner of `id`: the root or its containing node.
#[must_use]
pub fn parent_of(forest: &[Arc<ComponentNode>], id: NodeId) -> Option<ContainerRef> {
    position_of(forest, id).map(|(owner, _)| owner)
}

/// Ids of every container, in pre-order.
#[must_use]
pub fn list_container_ids(forest: &[Arc<ComponentNode>]) -> Vec<NodeId> {
    let mut ids = Vec::new();
    walk(forest, &mut |node, _, _| {
        if node.is_container() {
            ids.push(node.id());
        }
    });
    ids
}

#[must_use]
pub fn node_count(forest: &[Arc<ComponentNode>]) -> usize {
    forest.iter().map(|node| node.subtree_len()).sum()
}

/// Highest id present, used to seed id allocation after a load.
#[must_use]
pub fn max_id(forest: &[Arc<ComponentNode>]) -> Option<NodeId> {
    let mut max = None;
    walk(forest, &mut |node, _, _| {
        max = Some(max.map_or(node.id(), |m: NodeId| m.max(node.id())));
    });
    max
}

/// Check that ids are unique across the forest.
pub fn validate(forest: &[Arc<ComponentNode>]) -> Result<(), TreeError> {
    let mut seen = HashSet::new();
    let mut duplicate = None;
    walk(forest, &mut |node, _, _| {
        if !seen.insert(node.id()) && duplicate.is_none() {
            duplicate = Some(node.id());
        }
    });
    match duplicate {
        Some(node_id) => Err(TreeError::DuplicateId { node_id }),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Path-copying helpers
// ---------------------------------------------------------------------------

/// Rebuild the path to container `parent` after editing its child list.
fn edit_children(
    nodes: &[Arc<ComponentNode>],
    parent: NodeId,
    edit: &mut ChildEdit<'_>,
) -> Result<Option<Forest>, TreeError> {
    for (pos, node) in nodes.iter().enumerate() {
        let Some(children) = node.children() else {
            if node.id() == parent {
                return Err(TreeError::NotAContainer { node_id: parent });
            }
            continue;
        };
        let new_children = if node.id() == parent {
            let mut children = children.to_vec();
            edit(&mut children);
            children
        } else {
            match edit_children(children, parent, edit)? {
                Some(children) => children,
                None => continue,
            }
        };
        let Some(rebuilt) = node.with_children(new_children) else {
            continue;
        };
        let mut out = nodes.to_vec();
        out[pos] = Arc::new(rebuilt);
        return Ok(Some(out));
    }
    Ok(None)
}

fn edit_container(
    forest: &[Arc<ComponentNode>],
    parent: ContainerRef,
    edit: &mut ChildEdit<'_>,
) -> Result<Forest, TreeError> {
    match parent {
        ContainerRef::Root => {
            let mut out = forest.to_vec();
            edit(&mut out);
            Ok(out)
        }
        ContainerRef::Node(id) => {
            edit_children(forest, id, edit)?.ok_or(TreeError::UnknownContainer { container: id })
        }
    }
}

/// Rebuild the path to node `id` after editing a copy of it.
fn edit_node(nodes: &[Arc<ComponentNode>], id: NodeId, edit: &mut NodeEdit<'_>) -> Option<Forest> {
    for (pos, node) in nodes.iter().enumerate() {
        let rebuilt = if node.id() == id {
            let mut copy = ComponentNode::clone(node);
            edit(&mut copy);
            copy
        } else {
            let Some(children) = node.children().and_then(|c| edit_node(c, id, edit)) else {
                continue;
            };
            node.with_children(children)?
        };
        let mut out = nodes.to_vec();
        out[pos] = Arc::new(rebuilt);
        return Some(out);
    }
    None
}

/// Cut node `id` (with its subtree) out of the forest.
fn detach(nodes: &[Arc<ComponentNode>], id: NodeId) -> Option<(Forest, Arc<ComponentNode>)> {
    for (pos, node) in nodes.iter().enumerate() {
        if node.id() == id {
            let mut out = nodes.to_vec();
            let removed = out.remove(pos);
            return Some((out, removed));
        }
        if let Some((children, removed)) = node.children().and_then(|c| detach(c, id)) {
            let rebuilt = node.with_children(children)?;
            let mut out = nodes.to_vec();
            out[pos] = Arc::new(rebuilt);
            return Some((out, removed));
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// Insert `node` (and its subtree) under `parent` at `index`.
///
/// `index` is clamped to `[0, len]`.
pub fn insert(
    forest: &[Arc<ComponentNode>],
    node: impl Into<Arc<ComponentNode>>,
    parent: ContainerRef,
    index: usize,
) -> Result<Forest, TreeError> {
    let node = node.into();
    children_of(forest, parent)?;

    let mut present = HashSet::new();
    walk(forest, &mut |existing, _, _| {
        present.insert(existing.id());
    });
    let mut incoming = Vec::new();
    node.collect_ids(&mut incoming);
    for id in incoming {
        if !present.insert(id) {
            return Err(TreeError::DuplicateId { node_id: id });
        }
    }

    let mut slot = Some(node);
    edit_container(forest, parent, &mut |children: &mut Vec<Arc<ComponentNode>>| {
        if let Some(node) = slot.take() {
            let at = index.min(children.len());
            children.insert(at, node);
        }
    })
}

/// Remove node `id` and its whole subtree.
///
/// An unknown id leaves the forest unchanged and yields `None`.
#[must_use]
pub fn remove(forest: &[Arc<ComponentNode>], id: NodeId) -> (Forest, Option<Arc<ComponentNode>>) {
    match detach(forest, id) {
        Some((out, removed)) => (out, Some(removed)),
        None => (forest.to_vec(), None),
    }
}

/// Move node `id` under `parent` at `index`.
///
/// `index` counts the destination's children with the moved node already
/// taken out, and is clamped to `[0, len]`.
pub fn move_node(
    forest: &[Arc<ComponentNode>],
    id: NodeId,
    parent: ContainerRef,
    index: usize,
) -> Result<Forest, TreeError> {
    let node = find_by_id(forest, id).ok_or(TreeError::UnknownNode { node_id: id })?;
    if let ContainerRef::Node(target) = parent
        && (target == id || node.has_descendant(target))
    {
        return Err(TreeError::CycleRejected {
            node_id: id,
            target,
        });
    }
    children_of(forest, parent)?;

    let (without, moved) = detach(forest, id).ok_or(TreeError::UnknownNode { node_id: id })?;
    let mut slot = Some(moved);
    edit_container(&without, parent, &mut |children: &mut Vec<Arc<ComponentNode>>| {
        if let Some(node) = slot.take() {
            let at = index.min(children.len());
            children.insert(at, node);
        }
    })
}

/// Shallow-merge `patch` into node `id`'s properties.
pub fn update_properties(
    forest: &[Arc<ComponentNode>],
    id: NodeId,
    patch: &PropertyPatch,
) -> Result<(Forest, PatchReport), TreeError> {
    let mut report = PatchReport::default();
    let out = edit_node(forest, id, &mut |node: &mut ComponentNode| {
        report = node.apply_patch(patch);
    })
        .ok_or(TreeError::UnknownNode { node_id: id })?;
    Ok((out, report))
}

/// Change node `id`'s editor label.
pub fn relabel(
    forest: &[Arc<ComponentNode>],
    id: NodeId,
    label: &str,
) -> Result<Forest, TreeError> {
    edit_node(forest, id, &mut |node: &mut ComponentNode| node.set_label(label))
        .ok_or(TreeError::UnknownNode { node_id: id })
}
