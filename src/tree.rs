//! Queries over a comment forest.

use crate::api::{CommentId, CommentNode};

/// Count every node in the forest, replies included.
pub fn count_total(forest: &[CommentNode]) -> usize {
    forest
        .iter()
        .map(|node| 1 + count_total(&node.replies))
        .sum()
}

/// Depth-first search by id.
pub fn find<'a>(forest: &'a [CommentNode], id: &CommentId) -> Option<&'a CommentNode> {
    for node in forest {
        if &node.id == id {
            return Some(node);
        }
        if let Some(found) = find(&node.replies, id) {
            return Some(found);
        }
    }
    None
}

/// Deepest nesting level in the forest (top-level nodes are level 0).
pub fn max_depth(forest: &[CommentNode]) -> Option<usize> {
    forest
        .iter()
        .map(|node| max_depth(&node.replies).map_or(0, |d| d + 1))
        .max()
}
