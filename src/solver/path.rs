use crate::maze::NodeId;
use std::collections::HashSet;

/// Walk predecessor links backward from `to` until `from` is reached and
/// return the cells in `from -> to` order.
///
/// Returns `None` when a link is missing before `from` is reached, or when the
/// walk comes back to a cell it has already passed (possible only if racing
/// writers left a cycle in a shared map).
pub fn path_from_to<F>(from: NodeId, to: NodeId, mut predecessor: F) -> Option<Vec<NodeId>>
where
    F: FnMut(NodeId) -> Option<NodeId>,
{
    let mut path = vec![to];
    let mut seen = HashSet::from([to]);
    let mut node = to;
    while node != from {
        node = predecessor(node)?;
        if !seen.insert(node) {
            return None;
        }
        path.push(node);
    }
    path.reverse();
    Some(path)
}
