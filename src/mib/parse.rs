//! Conversion of foreign MIB trees.

use crate::error::{Error, Result};

use super::{MibNodeType, MibTree, NodeId};

/// A node of a MIB tree owned elsewhere.
///
/// Implement this for whatever structure a MIB loader produces. Children
/// must be yielded in a stable order; [`parse`] keeps it.
pub trait ForeignMibNode {
    fn name(&self) -> &str;

    /// The arc this node adds to its parent's OID.
    fn oid_suffix(&self) -> u32;

    fn node_type(&self) -> MibNodeType;

    fn children(&self) -> impl Iterator<Item = &Self>;
}

/// Copy a foreign tree into an owned [`MibTree`].
///
/// Every foreign node becomes one [`MibNode`](super::MibNode) with the same
/// name, suffix and type, and children keep their order. A subtree reachable
/// through several parents is copied once per parent.
///
/// Nodes are compared by address along the path from the root; a node that is
/// its own ancestor fails with [`Error::CycleDetected`].
pub fn parse<N: ForeignMibNode>(root: &N) -> Result<MibTree> {
    let mut tree = MibTree::with_root(root.name(), root.oid_suffix(), root.node_type());
    let mut path: Vec<&N> = vec![root];

    // (node, parent in the new tree, depth of the parent)
    let mut pending: Vec<(&N, NodeId, usize)> = Vec::new();
    push_children(&mut pending, root, tree.root().id(), 0);

    while let Some((node, parent, parent_depth)) = pending.pop() {
        path.truncate(parent_depth + 1);
        if path.iter().any(|seen| std::ptr::eq(*seen, node)) {
            tracing::debug!(target: "snmp_core::mib", { name = node.name(), depth = path.len() }, "cycle in foreign MIB tree");
            return Err(Error::CycleDetected {
                name: node.name().into(),
            });
        }

        // The arena only fills up when heavy sharing multiplies the copies.
        let id = tree
            .push_child(parent, node.name(), node.oid_suffix(), node.node_type())
            .ok_or_else(|| Error::CycleDetected {
                name: node.name().into(),
            })?;
        path.push(node);
        push_children(&mut pending, node, id, parent_depth + 1);
    }

    tracing::debug!(target: "snmp_core::mib", { root = root.name(), node_count = tree.node_count() }, "MIB tree parsed");
    Ok(tree)
}

/// Queue `node`'s children so they pop in source order.
fn push_children<'a, N: ForeignMibNode>(
    pending: &mut Vec<(&'a N, NodeId, usize)>,
    node: &'a N,
    id: NodeId,
    depth: usize,
) {
    let start = pending.len();
    pending.extend(node.children().map(|child| (child, id, depth)));
    pending[start..].reverse();
}
