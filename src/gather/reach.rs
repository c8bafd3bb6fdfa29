//! Forward reachability: does a socket drive the active material output?
//!
//! Disambiguates which of several same-kind nodes (e.g. multiple principled
//! BSDFs left in a graph) actually feeds the rendered result.

use crate::graph::{Material, NodeId, NodeKind, SocketRef};

/// Depth-first over all links leaving `socket` (an output socket). Group
/// instance boundaries are entered through the group-input pseudo-node and
/// left through the enclosing instance, matching sockets by ordinal. True as
/// soon as any path reaches a material-output node flagged active.
pub fn links_to_active_output(
    material: &Material,
    socket: SocketRef,
    group_path: &[NodeId],
) -> bool {
    let tree = material.tree(socket.node.tree);
    for link in tree.outgoing_links(socket.node.node, socket.slot) {
        let to = NodeId {
            tree: socket.node.tree,
            node: link.to.node,
        };

        match material.node(to).kind {
            NodeKind::Group { tree: sub } => {
                let Some(group_input) = material
                    .tree(sub)
                    .find_node(|n| n.kind == NodeKind::GroupInput)
                else {
                    continue;
                };
                let mut next = group_path.to_vec();
                next.push(to);
                let inner = material.output_ref(
                    NodeId {
                        tree: sub,
                        node: group_input,
                    },
                    link.to.socket,
                );
                if links_to_active_output(material, inner, &next) {
                    return true;
                }
            }
            NodeKind::GroupOutput => {
                let Some((&enclosing, rest)) = group_path.split_last() else {
                    continue;
                };
                let outer = material.output_ref(enclosing, link.to.socket);
                if links_to_active_output(material, outer, rest) {
                    return true;
                }
            }
            NodeKind::OutputMaterial { active } => {
                if active {
                    return true;
                }
                // Inactive outputs have no output sockets; dead end.
            }
            _ => {
                if !material.node(to).outputs.is_empty() {
                    let first_out = material.output_ref(to, 0);
                    if links_to_active_output(material, first_out, group_path) {
                        return true;
                    }
                }
            }
        }
    }
    false
}
