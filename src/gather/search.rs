//! Generic filtered backward search over a material's node trees.
//!
//! A depth-first walk from a starting socket that collects every node
//! matching a predicate, together with the link path and group path used to
//! reach it. Group boundaries are crossed transparently in both directions.

use crate::graph::{Material, Node, NodeId, NodeKind, SocketDir, SocketRef, TreeId};

use super::nav::NodeNav;

/// A socket located by the resolver, together with the group instances that
/// were descended through to reach it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSocket {
    pub socket: SocketRef,
    pub group_path: Vec<NodeId>,
}

impl ResolvedSocket {
    pub fn new(socket: SocketRef, group_path: Vec<NodeId>) -> Self {
        ResolvedSocket { socket, group_path }
    }

    /// Start a traversal cursor at this socket.
    pub fn to_nav<'a>(&self, material: &'a Material) -> NodeNav<'a> {
        let mut nav = NodeNav::new(material, self.socket.node).with_group_path(&self.group_path);
        match self.socket.dir {
            SocketDir::Input => nav.in_slot = Some(self.socket.slot),
            SocketDir::Output => nav.out_slot = Some(self.socket.slot),
        }
        nav
    }
}

/// A link traversed during a search, qualified by the tree it lives in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkRef {
    pub tree: TreeId,
    pub link: crate::graph::Link,
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub node: NodeId,
    pub path: Vec<LinkRef>,
    pub group_path: Vec<NodeId>,
}

/// Find all nodes upstream of `start` for which `filter` is true.
///
/// If the starting socket's own node already matches, it is the sole result
/// (empty path). Matching does not stop the walk: the search keeps looking
/// behind a matched node's inputs too.
pub fn from_socket(
    material: &Material,
    start: &ResolvedSocket,
    filter: &dyn Fn(&Node) -> bool,
) -> Vec<SearchResult> {
    if filter(material.node(start.socket.node)) {
        return vec![SearchResult {
            node: start.socket.node,
            path: Vec::new(),
            group_path: start.group_path.clone(),
        }];
    }

    let mut results = Vec::new();
    if start.socket.dir == SocketDir::Input {
        search_from_input(
            material,
            start.socket.node,
            start.socket.slot,
            filter,
            &Vec::new(),
            &start.group_path,
            &mut results,
        );
    }
    results
}

fn search_from_input(
    material: &Material,
    node: NodeId,
    in_slot: usize,
    filter: &dyn Fn(&Node) -> bool,
    path: &Vec<LinkRef>,
    group_path: &[NodeId],
    results: &mut Vec<SearchResult>,
) {
    let Some(link) = material.incoming_link(node, in_slot) else {
        return;
    };
    let link = *link;
    let linked = NodeId {
        tree: node.tree,
        node: link.from.node,
    };

    let mut next_path = path.clone();
    next_path.push(LinkRef {
        tree: node.tree,
        link,
    });

    match material.node(linked).kind {
        NodeKind::Group { tree } => {
            // Enter the group: continue from the group-output pseudo-node's
            // input matching the exited output slot by ordinal.
            let Some(group_output) = material
                .tree(tree)
                .find_node(|n| n.kind == NodeKind::GroupOutput)
            else {
                return;
            };
            let mut next_groups = group_path.to_vec();
            next_groups.push(linked);
            search_from_input(
                material,
                NodeId {
                    tree,
                    node: group_output,
                },
                link.from.socket,
                filter,
                &next_path,
                &next_groups,
                results,
            );
        }
        NodeKind::GroupInput => {
            // Leave the group: continue from the enclosing instance's input
            // matching the group-input output slot by ordinal.
            let Some((&enclosing, rest)) = group_path.split_last() else {
                return;
            };
            search_from_input(
                material,
                enclosing,
                link.from.socket,
                filter,
                &next_path,
                rest,
                results,
            );
        }
        _ => {
            if filter(material.node(linked)) {
                results.push(SearchResult {
                    node: linked,
                    path: next_path.clone(),
                    group_path: group_path.to_vec(),
                });
            }
            for slot in 0..material.node(linked).inputs.len() {
                search_from_input(
                    material, linked, slot, filter, &next_path, group_path, results,
                );
            }
        }
    }
}
