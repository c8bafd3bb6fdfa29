//! Socket resolver: canonical material input name -> graph socket.
//!
//! Maps names like "Base Color" or "Specular IOR Level" onto the correct
//! canonical shading node inside the (possibly group-nested) graph, keeping
//! only candidates that actually drive the active output.

use crate::graph::{Material, Node, NodeId, NodeKind, TreeId};

use super::reach::links_to_active_output;
use super::search::ResolvedSocket;

/// Tree name of the dedicated exporter-settings node group.
pub const SETTINGS_GROUP_NAME: &str = "glTF Material Output";
/// Legacy name of the same group, still accepted on old files.
pub const SETTINGS_GROUP_OLD_NAME: &str = "glTF Settings";
/// Legacy baked-material group; never descended into during resolution.
pub const LEGACY_BAKED_GROUP_NAME: &str = "glTF Metallic Roughness";

/// All non-muted nodes matching `filter`, across the root tree and every
/// nested group, each with the group path used to reach it. Outer graph
/// first, declaration order within a level.
pub fn material_nodes(
    material: &Material,
    filter: &dyn Fn(&Node) -> bool,
) -> Vec<(NodeId, Vec<NodeId>)> {
    let mut out = Vec::new();
    collect_nodes(
        material,
        material.root_tree_id(),
        &Vec::new(),
        filter,
        &mut out,
    );
    out
}

fn collect_nodes(
    material: &Material,
    tree_id: TreeId,
    group_path: &Vec<NodeId>,
    filter: &dyn Fn(&Node) -> bool,
    out: &mut Vec<(NodeId, Vec<NodeId>)>,
) {
    let tree = material.tree(tree_id);

    for (idx, node) in tree.nodes.iter().enumerate() {
        if !node.mute && filter(node) {
            out.push((
                NodeId {
                    tree: tree_id,
                    node: idx,
                },
                group_path.clone(),
            ));
        }
    }

    for (idx, node) in tree.nodes.iter().enumerate() {
        let NodeKind::Group { tree: sub } = node.kind else {
            continue;
        };
        if node.mute || material.tree(sub).name == LEGACY_BAKED_GROUP_NAME {
            continue;
        }
        let mut next = group_path.clone();
        next.push(NodeId {
            tree: tree_id,
            node: idx,
        });
        collect_nodes(material, sub, &next, filter, out);
    }
}

/// Locate the input socket `name` on the first node matching `filter` that is
/// forward-reachable to the active output.
pub fn get_node_socket(
    material: &Material,
    filter: &dyn Fn(&Node) -> bool,
    name: &str,
) -> Option<ResolvedSocket> {
    for (node_id, group_path) in material_nodes(material, filter) {
        let node = material.node(node_id);
        if node.outputs.is_empty() {
            continue;
        }
        if !links_to_active_output(material, material.output_ref(node_id, 0), &group_path) {
            continue;
        }
        if let Some(slot) = node.input_slot(name) {
            return Some(ResolvedSocket::new(
                material.input_ref(node_id, slot),
                group_path,
            ));
        }
    }
    None
}

/// Resolve a canonical material input name to its socket.
///
/// "Emissive" prefers a dedicated emission node (it must supersede the
/// built-in principled input, which is always present); "Background" maps to
/// the background node. Everything else maps to the principled BSDF.
pub fn get_socket(material: &Material, name: &str) -> Option<ResolvedSocket> {
    resolve(material, name, false)
}

/// Volume-specific variant: ordinary names resolve against the volume
/// absorption node instead of the principled BSDF.
pub fn get_socket_volume(material: &Material, name: &str) -> Option<ResolvedSocket> {
    resolve(material, name, true)
}

fn resolve(material: &Material, name: &str, volume: bool) -> Option<ResolvedSocket> {
    match name {
        "Emissive" => {
            let dedicated =
                get_node_socket(material, &|n| n.kind == NodeKind::Emission, "Color");
            if dedicated.is_some() {
                return dedicated;
            }
            get_node_socket(material, &|n| n.kind == NodeKind::Principled, "Emission Color")
        }
        "Background" => get_node_socket(material, &|n| n.kind == NodeKind::Background, "Color"),
        _ if volume => {
            get_node_socket(material, &|n| n.kind == NodeKind::VolumeAbsorption, name)
        }
        _ => get_node_socket(material, &|n| n.kind == NodeKind::Principled, name),
    }
}

/// Locate `name` among the inputs of an instance of the dedicated exporter
/// settings group (current or legacy name). These inputs carry export-only
/// values that have no principled-BSDF counterpart.
pub fn get_socket_from_settings_group(material: &Material, name: &str) -> Option<ResolvedSocket> {
    let group_names = [
        SETTINGS_GROUP_NAME.to_ascii_lowercase(),
        SETTINGS_GROUP_OLD_NAME.to_ascii_lowercase(),
    ];

    let groups = material_nodes(material, &|n| matches!(n.kind, NodeKind::Group { .. }));
    for (node_id, group_path) in groups {
        let node = material.node(node_id);
        let NodeKind::Group { tree } = node.kind else {
            continue;
        };
        let tree_name = material.tree(tree).name.to_ascii_lowercase();
        if !group_names.iter().any(|g| tree_name.starts_with(g.as_str())) {
            continue;
        }
        if let Some(slot) = node.input_slot(name) {
            return Some(ResolvedSocket::new(
                material.input_ref(node_id, slot),
                group_path,
            ));
        }
    }
    None
}
