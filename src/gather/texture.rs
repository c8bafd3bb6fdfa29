//! Texture-node lookup and UV-mapping metadata collection.

use serde::Serialize;

use crate::graph::{Material, NodeKind};

use super::GatherReport;
use super::nav::{InputSel, NodeNav};
use super::search::{ResolvedSocket, SearchResult, from_socket};
use super::uv_transform::{TextureTransform, texture_transform_from_mapping_node};

/// A texture feeding a material input, with any UV-mapping metadata found on
/// its vector chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureSlot {
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uv_map: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<TextureTransform>,
}

/// First image-texture node found behind `socket`, or `None` when there is
/// none or the one found has no image bound.
pub fn texture_node_from_socket(
    material: &Material,
    socket: &ResolvedSocket,
) -> Option<SearchResult> {
    let results = from_socket(material, socket, &|n| {
        matches!(n.kind, NodeKind::TexImage { .. })
    });
    let first = results.into_iter().next()?;
    let NodeKind::TexImage { image } = &material.node(first.node).kind else {
        unreachable!("filter only matches image textures");
    };
    if image.is_none() {
        return None;
    }
    Some(first)
}

pub fn has_image_node_from_socket(material: &Material, socket: &ResolvedSocket) -> bool {
    texture_node_from_socket(material, socket).is_some()
}

/// Texture slot plus UV metadata for the texture behind `socket`: the UV map
/// name and any mapping-node transform on the texture's vector input.
pub fn gather_texture_info(
    material: &Material,
    socket: &ResolvedSocket,
    report: &mut GatherReport,
) -> Option<TextureSlot> {
    let found = texture_node_from_socket(material, socket)?;
    let NodeKind::TexImage { image: Some(image) } = &material.node(found.node).kind else {
        unreachable!("texture_node_from_socket only returns bound textures");
    };

    let mut slot = TextureSlot {
        image: image.clone(),
        uv_map: None,
        transform: None,
    };

    if material.node(found.node).input_slot("Vector").is_none() {
        return Some(slot);
    }

    let mut nav =
        NodeNav::new(material, found.node).with_group_path(&found.group_path);
    if !nav.move_back(InputSel::Name("Vector")) {
        return Some(slot);
    }

    if let NodeKind::Mapping { .. } = nav.current().kind {
        slot.transform = texture_transform_from_mapping_node(material, nav.node, report);
        if !nav.move_back(InputSel::Name("Vector")) {
            return Some(slot);
        }
    }

    if let NodeKind::UvMap { uv_map } = &nav.current().kind {
        slot.uv_map = Some(uv_map.clone());
    }

    Some(slot)
}
