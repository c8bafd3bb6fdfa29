//! Vertex-color attribution for the base color and alpha inputs.

use serde::Serialize;

use crate::graph::{AttributeDomain, Material, MixBlend, MixData, NodeKind};

use super::alpha::{ColorAttrib, gather_alpha_info};
use super::nav::{InputSel, NodeNav};
use super::search::ResolvedSocket;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AttribSource {
    Name,
    Active,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VertexColorInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_type: Option<AttribSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha_type: Option<AttribSource>,
}

/// Which color attribute (if any) a node reads. Unlike the alpha-path
/// detection, a geometry attribute node with a blank name counts as the
/// active render attribute here.
fn attrib_of_node(kind: &NodeKind) -> Option<ColorAttrib> {
    match kind {
        NodeKind::VertexColor { layer } => {
            if layer.is_empty() {
                Some(ColorAttrib::ActiveRender)
            } else {
                Some(ColorAttrib::Named(layer.clone()))
            }
        }
        NodeKind::Attribute {
            domain: AttributeDomain::Geometry,
            name,
        } => {
            if name.is_empty() {
                Some(ColorAttrib::ActiveRender)
            } else {
                Some(ColorAttrib::Named(name.clone()))
            }
        }
        _ => None,
    }
}

fn attrib_behind_input(nav: &NodeNav<'_>) -> Option<ColorAttrib> {
    let peek = nav.peek_back(InputSel::Current);
    if !peek.moved {
        return None;
    }
    attrib_of_node(&peek.current().kind)
}

fn split(attr: ColorAttrib) -> (Option<String>, AttribSource) {
    match attr {
        ColorAttrib::Named(name) => (Some(name), AttribSource::Name),
        ColorAttrib::ActiveRender => (None, AttribSource::Active),
    }
}

/// Determine which color attributes drive the base color and alpha inputs.
///
/// The color side recognizes either a direct attribute node or an attribute
/// behind one operand of a mix-multiply; the alpha side reuses the alpha
/// gathering.
pub fn get_vertex_color_info(
    material: &Material,
    color_socket: Option<&ResolvedSocket>,
    alpha_socket: Option<&ResolvedSocket>,
) -> VertexColorInfo {
    let mut info = VertexColorInfo::default();

    if let Some(color_socket) = color_socket {
        let nav = color_socket.to_nav(material);
        let prev = nav.peek_back(InputSel::Current);
        if prev.moved {
            let attr = match &prev.current().kind {
                NodeKind::Mix {
                    data_type: MixData::Rgba,
                    blend: MixBlend::Multiply,
                } => {
                    let mut a = prev.clone();
                    a.select_input(InputSel::Ident("A_Color"));
                    attrib_behind_input(&a).or_else(|| {
                        let mut b = prev.clone();
                        b.select_input(InputSel::Ident("B_Color"));
                        attrib_behind_input(&b)
                    })
                }
                kind @ (NodeKind::Attribute { .. } | NodeKind::VertexColor { .. }) => {
                    attrib_of_node(kind)
                }
                _ => None,
            };
            if let Some(attr) = attr {
                let (name, source) = split(attr);
                info.color = name;
                info.color_type = Some(source);
            }
        }
    }

    if let Some(alpha_socket) = alpha_socket {
        let alpha_info = gather_alpha_info(Some(alpha_socket.to_nav(material)));
        if let Some(attr) = alpha_info.and_then(|i| i.alpha_color_attrib) {
            let (name, source) = split(attr);
            info.alpha = name;
            info.alpha_type = Some(source);
        }
    }

    info
}
