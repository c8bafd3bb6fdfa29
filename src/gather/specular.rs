//! Specular extension assembly.
//!
//! The target schema's `specularFactor` is twice the authored strength value
//! and is capped at 1.0; any excess is folded into the tint color instead.

use serde::Serialize;

use crate::graph::{Material, SocketValue};

use super::GatherReport;
use super::nav::InputSel;
use super::resolve::get_socket;
use super::search::ResolvedSocket;
use super::texture::{TextureSlot, gather_texture_info, has_image_node_from_socket};

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecularExtension {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specular_factor: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specular_color_factor: Option<[f32; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specular_texture: Option<TextureSlot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specular_color_texture: Option<TextureSlot>,
}

const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

fn is_unlinked(material: &Material, socket: &ResolvedSocket) -> bool {
    material
        .incoming_link(socket.socket.node, socket.socket.slot)
        .is_none()
}

fn default_scalar(material: &Material, socket: &ResolvedSocket) -> Option<f32> {
    match material.socket(socket.socket).default {
        Some(SocketValue::Scalar(v)) => Some(v),
        _ => None,
    }
}

fn default_color(material: &Material, socket: &ResolvedSocket) -> Option<[f32; 3]> {
    match material.socket(socket.socket).default {
        Some(SocketValue::Color(c)) => Some([c[0], c[1], c[2]]),
        _ => None,
    }
}

/// Assemble the specular extension, or `None` when both inputs sit at their
/// schema defaults (authored strength 0.5 and white tint).
pub fn export_specular(material: &Material, report: &mut GatherReport) -> Option<SpecularExtension> {
    let specular_socket = get_socket(material, "Specular IOR Level")?;
    let tint_socket = get_socket(material, "Specular Tint")?;

    let mut ext = SpecularExtension::default();
    let mut needed = false;

    // The running (doubled) strength factor; the tint branch folds it into
    // the color when it exceeds the schema maximum of 1.0.
    let mut fac: Option<f32>;

    if is_unlinked(material, &specular_socket) {
        let doubled = default_scalar(material, &specular_socket).map(|v| v * 2.0);
        fac = doubled;
        match doubled {
            Some(f) if f < 1.0 => {
                ext.specular_factor = Some(f);
                needed = true;
            }
            Some(f) if f > 1.0 => {
                // Factor must stay <= 1.0; the excess scales the tint below.
                needed = true;
            }
            _ => {}
        }
    } else {
        let mut nav = specular_socket.to_nav(material);
        fac = nav
            .get_factor(InputSel::Current)
            .and_then(|v| v.as_scalar());
        if let Some(f) = fac {
            if f != 1.0 {
                let doubled = f * 2.0;
                fac = Some(doubled);
                if doubled < 1.0 {
                    ext.specular_factor = Some(doubled);
                    needed = true;
                } else if doubled > 1.0 {
                    needed = true;
                }
            }
        }

        if has_image_node_from_socket(material, &specular_socket) {
            ext.specular_texture = gather_texture_info(material, &specular_socket, report);
            needed = true;
        }
    }

    if is_unlinked(material, &tint_socket) {
        if let Some(mut color) = default_color(material, &tint_socket) {
            if let Some(f) = fac {
                if f > 1.0 {
                    color = [color[0] * f, color[1] * f, color[2] * f];
                }
            }
            if color != WHITE {
                ext.specular_color_factor = Some(color);
                needed = true;
            }
        }
    } else {
        let mut nav = tint_socket.to_nav(material);
        let mut fac_color = nav.get_factor(InputSel::Current).and_then(|v| v.as_color());
        match (fac_color, fac) {
            (Some(c), Some(f)) if f > 1.0 => {
                fac_color = Some([c[0] * f, c[1] * f, c[2] * f]);
            }
            (None, Some(f)) if f > 1.0 => {
                fac_color = Some([f, f, f]);
            }
            _ => {}
        }
        if fac_color != Some(WHITE) {
            ext.specular_color_factor = fac_color;
            if fac_color.is_some() {
                needed = true;
            }
        }

        if has_image_node_from_socket(material, &tint_socket) {
            ext.specular_color_texture = gather_texture_info(material, &tint_socket, report);
            needed = true;
        }
    }

    if !needed {
        return None;
    }
    Some(ext)
}
