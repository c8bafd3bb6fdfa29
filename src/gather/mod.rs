//! Material gathering: pattern recognition over the shading graph.
//!
//! The submodules each recognize one authoring idiom (alpha chains, vertex
//! colors, specular, anisotropy, UV transforms); [`gather_material`] runs
//! them all and assembles the portable summary. Detectors return `None` on a
//! non-matching graph, which is an expected outcome, not an error.

pub mod alpha;
pub mod anisotropy;
pub mod nav;
pub mod reach;
pub mod resolve;
pub mod search;
pub mod specular;
pub mod texture;
pub mod uv_transform;
pub mod vertex_color;

use serde::Serialize;

use crate::graph::Material;

use self::alpha::AlphaInfo;
use self::specular::SpecularExtension;
use self::texture::TextureSlot;
use self::vertex_color::VertexColorInfo;

/// Advisory diagnostics accumulated during a gather. Warnings mean a
/// recognizable setup was close but had to be skipped; the gather itself
/// always completes.
#[derive(Debug, Clone, Default)]
pub struct GatherReport {
    pub warnings: Vec<String>,
}

impl GatherReport {
    pub fn warn(&mut self, msg: String) {
        eprintln!("[material] {msg}");
        self.warnings.push(msg);
    }
}

/// Serializable anisotropy summary, with the texture slot gathered from the
/// recognized chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnisotropyInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
    pub tangent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub texture: Option<TextureSlot>,
}

/// Everything the gather recognized about one material.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialBundle {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha: Option<AlphaInfo>,
    pub vertex_color: VertexColorInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_color_texture: Option<TextureSlot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specular: Option<SpecularExtension>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anisotropy: Option<AnisotropyInfo>,
}

/// Run every detector against `material` and collect the results along with
/// any advisory warnings.
pub fn gather_material(material: &Material) -> (MaterialBundle, GatherReport) {
    let mut report = GatherReport::default();

    let alpha_socket = resolve::get_socket(material, "Alpha");
    let base_color_socket = resolve::get_socket(material, "Base Color");

    let alpha = alpha::gather_alpha_info(alpha_socket.as_ref().map(|s| s.to_nav(material)));

    let vertex_color = vertex_color::get_vertex_color_info(
        material,
        base_color_socket.as_ref(),
        alpha_socket.as_ref(),
    );

    let base_color_texture = base_color_socket
        .as_ref()
        .and_then(|s| texture::gather_texture_info(material, s, &mut report));

    let specular = specular::export_specular(material, &mut report);

    let anisotropy = match (
        resolve::get_socket(material, "Anisotropic"),
        resolve::get_socket(material, "Anisotropic Rotation"),
        resolve::get_socket(material, "Tangent"),
    ) {
        (Some(aniso), Some(rotation), Some(tangent)) => {
            anisotropy::detect_anisotropy(material, &aniso, &rotation, &tangent).map(|nodes| {
                AnisotropyInfo {
                    strength: nodes.strength,
                    rotation: nodes.rotation,
                    tangent: nodes.tangent,
                    texture: texture::gather_texture_info(material, &nodes.tex_socket, &mut report),
                }
            })
        }
        _ => None,
    };

    let bundle = MaterialBundle {
        name: material.name.clone(),
        alpha,
        vertex_color,
        base_color_texture,
        specular,
        anisotropy,
    };
    (bundle, report)
}
