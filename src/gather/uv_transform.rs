//! Texture-transform extraction from a mapping node.
//!
//! Reads the mapping node's TRS inputs, inverts them for texture-space
//! mappings, converts to the export convention and prunes default-valued
//! fields. Unsupported configurations decline with an advisory warning; they
//! never fail the surrounding gather.

use serde::Serialize;

use crate::graph::{MappingMode, Material, NodeId, NodeKind, SocketValue};

use super::GatherReport;

/// Offset/rotation/scale in the export convention. Absent fields mean the
/// schema default (zero offset, zero rotation, unit scale).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureTransform {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<[f32; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<[f32; 2]>,
}

#[derive(Debug, Clone, Copy)]
struct Trs {
    offset: [f32; 2],
    rotation: f32,
    scale: [f32; 2],
}

const EPS: f32 = 1e-5;

fn input_vector(material: &Material, node: NodeId, name: &str) -> Option<[f32; 3]> {
    let n = material.node(node);
    let slot = n.input_slot(name)?;
    match n.inputs[slot].default {
        Some(SocketValue::Vector(v)) => Some(v),
        _ => None,
    }
}

/// Extract the UV transform authored on a mapping node, or `None` (with a
/// warning) when the configuration cannot be represented as a TRS in the
/// export convention. Returns `None` without a warning when the transform is
/// entirely default.
pub fn texture_transform_from_mapping_node(
    material: &Material,
    mapping: NodeId,
    report: &mut GatherReport,
) -> Option<TextureTransform> {
    let NodeKind::Mapping { mode } = material.node(mapping).kind else {
        panic!(
            "texture_transform_from_mapping_node called on non-mapping node '{}'",
            material.node(mapping).name
        );
    };

    if !matches!(
        mode,
        MappingMode::Texture | MappingMode::Point | MappingMode::Vector
    ) {
        report.warn(format!(
            "skipping texture transform: mapping mode {mode:?} is not supported; use POINT instead"
        ));
        return None;
    }

    let (Some(location), Some(rotation), Some(scale)) = (
        input_vector(material, mapping, "Location"),
        input_vector(material, mapping, "Rotation"),
        input_vector(material, mapping, "Scale"),
    ) else {
        report.warn(format!(
            "skipping texture transform: mapping node '{}' is missing its transform inputs",
            material.node(mapping).name
        ));
        return None;
    };

    if rotation[0] != 0.0 || rotation[1] != 0.0 {
        report.warn(
            "skipping texture transform: non-zero X/Y rotation; only a Z rotation can be exported"
                .to_string(),
        );
        return None;
    }

    let mut trs = Trs {
        offset: if mode == MappingMode::Vector {
            // Vectors don't get translated.
            [0.0, 0.0]
        } else {
            [location[0], location[1]]
        },
        rotation: rotation[2],
        scale: [scale[0], scale[1]],
    };

    if mode == MappingMode::Texture {
        // Texture mode means "apply the inverse of this TRS".
        let Some(inv) = inverted(trs) else {
            report.warn(
                "skipping texture transform: TEXTURE-mode transform has no TRS inverse; \
                 use POINT instead"
                    .to_string(),
            );
            return None;
        };
        trs = inv;
    }

    let converted = to_export_convention(trs);

    let transform = TextureTransform {
        offset: (converted.offset != [0.0, 0.0]).then_some(converted.offset),
        rotation: (converted.rotation != 0.0).then_some(converted.rotation),
        scale: (converted.scale != [1.0, 1.0]).then_some(converted.scale),
    };

    if transform == TextureTransform::default() {
        return None;
    }
    Some(transform)
}

/// Closed-form inverse of a TRS. The inverse of a TRS is not always a TRS;
/// declines when rotation is non-negligible with unequal scale axes, or when
/// either scale axis is near zero.
fn inverted(trs: Trs) -> Option<Trs> {
    let Trs {
        offset,
        rotation,
        scale,
    } = trs;

    if rotation.abs() > EPS && (scale[0] - scale[1]).abs() > EPS {
        return None;
    }
    if scale[0].abs() < EPS || scale[1].abs() < EPS {
        return None;
    }

    // Rotate (-offset) by -rotation, then divide by scale.
    let (sin_r, cos_r) = rotation.sin_cos();
    let x = cos_r * -offset[0] + sin_r * -offset[1];
    let y = -sin_r * -offset[0] + cos_r * -offset[1];

    Some(Trs {
        offset: [x / scale[0], y / scale[1]],
        rotation: -rotation,
        scale: [1.0 / scale[0], 1.0 / scale[1]],
    })
}

/// Convert from the authoring convention (UV origin bottom-left) to the
/// export convention (origin top-left). Sign and order here are a bit-exact
/// contract with the serializer.
fn to_export_convention(trs: Trs) -> Trs {
    let (sin_r, cos_r) = trs.rotation.sin_cos();
    Trs {
        offset: [
            trs.offset[0] - trs.scale[1] * sin_r,
            1.0 - trs.offset[1] - trs.scale[1] * cos_r,
        ],
        rotation: trs.rotation,
        scale: trs.scale,
    }
}
