//! Anisotropy texture-chain recognition.
//!
//! A baked anisotropy texture cannot drive the shading inputs directly: the
//! texture's red/green channels encode a direction that must be decoded into
//! strength and rotation through a fixed arithmetic chain. This detector
//! matches that exact chain; any deviation means the graph is custom-authored
//! and has to be baked instead.

use crate::graph::{
    Link, Literal, Material, MathOp, NodeId, NodeKind, TangentDirection, VectorMathOp,
};

use super::nav::InputSel;
use super::search::ResolvedSocket;
use super::texture::has_image_node_from_socket;

/// The decoded chain: where the strength/rotation constants live, which UV
/// map the tangent uses, and the socket the anisotropy texture feeds.
#[derive(Debug, Clone, PartialEq)]
pub struct AnisotropyNodes {
    pub strength: Option<f32>,
    pub rotation: Option<f32>,
    pub tangent: String,
    pub tex_socket: ResolvedSocket,
}

fn is_linked(material: &Material, socket: &ResolvedSocket) -> bool {
    material
        .incoming_link(socket.socket.node, socket.socket.slot)
        .is_some()
}

/// The node and output slot feeding an input, within one tree. Unlike the
/// cursor this does not skip reroutes; the chain must be authored literally.
fn feeding(material: &Material, node: NodeId, in_slot: usize) -> Option<(NodeId, usize)> {
    let link = material.incoming_link(node, in_slot)?;
    Some((
        NodeId {
            tree: node.tree,
            node: link.from.node,
        },
        link.from.socket,
    ))
}

fn first_outgoing(material: &Material, node: NodeId, out_slot: usize) -> Option<Link> {
    material
        .tree(node.tree)
        .outgoing_links(node.node, out_slot)
        .next()
        .copied()
}

fn is_math(material: &Material, node: NodeId, op: MathOp) -> bool {
    material.node(node).kind == NodeKind::Math { operation: op }
}

fn vector_default(material: &Material, node: NodeId, slot: usize) -> Option<[f32; 3]> {
    if material.incoming_link(node, slot).is_some() {
        return None;
    }
    match material.node(node).inputs.get(slot)?.default {
        Some(crate::graph::SocketValue::Vector(v)) => Some(v),
        _ => None,
    }
}

/// Match the canonical anisotropy texture chain behind the three shading
/// inputs. `None` on any structural deviation.
pub fn detect_anisotropy(
    material: &Material,
    aniso_socket: &ResolvedSocket,
    rotation_socket: &ResolvedSocket,
    tangent_socket: &ResolvedSocket,
) -> Option<AnisotropyNodes> {
    // The tangent must come straight from a UV-map tangent node.
    let tangent_nav = tangent_socket.to_nav(material).peek_back(InputSel::Current);
    if !tangent_nav.moved {
        return None;
    }
    let NodeKind::Tangent {
        direction: TangentDirection::UvMap,
        uv_map,
    } = &tangent_nav.current().kind
    else {
        return None;
    };

    if !is_linked(material, aniso_socket) || !is_linked(material, rotation_socket) {
        return None;
    }

    // Strength: anisotropic input <- Multiply <- SeparateXYZ "Z" output.
    let (multiply, _) = feeding(material, aniso_socket.socket.node, aniso_socket.socket.slot)?;
    if !is_math(material, multiply, MathOp::Multiply) {
        return None;
    }
    let (separate, sep_out) = feeding(material, multiply, 0)?;
    if material.node(separate).kind != NodeKind::SeparateXyz {
        return None;
    }
    if material.node(separate).outputs.get(sep_out)?.name != "Z" {
        return None;
    }

    // Rotation: atan2(Y, X) -> Add -> Divide by tau -> rotation input.
    let to_arctan = first_outgoing(material, separate, 0)?;
    let arctan = NodeId {
        tree: separate.tree,
        node: to_arctan.to.node,
    };
    if !is_math(material, arctan, MathOp::Arctan2) {
        return None;
    }
    let (y_node, y_out) = feeding(material, arctan, 0)?;
    if y_node != separate || material.node(separate).outputs.get(y_out)?.name != "Y" {
        return None;
    }
    let (x_node, x_out) = feeding(material, arctan, 1)?;
    if x_node != separate || material.node(separate).outputs.get(x_out)?.name != "X" {
        return None;
    }

    let to_add = first_outgoing(material, arctan, 0)?;
    let add = NodeId {
        tree: arctan.tree,
        node: to_add.to.node,
    };
    if !is_math(material, add, MathOp::Add) {
        return None;
    }

    let to_divide = first_outgoing(material, add, 0)?;
    let divide = NodeId {
        tree: add.tree,
        node: to_divide.to.node,
    };
    if !is_math(material, divide, MathOp::Divide) {
        return None;
    }
    let mut divide_nav = ResolvedSocket::new(
        material.input_ref(divide, 1),
        aniso_socket.group_path.clone(),
    )
    .to_nav(material);
    let Some(Literal::Scalar(divisor)) = divide_nav.get_constant(InputSel::Current) else {
        return None;
    };
    if (divisor - std::f32::consts::TAU).abs() > 1e-4 {
        return None;
    }

    let to_rotation = first_outgoing(material, divide, 0)?;
    let rotation_target = NodeId {
        tree: divide.tree,
        node: to_rotation.to.node,
    };
    let target = material.node(rotation_target);
    if target.kind != NodeKind::Principled
        || target.inputs.get(to_rotation.to.socket)?.name != "Anisotropic Rotation"
    {
        return None;
    }

    // Texture decode: image color -> MultiplyAdd by (2,2,1) + (-1,-1,0).
    let (multiply_add, _) = feeding(material, separate, 0)?;
    if material.node(multiply_add).kind
        != (NodeKind::VectorMath {
            operation: VectorMathOp::MultiplyAdd,
        })
    {
        return None;
    }
    if vector_default(material, multiply_add, 1) != Some([2.0, 2.0, 1.0]) {
        return None;
    }
    if vector_default(material, multiply_add, 2) != Some([-1.0, -1.0, 0.0]) {
        return None;
    }
    let (tex, _) = feeding(material, multiply_add, 0)?;
    if !matches!(material.node(tex).kind, NodeKind::TexImage { .. }) {
        return None;
    }

    let tex_socket = ResolvedSocket::new(
        material.input_ref(multiply_add, 0),
        aniso_socket.group_path.clone(),
    );
    if !has_image_node_from_socket(material, &tex_socket) {
        return None;
    }

    let strength = ResolvedSocket::new(
        material.input_ref(multiply, 1),
        aniso_socket.group_path.clone(),
    )
    .to_nav(material)
    .get_constant(InputSel::Current)
    .and_then(|v| v.as_scalar());
    let rotation = ResolvedSocket::new(
        material.input_ref(add, 1),
        aniso_socket.group_path.clone(),
    )
    .to_nav(material)
    .get_constant(InputSel::Current)
    .and_then(|v| v.as_scalar());

    Some(AnisotropyNodes {
        strength,
        rotation,
        tangent: uv_map.clone(),
        tex_socket,
    })
}
