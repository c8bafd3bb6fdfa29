#![allow(dead_code)]

use material_gather::graph::{
    Endpoint, Link, Material, MathOp, Node, NodeKind, NodeTree, Socket,
};

// Input slots on the principled node built by `principled()`.
pub const BASE_COLOR: usize = 0;
pub const ALPHA: usize = 1;
pub const SPECULAR: usize = 2;
pub const SPECULAR_TINT: usize = 3;
pub const ANISOTROPIC: usize = 4;
pub const ANISOTROPIC_ROTATION: usize = 5;
pub const TANGENT: usize = 6;
pub const EMISSION_COLOR: usize = 7;

// Node indices in a `principled_material`. Extra nodes start at 2.
pub const PRINCIPLED: usize = 0;
pub const OUTPUT: usize = 1;

pub fn link(from: (usize, usize), to: (usize, usize)) -> Link {
    Link {
        from: Endpoint {
            node: from.0,
            socket: from.1,
        },
        to: Endpoint {
            node: to.0,
            socket: to.1,
        },
    }
}

pub fn principled() -> Node {
    Node::new("Principled BSDF", NodeKind::Principled)
        .with_inputs(vec![
            Socket::rgba("Base Color", [0.8, 0.8, 0.8, 1.0]),
            Socket::value("Alpha", 1.0),
            Socket::value("Specular IOR Level", 0.5),
            Socket::rgba("Specular Tint", [1.0, 1.0, 1.0, 1.0]),
            Socket::value("Anisotropic", 0.0),
            Socket::value("Anisotropic Rotation", 0.0),
            Socket::vector("Tangent", [0.0; 3]),
            Socket::rgba("Emission Color", [0.0, 0.0, 0.0, 1.0]),
        ])
        .with_outputs(vec![Socket::shader("BSDF")])
}

pub fn active_output() -> Node {
    Node::new(
        "Material Output",
        NodeKind::OutputMaterial { active: true },
    )
    .with_inputs(vec![Socket::shader("Surface")])
}

/// Single-tree material: principled (node 0) wired into an active output
/// (node 1), plus the caller's nodes starting at index 2.
pub fn principled_material(extra_nodes: Vec<Node>, extra_links: Vec<Link>) -> Material {
    let mut nodes = vec![principled(), active_output()];
    nodes.extend(extra_nodes);
    let mut links = vec![link((PRINCIPLED, 0), (OUTPUT, 0))];
    links.extend(extra_links);
    Material {
        name: "test".to_string(),
        trees: vec![NodeTree {
            name: "test".to_string(),
            nodes,
            links,
        }],
    }
}

/// Image texture with Color (output 0) and Alpha (output 1).
pub fn tex_node(image: &str) -> Node {
    Node::new(
        "Image Texture",
        NodeKind::TexImage {
            image: Some(image.to_string()),
        },
    )
    .with_inputs(vec![Socket::vector("Vector", [0.0; 3])])
    .with_outputs(vec![
        Socket::rgba("Color", [0.0, 0.0, 0.0, 1.0]),
        Socket::value("Alpha", 1.0),
    ])
}

pub fn math(operation: MathOp, a: f32, b: f32) -> Node {
    Node::new("Math", NodeKind::Math { operation })
        .with_inputs(vec![Socket::value("Value", a), Socket::value("Value", b)])
        .with_outputs(vec![Socket::value("Value", 0.0)])
}

pub fn value_node(v: f32) -> Node {
    Node::new("Value", NodeKind::Value).with_outputs(vec![Socket::value("Value", v)])
}
