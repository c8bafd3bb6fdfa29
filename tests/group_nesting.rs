mod common;

use common::{ALPHA, link, principled, tex_node};
use material_gather::gather::alpha::AlphaMode;
use material_gather::gather_material;
use material_gather::graph::{Material, MathOp, Node, NodeKind, NodeTree, Socket, TreeId};

/// Root tree: tex alpha -> group -> active output.
/// Group tree: group input -> multiply by 0.25 -> principled -> group output.
fn grouped_material() -> Material {
    let root = NodeTree {
        name: "root".to_string(),
        nodes: vec![
            tex_node("glass.png"),
            Node::new("Group", NodeKind::Group { tree: TreeId(1) })
                .with_inputs(vec![Socket::value("Alpha In", 1.0)])
                .with_outputs(vec![Socket::shader("Shader")]),
            Node::new(
                "Material Output",
                NodeKind::OutputMaterial { active: true },
            )
            .with_inputs(vec![Socket::shader("Surface")]),
        ],
        links: vec![link((0, 1), (1, 0)), link((1, 0), (2, 0))],
    };

    let group = NodeTree {
        name: "shading group".to_string(),
        nodes: vec![
            Node::new("Group Input", NodeKind::GroupInput)
                .with_outputs(vec![Socket::value("Alpha In", 1.0)]),
            Node::new(
                "Math",
                NodeKind::Math {
                    operation: MathOp::Multiply,
                },
            )
            .with_inputs(vec![Socket::value("Value", 0.0), Socket::value("Value", 0.25)])
            .with_outputs(vec![Socket::value("Value", 0.0)]),
            principled(),
            Node::new("Group Output", NodeKind::GroupOutput)
                .with_inputs(vec![Socket::shader("Shader")]),
        ],
        links: vec![
            link((0, 0), (1, 0)),
            link((1, 0), (2, ALPHA)),
            link((2, 0), (3, 0)),
        ],
    };

    Material {
        name: "grouped".to_string(),
        trees: vec![root, group],
    }
}

#[test]
fn detectors_see_through_group_boundaries() {
    // The factor sits inside the group, the texture outside; the multiply
    // idiom must be recognized across the boundary.
    let (bundle, _) = gather_material(&grouped_material());
    let alpha = bundle.alpha.unwrap();
    assert_eq!(alpha.alpha_mode, AlphaMode::Blend);
    assert_eq!(alpha.alpha_factor, Some(0.25));
}

#[test]
fn nested_principled_resolves_like_a_top_level_one() {
    // Same chain authored without the group.
    let flat = {
        let nodes = vec![
            principled(),
            Node::new(
                "Material Output",
                NodeKind::OutputMaterial { active: true },
            )
            .with_inputs(vec![Socket::shader("Surface")]),
            tex_node("glass.png"),
            Node::new(
                "Math",
                NodeKind::Math {
                    operation: MathOp::Multiply,
                },
            )
            .with_inputs(vec![Socket::value("Value", 0.0), Socket::value("Value", 0.25)])
            .with_outputs(vec![Socket::value("Value", 0.0)]),
        ];
        Material {
            name: "flat".to_string(),
            trees: vec![NodeTree {
                name: "flat".to_string(),
                nodes,
                links: vec![
                    link((0, 0), (1, 0)),
                    link((2, 1), (3, 0)),
                    link((3, 0), (0, ALPHA)),
                ],
            }],
        }
    };

    let (flat_bundle, _) = gather_material(&flat);
    let (grouped_bundle, _) = gather_material(&grouped_material());
    assert_eq!(flat_bundle.alpha, grouped_bundle.alpha);
}

#[test]
fn muted_group_is_not_resolved() {
    let mut material = grouped_material();
    material.trees[0].nodes[1].mute = true;
    let (bundle, _) = gather_material(&material);
    // The only principled node lives inside the muted group.
    assert_eq!(bundle.alpha, None);
}
