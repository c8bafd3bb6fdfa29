//! Backward traversal cursor over a material's node trees.
//!
//! `NodeNav` walks from an input socket to the node feeding it, skipping
//! reroute nodes and crossing group boundaries transparently. It carries its
//! own group-context stack, so the same cursor works whether the idiom being
//! matched is authored at the top level or nested inside groups.

use crate::graph::{
    Literal, Material, MathOp, MixBlend, MixData, Node, NodeId, NodeKind, Socket, SocketValue,
    ValueKind,
};

/// Group nesting deeper than this is treated as a defect in the input, not a
/// supported authoring pattern.
pub const MAX_GROUP_DEPTH: usize = 64;

/// Explicit input-socket selector. Every operation that reads an input takes
/// one; `Current` keeps whatever the cursor already has selected, making the
/// dependence on prior selection visible at the call site.
#[derive(Debug, Clone, Copy)]
pub enum InputSel<'a> {
    Current,
    Slot(usize),
    Name(&'a str),
    Ident(&'a str),
}

#[derive(Debug, Clone)]
struct GroupFrame {
    group: NodeId,
    /// Output slot on the group node we exited through. `None` for frames
    /// synthesized from a resolver group path, which never ascend through an
    /// output.
    out_slot: Option<usize>,
}

/// Ephemeral traversal state. Cloning yields an independent cursor (stack
/// included), so speculative walks cannot corrupt the caller's position.
#[derive(Debug, Clone)]
pub struct NodeNav<'a> {
    material: &'a Material,
    pub node: NodeId,
    /// Socket the cursor will leave through on the next `move_back`.
    pub in_slot: Option<usize>,
    /// Socket the cursor arrived at this node through.
    pub out_slot: Option<usize>,
    stack: Vec<GroupFrame>,
    /// Whether the last `move_back` actually advanced.
    pub moved: bool,
}

impl<'a> NodeNav<'a> {
    pub fn new(material: &'a Material, node: NodeId) -> Self {
        NodeNav {
            material,
            node,
            in_slot: None,
            out_slot: None,
            stack: Vec::new(),
            moved: false,
        }
    }

    pub(crate) fn with_group_path(mut self, group_path: &[NodeId]) -> Self {
        self.stack = group_path
            .iter()
            .map(|&group| GroupFrame {
                group,
                out_slot: None,
            })
            .collect();
        self
    }

    pub fn material(&self) -> &'a Material {
        self.material
    }

    pub fn current(&self) -> &'a Node {
        self.material.node(self.node)
    }

    pub fn in_socket(&self) -> Option<&'a Socket> {
        self.in_slot.map(|slot| &self.current().inputs[slot])
    }

    pub fn out_socket(&self) -> Option<&'a Socket> {
        self.out_slot.map(|slot| &self.current().outputs[slot])
    }

    /// Copy another cursor's state into this one.
    pub fn assign(&mut self, other: &NodeNav<'a>) {
        self.node = other.node;
        self.in_slot = other.in_slot;
        self.out_slot = other.out_slot;
        self.stack = other.stack.clone();
        self.moved = other.moved;
    }

    /// Select an input socket. Returns whether a socket is now selected; a
    /// miss clears the selection, so later reads decline instead of acting
    /// on a stale slot. Documents are free-form, so a node missing an
    /// expected socket simply is not the idiom being matched.
    pub fn select_input(&mut self, sel: InputSel) -> bool {
        match sel {
            InputSel::Current => {}
            InputSel::Slot(slot) => {
                self.in_slot = (slot < self.current().inputs.len()).then_some(slot);
            }
            InputSel::Name(name) => {
                self.in_slot = self.current().input_slot(name);
            }
            InputSel::Ident(ident) => {
                self.in_slot = self.current().input_slot_by_ident(ident);
            }
        }
        self.in_slot.is_some()
    }

    /// Move backwards through the selected input socket to the producing
    /// node. Returns whether the cursor advanced; an unconnected input leaves
    /// the state untouched.
    pub fn move_back(&mut self, sel: InputSel) -> bool {
        self.moved = false;
        self.select_input(sel);

        let Some(slot) = self.in_slot else {
            return false;
        };
        let Some(link) = self.material.incoming_link(self.node, slot) else {
            return false;
        };

        self.node = NodeId {
            tree: self.node.tree,
            node: link.from.node,
        };
        self.out_slot = Some(link.from.socket);
        self.in_slot = None;
        self.moved = true;

        match self.current().kind {
            NodeKind::Reroute => {
                self.move_back(InputSel::Slot(0));
            }
            NodeKind::Group { .. } => {
                self.descend();
                self.move_back(InputSel::Current);
            }
            NodeKind::GroupInput => {
                self.ascend();
                self.move_back(InputSel::Current);
            }
            _ => {}
        }

        self.moved
    }

    /// Pure variant of `move_back`: peeks through an input socket on a copy.
    pub fn peek_back(&self, sel: InputSel) -> NodeNav<'a> {
        let mut copy = self.clone();
        copy.move_back(sel);
        copy
    }

    /// Enter the group tree behind the current group node, repositioning to
    /// the group-output pseudo-node's input matching the exited output slot.
    fn descend(&mut self) {
        let NodeKind::Group { tree } = self.current().kind else {
            return;
        };
        let Some(out_slot) = self.out_slot else {
            return;
        };

        assert!(
            self.stack.len() < MAX_GROUP_DEPTH,
            "group nesting exceeds {MAX_GROUP_DEPTH} levels in material '{}'",
            self.material.name
        );
        self.stack.push(GroupFrame {
            group: self.node,
            out_slot: Some(out_slot),
        });

        let Some(group_output) = self
            .material
            .tree(tree)
            .find_node(|n| n.kind == NodeKind::GroupOutput)
        else {
            panic!(
                "group tree '{}' has no group-output node",
                self.material.tree(tree).name
            );
        };
        self.node = NodeId {
            tree,
            node: group_output,
        };
        // Group node outputs correspond by ordinal to group-output inputs.
        self.in_slot = Some(out_slot);
        self.out_slot = None;
    }

    /// Leave a group through its group-input pseudo-node, back to the group
    /// node recorded on the stack.
    fn ascend(&mut self) {
        if self.current().kind != NodeKind::GroupInput {
            return;
        }
        let Some(slot) = self.out_slot else {
            return;
        };
        let Some(frame) = self.stack.pop() else {
            return;
        };
        self.node = frame.group;
        self.out_slot = frame.out_slot;
        self.in_slot = Some(slot);
    }

    /// Extract a literal from an input socket: the socket's default when
    /// unconnected, or the value of a bare RGB/Value constant node one step
    /// back. Anything else is not a constant.
    pub fn get_constant(&mut self, sel: InputSel) -> Option<Literal> {
        self.select_input(sel);

        let slot = self.in_slot?;
        let socket = &self.current().inputs[slot];

        if self.material.incoming_link(self.node, slot).is_none() {
            return match socket.kind {
                ValueKind::Rgba => match socket.default {
                    // Drop the unused alpha component (shader tree convention).
                    Some(SocketValue::Color(c)) => Some(Literal::Color([c[0], c[1], c[2]])),
                    _ => None,
                },
                // Unlinked shader sockets read as black.
                ValueKind::Shader => Some(Literal::Color([0.0, 0.0, 0.0])),
                ValueKind::Vector => match socket.default {
                    Some(SocketValue::Vector(v)) => Some(Literal::Vector(v)),
                    _ => None,
                },
                ValueKind::Value => match socket.default {
                    Some(SocketValue::Scalar(v)) => Some(Literal::Scalar(v)),
                    _ => None,
                },
            };
        }

        let kind = socket.kind;
        let nav = self.peek_back(InputSel::Current);
        if nav.moved {
            match (kind, &nav.current().kind) {
                (ValueKind::Rgba, NodeKind::Rgb) => {
                    if let Some(SocketValue::Color(c)) = nav.out_socket().and_then(|s| s.default) {
                        return Some(Literal::Color([c[0], c[1], c[2]]));
                    }
                }
                (ValueKind::Value, NodeKind::Value) => {
                    if let Some(SocketValue::Scalar(v)) = nav.out_socket().and_then(|s| s.default) {
                        return Some(Literal::Scalar(v));
                    }
                }
                _ => {}
            }
        }

        None
    }

    /// Extract a factor: a constant, or the constant side of a multiply idiom
    /// (RGBA mix-multiply for colors, math-multiply for scalars). Returns
    /// `None` when neither or both operands are constant.
    pub fn get_factor(&mut self, sel: InputSel) -> Option<Literal> {
        self.select_input(sel);

        let slot = self.in_slot?;

        if let Some(c) = self.get_constant(InputSel::Current) {
            return Some(c);
        }

        let kind = self.current().inputs[slot].kind;
        let mut nav = self.peek_back(InputSel::Current);
        if nav.moved {
            let mut x1 = None;
            let mut x2 = None;

            match kind {
                ValueKind::Rgba => {
                    let is_mul = matches!(
                        nav.current().kind,
                        NodeKind::Mix {
                            data_type: MixData::Rgba,
                            blend: MixBlend::Multiply,
                        }
                    );
                    if is_mul {
                        x1 = nav.get_constant(InputSel::Ident("A_Color"));
                        x2 = nav.get_constant(InputSel::Ident("B_Color"));
                    }
                }
                ValueKind::Value => {
                    if nav.current().kind
                        == (NodeKind::Math {
                            operation: MathOp::Multiply,
                        })
                    {
                        x1 = nav.get_constant(InputSel::Slot(0));
                        x2 = nav.get_constant(InputSel::Slot(1));
                    }
                }
                _ => {}
            }

            match (x1, x2) {
                (Some(x), None) => return Some(x),
                (None, Some(x)) => return Some(x),
                _ => {}
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{AttributeDomain, Endpoint, Link, NodeTree, TreeId};

    fn single_tree(nodes: Vec<Node>, links: Vec<Link>) -> Material {
        Material {
            name: "m".to_string(),
            trees: vec![NodeTree {
                name: "root".to_string(),
                nodes,
                links,
            }],
        }
    }

    fn link(from: (usize, usize), to: (usize, usize)) -> Link {
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

    fn principled_alpha(default: f32) -> Node {
        Node::new("Principled BSDF", NodeKind::Principled)
            .with_inputs(vec![Socket::value("Alpha", default)])
            .with_outputs(vec![Socket::shader("BSDF")])
    }

    fn value_node(v: f32) -> Node {
        Node::new("Value", NodeKind::Value).with_outputs(vec![Socket::value("Value", v)])
    }

    #[test]
    fn unconnected_input_returns_default() {
        let material = single_tree(vec![principled_alpha(0.7)], vec![]);
        let mut nav = NodeNav::new(&material, NodeId {
            tree: TreeId(0),
            node: 0,
        });
        assert_eq!(
            nav.get_constant(InputSel::Name("Alpha")),
            Some(Literal::Scalar(0.7))
        );
        assert!(!nav.move_back(InputSel::Name("Alpha")));
    }

    #[test]
    fn value_node_is_a_constant() {
        let material = single_tree(
            vec![value_node(0.25), principled_alpha(1.0)],
            vec![link((0, 0), (1, 0))],
        );
        let mut nav = NodeNav::new(&material, NodeId {
            tree: TreeId(0),
            node: 1,
        });
        assert_eq!(
            nav.get_constant(InputSel::Name("Alpha")),
            Some(Literal::Scalar(0.25))
        );
    }

    #[test]
    fn reroute_nodes_are_transparent() {
        let material = single_tree(
            vec![
                value_node(0.4),
                Node::new("Reroute", NodeKind::Reroute)
                    .with_inputs(vec![Socket::value("Input", 0.0)])
                    .with_outputs(vec![Socket::value("Output", 0.0)]),
                principled_alpha(1.0),
            ],
            vec![link((0, 0), (1, 0)), link((1, 0), (2, 0))],
        );
        let mut nav = NodeNav::new(&material, NodeId {
            tree: TreeId(0),
            node: 2,
        });
        assert!(nav.move_back(InputSel::Name("Alpha")));
        assert_eq!(nav.current().kind, NodeKind::Value);
    }

    #[test]
    fn math_multiply_by_constant_is_a_factor() {
        let mul = Node::new(
            "Math",
            NodeKind::Math {
                operation: MathOp::Multiply,
            },
        )
        .with_inputs(vec![Socket::value("Value", 0.5), Socket::value("Value", 0.5)])
        .with_outputs(vec![Socket::value("Value", 0.0)]);
        // A texture would normally drive the other operand; an attribute node
        // stands in as "not a constant".
        let attr = Node::new(
            "Attribute",
            NodeKind::Attribute {
                domain: AttributeDomain::Geometry,
                name: "density".to_string(),
            },
        )
        .with_outputs(vec![Socket::value("Fac", 0.0)]);
        let material = single_tree(
            vec![attr, mul, principled_alpha(1.0)],
            vec![link((0, 0), (1, 0)), link((1, 0), (2, 0))],
        );
        let mut nav = NodeNav::new(&material, NodeId {
            tree: TreeId(0),
            node: 2,
        });
        assert_eq!(
            nav.get_factor(InputSel::Name("Alpha")),
            Some(Literal::Scalar(0.5))
        );
    }

    #[test]
    fn mix_without_color_identifiers_is_not_a_factor() {
        // A mix node authored without the A_Color/B_Color identifiers is not
        // the multiply idiom; extraction declines rather than raising.
        let mix = Node::new(
            "Mix",
            NodeKind::Mix {
                data_type: MixData::Rgba,
                blend: MixBlend::Multiply,
            },
        )
        .with_inputs(vec![
            Socket::value("Fac", 1.0),
            Socket::rgba("A", [0.5, 0.5, 0.5, 1.0]),
            Socket::rgba("B", [1.0, 1.0, 1.0, 1.0]),
        ])
        .with_outputs(vec![Socket::rgba("Result", [0.0, 0.0, 0.0, 1.0])]);
        let principled = Node::new("Principled BSDF", NodeKind::Principled)
            .with_inputs(vec![Socket::rgba("Base Color", [0.8, 0.8, 0.8, 1.0])])
            .with_outputs(vec![Socket::shader("BSDF")]);
        let material = single_tree(vec![mix, principled], vec![link((0, 0), (1, 0))]);
        let mut nav = NodeNav::new(&material, NodeId {
            tree: TreeId(0),
            node: 1,
        });
        assert_eq!(nav.get_factor(InputSel::Name("Base Color")), None);
    }

    #[test]
    fn selecting_a_missing_socket_clears_the_selection() {
        let material = single_tree(vec![principled_alpha(0.7)], vec![]);
        let mut nav = NodeNav::new(&material, NodeId {
            tree: TreeId(0),
            node: 0,
        });
        assert!(nav.select_input(InputSel::Name("Alpha")));
        assert!(!nav.select_input(InputSel::Name("Base Color")));
        assert_eq!(nav.get_constant(InputSel::Current), None);
        assert!(!nav.move_back(InputSel::Ident("A_Color")));
    }

    #[test]
    fn multiply_of_two_constants_is_ambiguous() {
        let mul = Node::new(
            "Math",
            NodeKind::Math {
                operation: MathOp::Multiply,
            },
        )
        .with_inputs(vec![Socket::value("Value", 0.5), Socket::value("Value", 0.5)])
        .with_outputs(vec![Socket::value("Value", 0.0)]);
        let material = single_tree(
            vec![mul, principled_alpha(1.0)],
            vec![link((0, 0), (1, 0))],
        );
        let mut nav = NodeNav::new(&material, NodeId {
            tree: TreeId(0),
            node: 1,
        });
        assert_eq!(nav.get_factor(InputSel::Name("Alpha")), None);
    }
}
