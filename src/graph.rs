//! Host shader-graph document model.
//!
//! The gathering core only *reads* this structure; it is authored by the host
//! scene system (or loaded from a JSON document) and never mutated here.
//! Links are intra-tree; group nodes reference another tree by [`TreeId`],
//! and `GroupInput`/`GroupOutput` pseudo-nodes mark the boundary inside the
//! referenced tree.

use std::collections::HashMap;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Index of a node tree inside a [`Material`]. Tree 0 is the root tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreeId(pub usize);

/// Identifies a node across trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId {
    pub tree: TreeId,
    pub node: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SocketDir {
    Input,
    Output,
}

/// Identifies one socket on one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SocketRef {
    pub node: NodeId,
    pub dir: SocketDir,
    pub slot: usize,
}

/// Intra-tree link endpoint: node index + socket slot within that node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub node: usize,
    pub socket: usize,
}

/// A directed edge from an output socket to an input socket, within one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub from: Endpoint,
    pub to: Endpoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MathOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Round,
    LessThan,
    GreaterThan,
    Arctan2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VectorMathOp {
    Add,
    Multiply,
    MultiplyAdd,
    Normalize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MixData {
    Float,
    Rgba,
    Vector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MixBlend {
    Mix,
    Multiply,
    Add,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MappingMode {
    Point,
    Texture,
    Vector,
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttributeDomain {
    Geometry,
    Object,
    Instancer,
    ViewLayer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TangentDirection {
    UvMap,
    Radial,
}

/// Closed set of node kinds the gathering core understands.
///
/// Kind-specific parameters live on the variant; per-socket defaults live on
/// the sockets themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    Math { operation: MathOp },
    VectorMath { operation: VectorMathOp },
    Mix { data_type: MixData, blend: MixBlend },
    Rgb,
    Value,
    TexImage { image: Option<String> },
    Group { tree: TreeId },
    GroupInput,
    GroupOutput,
    Reroute,
    Attribute { domain: AttributeDomain, name: String },
    VertexColor { layer: String },
    Tangent { direction: TangentDirection, uv_map: String },
    SeparateXyz,
    Mapping { mode: MappingMode },
    UvMap { uv_map: String },
    OutputMaterial { active: bool },
    Principled,
    Emission,
    Background,
    VolumeAbsorption,
}

/// Declared value kind of a socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueKind {
    Value,
    Rgba,
    Vector,
    Shader,
}

/// Literal default carried by a socket. Colors keep their alpha channel here;
/// extraction drops it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SocketValue {
    Scalar(f32),
    Vector([f32; 3]),
    Color([f32; 4]),
}

/// A literal extracted from the graph (constants, factors). Colors have had
/// their alpha component dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    Scalar(f32),
    Color([f32; 3]),
    Vector([f32; 3]),
}

impl Literal {
    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            Literal::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<[f32; 3]> {
        match self {
            Literal::Color(c) => Some(*c),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Socket {
    pub name: String,
    /// Disambiguates colliding names (e.g. the Mix node's A/B inputs across
    /// data types). Falls back to `name` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    pub kind: ValueKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<SocketValue>,
}

impl Socket {
    pub fn value(name: &str, default: f32) -> Self {
        Socket {
            name: name.to_string(),
            identifier: None,
            kind: ValueKind::Value,
            default: Some(SocketValue::Scalar(default)),
        }
    }

    pub fn rgba(name: &str, default: [f32; 4]) -> Self {
        Socket {
            name: name.to_string(),
            identifier: None,
            kind: ValueKind::Rgba,
            default: Some(SocketValue::Color(default)),
        }
    }

    pub fn vector(name: &str, default: [f32; 3]) -> Self {
        Socket {
            name: name.to_string(),
            identifier: None,
            kind: ValueKind::Vector,
            default: Some(SocketValue::Vector(default)),
        }
    }

    pub fn shader(name: &str) -> Self {
        Socket {
            name: name.to_string(),
            identifier: None,
            kind: ValueKind::Shader,
            default: None,
        }
    }

    pub fn with_ident(mut self, ident: &str) -> Self {
        self.identifier = Some(ident.to_string());
        self
    }

    pub fn ident(&self) -> &str {
        self.identifier.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub mute: bool,
    #[serde(default)]
    pub inputs: Vec<Socket>,
    #[serde(default)]
    pub outputs: Vec<Socket>,
}

impl Node {
    pub fn new(name: &str, kind: NodeKind) -> Self {
        Node {
            name: name.to_string(),
            kind,
            mute: false,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_inputs(mut self, inputs: Vec<Socket>) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn with_outputs(mut self, outputs: Vec<Socket>) -> Self {
        self.outputs = outputs;
        self
    }

    /// Input slot by socket name (first match).
    pub fn input_slot(&self, name: &str) -> Option<usize> {
        self.inputs.iter().position(|s| s.name == name)
    }

    /// Input slot by socket identifier.
    pub fn input_slot_by_ident(&self, ident: &str) -> Option<usize> {
        self.inputs.iter().position(|s| s.ident() == ident)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeTree {
    pub name: String,
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl NodeTree {
    /// The single link feeding an input socket, if any. Shader trees disallow
    /// fan-in, which `validate_material` enforces at load time.
    pub fn incoming_link(&self, node: usize, socket: usize) -> Option<&Link> {
        self.links
            .iter()
            .find(|l| l.to.node == node && l.to.socket == socket)
    }

    pub fn outgoing_links(&self, node: usize, socket: usize) -> impl Iterator<Item = &Link> {
        self.links
            .iter()
            .filter(move |l| l.from.node == node && l.from.socket == socket)
    }

    /// Index of the first node matching the predicate.
    pub fn find_node(&self, pred: impl Fn(&Node) -> bool) -> Option<usize> {
        self.nodes.iter().position(|n| pred(n))
    }
}

/// A material's full node-graph: the root tree plus every group tree it uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub trees: Vec<NodeTree>,
}

impl Material {
    pub fn root_tree_id(&self) -> TreeId {
        TreeId(0)
    }

    pub fn tree(&self, id: TreeId) -> &NodeTree {
        &self.trees[id.0]
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.trees[id.tree.0].nodes[id.node]
    }

    pub fn socket(&self, s: SocketRef) -> &Socket {
        let node = self.node(s.node);
        match s.dir {
            SocketDir::Input => &node.inputs[s.slot],
            SocketDir::Output => &node.outputs[s.slot],
        }
    }

    pub fn input_ref(&self, node: NodeId, slot: usize) -> SocketRef {
        SocketRef {
            node,
            dir: SocketDir::Input,
            slot,
        }
    }

    pub fn output_ref(&self, node: NodeId, slot: usize) -> SocketRef {
        SocketRef {
            node,
            dir: SocketDir::Output,
            slot,
        }
    }

    pub fn incoming_link(&self, node: NodeId, socket: usize) -> Option<&Link> {
        self.tree(node.tree).incoming_link(node.node, socket)
    }
}

/// Load a material graph document from JSON text.
pub fn load_material_from_str(text: &str) -> Result<Material> {
    let material: Material =
        serde_json::from_str(text).context("failed to parse material graph json")?;
    validate_material(&material)?;
    Ok(material)
}

pub fn load_material_from_path(path: impl AsRef<std::path::Path>) -> Result<Material> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read material graph at {}", path.display()))?;
    load_material_from_str(&text)
}

/// Structural validation of a loaded document: endpoint ranges, single
/// incoming link per input, group tree references, and pseudo-node presence
/// inside group trees.
pub fn validate_material(material: &Material) -> Result<()> {
    if material.trees.is_empty() {
        bail!("material '{}' has no node trees", material.name);
    }

    let mut referenced_trees: Vec<TreeId> = Vec::new();

    for (tree_idx, tree) in material.trees.iter().enumerate() {
        let mut seen_inputs: HashMap<(usize, usize), ()> = HashMap::new();
        for link in &tree.links {
            let Some(from_node) = tree.nodes.get(link.from.node) else {
                bail!(
                    "tree '{}': link references missing source node {}",
                    tree.name,
                    link.from.node
                );
            };
            let Some(to_node) = tree.nodes.get(link.to.node) else {
                bail!(
                    "tree '{}': link references missing target node {}",
                    tree.name,
                    link.to.node
                );
            };
            if from_node.outputs.get(link.from.socket).is_none() {
                bail!(
                    "tree '{}': link leaves missing output socket {}.{}",
                    tree.name,
                    from_node.name,
                    link.from.socket
                );
            }
            if to_node.inputs.get(link.to.socket).is_none() {
                bail!(
                    "tree '{}': link enters missing input socket {}.{}",
                    tree.name,
                    to_node.name,
                    link.to.socket
                );
            }
            if seen_inputs
                .insert((link.to.node, link.to.socket), ())
                .is_some()
            {
                bail!(
                    "tree '{}': input socket {}.{} has more than one incoming link",
                    tree.name,
                    to_node.name,
                    link.to.socket
                );
            }
        }

        for node in &tree.nodes {
            if let NodeKind::Group { tree: sub } = node.kind {
                if sub.0 >= material.trees.len() {
                    bail!(
                        "tree '{}': group node '{}' references missing tree {}",
                        tree.name,
                        node.name,
                        sub.0
                    );
                }
                if sub.0 == tree_idx {
                    bail!(
                        "tree '{}': group node '{}' references its own tree",
                        tree.name,
                        node.name
                    );
                }
                referenced_trees.push(sub);
            }
        }
    }

    for sub in referenced_trees {
        let tree = material.tree(sub);
        if tree.find_node(|n| n.kind == NodeKind::GroupOutput).is_none() {
            bail!("group tree '{}' has no group-output node", tree.name);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_node(name: &str, v: f32) -> Node {
        Node::new(name, NodeKind::Value).with_outputs(vec![Socket::value("Value", v)])
    }

    #[test]
    fn incoming_link_is_unique_per_input() {
        let tree = NodeTree {
            name: "mat".to_string(),
            nodes: vec![
                value_node("a", 1.0),
                Node::new(
                    "mul",
                    NodeKind::Math {
                        operation: MathOp::Multiply,
                    },
                )
                .with_inputs(vec![Socket::value("Value", 0.5), Socket::value("Value", 0.5)])
                .with_outputs(vec![Socket::value("Value", 0.0)]),
            ],
            links: vec![
                Link {
                    from: Endpoint { node: 0, socket: 0 },
                    to: Endpoint { node: 1, socket: 0 },
                },
                Link {
                    from: Endpoint { node: 0, socket: 0 },
                    to: Endpoint { node: 1, socket: 0 },
                },
            ],
        };
        let material = Material {
            name: "m".to_string(),
            trees: vec![tree],
        };
        assert!(validate_material(&material).is_err());
    }

    #[test]
    fn load_document_round_trip() {
        let doc = r#"
        {
            "name": "checker",
            "trees": [
                {
                    "name": "checker",
                    "nodes": [
                        {
                            "name": "Value",
                            "kind": { "type": "Value" },
                            "outputs": [
                                { "name": "Value", "kind": "VALUE", "default": 0.25 }
                            ]
                        },
                        {
                            "name": "Math",
                            "kind": { "type": "Math", "operation": "MULTIPLY" },
                            "inputs": [
                                { "name": "Value", "kind": "VALUE", "default": 0.5 },
                                { "name": "Value", "kind": "VALUE", "default": 0.5 }
                            ],
                            "outputs": [
                                { "name": "Value", "kind": "VALUE", "default": 0.0 }
                            ]
                        }
                    ],
                    "links": [
                        { "from": { "node": 0, "socket": 0 }, "to": { "node": 1, "socket": 1 } }
                    ]
                }
            ]
        }
        "#;
        let material = load_material_from_str(doc).unwrap();
        assert_eq!(material.trees.len(), 1);
        assert_eq!(
            material.trees[0].nodes[1].kind,
            NodeKind::Math {
                operation: MathOp::Multiply
            }
        );
        let link = material.trees[0].incoming_link(1, 1).unwrap();
        assert_eq!(link.from.node, 0);
    }

    #[test]
    fn group_reference_out_of_range_is_rejected() {
        let material = Material {
            name: "m".to_string(),
            trees: vec![NodeTree {
                name: "root".to_string(),
                nodes: vec![Node::new("grp", NodeKind::Group { tree: TreeId(3) })],
                links: vec![],
            }],
        };
        assert!(validate_material(&material).is_err());
    }
}
