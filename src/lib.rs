//! Shader node-graph analysis core for portable material export.
//!
//! Takes a host material graph (see [`graph`]) and recognizes the authoring
//! idioms an exporter can represent portably: alpha chains, vertex-color
//! attribution, specular, anisotropy texture chains and UV transforms. The
//! entry point is [`gather_material`].

pub mod codec;
pub mod gather;
pub mod graph;

pub use gather::{GatherReport, MaterialBundle, gather_material};
pub use graph::{Material, load_material_from_path, load_material_from_str};
