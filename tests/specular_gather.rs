mod common;

use common::{PRINCIPLED, SPECULAR, SPECULAR_TINT, link, math, principled_material, tex_node};
use material_gather::gather_material;
use material_gather::graph::{MathOp, Socket};

fn with_specular_default(v: f32) -> material_gather::Material {
    let mut material = principled_material(vec![], vec![]);
    material.trees[0].nodes[PRINCIPLED].inputs[SPECULAR] =
        Socket::value("Specular IOR Level", v);
    material
}

#[test]
fn default_strength_produces_no_extension() {
    // 0.5 doubles to exactly 1.0, the schema default.
    let (bundle, _) = gather_material(&with_specular_default(0.5));
    assert_eq!(bundle.specular, None);
}

#[test]
fn low_strength_becomes_a_factor() {
    let (bundle, _) = gather_material(&with_specular_default(0.3));
    let ext = bundle.specular.unwrap();
    assert_eq!(ext.specular_factor, Some(0.3f32 * 2.0));
    assert_eq!(ext.specular_color_factor, None);
    assert_eq!(ext.specular_texture, None);
}

#[test]
fn high_strength_spills_into_the_tint() {
    // 0.8 doubles past the factor cap; the excess scales the (white) tint.
    let (bundle, _) = gather_material(&with_specular_default(0.8));
    let ext = bundle.specular.unwrap();
    let f = 0.8f32 * 2.0;
    assert_eq!(ext.specular_factor, None);
    assert_eq!(ext.specular_color_factor, Some([f, f, f]));
}

#[test]
fn authored_tint_is_reported() {
    let mut material = principled_material(vec![], vec![]);
    material.trees[0].nodes[PRINCIPLED].inputs[SPECULAR_TINT] =
        Socket::rgba("Specular Tint", [0.2, 0.4, 0.6, 1.0]);
    let (bundle, _) = gather_material(&material);
    let ext = bundle.specular.unwrap();
    assert_eq!(ext.specular_factor, None);
    assert_eq!(ext.specular_color_factor, Some([0.2, 0.4, 0.6]));
}

#[test]
fn textured_strength_keeps_texture_and_factor() {
    // tex alpha -> Multiply by 0.3 -> Specular IOR Level
    let material = principled_material(
        vec![tex_node("spec.png"), math(MathOp::Multiply, 0.0, 0.3)],
        vec![link((2, 1), (3, 0)), link((3, 0), (PRINCIPLED, SPECULAR))],
    );
    let (bundle, _) = gather_material(&material);
    let ext = bundle.specular.unwrap();
    assert_eq!(ext.specular_factor, Some(0.3f32 * 2.0));
    assert_eq!(ext.specular_texture.unwrap().image, "spec.png");
}
