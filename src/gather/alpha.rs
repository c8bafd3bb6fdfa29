//! Alpha gathering from the Alpha input.
//!
//! Alpha has the general form
//!
//!   alpha = alpha_clip(factor * color attribute * texture)
//!
//! and the mode (opaque / mask / blend) is inferred from the nodes alone.

use serde::Serialize;

use crate::graph::{
    AttributeDomain, Literal, MathOp, MixBlend, MixData, NodeKind, ValueKind,
};

use super::nav::{InputSel, NodeNav};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlphaMode {
    Opaque,
    Mask,
    Blend,
}

/// A color attribute feeding a material input. A blank layer name on a
/// vertex-color node means "use the active render color attribute", which is
/// a distinct signal, not absence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ColorAttrib {
    Named(String),
    ActiveRender,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlphaInfo {
    pub alpha_mode: AlphaMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha_cutoff: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha_factor: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alpha_color_attrib: Option<ColorAttrib>,
}

/// Gather alpha information starting from a cursor positioned on the Alpha
/// input socket. `None` when the material has no alpha socket at all.
pub fn gather_alpha_info(nav: Option<NodeNav<'_>>) -> Option<AlphaInfo> {
    let mut nav = nav?;

    // Opaque?
    if nav.get_constant(InputSel::Current) == Some(Literal::Scalar(1.0)) {
        return Some(AlphaInfo {
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: None,
            alpha_factor: None,
            alpha_color_attrib: None,
        });
    }

    let mut mode = None;
    let mut cutoff = None;
    if let Some(c) = detect_alpha_clip(&mut nav) {
        mode = Some(AlphaMode::Mask);
        cutoff = Some(c);
    }

    // Read the factor and color attribute by checking for variations on
    // -> [Multiply by Factor] -> [Multiply by Color Attrib Alpha] ->
    let mut factor: Option<f32> = None;
    let mut color_attrib: Option<ColorAttrib> = None;

    for _ in 0..2 {
        // Twice, to handle both factor and attrib in either order.
        if factor.is_none() {
            if let Some(a) = nav.get_constant(InputSel::Current) {
                factor = a.as_scalar();
                break;
            }
            if let Some(a) = detect_multiply_by_constant(&mut nav) {
                factor = a.as_scalar();
                continue;
            }
        }

        if color_attrib.is_none() {
            if let Some(attr) = get_color_attrib(&nav) {
                color_attrib = Some(attr);
                break;
            }
            if let Some(attr) = detect_multiply_by_color_attrib(&mut nav) {
                color_attrib = Some(attr);
                continue;
            }
        }

        break;
    }

    let mode = match mode {
        Some(m) => m,
        None => {
            if factor == Some(0.0) {
                // A constant zero alpha: weird, but treat it as masked out.
                cutoff = Some(0.5);
                AlphaMode::Mask
            } else {
                AlphaMode::Blend
            }
        }
    };

    Some(AlphaInfo {
        alpha_mode: mode,
        alpha_cutoff: cutoff,
        alpha_factor: factor,
        alpha_color_attrib: color_attrib,
    })
}

/// Detect a node setup for alpha clipping, i.e.
///
///   alpha = alpha >= cutoff ? 1.0 : 0.0
///
/// authored either as a single Round node or a `1 - (x < cutoff)` chain
/// (there is no greater-or-equal node, hence the subtract-from-one). On a
/// match, `nav` is advanced to the comparison's variable operand and the
/// cutoff is returned.
pub fn detect_alpha_clip<'a>(nav: &mut NodeNav<'a>) -> Option<f32> {
    let mut peek = nav.peek_back(InputSel::Current);
    if !peek.moved {
        return None;
    }

    match peek.current().kind {
        NodeKind::Math {
            operation: MathOp::Round,
        } => {
            peek.select_input(InputSel::Slot(0));
            nav.assign(&peek);
            Some(0.5)
        }
        NodeKind::Math {
            operation: MathOp::Subtract,
        } => {
            if peek.get_constant(InputSel::Slot(0)) != Some(Literal::Scalar(1.0)) {
                return None;
            }
            let mut cmp = peek.peek_back(InputSel::Slot(1));
            if !cmp.moved {
                return None;
            }
            let NodeKind::Math { operation } = cmp.current().kind else {
                return None;
            };
            let in0 = cmp.get_constant(InputSel::Slot(0));
            let in1 = cmp.get_constant(InputSel::Slot(1));
            match operation {
                // x < cutoff
                MathOp::LessThan if in0.is_none() && in1.is_some() => {
                    cmp.select_input(InputSel::Slot(0));
                    nav.assign(&cmp);
                    in1.and_then(|v| v.as_scalar())
                }
                // cutoff > x
                MathOp::GreaterThan if in0.is_some() && in1.is_none() => {
                    cmp.select_input(InputSel::Slot(1));
                    nav.assign(&cmp);
                    in0.and_then(|v| v.as_scalar())
                }
                _ => None,
            }
        }
        _ => None,
    }
}

/// When `nav` connects to a multiply node (A*B), return cursors pointing at
/// both factors. Works for both colors (mix-multiply with Fac pinned to 1)
/// and scalars (math-multiply).
pub fn get_multiply_factors<'a>(nav: &NodeNav<'a>) -> Option<(NodeNav<'a>, NodeNav<'a>)> {
    let mut prev = nav.peek_back(InputSel::Current);
    if !prev.moved {
        return None;
    }

    match nav.in_socket()?.kind {
        ValueKind::Rgba => {
            let is_mul = matches!(
                prev.current().kind,
                NodeKind::Mix {
                    data_type: MixData::Rgba,
                    blend: MixBlend::Multiply,
                }
            ) && prev.get_constant(InputSel::Name("Fac")) == Some(Literal::Scalar(1.0));
            if is_mul {
                let mut fac1 = prev.clone();
                fac1.select_input(InputSel::Ident("A_Color"));
                let mut fac2 = prev;
                fac2.select_input(InputSel::Ident("B_Color"));
                return Some((fac1, fac2));
            }
        }
        ValueKind::Value => {
            if prev.current().kind
                == (NodeKind::Math {
                    operation: MathOp::Multiply,
                })
            {
                let mut fac1 = prev.clone();
                fac1.select_input(InputSel::Slot(0));
                let mut fac2 = prev;
                fac2.select_input(InputSel::Slot(1));
                return Some((fac1, fac2));
            }
        }
        _ => {}
    }

    None
}

/// Detect multiplication by a constant. On a match the constant is returned
/// and `nav` advances to the other factor.
pub fn detect_multiply_by_constant<'a>(nav: &mut NodeNav<'a>) -> Option<Literal> {
    let (mut fac1, mut fac2) = get_multiply_factors(nav)?;

    if let Some(c) = fac1.get_constant(InputSel::Current) {
        nav.assign(&fac2);
        return Some(c);
    }

    // Try the other order too.
    if let Some(c) = fac2.get_constant(InputSel::Current) {
        nav.assign(&fac1);
        return Some(c);
    }

    None
}

/// Detect multiplication by a color attribute; symmetric to
/// `detect_multiply_by_constant`. Whether the multiplication uses the
/// attribute's RGB or alpha output is not checked.
pub fn detect_multiply_by_color_attrib<'a>(nav: &mut NodeNav<'a>) -> Option<ColorAttrib> {
    let (fac1, fac2) = get_multiply_factors(nav)?;

    if let Some(attr) = get_color_attrib(&fac1) {
        nav.assign(&fac2);
        return Some(attr);
    }

    if let Some(attr) = get_color_attrib(&fac2) {
        nav.assign(&fac1);
        return Some(attr);
    }

    None
}

/// Check whether `nav` connects to a color-attribute source. A geometry
/// attribute node is accepted too, though nothing verifies it is actually a
/// *color* attribute; its blank name does NOT mean the active attribute.
pub fn get_color_attrib(nav: &NodeNav<'_>) -> Option<ColorAttrib> {
    let peek = nav.peek_back(InputSel::Current);
    if !peek.moved {
        return None;
    }

    match &peek.current().kind {
        NodeKind::VertexColor { layer } => {
            if layer.is_empty() {
                Some(ColorAttrib::ActiveRender)
            } else {
                Some(ColorAttrib::Named(layer.clone()))
            }
        }
        NodeKind::Attribute {
            domain: AttributeDomain::Geometry,
            name,
        } if !name.is_empty() => Some(ColorAttrib::Named(name.clone())),
        _ => None,
    }
}
