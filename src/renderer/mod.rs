//! Renderer — the deterministic markup serializer.
//!
//! Takes typed scene fragments (in-memory, from the engine) and produces
//! SVG markup: an inline snapshot for the render sink, or a standalone
//! document for export.
//!
//! The renderer is pure and stateless. Given the same input, it always
//! produces the same output. It knows nothing about motion, animation
//! timing, or session semantics.

use std::fmt::Write;

use crate::glyph::{
    ARROW_POINTS, CLASSIC_POINTS, GlyphSnapshot, RING_POINTER_POINTS, SQUARE_POINTS, Shape,
    TRIANGLE_POINTS, TURTLE_PATH, TURTLE2_POINTS,
};
use crate::scene::{Fragment, PathCmd, Scene};
use crate::types::{CanvasContract, FontStyle};

pub struct Renderer;

impl Renderer {
    /// Compose the inline snapshot handed to the render sink: background
    /// rect, background stamps, line/fill/text buffer, dots, foreground
    /// stamps, then the live glyph.
    pub fn snapshot(contract: &CanvasContract, scene: &Scene, glyph: &GlyphSnapshot) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            r#"<svg width="{}" height="{}">"#,
            contract.width, contract.height
        );
        let _ = write!(
            out,
            r#"<rect width="100%" height="100%" style="fill:{};stroke:{};stroke-width:1"/>"#,
            contract.background, contract.border
        );
        for stamp in scene.stamps_below() {
            out.push_str(&Self::glyph(stamp));
        }
        for fragment in scene.lines() {
            out.push_str(&Self::fragment(fragment));
        }
        for fragment in scene.dots() {
            out.push_str(&Self::fragment(fragment));
        }
        for stamp in scene.stamps_above() {
            out.push_str(&Self::glyph(stamp));
        }
        out.push_str(&Self::glyph(glyph));
        out.push_str("</svg>");
        out
    }

    /// Compose a standalone, viewer-ready document with the same layer
    /// order. The glyph is included only when requested.
    pub fn document(
        contract: &CanvasContract,
        scene: &Scene,
        glyph: Option<&GlyphSnapshot>,
    ) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg width="{w}" height="{h}" viewBox="0 0 {w} {h}" xmlns="http://www.w3.org/2000/svg">"#,
            w = contract.width,
            h = contract.height,
        );
        let _ = writeln!(
            out,
            r#"<rect width="100%" height="100%" style="fill:{};stroke:{};stroke-width:1" />"#,
            contract.background, contract.border
        );
        for stamp in scene.stamps_below() {
            let _ = writeln!(out, "{}", Self::glyph(stamp));
        }
        for fragment in scene.lines() {
            let _ = writeln!(out, "{}", Self::fragment(fragment));
        }
        for fragment in scene.dots() {
            let _ = writeln!(out, "{}", Self::fragment(fragment));
        }
        for stamp in scene.stamps_above() {
            let _ = writeln!(out, "{}", Self::glyph(stamp));
        }
        if let Some(glyph) = glyph {
            let _ = writeln!(out, "{}", Self::glyph(glyph));
        }
        out.push_str("</svg>");
        out
    }

    /// Serialize one scene fragment to its SVG element.
    pub fn fragment(fragment: &Fragment) -> String {
        match fragment {
            Fragment::Line {
                x1,
                y1,
                x2,
                y2,
                color,
                width,
            } => format!(
                r#"<line x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}" stroke-linecap="round" style="stroke:{color};stroke-width:{width}" />"#
            ),
            Fragment::Arc {
                x1,
                y1,
                rx,
                ry,
                sweep,
                x2,
                y2,
                color,
                width,
            } => format!(
                r#"<path d="M {x1} {y1} A {rx} {ry} 0 0 {s} {x2} {y2}" stroke-linecap="round" fill="transparent" fill-opacity="0" style="stroke:{color};stroke-width:{width}" />"#,
                s = *sweep as u8,
            ),
            Fragment::Fill {
                path,
                rule,
                opacity,
                fill,
                stroke,
                width,
            } => format!(
                r#"<path fill-rule="{rule}" fill-opacity="{opacity}" d="{d}" stroke-linecap="round" style="stroke:{stroke};stroke-width:{width}" fill="{fill}" />"#,
                rule = rule.name(),
                d = Self::path_data(path),
            ),
            Fragment::Dot {
                cx,
                cy,
                radius,
                color,
            } => format!(r#"<circle cx="{cx}" cy="{cy}" r="{radius}" fill="{color}" fill-opacity="1" />"#),
            Fragment::Text {
                x,
                y,
                text,
                color,
                align,
                font,
            } => {
                let mut style = format!("font-size:{}px;font-family:'{}';", font.size, font.family);
                match font.style {
                    FontStyle::Bold => style.push_str("font-weight:bold;"),
                    FontStyle::Italic => style.push_str("font-style:italic;"),
                    FontStyle::Underline => style.push_str("text-decoration: underline;"),
                    FontStyle::Normal => {}
                }
                format!(
                    r#"<text x="{x}" y="{y}" fill="{color}" text-anchor="{anchor}" style="{style}">{text}</text>"#,
                    anchor = align.anchor(),
                    text = escape(text),
                )
            }
        }
    }

    fn path_data(path: &[PathCmd]) -> String {
        let mut d = String::new();
        for cmd in path {
            if !d.is_empty() {
                d.push(' ');
            }
            match cmd {
                PathCmd::MoveTo { x, y } => {
                    let _ = write!(d, "M {x} {y}");
                }
                PathCmd::LineTo { x, y } => {
                    let _ = write!(d, "L {x} {y}");
                }
                PathCmd::Arc { rx, ry, sweep, x, y } => {
                    let _ = write!(d, "A {rx} {ry} 0 0 {} {x} {y}", *sweep as u8);
                }
            }
        }
        d
    }

    // -----------------------------------------------------------------------
    // Glyphs
    // -----------------------------------------------------------------------

    /// Serialize a glyph snapshot: a rotated, translated group holding the
    /// shape's artwork, with the spin descriptor (when present) expressed
    /// as SMIL transform animations that settle on the final pose.
    pub fn glyph(g: &GlyphSnapshot) -> String {
        if g.shape == Shape::Blank {
            return String::new();
        }
        // During a spin the base transform carries no stretch; the scale
        // animation jumps to the real factors and freezes before rotating.
        let (sx, sy) = if g.spin.is_some() { (1.0, 1.0) } else { (g.sx, g.sy) };

        let mut out = format!(
            r#"<g visibility="{vis}" transform="rotate({rot},{px},{py}) translate({x}, {y})">"#,
            vis = if g.visible { "visible" } else { "hidden" },
            rot = g.rotation,
            px = g.pivot_x,
            py = g.pivot_y,
            x = g.x,
            y = g.y,
        );
        match g.shape {
            Shape::Turtle => {
                let _ = write!(
                    out,
                    r#"<path style="stroke:{stroke};fill-rule:evenodd;fill:{fill};fill-opacity:1;" transform="scale({sx},{sy})" d="{TURTLE_PATH}" />"#,
                    stroke = g.stroke,
                    fill = g.fill,
                );
            }
            Shape::Ring => {
                let _ = write!(
                    out,
                    r#"<ellipse stroke="{stroke}" stroke-width="3" fill="transparent" rx="{rx}" ry="{ry}" cx="0" cy="{cy}" /><polygon points="{RING_POINTER_POINTS}" transform="scale({sx},{sy})" style="fill:{fill};stroke:{stroke};stroke-width:1" />"#,
                    stroke = g.stroke,
                    fill = g.fill,
                    rx = 10.0 * sx,
                    ry = 10.0 * sy,
                    cy = -(10.0 * sy + 4.0),
                );
            }
            Shape::Classic | Shape::Arrow | Shape::Square | Shape::Triangle => {
                let points = match g.shape {
                    Shape::Classic => CLASSIC_POINTS,
                    Shape::Arrow => ARROW_POINTS,
                    Shape::Square => SQUARE_POINTS,
                    _ => TRIANGLE_POINTS,
                };
                let _ = write!(
                    out,
                    r#"<polygon points="{points}" transform="scale({sx},{sy})" style="stroke:{stroke};fill:{fill};stroke-width:{pw}" />"#,
                    stroke = g.stroke,
                    fill = g.fill,
                    pw = g.outline,
                );
            }
            Shape::Circle => {
                let _ = write!(
                    out,
                    r#"<ellipse style="stroke:{stroke};fill:{fill};stroke-width:{pw}" rx="{rx}" ry="{ry}" cx="0" cy="0" />"#,
                    stroke = g.stroke,
                    fill = g.fill,
                    pw = g.outline,
                    rx = 10.0 * sx,
                    ry = 10.0 * sy,
                );
            }
            Shape::Turtle2 => {
                let _ = write!(
                    out,
                    r#"<polygon points="{TURTLE2_POINTS}" transform="scale({sx},{sy})" style="stroke:{stroke};stroke-width:1;fill:{fill}" />"#,
                    stroke = g.stroke,
                    fill = g.fill,
                );
            }
            Shape::Blank => unreachable!(),
        }
        if let Some(spin) = g.spin {
            let _ = write!(
                out,
                r#"<animateTransform id="one" attributeName="transform" type="scale" from="1 1" to="{sx} {sy}" begin="0s" dur="0.001s" repeatCount="1" additive="sum" fill="freeze" /><animateTransform attributeName="transform" type="rotate" from="0 0 0" to="{extent} 0 0" begin="one.end" dur="{dur}s" repeatCount="1" additive="sum" fill="freeze" />"#,
                sx = g.sx,
                sy = g.sy,
                extent = spin.extent,
                dur = spin.duration,
            );
        }
        out.push_str("</g>");
        out
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Color;

    fn black() -> Color {
        Color("black".into())
    }

    #[test]
    fn line_fragment_serializes_with_round_caps() {
        let markup = Renderer::fragment(&Fragment::Line {
            x1: 0.0,
            y1: 1.0,
            x2: 2.0,
            y2: 3.0,
            color: black(),
            width: 2,
        });
        assert_eq!(
            markup,
            r#"<line x1="0" y1="1" x2="2" y2="3" stroke-linecap="round" style="stroke:black;stroke-width:2" />"#
        );
    }

    #[test]
    fn arc_sweep_flag_follows_center_side() {
        let arc = |sweep| {
            Renderer::fragment(&Fragment::Arc {
                x1: 0.0,
                y1: 0.0,
                rx: 50.0,
                ry: 50.0,
                sweep,
                x2: 10.0,
                y2: 10.0,
                color: black(),
                width: 1,
            })
        };
        assert!(arc(false).contains("A 50 50 0 0 0 10 10"));
        assert!(arc(true).contains("A 50 50 0 0 1 10 10"));
    }

    #[test]
    fn fill_path_carries_rule_and_opacity() {
        let markup = Renderer::fragment(&Fragment::Fill {
            path: vec![
                PathCmd::MoveTo { x: 1.0, y: 2.0 },
                PathCmd::LineTo { x: 3.0, y: 4.0 },
            ],
            rule: crate::types::FillRule::EvenOdd,
            opacity: 0.5,
            fill: black(),
            stroke: black(),
            width: 1,
        });
        assert!(markup.contains(r#"fill-rule="evenodd""#));
        assert!(markup.contains(r#"fill-opacity="0.5""#));
        assert!(markup.contains(r#"d="M 1 2 L 3 4""#));
    }

    #[test]
    fn text_content_is_escaped() {
        let markup = Renderer::fragment(&Fragment::Text {
            x: 0.0,
            y: 0.0,
            text: "a<b&c".into(),
            color: black(),
            align: crate::types::TextAlign::Center,
            font: Default::default(),
        });
        assert!(markup.contains(">a&lt;b&amp;c</text>"));
        assert!(markup.contains(r#"text-anchor="middle""#));
    }

    #[test]
    fn blank_glyph_renders_nothing() {
        let g = GlyphSnapshot {
            shape: Shape::Blank,
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            pivot_x: 0.0,
            pivot_y: 0.0,
            sx: 1.0,
            sy: 1.0,
            outline: 1.0,
            visible: true,
            fill: black(),
            stroke: black(),
            spin: None,
        };
        assert_eq!(Renderer::glyph(&g), "");
    }

    #[test]
    fn spin_emits_smil_animations_with_unit_base_scale() {
        let g = GlyphSnapshot {
            shape: Shape::Classic,
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            pivot_x: 0.0,
            pivot_y: 0.0,
            sx: 2.0,
            sy: 2.0,
            outline: 1.0,
            visible: true,
            fill: black(),
            stroke: black(),
            spin: Some(crate::glyph::Spin {
                extent: 90.0,
                duration: 0.1,
            }),
        };
        let markup = Renderer::glyph(&g);
        assert!(markup.contains(r#"transform="scale(1,1)""#));
        assert!(markup.contains(r#"to="2 2""#));
        assert!(markup.contains(r#"to="90 0 0""#));
    }
}
