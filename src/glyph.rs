//! Shape/glyph registry — the turtle cursor's visual templates.
//!
//! Each of the nine known shapes has fixed local-coordinate geometry plus
//! per-shape rotation and anchor conventions. Geometry is stored as typed
//! data and rendered by the renderer from a `GlyphSnapshot`; per-call
//! customization (stretch, outline, spin animation) travels in the snapshot
//! rather than being patched into a template.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Color;

// ---------------------------------------------------------------------------
// Shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Turtle,
    Ring,
    Classic,
    Arrow,
    Square,
    Triangle,
    Circle,
    Turtle2,
    Blank,
}

pub const SHAPE_NAMES: &[&str] = &[
    "turtle", "ring", "classic", "arrow", "square", "triangle", "circle", "turtle2", "blank",
];

impl Shape {
    pub fn name(self) -> &'static str {
        match self {
            Shape::Turtle => "turtle",
            Shape::Ring => "ring",
            Shape::Classic => "classic",
            Shape::Arrow => "arrow",
            Shape::Square => "square",
            Shape::Triangle => "triangle",
            Shape::Circle => "circle",
            Shape::Turtle2 => "turtle2",
            Shape::Blank => "blank",
        }
    }

    /// Parse a user-supplied shape name.
    pub fn parse(name: &str) -> Result<Shape> {
        match name.to_ascii_lowercase().as_str() {
            "turtle" => Ok(Shape::Turtle),
            "ring" => Ok(Shape::Ring),
            "classic" => Ok(Shape::Classic),
            "arrow" => Ok(Shape::Arrow),
            "square" => Ok(Shape::Square),
            "triangle" => Ok(Shape::Triangle),
            "circle" => Ok(Shape::Circle),
            "turtle2" => Ok(Shape::Turtle2),
            "blank" => Ok(Shape::Blank),
            _ => Err(Error::invalid(format!(
                "shape is invalid; valid options are: {SHAPE_NAMES:?}"
            ))),
        }
    }

    /// Degrees added to heading+tilt so the shape's artwork points along
    /// the heading. The two turtle sprites are drawn facing up; everything
    /// else is drawn facing down.
    pub fn rotation_offset(self) -> f64 {
        match self {
            Shape::Turtle | Shape::Turtle2 => 90.0,
            _ => -90.0,
        }
    }

    /// Device-Y offset of the glyph's translate anchor. The ring pivots
    /// around a point above its ellipse rather than the ellipse center.
    pub fn anchor_offset(self, sy: f64) -> f64 {
        match self {
            Shape::Ring => 10.0 * sy + 4.0,
            _ => 0.0,
        }
    }
}

// Local-coordinate geometry, as drawn before scale/rotate/translate.
pub(crate) const CLASSIC_POINTS: &str = "-5,-4.5 0,-2.5 5,-4.5 0,4.5";
pub(crate) const ARROW_POINTS: &str = "-10,-5 0,5 10,-5";
pub(crate) const SQUARE_POINTS: &str = "10,-10 10,10 -10,10 -10,-10";
pub(crate) const TRIANGLE_POINTS: &str = "10,-8.66 0,8.66 -10,-8.66";
pub(crate) const RING_POINTER_POINTS: &str = "0,5 5,0 -5,0";
pub(crate) const TURTLE2_POINTS: &str = "0,-16 2,-14 1,-10 4,-7 7,-9 9,-8 6,-5 7,-1 5,3 8,6 \
     6,8 4,5 0,7 -4,5 -6,8 -8,6 -5,3 -7,-1 -6,-5 -9,-8 -7,-9 -4,-7 -1,-10 -2,-14";
pub(crate) const TURTLE_PATH: &str = "m 1.1536693,-18.56101 c -2.105469,1.167969 \
-3.203125,3.441407 -3.140625,6.5 l 0.011719,0.519532 -0.300782,-0.15625 c \
-1.308594,-0.671875 -2.828125,-0.824219 -4.378906,-0.429688 -1.9375,0.484375 \
-3.8906253,2.089844 -6.0117193,4.9257825 -1.332031,1.785156 -1.714843,2.644531 \
-1.351562,3.035156 l 0.113281,0.125 h 0.363281 c 0.71875,0 1.308594,-0.265625 \
4.6679693,-2.113282 1.199219,-0.660156 2.183594,-1.199218 2.191406,-1.199218 \
0.00781,0 -0.023437,0.089844 -0.074218,0.195312 -0.472657,1.058594 \
-1.046876,2.785156 -1.335938,4.042969 -1.054688,4.574219 -0.351562,8.453125 \
2.101562,11.582031 0.28125,0.355469 0.292969,0.253906 -0.097656,0.722656 \
-2.046875,2.4609375 -3.027344,4.8984375 -2.734375,6.8046875 0.050781,0.339844 \
0.042969,0.335938 0.679688,0.335938 2.023437,0 4.15625,-1.316407 \
6.21875,-3.835938 0.222656,-0.269531 0.191406,-0.261719 0.425781,-0.113281 \
0.730469,0.46875 2.460938,1.390625 2.613281,1.390625 0.160157,0 \
1.765625,-0.753906 2.652344,-1.246094 0.167969,-0.09375 0.308594,-0.164062 \
0.308594,-0.160156 0.066406,0.105468 0.761719,0.855468 1.085937,1.171875 \
1.613282,1.570312 3.339844,2.402343 5.3593747,2.570312 0.324219,0.02734 \
0.355469,0.0078 0.425781,-0.316406 0.375,-1.742187 -0.382812,-4.058594 \
-2.1445307,-6.5585935 l -0.320312,-0.457031 0.15625,-0.183594 c \
3.2460927,-3.824218 3.4335927,-9.08593704 0.558593,-15.816406 l \
-0.050781,-0.125 1.7382807,0.859375 c 3.585938,1.773437 4.371094,2.097656 \
5.085938,2.097656 0.945312,0 0.75,-0.863281 -0.558594,-2.507812 C \
11.458356,-11.838353 8.3333563,-13.268041 4.8607003,-11.721166 l \
-0.363281,0.164063 0.019531,-0.09375 c 0.121094,-0.550781 0.183594,-1.800781 \
0.121094,-2.378907 -0.203125,-1.867187 -1.035157,-3.199218 \
-2.695313,-4.308593 -0.523437,-0.351563 -0.546875,-0.355469 \
-0.789062,-0.222657";

// ---------------------------------------------------------------------------
// Glyph state & snapshots
// ---------------------------------------------------------------------------

/// The session's adjustable glyph parameters.
#[derive(Debug, Clone)]
pub struct GlyphState {
    pub shape: Shape,
    pub stretch: (f64, f64),
    pub outline: f64,
    pub visible: bool,
}

impl Default for GlyphState {
    fn default() -> Self {
        GlyphState {
            shape: Shape::Classic,
            stretch: (1.0, 1.0),
            outline: 1.0,
            visible: true,
        }
    }
}

impl GlyphState {
    /// Apply `shapesize`-style stretch/outline updates. Supplying only one
    /// of the stretch factors makes both equal to it; zero factors and
    /// non-positive outlines are rejected before anything is applied.
    pub fn set_shapesize(
        &mut self,
        wid: Option<f64>,
        len: Option<f64>,
        outline: Option<f64>,
    ) -> Result<()> {
        if wid == Some(0.0) || len == Some(0.0) {
            return Err(Error::invalid("stretch_wid/stretch_len must not be zero"));
        }
        for v in [wid, len].into_iter().flatten() {
            if !v.is_finite() {
                return Err(Error::invalid("stretch factors must be numbers"));
            }
        }
        if let Some(o) = outline {
            if !o.is_finite() || o <= 0.0 {
                return Err(Error::invalid("the outline must be a positive number"));
            }
        }
        match (wid, len) {
            (Some(w), Some(l)) => self.stretch = (w, l),
            (Some(w), None) => self.stretch = (w, w),
            (None, Some(l)) => self.stretch = (l, l),
            (None, None) => {}
        }
        if let Some(o) = outline {
            self.outline = o;
        }
        Ok(())
    }
}

/// Explicit animation descriptor for a continuous on-screen rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spin {
    /// Signed rotation extent in degrees.
    pub extent: f64,
    /// Animation duration in seconds.
    pub duration: f64,
}

/// A fully-parametrized glyph ready for rendering: pose, style, and an
/// optional spin descriptor. Stamps freeze one of these at stamp time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphSnapshot {
    pub shape: Shape,
    /// Translate target; equals the pose except for anchored shapes.
    pub x: f64,
    pub y: f64,
    /// Rotation in degrees: heading + tilt + the shape's offset.
    pub rotation: f64,
    /// Rotation pivot: the turtle's device position.
    pub pivot_x: f64,
    pub pivot_y: f64,
    pub sx: f64,
    pub sy: f64,
    pub outline: f64,
    pub visible: bool,
    pub fill: Color,
    pub stroke: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spin: Option<Spin>,
}
