//! Scene accumulator — ordered, typed drawing fragments.
//!
//! The engine appends `Fragment`s here; the renderer serializes them to
//! markup at snapshot time. Nothing in this module knows about SVG syntax.
//!
//! Compose order is fixed: background stamps, the line/fill/text buffer,
//! dots, foreground stamps, then the live turtle glyph. Stamps live in
//! per-layer registries keyed by monotonically increasing ids; a separate
//! creation-order list drives bulk clearing across both layers.

use serde::{Deserialize, Serialize};

use crate::glyph::GlyphSnapshot;
use crate::types::{Color, FillRule, FontSpec, StampId, StampLayer, TextAlign};

// ---------------------------------------------------------------------------
// Fragments
// ---------------------------------------------------------------------------

/// One command of a fill path, in device coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PathCmd {
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    Arc { rx: f64, ry: f64, sweep: bool, x: f64, y: f64 },
}

/// An atomic renderable piece appended to a scene buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Fragment {
    /// Straight pen stroke between two device points.
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Color,
        width: u32,
    },
    /// Elliptical arc stroke from the implicit current point.
    Arc {
        x1: f64,
        y1: f64,
        rx: f64,
        ry: f64,
        sweep: bool,
        x2: f64,
        y2: f64,
        color: Color,
        width: u32,
    },
    /// A closed, styled region traced between begin/end fill.
    Fill {
        path: Vec<PathCmd>,
        rule: FillRule,
        opacity: f64,
        fill: Color,
        stroke: Color,
        width: u32,
    },
    Dot {
        cx: f64,
        cy: f64,
        radius: f64,
        color: Color,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        color: Color,
        align: TextAlign,
        font: FontSpec,
    },
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// Lines, arcs, text, and completed fills, in draw order.
    lines: Vec<Fragment>,
    dots: Vec<Fragment>,
    stamps_below: Vec<(StampId, GlyphSnapshot)>,
    stamps_above: Vec<(StampId, GlyphSnapshot)>,
    /// Stamp ids in creation order, across both layers.
    stamp_order: Vec<StampId>,
    next_stamp_id: StampId,
}

impl Scene {
    pub fn new() -> Scene {
        Scene::default()
    }

    pub fn push_line(&mut self, fragment: Fragment) {
        self.lines.push(fragment);
    }

    pub fn push_dot(&mut self, fragment: Fragment) {
        self.dots.push(fragment);
    }

    pub fn lines(&self) -> &[Fragment] {
        &self.lines
    }

    pub fn dots(&self) -> &[Fragment] {
        &self.dots
    }

    /// Checkpoint for the fill accumulator: current line-buffer length.
    pub fn lines_len(&self) -> usize {
        self.lines.len()
    }

    /// Drop every line fragment appended after `checkpoint`.
    pub fn truncate_lines(&mut self, checkpoint: usize) {
        self.lines.truncate(checkpoint);
    }

    // -----------------------------------------------------------------------
    // Stamps
    // -----------------------------------------------------------------------

    pub fn add_stamp(&mut self, layer: StampLayer, glyph: GlyphSnapshot) -> StampId {
        self.next_stamp_id += 1;
        let id = self.next_stamp_id;
        self.stamp_order.push(id);
        match layer {
            StampLayer::Below => self.stamps_below.push((id, glyph)),
            StampLayer::Above => self.stamps_above.push((id, glyph)),
        }
        id
    }

    /// Remove one stamp by id; unknown ids are silently ignored.
    pub fn remove_stamp(&mut self, id: StampId) {
        let before = self.stamps_below.len() + self.stamps_above.len();
        self.stamps_below.retain(|(sid, _)| *sid != id);
        self.stamps_above.retain(|(sid, _)| *sid != id);
        if self.stamps_below.len() + self.stamps_above.len() < before {
            self.stamp_order.retain(|sid| *sid != id);
        }
    }

    /// Remove stamps by creation order: `None` removes all, `Some(n > 0)`
    /// the first `n`, `Some(n < 0)` the last `|n|`.
    pub fn clear_stamps(&mut self, n: Option<i32>) {
        let order = self.stamp_order.clone();
        let victims: &[StampId] = match n {
            None => &order,
            Some(0) => &[],
            Some(n) if n > 0 => &order[..order.len().min(n as usize)],
            Some(n) => {
                let k = order.len().min(n.unsigned_abs() as usize);
                &order[order.len() - k..]
            }
        };
        for id in victims {
            self.remove_stamp(*id);
        }
    }

    pub fn stamps_below(&self) -> impl Iterator<Item = &GlyphSnapshot> {
        self.stamps_below.iter().map(|(_, g)| g)
    }

    pub fn stamps_above(&self) -> impl Iterator<Item = &GlyphSnapshot> {
        self.stamps_above.iter().map(|(_, g)| g)
    }

    pub fn stamp_count(&self) -> usize {
        self.stamp_order.len()
    }

    pub fn stamp_ids(&self) -> &[StampId] {
        &self.stamp_order
    }

    // -----------------------------------------------------------------------
    // Bulk clearing
    // -----------------------------------------------------------------------

    /// Empty the line/fill and dot buffers. Stamps survive.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.dots.clear();
    }

    /// Empty everything, including stamps, and restart the id sequence.
    pub fn reset(&mut self) {
        *self = Scene::default();
    }
}
