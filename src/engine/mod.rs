//! Engine — the stateful turtle session.
//!
//! One `Turtle` owns the whole drawing context: pose, pen, glyph, scene
//! buffers, coordinate transform, and the render sink. Commands validate
//! their arguments before touching any state, mutate the context, and ask
//! the sink to redraw — possibly several times per command when animation
//! is enabled.
//!
//! The engine never deals with markup syntax; serialization is the
//! renderer's job.

pub mod fill;

use std::thread;
use std::time::Duration;

use log::{debug, trace};

use crate::color;
use crate::display::{NullSink, RenderSink};
use crate::error::{Error, Result};
use crate::glyph::{GlyphSnapshot, GlyphState, Shape, Spin};
use crate::renderer::Renderer;
use crate::scene::{Fragment, Scene};
use crate::transform::{self, Transform, round_to};
use crate::types::{
    CanvasContract, Color, ColorSpec, FillRule, FontSpec, Mode, PenSettings, StampId, StampLayer,
    TextAlign, WindowConfig,
};

use fill::FillState;

/// Per-level delay in seconds for the 14 animation speed settings.
/// Level 0 means no delay and no intermediate redraws at all.
const SPEED_DELAYS: [f64; 14] = [
    0.0, 1.5, 1.0, 0.75, 0.5, 0.3, 0.25, 0.2, 0.15, 0.10, 0.05, 0.025, 0.01, 0.005,
];

/// Style values a session starts with and returns to on `reset`.
#[derive(Debug, Clone)]
struct StyleDefaults {
    pen: &'static str,
    fill: &'static str,
    background: &'static str,
    border: &'static str,
    pen_width: u32,
    shape: Shape,
}

const MODERN_DEFAULTS: StyleDefaults = StyleDefaults {
    pen: "black",
    fill: "black",
    background: "white",
    border: "none",
    pen_width: 1,
    shape: Shape::Classic,
};

/// The defaults of the original ColabTurtle package: light-on-dark, wide
/// pen, turtle sprite.
const CLASSIC_DEFAULTS: StyleDefaults = StyleDefaults {
    pen: "white",
    fill: "black",
    background: "black",
    border: "none",
    pen_width: 4,
    shape: Shape::Turtle,
};

pub struct Turtle {
    transform: Transform,
    /// Device-space position. Kept rounded to 3 decimals by motion code.
    pos: (f64, f64),
    /// Internal heading, degrees; see `transform` for the conventions.
    heading: f64,
    /// Glyph-only rotation offset, degrees.
    tilt: f64,
    pen_down: bool,
    pen_color: Color,
    pen_width: u32,
    fill_color: Color,
    background: Color,
    border: Color,
    /// Session-wide defaults, overridable per fill region.
    fill_rule: FillRule,
    fill_opacity: f64,
    fill: FillState,
    glyph: GlyphState,
    scene: Scene,
    speed: u8,
    defaults: StyleDefaults,
    sink: Box<dyn RenderSink>,
}

impl Turtle {
    /// Create a headless session (snapshots go nowhere).
    pub fn new(config: WindowConfig) -> Result<Turtle> {
        Turtle::with_sink(config, Box::new(NullSink))
    }

    /// Create a session attached to a render sink. The sink receives the
    /// initial snapshot immediately, so a constructed session is always
    /// displayable — there is no separate initialize step to forget.
    pub fn with_sink(config: WindowConfig, sink: Box<dyn RenderSink>) -> Result<Turtle> {
        Turtle::with_defaults(config, sink, MODERN_DEFAULTS)
    }

    /// Create a session with the original ColabTurtle styling defaults.
    pub fn classic(sink: Box<dyn RenderSink>) -> Result<Turtle> {
        Turtle::with_defaults(WindowConfig::classic(), sink, CLASSIC_DEFAULTS)
    }

    fn with_defaults(
        config: WindowConfig,
        mut sink: Box<dyn RenderSink>,
        defaults: StyleDefaults,
    ) -> Result<Turtle> {
        if config.speed > 13 {
            return Err(Error::invalid(
                "speed must be an integer in the interval [0,13]",
            ));
        }
        if config.width == 0 || config.height == 0 {
            return Err(Error::invalid("window dimensions must be positive"));
        }
        let transform = Transform::new(config.width, config.height, config.mode);
        let pos = transform.device_center();
        let heading = transform::initial_heading(config.mode);
        debug!(
            "new turtle session: {}x{} {} mode, speed {}",
            config.width,
            config.height,
            config.mode.name(),
            config.speed
        );
        let mut turtle = Turtle {
            transform,
            pos,
            heading,
            tilt: 0.0,
            pen_down: true,
            pen_color: Color(defaults.pen.into()),
            pen_width: defaults.pen_width,
            fill_color: Color(defaults.fill.into()),
            background: Color(defaults.background.into()),
            border: Color(defaults.border.into()),
            fill_rule: FillRule::EvenOdd,
            fill_opacity: 1.0,
            fill: FillState::default(),
            glyph: GlyphState {
                shape: defaults.shape,
                ..GlyphState::default()
            },
            scene: Scene::new(),
            speed: config.speed,
            defaults,
            sink: Box::new(NullSink),
        };
        sink.display(&turtle.snapshot())?;
        turtle.sink = sink;
        Ok(turtle)
    }

    // -----------------------------------------------------------------------
    // Snapshots & redraws
    // -----------------------------------------------------------------------

    fn contract(&self) -> CanvasContract {
        CanvasContract {
            width: self.transform.width(),
            height: self.transform.height(),
            background: self.background.clone(),
            border: self.border.clone(),
        }
    }

    fn glyph_snapshot(&self, spin: Option<Spin>) -> GlyphSnapshot {
        let (sx, sy) = self.glyph.stretch;
        let shape = self.glyph.shape;
        GlyphSnapshot {
            shape,
            x: self.pos.0,
            y: self.pos.1 + shape.anchor_offset(sy),
            rotation: self.heading + self.tilt + shape.rotation_offset(),
            pivot_x: self.pos.0,
            pivot_y: self.pos.1,
            sx,
            sy,
            outline: self.glyph.outline,
            visible: self.glyph.visible,
            fill: self.fill_color.clone(),
            stroke: self.pen_color.clone(),
            spin,
        }
    }

    /// The current inline snapshot, glyph included.
    pub fn snapshot(&self) -> String {
        Renderer::snapshot(&self.contract(), &self.scene, &self.glyph_snapshot(None))
    }

    /// The standalone exportable document.
    pub fn to_svg(&self, include_glyph: bool) -> String {
        let glyph = self.glyph_snapshot(None);
        Renderer::document(
            &self.contract(),
            &self.scene,
            include_glyph.then_some(&glyph),
        )
    }

    /// Write the exportable document to `path`, appending `.svg` when the
    /// extension is missing.
    pub fn save_svg(&self, path: &str, include_glyph: bool) -> Result<()> {
        let path = if path.ends_with(".svg") {
            path.to_owned()
        } else {
            format!("{path}.svg")
        };
        debug!("saving svg to {path}");
        std::fs::write(&path, self.to_svg(include_glyph))?;
        Ok(())
    }

    /// Push the final snapshot to the sink regardless of speed. With speed
    /// 0 no intermediate redraws happen, so call this when drawing is done.
    pub fn done(&mut self) -> Result<()> {
        let snapshot = self.snapshot();
        self.sink.update(&snapshot)
    }

    fn redraw(&mut self, delay_secs: Option<f64>) -> Result<()> {
        if self.speed == 0 {
            return Ok(());
        }
        trace!("redraw (delay {delay_secs:?})");
        let snapshot = self.snapshot();
        self.sink.update(&snapshot)?;
        if let Some(secs) = delay_secs {
            sleep(secs);
        }
        Ok(())
    }

    /// Redraw once with a spin descriptor attached to the glyph, blocking
    /// for the animation duration.
    fn redraw_spin(&mut self, spin: Spin) -> Result<()> {
        if self.speed == 0 {
            return Ok(());
        }
        let snapshot =
            Renderer::snapshot(&self.contract(), &self.scene, &self.glyph_snapshot(Some(spin)));
        self.sink.update(&snapshot)?;
        sleep(spin.duration + 0.001);
        Ok(())
    }

    fn delay(&self) -> f64 {
        SPEED_DELAYS[self.speed as usize]
    }

    /// Whether motion should be decomposed into animation steps.
    fn animated(&self) -> bool {
        self.speed != 0 && self.glyph.shape != Shape::Blank && self.glyph.visible
    }

    // -----------------------------------------------------------------------
    // Motion
    // -----------------------------------------------------------------------

    /// Move forward by `units` along the current heading.
    pub fn forward(&mut self, units: f64) -> Result<()> {
        let units = finite(units, "distance")?;
        let alpha = self.heading.to_radians();
        let (xs, ys) = (self.transform.xscale(), self.transform.yscale().abs());
        let target = (
            self.pos.0 + units * xs * alpha.cos(),
            self.pos.1 + units * ys * alpha.sin(),
        );
        self.move_to_device(target, units)
    }

    pub fn backward(&mut self, units: f64) -> Result<()> {
        self.forward(-finite(units, "distance")?)
    }

    /// The shared slide: optional stepwise animation, then one
    /// authoritative full-distance fragment. Intermediate step fragments
    /// exist only while animating and never survive the move.
    fn move_to_device(&mut self, target: (f64, f64), units: f64) -> Result<()> {
        let target = (round_to(target.0, 3), round_to(target.1, 3));
        let start = self.pos;
        let checkpoint = self.scene.lines_len();
        let s = if units > 0.0 { 1.0 } else { -1.0 };

        if self.animated() {
            let alpha = self.heading.to_radians();
            let step_delay = self.delay() / 5.0;
            let (xs, ys) = (self.transform.xscale(), self.transform.yscale().abs());
            // ~10 device units per tick, expressed in logical units.
            let tenx = 10.0 / xs;
            let teny = 10.0 / ys;
            let dunits = s * 10.0 / xs.max(ys);
            let mut remaining = units;
            let mut cursor = start;
            while s * remaining > 0.0 {
                let dx = tenx.min(s * remaining);
                let dy = teny.min(s * remaining);
                let next = (
                    cursor.0 + s * dx * xs * alpha.cos(),
                    cursor.1 + s * dy * ys * alpha.sin(),
                );
                self.pos = next;
                if self.pen_down {
                    self.scene.push_line(Fragment::Line {
                        x1: cursor.0,
                        y1: cursor.1,
                        x2: next.0,
                        y2: next.1,
                        color: self.pen_color.clone(),
                        width: self.pen_width,
                    });
                }
                cursor = next;
                self.redraw(Some(step_delay))?;
                remaining -= dunits;
            }
        }

        self.scene.truncate_lines(checkpoint);
        if self.pen_down {
            self.scene.push_line(Fragment::Line {
                x1: start.0,
                y1: start.1,
                x2: target.0,
                y2: target.1,
                color: self.pen_color.clone(),
                width: self.pen_width,
            });
        }
        self.fill.line_to(target.0, target.1);
        self.pos = target;
        Ok(())
    }

    /// Turn clockwise (in screen terms) by `degrees`.
    pub fn right(&mut self, degrees: f64) -> Result<()> {
        let degrees = finite(degrees, "degrees")?;
        if !self.animated() {
            self.heading = (self.heading + degrees).rem_euclid(360.0);
            return self.redraw(Some(self.delay() / 3.0));
        }
        let (sx, sy) = self.glyph.stretch;
        if self.glyph.shape != Shape::Ring && sx == sy {
            // One continuous on-screen rotation; the settled heading is
            // identical either way.
            let duration = self.delay() / 3.0 * degrees.abs() / 90.0;
            self.redraw_spin(Spin {
                extent: degrees,
                duration,
            })?;
            self.heading = (self.heading + degrees).rem_euclid(360.0);
            return Ok(());
        }
        // Anisotropic stretch (or the ring's offset anchor) distorts under
        // a continuous rotate, so step in chunks of at most 30°.
        let step_delay = self.delay() / 9.0;
        let s = if degrees > 0.0 { 1.0 } else { -1.0 };
        let mut remaining = degrees;
        while s * remaining > 0.0 {
            let step = if s * remaining > 30.0 { s * 30.0 } else { remaining };
            self.heading = (self.heading + step).rem_euclid(360.0);
            self.redraw(Some(step_delay))?;
            remaining -= s * 30.0;
        }
        Ok(())
    }

    pub fn left(&mut self, degrees: f64) -> Result<()> {
        self.right(-finite(degrees, "degrees")?)
    }

    /// Face the given heading in the mode's external convention, rotating
    /// the shorter way when animating.
    pub fn set_heading(&mut self, degrees: f64) -> Result<()> {
        let degrees = finite(degrees, "degrees")?;
        let target = transform::to_internal_heading(self.transform.mode(), degrees);
        let delta = (target - self.heading).rem_euclid(360.0);
        if self.animated() {
            if delta <= 180.0 {
                self.right(delta)
            } else {
                self.left(360.0 - delta)
            }
        } else {
            self.heading = target;
            self.redraw(Some(self.delay()))
        }
    }

    /// Move to a logical position without changing heading. The glyph's
    /// on-screen tilt is preserved during the slide.
    pub fn goto(&mut self, x: f64, y: f64) -> Result<()> {
        let x = finite(x, "new x position")?;
        let y = finite(y, "new y position")?;
        let heading_orig = self.heading;
        let tilt_orig = self.tilt;
        let from = self.position();
        let alpha = self.transform.bearing(from, (x, y));
        let units = self.transform.distance(from, (x, y));
        match self.transform.mode() {
            Mode::Standard | Mode::World => {
                self.heading = (360.0 - alpha).rem_euclid(360.0);
                self.tilt = heading_orig + tilt_orig + alpha;
            }
            Mode::Logo => {
                self.heading = (270.0 + alpha).rem_euclid(360.0);
                self.tilt = heading_orig + tilt_orig - alpha - 270.0;
            }
            Mode::Svg => {
                self.heading = alpha.rem_euclid(360.0);
                self.tilt = heading_orig + tilt_orig - alpha;
            }
        }
        let target = self.transform.to_device((x, y));
        let result = self.move_to_device(target, units);
        self.tilt = tilt_orig;
        self.heading = heading_orig;
        result
    }

    pub fn set_x(&mut self, x: f64) -> Result<()> {
        let y = self.position().1;
        self.goto(x, y)
    }

    pub fn set_y(&mut self, y: f64) -> Result<()> {
        let x = self.position().0;
        self.goto(x, y)
    }

    /// Return to the mode's origin and default orientation, turning the
    /// shorter way.
    pub fn home(&mut self) -> Result<()> {
        match self.transform.mode() {
            Mode::Svg => {
                let (cx, cy) = self.transform.device_center();
                self.goto(cx, cy)?;
            }
            _ => self.goto(0.0, 0.0)?,
        }
        let h = self.heading;
        match self.transform.mode() {
            Mode::Standard | Mode::World => {
                if h <= 180.0 {
                    self.left(h)
                } else {
                    self.right(360.0 - h)
                }
            }
            Mode::Logo | Mode::Svg => {
                if h < 90.0 {
                    self.left(h + 90.0)
                } else if h < 270.0 {
                    self.right(270.0 - h)
                } else {
                    self.left(h - 270.0)
                }
            }
        }
    }

    /// Draw a circular arc. Positive radius keeps the center to the
    /// turtle's left (counterclockwise sweep); negative to its right.
    /// Decomposed into chunks of at most 90° — SVG arc paths are ambiguous
    /// for near-full sweeps.
    pub fn circle(&mut self, radius: f64, extent: f64) -> Result<()> {
        let radius = finite(radius, "circle radius")?;
        let extent = finite(extent, "extent")?;
        if radius == 0.0 {
            return Err(Error::invalid("circle radius must be nonzero"));
        }
        if extent < 0.0 {
            return Err(Error::invalid("extent should be a positive number"));
        }
        let mut remaining = extent;
        while remaining > 0.0 {
            self.arc_chunk(radius, remaining.min(90.0))?;
            remaining -= 90.0;
        }
        Ok(())
    }

    fn arc_chunk(&mut self, radius: f64, degrees: f64) -> Result<()> {
        let alpha = self.heading.to_radians();
        let theta = degrees.to_radians();
        let s = if radius > 0.0 { 1.0 } else { -1.0 };
        let gamma = alpha - s * theta;
        let (xs, ys) = (self.transform.xscale(), self.transform.yscale().abs());
        let center = (
            self.pos.0 + radius * xs * alpha.sin(),
            self.pos.1 - radius * ys * alpha.cos(),
        );
        let end = (
            round_to(center.0 - radius * xs * gamma.sin(), 3),
            round_to(center.1 + radius * ys * gamma.cos(), 3),
        );
        let (rx, ry) = (radius.abs() * xs, radius.abs() * ys);
        let sweep = radius < 0.0;
        if self.pen_down {
            self.scene.push_line(Fragment::Arc {
                x1: self.pos.0,
                y1: self.pos.1,
                rx,
                ry,
                sweep,
                x2: end.0,
                y2: end.1,
                color: self.pen_color.clone(),
                width: self.pen_width,
            });
        }
        self.fill.arc_to(rx, ry, sweep, end.0, end.1);
        self.pos = end;
        self.heading = (self.heading - s * degrees).rem_euclid(360.0);
        self.redraw(Some(self.delay()))
    }

    /// Draw a dot at the current position. Without a size the diameter is
    /// `pen_width + max(pen_width, 4)`.
    pub fn dot(&mut self, size: Option<f64>, color: Option<ColorSpec>) -> Result<()> {
        let color = match color {
            Some(spec) => color::resolve(&spec)?,
            None => self.pen_color.clone(),
        };
        let size = match size {
            Some(d) => {
                let d = finite(d, "dot size")?;
                if d <= 0.0 {
                    return Err(Error::invalid("dot size must be positive"));
                }
                d
            }
            None => (self.pen_width + self.pen_width.max(4)) as f64,
        };
        self.scene.push_dot(Fragment::Dot {
            cx: self.pos.0,
            cy: self.pos.1,
            radius: size / 2.0,
            color,
        });
        self.redraw(Some(self.delay()))
    }

    /// Place text at the current position, anchored per `align`.
    pub fn write(&mut self, text: &str, align: TextAlign, font: FontSpec) -> Result<()> {
        self.scene.push_line(Fragment::Text {
            x: self.pos.0,
            y: self.pos.1,
            text: text.to_owned(),
            color: self.pen_color.clone(),
            align,
            font,
        });
        self.redraw(Some(self.delay()))
    }

    // -----------------------------------------------------------------------
    // Fill regions
    // -----------------------------------------------------------------------

    /// Open a fill region at the current position. `rule`/`opacity`
    /// override the session defaults for this region only. A second call
    /// before `end_fill` validates its arguments and otherwise does
    /// nothing.
    pub fn begin_fill(&mut self, rule: Option<FillRule>, opacity: Option<f64>) -> Result<()> {
        let rule = rule.unwrap_or(self.fill_rule);
        let opacity = opacity.unwrap_or(self.fill_opacity);
        let checkpoint = self.scene.lines_len();
        self.fill.begin(rule, opacity, self.pos, checkpoint)
    }

    /// Close the active fill region: the traced path replaces the strokes
    /// drawn while it was open, styled with the current fill color, pen
    /// color and pen width. No-op if no region is active.
    pub fn end_fill(&mut self) -> Result<()> {
        if let Some(captured) = self.fill.end() {
            self.scene.truncate_lines(captured.checkpoint);
            self.scene.push_line(Fragment::Fill {
                path: captured.path,
                rule: captured.rule,
                opacity: captured.opacity,
                fill: self.fill_color.clone(),
                stroke: self.pen_color.clone(),
                width: self.pen_width,
            });
            self.redraw(Some(self.delay()))?;
        }
        Ok(())
    }

    pub fn filling(&self) -> bool {
        self.fill.is_active()
    }

    pub fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }

    pub fn set_fill_rule(&mut self, rule: FillRule) {
        self.fill_rule = rule;
    }

    pub fn fill_opacity(&self) -> f64 {
        self.fill_opacity
    }

    pub fn set_fill_opacity(&mut self, opacity: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&opacity) {
            return Err(Error::invalid("the fill opacity should be between 0 and 1"));
        }
        self.fill_opacity = opacity;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Pen & style
    // -----------------------------------------------------------------------

    pub fn pen_up(&mut self) {
        self.pen_down = false;
    }

    pub fn pen_down(&mut self) {
        self.pen_down = true;
    }

    pub fn is_down(&self) -> bool {
        self.pen_down
    }

    pub fn pen_color(&self) -> &Color {
        &self.pen_color
    }

    pub fn set_pen_color(&mut self, spec: impl Into<ColorSpec>) -> Result<()> {
        self.pen_color = color::resolve(&spec.into())?;
        self.redraw(None)
    }

    pub fn fill_color(&self) -> &Color {
        &self.fill_color
    }

    pub fn set_fill_color(&mut self, spec: impl Into<ColorSpec>) -> Result<()> {
        self.fill_color = color::resolve(&spec.into())?;
        self.redraw(None)
    }

    /// Set pen and fill color together.
    pub fn set_color(&mut self, spec: impl Into<ColorSpec>) -> Result<()> {
        let color = color::resolve(&spec.into())?;
        self.pen_color = color.clone();
        self.fill_color = color;
        self.redraw(None)
    }

    /// Set pen and fill color independently; both validate before either
    /// is applied.
    pub fn set_colors(
        &mut self,
        pen: impl Into<ColorSpec>,
        fill: impl Into<ColorSpec>,
    ) -> Result<()> {
        let pen = color::resolve(&pen.into())?;
        let fill = color::resolve(&fill.into())?;
        self.pen_color = pen;
        self.fill_color = fill;
        self.redraw(None)
    }

    pub fn background_color(&self) -> &Color {
        &self.background
    }

    pub fn set_background_color(&mut self, spec: impl Into<ColorSpec>) -> Result<()> {
        self.background = color::resolve(&spec.into())?;
        self.redraw(None)
    }

    /// Show a border around the canvas; defaults to gray.
    pub fn show_border(&mut self, spec: Option<ColorSpec>) -> Result<()> {
        self.border = match spec {
            Some(spec) => color::resolve(&spec)?,
            None => Color("gray".into()),
        };
        self.redraw(None)
    }

    pub fn hide_border(&mut self) -> Result<()> {
        self.border = Color("none".into());
        self.redraw(None)
    }

    pub fn pen_width(&self) -> u32 {
        self.pen_width
    }

    pub fn set_pen_width(&mut self, width: u32) -> Result<()> {
        if width == 0 {
            return Err(Error::invalid("new width value must be positive"));
        }
        self.pen_width = width;
        self.redraw(None)
    }

    pub fn speed(&self) -> u8 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: u8) -> Result<()> {
        if speed > 13 {
            return Err(Error::invalid(
                "speed must be an integer in the interval [0,13]",
            ));
        }
        self.speed = speed;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Glyph
    // -----------------------------------------------------------------------

    pub fn show(&mut self) -> Result<()> {
        self.glyph.visible = true;
        self.redraw(None)
    }

    pub fn hide(&mut self) -> Result<()> {
        self.glyph.visible = false;
        self.redraw(None)
    }

    pub fn is_visible(&self) -> bool {
        self.glyph.visible
    }

    pub fn shape(&self) -> Shape {
        self.glyph.shape
    }

    pub fn set_shape(&mut self, shape: Shape) -> Result<()> {
        self.glyph.shape = shape;
        self.redraw(Some(self.delay()))
    }

    /// `(stretch_wid, stretch_len, outline)` as adjusted by `set_shapesize`.
    pub fn shapesize(&self) -> (f64, f64, f64) {
        (self.glyph.stretch.0, self.glyph.stretch.1, self.glyph.outline)
    }

    pub fn set_shapesize(
        &mut self,
        wid: Option<f64>,
        len: Option<f64>,
        outline: Option<f64>,
    ) -> Result<()> {
        self.glyph.set_shapesize(wid, len, outline)
    }

    /// Rotate the glyph relative to its current tilt without changing the
    /// heading. Positive angles turn counterclockwise in modes where Y
    /// grows upward.
    pub fn tilt(&mut self, angle: f64) -> Result<()> {
        let angle = finite(angle, "tilt angle")?;
        match self.transform.mode() {
            Mode::Standard | Mode::World => self.tilt -= angle,
            Mode::Logo | Mode::Svg => self.tilt += angle,
        }
        self.redraw(None)
    }

    /// Point the glyph at `angle` regardless of its current tilt, without
    /// changing the heading.
    pub fn set_tilt_angle(&mut self, angle: f64) -> Result<()> {
        let angle = finite(angle, "tilt angle")?;
        self.tilt = match self.transform.mode() {
            Mode::Standard | Mode::World => -angle,
            Mode::Logo | Mode::Svg => angle,
        };
        self.redraw(None)
    }

    pub fn tilt_angle(&self) -> f64 {
        self.tilt
    }

    // -----------------------------------------------------------------------
    // Stamps
    // -----------------------------------------------------------------------

    /// Freeze the glyph at its current pose into the given layer and return
    /// the stamp's id.
    pub fn stamp(&mut self, layer: StampLayer) -> Result<StampId> {
        let glyph = self.glyph_snapshot(None);
        let id = self.scene.add_stamp(layer, glyph);
        self.redraw(None)?;
        Ok(id)
    }

    /// Remove one stamp; unknown ids are silently ignored.
    pub fn clear_stamp(&mut self, id: StampId) -> Result<()> {
        self.scene.remove_stamp(id);
        self.redraw(None)
    }

    /// Remove several stamps by id.
    pub fn clear_stamp_batch(&mut self, ids: &[StampId]) -> Result<()> {
        for id in ids {
            self.scene.remove_stamp(*id);
        }
        self.redraw(None)
    }

    /// Remove stamps by creation order: `None` all, `Some(n > 0)` the first
    /// `n`, `Some(n < 0)` the last `|n|`.
    pub fn clear_stamps(&mut self, n: Option<i32>) -> Result<()> {
        self.scene.clear_stamps(n);
        self.redraw(None)
    }

    // -----------------------------------------------------------------------
    // Pen attribute bundle
    // -----------------------------------------------------------------------

    /// The full pen attribute bundle.
    pub fn pen(&self) -> PenSettings {
        PenSettings {
            shown: Some(self.glyph.visible),
            pendown: Some(self.pen_down),
            pencolor: Some(ColorSpec::Name(self.pen_color.as_str().to_owned())),
            fillcolor: Some(ColorSpec::Name(self.fill_color.as_str().to_owned())),
            pensize: Some(self.pen_width),
            speed: Some(self.speed),
            stretchfactor: Some(self.glyph.stretch),
            tilt: Some(self.tilt),
            outline: Some(self.glyph.outline),
        }
    }

    /// Apply the `Some` fields of a pen attribute bundle. Every supplied
    /// field validates before any is applied.
    pub fn set_pen(&mut self, settings: PenSettings) -> Result<()> {
        let pencolor = settings
            .pencolor
            .as_ref()
            .map(color::resolve)
            .transpose()?;
        let fillcolor = settings
            .fillcolor
            .as_ref()
            .map(color::resolve)
            .transpose()?;
        if settings.pensize == Some(0) {
            return Err(Error::invalid("new width value must be positive"));
        }
        if let Some(speed) = settings.speed {
            if speed > 13 {
                return Err(Error::invalid(
                    "speed must be an integer in the interval [0,13]",
                ));
            }
        }
        if let Some((w, l)) = settings.stretchfactor {
            if w == 0.0 || l == 0.0 {
                return Err(Error::invalid("stretch_wid/stretch_len must not be zero"));
            }
        }
        if let Some(outline) = settings.outline {
            if !outline.is_finite() || outline <= 0.0 {
                return Err(Error::invalid("the outline must be a positive number"));
            }
        }
        let tilt = settings.tilt.map(|t| finite(t, "tilt")).transpose()?;

        if let Some(shown) = settings.shown {
            self.glyph.visible = shown;
        }
        if let Some(pendown) = settings.pendown {
            self.pen_down = pendown;
        }
        if let Some(color) = pencolor {
            self.pen_color = color;
        }
        if let Some(color) = fillcolor {
            self.fill_color = color;
        }
        if let Some(width) = settings.pensize {
            self.pen_width = width;
        }
        if let Some(speed) = settings.speed {
            self.speed = speed;
        }
        if let Some(stretch) = settings.stretchfactor {
            self.glyph.stretch = stretch;
        }
        if let Some(tilt) = tilt {
            self.tilt = tilt;
        }
        if let Some(outline) = settings.outline {
            self.glyph.outline = outline;
        }
        self.redraw(None)
    }

    // -----------------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------------

    /// Current position in logical coordinates.
    pub fn position(&self) -> (f64, f64) {
        self.transform.to_logical(self.pos)
    }

    pub fn x(&self) -> f64 {
        self.position().0
    }

    pub fn y(&self) -> f64 {
        self.position().1
    }

    /// Current heading in the mode's external convention.
    pub fn heading(&self) -> f64 {
        transform::to_external_heading(self.transform.mode(), self.heading)
    }

    /// Bearing from the turtle to a logical point.
    pub fn towards(&self, x: f64, y: f64) -> Result<f64> {
        let x = finite(x, "the x position")?;
        let y = finite(y, "the y position")?;
        Ok(self.transform.bearing(self.position(), (x, y)))
    }

    /// Distance from the turtle to a logical point.
    pub fn distance(&self, x: f64, y: f64) -> Result<f64> {
        let x = finite(x, "the x position")?;
        let y = finite(y, "the y position")?;
        Ok(self.transform.distance(self.position(), (x, y)))
    }

    pub fn mode(&self) -> Mode {
        self.transform.mode()
    }

    pub fn window_width(&self) -> u32 {
        self.transform.width()
    }

    pub fn window_height(&self) -> u32 {
        self.transform.height()
    }

    /// Read-only access to the accumulated scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    // -----------------------------------------------------------------------
    // World window & mode
    // -----------------------------------------------------------------------

    /// Install a user coordinate system from its lower-left and upper-right
    /// corners, switching the session to world mode. Best done right after
    /// construction; angles may appear distorted under unequal scales.
    pub fn set_world_coordinates(&mut self, llx: f64, lly: f64, urx: f64, ury: f64) -> Result<()> {
        for v in [llx, lly, urx, ury] {
            finite(v, "world coordinate")?;
        }
        self.transform.set_world_window(llx, lly, urx, ury)
    }

    /// Switch heading/coordinate convention. Resets the scene.
    pub fn set_mode(&mut self, mode: Mode) -> Result<()> {
        debug!("mode change to {}", mode.name());
        self.transform = Transform::new(self.transform.width(), self.transform.height(), mode);
        self.reset()
    }

    // -----------------------------------------------------------------------
    // Clearing
    // -----------------------------------------------------------------------

    /// Erase lines, fills and dots. Stamps, pose, and styles survive. Any
    /// open fill region is abandoned.
    pub fn clear(&mut self) -> Result<()> {
        self.scene.clear();
        self.fill.cancel();
        self.redraw(None)
    }

    /// Restore style defaults, erase everything including stamps, and
    /// re-home the pose. Window size and mode are untouched; so is the
    /// current shape.
    pub fn reset(&mut self) -> Result<()> {
        debug!("reset");
        self.glyph.visible = true;
        self.pen_color = Color(self.defaults.pen.into());
        self.fill_color = Color(self.defaults.fill.into());
        self.background = Color(self.defaults.background.into());
        self.border = Color(self.defaults.border.into());
        self.pen_down = true;
        self.pen_width = self.defaults.pen_width;
        self.glyph.stretch = (1.0, 1.0);
        self.glyph.outline = 1.0;
        self.tilt = 0.0;
        self.fill.cancel();
        self.scene.reset();
        self.heading = transform::initial_heading(self.transform.mode());
        self.pos = self.transform.device_center();
        self.redraw(None)
    }
}

fn finite(v: f64, what: &str) -> Result<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(Error::invalid(format!("{what} must be a finite number")))
    }
}

fn sleep(secs: f64) {
    if secs > 0.0 {
        thread::sleep(Duration::from_secs_f64(secs));
    }
}
