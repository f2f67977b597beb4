//! Turtle scripts — the human-authored serializable command format.
//!
//! A script says *what the turtle does*, not what the canvas looks like.
//! The executor replays commands against a live session; everything else
//! (validation, animation, rendering) happens in the engine as if the
//! calls had been made directly.

use serde::{Deserialize, Serialize};

use crate::engine::Turtle;
use crate::error::Result;
use crate::glyph::Shape;
use crate::types::{ColorSpec, FillRule, FontSpec, StampLayer, TextAlign, WindowConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurtleScript {
    #[serde(default)]
    pub window: WindowConfig,
    pub commands: Vec<Command>,
}

fn default_extent() -> f64 {
    360.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    Forward { units: f64 },
    Backward { units: f64 },
    Right { degrees: f64 },
    Left { degrees: f64 },
    SetHeading { degrees: f64 },
    Goto { x: f64, y: f64 },
    Home,
    Circle {
        radius: f64,
        #[serde(default = "default_extent")]
        extent: f64,
    },
    Dot {
        #[serde(default)]
        size: Option<f64>,
        #[serde(default)]
        color: Option<ColorSpec>,
    },
    Write {
        text: String,
        #[serde(default)]
        align: TextAlign,
        #[serde(default)]
        font: Option<FontSpec>,
    },
    PenUp,
    PenDown,
    PenColor { color: ColorSpec },
    FillColor { color: ColorSpec },
    BackgroundColor { color: ColorSpec },
    PenWidth { width: u32 },
    Speed { speed: u8 },
    BeginFill {
        #[serde(default)]
        rule: Option<FillRule>,
        #[serde(default)]
        opacity: Option<f64>,
    },
    EndFill,
    /// Shape by name so scripts surface the same invalid-name errors as
    /// direct callers.
    Shape { name: String },
    ShapeSize {
        #[serde(default)]
        wid: Option<f64>,
        #[serde(default)]
        len: Option<f64>,
        #[serde(default)]
        outline: Option<f64>,
    },
    Tilt { angle: f64 },
    Stamp {
        #[serde(default)]
        layer: StampLayer,
    },
    ClearStamps {
        #[serde(default)]
        n: Option<i32>,
    },
    ShowTurtle,
    HideTurtle,
    ShowBorder {
        #[serde(default)]
        color: Option<ColorSpec>,
    },
    HideBorder,
    SetWorldCoordinates {
        llx: f64,
        lly: f64,
        urx: f64,
        ury: f64,
    },
    Clear,
    Reset,
    Done,
}

/// Replay a command sequence against a session. Stops at the first error.
pub fn run(turtle: &mut Turtle, commands: &[Command]) -> Result<()> {
    for command in commands {
        apply(turtle, command)?;
    }
    Ok(())
}

fn apply(turtle: &mut Turtle, command: &Command) -> Result<()> {
    match command {
        Command::Forward { units } => turtle.forward(*units),
        Command::Backward { units } => turtle.backward(*units),
        Command::Right { degrees } => turtle.right(*degrees),
        Command::Left { degrees } => turtle.left(*degrees),
        Command::SetHeading { degrees } => turtle.set_heading(*degrees),
        Command::Goto { x, y } => turtle.goto(*x, *y),
        Command::Home => turtle.home(),
        Command::Circle { radius, extent } => turtle.circle(*radius, *extent),
        Command::Dot { size, color } => turtle.dot(*size, color.clone()),
        Command::Write { text, align, font } => {
            turtle.write(text, *align, font.clone().unwrap_or_default())
        }
        Command::PenUp => {
            turtle.pen_up();
            Ok(())
        }
        Command::PenDown => {
            turtle.pen_down();
            Ok(())
        }
        Command::PenColor { color } => turtle.set_pen_color(color.clone()),
        Command::FillColor { color } => turtle.set_fill_color(color.clone()),
        Command::BackgroundColor { color } => turtle.set_background_color(color.clone()),
        Command::PenWidth { width } => turtle.set_pen_width(*width),
        Command::Speed { speed } => turtle.set_speed(*speed),
        Command::BeginFill { rule, opacity } => turtle.begin_fill(*rule, *opacity),
        Command::EndFill => turtle.end_fill(),
        Command::Shape { name } => turtle.set_shape(Shape::parse(name)?),
        Command::ShapeSize { wid, len, outline } => turtle.set_shapesize(*wid, *len, *outline),
        Command::Tilt { angle } => turtle.tilt(*angle),
        Command::Stamp { layer } => turtle.stamp(*layer).map(|_| ()),
        Command::ClearStamps { n } => turtle.clear_stamps(*n),
        Command::ShowTurtle => turtle.show(),
        Command::HideTurtle => turtle.hide(),
        Command::ShowBorder { color } => turtle.show_border(color.clone()),
        Command::HideBorder => turtle.hide_border(),
        Command::SetWorldCoordinates { llx, lly, urx, ury } => {
            turtle.set_world_coordinates(*llx, *lly, *urx, *ury)
        }
        Command::Clear => turtle.clear(),
        Command::Reset => turtle.reset(),
        Command::Done => turtle.done(),
    }
}
