//! svg-turtle — notebook-style turtle graphics rendered to SVG.
//!
//! A stateful cursor moves and turns on a 2D canvas, leaving trails that
//! accumulate into a typed scene, serialized to SVG markup on every redraw
//! and handed to a pluggable render sink.
//!
//! The crate is split the same way the data flows:
//! - `engine` owns the session state and command surface
//! - `transform` owns coordinate and heading conventions
//! - `scene` accumulates typed fragments; `glyph` holds the cursor shapes
//! - `renderer` serializes fragments to markup, purely
//! - `display` is the sink boundary; `script` is the serializable command
//!   format the CLI replays

pub mod color;
pub mod display;
pub mod engine;
pub mod error;
pub mod glyph;
pub mod renderer;
pub mod scene;
pub mod script;
pub mod transform;
pub mod types;

pub use display::{HtmlFileSink, MemorySink, NullSink, RenderSink};
pub use engine::Turtle;
pub use error::{Error, Result};
pub use glyph::Shape;
pub use types::{
    Color, ColorSpec, FillRule, FontSpec, FontStyle, Mode, PenSettings, StampId, StampLayer,
    TextAlign, WindowConfig,
};
