//! Shared boundary types for the turtle-graphics engine.
//!
//! This module defines the small value types that cross component
//! boundaries:
//! - Engine ↔ Transform: `Mode` (heading/coordinate convention)
//! - Engine ↔ Renderer: style primitives (`Color`, `FillRule`, text)
//! - Caller ↔ Engine: `ColorSpec` inputs, `WindowConfig`, `PenSettings`

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Coordinate / heading convention
// ---------------------------------------------------------------------------

/// Heading and coordinate convention for a session.
///
/// `Standard`, `Logo` and `World` place the logical origin at the viewport
/// center with Y growing upward; `Svg` is the device-native convention
/// (origin top-left, Y growing downward).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Standard,
    Logo,
    World,
    Svg,
}

impl Mode {
    pub fn name(self) -> &'static str {
        match self {
            Mode::Standard => "standard",
            Mode::Logo => "logo",
            Mode::World => "world",
            Mode::Svg => "svg",
        }
    }

    /// Parse a user-supplied mode name.
    pub fn parse(name: &str) -> Result<Mode> {
        match name.to_ascii_lowercase().as_str() {
            "standard" => Ok(Mode::Standard),
            "logo" => Ok(Mode::Logo),
            "world" => Ok(Mode::World),
            "svg" => Ok(Mode::Svg),
            other => Err(Error::invalid(format!(
                "mode must be standard, logo, world, or svg, got '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Shared style primitives
// ---------------------------------------------------------------------------

/// A validated color in its canonical wire form: a lowercased palette name,
/// a lowercased `#rgb`/`#rrggbb` hex string, `rgb(r,g,b)`, or `none`.
///
/// Construct one through [`crate::color::resolve`] or the `TryFrom`
/// conversions; the inner string is guaranteed canonical.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub(crate) String);

impl Color {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A color input as the caller supplies it, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    /// A palette name, hex string, or `rgb(r,g,b)` string.
    Name(String),
    /// An RGB triple; components are bounded by the type.
    Rgb(u8, u8, u8),
}

impl From<&str> for ColorSpec {
    fn from(s: &str) -> Self {
        ColorSpec::Name(s.to_owned())
    }
}

impl From<String> for ColorSpec {
    fn from(s: String) -> Self {
        ColorSpec::Name(s)
    }
}

impl From<(u8, u8, u8)> for ColorSpec {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        ColorSpec::Rgb(r, g, b)
    }
}

impl TryFrom<ColorSpec> for Color {
    type Error = Error;

    fn try_from(spec: ColorSpec) -> Result<Color> {
        crate::color::resolve(&spec)
    }
}

/// SVG fill rule for filled regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillRule {
    NonZero,
    EvenOdd,
}

impl FillRule {
    pub fn name(self) -> &'static str {
        match self {
            FillRule::NonZero => "nonzero",
            FillRule::EvenOdd => "evenodd",
        }
    }

    /// Parse a user-supplied rule name.
    pub fn parse(name: &str) -> Result<FillRule> {
        match name.to_ascii_lowercase().as_str() {
            "nonzero" => Ok(FillRule::NonZero),
            "evenodd" => Ok(FillRule::EvenOdd),
            _ => Err(Error::invalid("the fill rule must be 'nonzero' or 'evenodd'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Text annotation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    /// The SVG `text-anchor` value for this alignment.
    pub fn anchor(self) -> &'static str {
        match self {
            TextAlign::Left => "start",
            TextAlign::Center => "middle",
            TextAlign::Right => "end",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontStyle {
    Bold,
    Italic,
    Underline,
    Normal,
}

/// The `(size, family, style)` font triple accepted by text annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontSpec {
    pub size: u32,
    pub family: String,
    pub style: FontStyle,
}

impl FontSpec {
    /// Validate a loosely-typed triple as the script/caller supplies it.
    pub fn new(size: u32, family: &str, style: &str) -> Result<FontSpec> {
        let style = match style {
            "bold" => FontStyle::Bold,
            "italic" => FontStyle::Italic,
            "underline" => FontStyle::Underline,
            "normal" => FontStyle::Normal,
            _ => {
                return Err(Error::invalid(
                    "font style must be one of bold, italic, underline, normal",
                ));
            }
        };
        if family.is_empty() {
            return Err(Error::invalid("font family must be a non-empty string"));
        }
        Ok(FontSpec {
            size,
            family: family.to_owned(),
            style,
        })
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        FontSpec {
            size: 12,
            family: "Arial".into(),
            style: FontStyle::Normal,
        }
    }
}

// ---------------------------------------------------------------------------
// Stamps
// ---------------------------------------------------------------------------

/// Where a stamp is layered relative to line/fill/dot buffers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StampLayer {
    #[default]
    Below,
    Above,
}

/// Identifier returned by `stamp`; monotonic per session, never reused.
pub type StampId = u32;

// ---------------------------------------------------------------------------
// Session configuration
// ---------------------------------------------------------------------------

fn default_width() -> u32 {
    800
}
fn default_height() -> u32 {
    600
}
fn default_mode() -> Mode {
    Mode::Standard
}
fn default_speed() -> u8 {
    5
}

/// Initial window parameters for a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_mode")]
    pub mode: Mode,
    /// Animation speed level in `[0,13]`; 0 disables intermediate redraws.
    #[serde(default = "default_speed")]
    pub speed: u8,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            width: default_width(),
            height: default_height(),
            mode: default_mode(),
            speed: default_speed(),
        }
    }
}

impl WindowConfig {
    /// The defaults used by the original ColabTurtle package: 800×500
    /// device-native window. Pairs with dark styling applied at init.
    pub fn classic() -> Self {
        WindowConfig {
            width: 800,
            height: 500,
            mode: Mode::Svg,
            speed: default_speed(),
        }
    }
}

/// Live canvas parameters handed to the renderer with every snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasContract {
    pub width: u32,
    pub height: u32,
    pub background: Color,
    pub border: Color,
}

// ---------------------------------------------------------------------------
// Pen attribute bundle
// ---------------------------------------------------------------------------

/// Explicit get/set bundle for the pen attributes.
///
/// The getter returns a fully-populated bundle; the setter applies only the
/// fields that are `Some`, validating each before any is applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PenSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shown: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pendown: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pencolor: Option<ColorSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fillcolor: Option<ColorSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pensize: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stretchfactor: Option<(f64, f64)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tilt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline: Option<f64>,
}
