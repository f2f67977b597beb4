//! Color resolver — validates and normalizes color inputs.
//!
//! Accepts the 148 browser color names (plus `none`), 3- and 6-digit hex
//! strings, `rgb(r,g,b)` strings, and RGB triples. Every accepted input is
//! normalized to one canonical wire form before it is stored anywhere:
//! a lowercased name, a lowercased hex string, or `rgb(r,g,b)` with no
//! spaces. Pure lookup/validation only; no session state lives here.

use crate::error::{Error, Result};
use crate::types::{Color, ColorSpec};

/// Browser-supported color names, in the palette index order exposed by
/// [`palette_color`].
pub const NAMED_COLORS: &[&str] = &[
    "black", "navy", "darkblue", "mediumblue", "blue", "darkgreen",
    "green", "teal", "darkcyan", "deepskyblue", "darkturquoise", "mediumspringgreen",
    "lime", "springgreen", "aqua", "cyan", "midnightblue", "dodgerblue",
    "lightseagreen", "forestgreen", "seagreen", "darkslategray", "darkslategrey", "limegreen",
    "mediumseagreen", "turquoise", "royalblue", "steelblue", "darkslateblue", "mediumturquoise",
    "indigo", "darkolivegreen", "cadetblue", "cornflowerblue", "rebeccapurple", "mediumaquamarine",
    "dimgray", "dimgrey", "slateblue", "olivedrab", "slategray", "slategrey",
    "lightslategray", "lightslategrey", "mediumslateblue", "lawngreen", "chartreuse", "aquamarine",
    "maroon", "purple", "olive", "gray", "grey", "skyblue",
    "lightskyblue", "blueviolet", "darkred", "darkmagenta", "saddlebrown", "darkseagreen",
    "lightgreen", "mediumpurple", "darkviolet", "palegreen", "darkorchid", "yellowgreen",
    "sienna", "brown", "darkgray", "darkgrey", "lightblue", "greenyellow",
    "paleturquoise", "lightsteelblue", "powderblue", "firebrick", "darkgoldenrod", "mediumorchid",
    "rosybrown", "darkkhaki", "silver", "mediumvioletred", "indianred", "peru",
    "chocolate", "tan", "lightgray", "lightgrey", "thistle", "orchid",
    "goldenrod", "palevioletred", "crimson", "gainsboro", "plum", "burlywood",
    "lightcyan", "lavender", "darksalmon", "violet", "palegoldenrod", "lightcoral",
    "khaki", "aliceblue", "honeydew", "azure", "sandybrown", "wheat",
    "beige", "whitesmoke", "mintcream", "ghostwhite", "salmon", "antiquewhite",
    "linen", "lightgoldenrodyellow", "oldlace", "red", "fuchsia", "magenta",
    "deeppink", "orangered", "tomato", "hotpink", "coral", "darkorange",
    "lightsalmon", "orange", "lightpink", "pink", "gold", "peachpuff",
    "navajowhite", "moccasin", "bisque", "mistyrose", "blanchedalmond", "papayawhip",
    "lavenderblush", "seashell", "cornsilk", "lemonchiffon", "floralwhite", "snow",
    "yellow", "lightyellow", "ivory", "white",
];

/// Resolve a caller-supplied color into its canonical form.
pub fn resolve(spec: &ColorSpec) -> Result<Color> {
    match spec {
        ColorSpec::Name(s) => resolve_str(s),
        ColorSpec::Rgb(r, g, b) => Ok(Color(format!("rgb({r},{g},{b})"))),
    }
}

fn resolve_str(raw: &str) -> Result<Color> {
    let s = raw.trim().to_ascii_lowercase();
    // The empty string means "no color"; it normalizes to `none`.
    if s.is_empty() || s == "none" {
        return Ok(Color("none".into()));
    }
    if NAMED_COLORS.contains(&s.as_str()) {
        return Ok(Color(s));
    }
    if let Some(hex) = parse_hex(&s) {
        return Ok(Color(hex));
    }
    if let Some((r, g, b)) = parse_rgb(&s) {
        return Ok(Color(format!("rgb({r},{g},{b})")));
    }
    Err(Error::invalid(format!(
        "color '{raw}' is invalid; it can be a known html color name, \
         3-6 digit hex string, or rgb string"
    )))
}

/// Accept `#rgb` or `#rrggbb`; returns the lowercased canonical string.
fn parse_hex(s: &str) -> Option<String> {
    let digits = s.strip_prefix('#')?;
    if (digits.len() == 3 || digits.len() == 6) && digits.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(s.to_owned())
    } else {
        None
    }
}

/// Accept `rgb(r,g,b)` with each component in `[0,255]`.
fn parse_rgb(s: &str) -> Option<(u8, u8, u8)> {
    let inner = s.strip_prefix("rgb(")?.strip_suffix(')')?;
    let mut parts = inner.split(',');
    let mut next = || -> Option<u8> { parts.next()?.trim().parse().ok() };
    let (r, g, b) = (next()?, next()?, next()?);
    if parts.next().is_some() {
        return None;
    }
    Some((r, g, b))
}

/// The color at position `n` in the palette index, `n` in `[0,139]`.
pub fn palette_color(n: usize) -> Result<Color> {
    if n > 139 {
        return Err(Error::invalid("color request must be between 0 and 139"));
    }
    Ok(Color(NAMED_COLORS[n].into()))
}
