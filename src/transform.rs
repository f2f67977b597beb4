//! Coordinate transform — the mode-dependent geometry kernel.
//!
//! Owns the logical↔device mapping (including the user-settable world
//! window) and every heading-convention conversion. All arithmetic on
//! headings elsewhere in the crate uses the *internal* convention: 0° along
//! the device +X axis, positive angles rotating toward device +Y (clockwise
//! on screen). The per-mode external conventions exist only at this
//! boundary.

use crate::error::{Error, Result};
use crate::types::Mode;

/// Round to `places` decimal places. Motion code rounds device positions to
/// 3 places to suppress floating-point drift; bearings round to 10 and
/// distances to 8, matching the introspection contract.
pub(crate) fn round_to(v: f64, places: i32) -> f64 {
    let f = 10f64.powi(places);
    (v * f).round() / f
}

#[derive(Debug, Clone)]
pub struct Transform {
    mode: Mode,
    width: u32,
    height: u32,
    xmin: f64,
    ymin: f64,
    xmax: f64,
    ymax: f64,
    xscale: f64,
    yscale: f64,
}

impl Transform {
    pub fn new(width: u32, height: u32, mode: Mode) -> Transform {
        let (w, h) = (width as f64, height as f64);
        match mode {
            // Logical origin at the viewport center, Y up, unit scale.
            Mode::Standard | Mode::Logo | Mode::World => Transform {
                mode,
                width,
                height,
                xmin: -w / 2.0,
                ymin: -h / 2.0,
                xmax: w / 2.0,
                ymax: h / 2.0,
                xscale: 1.0,
                yscale: 1.0,
            },
            // Device-native: logical space equals device space.
            Mode::Svg => Transform {
                mode,
                width,
                height,
                xmin: 0.0,
                ymin: -h,
                xmax: w,
                ymax: 0.0,
                xscale: 1.0,
                yscale: -1.0,
            },
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn xscale(&self) -> f64 {
        self.xscale
    }

    pub fn yscale(&self) -> f64 {
        self.yscale
    }

    /// Device-space center of the viewport.
    pub fn device_center(&self) -> (f64, f64) {
        (self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    pub fn to_device(&self, (x, y): (f64, f64)) -> (f64, f64) {
        ((x - self.xmin) * self.xscale, (self.ymax - y) * self.yscale)
    }

    pub fn to_logical(&self, (dx, dy): (f64, f64)) -> (f64, f64) {
        (dx / self.xscale + self.xmin, self.ymax - dy / self.yscale)
    }

    /// Install a user world window and switch to `World` mode.
    pub fn set_world_window(&mut self, llx: f64, lly: f64, urx: f64, ury: f64) -> Result<()> {
        if urx - llx <= 0.0 {
            return Err(Error::invalid(
                "lower left x-coordinate should be less than upper right x-coordinate",
            ));
        }
        if ury - lly <= 0.0 {
            return Err(Error::invalid(
                "lower left y-coordinate should be less than upper right y-coordinate",
            ));
        }
        self.xmin = llx;
        self.ymin = lly;
        self.xmax = urx;
        self.ymax = ury;
        self.xscale = self.width as f64 / (urx - llx);
        self.yscale = self.height as f64 / (ury - lly);
        self.mode = Mode::World;
        Ok(())
    }

    /// Bearing from `from` to `to` in the mode's external heading
    /// convention, rounded to 10 decimals.
    pub fn bearing(&self, from: (f64, f64), to: (f64, f64)) -> f64 {
        let dx = to.0 - from.0;
        let mut dy = to.1 - from.1;
        if self.mode == Mode::Svg {
            dy = -dy;
        }
        let r = round_to(dy.atan2(dx).to_degrees(), 10).rem_euclid(360.0);
        match self.mode {
            Mode::Standard | Mode::World => r,
            Mode::Logo => (90.0 - r).rem_euclid(360.0),
            Mode::Svg => (360.0 - r).rem_euclid(360.0),
        }
    }

    /// Euclidean distance between two logical points, rounded to 8 decimals.
    pub fn distance(&self, from: (f64, f64), to: (f64, f64)) -> f64 {
        round_to(((to.0 - from.0).powi(2) + (to.1 - from.1).powi(2)).sqrt(), 8)
    }
}

// ---------------------------------------------------------------------------
// Heading conventions
// ---------------------------------------------------------------------------

/// Internal heading a session starts with (and returns to on reset).
/// External heading 0° then faces right in standard/world and up in logo.
pub fn initial_heading(mode: Mode) -> f64 {
    match mode {
        Mode::Standard | Mode::World => 0.0,
        Mode::Logo | Mode::Svg => 270.0,
    }
}

/// Convert an internal heading to the mode's external convention.
pub fn to_external_heading(mode: Mode, internal: f64) -> f64 {
    match mode {
        Mode::Standard | Mode::World => (360.0 - internal).rem_euclid(360.0),
        Mode::Logo => (internal - 270.0).rem_euclid(360.0),
        Mode::Svg => internal.rem_euclid(360.0),
    }
}

/// Convert an external heading to the internal convention.
pub fn to_internal_heading(mode: Mode, external: f64) -> f64 {
    match mode {
        Mode::Standard | Mode::World => (360.0 - external).rem_euclid(360.0),
        Mode::Logo => (270.0 + external).rem_euclid(360.0),
        Mode::Svg => external.rem_euclid(360.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_mode_maps_origin_to_center() {
        let t = Transform::new(800, 600, Mode::Standard);
        assert_eq!(t.to_device((0.0, 0.0)), (400.0, 300.0));
        assert_eq!(t.to_device((100.0, 100.0)), (500.0, 200.0));
        assert_eq!(t.to_logical((400.0, 300.0)), (0.0, 0.0));
    }

    #[test]
    fn svg_mode_is_identity() {
        let t = Transform::new(800, 600, Mode::Svg);
        assert_eq!(t.to_device((10.0, 20.0)), (10.0, 20.0));
        assert_eq!(t.to_logical((10.0, 20.0)), (10.0, 20.0));
    }

    #[test]
    fn world_window_rescales() {
        let mut t = Transform::new(800, 600, Mode::Standard);
        t.set_world_window(0.0, 0.0, 10.0, 10.0).unwrap();
        assert_eq!(t.mode(), Mode::World);
        assert_eq!(t.to_device((5.0, 5.0)), (400.0, 300.0));
        assert_eq!(t.to_device((0.0, 10.0)), (0.0, 0.0));
        assert_eq!(t.to_logical((800.0, 600.0)), (10.0, 0.0));
    }

    #[test]
    fn degenerate_world_window_is_rejected() {
        let mut t = Transform::new(800, 600, Mode::Standard);
        assert!(t.set_world_window(5.0, 0.0, 5.0, 10.0).is_err());
        assert!(t.set_world_window(0.0, 10.0, 10.0, 10.0).is_err());
        // Untouched on failure.
        assert_eq!(t.mode(), Mode::Standard);
        assert_eq!(t.to_device((0.0, 0.0)), (400.0, 300.0));
    }

    #[test]
    fn heading_round_trips_per_mode() {
        for mode in [Mode::Standard, Mode::Logo, Mode::World, Mode::Svg] {
            for ext in [0.0, 45.0, 90.0, 180.0, 270.0, 359.0] {
                let int = to_internal_heading(mode, ext);
                assert!(
                    (to_external_heading(mode, int) - ext).abs() < 1e-9,
                    "{mode:?} {ext}"
                );
            }
        }
    }

    #[test]
    fn initial_external_heading_is_zero() {
        for mode in [Mode::Standard, Mode::Logo, Mode::World] {
            assert_eq!(to_external_heading(mode, initial_heading(mode)), 0.0);
        }
        // Device-native keeps the raw convention.
        assert_eq!(to_external_heading(Mode::Svg, initial_heading(Mode::Svg)), 270.0);
    }

    #[test]
    fn bearing_matches_mode_convention() {
        let t = Transform::new(800, 600, Mode::Standard);
        assert_eq!(t.bearing((0.0, 0.0), (10.0, 0.0)), 0.0);
        assert_eq!(t.bearing((0.0, 0.0), (0.0, 10.0)), 90.0);

        let t = Transform::new(800, 600, Mode::Logo);
        assert_eq!(t.bearing((0.0, 0.0), (0.0, 10.0)), 0.0);
        assert_eq!(t.bearing((0.0, 0.0), (10.0, 0.0)), 90.0);

        let t = Transform::new(800, 600, Mode::Svg);
        // Device Y grows downward; "down" is 90° here.
        assert_eq!(t.bearing((0.0, 0.0), (0.0, 10.0)), 90.0);
    }

    #[test]
    fn distance_is_euclidean() {
        let t = Transform::new(800, 600, Mode::Standard);
        assert_eq!(t.distance((0.0, 0.0), (3.0, 4.0)), 5.0);
    }
}
