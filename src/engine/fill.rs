//! Fill accumulator — begin/end region capture.
//!
//! While a region is active, motion emitted by the engine appends path
//! commands here in addition to its normal fragments. At most one region
//! exists at a time: `begin` while active validates its arguments but
//! changes nothing, and `end` while inactive is a no-op.

use crate::error::{Error, Result};
use crate::scene::PathCmd;
use crate::types::FillRule;

/// A completed region, ready to become a `Fragment::Fill`.
#[derive(Debug)]
pub struct CapturedFill {
    pub path: Vec<PathCmd>,
    pub rule: FillRule,
    pub opacity: f64,
    /// Line-buffer length recorded at `begin`; the engine truncates back to
    /// this before appending the fill fragment, so the fill replaces the
    /// strokes traced while it was open.
    pub checkpoint: usize,
}

#[derive(Debug, Default)]
pub struct FillState {
    active: Option<ActiveFill>,
}

#[derive(Debug)]
struct ActiveFill {
    rule: FillRule,
    opacity: f64,
    path: Vec<PathCmd>,
    checkpoint: usize,
}

impl FillState {
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Open a region at the current device position. Validation happens
    /// even when a region is already active (in which case nothing else
    /// does).
    pub fn begin(
        &mut self,
        rule: FillRule,
        opacity: f64,
        start: (f64, f64),
        checkpoint: usize,
    ) -> Result<()> {
        if !(0.0..=1.0).contains(&opacity) {
            return Err(Error::invalid("the fill opacity should be between 0 and 1"));
        }
        if self.active.is_none() {
            self.active = Some(ActiveFill {
                rule,
                opacity,
                path: vec![PathCmd::MoveTo {
                    x: start.0,
                    y: start.1,
                }],
                checkpoint,
            });
        }
        Ok(())
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        if let Some(fill) = &mut self.active {
            fill.path.push(PathCmd::LineTo { x, y });
        }
    }

    pub fn arc_to(&mut self, rx: f64, ry: f64, sweep: bool, x: f64, y: f64) {
        if let Some(fill) = &mut self.active {
            fill.path.push(PathCmd::Arc { rx, ry, sweep, x, y });
        }
    }

    /// Close the region, if one is active.
    pub fn end(&mut self) -> Option<CapturedFill> {
        self.active.take().map(|fill| CapturedFill {
            path: fill.path,
            rule: fill.rule,
            opacity: fill.opacity,
            checkpoint: fill.checkpoint,
        })
    }

    /// Abandon any active region without producing a fragment.
    pub fn cancel(&mut self) {
        self.active = None;
    }
}
