//! Edge-band auto-scroll while dragging.
//!
//! Each pointer sample is checked against the scroll viewport. A pointer
//! inside the band along an edge yields a fixed-size nudge towards that edge;
//! the host applies it and re-evaluates on the next sample.

use formcraft_core::{LayoutAxis, Point, Rect};
use serde::{Deserialize, Serialize};

pub const DEFAULT_EDGE_BAND: f64 = 24.0;
pub const DEFAULT_SCROLL_STEP: f64 = 12.0;

/// Scroll offset to apply to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollNudge {
    pub dx: f64,
    pub dy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoScroll {
    /// Band width measured inward from each viewport edge.
    pub edge: f64,
    /// Distance scrolled per triggering sample.
    pub step: f64,
}

impl Default for AutoScroll {
    fn default() -> Self {
        Self {
            edge: DEFAULT_EDGE_BAND,
            step: DEFAULT_SCROLL_STEP,
        }
    }
}

impl AutoScroll {
    #[must_use]
    pub const fn new(edge: f64, step: f64) -> Self {
        Self { edge, step }
    }

    /// The nudge for `point`, or `None` when it lies outside every band or
    /// outside the viewport altogether.
    #[must_use]
    pub fn evaluate(&self, point: Point, viewport: Rect) -> Option<ScrollNudge> {
        if !viewport.contains(point) {
            return None;
        }
        let nudge = ScrollNudge {
            dx: self.along(LayoutAxis::Row, point, viewport),
            dy: self.along(LayoutAxis::Column, point, viewport),
        };
        if nudge.dx == 0.0 && nudge.dy == 0.0 {
            return None;
        }
        formcraft_core::trace!(dx = nudge.dx, dy = nudge.dy, "auto-scroll");
        Some(nudge)
    }

    /// Signed step along one axis. When both bands overlap (a viewport
    /// narrower than two bands) the nearer edge wins.
    fn along(&self, axis: LayoutAxis, point: Point, viewport: Rect) -> f64 {
        let coord = axis.coord(point);
        let to_start = coord - viewport.start(axis);
        let to_end = viewport.end(axis) - coord;
        if to_start < self.edge && to_start <= to_end {
            -self.step
        } else if to_end < self.edge {
            self.step
        } else {
            0.0
        }
    }
}
