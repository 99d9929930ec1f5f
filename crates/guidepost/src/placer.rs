#![forbid(unsafe_code)]

//! Message placement next to a highlighted target.
//!
//! # Invariants
//!
//! 1. `Top`/`Bottom` keep the requested side and clamp horizontally so the
//!    assumed message box never crosses a viewport edge.
//! 2. `Left`/`Right` never clamp: a placement that would leave the viewport
//!    flips to the opposite side of the target instead.
//! 3. Placement is computed from the assumed footprint, never from the
//!    rendered message.
//!
//! The anchor point for `Top`/`Bottom` is the horizontal center and the top
//! edge of the message box; for `Left`/`Right` it is the left edge and the
//! vertical center.

use guidepost_core::geometry::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

use crate::settings::MessageSettings;

/// Side of the target the message is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
}

/// Where the message ends up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MessagePlacement {
    /// Anchor point (see module docs for the convention).
    pub point: Point,
    /// Side actually used after any flip.
    pub side: Side,
    /// Assumed message rectangle in viewport coordinates.
    pub bounds: Rect,
}

/// Computes message anchors from a fixed gap and assumed footprint.
#[derive(Debug, Clone, PartialEq)]
pub struct MessagePlacer {
    gap: f64,
    width: f64,
    height: f64,
}

impl Default for MessagePlacer {
    fn default() -> Self {
        Self::new(&MessageSettings::default())
    }
}

impl MessagePlacer {
    #[must_use]
    pub fn new(settings: &MessageSettings) -> Self {
        Self {
            gap: settings.gap,
            width: settings.width,
            height: settings.height,
        }
    }

    /// Place a message for `rect` on `side` within `viewport`.
    #[must_use]
    pub fn place(&self, rect: Rect, side: Side, viewport: Size) -> MessagePlacement {
        let (point, side) = match side {
            Side::Bottom => (
                Point::new(self.clamp_center_x(rect.center_x(), viewport), rect.bottom() + self.gap),
                Side::Bottom,
            ),
            Side::Top => (
                Point::new(
                    self.clamp_center_x(rect.center_x(), viewport),
                    rect.top() - self.gap - self.height,
                ),
                Side::Top,
            ),
            Side::Left => {
                let x = self.left_of(rect);
                if x < 0.0 {
                    (Point::new(self.right_of(rect), rect.center_y()), Side::Right)
                } else {
                    (Point::new(x, rect.center_y()), Side::Left)
                }
            }
            Side::Right => {
                let x = self.right_of(rect);
                if x + self.width > viewport.width {
                    (Point::new(self.left_of(rect), rect.center_y()), Side::Left)
                } else {
                    (Point::new(x, rect.center_y()), Side::Right)
                }
            }
        };

        MessagePlacement {
            point,
            side,
            bounds: self.bounds(point, side),
        }
    }

    fn left_of(&self, rect: Rect) -> f64 {
        rect.left() - self.width - self.gap
    }

    fn right_of(&self, rect: Rect) -> f64 {
        rect.right() + self.gap
    }

    /// Keep half the footprint inside both viewport edges.
    fn clamp_center_x(&self, x: f64, viewport: Size) -> f64 {
        let half = self.width / 2.0;
        let max = viewport.width - half;
        if max < half {
            return viewport.width / 2.0;
        }
        x.clamp(half, max)
    }

    fn bounds(&self, point: Point, side: Side) -> Rect {
        match side {
            Side::Top | Side::Bottom => {
                Rect::new(point.x - self.width / 2.0, point.y, self.width, self.height)
            }
            Side::Left | Side::Right => {
                Rect::new(point.x, point.y - self.height / 2.0, self.width, self.height)
            }
        }
    }
}
