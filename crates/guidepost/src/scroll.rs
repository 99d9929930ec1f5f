#![forbid(unsafe_code)]

//! Centering a target in the viewport.
//!
//! Smooth scrolling has no reliable completion signal, so centering is
//! fire-and-forget: the caller waits a fixed settle window before measuring
//! again, and re-applies the scroll block after the reapply delay.

use guidepost_core::geometry::{Point, Rect, Size};

use crate::input_lock::InputLock;
use crate::viewport::{ScrollBehavior, ViewportQuery};

/// Issues centering scrolls and manages the lock around them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollOrchestrator {
    behavior: ScrollBehavior,
}

impl ScrollOrchestrator {
    #[must_use]
    pub fn new(behavior: ScrollBehavior) -> Self {
        Self { behavior }
    }

    /// Scroll position that centers `rect` (viewport coordinates) given the
    /// current `scroll` offset, clamped to `>= 0` on both axes.
    #[must_use]
    pub fn centering_target(rect: Rect, scroll: Point, viewport: Size) -> Point {
        let absolute = rect.translate(scroll.x, scroll.y);
        Point::new(
            (absolute.center_x() - viewport.width / 2.0).max(0.0),
            (absolute.center_y() - viewport.height / 2.0).max(0.0),
        )
    }

    /// Center on `rect`, lifting the scroll block for the animation.
    ///
    /// Returns the scroll target. The caller owns re-applying the block via
    /// [`InputLock::resume`] once the animation is expected to be over.
    pub fn center_on<H: ViewportQuery + ?Sized>(
        &self,
        host: &mut H,
        lock: &mut InputLock,
        rect: Rect,
    ) -> Point {
        let target =
            Self::centering_target(rect, host.scroll_offset(), host.viewport_size());
        lock.suspend(host);
        host.scroll_to(target, self.behavior);
        tracing::debug!(
            target: "guidepost.scroll",
            x = target.x,
            y = target.y,
            "centering scroll issued"
        );
        target
    }
}
