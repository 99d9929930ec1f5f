#![forbid(unsafe_code)]

//! The document as an injected capability.
//!
//! The engine never touches a real DOM. Hosts implement [`ViewportQuery`] over
//! whatever document they own; tests use
//! [`MemoryDocument`](crate::memory::MemoryDocument).

use guidepost_core::geometry::{Point, Rect, Size};

/// How a programmatic scroll should be animated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBehavior {
    #[default]
    Smooth,
    Instant,
}

/// Style values of the scroll container that the input lock overrides.
///
/// `None` means the property is unset on the element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScrollStyle {
    pub overflow: Option<String>,
    pub position: Option<String>,
}

impl ScrollStyle {
    #[must_use]
    pub fn new(overflow: Option<&str>, position: Option<&str>) -> Self {
        Self {
            overflow: overflow.map(str::to_string),
            position: position.map(str::to_string),
        }
    }

    /// The style applied while scrolling is blocked, keeping `position`.
    #[must_use]
    pub fn blocked_from(saved: &ScrollStyle) -> Self {
        Self {
            overflow: Some("hidden".to_string()),
            position: saved.position.clone(),
        }
    }
}

/// Read/write access to the live document.
pub trait ViewportQuery {
    /// Bounding rectangle of the first element matching `selector`, in
    /// viewport coordinates.
    fn query_rect(&self, selector: &str) -> Option<Rect>;

    /// Union of the rectangles matched by two selectors; `None` when either
    /// is missing.
    fn query_combined_rect(&self, a: &str, b: &str) -> Option<Rect> {
        let first = self.query_rect(a)?;
        let second = self.query_rect(b)?;
        Some(first.union(&second))
    }

    /// Current document scroll position.
    fn scroll_offset(&self) -> Point;

    /// Scroll the document so that `target` is the new scroll position.
    fn scroll_to(&mut self, target: Point, behavior: ScrollBehavior);

    /// Size of the visible viewport.
    fn viewport_size(&self) -> Size;

    /// Current style of the scroll container.
    fn scroll_style(&self) -> ScrollStyle;

    fn set_scroll_style(&mut self, style: ScrollStyle);

    /// Connect or disconnect the host's size-change observer.
    fn observe_resize(&mut self, enabled: bool) {
        let _ = enabled;
    }
}

impl<T: ViewportQuery + ?Sized> ViewportQuery for &mut T {
    fn query_rect(&self, selector: &str) -> Option<Rect> {
        (**self).query_rect(selector)
    }

    fn query_combined_rect(&self, a: &str, b: &str) -> Option<Rect> {
        (**self).query_combined_rect(a, b)
    }

    fn scroll_offset(&self) -> Point {
        (**self).scroll_offset()
    }

    fn scroll_to(&mut self, target: Point, behavior: ScrollBehavior) {
        (**self).scroll_to(target, behavior);
    }

    fn viewport_size(&self) -> Size {
        (**self).viewport_size()
    }

    fn scroll_style(&self) -> ScrollStyle {
        (**self).scroll_style()
    }

    fn set_scroll_style(&mut self, style: ScrollStyle) {
        (**self).set_scroll_style(style);
    }

    fn observe_resize(&mut self, enabled: bool) {
        (**self).observe_resize(enabled);
    }
}
