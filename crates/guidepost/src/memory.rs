#![forbid(unsafe_code)]

//! Host-driven in-memory document.
//!
//! [`MemoryDocument`] is a cheap-to-clone handle over shared document state,
//! the same way a DOM handle is: enter hooks can capture a clone and mutate
//! the page (open a popover, render a table row) while the controller holds
//! another clone. Elements are stored in document coordinates and reported in
//! viewport coordinates relative to the current scroll offset.
//!
//! Programmatic scrolls land immediately; the engine still waits its settle
//! window, which is what makes the sequencing observable in tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use guidepost_core::geometry::{Point, Rect, Size};

use crate::viewport::{ScrollBehavior, ScrollStyle, ViewportQuery};

#[derive(Debug, Default)]
struct DocumentState {
    elements: HashMap<String, Rect>,
    viewport: Size,
    document: Option<Size>,
    scroll: Point,
    style: ScrollStyle,
    style_writes: Vec<ScrollStyle>,
    scroll_log: Vec<(Point, ScrollBehavior)>,
    observing_resize: bool,
    observer_toggles: usize,
}

/// Shared in-memory document for tests and headless hosts.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    inner: Rc<RefCell<DocumentState>>,
}

impl MemoryDocument {
    /// Create an empty document with the given viewport size.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        let doc = Self::default();
        doc.inner.borrow_mut().viewport = Size::new(width, height);
        doc
    }

    /// Bound the scrollable extent; scroll targets are clamped to it.
    #[must_use]
    pub fn with_document_size(self, width: f64, height: f64) -> Self {
        self.inner.borrow_mut().document = Some(Size::new(width, height));
        self
    }

    /// Set the initial scroll container style.
    #[must_use]
    pub fn with_style(self, style: ScrollStyle) -> Self {
        self.inner.borrow_mut().style = style;
        self
    }

    /// Register (or move) an element at `rect` in document coordinates.
    pub fn insert(&self, selector: impl Into<String>, rect: Rect) {
        self.inner.borrow_mut().elements.insert(selector.into(), rect);
    }

    /// Remove an element; returns whether it existed.
    pub fn remove(&self, selector: &str) -> bool {
        self.inner.borrow_mut().elements.remove(selector).is_some()
    }

    #[must_use]
    pub fn contains(&self, selector: &str) -> bool {
        self.inner.borrow().elements.contains_key(selector)
    }

    pub fn set_viewport_size(&self, width: f64, height: f64) {
        self.inner.borrow_mut().viewport = Size::new(width, height);
    }

    /// Move the scroll position without recording it as a programmatic scroll.
    pub fn set_scroll_offset(&self, offset: Point) {
        self.inner.borrow_mut().scroll = offset;
    }

    /// Current scroll container style.
    #[must_use]
    pub fn style(&self) -> ScrollStyle {
        self.inner.borrow().style.clone()
    }

    /// Every style written by the engine, in order.
    #[must_use]
    pub fn style_writes(&self) -> Vec<ScrollStyle> {
        self.inner.borrow().style_writes.clone()
    }

    /// Every programmatic scroll, in order.
    #[must_use]
    pub fn scroll_log(&self) -> Vec<(Point, ScrollBehavior)> {
        self.inner.borrow().scroll_log.clone()
    }

    #[must_use]
    pub fn is_observing_resize(&self) -> bool {
        self.inner.borrow().observing_resize
    }

    /// How many times the resize observer was connected or disconnected.
    #[must_use]
    pub fn observer_toggles(&self) -> usize {
        self.inner.borrow().observer_toggles
    }
}

impl ViewportQuery for MemoryDocument {
    fn query_rect(&self, selector: &str) -> Option<Rect> {
        let state = self.inner.borrow();
        state
            .elements
            .get(selector)
            .map(|rect| rect.translate(-state.scroll.x, -state.scroll.y))
    }

    fn scroll_offset(&self) -> Point {
        self.inner.borrow().scroll
    }

    fn scroll_to(&mut self, target: Point, behavior: ScrollBehavior) {
        let mut state = self.inner.borrow_mut();
        let landed = match state.document {
            Some(doc) => Point::new(
                target.x.clamp(0.0, (doc.width - state.viewport.width).max(0.0)),
                target.y.clamp(0.0, (doc.height - state.viewport.height).max(0.0)),
            ),
            None => Point::new(target.x.max(0.0), target.y.max(0.0)),
        };
        state.scroll = landed;
        state.scroll_log.push((target, behavior));
    }

    fn viewport_size(&self) -> Size {
        self.inner.borrow().viewport
    }

    fn scroll_style(&self) -> ScrollStyle {
        self.inner.borrow().style.clone()
    }

    fn set_scroll_style(&mut self, style: ScrollStyle) {
        let mut state = self.inner.borrow_mut();
        state.style_writes.push(style.clone());
        state.style = style;
    }

    fn observe_resize(&mut self, enabled: bool) {
        let mut state = self.inner.borrow_mut();
        if state.observing_resize != enabled {
            state.observing_resize = enabled;
            state.observer_toggles += 1;
        }
    }
}
