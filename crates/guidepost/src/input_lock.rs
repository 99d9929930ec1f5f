#![forbid(unsafe_code)]

//! Page-wide scroll lock and input interception.
//!
//! # Invariants
//!
//! 1. `acquire` captures the exact scroll-container style before overriding
//!    it; `release` writes that captured style back, never a hardcoded
//!    default.
//! 2. Both are idempotent: acquire while held and release while free are
//!    no-ops.
//! 3. At most one lock per UI thread holds the page. A second acquisition
//!    is refused and trips a debug assertion.
//! 4. Escape is never blocked.

use std::cell::Cell;

use guidepost_core::event::{Event, KeyCode, KeyEventKind, MouseEventKind, TouchPhase};
use guidepost_core::geometry::Rect;

use crate::viewport::{ScrollStyle, ViewportQuery};

thread_local! {
    static PAGE_LOCK_HELD: Cell<bool> = const { Cell::new(false) };
}

/// Whether any lock on this thread currently holds the page.
#[must_use]
pub fn page_lock_held() -> bool {
    PAGE_LOCK_HELD.with(Cell::get)
}

/// What the host should do with an input event while a tour runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockVerdict {
    /// Deliver the event normally.
    Pass,
    /// Swallow the event (prevent default and stop propagation).
    Block,
    /// The user asked to leave the tour.
    Escape,
}

/// Suspends page scrolling and blocks navigation input.
#[derive(Debug, Default)]
pub struct InputLock {
    saved: Option<ScrollStyle>,
    suspended: bool,
}

impl InputLock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_held(&self) -> bool {
        self.saved.is_some()
    }

    /// Whether the scroll block is temporarily lifted for an animation.
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Block scrolling. Returns `false` if another lock holds the page.
    pub fn acquire<H: ViewportQuery + ?Sized>(&mut self, host: &mut H) -> bool {
        if self.is_held() {
            tracing::debug!(target: "guidepost.lock", "acquire while held ignored");
            return true;
        }
        if page_lock_held() {
            tracing::error!(
                target: "guidepost.lock",
                "page scroll lock already held by another tour"
            );
            debug_assert!(false, "concurrent tours are not supported");
            return false;
        }

        let saved = host.scroll_style();
        host.set_scroll_style(ScrollStyle::blocked_from(&saved));
        tracing::debug!(
            target: "guidepost.lock",
            overflow = ?saved.overflow,
            position = ?saved.position,
            "scroll lock acquired"
        );
        self.saved = Some(saved);
        self.suspended = false;
        PAGE_LOCK_HELD.with(|held| held.set(true));
        true
    }

    /// Restore the captured style. No-op when not held.
    pub fn release<H: ViewportQuery + ?Sized>(&mut self, host: &mut H) {
        let Some(saved) = self.saved.take() else {
            return;
        };
        host.set_scroll_style(saved);
        self.suspended = false;
        PAGE_LOCK_HELD.with(|held| held.set(false));
        tracing::debug!(target: "guidepost.lock", "scroll lock released");
    }

    /// Lift the scroll block without giving up the lock.
    pub fn suspend<H: ViewportQuery + ?Sized>(&mut self, host: &mut H) {
        if self.suspended {
            return;
        }
        if let Some(saved) = &self.saved {
            host.set_scroll_style(saved.clone());
            self.suspended = true;
        }
    }

    /// Re-apply the scroll block after [`suspend`](Self::suspend).
    pub fn resume<H: ViewportQuery + ?Sized>(&mut self, host: &mut H) {
        if !self.suspended {
            return;
        }
        if let Some(saved) = &self.saved {
            host.set_scroll_style(ScrollStyle::blocked_from(saved));
        }
        self.suspended = false;
    }

    /// Classify `event`. `controls` is the area of the tour's own controls;
    /// presses outside it count as backdrop clicks. With `controls` unknown
    /// (no message placed yet) presses pass, so the host's own buttons stay
    /// usable before the first settle.
    #[must_use]
    pub fn filter(&self, event: &Event, controls: Option<Rect>) -> LockVerdict {
        if let Event::Key(key) = event
            && key.code == KeyCode::Escape
        {
            return if key.kind == KeyEventKind::Press {
                LockVerdict::Escape
            } else {
                LockVerdict::Pass
            };
        }
        if !self.is_held() {
            return LockVerdict::Pass;
        }

        let blocked = match event {
            Event::Key(key) => key.scrolls_page(),
            Event::Mouse(mouse) => match mouse.kind {
                kind if kind.is_scroll() => true,
                MouseEventKind::Down(_) | MouseEventKind::Up(_) => {
                    controls.is_some_and(|area| !area.contains(mouse.position()))
                }
                _ => false,
            },
            Event::Touch(touch) => touch.phase == TouchPhase::Move,
            Event::Resize { .. } => false,
        };

        if blocked {
            LockVerdict::Block
        } else {
            LockVerdict::Pass
        }
    }
}

impl Drop for InputLock {
    fn drop(&mut self) {
        if self.saved.is_some() {
            PAGE_LOCK_HELD.with(|held| held.set(false));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDocument;
    use guidepost_core::event::{KeyEvent, Modifiers, MouseButton, MouseEvent, TouchEvent};

    fn doc() -> MemoryDocument {
        MemoryDocument::new(800.0, 600.0).with_style(ScrollStyle::new(Some("auto"), Some("static")))
    }

    #[test]
    fn acquire_twice_release_once_restores() {
        let mut doc = doc();
        let mut lock = InputLock::new();
        assert!(lock.acquire(&mut doc));
        assert!(lock.acquire(&mut doc));
        assert_eq!(doc.style().overflow.as_deref(), Some("hidden"));
        lock.release(&mut doc);
        assert_eq!(doc.style(), ScrollStyle::new(Some("auto"), Some("static")));
        assert!(!page_lock_held());
    }

    #[test]
    fn release_twice_writes_once() {
        let mut doc = doc();
        let mut lock = InputLock::new();
        lock.acquire(&mut doc);
        lock.release(&mut doc);
        lock.release(&mut doc);
        assert_eq!(doc.style_writes().len(), 2);
        assert_eq!(doc.style(), ScrollStyle::new(Some("auto"), Some("static")));
    }

    #[test]
    fn release_without_acquire_is_noop() {
        let mut doc = doc();
        InputLock::new().release(&mut doc);
        assert!(doc.style_writes().is_empty());
    }

    #[test]
    fn unset_style_is_restored_as_unset() {
        let mut doc = MemoryDocument::new(800.0, 600.0);
        let mut lock = InputLock::new();
        lock.acquire(&mut doc);
        lock.release(&mut doc);
        assert_eq!(doc.style(), ScrollStyle::default());
    }

    #[test]
    fn suspend_and_resume_toggle_block() {
        let mut doc = doc();
        let mut lock = InputLock::new();
        lock.acquire(&mut doc);
        lock.suspend(&mut doc);
        assert!(lock.is_suspended());
        assert_eq!(doc.style().overflow.as_deref(), Some("auto"));
        lock.resume(&mut doc);
        assert_eq!(doc.style().overflow.as_deref(), Some("hidden"));
        lock.release(&mut doc);
    }

    #[test]
    fn suspend_without_lock_is_noop() {
        let mut doc = doc();
        let mut lock = InputLock::new();
        lock.suspend(&mut doc);
        lock.resume(&mut doc);
        assert!(!lock.is_suspended());
        assert!(doc.style_writes().is_empty());
    }

    #[test]
    fn release_while_suspended_restores() {
        let mut doc = doc();
        let mut lock = InputLock::new();
        lock.acquire(&mut doc);
        lock.suspend(&mut doc);
        lock.release(&mut doc);
        assert!(!lock.is_suspended());
        assert_eq!(doc.style(), ScrollStyle::new(Some("auto"), Some("static")));
    }

    #[test]
    fn filter_blocks_scroll_input_while_held() {
        let mut doc = doc();
        let mut lock = InputLock::new();
        let wheel = Event::Mouse(MouseEvent::new(MouseEventKind::ScrollDown, 5.0, 5.0));
        let page_down = Event::Key(KeyEvent::new(KeyCode::PageDown));
        let space = Event::Key(KeyEvent::new(KeyCode::Char(' ')));
        let touch = Event::Touch(TouchEvent::new(TouchPhase::Move, 1.0, 1.0));
        let letter = Event::Key(KeyEvent::new(KeyCode::Char('a')));

        assert_eq!(lock.filter(&wheel, None), LockVerdict::Pass);

        lock.acquire(&mut doc);
        assert_eq!(lock.filter(&wheel, None), LockVerdict::Block);
        assert_eq!(lock.filter(&page_down, None), LockVerdict::Block);
        assert_eq!(lock.filter(&space, None), LockVerdict::Block);
        assert_eq!(lock.filter(&touch, None), LockVerdict::Block);
        assert_eq!(lock.filter(&letter, None), LockVerdict::Pass);
        lock.release(&mut doc);
    }

    #[test]
    fn modified_keys_follow_browser_scrolling() {
        let mut doc = doc();
        let mut lock = InputLock::new();
        lock.acquire(&mut doc);
        let key = |code, modifiers| Event::Key(KeyEvent::new(code).with_modifiers(modifiers));
        assert_eq!(
            lock.filter(&key(KeyCode::Home, Modifiers::CTRL), None),
            LockVerdict::Block
        );
        assert_eq!(
            lock.filter(&key(KeyCode::Char(' '), Modifiers::SHIFT), None),
            LockVerdict::Block
        );
        assert_eq!(
            lock.filter(&key(KeyCode::Left, Modifiers::ALT), None),
            LockVerdict::Pass
        );
        assert_eq!(
            lock.filter(&key(KeyCode::Right, Modifiers::NONE), None),
            LockVerdict::Block
        );
        lock.release(&mut doc);
    }

    #[test]
    fn backdrop_clicks_blocked_but_controls_pass() {
        let mut doc = doc();
        let mut lock = InputLock::new();
        lock.acquire(&mut doc);
        let controls = Some(Rect::new(100.0, 100.0, 400.0, 200.0));
        let inside = Event::Mouse(MouseEvent::new(
            MouseEventKind::Down(MouseButton::Left),
            150.0,
            150.0,
        ));
        let outside = Event::Mouse(MouseEvent::new(
            MouseEventKind::Down(MouseButton::Left),
            10.0,
            10.0,
        ));
        let moved = Event::Mouse(MouseEvent::new(MouseEventKind::Moved, 10.0, 10.0));
        assert_eq!(lock.filter(&inside, controls), LockVerdict::Pass);
        assert_eq!(lock.filter(&outside, controls), LockVerdict::Block);
        assert_eq!(lock.filter(&outside, None), LockVerdict::Pass);
        assert_eq!(lock.filter(&moved, controls), LockVerdict::Pass);
        lock.release(&mut doc);
    }

    #[test]
    fn escape_is_never_blocked() {
        let mut doc = doc();
        let mut lock = InputLock::new();
        let esc = Event::Key(KeyEvent::new(KeyCode::Escape));
        assert_eq!(lock.filter(&esc, None), LockVerdict::Escape);
        lock.acquire(&mut doc);
        assert_eq!(lock.filter(&esc, None), LockVerdict::Escape);
        let esc_up = Event::Key(KeyEvent::new(KeyCode::Escape).with_kind(KeyEventKind::Release));
        assert_eq!(lock.filter(&esc_up, None), LockVerdict::Pass);
        lock.release(&mut doc);
    }

    #[test]
    fn dropping_held_lock_frees_page() {
        let mut doc = doc();
        {
            let mut lock = InputLock::new();
            lock.acquire(&mut doc);
            assert!(page_lock_held());
        }
        assert!(!page_lock_held());
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "concurrent tours are not supported")]
    fn second_lock_on_same_thread_asserts() {
        let mut doc = doc();
        let mut first = InputLock::new();
        let mut second = InputLock::new();
        first.acquire(&mut doc);
        second.acquire(&mut doc);
    }
}
