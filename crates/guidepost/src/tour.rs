#![forbid(unsafe_code)]

//! Guided tour state machine.
//!
//! `Idle → Active(i) → Idle`. Every transition bumps an epoch; the timers a
//! transition schedules are stamped with that epoch and discarded if they
//! fire after a newer transition. Entering a step runs:
//!
//! 1. the step's `on_enter` hook, synchronously;
//! 2. after the mutation delay, measure the target and center it;
//! 3. after the settle window, recompute highlight and message geometry.
//!
//! Geometry recomputed before the scroll settles would be stale, so step 3
//! never runs early. Nothing here panics or returns errors across the public
//! API: invalid transitions are no-ops returning `None`.

use guidepost_core::event::Event;
use guidepost_core::geometry::{Point, Rect};
use web_time::Duration;

use crate::clock::{Clock, DeterministicClock, TimerAction, TimerQueue};
use crate::error::ResolveError;
use crate::input_lock::{InputLock, LockVerdict};
use crate::placer::{MessagePlacement, MessagePlacer};
use crate::resolver::GeometryResolver;
use crate::scroll::ScrollOrchestrator;
use crate::settings::{MissingTargetPolicy, TourSettings};
use crate::step::{TourConfig, TourStep};
use crate::viewport::ViewportQuery;

/// Why the current step changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourAdvanceReason {
    ManualNext,
    ManualPrev,
    Jump,
    /// The previous step's target could not be resolved.
    SkippedMissing,
}

/// Something observable the tour did.
#[derive(Debug, Clone, PartialEq)]
pub enum TourEvent {
    Started {
        steps: usize,
    },
    StepChanged {
        from: usize,
        to: usize,
        reason: TourAdvanceReason,
    },
    GeometryUpdated {
        index: usize,
        highlight: Rect,
        message: Point,
    },
    TargetMissing {
        index: usize,
        selector: String,
    },
    Skipped {
        at: usize,
    },
    Completed {
        at: usize,
    },
    /// Ended by the missing-target policy; no terminal callback fired.
    Aborted {
        at: usize,
        selector: String,
    },
}

/// What the host should do with an input event it forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// Deliver normally.
    Ignored,
    /// Swallow: the tour blocks this input.
    Consumed,
    /// The event ended the tour (Escape).
    Skipped,
}

/// Render-ready view of the active step.
#[derive(Debug, Clone)]
pub struct TourOverlayState<'a> {
    pub step_index: usize,
    pub step_count: usize,
    pub title: &'a str,
    pub message: &'a str,
    /// "2 of 5".
    pub progress: String,
    pub is_first: bool,
    pub is_last: bool,
    /// Last computed highlight, `None` before the first successful resolve.
    pub highlight: Option<Rect>,
    pub placement: Option<MessagePlacement>,
    /// Geometry belongs to an earlier step (target missing or not settled).
    pub stale: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

enum Ending {
    Skipped,
    Completed,
    Silent,
}

#[derive(Debug, Clone)]
struct RuntimeState {
    active: bool,
    index: usize,
    highlight: Rect,
    placement: Option<MessagePlacement>,
    geometry_step: Option<usize>,
    settled: bool,
    direction: Direction,
}

impl Default for RuntimeState {
    fn default() -> Self {
        Self {
            active: false,
            index: 0,
            highlight: Rect::default(),
            placement: None,
            geometry_step: None,
            settled: false,
            direction: Direction::Forward,
        }
    }
}

/// Drives one tour over a host document.
pub struct TourController<H: ViewportQuery, C: Clock = DeterministicClock> {
    host: H,
    clock: C,
    settings: TourSettings,
    resolver: GeometryResolver,
    placer: MessagePlacer,
    scroller: ScrollOrchestrator,
    lock: InputLock,
    timers: TimerQueue,
    config: TourConfig,
    state: RuntimeState,
    epoch: u64,
    observing: bool,
    /// Produced outside `poll` (resizes routed through `handle_event`).
    pending: Vec<TourEvent>,
}

impl<H: ViewportQuery, C: Clock> TourController<H, C> {
    /// Create a dormant controller with default settings.
    pub fn new(host: H, clock: C) -> Self {
        Self::with_settings(host, clock, TourSettings::default())
    }

    pub fn with_settings(host: H, clock: C, settings: TourSettings) -> Self {
        Self {
            host,
            clock,
            resolver: GeometryResolver::new(settings.composite.clone()),
            placer: MessagePlacer::new(&settings.message),
            scroller: ScrollOrchestrator::default(),
            settings,
            lock: InputLock::new(),
            timers: TimerQueue::new(),
            config: TourConfig::default(),
            state: RuntimeState::default(),
            epoch: 0,
            observing: false,
            pending: Vec::new(),
        }
    }

    /// Supply the steps and callbacks. Ends a running tour silently first.
    pub fn configure(&mut self, config: TourConfig) {
        if self.state.active {
            tracing::debug!(target: "guidepost.tour", "reconfigured while active; ending tour");
            self.finish(Ending::Silent);
        }
        self.config = config;
        self.state = RuntimeState::default();
        self.observe();
    }

    /// Begin at step 0. No-op if already active or there are no steps.
    pub fn start(&mut self) -> Option<TourEvent> {
        if self.state.active {
            tracing::debug!(target: "guidepost.tour", "start while active ignored");
            return None;
        }
        if self.config.is_empty() {
            tracing::debug!(target: "guidepost.tour", "start with no steps ignored");
            return None;
        }
        if !self.lock.acquire(&mut self.host) {
            return None;
        }
        // Reconnects after a teardown.
        self.observe();

        let steps = self.config.len();
        self.state.active = true;
        self.state.index = 0;
        self.state.direction = Direction::Forward;
        tracing::info!(target: "guidepost.tour", steps, "tour started");

        let now = self.clock.now_mono();
        self.enter_step(now);
        Some(TourEvent::Started { steps })
    }

    /// Advance one step. No-op on the last step.
    pub fn next(&mut self) -> Option<TourEvent> {
        if !self.state.active || self.state.index + 1 >= self.config.len() {
            tracing::debug!(target: "guidepost.tour", "next ignored");
            return None;
        }
        Some(self.move_to(
            self.state.index + 1,
            Direction::Forward,
            TourAdvanceReason::ManualNext,
        ))
    }

    /// Go back one step. No-op on the first step.
    pub fn previous(&mut self) -> Option<TourEvent> {
        if !self.state.active || self.state.index == 0 {
            tracing::debug!(target: "guidepost.tour", "previous ignored");
            return None;
        }
        Some(self.move_to(
            self.state.index - 1,
            Direction::Backward,
            TourAdvanceReason::ManualPrev,
        ))
    }

    /// Jump to `index`, clamped to the last step. Same-index is a no-op.
    pub fn jump_to(&mut self, index: usize) -> Option<TourEvent> {
        if !self.state.active || self.config.is_empty() {
            return None;
        }
        let idx = index.min(self.config.len() - 1);
        if idx == self.state.index {
            return None;
        }
        let direction = if idx > self.state.index {
            Direction::Forward
        } else {
            Direction::Backward
        };
        Some(self.move_to(idx, direction, TourAdvanceReason::Jump))
    }

    /// Leave the tour early, firing `on_skip`.
    pub fn skip(&mut self) -> Option<TourEvent> {
        if !self.state.active {
            return None;
        }
        let at = self.state.index;
        self.finish(Ending::Skipped);
        Some(TourEvent::Skipped { at })
    }

    /// Finish the tour, firing `on_complete`.
    pub fn complete(&mut self) -> Option<TourEvent> {
        if !self.state.active {
            return None;
        }
        let at = self.state.index;
        self.finish(Ending::Completed);
        Some(TourEvent::Completed { at })
    }

    /// Route a host input event through the tour.
    ///
    /// A resize recomputes geometry; the resulting event is returned by the
    /// next [`poll`](Self::poll).
    pub fn handle_event(&mut self, event: &Event) -> EventOutcome {
        if let Event::Resize { .. } = event {
            if let Some(event) = self.notify_resize() {
                self.pending.push(event);
            }
            return EventOutcome::Ignored;
        }
        if !self.state.active {
            return EventOutcome::Ignored;
        }

        let controls = self.state.placement.map(|p| p.bounds);
        match self.lock.filter(event, controls) {
            LockVerdict::Escape => {
                let _ = self.skip();
                EventOutcome::Skipped
            }
            LockVerdict::Block => EventOutcome::Consumed,
            LockVerdict::Pass => EventOutcome::Ignored,
        }
    }

    /// Recompute geometry for the current step after a size change.
    ///
    /// Ignored while a settle is still pending; that recompute will observe
    /// the new size anyway.
    pub fn notify_resize(&mut self) -> Option<TourEvent> {
        if !self.state.active {
            return None;
        }
        if !self.state.settled {
            tracing::debug!(target: "guidepost.tour", "resize before settle deferred");
            return None;
        }
        let index = self.state.index;
        match self.update_geometry(index) {
            Ok(event) => Some(event),
            Err(err) => {
                tracing::warn!(
                    target: "guidepost.tour",
                    index,
                    selector = err.selector(),
                    "target lost after resize; keeping last geometry"
                );
                Some(TourEvent::TargetMissing {
                    index,
                    selector: err.selector().to_string(),
                })
            }
        }
    }

    /// Fire every timer due by the clock's current time.
    pub fn poll(&mut self) -> Vec<TourEvent> {
        let now = self.clock.now_mono();
        let mut events = std::mem::take(&mut self.pending);

        while let Some(timer) = self.timers.pop_due(now) {
            if timer.epoch != self.epoch {
                tracing::trace!(
                    target: "guidepost.tour",
                    epoch = timer.epoch,
                    current = self.epoch,
                    "stale timer discarded"
                );
                continue;
            }
            match timer.action {
                TimerAction::Scroll => self.scroll_to_target(timer.due),
                TimerAction::Settle => self.settle(timer.due, &mut events),
                TimerAction::ResumeLock => self.lock.resume(&mut self.host),
            }
        }

        events
    }

    /// Tear down: cancel timers, release the lock, disconnect the observer.
    ///
    /// No callbacks fire. Also runs on drop.
    pub fn teardown(&mut self) {
        if self.state.active {
            tracing::info!(target: "guidepost.tour", at = self.state.index, "tour torn down mid-flight");
        }
        self.epoch += 1;
        self.timers.cancel_all();
        self.pending.clear();
        self.lock.release(&mut self.host);
        self.state.active = false;
        if self.observing {
            self.host.observe_resize(false);
            self.observing = false;
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.active
    }

    /// Index of the current step. Meaningful only while active.
    #[must_use]
    pub fn current_step_index(&self) -> usize {
        self.state.index
    }

    #[must_use]
    pub fn current_step(&self) -> Option<&TourStep> {
        if !self.state.active {
            return None;
        }
        self.config.steps().get(self.state.index)
    }

    #[must_use]
    pub fn step_count(&self) -> usize {
        self.config.len()
    }

    /// Last rendered highlight. Do not trust while inactive.
    #[must_use]
    pub fn highlight_rect(&self) -> Rect {
        self.state.highlight
    }

    /// Last rendered message anchor. Do not trust while inactive.
    #[must_use]
    pub fn message_position(&self) -> Point {
        self.state.placement.map(|p| p.point).unwrap_or_default()
    }

    #[must_use]
    pub fn message_placement(&self) -> Option<MessagePlacement> {
        self.state.placement
    }

    /// Whether the current step's settle window has elapsed.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.state.settled
    }

    /// Transition counter; bumps on every step entry and ending.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub fn lock_held(&self) -> bool {
        self.lock.is_held()
    }

    /// Due time of the next pending timer.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_due()
    }

    #[must_use]
    pub fn settings(&self) -> &TourSettings {
        &self.settings
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Render-ready state, `None` while inactive.
    #[must_use]
    pub fn overlay_state(&self) -> Option<TourOverlayState<'_>> {
        if !self.state.active {
            return None;
        }
        let step = self.config.steps().get(self.state.index)?;
        let step_count = self.config.len();
        let has_geometry = self.state.geometry_step.is_some();

        Some(TourOverlayState {
            step_index: self.state.index,
            step_count,
            title: step.title(),
            message: step.message(),
            progress: format!("{} of {}", self.state.index + 1, step_count),
            is_first: self.state.index == 0,
            is_last: self.state.index + 1 == step_count,
            highlight: has_geometry.then_some(self.state.highlight),
            placement: self.state.placement,
            stale: self.state.geometry_step != Some(self.state.index) || !self.state.settled,
        })
    }

    fn move_to(&mut self, to: usize, direction: Direction, reason: TourAdvanceReason) -> TourEvent {
        let from = self.state.index;
        self.state.index = to;
        self.state.direction = direction;
        tracing::debug!(target: "guidepost.tour", from, to, ?reason, "step changed");
        let now = self.clock.now_mono();
        self.enter_step(now);
        TourEvent::StepChanged { from, to, reason }
    }

    /// Run the entry hook and schedule measure→scroll→settle from `base`.
    fn enter_step(&mut self, base: Duration) {
        self.epoch += 1;
        // The previous step's reapply timer dies with its epoch.
        self.lock.resume(&mut self.host);
        self.timers.retain_epoch(self.epoch);
        self.state.settled = false;

        let index = self.state.index;
        let Some(step) = self.config.steps().get(index) else {
            return;
        };
        let _span =
            tracing::debug_span!("tour.step", index, target = %step.target()).entered();
        if let Some(hook) = step.enter_hook() {
            hook();
        }

        self.timers.schedule(
            base.saturating_add(self.settings.mutation_delay()),
            self.epoch,
            TimerAction::Scroll,
        );
    }

    fn scroll_to_target(&mut self, base: Duration) {
        let index = self.state.index;
        let Some(step) = self.config.steps().get(index) else {
            return;
        };
        match self.resolver.locate(&self.host, step.target()) {
            Ok(rect) => {
                self.scroller.center_on(&mut self.host, &mut self.lock, rect);
                self.timers.schedule(
                    base.saturating_add(self.settings.lock_reapply_delay()),
                    self.epoch,
                    TimerAction::ResumeLock,
                );
            }
            Err(err) => {
                tracing::debug!(
                    target: "guidepost.scroll",
                    selector = err.selector(),
                    "scroll target missing; not scrolling"
                );
                self.lock.resume(&mut self.host);
            }
        }
        self.timers.schedule(
            base.saturating_add(self.settings.settle_window()),
            self.epoch,
            TimerAction::Settle,
        );
    }

    fn settle(&mut self, base: Duration, events: &mut Vec<TourEvent>) {
        self.state.settled = true;
        let index = self.state.index;
        let err = match self.update_geometry(index) {
            Ok(event) => {
                events.push(event);
                return;
            }
            Err(err) => err,
        };

        let selector = err.selector().to_string();
        tracing::warn!(
            target: "guidepost.tour",
            index,
            selector = %selector,
            policy = ?self.settings.missing_target,
            "step target not found"
        );

        match self.settings.missing_target {
            MissingTargetPolicy::KeepLast => {
                events.push(TourEvent::TargetMissing { index, selector });
            }
            MissingTargetPolicy::SkipAhead => {
                events.push(TourEvent::TargetMissing { index, selector });
                let to = match self.state.direction {
                    Direction::Forward if index + 1 < self.config.len() => Some(index + 1),
                    Direction::Backward if index > 0 => Some(index - 1),
                    _ => None,
                };
                if let Some(to) = to {
                    self.state.index = to;
                    self.enter_step(base);
                    events.push(TourEvent::StepChanged {
                        from: index,
                        to,
                        reason: TourAdvanceReason::SkippedMissing,
                    });
                }
            }
            MissingTargetPolicy::Abort => {
                self.finish(Ending::Silent);
                events.push(TourEvent::Aborted {
                    at: index,
                    selector,
                });
            }
        }
    }

    fn update_geometry(&mut self, index: usize) -> Result<TourEvent, ResolveError> {
        let Some(step) = self.config.steps().get(index) else {
            return Err(ResolveError::TargetNotFound {
                selector: String::new(),
            });
        };
        let padding = step
            .highlight_padding()
            .unwrap_or(self.settings.default_padding);
        let side = step.preferred_side().unwrap_or(self.settings.default_side);

        let highlight = self.resolver.resolve(&self.host, step.target(), padding)?;
        let placement = self
            .placer
            .place(highlight, side, self.host.viewport_size());

        self.state.highlight = highlight;
        self.state.placement = Some(placement);
        self.state.geometry_step = Some(index);
        tracing::debug!(
            target: "guidepost.tour",
            index,
            side = ?placement.side,
            "geometry updated"
        );
        Ok(TourEvent::GeometryUpdated {
            index,
            highlight,
            message: placement.point,
        })
    }

    fn observe(&mut self) {
        if !self.observing {
            self.host.observe_resize(true);
            self.observing = true;
        }
    }

    fn finish(&mut self, ending: Ending) {
        let at = self.state.index;
        self.epoch += 1;
        let dropped = self.timers.cancel_all();
        self.pending.clear();
        self.lock.release(&mut self.host);
        self.state.active = false;
        self.state.settled = false;

        match ending {
            Ending::Skipped => {
                tracing::info!(target: "guidepost.tour", at, dropped, "tour skipped");
                if let Some(callback) = self.config.on_skip.as_mut() {
                    callback();
                }
            }
            Ending::Completed => {
                tracing::info!(target: "guidepost.tour", at, dropped, "tour completed");
                if let Some(callback) = self.config.on_complete.as_mut() {
                    callback();
                }
            }
            Ending::Silent => {
                tracing::info!(target: "guidepost.tour", at, dropped, "tour ended");
            }
        }
    }
}

impl<H: ViewportQuery> TourController<H, DeterministicClock> {
    /// Advance the deterministic clock by `dt` and fire due timers.
    pub fn advance(&mut self, dt: Duration) -> Vec<TourEvent> {
        self.clock.advance(dt);
        self.poll()
    }
}

impl<H: ViewportQuery, C: Clock> Drop for TourController<H, C> {
    fn drop(&mut self) {
        self.teardown();
    }
}
