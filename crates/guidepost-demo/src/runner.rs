//! Replays a [`DemoScript`] against an in-memory page and records what the
//! tour did.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use guidepost::{
    DeterministicClock, EventOutcome, MemoryDocument, ScrollStyle, TourController, TourEvent,
    TourOverlayState, TourSettings,
};
use guidepost_core::{Event, KeyCode, KeyEvent, MouseEvent, MouseEventKind, Rect};
use web_time::Duration;

use crate::error::{DemoError, Result};
use crate::script::{Action, DemoScript};

/// How the replay ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    Completed,
    Skipped,
    /// Actions ran out with the tour still active.
    Abandoned,
}

#[derive(Debug, Clone)]
pub struct Transcript {
    pub lines: Vec<String>,
    pub ending: Ending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

/// Replay `script` with `settings`.
pub fn run(script: &DemoScript, settings: TourSettings, format: Format) -> Result<Transcript> {
    let doc = build_page(script);
    let ending = Rc::new(Cell::new(Ending::Abandoned));

    let mut config = script.tour.clone().into_config();
    let mut reveals: BTreeMap<usize, Vec<(String, Rect)>> = BTreeMap::new();
    for element in &script.page.elements {
        if let Some(step) = element.revealed_by {
            reveals
                .entry(step)
                .or_default()
                .push((element.selector.clone(), element.rect()));
        }
    }
    for (step, elements) in reveals {
        let page = doc.clone();
        config = config.with_enter_hook(step, move || {
            for (selector, rect) in &elements {
                page.insert(selector.clone(), *rect);
            }
        });
    }
    let (on_skip, on_complete) = (Rc::clone(&ending), Rc::clone(&ending));
    config = config
        .on_skip(move || on_skip.set(Ending::Skipped))
        .on_complete(move || on_complete.set(Ending::Completed));

    // Long enough for the mutation delay plus the settle window.
    let dwell = settings.mutation_delay() + settings.settle_window() + Duration::from_millis(10);
    let mut tour = TourController::with_settings(doc.clone(), DeterministicClock::new(), settings);
    tour.configure(config);

    let mut recorder = Recorder {
        format,
        lines: Vec::new(),
    };

    recorder.event(tour.start());
    recorder.settle(&mut tour, dwell)?;

    for action in script.resolved_actions() {
        if !tour.is_active() {
            break;
        }
        tracing::debug!(target: "guidepost_demo", ?action, "replaying action");
        match action {
            Action::Next => recorder.event(tour.next()),
            Action::Previous => recorder.event(tour.previous()),
            Action::Skip => recorder.event(tour.skip()),
            Action::Complete => recorder.event(tour.complete()),
            Action::Jump(index) => recorder.event(tour.jump_to(index)),
            Action::Escape => {
                let outcome = tour.handle_event(&Event::Key(KeyEvent::new(KeyCode::Escape)));
                recorder.outcome("escape", outcome);
            }
            Action::Wheel => {
                let wheel = Event::Mouse(MouseEvent::new(MouseEventKind::ScrollDown, 4.0, 4.0));
                let outcome = tour.handle_event(&wheel);
                recorder.outcome("wheel", outcome);
            }
            Action::Resize([width, height]) => {
                doc.set_viewport_size(width, height);
                recorder.event(tour.notify_resize());
            }
            Action::Wait(ms) => {
                recorder.events(tour.advance(Duration::from_millis(ms)));
                continue;
            }
        }
        recorder.settle(&mut tour, dwell)?;
    }

    tour.teardown();
    let ending = ending.get();
    recorder.push(
        format!("ended: {ending:?}"),
        serde_json::json!({ "ended": format!("{ending:?}") }),
    );
    Ok(Transcript {
        lines: recorder.lines,
        ending,
    })
}

fn build_page(script: &DemoScript) -> MemoryDocument {
    let [width, height] = script.page.viewport;
    let mut doc = MemoryDocument::new(width, height)
        .with_style(ScrollStyle::new(script.page.overflow.as_deref(), None));
    if let Some([doc_width, doc_height]) = script.page.document {
        doc = doc.with_document_size(doc_width, doc_height);
    }
    for element in script.page.elements.iter().filter(|e| e.revealed_by.is_none()) {
        doc.insert(element.selector.clone(), element.rect());
    }
    doc
}

struct Recorder {
    format: Format,
    lines: Vec<String>,
}

impl Recorder {
    fn push(&mut self, text: String, json: serde_json::Value) {
        let line = match self.format {
            Format::Text => text,
            Format::Json => json.to_string(),
        };
        self.lines.push(line);
    }

    fn event(&mut self, event: Option<TourEvent>) {
        if let Some(event) = event {
            self.push(describe(&event), event_json(&event));
        }
    }

    fn events(&mut self, events: Vec<TourEvent>) {
        for event in events {
            self.event(Some(event));
        }
    }

    fn outcome(&mut self, input: &str, outcome: EventOutcome) {
        self.push(
            format!("{input}: {outcome:?}"),
            serde_json::json!({ "input": input, "outcome": format!("{outcome:?}") }),
        );
    }

    /// Let the step settle, then record the overlay a renderer would draw.
    fn settle(&mut self, tour: &mut TourController<MemoryDocument>, dwell: Duration) -> Result<()> {
        let events = tour.advance(dwell);
        if let Some(TourEvent::Aborted { at, selector }) =
            events.iter().find(|e| matches!(e, TourEvent::Aborted { .. }))
        {
            return Err(DemoError::Aborted {
                at: *at,
                selector: selector.clone(),
            });
        }
        self.events(events);
        if let Some(overlay) = tour.overlay_state() {
            self.push(describe_overlay(&overlay), overlay_json(&overlay));
        }
        Ok(())
    }
}

fn describe(event: &TourEvent) -> String {
    match event {
        TourEvent::Started { steps } => format!("started: {steps} steps"),
        TourEvent::StepChanged { from, to, reason } => {
            format!("step {from} -> {to} ({reason:?})")
        }
        TourEvent::GeometryUpdated {
            index,
            highlight,
            message,
        } => format!(
            "geometry[{index}]: highlight {} message at ({}, {})",
            rect_label(highlight),
            message.x,
            message.y
        ),
        TourEvent::TargetMissing { index, selector } => {
            format!("step {index}: target {selector} not found")
        }
        TourEvent::Skipped { at } => format!("skipped at step {at}"),
        TourEvent::Completed { at } => format!("completed at step {at}"),
        TourEvent::Aborted { at, selector } => format!("aborted at step {at}: {selector}"),
    }
}

fn rect_label(rect: &Rect) -> String {
    format!("({}, {}) {}x{}", rect.x, rect.y, rect.width, rect.height)
}

fn rect_json(rect: &Rect) -> serde_json::Value {
    serde_json::json!({ "x": rect.x, "y": rect.y, "width": rect.width, "height": rect.height })
}

fn event_json(event: &TourEvent) -> serde_json::Value {
    match event {
        TourEvent::Started { steps } => serde_json::json!({ "event": "started", "steps": steps }),
        TourEvent::StepChanged { from, to, reason } => serde_json::json!({
            "event": "step_changed",
            "from": from,
            "to": to,
            "reason": format!("{reason:?}"),
        }),
        TourEvent::GeometryUpdated {
            index,
            highlight,
            message,
        } => serde_json::json!({
            "event": "geometry",
            "index": index,
            "highlight": rect_json(highlight),
            "message": { "x": message.x, "y": message.y },
        }),
        TourEvent::TargetMissing { index, selector } => serde_json::json!({
            "event": "target_missing",
            "index": index,
            "selector": selector,
        }),
        TourEvent::Skipped { at } => serde_json::json!({ "event": "skipped", "at": at }),
        TourEvent::Completed { at } => serde_json::json!({ "event": "completed", "at": at }),
        TourEvent::Aborted { at, selector } => serde_json::json!({
            "event": "aborted",
            "at": at,
            "selector": selector,
        }),
    }
}

fn describe_overlay(overlay: &TourOverlayState<'_>) -> String {
    let side = overlay
        .placement
        .map_or_else(|| "unplaced".to_string(), |p| format!("{:?}", p.side));
    let stale = if overlay.stale { " (stale)" } else { "" };
    format!(
        "[{}] {}: {} [{side}]{stale}",
        overlay.progress, overlay.title, overlay.message
    )
}

fn overlay_json(overlay: &TourOverlayState<'_>) -> serde_json::Value {
    serde_json::json!({
        "overlay": {
            "progress": overlay.progress,
            "title": overlay.title,
            "message": overlay.message,
            "highlight": overlay.highlight.as_ref().map(rect_json),
            "side": overlay.placement.map(|p| format!("{:?}", p.side)),
            "stale": overlay.stale,
        }
    })
}
