#![forbid(unsafe_code)]

//! Guidepost tour engine
//!
//! Walks a user through an ordered list of steps over a live document. Each
//! step highlights a target with a message beside it while page scrolling
//! stays blocked.
//!
//! # Key Components
//!
//! - [`TourController`] - the `Idle → Active(i) → Idle` state machine
//! - [`GeometryResolver`] - selector to padded highlight rectangle
//! - [`MessagePlacer`] - message anchor with clamping and side flipping
//! - [`ScrollOrchestrator`] - centering scrolls around the input lock
//! - [`InputLock`] - page scroll suspension and input filtering
//! - [`ViewportQuery`] - the document, injected by the host
//!
//! # Role in guidepost
//! `guidepost` owns sequencing and geometry; it renders nothing. Hosts feed
//! it input [`Event`](guidepost_core::Event)s and drive its clock, then draw
//! the dimmed backdrop, highlight and message from
//! [`TourController::overlay_state`].
//!
//! ```
//! use guidepost::{MemoryDocument, TourConfig, TourController, TourStep};
//! use guidepost::clock::DeterministicClock;
//! use guidepost_core::Rect;
//! use web_time::Duration;
//!
//! let doc = MemoryDocument::new(1280.0, 720.0);
//! doc.insert("#search", Rect::new(40.0, 80.0, 320.0, 36.0));
//!
//! let mut tour = TourController::new(doc.clone(), DeterministicClock::new());
//! tour.configure(TourConfig::new(vec![TourStep::new(
//!     "#search",
//!     "Search",
//!     "Find anything from here.",
//! )]));
//! tour.start();
//! tour.advance(Duration::from_millis(650));
//!
//! let overlay = tour.overlay_state().expect("tour is active");
//! assert_eq!(overlay.progress, "1 of 1");
//! assert!(overlay.highlight.is_some());
//! ```

pub mod clock;
pub mod error;
pub mod input_lock;
pub mod memory;
pub mod placer;
pub mod resolver;
pub mod scroll;
pub mod settings;
pub mod step;
pub mod tour;
pub mod viewport;

pub use clock::{Clock, DeterministicClock, MonotonicClock};
pub use error::{ConfigError, ConfigResult, ResolveError};
pub use input_lock::{InputLock, LockVerdict};
pub use memory::MemoryDocument;
pub use placer::{MessagePlacement, MessagePlacer, Side};
pub use resolver::{GeometryResolver, TargetSelector};
pub use scroll::ScrollOrchestrator;
pub use settings::{CompositeSettings, MessageSettings, MissingTargetPolicy, TourSettings};
pub use step::{StepSpec, TourConfig, TourSpec, TourStep};
pub use tour::{EventOutcome, TourAdvanceReason, TourController, TourEvent, TourOverlayState};
pub use viewport::{ScrollBehavior, ScrollStyle, ViewportQuery};
