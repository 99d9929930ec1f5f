#![forbid(unsafe_code)]

//! Core: geometry primitives and canonical input events.
//!
//! # Role in guidepost
//! `guidepost-core` is the vocabulary layer. The tour engine (`guidepost`)
//! speaks in [`geometry::Rect`]s and [`event::Event`]s; hosts translate their
//! native document geometry and input into these types at the boundary.

pub mod event;
pub mod geometry;

pub use event::{
    Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, MouseButton, MouseEvent, MouseEventKind,
    TouchEvent, TouchPhase,
};
pub use geometry::{Point, Rect, Size};
