//! A headless stacked-card layout engine.
//!
//! For gesture handling (tap-to-reveal, drag-to-reorder, pan-to-dismiss, autoscroll), see the
//! `cardstack-adapter` crate.
//!
//! This crate computes where every card of a scrollable collection goes: a list of card heads
//! that pins at the top while scrolling, a single revealed card filling the viewport with a
//! scaled fan of neighbours at the bottom, or a fully collapsed stack.
//!
//! It is UI-agnostic. A GUI layer is expected to provide:
//! - viewport size, content offset and content insets
//! - the item count
//! - notifications before items are inserted or deleted
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod layout;
mod options;
mod state;
mod types;

#[cfg(test)]
mod tests;

pub use layout::{CardStackLayout, shift_for_delete, shift_for_insert};
pub use options::{CardStackOptions, MAX_LOOKOUT_MARGIN, MAX_STACKED_CARDS, MIN_CARD_HEAD_HEIGHT};
pub use state::LayoutSnapshot;
pub use types::{DeleteOutcome, HostGeometry, LayoutAttribute};

pub use kurbo;
