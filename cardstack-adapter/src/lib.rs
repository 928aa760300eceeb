//! Interactive state machines for the `cardstack` layout.
//!
//! The `cardstack` crate only computes where cards go. This crate adds a framework-neutral
//! [`Engine`] that owns the layout and drives it from gestures:
//!
//! - tap-to-reveal, flip to a back view, pan-to-dismiss and "collapse all"
//! - long-press drag-to-reorder with a floating snapshot
//! - autoscroll while a drag nears the top or bottom edge
//!
//! The host scroll view is reached through [`CardHost`] and receives every side effect as a
//! [`HostCommand`]. The host application is reached through [`CardStackDelegate`].
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod autoscroll;
mod delegate;
mod drag;
mod engine;
mod event;
mod host;
mod reveal;
mod transition;


pub use autoscroll::AutoscrollDirection;
pub use delegate::{CardStackDelegate, SelectAction};
pub use drag::DragStatus;
pub use engine::Engine;
pub use event::{GestureEvent, GestureKind, GesturePhase};
pub use host::{CardHost, HostCommand, ViewHandle};
pub use reveal::{RevealOutcome, RevealState};
pub use transition::{Easing, Transition};

pub use cardstack;
