use kurbo::{Affine, Point, Rect};

use cardstack::HostGeometry;

use crate::Transition;

/// An opaque view owned by the host application, e.g. the back face of a flipped card.
///
/// While a card is flipped the engine keeps the handle and releases it exactly once through
/// [`HostCommand::ReleaseFlipView`], on flip-back or on a forced unreveal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewHandle(pub u64);

/// A side effect the engine asks the host scroll view to perform.
///
/// Transforms are expressed about the cell's center. A reload re-applies layout attributes and
/// resets any transform set through [`HostCommand::SetCellTransform`].
///
/// Animated variants carry a [`Transition`]; interpolate with [`Transition::sample`] when the
/// host has no animation system to hand the curve to.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HostCommand {
    /// Reload every item and re-query the layout, optionally as an animated batch update.
    ReloadAll { animated: bool },
    /// Re-query the layout without reloading cells.
    InvalidateLayout { animated: bool },
    /// Move a materialized cell without animation. The data source has already been told
    /// through [`crate::CardStackDelegate::did_move_item`].
    MoveItem { from: usize, to: usize },
    SetContentOffset(f64),
    SetScrollEnabled(bool),
    /// Dismiss any active text input.
    EndEditing,
    AttachPanRecognizer(usize),
    DetachPanRecognizer(usize),
    SetCellTransform {
        index: usize,
        transform: Affine,
        transition: Transition,
    },
    SetCellAlpha { index: usize, alpha: f64 },
    /// Shift a cell vertically by `dy`.
    SlideCell {
        index: usize,
        dy: f64,
        transition: Transition,
    },
    /// Capture a snapshot of the cell at `index` and place it above that cell at `frame`.
    ShowSnapshot { index: usize, frame: Rect },
    MoveSnapshot { frame: Rect, transition: Transition },
    /// Re-stack the snapshot at the z position of cell `at`, or send it to the back.
    RestackSnapshot { at: Option<usize> },
    RemoveSnapshot,
    /// Flip the cell to show `view`, hiding its content.
    FlipToBack {
        index: usize,
        view: ViewHandle,
        transition: Transition,
    },
    /// Flip the cell back to its content.
    FlipToFront { index: usize, transition: Transition },
    /// Detach and drop a flip view previously passed in [`Self::FlipToBack`].
    ReleaseFlipView(ViewHandle),
}

/// The hosting scroll view.
///
/// The engine reads geometry and cells through this trait and writes back exclusively through
/// [`CardHost::apply`].
pub trait CardHost {
    fn item_count(&self) -> usize;

    fn geometry(&self) -> HostGeometry;

    /// Index of the top-most materialized cell under `point` (content coordinates).
    fn index_at(&self, point: Point) -> Option<usize>;

    /// Frame of the cell at `index`, or `None` when it is not materialized.
    fn cell_frame(&self, index: usize) -> Option<Rect>;

    fn apply(&mut self, command: HostCommand);
}
