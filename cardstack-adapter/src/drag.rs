use kurbo::{Point, Rect, Vec2};

use cardstack::{shift_for_delete, shift_for_insert};

use crate::{CardHost, HostCommand};

/// Observable phase of the move/drag state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DragStatus {
    Idle,
    /// A card is picked up; `index` is its current position.
    Dragging { index: usize },
    /// The card was dropped and the snapshot is flying to its final cell.
    Settling { index: usize },
}

/// The floating copy of the dragged cell shown by the host.
///
/// Exactly one exists per drag session. It is not `Clone`, and dropping the session without
/// calling [`Snapshot::release`] is a leak.
#[derive(Debug)]
#[must_use = "the host snapshot must be released"]
pub(crate) struct Snapshot {
    _private: (),
}

impl Snapshot {
    pub(crate) fn show<H: CardHost>(host: &mut H, index: usize, frame: Rect) -> Self {
        host.apply(HostCommand::ShowSnapshot { index, frame });
        Self { _private: () }
    }

    pub(crate) fn release<H: CardHost>(self, host: &mut H) {
        host.apply(HostCommand::RemoveSnapshot);
    }
}

#[derive(Debug)]
pub(crate) struct DragSession {
    pub(crate) id: u64,
    pub(crate) start_index: usize,
    pub(crate) start_location: Point,
    pub(crate) start_frame: Rect,
    pub(crate) current_location: Point,
    /// Last touch that resolved to a cell; used when the touch falls between cells.
    pub(crate) last_touched_location: Point,
    /// Position the dragged card was last moved to, once it has left its start slot.
    pub(crate) last_touched_index: Option<usize>,
    /// Current position of the dragged card.
    pub(crate) selected_index: usize,
    pub(crate) snapshot: Snapshot,
}

impl DragSession {
    pub(crate) fn new(
        id: u64,
        index: usize,
        location: Point,
        frame: Rect,
        snapshot: Snapshot,
    ) -> Self {
        Self {
            id,
            start_index: index,
            start_location: location,
            start_frame: frame,
            current_location: location,
            last_touched_location: location,
            last_touched_index: None,
            selected_index: index,
            snapshot,
        }
    }

    pub(crate) fn final_index(&self) -> usize {
        self.last_touched_index.unwrap_or(self.start_index)
    }

    /// Snapshot frame following the touch, lifted by `lift`.
    pub(crate) fn snapshot_frame(&self, location: Point, lift: f64) -> Rect {
        self.start_frame + Vec2::new(0.0, location.y - self.start_location.y - lift)
    }

    pub(crate) fn renumber_insert(&mut self, inserted: &[usize]) {
        self.start_index = shift_for_insert(self.start_index, inserted);
        self.selected_index = shift_for_insert(self.selected_index, inserted);
        self.last_touched_index = self.last_touched_index.map(|i| shift_for_insert(i, inserted));
    }

    /// Returns `false` when the dragged card itself was deleted.
    pub(crate) fn renumber_delete(&mut self, deleted: &[usize]) -> bool {
        let Some(selected) = shift_for_delete(self.selected_index, deleted) else {
            return false;
        };
        self.selected_index = selected;
        self.start_index = shift_for_delete(self.start_index, deleted).unwrap_or(selected);
        self.last_touched_index = self
            .last_touched_index
            .map(|i| shift_for_delete(i, deleted).unwrap_or(selected));
        true
    }
}

#[derive(Debug, Default)]
pub(crate) enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
    Settling(DragSession),
}

impl DragState {
    pub(crate) fn status(&self) -> DragStatus {
        match self {
            Self::Idle => DragStatus::Idle,
            Self::Dragging(s) => DragStatus::Dragging {
                index: s.selected_index,
            },
            Self::Settling(s) => DragStatus::Settling {
                index: s.final_index(),
            },
        }
    }

    /// Takes the session out of any non-idle state.
    pub(crate) fn take(&mut self) -> Option<DragSession> {
        match core::mem::take(self) {
            Self::Idle => None,
            Self::Dragging(s) | Self::Settling(s) => Some(s),
        }
    }
}
