use kurbo::{Affine, Vec2};

use crate::ViewHandle;

/// Observable phase of the reveal/flip state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RevealState {
    Closed,
    /// Revealed; the reveal animation has not finished yet.
    Revealing { index: usize },
    Revealed { index: usize },
    /// Revealed and showing (or returning from) its back face.
    Flipped { index: usize },
    /// Unrevealed; the unreveal animation has not finished yet.
    Unrevealing { index: usize },
}

impl RevealState {
    pub fn index(&self) -> Option<usize> {
        match *self {
            Self::Closed => None,
            Self::Revealing { index }
            | Self::Revealed { index }
            | Self::Flipped { index }
            | Self::Unrevealing { index } => Some(index),
        }
    }
}

/// Result of a reveal or unreveal request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RevealOutcome {
    Revealing(usize),
    Unrevealing(usize),
    /// The card is flipped. It flips back first and the unreveal follows.
    AwaitingFlipBack(usize),
    /// "Collapse all" was on; it was cleared instead of revealing a card.
    CollapseCleared,
    Vetoed,
    Ignored,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CardFace {
    Front,
    Back(ViewHandle),
    /// Flipping back to the front; the view is released when the flip ends.
    Returning(ViewHandle),
}

/// Work deferred until a flipped card has turned back to its front.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum AfterFlipBack {
    Nothing,
    Close { then: Option<usize> },
    Collapse,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PanTracker {
    start_y: f64,
}

impl PanTracker {
    pub(crate) fn new(start_y: f64) -> Self {
        Self { start_y }
    }

    /// Downward distance from the start; upward drags count as zero.
    pub(crate) fn shift(&self, y: f64) -> f64 {
        (y - self.start_y).max(0.0)
    }
}

#[derive(Debug)]
pub(crate) struct RevealedCard {
    pub(crate) id: u64,
    pub(crate) index: usize,
    pub(crate) settled: bool,
    pub(crate) face: CardFace,
    pub(crate) after_flip_back: AfterFlipBack,
    pub(crate) pan: Option<PanTracker>,
    pub(crate) pan_attached: bool,
}

impl RevealedCard {
    pub(crate) fn new(id: u64, index: usize, pan_attached: bool) -> Self {
        Self {
            id,
            index,
            settled: false,
            face: CardFace::Front,
            after_flip_back: AfterFlipBack::Nothing,
            pan: None,
            pan_attached,
        }
    }

    pub(crate) fn is_front(&self) -> bool {
        self.face == CardFace::Front
    }
}

#[derive(Debug)]
pub(crate) enum Reveal {
    Closed,
    Open(RevealedCard),
    Closing { id: u64, index: usize },
}

impl Reveal {
    pub(crate) fn state(&self) -> RevealState {
        match self {
            Self::Closed => RevealState::Closed,
            Self::Open(card) if !card.is_front() => RevealState::Flipped { index: card.index },
            Self::Open(card) if card.settled => RevealState::Revealed { index: card.index },
            Self::Open(card) => RevealState::Revealing { index: card.index },
            Self::Closing { index, .. } => RevealState::Unrevealing { index: *index },
        }
    }

    pub(crate) fn open_index(&self) -> Option<usize> {
        match self {
            Self::Open(card) => Some(card.index),
            _ => None,
        }
    }
}

/// Live transform of the revealed card dragged down by `shift`.
///
/// The card shrinks toward `target_scale` (the scale of the card behind it) and reaches it after
/// half the viewport height.
pub(crate) fn pan_transform(shift: f64, target_scale: f64, viewport_height: f64) -> Affine {
    let diff = 1.0 - target_scale;
    let half = viewport_height / 2.0;
    let scale = if half > 0.0 {
        1.0 - (shift * diff / half).min(diff)
    } else {
        target_scale
    };
    Affine::scale(scale) * Affine::translate(Vec2::new(0.0, shift))
}

/// Resting transform after releasing the pan: off-screen at `target_scale` when committing,
/// identity otherwise.
pub(crate) fn pan_release_transform(commit: bool, target_scale: f64, viewport_height: f64) -> Affine {
    if !commit {
        return Affine::IDENTITY;
    }
    let y = viewport_height * (1.0 + (1.0 - target_scale));
    Affine::scale(target_scale) * Affine::translate(Vec2::new(0.0, y))
}
