use kurbo::Point;

/// The three gesture streams the engine consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GestureKind {
    /// A tap on the scroll view. Only `Ended` is acted upon.
    Tap,
    /// The long press that picks a card up for reordering.
    LongPress,
    /// The vertical pan attached to the revealed card.
    RevealedPan,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GesturePhase {
    Began,
    Changed,
    Ended,
    Cancelled,
}

/// One discrete state change of a gesture stream.
///
/// `location` is in content coordinates (it already includes the scroll offset).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GestureEvent {
    pub kind: GestureKind,
    pub phase: GesturePhase,
    pub location: Point,
}

impl GestureEvent {
    pub fn new(kind: GestureKind, phase: GesturePhase, location: impl Into<Point>) -> Self {
        Self {
            kind,
            phase,
            location: location.into(),
        }
    }

    pub fn tap(location: impl Into<Point>) -> Self {
        Self::new(GestureKind::Tap, GesturePhase::Ended, location)
    }

    pub fn long_press(phase: GesturePhase, location: impl Into<Point>) -> Self {
        Self::new(GestureKind::LongPress, phase, location)
    }

    pub fn pan(phase: GesturePhase, location: impl Into<Point>) -> Self {
        Self::new(GestureKind::RevealedPan, phase, location)
    }
}
