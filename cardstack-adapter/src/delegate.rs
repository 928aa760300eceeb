/// What to do after the user taps a card.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectAction {
    /// Reveal the tapped card (or clear "collapse all").
    #[default]
    Reveal,
    Ignore,
}

/// Host application callbacks. Every method has a permissive default.
///
/// `will_*` callbacks run synchronously inside the engine call that started the transition;
/// `did_*` callbacks run from [`crate::Engine::tick`] once the host animation has had time to
/// finish.
pub trait CardStackDelegate {
    fn can_reveal(&mut self, _index: usize) -> bool {
        true
    }

    fn can_unreveal(&mut self, _index: usize) -> bool {
        true
    }

    fn will_reveal(&mut self, _index: usize) {}

    fn did_reveal(&mut self, _index: usize) {}

    fn will_unreveal(&mut self, _index: usize) {}

    fn did_unreveal(&mut self, _index: usize) {}

    fn did_flip(&mut self, _index: usize) {}

    fn did_flip_back(&mut self, _index: usize) {}

    /// The item at `from` was dragged onto `to`; the data source must move it now.
    fn did_move_item(&mut self, _from: usize, _to: usize) {}

    fn did_select_item(&mut self, _index: usize) -> SelectAction {
        SelectAction::Reveal
    }
}

impl CardStackDelegate for () {}
