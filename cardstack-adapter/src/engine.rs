use std::collections::VecDeque;

use kurbo::{Affine, Point, Vec2};

use cardstack::{CardStackLayout, CardStackOptions, DeleteOutcome, shift_for_delete, shift_for_insert};

use crate::autoscroll::{self, Autoscroll};
use crate::drag::{DragSession, DragState, Snapshot};
use crate::reveal::{
    AfterFlipBack, CardFace, PanTracker, Reveal, RevealedCard, pan_release_transform,
    pan_transform,
};
use crate::{
    AutoscrollDirection, CardHost, CardStackDelegate, DragStatus, Easing, GestureEvent,
    GestureKind, GesturePhase, HostCommand, RevealOutcome, RevealState, SelectAction, Transition,
    ViewHandle,
};

const BATCH_UPDATE: Transition = Transition::new(300, Easing::EaseInOut);
const FLIP: Transition = Transition::new(500, Easing::EaseInOut);
const PAN_SETTLE: Transition = Transition::new(300, Easing::EaseInOut);
const LIFT: Transition = Transition::new(200, Easing::EaseInOut);
const SLIDE: Transition = Transition::new(250, Easing::EaseOut);
const DROP: Transition = Transition::new(200, Easing::EaseInOut);

/// Work to resume once a host animation has finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Continuation {
    RevealSettled { id: u64, index: usize },
    UnrevealSettled { id: u64, index: usize },
    FlipSettled { id: u64, index: usize },
    FlipBackSettled { id: u64, index: usize },
    PanSettled { id: u64, commit: bool },
    DragSettled { id: u64 },
}

#[derive(Clone, Copy, Debug)]
struct Scheduled {
    due_ms: u64,
    seq: u64,
    continuation: Continuation,
}

/// A framework-neutral engine that wraps a [`CardStackLayout`] and runs the interactive state
/// machines on top of it: reveal/flip, pan-to-dismiss, drag-to-reorder and autoscroll.
///
/// This type does not hold any UI objects. Adapters drive it by:
/// - calling [`Self::prepare`] on every layout pass of the host scroll view
/// - forwarding gesture state changes through [`Self::handle`] (or [`Self::post`] +
///   [`Self::dispatch`])
/// - calling [`Self::tick`] each frame, which resumes finished animations and runs autoscroll
///
/// Side effects reach the host exclusively as [`HostCommand`]s. Animation completions are
/// scheduled continuations; they never run from inside a host call.
///
/// Conflicting transitions are tolerated rather than queued: a continuation whose transition
/// was superseded still delivers its `did_*` callback, but only touches engine state when the
/// state it was scheduled for is still current.
#[derive(Debug)]
pub struct Engine<H, D = ()> {
    layout: CardStackLayout,
    host: H,
    delegate: D,
    reveal: Reveal,
    drag: DragState,
    autoscroll: Autoscroll,
    queue: VecDeque<GestureEvent>,
    pending: Vec<Scheduled>,
    now_ms: u64,
    next_seq: u64,
    next_id: u64,
}

impl<H: CardHost, D: CardStackDelegate> Engine<H, D> {
    pub fn new(host: H, delegate: D, options: CardStackOptions) -> Self {
        Self::from_layout(CardStackLayout::new(options), host, delegate)
    }

    pub fn from_layout(layout: CardStackLayout, host: H, delegate: D) -> Self {
        Self {
            layout,
            host,
            delegate,
            reveal: Reveal::Closed,
            drag: DragState::Idle,
            autoscroll: Autoscroll::default(),
            queue: VecDeque::new(),
            pending: Vec::new(),
            now_ms: 0,
            next_seq: 0,
            next_id: 0,
        }
    }

    pub fn layout(&self) -> &CardStackLayout {
        &self.layout
    }

    pub fn options(&self) -> &CardStackOptions {
        self.layout.options()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    pub fn delegate_mut(&mut self) -> &mut D {
        &mut self.delegate
    }

    pub fn into_parts(self) -> (CardStackLayout, H, D) {
        (self.layout, self.host, self.delegate)
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn revealed_index(&self) -> Option<usize> {
        self.layout.revealed_index()
    }

    pub fn reveal_state(&self) -> RevealState {
        self.reveal.state()
    }

    pub fn drag_status(&self) -> DragStatus {
        self.drag.status()
    }

    pub fn autoscroll_direction(&self) -> Option<AutoscrollDirection> {
        self.autoscroll.direction()
    }

    /// `true` while continuations are pending or autoscroll is armed.
    pub fn is_animating(&self) -> bool {
        !self.pending.is_empty() || self.autoscroll.is_armed()
    }

    /// Runs a layout pass against the host's current item count and geometry.
    ///
    /// Applies a pending content offset correction to the host, and force-unreveals a revealed
    /// card that no longer exists.
    pub fn prepare(&mut self) {
        let count = self.host.item_count();
        let geometry = self.host.geometry();
        if let Some(y) = self.layout.prepare(count, geometry) {
            self.host.apply(HostCommand::SetContentOffset(y));
        }
        if self.layout.revealed_index().is_none() {
            if let Some(index) = self.reveal.open_index() {
                cwarn!(index, count, "revealed card vanished without a delete notification");
                self.force_unreveal(index);
            }
        }
    }

    /// Replaces the options and refreshes the host: a reload when the stack depth changed, an
    /// animated invalidation otherwise.
    pub fn update_options(&mut self, f: impl FnOnce(&mut CardStackOptions)) {
        let depth = self.layout.options().bottom_number_of_stacked_cards();
        self.layout.update_options(f);
        if self.layout.options().bottom_number_of_stacked_cards() != depth {
            self.host.apply(HostCommand::ReloadAll { animated: true });
        } else {
            self.host.apply(HostCommand::InvalidateLayout { animated: true });
        }
    }

    pub fn keyboard_will_show(&mut self) {
        self.layout.freeze_bottom_inset(true);
    }

    pub fn keyboard_did_hide(&mut self) {
        self.layout.freeze_bottom_inset(false);
    }

    /// See [`CardStackLayout::target_content_offset`].
    pub fn target_content_offset(&self, proposed: Point) -> Point {
        self.layout.target_content_offset(proposed)
    }

    /// Reveals the card at `target`, or unreveals the revealed card for `None`.
    ///
    /// - revealing the already revealed card toggles it closed;
    /// - revealing another card unreveals the current one first;
    /// - while "collapse all" is on, only clears it;
    /// - unreveals ask [`CardStackDelegate::can_unreveal`] and flip a flipped card back first.
    pub fn reveal_card_at(&mut self, target: Option<usize>) -> RevealOutcome {
        self.sync_item_count();
        if let Some(index) = target {
            if index >= self.layout.item_count() {
                cwarn!(index, item_count = self.layout.item_count(), "reveal_card_at: out of range");
                return RevealOutcome::Ignored;
            }
        }

        let current = self.reveal.open_index();
        if target.is_some() && current.is_none() && self.layout.collapse_all() {
            self.set_collapse_all(false);
            return RevealOutcome::CollapseCleared;
        }

        match (current, target) {
            (None, Some(index)) => self.open(index),
            (None, None) => RevealOutcome::Ignored,
            (Some(current), target) => self.close(false, target.filter(|&t| t != current)),
        }
    }

    /// Unreveals the revealed card without asking the delegate.
    ///
    /// A no-op without callbacks when nothing is revealed.
    pub fn unreveal_card(&mut self) -> RevealOutcome {
        if self.reveal.open_index().is_none() {
            return RevealOutcome::Ignored;
        }
        self.close(true, None)
    }

    /// Flips the revealed card to show `view`.
    ///
    /// Returns `false` (and leaves `view` with the caller) when no card is revealed or it is
    /// already flipped.
    pub fn flip_revealed_card(&mut self, view: ViewHandle) -> bool {
        let Reveal::Open(card) = &mut self.reveal else {
            return false;
        };
        if !card.is_front() {
            return false;
        }
        card.face = CardFace::Back(view);
        card.pan = None;
        let (id, index) = (card.id, card.index);

        self.host.apply(HostCommand::EndEditing);
        self.host.apply(HostCommand::FlipToBack {
            index,
            view,
            transition: FLIP,
        });
        self.schedule(FLIP, Continuation::FlipSettled { id, index });
        cdebug!(index, "flip_revealed_card");
        true
    }

    /// Flips the revealed card back to its front. The flip view is released when the flip ends.
    ///
    /// Returns `false` when there is nothing to flip back.
    pub fn flip_revealed_card_back(&mut self) -> bool {
        match self.open_card().map(|card| card.face) {
            None | Some(CardFace::Front) => false,
            Some(CardFace::Returning(_)) => true,
            Some(CardFace::Back(_)) => {
                self.start_flip_back();
                true
            }
        }
    }

    /// Collapses every card into the bottom stack, or restores the list.
    ///
    /// A revealed card is flipped back if needed and unrevealed without asking the delegate.
    pub fn set_collapse_all(&mut self, collapse: bool) {
        self.layout.set_collapse_all(collapse);
        if let Reveal::Open(card) = &mut self.reveal {
            if !card.is_front() {
                card.after_flip_back = AfterFlipBack::Collapse;
                self.start_flip_back();
                return;
            }
        }
        self.finish_collapse();
    }

    /// Renumbers the revealed and dragged cards, and a reveal waiting on a flip-back, before the
    /// host inserts items at the post-insert positions `indices`.
    pub fn will_insert(&mut self, indices: impl IntoIterator<Item = usize>) {
        let inserted = sorted_unique(indices);
        self.layout.will_insert(inserted.iter().copied());
        match &mut self.reveal {
            Reveal::Open(card) => {
                if let Some(index) = self.layout.revealed_index() {
                    card.index = index;
                }
                if let AfterFlipBack::Close { then: Some(next) } = &mut card.after_flip_back {
                    *next = shift_for_insert(*next, &inserted);
                }
            }
            Reveal::Closing { index, .. } => *index = shift_for_insert(*index, &inserted),
            Reveal::Closed => {}
        }
        if let DragState::Dragging(session) | DragState::Settling(session) = &mut self.drag {
            session.renumber_insert(&inserted);
        }
    }

    /// Renumbers the revealed and dragged cards before the host deletes the pre-delete
    /// positions `indices`.
    ///
    /// Deleting the revealed card force-unreveals it: only `will_unreveal` is delivered.
    /// Deleting the dragged card cancels the drag.
    pub fn will_delete(&mut self, indices: impl IntoIterator<Item = usize>) -> DeleteOutcome {
        let deleted = sorted_unique(indices);
        let outcome = self.layout.will_delete(deleted.iter().copied());
        match outcome {
            DeleteOutcome::Kept => {
                if let (Reveal::Open(card), Some(index)) =
                    (&mut self.reveal, self.layout.revealed_index())
                {
                    card.index = index;
                }
            }
            DeleteOutcome::Unrevealed(index) => self.force_unreveal(index),
        }
        // A pending reveal of a deleted card is dropped.
        if let Reveal::Open(RevealedCard {
            after_flip_back: AfterFlipBack::Close { then },
            ..
        }) = &mut self.reveal
        {
            *then = then.and_then(|next| shift_for_delete(next, &deleted));
        }
        if let Reveal::Closing { id, index } = self.reveal {
            self.reveal = match shift_for_delete(index, &deleted) {
                Some(index) => Reveal::Closing { id, index },
                None => Reveal::Closed,
            };
        }

        let survived = match &mut self.drag {
            DragState::Idle => true,
            DragState::Dragging(session) | DragState::Settling(session) => {
                session.renumber_delete(&deleted)
            }
        };
        if !survived {
            cdebug!("dragged card deleted; cancelling drag");
            self.cancel_drag();
        }
        outcome
    }

    /// Shared gesture hook: whether a gesture of `kind` may begin with `velocity`.
    ///
    /// Taps and long presses are refused while a card is revealed; the revealed-card pan only
    /// begins for mostly-vertical movement.
    pub fn should_begin(&self, kind: GestureKind, velocity: Vec2) -> bool {
        match kind {
            GestureKind::Tap | GestureKind::LongPress => self.layout.revealed_index().is_none(),
            GestureKind::RevealedPan => velocity.y.abs() > velocity.x.abs(),
        }
    }

    pub fn post(&mut self, event: GestureEvent) {
        self.queue.push_back(event);
    }

    /// Processes queued events in order until the queue is empty.
    pub fn dispatch(&mut self) {
        while let Some(event) = self.queue.pop_front() {
            ctrace!(kind = ?event.kind, phase = ?event.phase, y = event.location.y, "dispatch");
            match event.kind {
                GestureKind::Tap => self.on_tap(event),
                GestureKind::LongPress => self.on_long_press(event),
                GestureKind::RevealedPan => self.on_pan(event),
            }
        }
    }

    pub fn handle(&mut self, event: GestureEvent) {
        self.post(event);
        self.dispatch();
    }

    /// Advances the clock, runs every continuation due by `now_ms` in schedule order, then runs
    /// one autoscroll frame.
    ///
    /// Returns [`Self::is_animating`].
    pub fn tick(&mut self, now_ms: u64) -> bool {
        self.now_ms = self.now_ms.max(now_ms);
        while let Some(scheduled) = self.take_next_due(self.now_ms) {
            self.run(scheduled.continuation);
        }
        self.autoscroll_frame();
        self.is_animating()
    }

    /// Runs every pending continuation, advancing the clock to the last due time.
    ///
    /// Autoscroll is not advanced. Returns the new clock.
    pub fn settle(&mut self) -> u64 {
        while let Some(scheduled) = self.take_next_due(u64::MAX) {
            self.now_ms = self.now_ms.max(scheduled.due_ms);
            self.run(scheduled.continuation);
        }
        self.now_ms
    }

    fn schedule(&mut self, transition: Transition, continuation: Continuation) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Scheduled {
            due_ms: self.now_ms.saturating_add(transition.duration_ms),
            seq,
            continuation,
        });
    }

    fn take_next_due(&mut self, limit_ms: u64) -> Option<Scheduled> {
        let pos = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due_ms <= limit_ms)
            .min_by_key(|(_, s)| (s.due_ms, s.seq))
            .map(|(i, _)| i)?;
        Some(self.pending.remove(pos))
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn run(&mut self, continuation: Continuation) {
        ctrace!(?continuation, now_ms = self.now_ms, "continuation");
        match continuation {
            Continuation::RevealSettled { id, index } => {
                let current = match &mut self.reveal {
                    Reveal::Open(card) if card.id == id => {
                        card.settled = true;
                        Some(card.index)
                    }
                    _ => None,
                };
                self.delegate.did_reveal(current.unwrap_or(index));
            }
            Continuation::UnrevealSettled { id, index } => {
                let mut index = index;
                if let Reveal::Closing { id: closing, index: current } = self.reveal {
                    if closing == id {
                        index = current;
                        self.reveal = Reveal::Closed;
                    }
                }
                self.delegate.did_unreveal(index);
            }
            Continuation::FlipSettled { id, index } => {
                let index = self.current_index(id).unwrap_or(index);
                self.delegate.did_flip(index);
            }
            Continuation::FlipBackSettled { id, index } => {
                let mut index = index;
                let mut after = AfterFlipBack::Nothing;
                if let Reveal::Open(card) = &mut self.reveal {
                    if card.id == id {
                        if let CardFace::Returning(view) = card.face {
                            card.face = CardFace::Front;
                            self.host.apply(HostCommand::ReleaseFlipView(view));
                        }
                        index = card.index;
                        after = core::mem::replace(&mut card.after_flip_back, AfterFlipBack::Nothing);
                    }
                }
                self.delegate.did_flip_back(index);
                match after {
                    AfterFlipBack::Nothing => {}
                    AfterFlipBack::Close { then } => {
                        self.finish_close(then);
                    }
                    AfterFlipBack::Collapse => self.finish_collapse(),
                }
            }
            Continuation::PanSettled { id, commit } => {
                let Some(index) = self.current_index(id) else {
                    return;
                };
                if commit && self.close(false, None) == RevealOutcome::Vetoed {
                    self.host.apply(HostCommand::SetCellTransform {
                        index,
                        transform: Affine::IDENTITY,
                        transition: PAN_SETTLE,
                    });
                }
            }
            Continuation::DragSettled { id } => {
                let current = matches!(&self.drag, DragState::Settling(s) if s.id == id);
                if !current {
                    return;
                }
                if let Some(session) = self.drag.take() {
                    let in_place = session.final_index() == session.start_index;
                    self.teardown_drag(session);
                    if in_place {
                        self.host.apply(HostCommand::InvalidateLayout { animated: false });
                    }
                }
            }
        }
    }

    fn current_index(&self, id: u64) -> Option<usize> {
        self.open_card().filter(|card| card.id == id).map(|card| card.index)
    }

    fn open_card(&self) -> Option<&RevealedCard> {
        match &self.reveal {
            Reveal::Open(card) => Some(card),
            _ => None,
        }
    }

    fn take_open_card(&mut self) -> Option<RevealedCard> {
        match core::mem::replace(&mut self.reveal, Reveal::Closed) {
            Reveal::Open(card) => Some(card),
            other => {
                self.reveal = other;
                None
            }
        }
    }

    /// Releases everything a revealed card holds on the host.
    fn release_card(&mut self, card: &RevealedCard) {
        if card.pan_attached {
            self.host.apply(HostCommand::DetachPanRecognizer(card.index));
        }
        if let CardFace::Back(view) | CardFace::Returning(view) = card.face {
            self.host.apply(HostCommand::ReleaseFlipView(view));
        }
    }

    fn sync_item_count(&mut self) {
        if self.layout.item_count() != self.host.item_count() {
            self.prepare();
        }
    }

    fn open(&mut self, index: usize) -> RevealOutcome {
        if !self.delegate.can_reveal(index) {
            cdebug!(index, "reveal vetoed");
            return RevealOutcome::Vetoed;
        }
        if !self.layout.set_revealed_index(Some(index)) {
            return RevealOutcome::Ignored;
        }
        self.delegate.will_reveal(index);

        let pan_attached = self.host.cell_frame(index).is_some();
        if pan_attached {
            self.host.apply(HostCommand::AttachPanRecognizer(index));
        }
        self.host.apply(HostCommand::SetScrollEnabled(false));
        self.host.apply(HostCommand::ReloadAll { animated: true });

        let id = self.next_id();
        self.reveal = Reveal::Open(RevealedCard::new(id, index, pan_attached));
        self.schedule(BATCH_UPDATE, Continuation::RevealSettled { id, index });
        cdebug!(index, "reveal");
        RevealOutcome::Revealing(index)
    }

    /// Starts unrevealing the open card, then reveals `then` if given.
    fn close(&mut self, forced: bool, then: Option<usize>) -> RevealOutcome {
        let Reveal::Open(card) = &mut self.reveal else {
            return RevealOutcome::Ignored;
        };
        let index = card.index;
        if !forced && !self.delegate.can_unreveal(index) {
            cdebug!(index, "unreveal vetoed");
            return RevealOutcome::Vetoed;
        }
        if !card.is_front() {
            card.after_flip_back = AfterFlipBack::Close { then };
            self.start_flip_back();
            return RevealOutcome::AwaitingFlipBack(index);
        }
        self.finish_close(then)
    }

    fn finish_close(&mut self, then: Option<usize>) -> RevealOutcome {
        let Some(card) = self.take_open_card() else {
            return RevealOutcome::Ignored;
        };
        let (id, index) = (card.id, card.index);
        self.release_card(&card);
        self.host.apply(HostCommand::SetScrollEnabled(true));
        self.delegate.will_unreveal(index);
        self.layout.set_revealed_index(None);
        self.reveal = Reveal::Closing { id, index };
        self.host.apply(HostCommand::ReloadAll { animated: true });
        self.schedule(BATCH_UPDATE, Continuation::UnrevealSettled { id, index });
        cdebug!(index, "unreveal");

        match then.map(|next| self.open(next)) {
            Some(outcome @ RevealOutcome::Revealing(_)) => outcome,
            _ => RevealOutcome::Unrevealing(index),
        }
    }

    /// Drops the open card immediately, e.g. because its item was deleted.
    fn force_unreveal(&mut self, index: usize) {
        if let Some(card) = self.take_open_card() {
            self.release_card(&card);
        }
        self.layout.set_revealed_index(None);
        self.host.apply(HostCommand::SetScrollEnabled(true));
        self.delegate.will_unreveal(index);
    }

    fn start_flip_back(&mut self) {
        let Reveal::Open(card) = &mut self.reveal else {
            return;
        };
        let CardFace::Back(view) = card.face else {
            return;
        };
        card.face = CardFace::Returning(view);
        let (id, index) = (card.id, card.index);
        self.host.apply(HostCommand::EndEditing);
        self.host.apply(HostCommand::FlipToFront {
            index,
            transition: FLIP,
        });
        self.schedule(FLIP, Continuation::FlipBackSettled { id, index });
        cdebug!(index, "flip_revealed_card_back");
    }

    fn finish_collapse(&mut self) {
        let collapse = self.layout.collapse_all();
        self.host.apply(HostCommand::SetScrollEnabled(!collapse));
        if let Some(card) = self.take_open_card() {
            let (id, index) = (card.id, card.index);
            self.release_card(&card);
            self.delegate.will_unreveal(index);
            self.layout.set_revealed_index(None);
            self.reveal = Reveal::Closing { id, index };
            self.schedule(BATCH_UPDATE, Continuation::UnrevealSettled { id, index });
        }
        self.host.apply(HostCommand::ReloadAll { animated: true });
        cdebug!(collapse, "collapse_all");
    }

    fn on_tap(&mut self, event: GestureEvent) {
        if event.phase != GesturePhase::Ended || self.layout.revealed_index().is_some() {
            return;
        }
        let Some(index) = self.host.index_at(event.location) else {
            return;
        };
        if self.delegate.did_select_item(index) == SelectAction::Reveal {
            self.reveal_card_at(Some(index));
        }
    }

    fn on_pan(&mut self, event: GestureEvent) {
        let count = self.layout.item_count();
        let target_scale = self
            .layout
            .card_scale(self.layout.bottom_below_revealed(), true);
        let viewport_height = self.host.geometry().viewport.height;
        let dismiss_distance = self.layout.cell_size().height * self.options().pan_dismiss_fraction();

        let Reveal::Open(card) = &mut self.reveal else {
            return;
        };
        if count == 1 || !card.is_front() || !card.pan_attached {
            return;
        }
        let (id, index) = (card.id, card.index);
        let y = event.location.y;

        match event.phase {
            GesturePhase::Began => {
                card.pan = Some(PanTracker::new(y));
                self.host.apply(HostCommand::EndEditing);
            }
            GesturePhase::Changed => {
                let Some(pan) = card.pan else {
                    return;
                };
                let transform = pan_transform(pan.shift(y), target_scale, viewport_height);
                self.host.apply(HostCommand::SetCellTransform {
                    index,
                    transform,
                    transition: Transition::IMMEDIATE,
                });
            }
            GesturePhase::Ended | GesturePhase::Cancelled => {
                let Some(pan) = card.pan.take() else {
                    return;
                };
                let commit = pan.shift(y) > dismiss_distance;
                let transform = pan_release_transform(commit, target_scale, viewport_height);
                self.host.apply(HostCommand::SetCellTransform {
                    index,
                    transform,
                    transition: PAN_SETTLE,
                });
                self.schedule(PAN_SETTLE, Continuation::PanSettled { id, commit });
                cdebug!(index, commit, "pan released");
            }
        }
    }

    fn on_long_press(&mut self, event: GestureEvent) {
        match event.phase {
            GesturePhase::Began => self.begin_drag(event.location),
            GesturePhase::Changed => self.drag_changed(event.location),
            GesturePhase::Ended => self.end_drag(),
            GesturePhase::Cancelled => self.cancel_drag(),
        }
    }

    fn begin_drag(&mut self, location: Point) {
        if let Some(session) = self.drag.take() {
            self.teardown_drag(session);
        }
        if self.layout.revealed_index().is_some() {
            return;
        }
        let Some(index) = self.host.index_at(location) else {
            return;
        };
        if index < self.options().first_movable_index() {
            cdebug!(index, "drag rejected: not movable");
            return;
        }
        let Some(frame) = self.host.cell_frame(index) else {
            return;
        };

        let snapshot = Snapshot::show(&mut self.host, index, frame);
        self.host.apply(HostCommand::SetCellAlpha { index, alpha: 0.0 });
        self.layout.set_moving_index(Some(index));
        let lift = self.options().move_lift_offset();
        self.host.apply(HostCommand::MoveSnapshot {
            frame: frame - Vec2::new(0.0, lift),
            transition: LIFT,
        });

        let id = self.next_id();
        self.drag = DragState::Dragging(DragSession::new(id, index, location, frame, snapshot));
        cdebug!(index, "drag began");
    }

    fn drag_changed(&mut self, location: Point) {
        let first_movable = self.layout.options().first_movable_index();
        let lift = self.layout.options().move_lift_offset();
        let head = self.layout.effective_head_height();
        let geometry = self.host.geometry();
        let bottom_inset = self.layout.bottom_inset();

        let DragState::Dragging(session) = &mut self.drag else {
            return;
        };
        session.current_location = location;
        self.host.apply(HostCommand::MoveSnapshot {
            frame: session.snapshot_frame(location, lift),
            transition: Transition::IMMEDIATE,
        });

        match autoscroll::band_for(location.y, geometry, self.layout.options(), bottom_inset) {
            Some(direction) => self.autoscroll.arm(direction),
            None => self.autoscroll.disarm(),
        }

        let fallback = session.last_touched_location;
        let Some(target) = self
            .host
            .index_at(location)
            .or_else(|| self.host.index_at(fallback))
        else {
            return;
        };
        session.last_touched_location = location;
        if target < first_movable {
            return;
        }
        if session.last_touched_index.is_none() && target != session.start_index {
            session.last_touched_index = Some(session.start_index);
        }
        let Some(last) = session.last_touched_index else {
            return;
        };
        if last == target {
            return;
        }

        if self.host.cell_frame(target).is_some() {
            self.host.apply(HostCommand::SlideCell {
                index: target,
                dy: (last as f64 - target as f64) * head,
                transition: SLIDE,
            });
        }
        session.selected_index = target;
        session.last_touched_index = Some(target);
        self.delegate.did_move_item(target, last);
        self.host.apply(HostCommand::MoveItem {
            from: target,
            to: last,
        });
        self.layout.set_moving_index(Some(target));
        let at = self.host.cell_frame(target).map(|_| target);
        self.host.apply(HostCommand::RestackSnapshot { at });
        cdebug!(from = last, to = target, "drag reorder");
    }

    fn end_drag(&mut self) {
        self.autoscroll.disarm();
        let session = match core::mem::take(&mut self.drag) {
            DragState::Dragging(session) => session,
            other => {
                self.drag = other;
                return;
            }
        };
        match self.host.cell_frame(session.final_index()) {
            Some(frame) => {
                self.host.apply(HostCommand::MoveSnapshot {
                    frame,
                    transition: DROP,
                });
                let id = session.id;
                self.drag = DragState::Settling(session);
                self.schedule(DROP, Continuation::DragSettled { id });
            }
            None => {
                self.teardown_drag(session);
                self.host.apply(HostCommand::InvalidateLayout { animated: false });
            }
        }
    }

    fn cancel_drag(&mut self) {
        self.autoscroll.disarm();
        if let Some(session) = self.drag.take() {
            self.teardown_drag(session);
            self.host.apply(HostCommand::InvalidateLayout { animated: false });
        }
    }

    fn teardown_drag(&mut self, session: DragSession) {
        self.layout.set_moving_index(None);
        self.host.apply(HostCommand::ReloadAll { animated: false });
        cdebug!(index = session.final_index(), "drag ended");
        session.snapshot.release(&mut self.host);
    }

    fn autoscroll_frame(&mut self) {
        let Some((direction, elapsed_s)) = self.autoscroll.next_frame(self.now_ms) else {
            return;
        };
        let DragState::Dragging(session) = &self.drag else {
            self.autoscroll.disarm();
            return;
        };
        let touch = session.current_location;

        let geometry = self.host.geometry();
        let bottom_inset = self.layout.bottom_inset();
        let speed = autoscroll::speed(
            direction,
            Some(touch),
            geometry,
            self.layout.options(),
            bottom_inset,
        );
        let delta = autoscroll::scroll_delta(
            direction,
            speed,
            elapsed_s,
            geometry,
            self.layout.content_size().height,
            bottom_inset,
        );
        self.host
            .apply(HostCommand::SetContentOffset(geometry.content_offset.y + delta));
        ctrace!(?direction, speed, delta, "autoscroll frame");

        self.post(GestureEvent::long_press(
            GesturePhase::Changed,
            touch + Vec2::new(0.0, delta),
        ));
        self.dispatch();
    }
}

fn sorted_unique(indices: impl IntoIterator<Item = usize>) -> Vec<usize> {
    let mut v: Vec<usize> = indices.into_iter().collect();
    v.sort_unstable();
    v.dedup();
    v
}
