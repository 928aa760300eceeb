/// Configuration for [`crate::CardStackLayout`].
///
/// Every setter clamps its input to the supported range instead of rejecting it, so a layout
/// configured from arbitrary UI input always stays renderable. NaN inputs are ignored.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CardStackOptions {
    first_movable_index: usize,
    card_head_height: f64,
    card_should_expand_head_height: bool,
    card_should_stretch_at_scroll_top: bool,
    card_maximum_height: f64,
    bottom_number_of_stacked_cards: usize,
    bottom_stacked_cards_should_scale: bool,
    bottom_stacked_cards_minimum_scale: f64,
    bottom_stacked_cards_maximum_scale: f64,
    bottom_card_lookout_margin: f64,
    space_at_top_for_background_view: f64,
    space_at_top_should_snap: bool,
    space_at_bottom: f64,
    scroll_area_top: f64,
    scroll_area_bottom: f64,
    scroll_should_snap_card_head: bool,
    scroll_stop_cards_at_top: bool,
    autoscroll_max_speed: f64,
    move_lift_offset: f64,
    long_press_duration_ms: u64,
    pan_dismiss_fraction: f64,
}

pub const MIN_CARD_HEAD_HEIGHT: f64 = 20.0;
pub const MAX_STACKED_CARDS: usize = 10;
pub const MAX_LOOKOUT_MARGIN: f64 = 20.0;

impl Default for CardStackOptions {
    fn default() -> Self {
        Self {
            first_movable_index: 0,
            card_head_height: 80.0,
            card_should_expand_head_height: true,
            card_should_stretch_at_scroll_top: true,
            card_maximum_height: 0.0,
            bottom_number_of_stacked_cards: 5,
            bottom_stacked_cards_should_scale: true,
            bottom_stacked_cards_minimum_scale: 0.94,
            bottom_stacked_cards_maximum_scale: 1.0,
            bottom_card_lookout_margin: 10.0,
            space_at_top_for_background_view: 0.0,
            space_at_top_should_snap: true,
            space_at_bottom: 0.0,
            scroll_area_top: 120.0,
            scroll_area_bottom: 120.0,
            scroll_should_snap_card_head: false,
            scroll_stop_cards_at_top: true,
            autoscroll_max_speed: 600.0,
            move_lift_offset: 20.0,
            long_press_duration_ms: 490,
            pan_dismiss_fraction: 1.0 / 7.0,
        }
    }
}

fn at_least(cur: f64, value: f64, min: f64) -> f64 {
    if value.is_nan() { cur } else { value.max(min) }
}

fn between(cur: f64, value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        cur
    } else {
        value.clamp(min, max)
    }
}

impl CardStackOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only cards at or after this index can be picked up and reordered.
    pub fn first_movable_index(&self) -> usize {
        self.first_movable_index
    }

    /// Visible height of a card's head while all cards are listed.
    pub fn card_head_height(&self) -> f64 {
        self.card_head_height
    }

    /// Stretch head heights to fill the viewport when there are too few cards.
    pub fn card_should_expand_head_height(&self) -> bool {
        self.card_should_expand_head_height
    }

    /// Spread cards apart while the list is pulled down past its top.
    pub fn card_should_stretch_at_scroll_top(&self) -> bool {
        self.card_should_stretch_at_scroll_top
    }

    /// Maximum card height; `0` means "as tall as the viewport allows".
    pub fn card_maximum_height(&self) -> f64 {
        self.card_maximum_height
    }

    /// Depth of the fanned bottom stack.
    pub fn bottom_number_of_stacked_cards(&self) -> usize {
        self.bottom_number_of_stacked_cards
    }

    pub fn bottom_stacked_cards_should_scale(&self) -> bool {
        self.bottom_stacked_cards_should_scale
    }

    pub fn bottom_stacked_cards_minimum_scale(&self) -> f64 {
        self.bottom_stacked_cards_minimum_scale
    }

    pub fn bottom_stacked_cards_maximum_scale(&self) -> f64 {
        self.bottom_stacked_cards_maximum_scale
    }

    /// Vertical distance between two cards of the bottom stack.
    pub fn bottom_card_lookout_margin(&self) -> f64 {
        self.bottom_card_lookout_margin
    }

    /// Extra space above the first card that uncovers the host's background.
    pub fn space_at_top_for_background_view(&self) -> f64 {
        self.space_at_top_for_background_view
    }

    pub fn space_at_top_should_snap(&self) -> bool {
        self.space_at_top_should_snap
    }

    /// Extra content height below the last card.
    pub fn space_at_bottom(&self) -> f64 {
        self.space_at_bottom
    }

    /// Thickness of the autoscroll trigger band at the top of the viewport.
    pub fn scroll_area_top(&self) -> f64 {
        self.scroll_area_top
    }

    /// Thickness of the autoscroll trigger band at the bottom of the viewport.
    pub fn scroll_area_bottom(&self) -> f64 {
        self.scroll_area_bottom
    }

    pub fn scroll_should_snap_card_head(&self) -> bool {
        self.scroll_should_snap_card_head
    }

    /// Pin cards at the top edge instead of scrolling them out of view.
    pub fn scroll_stop_cards_at_top(&self) -> bool {
        self.scroll_stop_cards_at_top
    }

    /// Autoscroll speed (points per second) at the innermost edge of a trigger band.
    pub fn autoscroll_max_speed(&self) -> f64 {
        self.autoscroll_max_speed
    }

    /// How far a picked-up card is lifted above the touch point.
    pub fn move_lift_offset(&self) -> f64 {
        self.move_lift_offset
    }

    /// Hold duration a host long-press recognizer should use to start a drag.
    pub fn long_press_duration_ms(&self) -> u64 {
        self.long_press_duration_ms
    }

    /// Fraction of the cell height a revealed card must be dragged down to dismiss it.
    pub fn pan_dismiss_fraction(&self) -> f64 {
        self.pan_dismiss_fraction
    }

    pub fn set_first_movable_index(&mut self, index: usize) {
        self.first_movable_index = index;
    }

    pub fn set_card_head_height(&mut self, height: f64) {
        self.card_head_height = at_least(self.card_head_height, height, MIN_CARD_HEAD_HEIGHT);
    }

    pub fn set_card_should_expand_head_height(&mut self, expand: bool) {
        self.card_should_expand_head_height = expand;
    }

    pub fn set_card_should_stretch_at_scroll_top(&mut self, stretch: bool) {
        self.card_should_stretch_at_scroll_top = stretch;
    }

    pub fn set_card_maximum_height(&mut self, height: f64) {
        self.card_maximum_height = at_least(self.card_maximum_height, height, 0.0);
    }

    pub fn set_bottom_number_of_stacked_cards(&mut self, count: usize) {
        self.bottom_number_of_stacked_cards = count.min(MAX_STACKED_CARDS);
    }

    pub fn set_bottom_stacked_cards_should_scale(&mut self, scale: bool) {
        self.bottom_stacked_cards_should_scale = scale;
    }

    pub fn set_bottom_stacked_cards_minimum_scale(&mut self, scale: f64) {
        self.bottom_stacked_cards_minimum_scale =
            at_least(self.bottom_stacked_cards_minimum_scale, scale, 0.0);
    }

    pub fn set_bottom_stacked_cards_maximum_scale(&mut self, scale: f64) {
        self.bottom_stacked_cards_maximum_scale = if scale.is_nan() {
            self.bottom_stacked_cards_maximum_scale
        } else {
            scale.min(1.0)
        };
    }

    pub fn set_bottom_card_lookout_margin(&mut self, margin: f64) {
        self.bottom_card_lookout_margin =
            between(self.bottom_card_lookout_margin, margin, 0.0, MAX_LOOKOUT_MARGIN);
    }

    pub fn set_space_at_top_for_background_view(&mut self, space: f64) {
        self.space_at_top_for_background_view =
            at_least(self.space_at_top_for_background_view, space, 0.0);
    }

    pub fn set_space_at_top_should_snap(&mut self, snap: bool) {
        self.space_at_top_should_snap = snap;
    }

    pub fn set_space_at_bottom(&mut self, space: f64) {
        if !space.is_nan() {
            self.space_at_bottom = space;
        }
    }

    pub fn set_scroll_area_top(&mut self, area: f64) {
        self.scroll_area_top = at_least(self.scroll_area_top, area, 0.0);
    }

    pub fn set_scroll_area_bottom(&mut self, area: f64) {
        self.scroll_area_bottom = at_least(self.scroll_area_bottom, area, 0.0);
    }

    pub fn set_scroll_should_snap_card_head(&mut self, snap: bool) {
        self.scroll_should_snap_card_head = snap;
    }

    pub fn set_scroll_stop_cards_at_top(&mut self, stop: bool) {
        self.scroll_stop_cards_at_top = stop;
    }

    pub fn set_autoscroll_max_speed(&mut self, speed: f64) {
        self.autoscroll_max_speed = at_least(self.autoscroll_max_speed, speed, 0.0);
    }

    pub fn set_move_lift_offset(&mut self, offset: f64) {
        if !offset.is_nan() {
            self.move_lift_offset = offset;
        }
    }

    pub fn set_long_press_duration_ms(&mut self, duration_ms: u64) {
        self.long_press_duration_ms = duration_ms;
    }

    pub fn set_pan_dismiss_fraction(&mut self, fraction: f64) {
        self.pan_dismiss_fraction = between(self.pan_dismiss_fraction, fraction, f64::EPSILON, 1.0);
    }

    pub fn with_first_movable_index(mut self, index: usize) -> Self {
        self.set_first_movable_index(index);
        self
    }

    pub fn with_card_head_height(mut self, height: f64) -> Self {
        self.set_card_head_height(height);
        self
    }

    pub fn with_card_should_expand_head_height(mut self, expand: bool) -> Self {
        self.set_card_should_expand_head_height(expand);
        self
    }

    pub fn with_card_should_stretch_at_scroll_top(mut self, stretch: bool) -> Self {
        self.set_card_should_stretch_at_scroll_top(stretch);
        self
    }

    pub fn with_card_maximum_height(mut self, height: f64) -> Self {
        self.set_card_maximum_height(height);
        self
    }

    pub fn with_bottom_number_of_stacked_cards(mut self, count: usize) -> Self {
        self.set_bottom_number_of_stacked_cards(count);
        self
    }

    pub fn with_bottom_stacked_cards_should_scale(mut self, scale: bool) -> Self {
        self.set_bottom_stacked_cards_should_scale(scale);
        self
    }

    /// Sets both bounds of the bottom stack scale range.
    pub fn with_bottom_stacked_cards_scale(mut self, minimum: f64, maximum: f64) -> Self {
        self.set_bottom_stacked_cards_minimum_scale(minimum);
        self.set_bottom_stacked_cards_maximum_scale(maximum);
        self
    }

    pub fn with_bottom_card_lookout_margin(mut self, margin: f64) -> Self {
        self.set_bottom_card_lookout_margin(margin);
        self
    }

    pub fn with_space_at_top_for_background_view(mut self, space: f64) -> Self {
        self.set_space_at_top_for_background_view(space);
        self
    }

    pub fn with_space_at_top_should_snap(mut self, snap: bool) -> Self {
        self.set_space_at_top_should_snap(snap);
        self
    }

    pub fn with_space_at_bottom(mut self, space: f64) -> Self {
        self.set_space_at_bottom(space);
        self
    }

    /// Sets both autoscroll trigger bands.
    pub fn with_scroll_areas(mut self, top: f64, bottom: f64) -> Self {
        self.set_scroll_area_top(top);
        self.set_scroll_area_bottom(bottom);
        self
    }

    pub fn with_scroll_should_snap_card_head(mut self, snap: bool) -> Self {
        self.set_scroll_should_snap_card_head(snap);
        self
    }

    pub fn with_scroll_stop_cards_at_top(mut self, stop: bool) -> Self {
        self.set_scroll_stop_cards_at_top(stop);
        self
    }

    pub fn with_autoscroll_max_speed(mut self, speed: f64) -> Self {
        self.set_autoscroll_max_speed(speed);
        self
    }

    pub fn with_move_lift_offset(mut self, offset: f64) -> Self {
        self.set_move_lift_offset(offset);
        self
    }

    pub fn with_long_press_duration_ms(mut self, duration_ms: u64) -> Self {
        self.set_long_press_duration_ms(duration_ms);
        self
    }

    pub fn with_pan_dismiss_fraction(mut self, fraction: f64) -> Self {
        self.set_pan_dismiss_fraction(fraction);
        self
    }

    /// Scale lost per bottom stack slot.
    ///
    /// A minimum scale above the maximum is treated as the maximum. Returns `0` for an empty
    /// stack.
    pub fn scale_per_card(&self) -> f64 {
        if self.bottom_number_of_stacked_cards == 0 {
            return 0.0;
        }
        let maximum = self.bottom_stacked_cards_maximum_scale;
        let minimum = maximum.min(self.bottom_stacked_cards_minimum_scale);
        (maximum - minimum) / self.bottom_number_of_stacked_cards as f64
    }
}
