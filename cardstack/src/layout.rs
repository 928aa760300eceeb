use kurbo::{Point, Rect, Size, Vec2};

use crate::{CardStackOptions, DeleteOutcome, HostGeometry, LayoutAttribute, LayoutSnapshot};

/// Cards recomputed above the first visible head on incremental passes.
const WINDOW_LEADING: i64 = 10;
/// Cards recomputed below the last visible head on incremental passes.
const WINDOW_TRAILING: i64 = 5;
/// Keeps the revealed card off an exact-zero origin, which some hosts treat specially.
const REVEALED_EPSILON: f64 = 0.01;
/// Hidden cards further than this many heads above the fold are parked off-screen.
const PARK_DISTANCE_IN_HEADS: i64 = 5;
const PARK_FACTOR: f64 = -1.5;
const STRETCH_PER_CARD: f64 = -0.2;
const DISAPPEAR_SCALE: f64 = 0.001;

/// A headless stacked-card layout.
///
/// The layout owns the geometry model: the last host geometry, the item count, the per-item
/// attributes and the interaction flags that select how each card is placed (revealed card,
/// collapsed stack, card being dragged). It holds no UI objects; an adapter feeds it host
/// geometry through [`Self::prepare`] and reads the resulting [`LayoutAttribute`]s back.
///
/// Three placement modes exist:
/// - nothing revealed: cards are listed as a stack of heads that pins at the top while
///   scrolling and stretches apart when pulled past the top;
/// - a card revealed: that card fills the viewport and a few neighbours fan out as a scaled
///   stack at the bottom;
/// - everything collapsed: a run of cards from the current scroll position forms the bottom
///   stack.
///
/// For gestures, reveal/flip transitions and autoscroll, see the `cardstack-adapter` crate.
#[derive(Clone, Debug)]
pub struct CardStackLayout {
    options: CardStackOptions,
    geometry: HostGeometry,
    item_count: usize,
    cell_size: Size,
    attributes: Vec<LayoutAttribute>,

    revealed_index: Option<usize>,
    collapse_all: bool,
    moving_index: Option<usize>,
    bottom_stack: Vec<usize>,
    bottom_below_revealed: usize,
    temporary_top: f64,

    bottom_inset_frozen: bool,
    last_bottom_inset: f64,
    deleted: Vec<usize>,
}

impl Default for CardStackLayout {
    fn default() -> Self {
        Self::new(CardStackOptions::default())
    }
}

impl CardStackLayout {
    pub fn new(options: CardStackOptions) -> Self {
        cdebug!(
            head_height = options.card_head_height(),
            stacked = options.bottom_number_of_stacked_cards(),
            "CardStackLayout::new"
        );
        Self {
            options,
            geometry: HostGeometry::default(),
            item_count: 0,
            cell_size: Size::ZERO,
            attributes: Vec::new(),
            revealed_index: None,
            collapse_all: false,
            moving_index: None,
            bottom_stack: Vec::new(),
            bottom_below_revealed: 0,
            temporary_top: 0.0,
            bottom_inset_frozen: false,
            last_bottom_inset: 0.0,
            deleted: Vec::new(),
        }
    }

    pub fn options(&self) -> &CardStackOptions {
        &self.options
    }

    /// Replaces the options. Takes effect on the next [`Self::prepare`].
    pub fn set_options(&mut self, options: CardStackOptions) {
        self.options = options;
        ctrace!(
            head_height = self.options.card_head_height(),
            stacked = self.options.bottom_number_of_stacked_cards(),
            "CardStackLayout::set_options"
        );
    }

    /// Clones the current options, applies `f`, then delegates to `set_options`.
    ///
    /// The option setters clamp, so `f` cannot leave the layout unrenderable.
    pub fn update_options(&mut self, f: impl FnOnce(&mut CardStackOptions)) {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next);
    }

    /// Recomputes the cell size and the layout attributes for a new layout pass.
    ///
    /// When no card is revealed and an insert/delete above a previously revealed card left a
    /// pending offset correction, the correction is consumed and the corrected content offset
    /// `y` is returned. The host must scroll to it.
    pub fn prepare(&mut self, item_count: usize, geometry: HostGeometry) -> Option<f64> {
        self.geometry = geometry;
        if !self.bottom_inset_frozen {
            self.last_bottom_inset = geometry.content_inset.y1;
        }
        self.item_count = item_count;
        if self.revealed_index.is_some_and(|r| r >= item_count) {
            cwarn!(
                revealed = ?self.revealed_index,
                item_count,
                "revealed index out of range; clearing"
            );
            self.revealed_index = None;
        }
        if self.moving_index.is_some_and(|m| m >= item_count) {
            self.moving_index = None;
        }

        self.cell_size = self.compute_cell_size();
        let corrected = self.generate_attributes();
        ctrace!(
            item_count,
            offset_y = self.geometry.content_offset.y,
            revealed = ?self.revealed_index,
            bottom = self.bottom_stack.len(),
            "prepare"
        );
        corrected
    }

    pub fn geometry(&self) -> HostGeometry {
        self.geometry
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn cell_size(&self) -> Size {
        self.cell_size
    }

    /// All attributes produced by the last pass, indexed by item.
    pub fn attributes(&self) -> &[LayoutAttribute] {
        &self.attributes
    }

    pub fn attribute(&self, index: usize) -> Option<&LayoutAttribute> {
        self.attributes.get(index)
    }

    /// Attributes whose frame intersects `rect`.
    pub fn attributes_in_rect(&self, rect: Rect) -> impl Iterator<Item = &LayoutAttribute> + '_ {
        self.attributes
            .iter()
            .filter(move |a| overlaps(a.frame, rect))
    }

    /// Returns the top-most visible card under `point`.
    pub fn hit_test(&self, point: Point) -> Option<usize> {
        self.attributes
            .iter()
            .filter(|a| !a.hidden && a.alpha > 0.0 && a.visual_frame().contains(point))
            .max_by_key(|a| a.z_index)
            .map(|a| a.index)
    }

    pub fn revealed_index(&self) -> Option<usize> {
        self.revealed_index
    }

    /// Sets the revealed card. Out-of-range indices are refused and `false` is returned.
    pub fn set_revealed_index(&mut self, index: Option<usize>) -> bool {
        if let Some(i) = index {
            if i >= self.item_count {
                cwarn!(index = i, item_count = self.item_count, "set_revealed_index: out of range");
                return false;
            }
        }
        self.revealed_index = index;
        true
    }

    pub fn collapse_all(&self) -> bool {
        self.collapse_all
    }

    pub fn set_collapse_all(&mut self, collapse: bool) {
        self.collapse_all = collapse;
    }

    /// The card currently picked up by a drag. Its cell is laid out fully transparent.
    pub fn moving_index(&self) -> Option<usize> {
        self.moving_index
    }

    pub fn set_moving_index(&mut self, index: Option<usize>) {
        self.moving_index = index;
    }

    /// Keeps using the last seen bottom inset while `frozen`, e.g. while a keyboard is shown.
    pub fn freeze_bottom_inset(&mut self, frozen: bool) {
        self.bottom_inset_frozen = frozen;
    }

    pub fn bottom_inset(&self) -> f64 {
        if self.bottom_inset_frozen {
            self.last_bottom_inset
        } else {
            self.geometry.content_inset.y1
        }
    }

    /// Scroll offset measured from the top content inset.
    pub fn offset_top(&self) -> f64 {
        self.geometry.offset_top()
    }

    pub fn temporary_top(&self) -> f64 {
        self.temporary_top
    }

    /// Ascending indices of the fanned bottom stack computed by the last pass.
    pub fn bottom_stack(&self) -> &[usize] {
        &self.bottom_stack
    }

    /// How many bottom stack cards lie below the revealed index.
    pub fn bottom_below_revealed(&self) -> usize {
        self.bottom_below_revealed
    }

    pub fn bottom_card_count(&self) -> usize {
        self.item_count
            .min(self.options.bottom_number_of_stacked_cards())
            .min(self.bottom_stack.len())
    }

    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            item_count: self.item_count,
            cell_size: self.cell_size,
            revealed_index: self.revealed_index,
            collapse_all: self.collapse_all,
            bottom_stack: self.bottom_stack.clone(),
            bottom_below_revealed: self.bottom_below_revealed,
            temporary_top: self.temporary_top,
            moving_index: self.moving_index,
        }
    }

    /// Total scrollable size of the card list.
    pub fn content_size(&self) -> Size {
        let inset = self.geometry.content_inset;
        let height = self.options.card_head_height() * self.item_count as f64
            + self.options.space_at_top_for_background_view()
            + self.options.space_at_bottom();
        Size::new(self.geometry.viewport.width - (inset.x0 + inset.x1), height)
    }

    /// Head height actually used for listing, stretched to fill the viewport when enabled.
    pub fn effective_head_height(&self) -> f64 {
        let head = self.options.card_head_height();
        if !self.options.card_should_expand_head_height() || self.item_count == 0 {
            return head;
        }
        let available = self.geometry.viewport.height
            - (self.geometry.content_inset.y0
                + self.bottom_inset()
                + self.options.space_at_top_for_background_view());
        head.max(available / self.item_count as f64)
    }

    /// Scale of the bottom stack card in `slot` (0 is the back-most card).
    ///
    /// With `behind`, returns the target scale for the card directly behind a revealed card
    /// that is being dragged away, which is one step smaller.
    pub fn card_scale(&self, slot: usize, behind: bool) -> f64 {
        if !self.options.bottom_stacked_cards_should_scale()
            || self.options.bottom_number_of_stacked_cards() == 0
        {
            return 1.0;
        }
        let per_card = self.options.scale_per_card();
        let count = self.bottom_card_count() as f64;
        let slot = slot as f64;
        let extra = if behind && slot < count { per_card } else { 0.0 };
        let maximum = self.options.bottom_stacked_cards_maximum_scale();
        (maximum - ((slot + 1.0 - count) * -1.0) * per_card - extra).min(1.0)
    }

    /// Adjusts a proposed resting content offset to snap to the background space or to card
    /// heads, depending on the options.
    pub fn target_content_offset(&self, proposed: Point) -> Point {
        let top = self.geometry.content_inset.y0;
        let y = proposed.y + top;
        let space = self.options.space_at_top_for_background_view();

        if self.options.space_at_top_should_snap() && space > 0.0 && y > 0.0 && y < space {
            return if y < space * 0.5 {
                Point::new(0.0, -top)
            } else {
                Point::new(0.0, space - top)
            };
        }

        let head = self.options.card_head_height();
        if self.options.scroll_should_snap_card_head()
            && y > space
            && self.content_size().height > self.geometry.viewport.height + head
        {
            let start_index = ((y - space) / head) as i64 + 1;
            let position_in_head = (y - space) % head;
            let base = start_index as f64 * head + (space - top);
            return if position_in_head > head * 0.5 {
                Point::new(0.0, base)
            } else {
                Point::new(0.0, base - head)
            };
        }
        proposed
    }

    /// Renumbers the revealed and moving cards before the host inserts items.
    ///
    /// `indices` are positions after the insert. Each one at or above the revealed card moves
    /// it down by one and grows the pending offset correction by one head height.
    pub fn will_insert(&mut self, indices: impl IntoIterator<Item = usize>) {
        let mut inserted: Vec<usize> = indices.into_iter().collect();
        inserted.sort_unstable();
        inserted.dedup();
        self.item_count = self.item_count.saturating_add(inserted.len());
        self.moving_index = self.moving_index.map(|m| shift_for_insert(m, &inserted));

        let Some(revealed) = self.revealed_index else {
            return;
        };
        let shifted = shift_for_insert(revealed, &inserted);
        self.temporary_top += self.options.card_head_height() * (shifted - revealed) as f64;
        self.revealed_index = Some(shifted);
        cdebug!(
            from = revealed,
            to = shifted,
            temporary_top = self.temporary_top,
            "will_insert"
        );
    }

    /// Renumbers the revealed and moving cards before the host deletes items.
    ///
    /// `indices` are positions before the delete. Deleting the revealed card clears the reveal
    /// and reports its old index.
    pub fn will_delete(&mut self, indices: impl IntoIterator<Item = usize>) -> DeleteOutcome {
        let mut deleted: Vec<usize> = indices.into_iter().collect();
        deleted.sort_unstable();
        deleted.dedup();
        self.item_count = self.item_count.saturating_sub(deleted.len());
        self.moving_index = self.moving_index.and_then(|m| shift_for_delete(m, &deleted));

        let Some(revealed) = self.revealed_index else {
            return DeleteOutcome::Kept;
        };
        let below = deleted.iter().take_while(|&&i| i < revealed).count();
        self.temporary_top -= self.options.card_head_height() * below as f64;

        match shift_for_delete(revealed, &deleted) {
            Some(shifted) => {
                self.revealed_index = Some(shifted);
                cdebug!(from = revealed, to = shifted, "will_delete");
                DeleteOutcome::Kept
            }
            None => {
                self.revealed_index = None;
                cdebug!(index = revealed, "will_delete: revealed card deleted");
                DeleteOutcome::Unrevealed(revealed)
            }
        }
    }

    /// Records the items deleted by the host's in-flight batch update.
    pub fn begin_updates(&mut self, deleted: impl IntoIterator<Item = usize>) {
        self.deleted.clear();
        self.deleted.extend(deleted);
    }

    /// Final attributes for an item leaving the layout. Deleted items shrink and fade out.
    pub fn disappearing_attribute(&self, index: usize) -> Option<LayoutAttribute> {
        let mut attribute = *self.attributes.get(index)?;
        if self.deleted.contains(&index) {
            attribute.alpha = 0.0;
            attribute.scale *= DISAPPEAR_SCALE;
        }
        Some(attribute)
    }

    pub fn finalize_updates(&mut self) {
        self.deleted.clear();
    }

    fn compute_cell_size(&self) -> Size {
        let viewport = self.geometry.viewport;
        let inset = self.geometry.content_inset;
        let width = viewport.width - (inset.x0 + inset.x1);
        let max_height = viewport.height
            - self.options.bottom_card_lookout_margin()
                * self.options.bottom_number_of_stacked_cards() as f64
            - (inset.y0 + self.bottom_inset())
            - 2.0;
        let maximum = self.options.card_maximum_height();
        let height = if maximum == 0.0 || maximum > max_height {
            max_height
        } else {
            maximum
        };
        Size::new(width.max(0.0), height.max(0.0))
    }

    fn generate_attributes(&mut self) -> Option<f64> {
        let count = self.item_count;
        let reload_all = self.attributes.len() != count;
        let (start, end) = if reload_all {
            self.attributes.clear();
            self.attributes.reserve_exact(count);
            (0, count)
        } else {
            let head = self.options.card_head_height();
            let offset_y = self.geometry.content_offset.y;
            let start = ((offset_y + self.geometry.content_inset.y0
                - self.options.space_at_top_for_background_view()
                + self.temporary_top)
                / head) as i64
                - WINDOW_LEADING;
            let end = ((offset_y + self.geometry.viewport.height + self.temporary_top) / head)
                as i64
                + WINDOW_TRAILING;
            (clamp_index(start, count), clamp_index(end, count))
        };

        self.generate_bottom_stack();

        let mut corrected = None;
        for index in start..end {
            let attribute = if self.revealed_index.is_none() && !self.collapse_all {
                if self.temporary_top != 0.0 {
                    self.geometry.content_offset.y += self.temporary_top;
                    self.temporary_top = 0.0;
                    corrected = Some(self.geometry.content_offset.y);
                }
                self.listed_attribute(index)
            } else if self.revealed_index == Some(index) && !self.collapse_all {
                self.revealed_attribute(index)
            } else {
                self.stacked_attribute(index)
            };

            if index < self.attributes.len() {
                self.attributes[index] = attribute;
            } else {
                self.attributes.push(attribute);
            }
        }
        corrected
    }

    fn generate_bottom_stack(&mut self) {
        self.bottom_stack.clear();
        self.bottom_below_revealed = 0;

        let depth = self.options.bottom_number_of_stacked_cards();
        let count = self.item_count;
        if depth == 0 || count == 0 {
            return;
        }

        match self.revealed_index {
            None => {
                if !self.collapse_all {
                    return;
                }
                let head = self.options.card_head_height();
                let top = ((self.offset_top() + self.temporary_top) / head) as i64;
                let start = clamp_index(top, count);
                let end = start.saturating_add(depth - 1).min(count);
                self.bottom_stack.extend(start..end);
            }
            Some(revealed) => {
                let (first, last) = bottom_window(revealed, depth, count);
                for index in first..=last {
                    if index == revealed {
                        continue;
                    }
                    if index < revealed {
                        self.bottom_below_revealed += 1;
                    }
                    self.bottom_stack.push(index);
                }
            }
        }
    }

    fn listed_attribute(&self, index: usize) -> LayoutAttribute {
        let head = self.effective_head_height();
        let offset_top = self.offset_top();
        let space = self.options.space_at_top_for_background_view();
        let top_index = ((offset_top + self.temporary_top - space) / head) as i64;
        let stop_at_top = self.options.scroll_stop_cards_at_top();

        let mut attribute = LayoutAttribute::new(index);
        if self.moving_index == Some(index) {
            attribute.alpha = 0.0;
        }

        let natural =
            Rect::from_origin_size((0.0, space + head * index as f64), self.cell_size);

        if offset_top >= 0.0 && offset_top <= space {
            attribute.frame = natural;
        } else if offset_top > space {
            let current = index as i64;
            attribute.hidden = stop_at_top && current < top_index;
            if self.moving_index.is_some_and(|m| index + 1 == m) {
                attribute.hidden = false;
            }

            let pinned = (index != 0 && current <= top_index)
                || (index == 0 && offset_top - space > 0.0);
            attribute.frame = if stop_at_top && pinned {
                natural.with_origin((0.0, offset_top))
            } else {
                natural
            };

            if attribute.hidden && current < top_index - PARK_DISTANCE_IN_HEADS {
                attribute.frame =
                    natural.with_origin((0.0, self.geometry.viewport.height * PARK_FACTOR));
            }
        } else if self.options.card_should_stretch_at_scroll_top() {
            let multiplier = 1.0 + (index as f64 + 1.0) * STRETCH_PER_CARD;
            attribute.frame = natural + Vec2::new(0.0, offset_top * multiplier);
        } else {
            attribute.frame = natural;
        }
        attribute
    }

    fn revealed_attribute(&self, index: usize) -> LayoutAttribute {
        let mut y = self.offset_top() + REVEALED_EPSILON;
        if self.item_count == 1 {
            y += self.options.space_at_top_for_background_view();
        }
        let mut attribute = LayoutAttribute::new(index);
        attribute.is_revealed = true;
        attribute.frame = Rect::from_origin_size((0.0, y), self.cell_size);
        attribute
    }

    fn stacked_attribute(&self, index: usize) -> LayoutAttribute {
        let cell = self.cell_size;
        let viewport = self.geometry.viewport;
        let offset_y = self.geometry.content_offset.y;
        let natural = Rect::from_origin_size(
            (0.0, self.options.card_head_height() * index as f64),
            cell,
        );
        let max_y = offset_y + viewport.height;
        let content = Rect::from_origin_size((0.0, offset_y), Size::new(viewport.width, max_y));

        let mut attribute = LayoutAttribute::new(index);
        if let Ok(slot) = self.bottom_stack.binary_search(&index) {
            let margin = self.options.bottom_card_lookout_margin();
            let base = (viewport.height + offset_y)
                - self.bottom_inset()
                - margin * self.bottom_card_count() as f64;
            let scale = self.card_scale(slot, false);
            let shrink = (cell.height - cell.height * scale) / 2.0;
            let y = base + slot as f64 * margin - shrink;
            attribute.frame = Rect::from_origin_size((0.0, y), cell);
            attribute.scale = scale;
        } else if overlaps(content, natural) {
            attribute.hidden = true;
            attribute.alpha = 0.0;
            attribute.frame = natural.with_origin((0.0, max_y));
        } else {
            attribute.hidden = true;
            attribute.alpha = 0.0;
            attribute.frame = natural;
        }
        attribute
    }
}

/// Index range `[first, last]` of the bottom stack window around `revealed`, including it.
///
/// The window holds `depth + 1` cards: `depth / 2` after the revealed card and the rest before
/// it. Near either end the window is shifted, not shrunk.
fn bottom_window(revealed: usize, depth: usize, count: usize) -> (usize, usize) {
    if depth + 1 >= count {
        return (0, count - 1);
    }
    let after = depth / 2;
    let before = depth - after;
    let mut first = revealed.saturating_sub(before);
    let mut last = first + depth;
    if last >= count {
        last = count - 1;
        first = last - depth;
    }
    (first, last)
}

/// New position of `index` after inserting items at the ascending post-insert `inserted`.
pub fn shift_for_insert(index: usize, inserted: &[usize]) -> usize {
    let mut shifted = index;
    for &i in inserted {
        if i <= shifted {
            shifted += 1;
        }
    }
    shifted
}

/// New position of `index` after deleting the pre-delete positions `deleted`, or `None` when
/// `index` itself is deleted.
pub fn shift_for_delete(index: usize, deleted: &[usize]) -> Option<usize> {
    if deleted.contains(&index) {
        return None;
    }
    Some(index - deleted.iter().filter(|&&i| i < index).count())
}

fn clamp_index(value: i64, count: usize) -> usize {
    value.clamp(0, count as i64) as usize
}

fn overlaps(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
}
