use crate::*;

use kurbo::{Insets, Point, Rect, Size};

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        debug_assert!(start < end_exclusive);
        start + (self.next_u64() % (end_exclusive - start) as u64) as usize
    }
}

const EPS: f64 = 1e-9;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn geometry(offset_y: f64) -> HostGeometry {
    HostGeometry::new(
        Size::new(375.0, 667.0),
        Point::new(0.0, offset_y),
        Insets::ZERO,
    )
}

fn prepared(count: usize, offset_y: f64) -> CardStackLayout {
    let mut layout = CardStackLayout::default();
    layout.prepare(count, geometry(offset_y));
    layout
}

fn revealed(count: usize, index: usize) -> CardStackLayout {
    let mut layout = prepared(count, 0.0);
    assert!(layout.set_revealed_index(Some(index)));
    layout.prepare(count, geometry(0.0));
    layout
}

#[test]
fn empty_collection_has_no_attributes() {
    let mut layout = CardStackLayout::default();
    assert_eq!(layout.prepare(0, geometry(0.0)), None);
    assert!(layout.attributes().is_empty());
    assert!(layout.bottom_stack().is_empty());
    assert!(!layout.set_revealed_index(Some(0)));
}

#[test]
fn cell_size_fills_viewport_minus_stack_margins() {
    let layout = prepared(3, 0.0);
    // 667 - 5 stacked * 10 margin - 0 insets - 2
    assert_eq!(layout.cell_size(), Size::new(375.0, 615.0));

    let mut layout = CardStackLayout::new(CardStackOptions::new().with_card_maximum_height(300.0));
    layout.prepare(3, geometry(0.0));
    assert_eq!(layout.cell_size().height, 300.0);

    // A maximum above the available height is capped.
    let mut layout = CardStackLayout::new(CardStackOptions::new().with_card_maximum_height(1000.0));
    layout.prepare(3, geometry(0.0));
    assert_eq!(layout.cell_size().height, 615.0);
}

#[test]
fn cell_size_accounts_for_insets() {
    let mut layout = CardStackLayout::default();
    let geometry = HostGeometry::new(
        Size::new(375.0, 667.0),
        Point::ZERO,
        Insets::new(10.0, 20.0, 5.0, 30.0),
    );
    layout.prepare(3, geometry);
    assert_eq!(layout.cell_size(), Size::new(360.0, 565.0));
}

#[test]
fn frozen_bottom_inset_keeps_last_value() {
    let mut layout = CardStackLayout::default();
    let mut geometry = geometry(0.0);
    geometry.content_inset.y1 = 30.0;
    layout.prepare(3, geometry);
    layout.freeze_bottom_inset(true);

    geometry.content_inset.y1 = 300.0;
    layout.prepare(3, geometry);
    assert_eq!(layout.bottom_inset(), 30.0);
    assert_eq!(layout.cell_size().height, 667.0 - 50.0 - 30.0 - 2.0);

    layout.freeze_bottom_inset(false);
    layout.prepare(3, geometry);
    assert_eq!(layout.bottom_inset(), 300.0);
}

#[test]
fn listed_cards_are_spaced_by_head_height() {
    let layout = prepared(20, 0.0);
    assert_eq!(layout.attributes().len(), 20);
    for (i, a) in layout.attributes().iter().enumerate() {
        assert_eq!(a.index, i);
        assert_eq!(a.z_index, i);
        assert_eq!(a.frame.y0, 80.0 * i as f64);
        assert!(!a.hidden);
        assert!(!a.is_revealed);
        assert_eq!(a.scale, 1.0);
    }
    assert_eq!(layout.content_size(), Size::new(375.0, 1600.0));
}

#[test]
fn head_height_expands_to_fill_viewport() {
    let layout = prepared(4, 0.0);
    assert!(approx(layout.effective_head_height(), 667.0 / 4.0));
    assert!(approx(layout.attributes()[1].frame.y0, 166.75));

    let mut layout =
        CardStackLayout::new(CardStackOptions::new().with_card_should_expand_head_height(false));
    layout.prepare(4, geometry(0.0));
    assert_eq!(layout.attributes()[1].frame.y0, 80.0);
}

#[test]
fn scrolled_cards_stop_at_top() {
    let layout = prepared(20, 200.0);
    let a = layout.attributes();
    // top index = 200 / 80 = 2
    assert!(a[0].hidden && a[1].hidden);
    assert_eq!(a[0].frame.y0, 200.0);
    assert_eq!(a[1].frame.y0, 200.0);
    assert!(!a[2].hidden);
    assert_eq!(a[2].frame.y0, 200.0);
    assert!(!a[3].hidden);
    assert_eq!(a[3].frame.y0, 240.0);
}

#[test]
fn cards_far_above_the_fold_are_parked_off_screen() {
    let layout = prepared(20, 1000.0);
    let a = layout.attributes();
    // top index = 12; cards below index 7 are parked.
    assert!(a[0].hidden);
    assert_eq!(a[0].frame.y0, 667.0 * -1.5);
    assert!(a[8].hidden);
    assert_eq!(a[8].frame.y0, 1000.0);
}

#[test]
fn cards_scroll_away_without_stop_at_top() {
    let mut layout =
        CardStackLayout::new(CardStackOptions::new().with_scroll_stop_cards_at_top(false));
    layout.prepare(20, geometry(200.0));
    let a = layout.attributes();
    assert!(!a[0].hidden);
    assert_eq!(a[0].frame.y0, 0.0);
    assert_eq!(a[2].frame.y0, 160.0);
}

#[test]
fn pulling_past_top_stretches_cards() {
    let layout = prepared(20, -50.0);
    let a = layout.attributes();
    assert!(approx(a[0].frame.y0, -40.0));
    assert!(approx(a[1].frame.y0, 50.0));

    let mut layout =
        CardStackLayout::new(CardStackOptions::new().with_card_should_stretch_at_scroll_top(false));
    layout.prepare(20, geometry(-50.0));
    assert_eq!(layout.attributes()[1].frame.y0, 80.0);
}

#[test]
fn moving_card_is_transparent_and_its_predecessor_stays_visible() {
    let mut layout = prepared(20, 0.0);
    layout.set_moving_index(Some(3));
    layout.prepare(20, geometry(200.0));
    let a = layout.attributes();
    assert_eq!(a[3].alpha, 0.0);
    assert_eq!(a[2].alpha, 1.0);

    layout.set_moving_index(Some(2));
    layout.prepare(20, geometry(200.0));
    // Card 1 is above the top index but sits right behind the moving card.
    assert!(!layout.attributes()[1].hidden);
    assert!(layout.attributes()[0].hidden);
}

#[test]
fn bottom_stack_is_centered_on_revealed_card() {
    let layout = revealed(10, 7);
    assert_eq!(layout.bottom_stack(), &[4, 5, 6, 8, 9]);
    assert_eq!(layout.bottom_below_revealed(), 3);
    assert_eq!(layout.bottom_card_count(), 5);
}

#[test]
fn bottom_stack_window_shifts_near_the_ends() {
    let layout = revealed(10, 0);
    assert_eq!(layout.bottom_stack(), &[1, 2, 3, 4, 5]);
    assert_eq!(layout.bottom_below_revealed(), 0);

    let layout = revealed(10, 9);
    assert_eq!(layout.bottom_stack(), &[4, 5, 6, 7, 8]);
    assert_eq!(layout.bottom_below_revealed(), 5);

    let layout = revealed(3, 1);
    assert_eq!(layout.bottom_stack(), &[0, 2]);
}

#[test]
fn even_stack_depth_is_symmetric() {
    let mut layout =
        CardStackLayout::new(CardStackOptions::new().with_bottom_number_of_stacked_cards(4));
    layout.prepare(10, geometry(0.0));
    layout.set_revealed_index(Some(5));
    layout.prepare(10, geometry(0.0));
    assert_eq!(layout.bottom_stack(), &[3, 4, 6, 7]);
    assert_eq!(layout.bottom_below_revealed(), 2);
}

#[test]
fn revealed_card_fills_viewport_at_scroll_offset() {
    let mut layout = prepared(10, 0.0);
    layout.set_revealed_index(Some(7));
    layout.prepare(10, geometry(120.0));
    let a = layout.attributes()[7];
    assert!(a.is_revealed);
    assert!(!a.hidden);
    assert!(approx(a.frame.y0, 120.01));
    assert_eq!(a.frame.size(), layout.cell_size());

    let mut layout = CardStackLayout::new(
        CardStackOptions::new().with_space_at_top_for_background_view(40.0),
    );
    layout.prepare(1, geometry(0.0));
    layout.set_revealed_index(Some(0));
    layout.prepare(1, geometry(0.0));
    assert!(approx(layout.attributes()[0].frame.y0, 40.01));
}

#[test]
fn bottom_stack_cards_fan_out_with_scale() {
    let layout = revealed(10, 7);
    let a = layout.attributes();
    let cell_height = layout.cell_size().height;

    // base = 667 - 5 * 10 = 617
    let back = a[4];
    assert!(approx(back.scale, 0.952));
    let shrink = (cell_height - cell_height * 0.952) / 2.0;
    assert!(approx(back.frame.y0, 617.0 - shrink));

    let front = a[9];
    assert!(approx(front.scale, 1.0));
    assert!(approx(front.frame.y0, 657.0));

    // Non-stacked cards inside the content rect wait hidden at the bottom edge.
    assert!(a[0].hidden);
    assert_eq!(a[0].alpha, 0.0);
    assert_eq!(a[0].frame.y0, 667.0);
}

#[test]
fn scale_law_matches_stack_slots() {
    let layout = revealed(10, 7);
    assert!(approx(layout.options().scale_per_card(), 0.012));

    let scales: Vec<f64> = (0..5).map(|slot| layout.card_scale(slot, false)).collect();
    for pair in scales.windows(2) {
        // Back slots are smaller than front slots.
        assert!(pair[0] < pair[1] + EPS);
    }
    assert!(approx(scales[4], 1.0));
    assert!(approx(layout.card_scale(4, true), 0.988));
    // The extra step only applies inside the stack.
    assert!(approx(layout.card_scale(5, true), 1.0));
}

#[test]
fn scaling_can_be_disabled() {
    let mut layout =
        CardStackLayout::new(CardStackOptions::new().with_bottom_stacked_cards_should_scale(false));
    layout.prepare(10, geometry(0.0));
    layout.set_revealed_index(Some(7));
    layout.prepare(10, geometry(0.0));
    assert!(layout.attributes().iter().all(|a| a.scale == 1.0));
    assert_eq!(layout.card_scale(0, true), 1.0);
}

#[test]
fn zero_stack_depth_has_no_bottom_stack() {
    let mut layout =
        CardStackLayout::new(CardStackOptions::new().with_bottom_number_of_stacked_cards(0));
    layout.prepare(10, geometry(0.0));
    layout.set_revealed_index(Some(4));
    layout.prepare(10, geometry(0.0));
    assert!(layout.bottom_stack().is_empty());
    assert_eq!(layout.card_scale(0, false), 1.0);
    assert_eq!(layout.card_scale(3, true), 1.0);
}

#[test]
fn collapse_all_stacks_cards_from_scroll_position() {
    let mut layout = prepared(10, 0.0);
    layout.set_collapse_all(true);
    layout.prepare(10, geometry(0.0));
    assert_eq!(layout.bottom_stack(), &[0, 1, 2, 3]);
    let a = layout.attributes();
    // base = 667 - 4 * 10
    assert!(approx(a[0].scale, 0.964));
    assert!(approx(a[3].frame.y0, 627.0 + 30.0));
    assert!(a[5].hidden);
    assert!(a.iter().all(|a| !a.is_revealed));

    layout.prepare(10, geometry(240.0));
    assert_eq!(layout.bottom_stack(), &[3, 4, 5, 6]);
}

#[test]
fn incremental_pass_only_recomputes_visible_window() {
    let mut layout = prepared(100, 0.0);
    layout.prepare(100, geometry(4000.0));
    let a = layout.attributes();
    // Window is [4000/80 - 10, (4000+667)/80 + 5) = [40, 63).
    assert_eq!(a[0].frame.y0, 0.0);
    assert!(!a[0].hidden);
    assert!(a[40].hidden);
    assert_eq!(a[50].frame.y0, 4000.0);
    assert_eq!(a[80].frame.y0, 6400.0);

    // A changed count recomputes everything.
    layout.prepare(101, geometry(4000.0));
    assert!(layout.attributes()[0].hidden);
}

#[test]
fn insert_above_revealed_card_renumbers_and_corrects_offset() {
    let mut layout = revealed(10, 5);
    layout.will_insert([2]);
    assert_eq!(layout.revealed_index(), Some(6));
    assert_eq!(layout.temporary_top(), 80.0);
    assert_eq!(layout.item_count(), 11);

    // Inserting below the revealed card changes nothing.
    layout.will_insert([9]);
    assert_eq!(layout.revealed_index(), Some(6));
    assert_eq!(layout.temporary_top(), 80.0);

    // The correction is consumed by the next listed pass.
    layout.prepare(12, geometry(0.0));
    assert_eq!(layout.temporary_top(), 80.0);
    layout.set_revealed_index(None);
    assert_eq!(layout.prepare(12, geometry(0.0)), Some(80.0));
    assert_eq!(layout.temporary_top(), 0.0);
    assert_eq!(layout.geometry().content_offset.y, 80.0);
    assert_eq!(layout.prepare(12, geometry(80.0)), None);
}

#[test]
fn insert_at_revealed_index_pushes_it_down_once() {
    let mut layout = revealed(10, 0);
    layout.will_insert([0]);
    assert_eq!(layout.revealed_index(), Some(1));
    assert_eq!(layout.temporary_top(), 80.0);

    let mut layout = revealed(10, 5);
    layout.will_insert([5, 6]);
    assert_eq!(layout.revealed_index(), Some(7));
    assert_eq!(layout.temporary_top(), 160.0);
}

#[test]
fn delete_of_revealed_card_unreveals() {
    let mut layout = revealed(10, 5);
    assert_eq!(layout.will_delete([5]), DeleteOutcome::Unrevealed(5));
    assert_eq!(layout.revealed_index(), None);
}

#[test]
fn delete_above_revealed_card_renumbers() {
    let mut layout = revealed(10, 5);
    assert_eq!(layout.will_delete([3, 1]), DeleteOutcome::Kept);
    assert_eq!(layout.revealed_index(), Some(3));
    assert_eq!(layout.temporary_top(), -160.0);

    // Pre-delete positions are compared against the original revealed index.
    let mut layout = revealed(10, 5);
    assert_eq!(layout.will_delete([3, 4]), DeleteOutcome::Kept);
    assert_eq!(layout.revealed_index(), Some(3));

    let mut layout = revealed(10, 5);
    assert_eq!(layout.will_delete([8]), DeleteOutcome::Kept);
    assert_eq!(layout.revealed_index(), Some(5));
    assert_eq!(layout.temporary_top(), 0.0);
}

#[test]
fn updates_renumber_moving_card() {
    let mut layout = prepared(10, 0.0);
    layout.set_moving_index(Some(4));
    layout.will_insert([1]);
    assert_eq!(layout.moving_index(), Some(5));
    layout.will_delete([5]);
    assert_eq!(layout.moving_index(), None);
}

#[test]
fn random_updates_keep_indices_in_range() {
    let mut rng = Lcg::new(0xC0FFEE);
    let mut layout = prepared(8, 0.0);
    let mut count = 8usize;

    for _ in 0..2_000 {
        match rng.gen_range_usize(0, 5) {
            0 => {
                let at = rng.gen_range_usize(0, count + 1);
                layout.will_insert([at]);
                count += 1;
            }
            1 if count > 3 => {
                let n = rng.gen_range_usize(1, count.min(3) + 1);
                let deleted: Vec<usize> = (0..n).map(|_| rng.gen_range_usize(0, count)).collect();
                let mut unique = deleted.clone();
                unique.sort_unstable();
                unique.dedup();
                layout.will_delete(deleted);
                count -= unique.len();
            }
            2 => {
                let index = rng.gen_range_usize(0, count);
                assert!(layout.set_revealed_index(Some(index)));
            }
            3 => {
                layout.set_revealed_index(None);
            }
            _ => {
                let offset = rng.gen_range_usize(0, 2_000) as f64 - 200.0;
                layout.prepare(count, geometry(offset));
            }
        }

        assert_eq!(layout.item_count(), count);
        if let Some(r) = layout.revealed_index() {
            assert!(r < count, "revealed {r} out of range for {count}");
        }
        assert!(layout.bottom_stack().len() <= layout.options().bottom_number_of_stacked_cards());
    }
}

#[test]
fn bottom_stack_never_exceeds_depth_or_count() {
    let mut rng = Lcg::new(7);
    for _ in 0..500 {
        let depth = rng.gen_range_usize(0, 11);
        let count = rng.gen_range_usize(1, 30);
        let mut layout = CardStackLayout::new(
            CardStackOptions::new().with_bottom_number_of_stacked_cards(depth),
        );
        layout.prepare(count, geometry(0.0));
        layout.set_revealed_index(Some(rng.gen_range_usize(0, count)));
        layout.set_collapse_all(rng.gen_range_usize(0, 2) == 0);
        let offset = rng.gen_range_usize(0, 3_000) as f64;
        layout.prepare(count, geometry(offset));
        assert!(layout.bottom_stack().len() <= depth.min(count));
        assert!(layout.bottom_stack().windows(2).all(|w| w[0] < w[1]));
        assert!(layout.bottom_stack().iter().all(|&i| i < count));
    }
}

#[test]
fn snaps_to_background_space() {
    let mut layout = CardStackLayout::new(
        CardStackOptions::new().with_space_at_top_for_background_view(100.0),
    );
    layout.prepare(20, geometry(0.0));
    assert_eq!(layout.target_content_offset(Point::new(0.0, 30.0)), Point::new(0.0, 0.0));
    assert_eq!(layout.target_content_offset(Point::new(0.0, 70.0)), Point::new(0.0, 100.0));
    assert_eq!(layout.target_content_offset(Point::new(0.0, 300.0)), Point::new(0.0, 300.0));
}

#[test]
fn snaps_to_card_heads() {
    let mut layout =
        CardStackLayout::new(CardStackOptions::new().with_scroll_should_snap_card_head(true));
    layout.prepare(20, geometry(0.0));
    assert_eq!(layout.target_content_offset(Point::new(0.0, 130.0)), Point::new(0.0, 160.0));
    assert_eq!(layout.target_content_offset(Point::new(0.0, 110.0)), Point::new(0.0, 80.0));

    // Not enough content to scroll a full head: no snapping.
    layout.prepare(5, geometry(0.0));
    assert_eq!(layout.target_content_offset(Point::new(0.0, 110.0)), Point::new(0.0, 110.0));
}

#[test]
fn deleted_items_shrink_and_fade() {
    let mut layout = prepared(5, 0.0);
    layout.begin_updates([2]);
    let gone = layout.disappearing_attribute(2).unwrap();
    assert_eq!(gone.alpha, 0.0);
    assert!(approx(gone.scale, 0.001));
    assert_eq!(layout.disappearing_attribute(1).unwrap().alpha, 1.0);

    layout.finalize_updates();
    assert_eq!(layout.disappearing_attribute(2).unwrap().alpha, 1.0);
    assert!(layout.disappearing_attribute(9).is_none());
}

#[test]
fn hit_test_picks_top_most_visible_card() {
    let layout = prepared(20, 0.0);
    assert_eq!(layout.hit_test(Point::new(10.0, 100.0)), Some(1));
    assert_eq!(layout.hit_test(Point::new(10.0, 10.0)), Some(0));
    assert_eq!(layout.hit_test(Point::new(10.0, -10.0)), None);

    let layout = revealed(10, 7);
    assert_eq!(layout.hit_test(Point::new(10.0, 300.0)), Some(7));
}

#[test]
fn attributes_in_rect_filters_by_frame() {
    let layout = prepared(20, 0.0);
    let rect = Rect::new(0.0, 0.0, 375.0, 100.0);
    let hits: Vec<usize> = layout.attributes_in_rect(rect).map(|a| a.index).collect();
    assert_eq!(hits, [0, 1]);
}

#[test]
fn attribute_transform_scales_about_center() {
    let mut a = LayoutAttribute::new(0);
    a.frame = Rect::new(0.0, 0.0, 100.0, 100.0);
    a.scale = 0.5;
    let visual = a.visual_frame();
    assert!(approx(visual.x0, 25.0) && approx(visual.y1, 75.0));
}

#[test]
fn options_clamp_out_of_range_values() {
    let mut o = CardStackOptions::new()
        .with_card_head_height(10.0)
        .with_bottom_number_of_stacked_cards(42)
        .with_bottom_card_lookout_margin(-5.0)
        .with_bottom_stacked_cards_scale(-1.0, 2.0)
        .with_card_maximum_height(-3.0)
        .with_scroll_areas(-1.0, -1.0);
    assert_eq!(o.card_head_height(), MIN_CARD_HEAD_HEIGHT);
    assert_eq!(o.bottom_number_of_stacked_cards(), MAX_STACKED_CARDS);
    assert_eq!(o.bottom_card_lookout_margin(), 0.0);
    assert_eq!(o.bottom_stacked_cards_minimum_scale(), 0.0);
    assert_eq!(o.bottom_stacked_cards_maximum_scale(), 1.0);
    assert_eq!(o.card_maximum_height(), 0.0);
    assert_eq!(o.scroll_area_top(), 0.0);

    o.set_bottom_card_lookout_margin(50.0);
    assert_eq!(o.bottom_card_lookout_margin(), MAX_LOOKOUT_MARGIN);
    o.set_card_head_height(f64::NAN);
    assert_eq!(o.card_head_height(), MIN_CARD_HEAD_HEIGHT);
}

#[test]
fn minimum_scale_above_maximum_collapses_scale_range() {
    let o = CardStackOptions::new().with_bottom_stacked_cards_scale(0.99, 0.9);
    assert_eq!(o.scale_per_card(), 0.0);
}

#[test]
fn snapshot_reflects_layout_state() {
    let layout = revealed(10, 7);
    let snapshot = layout.snapshot();
    assert_eq!(snapshot.item_count, 10);
    assert_eq!(snapshot.revealed_index, Some(7));
    assert_eq!(snapshot.bottom_stack, [4, 5, 6, 8, 9]);
    assert_eq!(snapshot.bottom_below_revealed, 3);
    assert!(!snapshot.collapse_all);
}
