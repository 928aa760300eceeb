// Example: list a deck, reveal a card and inspect the bottom stack.
use cardstack::kurbo::{Insets, Point, Size};
use cardstack::{CardStackLayout, CardStackOptions, HostGeometry};

fn main() {
    let mut layout = CardStackLayout::new(CardStackOptions::new().with_card_head_height(80.0));
    let geometry = HostGeometry::new(Size::new(375.0, 667.0), Point::new(0.0, 0.0), Insets::ZERO);

    layout.prepare(12, geometry);
    println!("cell_size={:?}", layout.cell_size());
    println!("content_size={:?}", layout.content_size());
    for a in layout.attributes_in_rect(layout.geometry().viewport.to_rect()) {
        println!("listed {} y={:.1} z={}", a.index, a.frame.y0, a.z_index);
    }

    layout.set_revealed_index(Some(7));
    layout.prepare(12, geometry);
    println!(
        "revealed={:?} bottom_stack={:?} below={}",
        layout.revealed_index(),
        layout.bottom_stack(),
        layout.bottom_below_revealed()
    );
    for &index in layout.bottom_stack() {
        if let Some(a) = layout.attribute(index) {
            println!("stacked {index} y={:.1} scale={:.3}", a.frame.y0, a.scale);
        }
    }

    // Inserting above the revealed card keeps it revealed and defers a scroll correction.
    layout.will_insert([0]);
    layout.set_revealed_index(None);
    let corrected = layout.prepare(13, geometry);
    println!("after insert: correction={corrected:?}");
}
