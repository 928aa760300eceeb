use cardstack_adapter::cardstack::kurbo::{Insets, Point, Rect, Size};
use cardstack_adapter::cardstack::{CardStackOptions, HostGeometry};
use cardstack_adapter::{CardHost, CardStackDelegate, Engine, GestureEvent, GesturePhase, HostCommand};

/// Moves its items on `MoveItem` and follows `SetContentOffset`.
struct ListHost {
    items: Vec<&'static str>,
    geometry: HostGeometry,
}

impl CardHost for ListHost {
    fn item_count(&self) -> usize {
        self.items.len()
    }

    fn geometry(&self) -> HostGeometry {
        self.geometry
    }

    fn index_at(&self, point: Point) -> Option<usize> {
        let index = (point.y / 80.0) as usize;
        (point.y >= 0.0 && index < self.items.len()).then_some(index)
    }

    fn cell_frame(&self, index: usize) -> Option<Rect> {
        let y = index as f64 * 80.0;
        (index < self.items.len()).then(|| Rect::new(0.0, y, 375.0, y + 615.0))
    }

    fn apply(&mut self, command: HostCommand) {
        match command {
            HostCommand::SetContentOffset(y) => self.geometry.content_offset.y = y,
            HostCommand::MoveItem { from, to } => {
                let item = self.items.remove(from);
                self.items.insert(to, item);
            }
            HostCommand::SlideCell {
                index,
                dy,
                transition,
            } => {
                // No animation backend here: sample the curve at its midpoint.
                let halfway = transition.duration_ms / 2;
                let y = transition.sample(0.0, dy, 0, halfway);
                println!("  slide {index} by {dy} (at {halfway}ms: {y:.1})");
            }
            _ => {}
        }
    }
}

struct Moves;

impl CardStackDelegate for Moves {
    fn did_move_item(&mut self, from: usize, to: usize) {
        println!("  move {from} -> {to}");
    }
}

fn main() {
    // Example: long-press drag to reorder, with autoscroll near the bottom edge.
    let items = (0..26)
        .map(|i| ["ace", "two", "three", "four", "five", "six"][i % 6])
        .collect();
    let host = ListHost {
        items,
        geometry: HostGeometry::new(Size::new(375.0, 667.0), Point::ZERO, Insets::ZERO),
    };
    let mut engine = Engine::new(host, Moves, CardStackOptions::new().with_first_movable_index(1));
    engine.prepare();

    engine.handle(GestureEvent::long_press(GesturePhase::Began, (20.0, 170.0)));
    println!("drag={:?}", engine.drag_status());

    engine.handle(GestureEvent::long_press(GesturePhase::Changed, (20.0, 330.0)));
    println!("drag={:?}", engine.drag_status());

    // Hold the touch in the bottom band for half a second.
    engine.handle(GestureEvent::long_press(GesturePhase::Changed, (20.0, 620.0)));
    let mut now_ms = 0;
    while now_ms < 500 {
        now_ms += 16;
        engine.tick(now_ms);
    }
    println!(
        "autoscroll={:?} offset={} drag={:?}",
        engine.autoscroll_direction(),
        engine.host().geometry().content_offset.y,
        engine.drag_status()
    );

    let touch_y = engine.host().geometry().content_offset.y + 300.0;
    engine.handle(GestureEvent::long_press(GesturePhase::Ended, (20.0, touch_y)));
    engine.settle();
    println!("drag={:?}", engine.drag_status());
    println!("items={:?}", &engine.host().items[..8]);
}
