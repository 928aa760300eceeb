use cardstack_adapter::cardstack::kurbo::{Insets, Point, Rect, Size};
use cardstack_adapter::cardstack::{CardStackOptions, HostGeometry};
use cardstack_adapter::{
    CardHost, CardStackDelegate, Engine, GestureEvent, HostCommand, SelectAction, ViewHandle,
};

/// Prints every command and keeps cells at their listed positions.
struct PrintHost {
    count: usize,
    geometry: HostGeometry,
}

impl CardHost for PrintHost {
    fn item_count(&self) -> usize {
        self.count
    }

    fn geometry(&self) -> HostGeometry {
        self.geometry
    }

    fn index_at(&self, point: Point) -> Option<usize> {
        let index = (point.y / 80.0) as usize;
        (point.y >= 0.0 && index < self.count).then_some(index)
    }

    fn cell_frame(&self, index: usize) -> Option<Rect> {
        let y = index as f64 * 80.0;
        (index < self.count).then(|| Rect::new(0.0, y, 375.0, y + 615.0))
    }

    fn apply(&mut self, command: HostCommand) {
        if let HostCommand::SetContentOffset(y) = command {
            self.geometry.content_offset.y = y;
        }
        println!("  host <- {command:?}");
    }
}

struct Log;

impl CardStackDelegate for Log {
    fn did_reveal(&mut self, index: usize) {
        println!("  delegate: did_reveal({index})");
    }

    fn did_unreveal(&mut self, index: usize) {
        println!("  delegate: did_unreveal({index})");
    }

    fn did_flip(&mut self, index: usize) {
        println!("  delegate: did_flip({index})");
    }

    fn did_select_item(&mut self, index: usize) -> SelectAction {
        println!("  delegate: did_select_item({index})");
        SelectAction::Reveal
    }
}

fn main() {
    // Example: an adapter forwards a tap, runs a frame loop and flips the revealed card.
    let host = PrintHost {
        count: 8,
        geometry: HostGeometry::new(Size::new(375.0, 667.0), Point::ZERO, Insets::ZERO),
    };
    let mut engine = Engine::new(host, Log, CardStackOptions::new());
    engine.prepare();

    println!("tap at y=250");
    engine.handle(GestureEvent::tap((20.0, 250.0)));
    engine.prepare();
    println!("state={:?}", engine.reveal_state());

    let mut now_ms = 0;
    while engine.tick(now_ms) {
        now_ms += 16;
    }
    println!("t={now_ms} state={:?}", engine.reveal_state());

    println!("flip");
    engine.flip_revealed_card(ViewHandle(1));
    println!("unreveal");
    engine.reveal_card_at(None);
    let now_ms = engine.settle();
    println!("t={now_ms} state={:?}", engine.reveal_state());
}
