use kurbo::Point;

use cardstack::{CardStackOptions, HostGeometry};

/// Speed used when no touch location is known.
const FALLBACK_SPEED: f64 = 250.0;
/// Frame duration assumed for the first frame after arming.
const FIRST_FRAME_MS: f64 = 1000.0 / 60.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AutoscrollDirection {
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct AutoscrollTimer {
    direction: AutoscrollDirection,
    last_frame_ms: Option<u64>,
}

/// The per-frame autoscroll timer. At most one timer (one direction) is alive at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Autoscroll {
    timer: Option<AutoscrollTimer>,
}

impl Autoscroll {
    /// Arms the timer. Re-arming the same direction is a no-op; the other direction restarts it.
    pub(crate) fn arm(&mut self, direction: AutoscrollDirection) {
        if self.direction() == Some(direction) {
            return;
        }
        cdebug!(?direction, "autoscroll armed");
        self.timer = Some(AutoscrollTimer {
            direction,
            last_frame_ms: None,
        });
    }

    pub(crate) fn disarm(&mut self) {
        if self.timer.take().is_some() {
            cdebug!("autoscroll disarmed");
        }
    }

    pub(crate) fn direction(&self) -> Option<AutoscrollDirection> {
        self.timer.map(|t| t.direction)
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.timer.is_some()
    }

    /// Starts a frame at `now_ms` and returns its direction and duration in seconds.
    pub(crate) fn next_frame(&mut self, now_ms: u64) -> Option<(AutoscrollDirection, f64)> {
        let timer = self.timer.as_mut()?;
        let elapsed_ms = match timer.last_frame_ms {
            Some(last) => now_ms.saturating_sub(last) as f64,
            None => FIRST_FRAME_MS,
        };
        timer.last_frame_ms = Some(now_ms);
        Some((timer.direction, elapsed_ms / 1000.0))
    }
}

/// Y coordinate (content space) below which the bottom trigger band starts.
fn bottom_band_edge(geometry: HostGeometry, options: &CardStackOptions, bottom_inset: f64) -> f64 {
    geometry.content_offset.y + geometry.viewport.height
        - options.space_at_bottom()
        - bottom_inset
        - options.scroll_area_bottom()
}

/// Which trigger band, if any, contains a touch at `touch_y` (content space).
pub(crate) fn band_for(
    touch_y: f64,
    geometry: HostGeometry,
    options: &CardStackOptions,
    bottom_inset: f64,
) -> Option<AutoscrollDirection> {
    if touch_y > bottom_band_edge(geometry, options, bottom_inset) {
        Some(AutoscrollDirection::Down)
    } else if touch_y - geometry.offset_top() < options.scroll_area_top() {
        Some(AutoscrollDirection::Up)
    } else {
        None
    }
}

/// Scroll speed in points per second: zero at a band's outer edge, the maximum speed at the
/// viewport edge.
pub(crate) fn speed(
    direction: AutoscrollDirection,
    touch: Option<Point>,
    geometry: HostGeometry,
    options: &CardStackOptions,
    bottom_inset: f64,
) -> f64 {
    let Some(touch) = touch else {
        return FALLBACK_SPEED;
    };
    let max_speed = options.autoscroll_max_speed();
    let (depth, band) = match direction {
        AutoscrollDirection::Up => {
            let band = options.scroll_area_top();
            (band - (touch.y - geometry.offset_top()), band)
        }
        AutoscrollDirection::Down => {
            let band = options.scroll_area_bottom();
            (touch.y - bottom_band_edge(geometry, options, bottom_inset), band)
        }
    };
    if band <= 0.0 {
        return max_speed;
    }
    max_speed * depth.clamp(0.0, band) / band
}

/// Signed scroll delta for one frame, clamped so the offset stays within the content.
pub(crate) fn scroll_delta(
    direction: AutoscrollDirection,
    speed: f64,
    elapsed_s: f64,
    geometry: HostGeometry,
    content_height: f64,
    bottom_inset: f64,
) -> f64 {
    let distance = (speed * elapsed_s).round_ties_even();
    let offset = geometry.content_offset.y;
    match direction {
        AutoscrollDirection::Up => {
            let min_y = -geometry.content_inset.y0;
            if offset - distance <= min_y {
                min_y - offset
            } else {
                -distance
            }
        }
        AutoscrollDirection::Down => {
            let viewport = geometry.viewport.height;
            let max_y = content_height.max(viewport) - viewport + bottom_inset;
            if offset + distance >= max_y {
                max_y - offset
            } else {
                distance
            }
        }
    }
}
