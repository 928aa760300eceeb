/// How a host should animate a command: a duration plus an easing curve.
///
/// The engine never interpolates host state itself; it attaches a `Transition` to animated
/// [`crate::HostCommand`]s and schedules its own continuation for when the transition ends.
/// Hosts without an animation backend of their own can drive the change with [`Self::progress`]
/// and [`Self::sample`] from their frame loop, and stop once [`Self::is_done`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transition {
    pub duration_ms: u64,
    pub easing: Easing,
}

impl Transition {
    /// Applies the change without animation.
    pub const IMMEDIATE: Self = Self {
        duration_ms: 0,
        easing: Easing::Linear,
    };

    pub const fn new(duration_ms: u64, easing: Easing) -> Self {
        Self {
            duration_ms,
            easing,
        }
    }

    pub fn is_immediate(&self) -> bool {
        self.duration_ms == 0
    }

    pub fn is_done(&self, start_ms: u64, now_ms: u64) -> bool {
        now_ms.saturating_sub(start_ms) >= self.duration_ms
    }

    /// Eased progress in `[0, 1]` of a transition that started at `start_ms`.
    pub fn progress(&self, start_ms: u64, now_ms: u64) -> f64 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        let elapsed = now_ms.saturating_sub(start_ms);
        let t = (elapsed as f64 / self.duration_ms as f64).clamp(0.0, 1.0);
        self.easing.sample(t)
    }

    /// Interpolates between `from` and `to` at the eased progress.
    pub fn sample(&self, from: f64, to: f64, start_ms: u64, now_ms: u64) -> f64 {
        from + (to - from) * self.progress(start_ms, now_ms)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Easing {
    Linear,
    EaseOut,
    EaseInOut,
    SmoothStep,
}

impl Easing {
    pub fn sample(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseOut => {
                let u = 1.0 - t;
                1.0 - u * u * u
            }
            Self::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - (u * u * u) / 2.0
                }
            }
            Self::SmoothStep => t * t * (3.0 - 2.0 * t),
        }
    }
}
