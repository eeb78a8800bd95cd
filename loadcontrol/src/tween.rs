/// Timing of a single animation, sampled by the run loop on every tick.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tween {
    pub start_ms: u64,
    pub duration_ms: u64,
    pub easing: Easing,
}

impl Tween {
    pub fn new(start_ms: u64, duration_ms: u64, easing: Easing) -> Self {
        Self {
            start_ms,
            duration_ms: duration_ms.max(1),
            easing,
        }
    }

    pub fn end_ms(&self) -> u64 {
        self.start_ms.saturating_add(self.duration_ms)
    }

    pub fn is_done(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.start_ms) >= self.duration_ms
    }

    /// Eased progress in `0.0..=1.0`.
    pub fn progress(&self, now_ms: u64) -> f32 {
        if self.is_done(now_ms) {
            return 1.0;
        }
        let elapsed = now_ms.saturating_sub(self.start_ms) as f32;
        self.easing.sample(elapsed / self.duration_ms as f32)
    }

    /// Interpolates between `from` and `to`; lands exactly on `to` once done.
    pub fn sample(&self, from: f32, to: f32, now_ms: u64) -> f32 {
        match self.progress(now_ms) {
            p if p >= 1.0 => to,
            p => from + (to - from) * p,
        }
    }
}

/// Timing curves for inset and offset animations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Easing {
    Linear,
    /// Quadratic acceleration from rest.
    EaseIn,
    /// Quadratic deceleration to rest.
    EaseOut,
    #[default]
    EaseInOutCubic,
}

impl Easing {
    pub fn sample(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Self::EaseInOutCubic if t < 0.5 => 4.0 * t.powi(3),
            Self::EaseInOutCubic => 1.0 - (2.0 - 2.0 * t).powi(3) / 2.0,
        }
    }
}
