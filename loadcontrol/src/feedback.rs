/// Impact strength for haptic feedback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ImpactStyle {
    Soft,
    Light,
    Medium,
    Heavy,
    Rigid,
}

/// A fire-and-forget haptic sink.
///
/// The control plays [`ImpactStyle::Medium`] when the loading animation starts, the same way a
/// native pull-to-refresh does.
pub trait Feedback {
    fn impact(&self, style: ImpactStyle, intensity: f32);
}

impl<F: Fn(ImpactStyle, f32)> Feedback for F {
    fn impact(&self, style: ImpactStyle, intensity: f32) {
        self(style, intensity)
    }
}
