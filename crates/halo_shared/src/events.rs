//! Notifications raised by highlight effects.

use crate::ids::EffectId;

/// What happened to an effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HighlightEventKind {
    /// Highlight turned on (before any fade-in)
    HighlightStart,
    /// Highlight fully ended (after any fade-out)
    HighlightEnd,
    /// Highlighted flag changed to the given value
    StateChanged(bool),
    /// A hit flash started
    HitFx,
}

/// Event queued on an effect until the host drains it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HighlightEvent {
    /// Source effect
    pub effect: EffectId,
    /// Event kind
    pub kind: HighlightEventKind,
    /// Host time the event was raised
    pub time: f32,
}
