//! Highlight fade tweening.
//!
//! ```text
//!            set(true)               elapsed >= fade_in
//!  Hidden ──────────────► FadingIn ─────────────────────► Highlighted
//!    ▲                      │  ▲                              │
//!    │ elapsed >= fade_out  │  │ set(true)                    │ set(false)
//!    │                      ▼  │                              ▼
//!    └────────────────────── FadingOut ◄──────────────────────┘
//! ```
//!
//! Interrupting a running fade rebases its start time so the intensity
//! continues from where it was. Zero durations switch instantly.

use crate::config::GeneralSettings;

/// Fade durations in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FadeDurations {
    /// Fade-in duration
    pub fade_in: f32,
    /// Fade-out duration
    pub fade_out: f32,
}

impl FadeDurations {
    /// Durations configured on an effect.
    #[must_use]
    pub const fn from_settings(general: &GeneralSettings) -> Self {
        Self { fade_in: general.fade_in_duration, fade_out: general.fade_out_duration }
    }
}

/// Running tween.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FadePhase {
    /// No tween; intensity follows the highlighted flag
    #[default]
    Steady,
    /// Ramping up
    FadingIn,
    /// Ramping down
    FadingOut,
}

/// Outcome of a highlight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeRequest {
    /// Nothing to do
    Ignored,
    /// Highlight starts, possibly fading in
    Started,
    /// Fade-out started; the highlight ends when it completes
    FadingOut,
    /// Highlight ended immediately
    Ended,
}

/// Fade state of one effect.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FadeTracker {
    phase: FadePhase,
    start: f32,
    highlighted: bool,
}

impl FadeTracker {
    /// Hidden, not fading.
    #[must_use]
    pub const fn new() -> Self {
        Self { phase: FadePhase::Steady, start: 0.0, highlighted: false }
    }

    /// Current phase
    #[must_use]
    pub const fn phase(&self) -> FadePhase {
        self.phase
    }

    /// Highlighted flag; stays set until a fade-out completes.
    #[must_use]
    pub const fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    /// Start time of the running tween
    #[must_use]
    pub const fn start_time(&self) -> f32 {
        self.start
    }

    /// Applies a highlight request at `now`.
    pub fn request(&mut self, on: bool, now: f32, durations: FadeDurations) -> FadeRequest {
        if on {
            if self.highlighted && self.phase == FadePhase::Steady {
                return FadeRequest::Ignored;
            }
            if durations.fade_in > 0.0 {
                let current = self.value(now, durations);
                self.start = match self.phase {
                    FadePhase::FadingOut => (now - current * durations.fade_in).min(now),
                    FadePhase::FadingIn => self.start,
                    FadePhase::Steady => now,
                };
                self.phase = FadePhase::FadingIn;
            } else {
                self.phase = FadePhase::Steady;
            }
            self.highlighted = true;
            FadeRequest::Started
        } else if self.highlighted {
            if durations.fade_out > 0.0 {
                if self.phase == FadePhase::FadingOut {
                    return FadeRequest::Ignored;
                }
                let current = self.value(now, durations);
                self.start = (now - (1.0 - current) * durations.fade_out).min(now);
                self.phase = FadePhase::FadingOut;
                FadeRequest::FadingOut
            } else {
                self.phase = FadePhase::Steady;
                self.highlighted = false;
                FadeRequest::Ended
            }
        } else {
            FadeRequest::Ignored
        }
    }

    /// Intensity in [0, 1] at `now`, without advancing.
    #[must_use]
    pub fn value(&self, now: f32, durations: FadeDurations) -> f32 {
        match self.phase {
            FadePhase::Steady => {
                if self.highlighted {
                    1.0
                } else {
                    0.0
                }
            }
            FadePhase::FadingIn => {
                if durations.fade_in > 0.0 {
                    ((now - self.start) / durations.fade_in).clamp(0.0, 1.0)
                } else {
                    1.0
                }
            }
            FadePhase::FadingOut => {
                if durations.fade_out > 0.0 {
                    (1.0 - (now - self.start) / durations.fade_out).clamp(0.0, 1.0)
                } else {
                    0.0
                }
            }
        }
    }

    /// Finishes completed tweens.
    ///
    /// Returns true when a fade-out completed and the highlight ended.
    pub fn advance(&mut self, now: f32, durations: FadeDurations) -> bool {
        match self.phase {
            FadePhase::FadingIn if durations.fade_in <= 0.0 || now - self.start >= durations.fade_in => {
                self.phase = FadePhase::Steady;
                false
            }
            FadePhase::FadingOut if durations.fade_out <= 0.0 || now - self.start >= durations.fade_out => {
                self.phase = FadePhase::Steady;
                self.highlighted = false;
                true
            }
            _ => false,
        }
    }

    /// Jumps to the steady state of `on`.
    pub fn force(&mut self, on: bool) {
        self.phase = FadePhase::Steady;
        self.highlighted = on;
    }
}
