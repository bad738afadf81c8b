//! Hit flash transient.

use halo_shared::{Color, Vec3, Vec4};

use crate::config::{EffectConfiguration, HitFxMode};

/// Overlay and inner-glow colors for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceTint {
    /// Overlay color; alpha 0 skips the pass
    pub overlay: Color,
    /// Overlay pulse floor
    pub overlay_min_intensity: f32,
    /// Overlay blending with the surface
    pub overlay_blending: f32,
    /// Inner glow color; alpha 0 skips the pass
    pub inner_glow: Color,
    /// Local hit position and radius
    pub hit_position: Option<Vec4>,
    /// Start time of the running hit
    pub hit_start: f32,
}

impl SurfaceTint {
    /// No overlay and no inner glow.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            overlay: Color::CLEAR,
            overlay_min_intensity: 0.0,
            overlay_blending: 0.0,
            inner_glow: Color::CLEAR,
            hit_position: None,
            hit_start: 0.0,
        }
    }
}

/// Running hit flash of one effect.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HitFlash {
    active: bool,
    start: f32,
    duration: f32,
    color: Color,
    intensity: f32,
    position: Option<Vec3>,
}

impl HitFlash {
    /// Idle flash.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a flash at `now`.
    pub fn trigger(&mut self, color: Color, duration: f32, intensity: f32, now: f32) {
        self.active = true;
        self.start = now;
        self.duration = duration;
        self.color = color;
        self.intensity = intensity;
        self.position = None;
    }

    /// Starts a flash centered on a world position.
    pub fn trigger_at(&mut self, position: Vec3, color: Color, duration: f32, intensity: f32, now: f32) {
        self.trigger(color, duration, intensity, now);
        self.position = Some(position);
    }

    /// True while the flash runs.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Start time of the last flash
    #[must_use]
    pub const fn start_time(&self) -> f32 {
        self.start
    }

    /// Computes this frame's tint, ending the flash once it ran out.
    pub fn resolve(&mut self, cfg: &EffectConfiguration, highlighted: bool, fade: f32, now: f32) -> SurfaceTint {
        let mut tint = SurfaceTint {
            overlay: cfg.overlay.color,
            overlay_min_intensity: cfg.overlay.min_intensity,
            overlay_blending: cfg.overlay.blending,
            inner_glow: cfg.inner_glow.color,
            hit_position: None,
            hit_start: self.start,
        };
        let overlay = cfg.overlay.intensity;
        let inner_glow = cfg.inner_glow.intensity;
        if !self.active {
            tint.overlay.a = overlay * fade;
            tint.inner_glow.a = inner_glow * fade;
            return tint;
        }

        tint.overlay.a = if highlighted { overlay } else { 0.0 };
        tint.inner_glow.a = if highlighted { inner_glow } else { 0.0 };
        let t = if self.duration > 0.0 { (now - self.start) / self.duration } else { 1.0 };
        if t >= 1.0 {
            self.active = false;
            return tint;
        }

        if cfg.hit_fx.mode == HitFxMode::InnerGlow {
            let blend = highlighted && inner_glow > 0.0;
            let alpha = if blend { lerp(1.0 - t, inner_glow, t) } else { 1.0 - t };
            let color = if blend { self.color.lerp(cfg.inner_glow.color, t) } else { self.color };
            tint.inner_glow = color.with_alpha(alpha * self.intensity);
        } else {
            let blend = highlighted && overlay > 0.0;
            let alpha = if blend { lerp(1.0 - t, overlay, t) } else { 1.0 - t };
            let color = if blend { self.color.lerp(cfg.overlay.color, t) } else { self.color };
            tint.overlay = color.with_alpha(alpha * self.intensity);
            tint.overlay_min_intensity = 1.0;
            tint.overlay_blending = 0.0;
            if cfg.hit_fx.mode == HitFxMode::LocalHit {
                let p = self.position.unwrap_or(Vec3::ZERO);
                tint.hit_position = Some(Vec4::new(p.x, p.y, p.z, cfg.hit_fx.radius));
            }
        }
        tint
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_alpha_ramps_down() {
        let cfg = EffectConfiguration::default();
        let mut hit = HitFlash::new();
        hit.trigger(Color::RED, 0.25, 1.0, 10.0);
        let samples: Vec<f32> =
            [10.0, 10.125, 10.26].iter().map(|&now| hit.resolve(&cfg, false, 1.0, now).overlay.a).collect();
        assert!((samples[0] - 1.0).abs() < 1e-5);
        assert!((samples[1] - 0.5).abs() < 1e-5);
        assert!(samples[2].abs() < 1e-6);
        assert!(!hit.is_active());
    }

    #[test]
    fn test_blends_towards_configured_overlay() {
        let mut cfg = EffectConfiguration::default();
        cfg.overlay.intensity = 0.5;
        let mut hit = HitFlash::new();
        hit.trigger(Color::RED, 1.0, 1.0, 0.0);
        let tint = hit.resolve(&cfg, true, 1.0, 0.5);
        assert!((tint.overlay.a - 0.5).abs() < 1e-5);
        assert!((tint.overlay_min_intensity - 1.0).abs() < 1e-6);
        assert!(tint.overlay_blending.abs() < 1e-6);
    }

    #[test]
    fn test_inner_glow_mode() {
        let mut cfg = EffectConfiguration::default();
        cfg.hit_fx.mode = HitFxMode::InnerGlow;
        let mut hit = HitFlash::new();
        hit.trigger(Color::WHITE, 1.0, 0.5, 0.0);
        let tint = hit.resolve(&cfg, false, 1.0, 0.0);
        assert!((tint.inner_glow.a - 0.5).abs() < 1e-6);
        assert!(tint.overlay.a.abs() < 1e-6);
    }

    #[test]
    fn test_local_hit_position() {
        let mut cfg = EffectConfiguration::default();
        cfg.hit_fx.mode = HitFxMode::LocalHit;
        let mut hit = HitFlash::new();
        hit.trigger_at(Vec3::new(1.0, 2.0, 3.0), Color::WHITE, 1.0, 1.0, 0.0);
        let tint = hit.resolve(&cfg, false, 1.0, 0.1);
        assert_eq!(tint.hit_position, Some(Vec4::new(1.0, 2.0, 3.0, 0.5)));
    }

    #[test]
    fn test_idle_follows_fade() {
        let mut cfg = EffectConfiguration::default();
        cfg.overlay.intensity = 0.8;
        cfg.inner_glow.intensity = 0.4;
        let tint = HitFlash::new().resolve(&cfg, true, 0.5, 0.0);
        assert!((tint.overlay.a - 0.4).abs() < 1e-6);
        assert!((tint.inner_glow.a - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_zero_duration_ends_at_once() {
        let cfg = EffectConfiguration::default();
        let mut hit = HitFlash::new();
        hit.trigger(Color::WHITE, 0.0, 1.0, 0.0);
        assert!(hit.resolve(&cfg, false, 1.0, 0.0).overlay.a.abs() < 1e-6);
        assert!(!hit.is_active());
    }
}
