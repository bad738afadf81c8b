//! Compositor statistics.

/// Statistics from one effect rendered for one camera.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Objects drawn this frame.
    pub objects: u32,
    /// Objects culled by layer or visibility.
    pub culled: u32,
    /// Draw commands recorded (instanced draws count once).
    pub draw_calls: u32,
    /// Instances submitted through instanced draws.
    pub instances: u32,
    /// Mask pass draws.
    pub mask_draws: u32,
    /// Outline draws, per offset or per instance.
    pub outline_draws: u32,
    /// Glow draws, per offset or per instance.
    pub glow_draws: u32,
    /// Temporary render targets acquired.
    pub targets_acquired: u32,
    /// The smooth path composed at least one layer.
    pub smooth_composed: bool,
    /// The camera and frame pair had already been rendered.
    pub skipped: bool,
}

impl FrameStats {
    /// Stats of a frame skipped by the duplicate guard.
    #[must_use]
    pub fn skipped() -> Self {
        Self { skipped: true, ..Self::default() }
    }

    /// True when nothing was recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.draw_calls == 0
    }

    /// Average instances per instanced draw, 0 without instancing.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn batching_ratio(&self, instanced_draws: u32) -> f32 {
        if instanced_draws > 0 {
            self.instances as f32 / instanced_draws as f32
        } else {
            0.0
        }
    }

    /// Adds another frame's counters.
    pub fn accumulate(&mut self, other: &Self) {
        self.objects += other.objects;
        self.culled += other.culled;
        self.draw_calls += other.draw_calls;
        self.instances += other.instances;
        self.mask_draws += other.mask_draws;
        self.outline_draws += other.outline_draws;
        self.glow_draws += other.glow_draws;
        self.targets_acquired += other.targets_acquired;
        self.smooth_composed |= other.smooth_composed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulate() {
        let mut total = FrameStats::default();
        let frame = FrameStats { objects: 2, draw_calls: 5, outline_draws: 4, ..FrameStats::default() };
        total.accumulate(&frame);
        total.accumulate(&frame);
        assert_eq!(total.objects, 4);
        assert_eq!(total.outline_draws, 8);
        assert!(!total.is_empty());
        assert!(FrameStats::skipped().skipped);
    }

    #[test]
    fn test_batching_ratio() {
        let stats = FrameStats { instances: 8, ..FrameStats::default() };
        assert!((stats.batching_ratio(2) - 4.0).abs() < 1e-6);
        assert!(stats.batching_ratio(0).abs() < 1e-6);
    }
}
