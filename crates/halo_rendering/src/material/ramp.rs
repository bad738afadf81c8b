//! 1-D color ramp baked from a gradient.

use halo_shared::{Color, Gradient, TextureHandle, GRADIENT_RAMP_SAMPLES};

use crate::ral::RenderBackend;

/// Ramp texture that is re-uploaded only when its samples change.
#[derive(Debug, Default)]
pub struct GradientRamp {
    texture: Option<TextureHandle>,
    samples: Vec<Color>,
}

/// Samples `gradient` at `k / count` for `k` in `0..count`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn ramp_samples(gradient: &Gradient, count: usize) -> Vec<Color> {
    (0..count).map(|k| gradient.evaluate(k as f32 / count as f32)).collect()
}

impl GradientRamp {
    /// Creates an empty ramp.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bakes `gradient`, uploading only when the samples differ.
    pub fn update(&mut self, backend: &mut dyn RenderBackend, gradient: &Gradient) -> TextureHandle {
        let samples = ramp_samples(gradient, GRADIENT_RAMP_SAMPLES);
        match self.texture {
            Some(texture) if samples == self.samples => texture,
            Some(texture) => {
                backend.update_ramp_texture(texture, &samples);
                self.samples = samples;
                texture
            }
            None => {
                let texture = backend.create_ramp_texture(&samples);
                self.samples = samples;
                self.texture = Some(texture);
                texture
            }
        }
    }

    /// Current texture
    #[must_use]
    pub const fn texture(&self) -> Option<TextureHandle> {
        self.texture
    }

    /// Destroys the texture.
    pub fn release(&mut self, backend: &mut dyn RenderBackend) {
        if let Some(texture) = self.texture.take() {
            backend.destroy_texture(texture);
        }
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingBackend;
    use halo_shared::GradientKey;

    #[test]
    fn test_uploads_only_on_change() {
        let mut backend = RecordingBackend::new();
        let mut ramp = GradientRamp::new();
        let mut gradient = Gradient::default();

        let first = ramp.update(&mut backend, &gradient);
        let second = ramp.update(&mut backend, &gradient);
        assert_eq!(first, second);
        assert_eq!(backend.ramp_uploads(), 1);

        gradient = Gradient::new(vec![
            GradientKey { time: 0.0, color: Color::BLACK },
            GradientKey { time: 1.0, color: Color::WHITE },
        ]);
        ramp.update(&mut backend, &gradient);
        assert_eq!(backend.ramp_uploads(), 2);

        ramp.release(&mut backend);
        assert!(ramp.texture().is_none());
    }

    #[test]
    fn test_samples_start_at_zero() {
        let gradient = Gradient::new(vec![
            GradientKey { time: 0.0, color: Color::BLACK },
            GradientKey { time: 1.0, color: Color::WHITE },
        ]);
        let samples = ramp_samples(&gradient, 32);
        assert_eq!(samples.len(), 32);
        assert_eq!(samples[0], Color::BLACK);
        assert!((samples[16].r - 0.5).abs() < 1e-6);
    }
}
