//! Equal-power stereo panning from precomputed quarter-period tables.

use crate::wavetable::{Waveform, Wavetable};

/// Equal-power panner.
///
/// Maps `pan ∈ [-1, 1]` onto the first quarter period of the shared cosine
/// and sine tables, so `left² + right² == sample²` up to table interpolation
/// error.
///
/// ```rust
/// use klimper_dsp::Panner;
///
/// let panner = Panner::new();
/// let (l, r) = panner.stereo(1.0, 0.0);
/// assert!((l - r).abs() < 1e-3);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Panner {
    cos: &'static Wavetable,
    sin: &'static Wavetable,
    scale: f32,
}

impl Default for Panner {
    fn default() -> Self {
        Self::new()
    }
}

impl Panner {
    /// Create a panner over the shared sine and cosine tables.
    pub fn new() -> Self {
        let cos = Wavetable::shared(Waveform::Cosine);
        Self {
            cos,
            sin: Wavetable::shared(Waveform::Sine),
            scale: 0.125 * cos.len() as f32,
        }
    }

    /// Split `sample` into `(left, right)`.
    ///
    /// `pan` is clamped to `[-1, 1]`; -1 is hard left.
    #[inline]
    pub fn stereo(&self, sample: f32, pan: f32) -> (f32, f32) {
        let index = (pan.clamp(-1.0, 1.0) + 1.0) * self.scale;
        (
            sample * self.cos.read_interpolated(index),
            sample * self.sin.read_interpolated(index),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_is_equal_power() {
        let (l, r) = Panner::new().stereo(0.8, 0.0);
        assert!(l > 0.0 && r > 0.0);
        assert!((l - r).abs() < 1e-3);
        assert!((l * l + r * r - 0.64).abs() < 1e-3);
    }

    #[test]
    fn test_hard_left_and_right() {
        let panner = Panner::new();
        let (l, r) = panner.stereo(1.0, -1.0);
        assert!((l - 1.0).abs() < 1e-6);
        assert!(r.abs() < 1e-6);

        let (l, r) = panner.stereo(1.0, 1.0);
        assert!(l.abs() < 1e-4);
        assert!((r - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_out_of_range_pan_is_clamped() {
        let panner = Panner::new();
        assert_eq!(panner.stereo(0.5, 3.0), panner.stereo(0.5, 1.0));
        assert_eq!(panner.stereo(0.5, -7.0), panner.stereo(0.5, -1.0));
    }
}
