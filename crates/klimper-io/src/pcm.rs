//! Float to 16-bit PCM conversion.

/// Full-scale value for quantization. Symmetric, so `-1.0` maps to `-32767`.
pub const FULL_SCALE: f32 = 32767.0;

/// Clamp to `[-1, 1]` and round to the nearest 16-bit step.
#[inline]
pub fn quantize(sample: f32) -> i16 {
    if sample.is_nan() {
        return 0;
    }
    (sample.clamp(-1.0, 1.0) * FULL_SCALE).round() as i16
}

/// Quantize `src` into `dst`, element by element, up to the shorter length.
pub fn quantize_into(src: &[f32], dst: &mut [i16]) {
    for (out, &sample) in dst.iter_mut().zip(src) {
        *out = quantize(sample);
    }
}

/// Convert a 16-bit sample back to float for a device callback.
#[inline]
pub fn to_f32(sample: i16) -> f32 {
    f32::from(sample) / FULL_SCALE
}
