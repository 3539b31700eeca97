//! 16-bit PCM ⇄ f32 sample conversion.
//!
//! The float domain is `[-1.0, 1.0]`. Conversion to PCM clamps; conversion
//! from PCM divides by 32768 so that `i16::MIN` maps exactly to `-1.0`.

/// Convert a single 16-bit PCM sample to f32.
#[inline]
pub fn pcm16_to_f32(sample: i16) -> f32 {
    sample as f32 / 32768.0
}

/// Convert a single f32 sample to 16-bit PCM, clamping to `[-1.0, 1.0]`.
#[inline]
pub fn f32_to_pcm16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * 32767.0).round() as i16
}

/// Convert a 16-bit PCM buffer to f32 samples.
pub fn pcm16_buffer_to_f32(samples: &[i16]) -> Vec<f32> {
    samples.iter().copied().map(pcm16_to_f32).collect()
}

/// Convert an f32 buffer to 16-bit PCM samples, clamping each value.
pub fn f32_buffer_to_pcm16(samples: &[f32]) -> Vec<i16> {
    samples.iter().copied().map(f32_to_pcm16).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pcm16_extremes() {
        assert_eq!(pcm16_to_f32(i16::MIN), -1.0);
        assert!((pcm16_to_f32(i16::MAX) - 0.999_969_5).abs() < 1e-6);
        assert_eq!(pcm16_to_f32(0), 0.0);
    }

    #[test]
    fn f32_clamps_out_of_range() {
        assert_eq!(f32_to_pcm16(2.0), 32767);
        assert_eq!(f32_to_pcm16(-2.0), -32767);
        assert_eq!(f32_to_pcm16(1.0), 32767);
        assert_eq!(f32_to_pcm16(0.0), 0);
    }

    #[test]
    fn round_trip_error_bounded() {
        // Exhaustive over the representable grid k/32768: the re-encoded value
        // never drifts more than one PCM step from the input.
        let bound = 1.0 / 32768.0 + 1e-7;
        for k in -32768i32..32768 {
            let x = k as f32 / 32768.0;
            let back = pcm16_to_f32(f32_to_pcm16(x));
            assert!(
                (x - back).abs() <= bound,
                "k={k} x={x} back={back} err={}",
                (x - back).abs()
            );
        }
    }

    #[test]
    fn buffer_helpers_match_scalar() {
        let pcm = vec![-32768i16, -1, 0, 1, 32767];
        let floats = pcm16_buffer_to_f32(&pcm);
        assert_eq!(floats.len(), pcm.len());
        for (i, &s) in pcm.iter().enumerate() {
            assert_eq!(floats[i], pcm16_to_f32(s));
        }
        let back = f32_buffer_to_pcm16(&floats);
        // -32768 clamps to -32767 on the way back; everything else survives.
        assert_eq!(back, vec![-32767i16, -1, 0, 1, 32767]);
    }
}
