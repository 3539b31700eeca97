//! Linear-interpolation sample-rate conversion.
//!
//! Deterministic and allocation-bounded: the output length is exactly
//! `⌊n · to_rate / from_rate⌋`. Quality is adequate for saving detected
//! segments at a playback rate; it is NOT used on the detector input path
//! (the stream's resampled entry point is a best-effort coercion only).

/// Convert mono f32 audio from `from_rate` to `to_rate`.
///
/// Equal rates return a copy. For output index `i` the source position is
/// `i · from_rate / to_rate`; the two neighbouring input samples (the upper
/// one clamped to the last index) are blended by the fractional part.
pub fn resample(input: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate {
        return input.to_vec();
    }
    if input.is_empty() || from_rate == 0 || to_rate == 0 {
        return Vec::new();
    }

    let out_len = (input.len() as u64 * to_rate as u64 / from_rate as u64) as usize;
    let step = from_rate as f64 / to_rate as f64;

    let mut output = Vec::with_capacity(out_len);
    for i in 0..out_len {
        let src = i as f64 * step;
        let idx = src as usize;
        let next = (idx + 1).min(input.len() - 1);
        let frac = (src - idx as f64) as f32;
        output.push(input[idx] * (1.0 - frac) + input[next] * frac);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_returns_copy() {
        let samples: Vec<f32> = (0..480).map(|i| i as f32 * 0.001).collect();
        assert_eq!(resample(&samples, 16_000, 16_000), samples);
    }

    #[test]
    fn output_length_formula_exact() {
        // ⌊n · to/from⌋ over a grid of lengths and rate pairs.
        let pairs = [
            (16_000u32, 8_000u32),
            (8_000, 16_000),
            (16_000, 24_000),
            (16_000, 44_100),
            (48_000, 16_000),
            (44_100, 16_000),
        ];
        for &(from, to) in &pairs {
            for n in [1usize, 7, 160, 511, 512, 1601, 16_000] {
                let input = vec![0.25f32; n];
                let out = resample(&input, from, to);
                let expected = (n as u64 * to as u64 / from as u64) as usize;
                assert_eq!(out.len(), expected, "n={n} from={from} to={to}");
            }
        }
    }

    #[test]
    fn upsample_interpolates_between_neighbours() {
        let out = resample(&[0.0, 1000.0, 2000.0], 8_000, 16_000);
        assert_eq!(out.len(), 6);
        assert_eq!(out[0], 0.0);
        assert_eq!(out[1], 500.0);
        assert_eq!(out[2], 1000.0);
        assert_eq!(out[3], 1500.0);
    }

    #[test]
    fn downsample_halves_length() {
        let out = resample(&vec![0.5f32; 3200], 16_000, 8_000);
        assert_eq!(out.len(), 1600);
        assert!(out.iter().all(|&s| (s - 0.5).abs() < 1e-6));
    }

    #[test]
    fn constant_signal_preserved() {
        let out = resample(&vec![0.3f32; 441], 44_100, 16_000);
        assert!(out.iter().all(|&s| (s - 0.3).abs() < 1e-6));
    }

    #[test]
    fn last_sample_clamped_not_read_past_end() {
        // Upsampling reads idx+1 at the tail; it must clamp, not panic.
        let out = resample(&[1.0, -1.0], 8_000, 48_000);
        assert_eq!(out.len(), 12);
        assert_eq!(*out.last().unwrap(), -1.0);
    }

    #[test]
    fn empty_input_empty_output() {
        assert!(resample(&[], 16_000, 8_000).is_empty());
    }
}
