// History sampler - Positional downsample of the position collection for the altitude chart
use crate::domain::position::{AltitudeSample, PositionRecord};

pub const DEFAULT_STRIDE: usize = 10;

/// Take every `stride`-th record (indices 0, stride, 2*stride, ...).
/// Collection order is kept; nothing is sorted first.
pub fn sample_altitude_history(records: &[PositionRecord], stride: usize) -> Vec<AltitudeSample> {
    let stride = stride.max(1);
    records
        .iter()
        .step_by(stride)
        .map(AltitudeSample::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(n: usize) -> Vec<PositionRecord> {
        (0..n)
            .map(|i| PositionRecord::new(0.0, 0.0, i as f64, (i % 24) as u8))
            .collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(sample_altitude_history(&[], DEFAULT_STRIDE).is_empty());
    }

    #[test]
    fn test_length_is_ceiling_of_n_over_stride() {
        for n in [1, 9, 10, 11, 99, 100, 101, 115, 120] {
            let samples = sample_altitude_history(&records(n), DEFAULT_STRIDE);
            assert_eq!(samples.len(), n.div_ceil(10), "n = {}", n);
        }
    }

    #[test]
    fn test_samples_match_positional_indices() {
        let input = records(120);
        let samples = sample_altitude_history(&input, DEFAULT_STRIDE);

        assert_eq!(samples.len(), 12);
        for (i, sample) in samples.iter().enumerate() {
            assert_eq!(*sample, AltitudeSample::from(&input[i * 10]));
        }
    }

    #[test]
    fn test_zero_stride_keeps_everything() {
        assert_eq!(sample_altitude_history(&records(3), 0).len(), 3);
    }
}
