//! Deterministic train/validation split over window indices.

use crate::rng::RandomGenerator;

/// Window indices assigned to each side of the split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    /// Indices of training windows.
    pub train: Vec<usize>,
    /// Indices of validation windows.
    pub validation: Vec<usize>,
}

/// Partitions `count` window indices into train and validation sets.
///
/// The partition is a seeded Fisher-Yates shuffle followed by a cut, so
/// the same `count`, `validation_fraction`, and `seed` always produce the
/// same assignment, and no window lands in both sets.
///
/// This is a *random* partition, not a chronological cut: validation
/// windows are spread across the whole history rather than concentrated
/// in the most recent regime. The trade-off is that a validation window's
/// input range can overlap training windows in time; window-level leakage
/// is still impossible because each (input, target) pair appears on
/// exactly one side.
///
/// Both sides are kept non-empty whenever `count >= 2`.
pub fn split_windows(count: usize, validation_fraction: f64, seed: u64) -> SplitIndices {
    let mut indices: Vec<usize> = (0..count).collect();
    let mut rng = RandomGenerator::new(seed);
    rng.shuffle(&mut indices);

    let mut validation_size = (count as f64 * validation_fraction).round() as usize;
    if count >= 2 {
        validation_size = validation_size.clamp(1, count - 1);
    } else {
        validation_size = validation_size.min(count);
    }

    let validation = indices.split_off(count - validation_size);
    SplitIndices {
        train: indices,
        validation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_split_sizes() {
        let split = split_windows(100, 0.2, 42);
        assert_eq!(split.train.len(), 80);
        assert_eq!(split.validation.len(), 20);
    }

    #[test]
    fn test_split_is_a_partition() {
        let split = split_windows(57, 0.2, 42);

        let train: HashSet<usize> = split.train.iter().copied().collect();
        let validation: HashSet<usize> = split.validation.iter().copied().collect();

        assert!(train.is_disjoint(&validation));
        assert_eq!(train.len() + validation.len(), 57);
        assert!(train.union(&validation).all(|&i| i < 57));
    }

    #[test]
    fn test_split_is_deterministic() {
        let a = split_windows(200, 0.2, 42);
        let b = split_windows(200, 0.2, 42);
        assert_eq!(a, b);

        let c = split_windows(200, 0.2, 43);
        assert_ne!(a, c);
    }

    #[test]
    fn test_split_is_not_chronological() {
        // A random partition should not put all the latest windows into
        // validation.
        let split = split_windows(100, 0.2, 42);
        let all_recent = split.validation.iter().all(|&i| i >= 80);
        assert!(!all_recent);
    }

    #[test]
    fn test_both_sides_non_empty() {
        for count in 2..10 {
            let split = split_windows(count, 0.2, 42);
            assert!(!split.train.is_empty(), "count {}", count);
            assert!(!split.validation.is_empty(), "count {}", count);
        }
    }
}
