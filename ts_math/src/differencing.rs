//! Differencing and its inverse

/// Difference a series `d` times.
///
/// Each pass shortens the series by one; differencing more times than the
/// series allows yields an empty vector.
pub fn difference(data: &[f64], d: usize) -> Vec<f64> {
    let mut result = data.to_vec();
    for _ in 0..d {
        if result.len() < 2 {
            return Vec::new();
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Cumulatively sum `diff` starting from `start`, the inverse of one
/// differencing pass.
pub fn integrate(diff: &[f64], start: f64) -> Vec<f64> {
    let mut result = Vec::with_capacity(diff.len());
    let mut cumsum = start;
    for &d in diff {
        cumsum += d;
        result.push(cumsum);
    }
    result
}

/// Last value of the series at every differencing level `0..d`.
///
/// Element `k` is the last value of the series differenced `k` times. These
/// anchors are what [`undifference`] needs to map forecasts made on the
/// `d`-times differenced scale back to levels.
pub fn level_anchors(data: &[f64], d: usize) -> Vec<f64> {
    let mut anchors = Vec::with_capacity(d);
    let mut current = data.to_vec();
    for _ in 0..d {
        match current.last() {
            Some(&last) => anchors.push(last),
            None => break,
        }
        current = difference(&current, 1);
    }
    anchors
}

/// Map values on the differenced scale back to levels using the anchors from
/// [`level_anchors`].
pub fn undifference(values: &[f64], anchors: &[f64]) -> Vec<f64> {
    anchors
        .iter()
        .rev()
        .fold(values.to_vec(), |acc, &anchor| integrate(&acc, anchor))
}

/// Whether every value equals the first one.
pub fn is_constant(data: &[f64]) -> bool {
    match data.first() {
        Some(&first) => data.iter().all(|&v| v == first),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_difference() {
        let data = vec![1.0, 3.0, 6.0, 10.0, 15.0];
        assert_eq!(difference(&data, 1), vec![2.0, 3.0, 4.0, 5.0]);
        assert_eq!(difference(&data, 2), vec![1.0, 1.0, 1.0]);
        assert!(difference(&data, 5).is_empty());
    }

    #[test]
    fn test_undifference_restores_second_order_levels() {
        let data = vec![1.0, 3.0, 6.0, 10.0, 15.0];
        let anchors = level_anchors(&data, 2);
        assert_eq!(anchors, vec![15.0, 5.0]);

        // The next second difference of 1.0 continues the pattern
        let levels = undifference(&[1.0, 1.0], &anchors);
        assert_eq!(levels, vec![21.0, 28.0]);
    }

    #[test]
    fn test_is_constant() {
        assert!(is_constant(&[2.0, 2.0, 2.0]));
        assert!(!is_constant(&[2.0, 2.5]));
        assert!(is_constant(&[]));
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    fn test_undifference_inverts_difference(#[case] d: usize) {
        let data = vec![4.0, 7.5, 6.0, 9.25, 12.0, 11.0, 15.5, 14.0];
        let split = data.len() - 2;
        let (history, tail) = data.split_at(split);

        // Differences of the full series, restricted to the held-out tail
        let full = difference(&data, d);
        let tail_diffs = &full[full.len() - tail.len()..];

        let restored = undifference(tail_diffs, &level_anchors(history, d));
        for (r, t) in restored.iter().zip(tail) {
            assert!((r - t).abs() < 1e-9);
        }
    }
}
