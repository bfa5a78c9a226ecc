//! Small, dependency-free statistical helpers shared across analyzers.
//!
//! These mirror the kind of hand-rolled numeric helpers the teacher keeps
//! next to its Bayesian normalization code rather than reaching for a
//! heavyweight stats crate for a handful of closed-form formulas.

/// Gini coefficient of inequality in `[0, 1]`; `0` = perfectly uniform.
///
/// Sorts `values` in place. Returns `0.0` for fewer than two values or an
/// all-zero distribution.
pub fn gini(values: &mut [f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let sum: f64 = values.iter().sum();
    if sum <= f64::EPSILON {
        return 0.0;
    }
    let mut weighted_sum = 0.0;
    for (i, v) in values.iter().enumerate() {
        weighted_sum += (i as f64 + 1.0) * v;
    }
    let n_f = n as f64;
    (2.0 * weighted_sum) / (n_f * sum) - (n_f + 1.0) / n_f
}

/// Shannon entropy (base-e, in nats) of a weight distribution.
///
/// Weights need not be normalized; zero and negative weights are ignored.
pub fn shannon_entropy(weights: &[f64]) -> f64 {
    let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
    if total <= f64::EPSILON {
        return 0.0;
    }
    -weights
        .iter()
        .filter(|w| **w > 0.0)
        .map(|w| {
            let p = w / total;
            p * p.ln()
        })
        .sum::<f64>()
}

/// `exp(entropy)` of a count distribution, floored at `1.0` — the
/// "effective number of categories" used for bus factor (GLOSSARY).
pub fn effective_count(counts: &[f64]) -> f64 {
    shannon_entropy(counts).exp().max(1.0)
}

/// Jaccard similarity of two token sets.
pub fn jaccard<T: Eq + std::hash::Hash>(
    a: &std::collections::HashSet<T>,
    b: &std::collections::HashSet<T>,
) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64;
    if union == 0.0 {
        0.0
    } else {
        intersection / union
    }
}

/// Coefficient of variation: `std_dev / mean`, `0.0` when mean is ~0.
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    let (mean, std_dev) = mean_and_std(values);
    if mean.abs() <= f64::EPSILON {
        0.0
    } else {
        std_dev / mean
    }
}

/// Population mean and standard deviation of a slice.
pub fn mean_and_std(values: &[f64]) -> (f64, f64) {
    let n = values.len();
    if n == 0 {
        return (0.0, 0.0);
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
    (mean, variance.sqrt())
}

/// Median of a slice (copies and sorts internally).
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Ordinary least-squares slope of `y` against its index (`x = 0..n`).
///
/// Used for churn trajectory slope over time-windowed commit counts.
pub fn linear_slope(y: &[f64]) -> f64 {
    let n = y.len();
    if n < 2 {
        return 0.0;
    }
    let n_f = n as f64;
    let xs: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let x_mean = xs.iter().sum::<f64>() / n_f;
    let y_mean = y.iter().sum::<f64>() / n_f;
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (x, v) in xs.iter().zip(y.iter()) {
        numerator += (x - x_mean) * (v - y_mean);
        denominator += (x - x_mean).powi(2);
    }
    if denominator.abs() <= f64::EPSILON {
        0.0
    } else {
        numerator / denominator
    }
}

/// Percentile rank of `x` within `sorted_values` (already sorted ascending):
/// `|{v : v <= x}| / N`. The `<=` is load-bearing (§4.6.2 invariant 3) —
/// using `<` would rank the maximum value below `1.0`.
pub fn percentile_rank(sorted_values: &[f64], x: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }
    let count = sorted_values.partition_point(|&v| v <= x);
    count as f64 / sorted_values.len() as f64
}

/// Otsu's method: find the threshold in `values` that maximizes
/// between-class variance, splitting the sorted values into two classes.
///
/// Returns `None` when fewer than 2 distinct values are present.
pub fn otsu_threshold(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted.dedup_by(|a, b| (*a - *b).abs() <= f64::EPSILON);
    if sorted.len() < 2 {
        return None;
    }

    let total_n = values.len() as f64;
    let total_sum: f64 = values.iter().sum();

    let mut best_threshold = sorted[0];
    let mut best_variance = -1.0;

    for window in sorted.windows(2) {
        let threshold = (window[0] + window[1]) / 2.0;
        let (below, above): (Vec<f64>, Vec<f64>) =
            values.iter().partition(|v| **v <= threshold);
        if below.is_empty() || above.is_empty() {
            continue;
        }
        let w0 = below.len() as f64 / total_n;
        let w1 = above.len() as f64 / total_n;
        let sum0: f64 = below.iter().sum();
        let sum1 = total_sum - sum0;
        let mean0 = sum0 / below.len() as f64;
        let mean1 = sum1 / above.len() as f64;
        let between_variance = w0 * w1 * (mean0 - mean1).powi(2);
        if between_variance > best_variance {
            best_variance = between_variance;
            best_threshold = threshold;
        }
    }

    Some(best_threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn gini_of_uniform_distribution_is_zero() {
        let mut values = vec![5.0, 5.0, 5.0, 5.0];
        assert_relative_eq!(gini(&mut values), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn gini_of_maximally_unequal_distribution_approaches_one() {
        let mut values = vec![0.0, 0.0, 0.0, 100.0];
        assert!(gini(&mut values) > 0.6);
    }

    #[test]
    fn effective_count_is_floored_at_one() {
        assert_eq!(effective_count(&[10.0]), 1.0);
    }

    #[test]
    fn effective_count_grows_with_more_even_authors() {
        let one_author = effective_count(&[10.0]);
        let two_even_authors = effective_count(&[5.0, 5.0]);
        assert!(two_even_authors > one_author);
    }

    #[test]
    fn median_handles_even_and_odd_lengths() {
        assert_eq!(median(&[1.0, 2.0, 3.0]), 2.0);
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), 2.5);
    }

    #[test]
    fn linear_slope_detects_rising_trend() {
        let slope = linear_slope(&[1.0, 2.0, 3.0, 4.0]);
        assert_relative_eq!(slope, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn percentile_rank_uses_less_than_or_equal() {
        let sorted = vec![1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile_rank(&sorted, 4.0), 1.0);
        assert_eq!(percentile_rank(&sorted, 0.5), 0.0);
        assert_eq!(percentile_rank(&sorted, 2.0), 0.5);
    }

    #[test]
    fn otsu_splits_bimodal_data() {
        let values = vec![1.0, 1.0, 2.0, 50.0, 51.0, 52.0];
        let threshold = otsu_threshold(&values).unwrap();
        assert!(threshold > 2.0 && threshold < 50.0);
    }
}
