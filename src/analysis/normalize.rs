/// Score given to every value of a metric that has no variance.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Min-max normalize a population of values into `[0, 1]`.
///
/// Undefined values (`None`) do not take part in the min/max and score 0.
/// When all defined values are equal every defined value scores
/// [`NEUTRAL_SCORE`].
pub fn min_max(values: &[Option<f64>]) -> Vec<f64> {
    let defined = values.iter().flatten().copied();
    let (min, max) = defined.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let range = max - min;

    values
        .iter()
        .map(|v| match v {
            None => 0.0,
            Some(_) if range <= 0.0 => NEUTRAL_SCORE,
            Some(v) => ((v - min) / range).clamp(0.0, 1.0),
        })
        .collect()
}

/// Linear-interpolation quantile of an ascending-sorted slice
/// (`q` in `[0, 1]`). `None` for an empty slice.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let pos = q.clamp(0.0, 1.0) * last as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Median of an unsorted sample. `None` when empty.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    quantile_sorted(&sorted, 0.5)
}

/// Arithmetic mean. `None` when empty.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_max_maps_extremes_to_unit_interval() {
        let scores = min_max(&[Some(10.0), Some(20.0), Some(15.0)]);
        assert_eq!(scores, vec![0.0, 1.0, 0.5]);
    }

    #[test]
    fn constant_population_is_neutral() {
        assert_eq!(min_max(&[Some(3.0), Some(3.0)]), vec![0.5, 0.5]);
        assert_eq!(min_max(&[Some(7.0)]), vec![0.5]);
    }

    #[test]
    fn undefined_values_score_zero_and_are_ignored() {
        assert_eq!(min_max(&[None, Some(1.0), Some(3.0)]), vec![0.0, 0.0, 1.0]);
        assert_eq!(min_max(&[None, None]), vec![0.0, 0.0]);
        assert!(min_max(&[]).is_empty());
    }

    #[test]
    fn quantiles_interpolate() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile_sorted(&sorted, 0.0), Some(1.0));
        assert_eq!(quantile_sorted(&sorted, 0.5), Some(2.5));
        assert_eq!(quantile_sorted(&sorted, 1.0), Some(4.0));
        assert_eq!(quantile_sorted(&[], 0.5), None);
    }

    #[test]
    fn median_and_mean() {
        assert_eq!(median(&[5.0, 1.0, 3.0]), Some(3.0));
        assert_eq!(mean(&[100_000.0, 120_000.0]), Some(110_000.0));
        assert_eq!(mean(&[]), None);
    }
}
