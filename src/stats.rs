use std::cmp::Ordering;

/// Fractional rank of each value among `values`, in (0, 1].
///
/// Ties share the average of the ranks they span. Non-finite inputs rank as
/// NaN and do not count toward the group size.
pub fn percentile_rank(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len())
        .filter(|&i| values[i].is_finite())
        .collect();
    order.sort_by(|&a, &b| {
        values[a]
            .partial_cmp(&values[b])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });

    let n = order.len() as f64;
    let mut out = vec![f64::NAN; values.len()];
    let mut start = 0usize;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // 1-based ranks start+1..=end share their mean.
        let avg_rank = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            out[idx] = avg_rank / n;
        }
        start = end;
    }
    out
}

/// 1-based ordinal rank by descending value; equal values keep their input
/// order.
pub fn rank_descending_first(values: &[f64]) -> Vec<u32> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        descending(values[a], values[b]).then(a.cmp(&b))
    });
    let mut out = vec![0u32; values.len()];
    for (pos, idx) in order.into_iter().enumerate() {
        out[idx] = (pos + 1) as u32;
    }
    out
}

fn descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

pub fn trailing_mean(series: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..series.len())
        .map(|i| {
            let lo = (i + 1).saturating_sub(window);
            mean(&series[lo..=i])
        })
        .collect()
}

/// Sample standard deviation (n - 1) over a trailing window. Positions with
/// fewer than `min_periods` values yield `None`.
pub fn trailing_std(series: &[f64], window: usize, min_periods: usize) -> Vec<Option<f64>> {
    let window = window.max(1);
    (0..series.len())
        .map(|i| {
            let lo = (i + 1).saturating_sub(window);
            let slice = &series[lo..=i];
            if slice.len() < min_periods.max(2) {
                None
            } else {
                Some(sample_std(slice))
            }
        })
        .collect()
}

/// Relative change against the previous element. The first element, and any
/// element whose predecessor is zero, yields 0.
pub fn pct_change(series: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(series.len());
    for (i, value) in series.iter().enumerate() {
        let change = match i.checked_sub(1).map(|p| series[p]) {
            Some(prev) if prev != 0.0 => (value - prev) / prev,
            _ => 0.0,
        };
        out.push(change);
    }
    out
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

/// Round to `decimals` places, ties to even.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_rank_averages_ties() {
        let ranks = percentile_rank(&[10.0, 20.0, 20.0, 30.0]);
        assert_eq!(ranks, vec![0.25, 0.625, 0.625, 1.0]);
    }

    #[test]
    fn percentile_rank_skips_nan() {
        let ranks = percentile_rank(&[1.0, f64::NAN, 2.0]);
        assert_eq!(ranks[0], 0.5);
        assert!(ranks[1].is_nan());
        assert_eq!(ranks[2], 1.0);
    }

    #[test]
    fn rank_descending_keeps_first_seen_on_ties() {
        assert_eq!(rank_descending_first(&[5.0, 9.0, 5.0, 1.0]), vec![2, 1, 3, 4]);
    }

    #[test]
    fn trailing_std_respects_min_periods() {
        let out = trailing_std(&[0.5, 0.7, 0.9, 0.7, 0.5], 4, 2);
        assert_eq!(out[0], None);
        assert!((out[1].unwrap() - 0.141_421_356).abs() < 1e-6);
        // window of four drops the first element
        assert!((out[4].unwrap() - sample_std(&[0.7, 0.9, 0.7, 0.5])).abs() < 1e-12);
    }

    #[test]
    fn pct_change_starts_at_zero() {
        assert_eq!(pct_change(&[100.0, 110.0, 0.0, 50.0]), vec![0.0, 0.1, -1.0, 0.0]);
    }
}
