//! Outlier detection on daily returns.
//!
//! Three interchangeable methods share one contract: return series in,
//! flagged return indices out. A spread of zero flags nothing.

use crate::config::OutlierMethod;
use crate::diagnostics::ZERO_EPSILON;
use crate::stats;

/// Scale factor making the MAD a consistent estimator of sigma.
const MODIFIED_Z_SCALE: f64 = 0.6745;

/// At most this share of the returns can be flagged by the z-score method.
const MAX_Z_SCORE_SHARE: f64 = 0.25;

/// A flagged return and how far it sits outside the method's bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierHit {
    /// Index into the return series (return `i` ends at price `i + 1`).
    pub index: usize,
    /// Price bar the anomaly is reported at.
    pub bar: usize,
    pub score: f64,
}

impl OutlierHit {
    fn new(index: usize, score: f64) -> Self {
        Self {
            index,
            bar: index + 1,
            score,
        }
    }
}

pub fn detect(returns: &[f64], method: OutlierMethod, threshold: f64) -> Vec<OutlierHit> {
    match method {
        OutlierMethod::ZScore => z_score(returns, threshold),
        OutlierMethod::Iqr => iqr(returns, threshold),
        OutlierMethod::ModifiedZScore => modified_z_score(returns, threshold),
    }
}

/// Generalized ESD: repeatedly peel off the return furthest from the mean of
/// the returns still in play, scored against their sample deviation. All
/// returns peeled up to the last step scoring above `threshold` are flagged,
/// so a handful of spikes cannot hide each other by inflating the deviation.
fn z_score(returns: &[f64], threshold: f64) -> Vec<OutlierHit> {
    let Some(center) = stats::mean(returns) else {
        return Vec::new();
    };
    let max_steps = (returns.len() as f64 * MAX_Z_SCORE_SHARE) as usize;
    let mut in_play = vec![true; returns.len()];
    let mut count = returns.len();
    // Sums of deviations from the full-sample mean keep cancellation small.
    let mut sum: f64 = returns.iter().map(|r| r - center).sum();
    let mut sum_sq: f64 = returns.iter().map(|r| (r - center).powi(2)).sum();

    let mut peeled: Vec<OutlierHit> = Vec::with_capacity(max_steps);
    let mut flagged = 0;
    while peeled.len() < max_steps && count > 2 {
        let m = count as f64;
        let mean = sum / m;
        let std = ((sum_sq - sum * mean) / (m - 1.0)).max(0.0).sqrt();
        if std < ZERO_EPSILON {
            break;
        }
        let Some((index, score)) = returns
            .iter()
            .enumerate()
            .filter(|(i, _)| in_play[*i])
            .map(|(i, r)| (i, ((r - center) - mean).abs() / std))
            .max_by(|a, b| a.1.total_cmp(&b.1))
        else {
            break;
        };

        in_play[index] = false;
        count -= 1;
        let d = returns[index] - center;
        sum -= d;
        sum_sq -= d * d;
        peeled.push(OutlierHit::new(index, score));
        if score > threshold {
            flagged = peeled.len();
        }
    }

    peeled.truncate(flagged);
    peeled.sort_by_key(|hit| hit.index);
    peeled
}

fn iqr(returns: &[f64], multiplier: f64) -> Vec<OutlierHit> {
    let sorted = stats::sorted(returns);
    let (Some(q1), Some(q3)) = (
        stats::percentile_sorted(&sorted, 0.25),
        stats::percentile_sorted(&sorted, 0.75),
    ) else {
        return Vec::new();
    };
    let spread = q3 - q1;
    if spread < ZERO_EPSILON {
        return Vec::new();
    }
    // Score in IQR units beyond the nearest quartile; flagged when > multiplier.
    flag(
        returns,
        |r| {
            if r < q1 {
                (q1 - r) / spread
            } else if r > q3 {
                (r - q3) / spread
            } else {
                0.0
            }
        },
        multiplier,
    )
}

fn modified_z_score(returns: &[f64], threshold: f64) -> Vec<OutlierHit> {
    let Some(median) = stats::median(returns) else {
        return Vec::new();
    };
    let deviations: Vec<f64> = returns.iter().map(|r| (r - median).abs()).collect();
    let Some(mad) = stats::median(&deviations) else {
        return Vec::new();
    };
    if mad < ZERO_EPSILON {
        return Vec::new();
    }
    flag(returns, |r| MODIFIED_Z_SCALE * (r - median).abs() / mad, threshold)
}

fn flag(returns: &[f64], score: impl Fn(f64) -> f64, threshold: f64) -> Vec<OutlierHit> {
    returns
        .iter()
        .enumerate()
        .filter_map(|(index, &r)| {
            let s = score(r);
            (s > threshold).then_some(OutlierHit::new(index, s))
        })
        .collect()
}

/// Drop hits that are the reversal leg of a one-bar spike.
///
/// A single bad print at price `k` produces two extreme returns, `k-1 → k`
/// and `k → k+1`, with opposite signs. The second one is not counted again.
/// A bad first print has no leg into it, so an unpaired hit on the first
/// return is reported at bar 0.
pub fn collapse_reversals(returns: &[f64], hits: Vec<OutlierHit>) -> Vec<OutlierHit> {
    let mut kept: Vec<OutlierHit> = Vec::with_capacity(hits.len());
    let mut previous: Option<usize> = None;
    let mut leading_paired = false;

    for hit in hits {
        let is_reversal = previous.is_some_and(|p| {
            p + 1 == hit.index && returns[p].signum() != returns[hit.index].signum()
        });
        if is_reversal {
            leading_paired |= previous == Some(0);
            // Consumed: a third consecutive hit starts a new spike.
            previous = None;
            continue;
        }
        previous = Some(hit.index);
        kept.push(hit);
    }

    if let Some(first) = kept.first_mut() {
        if first.index == 0 && !leading_paired {
            first.bar = 0;
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noise(n: usize) -> Vec<f64> {
        (0..n).map(|i| ((i * 7919) % 13) as f64 * 0.0002 - 0.0012).collect()
    }

    #[test]
    fn z_score_flags_large_return() {
        let mut r = noise(100);
        r[40] = 0.15;
        let hits = detect(&r, OutlierMethod::ZScore, 3.0);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].index, 40);
    }

    #[test]
    fn iqr_flags_large_return() {
        let mut r = noise(100);
        r[10] = -0.2;
        let hits = detect(&r, OutlierMethod::Iqr, 3.0);
        assert_eq!(hits.iter().map(|h| h.index).collect::<Vec<_>>(), vec![10]);
    }

    #[test]
    fn modified_z_flags_large_return() {
        let mut r = noise(100);
        r[70] = 0.08;
        let hits = detect(&r, OutlierMethod::ModifiedZScore, 3.5);
        assert_eq!(hits.iter().map(|h| h.index).collect::<Vec<_>>(), vec![70]);
    }

    #[test]
    fn zero_spread_flags_nothing() {
        let r = vec![0.0; 50];
        for method in [OutlierMethod::ZScore, OutlierMethod::Iqr, OutlierMethod::ModifiedZScore] {
            assert!(detect(&r, method, 3.0).is_empty());
        }
    }

    #[test]
    fn spike_reversal_counts_once() {
        let mut r = noise(60);
        r[20] = 0.10;
        r[21] = -0.09;
        let hits = detect(&r, OutlierMethod::ZScore, 3.0);
        assert_eq!(hits.len(), 2);
        let kept = collapse_reversals(&r, hits);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].index, 20);
    }

    #[test]
    fn same_sign_neighbours_both_count() {
        let r = vec![0.0, 0.1, 0.1, 0.0];
        let hits = vec![OutlierHit::new(1, 4.0), OutlierHit::new(2, 4.0)];
        let kept = collapse_reversals(&r, hits);
        assert_eq!(kept.iter().map(|h| h.bar).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn clustered_spikes_do_not_mask_each_other() {
        // Six extreme returns in 39 inflate the full-sample deviation enough
        // that none clears 3 sigma on its own.
        let mut r = noise(39);
        for k in [9, 19, 29] {
            r[k] = 0.10;
            r[k + 1] = -0.09;
        }
        let hits = detect(&r, OutlierMethod::ZScore, 3.0);
        assert_eq!(
            hits.iter().map(|h| h.index).collect::<Vec<_>>(),
            vec![9, 10, 19, 20, 29, 30]
        );
        let bars: Vec<usize> = collapse_reversals(&r, hits).iter().map(|h| h.bar).collect();
        assert_eq!(bars, vec![10, 20, 30]);
    }

    #[test]
    fn unpaired_first_return_points_at_first_bar() {
        let mut r = noise(60);
        r[0] = -0.09;
        let kept = collapse_reversals(&r, detect(&r, OutlierMethod::ZScore, 3.0));
        assert_eq!(kept.len(), 1);
        assert_eq!((kept[0].index, kept[0].bar), (0, 0));

        // A spike on bar 1 moves out of and back into bar 0.
        r[0] = 0.10;
        r[1] = -0.09;
        let kept = collapse_reversals(&r, detect(&r, OutlierMethod::ZScore, 3.0));
        assert_eq!(kept.len(), 1);
        assert_eq!((kept[0].index, kept[0].bar), (0, 1));
    }
}
