//! Rank-based normalisation helpers.

/// 1-based ranks in ascending value order, ties sharing their average rank.
/// Returned in input order.
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return vec![];
    }

    let mut indexed: Vec<(usize, f64)> = values.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut ranks = vec![0.0f64; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j < n - 1 && (indexed[j].1 - indexed[j + 1].1).abs() < 1e-10 {
            j += 1;
        }
        let avg_rank = (i + 1 + j + 1) as f64 / 2.0;
        for item in &indexed[i..=j] {
            ranks[item.0] = avg_rank;
        }
        i = j + 1;
    }
    ranks
}

/// Position of each rank within [min, max], scaled to [0, 100].
/// `None` when every rank is the same.
pub fn percent_span(ranks: &[f64]) -> Option<Vec<f64>> {
    let min = ranks.iter().copied().fold(f64::INFINITY, f64::min);
    let max = ranks.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if ranks.is_empty() || (max - min).abs() < 1e-10 {
        return None;
    }
    Some(
        ranks
            .iter()
            .map(|&r| ((r - min) / (max - min) * 100.0).clamp(0.0, 100.0))
            .collect(),
    )
}
