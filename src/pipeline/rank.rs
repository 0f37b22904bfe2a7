use std::cmp::Ordering;

/// Rank scores in descending order using standard competition ranking.
///
/// Rank 1 is the highest score. Equal scores share a rank, and the next lower
/// score gets `1 + (number of strictly greater scores)`, e.g. `[9, 9, 4] -> [1, 1, 3]`.
/// Ranks are returned in input order.
///
/// NaN scores rank after every number and tie with each other.
pub fn rank(scores: &[f64]) -> Vec<u32> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| descending(scores[a], scores[b]));

    let mut ranks = vec![0u32; scores.len()];
    let mut current = 0u32;
    let mut previous: Option<f64> = None;
    for (position, &row) in order.iter().enumerate() {
        let score = scores[row];
        if !previous.is_some_and(|previous| same_score(previous, score)) {
            current = position as u32 + 1;
            previous = Some(score);
        }
        ranks[row] = current;
    }
    ranks
}

/// Total descending order over scores with NaN last.
fn descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        // -0.0 and 0.0 compare equal so they stay adjacent
        (false, false) => if a == b { Ordering::Equal } else { b.total_cmp(&a) },
    }
}

#[inline]
fn same_score(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}
