//! Per-test-case credit allocation.

/// Total distributed across test cases when none of them carries authored marks.
pub const FALLBACK_TOTAL_MARKS: i32 = 50;

/// Marks each test case is worth for one judging pass, in input order.
///
/// Authored marks are used verbatim (negatives clamp to 0) unless they sum to zero,
/// in which case [`FALLBACK_TOTAL_MARKS`] is spread as evenly as possible with the
/// remainder going to the earliest test cases.
pub fn allocate_marks(authored: &[i32]) -> Vec<i32> {
    let clamped: Vec<i32> = authored.iter().map(|&m| m.max(0)).collect();
    if clamped.iter().any(|&m| m > 0) {
        return clamped;
    }
    fallback_distribution(clamped.len())
}

fn fallback_distribution(n: usize) -> Vec<i32> {
    if n == 0 {
        return Vec::new();
    }
    let n_i32 = i32::try_from(n).unwrap_or(i32::MAX);
    let base = FALLBACK_TOTAL_MARKS / n_i32;
    let remainder = usize::try_from(FALLBACK_TOTAL_MARKS - base * n_i32).unwrap_or(0);
    (0..n)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}
