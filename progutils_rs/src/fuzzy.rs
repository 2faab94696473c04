//! Global alignment score between two command names.
//!
//! Needleman-Wunsch over characters with an affine gap cost, keeping three
//! score planes: `up` (gap in `b`), `left` (gap in `a`) and `diag` (aligned pair).
//! Only the terminal score is needed, so no traceback matrix is kept.

// ============================================================================
// Scoring scheme
// ============================================================================

pub const GAP_OPEN: i32 = 5;
pub const GAP_EXTEND: i32 = 1;
pub const MATCH: i32 = 2;
pub const MISMATCH: i32 = -2;

/// Optimal global alignment score of `a` against `b`.
pub fn score(a: &str, b: &str) -> i32 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (la, lb) = (a.len(), b.len());

    let width = lb + 1;
    let mut up = vec![0i32; (la + 1) * width];
    let mut left = vec![0i32; (la + 1) * width];
    let mut diag = vec![0i32; (la + 1) * width];
    let at = |i: usize, j: usize| i * width + j;

    for i in 1..=la {
        up[at(i, 0)] = -GAP_OPEN - (i as i32 - 1) * GAP_EXTEND;
        left[at(i, 0)] = up[at(i, 0)];
        diag[at(i, 0)] = up[at(i, 0)];
    }
    for j in 1..=lb {
        left[at(0, j)] = -GAP_OPEN - (j as i32 - 1) * GAP_EXTEND;
        up[at(0, j)] = left[at(0, j)];
        diag[at(0, j)] = left[at(0, j)];
    }

    for i in 1..=la {
        for j in 1..=lb {
            up[at(i, j)] = if i == 1 {
                left[at(i - 1, j)] - GAP_OPEN
            } else {
                (up[at(i - 1, j)] - GAP_EXTEND)
                    .max(left[at(i - 1, j)] - GAP_OPEN)
                    .max(diag[at(i - 1, j)] - GAP_OPEN)
            };

            left[at(i, j)] = if j == 1 {
                up[at(i, j - 1)] - GAP_OPEN
            } else {
                (up[at(i, j - 1)] - GAP_OPEN)
                    .max(left[at(i, j - 1)] - GAP_EXTEND)
                    .max(diag[at(i, j - 1)] - GAP_OPEN)
            };

            let pair = if a[i - 1] == b[j - 1] { MATCH } else { MISMATCH };
            let best_prev = if i == 1 {
                left[at(i - 1, j - 1)]
            } else if j == 1 {
                up[at(i - 1, j - 1)]
            } else {
                up[at(i - 1, j - 1)]
                    .max(left[at(i - 1, j - 1)])
                    .max(diag[at(i - 1, j - 1)])
            };
            diag[at(i, j)] = best_prev + pair;
        }
    }

    let end = at(la, lb);
    up[end].max(left[end]).max(diag[end])
}

/// Highest-scoring candidate for `name`; the first one wins ties.
///
/// An empty candidate set yields `("", 0)`.
pub fn closest<I, S>(name: &str, candidates: I) -> (String, i32)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut best: Option<(String, i32)> = None;
    for candidate in candidates {
        let candidate = candidate.as_ref();
        let s = score(name, candidate);
        match &best {
            Some((_, top)) if s <= *top => {}
            _ => best = Some((candidate.to_string(), s)),
        }
    }
    best.unwrap_or_default()
}
