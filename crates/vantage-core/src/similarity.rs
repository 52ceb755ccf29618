//! Ratcliff/Obershelp similarity over normalised addresses.
//!
//! The ratio is `2 * M / (|a| + |b|)`, where `M` is the number of characters
//! covered by the matching blocks: the longest common substring, then the
//! same search recursively on the unmatched left and right remainders.

/// Similarity of two strings in `[0.0, 1.0]`.
///
/// Identical strings score `1.0` (two empty strings included), strings with
/// no character in common score `0.0`. The pair is put in lexicographic
/// order before matching: the longest-block search breaks ties by position
/// in the first argument, so without the ordering `score(a, b)` and
/// `score(b, a)` could differ.
pub fn similarity(a: &str, b: &str) -> f64 {
  let (a, b) = if a <= b { (a, b) } else { (b, a) };
  let a: Vec<char> = a.chars().collect();
  let b: Vec<char> = b.chars().collect();

  let total = a.len() + b.len();
  if total == 0 {
    return 1.0;
  }
  2.0 * matched_characters(&a, &b) as f64 / total as f64
}

/// Total length of the matching blocks between `a` and `b`.
fn matched_characters(a: &[char], b: &[char]) -> usize {
  let mut matched = 0;
  let mut pending = vec![(0, a.len(), 0, b.len())];

  while let Some((alo, ahi, blo, bhi)) = pending.pop() {
    let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
    if k == 0 {
      continue;
    }
    matched += k;
    if alo < i && blo < j {
      pending.push((alo, i, blo, j));
    }
    if i + k < ahi && j + k < bhi {
      pending.push((i + k, ahi, j + k, bhi));
    }
  }

  matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]` as
/// `(start_in_a, start_in_b, len)`. Ties go to the earliest block in `a`,
/// then in `b`.
fn longest_match(
  a: &[char],
  b: &[char],
  alo: usize,
  ahi: usize,
  blo: usize,
  bhi: usize,
) -> (usize, usize, usize) {
  let width = bhi.saturating_sub(blo);
  // run[col] = length of the common run ending at (i, blo + col - 1).
  let mut prev = vec![0usize; width + 1];
  let mut curr = vec![0usize; width + 1];
  let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);

  for i in alo..ahi {
    for j in blo..bhi {
      let col = j - blo + 1;
      curr[col] = if a[i] == b[j] { prev[col - 1] + 1 } else { 0 };
      if curr[col] > best_k {
        best_k = curr[col];
        best_i = i + 1 - best_k;
        best_j = j + 1 - best_k;
      }
    }
    std::mem::swap(&mut prev, &mut curr);
  }

  (best_i, best_j, best_k)
}
