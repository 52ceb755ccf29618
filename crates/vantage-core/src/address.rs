//! Address normalisation: the canonical comparison form every matching
//! path runs addresses through before scoring.

/// Normalise a free-text address for comparison.
///
/// Uppercases, turns commas into spaces, drops periods, collapses every
/// whitespace run to a single space and trims. Total and idempotent; `None`
/// and blank input both yield the empty string.
pub fn normalize_address(raw: Option<&str>) -> String {
  let Some(raw) = raw else {
    return String::new();
  };

  let stripped: String = raw
    .chars()
    .filter(|c| *c != '.')
    .map(|c| if c == ',' { ' ' } else { c })
    .collect();

  stripped
    .to_uppercase()
    .split_whitespace()
    .collect::<Vec<_>>()
    .join(" ")
}
