//! Record linkage: match strategies and the batch linker.
//!
//! Linking works per target: normalise the target address once, fetch the
//! candidates sharing its postcode (the blocking key), score every candidate,
//! let a [`MatchStrategy`] pick one and, in batch mode, write the accepted
//! title back onto the target property.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  address::normalize_address,
  model::{AreaCandidate, LinkTarget, TitleCandidate},
  similarity::similarity,
  store::PropertyStore,
};

/// Minimum score for a persisted title link (inclusive).
pub const BATCH_CONFIDENCE_THRESHOLD: f64 = 0.85;

/// Minimum score for a read-time floor-area match (exclusive).
pub const VALUATION_CONFIDENCE_THRESHOLD: f64 = 0.8;

// ─── Candidates ──────────────────────────────────────────────────────────────

/// Something an address can be matched against.
pub trait Candidate {
  /// Stable identifier; breaks ties between equally scored candidates.
  fn candidate_id(&self) -> &str;
  /// Raw (un-normalised) address.
  fn address(&self) -> &str;
}

impl Candidate for TitleCandidate {
  fn candidate_id(&self) -> &str { &self.uprn }

  fn address(&self) -> &str { &self.address }
}

impl Candidate for AreaCandidate {
  fn candidate_id(&self) -> &str { &self.certificate_id }

  fn address(&self) -> &str { &self.address }
}

// ─── Strategies ──────────────────────────────────────────────────────────────

/// How a match is chosen from a scored candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum MatchStrategy {
  /// Score every candidate and take the highest, accepting it when
  /// `score >= threshold`. Equal scores go to the lowest candidate id.
  BestMatch { threshold: f64 },
  /// Take the first candidate, in the order given, with
  /// `score > threshold`, and stop scanning.
  FirstAboveThreshold { threshold: f64 },
}

impl MatchStrategy {
  /// The strategy used for persisted title links.
  pub fn batch() -> Self {
    Self::BestMatch {
      threshold: BATCH_CONFIDENCE_THRESHOLD,
    }
  }

  /// The strategy used when sizing comparable sales.
  pub fn valuation() -> Self {
    Self::FirstAboveThreshold {
      threshold: VALUATION_CONFIDENCE_THRESHOLD,
    }
  }

  pub fn threshold(self) -> f64 {
    match self {
      Self::BestMatch { threshold } | Self::FirstAboveThreshold { threshold } => threshold,
    }
  }

  /// Whether a single score clears this strategy's bar.
  pub fn accepts(self, score: f64) -> bool {
    match self {
      Self::BestMatch { threshold } => score >= threshold,
      Self::FirstAboveThreshold { threshold } => score > threshold,
    }
  }

  /// Normalise and score each candidate against an already-normalised
  /// target, then select.
  pub fn select<'c, C: Candidate>(
    self,
    normalized_target: &str,
    candidates: &'c [C],
  ) -> Selection<'c, C> {
    self.select_scored(candidates.iter().map(|c| {
      let score = similarity(normalized_target, &normalize_address(Some(c.address())));
      (c, score)
    }))
  }

  /// Select from candidates that already carry a score. The iterator is
  /// consumed lazily, so `FirstAboveThreshold` scores nothing past its
  /// match.
  pub fn select_scored<'c, C, I>(self, scored: I) -> Selection<'c, C>
  where
    C: Candidate,
    I: IntoIterator<Item = (&'c C, f64)>,
  {
    let mut best: Option<ScoredMatch<'c, C>> = None;

    for (candidate, score) in scored {
      if let Self::FirstAboveThreshold { .. } = self
        && self.accepts(score)
      {
        return Selection::Accepted(ScoredMatch { candidate, score });
      }

      let replace = match &best {
        None => true,
        Some(current) => {
          score > current.score
            || (score == current.score
              && candidate.candidate_id() < current.candidate.candidate_id())
        }
      };
      if replace {
        best = Some(ScoredMatch { candidate, score });
      }
    }

    match best {
      None => Selection::NoCandidates,
      Some(m) if matches!(self, Self::BestMatch { .. }) && self.accepts(m.score) => {
        Selection::Accepted(m)
      }
      Some(m) => Selection::Rejected { best_score: m.score },
    }
  }
}

/// A candidate together with its similarity to the target.
#[derive(Debug)]
pub struct ScoredMatch<'c, C> {
  pub candidate: &'c C,
  pub score:     f64,
}

/// The outcome of running a strategy over a candidate set.
#[derive(Debug)]
pub enum Selection<'c, C> {
  Accepted(ScoredMatch<'c, C>),
  /// Candidates existed but none cleared the threshold.
  Rejected { best_score: f64 },
  NoCandidates,
}

// ─── Batch linker ────────────────────────────────────────────────────────────

/// Tuning for [`BatchLinker`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkerConfig {
  pub threshold:       f64,
  /// Cap on targets fetched per run.
  pub target_limit:    usize,
  /// Cap on candidates fetched per target.
  pub candidate_limit: usize,
}

impl Default for LinkerConfig {
  fn default() -> Self {
    Self {
      threshold:       BATCH_CONFIDENCE_THRESHOLD,
      target_limit:    10_000,
      candidate_limit: 500,
    }
  }
}

/// What happened to one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LinkOutcome {
  Linked { title_number: String, score: f64 },
  BelowThreshold { best_score: f64 },
  NoCandidates,
  /// The target address normalised to nothing; it was never compared.
  EmptyAddress,
  /// Another writer linked the target between selection and write.
  AlreadyLinked,
}

/// Summary of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkReport {
  pub run_id:          Uuid,
  pub started_at:      DateTime<Utc>,
  pub finished_at:     DateTime<Utc>,
  pub scanned:         usize,
  pub linked:          usize,
  pub below_threshold: usize,
  pub no_candidates:   usize,
  pub empty_address:   usize,
  pub already_linked:  usize,
  pub failed:          usize,
}

impl LinkReport {
  fn start() -> Self {
    let now = Utc::now();
    Self {
      run_id:          Uuid::new_v4(),
      started_at:      now,
      finished_at:     now,
      scanned:         0,
      linked:          0,
      below_threshold: 0,
      no_candidates:   0,
      empty_address:   0,
      already_linked:  0,
      failed:          0,
    }
  }

  fn record(&mut self, outcome: &LinkOutcome) {
    match outcome {
      LinkOutcome::Linked { .. } => self.linked += 1,
      LinkOutcome::BelowThreshold { .. } => self.below_threshold += 1,
      LinkOutcome::NoCandidates => self.no_candidates += 1,
      LinkOutcome::EmptyAddress => self.empty_address += 1,
      LinkOutcome::AlreadyLinked => self.already_linked += 1,
    }
  }
}

/// Links unlinked distressed properties to ownership titles.
///
/// Each target is committed on its own; a failure on one target is logged
/// and counted, and the run moves on. Re-running converges: linked targets
/// drop out of the selection.
pub struct BatchLinker<'s, S> {
  store:  &'s S,
  config: LinkerConfig,
}

impl<'s, S: PropertyStore> BatchLinker<'s, S> {
  pub fn new(store: &'s S, config: LinkerConfig) -> Self { Self { store, config } }

  pub fn strategy(&self) -> MatchStrategy {
    MatchStrategy::BestMatch {
      threshold: self.config.threshold,
    }
  }

  /// Run one pass over every currently unlinked target.
  pub async fn run(&self) -> Result<LinkReport> {
    let mut report = LinkReport::start();

    let targets = self
      .store
      .unlinked_distressed_targets(self.config.target_limit)
      .await
      .map_err(Error::store)?;

    if targets.is_empty() {
      info!("no unlinked distressed properties to link");
    } else {
      info!(targets = targets.len(), "linking distressed properties to titles");
    }

    for target in &targets {
      report.scanned += 1;
      match self.link_one(target).await {
        Ok(outcome) => report.record(&outcome),
        Err(e) => {
          warn!(uprn = %target.uprn, error = %e, "linking failed; continuing");
          report.failed += 1;
        }
      }
    }

    report.finished_at = Utc::now();
    info!(
      run_id = %report.run_id,
      scanned = report.scanned,
      linked = report.linked,
      failed = report.failed,
      "linkage run complete"
    );
    Ok(report)
  }

  /// Fetch, score, decide and apply for a single target.
  pub async fn link_one(&self, target: &LinkTarget) -> Result<LinkOutcome> {
    let normalized = normalize_address(Some(&target.address));
    if normalized.is_empty() {
      debug!(uprn = %target.uprn, "target address is empty");
      return Ok(LinkOutcome::EmptyAddress);
    }

    let candidates = self
      .store
      .title_candidates(&target.postcode, self.config.candidate_limit)
      .await
      .map_err(Error::store)?;

    let (title_number, score) = match self.strategy().select(&normalized, &candidates) {
      Selection::Accepted(m) => (m.candidate.title_number.clone(), m.score),
      Selection::Rejected { best_score } => {
        debug!(uprn = %target.uprn, best_score, "best candidate below threshold");
        return Ok(LinkOutcome::BelowThreshold { best_score });
      }
      Selection::NoCandidates => {
        debug!(uprn = %target.uprn, postcode = %target.postcode, "no titled candidates in postcode");
        return Ok(LinkOutcome::NoCandidates);
      }
    };

    let written = self
      .store
      .link_title(&target.uprn, &title_number)
      .await
      .map_err(Error::store)?;

    if !written {
      return Ok(LinkOutcome::AlreadyLinked);
    }

    info!(
      uprn = %target.uprn,
      title = %title_number,
      score = %format!("{:.0}%", score * 100.0),
      "linked property to title"
    );
    Ok(LinkOutcome::Linked { title_number, score })
  }
}
