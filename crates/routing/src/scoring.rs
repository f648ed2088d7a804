//! Station scoring
//!
//! For each candidate station the engine computes a weighted score
//! across six factors. Weights are facility-tunable; higher score is
//! better; ties are broken by station ID (lexicographic, stable).

use serde::{Deserialize, Serialize};

/// Per-facility tuning of the six scoring factors. Values don't need to
/// sum to 1.0 — they're relative weights applied to already-normalized
/// per-factor scores in `[0.0, 1.0]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StationScoringWeights {
    pub queue_depth: f64,
    pub historical_throughput: f64,
    pub capability_match: f64,
    pub certification_fit: f64,
    pub travel_cost: f64,
    pub predicted_congestion: f64,
}

impl Default for StationScoringWeights {
    fn default() -> Self {
        Self {
            queue_depth: 0.25,
            historical_throughput: 0.2,
            capability_match: 0.25,
            certification_fit: 0.15,
            travel_cost: 0.1,
            predicted_congestion: 0.05,
        }
    }
}

/// Per-factor scores for one candidate station, already normalized to
/// `[0.0, 1.0]` by the caller (the activity that reads live station
/// metrics). `capability_match` is a hard boolean gate upstream of
/// scoring, but is still folded into the weighted sum so a partially
/// capable fallback station can still rank above a far worse one during
/// degraded-tier selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StationCandidate {
    pub station_id: String,
    /// Inverse of queue depth, normalized — shorter queue scores higher.
    pub queue_depth_score: f64,
    pub historical_throughput_score: f64,
    pub capability_match: bool,
    pub certification_fit_score: f64,
    /// Inverse of distance/travel cost, normalized — closer scores higher.
    pub travel_cost_score: f64,
    /// Inverse of predicted congestion, normalized.
    pub predicted_congestion_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredStation {
    pub station_id: String,
    pub score: f64,
    pub capability_match: bool,
}

/// Minimum confidence required to accept the top-scored station
/// outright. Below this the engine records a `low_confidence` marker
/// but still proceeds with the best candidate — it does not itself
/// trigger escalation; `capacity_exceeded`/`certification_missing`/
/// `equipment_unavailable` failures from `ReserveStationCapacity` do.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.6;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringResult {
    pub best: ScoredStation,
    pub low_confidence: bool,
    pub ranked: Vec<ScoredStation>,
}

/// Score every candidate, rank highest-first, and report whether the
/// winner clears the confidence threshold.
pub fn score_stations(
    candidates: &[StationCandidate],
    weights: &StationScoringWeights,
    confidence_threshold: f64,
) -> Option<ScoringResult> {
    let mut scored: Vec<ScoredStation> = candidates
        .iter()
        .map(|c| ScoredStation {
            station_id: c.station_id.clone(),
            score: weights.queue_depth * c.queue_depth_score
                + weights.historical_throughput * c.historical_throughput_score
                + weights.capability_match * (c.capability_match as u8 as f64)
                + weights.certification_fit * c.certification_fit_score
                + weights.travel_cost * c.travel_cost_score
                + weights.predicted_congestion * c.predicted_congestion_score,
            capability_match: c.capability_match,
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.station_id.cmp(&b.station_id))
    });

    let best = scored.first()?.clone();
    let low_confidence = best.score < confidence_threshold;

    Some(ScoringResult { best, low_confidence, ranked: scored })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, queue: f64, capable: bool) -> StationCandidate {
        StationCandidate {
            station_id: id.into(),
            queue_depth_score: queue,
            historical_throughput_score: 0.5,
            capability_match: capable,
            certification_fit_score: 0.5,
            travel_cost_score: 0.5,
            predicted_congestion_score: 0.5,
        }
    }

    #[test]
    fn test_highest_scorer_wins() {
        let candidates = vec![candidate("STATION-A", 0.2, true), candidate("STATION-B", 0.9, true)];
        let result = score_stations(&candidates, &StationScoringWeights::default(), DEFAULT_CONFIDENCE_THRESHOLD).unwrap();
        assert_eq!(result.best.station_id, "STATION-B");
    }

    #[test]
    fn test_ties_broken_by_station_id() {
        let candidates = vec![candidate("STATION-B", 0.5, true), candidate("STATION-A", 0.5, true)];
        let result = score_stations(&candidates, &StationScoringWeights::default(), DEFAULT_CONFIDENCE_THRESHOLD).unwrap();
        assert_eq!(result.best.station_id, "STATION-A");
    }

    #[test]
    fn test_low_confidence_marker_set_below_threshold() {
        let candidates = vec![candidate("STATION-A", 0.0, false)];
        let result = score_stations(&candidates, &StationScoringWeights::default(), 0.9).unwrap();
        assert!(result.low_confidence);
    }

    #[test]
    fn test_empty_candidates_returns_none() {
        assert!(score_stations(&[], &StationScoringWeights::default(), DEFAULT_CONFIDENCE_THRESHOLD).is_none());
    }
}
