//! Escalation engine
//!
//! Invoked when `ReserveStationCapacity` fails with `capacity_exceeded`,
//! `certification_missing`, or `equipment_unavailable`. Determines the
//! next escalation tier, selects a new station under relaxed
//! constraints for that tier, and returns an updated `ProcessPath`.

use wms_domain::process_path::{EscalationTier, ProcessPath};

use crate::scoring::{score_stations, ScoredStation, StationCandidate, StationScoringWeights, DEFAULT_CONFIDENCE_THRESHOLD};

/// Failure reasons from `ReserveStationCapacity` that trigger escalation.
/// Any other failure type propagates to the workflow as a terminal error
/// instead.
pub const ESCALATING_FAILURES: &[&str] = &["capacity_exceeded", "certification_missing", "equipment_unavailable"];

pub fn is_escalating_failure(failure_type: &str) -> bool {
    ESCALATING_FAILURES.contains(&failure_type)
}

#[derive(Debug, Clone, PartialEq)]
pub struct EscalationOutcome {
    pub process_path: ProcessPath,
    pub station: ScoredStation,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum EscalationError {
    #[error("already at the manual fallback tier, no further escalation possible")]
    AlreadyManual,
    #[error("no candidate stations available at the next tier")]
    NoCandidates,
}

/// Escalate `process_path` to the next tier and select a station among
/// `candidates` for that tier. At the `Degraded` tier, `capability_match`
/// is relaxed: a station may be selected even without a full capability
/// match (e.g. a standard pack station for a gift-wrap order). At
/// `Manual`, no station selection happens — the order falls through to
/// human handling.
pub fn escalate(
    process_path: &mut ProcessPath,
    candidates: &[StationCandidate],
    weights: &StationScoringWeights,
    reason: impl Into<String>,
) -> Result<EscalationOutcome, EscalationError> {
    let reason = reason.into();
    if !process_path.escalate(reason) {
        return Err(EscalationError::AlreadyManual);
    }

    let tier = process_path.current_tier;
    if tier == EscalationTier::Manual {
        return Err(EscalationError::NoCandidates);
    }

    let eligible: Vec<StationCandidate> = if tier == EscalationTier::Degraded {
        candidates.to_vec()
    } else {
        candidates.iter().filter(|c| c.capability_match).cloned().collect()
    };

    let scoring = score_stations(&eligible, weights, DEFAULT_CONFIDENCE_THRESHOLD).ok_or(EscalationError::NoCandidates)?;

    Ok(EscalationOutcome {
        process_path: process_path.clone(),
        station: scoring.best,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, capable: bool) -> StationCandidate {
        StationCandidate {
            station_id: id.into(),
            queue_depth_score: 0.5,
            historical_throughput_score: 0.5,
            capability_match: capable,
            certification_fit_score: 0.5,
            travel_cost_score: 0.5,
            predicted_congestion_score: 0.5,
        }
    }

    #[test]
    fn test_is_escalating_failure() {
        assert!(is_escalating_failure("capacity_exceeded"));
        assert!(!is_escalating_failure("database_unreachable"));
    }

    #[test]
    fn test_escalate_from_optimal_selects_capable_station() {
        let mut path = ProcessPath::new("ORD-1", vec!["STATION-B".into()]);
        let candidates = vec![candidate("STATION-A", true), candidate("STATION-B", false)];
        let outcome = escalate(&mut path, &candidates, &StationScoringWeights::default(), "capacity_exceeded").unwrap();
        assert_eq!(path.current_tier, EscalationTier::Standard);
        assert_eq!(outcome.station.station_id, "STATION-A");
    }

    #[test]
    fn test_degraded_tier_accepts_non_capable_station() {
        let mut path = ProcessPath::new("ORD-1", vec![]);
        let candidates = vec![candidate("STATION-A", true)];
        escalate(&mut path, &candidates, &StationScoringWeights::default(), "capacity_exceeded").unwrap();
        assert_eq!(path.current_tier, EscalationTier::Standard);

        let candidates = vec![candidate("STATION-A", false)];
        let outcome = escalate(&mut path, &candidates, &StationScoringWeights::default(), "equipment_unavailable").unwrap();
        assert_eq!(path.current_tier, EscalationTier::Degraded);
        assert_eq!(outcome.station.station_id, "STATION-A");
    }

    #[test]
    fn test_escalate_reaching_manual_yields_no_candidates() {
        let mut path = ProcessPath::new("ORD-1", vec![]);
        escalate(&mut path, &[], &StationScoringWeights::default(), "r1").ok();
        escalate(&mut path, &[], &StationScoringWeights::default(), "r2").ok();
        assert_eq!(path.current_tier, EscalationTier::Degraded);
        let result = escalate(&mut path, &[], &StationScoringWeights::default(), "r3");
        assert_eq!(path.current_tier, EscalationTier::Manual);
        assert_eq!(result.unwrap_err(), EscalationError::NoCandidates);
    }

    #[test]
    fn test_escalate_past_manual_errors() {
        let mut path = ProcessPath::new("ORD-1", vec![]);
        path.escalate("r1");
        path.escalate("r2");
        path.escalate("r3");
        assert_eq!(path.current_tier, EscalationTier::Manual);
        let result = escalate(&mut path, &[], &StationScoringWeights::default(), "r4");
        assert_eq!(result.unwrap_err(), EscalationError::AlreadyManual);
    }
}
