//! Process-path routing and escalation engine for the fulfillment
//! orchestrator.

pub mod escalation;
pub mod scoring;

pub mod prelude {
    pub use crate::escalation::{escalate, is_escalating_failure, EscalationError, EscalationOutcome, ESCALATING_FAILURES};
    pub use crate::scoring::{
        score_stations, ScoredStation, ScoringResult, StationCandidate, StationScoringWeights,
        DEFAULT_CONFIDENCE_THRESHOLD,
    };
}
