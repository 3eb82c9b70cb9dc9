use serde::{Deserialize, Serialize};

/// Caller-supplied weights for the three match sub-scores. Weights are not
/// validated and need not sum to 1; the final score is clamped to 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchWeights {
    pub skills: f64,
    pub tests: f64,
    pub trainer: f64,
}

/// Default weighting used when callers do not supply their own.
pub const DEFAULT_MATCH_WEIGHTS: MatchWeights = MatchWeights {
    skills: 0.6,
    tests: 0.25,
    trainer: 0.15,
};

impl Default for MatchWeights {
    fn default() -> Self {
        DEFAULT_MATCH_WEIGHTS
    }
}
