mod config;
pub(crate) mod rules;

pub use config::{MatchWeights, DEFAULT_MATCH_WEIGHTS};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{JobId, JobRecord, StudentId, StudentRecord};

/// Stateless scorer combining the skill, test, and trainer sub-scores with the
/// recency boost into one 0-100 compatibility score. Pure: never fails on
/// structurally valid input and performs no I/O.
pub struct MatchScorer {
    weights: MatchWeights,
}

impl MatchScorer {
    pub fn new(weights: MatchWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> MatchWeights {
        self.weights
    }

    pub fn score(
        &self,
        student: &StudentRecord,
        job: &JobRecord,
        today: NaiveDate,
        explain: bool,
    ) -> MatchOutcome {
        let (skill_score, skill_detail) = rules::skill_score(&student.skills, &job.required_skills);

        // Reuses the persisted aggregate verbatim rather than recomputing it.
        let test_score = student.aggregate_score;

        let trainer_score = student
            .trainer_rating_scale()
            .map(|scale| scale.round().clamp(0.0, 100.0) as u8)
            .unwrap_or(rules::NEUTRAL_TRAINER_SCORE);

        let recency = rules::recency_boost(&student.tests, &student.trainer_remarks, today);

        let weighted = skill_score as f64 * self.weights.skills
            + test_score as f64 * self.weights.tests
            + trainer_score as f64 * self.weights.trainer
            + recency.boost as f64;
        let total = weighted.round().clamp(0.0, 100.0) as u8;

        let explanation = explain.then(|| MatchExplanation {
            components: vec![
                ScoreComponent::new(MatchFactor::Skills, skill_score, self.weights.skills),
                ScoreComponent::new(MatchFactor::Tests, test_score, self.weights.tests),
                ScoreComponent::new(MatchFactor::Trainer, trainer_score, self.weights.trainer),
                ScoreComponent::new(MatchFactor::Recency, recency.boost, 1.0),
            ],
            matched_skills: skill_detail.matched,
            missing_skills: skill_detail.missing,
            additional_skills: skill_detail.additional,
            recent_tests: recency.recent_tests,
            recent_remarks: recency.recent_remarks,
            latest_test_on: recency.latest_test_on,
            latest_remark_on: recency.latest_remark_on,
        });

        MatchOutcome {
            student: student.id.clone(),
            job: job.id.clone(),
            score: total,
            explanation,
        }
    }
}

/// Factors contributing to a match score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchFactor {
    Skills,
    Tests,
    Trainer,
    Recency,
}

/// Discrete contribution to a match score, allowing transparent audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: MatchFactor,
    pub score: u8,
    pub weight: f64,
    pub weighted: f64,
}

impl ScoreComponent {
    fn new(factor: MatchFactor, score: u8, weight: f64) -> Self {
        Self {
            factor,
            score,
            weight,
            weighted: score as f64 * weight,
        }
    }
}

/// Supporting detail returned when a caller asks for an explained score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchExplanation {
    pub components: Vec<ScoreComponent>,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub additional_skills: Vec<String>,
    pub recent_tests: usize,
    pub recent_remarks: usize,
    pub latest_test_on: Option<NaiveDate>,
    pub latest_remark_on: Option<NaiveDate>,
}

/// Match scoring output for one (student, job) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub student: StudentId,
    pub job: JobId,
    pub score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<MatchExplanation>,
}
