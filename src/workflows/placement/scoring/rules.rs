use chrono::{Duration, NaiveDate};

use super::super::domain::{SkillEntry, SkillRequirement, TestEntry, TrainerRemark};

/// Trainer sub-score when a student has no remarks at all.
pub(crate) const NEUTRAL_TRAINER_SCORE: u8 = 50;

/// Bonus credit is earned for exceeding a skill bar by up to this many levels.
const SKILL_BONUS_SPAN: u8 = 20;

/// Activity inside this window earns the recency boost.
const RECENCY_WINDOW_DAYS: i64 = 30;

const RECENT_TEST_BOOST: usize = 2;
const RECENT_TEST_CAP: usize = 5;
const RECENT_REMARK_CAP: usize = 3;
const RECENCY_BOOST_CAP: usize = 10;

/// Skill detail backing the explanation payload.
#[derive(Debug, Clone, Default)]
pub(crate) struct SkillBreakdown {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    pub additional: Vec<String>,
}

/// Score required-skill coverage on 0-100.
///
/// Each satisfied requirement contributes `1 + min(level - min_level, 20)/100`
/// so clearing the bar earns full credit plus up to a 0.2 bonus. A job with no
/// requirements scores 100 for everyone; a student with no skills scores 0
/// against any requirement.
pub(crate) fn skill_score(
    skills: &[SkillEntry],
    required: &[SkillRequirement],
) -> (u8, SkillBreakdown) {
    if required.is_empty() {
        let breakdown = SkillBreakdown {
            additional: skills.iter().map(|skill| skill.name.clone()).collect(),
            ..SkillBreakdown::default()
        };
        return (100, breakdown);
    }

    if skills.is_empty() {
        let breakdown = SkillBreakdown {
            missing: required.iter().map(|req| req.name.clone()).collect(),
            ..SkillBreakdown::default()
        };
        return (0, breakdown);
    }

    let mut breakdown = SkillBreakdown::default();
    let mut contributions = 0.0_f64;

    for requirement in required {
        let held = skills
            .iter()
            .find(|skill| skill.name.eq_ignore_ascii_case(&requirement.name));
        match held {
            Some(skill) if skill.level >= requirement.min_level => {
                let surplus = (skill.level - requirement.min_level).min(SKILL_BONUS_SPAN);
                contributions += 1.0 + surplus as f64 / 100.0;
                breakdown.matched.push(requirement.name.clone());
            }
            _ => breakdown.missing.push(requirement.name.clone()),
        }
    }

    for skill in skills {
        let is_required = required
            .iter()
            .any(|req| req.name.eq_ignore_ascii_case(&skill.name));
        if !is_required {
            breakdown.additional.push(skill.name.clone());
        }
    }

    let score = (100.0 * contributions / required.len() as f64)
        .round()
        .clamp(0.0, 100.0) as u8;
    (score, breakdown)
}

/// Recent-activity summary feeding the boost and the explanation payload.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RecencyActivity {
    pub boost: u8,
    pub recent_tests: usize,
    pub recent_remarks: usize,
    pub latest_test_on: Option<NaiveDate>,
    pub latest_remark_on: Option<NaiveDate>,
}

/// Boost of 0-10 for activity within the last 30 days: +2 per recent test
/// (capped at 5) plus +1 per recent remark (capped at 3).
pub(crate) fn recency_boost(
    tests: &[TestEntry],
    remarks: &[TrainerRemark],
    today: NaiveDate,
) -> RecencyActivity {
    let window_start = today - Duration::days(RECENCY_WINDOW_DAYS);

    let recent_tests = tests
        .iter()
        .filter(|test| test.taken_on >= window_start && test.taken_on <= today)
        .count();
    let recent_remarks = remarks
        .iter()
        .filter(|remark| remark.noted_on >= window_start && remark.noted_on <= today)
        .count();

    let boost = (RECENT_TEST_BOOST * recent_tests)
        .min(RECENT_TEST_CAP)
        .saturating_add(recent_remarks.min(RECENT_REMARK_CAP))
        .min(RECENCY_BOOST_CAP) as u8;

    RecencyActivity {
        boost,
        recent_tests,
        recent_remarks,
        latest_test_on: tests.iter().map(|test| test.taken_on).max(),
        latest_remark_on: remarks.iter().map(|remark| remark.noted_on).max(),
    }
}
