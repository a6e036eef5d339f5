//! Aggregate analytics over the stored score history.

use serde::Serialize;

use crate::services::score_store::ScoreRecord;

const PASS_THRESHOLD_PERCENT: f64 = 50.0;

#[derive(Debug, Clone, Serialize)]
pub struct SubjectPercent {
    pub subject: String,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeakSubject {
    pub topic: String,
    pub percent: f64,
}

pub fn percent_breakdown(scores: &[ScoreRecord]) -> Vec<SubjectPercent> {
    scores
        .iter()
        .map(|s| SubjectPercent {
            subject: s.topic.clone(),
            percent: (s.score / s.total) * 100.0,
        })
        .collect()
}

/// Deterministic pass/fail call: average percent at or above 50 passes.
pub fn pass_prediction(percents: &[SubjectPercent]) -> u8 {
    if percents.is_empty() {
        return 0;
    }
    let avg: f64 = percents.iter().map(|p| p.percent).sum::<f64>() / percents.len() as f64;
    if avg >= PASS_THRESHOLD_PERCENT {
        1
    } else {
        0
    }
}

/// Lowest-percentage topic; the first entry wins a tie.
pub fn weakest_subject(scores: &[ScoreRecord]) -> Option<WeakSubject> {
    let mut weakest: Option<WeakSubject> = None;

    for entry in scores {
        let percent = (entry.score / entry.total) * 100.0;
        let is_weaker = weakest.as_ref().map_or(true, |w| percent < w.percent);
        if is_weaker {
            weakest = Some(WeakSubject {
                topic: entry.topic.clone(),
                percent,
            });
        }
    }

    weakest
}
