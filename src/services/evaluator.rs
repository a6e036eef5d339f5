//! Pure quiz scoring: index comparison between submitted answers and the
//! original questions, with per-question feedback.

use serde::Serialize;

use crate::services::quiz::QuizQuestion;

#[derive(Debug, Clone, Serialize)]
pub struct Feedback {
    pub question: String,
    #[serde(rename = "userAnswer", skip_serializing_if = "Option::is_none")]
    pub user_answer: Option<String>,
    #[serde(rename = "correctAnswer", skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
    #[serde(rename = "isCorrect")]
    pub is_correct: bool,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub score: usize,
    pub total: usize,
    pub feedback: Vec<Feedback>,
}

/// Answers are positional; a missing or out-of-range selection is simply
/// wrong and its option text is omitted from the feedback.
pub fn evaluate(questions: &[QuizQuestion], answers: &[Option<i64>]) -> Evaluation {
    let mut score = 0;
    let mut feedback = Vec::with_capacity(questions.len());

    for (i, q) in questions.iter().enumerate() {
        let selected = answers.get(i).copied().flatten();
        let is_correct = selected == Some(q.correct_index as i64);
        if is_correct {
            score += 1;
        }

        let user_answer = selected
            .and_then(|a| usize::try_from(a).ok())
            .and_then(|a| q.options.get(a).cloned());
        let correct_answer = q.options.get(q.correct_index).cloned();

        feedback.push(Feedback {
            question: q.question.clone(),
            user_answer,
            correct_answer,
            is_correct,
            explanation: q.explanation.clone(),
        });
    }

    Evaluation {
        score,
        total: questions.len(),
        feedback,
    }
}
