//! Public protocol structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and app independently.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{AnswerOption, Category, NormalizedQuestion, Quiz};
use crate::session::{QuizSession, SessionStatus};
use crate::shuffle;

#[derive(Debug, Serialize)]
pub struct CategoryOut {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub description: String,
}

pub fn to_category_out(c: &Category) -> CategoryOut {
    CategoryOut {
        id: c.id.clone(),
        name: c.name.clone(),
        icon: c.icon.clone(),
        description: c.description.clone(),
    }
}

/// Quiz listing entry; the question payload stays behind the quiz endpoint.
#[derive(Debug, Serialize)]
pub struct QuizSummaryOut {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category_id: String,
    pub question_count: usize,
}

pub fn to_quiz_summary_out(q: &Quiz) -> QuizSummaryOut {
    QuizSummaryOut {
        id: q.id.clone(),
        title: q.title.clone(),
        description: q.description.clone(),
        category_id: q.category_id.clone(),
        question_count: q.questions.len(),
    }
}

#[derive(Debug, Serialize)]
pub struct OptionOut {
    pub id: String,
    pub text: String,
    pub is_correct: bool,
    pub explanation: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QuestionOut {
    pub id: String,
    pub question_text: String,
    /// Options in DISPLAY order; clients map selections back through option
    /// ids, never through display positions.
    pub answer_options: Vec<OptionOut>,
    pub shuffle_answers: bool,
    pub multiple_correct: bool,
    pub has_explanations: bool,
}

pub fn to_question_out(q: &NormalizedQuestion, fresh: bool) -> QuestionOut {
    let options = shuffle::display_order(q, fresh);
    QuestionOut {
        id: q.id.clone(),
        question_text: q.question_text.clone(),
        answer_options: options.into_iter().map(to_option_out).collect(),
        shuffle_answers: q.shuffle_answers,
        multiple_correct: q.multiple_correct,
        has_explanations: q.has_explanations,
    }
}

fn to_option_out(o: AnswerOption) -> OptionOut {
    OptionOut { id: o.id, text: o.text, is_correct: o.is_correct, explanation: o.explanation }
}

#[derive(Debug, Serialize)]
pub struct QuizOut {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category_id: String,
    pub questions: Vec<QuestionOut>,
}

pub fn to_quiz_out(q: &Quiz, fresh: bool) -> QuizOut {
    QuizOut {
        id: q.id.clone(),
        title: q.title.clone(),
        description: q.description.clone(),
        category_id: q.category_id.clone(),
        questions: q.questions.iter().map(|question| to_question_out(question, fresh)).collect(),
    }
}

#[derive(Debug, Serialize)]
pub struct SessionOut {
    pub session_id: Uuid,
    pub quiz_id: String,
    pub status: SessionStatus,
    pub current_question: usize,
    pub total_questions: usize,
    pub answered_count: usize,
}

pub fn to_session_out(s: &QuizSession) -> SessionOut {
    SessionOut {
        session_id: s.id,
        quiz_id: s.quiz().id.clone(),
        status: s.status(),
        current_question: s.current_question(),
        total_questions: s.quiz().questions.len(),
        answered_count: s.answered_count(),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct QuizQuery {
    /// `true` requests a non-reproducible shuffle instead of the seeded one.
    #[serde(default)]
    pub fresh: bool,
}

#[derive(Debug, Deserialize)]
pub struct StartSessionIn {
    #[serde(rename = "quizId")]
    pub quiz_id: String,
    #[serde(default, rename = "deviceId")]
    pub device_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerIn {
    #[serde(rename = "questionIndex")]
    pub question_index: usize,
    #[serde(rename = "optionId")]
    pub option_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Next,
    Prev,
}

#[derive(Debug, Deserialize)]
pub struct NavigateIn {
    pub direction: Direction,
}

#[derive(Debug, Serialize)]
pub struct SubmitOut {
    pub correct_count: usize,
    pub total_questions: usize,
    pub percentage: u32,
    pub best_score: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CheckAnswerIn {
    #[serde(rename = "quizId")]
    pub quiz_id: String,
    #[serde(rename = "questionIndex")]
    pub question_index: usize,
    #[serde(rename = "optionIds")]
    pub option_ids: Vec<String>,
    #[serde(default, rename = "partialCredit")]
    pub partial_credit: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ScoresQuery {
    pub device_id: String,
}

#[derive(Debug, Serialize)]
pub struct ScoreOut {
    pub quiz_id: String,
    pub score: u32,
}

#[derive(Debug, Serialize)]
pub struct RefreshOut {
    pub ok: bool,
    pub categories: usize,
    pub quizzes: usize,
    pub questions: usize,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub error: String,
}
