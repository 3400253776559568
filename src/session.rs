//! One quiz attempt: navigation, per-question selections, final tally.
//!
//! A session owns a clone of its quiz, so a repository refresh mid-attempt
//! never changes the questions under the user. Selections are keyed by
//! question index and store the chosen option's index in the ORIGINAL
//! (unshuffled) order; translating display positions back to that order is
//! the caller's job (see `shuffle::original_index`).
//!
//! Lifecycle: NotStarted -> InProgress -> Submitted. Navigation and answer
//! recording are only legal while InProgress; submission requires every
//! question answered and is terminal.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::{NormalizedQuestion, Quiz};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    NotStarted,
    InProgress,
    Submitted,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionError {
    NotStarted,
    AlreadyStarted,
    AlreadySubmitted,
    Incomplete { answered: usize, total: usize },
    QuestionOutOfRange { index: usize, total: usize },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "session has not been started"),
            Self::AlreadyStarted => write!(f, "session is already running"),
            Self::AlreadySubmitted => write!(f, "session is already submitted"),
            Self::Incomplete { answered, total } => {
                write!(f, "cannot submit: {answered} of {total} questions answered")
            }
            Self::QuestionOutOfRange { index, total } => {
                write!(f, "question index {index} out of range for {total} questions")
            }
        }
    }
}

impl std::error::Error for SessionError {}

/// Final score of one attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub correct_count: usize,
    pub total: usize,
}

impl Tally {
    /// Rounded percentage; an empty quiz counts as 0%.
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            0
        } else {
            ((self.correct_count as f64 / self.total as f64) * 100.0).round() as u32
        }
    }
}

/// Count correct selections over a whole quiz. A question with no recorded
/// selection or an out-of-range option index counts as incorrect; the tally
/// itself never fails.
pub fn score_quiz(questions: &[NormalizedQuestion], selected: &HashMap<usize, usize>) -> Tally {
    let correct_count = questions
        .iter()
        .enumerate()
        .filter(|(index, question)| {
            selected
                .get(index)
                .and_then(|&option| question.answer_options.get(option))
                .is_some_and(|option| option.is_correct)
        })
        .count();
    Tally { correct_count, total: questions.len() }
}

pub struct QuizSession {
    pub id: Uuid,
    pub device_id: Option<String>,
    quiz: Quiz,
    current_question: usize,
    selected: HashMap<usize, usize>,
    status: SessionStatus,
}

impl QuizSession {
    pub fn new(quiz: Quiz, device_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            device_id,
            quiz,
            current_question: 0,
            selected: HashMap::new(),
            status: SessionStatus::NotStarted,
        }
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn current_question(&self) -> usize {
        self.current_question
    }

    pub fn answered_count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_complete(&self) -> bool {
        (0..self.quiz.questions.len()).all(|index| self.selected.contains_key(&index))
    }

    pub fn start(&mut self) -> Result<(), SessionError> {
        match self.status {
            SessionStatus::NotStarted => {
                self.status = SessionStatus::InProgress;
                Ok(())
            }
            SessionStatus::InProgress => Err(SessionError::AlreadyStarted),
            SessionStatus::Submitted => Err(SessionError::AlreadySubmitted),
        }
    }

    /// Record the selection for a question, by original-order option index.
    /// The option index is stored as-is; scoring tolerates stale values.
    pub fn select_answer(&mut self, question_index: usize, option_index: usize) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        if question_index >= self.quiz.questions.len() {
            return Err(SessionError::QuestionOutOfRange {
                index: question_index,
                total: self.quiz.questions.len(),
            });
        }
        self.selected.insert(question_index, option_index);
        Ok(())
    }

    /// Advance to the next question, clamped at the last one.
    pub fn next_question(&mut self) -> Result<usize, SessionError> {
        self.ensure_in_progress()?;
        if self.current_question + 1 < self.quiz.questions.len() {
            self.current_question += 1;
        }
        Ok(self.current_question)
    }

    /// Go back one question, clamped at the first one.
    pub fn previous_question(&mut self) -> Result<usize, SessionError> {
        self.ensure_in_progress()?;
        self.current_question = self.current_question.saturating_sub(1);
        Ok(self.current_question)
    }

    /// Compute the final tally and seal the session. Requires every question
    /// answered; afterwards no further mutation is possible.
    pub fn submit(&mut self) -> Result<Tally, SessionError> {
        self.ensure_in_progress()?;
        if !self.is_complete() {
            return Err(SessionError::Incomplete {
                answered: self.answered_count(),
                total: self.quiz.questions.len(),
            });
        }
        self.status = SessionStatus::Submitted;
        Ok(score_quiz(&self.quiz.questions, &self.selected))
    }

    fn ensure_in_progress(&self) -> Result<(), SessionError> {
        match self.status {
            SessionStatus::NotStarted => Err(SessionError::NotStarted),
            SessionStatus::Submitted => Err(SessionError::AlreadySubmitted),
            SessionStatus::InProgress => Ok(()),
        }
    }
}
