//! Repository snapshot: categories plus fully normalized quizzes.
//!
//! A `QuizRepository` is an explicitly constructed value, built in one pass
//! from raw store rows (or bank/seed content). Refreshing means building a
//! NEW snapshot and swapping it in; nothing mutates a snapshot in place, so
//! sessions created from an older one are never surprised mid-attempt.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{Category, Quiz};
use crate::normalize::{normalize, string_or_number, RawQuestionRecord};

/// Category row as fetched from the store or declared in the bank.
#[derive(Clone, Debug, Deserialize)]
pub struct CategoryRow {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
}

/// Quiz row before its questions are attached.
#[derive(Clone, Debug, Deserialize)]
pub struct RawQuizRow {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub category_id: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct QuizRepository {
    pub categories: Vec<Category>,
    pub quizzes: Vec<Quiz>,
}

impl QuizRepository {
    #[allow(dead_code)]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a snapshot from raw rows: group question records by `quiz_id`,
    /// normalize each, and attach them to their quiz. Rows without ids get
    /// fresh UUIDs; question records that reference no known quiz are
    /// dropped with a warning.
    pub fn from_raw(
        categories: Vec<CategoryRow>,
        quizzes: Vec<RawQuizRow>,
        questions: Vec<RawQuestionRecord>,
    ) -> Self {
        let mut by_quiz: HashMap<String, Vec<RawQuestionRecord>> = HashMap::new();
        let mut unassigned = 0usize;
        for record in questions {
            match record.quiz_id.clone() {
                Some(quiz_id) => by_quiz.entry(quiz_id).or_default().push(record),
                None => unassigned += 1,
            }
        }
        if unassigned > 0 {
            warn!(target: "quiz", count = unassigned, "Question rows without quiz_id were dropped");
        }

        let quizzes: Vec<Quiz> = quizzes
            .into_iter()
            .map(|row| {
                let id = row.id.unwrap_or_else(|| Uuid::new_v4().to_string());
                let questions = by_quiz
                    .remove(&id)
                    .unwrap_or_default()
                    .iter()
                    .map(normalize)
                    .collect();
                Quiz {
                    id,
                    title: row.title,
                    description: row.description,
                    category_id: row.category_id.unwrap_or_default(),
                    questions,
                }
            })
            .collect();

        for (quiz_id, orphans) in &by_quiz {
            warn!(target: "quiz", %quiz_id, count = orphans.len(), "Question rows reference an unknown quiz");
        }

        let categories = categories
            .into_iter()
            .map(|row| Category {
                id: row.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                name: row.name,
                icon: row.icon,
                description: row.description,
            })
            .collect();

        let repo = Self { categories, quizzes };
        info!(
            target: "quiz",
            categories = repo.categories.len(),
            quizzes = repo.quizzes.len(),
            questions = repo.question_count(),
            "Repository snapshot built"
        );
        repo
    }

    pub fn quiz_by_id(&self, id: &str) -> Option<&Quiz> {
        self.quizzes.iter().find(|q| q.id == id)
    }

    pub fn quizzes_for_category(&self, category_id: &str) -> Vec<&Quiz> {
        self.quizzes.iter().filter(|q| q.category_id == category_id).collect()
    }

    pub fn question_count(&self) -> usize {
        self.quizzes.iter().map(|q| q.questions.len()).sum()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows() -> (Vec<CategoryRow>, Vec<RawQuizRow>, Vec<RawQuestionRecord>) {
        let categories = vec![CategoryRow {
            id: Some("cat-1".into()),
            name: "General".into(),
            icon: "brain".into(),
            description: String::new(),
        }];
        let quizzes = vec![
            RawQuizRow {
                id: Some("quiz-1".into()),
                title: "Arithmetic".into(),
                description: String::new(),
                category_id: Some("cat-1".into()),
            },
            RawQuizRow {
                id: Some("quiz-2".into()),
                title: "Empty".into(),
                description: String::new(),
                category_id: Some("cat-2".into()),
            },
        ];
        let questions = vec![
            serde_json::from_value(json!({
                "id": 1,
                "quiz_id": "quiz-1",
                "question_text": "2+2?",
                "answer_options": ["3", "4", "5"],
                "correct_answer": 1
            }))
            .unwrap(),
            serde_json::from_value(json!({
                "id": 2,
                "quiz_id": "quiz-1",
                "question_text": "Pick primes",
                "answer_options": {
                    "answer_options": [
                        { "id": "a", "text": "2", "is_correct": true },
                        { "id": "b", "text": "3", "is_correct": true },
                        { "id": "c", "text": "4", "is_correct": false }
                    ],
                    "multiple_correct": true
                }
            }))
            .unwrap(),
            serde_json::from_value(json!({
                "id": 3,
                "quiz_id": "quiz-404",
                "answer_options": ["lost"]
            }))
            .unwrap(),
        ];
        (categories, quizzes, questions)
    }

    #[test]
    fn questions_attach_to_their_quiz_in_normalized_form() {
        let (categories, quizzes, questions) = rows();
        let repo = QuizRepository::from_raw(categories, quizzes, questions);

        let quiz = repo.quiz_by_id("quiz-1").expect("quiz present");
        assert_eq!(quiz.questions.len(), 2);
        // Legacy row came out canonical.
        assert_eq!(quiz.questions[0].answer_options[1].text, "4");
        assert!(quiz.questions[0].answer_options[1].is_correct);
        assert!(quiz.questions[1].multiple_correct);

        // The quiz with no rows still exists, just without questions.
        assert!(repo.quiz_by_id("quiz-2").unwrap().questions.is_empty());
        assert_eq!(repo.question_count(), 2);
    }

    #[test]
    fn category_filter_matches_on_id() {
        let (categories, quizzes, questions) = rows();
        let repo = QuizRepository::from_raw(categories, quizzes, questions);

        let in_cat = repo.quizzes_for_category("cat-1");
        assert_eq!(in_cat.len(), 1);
        assert_eq!(in_cat[0].id, "quiz-1");
        assert!(repo.quizzes_for_category("cat-9").is_empty());
    }

    #[test]
    fn missing_ids_are_generated() {
        let repo = QuizRepository::from_raw(
            vec![CategoryRow { id: None, name: "X".into(), icon: String::new(), description: String::new() }],
            vec![RawQuizRow { id: None, title: "Y".into(), description: String::new(), category_id: None }],
            vec![],
        );
        assert!(!repo.categories[0].id.is_empty());
        assert!(!repo.quizzes[0].id.is_empty());
    }

    #[test]
    fn empty_snapshot_reports_empty() {
        assert!(QuizRepository::empty().is_empty());
        assert_eq!(QuizRepository::empty().question_count(), 0);
    }
}
