//! Seed content: built-in categories and quizzes that guarantee the app is
//! useful even without a remote store or config bank.
//!
//! Seed questions are RAW records and deliberately span the historical
//! formats (nested enhanced, direct enhanced, legacy string array, old
//! `options` column, JSON-encoded string), so a plain startup already
//! exercises the whole normalization path.

use serde_json::json;

use crate::normalize::RawQuestionRecord;
use crate::repository::{CategoryRow, RawQuizRow};

pub fn seed_categories() -> Vec<CategoryRow> {
  vec![
    CategoryRow {
      id: Some("general".into()),
      name: "General Knowledge".into(),
      icon: "brain".into(),
      description: "A bit of everything".into(),
    },
    CategoryRow {
      id: Some("numbers".into()),
      name: "Numbers".into(),
      icon: "calculator".into(),
      description: "Quick arithmetic".into(),
    },
  ]
}

pub fn seed_quizzes() -> Vec<RawQuizRow> {
  vec![
    RawQuizRow {
      id: Some("world-capitals".into()),
      title: "World Capitals".into(),
      description: "Do you know where governments live?".into(),
      category_id: Some("general".into()),
    },
    RawQuizRow {
      id: Some("basic-math".into()),
      title: "Basic Math".into(),
      description: "Mental arithmetic warm-up".into(),
      category_id: Some("numbers".into()),
    },
  ]
}

pub fn seed_questions() -> Vec<RawQuestionRecord> {
  vec![
    // Nested enhanced with explanations.
    RawQuestionRecord {
      id: Some("seed-capitals-1".into()),
      quiz_id: Some("world-capitals".into()),
      question_text: Some("What is the capital of France?".into()),
      answer_options: Some(json!({
        "answer_options": [
          { "id": "a", "text": "London", "is_correct": false, "explanation": "London is the capital of the UK" },
          { "id": "b", "text": "Paris", "is_correct": true, "explanation": "Paris has been France's capital since 987 AD" },
          { "id": "c", "text": "Berlin", "is_correct": false },
          { "id": "d", "text": "Madrid", "is_correct": false }
        ],
        "shuffle_answers": true,
        "multiple_correct": false
      })),
      ..RawQuestionRecord::default()
    },
    // Nested enhanced, multiple correct answers.
    RawQuestionRecord {
      id: Some("seed-capitals-2".into()),
      quiz_id: Some("world-capitals".into()),
      question_text: Some("Which of these cities are national capitals?".into()),
      answer_options: Some(json!({
        "answer_options": [
          { "id": "a", "text": "Ottawa", "is_correct": true },
          { "id": "b", "text": "Canberra", "is_correct": true },
          { "id": "c", "text": "Sydney", "is_correct": false },
          { "id": "d", "text": "Toronto", "is_correct": false }
        ],
        "shuffle_answers": true,
        "multiple_correct": true
      })),
      ..RawQuestionRecord::default()
    },
    // Direct enhanced array, pre-shuffle-rollout row.
    RawQuestionRecord {
      id: Some("seed-capitals-3".into()),
      quiz_id: Some("world-capitals".into()),
      question_text: Some("What is the capital of Japan?".into()),
      answer_options: Some(json!([
        { "id": "a", "text": "Kyoto", "is_correct": false },
        { "id": "b", "text": "Osaka", "is_correct": false },
        { "id": "c", "text": "Tokyo", "is_correct": true }
      ])),
      ..RawQuestionRecord::default()
    },
    // Legacy string array with a numeric correct index.
    RawQuestionRecord {
      id: Some("seed-math-1".into()),
      quiz_id: Some("basic-math".into()),
      question_text: Some("2+2?".into()),
      answer_options: Some(json!(["3", "4", "5"])),
      correct_answer: Some(json!(1)),
      ..RawQuestionRecord::default()
    },
    // Oldest vintage: strings in the `options` column.
    RawQuestionRecord {
      id: Some("seed-math-2".into()),
      quiz_id: Some("basic-math".into()),
      question_text: Some("What is 10/2?".into()),
      options: Some(json!(["3", "4", "5"])),
      correct_answer: Some(json!(2)),
      ..RawQuestionRecord::default()
    },
    // JSON-encoded string, as some migrated rows still are.
    RawQuestionRecord {
      id: Some("seed-math-3".into()),
      quiz_id: Some("basic-math".into()),
      question_text: Some("What is 4x2?".into()),
      answer_options: Some(json!("[\"7\", \"8\", \"9\"]")),
      correct_answer: Some(json!(1)),
      ..RawQuestionRecord::default()
    },
  ]
}
