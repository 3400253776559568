//! Domain models: canonical question/quiz shapes after format reconciliation.

use serde::{Deserialize, Serialize};

/// One answer option in canonical form. `id` is a stable short code ("a",
/// "b", ...) unique within the question; positional ids are assigned during
/// normalization when the source carries none.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default)]
    pub explanation: Option<String>,
}

/// Canonical question representation. Every raw record, whatever its vintage,
/// is reduced to this shape; the legacy numeric `correct_answer` index never
/// survives normalization (it is resolved into per-option `is_correct` flags).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalizedQuestion {
    /// Stable identity, used to seed deterministic answer shuffling.
    pub id: String,
    pub question_text: String,
    pub answer_options: Vec<AnswerOption>,
    pub shuffle_answers: bool,
    pub multiple_correct: bool,
    pub has_explanations: bool,
}

impl NormalizedQuestion {
    /// Options flagged correct, in original order.
    #[allow(dead_code)]
    pub fn correct_options(&self) -> Vec<&AnswerOption> {
        self.answer_options.iter().filter(|o| o.is_correct).collect()
    }
}

/// Quiz category; pass-through data from the store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
}

/// A quiz with its fully normalized question list.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Quiz {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category_id: String,
    pub questions: Vec<NormalizedQuestion>,
}

/// Best score for one quiz on one device. Kept as the maximum over
/// submissions; the device id is an opaque client-generated token.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeviceScore {
    pub device_id: String,
    pub quiz_id: String,
    pub score: u32,
}
