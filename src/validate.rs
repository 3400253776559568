//! Answer validation and result summaries.
//!
//! `validate` computes correctness and a 0..=1 score for a selection against
//! a question's canonical option list. Single-correct questions score
//! binary; multi-correct questions score either by exact set equality or,
//! with partial credit enabled, by net correct-minus-incorrect picks.
//! `summarize` layers counts and explanation digests on top for richer UI
//! feedback; it never influences scoring.

use serde::Serialize;

use crate::domain::AnswerOption;

#[derive(Clone, Debug, Serialize)]
pub struct Validation {
  pub is_correct: bool,
  pub score: f32,
  pub details: ValidationDetails,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct ValidationDetails {
  pub correct_answers: usize,
  pub selected_correct: usize,
  pub selected_incorrect: usize,
  pub partial_credit: bool,
}

/// Validate a selection. `selected` holds the chosen options themselves (in
/// any order); `all` is the question's full option list.
pub fn validate(selected: &[AnswerOption], all: &[AnswerOption], allow_partial_credit: bool) -> Validation {
  let correct_answers = all.iter().filter(|o| o.is_correct).count();
  let selected_correct = selected.iter().filter(|o| o.is_correct).count();
  let selected_incorrect = selected.len() - selected_correct;

  let details = |partial_credit: bool| ValidationDetails {
    correct_answers,
    selected_correct,
    selected_incorrect,
    partial_credit,
  };

  // Exactly one right answer: correct iff it is the single selection.
  if correct_answers == 1 {
    let is_correct = selected.len() == 1 && selected[0].is_correct;
    return Validation {
      is_correct,
      score: if is_correct { 1.0 } else { 0.0 },
      details: details(false),
    };
  }

  if correct_answers > 1 {
    if allow_partial_credit {
      // Wrong picks cancel right ones symmetrically, floored at zero so
      // select-everything never goes negative.
      let positive = (selected_correct as f32 - selected_incorrect as f32).max(0.0);
      let score = (positive / correct_answers as f32).min(1.0);
      return Validation { is_correct: score == 1.0, score, details: details(true) };
    }
    let is_correct = selected_correct == correct_answers && selected_incorrect == 0;
    return Validation {
      is_correct,
      score: if is_correct { 1.0 } else { 0.0 },
      details: details(false),
    };
  }

  // No correct option defined at all (malformed data): nothing can score.
  Validation { is_correct: false, score: 0.0, details: details(false) }
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct SummaryCounts {
  pub total_options: usize,
  pub correct_count: usize,
  pub selected_count: usize,
  pub selected_correct: usize,
  pub selected_incorrect: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct ExplanationEntry {
  pub text: String,
  pub explanation: String,
  pub is_correct: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct ExplanationBundle {
  pub correct: Vec<ExplanationEntry>,
  pub incorrect: Vec<ExplanationEntry>,
  pub has_explanations: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct AnswerSummary {
  #[serde(flatten)]
  pub validation: Validation,
  pub summary: SummaryCounts,
  pub explanations: ExplanationBundle,
}

/// Compose a validation result with counts and per-side explanation lists.
pub fn summarize(validation: Validation, selected: &[AnswerOption], all: &[AnswerOption]) -> AnswerSummary {
  let selected_correct = selected.iter().filter(|o| o.is_correct).count();

  AnswerSummary {
    summary: SummaryCounts {
      total_options: all.len(),
      correct_count: all.iter().filter(|o| o.is_correct).count(),
      selected_count: selected.len(),
      selected_correct,
      selected_incorrect: selected.len() - selected_correct,
    },
    explanations: ExplanationBundle {
      correct: explanation_entries(all, true),
      incorrect: explanation_entries(all, false),
      has_explanations: all.iter().any(|o| o.explanation.is_some()),
    },
    validation,
  }
}

/// Options on one side of the correctness split that carry an explanation.
fn explanation_entries(options: &[AnswerOption], correct_side: bool) -> Vec<ExplanationEntry> {
  options
    .iter()
    .filter(|o| o.is_correct == correct_side)
    .filter_map(|o| {
      o.explanation.as_ref().map(|explanation| ExplanationEntry {
        text: o.text.clone(),
        explanation: explanation.clone(),
        is_correct: o.is_correct,
      })
    })
    .collect()
}
