//! Loading app configuration (settings + optional quiz bank) from TOML.
//!
//! See `AppConfig` for the expected schema. Bank quizzes carry RAW question
//! records, exactly as they would arrive from the store, so configured
//! content exercises the same normalization path as remote rows.

use serde::Deserialize;
use tracing::{error, info};

use crate::normalize::RawQuestionRecord;
use crate::repository::CategoryRow;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub settings: Settings,
  #[serde(default)]
  pub categories: Vec<CategoryRow>,
  #[serde(default)]
  pub quizzes: Vec<QuizCfg>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Settings {
  /// Whether multi-correct questions grant partial credit when checked
  /// through the answer endpoint.
  #[serde(default = "default_partial_credit")]
  pub partial_credit: bool,
}

impl Default for Settings {
  fn default() -> Self {
    Self { partial_credit: default_partial_credit() }
  }
}

fn default_partial_credit() -> bool {
  true
}

/// Quiz entry accepted in TOML configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct QuizCfg {
  #[serde(default)]
  pub id: Option<String>,
  pub title: String,
  #[serde(default)]
  pub description: String,
  pub category_id: String,
  #[serde(default)]
  pub questions: Vec<RawQuestionRecord>,
}

/// Attempt to load `AppConfig` from QUIZ_CONFIG_PATH. On any parsing/IO
/// error, returns None.
pub fn load_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("QUIZ_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "quiz_backend", %path, "Loaded quiz config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "quiz_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "quiz_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::normalize::normalize;

  #[test]
  fn bank_quizzes_parse_with_raw_questions_in_any_format() {
    let cfg: AppConfig = toml::from_str(
      r#"
      [settings]
      partial_credit = false

      [[categories]]
      id = "general"
      name = "General Knowledge"
      icon = "brain"

      [[quizzes]]
      id = "arithmetic"
      title = "Arithmetic"
      category_id = "general"

      [[quizzes.questions]]
      question_text = "2+2?"
      answer_options = ["3", "4", "5"]
      correct_answer = 1

      [[quizzes.questions]]
      question_text = "Pick the primes"
      answer_options = [
        { id = "a", text = "2", is_correct = true },
        { id = "b", text = "3", is_correct = true, explanation = "3 is prime" },
        { id = "c", text = "4", is_correct = false },
      ]
      "#,
    )
    .expect("config parses");

    assert!(!cfg.settings.partial_credit);
    assert_eq!(cfg.categories[0].id.as_deref(), Some("general"));
    assert_eq!(cfg.quizzes.len(), 1);
    assert_eq!(cfg.quizzes[0].questions.len(), 2);

    // Both bank formats normalize like store rows do.
    let legacy = normalize(&cfg.quizzes[0].questions[0]);
    assert!(legacy.answer_options[1].is_correct);
    let enhanced = normalize(&cfg.quizzes[0].questions[1]);
    assert!(enhanced.has_explanations);
    assert_eq!(enhanced.correct_options().len(), 2);
  }

  #[test]
  fn defaults_apply_to_an_empty_config() {
    let cfg: AppConfig = toml::from_str("").expect("empty config parses");
    assert!(cfg.settings.partial_credit);
    assert!(cfg.categories.is_empty());
    assert!(cfg.quizzes.is_empty());
  }
}
