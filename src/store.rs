//! Minimal Supabase (PostgREST) client for our use-cases.
//!
//! We only read the `categories`, `quizzes` and `questions` tables and
//! read/write `device_scores`. Calls are instrumented and log row counts and
//! statuses, never response bodies beyond a short truncation.
//!
//! NOTE: We never log the API key.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::domain::DeviceScore;
use crate::normalize::{string_or_number, RawQuestionRecord};
use crate::repository::{CategoryRow, RawQuizRow};
use crate::util::trunc_for_log;

#[derive(Clone)]
pub struct Supabase {
  client: reqwest::Client,
  pub base_url: String,
  api_key: String,
}

/// Score row as stored; `quiz_id` may be an integer in older rows.
#[derive(Clone, Debug, Deserialize)]
struct DeviceScoreRow {
  device_id: String,
  #[serde(default, deserialize_with = "string_or_number")]
  quiz_id: Option<String>,
  score: i64,
}

#[derive(Serialize)]
struct ScoreUpsert<'a> {
  device_id: &'a str,
  quiz_id: &'a str,
  score: u32,
}

impl Supabase {
  /// Construct the client if SUPABASE_URL and SUPABASE_ANON_KEY are set;
  /// otherwise return None and let the app run on bank/seed content.
  pub fn from_env() -> Option<Self> {
    let base_url = std::env::var("SUPABASE_URL").ok()?;
    let api_key = std::env::var("SUPABASE_ANON_KEY").ok()?;

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .build()
      .ok()?;

    Some(Self { client, base_url: base_url.trim_end_matches('/').to_string(), api_key })
  }

  fn table_url(&self, table: &str) -> String {
    format!("{}/rest/v1/{}", self.base_url, table)
  }

  /// `SELECT *` with optional PostgREST filters, decoded into row structs.
  async fn select<T: DeserializeOwned>(
    &self,
    table: &str,
    filters: &[(&str, String)],
  ) -> Result<Vec<T>, String> {
    let res = self
      .client
      .get(self.table_url(table))
      .header(USER_AGENT, "quizdeck-backend/0.1")
      .header("apikey", self.api_key.as_str())
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .query(&[("select", "*")])
      .query(filters)
      .send()
      .await
      .map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      return Err(format!("Supabase HTTP {}: {}", status, trunc_for_log(&body, 200)));
    }

    res.json::<Vec<T>>().await.map_err(|e| e.to_string())
  }

  #[instrument(level = "info", skip(self))]
  pub async fn fetch_categories(&self) -> Result<Vec<CategoryRow>, String> {
    let rows = self.select("categories", &[]).await?;
    info!(target: "quiz_backend", count = rows.len(), "Fetched categories");
    Ok(rows)
  }

  #[instrument(level = "info", skip(self))]
  pub async fn fetch_quizzes(&self) -> Result<Vec<RawQuizRow>, String> {
    let rows = self.select("quizzes", &[]).await?;
    info!(target: "quiz_backend", count = rows.len(), "Fetched quizzes");
    Ok(rows)
  }

  #[instrument(level = "info", skip(self))]
  pub async fn fetch_questions(&self) -> Result<Vec<RawQuestionRecord>, String> {
    let rows = self.select("questions", &[]).await?;
    info!(target: "quiz_backend", count = rows.len(), "Fetched questions");
    Ok(rows)
  }

  /// Best scores recorded for one device, one row per quiz.
  #[instrument(level = "info", skip(self), fields(%device_id))]
  pub async fn fetch_scores(&self, device_id: &str) -> Result<Vec<DeviceScore>, String> {
    let rows: Vec<DeviceScoreRow> = self
      .select("device_scores", &[("device_id", format!("eq.{device_id}"))])
      .await?;
    Ok(
      rows
        .into_iter()
        .filter_map(|row| {
          row.quiz_id.map(|quiz_id| DeviceScore {
            device_id: row.device_id,
            quiz_id,
            score: row.score.max(0) as u32,
          })
        })
        .collect(),
    )
  }

  /// Persist a score, keeping the per-device maximum: an existing higher (or
  /// equal) best short-circuits, otherwise the row is upserted.
  #[instrument(level = "info", skip(self), fields(%device_id, %quiz_id, score))]
  pub async fn insert_score(&self, device_id: &str, quiz_id: &str, score: u32) -> Result<(), String> {
    let existing = self
      .fetch_scores(device_id)
      .await?
      .into_iter()
      .find(|s| s.quiz_id == quiz_id)
      .map(|s| s.score);

    if let Some(best) = existing {
      if best >= score {
        info!(target: "score", %quiz_id, best, score, "Existing best score kept");
        return Ok(());
      }
    }

    let res = self
      .client
      .post(self.table_url("device_scores"))
      .header(USER_AGENT, "quizdeck-backend/0.1")
      .header("apikey", self.api_key.as_str())
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .header(CONTENT_TYPE, "application/json")
      .header("Prefer", "resolution=merge-duplicates")
      .json(&ScoreUpsert { device_id, quiz_id, score })
      .send()
      .await
      .map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      return Err(format!("Supabase HTTP {}: {}", status, trunc_for_log(&body, 200)));
    }

    info!(target: "score", %quiz_id, score, "Best score updated");
    Ok(())
  }
}
