//! HTTP endpoint handlers. These are thin wrappers that forward to core
//! logic; each is instrumented and logs parameters plus basic result info.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::AnswerOption;
use crate::protocol::*;
use crate::session::{QuizSession, SessionError};
use crate::shuffle;
use crate::state::AppState;
use crate::validate::{summarize, validate, AnswerSummary};

/// Error responses carry a JSON `{error}` body with the matching status.
#[derive(Debug)]
pub enum ApiError {
  NotFound(&'static str),
  BadRequest(String),
  Conflict(String),
  Unavailable(String),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, error) = match self {
      ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.to_string()),
      ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
      ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
      ApiError::Unavailable(msg) => (StatusCode::BAD_GATEWAY, msg),
    };
    (status, Json(ErrorOut { error })).into_response()
  }
}

impl From<SessionError> for ApiError {
  fn from(err: SessionError) -> Self {
    match err {
      SessionError::AlreadySubmitted => ApiError::Conflict(err.to_string()),
      _ => ApiError::BadRequest(err.to_string()),
    }
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state))]
pub async fn http_list_categories(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let snapshot = state.snapshot().await;
  let out: Vec<CategoryOut> = snapshot.categories.iter().map(to_category_out).collect();
  Json(out)
}

/// Unknown categories read as an empty quiz list, not an error.
#[instrument(level = "info", skip(state), fields(%category_id))]
pub async fn http_category_quizzes(
  State(state): State<Arc<AppState>>,
  Path(category_id): Path<String>,
) -> impl IntoResponse {
  let snapshot = state.snapshot().await;
  let out: Vec<QuizSummaryOut> = snapshot
    .quizzes_for_category(&category_id)
    .into_iter()
    .map(to_quiz_summary_out)
    .collect();
  info!(target: "quiz", %category_id, count = out.len(), "Category quizzes served");
  Json(out)
}

#[instrument(level = "info", skip(state), fields(%quiz_id, fresh = q.fresh))]
pub async fn http_get_quiz(
  State(state): State<Arc<AppState>>,
  Path(quiz_id): Path<String>,
  Query(q): Query<QuizQuery>,
) -> Result<Json<QuizOut>, ApiError> {
  let snapshot = state.snapshot().await;
  let quiz = snapshot.quiz_by_id(&quiz_id).ok_or(ApiError::NotFound("quiz not found"))?;
  info!(target: "quiz", %quiz_id, questions = quiz.questions.len(), "Quiz served");
  Ok(Json(to_quiz_out(quiz, q.fresh)))
}

#[instrument(level = "info", skip(state, body), fields(quiz_id = %body.quiz_id, has_device = body.device_id.is_some()))]
pub async fn http_start_session(
  State(state): State<Arc<AppState>>,
  Json(body): Json<StartSessionIn>,
) -> Result<Json<SessionOut>, ApiError> {
  let snapshot = state.snapshot().await;
  let quiz = snapshot
    .quiz_by_id(&body.quiz_id)
    .ok_or(ApiError::NotFound("quiz not found"))?
    .clone();

  let mut session = QuizSession::new(quiz, body.device_id);
  session.start()?;
  let out = to_session_out(&session);
  state.insert_session(session).await;
  info!(target: "session", session_id = %out.session_id, quiz_id = %out.quiz_id, "Session started");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn http_get_session(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<Uuid>,
) -> Result<Json<SessionOut>, ApiError> {
  let sessions = state.sessions.read().await;
  let session = sessions.get(&session_id).ok_or(ApiError::NotFound("session not found"))?;
  Ok(Json(to_session_out(session)))
}

/// Record a selection. The client sends the option's id as displayed; we
/// translate it back to its index in the original (unshuffled) order, which
/// is the form the scoring loop expects.
#[instrument(level = "info", skip(state, body), fields(%session_id, question_index = body.question_index, option_id = %body.option_id))]
pub async fn http_select_answer(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<Uuid>,
  Json(body): Json<AnswerIn>,
) -> Result<Json<SessionOut>, ApiError> {
  let mut sessions = state.sessions.write().await;
  let session = sessions.get_mut(&session_id).ok_or(ApiError::NotFound("session not found"))?;

  let original = {
    let question = session
      .quiz()
      .questions
      .get(body.question_index)
      .ok_or_else(|| ApiError::BadRequest(format!("question index {} out of range", body.question_index)))?;
    shuffle::original_index_of_id(&question.answer_options, &body.option_id)
      .ok_or_else(|| ApiError::BadRequest(format!("unknown option id {}", body.option_id)))?
  };

  session.select_answer(body.question_index, original)?;
  Ok(Json(to_session_out(session)))
}

#[instrument(level = "info", skip(state, body), fields(%session_id))]
pub async fn http_navigate(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<Uuid>,
  Json(body): Json<NavigateIn>,
) -> Result<Json<SessionOut>, ApiError> {
  let mut sessions = state.sessions.write().await;
  let session = sessions.get_mut(&session_id).ok_or(ApiError::NotFound("session not found"))?;
  match body.direction {
    Direction::Next => session.next_question()?,
    Direction::Prev => session.previous_question()?,
  };
  Ok(Json(to_session_out(session)))
}

/// Seal the session, compute the tally, persist the device score (keep-max)
/// and discard the session. Persistence failures degrade to a missing
/// `best_score`, never to a failed submit.
#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn http_submit_session(
  State(state): State<Arc<AppState>>,
  Path(session_id): Path<Uuid>,
) -> Result<Json<SubmitOut>, ApiError> {
  let tally = {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&session_id).ok_or(ApiError::NotFound("session not found"))?;
    session.submit()?
  };

  let session = state
    .remove_session(&session_id)
    .await
    .ok_or(ApiError::NotFound("session not found"))?;
  let quiz_id = session.quiz().id.clone();

  let mut best_score = None;
  if let Some(device_id) = &session.device_id {
    let score = tally.correct_count as u32;
    state.record_score(device_id, &quiz_id, score).await;
    let stored = state
      .best_scores(device_id)
      .await
      .unwrap_or_default()
      .into_iter()
      .find(|s| s.quiz_id == quiz_id)
      .map(|s| s.score);
    best_score = Some(stored.unwrap_or(score).max(score));
  }

  info!(target: "session", %session_id, %quiz_id, correct = tally.correct_count, total = tally.total, "Session submitted");
  Ok(Json(SubmitOut {
    correct_count: tally.correct_count,
    total_questions: tally.total,
    percentage: tally.percentage(),
    best_score,
  }))
}

/// Validate a selection against one question and return the full summary
/// (counts + explanation digests). Purely informational; never affects a
/// session tally.
#[instrument(level = "info", skip(state, body), fields(quiz_id = %body.quiz_id, question_index = body.question_index, selected = body.option_ids.len()))]
pub async fn http_check_answer(
  State(state): State<Arc<AppState>>,
  Json(body): Json<CheckAnswerIn>,
) -> Result<Json<AnswerSummary>, ApiError> {
  let snapshot = state.snapshot().await;
  let quiz = snapshot.quiz_by_id(&body.quiz_id).ok_or(ApiError::NotFound("quiz not found"))?;
  let question = quiz
    .questions
    .get(body.question_index)
    .ok_or_else(|| ApiError::BadRequest(format!("question index {} out of range", body.question_index)))?;

  // Unknown option ids are dropped rather than fatal.
  let selected: Vec<AnswerOption> = body
    .option_ids
    .iter()
    .filter_map(|id| question.answer_options.iter().find(|o| &o.id == id).cloned())
    .collect();

  let allow_partial = body.partial_credit.unwrap_or(state.settings.partial_credit);
  let validation = validate(&selected, &question.answer_options, allow_partial);
  let summary = summarize(validation, &selected, &question.answer_options);
  info!(
    target: "question",
    quiz_id = %body.quiz_id,
    is_correct = summary.validation.is_correct,
    score = summary.validation.score,
    "Answer checked"
  );
  Ok(Json(summary))
}

#[instrument(level = "info", skip(state), fields(device_id = %q.device_id))]
pub async fn http_get_scores(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ScoresQuery>,
) -> Result<Json<Vec<ScoreOut>>, ApiError> {
  let scores = state.best_scores(&q.device_id).await.map_err(ApiError::Unavailable)?;
  Ok(Json(
    scores
      .into_iter()
      .map(|s| ScoreOut { quiz_id: s.quiz_id, score: s.score })
      .collect(),
  ))
}

#[instrument(level = "info", skip(state))]
pub async fn http_refresh(State(state): State<Arc<AppState>>) -> Result<Json<RefreshOut>, ApiError> {
  let (categories, quizzes, questions) = state.refresh().await.map_err(ApiError::Unavailable)?;
  Ok(Json(RefreshOut { ok: true, categories, quizzes, questions }))
}
