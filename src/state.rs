//! Application state: repository snapshot, active sessions, optional store.
//!
//! This module owns:
//!   - the current `QuizRepository` snapshot (swapped wholesale on refresh,
//!     never mutated in place)
//!   - the active quiz sessions (each with its own quiz clone)
//!   - the optional Supabase store handle and the settings
//!
//! Startup content policy: config-bank entries first, then built-in seeds,
//! without shadowing ids the bank already uses. A remote snapshot replaces
//! all of it on the first successful refresh.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::config::{load_config_from_env, Settings};
use crate::domain::DeviceScore;
use crate::normalize::RawQuestionRecord;
use crate::repository::{CategoryRow, QuizRepository, RawQuizRow};
use crate::seeds::{seed_categories, seed_questions, seed_quizzes};
use crate::session::QuizSession;
use crate::store::Supabase;

#[derive(Clone)]
pub struct AppState {
    repo: Arc<RwLock<Arc<QuizRepository>>>,
    pub sessions: Arc<RwLock<HashMap<Uuid, QuizSession>>>,
    pub store: Option<Supabase>,
    pub settings: Settings,
}

impl AppState {
    /// Build state from env: load config, assemble bank + seed content into
    /// the initial snapshot, init the optional store client.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_config_from_env();
        let settings = cfg.as_ref().map(|c| c.settings).unwrap_or_default();

        let mut categories: Vec<CategoryRow> = Vec::new();
        let mut quizzes: Vec<RawQuizRow> = Vec::new();
        let mut questions: Vec<RawQuestionRecord> = Vec::new();

        if let Some(cfg) = &cfg {
            categories.extend(cfg.categories.clone());
            for quiz_cfg in &cfg.quizzes {
                let id = quiz_cfg.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
                quizzes.push(RawQuizRow {
                    id: Some(id.clone()),
                    title: quiz_cfg.title.clone(),
                    description: quiz_cfg.description.clone(),
                    category_id: Some(quiz_cfg.category_id.clone()),
                });
                for record in &quiz_cfg.questions {
                    let mut record = record.clone();
                    record.quiz_id = Some(id.clone());
                    questions.push(record);
                }
            }
        }

        // Always add built-in seeds, but don't shadow bank ids.
        let category_ids: HashSet<String> = categories.iter().filter_map(|c| c.id.clone()).collect();
        let quiz_ids: HashSet<String> = quizzes.iter().filter_map(|q| q.id.clone()).collect();
        for row in seed_categories() {
            if !row.id.as_ref().is_some_and(|id| category_ids.contains(id)) {
                categories.push(row);
            }
        }
        for row in seed_quizzes() {
            if !row.id.as_ref().is_some_and(|id| quiz_ids.contains(id)) {
                quizzes.push(row);
            }
        }
        for record in seed_questions() {
            if !record.quiz_id.as_ref().is_some_and(|id| quiz_ids.contains(id)) {
                questions.push(record);
            }
        }

        let repo = QuizRepository::from_raw(categories, quizzes, questions);

        let store = Supabase::from_env();
        if let Some(store) = &store {
            info!(target: "quiz_backend", base_url = %store.base_url, "Supabase store enabled.");
        } else {
            info!(target: "quiz_backend", "Supabase store disabled (no SUPABASE_URL/SUPABASE_ANON_KEY). Serving bank/seed content.");
        }

        Self {
            repo: Arc::new(RwLock::new(Arc::new(repo))),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            store,
            settings,
        }
    }

    /// The current repository snapshot. Holders keep a consistent view even
    /// if a refresh swaps the snapshot while they read.
    pub async fn snapshot(&self) -> Arc<QuizRepository> {
        self.repo.read().await.clone()
    }

    /// Fetch all tables from the store and swap in a fresh snapshot.
    /// Any fetch failure keeps the current snapshot untouched.
    #[instrument(level = "info", skip(self))]
    pub async fn refresh(&self) -> Result<(usize, usize, usize), String> {
        let store = self
            .store
            .as_ref()
            .ok_or_else(|| "no remote store configured".to_string())?;

        let categories = store.fetch_categories().await?;
        let quizzes = store.fetch_quizzes().await?;
        let questions = store.fetch_questions().await?;

        let repo = QuizRepository::from_raw(categories, quizzes, questions);
        let counts = (repo.categories.len(), repo.quizzes.len(), repo.question_count());
        *self.repo.write().await = Arc::new(repo);
        info!(
            target: "quiz_backend",
            categories = counts.0,
            quizzes = counts.1,
            questions = counts.2,
            "Snapshot refreshed from store"
        );
        Ok(counts)
    }

    pub async fn insert_session(&self, session: QuizSession) -> Uuid {
        let id = session.id;
        self.sessions.write().await.insert(id, session);
        id
    }

    pub async fn remove_session(&self, id: &Uuid) -> Option<QuizSession> {
        self.sessions.write().await.remove(id)
    }

    /// Best scores for a device; an unconfigured store reads as no scores.
    pub async fn best_scores(&self, device_id: &str) -> Result<Vec<DeviceScore>, String> {
        match &self.store {
            Some(store) => store.fetch_scores(device_id).await,
            None => Ok(Vec::new()),
        }
    }

    /// Persist a submitted score. Failures are logged and never propagate
    /// into the submit flow.
    pub async fn record_score(&self, device_id: &str, quiz_id: &str, score: u32) {
        if let Some(store) = &self.store {
            if let Err(e) = store.insert_score(device_id, quiz_id, score).await {
                error!(target: "score", %quiz_id, error = %e, "Failed to persist score");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fresh_state_serves_seed_content() {
        let state = AppState::new();
        let snapshot = state.snapshot().await;
        assert!(!snapshot.is_empty());
        assert!(snapshot.quiz_by_id("world-capitals").is_some());
    }

    #[tokio::test]
    async fn sessions_can_be_inserted_and_removed() {
        let state = AppState::new();
        let quiz = state.snapshot().await.quiz_by_id("basic-math").unwrap().clone();
        let session = QuizSession::new(quiz, None);
        let id = state.insert_session(session).await;

        assert!(state.sessions.read().await.contains_key(&id));
        assert!(state.remove_session(&id).await.is_some());
        assert!(state.remove_session(&id).await.is_none());
    }

    #[tokio::test]
    async fn scores_read_as_empty_without_a_store() {
        let state = AppState::new();
        if state.store.is_none() {
            assert!(state.best_scores("device-1").await.unwrap().is_empty());
        }
    }
}
