//! Background analysis runs, observable per idea.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tokio::task::JoinHandle;

use crate::analysis::{TextGenerator, analyze_idea};
use crate::errors::AppError;
use crate::models::idea::AiAnalysis;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum JobState {
    /// No background run has been started for the idea since the server started.
    Idle,
    #[serde(rename_all = "camelCase")]
    Pending { started_at: DateTime<Utc> },
    #[serde(rename_all = "camelCase")]
    Completed { finished_at: DateTime<Utc>, score: i64 },
    #[serde(rename_all = "camelCase")]
    Failed { finished_at: DateTime<Utc>, message: String },
}

/// Latest run of one idea. `generation` identifies the run that owns the slot.
struct Slot {
    generation: u64,
    state: JobState,
}

#[derive(Default)]
struct Registry {
    next_generation: u64,
    slots: HashMap<i64, Slot>,
}

#[derive(Clone, Default)]
pub struct AnalysisJobs {
    registry: Arc<Mutex<Registry>>,
}

impl AnalysisJobs {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Mark a new run as pending and return its generation.
    fn begin(&self, idea_id: i64) -> u64 {
        let mut registry = self.lock();
        registry.next_generation += 1;
        let generation = registry.next_generation;
        registry.slots.insert(
            idea_id,
            Slot { generation, state: JobState::Pending { started_at: Utc::now() } },
        );
        generation
    }

    /// Record the outcome of run `generation`. Ignored if a newer run started or the idea was forgotten.
    fn finish(&self, idea_id: i64, generation: u64, state: JobState) -> bool {
        let mut registry = self.lock();
        match registry.slots.get_mut(&idea_id) {
            Some(slot) if slot.generation == generation => {
                slot.state = state;
                true
            }
            _ => false,
        }
    }

    pub fn state(&self, idea_id: i64) -> JobState {
        self.lock()
            .slots
            .get(&idea_id)
            .map(|slot| slot.state.clone())
            .unwrap_or(JobState::Idle)
    }

    /// Drop the state of a deleted idea.
    pub fn forget(&self, idea_id: i64) {
        self.lock().slots.remove(&idea_id);
    }

    /// Start analyzing `idea_id` on the runtime. The state is final once the handle resolves.
    pub fn spawn<G>(
        &self,
        pool: PgPool,
        generator: G,
        idea_id: i64,
        tenant: i64,
    ) -> JoinHandle<Result<AiAnalysis, AppError>>
    where
        G: TextGenerator + 'static,
    {
        let generation = self.begin(idea_id);
        let jobs = self.clone();

        tokio::spawn(async move {
            let result = analyze_idea(&pool, &generator, idea_id, tenant).await;
            let state = match &result {
                Ok(analysis) => JobState::Completed { finished_at: Utc::now(), score: analysis.score() },
                Err(e) => {
                    log::warn!("Background analysis of idea #{idea_id} failed: {e}");
                    JobState::Failed { finished_at: Utc::now(), message: e.public_message() }
                }
            };
            if !jobs.finish(idea_id, generation, state) {
                log::debug!("Discarding outcome of superseded analysis run of idea #{idea_id}");
            }
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_idea_is_idle() {
        let jobs = AnalysisJobs::new();
        assert_eq!(jobs.state(42), JobState::Idle);
    }

    #[test]
    fn state_is_per_idea_and_shared_between_clones() {
        let jobs = AnalysisJobs::new();
        let other = jobs.clone();
        jobs.begin(1);
        assert!(matches!(other.state(1), JobState::Pending { .. }));
        assert_eq!(other.state(2), JobState::Idle);
    }

    #[test]
    fn stale_run_does_not_overwrite_newer_pending_run() {
        let jobs = AnalysisJobs::new();
        let first = jobs.begin(1);
        let second = jobs.begin(1);

        let failed = JobState::Failed { finished_at: Utc::now(), message: "timeout".into() };
        assert!(!jobs.finish(1, first, failed));
        assert!(matches!(jobs.state(1), JobState::Pending { .. }));

        let done = JobState::Completed { finished_at: Utc::now(), score: 7 };
        assert!(jobs.finish(1, second, done.clone()));
        assert_eq!(jobs.state(1), done);
    }

    #[test]
    fn forgotten_idea_is_idle_and_ignores_late_completion() {
        let jobs = AnalysisJobs::new();
        let generation = jobs.begin(3);
        jobs.forget(3);
        assert_eq!(jobs.state(3), JobState::Idle);

        let done = JobState::Completed { finished_at: Utc::now(), score: 6 };
        assert!(!jobs.finish(3, generation, done));
        assert_eq!(jobs.state(3), JobState::Idle);
    }

    #[test]
    fn serializes_with_state_tag() {
        let value = serde_json::to_value(JobState::Failed {
            finished_at: Utc::now(),
            message: "Failed to parse AI response".into(),
        })
        .unwrap();
        assert_eq!(value["state"], "failed");
        assert_eq!(value["message"], "Failed to parse AI response");
        assert!(value.get("finishedAt").is_some());
    }
}
