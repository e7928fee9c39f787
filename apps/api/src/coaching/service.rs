//! Coaching Session Orchestrator: turns one résumé into one CoachingSession.
//!
//! Standard mode: questions and learning path are generated concurrently; each
//! half falls back to deterministic templates on any oracle or parse failure.
//!
//! Optimized mode: 3 strategies × 3 personas = 9 candidates, all generated
//! concurrently (18 oracle calls). A malformed half is replaced by its template;
//! a candidate whose oracle call fails is dropped. Survivors are scored by the
//! `SessionScorer` and the best one is returned. No survivors means standard mode.
//!
//! The whole orchestration runs under a per-request deadline.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::coaching::fallback::{fallback_learning_path, fallback_questions};
use crate::coaching::models::{CoachingSession, InterviewQuestion, LearningPath, ResumeInput};
use crate::coaching::parser::{parse_interview_questions, parse_learning_path};
use crate::coaching::persona::{Persona, Strategy};
use crate::coaching::prompts::PromptComposer;
use crate::coaching::quality::{generate_improvement_suggestions, QualityScore, SessionScorer};
use crate::config::Config;
use crate::llm_client::{CompletionOptions, LlmClient, LlmError};

/// Candidate grid for optimized mode, enumerated strategy-major.
const CANDIDATE_STRATEGIES: [Strategy; 3] = [
    Strategy::Balanced,
    Strategy::TechnicalDeep,
    Strategy::SystemDesign,
];
const CANDIDATE_PERSONAS: [Persona; 3] = [
    Persona::SeniorEngineer,
    Persona::TechLead,
    Persona::PlatformArchitect,
];

#[derive(Debug, Error)]
pub enum CoachingError {
    #[error("coaching session generation failed: {0}")]
    Oracle(#[from] LlmError),

    #[error("invalid coaching session: {0}")]
    InvalidSession(String),

    #[error("coaching session not ready within {}s", .0.as_secs())]
    DeadlineExceeded(Duration),
}

impl CoachingError {
    /// True when the failure comes from the oracle being slow or unreachable,
    /// as opposed to a bug in session assembly.
    pub fn is_oracle_unavailable(&self) -> bool {
        matches!(
            self,
            CoachingError::Oracle(_) | CoachingError::DeadlineExceeded(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    Standard,
    Optimized,
}

impl GenerationMode {
    pub fn from_optimize_flag(optimize: bool) -> Self {
        if optimize {
            GenerationMode::Optimized
        } else {
            GenerationMode::Standard
        }
    }
}

/// Per-call-type completion options and the request deadline.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub question_options: CompletionOptions,
    pub learning_options: CompletionOptions,
    pub deadline: Duration,
}

impl ServiceSettings {
    pub fn from_config(config: &Config) -> Self {
        let options = |max_tokens| CompletionOptions {
            model: config.llm_model.clone(),
            temperature: config.llm_temperature,
            max_tokens: Some(max_tokens),
            json: true,
        };

        Self {
            question_options: options(config.llm_question_max_tokens),
            learning_options: options(config.llm_learning_max_tokens),
            deadline: Duration::from_secs(config.request_deadline_secs),
        }
    }
}

/// Stateless after construction; shared across requests behind an `Arc`.
pub struct CoachingService {
    llm: LlmClient,
    composer: PromptComposer,
    scorer: Arc<dyn SessionScorer>,
    settings: ServiceSettings,
}

impl CoachingService {
    pub fn new(
        llm: LlmClient,
        composer: PromptComposer,
        scorer: Arc<dyn SessionScorer>,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            llm,
            composer,
            scorer,
            settings,
        }
    }

    /// Generates a session in the given mode, bounded by the request deadline.
    pub async fn create_session(
        &self,
        resume: &ResumeInput,
        mode: GenerationMode,
    ) -> Result<CoachingSession, CoachingError> {
        let started = Instant::now();
        info!("Creating coaching session (mode: {mode:?})");

        let generation = async {
            match mode {
                GenerationMode::Standard => self.create_standard_session(resume).await,
                GenerationMode::Optimized => self.create_optimized_session(resume).await,
            }
        };

        let session = match tokio::time::timeout(self.settings.deadline, generation).await {
            Ok(result) => result?,
            Err(_) => {
                error!(
                    "Coaching session deadline of {}s exceeded (mode: {mode:?})",
                    self.settings.deadline.as_secs()
                );
                return Err(CoachingError::DeadlineExceeded(self.settings.deadline));
            }
        };

        info!(
            "Coaching session {} created in {}ms (mode: {mode:?})",
            session.session_id(),
            started.elapsed().as_millis()
        );
        Ok(session)
    }

    /// Questions and learning path in parallel, each with its own template fallback.
    pub async fn create_standard_session(
        &self,
        resume: &ResumeInput,
    ) -> Result<CoachingSession, CoachingError> {
        let (questions, path) = tokio::join!(
            self.generate_questions(resume, None, None),
            self.generate_learning_path(resume, None),
        );

        let questions = questions.unwrap_or_else(|e| {
            warn!("Interview question generation failed, using fallback: {e}");
            fallback_questions(resume)
        });
        let path = path.unwrap_or_else(|e| {
            warn!("Learning path generation failed, using fallback: {e}");
            fallback_learning_path(resume)
        });

        CoachingSession::new(questions, path)
    }

    /// Best-of-nine over the persona × strategy grid.
    pub async fn create_optimized_session(
        &self,
        resume: &ResumeInput,
    ) -> Result<CoachingSession, CoachingError> {
        let grid: Vec<(Strategy, Persona)> = CANDIDATE_STRATEGIES
            .iter()
            .flat_map(|&strategy| CANDIDATE_PERSONAS.iter().map(move |&persona| (strategy, persona)))
            .collect();

        let results = join_all(
            grid.iter()
                .map(|&(strategy, persona)| self.generate_candidate(resume, persona, strategy)),
        )
        .await;

        let mut best: Option<(CoachingSession, QualityScore)> = None;
        for ((strategy, persona), result) in grid.into_iter().zip(results) {
            let session = match result {
                Ok(session) => session,
                Err(e) => {
                    warn!(
                        "Candidate {}/{} dropped: {e}",
                        strategy.as_str(),
                        persona.as_str()
                    );
                    continue;
                }
            };

            let score = self.scorer.score(&session, resume);
            info!(
                "Candidate {}/{} scored {:.2}",
                strategy.as_str(),
                persona.as_str(),
                score.overall
            );

            // Strictly greater: the first-seen candidate keeps ties.
            if best.as_ref().map_or(true, |(_, top)| score.overall > top.overall) {
                best = Some((session, score));
            }
        }

        let Some((session, score)) = best else {
            warn!("All optimization candidates failed, degrading to standard mode");
            return self.create_standard_session(resume).await;
        };

        info!("Selected candidate with overall score {:.2}", score.overall);
        for suggestion in generate_improvement_suggestions(&score) {
            info!("Quality suggestion: {suggestion}");
        }

        Ok(session.reissue())
    }

    /// One candidate. A malformed half is replaced by its template; an oracle
    /// failure on either half rejects the candidate.
    async fn generate_candidate(
        &self,
        resume: &ResumeInput,
        persona: Persona,
        strategy: Strategy,
    ) -> Result<CoachingSession, CoachingError> {
        let (questions, path) = tokio::join!(
            self.generate_questions(resume, Some(persona), Some(strategy)),
            self.generate_learning_path(resume, Some(persona)),
        );

        let questions = recover_malformed(questions, "interview questions", || {
            fallback_questions(resume)
        })?;
        let path = recover_malformed(path, "learning path", || fallback_learning_path(resume))?;

        CoachingSession::new(questions, path)
    }

    pub async fn generate_questions(
        &self,
        resume: &ResumeInput,
        persona: Option<Persona>,
        strategy: Option<Strategy>,
    ) -> Result<Vec<InterviewQuestion>, LlmError> {
        let prompt = self.composer.build_interview_prompt(resume, persona, strategy);
        let reply = self.llm.complete(&prompt, &self.settings.question_options).await?;
        parse_interview_questions(&reply)
    }

    pub async fn generate_learning_path(
        &self,
        resume: &ResumeInput,
        persona: Option<Persona>,
    ) -> Result<LearningPath, LlmError> {
        let prompt = self.composer.build_learning_prompt(resume, persona);
        let reply = self.llm.complete(&prompt, &self.settings.learning_options).await?;
        parse_learning_path(&reply)
    }

    /// Oracle reachability. Never errors.
    pub async fn health_check(&self) -> bool {
        self.llm.health_check().await
    }
}

/// Swaps a malformed reply for `fallback()`; oracle errors pass through.
fn recover_malformed<T>(
    result: Result<T, LlmError>,
    what: &str,
    fallback: impl FnOnce() -> T,
) -> Result<T, LlmError> {
    match result {
        Err(LlmError::MalformedOutput(reason)) => {
            warn!("Malformed {what} reply, using fallback: {reason}");
            Ok(fallback())
        }
        other => other,
    }
}
