//! Quality Scoring: heuristic rubric that ranks candidate coaching sessions.
//!
//! Default: `HeuristicScorer` over `Rubric::default()` (pure Rust, deterministic).
//! `CoachingService` holds an `Arc<dyn SessionScorer>`, so the rubric tables or
//! the whole scorer can be swapped at startup.
//!
//! Every dimension lives on a 1.0 – 5.0 scale. Questions and the learning path
//! are scored separately and blended 0.6 / 0.4 per dimension.

use serde::Serialize;

use crate::coaching::models::{CoachingSession, InterviewQuestion, LearningStep, ResumeInput};

const MIN_SCORE: f64 = 1.0;
const MAX_SCORE: f64 = 5.0;

/// Dimensions below this get an improvement suggestion.
const SUGGESTION_THRESHOLD: f64 = 3.0;
/// Overall score at or above this earns the affirmation message.
const AFFIRMATION_THRESHOLD: f64 = 4.0;

// ────────────────────────────────────────────────────────────────────────────
// Output model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityScore {
    pub relevance: f64,
    pub depth: f64,
    pub actionability: f64,
    pub practicality: f64,
    /// Unweighted mean of the four dimensions.
    pub overall: f64,
}

impl QualityScore {
    pub fn new(relevance: f64, depth: f64, actionability: f64, practicality: f64) -> Self {
        Self {
            relevance,
            depth,
            actionability,
            practicality,
            overall: (relevance + depth + actionability + practicality) / 4.0,
        }
    }

    fn floor() -> Self {
        Self::new(MIN_SCORE, MIN_SCORE, MIN_SCORE, MIN_SCORE)
    }

    fn blend(&self, other: &QualityScore, self_weight: f64, other_weight: f64) -> Self {
        Self::new(
            self.relevance * self_weight + other.relevance * other_weight,
            self.depth * self_weight + other.depth * other_weight,
            self.actionability * self_weight + other.actionability * other_weight,
            self.practicality * self_weight + other.practicality * other_weight,
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Rubric tables
// ────────────────────────────────────────────────────────────────────────────

/// Every tunable number and vocabulary the heuristics use.
///
/// Vocabularies are lowercase and matched as substrings of lowercased text.
/// Bands are `(minimum, score)` pairs checked top-down.
#[derive(Debug, Clone)]
pub struct Rubric {
    /// Keyword-overlap fraction → relevance score.
    pub relevance_bands: &'static [(f64, f64)],
    /// Relevance when the résumé yields no keywords.
    pub relevance_neutral: f64,
    /// Résumé keywords must be longer than this (in chars) to count as a hit.
    pub min_keyword_chars: usize,

    pub depth_vocabulary: &'static [&'static str],
    pub experience_markers: &'static [&'static str],
    /// Depth-indicator count → depth score.
    pub depth_bands: &'static [(f64, f64)],
    pub long_question_chars: usize,
    pub experience_marker_bonus: f64,

    pub vague_words: &'static [&'static str],
    pub concrete_words: &'static [&'static str],
    pub how_to_words: &'static [&'static str],

    pub production_words: &'static [&'static str],
    pub evaluation_verbs: &'static [&'static str],
    pub theoretical_words: &'static [&'static str],

    pub project_words: &'static [&'static str],
    pub design_words: &'static [&'static str],
    pub detailed_description_chars: usize,
    pub actionable_verbs: &'static [&'static str],
    pub actionable_cap: usize,
    pub side_project_words: &'static [&'static str],
    pub career_words: &'static [&'static str],
    pub technology_words: &'static [&'static str],

    pub question_weight: f64,
    pub learning_path_weight: f64,
}

const RELEVANCE_BANDS: &[(f64, f64)] = &[(0.30, 5.0), (0.20, 4.0), (0.10, 3.0), (0.05, 2.0)];
const DEPTH_BANDS: &[(f64, f64)] = &[(5.0, 5.0), (4.0, 4.0), (3.0, 3.0), (2.0, 2.0)];

const DEPTH_VOCABULARY: &[&str] = &[
    "구체적으로", "단계별", "trade-off", "장단점", "최적화", "아키텍처", "패턴", "전략", "방법론",
    "구현", "경험", "specifically", "step by step", "step-by-step", "tradeoff", "optimiz",
    "architecture", "pattern", "strategy", "methodology", "implement", "experience",
];

const EXPERIENCE_MARKERS: &[&str] = &[
    "예시", "사례", "경험", "상황", "example", "case", "experience", "situation",
];

const VAGUE_WORDS: &[&str] = &[
    "일반적으로", "보통", "대부분", "generally", "usually", "typically", "in general",
];

const CONCRETE_WORDS: &[&str] = &[
    "경험", "사례", "프로젝트에서", "실제로", "experience", "real case", "in your project",
    "actually",
];

const HOW_TO_WORDS: &[&str] = &[
    "단계별", "구체적으로", "어떻게", "방법", "step by step", "step-by-step", "specifically",
    "how did", "how would", "how do",
];

const PRODUCTION_WORDS: &[&str] = &[
    "실무", "프로덕션", "운영", "실제", "production", "operat", "on-call", "incident",
];

const EVALUATION_VERBS: &[&str] = &[
    "평가", "검증", "확인", "측정", "evaluat", "verif", "assess", "measur",
];

const THEORETICAL_WORDS: &[&str] = &[
    "이론적으로", "개념적으로", "일반론", "theoretically", "conceptually", "in theory",
];

const PROJECT_WORDS: &[&str] = &[
    "프로젝트", "구축", "개발", "구현", "project", "build", "implement", "develop",
];

const DESIGN_WORDS: &[&str] = &[
    "아키텍처", "패턴", "최적화", "설계", "architecture", "pattern", "optimiz", "design",
];

const ACTIONABLE_VERBS: &[&str] = &[
    "프로젝트", "구축", "학습", "실습", "적용", "구현", "연습", "경험", "실행", "진행", "개발",
    "project", "build", "learn", "practice", "apply", "implement", "experiment", "deploy",
    "develop",
];

const SIDE_PROJECT_WORDS: &[&str] = &[
    "사이드 프로젝트", "토이 프로젝트", "연습", "실습", "side project", "toy project", "practice",
    "hands-on",
];

const CAREER_WORDS: &[&str] = &[
    "승진", "이직", "성장", "역량", "스킬", "promotion", "career", "growth", "competenc", "skill",
];

const TECHNOLOGY_WORDS: &[&str] = &[
    "kubernetes", "docker", "aws", "spring", "python", "kafka", "redis", "terraform",
];

impl Default for Rubric {
    fn default() -> Self {
        Self {
            relevance_bands: RELEVANCE_BANDS,
            relevance_neutral: 3.0,
            min_keyword_chars: 2,
            depth_vocabulary: DEPTH_VOCABULARY,
            experience_markers: EXPERIENCE_MARKERS,
            depth_bands: DEPTH_BANDS,
            long_question_chars: 100,
            experience_marker_bonus: 2.0,
            vague_words: VAGUE_WORDS,
            concrete_words: CONCRETE_WORDS,
            how_to_words: HOW_TO_WORDS,
            production_words: PRODUCTION_WORDS,
            evaluation_verbs: EVALUATION_VERBS,
            theoretical_words: THEORETICAL_WORDS,
            project_words: PROJECT_WORDS,
            design_words: DESIGN_WORDS,
            detailed_description_chars: 50,
            actionable_verbs: ACTIONABLE_VERBS,
            actionable_cap: 3,
            side_project_words: SIDE_PROJECT_WORDS,
            career_words: CAREER_WORDS,
            technology_words: TECHNOLOGY_WORDS,
            question_weight: 0.6,
            learning_path_weight: 0.4,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Ranks one candidate session against the résumé it was generated from.
pub trait SessionScorer: Send + Sync {
    fn score(&self, session: &CoachingSession, resume: &ResumeInput) -> QualityScore;
}

// ────────────────────────────────────────────────────────────────────────────
// HeuristicScorer: keyword rubric
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct HeuristicScorer {
    rubric: Rubric,
}

impl SessionScorer for HeuristicScorer {
    fn score(&self, session: &CoachingSession, resume: &ResumeInput) -> QualityScore {
        let questions = self.score_questions(session.interview_questions(), resume);
        let path = self.score_learning_path(
            &session.learning_path().summary,
            &session.learning_path().steps,
            resume,
        );
        questions.blend(
            &path,
            self.rubric.question_weight,
            self.rubric.learning_path_weight,
        )
    }
}

fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

fn count_hits(text: &str, words: &[&str]) -> usize {
    words.iter().filter(|w| text.contains(*w)).count()
}

fn band(value: f64, bands: &[(f64, f64)]) -> f64 {
    bands
        .iter()
        .find(|(min, _)| value >= *min)
        .map(|(_, score)| *score)
        .unwrap_or(MIN_SCORE)
}

fn clamp_score(value: f64) -> f64 {
    value.clamp(MIN_SCORE, MAX_SCORE)
}

/// Maps `raw` out of `per_step_max * steps` onto the 1–5 scale.
fn normalize(raw: f64, per_step_max: f64, steps: usize) -> f64 {
    let max_possible = per_step_max * steps as f64;
    if max_possible <= 0.0 {
        return MIN_SCORE;
    }
    clamp_score(raw / max_possible * MAX_SCORE)
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        MIN_SCORE
    } else {
        sum / n as f64
    }
}

impl HeuristicScorer {
    pub fn new(rubric: Rubric) -> Self {
        Self { rubric }
    }

    /// Fraction of résumé keywords found in `text`, banded to 1–5.
    pub fn relevance(&self, text: &str, resume: &ResumeInput) -> f64 {
        let text = text.to_lowercase();
        let keywords: Vec<String> = resume
            .career_summary
            .to_lowercase()
            .split_whitespace()
            .chain(resume.job_duties.to_lowercase().split_whitespace())
            .map(str::to_string)
            .chain(resume.technical_skills.iter().map(|s| s.to_lowercase()))
            .collect();

        if keywords.is_empty() {
            return self.rubric.relevance_neutral;
        }

        let matches = keywords
            .iter()
            .filter(|k| k.chars().count() > self.rubric.min_keyword_chars && text.contains(k.as_str()))
            .count();

        band(
            matches as f64 / keywords.len() as f64,
            self.rubric.relevance_bands,
        )
    }

    pub fn question_depth(&self, question: &str, intent: &str) -> f64 {
        let r = &self.rubric;
        let question = question.to_lowercase();
        let intent = intent.to_lowercase();

        let mut indicators = r
            .depth_vocabulary
            .iter()
            .filter(|w| question.contains(*w) || intent.contains(*w))
            .count() as f64;

        if question.chars().count() > r.long_question_chars {
            indicators += 1.0;
        }
        if question.matches('?').count() == 1 {
            indicators += 1.0;
        }
        if contains_any(&question, r.experience_markers) {
            indicators += r.experience_marker_bonus;
        }

        band(indicators, r.depth_bands)
    }

    pub fn question_answerability(&self, question: &str) -> f64 {
        let r = &self.rubric;
        let question = question.to_lowercase();
        let mut score = 3.0;

        if contains_any(&question, r.vague_words) {
            score -= 1.0;
        }
        if contains_any(&question, r.concrete_words) {
            score += 1.0;
        }
        if contains_any(&question, r.how_to_words) {
            score += 0.5;
        }

        clamp_score(score)
    }

    pub fn question_practicality(&self, question: &str, intent: &str) -> f64 {
        let r = &self.rubric;
        let question = question.to_lowercase();
        let intent = intent.to_lowercase();
        let mut score = 3.0;

        if contains_any(&question, r.production_words) {
            score += 1.0;
        }
        if contains_any(&intent, r.evaluation_verbs) {
            score += 0.5;
        }
        if contains_any(&question, r.theoretical_words) {
            score -= 1.0;
        }

        clamp_score(score)
    }

    /// Per-dimension mean over all questions.
    pub fn score_questions(&self, questions: &[InterviewQuestion], resume: &ResumeInput) -> QualityScore {
        if questions.is_empty() {
            return QualityScore::floor();
        }

        let per_question: Vec<QualityScore> = questions
            .iter()
            .map(|q| {
                QualityScore::new(
                    self.relevance(&q.question, resume),
                    self.question_depth(&q.question, &q.intent),
                    self.question_answerability(&q.question),
                    self.question_practicality(&q.question, &q.intent),
                )
            })
            .collect();

        QualityScore::new(
            mean(per_question.iter().map(|s| s.relevance)),
            mean(per_question.iter().map(|s| s.depth)),
            mean(per_question.iter().map(|s| s.actionability)),
            mean(per_question.iter().map(|s| s.practicality)),
        )
    }

    pub fn score_learning_path(
        &self,
        summary: &str,
        steps: &[LearningStep],
        resume: &ResumeInput,
    ) -> QualityScore {
        if steps.is_empty() {
            return QualityScore::floor();
        }

        let steps_text = steps
            .iter()
            .map(step_text)
            .collect::<Vec<_>>()
            .join(" ");

        QualityScore::new(
            self.relevance(&format!("{summary} {steps_text}"), resume),
            self.learning_depth(steps),
            self.learning_actionability(steps),
            self.learning_practicality(steps),
        )
    }

    pub fn learning_depth(&self, steps: &[LearningStep]) -> f64 {
        let r = &self.rubric;
        let raw: f64 = steps
            .iter()
            .map(|step| {
                let text = step_text(step);
                let mut points = 0.0;
                if contains_any(&text, r.project_words) {
                    points += 1.0;
                }
                if contains_any(&text, r.design_words) {
                    points += 1.0;
                }
                if step.description.chars().count() > r.detailed_description_chars {
                    points += 0.5;
                }
                points
            })
            .sum();
        normalize(raw, 2.5, steps.len())
    }

    pub fn learning_actionability(&self, steps: &[LearningStep]) -> f64 {
        let r = &self.rubric;
        let raw: f64 = steps
            .iter()
            .map(|step| {
                let text = step_text(step);
                let verbs = count_hits(&text, r.actionable_verbs).min(r.actionable_cap) as f64;
                let resources = if step.resources.is_empty() { 0.0 } else { 1.0 };
                verbs + resources
            })
            .sum();
        normalize(raw, r.actionable_cap as f64 + 1.0, steps.len())
    }

    pub fn learning_practicality(&self, steps: &[LearningStep]) -> f64 {
        let r = &self.rubric;
        let raw: f64 = steps
            .iter()
            .map(|step| {
                let text = step_text(step);
                let mut points = 0.0;
                if contains_any(&text, r.side_project_words) {
                    points += 1.0;
                }
                if contains_any(&text, r.career_words) {
                    points += 1.0;
                }
                if contains_any(&text, r.technology_words) {
                    points += 0.5;
                }
                points
            })
            .sum();
        normalize(raw, 2.5, steps.len())
    }
}

fn step_text(step: &LearningStep) -> String {
    format!("{} {}", step.title, step.description).to_lowercase()
}

/// Advisory messages for weak dimensions, plus an affirmation for strong results.
pub fn generate_improvement_suggestions(score: &QualityScore) -> Vec<String> {
    let mut suggestions = Vec::new();

    if score.relevance < SUGGESTION_THRESHOLD {
        suggestions.push(
            "Reference the résumé's concrete tech stack and project experience more directly."
                .to_string(),
        );
    }
    if score.depth < SUGGESTION_THRESHOLD {
        suggestions.push("Make the questions and learning steps more specific and in-depth.".to_string());
    }
    if score.actionability < SUGGESTION_THRESHOLD {
        suggestions.push("Provide more executable, concrete action items.".to_string());
    }
    if score.practicality < SUGGESTION_THRESHOLD {
        suggestions.push("Tie the content more closely to real-world production work.".to_string());
    }
    if score.overall >= AFFIRMATION_THRESHOLD {
        suggestions.push("Excellent quality result.".to_string());
    }

    suggestions
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
