//! Coaching data model: résumé input, generated questions, learning path, session.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::coaching::service::CoachingError;

/// Number of interview questions every session carries.
pub const QUESTIONS_PER_SESSION: usize = 5;

const CAREER_SUMMARY_CHARS: (usize, usize) = (10, 500);
const JOB_DUTIES_CHARS: (usize, usize) = (10, 1000);
const SKILLS_COUNT: (usize, usize) = (1, 20);

// ────────────────────────────────────────────────────────────────────────────
// Input
// ────────────────────────────────────────────────────────────────────────────

/// Request body for coaching session creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeInput {
    pub career_summary: String,
    pub job_duties: String,
    pub technical_skills: Vec<String>,
}

impl ResumeInput {
    /// Checks length and presence constraints on the trimmed fields.
    /// Returns the first violation as a user-facing message.
    pub fn validate(&self) -> Result<(), String> {
        check_length("career_summary", &self.career_summary, CAREER_SUMMARY_CHARS)?;
        check_length("job_duties", &self.job_duties, JOB_DUTIES_CHARS)?;

        let (min, max) = SKILLS_COUNT;
        let count = self.technical_skills.len();
        if count < min || count > max {
            return Err(format!(
                "technical_skills must contain between {min} and {max} entries (got {count})"
            ));
        }
        if let Some(pos) = self.technical_skills.iter().position(|s| s.trim().is_empty()) {
            return Err(format!("technical_skills[{pos}] cannot be empty"));
        }
        Ok(())
    }

    /// All résumé text in one lowercase haystack, for keyword rules.
    pub fn lowercase_text(&self) -> String {
        format!(
            "{} {} {}",
            self.career_summary,
            self.job_duties,
            self.technical_skills.join(" ")
        )
        .to_lowercase()
    }
}

fn check_length(field: &str, value: &str, (min, max): (usize, usize)) -> Result<(), String> {
    let len = value.trim().chars().count();
    if len == 0 {
        return Err(format!("{field} cannot be empty"));
    }
    if len < min || len > max {
        return Err(format!(
            "{field} must be between {min} and {max} characters (got {len})"
        ));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Generated content
// ────────────────────────────────────────────────────────────────────────────

/// Question categories requested from the oracle. Replies are not validated
/// against this list; it drives prompts and fallback templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionCategory {
    TechnicalDeepDive,
    SystemDesign,
    Behavioral,
    ProblemSolving,
    CareerVision,
}

impl QuestionCategory {
    pub const ALL: [QuestionCategory; 5] = [
        QuestionCategory::TechnicalDeepDive,
        QuestionCategory::SystemDesign,
        QuestionCategory::Behavioral,
        QuestionCategory::ProblemSolving,
        QuestionCategory::CareerVision,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            QuestionCategory::TechnicalDeepDive => "Technical Deep-Dive",
            QuestionCategory::SystemDesign => "System Design",
            QuestionCategory::Behavioral => "Behavioral",
            QuestionCategory::ProblemSolving => "Problem Solving",
            QuestionCategory::CareerVision => "Career Vision",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestion {
    pub question: String,
    /// Why the interviewer asks it and what it evaluates.
    pub intent: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningStep {
    pub title: String,
    pub description: String,
    /// Search keywords for courses or books.
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPath {
    pub summary: String,
    pub steps: Vec<LearningStep>,
}

/// Response body: one complete coaching session.
///
/// Only constructible through `CoachingSession::new`, which enforces the
/// 5-question / non-empty-path invariant and mints a fresh id. Fields are
/// read-only from outside this module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoachingSession {
    session_id: Uuid,
    interview_questions: Vec<InterviewQuestion>,
    learning_path: LearningPath,
}

impl CoachingSession {
    pub fn new(
        interview_questions: Vec<InterviewQuestion>,
        learning_path: LearningPath,
    ) -> Result<Self, CoachingError> {
        if interview_questions.len() != QUESTIONS_PER_SESSION {
            return Err(CoachingError::InvalidSession(format!(
                "expected {QUESTIONS_PER_SESSION} interview questions, got {}",
                interview_questions.len()
            )));
        }
        if learning_path.steps.is_empty() {
            return Err(CoachingError::InvalidSession(
                "learning path has no steps".to_string(),
            ));
        }

        Ok(Self {
            session_id: Uuid::new_v4(),
            interview_questions,
            learning_path,
        })
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn interview_questions(&self) -> &[InterviewQuestion] {
        &self.interview_questions
    }

    pub fn learning_path(&self) -> &LearningPath {
        &self.learning_path
    }

    /// Same content under a newly generated id.
    pub fn reissue(self) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            ..self
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_sample_resume_is_valid() {
        assert!(sample_resume().validate().is_ok());
    }

    #[test]
    fn test_short_career_summary_rejected() {
        let mut resume = sample_resume();
        resume.career_summary = "  dev  ".to_string();
        let err = resume.validate().unwrap_err();
        assert!(err.contains("career_summary"), "{err}");
    }

    #[test]
    fn test_whitespace_only_field_rejected_as_empty() {
        let mut resume = sample_resume();
        resume.job_duties = "          \n   ".to_string();
        assert_eq!(resume.validate().unwrap_err(), "job_duties cannot be empty");
    }

    #[test]
    fn test_lengths_count_characters_not_bytes() {
        // 10 Hangul syllables = 30 bytes, but exactly the 10-char minimum.
        let mut resume = sample_resume();
        resume.career_summary = "가나다라마바사아자차".to_string();
        assert!(resume.validate().is_ok());
    }

    #[test]
    fn test_skill_count_bounds() {
        let mut resume = sample_resume();
        resume.technical_skills.clear();
        assert!(resume.validate().is_err());

        resume.technical_skills = (0..21).map(|i| format!("skill{i}")).collect();
        assert!(resume.validate().is_err());
    }

    #[test]
    fn test_blank_skill_rejected() {
        let mut resume = sample_resume();
        resume.technical_skills.push("  ".to_string());
        assert_eq!(
            resume.validate().unwrap_err(),
            "technical_skills[5] cannot be empty"
        );
    }

    #[test]
    fn test_session_requires_exactly_five_questions() {
        let four = vec![question("q", "i"); 4];
        assert!(matches!(
            CoachingSession::new(four, path(1)),
            Err(CoachingError::InvalidSession(_))
        ));

        let six = vec![question("q", "i"); 6];
        assert!(CoachingSession::new(six, path(1)).is_err());

        let five = vec![question("q", "i"); 5];
        assert!(CoachingSession::new(five, path(1)).is_ok());
    }

    #[test]
    fn test_session_requires_learning_steps() {
        let five = vec![question("q", "i"); 5];
        assert!(matches!(
            CoachingSession::new(five, path(0)),
            Err(CoachingError::InvalidSession(_))
        ));
    }

    #[test]
    fn test_reissue_changes_only_the_id() {
        let session = CoachingSession::new(vec![question("q", "i"); 5], path(2)).unwrap();
        let original_id = session.session_id;
        let reissued = session.clone().reissue();
        assert_ne!(reissued.session_id, original_id);
        assert_eq!(reissued.interview_questions, session.interview_questions);
        assert_eq!(reissued.learning_path, session.learning_path);
    }

    #[test]
    fn test_session_accessors_and_wire_shape() {
        let session = CoachingSession::new(vec![question("q", "i"); 5], path(2)).unwrap();
        assert_eq!(session.interview_questions().len(), 5);
        assert_eq!(session.learning_path().steps.len(), 2);

        let body = serde_json::to_value(&session).unwrap();
        assert_eq!(body["session_id"], session.session_id().to_string());
        assert_eq!(body["interview_questions"].as_array().unwrap().len(), 5);
        assert_eq!(body["learning_path"]["steps"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_resume_input_deserialization() {
        let json = serde_json::json!({
            "career_summary": "Backend engineer with five years of Rust",
            "job_duties": "Owned the payments ledger service",
            "technical_skills": ["Rust", "PostgreSQL"]
        });
        let resume: ResumeInput = serde_json::from_value(json).unwrap();
        assert_eq!(resume.technical_skills.len(), 2);
    }

    #[test]
    fn test_category_labels() {
        let labels: Vec<&str> = QuestionCategory::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Technical Deep-Dive",
                "System Design",
                "Behavioral",
                "Problem Solving",
                "Career Vision"
            ]
        );
    }
}
