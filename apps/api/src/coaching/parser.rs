//! Reply parsing: turns untrusted oracle text into questions / learning paths.
//!
//! JSON mode is advisory, so replies are recovered defensively: code fences
//! are stripped, surrounding prose is trimmed to the outermost `{...}`, and the
//! envelope key, field presence and counts are checked. Every failure is
//! `LlmError::MalformedOutput`.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::coaching::models::{InterviewQuestion, LearningPath, QUESTIONS_PER_SESSION};
use crate::llm_client::{strip_json_fences, LlmError};

#[derive(Debug, Deserialize)]
struct QuestionsEnvelope {
    interview_questions: Vec<InterviewQuestion>,
}

#[derive(Debug, Deserialize)]
struct LearningEnvelope {
    learning_path: LearningPath,
}

/// Parses an `{"interview_questions": [...]}` reply holding exactly five questions.
pub fn parse_interview_questions(reply: &str) -> Result<Vec<InterviewQuestion>, LlmError> {
    let envelope: QuestionsEnvelope = parse_envelope(reply)?;
    let count = envelope.interview_questions.len();
    if count != QUESTIONS_PER_SESSION {
        return Err(LlmError::MalformedOutput(format!(
            "expected {QUESTIONS_PER_SESSION} interview questions, got {count}"
        )));
    }
    Ok(envelope.interview_questions)
}

/// Parses a `{"learning_path": {...}}` reply holding at least one step.
pub fn parse_learning_path(reply: &str) -> Result<LearningPath, LlmError> {
    let envelope: LearningEnvelope = parse_envelope(reply)?;
    if envelope.learning_path.steps.is_empty() {
        return Err(LlmError::MalformedOutput(
            "learning path has no steps".to_string(),
        ));
    }
    Ok(envelope.learning_path)
}

fn parse_envelope<T: DeserializeOwned>(reply: &str) -> Result<T, LlmError> {
    let text = strip_json_fences(reply);
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(first) => {
            // Model added prose around the object: retry on the outermost braces.
            let inner = outermost_object(text).ok_or_else(|| {
                LlmError::MalformedOutput(format!("reply is not JSON: {first}"))
            })?;
            serde_json::from_str(inner)
                .map_err(|e| LlmError::MalformedOutput(format!("reply does not match contract: {e}")))
        }
    }
}

fn outermost_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
