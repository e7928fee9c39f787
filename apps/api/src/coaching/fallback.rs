//! Deterministic fallback content, used when the oracle fails or its reply
//! cannot be parsed. Built only from the résumé's skill strings; never calls the LLM.

use tracing::info;

use crate::coaching::models::{
    InterviewQuestion, LearningPath, LearningStep, QuestionCategory, ResumeInput,
};

/// How many leading skills the templates mention.
const PRIMARY_SKILL_COUNT: usize = 3;

fn primary_skills(resume: &ResumeInput) -> Vec<&str> {
    resume
        .technical_skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .take(PRIMARY_SKILL_COUNT)
        .collect()
}

fn skills_phrase(skills: &[&str]) -> String {
    if skills.is_empty() {
        "your core technologies".to_string()
    } else {
        skills.join(", ")
    }
}

fn question(question: String, intent: &str, category: QuestionCategory) -> InterviewQuestion {
    InterviewQuestion {
        question,
        intent: intent.to_string(),
        category: category.as_str().to_string(),
    }
}

/// Five template questions, one per category.
pub fn fallback_questions(resume: &ResumeInput) -> Vec<InterviewQuestion> {
    info!("Generating fallback interview questions");

    let skills = primary_skills(resume);
    let lead_skill = skills.first().copied().unwrap_or("your main stack");
    let phrase = skills_phrase(&skills);

    vec![
        question(
            format!("What was the most challenging technical problem you solved with {lead_skill}, and how exactly did you solve it?"),
            "Evaluates problem-solving ability and technical depth.",
            QuestionCategory::TechnicalDeepDive,
        ),
        question(
            format!("In a project built on {phrase}, how did you find and fix a performance bottleneck in production?"),
            "Verifies performance-optimization experience and technical approach.",
            QuestionCategory::SystemDesign,
        ),
        question(
            "How do you resolve a technical disagreement with a teammate? Describe a real case.".to_string(),
            "Evaluates collaboration and communication skills.",
            QuestionCategory::Behavioral,
        ),
        question(
            format!("Walk me through your incident response when a service built with {phrase} fails in production."),
            "Evaluates incident handling and operational experience.",
            QuestionCategory::ProblemSolving,
        ),
        question(
            format!("Beyond {lead_skill}, what are your technical growth goals for the next three to five years?"),
            "Evaluates motivation for self-development and long-term vision.",
            QuestionCategory::CareerVision,
        ),
    ]
}

/// Three-step template path anchored on the leading skills.
pub fn fallback_learning_path(resume: &ResumeInput) -> LearningPath {
    info!("Generating fallback learning path");

    let skills = primary_skills(resume);
    let phrase = skills_phrase(&skills);

    let mut depth_resources: Vec<String> = skills
        .iter()
        .take(2)
        .map(|s| format!("{s} advanced guide"))
        .collect();
    depth_resources.push("performance optimization patterns".to_string());

    LearningPath {
        summary: format!(
            "A structured path for growing into a senior engineer, building on your experience with {phrase}."
        ),
        steps: vec![
            LearningStep {
                title: "Deepen technical expertise".to_string(),
                description: format!(
                    "Study advanced concepts and optimization techniques for {phrase} and apply them in a real project."
                ),
                resources: depth_resources,
            },
            LearningStep {
                title: "Develop system design skills".to_string(),
                description: "Run a side project that exercises large-scale architecture: service boundaries, messaging and data consistency.".to_string(),
                resources: vec![
                    "System Design Interview".to_string(),
                    "microservice architecture".to_string(),
                    "distributed systems design".to_string(),
                ],
            },
            LearningStep {
                title: "Build technical leadership".to_string(),
                description: "Establish a code review culture, write technical documents and share knowledge inside the team.".to_string(),
                resources: vec![
                    "Effective Code Review".to_string(),
                    "technical blogging".to_string(),
                    "conference talk preparation".to_string(),
                ],
            },
        ],
    }
}
