// Career coaching: résumé in, interview questions and a learning path out.
// Implements: persona/strategy selection, prompt composition, reply parsing,
// template fallback, quality scoring and best-of-N orchestration.
// All oracle calls go through llm_client.

pub mod fallback;
pub mod handlers;
pub mod models;
pub mod parser;
pub mod persona;
pub mod prompts;
pub mod quality;
pub mod service;
