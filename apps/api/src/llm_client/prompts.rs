// Cross-cutting prompt fragments owned by the LLM client.
// Task prompts live next to the service that uses them (coaching::prompts).

/// Appended to every prompt sent with `json: true`.
pub const JSON_ONLY_INSTRUCTION: &str = "IMPORTANT: Respond with a single valid JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Token the oracle must echo back for the health probe to pass.
pub const HEALTH_CHECK_MARKER: &str = "HEALTHY";

pub const HEALTH_CHECK_PROMPT: &str =
    "This is a connectivity test. Reply with the single word HEALTHY and nothing else.";
