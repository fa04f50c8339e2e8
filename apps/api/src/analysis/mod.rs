// Résumé analysis: prompt construction, orchestration and HTTP handlers.
// All LLM calls go through llm_client.

pub mod handlers;
pub mod prompt_builder;
pub mod prompts;
pub mod service;
