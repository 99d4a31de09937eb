//! folio-extract: prompt templates, the chat-completion client and the
//! model-backed extraction requester

pub mod kind;
pub mod llm;
pub mod prompt;
pub mod requester;

pub use kind::{run, DocumentKind, RunSummary};
pub use llm::{ChatBackend, LlmClient, LlmConfig, Provider};
pub use prompt::{render_prompt, PromptTemplate, SYSTEM_PROMPT};
pub use requester::ModelRequester;
