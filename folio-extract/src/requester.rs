//! Model-backed extraction: prompt, complete, validate

use folio_core::{validate_reply, ExtractionFailure, ExtractionRequester};
use tracing::debug;

use crate::llm::ChatBackend;
use crate::prompt::{render_prompt, PromptTemplate, SYSTEM_PROMPT};

/// Sends one prompt per request to a chat backend and validates the reply
/// against the requested schema. No retries.
pub struct ModelRequester<B> {
    backend: B,
}

impl<B: ChatBackend> ModelRequester<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<T, B> ExtractionRequester<T> for ModelRequester<B>
where
    T: PromptTemplate,
    B: ChatBackend,
{
    fn request(&self, text: &str) -> Result<T, ExtractionFailure> {
        let prompt = render_prompt::<T>(text);
        let reply = self.backend.complete(SYSTEM_PROMPT, &prompt)?;
        debug!(schema = T::NAME, reply_chars = reply.len(), "reply received");
        validate_reply::<T>(&reply)
    }
}
