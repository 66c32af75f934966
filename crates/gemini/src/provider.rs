use async_trait::async_trait;

use crate::client::GeminiClient;
use crate::error::GeminiResult;
use crate::schema::ResponseSchema;

/// A generative completion service that returns text shaped by a schema.
///
/// The returned text is untrusted: implementations make no promise that it
/// is non-empty, valid JSON, or conforms to `schema`.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn generate(&self, prompt: &str, schema: &ResponseSchema) -> GeminiResult<String>;

    /// Short label for logs
    fn name(&self) -> &str {
        "completion"
    }
}

#[async_trait]
impl CompletionProvider for GeminiClient {
    async fn generate(&self, prompt: &str, schema: &ResponseSchema) -> GeminiResult<String> {
        self.generate_content(prompt, schema).await
    }

    fn name(&self) -> &str {
        self.model()
    }
}
