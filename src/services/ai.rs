use anyhow::Result;

/// Narrow seam in front of the external AI provider. The caption generator
/// only ever needs these two calls; running without a backend at all is the
/// fallback-only mode.
#[async_trait::async_trait]
pub trait AiBackend: Send + Sync {
    /// Describe a base64-encoded image, guided by `prompt`. Returns the
    /// model's free-text reply.
    async fn describe_image(&self, prompt: &str, image_base64: &str) -> Result<String>;

    /// Plain text completion with a system role and a user prompt.
    async fn complete_text(&self, system: &str, prompt: &str) -> Result<String>;
}
