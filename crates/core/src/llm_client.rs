use anyhow::{Context, Result, anyhow};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Default base URL of Gemini's OpenAI-compatible endpoint.
pub const GEMINI_OPENAI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// A model that turns a prompt into text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Makes a single, non-streaming call and returns the generated text.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// An implementation of `TextGenerator` for any OpenAI-compatible API.
pub struct OpenAICompatibleGenerator {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
}

impl OpenAICompatibleGenerator {
    /// Creates a new generator.
    ///
    /// # Arguments
    ///
    /// * `config` - The configuration for the OpenAI client, including API key and base URL.
    /// * `model` - The model identifier to use for chat completions (e.g., "gemini-1.5-flash").
    /// * `timeout` - Upper bound on a single generation call.
    pub fn new(config: OpenAIConfig, model: String, timeout: Duration) -> Self {
        Self {
            client: Client::with_config(config),
            model,
            timeout,
        }
    }

    /// Creates a generator pointed at Gemini's OpenAI-compatible endpoint.
    pub fn gemini(api_key: &str, api_base: &str, model: String, timeout: Duration) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base);
        Self::new(config, model, timeout)
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for OpenAICompatibleGenerator {
    #[instrument(name = "llm_generate", skip_all, fields(model = %self.model))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![
                ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt.to_string())
                    .build()?
                    .into(),
            ])
            .build()?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| anyhow!("model call timed out after {:?}", self.timeout))??;

        let answer = response
            .choices
            .first()
            .context("No response choice from LLM")?
            .message
            .content
            .clone()
            .context("No content in LLM response")?;

        debug!(chars = answer.len(), "Received model output");
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_generate_times_out_on_silent_server() {
        // Accepts connections and never answers.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let generator = OpenAICompatibleGenerator::gemini(
            "test-key",
            &format!("http://{addr}"),
            "gemini-test".to_string(),
            Duration::from_millis(200),
        );
        let err = generator.generate("hello").await.unwrap_err();

        assert!(err.to_string().contains("timed out after"), "{err}");
        server.abort();
    }

    #[test]
    fn test_gemini_keeps_model() {
        let generator = OpenAICompatibleGenerator::gemini(
            "test-key",
            GEMINI_OPENAI_BASE,
            "gemini-1.5-flash".to_string(),
            Duration::from_secs(1),
        );
        assert_eq!(generator.model(), "gemini-1.5-flash");
    }
}
