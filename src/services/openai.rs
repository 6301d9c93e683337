use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::ai::AiBackend;

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ContentPart {
    Text {
        #[serde(rename = "type")]
        content_type: String,
        text: String,
    },
    ImageUrl {
        #[serde(rename = "type")]
        content_type: String,
        image_url: ImageData,
    },
}

#[derive(Debug, Serialize)]
struct ImageData {
    url: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    content: String,
}

/// Chat-completions client for OpenAI-compatible endpoints. One instance
/// serves both the vision and the text model.
pub struct OpenAiClient {
    api_key: String,
    vision_model: String,
    text_model: String,
    api_base: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(api_key: String, vision_model: String, text_model: String) -> Self {
        Self::with_api_base(
            api_key,
            vision_model,
            text_model,
            "https://api.openai.com/v1".to_string(),
        )
    }

    pub fn with_api_base(
        api_key: String,
        vision_model: String,
        text_model: String,
        api_base: String,
    ) -> Self {
        // Single attempt with a hard timeout; every caller has a fallback
        // tier, so failing fast beats hanging a mobile request.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            api_key,
            vision_model,
            text_model,
            api_base,
            client,
        }
    }

    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        log::info!("🤖 Sending chat request with model: {}", request.model);
        log::debug!(
            "📤 Request payload size: {} bytes",
            serde_json::to_string(request)?.len()
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        log::debug!("📥 Chat response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await?;
            log::error!("❌ Chat API error response: {}", error_text);
            anyhow::bail!("Chat API error ({}): {}", status, error_text);
        }

        let chat_response: ChatResponse = response.json().await?;
        let choice = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("Chat API returned no choices"))?;

        Ok(choice.message.content)
    }
}

#[async_trait::async_trait]
impl AiBackend for OpenAiClient {
    async fn describe_image(&self, prompt: &str, image_base64: &str) -> Result<String> {
        log::debug!(
            "📸 Starting image analysis ({} base64 bytes)",
            image_base64.len()
        );

        let data_url = format!("data:image/jpeg;base64,{}", image_base64);

        let messages = vec![ChatMessage {
            role: "user".to_string(),
            content: vec![
                ContentPart::Text {
                    content_type: "text".to_string(),
                    text: prompt.to_string(),
                },
                ContentPart::ImageUrl {
                    content_type: "image_url".to_string(),
                    image_url: ImageData { url: data_url },
                },
            ],
        }];

        let request = ChatRequest {
            model: self.vision_model.clone(),
            messages,
            max_tokens: 500,
            temperature: None,
        };

        let content = self.chat(&request).await?;
        log::info!("💬 Vision response: {}", content);
        Ok(content)
    }

    async fn complete_text(&self, system: &str, prompt: &str) -> Result<String> {
        let messages = vec![
            ChatMessage {
                role: "system".to_string(),
                content: vec![ContentPart::Text {
                    content_type: "text".to_string(),
                    text: system.to_string(),
                }],
            },
            ChatMessage {
                role: "user".to_string(),
                content: vec![ContentPart::Text {
                    content_type: "text".to_string(),
                    text: prompt.to_string(),
                }],
            },
        ];

        let request = ChatRequest {
            model: self.text_model.clone(),
            messages,
            max_tokens: 200,
            temperature: Some(0.8),
        };

        self.chat(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_request_serialization() {
        let request = ChatRequest {
            model: "gpt-4-vision-preview".to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ContentPart::Text {
                        content_type: "text".to_string(),
                        text: "Describe this".to_string(),
                    },
                    ContentPart::ImageUrl {
                        content_type: "image_url".to_string(),
                        image_url: ImageData {
                            url: "data:image/jpeg;base64,AAAA".to_string(),
                        },
                    },
                ],
            }],
            max_tokens: 500,
            temperature: None,
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"type\":\"image_url\""));
        assert!(json.contains("data:image/jpeg;base64,AAAA"));
        assert!(!json.contains("temperature"));
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "A plate of pasta."}}
            ]
        }"#;

        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.choices[0].message.content, "A plate of pasta.");
    }
}
