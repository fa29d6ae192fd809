//! Assistant persona configuration.
//!
//! The persona (system prompt, greeting, language model and voice) is fixed for
//! the lifetime of the process. It is assembled once at startup and handed to the
//! call controller, which uses it to provision assistants on the telephony
//! platform and to answer configuration queries.

use serde::{Deserialize, Serialize};

/// Default persona prompt for the support assistant
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Alex, a customer service voice assistant for TechSolutions. \
Your primary purpose is to help customers resolve issues with their products, answer questions about services, \
and ensure a satisfying support experience.
- Sound friendly, patient, and knowledgeable without being condescending
- Use a conversational tone with natural speech patterns
- Speak with confidence but remain humble when you don't know something
- Demonstrate genuine concern for customer issues";

pub const DEFAULT_ASSISTANT_NAME: &str = "Customer Support Assistant";
pub const DEFAULT_FIRST_MESSAGE: &str =
    "Hi there, this is Alex from customer support. How can I help you today?";

/// Language model backing the assistant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub provider: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o".to_string(),
            temperature: None,
        }
    }
}

/// Text-to-speech voice of the assistant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceConfig {
    pub provider: String,
    pub voice_id: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            provider: "playht".to_string(),
            voice_id: "jennifer".to_string(),
        }
    }
}

/// Immutable persona and voice settings for the assistant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantConfig {
    pub name: String,
    pub system_prompt: String,
    pub first_message: String,
    pub model: ModelConfig,
    pub voice: VoiceConfig,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_ASSISTANT_NAME.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            first_message: DEFAULT_FIRST_MESSAGE.to_string(),
            model: ModelConfig::default(),
            voice: VoiceConfig::default(),
        }
    }
}

impl AssistantConfig {
    /// Validate that the persona is usable
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Assistant name must not be empty".to_string());
        }
        if self.system_prompt.trim().is_empty() {
            return Err("Assistant system prompt must not be empty".to_string());
        }
        if self.model.provider.trim().is_empty() || self.model.model.trim().is_empty() {
            return Err("Assistant model provider and model must be set".to_string());
        }
        if self.voice.provider.trim().is_empty() || self.voice.voice_id.trim().is_empty() {
            return Err("Assistant voice provider and voice_id must be set".to_string());
        }
        if let Some(temperature) = self.model.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(format!(
                    "Assistant model temperature must be between 0.0 and 2.0, got {temperature}"
                ));
            }
        }
        Ok(())
    }
}
