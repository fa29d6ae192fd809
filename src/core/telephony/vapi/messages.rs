//! Request and response bodies for the Vapi REST API.

use serde::{Deserialize, Serialize};

use crate::config::AssistantConfig;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCallRequest<'a> {
    pub assistant_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number_id: Option<&'a str>,
    pub customer: Customer<'a>,
    #[serde(skip_serializing_if = "is_empty_metadata")]
    pub metadata: &'a serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistant_overrides: Option<AssistantOverrides<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Customer<'a> {
    pub number: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantOverrides<'a> {
    pub first_message: &'a str,
}

fn is_empty_metadata(value: &&serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

#[derive(Debug, Deserialize)]
pub struct CallResponse {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePhoneNumberRequest<'a> {
    pub assistant_id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneNumberResponse {
    pub id: String,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub assistant_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssistantRequest<'a> {
    pub name: &'a str,
    pub first_message: &'a str,
    pub model: ModelBody<'a>,
    pub voice: VoiceBody<'a>,
}

#[derive(Debug, Serialize)]
pub struct ModelBody<'a> {
    pub provider: &'a str,
    pub model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    pub messages: Vec<ModelMessage<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ModelMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceBody<'a> {
    pub provider: &'a str,
    pub voice_id: &'a str,
}

impl<'a> From<&'a AssistantConfig> for CreateAssistantRequest<'a> {
    fn from(config: &'a AssistantConfig) -> Self {
        Self {
            name: &config.name,
            first_message: &config.first_message,
            model: ModelBody {
                provider: &config.model.provider,
                model: &config.model.model,
                temperature: config.model.temperature,
                messages: vec![ModelMessage {
                    role: "system",
                    content: &config.system_prompt,
                }],
            },
            voice: VoiceBody {
                provider: &config.voice.provider,
                voice_id: &config.voice.voice_id,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AssistantResponse {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}
