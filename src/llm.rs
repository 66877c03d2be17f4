use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};

use crate::config::ProbeConfig;
use crate::error::ProbeError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Message {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub messages: Vec<Message>,
    pub model: String,
    pub stream: bool,
    pub temperature: f32,
}

impl ChatCompletionRequest {
    /// Single user turn, non-streaming.
    pub fn single_turn(model: &str, prompt: &str, temperature: f32) -> Self {
        ChatCompletionRequest {
            messages: vec![Message::user(prompt)],
            model: model.to_string(),
            stream: false,
            temperature,
        }
    }
}

/// Decode an optional field, treating `null` or a value of the wrong type as absent.
///
/// Only `choices[0].message.content` decides whether a reply is usable; the
/// echoed model name and token counts are informational.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default, deserialize_with = "lenient")]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default, deserialize_with = "lenient")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default, deserialize_with = "lenient")]
    pub prompt_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub completion_tokens: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub total_tokens: Option<u64>,
}

impl ChatCompletionResponse {
    /// Text of the first choice, if the server sent one.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelList {
    #[serde(default)]
    pub data: Vec<ModelEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelEntry {
    pub id: String,
}

impl ModelList {
    pub fn parse(body: &str) -> Result<Self, ProbeError> {
        Ok(serde_json::from_str(body)?)
    }

    pub fn ids(&self) -> Vec<String> {
        self.data.iter().map(|m| m.id.clone()).collect()
    }
}

/// Status and body of a completed HTTP exchange. Interpreting either is left to the caller.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Thin client over the two endpoints the probe touches
pub struct ProbeClient {
    client: Client,
    auth_token: String,
    models_url: String,
    chat_url: String,
    request_timeout: std::time::Duration,
}

impl ProbeClient {
    pub fn new(config: &ProbeConfig) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .http1_only()
            .build()
            .map_err(|e| ProbeError::Request(format!("HTTP 客户端初始化失败: {}", e)))?;

        Ok(ProbeClient {
            client,
            auth_token: config.auth_token.clone(),
            models_url: config.url("/v1/models"),
            chat_url: config.url("/v1/chat/completions"),
            request_timeout: config.request_timeout,
        })
    }

    /// GET /v1/models. No timeout beyond the transport's own.
    pub async fn fetch_models(&self) -> Result<RawResponse, ProbeError> {
        info!("请求模型列表: {}", self.models_url);
        let response = self
            .client
            .get(&self.models_url)
            .header("Authorization", format!("Bearer {}", self.auth_token))
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| ProbeError::from_transport(&e))?;

        Self::collect(response).await
    }

    /// POST /v1/chat/completions with the configured per-request timeout.
    pub async fn send_chat(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<RawResponse, ProbeError> {
        info!("发送对话请求: model={} url={}", request.model, self.chat_url);
        let response = self
            .client
            .post(&self.chat_url)
            .header("Authorization", format!("Bearer {}", self.auth_token))
            .header("Content-Type", "application/json")
            .timeout(self.request_timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| ProbeError::from_transport(&e))?;

        Self::collect(response).await
    }

    async fn collect(response: reqwest::Response) -> Result<RawResponse, ProbeError> {
        let status = response.status().as_u16();
        // A timeout can also fire while the body is still streaming in.
        let body = response
            .text()
            .await
            .map_err(|e| ProbeError::from_transport(&e))?;
        debug!("响应状态码 {}，正文 {} 字节", status, body.len());
        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_matches_wire_shape() {
        let req = ChatCompletionRequest::single_turn("gpt-4o", "hi", 0.7);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "hi");
        assert_eq!(value["model"], "gpt-4o");
        assert_eq!(value["stream"], false);
        assert!((value["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn response_without_choices_has_no_content() {
        let resp: ChatCompletionResponse =
            serde_json::from_value(json!({ "model": "o1" })).unwrap();
        assert_eq!(resp.model.as_deref(), Some("o1"));
        assert!(resp.first_content().is_none());
    }

    #[test]
    fn response_with_usage() {
        let resp: ChatCompletionResponse = serde_json::from_value(json!({
            "model": "gpt-4o",
            "choices": [{ "message": { "role": "assistant", "content": "你好" } }],
            "usage": { "prompt_tokens": 3, "completion_tokens": 2, "total_tokens": 5 }
        }))
        .unwrap();
        assert_eq!(resp.first_content(), Some("你好"));
        assert_eq!(resp.usage.and_then(|u| u.total_tokens), Some(5));
    }

    #[test]
    fn optional_fields_of_the_wrong_type_are_dropped() {
        let resp: ChatCompletionResponse = serde_json::from_value(json!({
            "model": 42,
            "choices": [{ "message": { "content": "hi" } }],
            "usage": { "prompt_tokens": 3, "completion_tokens": null, "total_tokens": 5.5 }
        }))
        .unwrap();
        assert_eq!(resp.first_content(), Some("hi"));
        assert!(resp.model.is_none());
        let usage = resp.usage.unwrap();
        assert_eq!(usage.prompt_tokens, Some(3));
        assert_eq!(usage.completion_tokens, None);
        assert_eq!(usage.total_tokens, None);
    }

    #[test]
    fn usage_that_is_not_an_object_is_dropped() {
        let resp: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{ "message": { "content": "hi" } }],
            "usage": "n/a"
        }))
        .unwrap();
        assert!(resp.usage.is_none());
    }

    #[test]
    fn non_string_content_counts_as_missing() {
        let resp: ChatCompletionResponse = serde_json::from_value(json!({
            "choices": [{ "message": { "content": null } }]
        }))
        .unwrap();
        assert!(resp.first_content().is_none());
    }

    #[test]
    fn model_list_tolerates_missing_data() {
        let list = ModelList::parse(r#"{"object":"list"}"#).unwrap();
        assert!(list.ids().is_empty());
    }

    #[test]
    fn model_list_rejects_non_json() {
        assert!(matches!(
            ModelList::parse("<html>502</html>"),
            Err(ProbeError::Json(_))
        ));
    }
}
