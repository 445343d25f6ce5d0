//! Chat service client
//!
//! A provider trait over the chat completion service plus its
//! OpenAI-compatible HTTP implementation (`/v1/chat/completions`,
//! non-streaming JSON and SSE streaming).

use super::types::{ConversationMessage, ToolCall};
use crate::config::ChatConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::mpsc;

/// The model's reply to a non-streaming completion call.
#[derive(Debug, Clone, Default)]
pub struct AssistantReply {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

/// Abstraction over the chat completion service.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Non-streaming completion over the full conversation, with optional
    /// tool declarations.
    async fn chat(
        &self,
        messages: &[ConversationMessage],
        tools: Option<&[Value]>,
    ) -> Result<AssistantReply>;

    /// Streaming completion; the receiver yields text chunks in arrival
    /// order.
    async fn stream_chat(
        &self,
        messages: &[ConversationMessage],
    ) -> Result<mpsc::Receiver<Result<String>>>;
}

/// OpenAI-compatible chat completion client.
pub struct OpenAiChatClient {
    base_url: String,
    model: String,
    api_key: String,
    client: Client,
}

impl OpenAiChatClient {
    pub fn new(config: &ChatConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::ChatTurn(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            client,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

#[async_trait]
impl ChatProvider for OpenAiChatClient {
    async fn chat(
        &self,
        messages: &[ConversationMessage],
        tools: Option<&[Value]>,
    ) -> Result<AssistantReply> {
        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "stream": false,
        });

        if let Some(tools) = tools {
            if let Some(obj) = body.as_object_mut() {
                obj.insert("tools".to_string(), json!(tools));
            }
        }

        let res = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::ChatTurn(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(Error::ChatTurn(format!("HTTP {}: {}", status, text)));
        }

        let payload: ChatCompletionResponse =
            res.json().await.map_err(|e| Error::ChatTurn(e.to_string()))?;

        let choice = payload
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::ChatTurn("response carried no choices".to_string()))?;

        Ok(AssistantReply {
            content: choice.message.content.unwrap_or_default(),
            tool_calls: choice.message.tool_calls.unwrap_or_default(),
        })
    }

    async fn stream_chat(
        &self,
        messages: &[ConversationMessage],
    ) -> Result<mpsc::Receiver<Result<String>>> {
        let body = json!({
            "model": self.model,
            "messages": messages,
            "stream": true,
        });

        let res = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::ChatTurn(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(Error::ChatTurn(format!("HTTP {}: {}", status, text)));
        }

        let (tx, rx) = mpsc::channel(32);
        let mut stream = res.bytes_stream();

        tokio::spawn(async move {
            // SSE events can split across network chunks; carry the
            // incomplete trailing line between reads.
            let mut buffer = String::new();

            while let Some(item) = stream.next().await {
                match item {
                    Ok(bytes) => {
                        buffer.push_str(&String::from_utf8_lossy(&bytes));

                        while let Some(idx) = buffer.find('\n') {
                            let line = buffer[..idx].trim().to_string();
                            buffer.drain(..idx + 1);

                            if line.is_empty() {
                                continue;
                            }
                            if line == "data: [DONE]" {
                                return;
                            }

                            if let Some(data) = line.strip_prefix("data: ") {
                                if let Ok(json) = serde_json::from_str::<Value>(data) {
                                    if let Some(content) =
                                        json["choices"][0]["delta"]["content"].as_str()
                                    {
                                        if !content.is_empty()
                                            && tx.send(Ok(content.to_string())).await.is_err()
                                        {
                                            return;
                                        }
                                    }
                                }
                            }
                        }
                    }
                    Err(e) => {
                        let _ = tx.send(Err(Error::ChatTurn(e.to_string()))).await;
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }
}
