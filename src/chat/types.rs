//! Conversation and tool-call types

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

/// Name of the single tool declared to the model.
pub const SEARCH_TOOL_NAME: &str = "search_documents";

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

/// A tool invocation requested by the model (OpenAI function-calling shape)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// Raw JSON-encoded arguments as produced by the model
    pub arguments: String,
}

/// One message in the in-session conversation.
///
/// Serializes to the wire shape expected by the chat service; the local id
/// never leaves the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    #[serde(skip)]
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ConversationMessage {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// The assistant message carrying a tool invocation request.
    pub fn assistant_tool_call(tool_calls: Vec<ToolCall>) -> Self {
        let mut msg = Self::new(Role::Assistant, "");
        msg.tool_calls = Some(tool_calls);
        msg
    }

    /// The tool-result message answering `tool_call_id`.
    pub fn tool(tool_call_id: String, content: impl Into<String>) -> Self {
        let mut msg = Self::new(Role::Tool, content);
        msg.tool_call_id = Some(tool_call_id);
        msg
    }
}

/// Validated arguments of a `search_documents` call.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchArguments {
    pub query: String,
}

impl SearchArguments {
    /// Parse the model-supplied raw argument string.
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| Error::Argument(format!("{}: {}", e, raw)))
    }
}

/// OpenAI-style declaration of the `search_documents` tool.
pub fn search_tool_definition() -> Value {
    json!({
        "type": "function",
        "function": {
            "name": SEARCH_TOOL_NAME,
            "description": "Search the selected website's indexed pages and return the most relevant passages for a query.",
            "parameters": {
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query - natural language question or keywords"
                    }
                },
                "required": ["query"]
            }
        }
    })
}
