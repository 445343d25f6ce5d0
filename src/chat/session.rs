//! Chat session orchestration
//!
//! Owns the in-session conversation and runs one turn at a time: a first
//! model call with the `search_documents` tool declared, an optional tool
//! round-trip through the retrieval adapter, and a streamed second call for
//! the grounded answer.

use super::client::ChatProvider;
use super::types::{
    search_tool_definition, ConversationMessage, SearchArguments, SEARCH_TOOL_NAME,
};
use crate::error::{Error, Result};
use crate::registry::Site;
use crate::retrieval::RetrievalAdapter;
use tracing::{debug, warn};

/// Appended verbatim when anything in a turn fails.
pub const FALLBACK_ERROR_MESSAGE: &str =
    "Sorry, I encountered an error while processing your request. Please try again.";

pub struct ChatSession<P: ChatProvider> {
    provider: P,
    retrieval: RetrievalAdapter,
    messages: Vec<ConversationMessage>,
    is_loading: bool,
}

impl<P: ChatProvider> ChatSession<P> {
    pub fn new(provider: P, retrieval: RetrievalAdapter) -> Self {
        Self {
            provider,
            retrieval,
            messages: Vec::new(),
            is_loading: false,
        }
    }

    /// The conversation so far.
    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Load the retrieval index for the selected site.
    pub fn select_site(&mut self, site: &Site) -> bool {
        self.retrieval.select_site(site)
    }

    /// Run one chat turn.
    ///
    /// `on_delta` is invoked for each streamed text chunk as it arrives.
    /// Errors never escape a turn: the turn ends with a fixed fallback
    /// assistant message instead, leaving already-appended messages in
    /// place.
    pub async fn send(&mut self, text: &str, on_delta: &mut dyn FnMut(&str)) {
        self.messages.push(ConversationMessage::user(text));
        self.is_loading = true;

        if let Err(e) = self.run_turn(on_delta).await {
            warn!("Chat turn failed: {}", e);
            self.messages
                .push(ConversationMessage::assistant(FALLBACK_ERROR_MESSAGE));
        }

        self.is_loading = false;
    }

    async fn run_turn(&mut self, on_delta: &mut dyn FnMut(&str)) -> Result<()> {
        let tools = [search_tool_definition()];
        let reply = self.provider.chat(&self.messages, Some(&tools)).await?;

        let Some(call) = reply.tool_calls.first() else {
            self.messages.push(ConversationMessage::assistant(reply.content));
            return Ok(());
        };

        if call.function.name != SEARCH_TOOL_NAME {
            return Err(Error::Argument(format!(
                "unknown tool: {}",
                call.function.name
            )));
        }

        let args = SearchArguments::parse(&call.function.arguments)?;
        debug!("Tool call: {}({:?})", SEARCH_TOOL_NAME, args.query);

        let result = self.retrieval.search(&args.query);
        let call_id = call.id.clone();

        self.messages
            .push(ConversationMessage::assistant_tool_call(reply.tool_calls.clone()));
        self.messages.push(ConversationMessage::tool(call_id, result));

        let mut rx = self.provider.stream_chat(&self.messages).await?;
        self.messages.push(ConversationMessage::assistant(""));

        while let Some(chunk) = rx.recv().await {
            let chunk = chunk?;
            on_delta(&chunk);
            if let Some(last) = self.messages.last_mut() {
                last.content.push_str(&chunk);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::client::AssistantReply;
    use crate::chat::types::{FunctionCall, Role, ToolCall};
    use crate::storage::FileStore;
    use async_trait::async_trait;
    use serde_json::Value;
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    /// Scripted provider standing in for the chat service.
    struct ScriptedProvider {
        reply: Result<AssistantReply>,
        chunks: Vec<Result<String>>,
    }

    #[async_trait]
    impl ChatProvider for ScriptedProvider {
        async fn chat(
            &self,
            _messages: &[ConversationMessage],
            _tools: Option<&[Value]>,
        ) -> Result<AssistantReply> {
            match &self.reply {
                Ok(r) => Ok(r.clone()),
                Err(e) => Err(Error::ChatTurn(e.to_string())),
            }
        }

        async fn stream_chat(
            &self,
            _messages: &[ConversationMessage],
        ) -> Result<mpsc::Receiver<Result<String>>> {
            let (tx, rx) = mpsc::channel(8);
            for chunk in &self.chunks {
                let chunk = match chunk {
                    Ok(s) => Ok(s.clone()),
                    Err(e) => Err(Error::ChatTurn(e.to_string())),
                };
                tx.send(chunk).await.unwrap();
            }
            Ok(rx)
        }
    }

    fn search_call(arguments: &str) -> ToolCall {
        ToolCall {
            id: "call_1".to_string(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: SEARCH_TOOL_NAME.to_string(),
                arguments: arguments.to_string(),
            },
        }
    }

    fn session(provider: ScriptedProvider) -> ChatSession<ScriptedProvider> {
        let tmp = TempDir::new().unwrap();
        let retrieval = RetrievalAdapter::new(FileStore::new(tmp.path().to_path_buf()), 5);
        ChatSession::new(provider, retrieval)
    }

    #[tokio::test]
    async fn test_direct_reply_appends_one_assistant_message() {
        let provider = ScriptedProvider {
            reply: Ok(AssistantReply {
                content: "Direct answer".to_string(),
                tool_calls: Vec::new(),
            }),
            chunks: Vec::new(),
        };
        let mut session = session(provider);

        session.send("question", &mut |_| {}).await;

        let messages = session.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, "Direct answer");
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_tool_call_turn_appends_three_messages() {
        let provider = ScriptedProvider {
            reply: Ok(AssistantReply {
                content: String::new(),
                tool_calls: vec![search_call(r#"{"query": "rust"}"#)],
            }),
            chunks: vec![Ok("Grounded ".to_string()), Ok("answer".to_string())],
        };
        let mut session = session(provider);

        let mut streamed = String::new();
        session.send("question", &mut |chunk| streamed.push_str(chunk)).await;

        let messages = session.messages();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, Role::User);
        assert!(messages[1].tool_calls.is_some());
        assert_eq!(messages[2].role, Role::Tool);
        assert_eq!(messages[2].tool_call_id.as_deref(), Some("call_1"));
        // retrieval is unloaded in this fixture
        assert_eq!(
            messages[2].content,
            crate::retrieval::INDEX_UNAVAILABLE_MESSAGE
        );
        assert_eq!(messages[3].role, Role::Assistant);
        assert_eq!(messages[3].content, "Grounded answer");
        assert_eq!(streamed, "Grounded answer");
    }

    #[tokio::test]
    async fn test_provider_error_appends_fallback() {
        let provider = ScriptedProvider {
            reply: Err(Error::ChatTurn("connection refused".to_string())),
            chunks: Vec::new(),
        };
        let mut session = session(provider);

        session.send("question", &mut |_| {}).await;

        let messages = session.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, FALLBACK_ERROR_MESSAGE);
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_malformed_tool_arguments_fall_back() {
        let provider = ScriptedProvider {
            reply: Ok(AssistantReply {
                content: String::new(),
                tool_calls: vec![search_call("not json")],
            }),
            chunks: Vec::new(),
        };
        let mut session = session(provider);

        session.send("question", &mut |_| {}).await;

        let messages = session.messages();
        // user message plus exactly one fallback assistant message
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, FALLBACK_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_stream_error_keeps_partial_message_and_falls_back() {
        let provider = ScriptedProvider {
            reply: Ok(AssistantReply {
                content: String::new(),
                tool_calls: vec![search_call(r#"{"query": "rust"}"#)],
            }),
            chunks: vec![
                Ok("partial".to_string()),
                Err(Error::ChatTurn("stream cut".to_string())),
            ],
        };
        let mut session = session(provider);

        session.send("question", &mut |_| {}).await;

        let messages = session.messages();
        // user, tool-call, tool result, partial assistant, fallback
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[3].content, "partial");
        assert_eq!(messages[4].content, FALLBACK_ERROR_MESSAGE);
        assert!(!session.is_loading());
    }
}
