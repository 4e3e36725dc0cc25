use serde::{Deserialize, Serialize};

/// How the server should deliver the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMode {
    /// Incremental `data:` records
    #[default]
    Streaming,
    /// One JSON document once the answer is complete
    Blocking,
}

/// Request body for `POST /chat-messages`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    /// The user's message
    pub query: String,
    /// App-defined input variables. Always sent, usually empty.
    #[serde(default)]
    pub inputs: serde_json::Map<String, serde_json::Value>,
    pub response_mode: ResponseMode,
    /// Conversation to continue. Empty starts a new one.
    #[serde(default)]
    pub conversation_id: String,
    /// Stable end-user identifier
    pub user: String,
}

impl ChatRequest {
    /// Create a streaming request that starts a new conversation.
    pub fn new(query: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            inputs: serde_json::Map::new(),
            response_mode: ResponseMode::Streaming,
            conversation_id: String::new(),
            user: user.into(),
        }
    }

    /// Continue an existing conversation.
    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = conversation_id.into();
        self
    }

    /// Set an input variable.
    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.inputs.insert(key.into(), value.into());
        self
    }

    /// Whether this request starts a new conversation.
    pub fn is_new_conversation(&self) -> bool {
        self.conversation_id.is_empty()
    }
}
