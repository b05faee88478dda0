//! Conversation messages produced by a task executor.

use serde::{Deserialize, Serialize};

/// Author of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Function,
}

/// A function invocation requested by the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// Keyword arguments. Chat APIs often send these as a JSON-encoded
    /// string; see [`FunctionCall::parsed_arguments`].
    #[serde(default)]
    pub arguments: serde_json::Value,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// Arguments as a structured value. A string that parses as a JSON
    /// object is expanded; anything else is returned unchanged.
    pub fn parsed_arguments(&self) -> serde_json::Value {
        if let serde_json::Value::String(raw) = &self.arguments {
            let parsed = serde_json::from_str::<serde_json::Value>(raw);
            if let Ok(value @ serde_json::Value::Object(_)) = parsed {
                return value;
            }
        }
        self.arguments.clone()
    }
}

/// A single conversation message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(content.into()),
            function_call: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(content.into()),
            function_call: None,
        }
    }

    /// Assistant message carrying a function call and no text.
    pub fn assistant_call(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            role: Role::Assistant,
            content: None,
            function_call: Some(FunctionCall::new(name, arguments)),
        }
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

/// The ordered messages produced by running one task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// Conversation session the executor ran under, if it reports one.
    #[serde(default)]
    pub session_id: Option<String>,
    pub messages: Vec<Message>,
}

impl Transcript {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            session_id: None,
            messages,
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}
