//! Expected and observed units of agent behaviour.

use automata_state::{Payload, PayloadMap};
use serde::{Deserialize, Serialize};

use super::error::{EvalError, Result};

/// A unit of agent behaviour. Equality is structural over all fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// A function/tool invocation with keyword arguments.
    FunctionCall {
        name: String,
        #[serde(default)]
        arguments: serde_json::Value,
    },
    /// A fenced code block whose body contains `contains`.
    CodeBlock {
        #[serde(default)]
        language: Option<String>,
        contains: String,
    },
}

impl Action {
    pub fn function_call(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Action::FunctionCall {
            name: name.into(),
            arguments,
        }
    }

    pub fn code_block(language: Option<&str>, contains: impl Into<String>) -> Self {
        Action::CodeBlock {
            language: language.map(str::to_string),
            contains: contains.into(),
        }
    }

    /// Short label used when counting actions: the function name, or
    /// `code_block` for code actions.
    pub fn label(&self) -> &str {
        match self {
            Action::FunctionCall { name, .. } => name,
            Action::CodeBlock { .. } => "code_block",
        }
    }

    pub fn to_payload(&self) -> Payload {
        let mut map = PayloadMap::new();
        match self {
            Action::FunctionCall { name, arguments } => {
                map.insert("type".into(), Payload::from("function_call"));
                map.insert("name".into(), Payload::from(name.as_str()));
                map.insert("arguments".into(), Payload::from(arguments.clone()));
            }
            Action::CodeBlock { language, contains } => {
                map.insert("type".into(), Payload::from("code_block"));
                map.insert(
                    "language".into(),
                    language
                        .as_deref()
                        .map_or(Payload::Null, Payload::from),
                );
                map.insert("contains".into(), Payload::from(contains.as_str()));
            }
        }
        Payload::Map(map)
    }

    pub fn from_payload(payload: &Payload) -> Result<Self> {
        let map = payload
            .as_map()
            .ok_or_else(|| EvalError::Payload(format!("action is a {}", payload.type_name())))?;
        let text = |key: &str| -> Result<String> {
            map.get(key)
                .and_then(Payload::as_str)
                .map(str::to_string)
                .ok_or_else(|| EvalError::Payload(format!("action missing text field `{key}`")))
        };

        match text("type")?.as_str() {
            "function_call" => Ok(Action::FunctionCall {
                name: text("name")?,
                arguments: map
                    .get("arguments")
                    .map_or(serde_json::Value::Null, Payload::to_json),
            }),
            "code_block" => Ok(Action::CodeBlock {
                language: map
                    .get("language")
                    .and_then(Payload::as_str)
                    .map(str::to_string),
                contains: text("contains")?,
            }),
            other => Err(EvalError::Payload(format!("unknown action type: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_structural_equality() {
        let a = Action::function_call("search", json!({"query": "rust", "limit": 3}));
        let b = Action::function_call("search", json!({"limit": 3, "query": "rust"}));
        let c = Action::function_call("search", json!({"query": "go", "limit": 3}));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_payload_conversion_preserves_function_call() {
        let action = Action::function_call(
            "write_file",
            json!({"path": "a.rs", "lines": [1, 2], "opts": {"force": true}}),
        );
        let back = Action::from_payload(&action.to_payload()).expect("from_payload");
        assert_eq!(back, action);
    }

    #[test]
    fn test_payload_conversion_preserves_code_block() {
        let action = Action::code_block(Some("rust"), "fn main()");
        assert_eq!(Action::from_payload(&action.to_payload()).unwrap(), action);

        let untagged = Action::code_block(None, "x = 1");
        assert_eq!(Action::from_payload(&untagged.to_payload()).unwrap(), untagged);
    }

    #[test]
    fn test_from_payload_rejects_unknown_type() {
        let mut map = PayloadMap::new();
        map.insert("type".into(), Payload::from("teleport"));
        let err = Action::from_payload(&Payload::Map(map)).unwrap_err();
        assert!(err.to_string().contains("teleport"));
    }

    #[test]
    fn test_serde_shape() {
        let action: Action = serde_json::from_value(json!({
            "type": "function_call",
            "name": "search",
            "arguments": {"query": "rust"}
        }))
        .expect("deserialize");
        assert_eq!(action.label(), "search");
    }
}
