//! Actions: immutable descriptions of something that happened.
//!
//! Every action carries a `type` discriminant, by convention written as
//! `"<domain>/<eventName>"` (for example `"todos/todoAdded"`). Typed
//! applications model their actions as enums and implement [`Action`]
//! (usually through `#[derive(Action)]` from `reducible-macros`). Actions
//! arriving from outside the process, e.g. as JSON, are held in [`AnyAction`]
//! until they are decoded into a typed enum.
//!
//! # Example
//!
//! ```
//! use reducible_core::action::{Action, AnyAction};
//! use serde_json::json;
//!
//! let action = AnyAction::new("todos/todoAdded").with_payload(json!("Buy milk"));
//! assert_eq!(action.action_type(), Some("todos/todoAdded"));
//!
//! let untyped = AnyAction::from_json(json!({ "payload": "x" }));
//! assert!(untyped.validate().is_err());
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors describing a malformed or undecodable action
#[derive(Error, Debug)]
pub enum ActionError {
    /// The action has no `type` field
    #[error("action is missing its `type` field")]
    MissingType,

    /// The action's `type` is the empty string
    #[error("action `type` must not be empty")]
    EmptyType,

    /// The action's `type` is present but is not a string
    #[error("action `type` must be a string, found {0}")]
    NonStringType(String),

    /// The action is well formed but does not match any known variant
    #[error("cannot decode action `{action_type}`: {source}")]
    Decode {
        /// The type string of the action that failed to decode
        action_type: String,
        /// Underlying serde error
        #[source]
        source: serde_json::Error,
    },

    /// A typed action could not be turned into an [`AnyAction`]
    #[error("cannot encode action: {0}")]
    Encode(#[source] serde_json::Error),
}

/// The Action trait - anything that can be dispatched to a store
///
/// The only requirement is a `type` discriminant. Typed enums always
/// return `Some`; untyped actions may not have one, which the store rejects
/// before touching state.
pub trait Action {
    /// The `type` discriminant, if present and a string
    fn action_type(&self) -> Option<&str>;

    /// Check that the action carries a non-empty string `type`
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::MissingType`] or [`ActionError::EmptyType`]
    /// when the discriminant is unusable.
    fn validate(&self) -> Result<&str, ActionError> {
        match self.action_type() {
            None => Err(ActionError::MissingType),
            Some("") => Err(ActionError::EmptyType),
            Some(action_type) => Ok(action_type),
        }
    }
}

/// An untyped action: a `type` and an optional payload of arbitrary shape
///
/// Serializes to and from `{"type": ..., "payload": ...}`. The `type` is
/// kept as a raw JSON value so that a non-string discriminant survives
/// deserialization and is rejected at dispatch time instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnyAction {
    /// The raw `type` discriminant
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Value>,

    /// Additional information about what happened
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl AnyAction {
    /// Create an action with the given type and no payload
    #[must_use]
    pub fn new(action_type: impl Into<String>) -> Self {
        Self {
            kind: Some(Value::String(action_type.into())),
            payload: None,
        }
    }

    /// Attach a payload
    #[must_use]
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Build an action from a JSON value
    ///
    /// Objects contribute their `type` and `payload` fields; anything else
    /// yields an action with neither, which fails validation.
    #[must_use]
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(mut fields) => Self {
                kind: fields.remove("type"),
                payload: fields.remove("payload"),
            },
            _ => Self::default(),
        }
    }

    /// Convert a typed action into its untyped form
    ///
    /// The typed action must serialize as `{"type": ..., "payload": ...}`,
    /// which is what `#[serde(tag = "type", content = "payload")]` produces.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::Encode`] if serialization fails.
    pub fn encode<T: Serialize>(action: &T) -> Result<Self, ActionError> {
        serde_json::to_value(action)
            .map(Self::from_json)
            .map_err(ActionError::Encode)
    }

    /// Decode into a typed action
    ///
    /// # Errors
    ///
    /// Returns a validation error when the `type` is unusable, or
    /// [`ActionError::Decode`] when no variant of `T` matches.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ActionError> {
        let action_type = self.validate()?;

        let mut fields = Map::new();
        fields.insert("type".to_string(), Value::String(action_type.to_string()));
        if let Some(payload) = &self.payload {
            fields.insert("payload".to_string(), payload.clone());
        }

        serde_json::from_value(Value::Object(fields)).map_err(|source| ActionError::Decode {
            action_type: action_type.to_string(),
            source,
        })
    }
}

impl Action for AnyAction {
    fn action_type(&self) -> Option<&str> {
        self.kind.as_ref().and_then(Value::as_str)
    }

    fn validate(&self) -> Result<&str, ActionError> {
        match &self.kind {
            None | Some(Value::Null) => Err(ActionError::MissingType),
            Some(Value::String(s)) if s.is_empty() => Err(ActionError::EmptyType),
            Some(Value::String(s)) => Ok(s.as_str()),
            Some(other) => Err(ActionError::NonStringType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "type", content = "payload")]
    enum TodoAction {
        #[serde(rename = "todos/todoAdded")]
        TodoAdded(String),
        #[serde(rename = "todos/allCleared")]
        AllCleared,
    }

    #[test]
    fn test_new_action_has_type() {
        let action = AnyAction::new("counter/increment");
        assert_eq!(action.action_type(), Some("counter/increment"));
        assert!(action.payload.is_none());
        assert!(matches!(action.validate(), Ok("counter/increment")));
    }

    #[test]
    fn test_missing_type_is_invalid() {
        let action = AnyAction::from_json(json!({ "payload": "x" }));
        assert!(matches!(action.validate(), Err(ActionError::MissingType)));
    }

    #[test]
    fn test_empty_type_is_invalid() {
        let action = AnyAction::new("");
        assert!(matches!(action.validate(), Err(ActionError::EmptyType)));
    }

    #[test]
    fn test_non_string_type_is_invalid() {
        let action = AnyAction::from_json(json!({ "type": 42 }));
        assert_eq!(action.action_type(), None);
        assert!(matches!(action.validate(), Err(ActionError::NonStringType(_))));
    }

    #[test]
    fn test_non_object_json_is_invalid() {
        let action = AnyAction::from_json(json!("counter/increment"));
        assert!(matches!(action.validate(), Err(ActionError::MissingType)));
    }

    #[test]
    fn test_deserialize_keeps_raw_type() {
        let action: Result<AnyAction, _> =
            serde_json::from_value(json!({ "type": true, "payload": 1 }));
        let Ok(action) = action else {
            unreachable!("AnyAction accepts any JSON type value");
        };
        assert_eq!(action.kind, Some(json!(true)));
        assert_eq!(action.payload, Some(json!(1)));
    }

    #[test]
    fn test_decode_typed_action() {
        let action = AnyAction::new("todos/todoAdded").with_payload(json!("Buy milk"));
        let decoded: Result<TodoAction, _> = action.decode();
        assert_eq!(
            decoded.ok(),
            Some(TodoAction::TodoAdded("Buy milk".to_string()))
        );

        let unit: Result<TodoAction, _> = AnyAction::new("todos/allCleared").decode();
        assert_eq!(unit.ok(), Some(TodoAction::AllCleared));
    }

    #[test]
    fn test_decode_unknown_type_fails() {
        let decoded: Result<TodoAction, _> = AnyAction::new("counter/increment").decode();
        assert!(matches!(
            decoded,
            Err(ActionError::Decode { action_type, .. }) if action_type == "counter/increment"
        ));
    }

    #[test]
    fn test_encode_typed_action() {
        let encoded = AnyAction::encode(&TodoAction::TodoAdded("Walk dog".to_string()));
        let Ok(encoded) = encoded else {
            unreachable!("tagged enums always encode");
        };
        assert_eq!(encoded.action_type(), Some("todos/todoAdded"));
        assert_eq!(encoded.payload, Some(json!("Walk dog")));
    }

    #[test]
    fn test_serialized_shape() {
        let action = AnyAction::new("todos/todoAdded").with_payload(json!("Buy milk"));
        let value = serde_json::to_value(&action).ok();
        assert_eq!(
            value,
            Some(json!({ "type": "todos/todoAdded", "payload": "Buy milk" }))
        );
    }
}
