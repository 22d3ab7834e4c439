//! Webhook Types
//!
//! Goplum's webhook payload and the result of relaying one.

use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Status event posted by Goplum when a check changes state.
///
/// Every field is optional; only `text` is relayed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GoPlumHook {
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub check_type: String,
    #[serde(deserialize_with = "object_or_null")]
    pub last_result: LastResult,
    #[serde(deserialize_with = "null_as_default")]
    pub previous_state: String,
    #[serde(deserialize_with = "null_as_default")]
    pub new_state: String,
}

/// Outcome of the most recent check run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LastResult {
    #[serde(deserialize_with = "null_as_default")]
    pub state: String,
    pub time: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "null_as_default")]
    pub detail: String,
}

impl GoPlumHook {
    /// Decode a request body. A JSON `null` body decodes to an empty hook;
    /// any other non-object body is an error.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        from_object(serde_json::from_slice(body)?)
    }
}

/// Decode `value` as a struct, refusing arrays and scalars.
fn from_object<T: DeserializeOwned + Default>(value: Value) -> Result<T, serde_json::Error> {
    let found = match value {
        Value::Null => return Ok(T::default()),
        Value::Object(_) => return serde_json::from_value(value),
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
    };
    Err(serde_json::Error::custom(format_args!(
        "expected an object, found {found}"
    )))
}

fn object_or_null<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    from_object(Value::deserialize(deserializer)?).map_err(D::Error::custom)
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// What happened to an accepted webhook after it was acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// The chat message was sent.
    Sent,
    /// The payload had no summary text; nothing to send.
    EmptyText,
    /// The body was not a valid payload.
    DecodeFailed,
    /// The bot host could not deliver the message.
    SendFailed,
}
