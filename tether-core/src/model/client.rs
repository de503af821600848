use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Snapshot of a room member as announced by the signaling server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidClient {
    #[error("client entry is not an object")]
    NotAnObject,
    #[error("client id is missing")]
    MissingId,
    #[error("client id is not a string")]
    IdNotString,
    #[error("client id is empty")]
    EmptyId,
    #[error("client name is not a string")]
    NameNotString,
}

impl Client {
    pub fn new(id: impl Into<String>, name: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            data,
        }
    }

    /// Builds a client from one entry of a room-membership payload.
    pub fn from_value(value: &Value) -> Result<Self, InvalidClient> {
        let object = value.as_object().ok_or(InvalidClient::NotAnObject)?;

        let id = match object.get("id") {
            None => return Err(InvalidClient::MissingId),
            Some(Value::String(id)) if id.is_empty() => return Err(InvalidClient::EmptyId),
            Some(Value::String(id)) => id.clone(),
            Some(_) => return Err(InvalidClient::IdNotString),
        };

        let name = match object.get("name") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(name)) => name.clone(),
            Some(_) => return Err(InvalidClient::NameNotString),
        };

        let data = object.get("data").cloned().unwrap_or(Value::Null);

        Ok(Self { id, name, data })
    }
}
