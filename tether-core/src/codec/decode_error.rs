use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("message is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("message is not a JSON object")]
    NotAnObject,

    #[error("message has no `type` field")]
    MissingType,

    #[error("message `type` field is not a string")]
    TypeNotString,

    #[error("unknown message type `{0}`")]
    UnknownType(String),

    /// A recognized message whose fields are missing or of the wrong kind.
    #[error("invalid `{message_type}` message ({reason})")]
    Malformed {
        message_type: &'static str,
        reason: &'static str,
    },

    /// Well-formed JSON that contradicts the protocol, e.g. an offer tagged as an answer.
    #[error("invalid `{message_type}` message ({reason})")]
    ProtocolViolation {
        message_type: &'static str,
        reason: &'static str,
    },
}

impl DecodeError {
    /// True when the discriminator itself could not be used: the message is
    /// simply not addressed to any handler.
    pub fn is_unroutable(&self) -> bool {
        matches!(
            self,
            DecodeError::InvalidJson(_)
                | DecodeError::NotAnObject
                | DecodeError::MissingType
                | DecodeError::TypeNotString
                | DecodeError::UnknownType(_)
        )
    }

    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, DecodeError::ProtocolViolation { .. })
    }
}
