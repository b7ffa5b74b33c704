use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// Kind of payload carried in the `body` of a message received from a remote.
///
/// The set is closed: body types added by newer remotes fail to parse and are
/// ignored by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyType {
    Buffer,
    Line,
    NickGroup,
    Nick,
    Version,
}

impl BodyType {
    pub const ALL: [BodyType; 5] = [
        BodyType::Buffer,
        BodyType::Line,
        BodyType::NickGroup,
        BodyType::Nick,
        BodyType::Version,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buffer => "buffer",
            Self::Line => "line",
            Self::NickGroup => "nick_group",
            Self::Nick => "nick",
            Self::Version => "version",
        }
    }
}

impl FromStr for BodyType {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|body_type| body_type.as_str() == s)
            .ok_or_else(|| ProtocolError::UnknownBodyType(s.to_string()))
    }
}

impl fmt::Display for BodyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content layout of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferType {
    /// Scrollback of formatted lines (chat-like).
    #[default]
    Formatted,
    /// Free content addressed by line number.
    Free,
}

impl BufferType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Formatted => "formatted",
            Self::Free => "free",
        }
    }
}

impl FromStr for BufferType {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "formatted" => Ok(Self::Formatted),
            "free" => Ok(Self::Free),
            other => Err(ProtocolError::UnknownBufferType(other.to_string())),
        }
    }
}

impl fmt::Display for BufferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
