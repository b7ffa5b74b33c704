use serde::{Deserialize, Serialize};

use crate::constants::{API_INPUT, API_SYNC, SYNC_COLORS};
use crate::error::ProtocolError;

/// Requests sent by the client to a remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRequest {
    /// Ask for the full state and subscribe to all future events
    Sync(SyncBody),

    /// Text typed in a mirrored buffer, executed on the remote
    Input(InputBody),
}

/// Body of a sync request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncBody {
    pub colors: String,
}

/// Body of an input request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputBody {
    pub buffer_id: i64,
    pub command: String,
}

/// Wire shape shared by every request: `{"request": ..., "body": ...}`
#[derive(Serialize)]
struct RequestEnvelope<'a, B: Serialize> {
    request: &'a str,
    body: &'a B,
}

impl ApiRequest {
    pub fn sync() -> Self {
        Self::Sync(SyncBody {
            colors: SYNC_COLORS.to_string(),
        })
    }

    pub fn input(buffer_id: i64, command: impl Into<String>) -> Self {
        Self::Input(InputBody {
            buffer_id,
            command: command.into(),
        })
    }

    /// Request line, for example `POST /api/sync`.
    pub fn request_line(&self) -> &'static str {
        match self {
            Self::Sync(_) => API_SYNC,
            Self::Input(_) => API_INPUT,
        }
    }

    /// Serialize to the JSON text sent on the wire.
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        let request = self.request_line();
        let json = match self {
            Self::Sync(body) => serde_json::to_string(&RequestEnvelope { request, body })?,
            Self::Input(body) => serde_json::to_string(&RequestEnvelope { request, body })?,
        };
        Ok(json)
    }
}
