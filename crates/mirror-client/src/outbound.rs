//! Requests flowing from the mirror back to a remote.
//!
//! The mirror never writes to a connection itself: it hands requests to an
//! [`Outbound`] sender. In a tokio host this is the sending half of an
//! unbounded channel drained by the task that owns the connection.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use mirror_shared::ApiRequest;
use tokio::sync::mpsc;

use crate::error::SendError;

/// A request addressed to a remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub remote: String,
    pub request: ApiRequest,
}

/// Fire-and-forget sender of requests to remotes.
pub trait Outbound: Send + Sync {
    /// Queue `request` for the remote called `remote_name`.
    ///
    /// `Ok` means the request was accepted for delivery, not that the remote
    /// received it.
    fn send(&self, remote_name: &str, request: &ApiRequest) -> Result<(), SendError>;
}

impl Outbound for mpsc::UnboundedSender<OutboundMessage> {
    fn send(&self, remote_name: &str, request: &ApiRequest) -> Result<(), SendError> {
        mpsc::UnboundedSender::send(
            self,
            OutboundMessage {
                remote: remote_name.to_string(),
                request: request.clone(),
            },
        )
        .map_err(|_| SendError::Closed)
    }
}

/// Sender keeping every request in memory.
///
/// Can be switched to reject requests, to exercise the paths where the
/// connection is gone.
#[derive(Debug, Default)]
pub struct RecordingOutbound {
    sent: Mutex<Vec<OutboundMessage>>,
    closed: AtomicBool,
}

impl RecordingOutbound {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject (`true`) or accept (`false`) subsequent requests.
    pub fn set_closed(&self, closed: bool) {
        self.closed.store(closed, Ordering::SeqCst);
    }

    /// Requests accepted so far, oldest first.
    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }

    /// Requests accepted so far, as wire text.
    pub fn sent_json(&self) -> Vec<String> {
        self.sent()
            .iter()
            .filter_map(|message| message.request.to_json().ok())
            .collect()
    }
}

impl Outbound for RecordingOutbound {
    fn send(&self, remote_name: &str, request: &ApiRequest) -> Result<(), SendError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(SendError::Closed);
        }
        let mut sent = self.sent.lock().map_err(|_| SendError::Closed)?;
        sent.push(OutboundMessage {
            remote: remote_name.to_string(),
            request: request.clone(),
        });
        Ok(())
    }
}
