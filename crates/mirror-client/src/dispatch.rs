//! Processing of messages received from a remote.
//!
//! A message is a JSON object:
//!
//! ```text
//! { "code": 200, "body_type": "buffer",
//!   "event": { "name": "buffer_opened", "buffer_id": 1709932823649069 },
//!   "body": { ... } | [ { ... }, ... ] }
//! ```
//!
//! The body is applied to the store by the handler of its body type, once per
//! element when it is an array. The first successful buffer listing of an
//! unsynced remote triggers the sync request.

use std::sync::Arc;

use mirror_shared::constants::{CODE_NO_CONTENT, CODE_OK, NO_ID};
use mirror_shared::BodyType;
use mirror_store::{MirrorStore, ReportLevel};
use serde_json::Value;
use tracing::{debug, error, trace, warn};

use crate::error::EventError;
use crate::handlers::{self, Event};
use crate::json;
use crate::locator::find_buffer;
use crate::outbound::Outbound;
use crate::remote::Remote;
use crate::sync::sync_with_remote;

/// Outcome of a message that was accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    /// Response without body to a request of ours.
    Ack { code: i64 },

    /// Body type this client does not know about.
    Ignored { body_type: String },

    /// Body applied to the store.
    Handled {
        body_type: BodyType,
        /// Number of body elements processed.
        elements: usize,
        /// Whether the sync request was sent after this message.
        sync_sent: bool,
    },
}

/// The mirror of one remote: its state and the sender of its requests.
pub struct RemoteSession {
    remote: Remote,
    outbound: Arc<dyn Outbound>,
}

impl RemoteSession {
    pub fn new(remote: Remote, outbound: Arc<dyn Outbound>) -> Self {
        Self { remote, outbound }
    }

    pub fn remote(&self) -> &Remote {
        &self.remote
    }

    /// Process one message, reporting any failure to the user.
    ///
    /// Failed messages are dropped; the caller keeps feeding the next ones.
    pub fn receive<S>(&mut self, store: &mut S, data: &str) -> Option<Dispatched>
    where
        S: MirrorStore + ?Sized,
    {
        match self.recv(store, data) {
            Ok(dispatched) => Some(dispatched),
            Err(e) => {
                error!(remote = %self.remote.name, error = %e, "failed to process message");
                store.report(ReportLevel::Error, &e.to_string());
                None
            }
        }
    }

    /// Process one message.
    pub fn recv<S>(&mut self, store: &mut S, data: &str) -> Result<Dispatched, EventError>
    where
        S: MirrorStore + ?Sized,
    {
        if self.remote.debug_raw {
            debug!(remote = %self.remote.name, data = %data, "recv from remote");
        }

        let message: Value = serde_json::from_str(data).map_err(|_| self.invalid_data(data))?;

        let code = json::get_i64(&message, "code", NO_ID);
        let Some(body_type_name) = json::get_str(&message, "body_type") else {
            if code == CODE_OK || code == CODE_NO_CONTENT {
                return Ok(Dispatched::Ack { code });
            }
            return Err(self.invalid_data(data));
        };

        let mut event = Event::new(&self.remote, &self.outbound);
        if let Some(context) = message.get("event").filter(|e| e.is_object()) {
            event.name = json::get_str(context, "name");
            let buffer_id = json::get_i64(context, "buffer_id", NO_ID);
            event.buffer = match find_buffer(&*store, &self.remote.name, buffer_id) {
                Ok(buffer) => buffer,
                Err(e) => {
                    warn!(
                        remote = %self.remote.name,
                        buffer_id,
                        error = %e,
                        "buffer lookup failed"
                    );
                    None
                }
            };
        }

        let Ok(body_type) = body_type_name.parse::<BodyType>() else {
            trace!(remote = %self.remote.name, body_type = %body_type_name, "body type ignored");
            return Ok(Dispatched::Ignored {
                body_type: body_type_name.to_string(),
            });
        };

        let null = Value::Null;
        let elements: Vec<&Value> = match message.get("body") {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(body) => vec![body],
            None => vec![&null],
        };

        let total = elements.len();
        let mut failed = 0;
        for body in elements {
            if let Err(e) = handlers::handle(body_type, store, &event, body) {
                warn!(
                    remote = %self.remote.name,
                    body_type = %body_type,
                    error = %e,
                    "handler failed"
                );
                failed += 1;
            }
        }
        if failed > 0 {
            return Err(EventError::HandlerFailed {
                remote: self.remote.name.clone(),
                body_type: body_type.to_string(),
                failed,
                total,
                data: data.to_string(),
            });
        }

        let mut sync_sent = false;
        if !self.remote.synced && code == CODE_OK && body_type == BodyType::Buffer {
            sync_sent = sync_with_remote(&mut self.remote, self.outbound.as_ref()).is_ok();
        }

        Ok(Dispatched::Handled {
            body_type,
            elements: total,
            sync_sent,
        })
    }

    fn invalid_data(&self, data: &str) -> EventError {
        EventError::InvalidData {
            remote: self.remote.name.clone(),
            data: data.to_string(),
        }
    }
}
