//! Handlers applying one body element to the local store.
//!
//! Each handler receives the context of the message ([`Event`]) and one
//! element of its body. Missing or mistyped fields take their defaults and
//! entities that cannot be resolved are skipped; only a failing store is an
//! error.

pub mod buffer;
pub mod line;
pub mod nicklist;
pub mod version;

use std::sync::Arc;

use mirror_shared::BodyType;
use mirror_store::{BufferHandle, MirrorStore, StoreError};
use serde_json::Value;

use crate::outbound::Outbound;
use crate::remote::Remote;

/// Context shared by every element of a message body.
#[derive(Clone, Copy)]
pub struct Event<'a> {
    pub remote: &'a Remote,
    pub outbound: &'a Arc<dyn Outbound>,
    /// `event.name` of the message, if any.
    pub name: Option<&'a str>,
    /// Local buffer resolved from `event.buffer_id`, if any.
    pub buffer: Option<BufferHandle>,
}

impl<'a> Event<'a> {
    pub fn new(remote: &'a Remote, outbound: &'a Arc<dyn Outbound>) -> Self {
        Self {
            remote,
            outbound,
            name: None,
            buffer: None,
        }
    }

    /// Same context, targeting `buffer`.
    pub fn for_buffer(self, buffer: BufferHandle) -> Self {
        Self {
            buffer: Some(buffer),
            ..self
        }
    }
}

/// Apply one body element of type `body_type`.
pub fn handle<S>(
    body_type: BodyType,
    store: &mut S,
    event: &Event<'_>,
    body: &Value,
) -> Result<(), StoreError>
where
    S: MirrorStore + ?Sized,
{
    match body_type {
        BodyType::Buffer => buffer::handle(store, event, body),
        BodyType::Line => line::handle(store, event, body),
        BodyType::NickGroup => nicklist::handle_group(store, event, body),
        BodyType::Nick => nicklist::handle_nick(store, event, body),
        BodyType::Version => {
            version::handle(store, event, body);
            Ok(())
        }
    }
}
