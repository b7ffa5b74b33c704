//! # mirror-client
//!
//! Local mirror of the buffers of remote relays.
//!
//! A [`RemoteSession`] consumes the messages a remote sends over an
//! established connection and applies them to a [`MirrorStore`]: buffers are
//! created or updated, lines printed, nicklists reconciled. Text typed in a
//! mirrored buffer goes back to the remote through an [`Outbound`] sender,
//! like the sync request sent once the first buffer listing is received.
//!
//! [`MirrorStore`]: mirror_store::MirrorStore

pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod input;
pub mod json;
pub mod locator;
pub mod nicklist;
pub mod outbound;
pub mod remote;
pub mod sync;
pub mod time;

pub use dispatch::{Dispatched, RemoteSession};
pub use error::{EventError, SendError};
pub use input::input_callback;
pub use locator::{buffer_remote_id, find_buffer};
pub use nicklist::{upsert_group_tree, upsert_nick, GroupNode, NickNode};
pub use outbound::{Outbound, OutboundMessage, RecordingOutbound};
pub use remote::Remote;
pub use sync::sync_with_remote;
