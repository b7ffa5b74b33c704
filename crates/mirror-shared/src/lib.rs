//! # mirror-shared
//!
//! Types shared by the remote mirror crates: the request messages sent to a
//! remote, the body types it sends back, and the protocol constants (API
//! paths, local variable names, reserved ids).

pub mod constants;
pub mod error;
pub mod protocol;
pub mod types;

pub use error::ProtocolError;
pub use protocol::{ApiRequest, InputBody, SyncBody};
pub use types::{BodyType, BufferType};
