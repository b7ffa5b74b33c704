use thiserror::Error;

/// Failure to process a message received from a remote.
///
/// Both variants are reported to the user and the message is dropped; the
/// connection to the remote is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    /// The message is not JSON, or has neither a body type nor a success code.
    #[error("remote[{remote}]: invalid data received from remote: \"{data}\"")]
    InvalidData { remote: String, data: String },

    /// At least one body element could not be applied to the local store.
    #[error("remote[{remote}]: callback failed for body type \"{body_type}\"")]
    HandlerFailed {
        remote: String,
        body_type: String,
        /// Number of body elements that failed.
        failed: usize,
        /// Number of body elements processed.
        total: usize,
        data: String,
    },
}

/// Failure to hand a request to the connection of a remote.
#[derive(Error, Debug)]
pub enum SendError {
    /// The connection task is gone.
    #[error("Outbound channel closed")]
    Closed,
}
