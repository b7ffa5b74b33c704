//! Forwarding of text typed in a mirrored buffer to its remote.

use std::sync::Arc;

use mirror_shared::ApiRequest;
use mirror_store::{InputCallback, LocalVars};
use tracing::{debug, warn};

use crate::locator::buffer_remote_id;
use crate::outbound::Outbound;

/// Input callback of the buffers mirrored from `remote_name`.
///
/// The callback finds the remote buffer id in the local variables of the
/// buffer it is called for, so one callback serves every buffer of a remote.
pub fn input_callback(remote_name: &str, outbound: Arc<dyn Outbound>) -> InputCallback {
    let remote_name = remote_name.to_string();
    Arc::new(move |local_vars: &LocalVars, text: &str| {
        forward_input(&remote_name, outbound.as_ref(), local_vars, text);
    })
}

/// Send `text` to the buffer of the remote described by `local_vars`.
///
/// Returns `true` if the request was accepted by the sender. Failures are
/// logged; user input is never retried.
pub fn forward_input(
    remote_name: &str,
    outbound: &dyn Outbound,
    local_vars: &LocalVars,
    text: &str,
) -> bool {
    let Some(buffer_id) = buffer_remote_id(local_vars) else {
        debug!(remote = %remote_name, "input in buffer without remote id ignored");
        return false;
    };

    match outbound.send(remote_name, &ApiRequest::input(buffer_id, text)) {
        Ok(()) => true,
        Err(e) => {
            warn!(remote = %remote_name, buffer_id, error = %e, "failed to send input");
            false
        }
    }
}
