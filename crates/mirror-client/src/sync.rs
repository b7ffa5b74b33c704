use mirror_shared::ApiRequest;
use tracing::{info, warn};

use crate::error::SendError;
use crate::outbound::Outbound;
use crate::remote::Remote;

/// Ask `remote` for its full state and all future events.
///
/// The remote is marked as synced only if the sender accepts the request;
/// otherwise the next buffer listing triggers a new attempt.
pub fn sync_with_remote(remote: &mut Remote, outbound: &dyn Outbound) -> Result<(), SendError> {
    match outbound.send(&remote.name, &ApiRequest::sync()) {
        Ok(()) => {
            remote.synced = true;
            info!(remote = %remote.name, "sync requested");
            Ok(())
        }
        Err(e) => {
            warn!(remote = %remote.name, error = %e, "failed to request sync");
            Err(e)
        }
    }
}
