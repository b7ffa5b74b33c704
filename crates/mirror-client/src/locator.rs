//! Correlation between remote buffer ids and local buffers.
//!
//! A mirrored buffer carries the name of its remote and its remote id in two
//! local variables. Groups and nicks are found through the store's own id
//! index ([`MirrorStore::search_group`], [`MirrorStore::search_nick`]).

use mirror_shared::constants::{LOCALVAR_REMOTE, LOCALVAR_REMOTE_ID};
use mirror_store::{BufferHandle, LocalVars, MirrorStore, StoreError};

/// Local buffer mirroring buffer `id` of the remote `remote_name`.
///
/// Scans every buffer of the store; `None` for a negative id.
pub fn find_buffer<S>(
    store: &S,
    remote_name: &str,
    id: i64,
) -> Result<Option<BufferHandle>, StoreError>
where
    S: MirrorStore + ?Sized,
{
    if id < 0 {
        return Ok(None);
    }

    let id = id.to_string();
    for buffer in store.buffers()? {
        let remote = store.local_var(buffer, LOCALVAR_REMOTE)?;
        if remote.as_deref() != Some(remote_name) {
            continue;
        }
        if store.local_var(buffer, LOCALVAR_REMOTE_ID)?.as_deref() == Some(id.as_str()) {
            return Ok(Some(buffer));
        }
    }
    Ok(None)
}

/// Remote id stored in the local variables of a buffer.
///
/// The whole value must be a base-10 integer; negative ids are rejected.
pub fn buffer_remote_id(local_vars: &LocalVars) -> Option<i64> {
    local_vars
        .get(LOCALVAR_REMOTE_ID)?
        .parse::<i64>()
        .ok()
        .filter(|id| *id >= 0)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mirror_store::{BufferProps, InputCallback, MemoryStore};

    use super::*;

    fn create(store: &mut MemoryStore, full_name: &str, remote: &str, id: &str) -> BufferHandle {
        let mut props = BufferProps::default();
        props
            .local_vars
            .insert(LOCALVAR_REMOTE.to_string(), remote.to_string());
        props
            .local_vars
            .insert(LOCALVAR_REMOTE_ID.to_string(), id.to_string());
        let input: InputCallback = Arc::new(|_: &LocalVars, _: &str| {});
        store.create_buffer(full_name, &props, input).unwrap().unwrap()
    }

    #[test]
    fn test_find_buffer_by_remote_and_id() {
        let mut store = MemoryStore::new();
        let a = create(&mut store, "remote.a.core", "a", "10");
        let b = create(&mut store, "remote.b.core", "b", "10");

        assert_eq!(find_buffer(&store, "a", 10).unwrap(), Some(a));
        assert_eq!(find_buffer(&store, "b", 10).unwrap(), Some(b));
        assert_eq!(find_buffer(&store, "a", 11).unwrap(), None);
        assert_eq!(find_buffer(&store, "c", 10).unwrap(), None);
    }

    #[test]
    fn test_negative_id_never_matches() {
        let mut store = MemoryStore::new();
        create(&mut store, "remote.a.core", "a", "-1");
        assert_eq!(find_buffer(&store, "a", -1).unwrap(), None);
    }

    #[test]
    fn test_buffer_remote_id_is_strict() {
        let mut vars = LocalVars::new();
        assert_eq!(buffer_remote_id(&vars), None);

        vars.insert(LOCALVAR_REMOTE_ID.to_string(), "42".to_string());
        assert_eq!(buffer_remote_id(&vars), Some(42));

        vars.insert(LOCALVAR_REMOTE_ID.to_string(), "42abc".to_string());
        assert_eq!(buffer_remote_id(&vars), None);

        vars.insert(LOCALVAR_REMOTE_ID.to_string(), "-3".to_string());
        assert_eq!(buffer_remote_id(&vars), None);
    }
}
