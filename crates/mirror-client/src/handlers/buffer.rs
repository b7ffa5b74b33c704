use mirror_shared::constants::{
    BUFFER_NAMESPACE, LOCALVAR_REMOTE, LOCALVAR_REMOTE_ID, LOCALVAR_REMOTE_NUMBER, NO_ID,
};
use mirror_shared::BufferType;
use mirror_store::{BufferHandle, BufferProps, MirrorStore, StoreError};
use serde_json::Value;
use tracing::{debug, trace};

use super::{line, Event};
use crate::input::input_callback;
use crate::json;
use crate::locator::find_buffer;
use crate::nicklist::{upsert_group_tree, GroupNode};

/// Body type `buffer`: create or update a buffer, then its keys, lines and
/// nicklist.
///
/// Properties of an existing buffer are overwritten: a field missing from
/// the body resets the property to its default.
pub fn handle<S>(store: &mut S, event: &Event<'_>, body: &Value) -> Result<(), StoreError>
where
    S: MirrorStore + ?Sized,
{
    let remote_name = event.remote.name.as_str();
    let id = json::get_i64(body, "id", NO_ID);
    let props = buffer_props(remote_name, id, body);

    let buffer = match find_buffer(&*store, remote_name, id)? {
        Some(buffer) => {
            store.apply_props(buffer, &props)?;
            // Buffers restored from a persistent store have no callback yet.
            let input = input_callback(remote_name, event.outbound.clone());
            store.set_input_callback(buffer, input)?;
            trace!(remote = %remote_name, id, "buffer updated");
            Some(buffer)
        }
        None => create_buffer(store, event, id, body, &props)?,
    };
    let Some(buffer) = buffer else {
        return Ok(());
    };

    for entry in json::get_array(body, "keys").into_iter().flatten() {
        let key = json::get_str(entry, "key");
        let command = json::get_str(entry, "command");
        if let (Some(key), Some(command)) = (key, command) {
            store.bind_key(buffer, key, command)?;
        }
    }

    let line_event = event.for_buffer(buffer);
    for body_line in json::get_array(body, "lines").into_iter().flatten() {
        line::handle(store, &line_event, body_line)?;
    }

    if let Some(root) = body.get("nicklist_root").filter(|root| root.is_object()) {
        upsert_group_tree(store, buffer, &GroupNode::from_json(root))?;
    }

    Ok(())
}

fn create_buffer<S>(
    store: &mut S,
    event: &Event<'_>,
    id: i64,
    body: &Value,
    props: &BufferProps,
) -> Result<Option<BufferHandle>, StoreError>
where
    S: MirrorStore + ?Sized,
{
    let remote_name = event.remote.name.as_str();
    let Some(name) = json::get_str(body, "name") else {
        debug!(remote = %remote_name, id, "buffer without name dropped");
        return Ok(None);
    };

    let full_name = format!("{BUFFER_NAMESPACE}.{remote_name}.{name}");
    let input = input_callback(remote_name, event.outbound.clone());
    let buffer = store.create_buffer(&full_name, props, input)?;
    match buffer {
        Some(_) => debug!(remote = %remote_name, id, name = %full_name, "buffer created"),
        None => debug!(remote = %remote_name, id, name = %full_name, "buffer name taken"),
    }
    Ok(buffer)
}

/// Properties of the buffer described by `body`, with the local variables
/// tying it to buffer `id` of the remote.
fn buffer_props(remote_name: &str, id: i64, body: &Value) -> BufferProps {
    let mut props = BufferProps {
        buffer_type: json::get_str(body, "type")
            .and_then(|t| t.parse::<BufferType>().ok())
            .unwrap_or_default(),
        short_name: json::get_str(body, "short_name").map(str::to_string),
        title: json::get_str(body, "title").map(str::to_string),
        nicklist: json::get_bool(body, "nicklist"),
        nicklist_case_sensitive: json::get_bool(body, "nicklist_case_sensitive"),
        nicklist_display_groups: json::get_bool(body, "nicklist_display_groups"),
        input_get_any_user_data: true,
        ..BufferProps::default()
    };

    let number = json::get_i64(body, "number", NO_ID);
    props
        .local_vars
        .insert(LOCALVAR_REMOTE.to_string(), remote_name.to_string());
    props
        .local_vars
        .insert(LOCALVAR_REMOTE_ID.to_string(), id.to_string());
    props
        .local_vars
        .insert(LOCALVAR_REMOTE_NUMBER.to_string(), number.to_string());
    props
}
