use mirror_shared::constants::{EVENT_GROUP_REMOVING, EVENT_NICK_REMOVING, NO_ID};
use mirror_store::{MirrorStore, StoreError};
use serde_json::Value;
use tracing::trace;

use super::Event;
use crate::json;
use crate::nicklist::{
    remove_group_by_id, remove_nick_by_id, upsert_group_tree, upsert_nick, GroupNode, NickNode,
};

/// Body type `nick_group`: remove a group, or add/update a group subtree.
pub fn handle_group<S>(store: &mut S, event: &Event<'_>, body: &Value) -> Result<(), StoreError>
where
    S: MirrorStore + ?Sized,
{
    let Some(buffer) = event.buffer else {
        return Ok(());
    };

    if event.name == Some(EVENT_GROUP_REMOVING) {
        let id = json::get_i64(body, "id", NO_ID);
        if !remove_group_by_id(store, buffer, id)? {
            trace!(id, "group to remove not found");
        }
        return Ok(());
    }

    upsert_group_tree(store, buffer, &GroupNode::from_json(body))
}

/// Body type `nick`: remove a nick, or add/update it.
pub fn handle_nick<S>(store: &mut S, event: &Event<'_>, body: &Value) -> Result<(), StoreError>
where
    S: MirrorStore + ?Sized,
{
    let Some(buffer) = event.buffer else {
        return Ok(());
    };

    if event.name == Some(EVENT_NICK_REMOVING) {
        let id = json::get_i64(body, "id", NO_ID);
        if !remove_nick_by_id(store, buffer, id)? {
            trace!(id, "nick to remove not found");
        }
        return Ok(());
    }

    upsert_nick(store, buffer, &NickNode::from_json(body))
}
