//! Applying nicklist snapshots and deltas to a mirrored buffer.
//!
//! The remote sends its nicklist as a tree of groups, each holding subgroups
//! and nicks. Every node carries the remote id of the node itself and of its
//! parent group. The functions here reconcile such a tree with the local
//! nicklist of one buffer:
//!
//! - a node whose id is known locally is updated in place;
//! - an unknown node is created under its parent, then stamped with its id;
//! - a node whose parent is not known locally is dropped. The remote sends
//!   the full nicklist again on the next sync, which repairs the gap.

use mirror_shared::constants::NO_ID;
use mirror_store::{
    BufferHandle, GroupHandle, GroupProperty, MirrorStore, NewGroup, NewNick, NickProperty,
    StoreError,
};
use serde_json::Value;
use tracing::{debug, trace};

use crate::json;

/// A nicklist group with its subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupNode {
    pub id: i64,
    pub parent_group_id: i64,
    pub name: Option<String>,
    pub color: Option<String>,
    pub visible: bool,
    pub groups: Vec<GroupNode>,
    pub nicks: Vec<NickNode>,
}

/// A nick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NickNode {
    pub id: i64,
    pub parent_group_id: i64,
    pub name: Option<String>,
    pub color: Option<String>,
    pub prefix: Option<String>,
    pub prefix_color: Option<String>,
    pub visible: bool,
}

impl GroupNode {
    /// Decode a group and its subtree; missing fields take their default.
    pub fn from_json(json: &Value) -> Self {
        Self {
            id: json::get_i64(json, "id", NO_ID),
            parent_group_id: json::get_i64(json, "parent_group_id", NO_ID),
            name: json::get_str(json, "name").map(str::to_string),
            color: json::get_str(json, "color_name").map(str::to_string),
            visible: json::get_bool(json, "visible"),
            groups: json::get_array(json, "groups")
                .map(|groups| groups.iter().map(GroupNode::from_json).collect())
                .unwrap_or_default(),
            nicks: json::get_array(json, "nicks")
                .map(|nicks| nicks.iter().map(NickNode::from_json).collect())
                .unwrap_or_default(),
        }
    }
}

impl NickNode {
    /// Decode a nick; missing fields take their default.
    pub fn from_json(json: &Value) -> Self {
        Self {
            id: json::get_i64(json, "id", NO_ID),
            parent_group_id: json::get_i64(json, "parent_group_id", NO_ID),
            name: json::get_str(json, "name").map(str::to_string),
            color: json::get_str(json, "color_name").map(str::to_string),
            prefix: json::get_str(json, "prefix").map(str::to_string),
            prefix_color: json::get_str(json, "prefix_color_name").map(str::to_string),
            visible: json::get_bool(json, "visible"),
        }
    }
}

/// Create or update `node`, then its subgroups and nicks, in `buffer`.
///
/// Children are processed even when `node` itself was dropped: they may
/// already exist locally under another parent.
pub fn upsert_group_tree<S>(
    store: &mut S,
    buffer: BufferHandle,
    node: &GroupNode,
) -> Result<(), StoreError>
where
    S: MirrorStore + ?Sized,
{
    if let Some(group) = store.search_group(buffer, node.id)? {
        store.set_group(buffer, group, GroupProperty::Id(node.id))?;
        store.set_group(buffer, group, GroupProperty::Color(node.color.as_deref()))?;
        store.set_group(buffer, group, GroupProperty::Visible(node.visible))?;
    } else if let Some(parent) = find_parent(&*store, buffer, node.parent_group_id)? {
        match node.name.as_deref() {
            Some(name) => {
                let new_group = NewGroup {
                    name,
                    color: node.color.as_deref(),
                    visible: node.visible,
                };
                if let Some(group) = store.add_group(buffer, parent, &new_group)? {
                    store.set_group(buffer, group, GroupProperty::Id(node.id))?;
                }
            }
            None => debug!(id = node.id, "group without name dropped"),
        }
    } else {
        trace!(
            id = node.id,
            parent_group_id = node.parent_group_id,
            "parent group not found, group dropped"
        );
    }

    for group in &node.groups {
        upsert_group_tree(store, buffer, group)?;
    }
    for nick in &node.nicks {
        upsert_nick(store, buffer, nick)?;
    }
    Ok(())
}

/// Create or update a nick in `buffer`.  The name is only set on creation.
pub fn upsert_nick<S>(
    store: &mut S,
    buffer: BufferHandle,
    node: &NickNode,
) -> Result<(), StoreError>
where
    S: MirrorStore + ?Sized,
{
    if let Some(nick) = store.search_nick(buffer, node.id)? {
        store.set_nick(buffer, nick, NickProperty::Id(node.id))?;
        store.set_nick(buffer, nick, NickProperty::Color(node.color.as_deref()))?;
        store.set_nick(buffer, nick, NickProperty::Prefix(node.prefix.as_deref()))?;
        store.set_nick(
            buffer,
            nick,
            NickProperty::PrefixColor(node.prefix_color.as_deref()),
        )?;
        store.set_nick(buffer, nick, NickProperty::Visible(node.visible))?;
        return Ok(());
    }

    let Some(parent) = find_parent(&*store, buffer, node.parent_group_id)? else {
        trace!(
            id = node.id,
            parent_group_id = node.parent_group_id,
            "parent group not found, nick dropped"
        );
        return Ok(());
    };
    let Some(name) = node.name.as_deref() else {
        debug!(id = node.id, "nick without name dropped");
        return Ok(());
    };

    let new_nick = NewNick {
        name,
        color: node.color.as_deref(),
        prefix: node.prefix.as_deref(),
        prefix_color: node.prefix_color.as_deref(),
        visible: node.visible,
    };
    if let Some(nick) = store.add_nick(buffer, parent, &new_nick)? {
        store.set_nick(buffer, nick, NickProperty::Id(node.id))?;
    }
    Ok(())
}

/// Remove the group with remote id `id` and everything under it.
///
/// Returns `false` if no such group exists.
pub fn remove_group_by_id<S>(
    store: &mut S,
    buffer: BufferHandle,
    id: i64,
) -> Result<bool, StoreError>
where
    S: MirrorStore + ?Sized,
{
    match store.search_group(buffer, id)? {
        Some(group) => {
            store.remove_group(buffer, group)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Remove the nick with remote id `id`.
///
/// Returns `false` if no such nick exists.
pub fn remove_nick_by_id<S>(
    store: &mut S,
    buffer: BufferHandle,
    id: i64,
) -> Result<bool, StoreError>
where
    S: MirrorStore + ?Sized,
{
    match store.search_nick(buffer, id)? {
        Some(nick) => {
            store.remove_nick(buffer, nick)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

fn find_parent<S>(
    store: &S,
    buffer: BufferHandle,
    parent_group_id: i64,
) -> Result<Option<GroupHandle>, StoreError>
where
    S: MirrorStore + ?Sized,
{
    if parent_group_id < 0 {
        return Ok(None);
    }
    store.search_group(buffer, parent_group_id)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mirror_shared::constants::ROOT_GROUP_ID;
    use mirror_store::{BufferProps, InputCallback, LocalVars, MemoryStore};
    use serde_json::json;

    use super::*;

    fn setup() -> (MemoryStore, BufferHandle) {
        let mut store = MemoryStore::new();
        let input: InputCallback = Arc::new(|_: &LocalVars, _: &str| {});
        let buffer = store
            .create_buffer("remote.r.irc.libera.#rust", &BufferProps::default(), input)
            .unwrap()
            .unwrap();
        (store, buffer)
    }

    fn group(id: i64, parent: i64, name: &str) -> GroupNode {
        GroupNode {
            id,
            parent_group_id: parent,
            name: Some(name.to_string()),
            visible: true,
            ..GroupNode::default()
        }
    }

    fn nick(id: i64, parent: i64, name: &str) -> NickNode {
        NickNode {
            id,
            parent_group_id: parent,
            name: Some(name.to_string()),
            visible: true,
            ..NickNode::default()
        }
    }

    #[test]
    fn test_from_json_decodes_tree() {
        let node = GroupNode::from_json(&json!({
            "id": 0,
            "parent_group_id": -1,
            "name": "root",
            "visible": false,
            "groups": [
                {"id": 5, "parent_group_id": 0, "name": "000|o", "color_name": "weechat.color.nicklist_group", "visible": true,
                 "nicks": [{"id": 9, "parent_group_id": 5, "name": "alice", "prefix": "@", "prefix_color_name": "lightgreen", "visible": true}]}
            ]
        }));

        assert_eq!(node.id, 0);
        assert_eq!(node.parent_group_id, -1);
        assert_eq!(node.groups.len(), 1);
        assert_eq!(node.groups[0].color.as_deref(), Some("weechat.color.nicklist_group"));
        let alice = &node.groups[0].nicks[0];
        assert_eq!(alice.prefix.as_deref(), Some("@"));
        assert_eq!(alice.prefix_color.as_deref(), Some("lightgreen"));
    }

    #[test]
    fn test_from_json_defaults() {
        let node = NickNode::from_json(&Value::Null);
        assert_eq!(node.id, NO_ID);
        assert_eq!(node.parent_group_id, NO_ID);
        assert_eq!(node.name, None);
        assert!(!node.visible);
    }

    #[test]
    fn test_snapshot_builds_tree_under_root() {
        let (mut store, buffer) = setup();
        let mut ops = group(5, ROOT_GROUP_ID, "000|o");
        ops.nicks.push(nick(9, 5, "alice"));
        let mut root = group(ROOT_GROUP_ID, -1, "root");
        root.groups.push(ops);
        root.nicks.push(nick(10, ROOT_GROUP_ID, "bob"));

        upsert_group_tree(&mut store, buffer, &root).unwrap();

        let ops = store.group_by_id(buffer, 5).unwrap();
        assert_eq!(ops.name, "000|o");
        assert_eq!(store.nick_by_id(buffer, 9).unwrap().group, ops.handle);
        assert_eq!(
            store.nick_by_id(buffer, 10).unwrap().group,
            store.root_group(buffer).unwrap()
        );
    }

    #[test]
    fn test_group_with_unknown_parent_is_dropped() {
        let (mut store, buffer) = setup();
        upsert_group_tree(&mut store, buffer, &group(7, 99, "orphan")).unwrap();
        upsert_group_tree(&mut store, buffer, &group(8, -1, "detached")).unwrap();

        assert!(store.group_by_id(buffer, 7).is_none());
        assert!(store.group_by_id(buffer, 8).is_none());
        assert_eq!(store.groups(buffer).len(), 1);
    }

    #[test]
    fn test_nick_converges_once_parent_exists() {
        let (mut store, buffer) = setup();
        let alice = nick(9, 5, "alice");

        upsert_nick(&mut store, buffer, &alice).unwrap();
        assert!(store.nick_by_id(buffer, 9).is_none());

        upsert_group_tree(&mut store, buffer, &group(5, ROOT_GROUP_ID, "ops")).unwrap();
        upsert_nick(&mut store, buffer, &alice).unwrap();
        assert_eq!(store.nick_by_id(buffer, 9).unwrap().name, "alice");
    }

    #[test]
    fn test_update_keeps_name_and_sets_fields() {
        let (mut store, buffer) = setup();
        upsert_nick(&mut store, buffer, &nick(9, ROOT_GROUP_ID, "alice")).unwrap();

        let update = NickNode {
            id: 9,
            parent_group_id: ROOT_GROUP_ID,
            name: Some("mallory".to_string()),
            color: Some("red".to_string()),
            prefix: Some("+".to_string()),
            prefix_color: Some("yellow".to_string()),
            visible: false,
        };
        upsert_nick(&mut store, buffer, &update).unwrap();

        let nick = store.nick_by_id(buffer, 9).unwrap();
        assert_eq!(nick.name, "alice");
        assert_eq!(nick.color.as_deref(), Some("red"));
        assert_eq!(nick.prefix.as_deref(), Some("+"));
        assert_eq!(nick.prefix_color.as_deref(), Some("yellow"));
        assert!(!nick.visible);
        assert_eq!(store.nicks(buffer).len(), 1);
    }

    #[test]
    fn test_group_update_is_idempotent() {
        let (mut store, buffer) = setup();
        let mut ops = group(5, ROOT_GROUP_ID, "ops");
        upsert_group_tree(&mut store, buffer, &ops).unwrap();

        ops.color = Some("green".to_string());
        ops.visible = false;
        upsert_group_tree(&mut store, buffer, &ops).unwrap();
        upsert_group_tree(&mut store, buffer, &ops).unwrap();

        assert_eq!(store.groups(buffer).len(), 2);
        let ops = store.group_by_id(buffer, 5).unwrap();
        assert_eq!(ops.color.as_deref(), Some("green"));
        assert!(!ops.visible);
    }

    #[test]
    fn test_nameless_nick_is_dropped() {
        let (mut store, buffer) = setup();
        let nameless = NickNode {
            id: 3,
            parent_group_id: ROOT_GROUP_ID,
            ..NickNode::default()
        };
        upsert_nick(&mut store, buffer, &nameless).unwrap();
        assert!(store.nicks(buffer).is_empty());
    }

    #[test]
    fn test_remove_by_id() {
        let (mut store, buffer) = setup();
        let mut ops = group(5, ROOT_GROUP_ID, "ops");
        ops.nicks.push(nick(9, 5, "alice"));
        upsert_group_tree(&mut store, buffer, &ops).unwrap();
        upsert_nick(&mut store, buffer, &nick(10, ROOT_GROUP_ID, "bob")).unwrap();

        assert!(remove_nick_by_id(&mut store, buffer, 10).unwrap());
        assert!(!remove_nick_by_id(&mut store, buffer, 10).unwrap());
        assert!(remove_group_by_id(&mut store, buffer, 5).unwrap());
        assert!(!remove_group_by_id(&mut store, buffer, 5).unwrap());

        assert!(store.nicks(buffer).is_empty());
        assert_eq!(store.groups(buffer).len(), 1);
    }
}
