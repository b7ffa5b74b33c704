//! In-memory [`MirrorStore`].
//!
//! Keeps everything in process memory, with a per-buffer index from stamped
//! remote ids to nicklist handles. Used by tests and by hosts that do not
//! need the mirror to survive a restart.

use std::collections::{BTreeMap, HashMap};

use mirror_shared::constants::ROOT_GROUP_ID;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::models::{
    Buffer, BufferHandle, BufferProps, Group, GroupHandle, GroupProperty, InputCallback, Line,
    NewGroup, NewNick, Nick, NickHandle, NickProperty, Report, ReportLevel,
};
use crate::store::MirrorStore;

/// Store keeping all buffers in memory.
#[derive(Default)]
pub struct MemoryStore {
    next_handle: i64,
    buffers: Vec<MemoryBuffer>,
    reports: Vec<Report>,
}

struct MemoryBuffer {
    buffer: Buffer,
    input: Option<InputCallback>,
    lines: Vec<Line>,
    free_lines: BTreeMap<i32, Line>,
    nicklist: Nicklist,
}

struct Nicklist {
    root: GroupHandle,
    groups: BTreeMap<GroupHandle, Group>,
    nicks: BTreeMap<NickHandle, Nick>,
    group_ids: HashMap<i64, GroupHandle>,
    nick_ids: HashMap<i64, NickHandle>,
}

impl Nicklist {
    fn new(root: GroupHandle) -> Self {
        let mut nicklist = Self {
            root,
            groups: BTreeMap::new(),
            nicks: BTreeMap::new(),
            group_ids: HashMap::new(),
            nick_ids: HashMap::new(),
        };
        nicklist.groups.insert(
            root,
            Group {
                handle: root,
                remote_id: Some(ROOT_GROUP_ID),
                parent: None,
                name: "root".to_string(),
                color: None,
                visible: false,
            },
        );
        nicklist.group_ids.insert(ROOT_GROUP_ID, root);
        nicklist
    }

    fn stamp_group(&mut self, handle: GroupHandle, id: i64) -> Result<()> {
        let group = self
            .groups
            .get_mut(&handle)
            .ok_or(StoreError::UnknownGroup(handle))?;
        if let Some(old) = group.remote_id.replace(id) {
            if self.group_ids.get(&old) == Some(&handle) {
                self.group_ids.remove(&old);
            }
        }
        self.group_ids.insert(id, handle);
        Ok(())
    }

    fn stamp_nick(&mut self, handle: NickHandle, id: i64) -> Result<()> {
        let nick = self
            .nicks
            .get_mut(&handle)
            .ok_or(StoreError::UnknownNick(handle))?;
        if let Some(old) = nick.remote_id.replace(id) {
            if self.nick_ids.get(&old) == Some(&handle) {
                self.nick_ids.remove(&old);
            }
        }
        self.nick_ids.insert(id, handle);
        Ok(())
    }

    fn unlink_nick(&mut self, handle: NickHandle) {
        if let Some(nick) = self.nicks.remove(&handle) {
            if let Some(id) = nick.remote_id {
                if self.nick_ids.get(&id) == Some(&handle) {
                    self.nick_ids.remove(&id);
                }
            }
        }
    }

    fn unlink_group(&mut self, handle: GroupHandle) {
        if let Some(group) = self.groups.remove(&handle) {
            if let Some(id) = group.remote_id {
                if self.group_ids.get(&id) == Some(&handle) {
                    self.group_ids.remove(&id);
                }
            }
        }
    }

    /// Remove `handle` with all its descendants; the root group itself is
    /// only emptied.
    fn remove_group(&mut self, handle: GroupHandle) -> Result<()> {
        if !self.groups.contains_key(&handle) {
            return Err(StoreError::UnknownGroup(handle));
        }

        let mut doomed = vec![handle];
        let mut i = 0;
        while i < doomed.len() {
            let current = doomed[i];
            doomed.extend(
                self.groups
                    .values()
                    .filter(|g| g.parent == Some(current))
                    .map(|g| g.handle),
            );
            i += 1;
        }

        let doomed_nicks: Vec<NickHandle> = self
            .nicks
            .values()
            .filter(|n| doomed.contains(&n.group))
            .map(|n| n.handle)
            .collect();
        for nick in doomed_nicks {
            self.unlink_nick(nick);
        }
        for group in doomed {
            if group != self.root {
                self.unlink_group(group);
            }
        }
        Ok(())
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_handle(&mut self) -> i64 {
        self.next_handle += 1;
        self.next_handle
    }

    fn get(&self, handle: BufferHandle) -> Result<&MemoryBuffer> {
        self.buffers
            .iter()
            .find(|b| b.buffer.handle == handle)
            .ok_or(StoreError::UnknownBuffer(handle))
    }

    fn get_mut(&mut self, handle: BufferHandle) -> Result<&mut MemoryBuffer> {
        self.buffers
            .iter_mut()
            .find(|b| b.buffer.handle == handle)
            .ok_or(StoreError::UnknownBuffer(handle))
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn buffer_by_name(&self, full_name: &str) -> Option<&Buffer> {
        self.buffers
            .iter()
            .map(|b| &b.buffer)
            .find(|b| b.full_name == full_name)
    }

    /// Lines appended to a formatted buffer, oldest first.
    pub fn lines(&self, handle: BufferHandle) -> &[Line] {
        self.get(handle)
            .map(|b| b.lines.as_slice())
            .unwrap_or_default()
    }

    /// Lines of a free-content buffer, by row.
    pub fn free_lines(&self, handle: BufferHandle) -> Option<&BTreeMap<i32, Line>> {
        self.get(handle).ok().map(|b| &b.free_lines)
    }

    pub fn groups(&self, handle: BufferHandle) -> Vec<&Group> {
        self.get(handle)
            .map(|b| b.nicklist.groups.values().collect())
            .unwrap_or_default()
    }

    pub fn nicks(&self, handle: BufferHandle) -> Vec<&Nick> {
        self.get(handle)
            .map(|b| b.nicklist.nicks.values().collect())
            .unwrap_or_default()
    }

    pub fn group_by_id(&self, handle: BufferHandle, id: i64) -> Option<&Group> {
        let nicklist = &self.get(handle).ok()?.nicklist;
        nicklist
            .group_ids
            .get(&id)
            .and_then(|g| nicklist.groups.get(g))
    }

    pub fn nick_by_id(&self, handle: BufferHandle, id: i64) -> Option<&Nick> {
        let nicklist = &self.get(handle).ok()?.nicklist;
        nicklist.nick_ids.get(&id).and_then(|n| nicklist.nicks.get(n))
    }

    /// Messages reported to the user, oldest first.
    pub fn reports(&self) -> &[Report] {
        &self.reports
    }
}

impl MirrorStore for MemoryStore {
    fn buffers(&self) -> Result<Vec<BufferHandle>> {
        Ok(self.buffers.iter().map(|b| b.buffer.handle).collect())
    }

    fn local_var(&self, buffer: BufferHandle, name: &str) -> Result<Option<String>> {
        Ok(self.get(buffer)?.buffer.local_var(name).map(str::to_string))
    }

    fn create_buffer(
        &mut self,
        full_name: &str,
        props: &BufferProps,
        input: InputCallback,
    ) -> Result<Option<BufferHandle>> {
        if self.buffer_by_name(full_name).is_some() {
            debug!(name = %full_name, "buffer already exists");
            return Ok(None);
        }

        let handle = BufferHandle(self.next_handle());
        let root = GroupHandle(self.next_handle());
        self.buffers.push(MemoryBuffer {
            buffer: Buffer::new(handle, full_name, props),
            input: Some(input),
            lines: Vec::new(),
            free_lines: BTreeMap::new(),
            nicklist: Nicklist::new(root),
        });
        Ok(Some(handle))
    }

    fn apply_props(&mut self, buffer: BufferHandle, props: &BufferProps) -> Result<()> {
        self.get_mut(buffer)?.buffer.apply(props);
        Ok(())
    }

    fn set_input_callback(&mut self, buffer: BufferHandle, input: InputCallback) -> Result<()> {
        self.get_mut(buffer)?.input = Some(input);
        Ok(())
    }

    fn bind_key(&mut self, buffer: BufferHandle, key: &str, command: &str) -> Result<()> {
        self.get_mut(buffer)?
            .buffer
            .keys
            .insert(key.to_string(), command.to_string());
        Ok(())
    }

    fn send_input(&self, buffer: BufferHandle, text: &str) -> Result<bool> {
        let entry = self.get(buffer)?;
        match &entry.input {
            Some(callback) => {
                callback(&entry.buffer.local_vars, text);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn print_y(&mut self, buffer: BufferHandle, y: i32, line: &Line) -> Result<()> {
        self.get_mut(buffer)?.free_lines.insert(y, line.clone());
        Ok(())
    }

    fn print(&mut self, buffer: BufferHandle, line: &Line) -> Result<()> {
        self.get_mut(buffer)?.lines.push(line.clone());
        Ok(())
    }

    fn root_group(&self, buffer: BufferHandle) -> Result<GroupHandle> {
        Ok(self.get(buffer)?.nicklist.root)
    }

    fn search_group(&self, buffer: BufferHandle, id: i64) -> Result<Option<GroupHandle>> {
        Ok(self.get(buffer)?.nicklist.group_ids.get(&id).copied())
    }

    fn search_nick(&self, buffer: BufferHandle, id: i64) -> Result<Option<NickHandle>> {
        Ok(self.get(buffer)?.nicklist.nick_ids.get(&id).copied())
    }

    fn add_group(
        &mut self,
        buffer: BufferHandle,
        parent: GroupHandle,
        group: &NewGroup<'_>,
    ) -> Result<Option<GroupHandle>> {
        let handle = GroupHandle(self.next_handle());
        let nicklist = &mut self.get_mut(buffer)?.nicklist;
        if !nicklist.groups.contains_key(&parent) {
            return Err(StoreError::UnknownGroup(parent));
        }
        nicklist.groups.insert(
            handle,
            Group {
                handle,
                remote_id: None,
                parent: Some(parent),
                name: group.name.to_string(),
                color: group.color.map(str::to_string),
                visible: group.visible,
            },
        );
        Ok(Some(handle))
    }

    fn add_nick(
        &mut self,
        buffer: BufferHandle,
        group: GroupHandle,
        nick: &NewNick<'_>,
    ) -> Result<Option<NickHandle>> {
        let handle = NickHandle(self.next_handle());
        let nicklist = &mut self.get_mut(buffer)?.nicklist;
        if !nicklist.groups.contains_key(&group) {
            return Err(StoreError::UnknownGroup(group));
        }
        nicklist.nicks.insert(
            handle,
            Nick {
                handle,
                remote_id: None,
                group,
                name: nick.name.to_string(),
                color: nick.color.map(str::to_string),
                prefix: nick.prefix.map(str::to_string),
                prefix_color: nick.prefix_color.map(str::to_string),
                visible: nick.visible,
            },
        );
        Ok(Some(handle))
    }

    fn set_group(
        &mut self,
        buffer: BufferHandle,
        group: GroupHandle,
        property: GroupProperty<'_>,
    ) -> Result<()> {
        let nicklist = &mut self.get_mut(buffer)?.nicklist;
        if let GroupProperty::Id(id) = property {
            return nicklist.stamp_group(group, id);
        }
        let entry = nicklist
            .groups
            .get_mut(&group)
            .ok_or(StoreError::UnknownGroup(group))?;
        match property {
            GroupProperty::Id(_) => {}
            GroupProperty::Color(color) => entry.color = color.map(str::to_string),
            GroupProperty::Visible(visible) => entry.visible = visible,
        }
        Ok(())
    }

    fn set_nick(
        &mut self,
        buffer: BufferHandle,
        nick: NickHandle,
        property: NickProperty<'_>,
    ) -> Result<()> {
        let nicklist = &mut self.get_mut(buffer)?.nicklist;
        if let NickProperty::Id(id) = property {
            return nicklist.stamp_nick(nick, id);
        }
        let entry = nicklist
            .nicks
            .get_mut(&nick)
            .ok_or(StoreError::UnknownNick(nick))?;
        match property {
            NickProperty::Id(_) => {}
            NickProperty::Color(color) => entry.color = color.map(str::to_string),
            NickProperty::Prefix(prefix) => entry.prefix = prefix.map(str::to_string),
            NickProperty::PrefixColor(color) => entry.prefix_color = color.map(str::to_string),
            NickProperty::Visible(visible) => entry.visible = visible,
        }
        Ok(())
    }

    fn remove_group(&mut self, buffer: BufferHandle, group: GroupHandle) -> Result<()> {
        self.get_mut(buffer)?.nicklist.remove_group(group)
    }

    fn remove_nick(&mut self, buffer: BufferHandle, nick: NickHandle) -> Result<()> {
        let nicklist = &mut self.get_mut(buffer)?.nicklist;
        if !nicklist.nicks.contains_key(&nick) {
            return Err(StoreError::UnknownNick(nick));
        }
        nicklist.unlink_nick(nick);
        Ok(())
    }

    fn report(&mut self, level: ReportLevel, message: &str) {
        self.reports.push(Report::new(level, message));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::models::LocalVars;

    fn noop_input() -> InputCallback {
        Arc::new(|_: &LocalVars, _: &str| {})
    }

    fn new_group(name: &str) -> NewGroup<'_> {
        NewGroup {
            name,
            color: Some("cyan"),
            visible: true,
        }
    }

    fn new_nick(name: &str) -> NewNick<'_> {
        NewNick {
            name,
            color: None,
            prefix: Some("@"),
            prefix_color: Some("lightgreen"),
            visible: true,
        }
    }

    #[test]
    fn test_create_buffer_once_per_name() {
        let mut store = MemoryStore::new();
        let props = BufferProps::default();

        let first = store
            .create_buffer("remote.r.irc.libera.#rust", &props, noop_input())
            .unwrap();
        let second = store
            .create_buffer("remote.r.irc.libera.#rust", &props, noop_input())
            .unwrap();

        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(store.buffer_count(), 1);
    }

    #[test]
    fn test_root_group_is_stamped_zero() {
        let mut store = MemoryStore::new();
        let buffer = store
            .create_buffer("remote.r.core", &BufferProps::default(), noop_input())
            .unwrap()
            .unwrap();

        let root = store.root_group(buffer).unwrap();
        assert_eq!(store.search_group(buffer, ROOT_GROUP_ID).unwrap(), Some(root));
    }

    #[test]
    fn test_stamp_reindexes_group() {
        let mut store = MemoryStore::new();
        let buffer = store
            .create_buffer("remote.r.core", &BufferProps::default(), noop_input())
            .unwrap()
            .unwrap();
        let root = store.root_group(buffer).unwrap();
        let group = store
            .add_group(buffer, root, &new_group("ops"))
            .unwrap()
            .unwrap();

        assert_eq!(store.search_group(buffer, 10).unwrap(), None);
        store.set_group(buffer, group, GroupProperty::Id(10)).unwrap();
        assert_eq!(store.search_group(buffer, 10).unwrap(), Some(group));

        store.set_group(buffer, group, GroupProperty::Id(11)).unwrap();
        assert_eq!(store.search_group(buffer, 10).unwrap(), None);
        assert_eq!(store.search_group(buffer, 11).unwrap(), Some(group));
    }

    #[test]
    fn test_remove_group_cascades() {
        let mut store = MemoryStore::new();
        let buffer = store
            .create_buffer("remote.r.core", &BufferProps::default(), noop_input())
            .unwrap()
            .unwrap();
        let root = store.root_group(buffer).unwrap();
        let parent = store
            .add_group(buffer, root, &new_group("ops"))
            .unwrap()
            .unwrap();
        store.set_group(buffer, parent, GroupProperty::Id(1)).unwrap();
        let child = store
            .add_group(buffer, parent, &new_group("sub"))
            .unwrap()
            .unwrap();
        store.set_group(buffer, child, GroupProperty::Id(2)).unwrap();
        let nick = store
            .add_nick(buffer, child, &new_nick("alice"))
            .unwrap()
            .unwrap();
        store.set_nick(buffer, nick, NickProperty::Id(3)).unwrap();

        store.remove_group(buffer, parent).unwrap();

        assert_eq!(store.search_group(buffer, 1).unwrap(), None);
        assert_eq!(store.search_group(buffer, 2).unwrap(), None);
        assert_eq!(store.search_nick(buffer, 3).unwrap(), None);
        assert_eq!(store.groups(buffer).len(), 1);
        assert!(store.nicks(buffer).is_empty());
    }

    #[test]
    fn test_remove_root_keeps_root() {
        let mut store = MemoryStore::new();
        let buffer = store
            .create_buffer("remote.r.core", &BufferProps::default(), noop_input())
            .unwrap()
            .unwrap();
        let root = store.root_group(buffer).unwrap();
        store.add_nick(buffer, root, &new_nick("bob")).unwrap();

        store.remove_group(buffer, root).unwrap();

        assert!(store.nicks(buffer).is_empty());
        assert_eq!(store.search_group(buffer, ROOT_GROUP_ID).unwrap(), Some(root));
    }

    #[test]
    fn test_print_y_replaces_row() {
        let mut store = MemoryStore::new();
        let buffer = store
            .create_buffer("remote.r.fset", &BufferProps::default(), noop_input())
            .unwrap()
            .unwrap();
        let line = |text: &str| Line {
            date: 0,
            date_usec: 0,
            tags: String::new(),
            message: text.to_string(),
        };

        store.print_y(buffer, 2, &line("old")).unwrap();
        store.print_y(buffer, 2, &line("new")).unwrap();
        store.print(buffer, &line("appended")).unwrap();

        let free = store.free_lines(buffer).unwrap();
        assert_eq!(free.len(), 1);
        assert_eq!(free[&2].message, "new");
        assert_eq!(store.lines(buffer).len(), 1);
    }

    #[test]
    fn test_send_input_runs_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let callback: InputCallback = Arc::new(move |vars: &LocalVars, text: &str| {
            let id = vars.get("relay_remote_id").cloned().unwrap_or_default();
            sink.lock().unwrap().push(format!("{id}:{text}"));
        });

        let mut props = BufferProps::default();
        props
            .local_vars
            .insert("relay_remote_id".to_string(), "42".to_string());

        let mut store = MemoryStore::new();
        let buffer = store
            .create_buffer("remote.r.core", &props, callback)
            .unwrap()
            .unwrap();

        assert!(store.send_input(buffer, "hello").unwrap());
        assert_eq!(*seen.lock().unwrap(), vec!["42:hello".to_string()]);
    }

    #[test]
    fn test_unknown_handle_is_an_error() {
        let mut store = MemoryStore::new();
        let err = store.bind_key(BufferHandle(99), "meta-a", "/away").unwrap_err();
        assert!(matches!(err, StoreError::UnknownBuffer(BufferHandle(99))));
    }
}
