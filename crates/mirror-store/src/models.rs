//! Handles and records exchanged with a [`MirrorStore`](crate::MirrorStore).
//!
//! Handles are small `Copy` values valid for as long as the entity exists in
//! the store that issued them. Records are plain data, safe to hand to the UI
//! layer.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use mirror_shared::BufferType;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

/// Local handle of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BufferHandle(pub i64);

/// Local handle of a nicklist group, scoped to its buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupHandle(pub i64);

/// Local handle of a nick, scoped to its buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NickHandle(pub i64);

// ---------------------------------------------------------------------------
// Buffer
// ---------------------------------------------------------------------------

/// Buffer local variables (name -> value).
pub type LocalVars = BTreeMap<String, String>;

/// Callback run when the user submits text in a buffer.
///
/// Receives the buffer's local variables and the raw input text.
pub type InputCallback = Arc<dyn Fn(&LocalVars, &str) + Send + Sync>;

/// Properties applied to a buffer on creation or update.
///
/// Applying a property set overwrites every listed property; local variables
/// are merged into the existing ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferProps {
    pub buffer_type: BufferType,
    pub short_name: Option<String>,
    pub title: Option<String>,
    pub nicklist: bool,
    pub nicklist_case_sensitive: bool,
    pub nicklist_display_groups: bool,
    /// Local variables to set.
    pub local_vars: LocalVars,
    /// Input callback also receives text that is not a command.
    pub input_get_any_user_data: bool,
}

/// A buffer as stored locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buffer {
    pub handle: BufferHandle,
    /// Full name, unique in the store.
    pub full_name: String,
    pub buffer_type: BufferType,
    pub short_name: Option<String>,
    pub title: Option<String>,
    pub nicklist: bool,
    pub nicklist_case_sensitive: bool,
    pub nicklist_display_groups: bool,
    pub input_get_any_user_data: bool,
    pub local_vars: LocalVars,
    /// Key bindings local to the buffer (key -> command).
    pub keys: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
}

impl Buffer {
    pub(crate) fn new(handle: BufferHandle, full_name: &str, props: &BufferProps) -> Self {
        let mut buffer = Self {
            handle,
            full_name: full_name.to_string(),
            buffer_type: BufferType::default(),
            short_name: None,
            title: None,
            nicklist: false,
            nicklist_case_sensitive: false,
            nicklist_display_groups: false,
            input_get_any_user_data: false,
            local_vars: LocalVars::new(),
            keys: BTreeMap::new(),
            created_at: Utc::now(),
        };
        buffer.apply(props);
        buffer
    }

    pub(crate) fn apply(&mut self, props: &BufferProps) {
        self.buffer_type = props.buffer_type;
        self.short_name.clone_from(&props.short_name);
        self.title.clone_from(&props.title);
        self.nicklist = props.nicklist;
        self.nicklist_case_sensitive = props.nicklist_case_sensitive;
        self.nicklist_display_groups = props.nicklist_display_groups;
        self.input_get_any_user_data = props.input_get_any_user_data;
        for (name, value) in &props.local_vars {
            self.local_vars.insert(name.clone(), value.clone());
        }
    }

    pub fn local_var(&self, name: &str) -> Option<&str> {
        self.local_vars.get(name).map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Line
// ---------------------------------------------------------------------------

/// A line printed in a buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// Seconds since the Unix epoch.
    pub date: i64,
    /// Microseconds part of the date.
    pub date_usec: u32,
    /// Comma-separated tags.
    pub tags: String,
    /// Text, with the prefix separated from the message by a tab if any.
    pub message: String,
}

impl Line {
    /// Prefix of the line (text before the first tab), if any.
    pub fn prefix(&self) -> Option<&str> {
        self.message.split_once('\t').map(|(prefix, _)| prefix)
    }

    /// Message without its prefix.
    pub fn text(&self) -> &str {
        self.message
            .split_once('\t')
            .map_or(self.message.as_str(), |(_, text)| text)
    }

    /// Tags as a list.
    pub fn tag_list(&self) -> Vec<&str> {
        if self.tags.is_empty() {
            Vec::new()
        } else {
            self.tags.split(',').collect()
        }
    }
}

// ---------------------------------------------------------------------------
// Nicklist
// ---------------------------------------------------------------------------

/// A nicklist group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub handle: GroupHandle,
    /// Id stamped by the remote mirror, `None` until stamped.
    pub remote_id: Option<i64>,
    /// Parent group, `None` for the root group.
    pub parent: Option<GroupHandle>,
    pub name: String,
    pub color: Option<String>,
    pub visible: bool,
}

/// A nick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nick {
    pub handle: NickHandle,
    /// Id stamped by the remote mirror, `None` until stamped.
    pub remote_id: Option<i64>,
    pub group: GroupHandle,
    pub name: String,
    pub color: Option<String>,
    pub prefix: Option<String>,
    pub prefix_color: Option<String>,
    pub visible: bool,
}

/// Fields of a group to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewGroup<'a> {
    pub name: &'a str,
    pub color: Option<&'a str>,
    pub visible: bool,
}

/// Fields of a nick to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewNick<'a> {
    pub name: &'a str,
    pub color: Option<&'a str>,
    pub prefix: Option<&'a str>,
    pub prefix_color: Option<&'a str>,
    pub visible: bool,
}

/// A single group property update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupProperty<'a> {
    Id(i64),
    Color(Option<&'a str>),
    Visible(bool),
}

/// A single nick property update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NickProperty<'a> {
    Id(i64),
    Color(Option<&'a str>),
    Prefix(Option<&'a str>),
    PrefixColor(Option<&'a str>),
    Visible(bool),
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Severity of a message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportLevel {
    Info,
    Error,
}

/// A message shown to the user outside of any mirrored buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub level: ReportLevel,
    pub message: String,
    pub date: DateTime<Utc>,
}

impl Report {
    pub(crate) fn new(level: ReportLevel, message: &str) -> Self {
        Self {
            level,
            message: message.to_string(),
            date: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_prefix_split() {
        let line = Line {
            date: 0,
            date_usec: 0,
            tags: "irc_privmsg,notify_message".to_string(),
            message: "alice\thello\tworld".to_string(),
        };
        assert_eq!(line.prefix(), Some("alice"));
        assert_eq!(line.text(), "hello\tworld");
        assert_eq!(line.tag_list(), vec!["irc_privmsg", "notify_message"]);
    }

    #[test]
    fn test_line_without_prefix() {
        let line = Line {
            date: 0,
            date_usec: 0,
            tags: String::new(),
            message: "plain".to_string(),
        };
        assert_eq!(line.prefix(), None);
        assert_eq!(line.text(), "plain");
        assert!(line.tag_list().is_empty());
    }

    #[test]
    fn test_apply_props_merges_local_vars() {
        let mut props = BufferProps::default();
        props.local_vars.insert("a".into(), "1".into());
        let mut buffer = Buffer::new(BufferHandle(1), "remote.r.core", &props);

        let mut update = BufferProps {
            title: Some("topic".into()),
            ..BufferProps::default()
        };
        update.local_vars.insert("b".into(), "2".into());
        buffer.apply(&update);

        assert_eq!(buffer.local_var("a"), Some("1"));
        assert_eq!(buffer.local_var("b"), Some("2"));
        assert_eq!(buffer.title.as_deref(), Some("topic"));
    }
}
