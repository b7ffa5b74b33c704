//! Database connection management.
//!
//! The [`Database`] struct owns a [`rusqlite::Connection`] and guarantees that
//! migrations are run before any other operation. It implements
//! [`MirrorStore`] so a remote mirror survives restarts: buffers, lines and
//! nicklists are persisted, while input callbacks and user reports live only
//! as long as the process.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use rusqlite::Connection;

use crate::error::{Result, StoreError};
use crate::migrations;
use crate::models::{
    BufferHandle, BufferProps, GroupHandle, GroupProperty, InputCallback, Line, NewGroup,
    NewNick, NickHandle, NickProperty, Report, ReportLevel,
};
use crate::store::MirrorStore;

/// Wrapper around a [`rusqlite::Connection`].
pub struct Database {
    conn: Connection,
    inputs: HashMap<BufferHandle, InputCallback>,
    reports: Vec<Report>,
}

impl Database {
    /// Open (or create) the default mirror database.
    ///
    /// The database file is placed in the platform-appropriate data directory:
    /// - Linux:   `~/.local/share/remote-mirror/mirror.db`
    /// - macOS:   `~/Library/Application Support/org.mirror.remote-mirror/mirror.db`
    /// - Windows: `{FOLDERID_RoamingAppData}\mirror\remote-mirror\data\mirror.db`
    pub fn new() -> Result<Self> {
        let project_dirs =
            ProjectDirs::from("org", "mirror", "remote-mirror").ok_or(StoreError::NoDataDir)?;

        let data_dir = project_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        let db_path = data_dir.join("mirror.db");

        tracing::info!(path = %db_path.display(), "opening database");

        Self::open_at(&db_path)
    }

    /// Open (or create) a database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::with_connection(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;

        migrations::run_migrations(&conn)?;

        Ok(Self {
            conn,
            inputs: HashMap::new(),
            reports: Vec::new(),
        })
    }

    /// Return a reference to the underlying `rusqlite::Connection`.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Return the filesystem path of the open database (if any).
    pub fn path(&self) -> Option<PathBuf> {
        self.conn.path().filter(|p| !p.is_empty()).map(PathBuf::from)
    }

    /// Messages reported to the user since the database was opened.
    pub fn reports(&self) -> &[Report] {
        &self.reports
    }
}

impl MirrorStore for Database {
    fn buffers(&self) -> Result<Vec<BufferHandle>> {
        self.list_buffer_handles()
    }

    fn local_var(&self, buffer: BufferHandle, name: &str) -> Result<Option<String>> {
        self.get_local_var(buffer, name)
    }

    fn create_buffer(
        &mut self,
        full_name: &str,
        props: &BufferProps,
        input: InputCallback,
    ) -> Result<Option<BufferHandle>> {
        let Some(handle) = self.insert_buffer(full_name, props)? else {
            return Ok(None);
        };
        self.insert_root_group(handle)?;
        self.inputs.insert(handle, input);
        Ok(Some(handle))
    }

    fn apply_props(&mut self, buffer: BufferHandle, props: &BufferProps) -> Result<()> {
        self.update_buffer(buffer, props)
    }

    fn set_input_callback(&mut self, buffer: BufferHandle, input: InputCallback) -> Result<()> {
        if !self.buffer_exists(buffer)? {
            return Err(StoreError::UnknownBuffer(buffer));
        }
        self.inputs.insert(buffer, input);
        Ok(())
    }

    fn bind_key(&mut self, buffer: BufferHandle, key: &str, command: &str) -> Result<()> {
        self.set_key(buffer, key, command)
    }

    fn send_input(&self, buffer: BufferHandle, text: &str) -> Result<bool> {
        let Some(callback) = self.inputs.get(&buffer) else {
            return Ok(false);
        };
        let local_vars = self.get_local_vars(buffer)?;
        callback(&local_vars, text);
        Ok(true)
    }

    fn print_y(&mut self, buffer: BufferHandle, y: i32, line: &Line) -> Result<()> {
        self.insert_line(buffer, Some(y), line)
    }

    fn print(&mut self, buffer: BufferHandle, line: &Line) -> Result<()> {
        self.insert_line(buffer, None, line)
    }

    fn root_group(&self, buffer: BufferHandle) -> Result<GroupHandle> {
        self.get_root_group(buffer)
    }

    fn search_group(&self, buffer: BufferHandle, id: i64) -> Result<Option<GroupHandle>> {
        self.find_group_by_remote_id(buffer, id)
    }

    fn search_nick(&self, buffer: BufferHandle, id: i64) -> Result<Option<NickHandle>> {
        self.find_nick_by_remote_id(buffer, id)
    }

    fn add_group(
        &mut self,
        buffer: BufferHandle,
        parent: GroupHandle,
        group: &NewGroup<'_>,
    ) -> Result<Option<GroupHandle>> {
        self.insert_group(buffer, parent, group).map(Some)
    }

    fn add_nick(
        &mut self,
        buffer: BufferHandle,
        group: GroupHandle,
        nick: &NewNick<'_>,
    ) -> Result<Option<NickHandle>> {
        self.insert_nick(buffer, group, nick).map(Some)
    }

    fn set_group(
        &mut self,
        buffer: BufferHandle,
        group: GroupHandle,
        property: GroupProperty<'_>,
    ) -> Result<()> {
        self.update_group(buffer, group, property)
    }

    fn set_nick(
        &mut self,
        buffer: BufferHandle,
        nick: NickHandle,
        property: NickProperty<'_>,
    ) -> Result<()> {
        self.update_nick(buffer, nick, property)
    }

    fn remove_group(&mut self, buffer: BufferHandle, group: GroupHandle) -> Result<()> {
        self.delete_group(buffer, group)
    }

    fn remove_nick(&mut self, buffer: BufferHandle, nick: NickHandle) -> Result<()> {
        self.delete_nick(buffer, nick)
    }

    fn report(&mut self, level: ReportLevel, message: &str) {
        self.reports.push(Report::new(level, message));
    }
}
