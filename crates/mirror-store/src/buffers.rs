//! CRUD operations for [`Buffer`] records, their local variables and keys.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use mirror_shared::BufferType;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{Buffer, BufferHandle, BufferProps, LocalVars};

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new buffer.  Returns `None` if the full name is taken.
    pub fn insert_buffer(
        &self,
        full_name: &str,
        props: &BufferProps,
    ) -> Result<Option<BufferHandle>> {
        let inserted = self.conn().execute(
            "INSERT OR IGNORE INTO buffers (full_name, created_at) VALUES (?1, ?2)",
            params![full_name, Utc::now().to_rfc3339()],
        )?;
        if inserted == 0 {
            tracing::debug!(name = %full_name, "buffer already exists");
            return Ok(None);
        }

        let handle = BufferHandle(self.conn().last_insert_rowid());
        self.update_buffer(handle, props)?;
        Ok(Some(handle))
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Overwrite buffer properties and merge its local variables.
    pub fn update_buffer(&self, handle: BufferHandle, props: &BufferProps) -> Result<()> {
        let affected = self.conn().execute(
            "UPDATE buffers
             SET buffer_type = ?2, short_name = ?3, title = ?4, nicklist = ?5,
                 nicklist_case_sensitive = ?6, nicklist_display_groups = ?7,
                 input_get_any_user_data = ?8
             WHERE id = ?1",
            params![
                handle.0,
                props.buffer_type.as_str(),
                props.short_name,
                props.title,
                props.nicklist as i32,
                props.nicklist_case_sensitive as i32,
                props.nicklist_display_groups as i32,
                props.input_get_any_user_data as i32,
            ],
        )?;
        if affected == 0 {
            return Err(StoreError::UnknownBuffer(handle));
        }

        for (name, value) in &props.local_vars {
            self.conn().execute(
                "INSERT INTO buffer_local_vars (buffer_id, name, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT (buffer_id, name) DO UPDATE SET value = excluded.value",
                params![handle.0, name, value],
            )?;
        }
        Ok(())
    }

    /// Bind `key` to `command` in a buffer.
    pub fn set_key(&self, handle: BufferHandle, key: &str, command: &str) -> Result<()> {
        if !self.buffer_exists(handle)? {
            return Err(StoreError::UnknownBuffer(handle));
        }
        self.conn().execute(
            "INSERT INTO buffer_keys (buffer_id, key, command) VALUES (?1, ?2, ?3)
             ON CONFLICT (buffer_id, key) DO UPDATE SET command = excluded.command",
            params![handle.0, key, command],
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    pub fn buffer_exists(&self, handle: BufferHandle) -> Result<bool> {
        let found = self
            .conn()
            .query_row(
                "SELECT 1 FROM buffers WHERE id = ?1",
                params![handle.0],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Handles of all buffers, in creation order.
    pub fn list_buffer_handles(&self) -> Result<Vec<BufferHandle>> {
        let mut stmt = self.conn().prepare("SELECT id FROM buffers ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| row.get(0).map(BufferHandle))?;

        let mut handles = Vec::new();
        for row in rows {
            handles.push(row?);
        }
        Ok(handles)
    }

    /// Fetch a single buffer with its local variables and keys.
    pub fn get_buffer(&self, handle: BufferHandle) -> Result<Buffer> {
        let mut buffer = self
            .conn()
            .query_row(
                "SELECT id, full_name, buffer_type, short_name, title, nicklist,
                        nicklist_case_sensitive, nicklist_display_groups,
                        input_get_any_user_data, created_at
                 FROM buffers
                 WHERE id = ?1",
                params![handle.0],
                row_to_buffer,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::UnknownBuffer(handle),
                other => StoreError::Sqlite(other),
            })?;

        buffer.local_vars = self.get_local_vars(handle)?;
        buffer.keys = self.get_keys(handle)?;
        Ok(buffer)
    }

    /// Fetch a buffer by its full name.
    pub fn get_buffer_by_name(&self, full_name: &str) -> Result<Option<Buffer>> {
        let id: Option<i64> = self
            .conn()
            .query_row(
                "SELECT id FROM buffers WHERE full_name = ?1",
                params![full_name],
                |row| row.get(0),
            )
            .optional()?;
        id.map(|id| self.get_buffer(BufferHandle(id))).transpose()
    }

    pub fn get_local_var(&self, handle: BufferHandle, name: &str) -> Result<Option<String>> {
        if !self.buffer_exists(handle)? {
            return Err(StoreError::UnknownBuffer(handle));
        }
        let value = self
            .conn()
            .query_row(
                "SELECT value FROM buffer_local_vars WHERE buffer_id = ?1 AND name = ?2",
                params![handle.0, name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn get_local_vars(&self, handle: BufferHandle) -> Result<LocalVars> {
        let mut stmt = self
            .conn()
            .prepare("SELECT name, value FROM buffer_local_vars WHERE buffer_id = ?1")?;
        let rows = stmt.query_map(params![handle.0], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut vars = LocalVars::new();
        for row in rows {
            let (name, value) = row?;
            vars.insert(name, value);
        }
        Ok(vars)
    }

    pub fn get_keys(&self, handle: BufferHandle) -> Result<BTreeMap<String, String>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT key, command FROM buffer_keys WHERE buffer_id = ?1")?;
        let rows = stmt.query_map(params![handle.0], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut keys = BTreeMap::new();
        for row in rows {
            let (key, command) = row?;
            keys.insert(key, command);
        }
        Ok(keys)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a `rusqlite::Row` to a [`Buffer`] (without local variables and keys).
fn row_to_buffer(row: &rusqlite::Row<'_>) -> rusqlite::Result<Buffer> {
    let type_str: String = row.get(2)?;
    let created_str: String = row.get(9)?;

    let buffer_type = type_str.parse::<BufferType>().unwrap_or_default();

    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(9, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Buffer {
        handle: BufferHandle(row.get(0)?),
        full_name: row.get(1)?,
        buffer_type,
        short_name: row.get(3)?,
        title: row.get(4)?,
        nicklist: row.get(5)?,
        nicklist_case_sensitive: row.get(6)?,
        nicklist_display_groups: row.get(7)?,
        input_get_any_user_data: row.get(8)?,
        local_vars: LocalVars::new(),
        keys: BTreeMap::new(),
        created_at,
    })
}
