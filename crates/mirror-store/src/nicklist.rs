//! Nicklist groups and nicks, scoped to their buffer.
//!
//! Every buffer owns a root group (`parent_id IS NULL`) stamped with
//! [`ROOT_GROUP_ID`]. Removing a group relies on `ON DELETE CASCADE` to take
//! subgroups and nicks with it.

use mirror_shared::constants::ROOT_GROUP_ID;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{
    BufferHandle, Group, GroupHandle, GroupProperty, NewGroup, NewNick, Nick, NickHandle,
    NickProperty,
};

impl Database {
    // ------------------------------------------------------------------
    // Groups
    // ------------------------------------------------------------------

    pub fn insert_root_group(&self, buffer: BufferHandle) -> Result<GroupHandle> {
        self.conn().execute(
            "INSERT INTO nicklist_groups (buffer_id, parent_id, remote_id, name, visible)
             VALUES (?1, NULL, ?2, 'root', 0)",
            params![buffer.0, ROOT_GROUP_ID],
        )?;
        Ok(GroupHandle(self.conn().last_insert_rowid()))
    }

    pub fn get_root_group(&self, buffer: BufferHandle) -> Result<GroupHandle> {
        self.conn()
            .query_row(
                "SELECT id FROM nicklist_groups WHERE buffer_id = ?1 AND parent_id IS NULL",
                params![buffer.0],
                |row| row.get(0).map(GroupHandle),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::UnknownBuffer(buffer),
                other => StoreError::Sqlite(other),
            })
    }

    pub fn find_group_by_remote_id(
        &self,
        buffer: BufferHandle,
        remote_id: i64,
    ) -> Result<Option<GroupHandle>> {
        if !self.buffer_exists(buffer)? {
            return Err(StoreError::UnknownBuffer(buffer));
        }
        let found = self
            .conn()
            .query_row(
                "SELECT id FROM nicklist_groups WHERE buffer_id = ?1 AND remote_id = ?2",
                params![buffer.0, remote_id],
                |row| row.get(0).map(GroupHandle),
            )
            .optional()?;
        Ok(found)
    }

    /// Insert a group under `parent`, which must belong to `buffer`.
    pub fn insert_group(
        &self,
        buffer: BufferHandle,
        parent: GroupHandle,
        group: &NewGroup<'_>,
    ) -> Result<GroupHandle> {
        if !self.group_in_buffer(buffer, parent)? {
            return Err(StoreError::UnknownGroup(parent));
        }
        self.conn().execute(
            "INSERT INTO nicklist_groups (buffer_id, parent_id, name, color, visible)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![buffer.0, parent.0, group.name, group.color, group.visible as i32],
        )?;
        Ok(GroupHandle(self.conn().last_insert_rowid()))
    }

    pub fn update_group(
        &self,
        buffer: BufferHandle,
        group: GroupHandle,
        property: GroupProperty<'_>,
    ) -> Result<()> {
        let affected = match property {
            GroupProperty::Id(id) => {
                // An id names at most one group per buffer.
                self.conn().execute(
                    "UPDATE nicklist_groups SET remote_id = NULL
                     WHERE buffer_id = ?1 AND remote_id = ?2 AND id != ?3",
                    params![buffer.0, id, group.0],
                )?;
                self.conn().execute(
                    "UPDATE nicklist_groups SET remote_id = ?3 WHERE buffer_id = ?1 AND id = ?2",
                    params![buffer.0, group.0, id],
                )?
            }
            GroupProperty::Color(color) => self.conn().execute(
                "UPDATE nicklist_groups SET color = ?3 WHERE buffer_id = ?1 AND id = ?2",
                params![buffer.0, group.0, color],
            )?,
            GroupProperty::Visible(visible) => self.conn().execute(
                "UPDATE nicklist_groups SET visible = ?3 WHERE buffer_id = ?1 AND id = ?2",
                params![buffer.0, group.0, visible as i32],
            )?,
        };
        if affected == 0 {
            return Err(StoreError::UnknownGroup(group));
        }
        Ok(())
    }

    /// Delete a group with its subgroups and nicks.  The root group is only
    /// emptied.
    pub fn delete_group(&self, buffer: BufferHandle, group: GroupHandle) -> Result<()> {
        if !self.group_in_buffer(buffer, group)? {
            return Err(StoreError::UnknownGroup(group));
        }

        if self.get_root_group(buffer)? == group {
            self.conn().execute(
                "DELETE FROM nicklist_groups WHERE parent_id = ?1",
                params![group.0],
            )?;
            self.conn()
                .execute("DELETE FROM nicks WHERE group_id = ?1", params![group.0])?;
        } else {
            self.conn()
                .execute("DELETE FROM nicklist_groups WHERE id = ?1", params![group.0])?;
        }

        tracing::debug!(buffer = buffer.0, group = group.0, "group removed");
        Ok(())
    }

    /// All groups of a buffer, root first.
    pub fn list_groups(&self, buffer: BufferHandle) -> Result<Vec<Group>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, remote_id, parent_id, name, color, visible
             FROM nicklist_groups
             WHERE buffer_id = ?1
             ORDER BY id ASC",
        )?;

        let rows = stmt.query_map(params![buffer.0], row_to_group)?;

        let mut groups = Vec::new();
        for row in rows {
            groups.push(row?);
        }
        Ok(groups)
    }

    fn group_in_buffer(&self, buffer: BufferHandle, group: GroupHandle) -> Result<bool> {
        let found = self
            .conn()
            .query_row(
                "SELECT 1 FROM nicklist_groups WHERE buffer_id = ?1 AND id = ?2",
                params![buffer.0, group.0],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    // ------------------------------------------------------------------
    // Nicks
    // ------------------------------------------------------------------

    pub fn find_nick_by_remote_id(
        &self,
        buffer: BufferHandle,
        remote_id: i64,
    ) -> Result<Option<NickHandle>> {
        if !self.buffer_exists(buffer)? {
            return Err(StoreError::UnknownBuffer(buffer));
        }
        let found = self
            .conn()
            .query_row(
                "SELECT id FROM nicks WHERE buffer_id = ?1 AND remote_id = ?2",
                params![buffer.0, remote_id],
                |row| row.get(0).map(NickHandle),
            )
            .optional()?;
        Ok(found)
    }

    /// Insert a nick in `group`, which must belong to `buffer`.
    pub fn insert_nick(
        &self,
        buffer: BufferHandle,
        group: GroupHandle,
        nick: &NewNick<'_>,
    ) -> Result<NickHandle> {
        if !self.group_in_buffer(buffer, group)? {
            return Err(StoreError::UnknownGroup(group));
        }
        self.conn().execute(
            "INSERT INTO nicks (buffer_id, group_id, name, color, prefix, prefix_color, visible)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                buffer.0,
                group.0,
                nick.name,
                nick.color,
                nick.prefix,
                nick.prefix_color,
                nick.visible as i32,
            ],
        )?;
        Ok(NickHandle(self.conn().last_insert_rowid()))
    }

    pub fn update_nick(
        &self,
        buffer: BufferHandle,
        nick: NickHandle,
        property: NickProperty<'_>,
    ) -> Result<()> {
        let affected = match property {
            NickProperty::Id(id) => {
                self.conn().execute(
                    "UPDATE nicks SET remote_id = NULL
                     WHERE buffer_id = ?1 AND remote_id = ?2 AND id != ?3",
                    params![buffer.0, id, nick.0],
                )?;
                self.conn().execute(
                    "UPDATE nicks SET remote_id = ?3 WHERE buffer_id = ?1 AND id = ?2",
                    params![buffer.0, nick.0, id],
                )?
            }
            NickProperty::Color(color) => self.conn().execute(
                "UPDATE nicks SET color = ?3 WHERE buffer_id = ?1 AND id = ?2",
                params![buffer.0, nick.0, color],
            )?,
            NickProperty::Prefix(prefix) => self.conn().execute(
                "UPDATE nicks SET prefix = ?3 WHERE buffer_id = ?1 AND id = ?2",
                params![buffer.0, nick.0, prefix],
            )?,
            NickProperty::PrefixColor(color) => self.conn().execute(
                "UPDATE nicks SET prefix_color = ?3 WHERE buffer_id = ?1 AND id = ?2",
                params![buffer.0, nick.0, color],
            )?,
            NickProperty::Visible(visible) => self.conn().execute(
                "UPDATE nicks SET visible = ?3 WHERE buffer_id = ?1 AND id = ?2",
                params![buffer.0, nick.0, visible as i32],
            )?,
        };
        if affected == 0 {
            return Err(StoreError::UnknownNick(nick));
        }
        Ok(())
    }

    pub fn delete_nick(&self, buffer: BufferHandle, nick: NickHandle) -> Result<()> {
        let affected = self.conn().execute(
            "DELETE FROM nicks WHERE buffer_id = ?1 AND id = ?2",
            params![buffer.0, nick.0],
        )?;
        if affected == 0 {
            return Err(StoreError::UnknownNick(nick));
        }
        Ok(())
    }

    /// All nicks of a buffer, in insertion order.
    pub fn list_nicks(&self, buffer: BufferHandle) -> Result<Vec<Nick>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, remote_id, group_id, name, color, prefix, prefix_color, visible
             FROM nicks
             WHERE buffer_id = ?1
             ORDER BY id ASC",
        )?;

        let rows = stmt.query_map(params![buffer.0], row_to_nick)?;

        let mut nicks = Vec::new();
        for row in rows {
            nicks.push(row?);
        }
        Ok(nicks)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn row_to_group(row: &rusqlite::Row<'_>) -> rusqlite::Result<Group> {
    Ok(Group {
        handle: GroupHandle(row.get(0)?),
        remote_id: row.get(1)?,
        parent: row.get::<_, Option<i64>>(2)?.map(GroupHandle),
        name: row.get(3)?,
        color: row.get(4)?,
        visible: row.get(5)?,
    })
}

fn row_to_nick(row: &rusqlite::Row<'_>) -> rusqlite::Result<Nick> {
    Ok(Nick {
        handle: NickHandle(row.get(0)?),
        remote_id: row.get(1)?,
        group: GroupHandle(row.get(2)?),
        name: row.get(3)?,
        color: row.get(4)?,
        prefix: row.get(5)?,
        prefix_color: row.get(6)?,
        visible: row.get(7)?,
    })
}
