//! Line storage for formatted and free-content buffers.

use std::collections::BTreeMap;

use rusqlite::params;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{BufferHandle, Line};

impl Database {
    /// Store a line.  With `y`, the line replaces whatever sits at that row.
    pub fn insert_line(&self, buffer: BufferHandle, y: Option<i32>, line: &Line) -> Result<()> {
        if !self.buffer_exists(buffer)? {
            return Err(StoreError::UnknownBuffer(buffer));
        }

        self.conn().execute(
            "INSERT OR REPLACE INTO lines (buffer_id, y, date, date_usec, tags, message)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                buffer.0,
                y,
                line.date,
                line.date_usec,
                line.tags,
                line.message,
            ],
        )?;

        tracing::trace!(buffer = buffer.0, ?y, "line stored");
        Ok(())
    }

    /// Lines appended to a buffer, oldest first.
    pub fn get_lines(&self, buffer: BufferHandle, limit: u32) -> Result<Vec<Line>> {
        let mut stmt = self.conn().prepare(
            "SELECT date, date_usec, tags, message
             FROM lines
             WHERE buffer_id = ?1 AND y IS NULL
             ORDER BY id DESC
             LIMIT ?2",
        )?;

        let rows = stmt.query_map(params![buffer.0, limit], row_to_line)?;

        let mut lines = Vec::new();
        for row in rows {
            lines.push(row?);
        }
        lines.reverse();
        Ok(lines)
    }

    /// Lines of a free-content buffer, by row.
    pub fn get_free_lines(&self, buffer: BufferHandle) -> Result<BTreeMap<i32, Line>> {
        let mut stmt = self.conn().prepare(
            "SELECT y, date, date_usec, tags, message
             FROM lines
             WHERE buffer_id = ?1 AND y IS NOT NULL",
        )?;

        let rows = stmt.query_map(params![buffer.0], |row| {
            let y: i32 = row.get(0)?;
            Ok((
                y,
                Line {
                    date: row.get(1)?,
                    date_usec: row.get(2)?,
                    tags: row.get(3)?,
                    message: row.get(4)?,
                },
            ))
        })?;

        let mut lines = BTreeMap::new();
        for row in rows {
            let (y, line) = row?;
            lines.insert(y, line);
        }
        Ok(lines)
    }
}

fn row_to_line(row: &rusqlite::Row<'_>) -> rusqlite::Result<Line> {
    Ok(Line {
        date: row.get(0)?,
        date_usec: row.get(1)?,
        tags: row.get(2)?,
        message: row.get(3)?,
    })
}
