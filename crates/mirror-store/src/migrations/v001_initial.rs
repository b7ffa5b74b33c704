//! v001 -- Initial schema creation.
//!
//! Creates the mirror tables: `buffers` with their local variables and key
//! bindings, `lines`, and the nicklist (`nicklist_groups`, `nicks`).

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Buffers
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS buffers (
    id                      INTEGER PRIMARY KEY AUTOINCREMENT,
    full_name               TEXT NOT NULL UNIQUE,   -- remote.<remote>.<name>
    buffer_type             TEXT NOT NULL DEFAULT 'formatted',
    short_name              TEXT,
    title                   TEXT,
    nicklist                INTEGER NOT NULL DEFAULT 0,
    nicklist_case_sensitive INTEGER NOT NULL DEFAULT 0,
    nicklist_display_groups INTEGER NOT NULL DEFAULT 0,
    input_get_any_user_data INTEGER NOT NULL DEFAULT 0,
    created_at              TEXT NOT NULL           -- RFC-3339
);

CREATE TABLE IF NOT EXISTS buffer_local_vars (
    buffer_id INTEGER NOT NULL,
    name      TEXT NOT NULL,
    value     TEXT NOT NULL,

    PRIMARY KEY (buffer_id, name),
    FOREIGN KEY (buffer_id) REFERENCES buffers(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS buffer_keys (
    buffer_id INTEGER NOT NULL,
    key       TEXT NOT NULL,
    command   TEXT NOT NULL,

    PRIMARY KEY (buffer_id, key),
    FOREIGN KEY (buffer_id) REFERENCES buffers(id) ON DELETE CASCADE
);

-- ----------------------------------------------------------------
-- Lines
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS lines (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    buffer_id INTEGER NOT NULL,
    y         INTEGER,                 -- row of a free buffer, NULL if appended
    date      INTEGER NOT NULL,        -- seconds since epoch
    date_usec INTEGER NOT NULL,
    tags      TEXT NOT NULL,           -- comma-separated
    message   TEXT NOT NULL,

    FOREIGN KEY (buffer_id) REFERENCES buffers(id) ON DELETE CASCADE
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_lines_buffer_y ON lines(buffer_id, y);

-- ----------------------------------------------------------------
-- Nicklist
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS nicklist_groups (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    buffer_id INTEGER NOT NULL,
    parent_id INTEGER,                 -- NULL for the root group
    remote_id INTEGER,                 -- id stamped by the mirror
    name      TEXT NOT NULL,
    color     TEXT,
    visible   INTEGER NOT NULL DEFAULT 1,

    FOREIGN KEY (buffer_id) REFERENCES buffers(id) ON DELETE CASCADE,
    FOREIGN KEY (parent_id) REFERENCES nicklist_groups(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_groups_remote_id
    ON nicklist_groups(buffer_id, remote_id);

CREATE TABLE IF NOT EXISTS nicks (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    buffer_id    INTEGER NOT NULL,
    group_id     INTEGER NOT NULL,
    remote_id    INTEGER,
    name         TEXT NOT NULL,
    color        TEXT,
    prefix       TEXT,
    prefix_color TEXT,
    visible      INTEGER NOT NULL DEFAULT 1,

    FOREIGN KEY (buffer_id) REFERENCES buffers(id) ON DELETE CASCADE,
    FOREIGN KEY (group_id) REFERENCES nicklist_groups(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_nicks_remote_id ON nicks(buffer_id, remote_id);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
