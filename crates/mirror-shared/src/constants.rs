/// Namespace of every mirrored buffer: `remote.<remote name>.<buffer name>`
pub const BUFFER_NAMESPACE: &str = "remote";

/// Request line asking the remote for its full state plus live events
pub const API_SYNC: &str = "POST /api/sync";

/// Request line forwarding text typed in a mirrored buffer
pub const API_INPUT: &str = "POST /api/input";

/// Color palette requested on sync (the remote's native color codes)
pub const SYNC_COLORS: &str = "weechat";

/// Response code of a successful request
pub const CODE_OK: i64 = 200;

/// Response code of a successful request without body
pub const CODE_NO_CONTENT: i64 = 204;

/// Local variable holding the name of the remote owning a buffer
pub const LOCALVAR_REMOTE: &str = "relay_remote";

/// Local variable holding the remote-assigned buffer id
pub const LOCALVAR_REMOTE_ID: &str = "relay_remote_id";

/// Local variable holding the buffer number on the remote side
pub const LOCALVAR_REMOTE_NUMBER: &str = "relay_remote_number";

/// Event name sent by the remote before a nicklist group is removed
pub const EVENT_GROUP_REMOVING: &str = "nicklist_group_removing";

/// Event name sent by the remote before a nick is removed
pub const EVENT_NICK_REMOVING: &str = "nicklist_nick_removing";

/// Remote id of the nicklist root group of every buffer
pub const ROOT_GROUP_ID: i64 = 0;

/// Sentinel used when an id field is absent or not a number
pub const NO_ID: i64 = -1;
