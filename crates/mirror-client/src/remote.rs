/// One remote whose buffers are mirrored locally.
///
/// The connection itself is owned by the host; the mirror only reads the name
/// and records whether the full state has been requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote {
    /// Unique name, used to namespace the mirrored buffers.
    pub name: String,

    /// Whether the sync request has been accepted by the connection.
    pub synced: bool,

    /// Log every received message at debug level.
    pub debug_raw: bool,
}

impl Remote {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            synced: false,
            debug_raw: false,
        }
    }

    pub fn with_debug_raw(mut self, debug_raw: bool) -> Self {
        self.debug_raw = debug_raw;
        self
    }
}
