//! The storage capability the remote mirror writes into.
//!
//! A store owns buffers, their lines and their nicklist. The mirror only ever
//! holds handles for the duration of one event, so implementations are free
//! to move data around between calls.

use crate::error::Result;
use crate::models::{
    BufferHandle, BufferProps, GroupHandle, GroupProperty, InputCallback, Line, NewGroup,
    NewNick, NickHandle, NickProperty, ReportLevel,
};

/// Local buffers, lines and nicklists mirrored from remotes.
pub trait MirrorStore {
    // ------------------------------------------------------------------
    // Buffers
    // ------------------------------------------------------------------

    /// All buffers, in creation order.
    fn buffers(&self) -> Result<Vec<BufferHandle>>;

    /// Value of a buffer local variable.
    fn local_var(&self, buffer: BufferHandle, name: &str) -> Result<Option<String>>;

    /// Create a buffer with its properties and input callback.
    ///
    /// Returns `None` if a buffer with this full name already exists.
    fn create_buffer(
        &mut self,
        full_name: &str,
        props: &BufferProps,
        input: InputCallback,
    ) -> Result<Option<BufferHandle>>;

    /// Overwrite the properties of an existing buffer.
    fn apply_props(&mut self, buffer: BufferHandle, props: &BufferProps) -> Result<()>;

    /// Replace the input callback of an existing buffer.
    fn set_input_callback(&mut self, buffer: BufferHandle, input: InputCallback) -> Result<()>;

    /// Bind a key to a command, local to the buffer.
    fn bind_key(&mut self, buffer: BufferHandle, key: &str, command: &str) -> Result<()>;

    /// Submit user text to the buffer's input callback.
    ///
    /// Returns `false` if the buffer has no input callback.
    fn send_input(&self, buffer: BufferHandle, text: &str) -> Result<bool>;

    // ------------------------------------------------------------------
    // Lines
    // ------------------------------------------------------------------

    /// Print a line at row `y` of a free-content buffer, replacing any
    /// line already there.
    fn print_y(&mut self, buffer: BufferHandle, y: i32, line: &Line) -> Result<()>;

    /// Append a line to a formatted buffer.
    fn print(&mut self, buffer: BufferHandle, line: &Line) -> Result<()>;

    // ------------------------------------------------------------------
    // Nicklist
    // ------------------------------------------------------------------

    /// Root group of the buffer nicklist.
    fn root_group(&self, buffer: BufferHandle) -> Result<GroupHandle>;

    /// Group whose stamped id is `id`.
    fn search_group(&self, buffer: BufferHandle, id: i64) -> Result<Option<GroupHandle>>;

    /// Nick whose stamped id is `id`.
    fn search_nick(&self, buffer: BufferHandle, id: i64) -> Result<Option<NickHandle>>;

    /// Add a group under `parent`.
    fn add_group(
        &mut self,
        buffer: BufferHandle,
        parent: GroupHandle,
        group: &NewGroup<'_>,
    ) -> Result<Option<GroupHandle>>;

    /// Add a nick in `group`.
    fn add_nick(
        &mut self,
        buffer: BufferHandle,
        group: GroupHandle,
        nick: &NewNick<'_>,
    ) -> Result<Option<NickHandle>>;

    fn set_group(
        &mut self,
        buffer: BufferHandle,
        group: GroupHandle,
        property: GroupProperty<'_>,
    ) -> Result<()>;

    fn set_nick(
        &mut self,
        buffer: BufferHandle,
        nick: NickHandle,
        property: NickProperty<'_>,
    ) -> Result<()>;

    /// Remove a group with all its subgroups and nicks.
    fn remove_group(&mut self, buffer: BufferHandle, group: GroupHandle) -> Result<()>;

    fn remove_nick(&mut self, buffer: BufferHandle, nick: NickHandle) -> Result<()>;

    // ------------------------------------------------------------------
    // Reports
    // ------------------------------------------------------------------

    /// Show a message to the user, outside of any mirrored buffer.
    fn report(&mut self, level: ReportLevel, message: &str);
}
