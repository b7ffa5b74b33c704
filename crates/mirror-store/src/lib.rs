//! # mirror-store
//!
//! Local storage for buffers mirrored from remote relays.
//!
//! The [`MirrorStore`] trait is the capability the remote mirror writes into:
//! buffers with their properties and input callbacks, printed lines, and
//! nicklists whose groups and nicks are stamped with the remote's ids.
//!
//! Two implementations are provided:
//! - [`MemoryStore`], kept entirely in process memory;
//! - [`Database`], backed by SQLite, so a mirror survives restarts.

pub mod buffers;
pub mod database;
pub mod lines;
pub mod memory;
pub mod migrations;
pub mod models;
pub mod nicklist;
pub mod store;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use models::*;
pub use store::MirrorStore;
