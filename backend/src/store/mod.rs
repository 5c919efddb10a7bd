//! # Store
//!
//! SQLite access layer for the food event tables.
//!
//! A `Store` wraps one connection and is opened per request, the same way the
//! handlers open their own connection and drop it when the request ends. The
//! schema and the reference seed are embedded from `backend/sql` and applied in
//! file name order by [`Store::migrate`]; every statement there is idempotent.
//!
//! ## Tables
//! - `region`, `comuna`: read-only reference data.
//! - `evento`, `foto`, `red_social`: written only by the submission committer,
//!   inside a single transaction.
//! - `column_type`: declared value sets of the enumerated columns
//!   (`evento.tipo`, `red_social.nombre`), decoded by [`parse_enum_column`].
//!
//! Read helpers are methods on `Store`. Write helpers are free functions over a
//! `&Connection` so they can run against an open transaction.

mod enum_type;
mod events;
mod reference;

pub use enum_type::parse_enum_column;
pub use events::{
    count_rows, insert_event, insert_photo, insert_social_network, EventRow, NewEvent, PhotoRow,
    SocialNetworkRow, Table,
};
pub use reference::{comuna_id_by_name, Comuna, Region};

use crate::error::AppError;
use include_dir::{include_dir, Dir};
use log::debug;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::Path;
use std::time::Duration;

static SQL_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/sql");

/// How long a connection waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self, AppError> {
        let conn = Connection::open(path)?;
        Self::configure(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory()?;
        Self::configure(conn)
    }

    fn configure(conn: Connection) -> Result<Self, AppError> {
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(Self { conn })
    }

    /// Applies the embedded schema and reference seed.
    pub fn migrate(&self) -> Result<(), AppError> {
        let mut files: Vec<_> = SQL_DIR.files().collect();
        files.sort_by(|a, b| a.path().cmp(b.path()));

        for file in files {
            let sql = file.contents_utf8().ok_or_else(|| {
                AppError::Config(format!("{} is not valid UTF-8", file.path().display()))
            })?;
            debug!("Applying {}", file.path().display());
            self.conn.execute_batch(sql)?;
        }
        Ok(())
    }

    /// Starts a write transaction that takes the database write lock up front,
    /// so reads made inside it (such as the running photo count) cannot be
    /// interleaved with another writer.
    pub fn transaction(&mut self) -> Result<Transaction<'_>, AppError> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}
