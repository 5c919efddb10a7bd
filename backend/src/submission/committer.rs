//! Writes a validated submission.
//!
//! The event row, its photos and its social network links are inserted in one
//! `IMMEDIATE` transaction. Any failure drops the transaction (rolling every
//! row back) and removes the image files already written for the submission,
//! so a failed submission leaves nothing behind in the store or the sink.

use super::fields::*;
use super::social::network_of;
use super::storage::{write_verified, ImageSink};
use super::FieldBag;
use crate::config::ValidationConfig;
use crate::error::AppError;
use crate::reference::ReferenceSnapshot;
use crate::store::{self, NewEvent, Store, Table};
use chrono::NaiveDateTime;
use log::{error, info, warn};
use rusqlite::Transaction;
use sha2::{Digest, Sha256};

/// Hex characters of the file name digest kept in a stored name.
const HASH_PREFIX_LEN: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Saved { event_id: i64 },
    /// Some images could not be written; nothing was kept. Holds the positions
    /// of the failing images in submission order.
    ImagesFailed { failed: Vec<usize> },
}

/// Stored name for an image: the running photo count followed by the first
/// 30 hex characters of the SHA-256 of the original file name.
pub fn stored_file_name(count: i64, original: &str) -> String {
    let digest = hex::encode(Sha256::digest(original.as_bytes()));
    format!("{count}{}", &digest[..HASH_PREFIX_LEN])
}

pub struct SubmissionCommitter<'a, S: ImageSink> {
    sink: S,
    config: &'a ValidationConfig,
    write_attempts: u32,
}

impl<'a, S: ImageSink> SubmissionCommitter<'a, S> {
    pub fn new(sink: S, config: &'a ValidationConfig, write_attempts: u32) -> Self {
        Self {
            sink,
            config,
            write_attempts,
        }
    }

    /// Commits a submission that already passed validation.
    ///
    /// A comuna that no longer exists is an internal fault (`AppError`), not a
    /// user error.
    pub fn commit(
        &self,
        store: &mut Store,
        bag: &FieldBag,
        snapshot: &ReferenceSnapshot,
    ) -> Result<CommitOutcome, AppError> {
        let mut written = Vec::new();
        let outcome = store
            .transaction()
            .and_then(|tx| self.write_all(tx, bag, snapshot, &mut written));

        match &outcome {
            Ok(CommitOutcome::Saved { event_id }) => {
                info!("Event {event_id} saved with {} image(s)", written.len());
            }
            Ok(CommitOutcome::ImagesFailed { failed }) => {
                warn!("Rolling back submission: image(s) {failed:?} could not be stored");
                self.discard(&written);
            }
            Err(e) => {
                error!("Rolling back submission: {e}");
                self.discard(&written);
            }
        }
        outcome
    }

    fn write_all(
        &self,
        tx: Transaction<'_>,
        bag: &FieldBag,
        snapshot: &ReferenceSnapshot,
        written: &mut Vec<String>,
    ) -> Result<CommitOutcome, AppError> {
        let comuna = bag.scalar(COMUNA);
        let comuna_id = store::comuna_id_by_name(&tx, comuna)?
            .ok_or_else(|| AppError::Inconsistent(format!("comuna {comuna:?} not found at commit")))?;

        let event = NewEvent {
            comuna_id,
            sector: bag.scalar(SECTOR).to_string(),
            contact_name: bag.scalar(NAME).to_string(),
            email: bag.scalar(EMAIL).to_string(),
            phone: bag.scalar(PHONE).to_string(),
            start: self.date(bag, START)?,
            end: self.date(bag, END)?,
            description: bag.scalar(DESCRIPTION).to_string(),
            food_type: bag.scalar(FOOD_TYPE).to_string(),
        };
        let event_id = store::insert_event(&tx, &event)?;

        let mut failed = Vec::new();
        for (position, file) in bag.files(IMAGES).unwrap_or_default().iter().enumerate() {
            let name = stored_file_name(store::count_rows(&tx, Table::Foto)?, &file.filename);
            match write_verified(&self.sink, &name, &file.bytes, self.write_attempts) {
                Ok(()) => {
                    written.push(name.clone());
                    store::insert_photo(&tx, self.sink.base_path(), &name, event_id)?;
                }
                Err(e) => {
                    warn!("{e}");
                    failed.push(position);
                }
            }
        }
        if !failed.is_empty() {
            return Ok(CommitOutcome::ImagesFailed { failed });
        }

        for link in bag.list(SOCIAL_NETWORKS) {
            let network = network_of(link, &snapshot.social_networks, &self.config.catch_all_network);
            store::insert_social_network(&tx, &network, link, event_id)?;
        }

        tx.commit()?;
        Ok(CommitOutcome::Saved { event_id })
    }

    fn date(&self, bag: &FieldBag, field: &str) -> Result<NaiveDateTime, AppError> {
        NaiveDateTime::parse_from_str(bag.scalar(field), &self.config.date_format)
            .map_err(|e| AppError::Inconsistent(format!("{field} unparseable at commit: {e}")))
    }

    fn discard(&self, written: &[String]) {
        for name in written {
            if let Err(e) = self.sink.remove(name) {
                error!("Could not remove image {name} of a rolled back submission: {e}");
            }
        }
    }
}
