use crate::config::ValidationConfig;
use crate::error::AppError;
use crate::reference::ReferenceSnapshot;
use crate::state::AppState;
use crate::store::Store;
use crate::submission::committer::{CommitOutcome, SubmissionCommitter};
use crate::submission::fields::IMAGES;
use crate::submission::multipart::read_field_bag;
use crate::submission::storage::{DiskImageSink, ImageSink};
use crate::submission::validator::{SubmissionValidator, MSG_FILE_READ};
use crate::submission::FieldBag;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use common::model::submission::{FieldCheck, FieldResult, SubmissionResponse};
use log::info;

pub(crate) async fn process(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let bag = read_field_bag(
        payload,
        state.validation.max_image_bytes,
        state.validation.max_text_bytes(),
    )
    .await?;

    let state = state.into_inner();
    let response = tokio::task::spawn_blocking(move || submit_event(&state, &bag))
        .await
        .map_err(|e| AppError::Blocking(e.to_string()))??;

    Ok(HttpResponse::Ok().json(response))
}

fn submit_event(state: &AppState, bag: &FieldBag) -> Result<SubmissionResponse, AppError> {
    let mut store = Store::open(&state.config.database_path)?;
    let storage = state.config.storage();
    let sink = DiskImageSink::new(storage.media_dir, storage.base_path);
    submit_to(&mut store, sink, bag, &state.validation, storage.write_attempts)
}

/// Validates a decoded submission and, when every field passes, commits it
/// with its images going to `sink`.
///
/// Images that could not be stored are reported on their own entries of the
/// image field, and the submission is not saved.
pub(crate) fn submit_to<S: ImageSink>(
    store: &mut Store,
    sink: S,
    bag: &FieldBag,
    validation: &ValidationConfig,
    write_attempts: u32,
) -> Result<SubmissionResponse, AppError> {
    let snapshot = ReferenceSnapshot::load(store)?;

    let check = SubmissionValidator::new(validation).validate(bag, &snapshot);
    let mut fields = check.fields;
    if !check.valid {
        info!("Submission rejected by validation");
        return Ok(SubmissionResponse { saved: false, fields });
    }

    let committer = SubmissionCommitter::new(sink, validation, write_attempts);
    let saved = match committer.commit(store, bag, &snapshot)? {
        CommitOutcome::Saved { .. } => true,
        CommitOutcome::ImagesFailed { failed } => {
            if let Some(FieldCheck::Many(results)) = fields.get_mut(IMAGES) {
                for position in failed {
                    if let Some(result) = results.get_mut(position) {
                        *result = FieldResult::invalid(MSG_FILE_READ);
                    }
                }
            }
            false
        }
    };

    Ok(SubmissionResponse { saved, fields })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::seeded_store;
    use crate::store::{count_rows, Table};
    use crate::submission::committer::stored_file_name;
    use crate::submission::fields::SOCIAL_NETWORKS;
    use crate::submission::storage::tests::FlakySink;
    use crate::submission::tests::{valid_bag, JPEG_MAGIC};
    use crate::submission::UploadedFile;
    use serde_json::json;

    #[test]
    fn unstored_image_is_reported_on_its_own_entry() {
        let mut store = seeded_store();
        let config = ValidationConfig::new(2_000_000).unwrap();
        let sink = FlakySink::default();
        sink.fail_names
            .borrow_mut()
            .push(stored_file_name(1, "roto.jpg")[1..].to_string());

        let mut bag = valid_bag();
        bag.push_file(IMAGES, UploadedFile::new("roto.jpg", JPEG_MAGIC.to_vec()));
        let response = submit_to(&mut store, &sink, &bag, &config, 3).unwrap();

        assert!(!response.saved);
        assert_eq!(
            serde_json::to_value(&response.fields[IMAGES]).unwrap(),
            json!([[true, ""], [false, "Error al leer el archivo."]])
        );
        assert!(response.fields[SOCIAL_NETWORKS].is_valid());
        assert_eq!(count_rows(store.conn(), Table::Evento).unwrap(), 0);
        assert!(sink.files.borrow().is_empty());
    }

    #[test]
    fn valid_submission_is_saved() {
        let mut store = seeded_store();
        let config = ValidationConfig::new(2_000_000).unwrap();
        let sink = FlakySink::default();

        let response = submit_to(&mut store, &sink, &valid_bag(), &config, 3).unwrap();
        assert!(response.saved);
        assert_eq!(store.event_ids().unwrap().len(), 1);
        assert_eq!(sink.files.borrow().len(), 1);
    }
}
