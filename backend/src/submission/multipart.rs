use super::fields::{IMAGES, SOCIAL_NETWORKS};
use super::{FieldBag, UploadedFile};
use crate::error::AppError;
use actix_multipart::Multipart;
use futures_util::StreamExt;

/// Reads a `multipart/form-data` submission into a [`FieldBag`].
///
/// - `foto-comida` parts become files. Their bytes are kept up to one byte past
///   `max_file_bytes`; the full streamed size is always recorded so the size
///   rule can report it. A failing part stream is recorded on the file rather
///   than aborting the request.
/// - `red-social` parts become a list; blank entries are dropped.
/// - Every other part is a scalar, first value wins.
///
/// Text parts keep at most `max_text_bytes`; the rest of the part is drained
/// and dropped. A value cut inside a character loses that partial character.
pub async fn read_field_bag(
    mut payload: Multipart,
    max_file_bytes: u64,
    max_text_bytes: usize,
) -> Result<FieldBag, AppError> {
    let mut bag = FieldBag::new();
    let keep_limit = usize::try_from(max_file_bytes.saturating_add(1)).unwrap_or(usize::MAX);

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| AppError::Multipart(e.to_string()))?;
        let Some(name) = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()))
        else {
            continue;
        };

        if name == IMAGES {
            let filename = field
                .content_disposition()
                .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                .unwrap_or_default();
            let mut file = UploadedFile {
                filename,
                ..UploadedFile::default()
            };

            while let Some(chunk) = field.next().await {
                match chunk {
                    Ok(chunk) => {
                        file.size += chunk.len() as u64;
                        let room = keep_limit.saturating_sub(file.bytes.len());
                        file.bytes.extend_from_slice(&chunk[..chunk.len().min(room)]);
                    }
                    Err(e) => {
                        file.read_error = Some(e.to_string());
                        break;
                    }
                }
            }
            bag.push_file(&name, file);
            continue;
        }

        let mut bytes = Vec::new();
        let mut truncated = false;
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| AppError::Multipart(e.to_string()))?;
            let room = max_text_bytes.saturating_sub(bytes.len());
            truncated |= chunk.len() > room;
            bytes.extend_from_slice(&chunk[..chunk.len().min(room)]);
        }
        let value = decode_text(&name, bytes, truncated)?;

        if name == SOCIAL_NETWORKS {
            if !value.trim().is_empty() {
                bag.push_value(&name, value.trim());
            }
        } else {
            bag.set_scalar(&name, value);
        }
    }

    Ok(bag)
}

fn decode_text(name: &str, bytes: Vec<u8>, truncated: bool) -> Result<String, AppError> {
    match String::from_utf8(bytes) {
        Ok(value) => Ok(value),
        Err(e) if truncated && e.utf8_error().error_len().is_none() => {
            let valid = e.utf8_error().valid_up_to();
            let mut bytes = e.into_bytes();
            bytes.truncate(valid);
            String::from_utf8(bytes)
                .map_err(|_| AppError::Multipart(format!("field {name} is not valid UTF-8")))
        }
        Err(_) => Err(AppError::Multipart(format!("field {name} is not valid UTF-8"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cut_text_drops_the_partial_character() {
        let mut bytes = "añ".as_bytes().to_vec();
        bytes.push(0xc3);
        assert_eq!(decode_text("nombre", bytes, true).unwrap(), "añ");
    }

    #[test]
    fn invalid_text_is_a_payload_error() {
        let bytes = vec![b'a', 0xff, b'b'];
        assert!(matches!(decode_text("nombre", bytes, true), Err(AppError::Multipart(_))));
        assert!(matches!(decode_text("nombre", vec![b'a', 0xc3], false), Err(AppError::Multipart(_))));
    }
}
