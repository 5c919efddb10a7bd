pub mod data;
pub mod events;

use actix_files::Files;
use actix_web::web;
use std::path::Path;

/// Registers every route of the service. Stored images are served from
/// `media_dir` under `media_base_path`, which must already exist.
pub fn configure(cfg: &mut web::ServiceConfig, media_base_path: &str, media_dir: &Path) {
    cfg.service(events::configure_routes())
        .service(data::configure_routes())
        .service(Files::new(media_base_path, media_dir));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::state::AppState;
    use crate::store::Store;
    use crate::submission::committer::stored_file_name;
    use crate::submission::tests::{GIF_MAGIC, PNG_MAGIC};
    use actix_web::http::header;
    use actix_web::{test, App};
    use common::model::event::EventRecord;
    use common::model::submission::{FieldCheck, SubmissionResponse};
    use serde_json::Value;
    use std::fs;
    use tempfile::TempDir;

    const BOUNDARY: &str = "----food-events-boundary";

    fn test_state(dir: &TempDir) -> AppState {
        let config = AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            database_path: dir.path().join("events.sqlite"),
            media_dir: dir.path().join("media"),
            media_base_path: "/media".into(),
            max_image_bytes: 1_000_000,
            write_attempts: 3,
        };
        Store::open(&config.database_path).unwrap().migrate().unwrap();
        fs::create_dir_all(&config.media_dir).unwrap();
        AppState::new(config).unwrap()
    }

    fn multipart_body(scalars: &[(&str, &str)], files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in scalars {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        for (filename, bytes) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"foto-comida\"; \
                     filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn form(overrides: &[(&'static str, &'static str)]) -> Vec<(&'static str, &'static str)> {
        let mut fields = vec![
            ("region", "Región de Los Ríos"),
            ("comuna", "Valdivia"),
            ("sector", "Costanera"),
            ("nombre", "Ana Pérez"),
            ("email", "ana@example.cl"),
            ("celular", ""),
            ("descripcion-evento", "Feria costumbrista"),
            ("tipo-comida", "Chilena"),
            ("dia-hora-inicio", "2024-03-01 10:00"),
            ("dia-hora-termino", "2024-03-01 11:00"),
            ("red-social", "https://twitter.com/feria"),
            ("red-social", ""),
        ];
        for (name, value) in overrides {
            if let Some(field) = fields.iter_mut().find(|(n, _)| n == name) {
                field.1 = *value;
            }
        }
        fields
    }

    fn post_event(body: Vec<u8>) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/api/events")
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(body)
    }

    #[actix_web::test]
    async fn submitted_event_is_served_back() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let media_dir = state.config.media_dir.clone();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(|cfg| configure(cfg, "/media", &media_dir)),
        )
        .await;

        let body = multipart_body(&form(&[]), &[("plato.png", PNG_MAGIC)]);
        let response: SubmissionResponse =
            test::call_and_read_body_json(&app, post_event(body).to_request()).await;
        assert!(response.saved, "{:?}", response.fields);
        assert_eq!(
            response.fields["red-social"],
            FieldCheck::Many(vec![common::model::submission::FieldResult::ok()])
        );

        let req = test::TestRequest::get().uri("/api/data?type=event&id=1").to_request();
        let event: EventRecord = test::call_and_read_body_json(&app, req).await;
        assert_eq!(event.comuna, "Valdivia");
        assert_eq!(event.social_networks[0].network, "twitter");
        assert_eq!(event.photos[0].image_path, stored_file_name(0, "plato.png"));

        let req = test::TestRequest::get()
            .uri(&format!("/media/{}", event.photos[0].image_path))
            .to_request();
        let image = test::call_and_read_body(&app, req).await;
        assert_eq!(&image[..], PNG_MAGIC);
    }

    #[actix_web::test]
    async fn rejected_submission_reports_fields_and_stores_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let database_path = state.config.database_path.clone();
        let media_dir = state.config.media_dir.clone();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(|cfg| configure(cfg, "/media", &media_dir)),
        )
        .await;

        let body = multipart_body(
            &form(&[("dia-hora-termino", "2024-03-01 09:00")]),
            &[("falso.png", GIF_MAGIC)],
        );
        let response: Value = test::call_and_read_body_json(&app, post_event(body).to_request()).await;

        assert_eq!(response["saved"], false);
        assert_eq!(response["fields"]["region"], serde_json::json!([true, ""]));
        assert_eq!(
            response["fields"]["dia-hora-termino"][1],
            "El término debe ser después del inicio del evento."
        );
        assert_eq!(
            response["fields"]["foto-comida"][0][1],
            "Extensión del archivo debe ser (.jpg .jpeg .png)."
        );

        let store = Store::open(&database_path).unwrap();
        assert!(store.event_ids().unwrap().is_empty());
        assert_eq!(fs::read_dir(&media_dir).unwrap().count(), 0);
    }

    #[actix_web::test]
    async fn submission_without_images_asks_for_one() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let media_dir = state.config.media_dir.clone();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(|cfg| configure(cfg, "/media", &media_dir)),
        )
        .await;

        let response: Value =
            test::call_and_read_body_json(&app, post_event(multipart_body(&form(&[]), &[])).to_request()).await;
        assert_eq!(response["saved"], false);
        assert_eq!(response["fields"]["foto-comida"], serde_json::json!([[false, "Subir una imagen."]]));
    }

    #[actix_web::test]
    async fn oversized_image_reports_its_full_size() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let media_dir = state.config.media_dir.clone();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(|cfg| configure(cfg, "/media", &media_dir)),
        )
        .await;

        let mut big = PNG_MAGIC.to_vec();
        big.resize(1_000_000 + 5_000, 0);
        let body = multipart_body(&form(&[]), &[("grande.png", big.as_slice())]);
        let response: Value = test::call_and_read_body_json(&app, post_event(body).to_request()).await;

        assert_eq!(response["saved"], false);
        assert_eq!(
            response["fields"]["foto-comida"],
            serde_json::json!([[false, "Tamaño del archivo 1.005 MB excede el máximo 1.000 MB."]])
        );
        assert_eq!(fs::read_dir(&media_dir).unwrap().count(), 0);
    }

    #[actix_web::test]
    async fn overlong_text_is_cut_and_still_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let media_dir = state.config.media_dir.clone();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(|cfg| configure(cfg, "/media", &media_dir)),
        )
        .await;

        for long in ["é".repeat(300_000), "𝄞".repeat(2_000)] {
            let mut fields: Vec<(&str, &str)> = form(&[]);
            if let Some(field) = fields.iter_mut().find(|(name, _)| *name == "descripcion-evento") {
                field.1 = &long;
            }
            let body = multipart_body(&fields, &[("plato.png", PNG_MAGIC)]);
            let response: Value = test::call_and_read_body_json(&app, post_event(body).to_request()).await;

            assert_eq!(response["saved"], false);
            assert_eq!(
                response["fields"]["descripcion-evento"],
                serde_json::json!([false, "Largo máximo de caracteres excedido."])
            );
            assert_eq!(response["fields"]["nombre"], serde_json::json!([true, ""]));
        }
    }

    #[actix_web::test]
    async fn data_endpoint_requires_type() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let media_dir = state.config.media_dir.clone();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(|cfg| configure(cfg, "/media", &media_dir)),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/data").to_request();
        let response: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(response["response"], "require type param");
        assert_eq!(response["values"].as_array().unwrap().len(), 10);

        let req = test::TestRequest::get().uri("/api/data?type=events&limit=5").to_request();
        let response: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(response, serde_json::json!([]));
    }
}
