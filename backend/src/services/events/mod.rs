//! # Event Submission Service
//!
//! `POST /api/events` accepts a `multipart/form-data` body with the event form
//! fields, the image files (`foto-comida`) and the social network links
//! (`red-social`).
//!
//! The reply is always `{saved, fields}` when the request could be processed:
//! `fields` maps each form field to `[valid, message]`, or to a list of them
//! for images and links. Internal faults answer `500` with a generic body.

mod submit;

use actix_web::web::{post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/events";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("", post().to(submit::process))
}
