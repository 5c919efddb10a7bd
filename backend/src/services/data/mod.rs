//! # Data Service
//!
//! `GET /api/data?type=...` serves every read of the food event site.
//!
//! | `type`            | extra params       | reply                                        |
//! |-------------------|--------------------|----------------------------------------------|
//! | `regions-comunas` |                    | `{regions, comunas}`                         |
//! | `food-types`      |                    | food type names                              |
//! | `social-networks` |                    | network names                                |
//! | `comunas-images`  |                    | `[[comuna, photo count], ...]`               |
//! | `events-comuna`   | `comuna`           | events of the comuna, latest start first     |
//! | `event`           | `id`               | one event                                    |
//! | `events`          | `limit`, `offset`  | events, latest start first                   |
//! | `events-per-day`  |                    | `[[YYYY-MM-DD, event count], ...]`           |
//! | `events-per-food-type` |               | `[[food type, event count], ...]`            |
//! | `events-per-month`| `from`, `to`       | `[[YYYY-MM, event count], ...]` for events starting within `from..=to` (`HH:MM`) |
//!
//! A missing or unknown `type` (or an unusable `comuna`, `id` or time window) answers
//! `{response, values}` describing what to send instead.

mod query;
pub mod resolver;

use actix_web::web::{get, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/data";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("", get().to(query::process))
}
