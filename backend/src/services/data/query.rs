use super::resolver::QueryResolver;
use crate::error::AppError;
use crate::state::AppState;
use crate::store::Store;
use actix_web::{web, HttpResponse};
use common::requests::DataQuery;
use serde_json::Value;

pub(crate) async fn process(
    state: web::Data<AppState>,
    query: web::Query<DataQuery>,
) -> Result<HttpResponse, AppError> {
    let state = state.into_inner();
    let query = query.into_inner();

    let value = tokio::task::spawn_blocking(move || -> Result<Value, AppError> {
        let store = Store::open(&state.config.database_path)?;
        QueryResolver::new(&store, &state.validation.date_format).resolve(&query)
    })
    .await
    .map_err(|e| AppError::Blocking(e.to_string()))??;

    Ok(HttpResponse::Ok().json(value))
}
