use rocket::{http::Status, serde::json::Json, Catcher, Request, Route};

use crate::error::ErrorBody;

pub mod admin;
pub mod auth;
pub mod candidates;
pub mod chat;
pub mod common;
pub mod places;
pub mod polls;
pub mod shop;
pub mod voting;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(admin::routes());
    routes.extend(auth::routes());
    routes.extend(candidates::routes());
    routes.extend(chat::routes());
    routes.extend(places::routes());
    routes.extend(polls::routes());
    routes.extend(shop::routes());
    routes.extend(voting::routes());
    routes
}

pub fn catchers() -> Vec<Catcher> {
    catchers![unprocessable, default_catcher]
}

/// Bodies that parse but do not fit the expected shape are reported as
/// plain malformed requests.
#[catch(422)]
fn unprocessable() -> (Status, Json<ErrorBody>) {
    (
        Status::BadRequest,
        Json(ErrorBody::for_status(Status::BadRequest)),
    )
}

#[catch(default)]
fn default_catcher(status: Status, _req: &Request<'_>) -> (Status, Json<ErrorBody>) {
    (status, Json(ErrorBody::for_status(status)))
}
