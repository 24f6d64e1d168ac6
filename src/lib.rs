#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

use config::{ConfigFairing, StoreFairing};
use logging::LoggerFairing;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod store;

/// Build the server from the `Rocket.toml` / `ROCKET_*` configuration.
pub fn build() -> Rocket<Build> {
    assemble(rocket::build())
}

fn assemble(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .attach(ConfigFairing)
        .attach(StoreFairing)
        .attach(LoggerFairing)
        .mount("/", api::routes())
        .register("/", api::catchers())
}

/// A server whose persisted data lives in `data_dir`, with the remaining
/// settings fixed so tests do not depend on `Rocket.toml`.
#[cfg(test)]
pub(crate) fn rocket_for_data_dir(data_dir: &std::path::Path) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("auth_ttl", 3600))
        .merge(("data_dir", data_dir))
        .merge(("reference_dir", "data/reference"))
        .merge(("admin_username", "admin"))
        .merge(("admin_password", "admin"))
        .merge(("admin_unlimited_votes", true))
        .merge(("jwt_secret", "test-secret"));
    assemble(rocket::custom(figment))
}
