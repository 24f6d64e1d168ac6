use std::path::{Path, PathBuf};

use chrono::Duration;
use log::{error, info, warn};
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::store::Store;

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Debug, Deserialize)]
pub struct Config {
    // non-secrets
    auth_ttl: u32,
    data_dir: PathBuf,
    reference_dir: PathBuf,
    admin_username: String,
    admin_unlimited_votes: bool,
    // secrets
    jwt_secret: String,
    admin_password: String,
}

impl Config {
    /// Valid lifetime of auth token cookies in seconds.
    pub fn auth_ttl(&self) -> Duration {
        Duration::seconds(self.auth_ttl.into())
    }

    /// Directory holding `candidates.json` and `users.json`.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Directory holding the countries/states/cities reference tables.
    pub fn reference_dir(&self) -> &Path {
        &self.reference_dir
    }

    /// Username of the admin created when none exists.
    pub fn admin_username(&self) -> &str {
        &self.admin_username
    }

    /// Password of the admin created when none exists.
    pub fn admin_password(&self) -> &str {
        &self.admin_password
    }

    /// Whether admins may vote any number of times in the same race.
    /// Meant for manual testing; off in release builds.
    pub fn admin_unlimited_votes(&self) -> bool {
        self.admin_unlimited_votes
    }

    /// Secret key used to sign JWTs.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }
}

/// A fairing that loads the application config and puts it in managed state.
/// This could easily be achieved using `AdHoc::config`, but is written out
/// explicitly for symmetry with the store fairing and control over error
/// messages.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        if config.admin_unlimited_votes {
            warn!("Admins may vote without limit (`admin_unlimited_votes`)");
        }

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// A fairing that loads the persisted collections and reference data,
/// ensures an admin exists, and places the [`Store`] into managed state.
/// Must be attached after [`ConfigFairing`].
pub struct StoreFairing;

#[rocket::async_trait]
impl Fairing for StoreFairing {
    fn info(&self) -> Info {
        Info {
            name: "Store",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        let config = match rocket.state::<Config>() {
            Some(config) => config,
            None => {
                error!("Store requires the application config to be loaded first");
                return Err(rocket);
            }
        };

        info!("Loading store from {}...", config.data_dir().display());
        let loaded = Store::load(config).await;
        let store = match loaded {
            Ok(store) => store,
            Err(e) => {
                error!("Failed to load store: {e}");
                return Err(rocket);
            }
        };
        info!("...store online!");

        Ok(rocket.manage(store))
    }
}
