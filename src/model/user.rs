use std::fmt::Display;

use argon2::Config;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::id::Id;

/// Privilege level of a user. Fixed at creation.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Display for Role {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}",
            match self {
                Self::User => "user",
                Self::Admin => "admin",
            }
        )
    }
}

/// A user account, as held in memory and persisted to `users.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Id,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub name: String,
}

impl User {
    /// Create a new user with a freshly hashed password.
    pub fn new(registration: Registration, role: Role) -> Result<Self> {
        let username = registration.username.trim().to_string();
        if username.is_empty() {
            return Err(Error::bad_request("Username must not be empty"));
        }
        if registration.password.is_empty() {
            return Err(Error::bad_request("Password must not be empty"));
        }

        // 16 bytes is the recommended salt length for Argon2.
        let mut salt = [0_u8; 16];
        rand::thread_rng().fill(&mut salt);
        let password_hash =
            argon2::hash_encoded(registration.password.as_bytes(), &salt, &Config::default())?;

        let name = match registration.name.trim() {
            "" => username.clone(),
            name => name.to_string(),
        };
        Ok(Self {
            id: Id::generate(),
            username,
            password_hash,
            role,
            name,
        })
    }

    /// Check whether the given password is correct.
    pub fn verify_password<T: AsRef<[u8]>>(&self, password: T) -> bool {
        // A malformed stored hash can only come from a hand-edited users file.
        argon2::verify_encoded(&self.password_hash, password.as_ref()).unwrap_or(false)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// The public view of a user: everything except the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Id,
    pub username: String,
    pub role: Role,
    pub name: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
            name: user.name.clone(),
        }
    }
}

/// Raw login credentials. Never stored, since the password is in plaintext.
#[derive(Clone, Deserialize, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// A sign-up request.
#[derive(Clone, Deserialize, Serialize)]
pub struct Registration {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
}
