use std::fmt::{Display, Formatter};
use std::{ops::Deref, str::FromStr};

use rand::Rng;
use rocket::{
    form::{self, prelude::ErrorKind, FromFormField, ValueField},
    http::{
        impl_from_uri_param_identity,
        uri::fmt::{Path, UriDisplay},
    },
    request::FromParam,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const ID_LENGTH: usize = 9;
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Longest id we are willing to accept from a client.
const MAX_ID_LENGTH: usize = 64;

/// An opaque identifier for any stored entity.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid id {0:?}")]
pub struct InvalidId(String);

impl Id {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(random_string(ID_ALPHABET, ID_LENGTH))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A random string of uppercase letters and digits, as used for share codes
/// and voucher codes.
pub fn random_code(len: usize) -> String {
    random_string(CODE_ALPHABET, len)
}

fn random_string(alphabet: &[u8], len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
        .collect()
}

impl Deref for Id {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Id {
    type Err = InvalidId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = !s.is_empty()
            && s.len() <= MAX_ID_LENGTH
            && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(InvalidId(s.to_string()))
        }
    }
}

impl From<&str> for Id {
    /// Wrap a known-good literal. Only used for seed data and option ids.
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl<'a> FromParam<'a> for Id {
    type Error = InvalidId;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        param.parse::<Id>()
    }
}

#[rocket::async_trait]
impl<'r> FromFormField<'r> for Id {
    fn from_value(field: ValueField<'r>) -> form::Result<'r, Self> {
        field.value.parse::<Id>().map_err(|err| {
            let error = ErrorKind::Custom(Box::new(err));
            error.into()
        })
    }
}

impl UriDisplay<Path> for Id {
    fn fmt(&self, formatter: &mut rocket::http::uri::fmt::Formatter<'_, Path>) -> std::fmt::Result {
        formatter.write_value(&self.0)
    }
}

impl_from_uri_param_identity!([Path] Id);
