use std::marker::PhantomData;

use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use rocket::{
    http::{Cookie, SameSite, Status},
    request::{FromRequest, Outcome},
    time::Duration,
    Request, State,
};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{
    id::Id,
    user::{Role, User},
};
use crate::store::Store;

use super::rights::Rights;

pub const AUTH_TOKEN_COOKIE: &str = "auth_token";

/// An authentication token for a specific user, checked against the
/// access level `R` when used as a request guard.
#[derive(Serialize, Deserialize)]
pub struct AuthToken<R> {
    pub id: Id,
    #[serde(rename = "rol")]
    pub role: Role,
    #[serde(skip)]
    phantom: PhantomData<R>,
}

impl<R> AuthToken<R> {
    /// Create a new [`AuthToken`] for the given user.
    pub fn new(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            role: user.role,
            phantom: PhantomData,
        }
    }

    /// The id of the signed-in user.
    pub fn id(&self) -> &Id {
        &self.id
    }

    #[allow(clippy::missing_panics_doc)]
    /// Serialize this token into a cookie.
    pub fn into_cookie(self, config: &Config) -> Cookie<'static> {
        let claims = Claims {
            token: self,
            expire_at: Utc::now() + config.auth_ttl(),
        };

        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret()),
        )
        .expect("JWT encoding is infallible with default settings");

        Cookie::build(AUTH_TOKEN_COOKIE, token)
            .max_age(Duration::seconds(config.auth_ttl().num_seconds()))
            .http_only(true)
            .same_site(SameSite::Strict)
            .finish()
    }

    /// Deserialize a token from a cookie.
    pub fn from_cookie(cookie: &Cookie<'_>, config: &Config) -> Result<Self> {
        let token = jsonwebtoken::decode(
            cookie.value(),
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )
        .map(|claims: TokenData<Claims<R>>| claims.claims.token)?;
        Ok(token)
    }

    /// Check a user id supplied in a request body against this token.
    pub fn check_claimed_id(&self, claimed: Option<&Id>) -> Result<()> {
        match claimed {
            Some(claimed) if claimed != &self.id => Err(Error::Unauthenticated(format!(
                "request is for user {claimed} but signed in as {}",
                self.id
            ))),
            _ => Ok(()),
        }
    }
}

/// Cookie claims: the token itself plus an expiry datetime.
#[derive(Serialize, Deserialize)]
struct Claims<R> {
    #[serde(flatten, bound = "")]
    token: AuthToken<R>,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

#[rocket::async_trait]
impl<'r, R> FromRequest<'r> for AuthToken<R>
where
    R: Rights,
{
    type Error = Error;

    /// Get an [`AuthToken`] from the cookie, check the user still exists and
    /// that their role satisfies `R`.
    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        // Unwrap is safe as `Config` and `Store` are always managed.
        let config = req.guard::<&State<Config>>().await.unwrap();
        let store = req.guard::<&State<Store>>().await.unwrap();

        let cookie = match req.cookies().get(AUTH_TOKEN_COOKIE) {
            Some(cookie) => cookie,
            None => {
                return Outcome::Failure((
                    Status::Unauthorized,
                    Error::Unauthenticated("no auth token".to_string()),
                ))
            }
        };

        let token: Self = match Self::from_cookie(cookie, config) {
            Ok(token) => token,
            Err(e) => return Outcome::Failure((Status::Unauthorized, e)),
        };

        // The user may have been deleted since the token was issued.
        let role = match store.registry.read().await.user(&token.id) {
            Some(user) => user.role,
            None => {
                return Outcome::Failure((
                    Status::Unauthorized,
                    Error::Unauthenticated(format!("unknown user {}", token.id)),
                ))
            }
        };

        if !R::permits(role) {
            return Outcome::Failure((
                Status::Forbidden,
                Error::Forbidden(format!("{} rights required", R::NAME)),
            ));
        }

        Outcome::Success(token)
    }
}
