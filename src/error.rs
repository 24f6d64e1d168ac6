use std::io::Cursor;

use jsonwebtoken::errors::Error as JwtError;
use log::{debug, error};
use rocket::{
    http::{ContentType, Status},
    response::{self, Responder},
    serde::json::serde_json,
    Request, Response,
};
use serde::Serialize;
use thiserror::Error;

use crate::logging::RequestId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Not signed in: {0}")]
    Unauthenticated(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Already voted: {0}")]
    DuplicateVote(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    Argon2(#[from] argon2::Error),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn bad_request(why: impl Into<String>) -> Self {
        Self::BadRequest(why.into())
    }

    /// The HTTP status this error is reported with.
    pub fn status(&self) -> Status {
        match self {
            Self::Unauthenticated(_) | Self::Jwt(_) => Status::Unauthorized,
            Self::Forbidden(_) => Status::Forbidden,
            Self::DuplicateVote(_) | Self::BadRequest(_) => Status::BadRequest,
            Self::NotFound(_) => Status::NotFound,
            Self::Io(_) | Self::Json(_) | Self::Argon2(_) => Status::InternalServerError,
        }
    }

    /// Stable machine-readable code, so clients need not match on messages.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) | Self::Jwt(_) => "unauthenticated",
            Self::Forbidden(_) => "forbidden",
            Self::DuplicateVote(_) => "duplicate_vote",
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "malformed_request",
            Self::Io(_) | Self::Json(_) | Self::Argon2(_) => "internal",
        }
    }
}

/// The JSON body sent for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

impl ErrorBody {
    /// Build the body for a bare status, as produced by a catcher.
    pub fn for_status(status: Status) -> Self {
        let code = match status.code {
            400 | 422 => "malformed_request",
            401 => "unauthenticated",
            403 => "forbidden",
            404 => "not_found",
            _ => "internal",
        };
        Self {
            error: status.reason_lossy().to_string(),
            code,
        }
    }
}

/// Render `body` as a JSON response with the given status.
pub fn json_response<'o>(status: Status, body: &ErrorBody) -> response::Result<'o> {
    let json = serde_json::to_string(body).map_err(|_| Status::InternalServerError)?;
    Response::build()
        .status(status)
        .header(ContentType::JSON)
        .sized_body(json.len(), Cursor::new(json))
        .ok()
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        let id = req.local_cache(RequestId::next);
        let status = self.status();
        if status.code >= 500 {
            error!("req{id}: {self}");
        } else {
            debug!("req{id}: {self}");
        }
        // Internal details stay in the log.
        let error = if status.code >= 500 {
            status.reason_lossy().to_string()
        } else {
            self.to_string()
        };
        json_response(
            status,
            &ErrorBody {
                error,
                code: self.code(),
            },
        )
    }
}
