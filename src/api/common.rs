use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};

/// Body of responses that only confirm an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
}

impl Ack {
    pub fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}
