use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{candidate::Office, id::Id};

/// A ballot in a political race. Denormalizes the candidate's name so
/// results never need to look the candidate up again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoliticalVote {
    pub id: Id,
    pub user_id: Id,
    pub role: Office,
    pub country: String,
    pub state: String,
    pub candidate_id: Id,
    pub candidate_name: String,
    pub timestamp: DateTime<Utc>,
}

/// A ballot in a community poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollVote {
    pub id: Id,
    pub poll_id: Id,
    pub user_id: Id,
    pub user_name: String,
    pub option_id: Id,
    pub option_text: String,
    pub timestamp: DateTime<Utc>,
}

/// Body of `POST /api/vote`. `userId` is optional since the voter is taken
/// from the auth token; when present it must match.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    #[serde(default)]
    pub user_id: Option<Id>,
    pub role: Office,
    pub country: String,
    #[serde(default)]
    pub state: String,
    pub candidate_id: String,
    #[serde(default)]
    pub candidate_name: Option<String>,
}

/// Body of `POST /api/poll-vote`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollVoteRequest {
    #[serde(default)]
    pub user_id: Option<Id>,
    #[serde(default)]
    pub user_name: Option<String>,
    pub poll_id: Id,
    pub option_id: Id,
    #[serde(default)]
    pub option_text: Option<String>,
}

/// A political ballot after validation, ready for the ledger.
#[derive(Debug, Clone)]
pub struct PoliticalBallot {
    pub role: Office,
    pub country: String,
    pub state: String,
    pub candidate_id: Id,
    pub candidate_name: String,
}
