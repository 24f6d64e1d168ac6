use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    candidate::{Candidate, Office},
    id::Id,
    poll::Poll,
    vote::{PoliticalVote, PollVote},
};

/// One candidate's share of a race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateResult {
    pub candidate_name: String,
    pub votes: usize,
    pub percent: f64,
}

/// Results of a single race, i.e. one office in one country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceTally {
    pub country: String,
    pub role: Office,
    pub total: usize,
    pub results: Vec<CandidateResult>,
}

/// Query filters for political results.
#[derive(Debug, Default, FromForm)]
pub struct RaceFilter {
    pub country: Option<String>,
    pub role: Option<Office>,
}

impl RaceFilter {
    pub fn matches(&self, vote: &PoliticalVote) -> bool {
        self.country
            .as_ref()
            .map_or(true, |country| country.to_lowercase() == vote.country.to_lowercase())
            && self.role.map_or(true, |role| role == vote.role)
    }
}

/// One option's share of a poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionTally {
    pub option_id: Id,
    pub text: String,
    pub votes: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollTally {
    pub poll_id: Id,
    pub total: usize,
    pub options: Vec<OptionTally>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub votes: usize,
    pub poll_votes: usize,
    pub candidates: usize,
    pub countries: usize,
    pub polls: usize,
    pub users: usize,
}

/// Full data dump for admins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Export {
    pub candidates: Vec<Candidate>,
    pub votes: Vec<PoliticalVote>,
    pub poll_votes: Vec<PollVote>,
    pub polls: Vec<Poll>,
    pub export_date: DateTime<Utc>,
}

/// An approved community poll in the admin ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedPoll {
    pub rank: u32,
    pub poll: Poll,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RankUpdate {
    pub rank: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RankSwap {
    pub first: Id,
    pub second: Id,
}
