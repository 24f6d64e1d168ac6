use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::id::Id;

/// One snapshot of the leader's share between the top two options of a
/// poll, shaped like a financial candlestick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open_pct: f64,
    pub close_pct: f64,
    pub high_pct: f64,
    pub low_pct: f64,
    pub votes1: usize,
    pub votes2: usize,
    pub total: usize,
}

/// An option with its current vote count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionStanding {
    pub id: Id,
    pub text: String,
    pub votes: usize,
}

/// Response of `GET /api/candle-history`.
///
/// `option1`/`option2` are the top two options right now; `history` was
/// recorded while that same pair led, but older series recorded under a
/// different pair are not returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleHistory {
    pub option1: Option<OptionStanding>,
    pub option2: Option<OptionStanding>,
    pub history: Vec<Candle>,
}
