use rocket::{serde::json::Json, Route, State};

use crate::{
    error::{Error, Result},
    model::{
        auth::{Admin, AuthToken, Member},
        id::Id,
        results::{RaceFilter, RaceTally},
        trend::CandleHistory,
        vote::{PoliticalVote, PollVote, PollVoteRequest, VoteRequest},
    },
    store::Store,
};

use super::common::Ack;

pub fn routes() -> Vec<Route> {
    routes![
        cast_vote,
        votes,
        clear_votes,
        results,
        cast_poll_vote,
        poll_votes,
        candle_history,
    ]
}

#[post("/api/vote", data = "<request>", format = "json")]
async fn cast_vote(
    token: AuthToken<Member>,
    request: Json<VoteRequest>,
    store: &State<Store>,
) -> Result<Json<Ack>> {
    token.check_claimed_id(request.user_id.as_ref())?;
    store.cast_political_vote(token.id(), request.0).await?;
    Ok(Ack::ok())
}

#[get("/api/votes")]
async fn votes(store: &State<Store>) -> Json<Vec<PoliticalVote>> {
    Json(store.ledger.read().await.votes().to_vec())
}

/// Wipe both ledgers. Irreversible.
#[delete("/api/votes")]
async fn clear_votes(_token: AuthToken<Admin>, store: &State<Store>) -> Json<Ack> {
    store.clear_votes().await;
    Ack::ok()
}

#[get("/api/results?<filter..>")]
async fn results(filter: RaceFilter, store: &State<Store>) -> Json<Vec<RaceTally>> {
    Json(store.ledger.read().await.race_tallies(&filter))
}

#[post("/api/poll-vote", data = "<request>", format = "json")]
async fn cast_poll_vote(
    token: AuthToken<Member>,
    request: Json<PollVoteRequest>,
    store: &State<Store>,
) -> Result<Json<Ack>> {
    token.check_claimed_id(request.user_id.as_ref())?;
    store.cast_poll_vote(token.id(), request.0).await?;
    Ok(Ack::ok())
}

#[get("/api/poll-votes")]
async fn poll_votes(store: &State<Store>) -> Json<Vec<PollVote>> {
    Json(store.ledger.read().await.poll_votes().to_vec())
}

#[derive(Debug, FromForm)]
struct CandleQuery {
    #[field(name = "pollId")]
    poll_id: Id,
}

/// Like poll results, unapproved polls only have a history for admins.
#[get("/api/candle-history?<query..>")]
async fn candle_history(
    token: Option<AuthToken<Admin>>,
    query: CandleQuery,
    store: &State<Store>,
) -> Result<Json<CandleHistory>> {
    let registry = store.registry.read().await;
    let poll = registry
        .poll(&query.poll_id)
        .filter(|poll| token.is_some() || poll.is_open())
        .ok_or_else(|| Error::not_found(format!("Poll {}", query.poll_id)))?;
    let history = store.ledger.read().await.candle_history(poll);
    Ok(Json(history))
}
