use rocket::{serde::json::Json, Route, State};

use crate::{
    error::Result,
    model::{
        auth::{Admin, AuthToken},
        id::Id,
        results::{Export, RankSwap, RankUpdate, RankedPoll, Stats},
    },
    store::Store,
};

use super::common::Ack;

pub fn routes() -> Vec<Route> {
    routes![poll_ranking, set_poll_rank, swap_poll_ranks, export, stats]
}

/// Approved community polls in ranking order.
#[get("/api/admin/poll-ranking")]
async fn poll_ranking(_token: AuthToken<Admin>, store: &State<Store>) -> Json<Vec<RankedPoll>> {
    Json(store.registry.read().await.ranked_polls())
}

#[put("/api/admin/poll-ranking/<poll_id>", data = "<update>", format = "json")]
async fn set_poll_rank(
    _token: AuthToken<Admin>,
    poll_id: Id,
    update: Json<RankUpdate>,
    store: &State<Store>,
) -> Result<Json<Ack>> {
    store
        .registry
        .write()
        .await
        .set_poll_rank(&poll_id, update.rank)?;
    Ok(Ack::ok())
}

#[post("/api/admin/poll-ranking/swap", data = "<swap>", format = "json")]
async fn swap_poll_ranks(
    _token: AuthToken<Admin>,
    swap: Json<RankSwap>,
    store: &State<Store>,
) -> Result<Json<Ack>> {
    store
        .registry
        .write()
        .await
        .swap_poll_ranks(&swap.first, &swap.second)?;
    Ok(Ack::ok())
}

#[get("/api/export")]
async fn export(_token: AuthToken<Admin>, store: &State<Store>) -> Json<Export> {
    Json(store.export().await)
}

#[get("/api/stats")]
async fn stats(store: &State<Store>) -> Json<Stats> {
    Json(store.stats().await)
}
