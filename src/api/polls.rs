use log::info;
use rocket::{serde::json::Json, Route, State};

use crate::{
    error::{Error, Result},
    model::{
        auth::{Admin, AuthToken, Member},
        id::Id,
        poll::{NewPoll, Poll, PollFilter, PollKind, PollSummary},
        results::PollTally,
    },
    store::Store,
};

use super::common::Ack;

pub fn routes() -> Vec<Route> {
    routes![
        polls,
        create_poll,
        get_poll,
        shared_poll,
        approve_poll,
        delete_poll,
        poll_results,
    ]
}

/// Polls with their vote counts. Only admins see unapproved polls.
#[get("/api/polls?<filter..>")]
async fn polls(
    token: Option<AuthToken<Admin>>,
    filter: PollFilter,
    store: &State<Store>,
) -> Json<Vec<PollSummary>> {
    Json(store.poll_summaries(&filter, token.is_some()).await)
}

/// Polls created by admins are approved straight away; anyone else's wait
/// for an admin. Only admins may create political polls.
#[post("/api/polls", data = "<new_poll>", format = "json")]
async fn create_poll(
    token: AuthToken<Member>,
    new_poll: Json<NewPoll>,
    store: &State<Store>,
) -> Result<Json<Poll>> {
    let user = store.user(token.id()).await?;
    if new_poll.kind == PollKind::Political && !user.is_admin() {
        return Err(Error::Forbidden(
            "Only admins may create political polls".to_string(),
        ));
    }

    let mut registry = store.registry.write().await;
    let poll = registry.add_poll(new_poll.0, user.is_admin())?.clone();
    info!(
        "{} created poll {} ({}), approved: {}",
        user.username, poll.title, poll.id, poll.approved
    );
    Ok(Json(poll))
}

#[get("/api/polls/<poll_id>")]
async fn get_poll(poll_id: Id, store: &State<Store>) -> Result<Json<Poll>> {
    store
        .registry
        .read()
        .await
        .poll(&poll_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| Error::not_found(format!("Poll {poll_id}")))
}

#[get("/api/polls/share/<code>", rank = 1)]
async fn shared_poll(code: &str, store: &State<Store>) -> Result<Json<Poll>> {
    store
        .registry
        .read()
        .await
        .poll_by_share_code(code)
        .filter(|poll| poll.approved)
        .cloned()
        .map(Json)
        .ok_or_else(|| Error::not_found(format!("Poll with share code {code}")))
}

#[post("/api/polls/<poll_id>/approve")]
async fn approve_poll(
    _token: AuthToken<Admin>,
    poll_id: Id,
    store: &State<Store>,
) -> Result<Json<Poll>> {
    let mut registry = store.registry.write().await;
    let poll = registry.approve_poll(&poll_id)?.clone();
    info!("Approved poll {} ({})", poll.title, poll.id);
    Ok(Json(poll))
}

#[delete("/api/polls/<poll_id>")]
async fn delete_poll(
    _token: AuthToken<Admin>,
    poll_id: Id,
    store: &State<Store>,
) -> Result<Json<Ack>> {
    store.remove_poll(&poll_id).await?;
    Ok(Ack::ok())
}

/// Results are public once a poll is approved. Admins see them earlier.
#[get("/api/polls/<poll_id>/results", rank = 2)]
async fn poll_results(
    token: Option<AuthToken<Admin>>,
    poll_id: Id,
    store: &State<Store>,
) -> Result<Json<PollTally>> {
    let registry = store.registry.read().await;
    let poll = registry
        .poll(&poll_id)
        .filter(|poll| token.is_some() || poll.is_open())
        .ok_or_else(|| Error::not_found(format!("Poll {poll_id}")))?;
    let tally = store.ledger.read().await.poll_tally(poll);
    Ok(Json(tally))
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::serde_json::json,
    };

    use crate::model::{user::Registration, vote::PollVoteRequest};

    use super::*;

    async fn create(client: &Client, new_poll: &NewPoll) -> (Status, Option<Poll>) {
        let response = client
            .post(uri!(create_poll))
            .header(ContentType::JSON)
            .body(json!(new_poll).to_string())
            .dispatch()
            .await;
        let status = response.status();
        (status, response.into_json().await)
    }

    async fn list(client: &Client) -> Vec<PollSummary> {
        client
            .get("/api/polls")
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap()
    }

    #[backend_test(user)]
    async fn user_polls_await_approval(client: Client) {
        let (status, poll) = create(&client, &NewPoll::example()).await;
        assert_eq!(Status::Ok, status);
        let poll = poll.unwrap();
        assert!(!poll.approved);
        assert_eq!(poll.options.len(), 2);

        // Hidden from the public list and the share link until approved.
        assert!(list(&client).await.is_empty());
        let response = client
            .get(uri!(shared_poll(poll.share_code.as_str())))
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());

        // But reachable by id.
        let response = client.get(uri!(get_poll(&poll.id))).dispatch().await;
        assert_eq!(Status::Ok, response.status());

        // Its results stay hidden too.
        let response = client.get(uri!(poll_results(&poll.id))).dispatch().await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test(user)]
    async fn user_cannot_create_political_poll(client: Client) {
        let mut new_poll = NewPoll::example();
        new_poll.kind = PollKind::Political;

        let (status, _) = create(&client, &new_poll).await;
        assert_eq!(Status::Forbidden, status);
    }

    #[backend_test(user)]
    async fn poll_needs_two_options(client: Client) {
        let (status, _) = create(&client, &NewPoll::with_options(&["Only", " "])).await;
        assert_eq!(Status::BadRequest, status);
    }

    #[backend_test(admin)]
    async fn admin_polls_are_approved(client: Client) {
        let (status, poll) = create(&client, &NewPoll::example()).await;
        assert_eq!(Status::Ok, status);
        let poll = poll.unwrap();
        assert!(poll.approved);

        let response = client
            .get(uri!(shared_poll(poll.share_code.as_str())))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let shared: Poll = response.into_json().await.unwrap();
        assert_eq!(shared.id, poll.id);
    }

    #[backend_test(admin)]
    async fn admin_sees_and_approves_pending(client: Client) {
        let poll_id = {
            let store = client.rocket().state::<Store>().unwrap();
            let mut registry = store.registry.write().await;
            registry
                .add_poll(NewPoll::example(), false)
                .unwrap()
                .id
                .clone()
        };

        let pending = client
            .get("/api/polls?approved=false")
            .dispatch()
            .await
            .into_json::<Vec<PollSummary>>()
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);

        // Admins can follow results before approval.
        let response = client.get(uri!(poll_results(&poll_id))).dispatch().await;
        assert_eq!(Status::Ok, response.status());

        let response = client
            .post(uri!(approve_poll(&poll_id)))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let poll: Poll = response.into_json().await.unwrap();
        assert!(poll.approved);

        let pending = client
            .get("/api/polls?approved=false")
            .dispatch()
            .await
            .into_json::<Vec<PollSummary>>()
            .await
            .unwrap();
        assert!(pending.is_empty());
    }

    #[backend_test(user)]
    async fn approve_requires_admin(client: Client) {
        let (_, poll) = create(&client, &NewPoll::example()).await;
        let poll = poll.unwrap();

        let response = client
            .post(uri!(approve_poll(&poll.id)))
            .dispatch()
            .await;
        assert_eq!(Status::Forbidden, response.status());
    }

    #[backend_test]
    async fn results_three_to_one(client: Client) {
        let store = client.rocket().state::<Store>().unwrap();
        let poll_id = store
            .registry
            .write()
            .await
            .add_poll(NewPoll::with_options(&["A", "B"]), true)
            .unwrap()
            .id
            .clone();
        for (i, option) in ["opt1", "opt1", "opt1", "opt2"].into_iter().enumerate() {
            let user = store
                .register(Registration::named(&format!("voter{i}")))
                .await
                .unwrap();
            store
                .cast_poll_vote(
                    &user.id,
                    PollVoteRequest {
                        user_id: None,
                        user_name: None,
                        poll_id: poll_id.clone(),
                        option_id: option.into(),
                        option_text: None,
                    },
                )
                .await
                .unwrap();
        }

        let response = client.get(uri!(poll_results(&poll_id))).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let tally: PollTally = response.into_json().await.unwrap();
        assert_eq!(tally.total, 4);
        assert_eq!(tally.options[0].votes, 3);
        assert_eq!(tally.options[0].percent, 75.0);
        assert_eq!(tally.options[1].votes, 1);
        assert_eq!(tally.options[1].percent, 25.0);

        let summaries = list(&client).await;
        assert_eq!(summaries[0].votes, 4);
    }

    #[backend_test(admin)]
    async fn delete_poll_and_votes(client: Client) {
        let (_, poll) = create(&client, &NewPoll::example()).await;
        let poll = poll.unwrap();
        client
            .post("/api/poll-vote")
            .header(ContentType::JSON)
            .body(json!({ "pollId": &poll.id, "optionId": "opt1" }).to_string())
            .dispatch()
            .await;

        let response = client.delete(uri!(delete_poll(&poll.id))).dispatch().await;
        assert_eq!(Status::Ok, response.status());

        let response = client.get(uri!(get_poll(&poll.id))).dispatch().await;
        assert_eq!(Status::NotFound, response.status());
        let store = client.rocket().state::<Store>().unwrap();
        assert!(store.ledger.read().await.poll_votes().is_empty());
    }
}
