use rocket::{serde::json::Json, Route, State};

use crate::{
    error::Result,
    model::{
        auth::{Admin, AuthToken},
        candidate::{Candidate, CandidateFilter, NewCandidate},
        id::Id,
    },
    store::Store,
};

use super::common::Ack;

pub fn routes() -> Vec<Route> {
    routes![candidates, all_candidates, create_candidate, delete_candidate]
}

#[get("/api/candidates?<filter..>")]
async fn candidates(filter: CandidateFilter, store: &State<Store>) -> Json<Vec<Candidate>> {
    let registry = store.registry.read().await;
    let candidates = registry
        .candidates()
        .iter()
        .filter(|candidate| filter.matches(candidate))
        .cloned()
        .collect();
    Json(candidates)
}

#[get("/api/all-candidates")]
async fn all_candidates(store: &State<Store>) -> Json<Vec<Candidate>> {
    Json(store.registry.read().await.candidates().to_vec())
}

#[post("/api/candidates", data = "<new_candidate>", format = "json")]
async fn create_candidate(
    _token: AuthToken<Admin>,
    new_candidate: Json<NewCandidate>,
    store: &State<Store>,
) -> Result<Json<Candidate>> {
    let candidate = store.add_candidate(new_candidate.0).await?;
    Ok(Json(candidate))
}

#[delete("/api/candidates/<candidate_id>")]
async fn delete_candidate(
    _token: AuthToken<Admin>,
    candidate_id: Id,
    store: &State<Store>,
) -> Result<Json<Ack>> {
    store.remove_candidate(&candidate_id).await?;
    Ok(Ack::ok())
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::serde_json::json,
    };

    use crate::model::candidate::Office;

    use super::*;

    #[backend_test]
    async fn seeded_candidates(client: Client) {
        let response = client.get(uri!(all_candidates)).dispatch().await;

        assert_eq!(Status::Ok, response.status());
        let candidates: Vec<Candidate> = response.into_json().await.unwrap();
        assert_eq!(candidates, Candidate::seed());
    }

    #[backend_test]
    async fn filter_candidates(client: Client) {
        let response = client
            .get("/api/candidates?country=brazil&state=rio%20de%20janeiro")
            .dispatch()
            .await;

        assert_eq!(Status::Ok, response.status());
        let candidates: Vec<Candidate> = response.into_json().await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name, "Pedro Oliveira");

        let response = client
            .get("/api/candidates?role=Governor")
            .dispatch()
            .await;
        let candidates: Vec<Candidate> = response.into_json().await.unwrap();
        assert!(candidates.is_empty());
    }

    #[backend_test(admin)]
    async fn create_and_delete_candidate(client: Client) {
        let response = client
            .post(uri!(create_candidate))
            .header(ContentType::JSON)
            .body(json!(NewCandidate::example()).to_string())
            .dispatch()
            .await;

        assert_eq!(Status::Ok, response.status());
        let candidate: Candidate = response.into_json().await.unwrap();
        assert_eq!(candidate.role, Office::Governor);

        let response = client
            .delete(uri!(delete_candidate(&candidate.id)))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let ack: Ack = response.into_json().await.unwrap();
        assert!(ack.success);

        // Already gone.
        let response = client
            .delete(uri!(delete_candidate(&candidate.id)))
            .dispatch()
            .await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test(user)]
    async fn create_candidate_requires_admin(client: Client) {
        let response = client
            .post(uri!(create_candidate))
            .header(ContentType::JSON)
            .body(json!(NewCandidate::example()).to_string())
            .dispatch()
            .await;

        assert_eq!(Status::Forbidden, response.status());
    }

    #[backend_test]
    async fn delete_candidate_requires_sign_in(client: Client) {
        let response = client
            .delete(uri!(delete_candidate(Id::from("1"))))
            .dispatch()
            .await;

        assert_eq!(Status::Unauthorized, response.status());
    }
}
