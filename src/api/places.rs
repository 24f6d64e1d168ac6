use rocket::{serde::json::Json, Route, State};

use crate::{model::reference::PlaceName, store::Store};

pub fn routes() -> Vec<Route> {
    routes![countries, states, cities]
}

#[get("/api/countries")]
fn countries(store: &State<Store>) -> Json<Vec<PlaceName>> {
    Json(store.reference().countries())
}

#[get("/api/states?<country>")]
fn states(country: Option<&str>, store: &State<Store>) -> Json<Vec<PlaceName>> {
    Json(store.reference().states(country.unwrap_or_default()))
}

#[get("/api/cities?<country>&<state>")]
fn cities(
    country: Option<&str>,
    state: Option<&str>,
    store: &State<Store>,
) -> Json<Vec<PlaceName>> {
    Json(
        store
            .reference()
            .cities(country.unwrap_or_default(), state.unwrap_or_default()),
    )
}
