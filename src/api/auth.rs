use rocket::{
    http::{Cookie, CookieJar, Status},
    serde::json::Json,
    Route, State,
};

use crate::{
    config::Config,
    error::Result,
    model::{
        auth::{Admin, AuthToken, Member, AUTH_TOKEN_COOKIE},
        user::{Credentials, Registration, UserView},
    },
    store::Store,
};

pub fn routes() -> Vec<Route> {
    routes![register, login, logout, me, users]
}

/// Create a regular user account and sign in as it.
#[post("/api/auth/register", data = "<registration>", format = "json")]
pub async fn register(
    cookies: &CookieJar<'_>,
    registration: Json<Registration>,
    store: &State<Store>,
    config: &State<Config>,
) -> Result<Json<UserView>> {
    let user = store.register(registration.0).await?;
    cookies.add(AuthToken::<Member>::new(&user).into_cookie(config));
    Ok(Json(UserView::from(&user)))
}

#[post("/api/auth/login", data = "<credentials>", format = "json")]
pub async fn login(
    cookies: &CookieJar<'_>,
    credentials: Json<Credentials>,
    store: &State<Store>,
    config: &State<Config>,
) -> Result<Json<UserView>> {
    let user = store.login(&credentials).await?;
    cookies.add(AuthToken::<Member>::new(&user).into_cookie(config));
    Ok(Json(UserView::from(&user)))
}

#[delete("/api/auth")]
pub fn logout(cookies: &CookieJar<'_>) -> Status {
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
    Status::Ok
}

#[get("/api/auth/me")]
pub async fn me(token: AuthToken<Member>, store: &State<Store>) -> Result<Json<UserView>> {
    let user = store.user(token.id()).await?;
    Ok(Json(UserView::from(&user)))
}

#[get("/api/users")]
pub async fn users(_token: AuthToken<Admin>, store: &State<Store>) -> Json<Vec<UserView>> {
    let registry = store.registry.read().await;
    Json(registry.users().iter().map(UserView::from).collect())
}
