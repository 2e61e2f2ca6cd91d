use axum::{http::StatusCode, response::Html, routing::get, Router};

use crate::state::AppState;

const LOGIN_PAGE: &str = include_str!("../public/index.html");
const REGISTER_PAGE: &str = include_str!("../public/register.html");
const HOME_PAGE: &str = include_str!("../public/home.html");

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(login_page).fallback(fallback))
        .route("/home", get(home_page).fallback(fallback))
}

pub async fn login_page() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

pub async fn register_page() -> Html<&'static str> {
    Html(REGISTER_PAGE)
}

pub async fn home_page() -> Html<&'static str> {
    Html(HOME_PAGE)
}

/// Unmatched paths, and unrouted methods on known paths, get the login
/// page with a 404.
pub async fn fallback() -> (StatusCode, Html<&'static str>) {
    (StatusCode::NOT_FOUND, Html(LOGIN_PAGE))
}
