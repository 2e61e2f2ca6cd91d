use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest},
        error::CredentialError,
        extractors::FormOrJson,
    },
    pages,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/register",
            get(pages::register_page)
                .post(register)
                .fallback(pages::fallback),
        )
        .route("/login", post(login).fallback(pages::fallback))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    FormOrJson(payload): FormOrJson<RegisterRequest>,
) -> Result<&'static str, CredentialError> {
    state.credentials.register(payload).await?;
    Ok("Registration Successful")
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    FormOrJson(payload): FormOrJson<LoginRequest>,
) -> Result<String, CredentialError> {
    let LoginRequest { username, password } = payload;
    let full_name = state.credentials.authenticate(&username, password).await?;
    Ok(format!("Welcome back, {full_name}!"))
}
