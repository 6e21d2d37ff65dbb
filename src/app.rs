use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/join", post(handlers::join))
        .route("/api/waitlist", post(handlers::create_signup))
        .route("/api/waitlist/count", get(handlers::count_signups))
        .with_state(state)
}
