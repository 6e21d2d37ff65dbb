use crate::controller::{Field, Settlement};
use crate::counter::Counter;
use crate::errors::AppError;
use crate::models::{CountResponse, JoinForm, SignupRecord, SignupRequest};
use crate::state::AppState;
use crate::store::{InsertOutcome, RecordStore};
use crate::ui::{render_index, PageNotice};
use axum::{extract::State, http::StatusCode, response::Html, Form, Json};
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

// How long a form post waits for the counter to catch up before rendering.
const COUNTER_CATCH_UP: Duration = Duration::from_millis(500);

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let view = state.controller().view();
    Html(render_index(&view, state.counter.current(), None))
}

pub async fn join(State(state): State<AppState>, Form(form): Form<JoinForm>) -> Html<String> {
    let updates = state.counter.subscribe();
    let before = state.counter.current().value();
    let mut controller = state.controller();
    controller.update_field(Field::FirstName, form.first_name);
    controller.update_field(Field::Email, form.email);

    let notice = match controller.submit().await {
        Some(settlement @ (Settlement::Joined | Settlement::AlreadyJoined)) => {
            // A fresh insert is only visible once the count moves past `before`.
            let floor = match settlement {
                Settlement::Joined => before.unwrap_or(0).saturating_add(1),
                _ => 0,
            };
            await_counter(updates, floor).await;
            Some(PageNotice::Joined {
                reset_after: state.reset_after,
            })
        }
        Some(Settlement::Failed { notice }) => Some(PageNotice::Alert(notice)),
        None => Some(PageNotice::Alert("Please enter your first name and email.")),
    };

    Html(render_index(
        &controller.view(),
        state.counter.current(),
        notice,
    ))
}

async fn await_counter(mut updates: watch::Receiver<Counter>, floor: u64) {
    let caught_up = updates.wait_for(|counter| counter.value().is_some_and(|count| count >= floor));
    match tokio::time::timeout(COUNTER_CATCH_UP, caught_up).await {
        Ok(Ok(_)) => {}
        Ok(Err(_)) => debug!("counter closed before catching up"),
        Err(_) => debug!(floor, "counter still behind, rendering last known value"),
    }
}

pub async fn create_signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupRecord>), AppError> {
    match state.store.insert(&payload).await? {
        InsertOutcome::Inserted(record) => {
            state.settled.notify();
            Ok((StatusCode::CREATED, Json(record)))
        }
        InsertOutcome::Conflict => Err(AppError::conflict(
            "duplicate key value violates unique constraint on email",
        )),
    }
}

pub async fn count_signups(State(state): State<AppState>) -> Result<Json<CountResponse>, AppError> {
    let count = state.store.count().await?;
    Ok(Json(CountResponse { count }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::FileStore;
    use std::sync::Arc;

    async fn mounted_state(label: &str) -> (AppState, std::path::PathBuf) {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!(
            "waitlist_handlers_{label}_{}_{nanos}.json",
            std::process::id()
        ));
        let store = FileStore::open(path.clone()).await.unwrap();
        let state = AppState::new(store, Duration::from_secs(5));
        Arc::clone(&state.counter).mount(state.settled.subscribe());
        (state, path)
    }

    fn form(first_name: &str, email: &str) -> Form<JoinForm> {
        Form(JoinForm {
            first_name: first_name.to_owned(),
            email: email.to_owned(),
        })
    }

    #[tokio::test]
    async fn joined_page_shows_the_refreshed_count() {
        let (state, path) = mounted_state("joined").await;

        let Html(html) = join(State(state.clone()), form("Ada", "ada@example.com")).await;
        assert!(html.contains(r#"<strong id="count">1</strong>"#));

        let Html(html) = join(State(state.clone()), form("Ada", "ada@example.com")).await;
        assert!(html.contains(r#"<strong id="count">1</strong>"#));

        let Html(html) = join(State(state.clone()), form("Grace", "grace@example.com")).await;
        assert!(html.contains(r#"<strong id="count">2</strong>"#));
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_counter_gives_up_after_catch_up_window() {
        let (_tx, updates) = watch::channel(Counter::Known(3));

        let started = tokio::time::Instant::now();
        await_counter(updates, 4).await;
        assert_eq!(started.elapsed(), COUNTER_CATCH_UP);
    }

    #[tokio::test(start_paused = true)]
    async fn counter_already_at_floor_returns_immediately() {
        let (_tx, updates) = watch::channel(Counter::Known(4));

        let started = tokio::time::Instant::now();
        await_counter(updates, 4).await;
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
