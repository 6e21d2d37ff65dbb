use crate::controller::{FormView, SubmissionState};
use crate::counter::Counter;
use crate::reveal::{schedule, RevealOptions};
use askama::Template;
use std::time::Duration;

pub const HEADLINE: &str = "Unlock Data Value.";
pub const JOINED_MESSAGE: &str = "Successfully joined the waitlist!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageNotice {
    /// The page reloads itself once the form would reopen.
    Joined { reset_after: Duration },
    Alert(&'static str),
}

struct HeadlineSpan {
    segment: String,
    delay_ms: u128,
    duration_ms: u128,
}

/// Landing page.
#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate<'a> {
    refresh_secs: Option<u64>,
    headline: Vec<HeadlineSpan>,
    entry_offset: i32,
    first_name: &'a str,
    email: &'a str,
    disabled: bool,
    button: &'static str,
    joined: bool,
    joined_message: &'static str,
    alert: Option<&'static str>,
    count: String,
}

pub fn render_index(view: &FormView, counter: Counter, notice: Option<PageNotice>) -> String {
    let button = match view.state {
        SubmissionState::Submitting => "Joining...",
        SubmissionState::Succeeded => "You are in!",
        SubmissionState::Idle | SubmissionState::Failed(_) => "Join Waitlist",
    };
    let sequence = schedule(HEADLINE, &RevealOptions::default());
    let headline = sequence
        .steps
        .into_iter()
        .map(|step| HeadlineSpan {
            delay_ms: step.start.as_millis(),
            duration_ms: (step.end - step.start).as_millis(),
            segment: step.segment,
        })
        .collect();

    let template = IndexTemplate {
        refresh_secs: match notice {
            Some(PageNotice::Joined { reset_after }) => Some(reset_after.as_secs()),
            _ => None,
        },
        headline,
        entry_offset: sequence.entry_offset,
        first_name: &view.first_name,
        email: &view.email,
        disabled: view.disabled,
        button,
        joined: matches!(notice, Some(PageNotice::Joined { .. })),
        joined_message: JOINED_MESSAGE,
        alert: match notice {
            Some(PageNotice::Alert(message)) => Some(message),
            _ => None,
        },
        count: counter.to_string(),
    };
    template
        .render()
        .unwrap_or_else(|e| format!("Template error: {e}"))
}
