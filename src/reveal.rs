//! Staggered text reveal timing for the landing page headline.
//!
//! Pure scheduling only: the page turns each step into a span with an
//! animation delay, and the sequence's `completes_at` is when the last span
//! finishes.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevealUnit {
    #[default]
    Words,
    Letters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevealDirection {
    /// Segments drop in from above.
    #[default]
    Top,
    Bottom,
}

impl RevealDirection {
    /// Vertical offset in pixels a segment starts from.
    pub fn entry_offset(self) -> i32 {
        match self {
            Self::Top => -50,
            Self::Bottom => 50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealOptions {
    pub unit: RevealUnit,
    pub direction: RevealDirection,
    /// Gap between the start of consecutive segments.
    pub delay: Duration,
    pub duration: Duration,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            unit: RevealUnit::default(),
            direction: RevealDirection::default(),
            delay: Duration::from_millis(200),
            duration: Duration::from_millis(800),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealStep {
    pub index: usize,
    pub segment: String,
    pub start: Duration,
    pub end: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealSequence {
    pub steps: Vec<RevealStep>,
    pub entry_offset: i32,
    pub completes_at: Duration,
}

pub fn schedule(text: &str, options: &RevealOptions) -> RevealSequence {
    let segments: Vec<String> = if text.is_empty() {
        Vec::new()
    } else {
        match options.unit {
            RevealUnit::Words => text.split(' ').map(str::to_owned).collect(),
            // Spaces would collapse inside inline-block spans.
            RevealUnit::Letters => text
                .chars()
                .map(|ch| if ch == ' ' { '\u{a0}' } else { ch })
                .map(String::from)
                .collect(),
        }
    };

    let steps: Vec<RevealStep> = segments
        .into_iter()
        .enumerate()
        .map(|(index, segment)| {
            let start = u32::try_from(index)
                .ok()
                .and_then(|i| options.delay.checked_mul(i))
                .unwrap_or(Duration::MAX);
            RevealStep {
                index,
                segment,
                start,
                end: start.saturating_add(options.duration),
            }
        })
        .collect();

    let completes_at = steps.last().map_or(Duration::ZERO, |step| step.end);
    RevealSequence {
        steps,
        entry_offset: options.direction.entry_offset(),
        completes_at,
    }
}
