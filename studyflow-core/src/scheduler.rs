use crate::{clamp_ease, Flashcard, Grade, SchedulingState, EASE_MIN, INTERVAL_MAX};
use chrono::{DateTime, Duration, Utc};

const HARD_INTERVAL_FACTOR: f64 = 1.2;
const EASY_BONUS: f64 = 1.3;
const AGAIN_EASE_PENALTY: f64 = 0.2;
const HARD_EASE_PENALTY: f64 = 0.15;
const EASY_EASE_BONUS: f64 = 0.15;

pub struct ScheduleOutcome {
    pub state: SchedulingState,
    pub next_review: DateTime<Utc>,
}

fn round_days(x: f64) -> u32 {
    let r = x.round();
    if r <= 0.0 {
        0
    } else if r >= u32::MAX as f64 {
        u32::MAX
    } else {
        r as u32
    }
}

/// Maps a scheduling state and a grade to the next state. Pure; knows nothing
/// about wall-clock time.
pub fn schedule(state: SchedulingState, grade: Grade) -> SchedulingState {
    let SchedulingState {
        interval,
        ease,
        repetitions,
    } = state;

    let (interval, ease, repetitions) = match grade {
        Grade::Again => (1, (ease - AGAIN_EASE_PENALTY).max(EASE_MIN), 0),
        Grade::Hard => (
            round_days(interval as f64 * HARD_INTERVAL_FACTOR).max(1),
            (ease - HARD_EASE_PENALTY).max(EASE_MIN),
            repetitions.max(1),
        ),
        Grade::Good => (
            round_days(interval as f64 * ease),
            ease,
            repetitions.saturating_add(1),
        ),
        Grade::Easy => (
            round_days(interval as f64 * ease * EASY_BONUS),
            ease + EASY_EASE_BONUS,
            repetitions.saturating_add(1),
        ),
    };

    SchedulingState {
        interval: interval.clamp(1, INTERVAL_MAX),
        ease: clamp_ease(ease),
        repetitions,
    }
}

/// `now` plus whole days, saturating at the latest representable instant.
pub fn next_review_at(now: DateTime<Utc>, interval_days: u32) -> DateTime<Utc> {
    now.checked_add_signed(Duration::days(interval_days as i64))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Grades `card` at `now`. Cards without a state start from the default one.
pub fn review(card: &Flashcard, grade: Grade, now: DateTime<Utc>) -> ScheduleOutcome {
    let state = schedule(card.scheduling_state(), grade);
    ScheduleOutcome {
        state,
        next_review: next_review_at(now, state.interval),
    }
}
