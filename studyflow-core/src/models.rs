use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::CoreError;

pub type DeckId = String;
pub type CardId = String;

pub const EASE_MIN: f64 = 1.3;
pub const EASE_MAX: f64 = 3.0;
pub const EASE_DEFAULT: f64 = 2.5;
/// Longest interval ever scheduled, about a century.
pub const INTERVAL_MAX: u32 = 36_500;

/// Self-assessed recall quality for a reviewed card.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Again,
    Hard,
    Good,
    Easy,
}

impl Grade {
    pub const ALL: [Grade; 4] = [Grade::Again, Grade::Hard, Grade::Good, Grade::Easy];

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Again => "again",
            Grade::Hard => "hard",
            Grade::Good => "good",
            Grade::Easy => "easy",
        }
    }
}

impl FromStr for Grade {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "a" | "again" => Ok(Grade::Again),
            "2" | "h" | "hard" => Ok(Grade::Hard),
            "3" | "g" | "good" => Ok(Grade::Good),
            "4" | "e" | "easy" => Ok(Grade::Easy),
            _ => Err(CoreError::Invalid("grade must be again, hard, good or easy")),
        }
    }
}

/// Ease/interval/repetitions triple carried by a reviewed card.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct SchedulingState {
    /// Whole days until the next review, within `[1, INTERVAL_MAX]`.
    pub interval: u32,
    /// Growth multiplier, always within `[EASE_MIN, EASE_MAX]`.
    pub ease: f64,
    pub repetitions: u32,
}

impl SchedulingState {
    pub fn new(interval: u32, ease: f64, repetitions: u32) -> Self {
        Self {
            interval: interval.clamp(1, INTERVAL_MAX),
            ease: clamp_ease(ease),
            repetitions,
        }
    }
}

impl Default for SchedulingState {
    fn default() -> Self {
        Self {
            interval: 1,
            ease: EASE_DEFAULT,
            repetitions: 0,
        }
    }
}

pub fn clamp_ease(ease: f64) -> f64 {
    if ease.is_nan() {
        return EASE_MIN;
    }
    ease.clamp(EASE_MIN, EASE_MAX)
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Flashcard {
    pub id: CardId,
    pub front: String,
    pub back: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<SchedulingState>,
    #[serde(
        rename = "nextReview",
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub next_review: Option<DateTime<Utc>>,
}

impl Flashcard {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            front: front.into(),
            back: back.into(),
            state: None,
            next_review: None,
        }
    }

    /// Cards that were never reviewed carry no `nextReview` and count as due.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review.map(|at| at <= now).unwrap_or(true)
    }

    pub fn scheduling_state(&self) -> SchedulingState {
        self.state.unwrap_or_default()
    }

    pub fn apply(&mut self, patch: &CardPatch) {
        if let Some(front) = &patch.front {
            self.front = front.clone();
        }
        if let Some(back) = &patch.back {
            self.back = back.clone();
        }
        if let Some(state) = patch.state {
            self.state = Some(state);
        }
        if let Some(at) = patch.next_review {
            self.next_review = Some(at);
        }
    }
}

/// Partial card update handed to the deck-update collaborator.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CardPatch {
    pub front: Option<String>,
    pub back: Option<String>,
    pub state: Option<SchedulingState>,
    pub next_review: Option<DateTime<Utc>>,
}

impl CardPatch {
    pub fn scheduling(state: SchedulingState, next_review: DateTime<Utc>) -> Self {
        Self {
            state: Some(state),
            next_review: Some(next_review),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.front.is_none()
            && self.back.is_none()
            && self.state.is_none()
            && self.next_review.is_none()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Deck {
    pub id: DeckId,
    pub name: String,
    #[serde(default)]
    pub cards: Vec<Flashcard>,
}

impl Deck {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            cards: Vec::new(),
        }
    }

    pub fn card(&self, id: &str) -> Option<&Flashcard> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn due_count(&self, now: DateTime<Utc>) -> usize {
        self.cards.iter().filter(|c| c.is_due(now)).count()
    }
}
