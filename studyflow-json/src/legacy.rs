//! Decoding of persisted deck arrays, including records written by older
//! versions: numeric ids, loosely shaped `state` objects, and `nextReview`
//! stored either as epoch milliseconds or as an RFC 3339 string.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use studyflow_core::{
    CoreError, Deck, Flashcard, SchedulingState, EASE_DEFAULT, EASE_MAX, EASE_MIN, INTERVAL_MAX,
};
use uuid::Uuid;

#[derive(Deserialize)]
struct RawDeck {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    cards: Option<Vec<RawCard>>,
}

#[derive(Deserialize)]
struct RawCard {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    front: Option<String>,
    #[serde(default)]
    back: Option<String>,
    #[serde(default)]
    state: Value,
    #[serde(default, rename = "nextReview")]
    next_review: Value,
}

pub fn decode_decks(json: &str) -> Result<Vec<Deck>, CoreError> {
    let raw: Vec<RawDeck> =
        serde_json::from_str(json).map_err(|_| CoreError::Storage("malformed deck file"))?;
    Ok(raw.into_iter().map(migrate_deck).collect())
}

pub fn encode_decks(decks: &[Deck]) -> Result<Vec<u8>, CoreError> {
    serde_json::to_vec_pretty(decks).map_err(|_| CoreError::Storage("serialize"))
}

fn migrate_deck(raw: RawDeck) -> Deck {
    let id = migrate_id(&raw.id, "deck");
    let cards = raw
        .cards
        .unwrap_or_default()
        .into_iter()
        .map(migrate_card)
        .collect();
    Deck {
        id,
        name: raw.name.unwrap_or_default(),
        cards,
    }
}

fn migrate_card(raw: RawCard) -> Flashcard {
    let id = migrate_id(&raw.id, "card");
    let state = migrate_state(&id, &raw.state);
    let next_review = migrate_timestamp(&id, &raw.next_review);
    Flashcard {
        id,
        front: raw.front.unwrap_or_default(),
        back: raw.back.unwrap_or_default(),
        state,
        next_review,
    }
}

fn migrate_id(v: &Value, kind: &'static str) -> String {
    match v {
        Value::String(s) if !s.is_empty() => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => {
            let id = Uuid::new_v4().to_string();
            tracing::warn!(kind, %id, "record without id, assigned a new one");
            id
        }
    }
}

fn migrate_state(card_id: &str, v: &Value) -> Option<SchedulingState> {
    let map = match v {
        Value::Null => return None,
        Value::Object(map) => map,
        _ => {
            tracing::warn!(card = card_id, "dropping non-object scheduling state");
            return None;
        }
    };

    let interval = map.get("interval").and_then(Value::as_f64);
    let ease = map.get("ease").and_then(Value::as_f64);
    let repetitions = map.get("repetitions").and_then(Value::as_f64);

    let state = SchedulingState::new(
        interval.map(|x| x.round().max(1.0) as u32).unwrap_or(1),
        ease.unwrap_or(EASE_DEFAULT),
        repetitions.map(|x| x.max(0.0) as u32).unwrap_or(0),
    );

    let incomplete = interval.is_none() || ease.is_none() || repetitions.is_none();
    let out_of_range = interval.map(|x| !(1.0..=INTERVAL_MAX as f64).contains(&x)).unwrap_or(false)
        || ease.map(|e| !(EASE_MIN..=EASE_MAX).contains(&e)).unwrap_or(false)
        || repetitions.map(|x| x < 0.0).unwrap_or(false);
    if incomplete || out_of_range {
        tracing::warn!(card = card_id, ?state, "repaired legacy scheduling state");
    }
    Some(state)
}

fn migrate_timestamp(card_id: &str, v: &Value) -> Option<DateTime<Utc>> {
    let parsed = match v {
        Value::Null => return None,
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| s.trim().parse::<i64>().ok().and_then(DateTime::<Utc>::from_timestamp_millis)),
        _ => None,
    };
    if parsed.is_none() {
        tracing::warn!(card = card_id, "dropping unreadable nextReview");
    }
    parsed
}
