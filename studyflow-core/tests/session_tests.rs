use chrono::{Duration, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use studyflow_core::{
    memory::MemoryRepo, CoreError, Deck, Flashcard, Grade, HapticStyle, Haptics, MotionSample,
    Repository, ReviewQueue, SessionState, StudySession, TickOutcome,
};
use tokio::sync::mpsc;

#[derive(Default)]
struct RecordingHaptics {
    pulses: Mutex<Vec<HapticStyle>>,
}

impl Haptics for RecordingHaptics {
    fn vibrate(&self, style: HapticStyle) -> Result<(), CoreError> {
        self.pulses.lock().push(style);
        Ok(())
    }
}

struct BrokenHaptics;

impl Haptics for BrokenHaptics {
    fn vibrate(&self, _style: HapticStyle) -> Result<(), CoreError> {
        Err(CoreError::Invalid("no vibration motor"))
    }
}

fn deck_with(n: usize) -> Deck {
    let mut deck = Deck::new("Spanish");
    for i in 0..n {
        deck.cards.push(Flashcard::new(format!("q{i}"), format!("a{i}")));
    }
    deck
}

fn session_over(deck: &Deck) -> (StudySession, Arc<MemoryRepo>) {
    let repo = Arc::new(MemoryRepo::with_decks(vec![deck.clone()]));
    let session = StudySession::new(repo.clone());
    (session, repo)
}

#[tokio::test]
async fn starts_idle_and_browses_after_load() {
    let deck = deck_with(2);
    let (mut s, _) = session_over(&deck);
    assert_eq!(s.state(), SessionState::Idle);
    assert!(s.reveal().is_err());
    assert!(s.current_card().is_none());

    s.load_deck(deck, Utc::now());
    assert_eq!(s.state(), SessionState::Browsing);
    assert_eq!(s.current_card().unwrap().front, "q0");

    s.reveal().unwrap();
    assert_eq!(s.state(), SessionState::Revealed);
    s.next();
    assert_eq!(s.state(), SessionState::Browsing);
    assert_eq!(s.current_card().unwrap().front, "q1");

    s.unload();
    assert_eq!(s.state(), SessionState::Idle);
    assert!(s.is_done());
}

#[tokio::test]
async fn grading_persists_through_the_repository() {
    let deck = deck_with(2);
    let (mut s, repo) = session_over(&deck);
    let haptics = Arc::new(RecordingHaptics::default());
    s = s.with_haptics(haptics.clone());
    let now = Utc::now();
    s.load_deck(deck.clone(), now);

    // grading needs the answer on screen
    let err = s.grade(Grade::Good, now).await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidState(_)));

    s.reveal().unwrap();
    let graded = s.grade(Grade::Good, now).await.unwrap();
    let state = graded.state.unwrap();
    assert_eq!(state.interval, 3);
    assert_eq!(state.repetitions, 1);
    assert_eq!(graded.next_review, Some(now + Duration::days(3)));

    let stored = repo.get_deck(&deck.id).await.unwrap();
    assert_eq!(stored.cards[0].state, Some(state));
    // the caller's snapshot is untouched
    assert!(deck.cards[0].state.is_none());

    assert_eq!(s.state(), SessionState::Browsing);
    assert_eq!(s.current_index(), 1);
    assert_eq!(s.totals().good, 1);
    assert_eq!(*haptics.pulses.lock(), vec![HapticStyle::Light]);
}

#[tokio::test]
async fn free_review_refuses_to_schedule() {
    let deck = deck_with(1);
    let (mut s, _) = session_over(&deck);
    s.load_deck(deck, Utc::now());
    s.enter_free_review();
    s.reveal().unwrap();
    let err = s.grade(Grade::Easy, Utc::now()).await.unwrap_err();
    assert!(matches!(err, CoreError::InvalidState(_)));
}

#[tokio::test]
async fn retiring_grades_ends_the_session_after_failed_cards_return() {
    let deck = deck_with(2);
    let (mut s, _) = session_over(&deck);
    let now = Utc::now();
    s.load_deck(deck, now);

    s.reveal().unwrap();
    s.grade_and_retire(Grade::Again, now).await.unwrap();
    s.reveal().unwrap();
    s.grade_and_retire(Grade::Good, now).await.unwrap();

    // the failed card comes back once
    assert!(!s.is_done());
    assert_eq!(s.current_card().unwrap().front, "q0");
    s.reveal().unwrap();
    s.grade_and_retire(Grade::Hard, now).await.unwrap();

    assert!(s.is_done());
    assert!(s.current_card().is_none());
    assert_eq!(s.current_index(), 0);
    assert_eq!(s.totals().total, 3);
    assert_eq!(s.totals().again, 1);
}

#[tokio::test]
async fn exiting_free_review_returns_to_the_due_position() {
    let deck = deck_with(3);
    let (mut s, _) = session_over(&deck);
    s.load_deck(deck, Utc::now());
    s.next();
    assert_eq!(s.current_index(), 1);

    s.enter_free_review();
    assert!(s.is_free_review());
    assert_eq!(s.current_index(), 0);
    s.next();
    s.next();
    assert_eq!(s.current_index(), 2);

    s.exit_free_review();
    assert_eq!(s.current_index(), 1);
    assert_eq!(s.state(), SessionState::Browsing);
}

#[tokio::test]
async fn loading_another_deck_reinitializes_queues() {
    let deck = deck_with(3);
    let (mut s, _) = session_over(&deck);
    s.load_deck(deck, Utc::now());
    s.enter_free_review();
    s.next();
    s.mark_repeat();

    s.load_deck(deck_with(2), Utc::now());
    assert_eq!(s.free_queue().queue(), &[0, 1]);
    assert!(s.free_queue().repeat_queue().is_empty());
    assert_eq!(s.current_index(), 0);
}

#[tokio::test]
async fn empty_deck_is_reported_without_panicking() {
    let deck = deck_with(0);
    let (mut s, _) = session_over(&deck);
    s.load_deck(deck, Utc::now());
    assert!(s.is_empty_deck());
    assert!(s.is_done());
    assert_eq!(s.current_index(), 0);
    assert!(s.current_card().is_none());
    assert!(s.reveal().is_err());
    s.next();
    s.prev();
    s.mark_repeat();
}

#[tokio::test]
async fn shake_restarts_free_review_with_a_pulse() {
    let deck = deck_with(3);
    let (s, _) = session_over(&deck);
    let haptics = Arc::new(RecordingHaptics::default());
    let mut s = s.with_haptics(haptics.clone());
    s.load_deck(deck, Utc::now());
    s.enter_free_review();
    s.next();
    s.remove_current();

    let t0 = Instant::now();
    assert!(!s.on_motion(MotionSample::new(0.0, 0.0, 0.0), t0));
    // strong, but inside the debounce window
    assert!(!s.on_motion(MotionSample::new(30.0, 0.0, 0.0), t0 + std::time::Duration::from_millis(100)));
    // gentle motion after the window
    assert!(!s.on_motion(MotionSample::new(10.0, 5.0, 5.0), t0 + std::time::Duration::from_millis(500)));
    // strong motion after the window
    assert!(s.on_motion(MotionSample::new(-10.0, 5.0, 20.0), t0 + std::time::Duration::from_millis(950)));

    assert_eq!(s.free_queue().queue(), &[0, 1, 2]);
    assert_eq!(s.current_index(), 0);
    assert_eq!(*haptics.pulses.lock(), vec![HapticStyle::Heavy]);
}

#[tokio::test]
async fn shake_is_ignored_outside_free_review() {
    let deck = deck_with(2);
    let (mut s, _) = session_over(&deck);
    s.load_deck(deck, Utc::now());
    s.next();
    let t0 = Instant::now();
    s.on_motion(MotionSample::new(0.0, 0.0, 0.0), t0);
    assert!(!s.on_motion(MotionSample::new(50.0, 0.0, 0.0), t0 + std::time::Duration::from_secs(1)));
    assert_eq!(s.current_index(), 1);
}

#[tokio::test]
async fn haptic_failures_are_swallowed() {
    let deck = deck_with(1);
    let (s, _) = session_over(&deck);
    let mut s = s.with_haptics(Arc::new(BrokenHaptics));
    let now = Utc::now();
    s.load_deck(deck, now);
    s.reveal().unwrap();
    assert!(s.grade(Grade::Easy, now).await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn auto_flip_reveals_after_countdown() {
    let deck = deck_with(2);
    let (mut s, _) = session_over(&deck);
    s.load_deck(deck, Utc::now());
    let (tx, mut rx) = mpsc::unbounded_channel();

    let generation = s.arm_auto_flip(2, tx).unwrap();
    let t1 = rx.recv().await.unwrap();
    assert_eq!(t1.generation, generation);
    assert_eq!(s.on_tick(t1), TickOutcome::Counting(1));
    let t2 = rx.recv().await.unwrap();
    assert_eq!(s.on_tick(t2), TickOutcome::Flipped);
    assert_eq!(s.state(), SessionState::Revealed);
    assert!(!s.has_pending_timer());
}

#[tokio::test(start_paused = true)]
async fn navigation_tears_down_the_countdown() {
    let deck = deck_with(2);
    let (mut s, _) = session_over(&deck);
    s.load_deck(deck, Utc::now());
    let (tx, mut rx) = mpsc::unbounded_channel();

    let first = s.arm_auto_flip(1, tx.clone()).unwrap();
    s.next();
    assert!(!s.has_pending_timer());

    let second = s.arm_auto_flip(3, tx).unwrap();
    assert_ne!(first, second);

    // a tick from the superseded countdown is dropped
    let stale = studyflow_core::Tick { generation: first, remaining: 0 };
    assert_eq!(s.on_tick(stale), TickOutcome::Ignored);
    assert_eq!(s.state(), SessionState::Browsing);

    let tick = rx.recv().await.unwrap();
    assert_eq!(tick.generation, second);
    assert_eq!(s.on_tick(tick), TickOutcome::Counting(2));

    s.load_deck(deck_with(1), Utc::now());
    assert!(!s.has_pending_timer());
    assert!(s.arm_auto_flip(0, mpsc::unbounded_channel().0).is_none());
}

#[tokio::test]
async fn repeated_easy_grades_on_one_card_keep_working() {
    let deck = deck_with(1);
    let (mut s, repo) = session_over(&deck);
    let now = Utc::now();
    s.load_deck(deck, now);

    for _ in 0..30 {
        s.reveal().unwrap();
        s.grade(Grade::Easy, now).await.unwrap();
    }
    let stored = repo.list_decks().await.unwrap().remove(0).cards.remove(0);
    assert_eq!(stored.state.unwrap().interval, studyflow_core::INTERVAL_MAX);
    assert_eq!(s.totals().easy, 30);
}

#[tokio::test(start_paused = true)]
async fn countdown_is_rearmed_when_navigation_keeps_the_same_card() {
    let deck = deck_with(1);
    let (mut s, _) = session_over(&deck);
    s.load_deck(deck, Utc::now());
    let (tx, mut rx) = mpsc::unbounded_channel();

    let first = s.ensure_auto_flip(1, tx.clone()).unwrap();
    assert!(s.ensure_auto_flip(1, tx.clone()).is_none());

    // one-card queue: next lands on the same card but drops the countdown
    s.next();
    assert_eq!(s.current_card().unwrap().front, "q0");
    assert!(!s.has_pending_timer());

    let second = s.ensure_auto_flip(1, tx).unwrap();
    assert_ne!(first, second);
    let mut outcome = TickOutcome::Ignored;
    while outcome != TickOutcome::Flipped {
        outcome = s.on_tick(rx.recv().await.unwrap());
    }
    assert_eq!(s.state(), SessionState::Revealed);
}
