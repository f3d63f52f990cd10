use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

use crate::queue::{DueQueue, FreeReviewQueue, ReviewQueue};
use crate::scheduler::review;
use crate::timer::{Countdown, Tick};
use crate::{
    CardPatch, CoreError, Deck, Flashcard, Grade, HapticStyle, Haptics, MotionSample, Repository,
    ShakeDetector, Totals,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No deck loaded.
    Idle,
    /// Card shown, answer hidden.
    Browsing,
    /// Answer shown, grading available.
    Revealed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Tick from a countdown that is no longer armed.
    Ignored,
    Counting(u32),
    /// Countdown expired and the answer was revealed.
    Flipped,
}

/// Drives one study session over a deck snapshot: which queue is active,
/// answer visibility, grading, and the auto-flip countdown.
pub struct StudySession {
    repo: Arc<dyn Repository>,
    haptics: Option<Arc<dyn Haptics>>,
    deck: Option<Deck>,
    state: SessionState,
    free_review: bool,
    due: DueQueue,
    free: FreeReviewQueue,
    shake: ShakeDetector,
    totals: Totals,
    countdown: Option<Countdown>,
    generation: u64,
}

impl StudySession {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self {
            repo,
            haptics: None,
            deck: None,
            state: SessionState::Idle,
            free_review: false,
            due: DueQueue::default(),
            free: FreeReviewQueue::default(),
            shake: ShakeDetector::new(),
            totals: Totals::default(),
            countdown: None,
            generation: 0,
        }
    }

    pub fn with_haptics(mut self, haptics: Arc<dyn Haptics>) -> Self {
        self.haptics = Some(haptics);
        self
    }

    // ===== Deck lifecycle =====

    /// Loads a deck snapshot. Both queues are rebuilt from scratch; the due
    /// set is fixed as of `now`.
    pub fn load_deck(&mut self, deck: Deck, now: DateTime<Utc>) {
        self.cancel_timers();
        self.due = DueQueue::new(&deck.cards, now);
        self.free.reset(deck.cards.len());
        self.shake.reset();
        self.totals = Totals::default();
        tracing::debug!(
            deck = %deck.id,
            cards = deck.cards.len(),
            due = self.due.queue().len(),
            "deck loaded"
        );
        self.deck = Some(deck);
        self.state = SessionState::Browsing;
    }

    pub fn unload(&mut self) {
        self.cancel_timers();
        self.deck = None;
        self.due = DueQueue::default();
        self.free.reset(0);
        self.state = SessionState::Idle;
    }

    // ===== Accessors =====

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_free_review(&self) -> bool {
        self.free_review
    }

    pub fn deck(&self) -> Option<&Deck> {
        self.deck.as_ref()
    }

    pub fn cards(&self) -> &[Flashcard] {
        self.deck.as_ref().map(|d| d.cards.as_slice()).unwrap_or(&[])
    }

    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    pub fn due_queue(&self) -> &DueQueue {
        &self.due
    }

    pub fn free_queue(&self) -> &FreeReviewQueue {
        &self.free
    }

    pub fn is_revealed(&self) -> bool {
        self.state == SessionState::Revealed
    }

    /// True when a deck is loaded but has no cards. Presentation checks this
    /// before rendering a card.
    pub fn is_empty_deck(&self) -> bool {
        self.deck.as_ref().map(|d| d.cards.is_empty()).unwrap_or(false)
    }

    pub fn is_done(&self) -> bool {
        self.deck.is_none() || self.active().is_done()
    }

    fn active(&self) -> &dyn ReviewQueue {
        if self.free_review {
            &self.free
        } else {
            &self.due
        }
    }

    fn active_mut(&mut self) -> &mut dyn ReviewQueue {
        if self.free_review {
            &mut self.free
        } else {
            &mut self.due
        }
    }

    /// One-based position in the active queue and the queue length.
    pub fn position(&self) -> (usize, usize) {
        let q = self.active();
        if q.queue().is_empty() {
            (0, 0)
        } else {
            (q.index() + 1, q.queue().len())
        }
    }

    /// Never fails: an empty queue reports index 0.
    pub fn current_index(&self) -> usize {
        self.active().current()
    }

    pub fn current_card(&self) -> Option<&Flashcard> {
        if self.active().queue().is_empty() {
            return None;
        }
        self.cards().get(self.current_index())
    }

    // ===== Navigation =====

    pub fn reveal(&mut self) -> Result<(), CoreError> {
        match self.state {
            SessionState::Idle => Err(CoreError::InvalidState("no deck loaded")),
            SessionState::Revealed => Ok(()),
            SessionState::Browsing => {
                if self.current_card().is_none() {
                    return Err(CoreError::InvalidState("no card to reveal"));
                }
                self.cancel_timers();
                self.state = SessionState::Revealed;
                Ok(())
            }
        }
    }

    pub fn next(&mut self) {
        if self.deck.is_none() {
            return;
        }
        self.active_mut().next();
        self.show_front();
    }

    pub fn prev(&mut self) {
        if self.deck.is_none() {
            return;
        }
        self.active_mut().prev();
        self.show_front();
    }

    /// Queues the current card for another pass in this session.
    pub fn mark_repeat(&mut self) {
        if self.current_card().is_none() {
            return;
        }
        let idx = self.current_index();
        self.active_mut().add_repeat(idx);
    }

    /// Drops the current card from the active queue ("mastered").
    pub fn remove_current(&mut self) {
        if self.deck.is_none() {
            return;
        }
        self.active_mut().remove_current();
        self.show_front();
    }

    pub fn restart(&mut self) {
        self.free.restart();
        if self.free_review {
            self.show_front();
        }
    }

    pub fn enter_free_review(&mut self) {
        self.switch_mode(true);
    }

    /// Returns to the due queue exactly where it was left.
    pub fn exit_free_review(&mut self) {
        self.switch_mode(false);
    }

    fn switch_mode(&mut self, free_review: bool) {
        if self.free_review == free_review {
            return;
        }
        self.free_review = free_review;
        self.shake.reset();
        self.show_front();
    }

    fn show_front(&mut self) {
        self.cancel_timers();
        if self.deck.is_some() {
            self.state = SessionState::Browsing;
        }
    }

    // ===== Grading =====

    /// Schedules the revealed card, persists the new state through the
    /// repository, then moves to the next card.
    pub async fn grade(&mut self, grade: Grade, now: DateTime<Utc>) -> Result<Flashcard, CoreError> {
        let card = self.persist_grade(grade, now).await?;
        self.next();
        Ok(card)
    }

    /// Like [`grade`](Self::grade) but takes the card out of the queue, sending
    /// it round again only when it was failed. A session driven this way ends.
    pub async fn grade_and_retire(
        &mut self,
        grade: Grade,
        now: DateTime<Utc>,
    ) -> Result<Flashcard, CoreError> {
        let card = self.persist_grade(grade, now).await?;
        if grade == Grade::Again {
            self.mark_repeat();
        }
        self.remove_current();
        Ok(card)
    }

    async fn persist_grade(&mut self, grade: Grade, now: DateTime<Utc>) -> Result<Flashcard, CoreError> {
        if self.free_review {
            return Err(CoreError::InvalidState("free review does not schedule cards"));
        }
        if self.state != SessionState::Revealed {
            return Err(CoreError::InvalidState("grade requires a revealed card"));
        }
        let idx = self.current_index();
        let card = self
            .current_card()
            .cloned()
            .ok_or(CoreError::InvalidState("no card to grade"))?;

        let outcome = review(&card, grade, now);
        let updated = self
            .repo
            .update_card(&card.id, CardPatch::scheduling(outcome.state, outcome.next_review))
            .await?;
        tracing::debug!(
            card = %updated.id,
            grade = grade.as_str(),
            interval = outcome.state.interval,
            ease = outcome.state.ease,
            "card graded"
        );

        if let Some(slot) = self.deck.as_mut().and_then(|d| d.cards.get_mut(idx)) {
            *slot = updated.clone();
        }
        self.totals.record(grade);
        self.pulse(HapticStyle::for_grade(grade));
        Ok(updated)
    }

    // ===== Device input =====

    /// Feeds an accelerometer sample. A shake during free review restarts the
    /// drill; returns whether that happened.
    pub fn on_motion(&mut self, sample: MotionSample, at: Instant) -> bool {
        let shaken = self.shake.observe(sample, at);
        if !shaken || !self.free_review || self.deck.is_none() {
            return false;
        }
        self.restart();
        self.pulse(HapticStyle::Heavy);
        true
    }

    fn pulse(&self, style: HapticStyle) {
        if let Some(h) = &self.haptics {
            if let Err(e) = h.vibrate(style) {
                tracing::debug!(error = %e, "haptics failed");
            }
        }
    }

    // ===== Auto-flip =====

    /// Starts a countdown that reveals the current card after `secs` seconds.
    /// Returns the countdown's generation, or `None` when nothing was armed.
    /// Must be called from within a tokio runtime.
    pub fn arm_auto_flip(&mut self, secs: u32, tx: mpsc::UnboundedSender<Tick>) -> Option<u64> {
        if secs == 0 || self.state != SessionState::Browsing || self.current_card().is_none() {
            return None;
        }
        self.cancel_timers();
        self.generation += 1;
        self.countdown = Some(Countdown::spawn(self.generation, secs, tx));
        Some(self.generation)
    }

    /// Arms a countdown for the card on show unless one is already running.
    /// Navigation cancels the countdown even when the same card stays on
    /// screen, so callers run this after every command.
    pub fn ensure_auto_flip(&mut self, secs: u32, tx: mpsc::UnboundedSender<Tick>) -> Option<u64> {
        if self.countdown.is_some() {
            return None;
        }
        self.arm_auto_flip(secs, tx)
    }

    pub fn on_tick(&mut self, tick: Tick) -> TickOutcome {
        let armed = self.countdown.as_ref().map(|c| c.generation());
        if armed != Some(tick.generation) {
            return TickOutcome::Ignored;
        }
        if !tick.is_expired() {
            return TickOutcome::Counting(tick.remaining);
        }
        self.countdown = None;
        if self.state != SessionState::Browsing {
            return TickOutcome::Ignored;
        }
        self.state = SessionState::Revealed;
        TickOutcome::Flipped
    }

    pub fn has_pending_timer(&self) -> bool {
        self.countdown.is_some()
    }

    fn cancel_timers(&mut self) {
        if let Some(c) = self.countdown.take() {
            tracing::debug!(generation = c.generation(), "auto-flip cancelled");
            c.cancel();
        }
    }
}
