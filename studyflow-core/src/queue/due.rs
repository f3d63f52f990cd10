use chrono::{DateTime, Utc};

use super::{remove_at_cursor, wrap_next, wrap_prev, ReviewQueue};
use crate::Flashcard;

/// Cards whose `nextReview` had elapsed when the queue was built. The due set
/// is fixed at construction; cards that fall due mid-session are not added.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DueQueue {
    queue: Vec<usize>,
    index: usize,
    repeat_queue: Vec<usize>,
}

impl DueQueue {
    pub fn new(cards: &[Flashcard], now: DateTime<Utc>) -> Self {
        let queue = cards
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_due(now))
            .map(|(i, _)| i)
            .collect();
        Self {
            queue,
            index: 0,
            repeat_queue: Vec::new(),
        }
    }

    /// Restores a queue from saved parts. An out-of-range `index` wraps.
    pub fn from_parts(queue: Vec<usize>, index: usize, repeat_queue: Vec<usize>) -> Self {
        let index = if queue.is_empty() { 0 } else { index % queue.len() };
        let mut q = Self {
            queue,
            index,
            repeat_queue,
        };
        q.settle();
        q
    }

    // Runs after every mutation: an exhausted queue picks up the repeats.
    fn settle(&mut self) {
        if self.queue.is_empty() && !self.repeat_queue.is_empty() {
            tracing::debug!(repeats = self.repeat_queue.len(), "due queue swapping in repeats");
            self.queue = std::mem::take(&mut self.repeat_queue);
            self.index = 0;
        }
    }
}

impl ReviewQueue for DueQueue {
    fn current(&self) -> usize {
        self.queue.get(self.index).copied().unwrap_or(0)
    }

    fn next(&mut self) {
        self.index = wrap_next(self.index, self.queue.len());
        self.settle();
    }

    fn prev(&mut self) {
        self.index = wrap_prev(self.index, self.queue.len());
        self.settle();
    }

    // Duplicates are kept here, unlike FreeReviewQueue::add_repeat.
    fn add_repeat(&mut self, card_idx: usize) {
        self.repeat_queue.push(card_idx);
        self.settle();
    }

    fn remove_current(&mut self) {
        remove_at_cursor(&mut self.queue, &mut self.index);
        self.settle();
    }

    fn is_done(&self) -> bool {
        self.queue.is_empty() && self.repeat_queue.is_empty()
    }

    fn queue(&self) -> &[usize] {
        &self.queue
    }

    fn repeat_queue(&self) -> &[usize] {
        &self.repeat_queue
    }

    fn index(&self) -> usize {
        self.index
    }
}
