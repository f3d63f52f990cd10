use super::{remove_at_cursor, wrap_next, wrap_prev, ReviewQueue};

/// Endless drill over every card regardless of due date. Cards marked for
/// repeat come back once the primary queue has been emptied.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FreeReviewQueue {
    len: usize,
    queue: Vec<usize>,
    index: usize,
    repeat_queue: Vec<usize>,
}

impl FreeReviewQueue {
    pub fn new(card_count: usize) -> Self {
        Self {
            len: card_count,
            queue: (0..card_count).collect(),
            index: 0,
            repeat_queue: Vec::new(),
        }
    }

    /// Full reinitialization for a new card collection.
    pub fn reset(&mut self, card_count: usize) {
        *self = Self::new(card_count);
    }

    pub fn restart(&mut self) {
        tracing::debug!(cards = self.len, "free review restart");
        self.queue = (0..self.len).collect();
        self.repeat_queue.clear();
        self.index = 0;
    }

    pub fn card_count(&self) -> usize {
        self.len
    }
}

impl ReviewQueue for FreeReviewQueue {
    fn current(&self) -> usize {
        self.queue.get(self.index).copied().unwrap_or(0)
    }

    fn next(&mut self) {
        if self.queue.is_empty() && !self.repeat_queue.is_empty() {
            self.queue = std::mem::take(&mut self.repeat_queue);
            self.index = 0;
            return;
        }
        self.index = wrap_next(self.index, self.queue.len());
    }

    fn prev(&mut self) {
        self.index = wrap_prev(self.index, self.queue.len());
    }

    fn add_repeat(&mut self, card_idx: usize) {
        if !self.repeat_queue.contains(&card_idx) {
            self.repeat_queue.push(card_idx);
        }
    }

    fn remove_current(&mut self) {
        remove_at_cursor(&mut self.queue, &mut self.index);
    }

    fn is_done(&self) -> bool {
        self.len == 0 || (self.queue.is_empty() && self.repeat_queue.is_empty())
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
