pub mod due;
pub mod free;

pub use due::DueQueue;
pub use free::FreeReviewQueue;

/// Traversal over card-array indices for one study session.
pub trait ReviewQueue {
    /// Index into the card array of the card on screen. Falls back to 0 when
    /// the queue is empty so callers never index out of range.
    fn current(&self) -> usize;
    fn next(&mut self);
    fn prev(&mut self);
    fn add_repeat(&mut self, card_idx: usize);
    fn remove_current(&mut self);
    fn is_done(&self) -> bool;

    fn queue(&self) -> &[usize];
    fn repeat_queue(&self) -> &[usize];
    fn index(&self) -> usize;
}

pub(crate) fn wrap_next(index: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        (index + 1) % len
    }
}

pub(crate) fn wrap_prev(index: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else if index == 0 {
        len - 1
    } else {
        index - 1
    }
}

/// Removes `queue[*index]` and steps the cursor back unless it is already at 0.
pub(crate) fn remove_at_cursor(queue: &mut Vec<usize>, index: &mut usize) {
    if *index < queue.len() {
        queue.remove(*index);
    }
    if *index > 0 {
        *index -= 1;
    }
}
