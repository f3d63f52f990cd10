use chrono::{Duration, Utc};
use studyflow_core::{DueQueue, Flashcard, FreeReviewQueue, ReviewQueue};

fn cards_due_pattern(due: &[bool]) -> Vec<Flashcard> {
    let now = Utc::now();
    due.iter()
        .enumerate()
        .map(|(i, d)| {
            let mut c = Flashcard::new(format!("q{i}"), format!("a{i}"));
            c.next_review = Some(if *d { now - Duration::hours(1) } else { now + Duration::days(2) });
            c
        })
        .collect()
}

#[test]
fn due_queue_keeps_only_elapsed_cards() {
    let mut cards = cards_due_pattern(&[true, false, true, false]);
    cards.push(Flashcard::new("never reviewed", "due"));
    let q = DueQueue::new(&cards, Utc::now());
    assert_eq!(q.queue(), &[0, 2, 4]);
    assert_eq!(q.index(), 0);
    assert_eq!(q.current(), 0);
}

#[test]
fn due_queue_set_is_fixed_at_construction() {
    let cards = cards_due_pattern(&[true, false]);
    let built_at = Utc::now();
    let mut q = DueQueue::new(&cards, built_at);
    // card 1 falls due later; the queue does not pick it up
    q.next();
    q.next();
    assert_eq!(q.queue(), &[0]);
}

#[test]
fn due_queue_wraps_both_directions() {
    let cards = cards_due_pattern(&[true, true, true]);
    let mut q = DueQueue::new(&cards, Utc::now());
    q.prev();
    assert_eq!(q.current(), 2);
    q.next();
    assert_eq!(q.current(), 0);
    q.next();
    q.next();
    q.next();
    assert_eq!(q.current(), 0);
}

#[test]
fn due_queue_swaps_in_repeats_when_exhausted() {
    let q = DueQueue::from_parts(vec![], 3, vec![2, 5]);
    assert_eq!(q.queue(), &[2, 5]);
    assert!(q.repeat_queue().is_empty());
    assert_eq!(q.index(), 0);

    let cards = cards_due_pattern(&[true, true]);
    let mut q = DueQueue::new(&cards, Utc::now());
    q.add_repeat(1);
    q.remove_current();
    assert_eq!(q.queue(), &[1]);
    q.remove_current();
    assert_eq!(q.queue(), &[1]);
    assert!(q.repeat_queue().is_empty());
    q.remove_current();
    assert!(q.is_done());
    assert_eq!(q.current(), 0);
}

#[test]
fn restored_index_wraps_into_range() {
    let q = DueQueue::from_parts(vec![4, 7], 5, vec![]);
    assert_eq!(q.index(), 1);
    assert_eq!(q.current(), 7);

    let q = DueQueue::from_parts(vec![], 9, vec![]);
    assert_eq!(q.index(), 0);
    assert_eq!(q.current(), 0);
    assert!(q.is_done());
}

#[test]
fn due_queue_repeat_keeps_duplicates() {
    let cards = cards_due_pattern(&[true, true, true]);
    let mut q = DueQueue::new(&cards, Utc::now());
    q.add_repeat(1);
    q.add_repeat(1);
    assert_eq!(q.repeat_queue(), &[1, 1]);
}

#[test]
fn remove_current_steps_back_unless_at_start() {
    let cards = cards_due_pattern(&[true, true, true]);
    let mut q = DueQueue::new(&cards, Utc::now());
    q.next();
    q.next();
    q.remove_current();
    assert_eq!(q.queue(), &[0, 1]);
    assert_eq!(q.index(), 1);

    q.prev();
    q.remove_current();
    assert_eq!(q.queue(), &[1]);
    assert_eq!(q.index(), 0);
}

#[test]
fn free_review_is_round_robin() {
    let n = 5;
    let mut q = FreeReviewQueue::new(n);
    let mut first = Vec::new();
    for _ in 0..n {
        first.push(q.current());
        q.next();
    }
    let mut second = Vec::new();
    for _ in 0..n {
        second.push(q.current());
        q.next();
    }
    assert_eq!(first, vec![0, 1, 2, 3, 4]);
    assert_eq!(first, second);
    assert!(!q.is_done());
}

#[test]
fn free_review_prev_wraps_to_last() {
    let mut q = FreeReviewQueue::new(3);
    q.prev();
    assert_eq!(q.current(), 2);
}

#[test]
fn free_review_repeat_is_deduplicated() {
    let mut q = FreeReviewQueue::new(3);
    q.add_repeat(1);
    q.add_repeat(1);
    assert_eq!(q.repeat_queue(), &[1]);

    q.remove_current();
    q.remove_current();
    q.remove_current();
    assert!(q.queue().is_empty());
    // no reactive swap in free review; next() performs it without advancing
    assert_eq!(q.repeat_queue(), &[1]);
    q.next();
    assert_eq!(q.queue(), &[1]);
    assert_eq!(q.index(), 0);
    assert_eq!(q.current(), 1);
    assert!(q.repeat_queue().is_empty());
}

#[test]
fn restart_always_restores_full_order() {
    let mut q = FreeReviewQueue::new(4);
    q.next();
    q.add_repeat(3);
    q.remove_current();
    q.restart();
    assert_eq!(q.queue(), &[0, 1, 2, 3]);
    assert_eq!(q.index(), 0);
    assert!(q.repeat_queue().is_empty());

    q.restart();
    assert_eq!(q.queue(), &[0, 1, 2, 3]);
}

#[test]
fn empty_collections_fall_back_to_index_zero() {
    let mut free = FreeReviewQueue::new(0);
    assert!(free.is_done());
    free.next();
    free.prev();
    assert_eq!(free.current(), 0);

    let mut due = DueQueue::new(&[], Utc::now());
    assert!(due.is_done());
    due.next();
    due.prev();
    due.remove_current();
    assert_eq!(due.current(), 0);
}

#[test]
fn reset_reinitializes_for_a_new_collection() {
    let mut q = FreeReviewQueue::new(3);
    q.next();
    q.add_repeat(0);
    q.reset(2);
    assert_eq!(q.queue(), &[0, 1]);
    assert_eq!(q.index(), 0);
    assert!(q.repeat_queue().is_empty());
    assert_eq!(q.card_count(), 2);
}
