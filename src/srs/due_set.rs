//! Due-set selection over an in-memory collection of cards.
//!
//! Mirrors the SQL selection in `db::cards::get_due_cards`: a card is eligible when
//! `next_review <= now` and it is either shared or owned by the requested learner.
//! Eligible cards come out most overdue first, ties broken by id.

use std::cmp::Ordering;

use crate::domain::{Card, DueQuery};

/// Selection predicate for a single card.
pub fn is_eligible(card: &Card, query: &DueQuery) -> bool {
    card.is_due(query.now) && query.includes_owner(card.owner.as_deref())
}

/// Ordering of the due set: ascending `next_review`, then ascending id.
pub fn due_order(a: &Card, b: &Card) -> Ordering {
    a.next_review
        .cmp(&b.next_review)
        .then_with(|| a.id.cmp(&b.id))
}

/// Ordered, capped due set borrowed from `cards`.
///
/// Selection and sorting happen up front; the returned iterator is restartable (Clone)
/// and walks the same selection each time.
pub fn select_due<'a>(
    cards: &'a [Card],
    query: &DueQuery,
) -> impl Iterator<Item = &'a Card> + Clone + use<'a> {
    let mut eligible: Vec<&'a Card> = cards.iter().filter(|c| is_eligible(c, query)).collect();
    eligible.sort_by(|a, b| due_order(a, b));
    eligible.truncate(query.limit());
    eligible.into_iter()
}
