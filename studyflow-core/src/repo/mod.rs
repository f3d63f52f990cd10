use crate::{CardPatch, CoreError, Deck, Flashcard};
use async_trait::async_trait;

pub mod memory;

/// Deck storage. Also the deck-update collaborator of a study session: the
/// session never writes cards itself, it sends patches through `update_card`.
#[async_trait]
pub trait Repository: Send + Sync {
    // Decks
    async fn create_deck(&self, name: &str) -> Result<Deck, CoreError>;
    async fn get_deck(&self, id: &str) -> Result<Deck, CoreError>;
    async fn list_decks(&self) -> Result<Vec<Deck>, CoreError>;
    async fn delete_deck(&self, id: &str) -> Result<(), CoreError>;

    // Cards
    async fn add_card(&self, deck_id: &str, front: &str, back: &str) -> Result<Flashcard, CoreError>;
    async fn update_card(&self, card_id: &str, patch: CardPatch) -> Result<Flashcard, CoreError>;
    async fn delete_card(&self, card_id: &str) -> Result<(), CoreError>;
}

/// Case-insensitive name lookup shared by repository implementations.
pub fn has_deck_named(decks: &[Deck], name: &str) -> bool {
    decks.iter().any(|d| d.name.eq_ignore_ascii_case(name))
}

pub fn find_card_mut<'a>(decks: &'a mut [Deck], card_id: &str) -> Option<&'a mut Flashcard> {
    decks
        .iter_mut()
        .flat_map(|d| d.cards.iter_mut())
        .find(|c| c.id == card_id)
}

pub fn remove_card(decks: &mut [Deck], card_id: &str) -> Option<Flashcard> {
    decks.iter_mut().find_map(|deck| {
        let pos = deck.cards.iter().position(|c| c.id == card_id)?;
        Some(deck.cards.remove(pos))
    })
}
