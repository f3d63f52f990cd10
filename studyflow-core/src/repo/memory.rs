use crate::repo::{find_card_mut, has_deck_named, remove_card};
use crate::{CardPatch, CoreError, Deck, Flashcard};
use async_trait::async_trait;
use parking_lot::RwLock;

#[derive(Default)]
pub struct MemoryRepo {
    decks: RwLock<Vec<Deck>>,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_decks(decks: Vec<Deck>) -> Self {
        Self {
            decks: RwLock::new(decks),
        }
    }
}

#[async_trait]
impl crate::repo::Repository for MemoryRepo {
    async fn create_deck(&self, name: &str) -> Result<Deck, CoreError> {
        let deck = Deck::new(name);
        let mut m = self.decks.write();
        if has_deck_named(&m, name) {
            return Err(CoreError::Conflict("deck name already exists"));
        }
        m.push(deck.clone());
        Ok(deck)
    }

    async fn get_deck(&self, id: &str) -> Result<Deck, CoreError> {
        self.decks
            .read()
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or(CoreError::NotFound("deck"))
    }

    async fn list_decks(&self) -> Result<Vec<Deck>, CoreError> {
        Ok(self.decks.read().clone())
    }

    async fn delete_deck(&self, id: &str) -> Result<(), CoreError> {
        let mut m = self.decks.write();
        let pos = m
            .iter()
            .position(|d| d.id == id)
            .ok_or(CoreError::NotFound("deck"))?;
        m.remove(pos);
        Ok(())
    }

    async fn add_card(&self, deck_id: &str, front: &str, back: &str) -> Result<Flashcard, CoreError> {
        let mut m = self.decks.write();
        let deck = m
            .iter_mut()
            .find(|d| d.id == deck_id)
            .ok_or(CoreError::NotFound("deck"))?;
        let card = Flashcard::new(front, back);
        deck.cards.push(card.clone());
        Ok(card)
    }

    async fn update_card(&self, card_id: &str, patch: CardPatch) -> Result<Flashcard, CoreError> {
        let mut m = self.decks.write();
        let Some(card) = find_card_mut(&mut m, card_id) else {
            return Err(CoreError::NotFound("card"));
        };
        card.apply(&patch);
        Ok(card.clone())
    }

    async fn delete_card(&self, card_id: &str) -> Result<(), CoreError> {
        remove_card(&mut self.decks.write(), card_id)
            .map(|_| ())
            .ok_or(CoreError::NotFound("card"))
    }
}
