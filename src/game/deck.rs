//! 牌山
//!
//! 洗牌只用注入的亂數源，發牌順序固定：同一個 seed 一定得到同樣的手牌與場牌。

use rand::seq::SliceRandom;
use rand::Rng;

use super::cards::{standard_deck, Card};
use super::constants::DEAL_BATCH;
use super::error::EngineError;

/// Fisher–Yates 洗牌
pub fn shuffle<R: Rng + ?Sized>(cards: &mut [Card], rng: &mut R) {
    cards.shuffle(rng);
}

/// 剩餘的牌山（索引 0 為頂端）
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// 未洗牌的 48 張
    pub fn standard() -> Self {
        Self { cards: standard_deck() }
    }

    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::standard();
        deck.shuffle(rng);
        deck
    }

    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        shuffle(&mut self.cards, rng);
    }

    /// 從頂端抽 n 張
    pub fn draw(&mut self, n: usize) -> Result<Vec<Card>, EngineError> {
        if n > self.cards.len() {
            return Err(EngineError::EmptyDeck {
                requested: n,
                remaining: self.cards.len(),
            });
        }
        Ok(self.cards.drain(..n).collect())
    }

    pub fn draw_one(&mut self) -> Option<Card> {
        if self.cards.is_empty() {
            None
        } else {
            Some(self.cards.remove(0))
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn top(&self) -> Option<&Card> {
        self.cards.first()
    }
}

/// 發牌結果
#[derive(Clone, Debug)]
pub struct Deal {
    pub hands: Vec<Vec<Card>>,
    pub field: Vec<Card>,
}

/// 分批發牌：每次 2 張，從莊家起依座位順序發給每位玩家，再發到場上，重複直到發滿
pub fn deal(
    deck: &mut Deck,
    player_count: usize,
    dealer: usize,
    hand_size: usize,
    field_size: usize,
) -> Result<Deal, EngineError> {
    let needed = player_count * hand_size + field_size;
    if needed > deck.len() {
        return Err(EngineError::EmptyDeck {
            requested: needed,
            remaining: deck.len(),
        });
    }

    let mut hands: Vec<Vec<Card>> = vec![Vec::with_capacity(hand_size); player_count];
    let mut field = Vec::with_capacity(field_size);

    while field.len() < field_size || hands.iter().any(|h| h.len() < hand_size) {
        for offset in 0..player_count {
            let seat = (dealer + offset) % player_count;
            let n = DEAL_BATCH.min(hand_size - hands[seat].len());
            hands[seat].extend(deck.draw(n)?);
        }
        let n = DEAL_BATCH.min(field_size - field.len());
        field.extend(deck.draw(n)?);
    }

    Ok(Deal { hands, field })
}

// ============================================================================
// 單元測試
// ============================================================================
