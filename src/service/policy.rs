//! 對手 AI
//!
//! 以難度表驅動的機率策略，不做搜尋。出牌評估偏好完成自己的役、
//! 搶走對手需要的牌，其次才是牌的面值；這只是盡力而為的啟發式，
//! 不保證最佳。
//!
//! 所有隨機性都來自注入的 `StdRng`，同一個 seed 會做出同樣的選擇。

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::game::{
    detect, matching_cards, resolve_match, total_points, Card, Category, Difficulty, MatchOutcome,
    Phase, Yaku,
};

use super::koikoi::KoikoiChoice;
use super::state::{PlayerAction, RoundState};

/// 牌的戰術價值（與計分用的牌點無關）
fn card_weight(card: &Card) -> f64 {
    match card.category {
        Category::Bright => 4.0,
        Category::Animal => 2.0,
        Category::Ribbon => 2.0,
        Category::Chaff => 0.5,
    }
}

/// player 額外得到 cards 之後役分數的增加量
fn yaku_gain(state: &RoundState, player: usize, cards: &[Card]) -> f64 {
    let before = total_points(state.active_yaku(player));
    let mut after_cards = state.captured(player).to_vec();
    after_cards.extend_from_slice(cards);
    let after = detect(&after_cards, state.config().combination_set, state.rules());
    (total_points(&after) - before).max(0) as f64
}

/// 對手之中拿到 cards 的最大收益
fn best_opponent_gain(state: &RoundState, player: usize, cards: &[Card]) -> f64 {
    (0..state.player_count())
        .filter(|&p| p != player)
        .map(|p| yaku_gain(state, p, cards))
        .fold(0.0, f64::max)
}

pub struct OpponentPolicy {
    difficulty: Difficulty,
    rng: StdRng,
}

impl OpponentPolicy {
    pub fn new(difficulty: Difficulty, seed: u64) -> Self {
        Self::with_rng(difficulty, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(difficulty: Difficulty, rng: StdRng) -> Self {
        Self { difficulty, rng }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    fn plays_randomly(&mut self) -> bool {
        let p = self.difficulty.def().random_play.clamp(0.0, 1.0);
        p > 0.0 && self.rng.gen_bool(p)
    }

    /// 評估 player 吃下 cards
    fn capture_value(&self, state: &RoundState, player: usize, cards: &[Card]) -> f64 {
        let def = self.difficulty.def();
        let own = yaku_gain(state, player, cards);
        let block = best_opponent_gain(state, player, cards);
        let face: f64 = cards.iter().map(card_weight).sum();
        def.yaku_weight * own + def.block_weight * block + face
    }

    /// 評估打出 card
    fn play_value(&self, state: &RoundState, player: usize, card: &Card, field: &[Card]) -> f64 {
        match resolve_match(card, field) {
            MatchOutcome::NoMatch => {
                // 留在場上，對手下一手可能吃到
                let exposed = card_weight(card) + best_opponent_gain(state, player, &[*card]);
                -self.difficulty.def().threat_penalty * exposed
            }
            MatchOutcome::Sweep(targets) => {
                let mut cards = vec![*card];
                cards.extend(targets);
                self.capture_value(state, player, &cards)
            }
            outcome => outcome
                .targets()
                .iter()
                .map(|t| self.capture_value(state, player, &[*card, *t]))
                .fold(f64::MIN, f64::max),
        }
    }

    /// 選擇要打出的手牌
    pub fn choose_card_to_play(&mut self, hand: &[Card], field: &[Card], state: &RoundState) -> Option<Card> {
        if hand.is_empty() {
            return None;
        }
        if self.plays_randomly() {
            return hand.choose(&mut self.rng).copied();
        }

        let player = state.current_player();
        let mut best: Option<(Card, f64)> = None;
        for card in hand {
            let value = self.play_value(state, player, card, field);
            if best.map_or(true, |(_, v)| value > v) {
                best = Some((*card, value));
            }
        }
        if let Some((card, value)) = best {
            debug!("{} AI plays {} ({:.2})", self.difficulty.name(), card.name, value);
        }
        best.map(|(card, _)| card)
    }

    /// 多張可吃時選擇場牌
    pub fn choose_field_target(&mut self, card: &Card, candidates: &[Card], state: &RoundState) -> Option<Card> {
        if candidates.is_empty() {
            return None;
        }
        if self.plays_randomly() {
            return candidates.choose(&mut self.rng).copied();
        }

        let player = state.current_player();
        let mut best: Option<(Card, f64)> = None;
        for target in candidates {
            let value = self.capture_value(state, player, &[*card, *target]);
            if best.map_or(true, |(_, v)| value > v) {
                best = Some((*target, value));
            }
        }
        best.map(|(target, _)| target)
    }

    /// 喊不喊 koi-koi：分數越高越傾向停止，沒有手牌時一定停止
    pub fn choose_koikoi_decision(&mut self, yaku: &[Yaku], score: i32, turns_left: usize) -> KoikoiChoice {
        if turns_left == 0 {
            return KoikoiChoice::Stop;
        }
        let p = self.difficulty.continue_probability(score).clamp(0.0, 1.0);
        let choice = if p > 0.0 && self.rng.gen_bool(p) {
            KoikoiChoice::Continue
        } else {
            KoikoiChoice::Stop
        };
        debug!(
            "{} AI holds {:?} at {} points: {:?}",
            self.difficulty.name(),
            yaku.iter().map(|y| y.name).collect::<Vec<_>>(),
            score,
            choice
        );
        choice
    }

    /// player 目前應該做的動作；不是 player 的回合時回傳 None
    pub fn choose_action(&mut self, state: &RoundState, player: usize) -> Option<PlayerAction> {
        if state.needs_input() != Some(player) {
            return None;
        }
        match state.phase() {
            Phase::SelectHand => self
                .choose_card_to_play(state.hand(player), state.field(), state)
                .map(|card| PlayerAction::PlayHand { player, card: card.id }),
            Phase::SelectField => {
                let card = state.pending()?;
                let candidates = matching_cards(&card, state.field());
                self.choose_field_target(&card, &candidates, state)
                    .map(|target| PlayerAction::SelectField { player, card: target.id })
            }
            Phase::SelectDrawnMatch => {
                let card = state.drawn()?;
                let candidates = matching_cards(&card, state.field());
                self.choose_field_target(&card, &candidates, state)
                    .map(|target| PlayerAction::SelectField { player, card: target.id })
            }
            Phase::AwaitingKoikoiDecision => {
                let yaku = state.active_yaku(player);
                let choice = self.choose_koikoi_decision(yaku, total_points(yaku), state.hand(player).len());
                Some(PlayerAction::Koikoi { player, choice })
            }
            _ => None,
        }
    }
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::VariantConfig;
    use crate::service::state::fixtures::scripted;

    #[test]
    fn test_hard_prefers_completing_yaku() {
        // 已有猪鹿：打牡丹カス吃蝶完成猪鹿蝶，勝過松カス吃鶴
        let state = scripted(&VariantConfig::koikoi(), &[&[3, 22], &[6]], &[0, 20], &[], &[&[24, 36], &[]]);
        let mut policy = OpponentPolicy::new(Difficulty::Hard, 1);
        let card = policy.choose_card_to_play(state.hand(0), state.field(), &state).unwrap();
        assert_eq!(card.id, 22);
    }

    #[test]
    fn test_hard_blocks_opponent_yaku() {
        // 對手已有猪鹿；吃掉蝶比吃梅カス好
        let state = scripted(&VariantConfig::koikoi(), &[&[7, 22], &[6]], &[5, 20], &[], &[&[], &[24, 36]]);
        let mut policy = OpponentPolicy::new(Difficulty::Hard, 1);
        let card = policy.choose_card_to_play(state.hand(0), state.field(), &state).unwrap();
        assert_eq!(card.id, 22);
    }

    #[test]
    fn test_field_target_prefers_bright() {
        let state = scripted(&VariantConfig::koikoi(), &[&[2], &[6]], &[0, 1], &[], &[&[], &[]]);
        let mut policy = OpponentPolicy::new(Difficulty::Hard, 1);
        let card = Card::from_id(2).unwrap();
        let candidates = matching_cards(&card, state.field());
        let target = policy.choose_field_target(&card, &candidates, &state).unwrap();
        assert_eq!(target.id, 0);
    }

    #[test]
    fn test_no_turns_left_always_stops() {
        let mut policy = OpponentPolicy::new(Difficulty::Easy, 3);
        for _ in 0..50 {
            assert_eq!(policy.choose_koikoi_decision(&[], 1, 0), KoikoiChoice::Stop);
        }
    }

    #[test]
    fn test_hard_stops_on_high_score() {
        let mut policy = OpponentPolicy::new(Difficulty::Hard, 3);
        for _ in 0..50 {
            assert_eq!(policy.choose_koikoi_decision(&[], 10, 5), KoikoiChoice::Stop);
        }
    }

    #[test]
    fn test_decisions_reproducible_with_seed() {
        let mut a = OpponentPolicy::new(Difficulty::Easy, 42);
        let mut b = OpponentPolicy::new(Difficulty::Easy, 42);
        let left: Vec<_> = (0..30).map(|s| a.choose_koikoi_decision(&[], s % 8, 4)).collect();
        let right: Vec<_> = (0..30).map(|s| b.choose_koikoi_decision(&[], s % 8, 4)).collect();
        assert_eq!(left, right);
        assert!(left.contains(&KoikoiChoice::Continue));
    }

    #[test]
    fn test_choose_action_only_for_waiting_player() {
        let state = scripted(&VariantConfig::koikoi(), &[&[2], &[6]], &[8], &[], &[&[], &[]]);
        let mut policy = OpponentPolicy::new(Difficulty::Normal, 1);
        assert_eq!(policy.choose_action(&state, 1), None);
        assert_eq!(
            policy.choose_action(&state, 0),
            Some(PlayerAction::PlayHand { player: 0, card: 2 })
        );
    }
}
