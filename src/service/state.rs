//! 回合狀態管理
//!
//! `RoundState` 是唯一能移動卡牌的地方。所有玩家輸入與自動推進都經過
//! `apply`：koi-koi 決策等待中時，除了決策本身以外的動作一律拒絕。
//!
//! 每個處理函數在第一次修改狀態之前完成所有驗證，被拒絕的動作不會改變狀態。

use log::{debug, warn};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::game::deck::{self, Deck};
use crate::game::{
    detect, detect_hand_yaku, improvements, matching_cards, resolve_match, total_points,
    validate_target, Card, CardId, CardTag, CombinationSet, EngineError, MatchOutcome, Phase,
    VariantConfig, Yaku, YakuRules, CARDS_PER_MONTH, DECK_SIZE, MAX_REDEALS, MONTHS,
};

use super::events::GameEvent;
use super::koikoi::{KoikoiChoice, KoikoiState};
use super::settlement::{settle_round, RoundEndTrigger, RoundFacts, RoundResult};

/// 玩家動作（含自動推進）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAction {
    /// 從手牌打出一張
    PlayHand { player: usize, card: CardId },
    /// 選擇要吃的場牌（打出的牌或抽出的牌）
    SelectField { player: usize, card: CardId },
    /// 推進自動階段（抽牌、翻牌、換人）
    Advance,
    Koikoi { player: usize, choice: KoikoiChoice },
}

/// 卡牌所在區域
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Zone {
    Deck,
    Field,
    Hand(usize),
    Captured(usize),
    Drawn,
}

/// 一次轉移：呈現層收到的單一通知
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Transition {
    pub from: Phase,
    pub to: Phase,
    pub events: Vec<GameEvent>,
}

/// 場上有同月四張
fn has_full_month(field: &[Card]) -> bool {
    (1..=MONTHS).any(|m| field.iter().filter(|c| c.month == m).count() == CARDS_PER_MONTH)
}

/// 八八的場倍率：雨或鳳凰 ×4，其他光札 ×2
fn field_multiplier(config: &VariantConfig, field: &[Card]) -> i32 {
    if config.combination_set != CombinationSet::HachiHachi {
        return 1;
    }
    if field
        .iter()
        .any(|c| c.tag == CardTag::RainMan || c.tag == CardTag::Phoenix)
    {
        4
    } else if field.iter().any(|c| c.is_bright()) {
        2
    } else {
        1
    }
}

/// 回合狀態
#[derive(Clone, Debug)]
pub struct RoundState {
    config: VariantConfig,
    rules: YakuRules,
    round_index: usize,
    dealer: usize,
    current_player: usize,
    phase: Phase,
    turn: usize,

    // 區域
    deck: Deck,
    field: Vec<Card>,
    hands: Vec<Vec<Card>>,
    captured: Vec<Vec<Card>>,
    drawn: Option<Card>,
    /// 等待選擇場牌的手牌（仍在手牌區）
    pending: Option<Card>,

    koikoi: KoikoiState,
    active_yaku: Vec<Vec<Yaku>>,
    /// 決策後要回到的階段
    resume_phase: Option<Phase>,
    field_multiplier: i32,

    events: Vec<GameEvent>,
    result: Option<RoundResult>,
}

impl RoundState {
    // ========================================================================
    // 建立
    // ========================================================================

    /// 洗牌並發牌。場上出現同月四張時從同一個亂數源重洗。
    pub fn deal(
        config: &VariantConfig,
        round_index: usize,
        dealer: usize,
        rng: &mut StdRng,
    ) -> Result<Self, EngineError> {
        let layout = config.layout()?;
        let n = config.player_count;
        if dealer >= n {
            return Err(EngineError::invalid_config(format!("dealer {} out of range", dealer)));
        }

        let mut events = Vec::new();
        let mut attempt = 0;
        let (deck, dealt) = loop {
            let mut deck = Deck::shuffled(rng);
            let dealt = deck::deal(&mut deck, n, dealer, layout.hand_size, layout.field_size)?;
            if attempt >= MAX_REDEALS || !has_full_month(&dealt.field) {
                break (deck, dealt);
            }
            attempt += 1;
            debug!("round {}: four of a month on the field, redeal #{}", round_index, attempt);
            events.push(GameEvent::Redeal { attempt });
        };

        let mut state = Self::assemble(
            config,
            round_index,
            dealer,
            deck,
            dealt.field,
            dealt.hands,
            vec![Vec::new(); n],
        );
        state.events = events;
        state.start(true);
        Ok(state)
    }

    /// 以指定的區域內容建立回合（腳本、重播、測試）
    ///
    /// 所有區域合起來必須剛好是 48 張不重複的牌。發牌時的手役不判定。
    pub fn from_layout(
        config: &VariantConfig,
        dealer: usize,
        hands: Vec<Vec<Card>>,
        field: Vec<Card>,
        deck: Vec<Card>,
        captured: Vec<Vec<Card>>,
    ) -> Result<Self, EngineError> {
        let n = config.player_count;
        if hands.len() != n || captured.len() != n || dealer >= n {
            return Err(EngineError::invalid_config(format!(
                "layout must have {} hands and {} captured piles",
                n, n
            )));
        }

        let mut seen = [false; DECK_SIZE];
        let all = hands
            .iter()
            .flatten()
            .chain(captured.iter().flatten())
            .chain(field.iter())
            .chain(deck.iter());
        let mut count = 0;
        for card in all {
            let i = card.id as usize;
            if i >= DECK_SIZE || seen[i] {
                return Err(EngineError::invalid_config(format!(
                    "card {} appears twice or is unknown",
                    card.id
                )));
            }
            seen[i] = true;
            count += 1;
        }
        if count != DECK_SIZE {
            return Err(EngineError::invalid_config(format!(
                "layout holds {} cards, expected {}",
                count, DECK_SIZE
            )));
        }

        let mut state = Self::assemble(config, 0, dealer, Deck::from_cards(deck), field, hands, captured);
        state.start(false);
        Ok(state)
    }

    fn assemble(
        config: &VariantConfig,
        round_index: usize,
        dealer: usize,
        deck: Deck,
        field: Vec<Card>,
        hands: Vec<Vec<Card>>,
        captured: Vec<Vec<Card>>,
    ) -> Self {
        let rules = YakuRules::from_config(config);
        let active_yaku = captured
            .iter()
            .map(|c| detect(c, config.combination_set, &rules))
            .collect();
        let field_multiplier = field_multiplier(config, &field);
        Self {
            config: config.clone(),
            rules,
            round_index,
            dealer,
            current_player: dealer,
            phase: Phase::SelectHand,
            turn: 0,
            deck,
            field,
            koikoi: KoikoiState::new(hands.len()),
            hands,
            captured,
            drawn: None,
            pending: None,
            active_yaku,
            resume_phase: None,
            field_multiplier,
            events: Vec::new(),
            result: None,
        }
    }

    fn start(&mut self, check_hand_yaku: bool) {
        self.events.push(GameEvent::RoundStarted {
            round: self.round_index,
            dealer: self.dealer,
            field: self.field.iter().map(|c| c.id).collect(),
        });
        debug!(
            "round {} dealt: dealer={} field multiplier={}",
            self.round_index, self.dealer, self.field_multiplier
        );

        if check_hand_yaku
            && self.config.rules.hand_yaku
            && self.config.combination_set == CombinationSet::KoiKoi
        {
            let n = self.player_count();
            for offset in 0..n {
                let player = (self.dealer + offset) % n;
                if let Some(yaku) = detect_hand_yaku(&self.hands[player]) {
                    let trigger = RoundEndTrigger::HandYaku {
                        player,
                        yaku: yaku.id,
                        points: yaku.points,
                    };
                    self.events.push(GameEvent::HandYaku { player, yaku });
                    self.end_round(trigger);
                    return;
                }
            }
        }

        self.events.push(GameEvent::TurnStarted { player: self.current_player });
        #[cfg(debug_assertions)]
        self.assert_invariants();
    }

    // ========================================================================
    // 唯一入口
    // ========================================================================

    /// 套用一個動作
    ///
    /// 決策等待中時只接受 `Koikoi`；回合結束後不接受任何動作。
    pub fn apply(&mut self, action: PlayerAction) -> Result<Transition, EngineError> {
        if let Err(err) = self.guard(&action) {
            warn!("rejected {:?} in {:?}: {}", action, self.phase, err);
            return Err(err);
        }

        let from = self.phase;
        let start = self.events.len();
        let outcome = match (from, action) {
            (Phase::SelectHand, PlayerAction::PlayHand { player, card }) => self.play_from_hand(player, card),
            (Phase::SelectField, PlayerAction::SelectField { player, card }) => self.capture_pending(player, card),
            (Phase::SelectDrawnMatch, PlayerAction::SelectField { player, card }) => self.capture_drawn(player, card),
            (Phase::Drawing, PlayerAction::Advance) => self.draw(),
            (Phase::ShowDrawn, PlayerAction::Advance) => self.show_drawn(),
            (Phase::TurnHandoff, PlayerAction::Advance) => self.hand_off(),
            (Phase::AwaitingKoikoiDecision, PlayerAction::Koikoi { player, choice }) => self.decide(player, choice),
            (phase, action) => Err(EngineError::invalid_action(format!(
                "{:?} is not allowed in {:?}",
                action, phase
            ))),
        };
        if let Err(err) = outcome {
            warn!("rejected {:?} in {:?}: {}", action, from, err);
            return Err(err);
        }

        if self.phase != from {
            debug!("phase {:?} -> {:?}", from, self.phase);
            self.events.push(GameEvent::PhaseChanged { from, to: self.phase });
        }
        #[cfg(debug_assertions)]
        self.assert_invariants();

        Ok(Transition {
            from,
            to: self.phase,
            events: self.events[start..].to_vec(),
        })
    }

    fn guard(&self, action: &PlayerAction) -> Result<(), EngineError> {
        if self.phase.is_terminal() {
            return Err(EngineError::invalid_action("round has ended"));
        }
        if self.koikoi.waiting_for_decision && !matches!(action, PlayerAction::Koikoi { .. }) {
            return Err(EngineError::invalid_action(format!(
                "waiting for player {:?} to decide koi-koi",
                self.koikoi.decision_player
            )));
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // 對外的動作介面
    // ------------------------------------------------------------------------

    pub fn play_hand_card(&mut self, player: usize, card: CardId) -> Result<Transition, EngineError> {
        self.apply(PlayerAction::PlayHand { player, card })
    }

    pub fn select_field_target(&mut self, player: usize, card: CardId) -> Result<Transition, EngineError> {
        self.apply(PlayerAction::SelectField { player, card })
    }

    pub fn resolve_koikoi_decision(
        &mut self,
        player: usize,
        choice: KoikoiChoice,
    ) -> Result<Transition, EngineError> {
        self.apply(PlayerAction::Koikoi { player, choice })
    }

    pub fn advance(&mut self) -> Result<Transition, EngineError> {
        self.apply(PlayerAction::Advance)
    }

    /// 推進所有自動階段，直到需要玩家輸入或回合結束
    pub fn run_automatic(&mut self) -> Result<Vec<Transition>, EngineError> {
        let mut transitions = Vec::new();
        while self.phase.is_automatic() {
            transitions.push(self.advance()?);
        }
        Ok(transitions)
    }

    /// 目前需要輸入的玩家
    pub fn needs_input(&self) -> Option<usize> {
        match self.phase {
            Phase::SelectHand | Phase::SelectField | Phase::SelectDrawnMatch => Some(self.current_player),
            Phase::AwaitingKoikoiDecision => self.koikoi.decision_player,
            _ => None,
        }
    }

    // ========================================================================
    // 階段處理
    // ========================================================================

    fn expect_current(&self, player: usize) -> Result<(), EngineError> {
        if player >= self.player_count() {
            return Err(EngineError::invalid_action(format!("no player {}", player)));
        }
        if player != self.current_player {
            return Err(EngineError::invalid_action(format!(
                "player {} acted out of turn (current: {})",
                player, self.current_player
            )));
        }
        Ok(())
    }

    fn hand_position(&self, player: usize, card: CardId) -> Result<usize, EngineError> {
        self.hands[player]
            .iter()
            .position(|c| c.id == card)
            .ok_or_else(|| {
                EngineError::invalid_action(format!("card {} is not in player {}'s hand", card, player))
            })
    }

    fn play_from_hand(&mut self, player: usize, card_id: CardId) -> Result<(), EngineError> {
        self.expect_current(player)?;
        let idx = self.hand_position(player, card_id)?;
        let card = self.hands[player][idx];

        match resolve_match(&card, &self.field) {
            MatchOutcome::NoMatch => {
                self.hands[player].remove(idx);
                self.field.push(card);
                self.events.push(GameEvent::CardToField { player, card: card.id });
                debug!("player {} placed {} on the field", player, card.name);
                self.phase = Phase::Drawing;
                Ok(())
            }
            MatchOutcome::Single(target) if self.config.rules.auto_capture_single => {
                self.hands[player].remove(idx);
                self.capture(player, card, &[target], false, Phase::Drawing)
            }
            MatchOutcome::Sweep(targets) => {
                self.hands[player].remove(idx);
                self.capture(player, card, &targets, false, Phase::Drawing)
            }
            outcome => {
                self.pending = Some(card);
                self.events.push(GameEvent::CardPlayed {
                    player,
                    card: card.id,
                    candidates: outcome.targets().iter().map(|c| c.id).collect(),
                });
                self.phase = Phase::SelectField;
                Ok(())
            }
        }
    }

    fn capture_pending(&mut self, player: usize, target: CardId) -> Result<(), EngineError> {
        self.expect_current(player)?;
        let card = self
            .pending
            .ok_or_else(|| EngineError::invalid_action("no card is waiting for a field target"))?;
        let chosen = validate_target(&card, target, &self.field)?;
        let idx = self.hand_position(player, card.id)?;

        self.hands[player].remove(idx);
        self.pending = None;
        self.capture(player, card, &[chosen], false, Phase::Drawing)
    }

    fn capture_drawn(&mut self, player: usize, target: CardId) -> Result<(), EngineError> {
        self.expect_current(player)?;
        let card = self
            .drawn
            .ok_or_else(|| EngineError::invalid_action("no drawn card to match"))?;
        let chosen = validate_target(&card, target, &self.field)?;

        self.drawn = None;
        self.capture(player, card, &[chosen], true, Phase::TurnHandoff)
    }

    fn draw(&mut self) -> Result<(), EngineError> {
        let player = self.current_player;
        match self.deck.draw_one() {
            Some(card) => {
                debug!("player {} drew {}", player, card.name);
                self.drawn = Some(card);
                self.events.push(GameEvent::CardDrawn { player, card: card.id });
                self.phase = Phase::ShowDrawn;
            }
            None => {
                self.events.push(GameEvent::DeckExhausted { player });
                self.phase = Phase::TurnHandoff;
            }
        }
        Ok(())
    }

    fn show_drawn(&mut self) -> Result<(), EngineError> {
        let player = self.current_player;
        let card = self
            .drawn
            .ok_or_else(|| EngineError::invalid_action("no drawn card to show"))?;

        match resolve_match(&card, &self.field) {
            MatchOutcome::NoMatch => {
                self.drawn = None;
                self.field.push(card);
                self.events.push(GameEvent::CardToField { player, card: card.id });
                self.phase = Phase::TurnHandoff;
                Ok(())
            }
            MatchOutcome::Single(target) if self.config.rules.auto_capture_single => {
                self.drawn = None;
                self.capture(player, card, &[target], true, Phase::TurnHandoff)
            }
            MatchOutcome::Sweep(targets) => {
                self.drawn = None;
                self.capture(player, card, &targets, true, Phase::TurnHandoff)
            }
            outcome => {
                self.events.push(GameEvent::CardPlayed {
                    player,
                    card: card.id,
                    candidates: outcome.targets().iter().map(|c| c.id).collect(),
                });
                self.phase = Phase::SelectDrawnMatch;
                Ok(())
            }
        }
    }

    fn hand_off(&mut self) -> Result<(), EngineError> {
        let n = self.player_count();
        let next = (1..=n)
            .map(|offset| (self.current_player + offset) % n)
            .find(|&p| !self.hands[p].is_empty());

        match next {
            None => {
                self.end_round(RoundEndTrigger::Exhausted);
            }
            Some(player) => {
                self.current_player = player;
                self.turn += 1;
                self.events.push(GameEvent::TurnStarted { player });
                self.phase = Phase::SelectHand;
            }
        }
        Ok(())
    }

    fn decide(&mut self, player: usize, choice: KoikoiChoice) -> Result<(), EngineError> {
        self.koikoi.resolve(player, choice)?;
        self.events.push(GameEvent::DecisionResolved { player, choice });
        debug!("player {} chose {:?}", player, choice);

        match choice {
            KoikoiChoice::Stop => self.end_round(RoundEndTrigger::Stop { player }),
            KoikoiChoice::Continue => {
                self.phase = self.resume_phase.take().unwrap_or(Phase::TurnHandoff);
            }
        }
        Ok(())
    }

    /// 吃牌後重新判定役；役成立或提高時要求 koi-koi 決策
    fn capture(
        &mut self,
        player: usize,
        card: Card,
        targets: &[Card],
        from_draw: bool,
        next: Phase,
    ) -> Result<(), EngineError> {
        self.field.retain(|f| !targets.iter().any(|t| t.id == f.id));
        let mut ids = vec![card.id];
        ids.extend(targets.iter().map(|t| t.id));
        self.captured[player].push(card);
        self.captured[player].extend_from_slice(targets);
        debug!("player {} captured {:?}", player, ids);
        self.events.push(GameEvent::Captured { player, cards: ids, from_draw });

        let curr = detect(&self.captured[player], self.config.combination_set, &self.rules);
        let improved = improvements(&self.active_yaku[player], &curr);
        if curr != self.active_yaku[player] {
            self.events.push(GameEvent::YakuUpdated {
                player,
                yaku: curr.clone(),
                improved: improved.clone(),
            });
        }
        self.active_yaku[player] = curr;

        if !improved.is_empty() {
            self.koikoi.note_improvement(player);
            if self.config.koikoi_enabled && !self.is_final_action(from_draw) {
                let score = total_points(&self.active_yaku[player]);
                self.koikoi.request(player, score)?;
                self.resume_phase = Some(next);
                self.phase = Phase::AwaitingKoikoiDecision;
                self.events.push(GameEvent::DecisionRequested { player, score });
                return Ok(());
            }
        }

        self.phase = next;
        Ok(())
    }

    /// 回合的最後一個動作：手牌全空，且這次是抽牌（或牌山已空）
    fn is_final_action(&self, from_draw: bool) -> bool {
        self.hands.iter().all(|h| h.is_empty()) && (from_draw || self.deck.is_empty())
    }

    fn end_round(&mut self, trigger: RoundEndTrigger) {
        self.koikoi.finish_round();
        self.resume_phase = None;
        let facts = RoundFacts {
            dealer: self.dealer,
            captured: &self.captured,
            yaku: &self.active_yaku,
            koikoi: &self.koikoi,
            trigger,
            field_multiplier: self.field_multiplier,
        };
        let result = settle_round(&facts, &self.config);
        self.phase = Phase::RoundEnding;
        self.events.push(GameEvent::RoundEnded { result: result.clone() });
        self.result = Some(result);
    }

    // ========================================================================
    // 不變量
    // ========================================================================

    /// 所有卡牌與其區域
    pub fn zone_cards(&self) -> Vec<(Zone, Card)> {
        let mut cards: Vec<(Zone, Card)> = self.deck.cards().iter().map(|&c| (Zone::Deck, c)).collect();
        cards.extend(self.field.iter().map(|&c| (Zone::Field, c)));
        for (p, hand) in self.hands.iter().enumerate() {
            cards.extend(hand.iter().map(|&c| (Zone::Hand(p), c)));
        }
        for (p, pile) in self.captured.iter().enumerate() {
            cards.extend(pile.iter().map(|&c| (Zone::Captured(p), c)));
        }
        cards.extend(self.drawn.iter().map(|&c| (Zone::Drawn, c)));
        cards
    }

    pub fn zone_of(&self, card: CardId) -> Option<Zone> {
        self.zone_cards()
            .into_iter()
            .find(|(_, c)| c.id == card)
            .map(|(zone, _)| zone)
    }

    /// 不變量檢查，違反時 panic（邏輯錯誤，不是玩家輸入錯誤）
    pub fn assert_invariants(&self) {
        let mut seen: [Option<Zone>; DECK_SIZE] = [None; DECK_SIZE];
        let zones = self.zone_cards();
        for (zone, card) in &zones {
            let i = card.id as usize;
            assert!(i < DECK_SIZE, "unknown card id {}", card.id);
            if let Some(first) = seen[i] {
                panic!("card {} ({}) is in {:?} and {:?}", card.id, card.name, first, zone);
            }
            seen[i] = Some(*zone);
        }
        assert_eq!(zones.len(), DECK_SIZE, "zones hold {} cards", zones.len());

        assert_eq!(
            self.koikoi.waiting_for_decision,
            self.phase == Phase::AwaitingKoikoiDecision,
            "decision flag out of sync with phase {:?}",
            self.phase
        );
        if let Some(card) = self.pending {
            assert!(
                self.hands[self.current_player].contains(&card),
                "pending card {} left the hand",
                card.id
            );
        }
        assert_eq!(
            self.drawn.is_some(),
            matches!(self.phase, Phase::ShowDrawn | Phase::SelectDrawnMatch),
            "drawn card out of sync with phase {:?}",
            self.phase
        );
    }

    // ========================================================================
    // 唯讀存取
    // ========================================================================

    pub fn config(&self) -> &VariantConfig {
        &self.config
    }

    pub fn rules(&self) -> &YakuRules {
        &self.rules
    }

    pub fn player_count(&self) -> usize {
        self.hands.len()
    }

    pub fn round_index(&self) -> usize {
        self.round_index
    }

    pub fn dealer(&self) -> usize {
        self.dealer
    }

    pub fn current_player(&self) -> usize {
        self.current_player
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn turn(&self) -> usize {
        self.turn
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn field(&self) -> &[Card] {
        &self.field
    }

    pub fn hand(&self, player: usize) -> &[Card] {
        &self.hands[player]
    }

    pub fn captured(&self, player: usize) -> &[Card] {
        &self.captured[player]
    }

    pub fn drawn(&self) -> Option<Card> {
        self.drawn
    }

    pub fn pending(&self) -> Option<Card> {
        self.pending
    }

    pub fn koikoi(&self) -> &KoikoiState {
        &self.koikoi
    }

    pub fn active_yaku(&self, player: usize) -> &[Yaku] {
        &self.active_yaku[player]
    }

    pub fn field_multiplier(&self) -> i32 {
        self.field_multiplier
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn result(&self) -> Option<&RoundResult> {
        self.result.as_ref()
    }

    pub fn is_over(&self) -> bool {
        self.phase.is_terminal()
    }

    /// 目前可選的場牌
    pub fn field_candidates(&self) -> Vec<Card> {
        match self.phase {
            Phase::SelectField => self
                .pending
                .map(|c| matching_cards(&c, &self.field))
                .unwrap_or_default(),
            Phase::SelectDrawnMatch => self
                .drawn
                .map(|c| matching_cards(&c, &self.field))
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }
}

// ============================================================================
// 測試用的場面建構
// ============================================================================

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    fn cards(ids: &[CardId]) -> Vec<Card> {
        ids.iter().filter_map(|&id| Card::from_id(id)).collect()
    }

    /// 指定手牌、場牌、得牌與牌山頂端；其餘的牌依 id 順序接在牌山後面
    pub fn scripted(
        config: &VariantConfig,
        hands: &[&[CardId]],
        field: &[CardId],
        deck_top: &[CardId],
        captured: &[&[CardId]],
    ) -> RoundState {
        let mut used: Vec<CardId> = hands.iter().flat_map(|h| h.iter().copied()).collect();
        used.extend(captured.iter().flat_map(|c| c.iter().copied()));
        used.extend_from_slice(field);
        used.extend_from_slice(deck_top);

        let mut deck = cards(deck_top);
        deck.extend((0..DECK_SIZE as CardId).filter(|id| !used.contains(id)).filter_map(Card::from_id));

        RoundState::from_layout(
            config,
            0,
            hands.iter().map(|h| cards(h)).collect(),
            cards(field),
            deck,
            captured.iter().map(|c| cards(c)).collect(),
        )
        .expect("scripted layout must hold all 48 cards once")
    }
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::fixtures::scripted;
    use super::*;
    use crate::game::YakuId;
    use rand::SeedableRng;

    fn koikoi() -> VariantConfig {
        VariantConfig::koikoi()
    }

    #[test]
    fn test_deal_sizes_and_conservation() {
        for config in [VariantConfig::koikoi(), VariantConfig::koikoi_for(3), VariantConfig::koikoi_for(4), VariantConfig::sakura(2), VariantConfig::hachi_hachi()] {
            let layout = config.layout().unwrap();
            let mut rng = StdRng::seed_from_u64(11);
            let state = RoundState::deal(&config, 0, 0, &mut rng).unwrap();
            state.assert_invariants();
            if state.is_over() {
                continue;
            }
            assert_eq!(state.field().len(), layout.field_size);
            for p in 0..config.player_count {
                assert_eq!(state.hand(p).len(), layout.hand_size);
            }
            assert_eq!(state.phase(), Phase::SelectHand);
            assert_eq!(state.current_player(), 0);
        }
    }

    #[test]
    fn test_deal_never_leaves_four_of_a_month_on_field() {
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let state = RoundState::deal(&koikoi(), 0, 0, &mut rng).unwrap();
            assert!(!has_full_month(state.field()), "seed {}", seed);
        }
    }

    #[test]
    fn test_hand_yaku_ends_round_at_deal() {
        let found = (0..3000u64).find_map(|seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let state = RoundState::deal(&koikoi(), 0, 0, &mut rng).ok()?;
            state.is_over().then_some(state)
        });
        let state = found.expect("some deal should contain Teshi or Kuttsuki");
        let result = state.result().unwrap();
        match result.trigger {
            RoundEndTrigger::HandYaku { player, yaku, points } => {
                assert!(yaku == YakuId::Teshi || yaku == YakuId::Kuttsuki);
                assert_eq!(points, 6);
                assert_eq!(result.scores[player], 6);
            }
            ref other => panic!("unexpected trigger {:?}", other),
        }
    }

    #[test]
    fn test_play_without_match_goes_to_field() {
        // 2 = 松のカス，場上沒有松
        let mut state = scripted(&koikoi(), &[&[2], &[6]], &[4, 8], &[], &[&[], &[]]);
        let t = state.play_hand_card(0, 2).unwrap();
        assert_eq!(t.to, Phase::Drawing);
        assert_eq!(state.zone_of(2), Some(Zone::Field));
        assert!(t.events.iter().any(|e| matches!(e, GameEvent::CardToField { card: 2, .. })));
    }

    #[test]
    fn test_single_match_auto_captures() {
        let mut state = scripted(&koikoi(), &[&[2], &[6]], &[0, 8], &[], &[&[], &[]]);
        state.play_hand_card(0, 2).unwrap();
        assert_eq!(state.zone_of(2), Some(Zone::Captured(0)));
        assert_eq!(state.zone_of(0), Some(Zone::Captured(0)));
        assert_eq!(state.phase(), Phase::Drawing);
    }

    #[test]
    fn test_single_match_without_auto_capture_asks() {
        let mut config = koikoi();
        config.rules.auto_capture_single = false;
        let mut state = scripted(&config, &[&[2], &[6]], &[0, 8], &[], &[&[], &[]]);
        state.play_hand_card(0, 2).unwrap();
        assert_eq!(state.phase(), Phase::SelectField);
        assert_eq!(state.field_candidates().iter().map(|c| c.id).collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_two_matches_require_choice() {
        let mut state = scripted(&koikoi(), &[&[2, 12], &[6]], &[0, 1, 8], &[], &[&[], &[]]);
        let t = state.play_hand_card(0, 2).unwrap();
        assert_eq!(t.to, Phase::SelectField);
        // 仍在手牌，直到吃牌
        assert_eq!(state.zone_of(2), Some(Zone::Hand(0)));

        // 不同月 → IllegalTarget，狀態不變
        let err = state.select_field_target(0, 8).unwrap_err();
        assert!(matches!(err, EngineError::IllegalTarget(_)));
        assert_eq!(state.phase(), Phase::SelectField);

        state.select_field_target(0, 1).unwrap();
        assert_eq!(state.zone_of(1), Some(Zone::Captured(0)));
        assert_eq!(state.zone_of(0), Some(Zone::Field));
        assert_eq!(state.phase(), Phase::Drawing);
    }

    #[test]
    fn test_out_of_turn_and_missing_card() {
        let mut state = scripted(&koikoi(), &[&[2], &[6]], &[8], &[], &[&[], &[]]);
        assert!(matches!(state.play_hand_card(1, 6), Err(EngineError::InvalidAction(_))));
        assert!(matches!(state.play_hand_card(0, 6), Err(EngineError::InvalidAction(_))));
        assert!(matches!(state.advance(), Err(EngineError::InvalidAction(_))));
        assert_eq!(state.phase(), Phase::SelectHand);
    }

    #[test]
    fn test_draw_and_turn_handoff() {
        // 牌山頂端 9 = 桜の赤短，場上 8 = 桜に幕 → 單一配對
        let mut state = scripted(&koikoi(), &[&[2], &[6]], &[8], &[9], &[&[], &[]]);
        state.play_hand_card(0, 2).unwrap();
        let t = state.advance().unwrap();
        assert_eq!(t.to, Phase::ShowDrawn);
        assert_eq!(state.drawn().map(|c| c.id), Some(9));

        state.advance().unwrap();
        assert_eq!(state.zone_of(9), Some(Zone::Captured(0)));
        assert_eq!(state.phase(), Phase::TurnHandoff);

        state.advance().unwrap();
        assert_eq!(state.phase(), Phase::SelectHand);
        assert_eq!(state.current_player(), 1);
    }

    #[test]
    fn test_capture_suspends_for_decision() {
        // 已有猪(24)鹿(36)，打出牡丹カス(22)吃蝶(20)
        let mut state = scripted(&koikoi(), &[&[22, 3], &[6]], &[20, 8], &[], &[&[24, 36], &[]]);
        let t = state.play_hand_card(0, 22).unwrap();
        assert_eq!(t.to, Phase::AwaitingKoikoiDecision);
        assert_eq!(state.koikoi().decision_player, Some(0));
        assert_eq!(state.needs_input(), Some(0));

        assert!(matches!(state.play_hand_card(0, 3), Err(EngineError::InvalidAction(_))));
        assert!(matches!(state.advance(), Err(EngineError::InvalidAction(_))));
        assert!(matches!(
            state.resolve_koikoi_decision(1, KoikoiChoice::Stop),
            Err(EngineError::IllegalTarget(_))
        ));
        assert_eq!(state.phase(), Phase::AwaitingKoikoiDecision);

        state.resolve_koikoi_decision(0, KoikoiChoice::Stop).unwrap();
        assert!(state.is_over());
        let result = state.result().unwrap();
        assert_eq!(result.scores, vec![5, 0]);
        assert!(matches!(state.advance(), Err(EngineError::InvalidAction(_))));
    }

    #[test]
    fn test_continue_resumes_where_it_stopped() {
        let mut state = scripted(&koikoi(), &[&[22, 3], &[6]], &[20, 8], &[], &[&[24, 36], &[]]);
        state.play_hand_card(0, 22).unwrap();
        let t = state.resolve_koikoi_decision(0, KoikoiChoice::Continue).unwrap();
        assert_eq!(t.to, Phase::Drawing);
        assert_eq!(state.koikoi().called_count[0], 1);
        assert!(state.koikoi().round_active);
    }

    #[test]
    fn test_no_decision_when_koikoi_disabled() {
        let config = VariantConfig::sakura(2);
        let mut state = scripted(&config, &[&[22, 3], &[6]], &[20, 8], &[], &[&[24, 36], &[]]);
        state.play_hand_card(0, 22).unwrap();
        assert_eq!(state.phase(), Phase::Drawing);
        assert_eq!(state.active_yaku(0)[0].id, YakuId::Inoshikacho);
    }

    #[test]
    fn test_exhaustion_at_handoff() {
        // 每人一張手牌；牌山頂端都不會配對
        let mut state = scripted(&koikoi(), &[&[2], &[6]], &[8], &[12, 16], &[&[], &[]]);
        for _ in 0..2 {
            let player = state.current_player();
            let card = state.hand(player)[0].id;
            state.play_hand_card(player, card).unwrap();
            state.run_automatic().unwrap();
        }
        assert!(state.is_over());
        assert_eq!(state.result().unwrap().trigger, RoundEndTrigger::Exhausted);
        assert_eq!(state.result().unwrap().winner, None);
    }

    #[test]
    fn test_from_layout_rejects_duplicates() {
        let config = koikoi();
        let card = Card::from_id(0).unwrap();
        let err = RoundState::from_layout(
            &config,
            0,
            vec![vec![card], vec![card]],
            Vec::new(),
            Vec::new(),
            vec![Vec::new(), Vec::new()],
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig(_)));
    }

    #[test]
    fn test_hachi_field_multiplier() {
        let config = VariantConfig::hachi_hachi();
        let state = scripted(&config, &[&[2], &[6], &[10]], &[40, 14], &[], &[&[], &[], &[]]);
        assert_eq!(state.field_multiplier(), 4);
        let state = scripted(&config, &[&[2], &[6], &[10]], &[0, 14], &[], &[&[], &[], &[]]);
        assert_eq!(state.field_multiplier(), 2);
        let state = scripted(&config, &[&[2], &[6], &[10]], &[1, 14], &[], &[&[], &[], &[]]);
        assert_eq!(state.field_multiplier(), 1);
    }
}
