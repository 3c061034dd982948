//! 對局管理
//!
//! `MatchState` 持有整場對局的亂數源、座位與已結算的回合。
//! 回合內的所有變化仍然只經過 `RoundState::apply`。

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::game::{CombinationSet, Difficulty, EngineError, VariantConfig};

use super::events::GameEvent;
use super::settlement::{round_wins_for, settle_match, MatchResult, RoundResult};
use super::state::{PlayerAction, RoundState, Transition};

/// 座位
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlayerSeat {
    pub index: usize,
    pub is_human: bool,
    /// AI 座位的難度
    pub difficulty: Option<Difficulty>,
    pub match_score: i32,
    pub round_wins: u32,
}

impl PlayerSeat {
    pub fn human(index: usize) -> Self {
        Self { index, is_human: true, difficulty: None, match_score: 0, round_wins: 0 }
    }

    pub fn ai(index: usize, difficulty: Difficulty) -> Self {
        Self { index, is_human: false, difficulty: Some(difficulty), match_score: 0, round_wins: 0 }
    }

    /// 座位 0 為玩家，其餘為 AI
    pub fn human_vs_ai(player_count: usize, difficulty: Difficulty) -> Vec<Self> {
        (0..player_count)
            .map(|i| if i == 0 { Self::human(0) } else { Self::ai(i, difficulty) })
            .collect()
    }

    pub fn all_ai(difficulties: &[Difficulty]) -> Vec<Self> {
        difficulties.iter().enumerate().map(|(i, &d)| Self::ai(i, d)).collect()
    }
}

/// 下一局的莊家：Koi-Koi 由贏家做莊，其他變體輪流
pub fn next_dealer(config: &VariantConfig, dealer: usize, winner: Option<usize>) -> usize {
    match (config.combination_set, winner) {
        (CombinationSet::KoiKoi, Some(winner)) => winner,
        (CombinationSet::KoiKoi, None) => dealer,
        _ => (dealer + 1) % config.player_count,
    }
}

/// 整場對局
#[derive(Clone, Debug)]
pub struct MatchState {
    config: VariantConfig,
    seed: u64,
    rng: StdRng,
    seats: Vec<PlayerSeat>,
    round: RoundState,
    /// 目前回合是否已計入
    recorded: bool,
    results: Vec<RoundResult>,
    event_log: Vec<GameEvent>,
    match_result: Option<MatchResult>,
}

impl MatchState {
    pub fn new(config: VariantConfig, seats: Vec<PlayerSeat>, seed: u64) -> Result<Self, EngineError> {
        config.validate()?;
        if seats.len() != config.player_count {
            return Err(EngineError::invalid_config(format!(
                "{} seats for a {}-player variant",
                seats.len(),
                config.player_count
            )));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let round = RoundState::deal(&config, 0, 0, &mut rng)?;
        let mut state = Self {
            event_log: round.events().to_vec(),
            config,
            seed,
            rng,
            seats,
            round,
            recorded: false,
            results: Vec::new(),
            match_result: None,
        };
        state.record_round();
        info!("match started: seed={} players={}", seed, state.seats.len());
        Ok(state)
    }

    /// 套用動作並記錄事件；回合結束時自動結算
    pub fn apply(&mut self, action: PlayerAction) -> Result<Transition, EngineError> {
        if self.is_finished() {
            return Err(EngineError::invalid_action("match is over"));
        }
        let mut transition = self.round.apply(action)?;
        self.event_log.extend(transition.events.iter().cloned());
        if let Some(event) = self.record_round() {
            transition.events.push(event);
        }
        Ok(transition)
    }

    /// 回合結束時計入結果；最後一回合結束時回傳 MatchEnded
    fn record_round(&mut self) -> Option<GameEvent> {
        if self.recorded {
            return None;
        }
        let result = self.round.result()?.clone();
        self.recorded = true;

        for (seat, score) in self.seats.iter_mut().zip(&result.scores) {
            seat.match_score += score;
        }
        if let Some((winner, wins)) = round_wins_for(&result, &self.config) {
            self.seats[winner].round_wins += wins;
        }
        self.results.push(result);

        if self.results.len() < self.config.rounds {
            return None;
        }
        let summary = settle_match(&self.results, &self.config);
        let event = GameEvent::MatchEnded { result: summary.clone() };
        self.event_log.push(event.clone());
        self.match_result = Some(summary);
        Some(event)
    }

    /// 開始下一回合
    pub fn next_round(&mut self) -> Result<&RoundState, EngineError> {
        if self.is_finished() {
            return Err(EngineError::invalid_action("match is over"));
        }
        if !self.round.is_over() {
            return Err(EngineError::invalid_action("current round is still in progress"));
        }

        let winner = self.results.last().and_then(|r| r.winner);
        let dealer = next_dealer(&self.config, self.round.dealer(), winner);
        self.round = RoundState::deal(&self.config, self.results.len(), dealer, &mut self.rng)?;
        self.recorded = false;
        self.event_log.extend(self.round.events().iter().cloned());
        self.record_round();
        Ok(&self.round)
    }

    // ========================================================================
    // 唯讀存取
    // ========================================================================

    pub fn config(&self) -> &VariantConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn seats(&self) -> &[PlayerSeat] {
        &self.seats
    }

    pub fn seat(&self, index: usize) -> Option<&PlayerSeat> {
        self.seats.get(index)
    }

    pub fn player_count(&self) -> usize {
        self.seats.len()
    }

    pub fn results(&self) -> &[RoundResult] {
        &self.results
    }

    /// 已開始的回合數（含目前回合）
    pub fn rounds_played(&self) -> usize {
        self.round.round_index() + 1
    }

    pub fn totals(&self) -> Vec<i32> {
        self.seats.iter().map(|s| s.match_score).collect()
    }

    pub fn event_log(&self) -> &[GameEvent] {
        &self.event_log
    }

    /// 從 index 之後的事件（串流用）
    pub fn events_since(&self, index: usize) -> &[GameEvent] {
        self.event_log.get(index..).unwrap_or(&[])
    }

    pub fn match_result(&self) -> Option<&MatchResult> {
        self.match_result.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.match_result.is_some()
    }

    /// 等待輸入的座位
    pub fn needs_input(&self) -> Option<usize> {
        if self.is_finished() {
            None
        } else {
            self.round.needs_input()
        }
    }
}

// ============================================================================
// 單元測試
// ============================================================================
