//! Observation 構建
//!
//! 兩種唯讀投影：
//! - `StateSnapshot`：呈現層用的狀態快照，依觀看者隱藏對手手牌
//! - `observation`：固定長度的數值向量，包含：
//!   - 標量特徵（牌山、場牌、分數、koi-koi 狀態等）
//!   - 階段 one-hot
//!   - 每張牌所在區域 one-hot（從觀看者的角度）
//!
//! 兩者都是複製出來的資料，不持有內部容器的參照。

use serde::Serialize;

use crate::game::{
    total_points, Card, CardId, Phase, Yaku, CARD_ZONE_FEATURES, DECK_SIZE, OBS_SIZE, PHASE_COUNT,
    SCALAR_COUNT, ZONE_FEATURES,
};

use super::koikoi::KoikoiState;
use super::session::MatchState;
use super::settlement::{MatchResult, RoundResult};
use super::state::Zone;

/// 數值張量
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Tensor {
    pub data: Vec<f32>,
    pub shape: Vec<i32>,
}

// ============================================================================
// 狀態快照
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StateSnapshot {
    pub round: usize,
    pub dealer: usize,
    pub phase: Phase,
    pub current_player: usize,
    pub deck_remaining: usize,
    pub field: Vec<Card>,
    /// 看不到的手牌為 None
    pub hands: Vec<Option<Vec<Card>>>,
    pub hand_sizes: Vec<usize>,
    pub captured: Vec<Vec<Card>>,
    pub yaku: Vec<Vec<Yaku>>,
    /// 對局累計分數
    pub scores: Vec<i32>,
    pub koikoi: KoikoiState,
    pub pending: Option<Card>,
    pub drawn: Option<Card>,
    pub candidates: Vec<CardId>,
    pub field_multiplier: i32,
    pub round_result: Option<RoundResult>,
    pub match_result: Option<MatchResult>,
}

impl StateSnapshot {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// 建立快照；viewer 為 None 時顯示全部手牌
pub fn snapshot(game: &MatchState, viewer: Option<usize>) -> StateSnapshot {
    let round = game.round();
    let n = round.player_count();
    let visible = |p: usize| viewer.map_or(true, |v| v == p);

    StateSnapshot {
        round: round.round_index(),
        dealer: round.dealer(),
        phase: round.phase(),
        current_player: round.current_player(),
        deck_remaining: round.deck().len(),
        field: round.field().to_vec(),
        hands: (0..n)
            .map(|p| visible(p).then(|| round.hand(p).to_vec()))
            .collect(),
        hand_sizes: (0..n).map(|p| round.hand(p).len()).collect(),
        captured: (0..n).map(|p| round.captured(p).to_vec()).collect(),
        yaku: (0..n).map(|p| round.active_yaku(p).to_vec()).collect(),
        scores: game.totals(),
        koikoi: round.koikoi().clone(),
        pending: round.pending().filter(|_| visible(round.current_player())),
        drawn: round.drawn(),
        candidates: round.field_candidates().iter().map(|c| c.id).collect(),
        field_multiplier: round.field_multiplier(),
        round_result: round.result().cloned(),
        match_result: game.match_result().cloned(),
    }
}

// ============================================================================
// 數值 observation
// ============================================================================

/// 從 seat 的角度，卡牌區域的 one-hot 位置
fn zone_feature(zone: Zone, seat: usize) -> usize {
    match zone {
        Zone::Hand(p) if p == seat => 0,
        Zone::Field => 1,
        Zone::Captured(p) if p == seat => 2,
        Zone::Captured(_) => 3,
        Zone::Drawn => 4,
        // 牌山與對手手牌
        Zone::Deck | Zone::Hand(_) => 5,
    }
}

/// 從遊戲狀態構建 seat 的 observation tensor
pub fn observation(game: &MatchState, seat: usize) -> Tensor {
    let round = game.round();
    let n = round.player_count();
    let seat = seat.min(n.saturating_sub(1));
    let opponents: Vec<usize> = (0..n).filter(|&p| p != seat).collect();
    let koikoi = round.koikoi();

    let mut data = Vec::with_capacity(OBS_SIZE as usize);

    // ============================================================================
    // Scalars (12)
    // ============================================================================
    let deck_size = DECK_SIZE as f32;
    data.push(round.deck().len() as f32 / deck_size); // 0: 牌山剩餘
    data.push(round.field().len() as f32 / deck_size); // 1: 場牌數
    data.push(round.hand(seat).len() as f32 / 10.0); // 2: 手牌數
    data.push(round.captured(seat).len() as f32 / deck_size); // 3: 自己得牌數
    let opp_captured = opponents.iter().map(|&p| round.captured(p).len()).max().unwrap_or(0);
    data.push(opp_captured as f32 / deck_size); // 4: 對手最多得牌數
    data.push(total_points(round.active_yaku(seat)) as f32 / 20.0); // 5: 自己役分
    let opp_yaku = opponents
        .iter()
        .map(|&p| total_points(round.active_yaku(p)))
        .max()
        .unwrap_or(0);
    data.push(opp_yaku as f32 / 20.0); // 6: 對手最高役分
    data.push(if koikoi.decision_player == Some(seat) { 1.0 } else { 0.0 }); // 7: 等待自己決策
    data.push(if koikoi.has_called(seat) { 1.0 } else { 0.0 }); // 8: 自己喊過
    data.push(if koikoi.multiplier_eligible(seat) { 1.0 } else { 0.0 }); // 9: 對手喊過
    let rounds = game.config().rounds.max(1) as f32;
    data.push(round.round_index() as f32 / rounds); // 10: 回合進度
    data.push(if round.dealer() == seat { 1.0 } else { 0.0 }); // 11: 莊家

    assert_eq!(data.len(), SCALAR_COUNT, "Scalar count mismatch");

    // ============================================================================
    // Phase one-hot (8)
    // ============================================================================
    let mut phase = [0.0f32; PHASE_COUNT];
    phase[round.phase().to_int()] = 1.0;
    data.extend_from_slice(&phase);

    // ============================================================================
    // Card zones (48 × 6)
    // ============================================================================
    let mut zones = vec![0.0f32; CARD_ZONE_FEATURES];
    for (zone, card) in round.zone_cards() {
        zones[card.id as usize * ZONE_FEATURES + zone_feature(zone, seat)] = 1.0;
    }
    data.extend(zones);

    assert_eq!(data.len(), OBS_SIZE as usize, "Observation size mismatch");

    Tensor {
        data,
        shape: vec![OBS_SIZE],
    }
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Difficulty, VariantConfig};
    use crate::service::session::PlayerSeat;

    fn game() -> MatchState {
        MatchState::new(
            VariantConfig::koikoi(),
            PlayerSeat::human_vs_ai(2, Difficulty::Normal),
            21,
        )
        .unwrap()
    }

    #[test]
    fn test_observation_size() {
        let game = game();
        let obs = observation(&game, 0);
        assert_eq!(obs.data.len(), OBS_SIZE as usize);
        assert_eq!(obs.shape, vec![OBS_SIZE]);
    }

    #[test]
    fn test_every_card_has_one_zone() {
        let game = game();
        let obs = observation(&game, 1);
        let zones = &obs.data[SCALAR_COUNT + PHASE_COUNT..];
        for card in 0..DECK_SIZE {
            let row = &zones[card * ZONE_FEATURES..(card + 1) * ZONE_FEATURES];
            assert_eq!(row.iter().sum::<f32>(), 1.0, "card {}", card);
        }
    }

    #[test]
    fn test_opponent_hand_is_unknown() {
        let game = game();
        let obs = observation(&game, 0);
        let zones = &obs.data[SCALAR_COUNT + PHASE_COUNT..];
        for card in game.round().hand(1) {
            let row = card.id as usize * ZONE_FEATURES;
            assert_eq!(zones[row + 5], 1.0);
            assert_eq!(zones[row], 0.0);
        }
        for card in game.round().hand(0) {
            assert_eq!(zones[card.id as usize * ZONE_FEATURES], 1.0);
        }
    }

    #[test]
    fn test_snapshot_hides_other_hands() {
        let game = game();
        let view = snapshot(&game, Some(0));
        assert!(view.hands[0].is_some());
        assert!(view.hands[1].is_none());
        assert_eq!(view.hand_sizes[1], game.round().hand(1).len());

        let full = snapshot(&game, None);
        assert!(full.hands.iter().all(|h| h.is_some()));
        assert!(full.to_json().contains("\"phase\""));
    }
}
