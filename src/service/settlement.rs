//! 結算引擎
//!
//! 回合結算依序套用：
//! 1. 役的基本分數
//! 2. 喊了 koi-koi 卻沒有再提高役 → 歸零
//! 3. 對手喊過 koi-koi → ×2
//! 4. 變體規則（7 點以上翻倍、親權、各自計分、八八基準）
//!
//! 對局結算：累計分數，或依分差階梯計算勝場。

use log::info;
use serde::Serialize;

use crate::game::{
    card_points, total_points, Card, MultiplierMode, ScoringMode, VariantConfig, Yaku, YakuId,
    HIGH_SCORE_MULTIPLIER, HIGH_SCORE_THRESHOLD, KAN_POINTS, KOIKOI_MULTIPLIER,
};

use super::koikoi::KoikoiState;

/// 回合結束的原因
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum RoundEndTrigger {
    /// 玩家選擇停止
    Stop { player: usize },
    /// 所有手牌打完
    Exhausted,
    /// 發牌時的手役
    HandYaku { player: usize, yaku: YakuId, points: i32 },
}

/// 結算所需的回合資料
#[derive(Clone, Debug)]
pub struct RoundFacts<'a> {
    pub dealer: usize,
    pub captured: &'a [Vec<Card>],
    pub yaku: &'a [Vec<Yaku>],
    pub koikoi: &'a KoikoiState,
    pub trigger: RoundEndTrigger,
    /// 八八：發牌時場上的光札決定
    pub field_multiplier: i32,
}

impl RoundFacts<'_> {
    fn player_count(&self) -> usize {
        self.captured.len()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoundResult {
    /// 本回合每位玩家的分數變化
    pub scores: Vec<i32>,
    /// 套用任何規則前的役分數
    pub base: Vec<i32>,
    pub winner: Option<usize>,
    pub trigger: RoundEndTrigger,
    pub multiplied: Vec<bool>,
    pub forfeited: Vec<bool>,
}

impl RoundResult {
    fn empty(n: usize, trigger: RoundEndTrigger) -> Self {
        Self {
            scores: vec![0; n],
            base: vec![0; n],
            winner: None,
            trigger,
            multiplied: vec![false; n],
            forfeited: vec![false; n],
        }
    }

    /// 勝者領先第二名的分差
    pub fn margin(&self) -> i32 {
        let Some(winner) = self.winner else {
            return 0;
        };
        let runner_up = self
            .scores
            .iter()
            .enumerate()
            .filter(|&(p, _)| p != winner)
            .map(|(_, &s)| s)
            .max()
            .unwrap_or(0);
        self.scores[winner] - runner_up
    }
}

/// 唯一的最高分玩家
fn unique_max(values: &[i32]) -> Option<usize> {
    let best = *values.iter().max()?;
    let mut leaders = values.iter().enumerate().filter(|&(_, &v)| v == best);
    let (first, _) = leaders.next()?;
    if leaders.next().is_some() {
        None
    } else {
        Some(first)
    }
}

// ============================================================================
// 回合結算
// ============================================================================

pub fn settle_round(facts: &RoundFacts, config: &VariantConfig) -> RoundResult {
    let result = match config.scoring_mode() {
        ScoringMode::WinnerTakeAll => settle_winner_take_all(facts, config),
        ScoringMode::Independent => settle_independent(facts, config),
        ScoringMode::Par { par } => settle_par(facts, config, par),
    };
    info!(
        "round settled: trigger={:?} scores={:?} winner={:?}",
        result.trigger, result.scores, result.winner
    );
    result
}

/// 單一得分者的分數：倍率 → 7 點以上翻倍
fn scorer_points(base: i32, player: usize, facts: &RoundFacts, config: &VariantConfig) -> (i32, bool) {
    let multiplied = config.multiplier_mode == MultiplierMode::OpponentTriggered
        && facts.koikoi.multiplier_eligible(player);
    let mut score = base;
    if multiplied {
        score *= KOIKOI_MULTIPLIER;
    }
    if config.rules.double_over_seven && base >= HIGH_SCORE_THRESHOLD {
        score *= HIGH_SCORE_MULTIPLIER;
    }
    (score, multiplied)
}

fn settle_winner_take_all(facts: &RoundFacts, config: &VariantConfig) -> RoundResult {
    let n = facts.player_count();
    let mut result = RoundResult::empty(n, facts.trigger.clone());
    for p in 0..n {
        result.base[p] = total_points(&facts.yaku[p]);
        result.forfeited[p] = facts.koikoi.is_forfeited(p);
    }

    match facts.trigger {
        RoundEndTrigger::HandYaku { player, points, .. } => {
            result.base[player] = points;
            result.scores[player] = points;
            result.winner = Some(player);
        }
        RoundEndTrigger::Stop { player } => {
            if !result.forfeited[player] {
                let (score, multiplied) = scorer_points(result.base[player], player, facts, config);
                result.scores[player] = score;
                result.multiplied[player] = multiplied;
            }
            result.winner = Some(player);
        }
        RoundEndTrigger::Exhausted => {
            let scorers: Vec<usize> = (0..n)
                .filter(|&p| result.base[p] > 0 && !result.forfeited[p])
                .collect();
            match scorers.as_slice() {
                [] => {
                    if let Some(points) = config.rules.dealer_privilege {
                        result.scores[facts.dealer] = points;
                        result.winner = Some(facts.dealer);
                    }
                }
                [only] => {
                    let (score, multiplied) = scorer_points(result.base[*only], *only, facts, config);
                    result.scores[*only] = score;
                    result.multiplied[*only] = multiplied;
                    result.winner = Some(*only);
                }
                many => {
                    // 多人持役：允許各自得分時各自結算，否則平手不計分
                    if config.both_players_score {
                        for &p in many {
                            let (score, multiplied) = scorer_points(result.base[p], p, facts, config);
                            result.scores[p] = score;
                            result.multiplied[p] = multiplied;
                        }
                        result.winner = unique_max(&result.scores);
                    }
                }
            }
        }
    }
    result
}

fn settle_independent(facts: &RoundFacts, config: &VariantConfig) -> RoundResult {
    let n = facts.player_count();
    let values = config.card_values();
    let mut result = RoundResult::empty(n, facts.trigger.clone());
    for p in 0..n {
        result.base[p] = total_points(&facts.yaku[p]);
        result.scores[p] = card_points(&facts.captured[p], &values) + result.base[p];
    }
    result.winner = unique_max(&result.scores);
    result
}

/// 八八：(牌點 - 基準) × 場倍率，再加上役的收支（每位對手各付一次）
fn settle_par(facts: &RoundFacts, config: &VariantConfig, par: i32) -> RoundResult {
    let n = facts.player_count();
    let values = config.card_values();
    let m = facts.field_multiplier;
    let mut result = RoundResult::empty(n, facts.trigger.clone());

    let kan: Vec<i32> = facts.yaku.iter().map(|y| total_points(y)).collect();
    let kan_total: i32 = kan.iter().sum();
    for p in 0..n {
        result.base[p] = kan[p] * KAN_POINTS;
        let cards = card_points(&facts.captured[p], &values) - par;
        // 收 (n-1) 份自己的役，付出其他人的役
        let transfer = kan[p] * (n as i32 - 1) - (kan_total - kan[p]);
        result.scores[p] = (cards + transfer * KAN_POINTS) * m;
        result.multiplied[p] = m > 1;
    }
    result.winner = unique_max(&result.scores);
    result
}

// ============================================================================
// 對局結算
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub totals: Vec<i32>,
    pub round_wins: Vec<u32>,
    /// None 表示平手
    pub winner: Option<usize>,
}

/// 單一回合帶來的勝場數
pub fn round_wins_for(result: &RoundResult, config: &VariantConfig) -> Option<(usize, u32)> {
    let winner = result.winner?;
    if result.scores[winner] <= 0 {
        return None;
    }
    let wins = config
        .win_counting
        .as_ref()
        .map_or(1, |wc| wc.wins_for_margin(result.margin()));
    Some((winner, wins))
}

pub fn settle_match(rounds: &[RoundResult], config: &VariantConfig) -> MatchResult {
    let n = config.player_count;
    let mut totals = vec![0; n];
    let mut round_wins = vec![0u32; n];

    for round in rounds {
        for (total, score) in totals.iter_mut().zip(&round.scores) {
            *total += score;
        }
        if let Some((winner, wins)) = round_wins_for(round, config) {
            round_wins[winner] += wins;
        }
    }

    let winner = if config.win_counting.is_some() {
        let wins: Vec<i32> = round_wins.iter().map(|&w| w as i32).collect();
        unique_max(&wins)
    } else {
        unique_max(&totals)
    };

    info!("match settled: totals={:?} wins={:?} winner={:?}", totals, round_wins, winner);
    MatchResult { totals, round_wins, winner }
}

// ============================================================================
// 單元測試
// ============================================================================
