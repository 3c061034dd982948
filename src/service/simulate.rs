//! 批次模擬
//!
//! 在一段 seed 範圍內平行跑 AI 對 AI 的完整對局並彙總結果。

use std::ops::Range;

use log::info;
use rayon::prelude::*;
use serde::Serialize;

use crate::game::{Difficulty, EngineError, VariantConfig};

use super::driver::{play_out, policies_for};
use super::session::{MatchState, PlayerSeat};
use super::settlement::MatchResult;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub games: usize,
    /// 每個座位的勝場
    pub wins: Vec<usize>,
    pub ties: usize,
    pub average_scores: Vec<f64>,
}

/// 跑一場完整對局
pub fn simulate_one(
    config: &VariantConfig,
    difficulties: &[Difficulty],
    seed: u64,
) -> Result<MatchResult, EngineError> {
    let seats = PlayerSeat::all_ai(difficulties);
    let mut policies = policies_for(&seats, seed);
    let mut game = MatchState::new(config.clone(), seats, seed)?;
    play_out(&mut game, &mut policies)
}

/// 平行模擬 seeds 範圍內的每一場
pub fn simulate(
    config: &VariantConfig,
    difficulties: &[Difficulty],
    seeds: Range<u64>,
) -> Result<SimulationSummary, EngineError> {
    config.validate()?;
    if difficulties.len() != config.player_count {
        return Err(EngineError::invalid_config(format!(
            "{} difficulties for {} players",
            difficulties.len(),
            config.player_count
        )));
    }

    let results: Vec<MatchResult> = seeds
        .into_par_iter()
        .map(|seed| simulate_one(config, difficulties, seed))
        .collect::<Result<_, _>>()?;

    let n = config.player_count;
    let games = results.len();
    let mut wins = vec![0; n];
    let mut ties = 0;
    let mut totals = vec![0i64; n];
    for result in &results {
        match result.winner {
            Some(w) => wins[w] += 1,
            None => ties += 1,
        }
        for (total, &score) in totals.iter_mut().zip(&result.totals) {
            *total += score as i64;
        }
    }
    let average_scores = totals
        .iter()
        .map(|&t| if games == 0 { 0.0 } else { t as f64 / games as f64 })
        .collect();

    info!("simulated {} games: wins={:?} ties={}", games, wins, ties);
    Ok(SimulationSummary { games, wins, ties, average_scores })
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_every_game() {
        let config = VariantConfig::koikoi();
        let summary = simulate(&config, &[Difficulty::Easy, Difficulty::Hard], 0..8).unwrap();
        assert_eq!(summary.games, 8);
        assert_eq!(summary.wins.iter().sum::<usize>() + summary.ties, 8);
        assert_eq!(summary.average_scores.len(), 2);
    }

    #[test]
    fn test_simulation_is_deterministic() {
        let config = VariantConfig::hachi_hachi();
        let difficulties = [Difficulty::Normal; 3];
        let a = simulate(&config, &difficulties, 3..6).unwrap();
        let b = simulate(&config, &difficulties, 3..6).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_par_totals_are_zero_sum() {
        let config = VariantConfig::hachi_hachi();
        let result = simulate_one(&config, &[Difficulty::Hard; 3], 9).unwrap();
        assert_eq!(result.totals.iter().sum::<i32>(), 0);
    }

    #[test]
    fn test_difficulty_count_checked() {
        let config = VariantConfig::koikoi();
        assert!(simulate(&config, &[Difficulty::Easy], 0..1).is_err());
    }
}
