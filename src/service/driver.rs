//! 對局推進
//!
//! 自動階段直接推進，AI 座位交給 `OpponentPolicy`，遇到玩家座位就停下來。

use crate::game::{EngineError, Phase};

use super::policy::OpponentPolicy;
use super::session::{MatchState, PlayerSeat};
use super::settlement::MatchResult;
use super::state::{PlayerAction, Transition};

/// 依座位建立 AI；玩家座位為 None
pub fn policies_for(seats: &[PlayerSeat], seed: u64) -> Vec<Option<OpponentPolicy>> {
    seats
        .iter()
        .map(|seat| {
            seat.difficulty
                .filter(|_| !seat.is_human)
                .map(|d| OpponentPolicy::new(d, seed.wrapping_add(seat.index as u64 + 1)))
        })
        .collect()
}

/// 推進到需要玩家輸入、回合結束或對局結束為止
pub fn run_until_input(
    game: &mut MatchState,
    policies: &mut [Option<OpponentPolicy>],
) -> Result<Vec<Transition>, EngineError> {
    let mut transitions = Vec::new();
    loop {
        if game.is_finished() || game.round().phase() == Phase::RoundEnding {
            break;
        }
        if game.round().phase().is_automatic() {
            transitions.push(game.apply(PlayerAction::Advance)?);
            continue;
        }

        let Some(player) = game.needs_input() else {
            break;
        };
        let action = match policies.get_mut(player) {
            Some(Some(policy)) => policy.choose_action(game.round(), player),
            _ => break,
        };
        let action = action.ok_or_else(|| {
            EngineError::invalid_action(format!("AI seat {} has no legal action", player))
        })?;
        transitions.push(game.apply(action)?);
    }
    Ok(transitions)
}

/// 全部由 AI 打完整場對局
pub fn play_out(
    game: &mut MatchState,
    policies: &mut [Option<OpponentPolicy>],
) -> Result<MatchResult, EngineError> {
    loop {
        run_until_input(game, policies)?;
        if let Some(result) = game.match_result() {
            return Ok(result.clone());
        }
        if game.round().is_over() {
            game.next_round()?;
            continue;
        }
        return Err(EngineError::invalid_action(format!(
            "seat {:?} needs human input",
            game.needs_input()
        )));
    }
}

// ============================================================================
// 單元測試
// ============================================================================
