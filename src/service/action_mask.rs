//! Action Mask 構建
//!
//! 動作以 (action_type, card) 編碼：
//! - 0 PLAY_HAND + 手牌 id
//! - 1 SELECT_FIELD + 場牌 id
//! - 2 ADVANCE
//! - 3 KOIKOI_CONTINUE / 4 KOIKOI_STOP
//! - 5 NEXT_ROUND（回合結束後開始下一回合）

use crate::game::{
    CardId, EngineError, Phase, ACTION_MASK_SIZE, ACTION_TYPE_ADVANCE, ACTION_TYPE_COUNT,
    ACTION_TYPE_KOIKOI_CONTINUE, ACTION_TYPE_KOIKOI_STOP, ACTION_TYPE_NEXT_ROUND,
    ACTION_TYPE_PLAY_HAND, ACTION_TYPE_SELECT_FIELD, DECK_SIZE,
};

use super::koikoi::KoikoiChoice;
use super::observation::Tensor;
use super::session::MatchState;
use super::state::{PlayerAction, RoundState};

/// 對局層級的指令
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Round(PlayerAction),
    NextRound,
}

/// seat 在目前回合的合法動作
pub fn legal_actions(round: &RoundState, seat: usize) -> Vec<PlayerAction> {
    if round.phase().is_automatic() {
        return vec![PlayerAction::Advance];
    }
    if round.needs_input() != Some(seat) {
        return Vec::new();
    }
    match round.phase() {
        Phase::SelectHand => round
            .hand(seat)
            .iter()
            .map(|c| PlayerAction::PlayHand { player: seat, card: c.id })
            .collect(),
        Phase::SelectField | Phase::SelectDrawnMatch => round
            .field_candidates()
            .iter()
            .map(|c| PlayerAction::SelectField { player: seat, card: c.id })
            .collect(),
        Phase::AwaitingKoikoiDecision => vec![
            PlayerAction::Koikoi { player: seat, choice: KoikoiChoice::Continue },
            PlayerAction::Koikoi { player: seat, choice: KoikoiChoice::Stop },
        ],
        _ => Vec::new(),
    }
}

/// 從遊戲狀態構建 action mask tensor
pub fn action_mask(game: &MatchState, seat: usize) -> Tensor {
    let mut data = vec![0.0; ACTION_MASK_SIZE as usize];

    if game.is_finished() {
        return Tensor {
            data,
            shape: vec![ACTION_MASK_SIZE],
        };
    }

    let round = game.round();
    if round.is_over() {
        data[ACTION_TYPE_NEXT_ROUND as usize] = 1.0;
    }

    let hand_offset = ACTION_TYPE_COUNT as usize;
    let field_offset = hand_offset + DECK_SIZE;
    for action in legal_actions(round, seat) {
        match action {
            PlayerAction::PlayHand { card, .. } => {
                data[ACTION_TYPE_PLAY_HAND as usize] = 1.0;
                data[hand_offset + card as usize] = 1.0;
            }
            PlayerAction::SelectField { card, .. } => {
                data[ACTION_TYPE_SELECT_FIELD as usize] = 1.0;
                data[field_offset + card as usize] = 1.0;
            }
            PlayerAction::Advance => data[ACTION_TYPE_ADVANCE as usize] = 1.0,
            PlayerAction::Koikoi { choice: KoikoiChoice::Continue, .. } => {
                data[ACTION_TYPE_KOIKOI_CONTINUE as usize] = 1.0
            }
            PlayerAction::Koikoi { choice: KoikoiChoice::Stop, .. } => {
                data[ACTION_TYPE_KOIKOI_STOP as usize] = 1.0
            }
        }
    }

    Tensor {
        data,
        shape: vec![ACTION_MASK_SIZE],
    }
}

/// 把 (action_type, card) 解碼為指令
pub fn decode_action(action_type: i32, card: i32, seat: usize) -> Result<Command, EngineError> {
    let card_id = || -> Result<CardId, EngineError> {
        if (0..DECK_SIZE as i32).contains(&card) {
            Ok(card as CardId)
        } else {
            Err(EngineError::invalid_action(format!("card id {} out of range", card)))
        }
    };
    let action = match action_type {
        ACTION_TYPE_PLAY_HAND => PlayerAction::PlayHand { player: seat, card: card_id()? },
        ACTION_TYPE_SELECT_FIELD => PlayerAction::SelectField { player: seat, card: card_id()? },
        ACTION_TYPE_ADVANCE => PlayerAction::Advance,
        ACTION_TYPE_KOIKOI_CONTINUE => PlayerAction::Koikoi { player: seat, choice: KoikoiChoice::Continue },
        ACTION_TYPE_KOIKOI_STOP => PlayerAction::Koikoi { player: seat, choice: KoikoiChoice::Stop },
        ACTION_TYPE_NEXT_ROUND => return Ok(Command::NextRound),
        other => return Err(EngineError::invalid_action(format!("unknown action type {}", other))),
    };
    Ok(Command::Round(action))
}

/// 執行指令
pub fn execute(game: &mut MatchState, command: Command) -> Result<(), EngineError> {
    match command {
        Command::Round(action) => game.apply(action).map(|_| ()),
        Command::NextRound => game.next_round().map(|_| ()),
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
            4,
        )
        .unwrap()
    }

    #[test]
    fn test_mask_marks_hand_cards() {
        let game = game();
        if game.round().is_over() {
            return;
        }
        let mask = action_mask(&game, 0);
        assert_eq!(mask.data.len(), ACTION_MASK_SIZE as usize);
        assert_eq!(mask.data[ACTION_TYPE_PLAY_HAND as usize], 1.0);
        for card in game.round().hand(0) {
            assert_eq!(mask.data[ACTION_TYPE_COUNT as usize + card.id as usize], 1.0);
        }
        let marked = mask.data[ACTION_TYPE_COUNT as usize..ACTION_TYPE_COUNT as usize + DECK_SIZE]
            .iter()
            .filter(|&&v| v > 0.0)
            .count();
        assert_eq!(marked, game.round().hand(0).len());

        // 不是自己的回合
        let other = action_mask(&game, 1);
        assert!(other.data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_every_legal_action_is_accepted() {
        let game = game();
        for action in legal_actions(game.round(), game.round().current_player()) {
            let mut copy = game.clone();
            assert!(copy.apply(action).is_ok(), "{:?}", action);
        }
    }

    #[test]
    fn test_decode_action() {
        assert_eq!(
            decode_action(ACTION_TYPE_PLAY_HAND, 7, 1),
            Ok(Command::Round(PlayerAction::PlayHand { player: 1, card: 7 }))
        );
        assert_eq!(decode_action(ACTION_TYPE_NEXT_ROUND, -1, 0), Ok(Command::NextRound));
        assert!(decode_action(ACTION_TYPE_SELECT_FIELD, 48, 0).is_err());
        assert!(decode_action(99, 0, 0).is_err());
    }
}
