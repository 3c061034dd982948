//! 回合階段定義

use serde::{Deserialize, Serialize};

/// 回合狀態機的階段
///
/// 一般流程：SelectHand → (SelectField) → Drawing → ShowDrawn →
/// (SelectDrawnMatch) → TurnHandoff → 下一位玩家的 SelectHand。
/// `AwaitingKoikoiDecision` 是唯一的暫停點；`RoundEnding` 為終止狀態。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    SelectHand,
    SelectField,
    Drawing,
    ShowDrawn,
    SelectDrawnMatch,
    TurnHandoff,
    AwaitingKoikoiDecision,
    RoundEnding,
}

impl Phase {
    /// 由引擎自動推進的階段（呼叫 advance 即可）
    pub fn is_automatic(&self) -> bool {
        matches!(self, Phase::Drawing | Phase::ShowDrawn | Phase::TurnHandoff)
    }

    /// 需要玩家輸入的階段
    pub fn awaits_player(&self) -> bool {
        matches!(
            self,
            Phase::SelectHand
                | Phase::SelectField
                | Phase::SelectDrawnMatch
                | Phase::AwaitingKoikoiDecision
        )
    }

    pub fn is_terminal(&self) -> bool {
        *self == Phase::RoundEnding
    }

    /// 轉換為整數 ID (用於 observation)
    pub fn to_int(&self) -> usize {
        match self {
            Phase::SelectHand => 0,
            Phase::SelectField => 1,
            Phase::Drawing => 2,
            Phase::ShowDrawn => 3,
            Phase::SelectDrawnMatch => 4,
            Phase::TurnHandoff => 5,
            Phase::AwaitingKoikoiDecision => 6,
            Phase::RoundEnding => 7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants::PHASE_COUNT;

    #[test]
    fn test_phase_classification() {
        assert!(Phase::Drawing.is_automatic());
        assert!(Phase::TurnHandoff.is_automatic());
        assert!(!Phase::SelectHand.is_automatic());
        assert!(Phase::AwaitingKoikoiDecision.awaits_player());
        assert!(!Phase::RoundEnding.awaits_player());
        assert!(Phase::RoundEnding.is_terminal());
    }

    #[test]
    fn test_phase_indices_fit_observation() {
        let all = [
            Phase::SelectHand,
            Phase::SelectField,
            Phase::Drawing,
            Phase::ShowDrawn,
            Phase::SelectDrawnMatch,
            Phase::TurnHandoff,
            Phase::AwaitingKoikoiDecision,
            Phase::RoundEnding,
        ];
        for (i, phase) in all.iter().enumerate() {
            assert_eq!(phase.to_int(), i);
            assert!(phase.to_int() < PHASE_COUNT);
        }
    }
}
