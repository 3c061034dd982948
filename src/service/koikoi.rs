//! Koi-Koi 決策
//!
//! 役成立或提高時回合暫停，等待該玩家選擇「停止」或「繼續」。
//! 等待期間唯一合法的動作是 `resolve`，其他推進由 `RoundState::apply` 拒絕。

use serde::{Deserialize, Serialize};

use crate::game::EngineError;

/// 玩家的選擇
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KoikoiChoice {
    Stop,
    Continue,
}

/// Idle → Waiting(player) → Resolved
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionStatus {
    Idle,
    Waiting(usize),
    Resolved,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KoikoiState {
    pub waiting_for_decision: bool,
    pub decision_player: Option<usize>,
    /// 每位玩家本回合喊 koi-koi 的次數
    pub called_count: Vec<u32>,
    /// 最近一次要求決策時的役分數
    pub score_at_last_decision: Vec<i32>,
    /// 最近一次「繼續」之後是否又提高了役
    pub improved_since_continue: Vec<bool>,
    pub round_active: bool,
    pub status: DecisionStatus,
}

impl KoikoiState {
    pub fn new(player_count: usize) -> Self {
        Self {
            waiting_for_decision: false,
            decision_player: None,
            called_count: vec![0; player_count],
            score_at_last_decision: vec![0; player_count],
            improved_since_continue: vec![false; player_count],
            round_active: true,
            status: DecisionStatus::Idle,
        }
    }

    /// 暫停回合，等待 player 決策
    pub fn request(&mut self, player: usize, score: i32) -> Result<(), EngineError> {
        if self.waiting_for_decision {
            return Err(EngineError::invalid_action(format!(
                "decision already pending for player {:?}",
                self.decision_player
            )));
        }
        if !self.round_active {
            return Err(EngineError::invalid_action("round is over"));
        }
        self.waiting_for_decision = true;
        self.decision_player = Some(player);
        self.score_at_last_decision[player] = score;
        self.status = DecisionStatus::Waiting(player);
        Ok(())
    }

    /// 檢查 player 能否回應目前的決策（不改變狀態）
    pub fn check(&self, player: usize) -> Result<(), EngineError> {
        match self.decision_player {
            _ if !self.waiting_for_decision => {
                Err(EngineError::invalid_action("no koi-koi decision is pending"))
            }
            Some(waiting) if waiting == player => Ok(()),
            waiting => Err(EngineError::illegal_target(format!(
                "player {} answered, but the decision belongs to player {:?}",
                player, waiting
            ))),
        }
    }

    /// 套用決策
    pub fn resolve(&mut self, player: usize, choice: KoikoiChoice) -> Result<KoikoiChoice, EngineError> {
        self.check(player)?;

        self.waiting_for_decision = false;
        self.decision_player = None;
        self.status = DecisionStatus::Resolved;

        match choice {
            KoikoiChoice::Continue => {
                self.called_count[player] += 1;
                self.improved_since_continue[player] = false;
            }
            KoikoiChoice::Stop => {
                self.round_active = false;
            }
        }
        Ok(choice)
    }

    /// player 的役提高了
    pub fn note_improvement(&mut self, player: usize) {
        self.improved_since_continue[player] = true;
    }

    pub fn has_called(&self, player: usize) -> bool {
        self.called_count[player] > 0
    }

    pub fn any_called(&self) -> bool {
        self.called_count.iter().any(|&c| c > 0)
    }

    /// 喊了繼續之後沒有再提高役：本回合分數歸零
    pub fn is_forfeited(&self, player: usize) -> bool {
        self.has_called(player) && !self.improved_since_continue[player]
    }

    /// 倍率只由對手的「繼續」觸發
    pub fn multiplier_eligible(&self, player: usize) -> bool {
        self.called_count
            .iter()
            .enumerate()
            .any(|(p, &count)| p != player && count > 0)
    }

    pub fn finish_round(&mut self) {
        self.round_active = false;
        self.waiting_for_decision = false;
        self.decision_player = None;
    }
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_and_resolve_stop() {
        let mut state = KoikoiState::new(2);
        state.request(0, 5).unwrap();
        assert!(state.waiting_for_decision);
        assert_eq!(state.status, DecisionStatus::Waiting(0));
        assert_eq!(state.score_at_last_decision[0], 5);

        assert_eq!(state.resolve(0, KoikoiChoice::Stop), Ok(KoikoiChoice::Stop));
        assert!(!state.waiting_for_decision);
        assert!(!state.round_active);
        assert_eq!(state.status, DecisionStatus::Resolved);
    }

    #[test]
    fn test_double_request_rejected() {
        let mut state = KoikoiState::new(2);
        state.request(0, 5).unwrap();
        assert!(matches!(state.request(1, 3), Err(EngineError::InvalidAction(_))));
        assert_eq!(state.decision_player, Some(0));
    }

    #[test]
    fn test_wrong_player_is_illegal_target() {
        let mut state = KoikoiState::new(2);
        state.request(1, 5).unwrap();
        let before = state.clone();
        assert!(matches!(state.resolve(0, KoikoiChoice::Continue), Err(EngineError::IllegalTarget(_))));
        assert_eq!(state, before);
    }

    #[test]
    fn test_resolve_without_request() {
        let mut state = KoikoiState::new(2);
        assert!(matches!(state.resolve(0, KoikoiChoice::Stop), Err(EngineError::InvalidAction(_))));
    }

    #[test]
    fn test_continue_forfeits_until_improved() {
        let mut state = KoikoiState::new(2);
        state.request(0, 5).unwrap();
        state.resolve(0, KoikoiChoice::Continue).unwrap();
        assert!(state.round_active);
        assert_eq!(state.called_count[0], 1);
        assert!(state.is_forfeited(0));
        assert!(!state.is_forfeited(1));

        state.note_improvement(0);
        assert!(!state.is_forfeited(0));
    }

    #[test]
    fn test_multiplier_is_opponent_triggered() {
        let mut state = KoikoiState::new(3);
        state.request(0, 5).unwrap();
        state.resolve(0, KoikoiChoice::Continue).unwrap();
        assert!(!state.multiplier_eligible(0));
        assert!(state.multiplier_eligible(1));
        assert!(state.multiplier_eligible(2));
        assert!(state.any_called());
    }
}
