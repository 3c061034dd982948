//! 引擎錯誤類型
//!
//! - `InvalidAction` / `IllegalTarget`：玩家輸入錯誤，可恢復，狀態不變
//! - `EmptyDeck`：抽牌超出牌山剩餘張數
//! - `InvalidConfig`：開局時的規則組合驗證失敗
//!
//! 不變量破壞（同一張牌出現在兩個區域、總張數不是 48）不屬於這裡，
//! 由 `RoundState::assert_invariants` 直接 panic。

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// 錯誤的玩家、錯誤的階段，或牌不在預期的區域
    InvalidAction(String),
    /// 場牌選擇與打出的牌不同月，或非等待中的玩家回應 koi-koi
    IllegalTarget(String),
    /// 牌山張數不足
    EmptyDeck { requested: usize, remaining: usize },
    /// 規則設定不合法
    InvalidConfig(String),
}

impl EngineError {
    pub fn invalid_action(msg: impl Into<String>) -> Self {
        EngineError::InvalidAction(msg.into())
    }

    pub fn illegal_target(msg: impl Into<String>) -> Self {
        EngineError::IllegalTarget(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        EngineError::InvalidConfig(msg.into())
    }

    /// 玩家輸入錯誤：UI 可以直接忽略並重繪
    pub fn is_rejection(&self) -> bool {
        matches!(self, EngineError::InvalidAction(_) | EngineError::IllegalTarget(_))
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidAction(msg) => write!(f, "Invalid action: {}", msg),
            EngineError::IllegalTarget(msg) => write!(f, "Illegal target: {}", msg),
            EngineError::EmptyDeck { requested, remaining } => write!(
                f,
                "Empty deck: requested {} card(s), {} remaining",
                requested, remaining
            ),
            EngineError::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_classification() {
        assert!(EngineError::invalid_action("out of turn").is_rejection());
        assert!(EngineError::illegal_target("wrong month").is_rejection());
        assert!(!EngineError::EmptyDeck { requested: 2, remaining: 1 }.is_rejection());
        assert!(!EngineError::invalid_config("players").is_rejection());
    }

    #[test]
    fn test_display() {
        let err = EngineError::EmptyDeck { requested: 3, remaining: 0 };
        assert_eq!(err.to_string(), "Empty deck: requested 3 card(s), 0 remaining");
    }
}
