//! 配對判定
//!
//! 打出（或抽出）一張牌時，場上同月的牌決定結果：
//! 0 張 → 放到場上；1 張 → 吃掉；2 張 → 由玩家選；3 張 → 四張全收。

use super::cards::{Card, CardId};
use super::error::EngineError;

/// 配對結果
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MatchOutcome {
    /// 沒有同月的牌，打出的牌留在場上
    NoMatch,
    /// 只有一張同月的牌
    Single(Card),
    /// 兩張同月，需要玩家選擇
    Choice(Vec<Card>),
    /// 場上已有三張同月，連同打出的牌一起收走
    Sweep(Vec<Card>),
}

impl MatchOutcome {
    /// 需要玩家選擇場牌
    pub fn needs_choice(&self) -> bool {
        matches!(self, MatchOutcome::Choice(_))
    }

    /// 可以吃的場牌（選擇時為候選）
    pub fn targets(&self) -> Vec<Card> {
        match self {
            MatchOutcome::NoMatch => Vec::new(),
            MatchOutcome::Single(c) => vec![*c],
            MatchOutcome::Choice(cs) | MatchOutcome::Sweep(cs) => cs.clone(),
        }
    }
}

/// 場上與 card 同月的牌（依場上順序）
pub fn matching_cards(card: &Card, field: &[Card]) -> Vec<Card> {
    field.iter().filter(|f| f.matches(card)).copied().collect()
}

/// 判定打出 card 的配對結果
///
/// 三張同月必須先判定為 Sweep，不能提供 1 選 N。
pub fn resolve_match(card: &Card, field: &[Card]) -> MatchOutcome {
    let mut matches = matching_cards(card, field);
    match matches.len() {
        0 => MatchOutcome::NoMatch,
        1 => MatchOutcome::Single(matches.remove(0)),
        2 => MatchOutcome::Choice(matches),
        _ => MatchOutcome::Sweep(matches),
    }
}

/// 驗證玩家選的場牌：必須在場上且同月
pub fn validate_target(card: &Card, target: CardId, field: &[Card]) -> Result<Card, EngineError> {
    let chosen = field
        .iter()
        .find(|f| f.id == target)
        .copied()
        .ok_or_else(|| EngineError::illegal_target(format!("card {} is not on the field", target)))?;
    if !chosen.matches(card) {
        return Err(EngineError::illegal_target(format!(
            "{} (month {}) does not match {} (month {})",
            chosen.name, chosen.month, card.name, card.month
        )));
    }
    Ok(chosen)
}

// ============================================================================
// 單元測試
// ============================================================================
