//! 計分引擎
//!
//! 役判定與牌點計算，全部為純函數：同一份得牌呼叫兩次結果相同，
//! 可以在任何時候對任何快照做推測性的判定。

use super::cards::{Card, CardId};
use super::constants::{HAND_YAKU_POINTS, MONTHS};
use super::shop::CharmEffect;
use super::variants::{CardValues, CombinationSet, VariantConfig};
use super::yaku::{Yaku, YakuId};
use super::yaku_def::{catalog, CaptureView, Hit, YakuDef};

// ============================================================================
// Yaku Rules - 規則選項與護符的效果
// ============================================================================

/// 役判定規則
///
/// 由變體的規則選項與商店護符合成，傳遞到每個役的判定函數：
/// - 菊に盃是否同時算作カス
/// - 雨是否取消花見・月見（護符可免疫）
/// - 各系統的加分與カス門檻
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct YakuRules {
    pub sake_cup_as_chaff: bool,
    pub rain_cancels_viewing: bool,
    pub rain_proof: bool,
    pub viewing_bonus: i32,
    pub ribbon_bonus: i32,
    pub animal_bonus: i32,
    pub bright_bonus: i32,
    pub chaff_threshold: usize,
}

impl Default for YakuRules {
    fn default() -> Self {
        Self {
            sake_cup_as_chaff: false,
            rain_cancels_viewing: false,
            rain_proof: false,
            viewing_bonus: 0,
            ribbon_bonus: 0,
            animal_bonus: 0,
            bright_bonus: 0,
            chaff_threshold: 10,
        }
    }
}

impl YakuRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// 從變體設定構建規則
    pub fn from_config(config: &VariantConfig) -> Self {
        let mut rules = Self {
            sake_cup_as_chaff: config.rules.sake_cup_as_chaff,
            rain_cancels_viewing: config.rules.rain_cancels_viewing,
            ..Self::default()
        };
        for charm in &config.charms {
            match charm.effect() {
                CharmEffect::ViewingBonus(n) => rules.viewing_bonus += n,
                CharmEffect::RibbonBonus(n) => rules.ribbon_bonus += n,
                CharmEffect::AnimalBonus(n) => rules.animal_bonus += n,
                CharmEffect::BrightBonus(n) => rules.bright_bonus += n,
                CharmEffect::ChaffThreshold(n) => {
                    rules.chaff_threshold = rules.chaff_threshold.min(n)
                }
                CharmEffect::RainProof => rules.rain_proof = true,
            }
        }
        rules
    }
}

// ============================================================================
// 役判定
// ============================================================================

/// 判定得牌的所有役（依役表順序）
///
/// 同一互斥族只保留分數最高者，同分時保留役表中較前者。
pub fn detect(captured: &[Card], set: CombinationSet, rules: &YakuRules) -> Vec<Yaku> {
    let view = CaptureView::new(captured);
    let hits: Vec<(usize, &YakuDef, Hit)> = catalog(set)
        .iter()
        .enumerate()
        .filter_map(|(i, def)| (def.eval)(&view, rules).map(|hit| (i, def, hit)))
        .collect();

    hits.iter()
        .filter(|(i, def, hit)| match def.family {
            None => true,
            Some(family) => !hits.iter().any(|(j, other, other_hit)| {
                other.family == Some(family)
                    && (other_hit.points > hit.points || (other_hit.points == hit.points && j < i))
            }),
        })
        .map(|(_, def, hit)| Yaku::new(def.id, hit.points, hit.cards.clone()))
        .collect()
}

/// 新成立或分數提高的役
pub fn improvements(prev: &[Yaku], curr: &[Yaku]) -> Vec<Yaku> {
    curr.iter()
        .filter(|y| {
            prev.iter()
                .find(|p| p.id == y.id)
                .map_or(true, |p| y.points > p.points)
        })
        .cloned()
        .collect()
}

pub fn is_improved(prev: &[Yaku], curr: &[Yaku]) -> bool {
    !improvements(prev, curr).is_empty()
}

pub fn total_points(yaku: &[Yaku]) -> i32 {
    yaku.iter().map(|y| y.points).sum()
}

/// 牌點總和
pub fn card_points(cards: &[Card], values: &CardValues) -> i32 {
    cards.iter().map(|c| values.value(c.category)).sum()
}

// ============================================================================
// 手役（發牌時判定）
// ============================================================================

/// 手四：同月 4 張；くっつき：全部成對
pub fn detect_hand_yaku(hand: &[Card]) -> Option<Yaku> {
    if hand.is_empty() {
        return None;
    }

    let mut by_month: Vec<Vec<CardId>> = vec![Vec::new(); MONTHS as usize];
    for card in hand {
        by_month[(card.month - 1) as usize].push(card.id);
    }

    if let Some(four) = by_month.iter().find(|m| m.len() == 4) {
        return Some(Yaku::new(YakuId::Teshi, HAND_YAKU_POINTS, four.clone()));
    }

    if by_month.iter().all(|m| m.len() % 2 == 0) {
        let ids = hand.iter().map(|c| c.id).collect();
        return Some(Yaku::new(YakuId::Kuttsuki, HAND_YAKU_POINTS, ids));
    }

    None
}

// ============================================================================
// 單元測試
// ============================================================================
