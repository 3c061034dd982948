//! 商店系統
//!
//! 商店模式：一連串關卡，每關打完把分數換成錢，用錢買護符（Charm）。
//! 護符只修改役判定（加分、降低門檻），不改變狀態機。
//!
//! # 架構
//!
//! - `CHARM_DEFS`：護符定義表
//! - `Shop`：生成、購買、Reroll
//! - `SHOP_STAGES`：關卡表

use rand::prelude::*;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::difficulty::Difficulty;

// ============================================================================
// Charm 定義系統
// ============================================================================

/// 護符效果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharmEffect {
    /// 花見・月見 +N
    ViewingBonus(i32),
    /// 短冊系役 +N
    RibbonBonus(i32),
    /// 種札系役 +N
    AnimalBonus(i32),
    /// 光札系役 +N
    BrightBonus(i32),
    /// カス所需張數
    ChaffThreshold(usize),
    /// 雨不會取消花見・月見
    RainProof,
}

#[derive(Clone, Copy)]
pub struct CharmDef {
    pub name: &'static str,
    pub cost: i64,
    pub effect: CharmEffect,
}

/// 護符定義表（順序與 CharmId 枚舉值一致）
pub static CHARM_DEFS: [CharmDef; 6] = [
    CharmDef { name: "Sake Charm", cost: 6, effect: CharmEffect::ViewingBonus(2) },
    CharmDef { name: "Silk Charm", cost: 5, effect: CharmEffect::RibbonBonus(1) },
    CharmDef { name: "Hunter Charm", cost: 5, effect: CharmEffect::AnimalBonus(1) },
    CharmDef { name: "Lantern Charm", cost: 8, effect: CharmEffect::BrightBonus(2) },
    CharmDef { name: "Broom Charm", cost: 4, effect: CharmEffect::ChaffThreshold(8) },
    CharmDef { name: "Umbrella Charm", cost: 3, effect: CharmEffect::RainProof },
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharmId {
    SakeCharm = 0,
    SilkCharm = 1,
    HunterCharm = 2,
    LanternCharm = 3,
    BroomCharm = 4,
    UmbrellaCharm = 5,
}

impl CharmId {
    pub fn all() -> &'static [CharmId] {
        &[
            CharmId::SakeCharm,
            CharmId::SilkCharm,
            CharmId::HunterCharm,
            CharmId::LanternCharm,
            CharmId::BroomCharm,
            CharmId::UmbrellaCharm,
        ]
    }

    pub fn to_index(&self) -> usize {
        *self as usize
    }

    pub fn name(&self) -> &'static str {
        CHARM_DEFS[self.to_index()].name
    }

    pub fn base_cost(&self) -> i64 {
        CHARM_DEFS[self.to_index()].cost
    }

    pub fn effect(&self) -> CharmEffect {
        CHARM_DEFS[self.to_index()].effect
    }
}

// ============================================================================
// 商店
// ============================================================================

/// 商店物品
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ShopItem {
    pub charm: CharmId,
    pub cost: i64,
}

/// 商店
#[derive(Clone, Debug)]
pub struct Shop {
    pub items: Vec<ShopItem>,
    pub reroll_cost: i64,
    pub reroll_count: i32,
}

impl Shop {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            reroll_cost: 2,
            reroll_count: 0,
        }
    }

    /// 刷新商店物品（不重複、不賣已擁有的護符）
    pub fn refresh(&mut self, rng: &mut StdRng, item_count: usize, owned: &[CharmId]) {
        self.items.clear();

        let available: Vec<CharmId> = CharmId::all()
            .iter()
            .copied()
            .filter(|c| !owned.contains(c))
            .collect();
        for id in available.choose_multiple(rng, item_count) {
            // 價格浮動 0..=2
            let cost = id.base_cost() + rng.gen_range(0..=2);
            self.items.push(ShopItem { charm: *id, cost });
        }
    }

    /// Reroll 商店，回傳支付的費用
    pub fn reroll(&mut self, rng: &mut StdRng, item_count: usize, owned: &[CharmId]) -> i64 {
        let cost = self.current_reroll_cost();
        self.reroll_count += 1;
        self.refresh(rng, item_count, owned);
        cost
    }

    /// 每次 reroll 費用增加 1
    pub fn current_reroll_cost(&self) -> i64 {
        self.reroll_cost + self.reroll_count as i64
    }

    pub fn buy(&mut self, index: usize) -> Option<ShopItem> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    /// 重置 reroll 計數（新關卡開始時）
    pub fn reset_reroll(&mut self) {
        self.reroll_count = 0;
    }
}

impl Default for Shop {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// 關卡
// ============================================================================

#[derive(Clone, Copy, Debug)]
pub struct StageDef {
    pub name: &'static str,
    pub opponent: Difficulty,
    pub rounds: usize,
    /// 關卡內累計分數需達到的目標
    pub target_score: i32,
}

pub static SHOP_STAGES: [StageDef; 4] = [
    StageDef { name: "Spring", opponent: Difficulty::Easy, rounds: 3, target_score: 5 },
    StageDef { name: "Summer", opponent: Difficulty::Normal, rounds: 3, target_score: 8 },
    StageDef { name: "Autumn", opponent: Difficulty::Normal, rounds: 3, target_score: 12 },
    StageDef { name: "Winter", opponent: Difficulty::Hard, rounds: 3, target_score: 15 },
];

pub const SHOP_SLOTS: usize = 3;
/// 過關獎勵
pub const STAGE_CLEAR_BONUS: i64 = 3;

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shop_refresh_unique() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut shop = Shop::new();
        shop.refresh(&mut rng, SHOP_SLOTS, &[]);

        assert_eq!(shop.items.len(), SHOP_SLOTS);
        for (i, a) in shop.items.iter().enumerate() {
            assert!(a.cost >= a.charm.base_cost());
            assert!(shop.items[i + 1..].iter().all(|b| b.charm != a.charm));
        }
    }

    #[test]
    fn test_shop_skips_owned() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut shop = Shop::new();
        let owned = [CharmId::SakeCharm, CharmId::SilkCharm, CharmId::HunterCharm, CharmId::LanternCharm];
        for _ in 0..20 {
            shop.refresh(&mut rng, SHOP_SLOTS, &owned);
            assert_eq!(shop.items.len(), 2);
            assert!(shop.items.iter().all(|i| !owned.contains(&i.charm)));
        }
    }

    #[test]
    fn test_shop_buy() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut shop = Shop::new();
        shop.refresh(&mut rng, 2, &[]);

        assert!(shop.buy(0).is_some());
        assert_eq!(shop.items.len(), 1);
        assert!(shop.buy(5).is_none());
    }

    #[test]
    fn test_shop_reroll_cost() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut shop = Shop::new();
        shop.refresh(&mut rng, 2, &[]);

        assert_eq!(shop.current_reroll_cost(), 2);
        assert_eq!(shop.reroll(&mut rng, 2, &[]), 2);
        assert_eq!(shop.current_reroll_cost(), 3);
        shop.reroll(&mut rng, 2, &[]);
        assert_eq!(shop.current_reroll_cost(), 4);

        shop.reset_reroll();
        assert_eq!(shop.current_reroll_cost(), 2);
    }

    #[test]
    fn test_charm_table_order() {
        for (i, id) in CharmId::all().iter().enumerate() {
            assert_eq!(id.to_index(), i);
        }
        assert_eq!(CharmId::BroomCharm.effect(), CharmEffect::ChaffThreshold(8));
    }

    #[test]
    fn test_stages_get_harder() {
        assert!(SHOP_STAGES.windows(2).all(|w| w[0].target_score < w[1].target_score));
        assert_eq!(SHOP_STAGES[0].opponent, Difficulty::Easy);
    }
}
