//! 規則變體與設定
//!
//! 每個變體 = 設定資料 + 一組役判定表，不另寫狀態機。
//!
//! # 架構
//!
//! - `CARD_VALUE_DEFS`：各役表的卡牌點數
//! - `deal_layout`：人數 → 手牌/場牌張數
//! - `VariantConfig`：開局時固定的規則選擇，`validate` 拒絕未定義的組合

use serde::{Deserialize, Serialize};

use super::cards::{standard_deck, Category};
use super::constants::{DECK_SIZE, HACHI_PAR_VALUE, MAX_PLAYERS, MIN_PLAYERS};
use super::error::EngineError;
use super::shop::CharmId;

/// 役表選擇
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombinationSet {
    KoiKoi,
    Sakura,
    HachiHachi,
}

impl CombinationSet {
    pub fn to_index(&self) -> usize {
        match self {
            CombinationSet::KoiKoi => 0,
            CombinationSet::Sakura => 1,
            CombinationSet::HachiHachi => 2,
        }
    }
}

/// 倍率模式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MultiplierMode {
    None,
    OpponentTriggered,
}

// ============================================================================
// 卡牌點數表
// ============================================================================

/// 類別 → 點數
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardValues {
    pub bright: i32,
    pub animal: i32,
    pub ribbon: i32,
    pub chaff: i32,
}

impl CardValues {
    pub fn value(&self, category: Category) -> i32 {
        match category {
            Category::Bright => self.bright,
            Category::Animal => self.animal,
            Category::Ribbon => self.ribbon,
            Category::Chaff => self.chaff,
        }
    }

    /// 整副牌的點數總和
    pub fn deck_total(&self) -> i32 {
        standard_deck().iter().map(|c| self.value(c.category)).sum()
    }
}

/// 點數定義表（順序與 CombinationSet 一致）
pub static CARD_VALUE_DEFS: [CardValues; 3] = [
    // 0: Koi-Koi
    CardValues { bright: 20, animal: 10, ribbon: 5, chaff: 1 },
    // 1: Sakura - カス不計分
    CardValues { bright: 20, animal: 10, ribbon: 5, chaff: 0 },
    // 2: Hachi-Hachi - 總和 264 = 88 × 3
    CardValues { bright: 20, animal: 10, ribbon: 5, chaff: 1 },
];

// ============================================================================
// 發牌表
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealLayout {
    pub hand_size: usize,
    pub field_size: usize,
}

/// 人數 → 每人手牌 / 場牌
pub fn deal_layout(player_count: usize, set: CombinationSet) -> Option<DealLayout> {
    match (player_count, set) {
        (2, CombinationSet::Sakura) => Some(DealLayout { hand_size: 10, field_size: 8 }),
        (2, _) => Some(DealLayout { hand_size: 8, field_size: 8 }),
        (3, _) => Some(DealLayout { hand_size: 7, field_size: 6 }),
        (4, _) => Some(DealLayout { hand_size: 5, field_size: 8 }),
        _ => None,
    }
}

// ============================================================================
// 規則選項
// ============================================================================

/// 勝場計數的加權階梯：分差 >= min_margin 時算 wins 勝
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinTier {
    pub min_margin: i32,
    pub wins: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinCounting {
    /// 依 min_margin 遞增排列；未達任何階梯時算 1 勝
    pub bonus_tiers: Vec<WinTier>,
}

impl WinCounting {
    /// 分差對應的勝場數
    pub fn wins_for_margin(&self, margin: i32) -> u32 {
        self.bonus_tiers
            .iter()
            .rev()
            .find(|t| margin >= t.min_margin)
            .map(|t| t.wins)
            .unwrap_or(1)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleOptions {
    /// 菊に盃同時算作カス
    pub sake_cup_as_chaff: bool,
    /// 取得柳に小野道風時花見・月見不成立
    pub rain_cancels_viewing: bool,
    /// 基本分 7 點以上翻倍
    pub double_over_seven: bool,
    /// 發牌時的手役（手四・くっつき）直接勝出
    pub hand_yaku: bool,
    /// 流局且無人得分時莊家的親權點數
    pub dealer_privilege: Option<i32>,
    /// 只有一張可配對的場牌時自動吃牌
    pub auto_capture_single: bool,
}

impl Default for RuleOptions {
    fn default() -> Self {
        Self {
            sake_cup_as_chaff: true,
            rain_cancels_viewing: false,
            double_over_seven: true,
            hand_yaku: true,
            dealer_privilege: None,
            auto_capture_single: true,
        }
    }
}

/// 結算演算法
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoringMode {
    /// 只有結束回合的玩家得分（Koi-Koi）
    WinnerTakeAll,
    /// 每位玩家各自以牌點 + 役計分（Sakura）
    Independent,
    /// (牌點 - 基準) × 場倍率，零和（八八）
    Par { par: i32 },
}

// ============================================================================
// 變體設定
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariantConfig {
    pub combination_set: CombinationSet,
    pub player_count: usize,
    pub rounds: usize,
    pub koikoi_enabled: bool,
    pub multiplier_mode: MultiplierMode,
    pub both_players_score: bool,
    #[serde(default)]
    pub win_counting: Option<WinCounting>,
    #[serde(default)]
    pub par_value: Option<i32>,
    #[serde(default)]
    pub rules: RuleOptions,
    #[serde(default)]
    pub charms: Vec<CharmId>,
    #[serde(default)]
    pub shop_mode: bool,
}

impl Default for VariantConfig {
    fn default() -> Self {
        Self::koikoi()
    }
}

impl VariantConfig {
    /// 標準兩人 Koi-Koi（12 回合）
    pub fn koikoi() -> Self {
        Self {
            combination_set: CombinationSet::KoiKoi,
            player_count: 2,
            rounds: 12,
            koikoi_enabled: true,
            multiplier_mode: MultiplierMode::OpponentTriggered,
            both_players_score: false,
            win_counting: None,
            par_value: None,
            rules: RuleOptions::default(),
            charms: Vec::new(),
            shop_mode: false,
        }
    }

    /// 多人 Koi-Koi
    pub fn koikoi_for(player_count: usize) -> Self {
        Self {
            player_count,
            ..Self::koikoi()
        }
    }

    /// Sakura：不喊 koi-koi，每位玩家各自計分
    pub fn sakura(player_count: usize) -> Self {
        Self {
            combination_set: CombinationSet::Sakura,
            player_count,
            rounds: 6,
            koikoi_enabled: false,
            multiplier_mode: MultiplierMode::None,
            both_players_score: true,
            win_counting: None,
            par_value: None,
            rules: RuleOptions {
                sake_cup_as_chaff: false,
                double_over_seven: false,
                hand_yaku: false,
                ..RuleOptions::default()
            },
            charms: Vec::new(),
            shop_mode: false,
        }
    }

    /// 八八：三人，基準 88 點
    pub fn hachi_hachi() -> Self {
        Self {
            combination_set: CombinationSet::HachiHachi,
            player_count: 3,
            rounds: 12,
            koikoi_enabled: false,
            multiplier_mode: MultiplierMode::None,
            both_players_score: false,
            win_counting: None,
            par_value: Some(HACHI_PAR_VALUE),
            rules: RuleOptions {
                sake_cup_as_chaff: false,
                double_over_seven: false,
                hand_yaku: false,
                ..RuleOptions::default()
            },
            charms: Vec::new(),
            shop_mode: false,
        }
    }

    /// 商店模式：兩人 Koi-Koi，每關 3 回合
    pub fn shop() -> Self {
        Self {
            rounds: 3,
            shop_mode: true,
            ..Self::koikoi()
        }
    }

    /// 依名稱取得預設設定
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "koikoi" => Some(Self::koikoi()),
            "koikoi3" => Some(Self::koikoi_for(3)),
            "koikoi4" => Some(Self::koikoi_for(4)),
            "sakura" => Some(Self::sakura(2)),
            "sakura3" => Some(Self::sakura(3)),
            "sakura4" => Some(Self::sakura(4)),
            "hachihachi" => Some(Self::hachi_hachi()),
            "shop" => Some(Self::shop()),
            _ => None,
        }
    }

    /// 從 JSON 載入並驗證
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: VariantConfig = serde_json::from_str(json)
            .map_err(|e| EngineError::invalid_config(format!("malformed config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn card_values(&self) -> CardValues {
        CARD_VALUE_DEFS[self.combination_set.to_index()]
    }

    pub fn layout(&self) -> Result<DealLayout, EngineError> {
        deal_layout(self.player_count, self.combination_set).ok_or_else(|| {
            EngineError::invalid_config(format!(
                "player count must be {}..={}, got {}",
                MIN_PLAYERS, MAX_PLAYERS, self.player_count
            ))
        })
    }

    pub fn scoring_mode(&self) -> ScoringMode {
        if let Some(par) = self.par_value {
            ScoringMode::Par { par }
        } else if self.both_players_score && !self.koikoi_enabled {
            ScoringMode::Independent
        } else {
            ScoringMode::WinnerTakeAll
        }
    }

    /// 開局驗證：未定義的旗標組合一律拒絕
    pub fn validate(&self) -> Result<(), EngineError> {
        let layout = self.layout()?;

        if self.rounds == 0 {
            return Err(EngineError::invalid_config("rounds must be at least 1"));
        }

        let dealt = layout.hand_size * self.player_count + layout.field_size;
        if dealt > DECK_SIZE {
            return Err(EngineError::invalid_config(format!(
                "deal needs {} cards, deck has {}",
                dealt, DECK_SIZE
            )));
        }

        let mode = self.scoring_mode();

        if self.koikoi_enabled && mode != ScoringMode::WinnerTakeAll {
            return Err(EngineError::invalid_config(
                "koi-koi decisions require winner-take-all settlement",
            ));
        }

        if self.multiplier_mode == MultiplierMode::OpponentTriggered && !self.koikoi_enabled {
            return Err(EngineError::invalid_config(
                "opponent-triggered multiplier requires koi-koi decisions",
            ));
        }

        if let Some(counting) = &self.win_counting {
            if self.multiplier_mode == MultiplierMode::OpponentTriggered {
                return Err(EngineError::invalid_config(
                    "win counting cannot be combined with the opponent-triggered multiplier",
                ));
            }
            let sorted = counting
                .bonus_tiers
                .windows(2)
                .all(|w| w[0].min_margin < w[1].min_margin);
            if !sorted || counting.bonus_tiers.iter().any(|t| t.wins == 0) {
                return Err(EngineError::invalid_config(
                    "win tiers must have increasing margins and at least one win",
                ));
            }
        }

        if let ScoringMode::Par { par } = mode {
            if self.both_players_score {
                return Err(EngineError::invalid_config(
                    "par settlement cannot be combined with both-players-score",
                ));
            }
            // 所有牌都會被打出，場牌最後必然清空，結算才是零和
            let deck_after_deal = DECK_SIZE - dealt;
            if deck_after_deal != layout.hand_size * self.player_count {
                return Err(EngineError::invalid_config(
                    "par settlement requires every card to be played",
                ));
            }
            let total = self.card_values().deck_total();
            if par * self.player_count as i32 != total {
                return Err(EngineError::invalid_config(format!(
                    "par {} x {} players must equal deck total {}",
                    par, self.player_count, total
                )));
            }
        }

        if self.shop_mode
            && (self.player_count != 2 || self.combination_set != CombinationSet::KoiKoi)
        {
            return Err(EngineError::invalid_config(
                "shop mode is a two-player Koi-Koi run",
            ));
        }

        Ok(())
    }
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        for name in ["koikoi", "koikoi3", "koikoi4", "sakura", "sakura3", "sakura4", "hachihachi", "shop"] {
            let config = VariantConfig::preset(name).unwrap();
            assert_eq!(config.validate(), Ok(()), "preset {} should validate", name);
        }
        assert!(VariantConfig::preset("unknown").is_none());
    }

    #[test]
    fn test_deal_layout_table() {
        assert_eq!(deal_layout(2, CombinationSet::KoiKoi), Some(DealLayout { hand_size: 8, field_size: 8 }));
        assert_eq!(deal_layout(2, CombinationSet::Sakura), Some(DealLayout { hand_size: 10, field_size: 8 }));
        assert_eq!(deal_layout(3, CombinationSet::HachiHachi), Some(DealLayout { hand_size: 7, field_size: 6 }));
        assert_eq!(deal_layout(4, CombinationSet::KoiKoi), Some(DealLayout { hand_size: 5, field_size: 8 }));
        assert_eq!(deal_layout(5, CombinationSet::KoiKoi), None);
    }

    #[test]
    fn test_hachi_deck_total() {
        let values = VariantConfig::hachi_hachi().card_values();
        assert_eq!(values.deck_total(), 264);
        assert_eq!(values.value(Category::Chaff), 1);
        assert_eq!(CARD_VALUE_DEFS[1].value(Category::Chaff), 0);
    }

    #[test]
    fn test_scoring_mode_selection() {
        assert_eq!(VariantConfig::koikoi().scoring_mode(), ScoringMode::WinnerTakeAll);
        assert_eq!(VariantConfig::sakura(2).scoring_mode(), ScoringMode::Independent);
        assert_eq!(VariantConfig::hachi_hachi().scoring_mode(), ScoringMode::Par { par: 88 });
    }

    #[test]
    fn test_reject_bad_player_count() {
        let config = VariantConfig::koikoi_for(5);
        assert!(matches!(config.validate(), Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn test_reject_win_counting_with_multiplier() {
        let mut config = VariantConfig::koikoi();
        config.win_counting = Some(WinCounting::default());
        assert!(matches!(config.validate(), Err(EngineError::InvalidConfig(_))));

        config.multiplier_mode = MultiplierMode::None;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_reject_multiplier_without_koikoi() {
        let mut config = VariantConfig::sakura(2);
        config.multiplier_mode = MultiplierMode::OpponentTriggered;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_koikoi_with_par() {
        let mut config = VariantConfig::hachi_hachi();
        config.koikoi_enabled = true;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_wrong_par() {
        let mut config = VariantConfig::hachi_hachi();
        config.par_value = Some(80);
        assert!(config.validate().is_err());

        // 兩人 Koi-Koi 的牌山有剩，不能用基準結算
        let mut config = VariantConfig::hachi_hachi();
        config.player_count = 2;
        config.combination_set = CombinationSet::KoiKoi;
        config.par_value = Some(132);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_unsorted_tiers() {
        let mut config = VariantConfig::koikoi();
        config.multiplier_mode = MultiplierMode::None;
        config.win_counting = Some(WinCounting {
            bonus_tiers: vec![
                WinTier { min_margin: 10, wins: 2 },
                WinTier { min_margin: 5, wins: 3 },
            ],
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_wins_for_margin() {
        let counting = WinCounting {
            bonus_tiers: vec![
                WinTier { min_margin: 10, wins: 2 },
                WinTier { min_margin: 20, wins: 3 },
            ],
        };
        assert_eq!(counting.wins_for_margin(3), 1);
        assert_eq!(counting.wins_for_margin(10), 2);
        assert_eq!(counting.wins_for_margin(25), 3);
    }

    #[test]
    fn test_json_round_trip_and_defaults() {
        let json = r#"{
            "combination_set": "KoiKoi",
            "player_count": 2,
            "rounds": 6,
            "koikoi_enabled": true,
            "multiplier_mode": "OpponentTriggered",
            "both_players_score": false
        }"#;
        let config = VariantConfig::from_json(json).unwrap();
        assert_eq!(config.rounds, 6);
        assert_eq!(config.rules, RuleOptions::default());
        assert!(config.charms.is_empty());

        let back = VariantConfig::from_json(&config.to_json()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_json_rejects_invalid() {
        assert!(VariantConfig::from_json("{").is_err());
        let json = r#"{
            "combination_set": "KoiKoi",
            "player_count": 7,
            "rounds": 6,
            "koikoi_enabled": true,
            "multiplier_mode": "None",
            "both_players_score": false
        }"#;
        assert!(matches!(VariantConfig::from_json(json), Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn test_shop_mode_restricted() {
        let mut config = VariantConfig::shop();
        config.player_count = 3;
        assert!(config.validate().is_err());
    }
}
