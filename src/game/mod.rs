//! 遊戲核心模組
//!
//! 包含花札的核心定義（不可變的表與純函數）：
//! - `constants`: 遊戲常量
//! - `cards`: 48 張牌的定義
//! - `deck`: 洗牌、抽牌、發牌
//! - `variants`: 規則變體設定
//! - `yaku` / `yaku_def`: 役與各變體的役表
//! - `scoring`: 役判定與牌點
//! - `matching`: 配對判定
//! - `phase`: 回合階段
//! - `difficulty`: AI 難度表
//! - `shop`: 商店模式（護符、關卡）
//! - `error`: 錯誤類型
//!
//! 可變狀態（回合、對局）在 `service` 模組

#![allow(unused_imports)]

pub mod constants;
pub mod error;
pub mod cards;
pub mod deck;
pub mod variants;
pub mod yaku;
pub mod yaku_def;
pub mod scoring;
pub mod matching;
pub mod phase;
pub mod difficulty;
pub mod shop;

// Re-export 常用類型（公開 API，可能未在內部使用）
pub use constants::*;
pub use error::EngineError;
pub use cards::{Card, CardId, CardTag, Category, standard_deck, card_index, cards_of_month, card_with_tag};
pub use deck::{Deck, Deal};
pub use variants::{
    CardValues, CombinationSet, DealLayout, MultiplierMode, RuleOptions, ScoringMode,
    VariantConfig, WinCounting, WinTier,
};
pub use yaku::{Yaku, YakuFamily, YakuId};
pub use scoring::{detect, detect_hand_yaku, improvements, is_improved, total_points, card_points, YakuRules};
pub use matching::{MatchOutcome, matching_cards, resolve_match, validate_target};
pub use phase::Phase;
pub use difficulty::{Difficulty, DIFFICULTY_DEFS};
pub use shop::{CharmId, CharmEffect, Shop, ShopItem, StageDef, SHOP_STAGES};
