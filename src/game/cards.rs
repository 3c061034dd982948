//! 花札卡牌定義
//!
//! 48 張牌 = 12 個月 × 4 張。每張牌有固定的類別（光、種、短冊、カス）
//! 與役判定用的標記。卡牌本身不可變，只會在區域之間移動。
//!
//! # 架構
//!
//! 使用聲明式 `CARD_DEFS` 表定義全部 48 張牌，`id = (月 - 1) * 4 + 槽位`。

use serde::{Deserialize, Serialize};

use super::constants::{CARDS_PER_MONTH, DECK_SIZE, MONTHS};

/// 卡牌 ID（0..48）
pub type CardId = u8;

/// 卡牌類別
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Bright, // 光
    Animal, // 種
    Ribbon, // 短冊
    Chaff,  // カス
}

impl Category {
    /// 轉換為整數 ID (用於 observation)
    pub fn to_int(&self) -> u8 {
        match self {
            Category::Bright => 0,
            Category::Animal => 1,
            Category::Ribbon => 2,
            Category::Chaff => 3,
        }
    }

    pub fn all() -> &'static [Category] {
        &[Category::Bright, Category::Animal, Category::Ribbon, Category::Chaff]
    }
}

/// 役判定用的牌面標記
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardTag {
    // 光
    Crane,   // 松に鶴
    Curtain, // 桜に幕
    Moon,    // 芒に月
    RainMan, // 柳に小野道風
    Phoenix, // 桐に鳳凰

    // 種
    Warbler,     // 梅に鶯
    Cuckoo,      // 藤に不如帰
    Bridge,      // 菖蒲に八橋
    Butterflies, // 牡丹に蝶
    Boar,        // 萩に猪
    Geese,       // 芒に雁
    SakeCup,     // 菊に盃
    Deer,        // 紅葉に鹿
    Swallow,     // 柳に燕

    // 短冊
    PoetryRibbon, // 赤短（松・梅・桜）
    GrassRibbon,  // 草短（藤・菖蒲・萩）
    BlueRibbon,   // 青短（牡丹・菊・紅葉）
    WillowRibbon, // 柳の短冊

    // カス
    Lightning, // 柳の雷
    Plain,
}

/// 卡牌定義結構
#[derive(Clone, Copy)]
pub struct CardDef {
    pub month: u8,
    pub category: Category,
    pub tag: CardTag,
    pub name: &'static str,
}

const fn def(month: u8, category: Category, tag: CardTag, name: &'static str) -> CardDef {
    CardDef { month, category, tag, name }
}

use Category::{Animal, Bright, Chaff, Ribbon};
use CardTag::*;

/// 卡牌定義表（順序即 CardId）
pub static CARD_DEFS: [CardDef; DECK_SIZE] = [
    // 1: 松
    def(1, Bright, Crane, "Pine Crane"),
    def(1, Ribbon, PoetryRibbon, "Pine Poetry Ribbon"),
    def(1, Chaff, Plain, "Pine Chaff I"),
    def(1, Chaff, Plain, "Pine Chaff II"),
    // 2: 梅
    def(2, Animal, Warbler, "Plum Bush Warbler"),
    def(2, Ribbon, PoetryRibbon, "Plum Poetry Ribbon"),
    def(2, Chaff, Plain, "Plum Chaff I"),
    def(2, Chaff, Plain, "Plum Chaff II"),
    // 3: 桜
    def(3, Bright, Curtain, "Cherry Curtain"),
    def(3, Ribbon, PoetryRibbon, "Cherry Poetry Ribbon"),
    def(3, Chaff, Plain, "Cherry Chaff I"),
    def(3, Chaff, Plain, "Cherry Chaff II"),
    // 4: 藤
    def(4, Animal, Cuckoo, "Wisteria Cuckoo"),
    def(4, Ribbon, GrassRibbon, "Wisteria Red Ribbon"),
    def(4, Chaff, Plain, "Wisteria Chaff I"),
    def(4, Chaff, Plain, "Wisteria Chaff II"),
    // 5: 菖蒲
    def(5, Animal, Bridge, "Iris Bridge"),
    def(5, Ribbon, GrassRibbon, "Iris Red Ribbon"),
    def(5, Chaff, Plain, "Iris Chaff I"),
    def(5, Chaff, Plain, "Iris Chaff II"),
    // 6: 牡丹
    def(6, Animal, Butterflies, "Peony Butterflies"),
    def(6, Ribbon, BlueRibbon, "Peony Blue Ribbon"),
    def(6, Chaff, Plain, "Peony Chaff I"),
    def(6, Chaff, Plain, "Peony Chaff II"),
    // 7: 萩
    def(7, Animal, Boar, "Bush Clover Boar"),
    def(7, Ribbon, GrassRibbon, "Bush Clover Red Ribbon"),
    def(7, Chaff, Plain, "Bush Clover Chaff I"),
    def(7, Chaff, Plain, "Bush Clover Chaff II"),
    // 8: 芒
    def(8, Bright, Moon, "Pampas Moon"),
    def(8, Animal, Geese, "Pampas Geese"),
    def(8, Chaff, Plain, "Pampas Chaff I"),
    def(8, Chaff, Plain, "Pampas Chaff II"),
    // 9: 菊
    def(9, Animal, SakeCup, "Chrysanthemum Sake Cup"),
    def(9, Ribbon, BlueRibbon, "Chrysanthemum Blue Ribbon"),
    def(9, Chaff, Plain, "Chrysanthemum Chaff I"),
    def(9, Chaff, Plain, "Chrysanthemum Chaff II"),
    // 10: 紅葉
    def(10, Animal, Deer, "Maple Deer"),
    def(10, Ribbon, BlueRibbon, "Maple Blue Ribbon"),
    def(10, Chaff, Plain, "Maple Chaff I"),
    def(10, Chaff, Plain, "Maple Chaff II"),
    // 11: 柳
    def(11, Bright, RainMan, "Willow Rain Man"),
    def(11, Animal, Swallow, "Willow Swallow"),
    def(11, Ribbon, WillowRibbon, "Willow Ribbon"),
    def(11, Chaff, Lightning, "Willow Lightning"),
    // 12: 桐
    def(12, Bright, Phoenix, "Paulownia Phoenix"),
    def(12, Chaff, Plain, "Paulownia Chaff I"),
    def(12, Chaff, Plain, "Paulownia Chaff II"),
    def(12, Chaff, Plain, "Paulownia Chaff III"),
];

/// 月份名稱（1..=12）
pub fn month_name(month: u8) -> &'static str {
    match month {
        1 => "Pine",
        2 => "Plum",
        3 => "Cherry",
        4 => "Wisteria",
        5 => "Iris",
        6 => "Peony",
        7 => "Bush Clover",
        8 => "Pampas",
        9 => "Chrysanthemum",
        10 => "Maple",
        11 => "Willow",
        12 => "Paulownia",
        _ => "Unknown",
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Card {
    pub id: CardId,
    pub month: u8, // 1..=12
    pub category: Category,
    pub tag: CardTag,
    pub name: &'static str,
}

impl Card {
    /// 從 ID 取得卡牌；超出範圍回傳 None
    pub fn from_id(id: CardId) -> Option<Card> {
        CARD_DEFS.get(id as usize).map(|d| Card {
            id,
            month: d.month,
            category: d.category,
            tag: d.tag,
            name: d.name,
        })
    }

    pub fn is_bright(&self) -> bool {
        self.category == Category::Bright
    }

    pub fn is_animal(&self) -> bool {
        self.category == Category::Animal
    }

    pub fn is_ribbon(&self) -> bool {
        self.category == Category::Ribbon
    }

    pub fn is_chaff(&self) -> bool {
        self.category == Category::Chaff
    }

    /// 同月即可配對
    pub fn matches(&self, other: &Card) -> bool {
        self.month == other.month
    }

    /// 月內槽位（0..4）
    pub fn slot(&self) -> usize {
        self.id as usize % CARDS_PER_MONTH
    }
}

/// 創建標準 48 張牌組（固定順序）
pub fn standard_deck() -> Vec<Card> {
    (0..DECK_SIZE as u8).filter_map(Card::from_id).collect()
}

/// 某月的 4 張牌
pub fn cards_of_month(month: u8) -> Vec<Card> {
    if month == 0 || month > MONTHS {
        return Vec::new();
    }
    let first = (month - 1) * CARDS_PER_MONTH as u8;
    (first..first + CARDS_PER_MONTH as u8)
        .filter_map(Card::from_id)
        .collect()
}

/// 擁有指定標記的所有牌
pub fn cards_with_tag(tag: CardTag) -> Vec<Card> {
    standard_deck().into_iter().filter(|c| c.tag == tag).collect()
}

/// 擁有指定標記的第一張牌（特殊牌標記唯一）
pub fn card_with_tag(tag: CardTag) -> Option<Card> {
    CARD_DEFS
        .iter()
        .position(|d| d.tag == tag)
        .and_then(|i| Card::from_id(i as CardId))
}

/// 卡牌在 48 張牌組中的索引
pub fn card_index(card: &Card) -> usize {
    card.id as usize
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_standard_deck_unique() {
        let deck = standard_deck();
        assert_eq!(deck.len(), 48);

        let ids: HashSet<CardId> = deck.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), 48);
        for card in &deck {
            assert_eq!(card_index(card), card.id as usize);
        }
    }

    #[test]
    fn test_four_cards_per_month() {
        for month in 1..=12 {
            let cards = cards_of_month(month);
            assert_eq!(cards.len(), 4);
            assert!(cards.iter().all(|c| c.month == month));
        }
        assert!(cards_of_month(0).is_empty());
        assert!(cards_of_month(13).is_empty());
    }

    #[test]
    fn test_category_counts() {
        let deck = standard_deck();
        let count = |cat: Category| deck.iter().filter(|c| c.category == cat).count();
        assert_eq!(count(Category::Bright), 5);
        assert_eq!(count(Category::Animal), 9);
        assert_eq!(count(Category::Ribbon), 10);
        assert_eq!(count(Category::Chaff), 24);
    }

    #[test]
    fn test_ribbon_groups() {
        let poetry: Vec<u8> = cards_with_tag(CardTag::PoetryRibbon).iter().map(|c| c.month).collect();
        let blue: Vec<u8> = cards_with_tag(CardTag::BlueRibbon).iter().map(|c| c.month).collect();
        let grass: Vec<u8> = cards_with_tag(CardTag::GrassRibbon).iter().map(|c| c.month).collect();
        assert_eq!(poetry, vec![1, 2, 3]);
        assert_eq!(blue, vec![6, 9, 10]);
        assert_eq!(grass, vec![4, 5, 7]);
    }

    #[test]
    fn test_special_cards() {
        let rain = card_with_tag(CardTag::RainMan).unwrap();
        assert_eq!(rain.month, 11);
        assert!(rain.is_bright());

        let cup = card_with_tag(CardTag::SakeCup).unwrap();
        assert_eq!(cup.month, 9);
        assert!(cup.is_animal());

        let lightning = card_with_tag(CardTag::Lightning).unwrap();
        assert!(lightning.is_chaff());
    }

    #[test]
    fn test_matching_and_slot() {
        let crane = Card::from_id(0).unwrap();
        let pine_chaff = Card::from_id(3).unwrap();
        let plum = Card::from_id(4).unwrap();
        assert!(crane.matches(&pine_chaff));
        assert!(!crane.matches(&plum));
        assert_eq!(pine_chaff.slot(), 3);
        assert!(Card::from_id(48).is_none());
    }

    #[test]
    fn test_month_names() {
        assert_eq!(month_name(1), "Pine");
        assert_eq!(month_name(12), "Paulownia");
        assert_eq!(month_name(0), "Unknown");
    }
}
