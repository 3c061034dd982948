//! 役（組合）定義

use serde::{Deserialize, Serialize};

use super::cards::CardId;

/// 役 ID
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum YakuId {
    // 光札系
    Goko,     // 五光
    Shiko,    // 四光
    AmeShiko, // 雨四光
    Sanko,    // 三光

    // 盃
    HanamiZake,  // 花見で一杯
    TsukimiZake, // 月見で一杯

    // 種札系
    Inoshikacho, // 猪鹿蝶
    Tane,

    // 短冊系
    AkaAotan, // 赤短・青短の重複
    Akatan,
    Aotan,
    Kusatan,
    Tanzaku,
    Nanatan, // 八八：短冊 7 枚
    Rokutan, // 八八：短冊 6 枚

    // カス
    Kasu,

    // 手役（發牌時判定）
    Teshi,    // 手四
    Kuttsuki, // くっつき
}

impl YakuId {
    /// 顯示名稱
    pub fn name(&self) -> &'static str {
        match self {
            YakuId::Goko => "Goko",
            YakuId::Shiko => "Shiko",
            YakuId::AmeShiko => "Ame-Shiko",
            YakuId::Sanko => "Sanko",
            YakuId::HanamiZake => "Hanami-zake",
            YakuId::TsukimiZake => "Tsukimi-zake",
            YakuId::Inoshikacho => "Inoshikacho",
            YakuId::Tane => "Tane",
            YakuId::AkaAotan => "Akatan-Aotan",
            YakuId::Akatan => "Akatan",
            YakuId::Aotan => "Aotan",
            YakuId::Kusatan => "Kusatan",
            YakuId::Tanzaku => "Tanzaku",
            YakuId::Nanatan => "Nanatan",
            YakuId::Rokutan => "Rokutan",
            YakuId::Kasu => "Kasu",
            YakuId::Teshi => "Teshi",
            YakuId::Kuttsuki => "Kuttsuki",
        }
    }

    /// 轉換為整數 ID (用於 observation)
    pub fn to_index(&self) -> usize {
        *self as usize
    }

    /// 是否為發牌時判定的手役
    pub fn is_hand_yaku(&self) -> bool {
        matches!(self, YakuId::Teshi | YakuId::Kuttsuki)
    }
}

/// 互斥族：同族中只保留分數最高者
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum YakuFamily {
    Brights,
    RedBlue,
    RibbonCount,
}

/// 判定結果
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Yaku {
    pub id: YakuId,
    pub name: &'static str,
    pub points: i32,
    pub cards: Vec<CardId>,
}

impl Yaku {
    pub fn new(id: YakuId, points: i32, cards: Vec<CardId>) -> Self {
        Self {
            id,
            name: id.name(),
            points,
            cards,
        }
    }
}

// ============================================================================
// 單元測試
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaku_names() {
        assert_eq!(YakuId::Goko.name(), "Goko");
        assert_eq!(YakuId::AmeShiko.name(), "Ame-Shiko");
        assert_eq!(YakuId::AkaAotan.name(), "Akatan-Aotan");
    }

    #[test]
    fn test_yaku_index_order() {
        assert_eq!(YakuId::Goko.to_index(), 0);
        assert!(YakuId::Sanko.to_index() < YakuId::Kasu.to_index());
    }

    #[test]
    fn test_hand_yaku_flag() {
        assert!(YakuId::Teshi.is_hand_yaku());
        assert!(YakuId::Kuttsuki.is_hand_yaku());
        assert!(!YakuId::Kasu.is_hand_yaku());
    }

    #[test]
    fn test_yaku_new_uses_id_name() {
        let yaku = Yaku::new(YakuId::Tane, 2, vec![4, 12]);
        assert_eq!(yaku.name, "Tane");
        assert_eq!(yaku.points, 2);
        assert_eq!(yaku.cards, vec![4, 12]);
    }
}
