//! AI 難度系統
//!
//! 定義 3 種難度，每種都是一組機率與啟發式權重
//!
//! # 架構
//!
//! 使用聲明式 `DIFFICULTY_DEFS` 表定義所有難度的元數據。
//! koi-koi 判斷：目前分數 → 繼續機率（分數越高越傾向停止）。

use serde::{Deserialize, Serialize};

// ============================================================================
// 難度定義系統
// ============================================================================

/// 分數區間：score <= max_score 時以 continue_prob 的機率喊 koi-koi
#[derive(Clone, Copy, Debug)]
pub struct ContinueBracket {
    pub max_score: i32,
    pub continue_prob: f64,
}

const fn bracket(max_score: i32, continue_prob: f64) -> ContinueBracket {
    ContinueBracket { max_score, continue_prob }
}

/// 難度定義結構
#[derive(Clone, Copy)]
pub struct DifficultyDef {
    pub name: &'static str,
    /// 依 max_score 遞增排列，最後一列必須涵蓋 i32::MAX
    pub koikoi_table: &'static [ContinueBracket],
    /// 完全隨機出牌的機率
    pub random_play: f64,
    /// 完成或推進自己的役
    pub yaku_weight: f64,
    /// 搶走對手接近完成的役所需的牌
    pub block_weight: f64,
    /// 打到場上後讓對手可以吃的懲罰
    pub threat_penalty: f64,
}

static EASY_TABLE: [ContinueBracket; 3] = [
    bracket(3, 0.7),
    bracket(6, 0.5),
    bracket(i32::MAX, 0.3),
];

static NORMAL_TABLE: [ContinueBracket; 4] = [
    bracket(2, 0.6),
    bracket(4, 0.4),
    bracket(6, 0.2),
    bracket(i32::MAX, 0.05),
];

static HARD_TABLE: [ContinueBracket; 4] = [
    bracket(2, 0.5),
    bracket(4, 0.25),
    bracket(6, 0.1),
    bracket(i32::MAX, 0.0),
];

/// 難度定義表（順序與 Difficulty 枚舉值一致）
pub static DIFFICULTY_DEFS: [DifficultyDef; 3] = [
    // 0: Easy - 常常亂打，愛賭
    DifficultyDef { name: "Easy", koikoi_table: &EASY_TABLE, random_play: 0.4, yaku_weight: 1.0, block_weight: 0.0, threat_penalty: 0.0 },
    // 1: Normal
    DifficultyDef { name: "Normal", koikoi_table: &NORMAL_TABLE, random_play: 0.1, yaku_weight: 2.0, block_weight: 1.0, threat_penalty: 0.5 },
    // 2: Hard - 不亂打，會擋役
    DifficultyDef { name: "Hard", koikoi_table: &HARD_TABLE, random_play: 0.0, yaku_weight: 3.0, block_weight: 2.0, threat_penalty: 1.0 },
];

/// AI 難度等級
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy = 0,
    #[default]
    Normal = 1,
    Hard = 2,
}

impl Difficulty {
    pub fn all() -> &'static [Difficulty] {
        &[Difficulty::Easy, Difficulty::Normal, Difficulty::Hard]
    }

    pub fn to_index(&self) -> usize {
        *self as usize
    }

    pub fn def(&self) -> &'static DifficultyDef {
        &DIFFICULTY_DEFS[self.to_index()]
    }

    pub fn name(&self) -> &'static str {
        self.def().name
    }

    /// 目前分數下喊 koi-koi 的機率
    pub fn continue_probability(&self, score: i32) -> f64 {
        self.def()
            .koikoi_table
            .iter()
            .find(|b| score <= b.max_score)
            .map(|b| b.continue_prob)
            .unwrap_or(0.0)
    }

    pub fn from_name(name: &str) -> Option<Difficulty> {
        Difficulty::all()
            .iter()
            .copied()
            .find(|d| d.name().eq_ignore_ascii_case(name))
    }
}

// ============================================================================
// 單元測試
// ============================================================================
