//! 遊戲常量定義

// ============================================================================
// 遊戲規則常量
// ============================================================================

pub const DECK_SIZE: usize = 48;         // 總張數
pub const MONTHS: u8 = 12;               // 月份數
pub const CARDS_PER_MONTH: usize = 4;    // 每月張數
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;

pub const KOIKOI_MULTIPLIER: i32 = 2;    // 對手喊過 koi-koi 時的倍率
pub const HIGH_SCORE_THRESHOLD: i32 = 7; // 7 點以上翻倍
pub const HIGH_SCORE_MULTIPLIER: i32 = 2;
pub const HAND_YAKU_POINTS: i32 = 6;     // 手役（手四・くっつき）
pub const KAN_POINTS: i32 = 12;          // 八八：1 貫 = 12 點
pub const HACHI_PAR_VALUE: i32 = 88;     // 八八：三人各 88 點
pub const MAX_REDEALS: usize = 32;       // 場上四張同月時重洗上限
pub const DEAL_BATCH: usize = 2;         // 每次發 2 張

// ============================================================================
// Observation 常量
// ============================================================================

// 每張牌的區域 one-hot：自己手牌 / 場 / 自己得牌 / 對手得牌 / 抽出的牌 / 未知
pub const ZONE_FEATURES: usize = 6;
pub const CARD_ZONE_FEATURES: usize = DECK_SIZE * ZONE_FEATURES;
pub const SCALAR_COUNT: usize = 12;
pub const PHASE_COUNT: usize = 8;
pub const OBS_SIZE: i32 = (SCALAR_COUNT + PHASE_COUNT + CARD_ZONE_FEATURES) as i32;

// ============================================================================
// Action 常量
// ============================================================================

pub const ACTION_TYPE_PLAY_HAND: i32 = 0;
pub const ACTION_TYPE_SELECT_FIELD: i32 = 1;
pub const ACTION_TYPE_ADVANCE: i32 = 2;
pub const ACTION_TYPE_KOIKOI_CONTINUE: i32 = 3;
pub const ACTION_TYPE_KOIKOI_STOP: i32 = 4;
pub const ACTION_TYPE_NEXT_ROUND: i32 = 5;

pub const ACTION_TYPE_COUNT: i32 = 6;

// Action mask layout:
// [0..6]: Action types (6)
// [6..54]: 可打出的手牌 (48)
// [54..102]: 可選的場牌 (48)
pub const ACTION_MASK_SIZE: i32 = ACTION_TYPE_COUNT + (DECK_SIZE as i32 * 2);
