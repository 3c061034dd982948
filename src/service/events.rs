//! 事件通知
//!
//! 每個改變狀態的轉移都恰好產生一個事件，呈現層依序消費即可保持同步。

use serde::Serialize;

use crate::game::{CardId, Phase, Yaku};

use super::koikoi::KoikoiChoice;
use super::settlement::{MatchResult, RoundResult};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    RoundStarted {
        round: usize,
        dealer: usize,
        field: Vec<CardId>,
    },
    /// 場上四張同月，重新洗牌發牌
    Redeal {
        attempt: usize,
    },
    TurnStarted {
        player: usize,
    },
    PhaseChanged {
        from: Phase,
        to: Phase,
    },
    /// 打出的牌沒有配對，留在場上
    CardToField {
        player: usize,
        card: CardId,
    },
    /// 打出的牌需要玩家選擇場牌
    CardPlayed {
        player: usize,
        card: CardId,
        candidates: Vec<CardId>,
    },
    Captured {
        player: usize,
        cards: Vec<CardId>,
        from_draw: bool,
    },
    CardDrawn {
        player: usize,
        card: CardId,
    },
    /// 牌山已空，跳過抽牌
    DeckExhausted {
        player: usize,
    },
    YakuUpdated {
        player: usize,
        yaku: Vec<Yaku>,
        improved: Vec<Yaku>,
    },
    DecisionRequested {
        player: usize,
        score: i32,
    },
    DecisionResolved {
        player: usize,
        choice: KoikoiChoice,
    },
    HandYaku {
        player: usize,
        yaku: Yaku,
    },
    RoundEnded {
        result: RoundResult,
    },
    MatchEnded {
        result: MatchResult,
    },
}

impl GameEvent {
    /// 事件名稱（用於 log 與 gRPC）
    pub fn kind(&self) -> &'static str {
        match self {
            GameEvent::RoundStarted { .. } => "RoundStarted",
            GameEvent::Redeal { .. } => "Redeal",
            GameEvent::TurnStarted { .. } => "TurnStarted",
            GameEvent::PhaseChanged { .. } => "PhaseChanged",
            GameEvent::CardToField { .. } => "CardToField",
            GameEvent::CardPlayed { .. } => "CardPlayed",
            GameEvent::Captured { .. } => "Captured",
            GameEvent::CardDrawn { .. } => "CardDrawn",
            GameEvent::DeckExhausted { .. } => "DeckExhausted",
            GameEvent::YakuUpdated { .. } => "YakuUpdated",
            GameEvent::DecisionRequested { .. } => "DecisionRequested",
            GameEvent::DecisionResolved { .. } => "DecisionResolved",
            GameEvent::HandYaku { .. } => "HandYaku",
            GameEvent::RoundEnded { .. } => "RoundEnded",
            GameEvent::MatchEnded { .. } => "MatchEnded",
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
