//! 服務層模組
//!
//! 可變狀態與呈現層投影：回合狀態機、koi-koi 決策、結算、對局管理、
//! AI、觀測構建、動作遮罩、商店模式與批次模擬

#![allow(unused_imports)]

pub mod koikoi;
pub mod events;
pub mod settlement;
pub mod state;
pub mod session;
pub mod policy;
pub mod driver;
pub mod observation;
pub mod action_mask;
pub mod shop_run;
pub mod simulate;

pub use koikoi::{DecisionStatus, KoikoiChoice, KoikoiState};
pub use events::GameEvent;
pub use settlement::{settle_match, settle_round, MatchResult, RoundEndTrigger, RoundResult};
pub use state::{PlayerAction, RoundState, Transition, Zone};
pub use session::{MatchState, PlayerSeat};
pub use policy::OpponentPolicy;
pub use driver::{play_out, policies_for, run_until_input};
pub use observation::{observation, snapshot, StateSnapshot, Tensor};
pub use action_mask::{action_mask, decode_action, execute, legal_actions, Command};
pub use shop_run::{RunStatus, ShopRun};
pub use simulate::{simulate, simulate_one, SimulationSummary};
