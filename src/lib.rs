//! 花札引擎
//!
//! - `game`: 不可變的規則表與純函數
//! - `service`: 回合狀態機、結算、AI 與呈現層投影
//! - `proto`: gRPC 定義（`server` feature）

pub mod game;
pub mod service;

#[cfg(feature = "server")]
pub mod proto {
    tonic::include_proto!("hanafuda");
}
