//! Kyodo collaboration room server.
//!
//! - `domain`: ルーム・参加者・接続状態のビジネスルール
//! - `infrastructure`: DTO、インメモリ Repository、WebSocket MessagePusher
//! - `usecase`: 参加・退出・同期・シミュレーション中継
//! - `ui`: axum の WebSocket / HTTP エンドポイント

pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
