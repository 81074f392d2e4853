//! IdentityProvider の実装
//!
//! - `trusted`: クライアントが名乗った参加者情報をそのまま信頼する実装

pub mod trusted;

pub use trusted::TrustedIdentityProvider;
