//! IdentityProvider trait 定義
//!
//! 参加時に、クライアントが名乗った参加者情報を外部のユーザー ID プロバイダで解決します。
//! 認証そのものはこのサービスの責務ではありません。

use async_trait::async_trait;

use super::{entity::Participant, error::IdentityError};

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// クライアントが名乗った参加者情報から、ルームで使う参加者情報を解決する
    async fn resolve(&self, claimed: Participant) -> Result<Participant, IdentityError>;
}
