//! クライアントの自己申告を信頼する IdentityProvider
//!
//! 認証は外部（フロントエンドの認証プロバイダ）の責務なので、ここでは
//! 表示名・アバター URL の正規化だけを行います。

use async_trait::async_trait;

use crate::domain::{IdentityError, IdentityProvider, Participant};

/// 表示名の最大文字数
pub const MAX_DISPLAY_NAME_CHARS: usize = 64;

#[derive(Debug, Default, Clone, Copy)]
pub struct TrustedIdentityProvider;

#[async_trait]
impl IdentityProvider for TrustedIdentityProvider {
    async fn resolve(&self, claimed: Participant) -> Result<Participant, IdentityError> {
        let name: String = claimed
            .name
            .trim()
            .chars()
            .take(MAX_DISPLAY_NAME_CHARS)
            .collect();
        let image = claimed
            .image
            .map(|url| url.trim().to_string())
            .filter(|url| url.starts_with("http://") || url.starts_with("https://"));

        Ok(Participant::new(claimed.id, name, image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ParticipantId;

    fn claimed(name: &str, image: Option<&str>) -> Participant {
        Participant::new(
            ParticipantId::new("u1".to_string()).unwrap(),
            name.to_string(),
            image.map(str::to_string),
        )
    }

    #[tokio::test]
    async fn test_resolve_trims_and_truncates_name() {
        // テスト項目: 表示名の前後の空白が除かれ、最大文字数で切り詰められる
        // given (前提条件):
        let long_name = format!("  {}  ", "a".repeat(MAX_DISPLAY_NAME_CHARS + 10));

        // when (操作):
        let resolved = TrustedIdentityProvider
            .resolve(claimed(&long_name, None))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(resolved.name.chars().count(), MAX_DISPLAY_NAME_CHARS);
        assert_eq!(resolved.id.as_str(), "u1");
    }

    #[tokio::test]
    async fn test_resolve_drops_non_http_image() {
        // テスト項目: http(s) 以外のアバター URL は破棄される
        // given (前提条件):
        let participant = claimed("Alice", Some("javascript:alert(1)"));

        // when (操作):
        let resolved = TrustedIdentityProvider.resolve(participant).await.unwrap();

        // then (期待する結果):
        assert_eq!(resolved.image, None);
    }

    #[tokio::test]
    async fn test_resolve_keeps_https_image() {
        // テスト項目: https のアバター URL はそのまま保持される
        // given (前提条件):
        let participant = claimed("Alice", Some("https://example.com/a.png"));

        // when (操作):
        let resolved = TrustedIdentityProvider.resolve(participant).await.unwrap();

        // then (期待する結果):
        assert_eq!(resolved.image.as_deref(), Some("https://example.com/a.png"));
    }
}
