//! 値オブジェクト
//!
//! 生成時にバリデーションを行い、不正な値がドメインに入り込まないようにします。

use std::{fmt, str::FromStr, time::Duration};

use uuid::Uuid;

use super::error::ValueObjectError;

/// RoomId の最大文字数
pub const MAX_ROOM_ID_CHARS: usize = 128;

/// コードバッファの最大バイト数 (256 KiB)
pub const MAX_SOURCE_CODE_BYTES: usize = 256 * 1024;

/// ルーム ID
///
/// 前後の空白は取り除かれます。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::EmptyRoomId);
        }
        let chars = trimmed.chars().count();
        if chars > MAX_ROOM_ID_CHARS {
            return Err(ValueObjectError::RoomIdTooLong {
                max: MAX_ROOM_ID_CHARS,
                actual: chars,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 参加者（認証済みユーザー）の ID
///
/// 同じユーザーが複数の接続を持っても同じ値になる。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::EmptyParticipantId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ParticipantId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// トランスポート接続 1 本ごとの ID
///
/// サーバーからのメッセージの宛先単位。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::EmptyConnectionId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ConnectionId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Uuid> for ConnectionId {
    fn from(value: Uuid) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// エディタの言語選択
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    JavaScript,
    Arduino,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::Arduino => "arduino",
        }
    }
}

impl FromStr for Language {
    type Err = ValueObjectError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "javascript" => Ok(Language::JavaScript),
            "arduino" => Ok(Language::Arduino),
            other => Err(ValueObjectError::UnknownLanguage(other.to_string())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 共有コードバッファの内容
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceCode(String);

impl SourceCode {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.len() > MAX_SOURCE_CODE_BYTES {
            return Err(ValueObjectError::CodeTooLarge {
                max: MAX_SOURCE_CODE_BYTES,
                actual: value.len(),
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for SourceCode {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// エディタ上のカーソル位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor {
    pub line: u32,
    pub column: u32,
}

impl Cursor {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Unix タイムスタンプ（ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// 空になったルームをいつ破棄するか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomRetention {
    /// 破棄しない（プロセス終了まで保持）
    Retain,
    /// 最後の接続が抜けた時点で破棄
    Immediate,
    /// 空の状態が指定時間続いたら破棄
    Ttl(Duration),
}

impl RoomRetention {
    /// 空になった時刻 `emptied_at` のルームを `now` の時点で破棄すべきか
    pub fn is_expired(&self, emptied_at: Timestamp, now: Timestamp) -> bool {
        match self {
            RoomRetention::Retain => false,
            RoomRetention::Immediate => true,
            RoomRetention::Ttl(ttl) => {
                let ttl_millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
                now.value().saturating_sub(emptied_at.value()) >= ttl_millis
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_id_is_trimmed() {
        // テスト項目: RoomId の前後の空白が取り除かれる
        // given (前提条件):
        let raw = "  r1 ".to_string();

        // when (操作):
        let room_id = RoomId::new(raw).unwrap();

        // then (期待する結果):
        assert_eq!(room_id.as_str(), "r1");
    }

    #[test]
    fn test_room_id_rejects_blank() {
        // テスト項目: 空白のみの RoomId はエラーになる
        // given (前提条件):
        let raw = "   ".to_string();

        // when (操作):
        let result = RoomId::new(raw);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::EmptyRoomId));
    }

    #[test]
    fn test_room_id_rejects_too_long() {
        // テスト項目: 最大文字数を超える RoomId はエラーになる
        // given (前提条件):
        let raw = "a".repeat(MAX_ROOM_ID_CHARS + 1);

        // when (操作):
        let result = RoomId::new(raw);

        // then (期待する結果):
        assert_eq!(
            result,
            Err(ValueObjectError::RoomIdTooLong {
                max: MAX_ROOM_ID_CHARS,
                actual: MAX_ROOM_ID_CHARS + 1,
            })
        );
    }

    #[test]
    fn test_participant_id_rejects_empty() {
        // テスト項目: 空の ParticipantId はエラーになる
        // given (前提条件):
        let raw = String::new();

        // when (操作):
        let result = ParticipantId::new(raw);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::EmptyParticipantId));
    }

    #[test]
    fn test_language_parses_known_values_only() {
        // テスト項目: javascript と arduino のみが Language として受け付けられる
        // given (前提条件):
        let inputs = ["javascript", "arduino", "python"];

        // when (操作):
        let results: Vec<_> = inputs.iter().map(|s| s.parse::<Language>()).collect();

        // then (期待する結果):
        assert_eq!(results[0], Ok(Language::JavaScript));
        assert_eq!(results[1], Ok(Language::Arduino));
        assert_eq!(
            results[2],
            Err(ValueObjectError::UnknownLanguage("python".to_string()))
        );
    }

    #[test]
    fn test_source_code_rejects_oversized_buffer() {
        // テスト項目: 上限を超えるコードはエラーになり、上限ちょうどは受け付けられる
        // given (前提条件):
        let at_limit = "x".repeat(MAX_SOURCE_CODE_BYTES);
        let over_limit = "x".repeat(MAX_SOURCE_CODE_BYTES + 1);

        // when (操作):
        let ok = SourceCode::new(at_limit);
        let err = SourceCode::new(over_limit);

        // then (期待する結果):
        assert!(ok.is_ok());
        assert!(matches!(err, Err(ValueObjectError::CodeTooLarge { .. })));
    }

    #[test]
    fn test_room_retention_expiry() {
        // テスト項目: 保持ポリシーごとに破棄判定が正しく行われる
        // given (前提条件):
        let emptied_at = Timestamp::new(1_000);
        let ttl = RoomRetention::Ttl(Duration::from_secs(5));

        // when (操作) / then (期待する結果):
        assert!(!RoomRetention::Retain.is_expired(emptied_at, Timestamp::new(i64::MAX)));
        assert!(RoomRetention::Immediate.is_expired(emptied_at, emptied_at));
        assert!(!ttl.is_expired(emptied_at, Timestamp::new(5_999)));
        assert!(ttl.is_expired(emptied_at, Timestamp::new(6_000)));
    }
}
