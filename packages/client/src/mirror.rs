//! ルームのローカルミラー
//!
//! サーバーから届いたメッセージを適用して、コード・言語・参加者・カーソルの
//! ローカルコピーを保ちます。
//!
//! - `room-state` はミラー全体を置き換える（再接続後の復旧もこれだけで行う）
//! - 送信元が自分の接続である差分更新（code / language / cursor）は破棄する

use std::collections::BTreeMap;

use kyodo_server::{
    domain::Language,
    infrastructure::dto::websocket::{CursorDto, ParticipantDto, ServerMessage},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomMirror {
    /// サーバーが払い出した自分の接続 ID
    pub connection_id: Option<String>,
    pub code: String,
    pub language: Language,
    pub participants: Vec<ParticipantDto>,
    /// 接続 ID → カーソル付きの参加者
    pub cursors: BTreeMap<String, ParticipantDto>,
    /// 自分のカーソル位置（再接続をまたいで保持し、次の参加要求に載せる）
    pub local_cursor: Option<CursorDto>,
    pub is_connected: bool,
}

impl RoomMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// サーバーからのメッセージを適用する
    ///
    /// # Returns
    ///
    /// 適用した場合は `true`、自分のエコーとして破棄した場合は `false`
    pub fn apply(&mut self, message: &ServerMessage) -> bool {
        match message {
            ServerMessage::Connected(msg) => {
                self.connection_id = Some(msg.connection_id.clone());
                self.is_connected = true;
            }
            ServerMessage::RoomState(msg) => {
                self.code = msg.code.clone();
                self.language = msg.language.parse().unwrap_or_default();
                self.participants = msg.participants.clone();
                self.cursors = msg.cursors.clone();
                if let Some(own) = self.connection_id.as_ref()
                    && let Some(cursor) = self.cursors.get(own).and_then(|p| p.cursor)
                {
                    self.local_cursor = Some(cursor);
                }
            }
            ServerMessage::UserJoined(msg) => {
                self.cursors
                    .insert(msg.connection_id.clone(), msg.participant.clone());
            }
            ServerMessage::UserLeft(msg) => {
                self.cursors.remove(&msg.connection_id);
            }
            ServerMessage::ParticipantsUpdated(msg) => {
                self.participants = msg.participants.clone();
            }
            ServerMessage::CodeUpdated(msg) => {
                if self.is_own(&msg.connection_id) {
                    return false;
                }
                self.code = msg.code.clone();
            }
            ServerMessage::LanguageUpdated(msg) => {
                if self.is_own(&msg.connection_id) {
                    return false;
                }
                match msg.language.parse() {
                    Ok(language) => self.language = language,
                    Err(e) => tracing::warn!("Ignoring language-updated: {}", e),
                }
            }
            ServerMessage::CursorUpdated(msg) => {
                if self.is_own(&msg.connection_id) {
                    return false;
                }
                self.cursors
                    .insert(msg.connection_id.clone(), msg.participant.clone());
            }
            ServerMessage::SimulationStarted(_) | ServerMessage::Error(_) => {}
        }
        true
    }

    /// ローカルでのコード編集
    pub fn set_local_code(&mut self, code: String) {
        self.code = code;
    }

    /// ローカルでのコード追記（1 行）
    pub fn append_local_line(&mut self, line: &str) {
        if !self.code.is_empty() && !self.code.ends_with('\n') {
            self.code.push('\n');
        }
        self.code.push_str(line);
    }

    pub fn set_local_language(&mut self, language: Language) {
        self.language = language;
    }

    /// 自分のカーソル位置を更新
    pub fn set_local_cursor(&mut self, cursor: CursorDto) {
        self.local_cursor = Some(cursor);
        if let Some(own) = self.connection_id.as_ref()
            && let Some(presence) = self.cursors.get_mut(own)
        {
            presence.cursor = Some(cursor);
        }
    }

    /// 接続が切れたときに呼ぶ（次の参加のスナップショットで復旧する）
    ///
    /// `local_cursor` は残す。
    pub fn mark_disconnected(&mut self) {
        self.is_connected = false;
        self.connection_id = None;
    }

    fn is_own(&self, connection_id: &str) -> bool {
        self.connection_id.as_deref() == Some(connection_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kyodo_server::infrastructure::dto::websocket::{
        CodeUpdatedMessage, ConnectedMessage, LanguageUpdatedMessage, PeerPresenceMessage,
        RoomStateMessage,
    };

    fn participant(id: &str) -> ParticipantDto {
        ParticipantDto {
            id: id.to_string(),
            name: id.to_string(),
            image: None,
            cursor: None,
        }
    }

    fn connected_mirror(connection_id: &str) -> RoomMirror {
        let mut mirror = RoomMirror::new();
        mirror.apply(&ServerMessage::Connected(ConnectedMessage {
            connection_id: connection_id.to_string(),
        }));
        mirror
    }

    #[test]
    fn test_room_state_replaces_mirror() {
        // テスト項目: room-state はミラー全体を置き換える
        // given (前提条件):
        let mut mirror = connected_mirror("c1");
        mirror.set_local_code("stale".to_string());
        mirror
            .cursors
            .insert("gone".to_string(), participant("ghost"));

        // when (操作):
        let mut cursors = BTreeMap::new();
        cursors.insert("c1".to_string(), participant("alice"));
        mirror.apply(&ServerMessage::RoomState(RoomStateMessage {
            code: "x=1".to_string(),
            language: "arduino".to_string(),
            participants: vec![participant("alice")],
            cursors,
        }));

        // then (期待する結果):
        assert_eq!(mirror.code, "x=1");
        assert_eq!(mirror.language, Language::Arduino);
        assert_eq!(mirror.participants, vec![participant("alice")]);
        assert_eq!(mirror.cursors.len(), 1);
        assert!(mirror.cursors.contains_key("c1"));
    }

    #[test]
    fn test_own_echo_is_discarded() {
        // テスト項目: 送信元が自分の code-updated / language-updated は破棄される
        // given (前提条件):
        let mut mirror = connected_mirror("c1");
        mirror.set_local_code("mine".to_string());

        // when (操作):
        let code_applied = mirror.apply(&ServerMessage::CodeUpdated(CodeUpdatedMessage {
            code: "echo".to_string(),
            connection_id: "c1".to_string(),
        }));
        let language_applied =
            mirror.apply(&ServerMessage::LanguageUpdated(LanguageUpdatedMessage {
                language: "arduino".to_string(),
                connection_id: "c1".to_string(),
            }));

        // then (期待する結果):
        assert!(!code_applied);
        assert!(!language_applied);
        assert_eq!(mirror.code, "mine");
        assert_eq!(mirror.language, Language::JavaScript);
    }

    #[test]
    fn test_peer_updates_are_applied() {
        // テスト項目: 他の接続からの code-updated は適用される
        // given (前提条件):
        let mut mirror = connected_mirror("c1");

        // when (操作):
        let applied = mirror.apply(&ServerMessage::CodeUpdated(CodeUpdatedMessage {
            code: "from peer".to_string(),
            connection_id: "c2".to_string(),
        }));

        // then (期待する結果):
        assert!(applied);
        assert_eq!(mirror.code, "from peer");
    }

    #[test]
    fn test_user_left_removes_cursor() {
        // テスト項目: user-joined でカーソルが追加され、user-left で削除される
        // given (前提条件):
        let mut mirror = connected_mirror("c1");
        let presence = PeerPresenceMessage {
            participant: participant("bob"),
            connection_id: "c2".to_string(),
        };

        // when (操作):
        mirror.apply(&ServerMessage::UserJoined(presence.clone()));
        let after_join = mirror.cursors.len();
        mirror.apply(&ServerMessage::UserLeft(presence));

        // then (期待する結果):
        assert_eq!(after_join, 1);
        assert!(mirror.cursors.is_empty());
    }

    #[test]
    fn test_append_local_line() {
        // テスト項目: 行の追記で改行が補われる
        // given (前提条件):
        let mut mirror = RoomMirror::new();

        // when (操作):
        mirror.append_local_line("let a = 1;");
        mirror.append_local_line("let b = 2;");

        // then (期待する結果):
        assert_eq!(mirror.code, "let a = 1;\nlet b = 2;");
    }

    #[test]
    fn test_mark_disconnected() {
        // テスト項目: 切断でミラーは未接続になり、接続 ID が消える
        // given (前提条件):
        let mut mirror = connected_mirror("c1");

        // when (操作):
        mirror.mark_disconnected();

        // then (期待する結果):
        assert!(!mirror.is_connected);
        assert_eq!(mirror.connection_id, None);
    }

    #[test]
    fn test_local_cursor_survives_disconnect() {
        // テスト項目: 自分のカーソル位置は切断後も残り、次の参加要求に使える
        // given (前提条件):
        let mut mirror = connected_mirror("c1");
        mirror.cursors.insert("c1".to_string(), participant("alice"));
        mirror.set_local_cursor(CursorDto { line: 4, column: 2 });

        // when (操作):
        mirror.mark_disconnected();

        // then (期待する結果):
        assert_eq!(mirror.local_cursor, Some(CursorDto { line: 4, column: 2 }));
        assert_eq!(
            mirror.cursors["c1"].cursor,
            Some(CursorDto { line: 4, column: 2 })
        );
    }
}
