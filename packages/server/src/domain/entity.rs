//! エンティティ: Room 集約と Participant
//!
//! ## 不変条件
//!
//! - `participants` には同じ `ParticipantId` が高々 1 件しか含まれない
//! - 参加者は、その参加者の接続が 1 本でもルームに残っている間は `participants` に残る
//! - `cursors` のキー集合 = ルームに参加中の接続の集合
//!
//! 2 つ目の不変条件は `connections_by_participant`（参加者 ID → 接続 ID の集合）で管理し、
//! 集合が空になったときだけ参加者を名簿から外します。

use std::collections::{BTreeMap, BTreeSet};

use super::{
    error::RoomError,
    value_object::{ConnectionId, Cursor, Language, ParticipantId, RoomId, SourceCode, Timestamp},
};

/// 1 ルームあたりの最大接続数（デフォルト）
pub const DEFAULT_ROOM_CAPACITY: usize = 50;

/// ルーム内で表現される認証済みユーザー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub image: Option<String>,
}

impl Participant {
    pub fn new(id: ParticipantId, name: String, image: Option<String>) -> Self {
        Self { id, name, image }
    }
}

/// 接続ごとのプレゼンス（誰が、どこにカーソルを置いているか）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presence {
    pub participant: Participant,
    pub cursor: Option<Cursor>,
}

/// 参加時に新規参加者へ送るルーム全体のスナップショット
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub code: SourceCode,
    pub language: Language,
    pub participants: Vec<Participant>,
    pub cursors: BTreeMap<ConnectionId, Presence>,
}

/// 接続がルームから抜けた結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    /// 抜けた接続に紐づいていた参加者
    pub participant: Participant,
    /// 参加者が名簿から外れたか（他の接続が残っていれば false）
    pub participant_removed: bool,
}

/// コラボレーションルーム
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub code: SourceCode,
    pub language: Language,
    pub participants: Vec<Participant>,
    pub cursors: BTreeMap<ConnectionId, Presence>,
    connections_by_participant: BTreeMap<ParticipantId, BTreeSet<ConnectionId>>,
    pub capacity: usize,
    pub created_at: Timestamp,
    /// 最後の接続が抜けた時刻（参加中の接続があれば None）
    pub emptied_at: Option<Timestamp>,
}

impl Room {
    /// 空のルームを作成（code = "", language = javascript）
    pub fn new(id: RoomId, created_at: Timestamp) -> Self {
        Self::with_capacity(id, created_at, DEFAULT_ROOM_CAPACITY)
    }

    pub fn with_capacity(id: RoomId, created_at: Timestamp, capacity: usize) -> Self {
        Self {
            id,
            code: SourceCode::default(),
            language: Language::default(),
            participants: Vec::new(),
            cursors: BTreeMap::new(),
            connections_by_participant: BTreeMap::new(),
            capacity,
            created_at,
            emptied_at: Some(created_at),
        }
    }

    /// 接続をルームに参加させる
    ///
    /// 同じ接続が再度参加した場合はプレゼンスを置き換える。
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - 参加者が新たに名簿に追加された
    /// * `Ok(false)` - 参加者は既に名簿にいた
    /// * `Err(RoomError::CapacityExceeded)` - 接続数の上限に達している
    pub fn admit(
        &mut self,
        connection_id: ConnectionId,
        participant: Participant,
        cursor: Option<Cursor>,
    ) -> Result<bool, RoomError> {
        self.check_admission(&connection_id)?;

        // 再参加: 以前のプレゼンスを外してから登録し直す
        self.detach(&connection_id);

        let newly_listed = !self.participants.iter().any(|p| p.id == participant.id);
        if newly_listed {
            self.participants.push(participant.clone());
        }

        self.connections_by_participant
            .entry(participant.id.clone())
            .or_default()
            .insert(connection_id.clone());
        self.cursors.insert(
            connection_id,
            Presence {
                participant,
                cursor,
            },
        );
        self.emptied_at = None;

        Ok(newly_listed)
    }

    /// 接続を受け入れられるか（参加済みの接続は常に受け入れる）
    pub fn check_admission(&self, connection_id: &ConnectionId) -> Result<(), RoomError> {
        if !self.cursors.contains_key(connection_id) && self.cursors.len() >= self.capacity {
            return Err(RoomError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// 接続をルームから外す
    ///
    /// 参加していない接続の場合は `None`。
    pub fn release(&mut self, connection_id: &ConnectionId, now: Timestamp) -> Option<Departure> {
        let departure = self.detach(connection_id)?;
        if self.cursors.is_empty() {
            self.emptied_at = Some(now);
        }
        Some(departure)
    }

    fn detach(&mut self, connection_id: &ConnectionId) -> Option<Departure> {
        let presence = self.cursors.remove(connection_id)?;
        let participant_id = &presence.participant.id;

        let remaining = match self.connections_by_participant.get_mut(participant_id) {
            Some(connections) => {
                connections.remove(connection_id);
                connections.len()
            }
            None => 0,
        };

        let participant_removed = remaining == 0;
        if participant_removed {
            self.connections_by_participant.remove(participant_id);
            self.participants.retain(|p| &p.id != participant_id);
        }

        Some(Departure {
            participant: presence.participant,
            participant_removed,
        })
    }

    /// コードを上書きする（last-writer-wins）
    pub fn apply_code(&mut self, code: SourceCode) {
        self.code = code;
    }

    /// 言語選択を上書きする（last-writer-wins）
    pub fn apply_language(&mut self, language: Language) {
        self.language = language;
    }

    /// 接続のカーソル位置を更新し、その接続の参加者を返す
    pub fn apply_cursor(
        &mut self,
        connection_id: &ConnectionId,
        cursor: Cursor,
    ) -> Result<Participant, RoomError> {
        let presence = self
            .cursors
            .get_mut(connection_id)
            .ok_or_else(|| RoomError::NotAMember(connection_id.as_str().to_string()))?;
        presence.cursor = Some(cursor);
        Ok(presence.participant.clone())
    }

    pub fn presence_of(&self, connection_id: &ConnectionId) -> Option<&Presence> {
        self.cursors.get(connection_id)
    }

    pub fn is_member(&self, connection_id: &ConnectionId) -> bool {
        self.cursors.contains_key(connection_id)
    }

    /// ルームに参加中の全接続
    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.cursors.keys().cloned().collect()
    }

    /// 指定した接続以外の参加中の接続
    pub fn connection_ids_except(&self, exclude: &ConnectionId) -> Vec<ConnectionId> {
        self.cursors
            .keys()
            .filter(|id| *id != exclude)
            .cloned()
            .collect()
    }

    pub fn connection_count(&self) -> usize {
        self.cursors.len()
    }

    /// 参加者が保持している接続数
    pub fn connection_count_of(&self, participant_id: &ParticipantId) -> usize {
        self.connections_by_participant
            .get(participant_id)
            .map_or(0, BTreeSet::len)
    }

    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            code: self.code.clone(),
            language: self.language,
            participants: self.participants.clone(),
            cursors: self.cursors.clone(),
        }
    }
}
